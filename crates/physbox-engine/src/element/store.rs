use std::collections::BTreeMap;

use crate::{
    collision::{
        detect_collision, is_aabb_overlap, is_outline_intersect_segment,
        sweep_and_prune_collision_detection, ContactPointPair,
    },
    math::{point::Point, segment::Segment},
};

use super::{Element, ID};

/**
 * ElementStore keep elements in a dense vector, the map find element index by element id
 */
#[derive(Clone)]
pub struct ElementStore<T: Clone> {
    elements: Vec<Element<T>>,
    map: BTreeMap<ID, usize>,
}

impl<T: Clone> Default for ElementStore<T> {
    fn default() -> Self {
        Self {
            elements: Vec::new(),
            map: BTreeMap::new(),
        }
    }
}

impl<T: Clone> ElementStore<T> {
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            elements: Vec::with_capacity(capacity),
            map: BTreeMap::new(),
        }
    }

    pub fn size(&self) -> usize {
        self.elements.len()
    }

    pub fn is_empty(&self) -> bool {
        self.elements.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &Element<T>> {
        self.elements.iter()
    }

    pub fn iter_mut(&mut self) -> impl Iterator<Item = &mut Element<T>> {
        self.elements.iter_mut()
    }

    pub fn push(&mut self, element: Element<T>) {
        let id = element.id;
        self.map.insert(id, self.elements.len());
        self.elements.push(element);
    }

    pub fn has_element(&self, id: ID) -> bool {
        self.map.contains_key(&id)
    }

    pub fn remove_element(&mut self, id: ID) -> Option<Element<T>> {
        let index = self.map.remove(&id)?;
        let element = self.elements.swap_remove(index);
        // the last element moved into the hole
        if let Some(moved) = self.elements.get(index) {
            self.map.insert(moved.id, index);
        }
        Some(element)
    }

    pub fn clear(&mut self) {
        self.elements.clear();
        self.map.clear();
    }

    pub fn get_element_by_id(&self, id: ID) -> Option<&Element<T>> {
        self.map.get(&id).map(|&index| &self.elements[index])
    }

    pub fn get_mut_element_by_id(&mut self, id: ID) -> Option<&mut Element<T>> {
        let index = *self.map.get(&id)?;
        self.elements.get_mut(index)
    }

    /// borrow two different elements mutably, in the order they were asked for
    pub fn get_element_pair_mut(
        &mut self,
        (id_a, id_b): (ID, ID),
    ) -> Option<(&mut Element<T>, &mut Element<T>)> {
        if id_a == id_b {
            return None;
        }
        let index_a = *self.map.get(&id_a)?;
        let index_b = *self.map.get(&id_b)?;

        if index_a < index_b {
            let (head, tail) = self.elements.split_at_mut(index_b);
            Some((&mut head[index_a], &mut tail[0]))
        } else {
            let (head, tail) = self.elements.split_at_mut(index_a);
            Some((&mut tail[0], &mut head[index_b]))
        }
    }

    /// sweep and prune, then narrow phase; the pair is ordered by id
    pub fn detective_collision(
        &self,
        mut handler: impl FnMut(&Element<T>, &Element<T>, Vec<ContactPointPair>),
    ) {
        let mut bounds: Vec<_> = self
            .elements
            .iter()
            .enumerate()
            .filter(|(_, element)| !element.meta().is_transparent())
            .map(|(index, element)| (index, element.aabb()))
            .collect();

        sweep_and_prune_collision_detection(&mut bounds, |index_a, index_b| {
            let element_a = &self.elements[index_a];
            let element_b = &self.elements[index_b];

            if element_a.meta().is_fixed() && element_b.meta().is_fixed() {
                return;
            }

            let (collider_a, collider_b) = if element_a.id() > element_b.id() {
                (element_b, element_a)
            } else {
                (element_a, element_b)
            };

            if let Some(contact_pairs) = detect_collision(collider_a.outline(), collider_b.outline())
            {
                handler(collider_a, collider_b, contact_pairs);
            }
        });
    }

    pub fn query_region(&self, min: &Point, max: &Point) -> Vec<ID> {
        let region = (*min, *max);
        self.elements
            .iter()
            .filter(|element| is_aabb_overlap(&element.aabb(), &region))
            .map(|element| element.id())
            .collect()
    }

    pub fn query_segment(&self, segment: &Segment) -> Vec<ID> {
        self.elements
            .iter()
            .filter(|element| is_outline_intersect_segment(element.outline(), segment))
            .map(|element| element.id())
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{element::ElementBuilder, meta::MetaBuilder, shape::Rect};

    fn element(id: ID, x: f32) -> Element<ID> {
        let mut element: Element<ID> =
            ElementBuilder::new(Rect::new((x, 0.), 10., 10.), MetaBuilder::new(), id).into();
        element.inject_id(id);
        element
    }

    #[test]
    fn test_remove_keeps_index_consistent() {
        let mut store = ElementStore::default();
        store.push(element(1, 0.));
        store.push(element(2, 100.));
        store.push(element(3, 200.));

        assert!(store.remove_element(1).is_some());
        assert!(store.remove_element(1).is_none());
        assert_eq!(store.size(), 2);
        assert_eq!(*store.get_element_by_id(3).unwrap().data(), 3);
        assert_eq!(*store.get_element_by_id(2).unwrap().data(), 2);
    }

    #[test]
    fn test_pair_access_keeps_order() {
        let mut store = ElementStore::default();
        store.push(element(1, 0.));
        store.push(element(2, 100.));

        let (b, a) = store.get_element_pair_mut((2, 1)).unwrap();
        assert_eq!(b.id(), 2);
        assert_eq!(a.id(), 1);
        assert!(store.get_element_pair_mut((1, 1)).is_none());
    }

    #[test]
    fn test_queries() {
        let mut store = ElementStore::default();
        store.push(element(1, 0.));
        store.push(element(2, 100.));

        assert_eq!(
            store.query_region(&(90., -1.).into(), &(120., 1.).into()),
            vec![2]
        );
        let segment: Segment = ((-20., 0.).into(), (20., 0.).into()).into();
        assert_eq!(store.query_segment(&segment), vec![1]);
    }
}
