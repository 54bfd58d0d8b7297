use std::collections::BTreeMap;

use crate::{
    constraint::{Constraint, ConstraintId, ConstraintKind},
    object::{ObjectDescriptor, ObjectId, SceneObject},
};

/// authoritative parametric scene, survives every view switch and body rebuild
#[derive(Default, Clone, Debug)]
pub struct SceneStore {
    objects: BTreeMap<ObjectId, SceneObject>,
    constraints: BTreeMap<ConstraintId, Constraint>,
    last_object_id: ObjectId,
    last_constraint_id: ConstraintId,
}

impl SceneStore {
    pub fn next_object_id(&mut self) -> ObjectId {
        self.last_object_id = self
            .last_object_id
            .checked_add(1)
            .expect("create too much object id");
        self.last_object_id
    }

    fn next_constraint_id(&mut self) -> ConstraintId {
        self.last_constraint_id = self
            .last_constraint_id
            .checked_add(1)
            .expect("create too much constraint id");
        self.last_constraint_id
    }

    /// insert or replace, the id allocator is kept ahead of every given id
    pub fn create_object(&mut self, id: ObjectId, descriptor: ObjectDescriptor) -> &SceneObject {
        self.last_object_id = self.last_object_id.max(id);
        self.objects
            .entry(id)
            .and_modify(|object| *object = SceneObject::new(id, descriptor.clone()))
            .or_insert_with(|| SceneObject::new(id, descriptor))
    }

    pub(crate) fn insert_object(&mut self, object: SceneObject) {
        self.last_object_id = self.last_object_id.max(object.id());
        self.objects.insert(object.id(), object);
    }

    pub fn has_object(&self, id: ObjectId) -> bool {
        self.objects.contains_key(&id)
    }

    pub fn object(&self, id: ObjectId) -> Option<&SceneObject> {
        self.objects.get(&id)
    }

    pub(crate) fn object_mut(&mut self, id: ObjectId) -> Option<&mut SceneObject> {
        self.objects.get_mut(&id)
    }

    pub fn objects(&self) -> impl Iterator<Item = &SceneObject> {
        self.objects.values()
    }

    /// removes the object and every constraint that references it
    pub fn remove_object(&mut self, id: ObjectId) -> Option<SceneObject> {
        let object = self.objects.remove(&id)?;
        self.constraints
            .retain(|_, constraint| !constraint.references(id));
        Some(object)
    }

    pub(crate) fn add_constraint(&mut self, kind: ConstraintKind) -> ConstraintId {
        let id = self.next_constraint_id();
        self.constraints.insert(id, Constraint::new(id, kind));
        id
    }

    pub fn constraint(&self, id: ConstraintId) -> Option<&Constraint> {
        self.constraints.get(&id)
    }

    pub(crate) fn constraint_mut(&mut self, id: ConstraintId) -> Option<&mut Constraint> {
        self.constraints.get_mut(&id)
    }

    pub fn constraints(&self) -> impl Iterator<Item = &Constraint> {
        self.constraints.values()
    }

    pub(crate) fn constraint_map(&self) -> &BTreeMap<ConstraintId, Constraint> {
        &self.constraints
    }

    pub fn remove_constraint(&mut self, id: ConstraintId) -> Option<Constraint> {
        self.constraints.remove(&id)
    }

    pub fn clear(&mut self) {
        self.objects.clear();
        self.constraints.clear();
        self.last_object_id = 0;
        self.last_constraint_id = 0;
    }

    /// replace everything, allocators continue after the restored ids
    pub(crate) fn restore(&mut self, objects: Vec<SceneObject>, constraints: Vec<Constraint>) {
        self.clear();
        for object in objects {
            self.insert_object(object);
        }
        for constraint in constraints {
            self.last_constraint_id = self.last_constraint_id.max(constraint.id());
            self.constraints.insert(constraint.id(), constraint);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        constraint::{Endpoint, Rope},
        object::ObjectKind,
    };

    #[test]
    fn test_allocator_stays_ahead() {
        let mut store = SceneStore::default();
        store.create_object(10, ObjectDescriptor::new(ObjectKind::Box));
        assert_eq!(store.next_object_id(), 11);
        assert_eq!(store.next_object_id(), 12);
    }

    #[test]
    fn test_remove_object_drops_its_constraints() {
        let mut store = SceneStore::default();
        store.create_object(1, ObjectDescriptor::new(ObjectKind::Box));
        store.create_object(2, ObjectDescriptor::new(ObjectKind::Box));

        let rope = |a, b| {
            ConstraintKind::Rope(Rope::new(
                Endpoint::body(a),
                Endpoint::body(b),
                10.,
                Default::default(),
            ))
        };
        let keep = store.add_constraint(rope(2, 2));
        let dropped = store.add_constraint(rope(1, 2));

        assert!(store.remove_object(1).is_some());
        assert!(store.constraint(keep).is_some());
        assert!(store.constraint(dropped).is_none());
        assert!(store.remove_object(1).is_none());
    }
}
