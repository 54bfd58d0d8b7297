use std::collections::BTreeMap;

use physbox_engine::{
    element::{Element, ID},
    math::{point::Point, vector::Vector},
    scene::{event::CollisionListener, Scene},
};

use crate::{
    config::SandboxConfig,
    object::{ObjectId, SceneObject},
    projection::{self, ViewMode},
};

/// bodies of the current view, derived from scene data and thrown away on rebuild
#[derive(Default)]
pub(crate) struct World {
    scene: Scene<ObjectId>,
    bodies: BTreeMap<ObjectId, ID>,
}

impl World {
    pub(crate) fn scene(&self) -> &Scene<ObjectId> {
        &self.scene
    }

    pub(crate) fn body(&self, object_id: ObjectId) -> Option<&Element<ObjectId>> {
        let id = self.bodies.get(&object_id)?;
        self.scene.get_element(*id)
    }

    pub(crate) fn body_mut(&mut self, object_id: ObjectId) -> Option<&mut Element<ObjectId>> {
        let id = self.bodies.get(&object_id)?;
        self.scene.get_element_mut(*id)
    }

    pub(crate) fn has_body(&self, object_id: ObjectId) -> bool {
        self.bodies.contains_key(&object_id)
    }

    pub(crate) fn bodies(&self) -> impl Iterator<Item = (ObjectId, &Element<ObjectId>)> {
        self.scene
            .elements_iter()
            .map(|element| (*element.data(), element))
    }

    /// (re)create the body of one object, returns false when it has none in this view
    pub(crate) fn insert(
        &mut self,
        object: &SceneObject,
        view: ViewMode,
        config: &SandboxConfig,
    ) -> bool {
        self.remove(object.id());

        let Some(element) = projection::project(object, view, config) else {
            log::debug!("object {} has no body in {:?} view", object.id(), view);
            return false;
        };

        let id = self.scene.push_element(element);
        self.bodies.insert(object.id(), id);
        true
    }

    pub(crate) fn remove(&mut self, object_id: ObjectId) -> Option<Element<ObjectId>> {
        let id = self.bodies.remove(&object_id)?;
        self.scene.remove_element(id)
    }

    pub(crate) fn clear(&mut self) {
        self.bodies.clear();
        self.scene.clear();
    }

    pub(crate) fn set_gravity(&mut self, gravity: Vector, enable: bool) {
        self.scene.set_gravity(|_| gravity);
        self.scene.enable_gravity(enable);
    }

    pub(crate) fn tick<L: CollisionListener<ObjectId>>(
        &mut self,
        delta_time: physbox_engine::math::FloatNum,
        listener: &mut L,
    ) {
        self.scene.tick_with_listener(delta_time, listener);
    }

    /// dynamic bodies whose outline crosses the segment
    pub(crate) fn query_segment(&self, start: Point, end: Point) -> Vec<ObjectId> {
        self.scene
            .query_segment(start, end)
            .into_iter()
            .filter_map(|id| self.scene.get_element(id))
            .filter(|element| !element.meta().is_fixed())
            .map(|element| *element.data())
            .collect()
    }

    pub(crate) fn query_region(&self, min: Point, max: Point) -> Vec<ObjectId> {
        self.scene
            .query_region(min, max)
            .into_iter()
            .filter_map(|id| self.scene.get_element(id))
            .map(|element| *element.data())
            .collect()
    }
}
