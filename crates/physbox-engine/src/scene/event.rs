use crate::{
    collision::ContactPointPair,
    constraints::contact::ContactConstraint,
    element::Element,
    math::FloatNum,
};

/// receives every active contact pair before velocities are solved
pub trait CollisionListener<Data: Clone> {
    fn on_collision_active(&mut self, _event: &mut CollisionEvent<'_, Data>) {}
}

impl<Data: Clone> CollisionListener<Data> for () {}

pub struct CollisionEvent<'a, Data: Clone> {
    element_a: &'a mut Element<Data>,
    element_b: &'a mut Element<Data>,
    constraint: &'a mut ContactConstraint,
}

impl<'a, Data: Clone> CollisionEvent<'a, Data> {
    pub(crate) fn new(
        element_a: &'a mut Element<Data>,
        element_b: &'a mut Element<Data>,
        constraint: &'a mut ContactConstraint,
    ) -> Self {
        Self {
            element_a,
            element_b,
            constraint,
        }
    }

    pub fn element_a(&self) -> &Element<Data> {
        &*self.element_a
    }

    pub fn element_b(&self) -> &Element<Data> {
        &*self.element_b
    }

    pub fn elements_mut(&mut self) -> (&mut Element<Data>, &mut Element<Data>) {
        (&mut *self.element_a, &mut *self.element_b)
    }

    /// normal of every pair points toward element a
    pub fn contact_points(&self) -> impl Iterator<Item = &ContactPointPair> {
        self.constraint.contact_point_pairs()
    }

    pub fn friction(&self) -> FloatNum {
        self.constraint.factor_friction()
    }

    pub fn set_friction(&mut self, friction: FloatNum) {
        self.constraint.set_factor_friction(friction.max(0.));
    }

    pub fn static_friction(&self) -> FloatNum {
        self.constraint.factor_static_friction()
    }

    pub fn set_static_friction(&mut self, static_friction: FloatNum) {
        self.constraint
            .set_factor_static_friction(static_friction.max(0.));
    }
}
