pub(crate) mod context;
pub mod event;

use crate::{
    constraints::{contact::ContactConstraint, contact_manifold::ContactConstraintManifold},
    element::{store::ElementStore, Element, ID},
    math::{point::Point, segment::Segment, vector::Vector, FloatNum},
};

pub use self::context::{ConstraintParameters, Context};
use self::event::{CollisionEvent, CollisionListener};

pub struct Scene<Data = ()>
where
    Data: Clone,
{
    element_store: ElementStore<Data>,
    id_dispatcher: IDDispatcher,
    total_duration: FloatNum,
    context: Context,
    frame_count: u64,
    contact_constraints_manifold: ContactConstraintManifold,
}

impl<Data: Clone> Default for Scene<Data> {
    fn default() -> Self {
        Self {
            element_store: Default::default(),
            id_dispatcher: Default::default(),
            total_duration: 0.,
            context: Default::default(),
            frame_count: 0,
            contact_constraints_manifold: Default::default(),
        }
    }
}

/**
 * uuid generator
 */
#[derive(Default)]
struct IDDispatcher {
    current_id: ID,
}

impl IDDispatcher {
    fn gen_id(&mut self) -> ID {
        self.current_id = self.current_id.checked_add(1).expect("create too much id");
        self.current_id
    }

    fn reset(&mut self) {
        self.current_id = 0;
    }
}

impl<T: Clone> Scene<T> {
    #[inline]
    pub fn new() -> Self {
        Default::default()
    }

    #[inline]
    pub fn with_capacity(capacity: usize) -> Self {
        Self {
            element_store: ElementStore::with_capacity(capacity),
            ..Default::default()
        }
    }

    #[inline]
    pub fn push_element(&mut self, element: impl Into<Element<T>>) -> ID {
        let mut element: Element<T> = element.into();

        let element_id = self.id_dispatcher.gen_id();
        element.inject_id(element_id);

        self.element_store.push(element);
        element_id
    }

    #[inline]
    pub fn has_element(&self, element_id: ID) -> bool {
        self.element_store.has_element(element_id)
    }

    #[inline]
    pub fn remove_element(&mut self, element_id: ID) -> Option<Element<T>> {
        self.contact_constraints_manifold
            .retain(|&(a, b), _| a != element_id && b != element_id);
        self.element_store.remove_element(element_id)
    }

    #[inline]
    pub fn element_size(&self) -> usize {
        self.element_store.size()
    }

    pub fn total_duration(&self) -> FloatNum {
        self.total_duration
    }

    #[inline]
    pub fn frame_count(&self) -> u64 {
        self.frame_count
    }

    pub fn tick(&mut self, delta_time: FloatNum) {
        self.tick_with_listener(delta_time, &mut ());
    }

    /// advance the world by `delta_time` seconds
    ///
    /// order: collision detection, listener, velocity integration, contact solving,
    /// position integration, position fix, then accumulated forces are cleared
    pub fn tick_with_listener<L>(&mut self, delta_time: FloatNum, listener: &mut L)
    where
        L: CollisionListener<T>,
    {
        if !(delta_time.is_finite() && delta_time > 0.) {
            log::warn!("skip tick with invalid delta time {}", delta_time);
            return;
        }

        self.frame_count += 1;

        self.total_duration += delta_time;

        self.collision_detective();

        self.emit_collision_events(listener);

        self.integrate_velocity(delta_time);

        self.pre_solve_constraints();

        for _ in 0..self.context.constraint_parameters().velocity_iterations() {
            self.solve_contact_constraints();
        }

        self.integrate_position(delta_time);

        self.solve_position_fix();

        self.clear_force_accumulators();
    }

    #[inline]
    pub fn elements_iter(&self) -> impl Iterator<Item = &Element<T>> {
        self.element_store.iter()
    }

    #[inline]
    pub fn elements_iter_mut(&mut self) -> impl Iterator<Item = &mut Element<T>> {
        self.element_store.iter_mut()
    }

    #[inline]
    pub fn get_element(&self, id: ID) -> Option<&Element<T>> {
        self.element_store.get_element_by_id(id)
    }

    #[inline]
    pub fn get_element_mut(&mut self, id: ID) -> Option<&mut Element<T>> {
        self.element_store.get_mut_element_by_id(id)
    }

    #[inline]
    pub fn context(&self) -> &Context {
        &self.context
    }

    // remove all elements;
    #[inline]
    pub fn clear(&mut self) {
        self.element_store.clear();
        self.id_dispatcher.reset();
        self.contact_constraints_manifold.clear();
        self.frame_count = 0;
        self.total_duration = 0.;
    }

    pub fn set_gravity(&mut self, reducer: impl Fn(&Vector) -> Vector) {
        let gravity = self.context.default_gravity_mut();
        *gravity = reducer(gravity);
    }

    pub fn gravity(&self) -> Vector {
        *self.context.default_gravity()
    }

    pub fn enable_gravity(&mut self, enable: bool) {
        *self.context.enable_gravity_mut() = enable;
    }

    /// contact pairs found by the last tick
    pub fn is_element_collide(&self, element_a_id: ID, element_b_id: ID) -> bool {
        if element_a_id == element_b_id {
            return false;
        }

        let id_pair = if element_a_id > element_b_id {
            (element_b_id, element_a_id)
        } else {
            (element_a_id, element_b_id)
        };

        self.contact_constraints_manifold
            .get(&id_pair)
            .map_or(false, |v| v.is_active())
    }

    /// elements whose bounding box overlaps the region
    pub fn query_region(&self, min: impl Into<Point>, max: impl Into<Point>) -> Vec<ID> {
        self.element_store.query_region(&min.into(), &max.into())
    }

    /// elements whose outline crosses the segment
    pub fn query_segment(&self, start: impl Into<Point>, end: impl Into<Point>) -> Vec<ID> {
        let segment = Segment::new(start.into(), end.into());
        self.element_store.query_segment(&segment)
    }

    // clear velocity for  all element , just set zero to velocity
    pub fn silent(&mut self) {
        self.elements_iter_mut()
            .for_each(|element| element.meta_mut().silent())
    }

    fn collision_detective(&mut self) {
        let manifold = &mut self.contact_constraints_manifold;
        manifold.clear();

        self.element_store
            .detective_collision(|a, b, contact_pairs| {
                let manifold_key = (a.id(), b.id());

                let contact_constraint =
                    ContactConstraint::new(a.id(), b.id(), contact_pairs, (a.meta(), b.meta()));

                manifold.insert(manifold_key, contact_constraint);
            });
    }

    fn emit_collision_events<L>(&mut self, listener: &mut L)
    where
        L: CollisionListener<T>,
    {
        for contact_constraint in self.contact_constraints_manifold.values_mut() {
            let Some((element_a, element_b)) = self
                .element_store
                .get_element_pair_mut(contact_constraint.obj_id_pair())
            else {
                continue;
            };

            let mut event = CollisionEvent::new(element_a, element_b, contact_constraint);
            listener.on_collision_active(&mut event);
        }
    }

    fn integrate_velocity(&mut self, delta_time: FloatNum) {
        let gravity = *self.context.default_gravity();
        let enable_gravity = self.context.enable_gravity();

        self.elements_iter_mut()
            .filter(|element| !element.meta().is_fixed())
            .for_each(|element| {
                let meta = element.meta_mut();

                let mut velocity = *meta.velocity();

                if enable_gravity && !meta.is_ignore_gravity() {
                    velocity += gravity * delta_time;
                }

                let accumulator = meta.force_accumulator();
                velocity += accumulator.force() * (meta.inv_mass() * delta_time);
                let angle_velocity = meta.angle_velocity()
                    + accumulator.torque() * meta.inv_moment_of_inertia() * delta_time;

                let damping = (1. - meta.friction_air()).clamp(0., 1.);

                *meta.velocity_mut() = velocity * damping;
                *meta.angle_velocity_mut() = angle_velocity * damping;
            });
    }

    fn pre_solve_constraints(&mut self) {
        let parameters = self.context.constraint_parameters();

        for contact_constraint in self.contact_constraints_manifold.values_mut() {
            let (id_a, id_b) = contact_constraint.obj_id_pair();
            let (Some(element_a), Some(element_b)) = (
                self.element_store.get_element_by_id(id_a),
                self.element_store.get_element_by_id(id_b),
            ) else {
                contact_constraint.set_is_active(false);
                continue;
            };

            contact_constraint.pre_solve((element_a, element_b), parameters);
        }
    }

    fn solve_contact_constraints(&mut self) {
        let parameters = self.context.constraint_parameters();

        self.contact_constraints_manifold
            .values_mut()
            .filter(|constraint| constraint.is_active())
            .for_each(|contact_constraint| {
                if let Some(pair) = self
                    .element_store
                    .get_element_pair_mut(contact_constraint.obj_id_pair())
                {
                    contact_constraint.solve_velocity_constraint(pair, parameters);
                }
            })
    }

    fn integrate_position(&mut self, delta_time: FloatNum) {
        self.elements_iter_mut().for_each(|element| {
            element.integrate_position(delta_time);
        });
    }

    fn solve_position_fix(&mut self) {
        let parameters = self.context.constraint_parameters();

        self.contact_constraints_manifold
            .values()
            .filter(|constraint| constraint.is_active())
            .for_each(|contact_constraint| {
                if let Some(pair) = self
                    .element_store
                    .get_element_pair_mut(contact_constraint.obj_id_pair())
                {
                    contact_constraint.solve_position_constraint(pair, parameters);
                }
            })
    }

    fn clear_force_accumulators(&mut self) {
        self.elements_iter_mut()
            .for_each(|element| element.meta_mut().force_accumulator_mut().clear());
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        meta::MetaBuilder,
        shape::{Circle, Rect},
        element::ElementBuilder,
    };

    fn ground<T: Clone>(scene: &mut Scene<T>, data: T) -> ID {
        scene.push_element(ElementBuilder::new(
            Rect::new((0., 200.), 1000., 20.),
            MetaBuilder::new().is_fixed(true),
            data,
        ))
    }

    #[test]
    fn test_falling_body_accelerates_downward() {
        let mut scene = Scene::new();
        let id = scene.push_element(ElementBuilder::new(
            Circle::new((0., 0.), 5.),
            MetaBuilder::new().friction_air(0.),
            (),
        ));

        for _ in 0..10 {
            scene.tick(1. / 60.);
        }

        let element = scene.get_element(id).unwrap();
        assert!(element.center_point().y() > 0.);
        assert!((element.meta().velocity().y() - 980. / 6.).abs() < 1e-2);
    }

    #[test]
    fn test_box_rests_on_ground() {
        let mut scene = Scene::new();
        ground(&mut scene, ());
        let id = scene.push_element(ElementBuilder::new(
            Rect::new((0., 150.), 40., 40.),
            MetaBuilder::new().mass(1.),
            (),
        ));

        for _ in 0..240 {
            scene.tick(1. / 60.);
        }

        let element = scene.get_element(id).unwrap();
        // ground top is at 190, block half height is 20
        assert!((element.center_point().y() - 170.).abs() < 2.);
        assert!(element.meta().velocity().abs() < 20.);
        assert!(element.angle().abs() < 0.05);
    }

    #[test]
    fn test_listener_can_override_friction() {
        struct Frictionless {
            calls: usize,
        }

        impl CollisionListener<()> for Frictionless {
            fn on_collision_active(&mut self, event: &mut CollisionEvent<'_, ()>) {
                self.calls += 1;
                assert!(event.contact_points().count() > 0);
                event.set_friction(0.);
                event.set_static_friction(0.);
            }
        }

        let mut scene = Scene::new();
        ground(&mut scene, ());
        let id = scene.push_element(ElementBuilder::new(
            Rect::new((0., 169.), 40., 40.),
            MetaBuilder::new().friction_air(0.).factor_friction(1.),
            (),
        ));
        *scene.get_element_mut(id).unwrap().meta_mut().velocity_mut() = (100., 0.).into();

        let mut listener = Frictionless { calls: 0 };
        for _ in 0..30 {
            scene.tick_with_listener(1. / 60., &mut listener);
        }

        assert!(listener.calls > 0);
        let velocity = scene.get_element(id).unwrap().meta().velocity().x();
        assert!((velocity - 100.).abs() < 5.);
    }

    #[test]
    fn test_queries_and_remove() {
        let mut scene = Scene::new();
        let ground_id = ground(&mut scene, ());
        let circle_id = scene.push_element(ElementBuilder::new(
            Circle::new((300., 0.), 5.),
            MetaBuilder::new(),
            (),
        ));

        assert_eq!(scene.query_segment((300., -10.), (300., 10.)), vec![circle_id]);
        let mut region = scene.query_region((-10., -10.), (400., 195.));
        region.sort();
        assert_eq!(region, vec![ground_id, circle_id]);

        assert!(scene.remove_element(circle_id).is_some());
        assert!(!scene.has_element(circle_id));
        assert_eq!(scene.element_size(), 1);
    }
}
