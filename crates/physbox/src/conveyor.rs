use std::collections::BTreeMap;

use physbox_engine::{
    element::Element,
    math::{point::Point, vector::Vector, FloatNum},
    scene::event::{CollisionEvent, CollisionListener},
};

use crate::{
    constraint::{ConstraintKind, FrictionOverride},
    object::ObjectId,
    store::SceneStore,
};

/// collision hook of one tick: friction overrides first, then conveyor belts
pub(crate) struct ContactListener {
    // belt speed by object id
    conveyors: BTreeMap<ObjectId, FloatNum>,
    friction_overrides: Vec<FrictionOverride>,
    gain: FloatNum,
}

impl ContactListener {
    pub(crate) fn new(store: &SceneStore, gain: FloatNum) -> Self {
        let conveyors = store
            .objects()
            .filter(|object| object.kind() == crate::object::ObjectKind::Conveyor)
            .map(|object| (object.id(), object.speed()))
            .collect();

        let friction_overrides = store
            .constraints()
            .filter_map(|constraint| match constraint.kind() {
                ConstraintKind::Friction(friction) => Some(friction.clone()),
                _ => None,
            })
            .collect();

        Self {
            conveyors,
            friction_overrides,
            gain,
        }
    }

    fn friction_override(&self, a: ObjectId, b: ObjectId) -> Option<FloatNum> {
        self.friction_overrides
            .iter()
            .rev()
            .find(|friction| friction.matches(a, b))
            .map(|friction| friction.friction())
    }
}

/// average of the reported contact points
fn contact_center(event: &CollisionEvent<'_, ObjectId>) -> Option<Point> {
    let (sum, count) = event
        .contact_points()
        .fold((Vector::default(), 0usize), |(sum, count), pair| {
            (sum + pair.point().to_vector(), count + 1)
        });
    if count == 0 {
        return None;
    }
    Some((sum / count as FloatNum).to_point())
}

/// proportional force that drags the body toward the belt's surface speed
fn drive_along_belt(
    belt: &Element<ObjectId>,
    belt_speed: FloatNum,
    body: &mut Element<ObjectId>,
    contact: &Point,
    friction: FloatNum,
    gain: FloatNum,
) {
    let angle = belt.angle();
    let tangent = Vector::new(angle.cos(), angle.sin());

    let surface_speed = belt_speed + *belt.meta().velocity() * tangent;
    let body_speed = *body.meta().velocity() * tangent;
    let error = surface_speed - body_speed;

    let force = tangent * (gain * friction * body.meta().mass() * error);
    if !force.is_finite() {
        log::warn!("skip non finite conveyor force on object {}", body.data());
        return;
    }
    body.apply_force_at(force, contact);
}

impl CollisionListener<ObjectId> for ContactListener {
    fn on_collision_active(&mut self, event: &mut CollisionEvent<'_, ObjectId>) {
        let object_a = *event.element_a().data();
        let object_b = *event.element_b().data();

        if let Some(friction) = self.friction_override(object_a, object_b) {
            event.set_friction(friction);
            event.set_static_friction(friction);
        }

        let belt_a = self.conveyors.get(&object_a).copied();
        let belt_b = self.conveyors.get(&object_b).copied();
        if belt_a.is_none() && belt_b.is_none() {
            return;
        }

        let friction = event.friction();
        let Some(contact) = contact_center(event) else {
            return;
        };

        // the belt force replaces ordinary tangential friction with the belt
        event.set_friction(0.);
        event.set_static_friction(0.);

        let gain = self.gain;
        let (element_a, element_b) = event.elements_mut();
        if let Some(speed) = belt_a {
            if !element_b.meta().is_fixed() {
                drive_along_belt(element_a, speed, element_b, &contact, friction, gain);
            }
        }
        if let Some(speed) = belt_b {
            if !element_a.meta().is_fixed() {
                drive_along_belt(element_b, speed, element_a, &contact, friction, gain);
            }
        }
    }
}
