//! per tick resolution of the sandbox connectors
//!
//! force based kinds (springs, elastic ropes, constant forces) accumulate once per tick,
//! then ideal ropes and pulleys run a fixed number of position based iterations.
//! bodies are looked up by object id every time, a missing body skips its constraint.

use std::collections::BTreeMap;

use physbox_engine::{
    constraints::ConstraintObject,
    math::{point::Point, vector::Vector, FloatNum},
};

use crate::{
    config::SandboxConfig,
    constraint::{Constraint, ConstraintId, ConstraintKind, Endpoint, Pulley, Rope, Spring},
    object::ObjectId,
    world::World,
};

// a rope this close to its length counts as taut and keeps damping
const TAUT_TOLERANCE: FloatNum = 1e-2;

/// an endpoint resolved for this tick
#[derive(Clone, Copy, Debug)]
pub(crate) struct Anchor {
    pub(crate) point: Point,
    object_id: Option<ObjectId>,
    inv_mass: FloatNum,
    // velocity of the anchor point, includes rotation
    point_velocity: Vector,
    // velocity of the center of mass
    velocity: Vector,
}

impl Anchor {
    fn is_movable(&self) -> bool {
        self.inv_mass > 0.
    }
}

pub(crate) fn resolve_endpoint(world: &World, endpoint: &Endpoint) -> Option<Anchor> {
    match endpoint {
        Endpoint::Fixed { point } => Some(Anchor {
            point: *point,
            object_id: None,
            inv_mass: 0.,
            point_velocity: Vector::default(),
            velocity: Vector::default(),
        }),
        Endpoint::Body { id, offset } => {
            let Some(element) = world.body(*id) else {
                log::debug!("endpoint object {} has no body", id);
                return None;
            };
            let point = element.center_point() + offset.rotate(element.angle());
            let meta = element.meta();
            Some(Anchor {
                point,
                object_id: Some(*id),
                inv_mass: meta.inv_mass(),
                point_velocity: element.compute_point_velocity(&point),
                velocity: *meta.velocity(),
            })
        }
    }
}

fn apply_force_at(world: &mut World, anchor: &Anchor, force: Vector) {
    if !anchor.is_movable() {
        return;
    }
    if let Some(element) = anchor.object_id.and_then(|id| world.body_mut(id)) {
        element.apply_force_at(force, &anchor.point);
    }
}

fn translate(world: &mut World, anchor: &Anchor, translation: Vector) {
    if !anchor.is_movable() {
        return;
    }
    if let Some(element) = anchor.object_id.and_then(|id| world.body_mut(id)) {
        element.translate(&translation);
    }
}

fn add_velocity(world: &mut World, anchor: &Anchor, velocity: Vector) {
    if !anchor.is_movable() {
        return;
    }
    if let Some(element) = anchor.object_id.and_then(|id| world.body_mut(id)) {
        *element.meta_mut().velocity_mut() += velocity;
    }
}

/// spring force between two anchors, positive pulls them together
///
/// `None` when the anchors are too close or the numbers are unusable
fn spring_force(
    a: &Anchor,
    b: &Anchor,
    rest_length: FloatNum,
    stiffness: FloatNum,
    damping: FloatNum,
    config: &SandboxConfig,
) -> Option<(Vector, FloatNum)> {
    let delta: Vector = (a.point, b.point).into();
    let distance = delta.abs();
    if !distance.is_finite() {
        log::warn!("spring distance is not finite");
        return None;
    }
    if distance < config.min_spring_distance() {
        return None;
    }

    let normal = delta / distance;
    let relative_velocity = (b.point_velocity - a.point_velocity) * normal;
    let magnitude = stiffness * (distance - rest_length) + damping * relative_velocity;

    if !magnitude.is_finite() || magnitude.abs() > config.max_spring_force() {
        log::warn!("discard spring force {}", magnitude);
        return None;
    }

    Some((normal, magnitude))
}

fn apply_spring_pair(world: &mut World, a: &Anchor, b: &Anchor, normal: Vector, magnitude: FloatNum) {
    apply_force_at(world, a, normal * magnitude);
    apply_force_at(world, b, -normal * magnitude);
}

fn apply_spring(world: &mut World, spring: &Spring, config: &SandboxConfig) {
    let (Some(a), Some(b)) = (
        resolve_endpoint(world, &spring.a()),
        resolve_endpoint(world, &spring.b()),
    ) else {
        return;
    };

    if let Some((normal, magnitude)) = spring_force(
        &a,
        &b,
        spring.length(),
        spring.stiffness(),
        spring.damping(),
        config,
    ) {
        apply_spring_pair(world, &a, &b, normal, magnitude);
    }
}

/// elastic rope only pulls, returns true when it snapped
fn apply_elastic_rope(world: &mut World, rope: &Rope, config: &SandboxConfig) -> bool {
    let (Some(a), Some(b)) = (
        resolve_endpoint(world, &rope.a()),
        resolve_endpoint(world, &rope.b()),
    ) else {
        return false;
    };

    if a.point.distance(&b.point) <= rope.length() {
        return false;
    }

    let Some((normal, magnitude)) =
        spring_force(&a, &b, rope.length(), rope.stiffness(), rope.damping(), config)
    else {
        return false;
    };

    let magnitude = magnitude.max(0.);
    if rope.max_force().map_or(false, |max_force| magnitude > max_force) {
        return true;
    }

    apply_spring_pair(world, &a, &b, normal, magnitude);
    false
}

fn apply_constant_force(world: &mut World, object_id: ObjectId, force: Vector) {
    if !force.is_finite() {
        log::warn!("skip non finite force on object {}", object_id);
        return;
    }
    match world.body_mut(object_id) {
        Some(element) => element.apply_force(force),
        None => log::debug!("force target {} has no body", object_id),
    }
}

/// one position based step of an inextensible rope, returns the implied tension
fn solve_rope_position(
    world: &mut World,
    rope: &Rope,
    config: &SandboxConfig,
    delta_time: FloatNum,
) -> Option<FloatNum> {
    let a = resolve_endpoint(world, &rope.a())?;
    let b = resolve_endpoint(world, &rope.b())?;

    let weight = a.inv_mass + b.inv_mass;
    if weight <= 0. {
        return None;
    }

    let delta: Vector = (a.point, b.point).into();
    let distance = delta.abs();
    if !distance.is_finite() {
        log::warn!("rope distance is not finite");
        return None;
    }

    let excess = distance - rope.length();
    if excess < -TAUT_TOLERANCE {
        return Some(0.);
    }
    let normal = delta.checked_normalize()?;

    let excess = excess.max(0.);
    // a moves toward b, b moves toward a
    translate(world, &a, normal * (excess * a.inv_mass / weight));
    translate(world, &b, -normal * (excess * b.inv_mass / weight));

    let stretching_speed = (b.velocity - a.velocity) * normal;
    if stretching_speed > 0. {
        let removed = stretching_speed * config.pbd_velocity_damping() / weight;
        add_velocity(world, &a, normal * (removed * a.inv_mass));
        add_velocity(world, &b, -normal * (removed * b.inv_mass));
    }

    Some(excess / weight / (delta_time * delta_time))
}

/// one position based step of a pulley, returns the implied tension
fn solve_pulley_position(
    world: &mut World,
    pulley: &Pulley,
    config: &SandboxConfig,
    delta_time: FloatNum,
) -> Option<FloatNum> {
    let a = resolve_endpoint(world, &pulley.a())?;
    let b = resolve_endpoint(world, &pulley.b())?;

    let weight = a.inv_mass + b.inv_mass;
    if weight <= 0. {
        return None;
    }

    let segment_a: Vector = (a.point, *pulley.pulley_a()).into();
    let segment_b: Vector = (b.point, *pulley.pulley_b()).into();
    let total_length = segment_a.abs() + segment_b.abs();
    if !total_length.is_finite() {
        log::warn!("pulley length is not finite");
        return None;
    }

    let excess = total_length - pulley.length();
    if excess < -TAUT_TOLERANCE {
        return Some(0.);
    }
    let excess = excess.max(0.);

    // each side is pulled toward its own pulley point
    let (Some(normal_a), Some(normal_b)) =
        (segment_a.checked_normalize(), segment_b.checked_normalize())
    else {
        return None;
    };

    let lambda = excess / weight;
    translate(world, &a, normal_a * (lambda * a.inv_mass));
    translate(world, &b, normal_b * (lambda * b.inv_mass));

    let lengthening_speed = -(a.velocity * normal_a) - (b.velocity * normal_b);
    if lengthening_speed > 0. {
        let removed = lengthening_speed * config.pbd_velocity_damping() / weight;
        add_velocity(world, &a, normal_a * (removed * a.inv_mass));
        add_velocity(world, &b, normal_b * (removed * b.inv_mass));
    }

    Some(lambda / (delta_time * delta_time))
}

/// run every connector once for this tick, returns the ropes and pulleys that broke
pub(crate) fn solve(
    world: &mut World,
    constraints: &BTreeMap<ConstraintId, Constraint>,
    config: &SandboxConfig,
    delta_time: FloatNum,
) -> Vec<ConstraintId> {
    let mut broken = Vec::new();

    for (id, constraint) in constraints {
        match constraint.kind() {
            ConstraintKind::Spring(spring) => apply_spring(world, spring, config),
            ConstraintKind::Rope(rope) if rope.is_elastic() => {
                if apply_elastic_rope(world, rope, config) {
                    broken.push(*id);
                }
            }
            ConstraintKind::Force(force) => {
                apply_constant_force(world, force.body(), *force.force())
            }
            _ => {}
        }
    }

    for iteration in 0..config.pbd_iterations() {
        for (id, constraint) in constraints {
            if broken.contains(id) {
                continue;
            }

            let (tension, max_force) = match constraint.kind() {
                ConstraintKind::Rope(rope) if !rope.is_elastic() => (
                    solve_rope_position(world, rope, config, delta_time),
                    rope.max_force(),
                ),
                ConstraintKind::Pulley(pulley) => (
                    solve_pulley_position(world, pulley, config, delta_time),
                    pulley.max_force(),
                ),
                _ => continue,
            };

            // later iterations only see what the first one left over
            if iteration != 0 {
                continue;
            }

            if let (Some(tension), Some(max_force)) = (tension, max_force) {
                if tension > max_force {
                    log::trace!("constraint {} tension {} over {}", id, tension, max_force);
                    broken.push(*id);
                }
            }
        }
    }

    broken
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::{
        config::SandboxConfigBuilder,
        constraint::{PulleyOptionsBuilder, RopeOptionsBuilder, SpringOptions},
        object::{ObjectDescriptor, ObjectKind, SceneObject},
        projection::ViewMode,
    };

    fn insert_box(world: &mut World, id: ObjectId, mass: FloatNum, x: FloatNum, y: FloatNum) {
        let object = SceneObject::new(
            id,
            ObjectDescriptor::new(ObjectKind::Box)
                .position(x, y)
                .size(10., 10.)
                .mass(mass),
        );
        world.insert(&object, ViewMode::Side, &Default::default());
    }

    fn world_with_box(mass: FloatNum, x: FloatNum, y: FloatNum) -> World {
        let mut world = World::default();
        insert_box(&mut world, 1, mass, x, y);
        world
    }

    fn spring_velocity_after_tick(
        world: &mut World,
        spring: Spring,
        config: &SandboxConfig,
    ) -> Vector {
        solve(
            world,
            &constraints(ConstraintKind::Spring(spring)),
            config,
            1. / 60.,
        );
        world.tick(1. / 60., &mut ());
        *world.body(1).unwrap().meta().velocity()
    }

    fn constraints(kind: ConstraintKind) -> BTreeMap<ConstraintId, Constraint> {
        BTreeMap::from([(1, Constraint::new(1, kind))])
    }

    #[test]
    fn test_rope_pulls_body_back_to_length() {
        let mut world = world_with_box(1., 150., 0.);
        let rope = Rope::new(
            Endpoint::fixed((0., 0.)),
            Endpoint::body(1),
            100.,
            Default::default(),
        );

        let broken = solve(
            &mut world,
            &constraints(ConstraintKind::Rope(rope)),
            &Default::default(),
            1. / 60.,
        );

        assert!(broken.is_empty());
        let center = world.body(1).unwrap().center_point();
        assert!((center.x() - 100.).abs() < 1e-3);
    }

    #[test]
    fn test_slack_rope_does_nothing() {
        let mut world = world_with_box(1., 50., 0.);
        let rope = Rope::new(
            Endpoint::fixed((0., 0.)),
            Endpoint::body(1),
            100.,
            Default::default(),
        );
        solve(
            &mut world,
            &constraints(ConstraintKind::Rope(rope)),
            &Default::default(),
            1. / 60.,
        );
        assert!((world.body(1).unwrap().center_point().x() - 50.).abs() < 1e-4);
    }

    #[test]
    fn test_rope_breaks_over_max_force() {
        let mut world = world_with_box(1., 101., 0.);
        let rope = Rope::new(
            Endpoint::fixed((0., 0.)),
            Endpoint::body(1),
            100.,
            RopeOptionsBuilder::new().max_force(Some(100.)).build(),
        );

        // 1 unit over in one tick implies 3600 of tension
        let broken = solve(
            &mut world,
            &constraints(ConstraintKind::Rope(rope)),
            &Default::default(),
            1. / 60.,
        );
        assert_eq!(broken, vec![1]);
    }

    #[test]
    fn test_missing_body_is_skipped() {
        let mut world = World::default();
        let rope = Rope::new(
            Endpoint::fixed((0., 0.)),
            Endpoint::body(42),
            1.,
            RopeOptionsBuilder::new().max_force(Some(1.)).build(),
        );
        let broken = solve(
            &mut world,
            &constraints(ConstraintKind::Rope(rope)),
            &Default::default(),
            1. / 60.,
        );
        assert!(broken.is_empty());
    }

    #[test]
    fn test_spring_accumulates_force_toward_rest_length() {
        let mut world = world_with_box(1., 200., 0.);
        let spring = Spring::new(
            Endpoint::fixed((0., 0.)),
            Endpoint::body(1),
            100.,
            SpringOptions::default(),
        );
        solve(
            &mut world,
            &constraints(ConstraintKind::Spring(spring)),
            &Default::default(),
            1. / 60.,
        );

        world.tick(1. / 60., &mut ());

        // stretched by 100, pulled back toward the fixed end
        let velocity = *world.body(1).unwrap().meta().velocity();
        assert!(velocity.x() < 0.);
    }

    #[test]
    fn test_spring_skips_anchors_that_nearly_touch() {
        let mut world = world_with_box(1., 0.05, 0.);
        let spring = Spring::new(
            Endpoint::fixed((0., 0.)),
            Endpoint::body(1),
            100.,
            SpringOptions::default(),
        );
        let velocity = spring_velocity_after_tick(&mut world, spring, &Default::default());
        assert_eq!(velocity.x(), 0.);
    }

    #[test]
    fn test_spring_force_over_limit_is_discarded() {
        let config = SandboxConfigBuilder::new().max_spring_force(10.).build();
        let mut world = world_with_box(1., 200., 0.);
        let spring = Spring::new(
            Endpoint::fixed((0., 0.)),
            Endpoint::body(1),
            100.,
            SpringOptions::default(),
        );

        // 2000 wanted, nothing applied rather than 10
        let velocity = spring_velocity_after_tick(&mut world, spring, &config);
        assert_eq!(velocity.x(), 0.);
    }

    #[test]
    fn test_elastic_rope_breaks_over_max_force() {
        let options = |max_force| {
            RopeOptionsBuilder::new()
                .is_elastic(true)
                .max_force(Some(max_force))
                .build()
        };

        // stretched by 100 with stiffness 20 pulls with 2000
        let cases: [(FloatNum, Vec<ConstraintId>); 2] = [(100., vec![1]), (5000., vec![])];
        for (max_force, expect) in cases {
            let mut world = world_with_box(1., 200., 0.);
            let rope = Rope::new(
                Endpoint::fixed((0., 0.)),
                Endpoint::body(1),
                100.,
                options(max_force),
            );
            let broken = solve(
                &mut world,
                &constraints(ConstraintKind::Rope(rope)),
                &Default::default(),
                1. / 60.,
            );
            assert_eq!(broken, expect);
        }
    }

    #[test]
    fn test_pulley_breaks_over_max_force() {
        let cases: [(FloatNum, Vec<ConstraintId>); 2] = [(100., vec![1]), (1e5, vec![])];
        for (max_force, expect) in cases {
            let mut world = World::default();
            insert_box(&mut world, 1, 1., 0., 101.);
            insert_box(&mut world, 2, 1., 100., 100.);
            let pulley = Pulley::new(
                Endpoint::body(1),
                Endpoint::body(2),
                ((0., 0.).into(), (100., 0.).into()),
                200.,
                PulleyOptionsBuilder::new().max_force(Some(max_force)).build(),
            );

            // 1 unit over shared by both sides implies 1800 of tension
            let broken = solve(
                &mut world,
                &constraints(ConstraintKind::Pulley(pulley)),
                &Default::default(),
                1. / 60.,
            );
            assert_eq!(broken, expect);
        }
    }
}
