use physbox_engine::math::{point::Point, vector::Vector, FloatNum};
use physbox_macro_tools::{Builder, Fields};
use serde::{Deserialize, Serialize};

use crate::object::ObjectId;

pub type ConstraintId = u32;

/// where a connector is attached
#[derive(Clone, Copy, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum Endpoint {
    /// offset is relative to the body's center of mass, in body space
    Body {
        id: ObjectId,
        #[serde(default)]
        offset: Vector,
    },
    Fixed { point: Point },
}

impl Endpoint {
    pub fn body(id: ObjectId) -> Self {
        Endpoint::Body {
            id,
            offset: Default::default(),
        }
    }

    pub fn body_at(id: ObjectId, offset: impl Into<Vector>) -> Self {
        Endpoint::Body {
            id,
            offset: offset.into(),
        }
    }

    pub fn fixed(point: impl Into<Point>) -> Self {
        Endpoint::Fixed {
            point: point.into(),
        }
    }

    pub fn object_id(&self) -> Option<ObjectId> {
        match self {
            Endpoint::Body { id, .. } => Some(*id),
            Endpoint::Fixed { .. } => None,
        }
    }
}

#[derive(Clone, Debug, PartialEq, Fields, Serialize, Deserialize)]
#[r]
#[serde(rename_all = "camelCase")]
pub struct Rope {
    #[r(copy)]
    a: Endpoint,
    #[r(copy)]
    b: Endpoint,
    length: FloatNum,
    #[serde(default)]
    #[r(copy)]
    max_force: Option<FloatNum>,
    #[serde(default)]
    is_elastic: bool,
    // only read when elastic
    #[serde(default)]
    stiffness: FloatNum,
    #[serde(default)]
    damping: FloatNum,
    // inertia of the rope itself is not simulated yet
    #[serde(default)]
    is_light: bool,
    #[serde(default)]
    mass: FloatNum,
}

#[derive(Clone, Debug, PartialEq, Fields, Serialize, Deserialize)]
#[r]
#[serde(rename_all = "camelCase")]
pub struct Spring {
    #[r(copy)]
    a: Endpoint,
    #[r(copy)]
    b: Endpoint,
    length: FloatNum,
    stiffness: FloatNum,
    damping: FloatNum,
}

/// two rope segments sharing one length through two fixed pulley points
#[derive(Clone, Debug, PartialEq, Fields, Serialize, Deserialize)]
#[r]
#[serde(rename_all = "camelCase")]
pub struct Pulley {
    #[r(copy)]
    a: Endpoint,
    #[r(copy)]
    b: Endpoint,
    pulley_a: Point,
    pulley_b: Point,
    length: FloatNum,
    #[serde(default)]
    #[r(copy)]
    max_force: Option<FloatNum>,
    #[serde(default)]
    is_light: bool,
    #[serde(default)]
    mass: FloatNum,
}

#[derive(Clone, Debug, PartialEq, Fields, Serialize, Deserialize)]
#[r]
#[serde(rename_all = "camelCase")]
pub struct FrictionOverride {
    body_a: ObjectId,
    body_b: ObjectId,
    friction: FloatNum,
}

#[derive(Clone, Debug, PartialEq, Fields, Serialize, Deserialize)]
#[r]
#[serde(rename_all = "camelCase")]
pub struct ConstantForce {
    body: ObjectId,
    force: Vector,
}

#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
pub enum ConstraintKind {
    Rope(Rope),
    Spring(Spring),
    Pulley(Pulley),
    Friction(FrictionOverride),
    Force(ConstantForce),
}

#[derive(Clone, Debug, PartialEq, Fields, Serialize, Deserialize)]
#[r]
pub struct Constraint {
    id: ConstraintId,
    #[serde(flatten)]
    kind: ConstraintKind,
}

#[derive(Clone, Debug, Builder, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct RopeOptions {
    // current anchor distance when unset
    pub length: Option<FloatNum>,
    pub max_force: Option<FloatNum>,
    pub is_elastic: bool,
    #[default = 20.]
    pub stiffness: FloatNum,
    #[default = 2.]
    pub damping: FloatNum,
    #[default = true]
    pub is_light: bool,
    pub mass: FloatNum,
}

#[derive(Clone, Debug, Builder, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct SpringOptions {
    pub length: Option<FloatNum>,
    #[default = 20.]
    pub stiffness: FloatNum,
    #[default = 2.]
    pub damping: FloatNum,
}

#[derive(Clone, Debug, Builder, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct PulleyOptions {
    // sum of both current segment lengths when unset
    pub length: Option<FloatNum>,
    pub max_force: Option<FloatNum>,
    #[default = true]
    pub is_light: bool,
    pub mass: FloatNum,
}

/// partial update, fields a kind does not have are ignored
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ConstraintPatch {
    pub length: Option<FloatNum>,
    pub stiffness: Option<FloatNum>,
    pub damping: Option<FloatNum>,
    // non positive removes the limit
    pub max_force: Option<FloatNum>,
    pub is_elastic: Option<bool>,
    pub friction: Option<FloatNum>,
    pub force: Option<Vector>,
}

fn normalize_max_force(max_force: Option<FloatNum>) -> Option<FloatNum> {
    max_force.filter(|value| value.is_finite() && *value > 0.)
}

impl Rope {
    pub(crate) fn new(a: Endpoint, b: Endpoint, length: FloatNum, options: RopeOptions) -> Self {
        Self {
            a,
            b,
            length: length.max(0.),
            max_force: normalize_max_force(options.max_force),
            is_elastic: options.is_elastic,
            stiffness: options.stiffness.max(0.),
            damping: options.damping.max(0.),
            is_light: options.is_light,
            mass: options.mass.max(0.),
        }
    }
}

impl Spring {
    pub(crate) fn new(a: Endpoint, b: Endpoint, length: FloatNum, options: SpringOptions) -> Self {
        Self {
            a,
            b,
            length: length.max(0.),
            stiffness: options.stiffness.max(0.),
            damping: options.damping.max(0.),
        }
    }
}

impl Pulley {
    pub(crate) fn new(
        a: Endpoint,
        b: Endpoint,
        (pulley_a, pulley_b): (Point, Point),
        length: FloatNum,
        options: PulleyOptions,
    ) -> Self {
        Self {
            a,
            b,
            pulley_a,
            pulley_b,
            length: length.max(0.),
            max_force: normalize_max_force(options.max_force),
            is_light: options.is_light,
            mass: options.mass.max(0.),
        }
    }
}

impl FrictionOverride {
    pub(crate) fn new(body_a: ObjectId, body_b: ObjectId, friction: FloatNum) -> Self {
        Self {
            body_a,
            body_b,
            friction: friction.max(0.),
        }
    }

    pub fn matches(&self, a: ObjectId, b: ObjectId) -> bool {
        (self.body_a == a && self.body_b == b) || (self.body_a == b && self.body_b == a)
    }
}

impl ConstantForce {
    pub(crate) fn new(body: ObjectId, force: Vector) -> Self {
        Self { body, force }
    }
}

fn assign<T: PartialEq + Copy>(target: &mut T, value: Option<T>) -> bool {
    match value {
        Some(value) if *target != value => {
            *target = value;
            true
        }
        _ => false,
    }
}

impl Constraint {
    pub(crate) fn new(id: ConstraintId, kind: ConstraintKind) -> Self {
        Self { id, kind }
    }

    /// every scene object this constraint needs to stay meaningful
    pub fn object_ids(&self) -> Vec<ObjectId> {
        match &self.kind {
            ConstraintKind::Rope(Rope { a, b, .. })
            | ConstraintKind::Spring(Spring { a, b, .. })
            | ConstraintKind::Pulley(Pulley { a, b, .. }) => {
                a.object_id().into_iter().chain(b.object_id()).collect()
            }
            ConstraintKind::Friction(friction) => vec![friction.body_a, friction.body_b],
            ConstraintKind::Force(force) => vec![force.body],
        }
    }

    pub fn references(&self, object_id: ObjectId) -> bool {
        self.object_ids().contains(&object_id)
    }

    pub(crate) fn apply_patch(&mut self, patch: &ConstraintPatch) -> bool {
        let length = patch.length.map(|length| length.max(0.));
        let stiffness = patch.stiffness.map(|stiffness| stiffness.max(0.));
        let damping = patch.damping.map(|damping| damping.max(0.));
        let max_force = patch.max_force.map(|max_force| normalize_max_force(Some(max_force)));

        match &mut self.kind {
            ConstraintKind::Rope(rope) => [
                assign(&mut rope.length, length),
                assign(&mut rope.stiffness, stiffness),
                assign(&mut rope.damping, damping),
                assign(&mut rope.max_force, max_force),
                assign(&mut rope.is_elastic, patch.is_elastic),
            ]
            .contains(&true),
            ConstraintKind::Spring(spring) => [
                assign(&mut spring.length, length),
                assign(&mut spring.stiffness, stiffness),
                assign(&mut spring.damping, damping),
            ]
            .contains(&true),
            ConstraintKind::Pulley(pulley) => [
                assign(&mut pulley.length, length),
                assign(&mut pulley.max_force, max_force),
            ]
            .contains(&true),
            ConstraintKind::Friction(friction) => assign(
                &mut friction.friction,
                patch.friction.map(|friction| friction.max(0.)),
            ),
            ConstraintKind::Force(force) => assign(&mut force.force, patch.force),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_object_ids() {
        let rope = Constraint::new(
            1,
            ConstraintKind::Rope(Rope::new(
                Endpoint::body(3),
                Endpoint::fixed((0., 0.)),
                10.,
                Default::default(),
            )),
        );
        assert_eq!(rope.object_ids(), vec![3]);
        assert!(rope.references(3));
        assert!(!rope.references(4));

        let friction = Constraint::new(2, ConstraintKind::Friction(FrictionOverride::new(5, 6, 1.)));
        assert!(friction.references(6));
        if let ConstraintKind::Friction(friction) = friction.kind() {
            assert!(friction.matches(6, 5));
        }
    }

    #[test]
    fn test_patch() {
        let mut spring = Constraint::new(
            1,
            ConstraintKind::Spring(Spring::new(
                Endpoint::body(1),
                Endpoint::body(2),
                50.,
                Default::default(),
            )),
        );
        assert!(!spring.apply_patch(&ConstraintPatch::default()));
        assert!(spring.apply_patch(&ConstraintPatch {
            stiffness: Some(5.),
            friction: Some(1.),
            ..Default::default()
        }));

        let ConstraintKind::Spring(inner) = spring.kind() else {
            unreachable!()
        };
        assert_eq!(inner.stiffness(), 5.);
        assert_eq!(inner.length(), 50.);

        let mut rope = Constraint::new(
            2,
            ConstraintKind::Rope(Rope::new(
                Endpoint::body(1),
                Endpoint::body(2),
                50.,
                RopeOptionsBuilder::new().max_force(Some(10.)).build(),
            )),
        );
        assert!(rope.apply_patch(&ConstraintPatch {
            max_force: Some(0.),
            ..Default::default()
        }));
        let ConstraintKind::Rope(inner) = rope.kind() else {
            unreachable!()
        };
        assert_eq!(inner.max_force(), None);
    }

    #[test]
    fn test_wire_format() {
        let constraint = Constraint::new(
            9,
            ConstraintKind::Pulley(Pulley::new(
                Endpoint::body(1),
                Endpoint::body_at(2, (0., -5.)),
                ((0., 0.).into(), (100., 0.).into()),
                600.,
                Default::default(),
            )),
        );

        let json = serde_json::to_value(&constraint).unwrap();
        assert_eq!(json["id"], 9);
        assert_eq!(json["type"], "pulley");
        assert_eq!(json["pulleyB"]["x"], 100.);
        assert_eq!(json["a"]["type"], "body");

        let back: Constraint = serde_json::from_value(json).unwrap();
        assert_eq!(back, constraint);
    }
}
