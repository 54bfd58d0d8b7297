use physbox_engine::math::{point::Point, FloatNum};
use physbox_macro_tools::Fields;
use serde::{Deserialize, Serialize};

use crate::projection::ViewMode;

pub type ObjectId = u32;

#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ObjectKind {
    Box,
    Circle,
    #[serde(alias = "triangle")]
    Incline,
    Polygon,
    Cone,
    Trapezoid,
    Capsule,
    Ground,
    Wall,
    Conveyor,
    Text,
}

impl ObjectKind {
    /// fixtures are static unless the descriptor says otherwise
    pub fn is_fixture(self) -> bool {
        matches!(
            self,
            ObjectKind::Ground | ObjectKind::Wall | ObjectKind::Conveyor | ObjectKind::Text
        )
    }

    // default (width, height, depth)
    fn default_size(self) -> (FloatNum, FloatNum, FloatNum) {
        use ObjectKind::*;
        match self {
            Box => (50., 50., 50.),
            Circle => (50., 50., 50.),
            Incline => (100., 60., 50.),
            Polygon => (60., 60., 60.),
            Cone => (50., 60., 50.),
            Trapezoid => (80., 40., 50.),
            Capsule => (80., 30., 30.),
            Ground => (800., 40., 400.),
            Wall => (30., 300., 30.),
            Conveyor => (300., 20., 60.),
            Text => (100., 20., 20.),
        }
    }
}

/// authoritative description of one placeable entity, independent of the view mode
#[derive(Clone, Debug, PartialEq, Fields, Serialize, Deserialize)]
#[r]
#[serde(rename_all = "camelCase")]
pub struct SceneObject {
    id: ObjectId,
    #[serde(rename = "type")]
    #[r(copy)]
    kind: ObjectKind,
    x: FloatNum,
    // side view vertical axis
    y: FloatNum,
    // top view vertical axis
    z: FloatNum,
    angle: FloatNum,
    angle_top: FloatNum,
    width: FloatNum,
    height: FloatNum,
    depth: FloatNum,
    radius: FloatNum,
    sides: u32,
    is_static: bool,
    friction: FloatNum,
    friction_static: FloatNum,
    friction_air: FloatNum,
    restitution: FloatNum,
    mass: FloatNum,
    color: String,
    // outline relative to the centroid, replaces the parametric size once set
    #[serde(default, skip_serializing_if = "Option::is_none")]
    custom_vertices: Option<Vec<Point>>,
    #[serde(default)]
    is_point_mass: bool,
    // belt surface speed along the conveyor's own x axis
    #[serde(default)]
    speed: FloatNum,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    text: Option<String>,
}

/// creation input, unset fields take the per kind defaults
#[derive(Clone, Debug, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ObjectDescriptor {
    #[serde(rename = "type")]
    pub kind: ObjectKind,
    #[serde(default)]
    pub x: Option<FloatNum>,
    #[serde(default)]
    pub y: Option<FloatNum>,
    #[serde(default)]
    pub z: Option<FloatNum>,
    #[serde(default)]
    pub angle: Option<FloatNum>,
    #[serde(default)]
    pub angle_top: Option<FloatNum>,
    #[serde(default)]
    pub width: Option<FloatNum>,
    #[serde(default)]
    pub height: Option<FloatNum>,
    #[serde(default)]
    pub depth: Option<FloatNum>,
    #[serde(default)]
    pub radius: Option<FloatNum>,
    #[serde(default)]
    pub sides: Option<u32>,
    #[serde(default)]
    pub is_static: Option<bool>,
    #[serde(default)]
    pub friction: Option<FloatNum>,
    #[serde(default)]
    pub friction_static: Option<FloatNum>,
    #[serde(default)]
    pub friction_air: Option<FloatNum>,
    #[serde(default)]
    pub restitution: Option<FloatNum>,
    #[serde(default)]
    pub mass: Option<FloatNum>,
    #[serde(default)]
    pub color: Option<String>,
    #[serde(default)]
    pub custom_vertices: Option<Vec<Point>>,
    #[serde(default)]
    pub is_point_mass: Option<bool>,
    #[serde(default)]
    pub speed: Option<FloatNum>,
    #[serde(default)]
    pub text: Option<String>,
}

impl ObjectDescriptor {
    pub fn new(kind: ObjectKind) -> Self {
        Self {
            kind,
            x: None,
            y: None,
            z: None,
            angle: None,
            angle_top: None,
            width: None,
            height: None,
            depth: None,
            radius: None,
            sides: None,
            is_static: None,
            friction: None,
            friction_static: None,
            friction_air: None,
            restitution: None,
            mass: None,
            color: None,
            custom_vertices: None,
            is_point_mass: None,
            speed: None,
            text: None,
        }
    }

    pub fn position(mut self, x: FloatNum, y: FloatNum) -> Self {
        self.x = Some(x);
        self.y = Some(y);
        self
    }

    pub fn size(mut self, width: FloatNum, height: FloatNum) -> Self {
        self.width = Some(width);
        self.height = Some(height);
        self
    }

    pub fn mass(mut self, mass: FloatNum) -> Self {
        self.mass = Some(mass);
        self
    }

    pub fn is_static(mut self, is_static: bool) -> Self {
        self.is_static = Some(is_static);
        self
    }

    pub fn friction(mut self, friction: FloatNum) -> Self {
        self.friction = Some(friction);
        self
    }
}

/// partial update, absent fields are left untouched
#[derive(Clone, Debug, Default, PartialEq, Serialize, Deserialize)]
#[serde(default, rename_all = "camelCase")]
pub struct ObjectPatch {
    pub x: Option<FloatNum>,
    pub y: Option<FloatNum>,
    pub z: Option<FloatNum>,
    pub angle: Option<FloatNum>,
    pub angle_top: Option<FloatNum>,
    pub width: Option<FloatNum>,
    pub height: Option<FloatNum>,
    pub depth: Option<FloatNum>,
    pub radius: Option<FloatNum>,
    pub sides: Option<u32>,
    pub is_static: Option<bool>,
    pub friction: Option<FloatNum>,
    pub friction_static: Option<FloatNum>,
    pub friction_air: Option<FloatNum>,
    pub restitution: Option<FloatNum>,
    pub mass: Option<FloatNum>,
    pub color: Option<String>,
    pub custom_vertices: Option<Vec<Point>>,
    pub is_point_mass: Option<bool>,
    pub speed: Option<FloatNum>,
    pub text: Option<String>,
}

/// what a merged patch touched
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub(crate) struct PatchEffect {
    pub(crate) pose: bool,
    pub(crate) material: bool,
    pub(crate) rebuild: bool,
}

impl PatchEffect {
    pub(crate) fn is_empty(&self) -> bool {
        !(self.pose || self.material || self.rebuild)
    }
}

// assign when different, report whether anything changed
fn merge<T: PartialEq + Clone>(target: &mut T, value: &Option<T>) -> bool {
    match value {
        Some(value) if target != value => {
            *target = value.clone();
            true
        }
        _ => false,
    }
}

impl SceneObject {
    pub fn new(id: ObjectId, descriptor: ObjectDescriptor) -> Self {
        let kind = descriptor.kind;
        let (default_width, default_height, default_depth) = kind.default_size();

        let is_round = matches!(kind, ObjectKind::Circle | ObjectKind::Polygon);
        let diameter = descriptor.radius.map(|radius| radius.abs() * 2.);

        let width = descriptor
            .width
            .or(diameter.filter(|_| is_round))
            .unwrap_or(default_width);
        let height = descriptor
            .height
            .or(diameter.filter(|_| is_round))
            .unwrap_or(if is_round { width } else { default_height });
        let depth = descriptor
            .depth
            .or(diameter.filter(|_| is_round))
            .unwrap_or(if is_round { width } else { default_depth });
        let radius = descriptor.radius.unwrap_or(width * 0.5);

        Self {
            id,
            kind,
            x: descriptor.x.unwrap_or_default(),
            y: descriptor.y.unwrap_or_default(),
            z: descriptor.z.unwrap_or_default(),
            angle: descriptor.angle.unwrap_or_default(),
            angle_top: descriptor.angle_top.unwrap_or_default(),
            width,
            height,
            depth,
            radius,
            sides: descriptor.sides.unwrap_or(5).max(3),
            is_static: descriptor.is_static.unwrap_or(kind.is_fixture()),
            friction: descriptor.friction.unwrap_or(0.1),
            friction_static: descriptor.friction_static.unwrap_or(0.5),
            friction_air: descriptor.friction_air.unwrap_or(0.01),
            restitution: descriptor.restitution.unwrap_or(0.),
            mass: descriptor.mass.unwrap_or(1.),
            color: descriptor.color.unwrap_or_else(|| "#888888".to_owned()),
            custom_vertices: descriptor.custom_vertices,
            is_point_mass: descriptor.is_point_mass.unwrap_or(false),
            speed: descriptor.speed.unwrap_or(if kind == ObjectKind::Conveyor {
                100.
            } else {
                0.
            }),
            text: descriptor.text,
        }
    }

    /// position of the bounding box center inside the given view
    pub fn view_position(&self, view: ViewMode) -> Point {
        match view {
            ViewMode::Side => (self.x, self.y).into(),
            ViewMode::Top => (self.x, self.z).into(),
        }
    }

    pub fn view_angle(&self, view: ViewMode) -> FloatNum {
        match view {
            ViewMode::Side => self.angle,
            ViewMode::Top => self.angle_top,
        }
    }

    /// (width, extent along the view's vertical axis)
    pub fn view_size(&self, view: ViewMode) -> (FloatNum, FloatNum) {
        match view {
            ViewMode::Side => (self.width, self.height),
            ViewMode::Top => (self.width, self.depth),
        }
    }

    /// write a resolved pose back, the other view's coordinates stay untouched
    pub(crate) fn set_view_pose(&mut self, view: ViewMode, position: Point, angle: FloatNum) {
        self.x = position.x();
        match view {
            ViewMode::Side => {
                self.y = position.y();
                self.angle = angle;
            }
            ViewMode::Top => {
                self.z = position.y();
                self.angle_top = angle;
            }
        }
    }

    pub(crate) fn apply_patch(&mut self, patch: &ObjectPatch) -> PatchEffect {
        let mut effect = PatchEffect::default();

        for changed in [
            merge(&mut self.x, &patch.x),
            merge(&mut self.y, &patch.y),
            merge(&mut self.z, &patch.z),
            merge(&mut self.angle, &patch.angle),
            merge(&mut self.angle_top, &patch.angle_top),
        ] {
            effect.pose |= changed;
        }

        for changed in [
            merge(&mut self.is_static, &patch.is_static),
            merge(&mut self.friction, &patch.friction),
            merge(&mut self.friction_static, &patch.friction_static),
            merge(&mut self.friction_air, &patch.friction_air),
            merge(&mut self.restitution, &patch.restitution),
            merge(&mut self.mass, &patch.mass),
            merge(&mut self.speed, &patch.speed),
            merge(&mut self.color, &patch.color),
            merge(&mut self.text, &patch.text.clone().map(Some)),
        ] {
            effect.material |= changed;
        }

        let is_round = matches!(self.kind, ObjectKind::Circle | ObjectKind::Polygon);
        if let Some(radius) = patch.radius {
            if radius != self.radius {
                self.radius = radius;
                if is_round {
                    self.width = radius * 2.;
                    self.height = radius * 2.;
                    if self.kind == ObjectKind::Circle {
                        self.depth = radius * 2.;
                    }
                }
                effect.rebuild = true;
            }
        }

        for changed in [
            merge(&mut self.width, &patch.width),
            merge(&mut self.height, &patch.height),
            merge(&mut self.depth, &patch.depth),
            merge(&mut self.sides, &patch.sides.map(|sides| sides.max(3))),
            merge(&mut self.is_point_mass, &patch.is_point_mass),
            merge(&mut self.custom_vertices, &patch.custom_vertices.clone().map(Some)),
        ] {
            effect.rebuild |= changed;
        }

        effect
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_descriptor_defaults() {
        let ground = SceneObject::new(1, ObjectDescriptor::new(ObjectKind::Ground));
        assert!(ground.is_static());
        assert_eq!(ground.width(), 800.);

        let mut descriptor = ObjectDescriptor::new(ObjectKind::Circle);
        descriptor.radius = Some(10.);
        let circle = SceneObject::new(2, descriptor);
        assert!(!circle.is_static());
        assert_eq!(circle.view_size(ViewMode::Side), (20., 20.));
        assert_eq!(circle.view_size(ViewMode::Top), (20., 20.));

        let polygon = SceneObject::new(3, ObjectDescriptor::new(ObjectKind::Polygon));
        assert_eq!(polygon.sides(), 5);
    }

    #[test]
    fn test_patch_effects() {
        let mut object = SceneObject::new(
            1,
            ObjectDescriptor::new(ObjectKind::Box).position(10., 20.),
        );
        let origin = object.clone();

        assert!(object.apply_patch(&ObjectPatch::default()).is_empty());
        assert_eq!(object, origin);

        // same value is not a change
        let effect = object.apply_patch(&ObjectPatch {
            x: Some(10.),
            ..Default::default()
        });
        assert!(effect.is_empty());

        let effect = object.apply_patch(&ObjectPatch {
            friction: Some(0.9),
            ..Default::default()
        });
        assert!(effect.material && !effect.rebuild && !effect.pose);

        let effect = object.apply_patch(&ObjectPatch {
            width: Some(80.),
            z: Some(5.),
            ..Default::default()
        });
        assert!(effect.rebuild && effect.pose);
        assert_eq!(object.width(), 80.);
        assert_eq!(object.z(), 5.);
    }

    #[test]
    fn test_view_pose_keeps_other_view() {
        let mut object = SceneObject::new(1, ObjectDescriptor::new(ObjectKind::Box));
        object.set_view_pose(ViewMode::Top, (3., 4.).into(), 0.5);
        assert_eq!(object.view_position(ViewMode::Top), Point::new(3., 4.));
        assert_eq!(object.y(), 0.);
        assert_eq!(object.angle(), 0.);
        assert_eq!(object.angle_top(), 0.5);
    }

    #[test]
    fn test_wire_names() {
        let object = SceneObject::new(7, ObjectDescriptor::new(ObjectKind::Incline));
        let json = serde_json::to_value(&object).unwrap();
        assert_eq!(json["type"], "incline");
        assert!(json.get("angleTop").is_some());
        assert!(json.get("customVertices").is_none());

        let descriptor: ObjectDescriptor =
            serde_json::from_str(r#"{"type":"triangle","isPointMass":true}"#).unwrap();
        assert_eq!(descriptor.kind, ObjectKind::Incline);
        assert_eq!(descriptor.is_point_mass, Some(true));
    }
}
