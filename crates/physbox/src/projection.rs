//! mapping between scene objects and engine bodies for the active view

use physbox_engine::{
    element::{Element, ShapeTraitUnion},
    math::{point::Point, vector::Vector, FloatNum, EPSILON},
    meta::MetaBuilder,
    shape::{Circle, ConvexPolygon, Rect, RegularPolygon},
};
use serde::{Deserialize, Serialize};

use crate::{
    config::SandboxConfig,
    geometry,
    object::{ObjectId, ObjectKind, SceneObject},
};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum ViewMode {
    /// x horizontal, y vertical, gravity along y
    #[default]
    Side,
    /// x horizontal, z vertical, looking down
    Top,
}

/// displacement from the bounding box center to the center of mass, before rotation
pub fn centroid_offset(kind: ObjectKind, width: FloatNum, height: FloatNum) -> Vector {
    match kind {
        ObjectKind::Incline => (width / 6., height / 6.).into(),
        ObjectKind::Cone => (0., height / 6.).into(),
        // a box no wider than it is tall is outlined as a triangle
        ObjectKind::Trapezoid if geometry::trapezoid_is_triangle(width, height) => {
            (0., height / 6.).into()
        }
        ObjectKind::Trapezoid => (0., height * height / (6. * (2. * width - height))).into(),
        _ => Vector::default(),
    }
}

fn body_offset(object: &SceneObject, view: ViewMode) -> Vector {
    if view == ViewMode::Top || object.custom_vertices().is_some() || object.is_point_mass() {
        return Vector::default();
    }
    let (width, height) = object.view_size(view);
    centroid_offset(object.kind(), width, height)
}

fn polygon(vertices: Vec<Point>) -> Option<Box<dyn ShapeTraitUnion>> {
    if geometry::polygon_centroid(&vertices).is_none() {
        return None;
    }
    Some(ConvexPolygon::new(vertices).into())
}

// outline around the origin, which stands for the bounding box center
fn body_shape(
    object: &SceneObject,
    view: ViewMode,
    config: &SandboxConfig,
) -> Option<Box<dyn ShapeTraitUnion>> {
    let origin = Point::new(0., 0.);

    if object.kind() == ObjectKind::Text {
        return None;
    }

    if object.is_point_mass() {
        return Some(Circle::new(origin, config.point_mass_radius()).into());
    }

    let (width, height) = object.view_size(view);
    if !(width.is_finite() && height.is_finite() && width > 0. && height > 0.) {
        log::debug!("object {} has no usable size {}x{}", object.id(), width, height);
        return None;
    }

    if let Some(vertices) = object.custom_vertices() {
        return match view {
            ViewMode::Side => polygon(vertices.clone()),
            ViewMode::Top => Some(Rect::new(origin, width, height).into()),
        };
    }

    let is_round = (width - height).abs() < EPSILON;

    match (object.kind(), view) {
        (
            ObjectKind::Box | ObjectKind::Ground | ObjectKind::Wall | ObjectKind::Conveyor,
            _,
        )
        | (ObjectKind::Incline | ObjectKind::Trapezoid, ViewMode::Top) => {
            Some(Rect::new(origin, width, height).into())
        }
        (ObjectKind::Circle | ObjectKind::Cone, ViewMode::Top) | (ObjectKind::Circle, _)
            if is_round =>
        {
            Some(Circle::new(origin, width * 0.5).into())
        }
        (ObjectKind::Circle | ObjectKind::Cone, ViewMode::Top) | (ObjectKind::Circle, _) => {
            polygon(geometry::ellipse(width, height, config.ellipse_segments()))
        }
        (ObjectKind::Incline, ViewMode::Side) => {
            polygon(geometry::right_triangle(width, height))
        }
        (ObjectKind::Cone, ViewMode::Side) => {
            polygon(geometry::isosceles_triangle(width, height))
        }
        (ObjectKind::Trapezoid, ViewMode::Side) => polygon(geometry::trapezoid(width, height)),
        (ObjectKind::Polygon, _) => Some(
            RegularPolygon::new(origin, object.sides() as usize, width.min(height) * 0.5).into(),
        ),
        (ObjectKind::Capsule, _) => polygon(geometry::rounded_rect(
            width,
            height,
            config.capsule_corner_segments(),
        )),
        (ObjectKind::Text, _) => None,
    }
}

fn body_meta(object: &SceneObject) -> MetaBuilder {
    MetaBuilder::new()
        .mass(object.mass())
        .is_fixed(object.is_static())
        .factor_friction(object.friction())
        .factor_static_friction(object.friction_static())
        .friction_air(object.friction_air())
        .factor_restitution(object.restitution())
        .is_transparent(object.is_point_mass())
}

/// create the body of an object for the view, `None` when the object has no body there
pub fn project(
    object: &SceneObject,
    view: ViewMode,
    config: &SandboxConfig,
) -> Option<Element<ObjectId>> {
    let shape = body_shape(object, view, config)?;
    let mut element = Element::new(shape, body_meta(object), object.id());
    apply_pose(object, &mut element, view);
    Some(element)
}

/// place the body so its bounding box center lands on the object's view position
pub fn apply_pose(object: &SceneObject, element: &mut Element<ObjectId>, view: ViewMode) {
    let angle = object.view_angle(view);
    let center = object.view_position(view) + body_offset(object, view).rotate(angle);
    element.set_angle(angle);
    element.set_position(center);
}

/// copy material properties without touching pose or geometry
pub fn apply_material(object: &SceneObject, element: &mut Element<ObjectId>) {
    let meta = element.meta_mut();
    *meta.is_fixed_mut() = object.is_static();
    *meta.factor_friction_mut() = object.friction();
    *meta.factor_static_friction_mut() = object.friction_static();
    *meta.friction_air_mut() = object.friction_air();
    *meta.factor_restitution_mut() = object.restitution();
    *meta.is_transparent_mut() = object.is_point_mass();
    if object.is_static() {
        *meta.velocity_mut() = Vector::default();
        *meta.angle_velocity_mut() = 0.;
    }
    element.set_mass(object.mass());
}

/// bounding box center of the body in view coordinates
pub fn resolved_position(object: &SceneObject, element: &Element<ObjectId>, view: ViewMode) -> Point {
    element.center_point() - body_offset(object, view).rotate(element.angle())
}

/// write the body pose back into the object's fields of this view
pub fn unproject(object: &mut SceneObject, element: &Element<ObjectId>, view: ViewMode) {
    let angle = element.angle();
    let position = resolved_position(object, element, view);
    if !(position.is_finite() && angle.is_finite()) {
        log::warn!("body of object {} is not finite, keep scene data", object.id());
        return;
    }
    object.set_view_pose(view, position, angle);
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::object::ObjectDescriptor;
    use rand::Rng;

    fn object(kind: ObjectKind) -> SceneObject {
        SceneObject::new(1, ObjectDescriptor::new(kind).position(120., -40.))
    }

    #[test]
    fn test_centroid_offset_table() {
        assert_eq!(centroid_offset(ObjectKind::Incline, 60., 30.), Vector::new(10., 5.));
        assert_eq!(centroid_offset(ObjectKind::Cone, 60., 30.), Vector::new(0., 5.));
        assert_eq!(centroid_offset(ObjectKind::Trapezoid, 10., 30.), Vector::new(0., 5.));
        assert_eq!(centroid_offset(ObjectKind::Trapezoid, 30., 30.), Vector::new(0., 5.));
        assert_eq!(centroid_offset(ObjectKind::Box, 60., 30.), Vector::default());
    }

    #[test]
    fn test_body_center_is_center_of_mass() {
        let incline = object(ObjectKind::Incline);
        let element = project(&incline, ViewMode::Side, &Default::default()).unwrap();
        let (w, h) = incline.view_size(ViewMode::Side);
        let expect = Point::new(120. + w / 6., -40. + h / 6.);
        assert!(element.center_point().distance(&expect) < 1e-3);

        // footprint in top view is a plain rectangle
        let element = project(&incline, ViewMode::Top, &Default::default()).unwrap();
        assert!(element.center_point().distance(&(120., 0.).into()) < 1e-3);
    }

    #[test]
    fn test_trapezoid_outline_is_centered_on_position() {
        let config = SandboxConfig::default();
        for (width, height) in [(80., 40.), (40., 70.), (30., 70.), (50., 50.)] {
            let object = SceneObject::new(
                1,
                ObjectDescriptor::new(ObjectKind::Trapezoid)
                    .position(0., 0.)
                    .size(width, height),
            );
            let element = project(&object, ViewMode::Side, &config).unwrap();
            let (min, max) = element.aabb();
            let center = Point::new((min.x() + max.x()) * 0.5, (min.y() + max.y()) * 0.5);
            assert!(
                center.distance(&(0., 0.).into()) < 1e-3,
                "{}x{} centered at {}",
                width,
                height,
                center
            );
        }
    }

    #[test]
    fn test_cone_footprint_uses_depth() {
        let mut descriptor = ObjectDescriptor::new(ObjectKind::Cone).size(60., 40.);
        descriptor.depth = Some(30.);
        let cone = SceneObject::new(1, descriptor);
        let element = project(&cone, ViewMode::Top, &Default::default()).unwrap();
        let (min, max) = element.aabb();
        assert!((max.x() - min.x() - 60.).abs() < 1e-3);
        assert!((max.y() - min.y() - 30.).abs() < 1e-3);
    }

    #[test]
    fn test_every_kind_round_trips() {
        use ObjectKind::*;
        let config = SandboxConfig::default();
        let mut rng = rand::thread_rng();

        for kind in [
            Box, Circle, Incline, Polygon, Cone, Trapezoid, Capsule, Ground, Wall, Conveyor,
        ] {
            for view in [ViewMode::Side, ViewMode::Top] {
                let mut descriptor = ObjectDescriptor::new(kind)
                    .position(rng.gen_range(-500. ..500.), rng.gen_range(-500. ..500.))
                    .size(rng.gen_range(10. ..200.), rng.gen_range(10. ..200.));
                descriptor.z = Some(rng.gen_range(-500. ..500.));
                descriptor.angle = Some(rng.gen_range(-3. ..3.));
                descriptor.angle_top = Some(rng.gen_range(-3. ..3.));
                let origin = SceneObject::new(1, descriptor);

                let mut object = origin.clone();
                let element = project(&object, view, &config).unwrap();
                unproject(&mut object, &element, view);

                let moved = origin.view_position(view).distance(&object.view_position(view));
                assert!(moved < 0.5, "{:?} in {:?} moved {}", kind, view, moved);
                assert!((origin.view_angle(view) - object.view_angle(view)).abs() < 1e-4);
            }
        }
    }

    #[test]
    fn test_text_has_no_body() {
        let text = object(ObjectKind::Text);
        assert!(project(&text, ViewMode::Side, &Default::default()).is_none());
    }

    #[test]
    fn test_point_mass_keeps_full_mass() {
        let mut descriptor = ObjectDescriptor::new(ObjectKind::Box).mass(7.);
        descriptor.is_point_mass = Some(true);
        let object = SceneObject::new(1, descriptor);
        let element = project(&object, ViewMode::Side, &Default::default()).unwrap();
        assert_eq!(element.meta().mass(), 7.);
        assert!(element.meta().is_transparent());
    }
}
