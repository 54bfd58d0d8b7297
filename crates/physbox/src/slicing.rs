use physbox_engine::math::{point::Point, segment::Segment, vector::Vector, FloatNum};

use crate::{
    geometry,
    object::{ObjectDescriptor, ObjectId, ObjectKind, SceneObject},
};

/// one half of a cut outline, vertices are relative to the centroid
#[derive(Clone, Debug, PartialEq)]
pub(crate) struct Piece {
    pub(crate) centroid: Point,
    pub(crate) vertices: Vec<Point>,
}

/// circles have no outline to cut, static and already cut bodies are left alone
pub(crate) fn is_sliceable(object: &SceneObject) -> bool {
    !object.is_static()
        && !object.is_point_mass()
        && object.custom_vertices().is_none()
        && !matches!(object.kind(), ObjectKind::Circle | ObjectKind::Text)
}

/// split a world space outline, each piece is pushed away from the cut by half the separation
pub(crate) fn split(
    world_vertices: &[Point],
    segment: &Segment,
    separation: FloatNum,
) -> Option<[Piece; 2]> {
    let (first, second) = geometry::split_outline(world_vertices, segment)?;
    let normal = (!segment.to_vector()).checked_normalize()?;

    let piece = |outline: Vec<Point>| -> Option<Piece> {
        let centroid = geometry::polygon_centroid(&outline)?;
        let side = Vector::from((*segment.start_point(), centroid)) * normal;
        let push = (if side >= 0. { normal } else { -normal }) * (separation * 0.5);

        let relative = -centroid.to_vector();
        Some(Piece {
            centroid: centroid + push,
            vertices: geometry::offset_points(&outline, &relative),
        })
    };

    Some([piece(first)?, piece(second)?])
}

/// a generic polygon inheriting material and depth, carrying half of the mass
pub(crate) fn piece_object(id: ObjectId, origin: &SceneObject, piece: Piece) -> SceneObject {
    let (width, height) = geometry::bounding_size(&piece.vertices);

    let mut descriptor = ObjectDescriptor::new(ObjectKind::Polygon)
        .position(piece.centroid.x(), piece.centroid.y())
        .size(width, height)
        .mass(origin.mass() * 0.5)
        .is_static(false)
        .friction(origin.friction());
    descriptor.z = Some(origin.z());
    descriptor.angle_top = Some(origin.angle_top());
    descriptor.depth = Some(origin.depth());
    descriptor.friction_static = Some(origin.friction_static());
    descriptor.friction_air = Some(origin.friction_air());
    descriptor.restitution = Some(origin.restitution());
    descriptor.color = Some(origin.color().clone());
    descriptor.custom_vertices = Some(piece.vertices);

    SceneObject::new(id, descriptor)
}

#[cfg(test)]
mod tests {
    use super::*;
    use physbox_engine::shape::utils::compute_area_of_convex;

    fn square() -> Vec<Point> {
        vec![
            (90., -10.).into(),
            (110., -10.).into(),
            (110., 10.).into(),
            (90., 10.).into(),
        ]
    }

    #[test]
    fn test_pieces_are_centered_and_pushed_apart() {
        let cut = Segment::new((100., -50.).into(), (100., 50.).into());
        let [a, b] = split(&square(), &cut, 2.).unwrap();

        for piece in [&a, &b] {
            let centroid = geometry::polygon_centroid(&piece.vertices).unwrap();
            assert!(centroid.to_vector().abs() < 1e-3);
            assert!((compute_area_of_convex(&piece.vertices) - 200.).abs() < 1e-2);
        }

        // 5 from the cut plus half of the separation
        let gap = (a.centroid.x() - b.centroid.x()).abs();
        assert!((gap - 12.).abs() < 1e-3);
    }

    #[test]
    fn test_piece_object_halves_mass() {
        let origin = SceneObject::new(
            3,
            ObjectDescriptor::new(ObjectKind::Box)
                .position(100., 0.)
                .size(20., 20.)
                .mass(4.),
        );
        let cut = Segment::new((100., -50.).into(), (100., 50.).into());
        let [a, _] = split(&square(), &cut, 0.).unwrap();

        let piece = piece_object(9, &origin, a);
        assert_eq!(piece.kind(), ObjectKind::Polygon);
        assert_eq!(piece.mass(), 2.);
        assert_eq!(piece.width(), 10.);
        assert_eq!(piece.depth(), origin.depth());
        assert!(piece.custom_vertices().is_some());
    }

    #[test]
    fn test_sliceable_kinds() {
        let boxed = SceneObject::new(1, ObjectDescriptor::new(ObjectKind::Box));
        assert!(is_sliceable(&boxed));

        let circle = SceneObject::new(2, ObjectDescriptor::new(ObjectKind::Circle));
        assert!(!is_sliceable(&circle));

        let ground = SceneObject::new(3, ObjectDescriptor::new(ObjectKind::Ground));
        assert!(!is_sliceable(&ground));
    }
}
