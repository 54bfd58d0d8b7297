use crate::{
    collision::Projector,
    element::ComputeMomentOfInertia,
    math::{point::Point, vector::Vector, FloatNum},
    meta::{Mass, Transform},
};

use super::{
    utils::{
        compute_area_of_convex, compute_convex_center_point, compute_moment_of_inertia_of_polygon,
        compute_signed_area, projection_polygon_on_vector, rotate_polygon,
    },
    CenterPoint, GeometryTransformer, Outline, ShapeOutline,
};

#[derive(Clone, Debug)]
pub struct ConvexPolygon {
    origin_vertices: Vec<Point>,
    vertices: Vec<Point>,
    origin_center_point: Point,
    center_point: Point,
    area: FloatNum,
}

impl ConvexPolygon {
    /// vertices may come in either winding, they are stored with positive signed area
    pub fn new(points: impl Into<Vec<Point>>) -> Self {
        let mut vertices: Vec<_> = points.into();
        if compute_signed_area(&vertices) < 0. {
            vertices.reverse();
        }
        let center_point = compute_convex_center_point(&vertices);
        let area = compute_area_of_convex(&vertices);

        Self {
            origin_vertices: vertices.clone(),
            vertices,
            origin_center_point: center_point,
            center_point,
            area,
        }
    }

    pub fn area(&self) -> FloatNum {
        self.area
    }

    pub fn edge_count(&self) -> usize {
        self.vertices.len()
    }

    pub fn vertices(&self) -> &[Point] {
        &self.vertices
    }
}

impl GeometryTransformer for ConvexPolygon {
    fn sync_transform(&mut self, transform: &Transform) {
        let translation = transform.translation();
        for (i, p) in self.origin_vertices.iter().enumerate() {
            self.vertices[i] = p + translation;
        }
        self.center_point = self.origin_center_point + translation;

        rotate_polygon(
            self.center_point,
            self.vertices.iter_mut(),
            transform.rotation(),
        );
    }
}

impl CenterPoint for ConvexPolygon {
    fn center_point(&self) -> Point {
        self.center_point
    }
}

impl Outline for ConvexPolygon {
    fn outline(&self) -> ShapeOutline<'_> {
        ShapeOutline::Polygon(&self.vertices)
    }
}

impl Projector for ConvexPolygon {
    fn projection_on_vector(&self, vector: &Vector) -> (Point, Point) {
        projection_polygon_on_vector(self.vertices.iter(), *vector)
    }
}

impl ComputeMomentOfInertia for ConvexPolygon {
    fn compute_moment_of_inertia(&self, m: Mass) -> FloatNum {
        compute_moment_of_inertia_of_polygon(&self.vertices, &self.center_point, m)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::math::pi;

    #[test]
    fn test_sync_transform_moves_and_rotates_around_center() {
        let mut polygon = ConvexPolygon::new(vec![
            (-10., -5.).into(),
            (10., -5.).into(),
            (10., 5.).into(),
            (-10., 5.).into(),
        ]);

        polygon.sync_transform(&Transform::from((Vector::new(100., 50.), pi() * 0.5)));

        assert_eq!(polygon.center_point(), (100., 50.).into());
        let (min, max) = polygon.projection_on_vector(&(1., 0.).into());
        assert!((min.x() - 95.).abs() < 1e-3);
        assert!((max.x() - 105.).abs() < 1e-3);
    }

    #[test]
    fn test_clockwise_input_is_normalized() {
        let polygon = ConvexPolygon::new(vec![
            (0., 0.).into(),
            (0., 10.).into(),
            (10., 10.).into(),
            (10., 0.).into(),
        ]);
        assert!(compute_signed_area(polygon.vertices()) > 0.);
        assert_eq!(polygon.area(), 100.);
    }
}
