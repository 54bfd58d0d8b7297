use physbox_macro_tools::Deref;

use crate::{
    element::ComputeMomentOfInertia,
    math::{pi, point::Point, tau, vector::Vector, FloatNum},
    meta::Mass,
};

use super::ConvexPolygon;

#[derive(Clone, Debug, Deref)]
pub struct RegularPolygon {
    #[deref]
    inner_polygon: ConvexPolygon,
    edge_count: usize,
    edge_angle: FloatNum,
    radius: FloatNum,
}

impl RegularPolygon {
    /// edge_count below three is raised to three
    pub fn new(center_point: impl Into<Point>, edge_count: usize, radius: FloatNum) -> Self {
        let edge_count = edge_count.max(3);
        let edge_angle = tau() * (edge_count as FloatNum).recip();
        let center_point = center_point.into();

        // even polygons get a flat bottom edge
        let start_angle = if edge_count & 1 == 0 {
            edge_angle * 0.5
        } else {
            0.
        };

        let vertices: Vec<Point> = (0..edge_count)
            .map(|i| {
                let point: Vector = (0., radius).into();
                center_point + point.rotate(start_angle + edge_angle * i as FloatNum)
            })
            .collect();

        Self {
            inner_polygon: ConvexPolygon::new(vertices),
            edge_count,
            edge_angle,
            radius,
        }
    }

    #[inline]
    pub fn edge_count(&self) -> usize {
        self.edge_count
    }

    #[inline]
    pub fn edge_angle(&self) -> FloatNum {
        self.edge_angle
    }

    #[inline]
    pub fn radius(&self) -> FloatNum {
        self.radius
    }
}

impl_shape_traits_use_deref!(RegularPolygon);

impl ComputeMomentOfInertia for RegularPolygon {
    fn compute_moment_of_inertia(&self, m: Mass) -> FloatNum {
        let radius = self.radius;

        let edge_count = self.edge_count as FloatNum;

        0.5 * m * radius.powf(2.) * (1. - (2. / 3. * (pi() * edge_count.recip()).sin().powf(2.)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::CenterPoint;

    #[test]
    fn test_regular_polygon_vertices_on_circle() {
        let polygon = RegularPolygon::new((10., 20.), 6, 5.);
        assert_eq!(polygon.vertices().len(), 6);
        for vertex in polygon.vertices() {
            assert!((vertex.distance(&(10., 20.).into()) - 5.).abs() < 1e-4);
        }
        let center = polygon.center_point();
        assert!((center.x() - 10.).abs() < 1e-4 && (center.y() - 20.).abs() < 1e-4);
    }
}
