use super::{point::Point, vector::Vector, FloatNum, EPSILON};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Segment {
    start_point: Point,
    end_point: Point,
}

impl Segment {
    pub fn new(start_point: Point, end_point: Point) -> Self {
        Self {
            start_point,
            end_point,
        }
    }

    #[inline]
    pub fn start_point(&self) -> &Point {
        &self.start_point
    }

    #[inline]
    pub fn end_point(&self) -> &Point {
        &self.end_point
    }

    #[inline]
    pub fn to_vector(&self) -> Vector {
        self.into()
    }

    #[inline]
    pub fn length(&self) -> FloatNum {
        self.to_vector().abs()
    }

    /// intersection point of two segments, endpoints included; parallel segments never intersect
    pub fn intersect(&self, other: &Segment) -> Option<Point> {
        let r = self.to_vector();
        let s = other.to_vector();
        let denominator = r ^ s;
        if denominator.abs() < EPSILON {
            return None;
        }

        let start_diff: Vector = (self.start_point, other.start_point).into();
        let t = (start_diff ^ s) / denominator;
        let u = (start_diff ^ r) / denominator;

        const TOLERANCE: FloatNum = 1e-5;
        let range = -TOLERANCE..=1. + TOLERANCE;
        if range.contains(&t) && range.contains(&u) {
            Some(self.start_point + r * t)
        } else {
            None
        }
    }

    pub fn closest_point(&self, point: &Point) -> Point {
        let v = self.to_vector();
        let length_squared = v.abs_squared();
        if length_squared < EPSILON {
            return self.start_point;
        }
        let t = (Vector::from((self.start_point, *point)) * v) / length_squared;
        self.start_point + v * t.clamp(0., 1.)
    }

    #[inline]
    pub fn distance_to_point(&self, point: &Point) -> FloatNum {
        self.closest_point(point).distance(point)
    }
}

impl From<(Point, Point)> for Segment {
    fn from((start_point, end_point): (Point, Point)) -> Self {
        Segment {
            start_point,
            end_point,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_crossing_segments() {
        let a: Segment = ((0., 0.).into(), (10., 10.).into()).into();
        let b: Segment = ((0., 10.).into(), (10., 0.).into()).into();
        let p = a.intersect(&b).unwrap();
        assert!((p.x() - 5.).abs() < 1e-4 && (p.y() - 5.).abs() < 1e-4);
    }

    #[test]
    fn test_disjoint_and_parallel_segments() {
        let a: Segment = ((0., 0.).into(), (10., 0.).into()).into();
        let b: Segment = ((0., 1.).into(), (10., 1.).into()).into();
        assert!(a.intersect(&b).is_none());

        let c: Segment = ((20., -5.).into(), (20., 5.).into()).into();
        assert!(a.intersect(&c).is_none());
    }

    #[test]
    fn test_closest_point() {
        let a: Segment = ((0., 0.).into(), (10., 0.).into()).into();
        assert_eq!(a.closest_point(&(5., 3.).into()), (5., 0.).into());
        assert_eq!(a.closest_point(&(-5., 3.).into()), (0., 0.).into());
        assert!((a.distance_to_point(&(12., 0.).into()) - 2.).abs() < 1e-6);
    }
}
