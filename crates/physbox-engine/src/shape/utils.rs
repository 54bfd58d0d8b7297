use crate::{
    math::{point::Point, segment::Segment, vector::Vector, FloatNum},
    meta::Mass,
};

/**
 * useful tool for polygon to transform
 */

/// positive when the vertices turn from +x toward +y
pub fn compute_signed_area(vertices: &[Point]) -> FloatNum {
    let len = vertices.len();
    if len < 3 {
        return 0.;
    }
    (0..len).fold(0., |acc, i| {
        let a = vertices[i].to_vector();
        let b = vertices[(i + 1) % len].to_vector();
        acc + (a ^ b)
    }) * 0.5
}

pub fn compute_area_of_convex(vertices: &[Point]) -> FloatNum {
    compute_signed_area(vertices).abs()
}

/// area weighted centroid, falls back to the vertex average for degenerate outlines
pub fn compute_convex_center_point(vertices: &[Point]) -> Point {
    let len = vertices.len();
    if len == 0 {
        return Default::default();
    }

    let signed_area = compute_signed_area(vertices);
    if signed_area.abs() < FloatNum::EPSILON {
        return compute_polygon_approximate_center_point(vertices);
    }

    let (cx, cy) = (0..len).fold((0., 0.), |(cx, cy), i| {
        let a = vertices[i];
        let b = vertices[(i + 1) % len];
        let cross = a.to_vector() ^ b.to_vector();
        (cx + (a.x() + b.x()) * cross, cy + (a.y() + b.y()) * cross)
    });

    let factor = (6. * signed_area).recip();
    (cx * factor, cy * factor).into()
}

pub fn compute_polygon_approximate_center_point(vertices: &[Point]) -> Point {
    if vertices.is_empty() {
        return Default::default();
    }
    let sum = vertices
        .iter()
        .fold(Vector::default(), |acc, p| acc + p.to_vector());
    (sum * (vertices.len() as FloatNum).recip()).to_point()
}

// moment of inertia about the centroid for a uniform density polygon
pub fn compute_moment_of_inertia_of_polygon(
    vertices: &[Point],
    center_point: &Point,
    m: Mass,
) -> FloatNum {
    let len = vertices.len();
    let (numerator, denominator) = (0..len).fold((0., 0.), |(numerator, denominator), i| {
        let a: Vector = (center_point, &vertices[i]).into();
        let b: Vector = (center_point, &vertices[(i + 1) % len]).into();
        let cross = (a ^ b).abs();
        (
            numerator + cross * (a * a + a * b + b * b),
            denominator + cross,
        )
    });

    if denominator < FloatNum::EPSILON {
        return 0.;
    }

    m * numerator / (6. * denominator)
}

pub fn projection_polygon_on_vector<'a>(
    point_iter: impl Iterator<Item = &'a Point>,
    vector: Vector,
) -> (Point, Point) {
    let mut min = FloatNum::MAX;
    let mut min_point = (0., 0.).into();
    let mut max = FloatNum::MIN;
    let mut max_point = (0., 0.).into();
    point_iter.for_each(|&cur| {
        let size = cur.to_vector() * vector;
        if size < min {
            min = size;
            min_point = cur;
        }
        if size > max {
            max = size;
            max_point = cur;
        }
    });
    (min_point, max_point)
}

pub fn rotate_polygon<'a>(
    center_point: Point,
    point_iter_mut: impl Iterator<Item = &'a mut Point>,
    rad: FloatNum,
) {
    if rad == 0. {
        return;
    }
    point_iter_mut.for_each(|corner| {
        let mut corner_vector: Vector = (center_point, *corner).into();
        corner_vector.rotate_self(rad);
        *corner = center_point + corner_vector;
    })
}

pub fn edges(vertices: &[Point]) -> impl Iterator<Item = Segment> + '_ {
    let len = vertices.len();
    (0..len).map(move |i| (vertices[i], vertices[(i + 1) % len]).into())
}

/// works for either winding
pub fn is_point_inside_convex(vertices: &[Point], point: &Point) -> bool {
    if vertices.len() < 3 {
        return false;
    }
    let mut sign = 0.;
    for edge in edges(vertices) {
        let cross = edge.to_vector() ^ Vector::from((edge.start_point(), point));
        if cross.abs() < FloatNum::EPSILON {
            continue;
        }
        if sign == 0. {
            sign = cross.signum();
        } else if cross.signum() != sign {
            return false;
        }
    }
    true
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point> {
        vec![
            (0., 0.).into(),
            (10., 0.).into(),
            (10., 10.).into(),
            (0., 10.).into(),
        ]
    }

    #[test]
    fn test_area_and_center_point() {
        let vertices = square();
        assert_eq!(compute_area_of_convex(&vertices), 100.);
        assert_eq!(compute_convex_center_point(&vertices), (5., 5.).into());

        let mut reversed = vertices.clone();
        reversed.reverse();
        assert!(compute_signed_area(&reversed) < 0.);
        assert_eq!(compute_convex_center_point(&reversed), (5., 5.).into());
    }

    #[test]
    fn test_triangle_center_point_is_not_bounding_box_center() {
        let vertices: Vec<Point> = vec![(0., 0.).into(), (30., 0.).into(), (0., 30.).into()];
        let center = compute_convex_center_point(&vertices);
        assert!((center.x() - 10.).abs() < 1e-4);
        assert!((center.y() - 10.).abs() < 1e-4);
    }

    #[test]
    fn test_rect_moment_of_inertia() {
        let vertices = square();
        let moment = compute_moment_of_inertia_of_polygon(&vertices, &(5., 5.).into(), 12.);
        // m * (w^2 + h^2) / 12
        assert!((moment - 200.).abs() < 1e-3);
    }

    #[test]
    fn test_point_inside_convex() {
        let vertices = square();
        assert!(is_point_inside_convex(&vertices, &(5., 5.).into()));
        assert!(!is_point_inside_convex(&vertices, &(15., 5.).into()));
    }
}
