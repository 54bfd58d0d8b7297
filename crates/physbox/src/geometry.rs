//! outlines of the parametric shapes, all centered on their bounding box center

use physbox_engine::{
    math::{point::Point, segment::Segment, vector::Vector, FloatNum, EPSILON},
    shape::utils::{compute_area_of_convex, compute_convex_center_point, edges},
};

/// area weighted centroid, `None` for outlines without area
pub fn polygon_centroid(vertices: &[Point]) -> Option<Point> {
    if vertices.len() < 3 || compute_area_of_convex(vertices) < EPSILON {
        return None;
    }
    Some(compute_convex_center_point(vertices))
}

/// right angle at the bottom right corner, the slope rises toward +x
pub fn right_triangle(width: FloatNum, height: FloatNum) -> Vec<Point> {
    let (hw, hh) = (width * 0.5, height * 0.5);
    vec![(-hw, hh).into(), (hw, hh).into(), (hw, -hh).into()]
}

pub fn isosceles_triangle(width: FloatNum, height: FloatNum) -> Vec<Point> {
    let (hw, hh) = (width * 0.5, height * 0.5);
    vec![(-hw, hh).into(), (hw, hh).into(), (0., -hh).into()]
}

fn trapezoid_top_half_width(width: FloatNum, height: FloatNum) -> FloatNum {
    ((width - height) * 0.5).max(0.)
}

/// the top edge shrinks to nothing once the box is no wider than it is tall
pub fn trapezoid_is_triangle(width: FloatNum, height: FloatNum) -> bool {
    trapezoid_top_half_width(width, height) < EPSILON
}

/// bottom edge is `width`, each side is inset by half the height
pub fn trapezoid(width: FloatNum, height: FloatNum) -> Vec<Point> {
    if trapezoid_is_triangle(width, height) {
        return isosceles_triangle(width, height);
    }
    let (hw, hh) = (width * 0.5, height * 0.5);
    let top_half_width = trapezoid_top_half_width(width, height);
    vec![
        (-hw, hh).into(),
        (hw, hh).into(),
        (top_half_width, -hh).into(),
        (-top_half_width, -hh).into(),
    ]
}

pub fn ellipse(width: FloatNum, height: FloatNum, segments: u32) -> Vec<Point> {
    let segments = segments.max(8);
    let (rx, ry) = (width * 0.5, height * 0.5);
    let step = physbox_engine::math::tau() / segments as FloatNum;
    (0..segments)
        .map(|i| {
            let angle = step * i as FloatNum;
            (rx * angle.cos(), ry * angle.sin()).into()
        })
        .collect()
}

/// rectangle whose short sides are half discs
pub fn rounded_rect(width: FloatNum, height: FloatNum, corner_segments: u32) -> Vec<Point> {
    let radius = width.min(height) * 0.5;
    let (hw, hh) = (width * 0.5 - radius, height * 0.5 - radius);
    let corner_segments = corner_segments.max(1);
    let step = physbox_engine::math::pi() * 0.5 / corner_segments as FloatNum;

    // corner centers walked from +x+y, each arc covers a quarter turn
    let corners: [(FloatNum, FloatNum); 4] = [(hw, hh), (-hw, hh), (-hw, -hh), (hw, -hh)];

    let mut vertices = Vec::with_capacity(corners.len() * (corner_segments as usize + 1));
    for (quarter, (cx, cy)) in corners.into_iter().enumerate() {
        let start = physbox_engine::math::pi() * 0.5 * quarter as FloatNum;
        for i in 0..=corner_segments {
            let angle = start + step * i as FloatNum;
            let point: Point = (cx + radius * angle.cos(), cy + radius * angle.sin()).into();
            let is_duplicate = vertices
                .last()
                .map_or(false, |last: &Point| last.distance(&point) < EPSILON);
            if !is_duplicate {
                vertices.push(point);
            }
        }
    }
    if vertices.len() > 1 && vertices[0].distance(&vertices[vertices.len() - 1]) < EPSILON {
        vertices.pop();
    }
    vertices
}

/// (width, height) of the axis aligned bounding box
pub fn bounding_size(vertices: &[Point]) -> (FloatNum, FloatNum) {
    let Some(first) = vertices.first() else {
        return (0., 0.);
    };
    let (min, max) = vertices.iter().fold((*first, *first), |(min, max), p| {
        (
            (min.x().min(p.x()), min.y().min(p.y())).into(),
            (max.x().max(p.x()), max.y().max(p.y())).into(),
        )
    });
    (max.x() - min.x(), max.y() - min.y())
}

pub fn offset_points(vertices: &[Point], offset: &Vector) -> Vec<Point> {
    vertices.iter().map(|p| *p + offset).collect()
}

/// every crossing of the segment with the closed outline as (edge index, point),
/// crossings through a shared vertex are reported once
pub fn outline_crossings(vertices: &[Point], segment: &Segment) -> Vec<(usize, Point)> {
    let mut crossings: Vec<(usize, Point)> = Vec::with_capacity(2);
    for (index, edge) in edges(vertices).enumerate() {
        let Some(point) = edge.intersect(segment) else {
            continue;
        };
        if crossings
            .iter()
            .any(|(_, other)| other.distance(&point) < 1e-3)
        {
            continue;
        }
        crossings.push((index, point));
    }
    crossings
}

/// split a convex outline along a chord that crosses it exactly twice
pub fn split_outline(vertices: &[Point], segment: &Segment) -> Option<(Vec<Point>, Vec<Point>)> {
    let len = vertices.len();
    if len < 3 {
        return None;
    }

    let crossings = outline_crossings(vertices, segment);
    let [(first_edge, first_point), (second_edge, second_point)] = crossings[..] else {
        return None;
    };

    // walk from one crossing to the other along the outline
    let walk = |from_edge: usize, from: Point, to_edge: usize, to: Point| {
        let mut outline = vec![from];
        let mut index = (from_edge + 1) % len;
        loop {
            let vertex = vertices[index];
            let is_crossing = vertex.distance(&from) < 1e-3 || vertex.distance(&to) < 1e-3;
            if !is_crossing {
                outline.push(vertex);
            }
            if index == to_edge {
                break;
            }
            index = (index + 1) % len;
        }
        outline.push(to);
        outline
    };

    let first = walk(first_edge, first_point, second_edge, second_point);
    let second = walk(second_edge, second_point, first_edge, first_point);

    if polygon_centroid(&first).is_none() || polygon_centroid(&second).is_none() {
        return None;
    }
    Some((first, second))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn square() -> Vec<Point> {
        vec![
            (-10., -10.).into(),
            (10., -10.).into(),
            (10., 10.).into(),
            (-10., 10.).into(),
        ]
    }

    #[test]
    fn test_triangle_centroid_offsets() {
        let centroid = polygon_centroid(&right_triangle(60., 30.)).unwrap();
        assert!((centroid.x() - 10.).abs() < 1e-4);
        assert!((centroid.y() - 5.).abs() < 1e-4);

        let centroid = polygon_centroid(&isosceles_triangle(60., 30.)).unwrap();
        assert!(centroid.x().abs() < 1e-4);
        assert!((centroid.y() - 5.).abs() < 1e-4);
    }

    #[test]
    fn test_trapezoid_centroid_offset() {
        let (w, h) = (80., 40.);
        let centroid = polygon_centroid(&trapezoid(w, h)).unwrap();
        assert!((centroid.y() - h * h / (6. * (2. * w - h))).abs() < 1e-3);
    }

    #[test]
    fn test_generated_outlines_fit_their_box() {
        let (w, h) = bounding_size(&ellipse(40., 20., 24));
        assert!((w - 40.).abs() < 1e-3 && (h - 20.).abs() < 1e-3);

        let capsule = rounded_rect(80., 30., 4);
        let (w, h) = bounding_size(&capsule);
        assert!((w - 80.).abs() < 1e-3 && (h - 30.).abs() < 1e-3);
        // the flat sides share the arc end points
        assert!(capsule.len() >= 16);
    }

    #[test]
    fn test_split_square() {
        let cut = Segment::new((0., -50.).into(), (0., 50.).into());
        let (left, right) = split_outline(&square(), &cut).unwrap();
        assert_eq!(left.len(), 4);
        assert_eq!(right.len(), 4);

        let area = compute_area_of_convex(&left) + compute_area_of_convex(&right);
        assert!((area - 400.).abs() < 1e-2);
    }

    #[test]
    fn test_split_through_vertex() {
        let cut = Segment::new((-20., -20.).into(), (20., 20.).into());
        let (a, b) = split_outline(&square(), &cut).unwrap();
        assert_eq!(a.len(), 3);
        assert_eq!(b.len(), 3);
    }

    #[test]
    fn test_split_rejects_partial_cut() {
        let cut = Segment::new((0., -50.).into(), (0., 0.).into());
        assert!(split_outline(&square(), &cut).is_none());

        let miss = Segment::new((50., -50.).into(), (50., 50.).into());
        assert!(split_outline(&square(), &miss).is_none());
    }
}
