use physbox_macro_tools::Fields;

use crate::{
    math::{
        axis::AxisDirection, num::is_same_sign, point::Point, segment::Segment, vector::Vector,
        FloatNum,
    },
    shape::{
        utils::{compute_polygon_approximate_center_point, edges, is_point_inside_convex},
        ShapeOutline,
    },
};
use std::cmp::Ordering;

pub trait Projector {
    /// min and max point of the shape along `vector`
    fn projection_on_vector(&self, vector: &Vector) -> (Point, Point);

    fn projection_on_axis(&self, axis: AxisDirection) -> (FloatNum, FloatNum) {
        use AxisDirection::*;
        let (p1, p2) = self.projection_on_vector(&axis.into());
        match axis {
            X => (p1.x(), p2.x()),
            Y => (p1.y(), p2.y()),
        }
    }

    /// axis aligned bounding box as (min, max)
    fn aabb(&self) -> (Point, Point) {
        let (min_x, max_x) = self.projection_on_axis(AxisDirection::X);
        let (min_y, max_y) = self.projection_on_axis(AxisDirection::Y);
        ((min_x, min_y).into(), (max_x, max_y).into())
    }
}

/**
 * contact_point is where the collision happen
 * normal toward the shape of collider a
 * depth is how deep the collision happen
 */
#[derive(Clone, Debug, Default, Fields)]
#[r]
pub struct ContactPointPair {
    point: Point,
    point_a: Point,
    point_b: Point,
    #[r(copy)]
    normal_toward_a: Vector,
    depth: FloatNum,
}

impl ContactPointPair {
    pub(crate) fn new(point_a: Point, point_b: Point, normal: Vector, depth: FloatNum) -> Self {
        let point = point_a.mid_point(&point_b);

        ContactPointPair {
            point_a,
            point_b,
            point,
            normal_toward_a: normal,
            depth,
        }
    }
}

#[inline]
pub(crate) fn is_aabb_overlap(a: &(Point, Point), b: &(Point, Point)) -> bool {
    !(a.1.x() < b.0.x() || b.1.x() < a.0.x() || a.1.y() < b.0.y() || b.1.y() < a.0.y())
}

/**
 * rough collision detection
 * sort bounding boxes by their min x, only neighbours overlapping on x are tested on y
 * handler receives the indexes carried by `bounds`
 */
pub(crate) fn sweep_and_prune_collision_detection(
    bounds: &mut [(usize, (Point, Point))],
    mut handler: impl FnMut(usize, usize),
) {
    if bounds.is_empty() {
        return;
    }

    bounds.sort_by(|(_, a), (_, b)| {
        a.0.x()
            .partial_cmp(&b.0.x())
            .unwrap_or(Ordering::Equal)
    });

    let len = bounds.len();

    for i in 0..(len - 1) {
        let (index_a, bound_a) = bounds[i];
        let max_x = bound_a.1.x();
        for &(index_b, bound_b) in &bounds[(i + 1)..] {
            if bound_b.0.x() > max_x {
                break;
            }
            let is_collision_on_y = !(bound_a.1.y() < bound_b.0.y() || bound_b.1.y() < bound_a.0.y());
            if is_collision_on_y {
                handler(index_a, index_b);
            }
        }
    }
}

/**
 * accurate collision detection, produce contact point pairs for two outlines
 */
pub fn detect_collision(a: ShapeOutline, b: ShapeOutline) -> Option<Vec<ContactPointPair>> {
    use ShapeOutline::*;
    let contact_pairs = match (a, b) {
        (Polygon(vertices_a), Polygon(vertices_b)) => {
            polygon_polygon_collision(vertices_a, vertices_b)
        }
        (
            Circle {
                center: center_a,
                radius: radius_a,
            },
            Circle {
                center: center_b,
                radius: radius_b,
            },
        ) => circle_circle_collision(center_a, radius_a, center_b, radius_b),
        (Circle { center, radius }, Polygon(vertices)) => {
            let (point_on_circle, point_on_polygon, normal, depth) =
                circle_polygon_collision(center, radius, vertices)?;
            vec![ContactPointPair::new(
                point_on_circle,
                point_on_polygon,
                normal,
                depth,
            )]
        }
        (Polygon(vertices), Circle { center, radius }) => {
            let (point_on_circle, point_on_polygon, normal, depth) =
                circle_polygon_collision(center, radius, vertices)?;
            vec![ContactPointPair::new(
                point_on_polygon,
                point_on_circle,
                -normal,
                depth,
            )]
        }
    };

    if contact_pairs.is_empty() {
        None
    } else {
        Some(contact_pairs)
    }
}

/// true when the outline touches the segment
pub fn is_outline_intersect_segment(outline: ShapeOutline, segment: &Segment) -> bool {
    match outline {
        ShapeOutline::Polygon(vertices) => {
            edges(vertices).any(|edge| edge.intersect(segment).is_some())
                || is_point_inside_convex(vertices, segment.start_point())
        }
        ShapeOutline::Circle { center, radius } => segment.distance_to_point(&center) <= radius,
    }
}

fn projection_on_normal(vertices: &[Point], normal: Vector) -> (FloatNum, FloatNum) {
    vertices
        .iter()
        .fold((FloatNum::MAX, FloatNum::MIN), |(min, max), p| {
            let size = p.to_vector() * normal;
            (min.min(size), max.max(size))
        })
}

// the edge of the polygon that faces `direction` the most
fn find_best_edge(vertices: &[Point], direction: Vector) -> Segment {
    let len = vertices.len();
    let (index, _) = vertices.iter().enumerate().fold(
        (0, FloatNum::MIN),
        |(best_index, best_size), (index, p)| {
            let size = p.to_vector() * direction;
            if size > best_size {
                (index, size)
            } else {
                (best_index, best_size)
            }
        },
    );

    let current = vertices[index];
    let previous = vertices[(index + len - 1) % len];
    let next = vertices[(index + 1) % len];

    let right: Vector = (current, next).into();
    let left: Vector = (previous, current).into();

    let right_dot = right.checked_normalize().map_or(1., |v| (v * direction).abs());
    let left_dot = left.checked_normalize().map_or(1., |v| (v * direction).abs());

    if right_dot <= left_dot {
        (current, next).into()
    } else {
        (previous, current).into()
    }
}

// separating axis test over every edge normal, the axis of least overlap becomes the normal
fn polygon_polygon_collision(a: &[Point], b: &[Point]) -> Vec<ContactPointPair> {
    if a.len() < 3 || b.len() < 3 {
        return vec![];
    }

    let center_point_a = compute_polygon_approximate_center_point(a);
    let center_point_b = compute_polygon_approximate_center_point(b);

    let mut min_overlap = FloatNum::MAX;
    let mut best_normal: Option<Vector> = None;

    for edge in edges(a).chain(edges(b)) {
        let Some(normal) = (!edge.to_vector()).checked_normalize() else {
            continue;
        };
        let (min_a, max_a) = projection_on_normal(a, normal);
        let (min_b, max_b) = projection_on_normal(b, normal);

        let overlap = max_a.min(max_b) - min_a.max(min_b);
        if overlap <= 0. {
            return vec![];
        }

        if overlap < min_overlap {
            min_overlap = overlap;
            best_normal = Some(normal);
        }
    }

    let Some(mut normal) = best_normal else {
        return vec![];
    };

    // normal point from a to b
    if Vector::from((center_point_a, center_point_b)) * normal < 0. {
        normal = -normal;
    }

    let edge_a = find_best_edge(a, normal);
    let edge_b = find_best_edge(b, -normal);

    v_clip(edge_a, edge_b, normal, center_point_a, center_point_b)
}

fn circle_circle_collision(
    center_a: Point,
    radius_a: FloatNum,
    center_b: Point,
    radius_b: FloatNum,
) -> Vec<ContactPointPair> {
    let a_to_b: Vector = (center_a, center_b).into();
    let distance = a_to_b.abs();
    let depth = radius_a + radius_b - distance;
    if depth <= 0. {
        return vec![];
    }

    let normal = a_to_b.checked_normalize().unwrap_or_else(|| (0., 1.).into());

    let point_a = center_a + normal * radius_a;
    let point_b = center_b - normal * radius_b;

    vec![ContactPointPair::new(point_a, point_b, -normal, depth)]
}

// returns (point on circle, point on polygon, normal from polygon toward circle, depth)
fn circle_polygon_collision(
    center: Point,
    radius: FloatNum,
    vertices: &[Point],
) -> Option<(Point, Point, Vector, FloatNum)> {
    if vertices.len() < 3 {
        return None;
    }

    let (closest_point, distance, closest_edge) = edges(vertices)
        .map(|edge| {
            let closest_point = edge.closest_point(&center);
            (closest_point, closest_point.distance(&center), edge)
        })
        .min_by(|a, b| a.1.partial_cmp(&b.1).unwrap_or(Ordering::Equal))?;

    let is_inside = is_point_inside_convex(vertices, &center);

    if !is_inside && distance >= radius {
        return None;
    }

    let polygon_center = compute_polygon_approximate_center_point(vertices);

    let normal = if distance > FloatNum::EPSILON {
        let to_center: Vector = (closest_point, center).into();
        let normal = to_center / distance;
        if is_inside {
            -normal
        } else {
            normal
        }
    } else {
        // center sits on the edge, push along the edge normal away from the polygon
        let edge_normal = (!closest_edge.to_vector()).normalize();
        if Vector::from((polygon_center, *closest_edge.start_point())) * edge_normal < 0. {
            -edge_normal
        } else {
            edge_normal
        }
    };

    let depth = if is_inside {
        radius + distance
    } else {
        radius - distance
    };

    let point_on_circle = center - normal * radius;

    Some((point_on_circle, closest_point, normal, depth))
}

// want more detail about v_clip, visit
// https://dyn4j.org/2011/11/contact-points-using-clipping/
fn v_clip(
    edge_a: Segment,
    edge_b: Segment,
    normal: Vector,
    center_point_a: Point,
    center_point_b: Point,
) -> Vec<ContactPointPair> {
    // which collider is reference , A or B
    enum Collider {
        A,
        B,
    }

    let get_reference_normal = |reference_center_point: Point, incident_center_point: Point| {
        let tmp_vector: Vector = (incident_center_point, reference_center_point).into();

        // normal direction must point to reference poly
        if (tmp_vector * normal).is_sign_negative() {
            -normal
        } else {
            normal
        }
    };

    let perpendicular_size = |edge: &Segment| {
        edge.to_vector()
            .checked_normalize()
            .map_or(FloatNum::MAX, |v| (v * normal).abs())
    };

    let (reference_edge, incident_edge, reference_normal, reference_collider) = {
        if perpendicular_size(&edge_a) <= perpendicular_size(&edge_b) {
            let reference_normal = get_reference_normal(center_point_a, center_point_b);
            (edge_a, edge_b, reference_normal, Collider::A)
        } else {
            let reference_normal = get_reference_normal(center_point_b, center_point_a);
            (edge_b, edge_a, reference_normal, Collider::B)
        }
    };

    // first and second clip
    let contact_points = clip(&reference_edge, &incident_edge);

    // last clip
    let reference_point = reference_edge.start_point();

    let reference_projection_size = reference_point.to_vector() * reference_normal;

    let compute_contact_pair = |contact_point: Point| {
        let depth = contact_point.to_vector() * reference_normal - reference_projection_size;
        if depth.is_sign_negative() {
            return None;
        }

        let contact_point_1 = contact_point + (-reference_normal * depth);
        let contact_point_2 = contact_point;

        let normal_1 = reference_normal;
        let normal_2 = -normal_1;

        let contact_pair = match reference_collider {
            Collider::A => ContactPointPair::new(contact_point_1, contact_point_2, normal_1, depth),
            Collider::B => ContactPointPair::new(contact_point_2, contact_point_1, normal_2, depth),
        };
        contact_pair.into()
    };

    contact_points
        .into_iter()
        .filter_map(compute_contact_pair)
        .collect()
}

fn clip(reference_edge: &Segment, incident_edge: &Segment) -> Vec<Point> {
    let mut contact_points = Vec::with_capacity(4);

    let Some(reference_vector) = reference_edge.to_vector().checked_normalize() else {
        return contact_points;
    };
    let incident_v1 = incident_edge.start_point();
    let incident_v2 = incident_edge.end_point();

    // vector must normalize
    let compute_incident_point_project_size = |reference_point: &Point, vector: Vector| {
        let reference_project_size = reference_point.to_vector() * vector;

        let incident_v1_projection_size = incident_v1.to_vector() * vector - reference_project_size;
        let incident_v2_projection_size = incident_v2.to_vector() * vector - reference_project_size;
        (incident_v1_projection_size, incident_v2_projection_size)
    };

    let reference_v1 = reference_edge.start_point();
    let (s1_by_reference_v1, s2_by_reference_v1) =
        compute_incident_point_project_size(reference_v1, reference_vector);
    let reference_v2 = reference_edge.end_point();
    let (s1_by_reference_v2, s2_by_reference_v2) =
        compute_incident_point_project_size(reference_v2, -reference_vector);

    if s1_by_reference_v1.is_sign_positive() && s1_by_reference_v2.is_sign_positive() {
        contact_points.push(*incident_v1);
    }

    if s2_by_reference_v1.is_sign_positive() && s2_by_reference_v2.is_sign_positive() {
        contact_points.push(*incident_v2);
    }

    let incident_vector = incident_edge.to_vector();

    for (s1, s2) in [
        (s1_by_reference_v1, s2_by_reference_v1),
        (s1_by_reference_v2, s2_by_reference_v2),
    ] {
        if !is_same_sign(s1, s2) {
            let s1_abs = s1.abs();
            let s2_abs = s2.abs();

            let ratio = s1_abs * (s1_abs + s2_abs).recip();
            contact_points.push(*incident_v1 + incident_vector * ratio);
        }
    }

    contact_points
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::shape::{Circle, Outline, Rect};

    #[test]
    fn test_resting_boxes_produce_two_contacts() {
        let ground = Rect::new((0., 100.), 400., 20.);
        let block = Rect::new((0., 80.5), 40., 20.);

        let contacts = detect_collision(block.outline(), ground.outline()).unwrap();

        assert_eq!(contacts.len(), 2);
        for contact in &contacts {
            // ground is below the block in a y-down world, the normal points up toward the block
            assert!(contact.normal_toward_a().y() < -0.99);
            assert!((contact.depth() - 0.5).abs() < 1e-3);
        }
    }

    #[test]
    fn test_separated_boxes() {
        let a = Rect::new((0., 0.), 10., 10.);
        let b = Rect::new((20., 0.), 10., 10.);
        assert!(detect_collision(a.outline(), b.outline()).is_none());
    }

    #[test]
    fn test_circle_collisions() {
        let a = Circle::new((0., 0.), 10.);
        let b = Circle::new((15., 0.), 10.);
        let contacts = detect_collision(a.outline(), b.outline()).unwrap();
        assert_eq!(contacts.len(), 1);
        assert!((contacts[0].depth() - 5.).abs() < 1e-4);
        assert!(contacts[0].normal_toward_a().x() < -0.99);

        let ground = Rect::new((0., 10.), 100., 10.);
        let contacts = detect_collision(a.outline(), ground.outline()).unwrap();
        assert!((contacts[0].depth() - 5.).abs() < 1e-4);
        assert!(contacts[0].normal_toward_a().y() < -0.99);

        let contacts = detect_collision(ground.outline(), a.outline()).unwrap();
        assert!(contacts[0].normal_toward_a().y() > 0.99);
    }

    #[test]
    fn test_segment_hit() {
        let block = Rect::new((0., 0.), 10., 10.);
        let crossing: Segment = ((0., -20.).into(), (0., 20.).into()).into();
        let missing: Segment = ((20., -20.).into(), (20., 20.).into()).into();
        assert!(is_outline_intersect_segment(block.outline(), &crossing));
        assert!(!is_outline_intersect_segment(block.outline(), &missing));

        let circle = Circle::new((0., 0.), 5.);
        assert!(is_outline_intersect_segment(circle.outline(), &crossing));
        assert!(!is_outline_intersect_segment(circle.outline(), &missing));
    }

    #[test]
    fn test_sweep_and_prune() {
        let mut bounds = vec![
            (0, ((0., 0.).into(), (10., 10.).into())),
            (1, ((100., 0.).into(), (110., 10.).into())),
            (2, ((5., 5.).into(), (15., 15.).into())),
            (3, ((5., 50.).into(), (15., 60.).into())),
        ];
        let mut pairs = vec![];
        sweep_and_prune_collision_detection(&mut bounds, |a, b| pairs.push((a.min(b), a.max(b))));
        assert_eq!(pairs, vec![(0, 2)]);
    }
}
