use physbox_macro_tools::Deref;

use crate::{
    element::ComputeMomentOfInertia,
    math::{point::Point, FloatNum},
    meta::Mass,
};

use super::ConvexPolygon;

/// axis aligned rectangle built around its center point
#[derive(Clone, Debug, Deref)]
pub struct Rect {
    width: FloatNum,
    height: FloatNum,
    #[deref]
    inner: ConvexPolygon,
}

impl Rect {
    pub fn new(center_point: impl Into<Point>, width: FloatNum, height: FloatNum) -> Self {
        let center_point = center_point.into();
        let half_width = width.abs() * 0.5;
        let half_height = height.abs() * 0.5;
        let (x, y) = (center_point.x(), center_point.y());

        let vertices: Vec<Point> = vec![
            (x - half_width, y - half_height).into(),
            (x + half_width, y - half_height).into(),
            (x + half_width, y + half_height).into(),
            (x - half_width, y + half_height).into(),
        ];

        Self {
            width: width.abs(),
            height: height.abs(),
            inner: ConvexPolygon::new(vertices),
        }
    }

    #[inline]
    pub fn width(&self) -> FloatNum {
        self.width
    }

    #[inline]
    pub fn height(&self) -> FloatNum {
        self.height
    }
}

impl_shape_traits_use_deref!(Rect);

impl ComputeMomentOfInertia for Rect {
    fn compute_moment_of_inertia(&self, m: Mass) -> FloatNum {
        m * (self.width.powf(2.) + self.height.powf(2.)) / 12.
    }
}
