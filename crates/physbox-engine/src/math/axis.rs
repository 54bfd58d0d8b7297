use super::vector::Vector;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum AxisDirection {
    X,
    Y,
}

impl From<AxisDirection> for Vector {
    fn from(axis: AxisDirection) -> Self {
        match axis {
            AxisDirection::X => (1., 0.).into(),
            AxisDirection::Y => (0., 1.).into(),
        }
    }
}
