use crate::math::{vector::Vector, FloatNum};

/// force and torque gathered during one tick, consumed by velocity integration
#[derive(Default, Clone, Debug)]
pub struct ForceAccumulator {
    force: Vector,
    torque: FloatNum,
}

impl ForceAccumulator {
    pub fn new() -> ForceAccumulator {
        Default::default()
    }

    pub fn add(&mut self, force: Vector, r: Vector) {
        self.force += force;
        self.torque += r ^ force;
    }

    pub fn force(&self) -> Vector {
        self.force
    }

    pub fn torque(&self) -> FloatNum {
        self.torque
    }

    pub fn clear(&mut self) {
        self.force.set_zero();
        self.torque = 0.;
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_force_at_offset_creates_torque() {
        let mut accumulator = ForceAccumulator::new();
        accumulator.add((0., 10.).into(), (2., 0.).into());
        accumulator.add((5., 0.).into(), Default::default());
        assert_eq!(accumulator.force(), (5., 10.).into());
        assert_eq!(accumulator.torque(), 20.);

        accumulator.clear();
        assert!(accumulator.force().is_zero());
        assert_eq!(accumulator.torque(), 0.);
    }
}
