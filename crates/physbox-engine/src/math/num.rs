use std::ops::RangeInclusive;

use super::FloatNum;

pub(crate) fn is_same_sign(v1: FloatNum, v2: FloatNum) -> bool {
    (v1.is_sign_positive() && v2.is_sign_positive())
        || (v1.is_sign_negative() && v2.is_sign_negative())
}

pub(crate) fn limit_at_range(value: FloatNum, range: RangeInclusive<FloatNum>) -> FloatNum {
    if &value < range.start() {
        *range.start()
    } else if &value > range.end() {
        *range.end()
    } else {
        value
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_limit_at_range() {
        assert_eq!(limit_at_range(3., -1.0..=1.0), 1.);
        assert_eq!(limit_at_range(-3., -1.0..=1.0), -1.);
        assert_eq!(limit_at_range(0.5, -1.0..=1.0), 0.5);
    }

    #[test]
    fn test_same_sign() {
        assert!(is_same_sign(1., 2.));
        assert!(is_same_sign(-1., -0.5));
        assert!(!is_same_sign(-1., 0.5));
    }
}
