//! Integration tests for the fixed-point number engine.

use yolk_core::number::Number;

#[cfg(test)]
mod overflow_policy {
    use super::*;

    #[test]
    fn addition_wraps_past_max() {
        let max = Number::from_raw(i64::MAX);
        let one = Number::from_raw(1);
        let wrapped = max + one;
        assert_eq!(wrapped, Number::from_raw(i64::MIN));
    }

    #[test]
    fn division_faults_on_zero_but_multiplication_never_does() {
        let five = Number::from_i64(5);
        let zero = Number::ZERO;
        assert!(five.checked_div(zero).is_err());
        // Multiply has no failure mode at all: it always wraps.
        let _ = five * zero;
    }

    #[test]
    fn sqrt_of_a_very_large_negative_value_saturates_rather_than_panics() {
        let huge_negative = Number::from_raw(i64::MIN);
        assert_eq!(huge_negative.sqrt(), Number::MIN);
    }
}

#[cfg(test)]
mod display_and_parse {
    use super::*;

    #[test]
    fn negative_fraction_round_trips() {
        let n: Number = "-12.5".parse().expect("valid literal");
        assert_eq!(n.to_string(), "-12.5");
    }

    #[test]
    fn integral_value_has_no_decimal_point() {
        let n = Number::from_i64(-7);
        assert_eq!(n.to_string(), "-7");
    }
}
