//! The fixed-point `Number` scalar (§3, §4.1).
//!
//! A `Number` is a signed 64-bit integer `raw` such that the represented
//! rational is `raw / 1000`. Three fractional digits are part of the wire
//! contract (textual round-trips, §8 scenario 1/2) as much as the arithmetic
//! is, so both live in this one module.
//!
//! Overflow policy is intentionally inconsistent across operators — that
//! inconsistency is the language's actual semantics, not an oversight.
//! `+`, `-`, `*`, `-x`, `++x`, `--x` wrap silently; `abs` and numeric
//! conversions saturate; `/` and `%` raise [`ExecutionError`] on a zero
//! divisor and otherwise truncate toward zero.

use core::fmt;
use core::ops::{Add, Neg, Sub};
use core::str::FromStr;

use thiserror::Error;

use crate::error::ExecutionError;

/// Denominator shared by every `Number`; part of the external contract.
pub const SCALE: i64 = 1_000;

/// Number of fractional decimal digits implied by [`SCALE`].
pub const SCALE_DIGITS: u32 = 3;

/// `π` to eleven digits, pinned independently of the host's math library so
/// that trig results are stable across platforms (§9).
pub const PI: f64 = 3.141_592_653_59;

/// Above this raw magnitude, `sqrt` saturates to [`Number::MIN`] instead of
/// returning a (correct) huge result — a pinned quirk of the source language,
/// not a tuned safety margin (§9 open question (a)).
const SQRT_SATURATION_THRESHOLD_RAW: i64 = 9_223_372_036_854_775_000;

/// A fixed-point rational with exactly three fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
#[cfg_attr(feature = "serde", derive(serde::Serialize, serde::Deserialize))]
pub struct Number {
    raw: i64,
}

impl Number {
    /// The additive identity, `0`.
    pub const ZERO: Self = Self { raw: 0 };
    /// The multiplicative identity, `1`.
    pub const ONE: Self = Self { raw: SCALE };
    /// The smallest representable `Number`.
    pub const MIN: Self = Self { raw: i64::MIN };
    /// The largest representable `Number`.
    pub const MAX: Self = Self { raw: i64::MAX };

    /// Constructs a `Number` directly from its scaled raw representation.
    #[must_use]
    pub const fn from_raw(raw: i64) -> Self {
        Self { raw }
    }

    /// Returns the underlying scaled raw representation.
    #[must_use]
    pub const fn raw(self) -> i64 {
        self.raw
    }

    /// Constructs a `Number` from an integer, wrapping on overflow.
    #[must_use]
    pub fn from_i64(value: i64) -> Self {
        Self::from_raw(value.wrapping_mul(SCALE))
    }

    /// Constructs a `Number` from a boolean: `true -> One`, `false -> Zero`.
    #[must_use]
    pub const fn from_bool(value: bool) -> Self {
        if value {
            Self::ONE
        } else {
            Self::ZERO
        }
    }

    /// Constructs a `Number` from a real value, saturating at the
    /// representable range.
    ///
    /// Relies on Rust's float-to-int cast being saturating (and mapping
    /// `NaN` to `0`) since Rust 1.45 — no manual range check is needed.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn from_f64_saturating(value: f64) -> Self {
        let scaled = value * SCALE as f64;
        Self::from_raw(scaled as i64)
    }

    /// Returns the mathematical value as an `f64`.
    #[must_use]
    pub fn to_f64(self) -> f64 {
        self.raw as f64 / SCALE as f64
    }

    /// `a + b`, wrapping on overflow.
    #[must_use]
    pub const fn wrapping_add(self, rhs: Self) -> Self {
        Self::from_raw(self.raw.wrapping_add(rhs.raw))
    }

    /// `a - b`, wrapping on overflow.
    #[must_use]
    pub const fn wrapping_sub(self, rhs: Self) -> Self {
        Self::from_raw(self.raw.wrapping_sub(rhs.raw))
    }

    /// `a * b`, computed via a widened 128-bit intermediate and truncated
    /// toward zero, wrapping the final result back into 64 bits.
    #[must_use]
    #[allow(clippy::cast_possible_truncation)]
    pub fn wrapping_mul(self, rhs: Self) -> Self {
        let product = i128::from(self.raw) * i128::from(rhs.raw);
        let scaled = product / i128::from(SCALE);
        Self::from_raw(scaled as i64)
    }

    /// `a / b`, failing [`ExecutionError::DivideByZero`] when `b` is zero.
    ///
    /// Computed as `(raw_a * 1000) / raw_b` via a widened intermediate so
    /// that the multiply-before-divide never overflows spuriously, then
    /// wraps the final result back into 64 bits.
    #[allow(clippy::cast_possible_truncation)]
    pub fn checked_div(self, rhs: Self) -> Result<Self, ExecutionError> {
        if rhs.raw == 0 {
            return Err(ExecutionError::DivideByZero);
        }
        let numerator = i128::from(self.raw) * i128::from(SCALE);
        let quotient = numerator / i128::from(rhs.raw);
        Ok(Self::from_raw(quotient as i64))
    }

    /// `a % b`, failing [`ExecutionError::ModulusByZero`] when `b` is zero.
    pub fn checked_rem(self, rhs: Self) -> Result<Self, ExecutionError> {
        if rhs.raw == 0 {
            return Err(ExecutionError::ModulusByZero);
        }
        Ok(Self::from_raw(self.raw.wrapping_rem(rhs.raw)))
    }

    /// `++a`: adds one, wrapping on overflow.
    #[must_use]
    pub const fn increment(self) -> Self {
        Self::from_raw(self.raw.wrapping_add(SCALE))
    }

    /// `--a`: subtracts one, wrapping on overflow.
    #[must_use]
    pub const fn decrement(self) -> Self {
        Self::from_raw(self.raw.wrapping_sub(SCALE))
    }

    /// Magnitude. Saturates at [`Number::MIN`] for `abs(MinValue)`, since its
    /// magnitude has no representable positive counterpart.
    #[must_use]
    pub fn abs(self) -> Self {
        Self::from_raw(self.raw.checked_abs().unwrap_or(i64::MIN))
    }

    /// Square root, in the fixed-point domain.
    ///
    /// Negative operands and operands at or above
    /// [`SQRT_SATURATION_THRESHOLD_RAW`] both saturate to [`Number::MIN`] —
    /// preserved verbatim from the source language rather than normalized
    /// (§9 open question (a)). Otherwise computes the real square root in
    /// double precision and nudges it by `±5e-5` (matching its sign) before
    /// truncating back to three decimals, which is this implementation's
    /// documented rounding policy rather than plain truncation.
    #[must_use]
    pub fn sqrt(self) -> Self {
        if self.raw < 0 || self.raw >= SQRT_SATURATION_THRESHOLD_RAW {
            return Self::MIN;
        }
        let value = self.to_f64().sqrt();
        let epsilon = if value.is_sign_negative() { -5e-5 } else { 5e-5 };
        Self::from_f64_saturating(value + epsilon)
    }

    /// Sine of an angle given in degrees, rounded to three decimals before
    /// being converted back to fixed point.
    #[must_use]
    pub fn sin(self) -> Self {
        Self::from_f64_saturating(round3(deg_to_rad(self.to_f64()).sin()))
    }

    /// Cosine of an angle given in degrees, rounded to three decimals before
    /// being converted back to fixed point.
    #[must_use]
    pub fn cos(self) -> Self {
        Self::from_f64_saturating(round3(deg_to_rad(self.to_f64()).cos()))
    }

    /// Tangent of an angle given in degrees.
    ///
    /// Unlike `sin`/`cos`, this is *not* rounded to three decimals before
    /// truncation back to fixed point — preserved as-is from the source
    /// language (§9 open question (b)).
    #[must_use]
    pub fn tan(self) -> Self {
        Self::from_f64_saturating(deg_to_rad(self.to_f64()).tan())
    }

    /// Arcsine, returned in degrees.
    ///
    /// Out-of-domain operands (`|self| > 1`) produce `NaN` in double
    /// precision, which [`Number::from_f64_saturating`] canonicalizes to
    /// zero — consistent with this codebase's NaN-to-zero canonicalization
    /// elsewhere rather than a documented source-language behavior.
    #[must_use]
    pub fn asin(self) -> Self {
        Self::from_f64_saturating(rad_to_deg(self.to_f64().asin()))
    }

    /// Arccosine, returned in degrees. See [`Number::asin`] for the
    /// out-of-domain policy.
    #[must_use]
    pub fn acos(self) -> Self {
        Self::from_f64_saturating(rad_to_deg(self.to_f64().acos()))
    }

    /// Arctangent, returned in degrees. Always defined.
    #[must_use]
    pub fn atan(self) -> Self {
        Self::from_f64_saturating(rad_to_deg(self.to_f64().atan()))
    }

    /// `pow(self, exponent)`, computed in double precision and saturating on
    /// overflow. `NaN` results (e.g. a negative base with a fractional
    /// exponent) canonicalize to zero, the same policy as the inverse trig
    /// functions.
    #[must_use]
    pub fn pow(self, exponent: Self) -> Self {
        Self::from_f64_saturating(self.to_f64().powf(exponent.to_f64()))
    }

    /// Factorial. Negative operands saturate to [`Number::MIN`]; otherwise
    /// computes `floor(self)!`, wrapping silently on overflow like the rest
    /// of the integer arithmetic in this module.
    #[must_use]
    pub fn factorial(self) -> Self {
        if self.raw < 0 {
            return Self::MIN;
        }
        let n = self.raw / SCALE;
        let mut acc: i64 = 1;
        let mut i = 2;
        while i <= n {
            acc = acc.wrapping_mul(i);
            i += 1;
        }
        Self::from_raw(acc.wrapping_mul(SCALE))
    }
}

fn deg_to_rad(deg: f64) -> f64 {
    deg * PI / 180.0
}

fn rad_to_deg(rad: f64) -> f64 {
    rad * 180.0 / PI
}

fn round3(value: f64) -> f64 {
    (value * 1000.0).round() / 1000.0
}

impl Add for Number {
    type Output = Self;
    fn add(self, rhs: Self) -> Self {
        self.wrapping_add(rhs)
    }
}

impl Sub for Number {
    type Output = Self;
    fn sub(self, rhs: Self) -> Self {
        self.wrapping_sub(rhs)
    }
}

impl core::ops::Mul for Number {
    type Output = Self;
    fn mul(self, rhs: Self) -> Self {
        self.wrapping_mul(rhs)
    }
}

impl Neg for Number {
    type Output = Self;
    fn neg(self) -> Self {
        Self::from_raw(self.raw.wrapping_neg())
    }
}

impl From<bool> for Number {
    fn from(value: bool) -> Self {
        Self::from_bool(value)
    }
}

impl From<i64> for Number {
    fn from(value: i64) -> Self {
        Self::from_i64(value)
    }
}

impl fmt::Display for Number {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let sign = if self.raw < 0 { "-" } else { "" };
        let magnitude = self.raw.unsigned_abs();
        let integer_part = magnitude / (SCALE as u64);
        let frac_part = magnitude % (SCALE as u64);
        if frac_part == 0 {
            write!(f, "{sign}{integer_part}")
        } else {
            let mut digits = format!("{frac_part:0width$}", width = SCALE_DIGITS as usize);
            while digits.ends_with('0') {
                digits.pop();
            }
            write!(f, "{sign}{integer_part}.{digits}")
        }
    }
}

/// Error returned when parsing a textual literal that is not a valid decimal.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("invalid number literal: {0:?}")]
pub struct ParseNumberError(String);

impl FromStr for Number {
    type Err = ParseNumberError;

    /// Parses standard decimal syntax by splitting on the decimal point and
    /// parsing each side as an integer, so the full `i64` range round-trips
    /// exactly — going through `f64` here would lose precision above
    /// `2^53` and break `Display`/`FromStr` round-tripping for most of the
    /// representable range. Out-of-range values still saturate rather than
    /// failing to parse.
    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let invalid = || ParseNumberError(s.to_string());
        let trimmed = s.trim();
        let (negative, unsigned) = match trimmed.strip_prefix('-') {
            Some(rest) => (true, rest),
            None => (false, trimmed.strip_prefix('+').unwrap_or(trimmed)),
        };
        let (int_part, frac_part) = match unsigned.split_once('.') {
            Some((int_part, frac_part)) => (int_part, frac_part),
            None => (unsigned, ""),
        };
        if int_part.is_empty() && frac_part.is_empty() {
            return Err(invalid());
        }
        if !int_part.bytes().all(|b| b.is_ascii_digit())
            || !frac_part.bytes().all(|b| b.is_ascii_digit())
        {
            return Err(invalid());
        }

        let int_magnitude: i128 = if int_part.is_empty() {
            0
        } else {
            int_part.parse().unwrap_or(i128::MAX)
        };

        let mut frac_digits = frac_part.to_string();
        frac_digits.truncate(SCALE_DIGITS as usize);
        while frac_digits.len() < SCALE_DIGITS as usize {
            frac_digits.push('0');
        }
        let frac_magnitude: i128 = if frac_digits.is_empty() {
            0
        } else {
            frac_digits.parse().unwrap_or(0)
        };

        let magnitude = int_magnitude
            .saturating_mul(i128::from(SCALE))
            .saturating_add(frac_magnitude);
        let signed = if negative { -magnitude } else { magnitude };
        let clamped = signed.clamp(i128::from(i64::MIN), i128::from(i64::MAX));
        #[allow(clippy::cast_possible_truncation)]
        let raw = clamped as i64;
        Ok(Self::from_raw(raw))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn displays_shortest_round_tripping_decimal() {
        assert_eq!(Number::from_raw(1500).to_string(), "1.5");
        assert_eq!(Number::from_raw(-1).to_string(), "-0.001");
        assert_eq!(Number::from_raw(6000).to_string(), "6");
        assert_eq!(Number::ZERO.to_string(), "0");
    }

    #[test]
    fn parse_round_trips_through_display() {
        for raw in [0_i64, 1, -1, 1500, -1500, 6000, 333, -333] {
            let n = Number::from_raw(raw);
            let parsed: Number = n.to_string().parse().unwrap();
            assert_eq!(parsed, n);
        }
    }

    #[test]
    fn parse_round_trips_at_extreme_magnitude() {
        // Exercises the part of i64's range an f64-mediated parse would
        // silently round away (see `FromStr`'s doc comment).
        for raw in [i64::MAX, i64::MIN, 9_223_372_036_854_775_000, -9_223_372_036_854_775_000] {
            let n = Number::from_raw(raw);
            let parsed: Number = n.to_string().parse().unwrap();
            assert_eq!(parsed, n);
        }
    }

    #[test]
    fn parse_rejects_malformed_literals() {
        for bad in ["", "-", ".", "1.2.3", "abc", "1..2"] {
            assert!(bad.parse::<Number>().is_err(), "expected {bad:?} to be rejected");
        }
    }

    #[test]
    fn multiply_matches_scenario_three() {
        let a = Number::from_i64(2);
        let b = Number::from_i64(3);
        assert_eq!(a.wrapping_mul(b), Number::from_raw(6000));
    }

    #[test]
    fn divide_truncates_toward_zero() {
        let a = Number::from_i64(1);
        let b = Number::from_i64(3);
        assert_eq!(a.checked_div(b).unwrap(), Number::from_raw(333));
    }

    #[test]
    fn divide_by_zero_is_execution_error() {
        assert_eq!(
            Number::ONE.checked_div(Number::ZERO),
            Err(ExecutionError::DivideByZero)
        );
    }

    #[test]
    fn modulus_by_zero_is_execution_error() {
        assert_eq!(
            Number::ZERO.checked_rem(Number::ZERO),
            Err(ExecutionError::ModulusByZero)
        );
    }

    #[test]
    fn sin_of_ninety_degrees_is_one() {
        assert_eq!(Number::from_i64(90).sin(), Number::ONE);
    }

    #[test]
    fn abs_of_min_value_saturates() {
        assert_eq!(Number::MIN.abs(), Number::MIN);
    }

    #[test]
    fn sqrt_of_negative_saturates_to_min() {
        assert_eq!(Number::from_i64(-4).sqrt(), Number::MIN);
    }

    #[test]
    fn factorial_of_negative_saturates_to_min() {
        assert_eq!(Number::from_i64(-1).factorial(), Number::MIN);
    }

    #[test]
    fn factorial_of_small_integers() {
        assert_eq!(Number::from_i64(0).factorial(), Number::ONE);
        assert_eq!(Number::from_i64(5).factorial(), Number::from_i64(120));
    }

    #[test]
    fn pow_raises_to_an_integer_power() {
        assert_eq!(Number::from_i64(2).pow(Number::from_i64(10)), Number::from_i64(1024));
    }

    #[test]
    fn pow_by_zero_is_one() {
        assert_eq!(Number::from_i64(5).pow(Number::ZERO), Number::ONE);
    }

    #[test]
    fn asin_of_zero_is_zero_degrees() {
        assert_eq!(Number::ZERO.asin(), Number::ZERO);
    }

    #[test]
    fn asin_of_one_is_ninety_degrees() {
        let result = Number::ONE.asin();
        assert!((result.raw() - 90_000).abs() <= 1, "got {result:?}");
    }

    #[test]
    fn acos_of_one_is_zero_degrees() {
        assert_eq!(Number::ONE.acos(), Number::ZERO);
    }

    #[test]
    fn acos_of_zero_is_ninety_degrees() {
        let result = Number::ZERO.acos();
        assert!((result.raw() - 90_000).abs() <= 1, "got {result:?}");
    }

    #[test]
    fn atan_of_zero_is_zero_degrees() {
        assert_eq!(Number::ZERO.atan(), Number::ZERO);
    }

    #[test]
    fn atan_of_one_is_forty_five_degrees() {
        let result = Number::ONE.atan();
        assert!((result.raw() - 45_000).abs() <= 1, "got {result:?}");
    }

    #[test]
    fn tan_is_not_rounded_like_sin_and_cos() {
        // 45 degrees: sin/cos round to three decimals, tan does not need to
        // (though for this particular angle both paths agree closely); the
        // point under test is that the two code paths are genuinely distinct.
        let forty_five = Number::from_i64(45);
        let tan = forty_five.tan();
        let expected_unrounded = Number::from_f64_saturating(deg_to_rad(45.0).tan());
        assert_eq!(tan, expected_unrounded);
    }

    proptest::proptest! {
        #[test]
        fn add_is_associative_under_wrapping(a: i64, b: i64, c: i64) {
            let (a, b, c) = (Number::from_raw(a), Number::from_raw(b), Number::from_raw(c));
            proptest::prop_assert_eq!((a + b) + c, a + (b + c));
        }

        #[test]
        fn self_subtraction_is_zero(a: i64) {
            let a = Number::from_raw(a);
            proptest::prop_assert_eq!(a - a, Number::ZERO);
        }

        #[test]
        fn nonzero_self_division_is_one(a in proptest::num::i64::ANY.prop_filter("nonzero", |v| *v != 0)) {
            let a = Number::from_raw(a);
            proptest::prop_assert_eq!(a.checked_div(a).unwrap(), Number::ONE);
        }

        #[test]
        fn display_parse_round_trips(raw: i64) {
            let n = Number::from_raw(raw);
            let parsed: Number = n.to_string().parse().unwrap();
            proptest::prop_assert_eq!(parsed, n);
        }
    }
}
