//! Pure math behind every operation. No I/O, no history.

use calculator_sdk::{AngleUnit, BinaryOp, UnaryFn};

use super::error::DomainError;

/// Largest integer whose factorial fits in an `f64`.
pub const MAX_FACTORIAL: f64 = 170.0;

/// Reject NaN and infinities before they reach a math call.
///
/// # Errors
/// `InvalidInput` naming the operand.
pub fn ensure_finite(name: &str, value: f64) -> Result<f64, DomainError> {
    if value.is_finite() {
        Ok(value)
    } else {
        Err(DomainError::invalid_input(format!(
            "operand '{name}' must be a finite number"
        )))
    }
}

/// Parse an operand as sent on the wire.
///
/// # Errors
/// `InvalidInput` for anything that is not a finite decimal number.
pub fn parse_operand(name: &str, raw: Option<&str>) -> Result<f64, DomainError> {
    let raw = raw.ok_or_else(|| DomainError::invalid_input(format!("missing operand '{name}'")))?;
    let value = calculator_sdk::wire::parse_text(raw).ok_or_else(|| {
        DomainError::invalid_input(format!("operand '{name}' is not a number: '{raw}'"))
    })?;
    ensure_finite(name, value)
}

/// # Errors
/// `InvalidInput` for non-finite operands, `DivisionByZero` for `x / 0`.
pub fn binary(op: BinaryOp, a: f64, b: f64) -> Result<f64, DomainError> {
    let a = ensure_finite("a", a)?;
    let b = ensure_finite("b", b)?;
    match op {
        BinaryOp::Add => Ok(a + b),
        BinaryOp::Subtract => Ok(a - b),
        BinaryOp::Multiply => Ok(a * b),
        BinaryOp::Divide if b == 0.0 => Err(DomainError::DivisionByZero),
        BinaryOp::Divide => Ok(a / b),
        BinaryOp::Power => Ok(a.powf(b)),
    }
}

/// Evaluate a unary function.
///
/// Trigonometric results are rounded to `trig_decimals` decimal places.
///
/// # Errors
/// `InvalidInput` for non-finite operands, `OutOfDomain` when `x` is outside
/// the function's domain.
pub fn unary(
    function: UnaryFn,
    x: f64,
    unit: AngleUnit,
    trig_decimals: i32,
) -> Result<f64, DomainError> {
    let x = ensure_finite("x", x)?;
    let name = function.name();
    match function {
        UnaryFn::Sin | UnaryFn::Cos | UnaryFn::Tan => {
            Ok(round_to(trig(function, x, unit), trig_decimals))
        }
        UnaryFn::Asin | UnaryFn::Acos if !(-1.0..=1.0).contains(&x) => Err(
            DomainError::out_of_domain(name, x, "requires -1 <= x <= 1"),
        ),
        UnaryFn::Asin => Ok(round_to(from_radians(x.asin(), unit), trig_decimals)),
        UnaryFn::Acos => Ok(round_to(from_radians(x.acos(), unit), trig_decimals)),
        UnaryFn::Atan => Ok(round_to(from_radians(x.atan(), unit), trig_decimals)),
        UnaryFn::Sqrt if x < 0.0 => Err(DomainError::out_of_domain(name, x, "requires x >= 0")),
        UnaryFn::Sqrt => Ok(x.sqrt()),
        UnaryFn::Log10 | UnaryFn::Ln if x <= 0.0 => {
            Err(DomainError::out_of_domain(name, x, "requires x > 0"))
        }
        UnaryFn::Log10 => Ok(x.log10()),
        UnaryFn::Ln => Ok(x.ln()),
        UnaryFn::Inverse if x == 0.0 => {
            Err(DomainError::out_of_domain(name, x, "requires x != 0"))
        }
        UnaryFn::Inverse => Ok(1.0 / x),
        UnaryFn::Factorial => factorial(x),
    }
}

fn trig(function: UnaryFn, x: f64, unit: AngleUnit) -> f64 {
    let radians = match unit {
        AngleUnit::Deg => {
            if function == UnaryFn::Tan && is_odd_multiple_of_right_angle(x) {
                return f64::INFINITY;
            }
            x.to_radians()
        }
        AngleUnit::Rad => x,
    };
    match function {
        UnaryFn::Sin => radians.sin(),
        UnaryFn::Cos => radians.cos(),
        _ => radians.tan(),
    }
}

fn is_odd_multiple_of_right_angle(degrees: f64) -> bool {
    ((degrees % 180.0).abs() - 90.0).abs() < f64::EPSILON
}

fn from_radians(radians: f64, unit: AngleUnit) -> f64 {
    match unit {
        AngleUnit::Deg => radians.to_degrees(),
        AngleUnit::Rad => radians,
    }
}

/// `x!` for non-negative integers; overflows to `+Infinity` above 170.
///
/// # Errors
/// `OutOfDomain` for negative or fractional `x`.
pub fn factorial(x: f64) -> Result<f64, DomainError> {
    if x < 0.0 || x.fract() != 0.0 {
        return Err(DomainError::out_of_domain(
            UnaryFn::Factorial.name(),
            x,
            "requires a non-negative integer",
        ));
    }
    if x > MAX_FACTORIAL {
        return Ok(f64::INFINITY);
    }
    let mut acc = 1.0;
    let mut k = 2.0;
    while k <= x {
        acc *= k;
        k += 1.0;
    }
    Ok(acc)
}

/// Round to `decimals` decimal places, passing non-finite values through.
#[must_use]
pub fn round_to(value: f64, decimals: i32) -> f64 {
    if !value.is_finite() {
        return value;
    }
    let factor = 10f64.powi(decimals);
    let rounded = (value * factor).round() / factor;
    if rounded.is_finite() { rounded } else { value }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(clippy::unwrap_used, clippy::float_cmp)]

    use super::*;

    const DECIMALS: i32 = 10;

    fn eval(function: UnaryFn, x: f64) -> Result<f64, DomainError> {
        unary(function, x, AngleUnit::Deg, DECIMALS)
    }

    #[test]
    fn arithmetic() {
        assert_eq!(binary(BinaryOp::Add, 5.0, 3.0).unwrap(), 8.0);
        assert_eq!(binary(BinaryOp::Subtract, 5.0, 8.0).unwrap(), -3.0);
        assert_eq!(binary(BinaryOp::Multiply, 2.5, 4.0).unwrap(), 10.0);
        assert_eq!(binary(BinaryOp::Divide, 7.0, 2.0).unwrap(), 3.5);
        assert_eq!(binary(BinaryOp::Power, 2.0, 10.0).unwrap(), 1024.0);
    }

    #[test]
    fn divide_by_zero_fails() {
        assert!(matches!(
            binary(BinaryOp::Divide, 5.0, 0.0),
            Err(DomainError::DivisionByZero)
        ));
        assert!(matches!(
            binary(BinaryOp::Divide, 5.0, -0.0),
            Err(DomainError::DivisionByZero)
        ));
    }

    #[test]
    fn non_finite_results_pass_through() {
        assert_eq!(
            binary(BinaryOp::Multiply, 1e200, 1e200).unwrap(),
            f64::INFINITY
        );
        assert!(binary(BinaryOp::Power, -8.0, 0.5).unwrap().is_nan());
    }

    #[test]
    fn non_finite_operands_are_invalid_input() {
        assert!(matches!(
            binary(BinaryOp::Add, f64::NAN, 1.0),
            Err(DomainError::InvalidInput { .. })
        ));
        assert!(matches!(
            eval(UnaryFn::Sqrt, f64::INFINITY),
            Err(DomainError::InvalidInput { .. })
        ));
    }

    #[test]
    fn parse_operand_accepts_numbers_only() {
        assert_eq!(parse_operand("a", Some("-2.5")).unwrap(), -2.5);
        assert_eq!(parse_operand("a", Some("1e3")).unwrap(), 1000.0);
        assert!(matches!(
            parse_operand("a", Some("abc")),
            Err(DomainError::InvalidInput { .. })
        ));
        assert!(matches!(
            parse_operand("a", Some("Infinity")),
            Err(DomainError::InvalidInput { .. })
        ));
        assert!(matches!(
            parse_operand("b", None),
            Err(DomainError::InvalidInput { .. })
        ));
    }

    #[test]
    fn trig_in_degrees_hides_representation_noise() {
        assert_eq!(eval(UnaryFn::Sin, 30.0).unwrap(), 0.5);
        assert_eq!(eval(UnaryFn::Cos, 60.0).unwrap(), 0.5);
        assert_eq!(eval(UnaryFn::Cos, 90.0).unwrap(), 0.0);
        assert_eq!(eval(UnaryFn::Tan, 45.0).unwrap(), 1.0);
        assert_eq!(eval(UnaryFn::Sin, 180.0).unwrap(), 0.0);
    }

    #[test]
    fn tan_at_right_angles_is_infinite() {
        assert_eq!(eval(UnaryFn::Tan, 90.0).unwrap(), f64::INFINITY);
        assert_eq!(eval(UnaryFn::Tan, 270.0).unwrap(), f64::INFINITY);
        assert_eq!(eval(UnaryFn::Tan, -90.0).unwrap(), f64::INFINITY);
        assert_eq!(eval(UnaryFn::Tan, 180.0).unwrap(), 0.0);
    }

    #[test]
    fn trig_in_radians() {
        let x = unary(UnaryFn::Sin, std::f64::consts::FRAC_PI_2, AngleUnit::Rad, DECIMALS);
        assert_eq!(x.unwrap(), 1.0);
        let x = unary(UnaryFn::Cos, 0.0, AngleUnit::Rad, DECIMALS);
        assert_eq!(x.unwrap(), 1.0);
    }

    #[test]
    fn inverse_trig_respects_unit_and_domain() {
        assert_eq!(eval(UnaryFn::Asin, 1.0).unwrap(), 90.0);
        assert_eq!(eval(UnaryFn::Asin, 0.5).unwrap(), 30.0);
        assert_eq!(eval(UnaryFn::Acos, 1.0).unwrap(), 0.0);
        assert_eq!(eval(UnaryFn::Atan, 1.0).unwrap(), 45.0);
        assert!(matches!(
            eval(UnaryFn::Asin, 2.0),
            Err(DomainError::OutOfDomain {
                function: "asin",
                ..
            })
        ));
        assert!(matches!(
            eval(UnaryFn::Acos, -1.5),
            Err(DomainError::OutOfDomain { .. })
        ));

        let rad = unary(UnaryFn::Asin, 1.0, AngleUnit::Rad, DECIMALS).unwrap();
        assert_eq!(rad, round_to(std::f64::consts::FRAC_PI_2, DECIMALS));
    }

    #[test]
    fn roots_logs_and_inverse() {
        assert_eq!(eval(UnaryFn::Sqrt, 4.0).unwrap(), 2.0);
        assert!(matches!(
            eval(UnaryFn::Sqrt, -1.0),
            Err(DomainError::OutOfDomain { .. })
        ));
        assert_eq!(eval(UnaryFn::Log10, 1000.0).unwrap(), 3.0);
        assert_eq!(eval(UnaryFn::Ln, 1.0).unwrap(), 0.0);
        assert!(eval(UnaryFn::Log10, 0.0).is_err());
        assert!(eval(UnaryFn::Ln, -2.0).is_err());
        assert_eq!(eval(UnaryFn::Inverse, 4.0).unwrap(), 0.25);
        assert!(eval(UnaryFn::Inverse, 0.0).is_err());
    }

    #[test]
    fn factorial_rules() {
        assert_eq!(factorial(0.0).unwrap(), 1.0);
        assert_eq!(factorial(5.0).unwrap(), 120.0);
        assert!(factorial(170.0).unwrap().is_finite());
        assert_eq!(factorial(171.0).unwrap(), f64::INFINITY);
        assert!(factorial(-1.0).is_err());
        assert!(factorial(2.5).is_err());
    }

    #[test]
    fn rounding_passes_non_finite_through() {
        assert_eq!(round_to(0.123_456_789_012_34, 10), 0.123_456_789_0);
        assert_eq!(round_to(f64::NEG_INFINITY, 10), f64::NEG_INFINITY);
        assert!(round_to(f64::NAN, 10).is_nan());
    }
}
