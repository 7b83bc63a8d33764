//! Number rendering for the display.

use calculator_sdk::wire;

/// Display text after a failed evaluation.
pub const ERROR_SENTINEL: &str = "Error";

/// Significant digits kept when rendering a computed value.
pub const SIGNIFICANT_DIGITS: usize = 12;

const EXPONENT_ABOVE: f64 = 1e15;
const EXPONENT_BELOW: f64 = 1e-9;

/// Render a number for the display.
///
/// Rounds to [`SIGNIFICANT_DIGITS`] so binary noise disappears
/// (`0.1 + 0.2` shows `0.3`), prints integers without a fraction and switches
/// to exponent form for very large or very small magnitudes.
#[must_use]
pub fn format_number(value: f64) -> String {
    if !value.is_finite() {
        return wire::to_text(value);
    }
    if value == 0.0 {
        return "0".to_owned();
    }
    let rounded = round_significant(value);
    let magnitude = rounded.abs();
    if (EXPONENT_BELOW..EXPONENT_ABOVE).contains(&magnitude) {
        format!("{rounded}")
    } else {
        format!("{rounded:e}")
    }
}

fn round_significant(value: f64) -> f64 {
    let precision = SIGNIFICANT_DIGITS - 1;
    format!("{value:.precision$e}").parse().unwrap_or(value)
}

/// Numeric value of display text; `None` for the error sentinel or garbage.
#[must_use]
pub fn parse_display(text: &str) -> Option<f64> {
    if text == ERROR_SENTINEL {
        return None;
    }
    wire::parse_text(text)
}
