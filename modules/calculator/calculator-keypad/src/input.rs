//! Discrete user inputs and the semantic key mapping.

use std::f64::consts;

use calculator_sdk::{AngleUnit, BinaryOp, UnaryFn};
use thiserror::Error;

/// Named constants available on the keypad.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Constant {
    Pi,
    E,
}

impl Constant {
    #[must_use]
    pub const fn value(self) -> f64 {
        match self {
            Self::Pi => consts::PI,
            Self::E => consts::E,
        }
    }
}

/// One keypad press.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Input {
    /// A single decimal digit, `0..=9`.
    Digit(u8),
    Decimal,
    Operator(BinaryOp),
    Equals,
    Scientific(UnaryFn),
    Constant(Constant),
    RecallAnswer,
    Clear,
    Delete,
    Negate,
    Percent,
    Random,
    SetAngleUnit(AngleUnit),
    ToggleAngleUnit,
}

impl Input {
    /// Inputs that may issue a service request.
    #[must_use]
    pub const fn is_finalize(self) -> bool {
        matches!(
            self,
            Self::Operator(_) | Self::Equals | Self::Scientific(_) | Self::Random
        )
    }

    /// Map a key name or token to an input.
    ///
    /// Accepts single characters (`7`, `.`, `+`, `\u{00d7}`), key names
    /// (`Enter`, `Escape`, `Backspace`) and keypad tokens (`sin`, `pi`, `ans`).
    #[must_use]
    pub fn from_key(key: &str) -> Option<Self> {
        let input = match key {
            "." | "," => Self::Decimal,
            "x" | "\u{00d7}" => Self::Operator(BinaryOp::Multiply),
            "\u{00f7}" => Self::Operator(BinaryOp::Divide),
            "\u{2212}" => Self::Operator(BinaryOp::Subtract),
            "Enter" | "=" => Self::Equals,
            "Escape" | "c" | "C" => Self::Clear,
            "Backspace" | "Delete" => Self::Delete,
            "%" => Self::Percent,
            "sin" => Self::Scientific(UnaryFn::Sin),
            "cos" => Self::Scientific(UnaryFn::Cos),
            "tan" => Self::Scientific(UnaryFn::Tan),
            "asin" => Self::Scientific(UnaryFn::Asin),
            "acos" => Self::Scientific(UnaryFn::Acos),
            "atan" => Self::Scientific(UnaryFn::Atan),
            "sqrt" => Self::Scientific(UnaryFn::Sqrt),
            "log" => Self::Scientific(UnaryFn::Log10),
            "ln" => Self::Scientific(UnaryFn::Ln),
            "inv" => Self::Scientific(UnaryFn::Inverse),
            "fact" | "n!" => Self::Scientific(UnaryFn::Factorial),
            "pi" => Self::Constant(Constant::Pi),
            "e" => Self::Constant(Constant::E),
            "ans" => Self::RecallAnswer,
            "rnd" => Self::Random,
            "neg" => Self::Negate,
            "deg" => Self::SetAngleUnit(AngleUnit::Deg),
            "rad" => Self::SetAngleUnit(AngleUnit::Rad),
            "drg" => Self::ToggleAngleUnit,
            other => return Self::from_char_key(other),
        };
        Some(input)
    }

    fn from_char_key(key: &str) -> Option<Self> {
        let mut chars = key.chars();
        let c = chars.next()?;
        if chars.next().is_some() {
            return None;
        }
        if let Some(d) = c.to_digit(10) {
            return u8::try_from(d).ok().map(Self::Digit);
        }
        BinaryOp::from_symbol(c).map(Self::Operator)
    }
}

/// A token that maps to no input.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown key '{0}'")]
pub struct UnknownKey(pub String);

/// Split a typed line into inputs.
///
/// Whitespace separates tokens. A token that is not a key name is read
/// character by character, so `12.5+3=` works as well as `12.5 + 3 =`.
///
/// # Errors
/// `UnknownKey` for the first token that contains an unmapped character.
pub fn parse_line(line: &str) -> Result<Vec<Input>, UnknownKey> {
    let mut inputs = Vec::new();
    for token in line.split_whitespace() {
        if let Some(input) = Input::from_key(token) {
            inputs.push(input);
            continue;
        }
        for c in token.chars() {
            let mut buf = [0u8; 4];
            let input =
                Input::from_key(c.encode_utf8(&mut buf)).ok_or_else(|| UnknownKey(token.to_owned()))?;
            inputs.push(input);
        }
    }
    Ok(inputs)
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(clippy::unwrap_used)]

    use super::*;

    #[test]
    fn digits_and_operators() {
        for d in 0..=9u8 {
            assert_eq!(Input::from_key(&d.to_string()), Some(Input::Digit(d)));
        }
        assert_eq!(
            Input::from_key("^"),
            Some(Input::Operator(BinaryOp::Power))
        );
        assert_eq!(
            Input::from_key("x"),
            Some(Input::Operator(BinaryOp::Multiply))
        );
        assert_eq!(
            Input::from_key("\u{00f7}"),
            Some(Input::Operator(BinaryOp::Divide))
        );
        assert_eq!(Input::from_key(","), Some(Input::Decimal));
    }

    #[test]
    fn key_names_and_tokens() {
        assert_eq!(Input::from_key("Enter"), Some(Input::Equals));
        assert_eq!(Input::from_key("Escape"), Some(Input::Clear));
        assert_eq!(Input::from_key("C"), Some(Input::Clear));
        assert_eq!(Input::from_key("Backspace"), Some(Input::Delete));
        assert_eq!(
            Input::from_key("log"),
            Some(Input::Scientific(UnaryFn::Log10))
        );
        assert_eq!(Input::from_key("pi"), Some(Input::Constant(Constant::Pi)));
        assert_eq!(Input::from_key("ans"), Some(Input::RecallAnswer));
        assert_eq!(
            Input::from_key("rad"),
            Some(Input::SetAngleUnit(AngleUnit::Rad))
        );
        assert_eq!(Input::from_key("sinh"), None);
        assert_eq!(Input::from_key(""), None);
    }

    #[test]
    fn finalize_inputs() {
        assert!(Input::Equals.is_finalize());
        assert!(Input::Random.is_finalize());
        assert!(Input::Operator(BinaryOp::Add).is_finalize());
        assert!(!Input::Digit(1).is_finalize());
        assert!(!Input::Clear.is_finalize());
    }

    #[test]
    fn lines_split_into_inputs() {
        let compact = parse_line("12.5+3=").unwrap();
        let spaced = parse_line("12.5 + 3 =").unwrap();
        assert_eq!(compact, spaced);
        assert_eq!(
            compact,
            vec![
                Input::Digit(1),
                Input::Digit(2),
                Input::Decimal,
                Input::Digit(5),
                Input::Operator(BinaryOp::Add),
                Input::Digit(3),
                Input::Equals,
            ]
        );

        assert_eq!(
            parse_line("9 sqrt").unwrap(),
            vec![Input::Digit(9), Input::Scientific(UnaryFn::Sqrt)]
        );
        assert_eq!(parse_line("5 ? 3"), Err(UnknownKey("?".to_owned())));
        assert!(parse_line("   ").unwrap().is_empty());
    }
}
