//! JSON encoding for numbers that may be non-finite.
//!
//! JSON has no literal for infinities or NaN, so they travel as the strings
//! `"Infinity"`, `"-Infinity"` and `"NaN"`. Finite values stay plain numbers.
//!
//! Use with `#[serde(with = "calculator_sdk::wire::number")]` on `f64` fields
//! and `#[serde(with = "calculator_sdk::wire::numbers")]` on `Vec<f64>` fields.

use serde::{Deserialize, Serialize};

pub const INFINITY: &str = "Infinity";
pub const NEG_INFINITY: &str = "-Infinity";
pub const NAN: &str = "NaN";

#[derive(Serialize, Deserialize)]
#[serde(untagged)]
enum Repr {
    Number(f64),
    Text(String),
}

impl From<f64> for Repr {
    fn from(value: f64) -> Self {
        if value.is_finite() {
            Self::Number(value)
        } else {
            Self::Text(to_text(value))
        }
    }
}

impl Repr {
    fn into_f64(self) -> Result<f64, String> {
        match self {
            Self::Number(n) => Ok(n),
            Self::Text(s) => parse_text(&s).ok_or_else(|| format!("invalid number '{s}'")),
        }
    }
}

/// Text form of a number, as used in query strings and paths.
///
/// Finite values use the shortest representation that reads back exactly.
#[must_use]
pub fn to_text(value: f64) -> String {
    if value.is_nan() {
        NAN.to_owned()
    } else if value.is_infinite() {
        if value.is_sign_positive() {
            INFINITY.to_owned()
        } else {
            NEG_INFINITY.to_owned()
        }
    } else {
        format!("{value}")
    }
}

/// Inverse of [`to_text`]. Accepts any decimal or exponent literal.
#[must_use]
pub fn parse_text(text: &str) -> Option<f64> {
    match text.trim() {
        INFINITY => Some(f64::INFINITY),
        NEG_INFINITY => Some(f64::NEG_INFINITY),
        NAN => Some(f64::NAN),
        other if other.chars().all(|c| c.is_ascii_digit() || "+-.eE".contains(c)) => {
            other.parse().ok()
        }
        _ => None,
    }
}

pub mod number {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Repr;

    /// # Errors
    /// Propagates serializer failures.
    #[allow(clippy::trivially_copy_pass_by_ref)] // serde requires &T signature
    pub fn serialize<S: Serializer>(value: &f64, serializer: S) -> Result<S::Ok, S::Error> {
        Repr::from(*value).serialize(serializer)
    }

    /// # Errors
    /// Fails on anything other than a number or one of the non-finite names.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<f64, D::Error> {
        Repr::deserialize(deserializer)?
            .into_f64()
            .map_err(serde::de::Error::custom)
    }
}

pub mod numbers {
    use serde::{Deserialize, Deserializer, Serialize, Serializer};

    use super::Repr;

    /// # Errors
    /// Propagates serializer failures.
    pub fn serialize<S: Serializer>(values: &[f64], serializer: S) -> Result<S::Ok, S::Error> {
        let reprs: Vec<Repr> = values.iter().copied().map(Repr::from).collect();
        reprs.serialize(serializer)
    }

    /// # Errors
    /// Fails if any element is not a number or a non-finite name.
    pub fn deserialize<'de, D: Deserializer<'de>>(deserializer: D) -> Result<Vec<f64>, D::Error> {
        Vec::<Repr>::deserialize(deserializer)?
            .into_iter()
            .map(Repr::into_f64)
            .collect::<Result<_, _>>()
            .map_err(serde::de::Error::custom)
    }
}

#[cfg(test)]
#[cfg_attr(coverage_nightly, coverage(off))]
mod tests {
    #![allow(clippy::unwrap_used, clippy::float_cmp)]

    use super::*;

    #[derive(Serialize, Deserialize)]
    struct Sample {
        #[serde(with = "number")]
        value: f64,
        #[serde(with = "numbers")]
        values: Vec<f64>,
    }

    #[test]
    fn non_finite_values_travel_as_strings() {
        let sample = Sample {
            value: f64::INFINITY,
            values: vec![1.5, f64::NEG_INFINITY, f64::NAN],
        };
        let json = serde_json::to_string(&sample).unwrap();
        assert_eq!(
            json,
            r#"{"value":"Infinity","values":[1.5,"-Infinity","NaN"]}"#
        );

        let back: Sample = serde_json::from_str(&json).unwrap();
        assert_eq!(back.value, f64::INFINITY);
        assert_eq!(back.values[1], f64::NEG_INFINITY);
        assert!(back.values[2].is_nan());
    }

    #[test]
    fn unknown_strings_are_rejected() {
        let err = serde_json::from_str::<Sample>(r#"{"value":"lots","values":[]}"#);
        assert!(err.is_err());
    }

    #[test]
    fn text_form() {
        assert_eq!(to_text(2.5), "2.5");
        assert_eq!(to_text(-3.0), "-3");
        assert_eq!(to_text(f64::NAN), "NaN");
        assert_eq!(parse_text("-Infinity"), Some(f64::NEG_INFINITY));
        assert_eq!(parse_text("1e3"), Some(1000.0));
        assert_eq!(parse_text("abc"), None);
        assert_eq!(parse_text("inf"), None);
        assert_eq!(parse_text(""), None);
    }
}
