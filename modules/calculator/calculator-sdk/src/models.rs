//! Public models for the calculator module.
//!
//! These are transport-agnostic data structures shared by the operation
//! service, its REST client and the keypad engine.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use thiserror::Error;

/// Operation name that matches no known operator or function.
#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("unknown operation '{0}'")]
pub struct UnknownOperation(pub String);

/// Binary operators, evaluated eagerly against exactly two operands.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum BinaryOp {
    Add,
    Subtract,
    Multiply,
    Divide,
    Power,
}

impl BinaryOp {
    pub const ALL: [Self; 5] = [
        Self::Add,
        Self::Subtract,
        Self::Multiply,
        Self::Divide,
        Self::Power,
    ];

    /// Name used in URLs and history records.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Add => "add",
            Self::Subtract => "subtract",
            Self::Multiply => "multiply",
            Self::Divide => "divide",
            Self::Power => "power",
        }
    }

    /// Symbol shown in the operation label.
    #[must_use]
    pub const fn symbol(self) -> char {
        match self {
            Self::Add => '+',
            Self::Subtract => '-',
            Self::Multiply => '*',
            Self::Divide => '/',
            Self::Power => '^',
        }
    }

    #[must_use]
    pub fn from_symbol(symbol: char) -> Option<Self> {
        Self::ALL.into_iter().find(|op| op.symbol() == symbol)
    }
}

impl fmt::Display for BinaryOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for BinaryOp {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|op| op.name() == s)
            .ok_or_else(|| UnknownOperation(s.to_owned()))
    }
}

/// Unary scientific functions.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum UnaryFn {
    Sin,
    Cos,
    Tan,
    Asin,
    Acos,
    Atan,
    Sqrt,
    Log10,
    Ln,
    Inverse,
    Factorial,
}

impl UnaryFn {
    pub const ALL: [Self; 11] = [
        Self::Sin,
        Self::Cos,
        Self::Tan,
        Self::Asin,
        Self::Acos,
        Self::Atan,
        Self::Sqrt,
        Self::Log10,
        Self::Ln,
        Self::Inverse,
        Self::Factorial,
    ];

    /// Name used in URLs and history records.
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Sin => "sin",
            Self::Cos => "cos",
            Self::Tan => "tan",
            Self::Asin => "asin",
            Self::Acos => "acos",
            Self::Atan => "atan",
            Self::Sqrt => "sqrt",
            Self::Log10 => "log10",
            Self::Ln => "ln",
            Self::Inverse => "inverse",
            Self::Factorial => "factorial",
        }
    }

    /// Short name shown on the keypad and in the operation label.
    #[must_use]
    pub const fn label(self) -> &'static str {
        match self {
            Self::Log10 => "log",
            Self::Inverse => "inv",
            Self::Factorial => "fact",
            other => other.name(),
        }
    }

    /// Forward trigonometric functions take their argument in the angle unit.
    #[must_use]
    pub const fn is_trig(self) -> bool {
        matches!(self, Self::Sin | Self::Cos | Self::Tan)
    }

    /// Inverse trigonometric functions return their result in the angle unit.
    #[must_use]
    pub const fn is_inverse_trig(self) -> bool {
        matches!(self, Self::Asin | Self::Acos | Self::Atan)
    }

    #[must_use]
    pub const fn uses_angle_unit(self) -> bool {
        self.is_trig() || self.is_inverse_trig()
    }
}

impl fmt::Display for UnaryFn {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for UnaryFn {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::ALL
            .into_iter()
            .find(|f| f.name() == s)
            .ok_or_else(|| UnknownOperation(s.to_owned()))
    }
}

/// Angle unit for trigonometric functions. Degrees unless stated otherwise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AngleUnit {
    #[default]
    Deg,
    Rad,
}

impl AngleUnit {
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Deg => "deg",
            Self::Rad => "rad",
        }
    }

    #[must_use]
    pub const fn toggled(self) -> Self {
        match self {
            Self::Deg => Self::Rad,
            Self::Rad => Self::Deg,
        }
    }
}

impl fmt::Display for AngleUnit {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for AngleUnit {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.to_ascii_lowercase().as_str() {
            "deg" | "degrees" => Ok(Self::Deg),
            "rad" | "radians" => Ok(Self::Rad),
            other => Err(format!("unknown angle unit '{other}', expected deg or rad")),
        }
    }
}

/// Any operation the service can record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum Operation {
    Binary(BinaryOp),
    Unary(UnaryFn),
    Random,
}

impl Operation {
    #[must_use]
    pub const fn name(self) -> &'static str {
        match self {
            Self::Binary(op) => op.name(),
            Self::Unary(function) => function.name(),
            Self::Random => "random",
        }
    }
}

impl fmt::Display for Operation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for Operation {
    type Err = UnknownOperation;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        if s == "random" {
            return Ok(Self::Random);
        }
        s.parse::<BinaryOp>()
            .map(Self::Binary)
            .or_else(|_| s.parse::<UnaryFn>().map(Self::Unary))
    }
}

impl From<Operation> for String {
    fn from(op: Operation) -> Self {
        op.name().to_owned()
    }
}

impl TryFrom<String> for Operation {
    type Error = UnknownOperation;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        value.parse()
    }
}

impl From<BinaryOp> for Operation {
    fn from(op: BinaryOp) -> Self {
        Self::Binary(op)
    }
}

impl From<UnaryFn> for Operation {
    fn from(function: UnaryFn) -> Self {
        Self::Unary(function)
    }
}

/// One completed operation. History is append-only.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct HistoryEntry {
    pub operation: Operation,
    #[serde(with = "crate::wire::numbers")]
    pub operands: Vec<f64>,
    #[serde(with = "crate::wire::number")]
    pub result: f64,
    /// Present for trigonometric and inverse trigonometric operations only.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub unit: Option<AngleUnit>,
    pub recorded_at: DateTime<Utc>,
}
