//! Static error catalog for the calculator API.
//!
//! Every failure the REST layer can emit is declared here once, so the server
//! and the REST client agree on codes without sharing any other types.

use crate::problem::Problem;

/// Static error definition from catalog
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ErrDef {
    pub status: u16,
    pub title: &'static str,
    pub code: &'static str,
    pub type_url: &'static str,
}

impl ErrDef {
    /// Problem for this entry with an occurrence-specific `detail`.
    pub fn as_problem(&self, detail: impl Into<String>) -> Problem {
        Problem {
            type_url: self.type_url.to_owned(),
            title: self.title.to_owned(),
            status: self.status,
            detail: detail.into(),
            instance: String::new(),
            code: self.code.to_owned(),
            trace_id: None,
        }
    }

    /// Same as [`ErrDef::as_problem`], with request path and trace id attached.
    pub fn with_context(
        &self,
        detail: impl Into<String>,
        instance: &str,
        trace_id: Option<String>,
    ) -> Problem {
        crate::finalize(self.as_problem(detail), instance, trace_id)
    }
}

/// An operand could not be read as a finite number.
pub const INVALID_INPUT: ErrDef = ErrDef {
    status: 400,
    title: "Invalid Input",
    code: "CALC_INVALID_INPUT",
    type_url: "https://errors.calc.dev/CALC_INVALID_INPUT",
};

/// Divisor was zero.
pub const DIVISION_BY_ZERO: ErrDef = ErrDef {
    status: 400,
    title: "Division By Zero",
    code: "CALC_DIVISION_BY_ZERO",
    type_url: "https://errors.calc.dev/CALC_DIVISION_BY_ZERO",
};

/// Operand lies outside the function's domain.
pub const OUT_OF_DOMAIN: ErrDef = ErrDef {
    status: 400,
    title: "Out Of Domain",
    code: "CALC_OUT_OF_DOMAIN",
    type_url: "https://errors.calc.dev/CALC_OUT_OF_DOMAIN",
};

pub const UNKNOWN_OPERATION: ErrDef = ErrDef {
    status: 404,
    title: "Unknown Operation",
    code: "CALC_UNKNOWN_OPERATION",
    type_url: "https://errors.calc.dev/CALC_UNKNOWN_OPERATION",
};

pub const INTERNAL: ErrDef = ErrDef {
    status: 500,
    title: "Internal Server Error",
    code: "CALC_INTERNAL",
    type_url: "https://errors.calc.dev/CALC_INTERNAL",
};

/// All catalog entries, in declaration order.
pub const ALL: [ErrDef; 5] = [
    INVALID_INPUT,
    DIVISION_BY_ZERO,
    OUT_OF_DOMAIN,
    UNKNOWN_OPERATION,
    INTERNAL,
];

/// Find a catalog entry by its machine-readable code.
#[must_use]
pub fn lookup(code: &str) -> Option<&'static ErrDef> {
    ALL.iter().find(|def| def.code == code)
}
