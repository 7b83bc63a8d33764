//! Error data types shared by the calculator server and its clients
//!
//! This crate provides pure data types for error handling, with no dependencies
//! on HTTP frameworks unless the `axum` feature is enabled. It includes:
//! - RFC 9457 Problem Details (`Problem`)
//! - The calculator error catalog (`ErrDef` and its entries)
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod catalog;
pub mod problem;

pub use catalog::ErrDef;
pub use problem::{APPLICATION_PROBLEM_JSON, Problem};

/// Attach the request path and trace id to a problem.
pub fn finalize(mut p: Problem, instance: &str, trace_id: Option<String>) -> Problem {
    instance.clone_into(&mut p.instance);
    p.trace_id = trace_id;
    p
}
