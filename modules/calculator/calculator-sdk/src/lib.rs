//! Calculator SDK
//!
//! This crate provides the public contract of the calculator module:
//! - `CalculatorClient` trait, the only way the keypad engine talks to the
//!   operation service
//! - Model types (`BinaryOp`, `UnaryFn`, `AngleUnit`, `HistoryEntry`)
//! - Error type (`CalculatorError`)
//! - `RestCalculatorClient`, an implementation over the REST API
//!
//! ```ignore
//! let client = RestCalculatorClient::new("http://127.0.0.1:3000", Duration::from_secs(5))?;
//! let sum = client.evaluate_binary(BinaryOp::Add, 2.0, 3.0).await?;
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod client;
pub mod errors;
pub mod models;
pub mod wire;

pub use api::CalculatorClient;
pub use client::RestCalculatorClient;
pub use errors::CalculatorError;
pub use models::{AngleUnit, BinaryOp, HistoryEntry, Operation, UnaryFn, UnknownOperation};
