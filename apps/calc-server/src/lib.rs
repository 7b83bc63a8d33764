#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
//! Calculator HTTP server: layered configuration, logging and the axum app.

pub mod config;
pub mod cors;
pub mod logging;
pub mod server;
pub mod signals;

pub use config::AppConfig;
pub use server::{build_app, run, serve};
