#![cfg_attr(coverage_nightly, feature(coverage_attribute))]
#![forbid(unsafe_code)]
//! Calculator keypad: entry state, key mapping and the session that talks to
//! the operation service.
//!
//! [`Engine`] is a synchronous state machine and can be driven by any front
//! end. [`Session`] runs an engine on a tokio task against a
//! [`calculator_sdk::CalculatorClient`] and publishes [`Snapshot`]s.

pub mod engine;
pub mod entry;
pub mod format;
pub mod input;
pub mod session;

pub use engine::{Call, Engine, Request, Resolution, Step, Ticket};
pub use entry::{EntryState, Phase};
pub use format::{format_number, parse_display};
pub use input::{Constant, Input, UnknownKey, parse_line};
pub use session::{Session, SessionConfig, SessionError, SessionHandle, Snapshot};
