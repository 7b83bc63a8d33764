//! Calculator operation service.
//!
//! Each operation validates its operands, performs a single math call and
//! appends a record to the shared history:
//! - `domain`: pure math (`ops`), the `Service` and the `HistoryRepository` seam
//! - `infra`: the in-memory history store
//! - `api::rest`: axum handlers, Problem mapping and the OpenAPI document
//!
//! ```ignore
//! let service = Arc::new(Service::new(Arc::new(InMemoryHistory::default()), ServiceConfig::default()));
//! let app = calculator::router(service.clone());
//! let client = LocalClient::new(service);
//! ```

#![forbid(unsafe_code)]
#![cfg_attr(coverage_nightly, feature(coverage_attribute))]

pub mod api;
pub mod domain;
pub mod infra;

pub use api::rest::routes::router;
pub use domain::local_client::LocalClient;
pub use domain::repo::HistoryRepository;
pub use domain::service::{Service, ServiceConfig};
pub use infra::memory::InMemoryHistory;
