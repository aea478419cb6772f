//! invoiceme-core: shared infrastructure for the InvoiceMe client crates.
pub mod config;
pub mod error;
pub mod middleware;
pub mod observability;

pub use axum;
pub use serde_json;
pub use tracing;
pub use validator;
