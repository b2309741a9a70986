//! HTTP API for expense analysis.
//!
//! Exposes the scoring pipeline as JSON endpoints for the expense
//! submission flow and the admin dashboard. Routes are nested under `/api/`.
//!
//! The router is composable: `api_router()` returns a `Router` that can be
//! mounted on any axum server instance.

pub mod endpoints;
pub mod error;
pub mod router;
pub mod server;
pub mod types;

pub use router::api_router;
pub use server::{serve, StartupError};
pub use types::ApiContext;
