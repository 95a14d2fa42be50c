//! hostpress-axum: Axum adapter for hostpress.
//!
//! Builds axum routers from hostpress services. The tenant of every
//! request is its raw `Host` header.

pub mod app;
pub mod params;
pub mod rest;
pub mod state;
mod error;

pub use error::HostpressAxumError;
pub use state::HostpressAxumState;

pub use app::{axum, AxumApp};
