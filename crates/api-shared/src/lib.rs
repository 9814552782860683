//! # API Shared
//!
//! Shared wire definitions for the clinic APIs.
//!
//! Contains:
//! - JSON request/response types (`pb` module)
//! - Shared services like `HealthService`
//!
//! Used by `api-rest` on the serving side and `clinic-client` on the consuming side, so both
//! agree on field names (camelCase) and timestamp encoding (RFC 3339, UTC).

#![warn(rust_2018_idioms)]

pub mod health;
pub mod pb;

pub use health::HealthService;
pub use pb::*;
