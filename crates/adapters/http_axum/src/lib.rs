//! # roomrunner-adapter-http-axum
//!
//! HTTP adapter built on [axum](https://docs.rs/axum).
//!
//! ## Responsibilities
//! - Serve the **REST JSON API** for room state
//!   (`/api/rooms/{id}/variables`, `/api/rooms/{id}/triggers`, …)
//! - Map HTTP requests into room manager calls (driving adapter)
//! - Map engine errors into HTTP responses
//!
//! ## Dependency rule
//! Depends on `roomrunner-engine` (for port traits and the room manager)
//! and `roomrunner-domain` (for domain types used in request/response
//! mapping). Never leaks axum types into the domain.

pub mod api;
pub mod error;
pub mod router;
pub mod state;
