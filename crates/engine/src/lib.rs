//! # roomrunner-engine
//!
//! Application layer — the per-room automation core and **port
//! definitions** (traits).
//!
//! ## Responsibilities
//! - The **variable store**: typed, versioned room state with single-writer
//!   ordering per room
//! - The **trigger registry**: ordered, load-time-validated trigger rules
//! - The **trigger dispatcher**: matches change events to triggers and runs
//!   their actions depth-first under a cascade ceiling
//! - The **action executor registry**: pluggable per-action-type executors
//! - The **room engine / manager**: one isolated engine per active room
//! - Define **port traits** that adapters must implement:
//!   - [`ports::EventPublisher`] — outbound room event stream
//!   - [`ports::WebhookTransport`] — HTTP delivery for webhook actions
//!   - [`ports::RoomConfigStore`] — persistence for room configuration
//! - Provide **in-process infrastructure** (event bus) that doesn't need IO
//!
//! ## Dependency rule
//! Depends on `roomrunner-domain` only (plus `tokio::sync` for channels).
//! Never imports adapter crates. Adapters depend on *this* crate, not the
//! reverse.

pub mod dispatcher;
pub mod event_bus;
pub mod executor;
pub mod executors;
pub mod manager;
pub mod ports;
pub mod registry;
pub mod room;
pub mod store;
