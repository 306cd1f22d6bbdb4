//! # roomrunner-domain
//!
//! Pure domain model for the roomrunner room-automation system.
//!
//! ## Responsibilities
//! - Foundational types: typed identifiers, error conventions, timestamps
//! - Define **Variables** (named, typed pieces of room state)
//! - Define **Triggers** (watched-variable + condition + ordered action-list rules)
//! - Define **Actions** (configured side effects executed when a trigger fires)
//! - Define **Events** (variable-change records, broadcast effects, diagnostics)
//! - Define the **Room timer** state machine
//! - Contain all invariant enforcement and domain logic
//!
//! ## Dependency rule
//! This crate has **no internal dependencies**.
//! It must never import anything from `engine`, adapters, or external IO crates.
//! All IO boundaries are expressed as traits in the `engine` crate (ports).

pub mod error;
pub mod id;
pub mod time;

pub mod event;
pub mod room;
pub mod timer;
pub mod trigger;
pub mod variable;
