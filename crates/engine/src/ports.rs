//! Port definitions — traits that adapters implement.
//!
//! Ports are the boundaries between the application core and the outside
//! world. They are defined here (in `engine`) so that both the use-case
//! layer and the adapter layer can depend on them without creating
//! circular dependencies.

pub mod config_store;
pub mod event_bus;
pub mod webhook;

pub use config_store::{LoadedRoomConfig, RoomConfigStore};
pub use event_bus::EventPublisher;
pub use webhook::{WebhookRequest, WebhookResponse, WebhookTransport};
