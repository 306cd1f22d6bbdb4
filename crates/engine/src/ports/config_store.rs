//! Room configuration port — persistence for room documents.

use std::future::Future;

use roomrunner_domain::error::{ConfigurationError, EngineError};
use roomrunner_domain::id::RoomId;
use roomrunner_domain::room::RoomConfig;

/// A room configuration together with the entries the lenient parser
/// had to quarantine.
#[derive(Debug)]
pub struct LoadedRoomConfig {
    pub config: RoomConfig,
    pub quarantined: Vec<ConfigurationError>,
}

/// Repository for persisting and querying [`RoomConfig`] documents.
pub trait RoomConfigStore {
    /// Load one room's configuration, or `None` if it does not exist.
    fn load(
        &self,
        id: RoomId,
    ) -> impl Future<Output = Result<Option<LoadedRoomConfig>, EngineError>> + Send;

    /// Load every persisted room configuration.
    fn load_all(&self) -> impl Future<Output = Result<Vec<RoomConfig>, EngineError>> + Send;

    /// Persist a room configuration, replacing any previous version.
    fn save(&self, config: &RoomConfig) -> impl Future<Output = Result<(), EngineError>> + Send;

    /// Delete a room configuration.
    fn delete(&self, id: RoomId) -> impl Future<Output = Result<(), EngineError>> + Send;
}

impl<T: RoomConfigStore + Send + Sync> RoomConfigStore for std::sync::Arc<T> {
    fn load(
        &self,
        id: RoomId,
    ) -> impl Future<Output = Result<Option<LoadedRoomConfig>, EngineError>> + Send {
        (**self).load(id)
    }

    fn load_all(&self) -> impl Future<Output = Result<Vec<RoomConfig>, EngineError>> + Send {
        (**self).load_all()
    }

    fn save(&self, config: &RoomConfig) -> impl Future<Output = Result<(), EngineError>> + Send {
        (**self).save(config)
    }

    fn delete(&self, id: RoomId) -> impl Future<Output = Result<(), EngineError>> + Send {
        (**self).delete(id)
    }
}
