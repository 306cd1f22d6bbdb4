//! # roomrunner-adapter-config-json
//!
//! [`RoomConfigStore`] adapter that persists each room as one JSON
//! document (`<room-id>.json`) in a configurable directory. The external
//! editor writes the same documents; parsing goes through the domain's
//! lenient parser so malformed entries are quarantined, not fatal.

use std::path::{Path, PathBuf};

use roomrunner_domain::error::{EngineError, StorageError};
use roomrunner_domain::id::RoomId;
use roomrunner_domain::room::RoomConfig;
use roomrunner_engine::ports::{LoadedRoomConfig, RoomConfigStore};

/// Filesystem-backed room configuration store.
pub struct JsonRoomConfigStore {
    dir: PathBuf,
}

impl JsonRoomConfigStore {
    /// Create a store rooted at `dir`. The directory is created lazily
    /// on first save.
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    /// The directory holding the room documents.
    #[must_use]
    pub fn dir(&self) -> &Path {
        &self.dir
    }

    fn path_for(&self, id: RoomId) -> PathBuf {
        self.dir.join(format!("{id}.json"))
    }

    fn parse_document(raw: &str) -> Result<LoadedRoomConfig, EngineError> {
        let value: serde_json::Value = serde_json::from_str(raw).map_err(StorageError::Serde)?;
        let (config, quarantined) = RoomConfig::parse(value).map_err(StorageError::Serde)?;
        Ok(LoadedRoomConfig {
            config,
            quarantined,
        })
    }
}

impl RoomConfigStore for JsonRoomConfigStore {
    async fn load(&self, id: RoomId) -> Result<Option<LoadedRoomConfig>, EngineError> {
        let path = self.path_for(id);
        let raw = match tokio::fs::read_to_string(&path).await {
            Ok(raw) => raw,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(None),
            Err(err) => return Err(StorageError::Io(err).into()),
        };
        Self::parse_document(&raw).map(Some)
    }

    async fn load_all(&self) -> Result<Vec<RoomConfig>, EngineError> {
        let mut entries = match tokio::fs::read_dir(&self.dir).await {
            Ok(entries) => entries,
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(err) => return Err(StorageError::Io(err).into()),
        };

        let mut configs = Vec::new();
        while let Some(entry) = entries.next_entry().await.map_err(StorageError::Io)? {
            let path = entry.path();
            if path.extension().is_none_or(|ext| ext != "json") {
                continue;
            }
            let raw = tokio::fs::read_to_string(&path)
                .await
                .map_err(StorageError::Io)?;
            match Self::parse_document(&raw) {
                Ok(loaded) => configs.push(loaded.config),
                Err(err) => {
                    // A corrupt document should not hide the other rooms.
                    tracing::warn!(path = %path.display(), error = %err, "skipping unreadable room document");
                }
            }
        }
        configs.sort_by(|a, b| a.name.cmp(&b.name));
        Ok(configs)
    }

    async fn save(&self, config: &RoomConfig) -> Result<(), EngineError> {
        tokio::fs::create_dir_all(&self.dir)
            .await
            .map_err(StorageError::Io)?;
        let raw = serde_json::to_string_pretty(config).map_err(StorageError::Serde)?;
        tokio::fs::write(self.path_for(config.id), raw)
            .await
            .map_err(StorageError::Io)?;
        Ok(())
    }

    async fn delete(&self, id: RoomId) -> Result<(), EngineError> {
        match tokio::fs::remove_file(self.path_for(id)).await {
            Ok(()) => Ok(()),
            Err(err) if err.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(err) => Err(StorageError::Io(err).into()),
        }
    }
}
