//! Room manager — activation lifecycle for all rooms of one deployment.
//!
//! Rooms are fully independent: each active room gets its own
//! [`RoomEngine`] with no shared mutable state. The manager only maps
//! room ids to engines, loads configuration through the
//! [`RoomConfigStore`] port, and fans the periodic timer tick out to
//! every active room.

use std::collections::HashMap;
use std::sync::{Arc, PoisonError, RwLock, RwLockReadGuard, RwLockWriteGuard};

use roomrunner_domain::error::{EngineError, NotFoundError};
use roomrunner_domain::event::{ChangeEvent, Diagnostic, RoomEvent, WriteOrigin};
use roomrunner_domain::id::RoomId;
use roomrunner_domain::room::RoomConfig;
use roomrunner_domain::timer::TimerCommand;
use roomrunner_domain::trigger::Trigger;
use roomrunner_domain::variable::Variable;

use crate::executor::ExecutorRegistry;
use crate::ports::{EventPublisher, RoomConfigStore};
use crate::room::RoomEngine;

/// Holds every active [`RoomEngine`] and the persistence behind them.
pub struct RoomManager<CS, P> {
    config_store: CS,
    executors: Arc<ExecutorRegistry>,
    publisher: P,
    active: RwLock<HashMap<RoomId, Arc<RoomEngine<P>>>>,
}

impl<CS, P> RoomManager<CS, P>
where
    CS: RoomConfigStore + Send + Sync,
    P: EventPublisher + Clone + Send + Sync,
{
    /// Create a manager with no active rooms.
    pub fn new(config_store: CS, executors: Arc<ExecutorRegistry>, publisher: P) -> Self {
        Self {
            config_store,
            executors,
            publisher,
            active: RwLock::new(HashMap::new()),
        }
    }

    /// Activate a room from its persisted configuration.
    ///
    /// Re-activating an already-active room tears the old engine down
    /// and builds a fresh one — no trigger state survives.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when no configuration exists,
    /// or a storage error from the config store.
    pub async fn activate_room(&self, id: RoomId) -> Result<(), EngineError> {
        let loaded = self
            .config_store
            .load(id)
            .await?
            .ok_or_else(|| not_found(id))?;

        for error in loaded.quarantined {
            tracing::warn!(room_id = %id, error = %error, "quarantined room config entry");
            let _ = self
                .publisher
                .publish(RoomEvent::Diagnostic(Diagnostic::Configuration {
                    room_id: id,
                    trigger_id: None,
                    message: error.to_string(),
                }))
                .await;
        }

        let engine = RoomEngine::activate(
            loaded.config,
            Arc::clone(&self.executors),
            self.publisher.clone(),
        )
        .await;

        let previous = self.write_active().insert(id, Arc::new(engine));
        if let Some(previous) = previous {
            previous.deactivate();
        }
        Ok(())
    }

    /// Deactivate a room, discarding all live state.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the room is not active.
    pub fn deactivate_room(&self, id: RoomId) -> Result<(), EngineError> {
        let engine = self
            .write_active()
            .remove(&id)
            .ok_or_else(|| not_found(id))?;
        engine.deactivate();
        Ok(())
    }

    /// The engine for an active room.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the room is not active.
    pub fn engine(&self, id: RoomId) -> Result<Arc<RoomEngine<P>>, EngineError> {
        self.read_active()
            .get(&id)
            .cloned()
            .ok_or_else(|| not_found(id))
    }

    /// Write a variable in an active room.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] for inactive rooms or
    /// [`EngineError::Validation`] for rejected writes.
    pub async fn write(
        &self,
        id: RoomId,
        name: &str,
        value: &serde_json::Value,
        origin: WriteOrigin,
    ) -> Result<Option<ChangeEvent>, EngineError> {
        self.engine(id)?.write(name, value, origin).await
    }

    /// Snapshot of an active room's variables.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the room is not active.
    pub fn variables(&self, id: RoomId) -> Result<Vec<Variable>, EngineError> {
        Ok(self.engine(id)?.variables())
    }

    /// Apply a timer command to an active room.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the room is not active.
    pub async fn apply_timer_command(
        &self,
        id: RoomId,
        command: &TimerCommand,
    ) -> Result<bool, EngineError> {
        self.engine(id)?.apply_timer_command(command).await
    }

    /// Drive every active room's timer upkeep once.
    pub async fn tick_all(&self) {
        let engines: Vec<Arc<RoomEngine<P>>> = self.read_active().values().cloned().collect();
        for engine in engines {
            engine.tick().await;
        }
    }

    /// Every persisted room configuration.
    ///
    /// # Errors
    ///
    /// Returns a storage error from the config store.
    pub async fn list_rooms(&self) -> Result<Vec<RoomConfig>, EngineError> {
        self.config_store.load_all().await
    }

    /// The persisted trigger list of a room.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when no configuration exists.
    pub async fn triggers(&self, id: RoomId) -> Result<Vec<Trigger>, EngineError> {
        let loaded = self
            .config_store
            .load(id)
            .await?
            .ok_or_else(|| not_found(id))?;
        Ok(loaded.config.triggers)
    }

    /// Replace a room's persisted trigger list (editor write-back).
    ///
    /// If the room is active it is re-activated so the running registry
    /// picks up the new definitions.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] for structurally invalid
    /// triggers, [`EngineError::NotFound`] for unknown rooms, or a
    /// storage error from the config store.
    pub async fn update_triggers(
        &self,
        id: RoomId,
        triggers: Vec<Trigger>,
    ) -> Result<(), EngineError> {
        for trigger in &triggers {
            trigger.validate()?;
        }

        let loaded = self
            .config_store
            .load(id)
            .await?
            .ok_or_else(|| not_found(id))?;
        let mut config = loaded.config;
        config.triggers = triggers;
        self.config_store.save(&config).await?;

        let was_active = self.read_active().contains_key(&id);
        if was_active {
            self.activate_room(id).await?;
        }
        Ok(())
    }

    fn read_active(&self) -> RwLockReadGuard<'_, HashMap<RoomId, Arc<RoomEngine<P>>>> {
        self.active.read().unwrap_or_else(PoisonError::into_inner)
    }

    fn write_active(&self) -> RwLockWriteGuard<'_, HashMap<RoomId, Arc<RoomEngine<P>>>> {
        self.active.write().unwrap_or_else(PoisonError::into_inner)
    }
}

fn not_found(id: RoomId) -> EngineError {
    NotFoundError {
        entity: "Room",
        id: id.to_string(),
    }
    .into()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::event_bus::InProcessEventBus;
    use crate::ports::{LoadedRoomConfig, WebhookRequest, WebhookResponse, WebhookTransport};
    use async_trait::async_trait;
    use roomrunner_domain::error::ExecutionError;
    use roomrunner_domain::trigger::{Action, Condition, Operator};
    use roomrunner_domain::variable::{VarValue, Variable};
    use serde_json::json;
    use std::sync::Mutex;

    // ── In-memory config store ─────────────────────────────────────

    #[derive(Default)]
    struct InMemoryConfigStore {
        configs: Mutex<HashMap<RoomId, RoomConfig>>,
    }

    impl InMemoryConfigStore {
        fn with(configs: Vec<RoomConfig>) -> Self {
            let map: HashMap<_, _> = configs.into_iter().map(|c| (c.id, c)).collect();
            Self {
                configs: Mutex::new(map),
            }
        }
    }

    impl RoomConfigStore for InMemoryConfigStore {
        async fn load(&self, id: RoomId) -> Result<Option<LoadedRoomConfig>, EngineError> {
            let config = self.configs.lock().unwrap().get(&id).cloned();
            Ok(config.map(|config| LoadedRoomConfig {
                config,
                quarantined: Vec::new(),
            }))
        }

        async fn load_all(&self) -> Result<Vec<RoomConfig>, EngineError> {
            Ok(self.configs.lock().unwrap().values().cloned().collect())
        }

        async fn save(&self, config: &RoomConfig) -> Result<(), EngineError> {
            self.configs
                .lock()
                .unwrap()
                .insert(config.id, config.clone());
            Ok(())
        }

        async fn delete(&self, id: RoomId) -> Result<(), EngineError> {
            self.configs.lock().unwrap().remove(&id);
            Ok(())
        }
    }

    struct NullTransport;

    #[async_trait]
    impl WebhookTransport for NullTransport {
        async fn send(&self, _request: &WebhookRequest) -> Result<WebhookResponse, ExecutionError> {
            Ok(WebhookResponse { status: 200 })
        }
    }

    // ── Helpers ────────────────────────────────────────────────────

    fn door_config(id: RoomId) -> RoomConfig {
        RoomConfig {
            id,
            name: "The Vault".to_string(),
            variables: vec![
                Variable::builder()
                    .name("door_open")
                    .value(VarValue::Bool(false))
                    .build()
                    .unwrap(),
            ],
            triggers: vec![
                Trigger::builder()
                    .name("Door Opens")
                    .watched_variable("door_open")
                    .condition(Condition {
                        operator: Operator::Equals,
                        comparand: json!(true),
                    })
                    .action(Action::PlaySound {
                        sound: "creak".to_string(),
                        volume: None,
                    })
                    .build()
                    .unwrap(),
            ],
        }
    }

    fn make_manager(
        configs: Vec<RoomConfig>,
    ) -> RoomManager<InMemoryConfigStore, Arc<InProcessEventBus>> {
        RoomManager::new(
            InMemoryConfigStore::with(configs),
            Arc::new(ExecutorRegistry::standard(Arc::new(NullTransport))),
            Arc::new(InProcessEventBus::new(64)),
        )
    }

    // ── Tests ──────────────────────────────────────────────────────

    #[tokio::test]
    async fn should_activate_room_from_persisted_config() {
        let id = RoomId::new();
        let manager = make_manager(vec![door_config(id)]);

        manager.activate_room(id).await.unwrap();

        let variables = manager.variables(id).unwrap();
        assert!(variables.iter().any(|v| v.name == "door_open"));
    }

    #[tokio::test]
    async fn should_return_not_found_when_activating_unknown_room() {
        let manager = make_manager(vec![]);
        let result = manager.activate_room(RoomId::new()).await;
        assert!(matches!(result, Err(EngineError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_return_not_found_for_inactive_room_operations() {
        let id = RoomId::new();
        let manager = make_manager(vec![door_config(id)]);

        assert!(matches!(
            manager.variables(id),
            Err(EngineError::NotFound(_))
        ));
        let result = manager
            .write(id, "door_open", &json!(true), WriteOrigin::Api)
            .await;
        assert!(matches!(result, Err(EngineError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_route_writes_to_the_right_room() {
        let id_a = RoomId::new();
        let id_b = RoomId::new();
        let manager = make_manager(vec![door_config(id_a), door_config(id_b)]);
        manager.activate_room(id_a).await.unwrap();
        manager.activate_room(id_b).await.unwrap();

        manager
            .write(id_a, "door_open", &json!(true), WriteOrigin::Api)
            .await
            .unwrap();

        let door_a = manager
            .engine(id_a)
            .unwrap()
            .variable("door_open")
            .unwrap();
        let door_b = manager
            .engine(id_b)
            .unwrap()
            .variable("door_open")
            .unwrap();
        assert_eq!(door_a.value, VarValue::Bool(true));
        assert_eq!(door_b.value, VarValue::Bool(false));
    }

    #[tokio::test]
    async fn should_discard_state_on_deactivation() {
        let id = RoomId::new();
        let manager = make_manager(vec![door_config(id)]);
        manager.activate_room(id).await.unwrap();

        manager
            .write(id, "door_open", &json!(true), WriteOrigin::Api)
            .await
            .unwrap();
        manager.deactivate_room(id).unwrap();
        assert!(matches!(
            manager.variables(id),
            Err(EngineError::NotFound(_))
        ));

        // Re-activation starts from the persisted config, not live state.
        manager.activate_room(id).await.unwrap();
        let door = manager.engine(id).unwrap().variable("door_open").unwrap();
        assert_eq!(door.value, VarValue::Bool(false));
    }

    #[tokio::test]
    async fn should_return_not_found_when_deactivating_inactive_room() {
        let manager = make_manager(vec![]);
        let result = manager.deactivate_room(RoomId::new());
        assert!(matches!(result, Err(EngineError::NotFound(_))));
    }

    #[tokio::test]
    async fn should_replace_engine_on_re_activation() {
        let id = RoomId::new();
        let manager = make_manager(vec![door_config(id)]);
        manager.activate_room(id).await.unwrap();
        let first = manager.engine(id).unwrap();

        manager.activate_room(id).await.unwrap();

        assert!(!first.is_active());
        assert!(manager.engine(id).unwrap().is_active());
    }

    #[tokio::test]
    async fn should_list_persisted_rooms() {
        let manager = make_manager(vec![door_config(RoomId::new()), door_config(RoomId::new())]);
        let rooms = manager.list_rooms().await.unwrap();
        assert_eq!(rooms.len(), 2);
    }

    #[tokio::test]
    async fn should_persist_and_reload_trigger_updates() {
        let id = RoomId::new();
        let manager = make_manager(vec![door_config(id)]);
        manager.activate_room(id).await.unwrap();

        let replacement = Trigger::builder()
            .name("Door Closes")
            .watched_variable("door_open")
            .condition(Condition {
                operator: Operator::Equals,
                comparand: json!(false),
            })
            .action(Action::ShowMessage {
                message: "The door slams shut".to_string(),
                duration_secs: None,
            })
            .build()
            .unwrap();

        manager
            .update_triggers(id, vec![replacement.clone()])
            .await
            .unwrap();

        let persisted = manager.triggers(id).await.unwrap();
        assert_eq!(persisted.len(), 1);
        assert_eq!(persisted[0].name, "Door Closes");

        // The active engine was rebuilt from the new configuration.
        assert!(manager.engine(id).unwrap().is_active());
    }

    #[tokio::test]
    async fn should_reject_structurally_invalid_trigger_updates() {
        let id = RoomId::new();
        let manager = make_manager(vec![door_config(id)]);

        let mut broken = door_config(id).triggers.remove(0);
        broken.actions.clear();

        let result = manager.update_triggers(id, vec![broken]).await;
        assert!(matches!(result, Err(EngineError::Validation(_))));
    }

    #[tokio::test]
    async fn should_tick_every_active_room() {
        let id_a = RoomId::new();
        let id_b = RoomId::new();
        let manager = make_manager(vec![door_config(id_a), door_config(id_b)]);
        manager.activate_room(id_a).await.unwrap();
        manager.activate_room(id_b).await.unwrap();

        for id in [id_a, id_b] {
            manager
                .apply_timer_command(id, &TimerCommand::Start { duration_secs: 0 })
                .await
                .unwrap();
        }

        manager.tick_all().await;

        for id in [id_a, id_b] {
            let state = manager
                .engine(id)
                .unwrap()
                .variable(roomrunner_domain::timer::TIMER_STATE)
                .unwrap();
            assert_eq!(state.value, VarValue::String("stopped".to_string()));
        }
    }
}
