//! Room engine — one isolated automation instance per active room.
//!
//! Constructed from a [`RoomConfig`] on activation and discarded on
//! deactivation; nothing survives across room sessions. The engine owns
//! the room's variable store, trigger registry, timer, and dispatcher,
//! and serializes every external write behind a per-room lock so
//! operator, API, and timer writes always produce a well-ordered event
//! sequence.

use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use roomrunner_domain::error::{EngineError, NotFoundError};
use roomrunner_domain::event::{ChangeEvent, Diagnostic, RoomEvent, WriteOrigin};
use roomrunner_domain::id::RoomId;
use roomrunner_domain::room::RoomConfig;
use roomrunner_domain::time::now;
use roomrunner_domain::timer::{RoomTimer, TimerCommand};
use roomrunner_domain::variable::Variable;

use crate::dispatcher::Dispatcher;
use crate::executor::ExecutorRegistry;
use crate::ports::EventPublisher;
use crate::registry::TriggerRegistry;
use crate::store::VariableStore;

/// A live automation engine for one room.
pub struct RoomEngine<P> {
    room_id: RoomId,
    name: String,
    store: Arc<VariableStore>,
    dispatcher: Dispatcher<P>,
    timer: Arc<Mutex<RoomTimer>>,
    write_lock: tokio::sync::Mutex<()>,
    closed: Arc<AtomicBool>,
    publisher: P,
}

impl<P> RoomEngine<P>
where
    P: EventPublisher + Clone + Send + Sync,
{
    /// Build an engine from a room configuration.
    ///
    /// System variables are seeded first, then the config's custom
    /// variables; triggers load through the registry's vetting pass.
    /// Config entries that fail validation are published as
    /// configuration diagnostics and skipped — a bad entry never keeps
    /// the room from activating.
    pub async fn activate(
        config: RoomConfig,
        executors: Arc<ExecutorRegistry>,
        publisher: P,
    ) -> Self {
        let store = Arc::new(VariableStore::new(config.id));

        for variable in config.variables {
            let name = variable.name.clone();
            if let Err(err) = store.insert(variable) {
                tracing::warn!(
                    room_id = %config.id,
                    variable = %name,
                    error = %err,
                    "skipping invalid variable from room config"
                );
                let _ = publisher
                    .publish(RoomEvent::Diagnostic(Diagnostic::Configuration {
                        room_id: config.id,
                        trigger_id: None,
                        message: err.to_string(),
                    }))
                    .await;
            }
        }

        let (registry, quarantined) = TriggerRegistry::load(config.triggers, &store, &executors);
        for entry in quarantined {
            tracing::warn!(
                room_id = %config.id,
                trigger = %entry.name,
                error = %entry.error,
                "quarantined malformed trigger"
            );
            let _ = publisher
                .publish(RoomEvent::Diagnostic(Diagnostic::Configuration {
                    room_id: config.id,
                    trigger_id: Some(entry.id),
                    message: entry.error.to_string(),
                }))
                .await;
        }

        let timer = Arc::new(Mutex::new(RoomTimer::new()));
        let closed = Arc::new(AtomicBool::new(false));
        let dispatcher = Dispatcher::new(
            Arc::clone(&store),
            registry,
            executors,
            Arc::clone(&timer),
            publisher.clone(),
            Arc::clone(&closed),
        );

        tracing::info!(room_id = %config.id, room = %config.name, "room activated");

        Self {
            room_id: config.id,
            name: config.name,
            store,
            dispatcher,
            timer,
            write_lock: tokio::sync::Mutex::new(()),
            closed,
            publisher,
        }
    }

    /// The room this engine serves.
    #[must_use]
    pub fn room_id(&self) -> RoomId {
        self.room_id
    }

    /// The room's display name.
    #[must_use]
    pub fn name(&self) -> &str {
        &self.name
    }

    /// Whether the engine still accepts writes.
    #[must_use]
    pub fn is_active(&self) -> bool {
        !self.closed.load(Ordering::SeqCst)
    }

    /// Snapshot of every variable.
    #[must_use]
    pub fn variables(&self) -> Vec<Variable> {
        self.store.snapshot()
    }

    /// Look up a single variable.
    #[must_use]
    pub fn variable(&self, name: &str) -> Option<Variable> {
        self.store.get(name)
    }

    /// Register a new custom variable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] for duplicate names, system
    /// flags, or invalid variables.
    pub fn create_variable(&self, variable: Variable) -> Result<(), EngineError> {
        self.store.insert(variable)?;
        Ok(())
    }

    /// Remove a custom variable.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::Validation`] for unknown or system
    /// variables.
    pub fn remove_variable(&self, name: &str) -> Result<(), EngineError> {
        self.store.remove(name)?;
        Ok(())
    }

    /// The single external write path.
    ///
    /// Takes the room write lock, commits the write at depth 0, and runs
    /// the full dispatch pass before returning. Validation failures are
    /// returned synchronously and leave the store untouched; a no-op
    /// write returns `Ok(None)` and fires nothing.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the room was deactivated,
    /// or [`EngineError::Validation`] when the write is rejected.
    pub async fn write(
        &self,
        name: &str,
        value: &serde_json::Value,
        origin: WriteOrigin,
    ) -> Result<Option<ChangeEvent>, EngineError> {
        let _guard = self.write_lock.lock().await;
        self.ensure_active()?;

        let Some(event) = self.store.set(name, value, origin, 0)? else {
            return Ok(None);
        };
        let _ = self
            .publisher
            .publish(RoomEvent::VariableChanged(event.clone()))
            .await;
        self.dispatcher.dispatch(&event).await;
        Ok(Some(event))
    }

    /// Apply a timer command from the operator or puzzle API.
    ///
    /// Invalid transitions are no-ops returning `false`. State changes
    /// are mirrored into the timer system variables and dispatched like
    /// any other write.
    ///
    /// # Errors
    ///
    /// Returns [`EngineError::NotFound`] when the room was deactivated.
    pub async fn apply_timer_command(&self, command: &TimerCommand) -> Result<bool, EngineError> {
        let _guard = self.write_lock.lock().await;
        self.ensure_active()?;
        Ok(self.dispatcher.apply_timer_command(command, 0).await)
    }

    /// Periodic timer upkeep: flip an expired countdown to stopped and
    /// refresh the remaining-seconds variable.
    ///
    /// Redundant ticks are free — unchanged values never emit events.
    pub async fn tick(&self) {
        let _guard = self.write_lock.lock().await;
        if !self.is_active() {
            return;
        }
        let at = now();
        let expired = self.lock_timer().is_expired(at);
        if expired {
            self.lock_timer().apply(&TimerCommand::Stop, at);
            tracing::info!(room_id = %self.room_id, "room timer expired");
        }
        self.dispatcher.sync_timer_variables(0).await;
    }

    /// Stop accepting writes and abandon any in-flight dispatch pass at
    /// the next trigger boundary.
    pub fn deactivate(&self) {
        self.closed.store(true, Ordering::SeqCst);
        tracing::info!(room_id = %self.room_id, room = %self.name, "room deactivated");
    }

    fn ensure_active(&self) -> Result<(), EngineError> {
        if self.is_active() {
            Ok(())
        } else {
            Err(NotFoundError {
                entity: "Room",
                id: self.room_id.to_string(),
            }
            .into())
        }
    }

    fn lock_timer(&self) -> MutexGuard<'_, RoomTimer> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
