//! Trigger dispatcher — matches change events to triggers and runs
//! their actions depth-first under a cascade ceiling.
//!
//! Dispatch is an explicit, depth-parameterized recursive function: a
//! `set_variable` action re-enters [`Dispatcher::dispatch`] synchronously
//! with `depth + 1` before the next action runs. The only loop-prevention
//! mechanism is the [`MAX_DEPTH`] guard at the top of every pass — two
//! triggers that mutate each other's watched variables terminate there
//! with a single `CascadeLimitExceeded` diagnostic instead of recursing
//! forever.

use std::future::Future;
use std::pin::Pin;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use serde_json::json;

use roomrunner_domain::event::{ChangeEvent, Diagnostic, RoomEvent, WriteOrigin};
use roomrunner_domain::id::RoomId;
use roomrunner_domain::time::now;
use roomrunner_domain::timer::{RoomTimer, TIMER_REMAINING, TIMER_STATE, TimerCommand};
use roomrunner_domain::trigger::{Action, Trigger};

use crate::executor::{ActionContext, ActionOutcome, ExecutorRegistry};
use crate::ports::EventPublisher;
use crate::registry::TriggerRegistry;
use crate::store::VariableStore;

/// Ceiling on cascade depth. Events deeper than this are dropped.
pub const MAX_DEPTH: u8 = 8;

/// Per-room dispatch engine.
pub struct Dispatcher<P> {
    room_id: RoomId,
    store: Arc<VariableStore>,
    registry: TriggerRegistry,
    executors: Arc<ExecutorRegistry>,
    timer: Arc<Mutex<RoomTimer>>,
    publisher: P,
    closed: Arc<AtomicBool>,
}

impl<P: EventPublisher + Send + Sync> Dispatcher<P> {
    pub(crate) fn new(
        store: Arc<VariableStore>,
        registry: TriggerRegistry,
        executors: Arc<ExecutorRegistry>,
        timer: Arc<Mutex<RoomTimer>>,
        publisher: P,
        closed: Arc<AtomicBool>,
    ) -> Self {
        Self {
            room_id: store.room_id(),
            store,
            registry,
            executors,
            timer,
            publisher,
            closed,
        }
    }

    /// Run one dispatch pass for an accepted change event.
    ///
    /// Matching triggers run in registry order; each trigger's action
    /// list runs sequentially to completion before the next trigger
    /// begins, so operators can chain effects across triggers.
    pub fn dispatch<'a>(
        &'a self,
        event: &'a ChangeEvent,
    ) -> Pin<Box<dyn Future<Output = ()> + Send + 'a>> {
        Box::pin(async move {
            if event.depth > MAX_DEPTH {
                tracing::warn!(
                    room_id = %self.room_id,
                    variable = %event.variable_name,
                    depth = event.depth,
                    "cascade depth ceiling hit, dropping event"
                );
                let _ = self
                    .publisher
                    .publish(RoomEvent::Diagnostic(Diagnostic::CascadeLimitExceeded {
                        room_id: self.room_id,
                        variable_name: event.variable_name.clone(),
                        depth: event.depth,
                    }))
                    .await;
                return;
            }

            let matching: Vec<Trigger> = self
                .registry
                .matching(&event.variable_name)
                .cloned()
                .collect();

            for trigger in &matching {
                if self.closed.load(Ordering::SeqCst) {
                    return;
                }
                if !trigger.condition.evaluate(&event.new_value) {
                    continue;
                }
                tracing::debug!(
                    room_id = %self.room_id,
                    trigger = %trigger.name,
                    variable = %event.variable_name,
                    "trigger matched"
                );

                for action in &trigger.actions {
                    self.run_action(trigger, action, event.depth).await;
                }

                let _ = self
                    .publisher
                    .publish(RoomEvent::TriggerFired {
                        room_id: self.room_id,
                        trigger_id: trigger.id,
                        trigger_name: trigger.name.clone(),
                    })
                    .await;
            }
        })
    }

    /// Execute one action and apply its outcomes.
    ///
    /// Failures are reported as diagnostics and never abort sibling
    /// actions or later triggers.
    async fn run_action(&self, trigger: &Trigger, action: &Action, depth: u8) {
        let Some(executor) = self.executors.get(action.kind()) else {
            // Vetted at load time, so this only fires when an executor
            // was unregistered after activation.
            self.report_execution(trigger, action, "no executor registered".to_string())
                .await;
            return;
        };

        let ctx = ActionContext {
            room_id: self.room_id,
            depth,
        };
        match executor.execute(action, &ctx).await {
            Ok(outcomes) => {
                for outcome in outcomes {
                    self.apply_outcome(trigger, action, outcome, depth).await;
                }
            }
            Err(err) => {
                tracing::warn!(
                    room_id = %self.room_id,
                    trigger = %trigger.name,
                    action = %action,
                    error = %err,
                    "action execution failed"
                );
                self.report_execution(trigger, action, err.to_string()).await;
            }
        }
    }

    async fn apply_outcome(
        &self,
        trigger: &Trigger,
        action: &Action,
        outcome: ActionOutcome,
        depth: u8,
    ) {
        match outcome {
            ActionOutcome::Broadcast(effect) => {
                let _ = self
                    .publisher
                    .publish(RoomEvent::Effect {
                        room_id: self.room_id,
                        effect,
                    })
                    .await;
            }
            ActionOutcome::Write { variable, value } => {
                match self.store.set(&variable, &value, WriteOrigin::Trigger, depth + 1) {
                    Ok(Some(event)) => {
                        let _ = self
                            .publisher
                            .publish(RoomEvent::VariableChanged(event.clone()))
                            .await;
                        self.dispatch(&event).await;
                    }
                    Ok(None) => {}
                    Err(err) => {
                        // A failed cascaded write is exactly equivalent to
                        // no write having occurred; siblings still run.
                        tracing::warn!(
                            room_id = %self.room_id,
                            trigger = %trigger.name,
                            variable = %variable,
                            error = %err,
                            "cascaded write rejected"
                        );
                        self.report_execution(trigger, action, err.to_string()).await;
                    }
                }
            }
            ActionOutcome::Timer(command) => {
                self.apply_timer_command(&command, depth + 1).await;
            }
        }
    }

    /// Apply a timer command, mirroring any state change into the system
    /// variables at `write_depth`. Returns whether the timer changed.
    pub(crate) async fn apply_timer_command(
        &self,
        command: &TimerCommand,
        write_depth: u8,
    ) -> bool {
        let changed = self.lock_timer().apply(command, now());
        if changed {
            self.sync_timer_variables(write_depth).await;
        } else {
            tracing::debug!(
                room_id = %self.room_id,
                command = %command,
                "timer command was a no-op"
            );
        }
        changed
    }

    /// Mirror the timer's state and remaining seconds into the system
    /// variables, dispatching any resulting change events.
    pub(crate) async fn sync_timer_variables(&self, write_depth: u8) {
        let at = now();
        let (state, remaining) = {
            let timer = self.lock_timer();
            (timer.state(), timer.remaining_secs(at))
        };
        self.write_timer_variable(TIMER_STATE, &json!(state.to_string()), write_depth)
            .await;
        self.write_timer_variable(TIMER_REMAINING, &json!(remaining), write_depth)
            .await;
    }

    async fn write_timer_variable(&self, name: &str, value: &serde_json::Value, depth: u8) {
        match self.store.set(name, value, WriteOrigin::Timer, depth) {
            Ok(Some(event)) => {
                let _ = self
                    .publisher
                    .publish(RoomEvent::VariableChanged(event.clone()))
                    .await;
                self.dispatch(&event).await;
            }
            Ok(None) => {}
            Err(err) => {
                tracing::error!(
                    room_id = %self.room_id,
                    variable = name,
                    error = %err,
                    "timer variable write rejected"
                );
            }
        }
    }

    async fn report_execution(&self, trigger: &Trigger, action: &Action, message: String) {
        let _ = self
            .publisher
            .publish(RoomEvent::Diagnostic(Diagnostic::Execution {
                room_id: self.room_id,
                trigger_id: trigger.id,
                action: action.kind(),
                message,
            }))
            .await;
    }

    fn lock_timer(&self) -> MutexGuard<'_, RoomTimer> {
        self.timer.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
