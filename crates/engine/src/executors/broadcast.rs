//! Executors for fire-and-forget broadcast actions.
//!
//! `play_sound`, `show_media`, and `show_message` all resolve to an
//! [`Effect`] published on the room event bus. Having no connected
//! display client is not an error.

use async_trait::async_trait;

use roomrunner_domain::error::{ConfigurationError, ExecutionError};
use roomrunner_domain::event::Effect;
use roomrunner_domain::trigger::{Action, ActionKind};

use crate::executor::{ActionContext, ActionExecutor, ActionOutcome};

/// Broadcasts an audio cue.
pub struct PlaySoundExecutor;

#[async_trait]
impl ActionExecutor for PlaySoundExecutor {
    fn validate(&self, action: &Action) -> Result<(), ConfigurationError> {
        if let Action::PlaySound { sound, volume } = action {
            if sound.is_empty() {
                return Err(invalid(ActionKind::PlaySound, "sound reference is empty"));
            }
            if let Some(volume) = volume {
                if !(0.0..=1.0).contains(volume) {
                    return Err(invalid(
                        ActionKind::PlaySound,
                        "volume must be between 0.0 and 1.0",
                    ));
                }
            }
        }
        Ok(())
    }

    async fn execute(
        &self,
        action: &Action,
        _ctx: &ActionContext,
    ) -> Result<Vec<ActionOutcome>, ExecutionError> {
        let Action::PlaySound { sound, volume } = action else {
            return Ok(Vec::new());
        };
        Ok(vec![ActionOutcome::Broadcast(Effect::PlaySound {
            sound: sound.clone(),
            volume: *volume,
        })])
    }
}

/// Broadcasts a timed media overlay.
pub struct ShowMediaExecutor;

#[async_trait]
impl ActionExecutor for ShowMediaExecutor {
    fn validate(&self, action: &Action) -> Result<(), ConfigurationError> {
        if let Action::ShowMedia { media, .. } = action {
            if media.is_empty() {
                return Err(invalid(ActionKind::ShowMedia, "media reference is empty"));
            }
        }
        Ok(())
    }

    async fn execute(
        &self,
        action: &Action,
        _ctx: &ActionContext,
    ) -> Result<Vec<ActionOutcome>, ExecutionError> {
        let Action::ShowMedia {
            media,
            duration_secs,
        } = action
        else {
            return Ok(Vec::new());
        };
        Ok(vec![ActionOutcome::Broadcast(Effect::ShowMedia {
            media: media.clone(),
            duration_secs: *duration_secs,
        })])
    }
}

/// Broadcasts a text message.
pub struct ShowMessageExecutor;

#[async_trait]
impl ActionExecutor for ShowMessageExecutor {
    fn validate(&self, action: &Action) -> Result<(), ConfigurationError> {
        if let Action::ShowMessage { message, .. } = action {
            if message.is_empty() {
                return Err(invalid(ActionKind::ShowMessage, "message is empty"));
            }
        }
        Ok(())
    }

    async fn execute(
        &self,
        action: &Action,
        _ctx: &ActionContext,
    ) -> Result<Vec<ActionOutcome>, ExecutionError> {
        let Action::ShowMessage {
            message,
            duration_secs,
        } = action
        else {
            return Ok(Vec::new());
        };
        Ok(vec![ActionOutcome::Broadcast(Effect::ShowMessage {
            message: message.clone(),
            duration_secs: *duration_secs,
        })])
    }
}

fn invalid(kind: ActionKind, detail: &str) -> ConfigurationError {
    ConfigurationError::InvalidActionConfig {
        kind,
        detail: detail.to_string(),
    }
}
