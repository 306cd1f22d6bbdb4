//! Action — one configured side effect executed when a trigger fires.

use serde::{Deserialize, Serialize};

use crate::timer::TimerCommand;

/// An operation to execute when the trigger's condition is satisfied.
///
/// Actions within one trigger run sequentially in array order; media and
/// audio fields carry opaque identifiers resolved by the external media
/// registry at delivery time.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum Action {
    /// Broadcast an audio cue to connected display clients.
    PlaySound {
        /// Opaque audio file identifier.
        sound: String,
        /// Playback volume, `0.0..=1.0`. `None` means full volume.
        #[serde(default)]
        volume: Option<f32>,
    },
    /// Broadcast a timed media overlay.
    ShowMedia {
        /// Opaque media file identifier.
        media: String,
        /// How long the overlay stays up. `None` means until dismissed.
        #[serde(default)]
        duration_secs: Option<u64>,
    },
    /// Broadcast a text message to connected display clients.
    ShowMessage {
        message: String,
        #[serde(default)]
        duration_secs: Option<u64>,
    },
    /// Write another variable, re-entering the dispatch cascade.
    SetVariable {
        variable: String,
        value: serde_json::Value,
    },
    /// Apply a command to the room timer.
    TimerControl { command: TimerCommand },
    /// Call an external HTTP endpoint.
    SendWebhook {
        url: String,
        method: String,
        #[serde(default)]
        body: Option<serde_json::Value>,
    },
}

impl Action {
    /// The registry tag for this action.
    #[must_use]
    pub fn kind(&self) -> ActionKind {
        match self {
            Self::PlaySound { .. } => ActionKind::PlaySound,
            Self::ShowMedia { .. } => ActionKind::ShowMedia,
            Self::ShowMessage { .. } => ActionKind::ShowMessage,
            Self::SetVariable { .. } => ActionKind::SetVariable,
            Self::TimerControl { .. } => ActionKind::TimerControl,
            Self::SendWebhook { .. } => ActionKind::SendWebhook,
        }
    }
}

impl std::fmt::Display for Action {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::PlaySound { sound, .. } => write!(f, "play_sound({sound})"),
            Self::ShowMedia { media, .. } => write!(f, "show_media({media})"),
            Self::ShowMessage { message, .. } => write!(f, "show_message({message})"),
            Self::SetVariable { variable, value } => {
                write!(f, "set_variable({variable} = {value})")
            }
            Self::TimerControl { command } => write!(f, "timer_control({command})"),
            Self::SendWebhook { method, url, .. } => write!(f, "send_webhook({method} {url})"),
        }
    }
}

/// Type tag identifying which executor handles an [`Action`].
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ActionKind {
    PlaySound,
    ShowMedia,
    ShowMessage,
    SetVariable,
    TimerControl,
    SendWebhook,
}

impl std::fmt::Display for ActionKind {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let name = match self {
            Self::PlaySound => "play_sound",
            Self::ShowMedia => "show_media",
            Self::ShowMessage => "show_message",
            Self::SetVariable => "set_variable",
            Self::TimerControl => "timer_control",
            Self::SendWebhook => "send_webhook",
        };
        f.write_str(name)
    }
}
