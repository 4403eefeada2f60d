//! Audio session contract: activation, interruptions and route changes.
//!
//! The platform audio session decides who owns the audio output. It is the
//! source of two event classes the core reacts to:
//!
//! - interruptions (phone call, alarm, another app taking the output);
//! - route changes (headphones plugged in or pulled, Bluetooth device
//!   connecting or dropping).
//!
//! Reacting to these is best-effort UX, never correctness-critical; the core
//! absorbs all failures while handling them.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use tokio::sync::broadcast;

/// Why an audio route changed.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RouteChangeReason {
    /// A new output device became available (e.g. headphones plugged in).
    NewDeviceAvailable,
    /// A previously used output device went away (e.g. headphones pulled).
    OldDeviceUnavailable,
    /// Any other platform-specific reason; ignored by the recovery policy.
    Other,
}

/// A single audio output port.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum OutputPort {
    Headphones,
    BuiltInSpeaker,
    Bluetooth,
    Other(String),
}

impl OutputPort {
    /// Returns `true` for wired headphone outputs.
    pub fn is_headphones(&self) -> bool {
        matches!(self, OutputPort::Headphones)
    }
}

/// Events pushed by the platform audio session.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "event")]
pub enum SessionEvent {
    /// An interruption started (call, alarm, other app).
    InterruptionBegan,
    /// The interruption ended. `should_resume` carries the platform's hint
    /// that playback may continue.
    InterruptionEnded {
        should_resume: bool,
    },
    /// The audio route changed.
    RouteChanged {
        reason: RouteChangeReason,
        /// Outputs of the route now in effect.
        outputs: Vec<OutputPort>,
        /// Outputs of the route that was in effect before the change.
        /// Empty when the platform does not report the previous route.
        previous_outputs: Vec<OutputPort>,
    },
}

/// Contract for the platform audio session.
#[async_trait]
pub trait AudioSession: Send + Sync {
    /// Acquire the audio output for long-form playback.
    ///
    /// # Errors
    ///
    /// Returns [`crate::BridgeError::SessionActivation`] when the platform
    /// refuses activation. Callers treat this as non-fatal.
    async fn activate(&self) -> Result<()>;

    /// Subscribe to interruption and route-change events.
    fn subscribe(&self) -> broadcast::Receiver<SessionEvent>;
}
