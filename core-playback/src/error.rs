//! # Player Error Types
//!
//! Error taxonomy for the playback synchronization layer.

use bridge_traits::BridgeError;
use thiserror::Error;

/// Errors that can occur while controlling or observing playback.
#[derive(Error, Debug)]
pub enum PlayerError {
    // ========================================================================
    // Engine Errors
    // ========================================================================
    /// The engine rejected or failed a command. Item-level failures surface
    /// separately as [`crate::PlaybackState::Failed`] through the state
    /// stream; this variant covers command acceptance only.
    #[error("Engine failure: {0}")]
    EngineFailure(#[from] BridgeError),

    // ========================================================================
    // Command Routing Errors
    // ========================================================================
    /// A guarded command's precondition was not met. Reported to the
    /// remote-command surface as a typed result, never thrown across it.
    #[error("Command '{command}' rejected: {reason}")]
    CommandRejected {
        command: &'static str,
        reason: &'static str,
    },

    // ========================================================================
    // Audio Session Errors
    // ========================================================================
    /// The platform refused to activate the audio session. Non-fatal: the
    /// playback attempt proceeds and the failure is logged.
    #[error("Audio session activation failed: {0}")]
    SessionActivation(String),

    // ========================================================================
    // Configuration Errors
    // ========================================================================
    /// Controller configuration failed validation.
    #[error("Invalid configuration: {0}")]
    InvalidConfig(String),

    /// Internal error (should not occur in normal operation).
    #[error("Internal error: {0}")]
    Internal(String),
}

impl PlayerError {
    /// Returns `true` when this error is a guard rejection rather than a
    /// genuine failure.
    pub fn is_rejection(&self) -> bool {
        matches!(self, PlayerError::CommandRejected { .. })
    }
}

/// Result type for player operations.
pub type Result<T> = std::result::Result<T, PlayerError>;
