//! # Interruption and Route Recovery
//!
//! Policy for reacting to audio-session events: interruptions (a phone call,
//! another app taking the output) and output-route changes (headphones
//! plugged or unplugged). The policy is a pure decision function; the
//! controller executes whatever it decides.

use bridge_traits::session::{RouteChangeReason, SessionEvent};

/// What the controller should do in response to a session event.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RecoveryAction {
    /// Pause playback.
    Pause,
    /// Resume playback.
    Play,
    /// Leave playback alone.
    None,
}

/// Decide the recovery action for a session event.
///
/// Interruptions always pause; the end of an interruption resumes only when
/// the platform hints that the app should. Route changes follow the
/// headphones convention: unplugging pauses (sound must not suddenly come
/// out of the speaker), plugging in resumes.
pub fn decide(event: &SessionEvent) -> RecoveryAction {
    match event {
        SessionEvent::InterruptionBegan => RecoveryAction::Pause,
        SessionEvent::InterruptionEnded { should_resume } => {
            if *should_resume {
                RecoveryAction::Play
            } else {
                RecoveryAction::None
            }
        }
        SessionEvent::RouteChanged {
            reason,
            outputs,
            previous_outputs,
        } => match reason {
            RouteChangeReason::NewDeviceAvailable
                if outputs.iter().any(|port| port.is_headphones()) =>
            {
                RecoveryAction::Play
            }
            RouteChangeReason::OldDeviceUnavailable
                if previous_outputs.iter().any(|port| port.is_headphones()) =>
            {
                RecoveryAction::Pause
            }
            _ => RecoveryAction::None,
        },
    }
}
