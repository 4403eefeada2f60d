//! # State Fusion Engine
//!
//! Derives the single canonical [`PlaybackState`] from the engine's raw
//! signal tuple. The raw inputs (transport status, item readiness, buffering
//! health flags) update independently and can be simultaneously true, so the
//! resolution order of [`fuse`] is itself part of the contract: the first
//! matching rule wins.
//!
//! The canonical state is derived, never stored authoritatively: it is
//! recomputed from the latest [`SignalSnapshot`] on every relevant signal
//! change, and only transitions (new state != last emitted) are delivered
//! downstream.
//!
//! `ReadyToPlay` is a one-shot transitional state: it is reported the first
//! time readiness is observed for an item, after which evaluation falls
//! through to the remaining rules even though the engine keeps reporting the
//! item as ready.

use bridge_traits::engine::{EngineSignal, ItemStatus, TransportStatus};
use bridge_traits::now_playing::SurfacePlaybackStatus;
use serde::{Deserialize, Serialize};
use std::fmt;

/// Canonical playback state, as seen by every downstream consumer.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackState {
    Stopped,
    Playing,
    Paused,
    Buffering,
    /// One-shot: the current item just became playable.
    ReadyToPlay,
    /// Terminal for the current item.
    Failed,
}

impl PlaybackState {
    /// Project onto the narrower phase used by remote-command guards.
    pub fn phase(self) -> PlaybackPhase {
        match self {
            PlaybackState::Playing => PlaybackPhase::Playing,
            PlaybackState::Buffering => PlaybackPhase::Buffering,
            // Loaded but not rolling yet.
            PlaybackState::Paused | PlaybackState::ReadyToPlay => PlaybackPhase::Paused,
            PlaybackState::Stopped | PlaybackState::Failed => PlaybackPhase::Stopped,
        }
    }

    /// Map to the coarse transport indicator the OS surface understands.
    /// Buffering shows as playing so the surface does not flicker while the
    /// engine catches up.
    pub fn surface_status(self) -> SurfacePlaybackStatus {
        match self {
            PlaybackState::Playing | PlaybackState::Buffering => SurfacePlaybackStatus::Playing,
            PlaybackState::Paused | PlaybackState::ReadyToPlay => SurfacePlaybackStatus::Paused,
            PlaybackState::Stopped | PlaybackState::Failed => SurfacePlaybackStatus::Stopped,
        }
    }
}

impl fmt::Display for PlaybackState {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            PlaybackState::Stopped => "stopped",
            PlaybackState::Playing => "playing",
            PlaybackState::Paused => "paused",
            PlaybackState::Buffering => "buffering",
            PlaybackState::ReadyToPlay => "ready_to_play",
            PlaybackState::Failed => "failed",
        };
        f.write_str(name)
    }
}

/// UI-facing projection of [`PlaybackState`] used by the remote-command
/// guard logic. Collapses `ReadyToPlay` and `Failed` away: remote commands
/// only need play/pause/buffering/stopped to decide legality.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum PlaybackPhase {
    Paused,
    Buffering,
    Playing,
    Stopped,
}

/// Latest known value of every raw signal the fusion rules consume.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SignalSnapshot {
    pub transport: TransportStatus,
    pub item_status: ItemStatus,
    pub likely_to_keep_up: bool,
    pub buffer_empty: bool,
    pub buffer_full: bool,
}

impl Default for SignalSnapshot {
    fn default() -> Self {
        Self {
            transport: TransportStatus::Paused,
            item_status: ItemStatus::Unknown,
            likely_to_keep_up: false,
            buffer_empty: false,
            buffer_full: false,
        }
    }
}

impl SignalSnapshot {
    /// Fold a raw signal into the snapshot. Returns `true` when the signal is
    /// a fusion input (and the state should be re-derived), `false` for
    /// signals the fusion rules do not consume.
    pub fn apply(&mut self, signal: &EngineSignal) -> bool {
        match signal {
            EngineSignal::Transport(transport) => {
                self.transport = *transport;
                true
            }
            EngineSignal::Item(status) => {
                self.item_status = *status;
                true
            }
            EngineSignal::LikelyToKeepUp(value) => {
                self.likely_to_keep_up = *value;
                true
            }
            EngineSignal::BufferEmpty(value) => {
                self.buffer_empty = *value;
                true
            }
            EngineSignal::BufferFull(value) => {
                self.buffer_full = *value;
                true
            }
            EngineSignal::Rate(_)
            | EngineSignal::CurrentItem(_)
            | EngineSignal::Duration(_)
            | EngineSignal::PlayedToEnd(_) => false,
        }
    }
}

/// Derive the canonical state from a snapshot.
///
/// `first_ready` is `true` while readiness has not yet been observed for the
/// current item; it is the one extra bit of state the combinator needs beyond
/// the snapshot itself.
///
/// Resolution order (first match wins):
/// 1. item failed → `Failed`
/// 2. item ready for the first time → `ReadyToPlay`
/// 3. transport waiting at rate → `Buffering`
/// 4. transport playing, item ready, buffers healthy → `Playing`
/// 5. transport paused → `Paused`
/// 6. buffer drained and not refilling → `Buffering`
/// 7. otherwise → `Stopped`
pub fn fuse(snapshot: &SignalSnapshot, first_ready: bool) -> PlaybackState {
    match (
        snapshot.item_status,
        snapshot.transport,
        snapshot.likely_to_keep_up,
        snapshot.buffer_empty,
        snapshot.buffer_full,
    ) {
        (ItemStatus::Failed, ..) => PlaybackState::Failed,
        (ItemStatus::ReadyToPlay, ..) if first_ready => PlaybackState::ReadyToPlay,
        (_, TransportStatus::WaitingAtRate, ..) => PlaybackState::Buffering,
        // Intentionally strict: all four buffering-health conditions must
        // hold at once, so a stall is never reported as playing.
        (ItemStatus::ReadyToPlay, TransportStatus::Playing, true, false, true) => {
            PlaybackState::Playing
        }
        (_, TransportStatus::Paused, ..) => PlaybackState::Paused,
        (_, _, false, true, false) => PlaybackState::Buffering,
        _ => PlaybackState::Stopped,
    }
}

/// Stateful wrapper around [`fuse`]: holds the latest snapshot, the one-shot
/// readiness bit, and the last emitted state for deduplication.
#[derive(Debug)]
pub struct FusionEngine {
    snapshot: SignalSnapshot,
    ready_seen: bool,
    last_emitted: Option<PlaybackState>,
}

impl FusionEngine {
    pub fn new() -> Self {
        Self {
            snapshot: SignalSnapshot::default(),
            ready_seen: false,
            last_emitted: None,
        }
    }

    /// Fold a raw signal in and re-derive the state.
    ///
    /// Returns `Some(state)` only on a transition; redundant re-evaluations
    /// with an unchanged result are suppressed. Signals that are not fusion
    /// inputs return `None` without re-deriving.
    pub fn apply(&mut self, signal: &EngineSignal) -> Option<PlaybackState> {
        if !self.snapshot.apply(signal) {
            return None;
        }

        let state = fuse(&self.snapshot, !self.ready_seen);
        if state == PlaybackState::ReadyToPlay {
            self.ready_seen = true;
        }

        if self.last_emitted == Some(state) {
            None
        } else {
            self.last_emitted = Some(state);
            Some(state)
        }
    }

    /// Reset per-item derivation state when the current item is replaced:
    /// readiness becomes unobserved and the item status unknown. Transport
    /// and buffer flags are engine-level and survive the swap. The dedup
    /// baseline is dropped too, so the new item's first derivation always
    /// counts as a transition even when it lands on the old item's state.
    pub fn reset_for_item(&mut self) {
        self.ready_seen = false;
        self.snapshot.item_status = ItemStatus::Unknown;
        self.last_emitted = None;
    }

    /// The last derived state, `Stopped` before anything was derived.
    pub fn current(&self) -> PlaybackState {
        self.last_emitted.unwrap_or(PlaybackState::Stopped)
    }

    /// Latest snapshot, for diagnostics.
    pub fn snapshot(&self) -> &SignalSnapshot {
        &self.snapshot
    }
}

impl Default for FusionEngine {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn snapshot(
        transport: TransportStatus,
        item_status: ItemStatus,
        likely_to_keep_up: bool,
        buffer_empty: bool,
        buffer_full: bool,
    ) -> SignalSnapshot {
        SignalSnapshot {
            transport,
            item_status,
            likely_to_keep_up,
            buffer_empty,
            buffer_full,
        }
    }

    #[test]
    fn failed_item_wins_over_everything() {
        let s = snapshot(TransportStatus::Playing, ItemStatus::Failed, true, false, true);
        assert_eq!(fuse(&s, true), PlaybackState::Failed);
        assert_eq!(fuse(&s, false), PlaybackState::Failed);
    }

    #[test]
    fn first_readiness_is_transitional() {
        let s = snapshot(TransportStatus::Paused, ItemStatus::ReadyToPlay, false, false, false);
        assert_eq!(fuse(&s, true), PlaybackState::ReadyToPlay);
        // Same inputs, readiness already observed: falls through to paused.
        assert_eq!(fuse(&s, false), PlaybackState::Paused);
    }

    #[test]
    fn waiting_at_rate_is_buffering() {
        let s = snapshot(
            TransportStatus::WaitingAtRate,
            ItemStatus::ReadyToPlay,
            true,
            false,
            true,
        );
        assert_eq!(fuse(&s, false), PlaybackState::Buffering);
    }

    #[test]
    fn playing_requires_all_health_conditions() {
        let healthy = snapshot(
            TransportStatus::Playing,
            ItemStatus::ReadyToPlay,
            true,
            false,
            true,
        );
        assert_eq!(fuse(&healthy, false), PlaybackState::Playing);

        // Flip each health condition in turn; none of these may be Playing.
        let mut not_keeping_up = healthy;
        not_keeping_up.likely_to_keep_up = false;
        assert_ne!(fuse(&not_keeping_up, false), PlaybackState::Playing);

        let mut drained = healthy;
        drained.buffer_empty = true;
        assert_ne!(fuse(&drained, false), PlaybackState::Playing);

        let mut not_full = healthy;
        not_full.buffer_full = false;
        assert_ne!(fuse(&not_full, false), PlaybackState::Playing);

        let mut unready = healthy;
        unready.item_status = ItemStatus::Unknown;
        assert_ne!(fuse(&unready, false), PlaybackState::Playing);
    }

    #[test]
    fn drained_buffer_is_buffering() {
        let s = snapshot(TransportStatus::Playing, ItemStatus::Unknown, false, true, false);
        assert_eq!(fuse(&s, false), PlaybackState::Buffering);
    }

    #[test]
    fn fallthrough_is_stopped() {
        let s = snapshot(TransportStatus::Playing, ItemStatus::Unknown, true, false, false);
        assert_eq!(fuse(&s, false), PlaybackState::Stopped);
    }

    #[test]
    fn fusion_is_total() {
        // Every combination of inputs derives exactly one state.
        let transports = [
            TransportStatus::Paused,
            TransportStatus::WaitingAtRate,
            TransportStatus::Playing,
        ];
        let statuses = [ItemStatus::Unknown, ItemStatus::ReadyToPlay, ItemStatus::Failed];
        let bools = [false, true];
        for transport in transports {
            for item_status in statuses {
                for keep_up in bools {
                    for empty in bools {
                        for full in bools {
                            for first in bools {
                                let s = snapshot(transport, item_status, keep_up, empty, full);
                                // Must not panic, and the result is stable.
                                assert_eq!(fuse(&s, first), fuse(&s, first));
                            }
                        }
                    }
                }
            }
        }
    }

    #[test]
    fn engine_dedups_unchanged_states() {
        let mut engine = FusionEngine::new();
        assert_eq!(
            engine.apply(&EngineSignal::Transport(TransportStatus::Paused)),
            Some(PlaybackState::Paused)
        );
        // Redundant re-emission of the same transport status: suppressed.
        assert_eq!(
            engine.apply(&EngineSignal::Transport(TransportStatus::Paused)),
            None
        );
        assert_eq!(engine.current(), PlaybackState::Paused);
    }

    #[test]
    fn ready_to_play_emitted_once_per_item() {
        let mut engine = FusionEngine::new();
        assert_eq!(
            engine.apply(&EngineSignal::Item(ItemStatus::ReadyToPlay)),
            Some(PlaybackState::ReadyToPlay)
        );
        // Item still reports ready; next derivation falls through to paused.
        assert_eq!(
            engine.apply(&EngineSignal::Item(ItemStatus::ReadyToPlay)),
            Some(PlaybackState::Paused)
        );
        assert_eq!(
            engine.apply(&EngineSignal::Item(ItemStatus::ReadyToPlay)),
            None
        );
    }

    #[test]
    fn readiness_rearms_after_item_reset() {
        let mut engine = FusionEngine::new();
        engine.apply(&EngineSignal::Item(ItemStatus::ReadyToPlay));
        engine.apply(&EngineSignal::Item(ItemStatus::ReadyToPlay));

        engine.reset_for_item();
        assert_eq!(
            engine.apply(&EngineSignal::Item(ItemStatus::ReadyToPlay)),
            Some(PlaybackState::ReadyToPlay)
        );
    }

    #[test]
    fn item_reset_drops_the_dedup_baseline() {
        let mut engine = FusionEngine::new();
        // Last emitted state is ReadyToPlay when the item is swapped.
        assert_eq!(
            engine.apply(&EngineSignal::Item(ItemStatus::ReadyToPlay)),
            Some(PlaybackState::ReadyToPlay)
        );

        engine.reset_for_item();
        // The new item's one-shot readiness must not be swallowed by
        // deduplication against the old item's identical state.
        assert_eq!(
            engine.apply(&EngineSignal::Item(ItemStatus::ReadyToPlay)),
            Some(PlaybackState::ReadyToPlay)
        );
    }

    #[test]
    fn non_fusion_signals_do_not_rederive() {
        let mut engine = FusionEngine::new();
        assert_eq!(engine.apply(&EngineSignal::Rate(1.0)), None);
        assert_eq!(engine.apply(&EngineSignal::Duration(Some(120.0))), None);
        assert_eq!(engine.current(), PlaybackState::Stopped);
    }

    #[test]
    fn phase_projection() {
        assert_eq!(PlaybackState::Playing.phase(), PlaybackPhase::Playing);
        assert_eq!(PlaybackState::Buffering.phase(), PlaybackPhase::Buffering);
        assert_eq!(PlaybackState::Paused.phase(), PlaybackPhase::Paused);
        assert_eq!(PlaybackState::ReadyToPlay.phase(), PlaybackPhase::Paused);
        assert_eq!(PlaybackState::Stopped.phase(), PlaybackPhase::Stopped);
        assert_eq!(PlaybackState::Failed.phase(), PlaybackPhase::Stopped);
    }

    #[test]
    fn surface_status_mapping() {
        assert_eq!(
            PlaybackState::Buffering.surface_status(),
            SurfacePlaybackStatus::Playing
        );
        assert_eq!(
            PlaybackState::Failed.surface_status(),
            SurfacePlaybackStatus::Stopped
        );
    }
}
