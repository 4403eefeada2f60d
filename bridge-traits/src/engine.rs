//! Media engine contract and raw signal types.
//!
//! The media engine is the component that actually decodes, streams and
//! renders audio. From the core's perspective it is a black box that accepts
//! a small set of commands and pushes asynchronous change notifications for a
//! handful of raw properties. Signals can arrive redundantly (the same value
//! twice) or out of order relative to each other; the core is responsible for
//! deduplication and for deriving a single canonical state from them.
//!
//! Host applications wrap their native player (AVPlayer, ExoPlayer, GStreamer
//! pipeline, ...) in a [`MediaEngine`] implementation.

use crate::error::Result;
use async_trait::async_trait;
use serde::{Deserialize, Serialize};
use std::fmt;
use tokio::sync::broadcast;
use uuid::Uuid;

/// Identifier for a single playable item loaded into the engine.
///
/// A fresh id is minted every time an item is loaded, even for the same URL,
/// so progress samples can always be attributed to the exact load they were
/// measured against.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ItemId(Uuid);

impl ItemId {
    /// Generate a new unique item identifier.
    pub fn new() -> Self {
        Self(Uuid::new_v4())
    }

    /// Construct an identifier from an existing UUID.
    pub fn from_uuid(id: Uuid) -> Self {
        Self(id)
    }

    /// Borrow the underlying UUID.
    pub fn as_uuid(&self) -> &Uuid {
        &self.0
    }
}

impl Default for ItemId {
    fn default() -> Self {
        Self::new()
    }
}

impl fmt::Display for ItemId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        self.0.fmt(f)
    }
}

/// Engine-reported intent-to-play signal.
///
/// Distinct from buffering health: the engine can be `Playing` in intent
/// while the buffers are in no shape to actually advance.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TransportStatus {
    /// Playback is paused.
    Paused,
    /// The engine wants to play but is waiting until it can sustain the
    /// requested rate.
    WaitingAtRate,
    /// The engine is actively advancing the playhead.
    Playing,
}

/// Readiness of the currently loaded item.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ItemStatus {
    /// The item has not finished loading; readiness is not yet known.
    Unknown,
    /// The item loaded and can be played.
    ReadyToPlay,
    /// The item failed to load or play. Terminal for that item.
    Failed,
}

/// A single raw change notification pushed by the engine.
///
/// Each variant mirrors one independently-updating engine property. The
/// engine emits a signal whenever the property changes (and is allowed to
/// re-emit unchanged values).
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "signal", content = "value")]
pub enum EngineSignal {
    /// Playback rate changed. `0.0` means not advancing.
    Rate(f32),
    /// Transport status changed.
    Transport(TransportStatus),
    /// Current item readiness changed.
    Item(ItemStatus),
    /// Engine's estimate of whether playback can continue without stalling.
    LikelyToKeepUp(bool),
    /// The playback buffer ran empty.
    BufferEmpty(bool),
    /// The playback buffer is full.
    BufferFull(bool),
    /// The engine's current item changed. `None` when no item is loaded.
    CurrentItem(Option<ItemId>),
    /// Measured duration of the current item became known or changed.
    /// `None` means unknown (live/unbounded content).
    Duration(Option<f64>),
    /// The current item played through to its end.
    PlayedToEnd(ItemId),
}

/// Contract for the native media engine.
///
/// Commands are fire-and-forget: a returned `Ok(())` only means the engine
/// accepted the command. Completion (the item actually being ready, the seek
/// actually landing) is observed later through [`EngineSignal`] changes.
///
/// Out-of-range seek positions are forwarded as-is; clamping to the item's
/// bounds is the engine's responsibility.
#[async_trait]
pub trait MediaEngine: Send + Sync {
    /// Load `url` as the current item, replacing any previously loaded item,
    /// and return the new item's id. When `start_position` is given the
    /// engine begins at that offset (seconds).
    async fn load_item(&self, url: &str, start_position: Option<f64>) -> Result<ItemId>;

    /// Begin or resume playback of the current item.
    async fn play(&self) -> Result<()>;

    /// Pause playback, keeping the current item loaded.
    async fn pause(&self) -> Result<()>;

    /// Seek to an absolute position (seconds) in the current item.
    async fn seek(&self, position: f64) -> Result<()>;

    /// Unload the current item (replace with nothing).
    async fn clear_item(&self) -> Result<()>;

    /// Current playhead position in seconds, `None` when no item is loaded.
    fn position(&self) -> Option<f64>;

    /// Measured duration of the current item in seconds. `None` until the
    /// engine has determined it, or indefinitely for live content.
    fn measured_duration(&self) -> Option<f64>;

    /// Subscribe to raw signal change notifications.
    ///
    /// Every subscriber receives every signal emitted after the point of
    /// subscription; past signals are not replayed.
    fn subscribe(&self) -> broadcast::Receiver<EngineSignal>;
}
