//! Now-playing surface contract and display metadata types.
//!
//! The now-playing surface is the OS-level display of the current media item
//! (lock screen, control center, system media widgets). The core assembles a
//! ready-to-render [`NowPlayingDisplay`] payload; the bridge only has to push
//! it to the platform and clear it when asked.

use serde::{Deserialize, Serialize};

/// Caller-supplied metadata attached to an item when it is loaded.
///
/// Immutable for the lifetime of its item. The declared `duration` is a hint
/// that is overridden by the engine's measured duration once that is known.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NowPlayingInfo {
    pub title: String,
    pub artist: Option<String>,
    /// Location of the artwork image; fetching and rendering it is the
    /// bridge's concern.
    pub artwork_url: Option<String>,
    /// Declared duration in seconds, used until a measured duration exists.
    pub duration: Option<f64>,
}

impl NowPlayingInfo {
    pub fn new(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            artist: None,
            artwork_url: None,
            duration: None,
        }
    }

    pub fn with_artist(mut self, artist: impl Into<String>) -> Self {
        self.artist = Some(artist.into());
        self
    }

    pub fn with_artwork_url(mut self, url: impl Into<String>) -> Self {
        self.artwork_url = Some(url.into());
        self
    }

    pub fn with_duration(mut self, duration: f64) -> Self {
        self.duration = Some(duration);
        self
    }
}

/// Assembled payload for the OS now-playing display.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct NowPlayingDisplay {
    pub title: String,
    pub artist: Option<String>,
    pub artwork_url: Option<String>,
    /// Elapsed playback time in seconds.
    pub elapsed: f64,
    /// Effective duration: measured when known, otherwise the declared one.
    pub duration: Option<f64>,
    /// `true` when the duration is unknown, i.e. live/unbounded content.
    pub live: bool,
}

/// Transport state as the OS surface understands it.
///
/// Coarser than the core's canonical state: buffering shows as `Playing` so
/// the surface does not flicker between states while the engine catches up.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SurfacePlaybackStatus {
    Playing,
    Paused,
    Stopped,
}

/// Result of a remote command, reported back to the OS dispatch surface so it
/// can reflect accurate enabled/disabled affordances.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum RemoteCommandStatus {
    /// The command was accepted and forwarded to the engine.
    Handled,
    /// The command's guard condition was not met (e.g. `play` while already
    /// playing); nothing was sent to the engine.
    NoActionableItem,
    /// The command was legal but the engine rejected it.
    Failed,
}

/// Contract for the OS now-playing display bridge.
pub trait NowPlayingSurface: Send + Sync {
    /// Replace the displayed metadata.
    fn set_display(&self, display: NowPlayingDisplay);

    /// Clear the display entirely (no current item, or playback failed).
    fn clear_display(&self);

    /// Update the transport indicator.
    fn set_playback_status(&self, status: SurfacePlaybackStatus);

    /// Enable or disable the skip-forward/skip-backward affordances.
    /// Disabled for live/unbounded content.
    fn set_skip_commands_enabled(&self, enabled: bool);
}
