//! Contracts between the playback synchronization core and its external
//! collaborators.
//!
//! The core never talks to a real media engine, audio session, or OS media
//! surface directly. Host applications provide implementations of the traits
//! defined here:
//!
//! - [`engine::MediaEngine`] - the native media engine (decoding, streaming,
//!   rendering). It pushes raw, possibly redundant signal changes and accepts
//!   a handful of fire-and-forget commands.
//! - [`session::AudioSession`] - the platform audio session, source of
//!   interruption and route-change events.
//! - [`now_playing::NowPlayingSurface`] - the OS "now playing" display
//!   (lock screen / control center equivalent).
//!
//! Keeping these seams as traits lets the core's lifecycle rules (sampler
//! arming, stale-item guards, state fusion) be tested without any platform
//! media stack present.

pub mod engine;
pub mod error;
pub mod now_playing;
pub mod session;

pub use engine::{EngineSignal, ItemId, ItemStatus, MediaEngine, TransportStatus};
pub use error::{BridgeError, Result};
pub use now_playing::{
    NowPlayingDisplay, NowPlayingInfo, NowPlayingSurface, RemoteCommandStatus,
    SurfacePlaybackStatus,
};
pub use session::{AudioSession, OutputPort, RouteChangeReason, SessionEvent};
