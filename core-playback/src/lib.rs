//! # Core Playback
//!
//! Playback-state synchronization: derives one canonical state stream from a
//! media engine's raw signals and keeps every downstream consumer (UI
//! observers, the OS now-playing surface, remote-command dispatch) consistent
//! with it.
//!
//! The crate is engine-agnostic. Hosts implement the contracts in
//! [`bridge_traits`] (a [`MediaEngine`], an [`AudioSession`], optionally a
//! [`NowPlayingSurface`]) and hand them to a [`PlayerController`], which runs
//! the derivation and fan-out:
//!
//! - [`fusion`] - first-match resolution of raw signals into [`PlaybackState`]
//! - [`progress`] - periodic playhead sampling tied to the active item
//! - [`filter`] - significant-change gating for latency-tolerant consumers
//! - [`recovery`] - interruption and route-change policy
//! - [`now_playing`] - assembly of the OS display payload
//! - [`controller`] - command routing, remote guards, and stream fan-out
//!
//! [`MediaEngine`]: bridge_traits::engine::MediaEngine
//! [`AudioSession`]: bridge_traits::session::AudioSession
//! [`NowPlayingSurface`]: bridge_traits::now_playing::NowPlayingSurface

pub mod config;
pub mod controller;
pub mod error;
pub mod filter;
pub mod fusion;
pub mod now_playing;
pub mod progress;
pub mod recovery;

pub use config::PlayerConfig;
pub use controller::{PlayableItem, PlayerController};
pub use error::{PlayerError, Result};
pub use filter::SignificantChangeFilter;
pub use fusion::{FusionEngine, PlaybackPhase, PlaybackState};
pub use now_playing::{NowPlayingAssembler, NowPlayingUpdate};
pub use progress::{Progress, SamplerHandle};
pub use recovery::RecoveryAction;
