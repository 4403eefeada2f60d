//! # Core Runtime Module
//!
//! Foundational runtime infrastructure for the playback core:
//! - Typed broadcast channel used for every observer-facing stream
//! - Logging and tracing configuration
//!
//! This crate contains no playback semantics; it establishes the async
//! broadcasting and logging conventions the rest of the workspace relies on.

pub mod broadcaster;
pub mod error;
pub mod logging;

pub use broadcaster::{Broadcaster, DEFAULT_CHANNEL_CAPACITY};
pub use error::{Error, Result};
