//! Typed broadcast channel for observer streams.
//!
//! Every stream the playback core exposes (canonical state, progress,
//! now-playing updates, played-to-end notifications) is carried by a
//! [`Broadcaster`], a thin wrapper over `tokio::sync::broadcast`:
//!
//! - multiple producers (clone the `Broadcaster`);
//! - multiple independent consumers (each `subscribe()` is its own receiver);
//! - subscribing or dropping a receiver never affects other subscribers or
//!   the producing loop;
//! - slow subscribers get `RecvError::Lagged` instead of blocking anyone.
//!
//! Emission with zero subscribers is not an error: the producing loops run
//! whether or not anybody is listening.

use std::fmt;
use tokio::sync::broadcast;

// Re-export commonly used types
pub use tokio::sync::broadcast::error::RecvError;
pub use tokio::sync::broadcast::Receiver;

/// Default buffer size for broadcast channels.
///
/// Large enough to absorb bursts of raw-signal-driven emissions; subscribers
/// that cannot keep up receive `RecvError::Lagged`.
pub const DEFAULT_CHANNEL_CAPACITY: usize = 64;

/// A typed broadcast channel.
///
/// # Example
///
/// ```rust
/// use core_runtime::broadcaster::Broadcaster;
///
/// # #[tokio::main(flavor = "current_thread")]
/// # async fn main() {
/// let bus: Broadcaster<u32> = Broadcaster::new(16);
/// let mut sub = bus.subscribe();
///
/// bus.emit(7);
/// assert_eq!(sub.recv().await.unwrap(), 7);
/// # }
/// ```
#[derive(Clone)]
pub struct Broadcaster<T: Clone> {
    sender: broadcast::Sender<T>,
}

impl<T: Clone> Broadcaster<T> {
    /// Creates a new broadcaster with the given per-subscriber buffer size.
    pub fn new(capacity: usize) -> Self {
        let (sender, _) = broadcast::channel(capacity.max(1));
        Self { sender }
    }

    /// Creates a broadcaster with [`DEFAULT_CHANNEL_CAPACITY`].
    pub fn with_default_capacity() -> Self {
        Self::new(DEFAULT_CHANNEL_CAPACITY)
    }

    /// Publishes a value to all current subscribers.
    ///
    /// Returns the number of subscribers that received it. Zero subscribers
    /// is not an error.
    pub fn emit(&self, value: T) -> usize {
        self.sender.send(value).unwrap_or(0)
    }

    /// Creates a new independent subscriber.
    ///
    /// Only values emitted after this call are delivered; past values are
    /// not replayed.
    pub fn subscribe(&self) -> Receiver<T> {
        self.sender.subscribe()
    }

    /// Number of active subscribers.
    pub fn subscriber_count(&self) -> usize {
        self.sender.receiver_count()
    }
}

impl<T: Clone> Default for Broadcaster<T> {
    fn default() -> Self {
        Self::with_default_capacity()
    }
}

impl<T: Clone> fmt::Debug for Broadcaster<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Broadcaster")
            .field("subscriber_count", &self.subscriber_count())
            .finish()
    }
}
