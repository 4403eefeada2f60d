//! # Progress Sampler
//!
//! Periodic playhead sampling while an item is actively playing. The sampler
//! is a spawned task tied to one item: it reads the engine's playhead on a
//! fixed cadence, stamps each sample with the item it was armed for, and
//! pushes it into a sink. Arming a new sampler always cancels the old one
//! first, so at most one sampler runs at a time.

use bridge_traits::engine::ItemId;
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tokio::time::MissedTickBehavior;
use tokio_util::sync::CancellationToken;
use tracing::trace;

/// One playhead observation.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Progress {
    /// The item the sampler was armed for. Consumers compare this against
    /// their own notion of the current item to drop stale samples.
    pub item_id: ItemId,
    /// Playhead position in seconds.
    pub elapsed: f64,
    /// Item duration in seconds, `None` for live or unbounded streams.
    pub duration: Option<f64>,
}

/// Handle to a running sampler task. Cancellation is idempotent, and
/// dropping the handle cancels the task.
#[derive(Debug)]
pub struct SamplerHandle {
    token: CancellationToken,
}

impl SamplerHandle {
    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn is_cancelled(&self) -> bool {
        self.token.is_cancelled()
    }
}

impl Drop for SamplerHandle {
    fn drop(&mut self) {
        self.token.cancel();
    }
}

/// Spawn a sampler for `item_id`.
///
/// `read` returns `(position, duration)` from the engine; a `None` position
/// (nothing loaded, or the playhead is not yet established) skips that tick
/// without emitting. `sink` receives each sample and returns whether sampling
/// should continue; returning `false` stops the task, which lets the sink
/// detect staleness itself.
///
/// The first sample is taken immediately on arming, then every `interval`.
pub fn arm_sampler<R, S>(item_id: ItemId, interval: Duration, read: R, sink: S) -> SamplerHandle
where
    R: Fn() -> (Option<f64>, Option<f64>) + Send + 'static,
    S: Fn(Progress) -> bool + Send + 'static,
{
    let token = CancellationToken::new();
    let task_token = token.clone();

    tokio::spawn(async move {
        let mut ticker = tokio::time::interval(interval);
        // A delayed task should not burst-fire to catch up.
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);

        loop {
            tokio::select! {
                // Cancellation must win over a pending tick.
                biased;
                _ = task_token.cancelled() => {
                    trace!(%item_id, "sampler cancelled");
                    break;
                }
                _ = ticker.tick() => {
                    let (position, duration) = read();
                    let Some(elapsed) = position else {
                        continue;
                    };
                    let sample = Progress {
                        item_id,
                        elapsed,
                        duration,
                    };
                    if !sink(sample) {
                        trace!(%item_id, "sampler sink declined, stopping");
                        break;
                    }
                }
            }
        }
    });

    SamplerHandle { token }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::sync::atomic::{AtomicU32, Ordering};
    use std::sync::{Arc, Mutex};

    #[tokio::test(start_paused = true)]
    async fn samples_on_cadence_starting_immediately() {
        let item = ItemId::new();
        let count = Arc::new(AtomicU32::new(0));
        let samples = Arc::new(Mutex::new(Vec::new()));

        let read_count = count.clone();
        let sink_samples = samples.clone();
        let handle = arm_sampler(
            item,
            Duration::from_millis(500),
            move || {
                let n = read_count.fetch_add(1, Ordering::SeqCst);
                (Some(n as f64), Some(100.0))
            },
            move |sample| {
                sink_samples.lock().unwrap().push(sample);
                true
            },
        );

        // First tick fires on arming, then two more over one second.
        tokio::time::sleep(Duration::from_millis(1100)).await;
        handle.cancel();
        tokio::time::sleep(Duration::from_millis(10)).await;

        let collected = samples.lock().unwrap();
        assert_eq!(collected.len(), 3);
        assert_eq!(collected[0].elapsed, 0.0);
        assert_eq!(collected[0].item_id, item);
        assert_eq!(collected[2].elapsed, 2.0);
    }

    #[tokio::test(start_paused = true)]
    async fn missing_position_skips_the_tick() {
        let item = ItemId::new();
        let count = Arc::new(AtomicU32::new(0));
        let emitted = Arc::new(AtomicU32::new(0));

        let read_count = count.clone();
        let sink_emitted = emitted.clone();
        let handle = arm_sampler(
            item,
            Duration::from_millis(500),
            move || {
                // Position unavailable on every other tick.
                let n = read_count.fetch_add(1, Ordering::SeqCst);
                if n % 2 == 0 {
                    (None, None)
                } else {
                    (Some(n as f64), None)
                }
            },
            move |_| {
                sink_emitted.fetch_add(1, Ordering::SeqCst);
                true
            },
        );

        tokio::time::sleep(Duration::from_millis(1600)).await;
        handle.cancel();
        tokio::time::sleep(Duration::from_millis(10)).await;

        assert_eq!(count.load(Ordering::SeqCst), 4);
        assert_eq!(emitted.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn sink_can_stop_the_sampler() {
        let item = ItemId::new();
        let emitted = Arc::new(AtomicU32::new(0));

        let sink_emitted = emitted.clone();
        let _handle = arm_sampler(
            item,
            Duration::from_millis(100),
            move || (Some(1.0), None),
            move |_| {
                // Accept exactly one sample.
                sink_emitted.fetch_add(1, Ordering::SeqCst) == 0
            },
        );

        tokio::time::sleep(Duration::from_millis(1000)).await;
        assert_eq!(emitted.load(Ordering::SeqCst), 2);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_is_idempotent() {
        let item = ItemId::new();
        let emitted = Arc::new(AtomicU32::new(0));

        let sink_emitted = emitted.clone();
        let handle = arm_sampler(
            item,
            Duration::from_millis(100),
            move || (Some(0.0), None),
            move |_| {
                sink_emitted.fetch_add(1, Ordering::SeqCst);
                true
            },
        );

        handle.cancel();
        handle.cancel();
        assert!(handle.is_cancelled());

        let before = emitted.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(emitted.load(Ordering::SeqCst), before);
    }

    #[tokio::test(start_paused = true)]
    async fn dropping_the_handle_cancels() {
        let item = ItemId::new();
        let emitted = Arc::new(AtomicU32::new(0));

        let sink_emitted = emitted.clone();
        let handle = arm_sampler(
            item,
            Duration::from_millis(100),
            move || (Some(0.0), None),
            move |_| {
                sink_emitted.fetch_add(1, Ordering::SeqCst);
                true
            },
        );

        tokio::time::sleep(Duration::from_millis(250)).await;
        drop(handle);
        let before = emitted.load(Ordering::SeqCst);
        tokio::time::sleep(Duration::from_millis(500)).await;
        assert_eq!(emitted.load(Ordering::SeqCst), before);
    }
}
