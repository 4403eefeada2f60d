//! # Significant Change Filter
//!
//! Down-samples the progress stream for expensive consumers (the system
//! now-playing surface). A sample passes only when it moved at least
//! `threshold` seconds away from the last sample that passed, in either
//! direction, so seeks backwards register too. Wall-clock time between
//! samples plays no part in the decision.

use crate::progress::Progress;

/// Value-delta gate over a [`Progress`] stream.
///
/// The comparison baseline is the last *passed* sample, not the last seen
/// one, so a slow trickle of sub-threshold samples still accumulates into an
/// eventual pass.
#[derive(Debug)]
pub struct SignificantChangeFilter {
    threshold: f64,
    last: Option<Progress>,
}

impl SignificantChangeFilter {
    pub fn new(threshold: f64) -> Self {
        Self {
            threshold,
            last: None,
        }
    }

    /// Offer a sample. Returns `true` when it should be forwarded.
    ///
    /// The first sample after construction or [`reset`](Self::reset) always
    /// passes, as does the first sample of a different item.
    pub fn offer(&mut self, sample: &Progress) -> bool {
        let significant = match &self.last {
            None => true,
            Some(last) if last.item_id != sample.item_id => true,
            Some(last) => (sample.elapsed - last.elapsed).abs() >= self.threshold,
        };
        if significant {
            self.last = Some(sample.clone());
        }
        significant
    }

    /// Forget the baseline. The next sample offered will pass.
    pub fn reset(&mut self) {
        self.last = None;
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::engine::ItemId;

    fn sample(item_id: ItemId, elapsed: f64) -> Progress {
        Progress {
            item_id,
            elapsed,
            duration: Some(300.0),
        }
    }

    #[test]
    fn baseline_is_last_passed_sample() {
        let item = ItemId::new();
        let mut filter = SignificantChangeFilter::new(10.0);

        let offered = [0.0, 3.0, 7.0, 12.0, 25.0];
        let passed: Vec<f64> = offered
            .iter()
            .copied()
            .filter(|elapsed| filter.offer(&sample(item, *elapsed)))
            .collect();

        // 3 and 7 are within 10 of the baseline 0; 12 passes and becomes the
        // new baseline; 25 is 13 past it.
        assert_eq!(passed, vec![0.0, 12.0, 25.0]);
    }

    #[test]
    fn backwards_seeks_count() {
        let item = ItemId::new();
        let mut filter = SignificantChangeFilter::new(10.0);
        assert!(filter.offer(&sample(item, 60.0)));
        assert!(filter.offer(&sample(item, 45.0)));
        assert!(!filter.offer(&sample(item, 40.0)));
    }

    #[test]
    fn exact_threshold_passes() {
        let item = ItemId::new();
        let mut filter = SignificantChangeFilter::new(10.0);
        assert!(filter.offer(&sample(item, 0.0)));
        assert!(filter.offer(&sample(item, 10.0)));
    }

    #[test]
    fn item_change_always_passes() {
        let mut filter = SignificantChangeFilter::new(10.0);
        assert!(filter.offer(&sample(ItemId::new(), 100.0)));
        // New item at a numerically close position still passes.
        assert!(filter.offer(&sample(ItemId::new(), 101.0)));
    }

    #[test]
    fn reset_forgets_baseline() {
        let item = ItemId::new();
        let mut filter = SignificantChangeFilter::new(10.0);
        assert!(filter.offer(&sample(item, 50.0)));
        assert!(!filter.offer(&sample(item, 51.0)));
        filter.reset();
        assert!(filter.offer(&sample(item, 51.0)));
    }
}
