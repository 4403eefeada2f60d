//! # Now Playing Assembly
//!
//! Merges the independently-updating inputs of the system now-playing
//! surface (item metadata, playback state, filtered progress, measured
//! duration) into one renderable value. The assembler is pure bookkeeping;
//! publishing the result to a [`NowPlayingSurface`] is the controller's job.
//!
//! [`NowPlayingSurface`]: bridge_traits::now_playing::NowPlayingSurface

use crate::fusion::PlaybackState;
use crate::progress::Progress;
use bridge_traits::now_playing::{NowPlayingDisplay, NowPlayingInfo};

/// What the surface should show after an input changed.
#[derive(Debug, Clone, PartialEq)]
pub enum NowPlayingUpdate {
    /// Remove the entry entirely.
    Clear,
    /// Show or refresh the entry.
    Display(NowPlayingDisplay),
}

/// Accumulates surface inputs and renders them on demand.
#[derive(Debug)]
pub struct NowPlayingAssembler {
    state: PlaybackState,
    info: Option<NowPlayingInfo>,
    progress: Option<Progress>,
    measured_duration: Option<f64>,
}

impl NowPlayingAssembler {
    pub fn new() -> Self {
        Self {
            state: PlaybackState::Stopped,
            info: None,
            progress: None,
            measured_duration: None,
        }
    }

    /// Start over for a new item: metadata replaces the old item's, progress
    /// and measured duration are stale and discarded. An item loaded without
    /// metadata renders as a cleared surface until metadata arrives.
    pub fn begin_item(&mut self, info: Option<NowPlayingInfo>) -> NowPlayingUpdate {
        self.info = info;
        self.progress = None;
        self.measured_duration = None;
        self.render()
    }

    pub fn set_state(&mut self, state: PlaybackState) -> NowPlayingUpdate {
        self.state = state;
        self.render()
    }

    pub fn set_progress(&mut self, progress: Progress) -> NowPlayingUpdate {
        self.progress = Some(progress);
        self.render()
    }

    pub fn set_measured_duration(&mut self, duration: Option<f64>) -> NowPlayingUpdate {
        self.measured_duration = duration;
        self.render()
    }

    /// Tear everything down, as when playback stops or the item is unloaded.
    pub fn clear(&mut self) -> NowPlayingUpdate {
        self.state = PlaybackState::Stopped;
        self.info = None;
        self.progress = None;
        self.measured_duration = None;
        NowPlayingUpdate::Clear
    }

    /// Render the current inputs. A failed item or absent metadata clears
    /// the surface rather than showing a half-filled entry.
    pub fn render(&self) -> NowPlayingUpdate {
        if self.state == PlaybackState::Failed {
            return NowPlayingUpdate::Clear;
        }
        let Some(info) = &self.info else {
            return NowPlayingUpdate::Clear;
        };

        // Duration preference: the sampled stream, then the engine's
        // measurement, then whatever the metadata claimed.
        let duration = self
            .progress
            .as_ref()
            .and_then(|p| p.duration)
            .or(self.measured_duration)
            .or(info.duration);

        NowPlayingUpdate::Display(NowPlayingDisplay {
            title: info.title.clone(),
            artist: info.artist.clone(),
            artwork_url: info.artwork_url.clone(),
            elapsed: self.progress.as_ref().map(|p| p.elapsed).unwrap_or(0.0),
            duration,
            live: duration.is_none(),
        })
    }
}

impl Default for NowPlayingAssembler {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bridge_traits::engine::ItemId;

    fn info() -> NowPlayingInfo {
        NowPlayingInfo::new("Morning Show")
            .with_artist("KEXP")
            .with_artwork_url("https://example.com/art.png")
    }

    fn display(update: NowPlayingUpdate) -> NowPlayingDisplay {
        match update {
            NowPlayingUpdate::Display(display) => display,
            NowPlayingUpdate::Clear => panic!("expected display, got clear"),
        }
    }

    #[test]
    fn empty_assembler_clears() {
        let assembler = NowPlayingAssembler::new();
        assert_eq!(assembler.render(), NowPlayingUpdate::Clear);
    }

    #[test]
    fn metadata_without_duration_renders_live() {
        let mut assembler = NowPlayingAssembler::new();
        let shown = display(assembler.begin_item(Some(info())));
        assert_eq!(shown.title, "Morning Show");
        assert_eq!(shown.artist.as_deref(), Some("KEXP"));
        assert_eq!(shown.elapsed, 0.0);
        assert!(shown.live);
    }

    #[test]
    fn duration_preference_order() {
        let mut assembler = NowPlayingAssembler::new();
        assembler.begin_item(Some(info().with_duration(100.0)));
        assert_eq!(display(assembler.render()).duration, Some(100.0));

        assembler.set_measured_duration(Some(200.0));
        assert_eq!(display(assembler.render()).duration, Some(200.0));

        assembler.set_progress(Progress {
            item_id: ItemId::new(),
            elapsed: 12.0,
            duration: Some(300.0),
        });
        let shown = display(assembler.render());
        assert_eq!(shown.duration, Some(300.0));
        assert_eq!(shown.elapsed, 12.0);
        assert!(!shown.live);
    }

    #[test]
    fn failed_state_clears_even_with_metadata() {
        let mut assembler = NowPlayingAssembler::new();
        assembler.begin_item(Some(info()));
        assert_eq!(
            assembler.set_state(PlaybackState::Failed),
            NowPlayingUpdate::Clear
        );
        // Recovering out of failure shows the entry again.
        assert!(matches!(
            assembler.set_state(PlaybackState::Paused),
            NowPlayingUpdate::Display(_)
        ));
    }

    #[test]
    fn begin_item_discards_previous_progress() {
        let mut assembler = NowPlayingAssembler::new();
        assembler.begin_item(Some(info()));
        assembler.set_progress(Progress {
            item_id: ItemId::new(),
            elapsed: 45.0,
            duration: Some(60.0),
        });

        let shown = display(assembler.begin_item(Some(NowPlayingInfo::new("Next"))));
        assert_eq!(shown.title, "Next");
        assert_eq!(shown.elapsed, 0.0);
        assert_eq!(shown.duration, None);
    }

    #[test]
    fn item_without_metadata_renders_clear() {
        let mut assembler = NowPlayingAssembler::new();
        assembler.begin_item(Some(info()));
        assert_eq!(assembler.begin_item(None), NowPlayingUpdate::Clear);
        assert_eq!(
            assembler.set_state(PlaybackState::Playing),
            NowPlayingUpdate::Clear
        );
    }

    #[test]
    fn clear_tears_down() {
        let mut assembler = NowPlayingAssembler::new();
        assembler.begin_item(Some(info()));
        assert_eq!(assembler.clear(), NowPlayingUpdate::Clear);
        assert_eq!(assembler.render(), NowPlayingUpdate::Clear);
    }
}
