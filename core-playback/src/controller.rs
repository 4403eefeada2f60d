//! # Playback Controller
//!
//! Ties the pieces together: consumes the engine's raw signal stream through
//! the [`FusionEngine`], manages the progress sampler lifecycle, assembles
//! now-playing updates, applies session recovery policy, and routes commands
//! (both direct and remote) to the engine.
//!
//! The controller owns no playback machinery itself. The engine remains the
//! source of truth for the playhead and item lifetime; the controller derives,
//! filters, and fans out.

use crate::config::PlayerConfig;
use crate::error::{PlayerError, Result};
use crate::filter::SignificantChangeFilter;
use crate::fusion::{FusionEngine, PlaybackPhase, PlaybackState};
use crate::now_playing::{NowPlayingAssembler, NowPlayingUpdate};
use crate::progress::{self, Progress, SamplerHandle};
use crate::recovery::{self, RecoveryAction};
use bridge_traits::engine::{EngineSignal, ItemId, MediaEngine};
use bridge_traits::now_playing::{NowPlayingInfo, NowPlayingSurface, RemoteCommandStatus};
use bridge_traits::session::AudioSession;
use core_runtime::broadcaster::{Broadcaster, Receiver, RecvError};
use parking_lot::Mutex;
use std::sync::{Arc, Weak};
use tokio::sync::watch;
use tokio_util::sync::CancellationToken;
use tracing::{debug, info, instrument, warn};

// ============================================================================
// Items
// ============================================================================

/// An item the controller loaded into the engine, with the metadata needed
/// to represent it on the now-playing surface.
#[derive(Debug, Clone)]
pub struct PlayableItem {
    pub id: ItemId,
    pub url: String,
    pub info: Option<NowPlayingInfo>,
}

// ============================================================================
// Internal state
// ============================================================================

/// Mutable controller state, guarded by one mutex. Never held across await
/// points.
struct ControllerState {
    fusion: FusionEngine,
    filter: SignificantChangeFilter,
    assembler: NowPlayingAssembler,
    current_item: Option<PlayableItem>,
    sampler: Option<SamplerHandle>,
    /// Last rate the engine reported; drives toggle direction.
    last_rate: f32,
    /// Last sampled playhead, the fallback base for relative seeks.
    last_elapsed: f64,
}

impl ControllerState {
    fn new(config: &PlayerConfig) -> Self {
        Self {
            fusion: FusionEngine::new(),
            filter: SignificantChangeFilter::new(config.significant_change_threshold),
            assembler: NowPlayingAssembler::new(),
            current_item: None,
            sampler: None,
            last_rate: 0.0,
            last_elapsed: 0.0,
        }
    }

    fn cancel_sampler(&mut self) {
        if let Some(sampler) = self.sampler.take() {
            sampler.cancel();
        }
    }

    fn current_item_id(&self) -> Option<ItemId> {
        self.current_item.as_ref().map(|item| item.id)
    }
}

/// State and fan-out channels shared between the controller and its
/// background tasks.
struct Shared {
    state: Mutex<ControllerState>,
    state_tx: Broadcaster<PlaybackState>,
    progress_tx: Broadcaster<Progress>,
    now_playing_tx: Broadcaster<NowPlayingUpdate>,
    played_to_end_tx: Broadcaster<Option<NowPlayingInfo>>,
    is_playing_tx: watch::Sender<bool>,
    skip_enabled_tx: watch::Sender<bool>,
}

// ============================================================================
// Controller
// ============================================================================

/// The playback synchronization controller.
///
/// Construct with [`PlayerController::new`]; the returned `Arc` can be cloned
/// freely. Observers subscribe to the typed streams; commands go through the
/// async methods. Dropping the last `Arc` (or calling
/// [`shutdown`](Self::shutdown)) stops the background tasks.
pub struct PlayerController {
    engine: Arc<dyn MediaEngine>,
    session: Arc<dyn AudioSession>,
    config: PlayerConfig,
    shared: Arc<Shared>,
    shutdown: CancellationToken,
}

impl PlayerController {
    /// Create a controller and start its signal and session loops.
    ///
    /// # Errors
    ///
    /// Returns [`PlayerError::InvalidConfig`] when the configuration fails
    /// validation.
    pub fn new(
        engine: Arc<dyn MediaEngine>,
        session: Arc<dyn AudioSession>,
        config: PlayerConfig,
    ) -> Result<Arc<Self>> {
        config.validate()?;

        let (is_playing_tx, _) = watch::channel(false);
        // Skip commands start enabled; a live stream disables them once the
        // engine reports an unknown duration.
        let (skip_enabled_tx, _) = watch::channel(true);

        let shared = Arc::new(Shared {
            state: Mutex::new(ControllerState::new(&config)),
            state_tx: Broadcaster::new(config.event_capacity),
            progress_tx: Broadcaster::new(config.event_capacity),
            now_playing_tx: Broadcaster::new(config.event_capacity),
            played_to_end_tx: Broadcaster::new(config.event_capacity),
            is_playing_tx,
            skip_enabled_tx,
        });

        let controller = Arc::new(Self {
            engine: engine.clone(),
            session: session.clone(),
            config: config.clone(),
            shared: shared.clone(),
            shutdown: CancellationToken::new(),
        });

        controller.spawn_signal_loop(engine, shared, config);
        controller.spawn_session_loop(session);

        Ok(controller)
    }

    // ------------------------------------------------------------------
    // Background loops
    // ------------------------------------------------------------------

    fn spawn_signal_loop(
        &self,
        engine: Arc<dyn MediaEngine>,
        shared: Arc<Shared>,
        config: PlayerConfig,
    ) {
        let mut signals = engine.subscribe();
        let token = self.shutdown.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    signal = signals.recv() => match signal {
                        Ok(signal) => {
                            Self::handle_signal(&engine, &shared, &config, signal);
                        }
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "engine signal stream lagged");
                        }
                        Err(RecvError::Closed) => {
                            debug!("engine signal stream closed");
                            break;
                        }
                    },
                }
            }
        });
    }

    fn spawn_session_loop(self: &Arc<Self>, session: Arc<dyn AudioSession>) {
        let mut events = session.subscribe();
        let token = self.shutdown.clone();
        let weak: Weak<Self> = Arc::downgrade(self);
        tokio::spawn(async move {
            loop {
                let event = tokio::select! {
                    _ = token.cancelled() => break,
                    event = events.recv() => match event {
                        Ok(event) => event,
                        Err(RecvError::Lagged(skipped)) => {
                            warn!(skipped, "session event stream lagged");
                            continue;
                        }
                        Err(RecvError::Closed) => break,
                    },
                };

                let Some(controller) = weak.upgrade() else {
                    break;
                };
                let action = recovery::decide(&event);
                debug!(?event, ?action, "session event");
                // Recovery failures are logged, never propagated: there is no
                // caller to report them to.
                let outcome = match action {
                    RecoveryAction::Pause => controller.pause().await,
                    RecoveryAction::Play => controller.play().await,
                    RecoveryAction::None => Ok(()),
                };
                if let Err(err) = outcome {
                    warn!(error = %err, ?action, "session recovery failed");
                }
            }
        });
    }

    /// Fold one raw signal into the controller state. Synchronous: takes the
    /// state lock, never awaits.
    fn handle_signal(
        engine: &Arc<dyn MediaEngine>,
        shared: &Arc<Shared>,
        config: &PlayerConfig,
        signal: EngineSignal,
    ) {
        let mut state = shared.state.lock();

        match &signal {
            EngineSignal::Rate(rate) => {
                state.last_rate = *rate;
                shared.is_playing_tx.send_replace(*rate != 0.0);
            }
            EngineSignal::CurrentItem(None) => {
                state.cancel_sampler();
                state.current_item = None;
                let update = state.assembler.clear();
                shared.now_playing_tx.emit(update);
            }
            EngineSignal::CurrentItem(Some(id)) => {
                if state.current_item_id() != Some(*id) {
                    debug!(%id, "engine swapped items, resetting derivation");
                    state.fusion.reset_for_item();
                    state.filter.reset();
                }
            }
            EngineSignal::Duration(duration) => {
                let update = state.assembler.set_measured_duration(*duration);
                shared.now_playing_tx.emit(update);
                // Skipping within an item only makes sense when it has a
                // known extent.
                shared.skip_enabled_tx.send_replace(duration.is_some());
            }
            EngineSignal::PlayedToEnd(id) => {
                if state.current_item_id() == Some(*id) {
                    info!(%id, "item played to end");
                    let info = state
                        .current_item
                        .as_ref()
                        .and_then(|item| item.info.clone());
                    shared.played_to_end_tx.emit(info);
                }
            }
            _ => {}
        }

        let Some(new_state) = state.fusion.apply(&signal) else {
            return;
        };

        info!(state = %new_state, "playback state transition");
        shared.state_tx.emit(new_state);
        let update = state.assembler.set_state(new_state);
        shared.now_playing_tx.emit(update);

        match new_state {
            PlaybackState::Playing => {
                Self::arm_sampler_locked(&mut state, engine, shared, config);
            }
            PlaybackState::Failed => {
                state.cancel_sampler();
                state.filter.reset();
            }
            _ => {
                state.cancel_sampler();
            }
        }
    }

    /// Replace the running sampler with one armed for the current item.
    /// Old sampler first, without exception: two samplers must never overlap.
    fn arm_sampler_locked(
        state: &mut ControllerState,
        engine: &Arc<dyn MediaEngine>,
        shared: &Arc<Shared>,
        config: &PlayerConfig,
    ) {
        state.cancel_sampler();

        let Some(item_id) = state.current_item_id() else {
            debug!("playing without a tracked item, sampler not armed");
            return;
        };

        let read_engine = engine.clone();
        let sink_shared = shared.clone();
        let handle = progress::arm_sampler(
            item_id,
            config.progress_interval,
            move || (read_engine.position(), read_engine.measured_duration()),
            move |sample| {
                let mut state = sink_shared.state.lock();
                // The item changed since this sampler was armed: the sample
                // is stale and the sampler has outlived its purpose.
                if state.current_item_id() != Some(sample.item_id) {
                    return false;
                }
                state.last_elapsed = sample.elapsed;
                sink_shared.progress_tx.emit(sample.clone());
                if state.filter.offer(&sample) {
                    let update = state.assembler.set_progress(sample);
                    sink_shared.now_playing_tx.emit(update);
                }
                true
            },
        );
        state.sampler = Some(handle);
    }

    // ------------------------------------------------------------------
    // Commands
    // ------------------------------------------------------------------

    /// Load an item into the engine and start playing it. `info` feeds the
    /// now-playing surface; without it the surface stays clear.
    ///
    /// Audio-session activation failure is logged and tolerated; load or
    /// play failure is not.
    #[instrument(skip(self, info), fields(url = %url))]
    pub async fn load_and_play(
        &self,
        url: &str,
        info: Option<NowPlayingInfo>,
        start_position: Option<f64>,
    ) -> Result<ItemId> {
        if let Err(err) = self
            .session
            .activate()
            .await
            .map_err(|e| PlayerError::SessionActivation(e.to_string()))
        {
            warn!(error = %err, "audio session activation failed, continuing");
        }

        let id = self.engine.load_item(url, start_position).await?;
        info!(%id, "item loaded");

        {
            let mut state = self.shared.state.lock();
            state.cancel_sampler();
            state.fusion.reset_for_item();
            state.filter.reset();
            state.last_elapsed = start_position.unwrap_or(0.0);
            state.current_item = Some(PlayableItem {
                id,
                url: url.to_string(),
                info: info.clone(),
            });
            let update = state.assembler.begin_item(info);
            self.shared.now_playing_tx.emit(update);
        }

        self.engine.play().await?;
        Ok(id)
    }

    #[instrument(skip(self))]
    pub async fn play(&self) -> Result<()> {
        self.engine.play().await?;
        Ok(())
    }

    #[instrument(skip(self))]
    pub async fn pause(&self) -> Result<()> {
        self.engine.pause().await?;
        Ok(())
    }

    /// Play or pause depending on whether the engine is currently advancing.
    #[instrument(skip(self))]
    pub async fn toggle_play(&self) -> Result<()> {
        let playing = self.shared.state.lock().last_rate != 0.0;
        if playing {
            self.pause().await
        } else {
            self.play().await
        }
    }

    /// Stop playback and unload the item. The controller forgets the item,
    /// the engine drops it, and the surface clears.
    #[instrument(skip(self))]
    pub async fn stop(&self) -> Result<()> {
        self.engine.pause().await?;
        self.engine.clear_item().await?;

        let mut state = self.shared.state.lock();
        state.cancel_sampler();
        state.current_item = None;
        state.fusion = FusionEngine::new();
        state.filter.reset();
        state.last_rate = 0.0;
        state.last_elapsed = 0.0;
        let update = state.assembler.clear();
        drop(state);

        self.shared.state_tx.emit(PlaybackState::Stopped);
        self.shared.now_playing_tx.emit(update);
        self.shared.is_playing_tx.send_replace(false);
        Ok(())
    }

    /// Seek to an absolute position in seconds.
    #[instrument(skip(self))]
    pub async fn seek_to(&self, position: f64) -> Result<()> {
        self.engine.seek(position).await?;
        Ok(())
    }

    /// Seek relative to the current playhead. Positive skips forward. The
    /// engine clamps out-of-range targets itself.
    #[instrument(skip(self))]
    pub async fn seek_by(&self, delta: f64) -> Result<()> {
        let base = self
            .engine
            .position()
            .unwrap_or_else(|| self.shared.state.lock().last_elapsed);
        self.seek_to(base + delta).await
    }

    // ------------------------------------------------------------------
    // Remote commands
    // ------------------------------------------------------------------

    /// Remote play. Actionable only when an item is loaded and playback is
    /// not already running.
    #[instrument(skip(self))]
    pub async fn remote_play(&self) -> RemoteCommandStatus {
        let outcome = async {
            self.guard("play", self.has_item(), "no item loaded")?;
            self.guard(
                "play",
                self.phase() != PlaybackPhase::Playing,
                "already playing",
            )?;
            self.play().await
        };
        Self::report("play", outcome.await)
    }

    /// Remote pause. Actionable only while playing.
    #[instrument(skip(self))]
    pub async fn remote_pause(&self) -> RemoteCommandStatus {
        let outcome = async {
            self.guard("pause", self.has_item(), "no item loaded")?;
            self.guard(
                "pause",
                self.phase() == PlaybackPhase::Playing,
                "not playing",
            )?;
            self.pause().await
        };
        Self::report("pause", outcome.await)
    }

    /// Remote play/pause toggle. Actionable whenever an item is loaded.
    #[instrument(skip(self))]
    pub async fn remote_toggle(&self) -> RemoteCommandStatus {
        let outcome = async {
            self.guard("toggle", self.has_item(), "no item loaded")?;
            self.toggle_play().await
        };
        Self::report("toggle", outcome.await)
    }

    /// Remote stop.
    #[instrument(skip(self))]
    pub async fn remote_stop(&self) -> RemoteCommandStatus {
        let outcome = async {
            self.guard("stop", self.has_item(), "no item loaded")?;
            self.stop().await
        };
        Self::report("stop", outcome.await)
    }

    /// Remote skip forward by `interval` seconds, or the configured default.
    #[instrument(skip(self))]
    pub async fn remote_skip_forward(&self, interval: Option<f64>) -> RemoteCommandStatus {
        let step = interval.unwrap_or(self.config.skip_interval);
        let outcome = async {
            self.guard("skip_forward", self.has_item(), "no item loaded")?;
            self.seek_by(step).await
        };
        Self::report("skip_forward", outcome.await)
    }

    /// Remote skip backward by `interval` seconds, or the configured default.
    #[instrument(skip(self))]
    pub async fn remote_skip_backward(&self, interval: Option<f64>) -> RemoteCommandStatus {
        let step = interval.unwrap_or(self.config.skip_interval);
        let outcome = async {
            self.guard("skip_backward", self.has_item(), "no item loaded")?;
            self.seek_by(-step).await
        };
        Self::report("skip_backward", outcome.await)
    }

    /// Remote scrub to an absolute position.
    #[instrument(skip(self))]
    pub async fn remote_change_position(&self, position: f64) -> RemoteCommandStatus {
        let outcome = async {
            self.guard("change_position", self.has_item(), "no item loaded")?;
            self.seek_to(position).await
        };
        Self::report("change_position", outcome.await)
    }

    fn guard(&self, command: &'static str, actionable: bool, reason: &'static str) -> Result<()> {
        if actionable {
            Ok(())
        } else {
            Err(PlayerError::CommandRejected { command, reason })
        }
    }

    fn report(command: &'static str, outcome: Result<()>) -> RemoteCommandStatus {
        match outcome {
            Ok(()) => RemoteCommandStatus::Handled,
            Err(err) if err.is_rejection() => {
                debug!(command, error = %err, "remote command not actionable");
                RemoteCommandStatus::NoActionableItem
            }
            Err(err) => {
                warn!(command, error = %err, "remote command failed");
                RemoteCommandStatus::Failed
            }
        }
    }

    fn has_item(&self) -> bool {
        self.shared.state.lock().current_item.is_some()
    }

    // ------------------------------------------------------------------
    // Observation
    // ------------------------------------------------------------------

    /// Canonical playback state transitions, deduplicated.
    pub fn subscribe_state(&self) -> Receiver<PlaybackState> {
        self.shared.state_tx.subscribe()
    }

    /// Full-rate progress samples for the active item.
    pub fn subscribe_progress(&self) -> Receiver<Progress> {
        self.shared.progress_tx.subscribe()
    }

    /// Assembled now-playing payloads, progress pre-filtered for significant
    /// changes.
    pub fn subscribe_now_playing(&self) -> Receiver<NowPlayingUpdate> {
        self.shared.now_playing_tx.subscribe()
    }

    /// Fires once per item that reaches its natural end, carrying its
    /// metadata when the controller still tracks it.
    pub fn subscribe_played_to_end(&self) -> Receiver<Option<NowPlayingInfo>> {
        self.shared.played_to_end_tx.subscribe()
    }

    /// Latest-value view of whether the engine's rate is nonzero.
    pub fn subscribe_is_playing(&self) -> watch::Receiver<bool> {
        self.shared.is_playing_tx.subscribe()
    }

    /// Latest-value view of whether skip commands apply to the current item.
    pub fn subscribe_skip_enabled(&self) -> watch::Receiver<bool> {
        self.shared.skip_enabled_tx.subscribe()
    }

    /// Current canonical state.
    pub fn state(&self) -> PlaybackState {
        self.shared.state.lock().fusion.current()
    }

    /// Current state projected onto the remote-guard phase.
    pub fn phase(&self) -> PlaybackPhase {
        self.state().phase()
    }

    /// The item the controller is tracking, if any.
    pub fn current_item(&self) -> Option<PlayableItem> {
        self.shared.state.lock().current_item.clone()
    }

    /// Forward now-playing updates, transport status, and skip availability
    /// to an OS display surface until the controller shuts down.
    pub fn attach_surface(&self, surface: Arc<dyn NowPlayingSurface>) {
        let mut updates = self.shared.now_playing_tx.subscribe();
        let mut states = self.shared.state_tx.subscribe();
        let mut skip = self.shared.skip_enabled_tx.subscribe();
        let token = self.shutdown.clone();
        tokio::spawn(async move {
            loop {
                tokio::select! {
                    _ = token.cancelled() => break,
                    update = updates.recv() => match update {
                        Ok(NowPlayingUpdate::Display(display)) => surface.set_display(display),
                        Ok(NowPlayingUpdate::Clear) => surface.clear_display(),
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    },
                    state = states.recv() => match state {
                        Ok(state) => surface.set_playback_status(state.surface_status()),
                        Err(RecvError::Lagged(_)) => continue,
                        Err(RecvError::Closed) => break,
                    },
                    changed = skip.changed() => match changed {
                        Ok(()) => {
                            let enabled = *skip.borrow_and_update();
                            surface.set_skip_commands_enabled(enabled);
                        }
                        Err(_) => break,
                    },
                }
            }
        });
    }

    /// Stop the background tasks and any running sampler. Idempotent.
    pub fn shutdown(&self) {
        self.shutdown.cancel();
        self.shared.state.lock().cancel_sampler();
    }
}

impl Drop for PlayerController {
    fn drop(&mut self) {
        self.shutdown.cancel();
    }
}

impl std::fmt::Debug for PlayerController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("PlayerController")
            .field("state", &self.state())
            .field("config", &self.config)
            .finish_non_exhaustive()
    }
}
