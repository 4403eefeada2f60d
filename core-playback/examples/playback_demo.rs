//! # Playback Controller Usage Example
//!
//! Drives a [`PlayerController`] with a simulated media engine and audio
//! session: loads a stream, walks it through buffering to playing, interrupts
//! it, resumes, and stops, printing every observed stream along the way.
//!
//! Run with: `cargo run --example playback_demo --package core-playback`

use async_trait::async_trait;
use bridge_traits::engine::{EngineSignal, ItemId, ItemStatus, MediaEngine, TransportStatus};
use bridge_traits::now_playing::NowPlayingInfo;
use bridge_traits::session::{AudioSession, SessionEvent};
use bridge_traits::Result as BridgeResult;
use core_playback::{NowPlayingUpdate, PlayerConfig, PlayerController};
use core_runtime::logging::{init_logging, LogLevel, LoggingConfig};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast;

// ============================================================================
// Simulated Media Engine
// ============================================================================

/// An engine that pretends to play whatever it is given: the playhead
/// advances on a timer whenever the rate is nonzero.
struct SimulatedEngine {
    signals: broadcast::Sender<EngineSignal>,
    playhead: Arc<Mutex<f64>>,
    rate: Arc<Mutex<f64>>,
}

impl SimulatedEngine {
    fn new() -> Arc<Self> {
        let (signals, _) = broadcast::channel(64);
        let playhead = Arc::new(Mutex::new(0.0));
        let rate = Arc::new(Mutex::new(0.0));

        // Advance the playhead 10x real time so the demo stays short.
        let tick_playhead = playhead.clone();
        let tick_rate = rate.clone();
        tokio::spawn(async move {
            let mut ticker = tokio::time::interval(Duration::from_millis(100));
            loop {
                ticker.tick().await;
                let rate = *tick_rate.lock();
                if rate != 0.0 {
                    *tick_playhead.lock() += rate;
                }
            }
        });

        Arc::new(Self {
            signals,
            playhead,
            rate,
        })
    }

    fn send(&self, signal: EngineSignal) {
        let _ = self.signals.send(signal);
    }

    fn set_rate(&self, rate: f64) {
        *self.rate.lock() = rate;
        self.send(EngineSignal::Rate(rate as f32));
    }
}

#[async_trait]
impl MediaEngine for SimulatedEngine {
    async fn load_item(&self, url: &str, start_position: Option<f64>) -> BridgeResult<ItemId> {
        println!("[engine] loading {url}");
        let id = ItemId::new();
        *self.playhead.lock() = start_position.unwrap_or(0.0);
        self.send(EngineSignal::CurrentItem(Some(id)));
        self.send(EngineSignal::Duration(Some(1800.0)));
        Ok(id)
    }

    async fn play(&self) -> BridgeResult<()> {
        println!("[engine] play");
        // Buffer up briefly, then report healthy playback.
        self.send(EngineSignal::Transport(TransportStatus::WaitingAtRate));
        self.send(EngineSignal::Item(ItemStatus::ReadyToPlay));
        self.send(EngineSignal::LikelyToKeepUp(true));
        self.send(EngineSignal::BufferFull(true));
        self.send(EngineSignal::Transport(TransportStatus::Playing));
        self.set_rate(1.0);
        Ok(())
    }

    async fn pause(&self) -> BridgeResult<()> {
        println!("[engine] pause");
        self.set_rate(0.0);
        self.send(EngineSignal::Transport(TransportStatus::Paused));
        Ok(())
    }

    async fn seek(&self, position: f64) -> BridgeResult<()> {
        println!("[engine] seek to {position:.1}s");
        *self.playhead.lock() = position;
        Ok(())
    }

    async fn clear_item(&self) -> BridgeResult<()> {
        println!("[engine] clear item");
        self.set_rate(0.0);
        self.send(EngineSignal::CurrentItem(None));
        Ok(())
    }

    fn position(&self) -> Option<f64> {
        Some(*self.playhead.lock())
    }

    fn measured_duration(&self) -> Option<f64> {
        Some(1800.0)
    }

    fn subscribe(&self) -> broadcast::Receiver<EngineSignal> {
        self.signals.subscribe()
    }
}

// ============================================================================
// Simulated Audio Session
// ============================================================================

struct SimulatedSession {
    events: broadcast::Sender<SessionEvent>,
}

impl SimulatedSession {
    fn new() -> Arc<Self> {
        let (events, _) = broadcast::channel(16);
        Arc::new(Self { events })
    }

    fn send(&self, event: SessionEvent) {
        let _ = self.events.send(event);
    }
}

#[async_trait]
impl AudioSession for SimulatedSession {
    async fn activate(&self) -> BridgeResult<()> {
        println!("[session] activated");
        Ok(())
    }

    fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }
}

// ============================================================================
// Demo
// ============================================================================

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    init_logging(LoggingConfig::default().with_level(LogLevel::Info))?;

    let engine = SimulatedEngine::new();
    let session = SimulatedSession::new();
    let config = PlayerConfig {
        progress_interval: Duration::from_millis(300),
        significant_change_threshold: 2.0,
        ..Default::default()
    };
    let controller = PlayerController::new(engine.clone(), session.clone(), config)?;

    // Print every observed stream.
    let mut states = controller.subscribe_state();
    tokio::spawn(async move {
        while let Ok(state) = states.recv().await {
            println!("[state] {state}");
        }
    });
    let mut progress = controller.subscribe_progress();
    tokio::spawn(async move {
        while let Ok(sample) = progress.recv().await {
            println!("[progress] {:.1}s / {:?}", sample.elapsed, sample.duration);
        }
    });
    let mut now_playing = controller.subscribe_now_playing();
    tokio::spawn(async move {
        while let Ok(update) = now_playing.recv().await {
            match update {
                NowPlayingUpdate::Display(display) => println!(
                    "[now playing] {} - {:.1}s elapsed",
                    display.title, display.elapsed
                ),
                NowPlayingUpdate::Clear => println!("[now playing] cleared"),
            }
        }
    });

    println!("=== loading and playing ===");
    let item = controller
        .load_and_play(
            "https://streams.example.com/morning-show",
            Some(
                NowPlayingInfo::new("Morning Show")
                    .with_artist("Station One")
                    .with_duration(1800.0),
            ),
            None,
        )
        .await?;
    println!("loaded item {item}");
    tokio::time::sleep(Duration::from_secs(2)).await;

    println!("=== interruption (incoming call) ===");
    session.send(SessionEvent::InterruptionBegan);
    tokio::time::sleep(Duration::from_secs(1)).await;

    println!("=== interruption over, resuming ===");
    session.send(SessionEvent::InterruptionEnded {
        should_resume: true,
    });
    tokio::time::sleep(Duration::from_secs(2)).await;

    println!("=== skipping forward ===");
    controller.remote_skip_forward(None).await;
    tokio::time::sleep(Duration::from_secs(1)).await;

    println!("=== stopping ===");
    controller.stop().await?;
    tokio::time::sleep(Duration::from_millis(300)).await;

    controller.shutdown();
    println!("done");
    Ok(())
}
