// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The overlay service: tick loop, foreground monitor and shutdown.
//!
//! ```text
//!             ┌──────────── interval tick ───────────┐
//!             ▼                                      │
//!   Sampler::tick ──► row ──┬─► Presenter (if visible)
//!                           └─► CaptureController::record
//!
//!   foreground monitor task ──mpsc──► CaptureController::on_foreground_changed
//!
//!   shutdown() ──watch──► loop exits; every active session is flushed
//! ```
//!
//! The service is explicitly constructed and passed by handle; there is
//! no process-wide instance.

use crate::{OverlayConfig, OverlayFormatter, RuntimeError, Sampler, SamplerStats, SourceSet};
use capture_session::{
    CaptureController, CsvExporter, EndedSession, OverlayGate, PersistedState, SessionEvent,
    SessionManager,
};
use metric_row::MetricRow;
use metric_sources::{
    FileForeground, ForegroundChange, ForegroundDetector, ForegroundTracker, StaticForeground,
};
use parking_lot::{Mutex, RwLock};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::{broadcast, mpsc, watch};
use tokio::time::MissedTickBehavior;

/// Foreground transitions buffered between the monitor task and the loop.
const FOREGROUND_CHANNEL_CAPACITY: usize = 16;

/// Receives rendered overlay lines.
pub trait Presenter: Send + Sync {
    fn present(&self, lines: &[String]);
}

impl<F> Presenter for F
where
    F: Fn(&[String]) + Send + Sync,
{
    fn present(&self, lines: &[String]) {
        self(lines)
    }
}

/// Emits rendered lines as `debug` log records.
#[derive(Debug, Default, Clone, Copy)]
pub struct LogPresenter;

impl Presenter for LogPresenter {
    fn present(&self, lines: &[String]) {
        tracing::debug!(target: "overlay", "{}", lines.join(" | "));
    }
}

/// Drives sampling, presentation and capture for one overlay.
pub struct OverlayService {
    interval: Duration,
    foreground_poll: Duration,
    sampler: Sampler,
    formatter: Mutex<OverlayFormatter>,
    capture: Arc<CaptureController>,
    gate: OverlayGate,
    detector: Arc<dyn ForegroundDetector>,
    presenter: Arc<dyn Presenter>,
    latest: RwLock<Option<MetricRow>>,
    shutdown: watch::Sender<bool>,
    running: AtomicBool,
}

impl OverlayService {
    /// Builds the service with explicit sources, detector and presenter.
    ///
    /// Capture state is loaded from `config.state_file`; when that file
    /// does not exist yet, `config.logging_mode` seeds the mode.
    pub fn new(
        config: &OverlayConfig,
        sources: SourceSet,
        detector: Arc<dyn ForegroundDetector>,
        presenter: Arc<dyn Presenter>,
    ) -> Result<Self, RuntimeError> {
        let gate = OverlayGate::new(false);
        let exporter = Arc::new(CsvExporter::new(config.log_dir.clone()));
        let sessions = Arc::new(SessionManager::new(config.row_ceiling, gate.clone(), exporter));

        let capture = if config.state_file.exists() {
            CaptureController::open(sessions, &config.state_file)?
        } else {
            let seeded = PersistedState {
                logging_mode: config.logging_mode,
                ..Default::default()
            };
            CaptureController::new(sessions, seeded).with_store(&config.state_file)
        };
        let capture = capture.with_columns(config.log_columns.columns());

        let (shutdown, _) = watch::channel(false);
        tracing::info!(
            "overlay service created: interval {:?}, ceiling {}, mode {}",
            config.sample_interval(),
            config.row_ceiling,
            capture.mode()
        );

        Ok(Self {
            interval: config.sample_interval(),
            foreground_poll: config.foreground_poll(),
            sampler: Sampler::new(sources, Arc::clone(&detector), config.source_timeout()),
            formatter: Mutex::new(OverlayFormatter::new(
                config.display.columns(),
                config.overlay_format,
            )),
            capture: Arc::new(capture),
            gate,
            detector,
            presenter,
            latest: RwLock::new(None),
            shutdown,
            running: AtomicBool::new(false),
        })
    }

    /// Builds the service from configuration alone: sysfs sources, the
    /// file-backed detector if configured, and the log presenter.
    pub fn from_config(config: &OverlayConfig) -> Result<Self, RuntimeError> {
        let detector: Arc<dyn ForegroundDetector> = match &config.foreground_file {
            Some(path) => Arc::new(FileForeground::new(path.clone())),
            None => Arc::new(StaticForeground::new(None)),
        };
        Self::new(
            config,
            SourceSet::sysfs(&config.sources),
            detector,
            Arc::new(LogPresenter),
        )
    }

    pub fn capture(&self) -> &Arc<CaptureController> {
        &self.capture
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.capture.subscribe()
    }

    /// Shows the overlay; sessions may begin from now on.
    pub fn show(&self) {
        self.gate.set_visible(true);
        tracing::info!("overlay shown");
    }

    /// Hides the overlay. Running sessions continue; new ones are refused.
    pub fn hide(&self) {
        self.gate.set_visible(false);
        tracing::info!("overlay hidden");
    }

    pub fn is_visible(&self) -> bool {
        self.gate.is_visible()
    }

    pub fn toggle_format(&self) {
        self.formatter.lock().toggle_format();
    }

    pub fn formatter(&self) -> OverlayFormatter {
        *self.formatter.lock()
    }

    pub fn latest_row(&self) -> Option<MetricRow> {
        self.latest.read().clone()
    }

    pub fn stats(&self) -> SamplerStats {
        self.sampler.stats()
    }

    pub fn is_running(&self) -> bool {
        self.running.load(Ordering::SeqCst)
    }

    /// One tick: sample, then present and hand the row to capture.
    ///
    /// A hidden overlay neither presents nor records; the sampled row is
    /// still returned and kept as the latest.
    pub async fn tick_once(&self) -> MetricRow {
        let row = self.sampler.tick().await;
        if self.gate.is_visible() {
            let lines = self.formatter.lock().render(&row);
            self.presenter.present(&lines);
            self.capture.record(&row);
        }
        *self.latest.write() = Some(row.clone());
        row
    }

    /// Applies a foreground transition to capture.
    pub fn apply_foreground(&self, change: &ForegroundChange) {
        tracing::debug!(
            "foreground {:?} -> {:?}",
            change.previous.as_deref(),
            change.current.as_deref()
        );
        self.capture
            .on_foreground_changed(change.previous.as_deref(), change.current.as_deref());
    }

    async fn apply_foreground_blocking(&self, change: ForegroundChange) {
        let capture = Arc::clone(&self.capture);
        let applied = tokio::task::spawn_blocking(move || {
            tracing::debug!(
                "foreground {:?} -> {:?}",
                change.previous.as_deref(),
                change.current.as_deref()
            );
            capture.on_foreground_changed(change.previous.as_deref(), change.current.as_deref());
        })
        .await;
        if let Err(e) = applied {
            tracing::error!("foreground transition failed: {e}");
        }
    }

    /// Runs the tick loop until [`OverlayService::shutdown`] is called.
    ///
    /// Missed ticks are skipped rather than bursted. No sampling happens
    /// while the overlay is hidden. Foreground transitions, which may
    /// export a finished session, run on the blocking pool.
    pub async fn run(&self) -> Result<(), RuntimeError> {
        if self.running.swap(true, Ordering::SeqCst) {
            return Err(RuntimeError::AlreadyRunning);
        }
        let mut stop = self.shutdown.subscribe();
        if *stop.borrow() {
            self.running.store(false, Ordering::SeqCst);
            return Ok(());
        }

        let (tx, mut changes) = mpsc::channel(FOREGROUND_CHANNEL_CAPACITY);
        let monitor = tokio::spawn(monitor_foreground(
            Arc::clone(&self.detector),
            self.foreground_poll,
            tx,
            self.shutdown.subscribe(),
        ));

        let mut ticker = tokio::time::interval(self.interval);
        ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
        tracing::info!("overlay loop started");

        loop {
            tokio::select! {
                biased;
                _ = stop.changed() => break,
                Some(change) = changes.recv() => self.apply_foreground_blocking(change).await,
                _ = ticker.tick() => {
                    if self.gate.is_visible() {
                        self.tick_once().await;
                    }
                }
            }
            if *stop.borrow() {
                break;
            }
        }

        monitor.abort();
        self.running.store(false, Ordering::SeqCst);
        tracing::info!("overlay loop stopped after {} ticks", self.sampler.stats().ticks);
        Ok(())
    }

    /// Stops the loop and flushes every active session.
    pub fn shutdown(&self) -> Vec<EndedSession> {
        self.shutdown.send_replace(true);
        let ended = self.capture.shutdown();
        tracing::info!("overlay service shut down: {}", self.sampler.stats().summary());
        ended
    }
}

impl std::fmt::Debug for OverlayService {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("OverlayService")
            .field("interval", &self.interval)
            .field("visible", &self.is_visible())
            .field("running", &self.is_running())
            .field("capture", &self.capture)
            .finish()
    }
}

/// Polls `detector` and forwards deduplicated transitions until shutdown
/// or until the receiver goes away.
async fn monitor_foreground(
    detector: Arc<dyn ForegroundDetector>,
    poll: Duration,
    tx: mpsc::Sender<ForegroundChange>,
    mut stop: watch::Receiver<bool>,
) {
    let mut tracker = ForegroundTracker::new();
    let mut ticker = tokio::time::interval(poll);
    ticker.set_missed_tick_behavior(MissedTickBehavior::Skip);
    loop {
        tokio::select! {
            _ = stop.changed() => return,
            _ = ticker.tick() => {}
        }
        let probe = Arc::clone(&detector);
        let reading = match tokio::task::spawn_blocking(move || probe.foreground()).await {
            Ok(reading) => reading,
            Err(e) => {
                tracing::warn!("foreground probe failed: {e}");
                continue;
            }
        };
        if let Some(change) = tracker.observe(reading) {
            if tx.send(change).await.is_err() {
                return;
            }
        }
    }
}
