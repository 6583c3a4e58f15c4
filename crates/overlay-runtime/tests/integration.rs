// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Integration tests: sampling through capture to exported files.
//!
//! These tests drive the complete flow from scripted metric sources →
//! sampler → capture controller → session manager → CSV exporter, and read
//! the written files back through the log index.

use capture_session::{
    read_rows, FlushOutcome, LogIndex, LoggingMode, SessionEvent, SessionKey,
};
use metric_row::{header_line, Reading, UNAVAILABLE};
use metric_sources::{
    CpuSample, ForegroundChange, FrameSample, GpuSample, MemorySample, MetricFamily,
    MetricSource, MonitorError, StaticForeground, ThermalSample,
};
use overlay_runtime::{LogPresenter, OverlayConfig, OverlayService, SourceSet};
use parking_lot::Mutex;
use std::path::Path;
use std::sync::Arc;

// ── Helpers ────────────────────────────────────────────────────

/// Frame source replaying a scripted fps sequence, then repeating the last.
struct ScriptedFps {
    script: Mutex<Vec<Option<f64>>>,
}

impl MetricSource for ScriptedFps {
    type Sample = FrameSample;

    fn family(&self) -> MetricFamily {
        MetricFamily::Frame
    }

    fn read(&self) -> Result<FrameSample, MonitorError> {
        let mut script = self.script.lock();
        let next = if script.len() > 1 {
            script.remove(0)
        } else {
            script.first().copied().flatten()
        };
        Ok(FrameSample { fps: next.into() })
    }
}

/// A family that is never readable.
struct Missing<S>(MetricFamily, std::marker::PhantomData<fn() -> S>);

impl<S: Default + Clone + Send + 'static> MetricSource for Missing<S> {
    type Sample = S;

    fn family(&self) -> MetricFamily {
        self.0
    }

    fn read(&self) -> Result<S, MonitorError> {
        Err(MonitorError::NotAvailable {
            path: format!("/sys/fake/{}", self.0),
        })
    }
}

fn missing<S: Default + Clone + Send + 'static>(family: MetricFamily) -> Arc<Missing<S>> {
    Arc::new(Missing(family, std::marker::PhantomData))
}

fn scripted_sources(fps: Vec<Option<f64>>) -> SourceSet {
    SourceSet {
        frame: Arc::new(ScriptedFps {
            script: Mutex::new(fps),
        }),
        cpu: missing::<CpuSample>(MetricFamily::Cpu),
        memory: missing::<MemorySample>(MetricFamily::Memory),
        gpu: missing::<GpuSample>(MetricFamily::Gpu),
        thermal: missing::<ThermalSample>(MetricFamily::Thermal),
    }
}

fn config(dir: &Path, mode: LoggingMode) -> OverlayConfig {
    OverlayConfig {
        logging_mode: mode,
        log_dir: dir.join("logs"),
        state_file: dir.join("state.toml"),
        ..Default::default()
    }
}

fn service(
    config: &OverlayConfig,
    fps: Vec<Option<f64>>,
    foreground: Arc<StaticForeground>,
) -> OverlayService {
    OverlayService::new(config, scripted_sources(fps), foreground, Arc::new(LogPresenter))
        .unwrap()
}

fn change(previous: Option<&str>, current: Option<&str>) -> ForegroundChange {
    ForegroundChange {
        previous: previous.map(str::to_string),
        current: current.map(str::to_string),
    }
}

// ── End-to-end ─────────────────────────────────────────────────

#[tokio::test]
async fn test_global_three_ticks_export_four_lines() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), LoggingMode::Global);
    let svc = service(
        &cfg,
        vec![Some(60.0), None, Some(30.0)],
        Arc::new(StaticForeground::new(Some("com.example.game".into()))),
    );

    svc.show();
    assert!(svc.capture().start_capture());
    for _ in 0..3 {
        svc.tick_once().await;
    }
    let ended = svc.capture().stop_capture();
    assert_eq!(ended.len(), 1);
    let FlushOutcome::Exported(path) = &ended[0].outcome else {
        panic!("expected export, got {:?}", ended[0].outcome);
    };

    let content = std::fs::read_to_string(path).unwrap();
    let lines: Vec<&str> = content.lines().collect();
    assert_eq!(lines.len(), 4);
    assert_eq!(lines[0], header_line());

    let frame_time = |line: &str| line.split(',').nth(3).unwrap().to_string();
    assert_eq!(frame_time(lines[1]), "16.67");
    assert_eq!(frame_time(lines[2]), UNAVAILABLE);
    assert_eq!(frame_time(lines[3]), "33.33");

    let rows = read_rows(path).unwrap();
    assert_eq!(rows[1].fps, Reading::Unavailable);
    assert_eq!(rows[2].fps, Reading::Value(30.0));
    assert!(rows.iter().all(|r| r.subject == "com.example.game"));

    let index = LogIndex::new(&cfg.log_dir);
    assert_eq!(index.global_logs().unwrap().len(), 1);
    assert!(path
        .file_name()
        .unwrap()
        .to_string_lossy()
        .starts_with("GameBar_log_"));
}

#[tokio::test]
async fn test_rows_round_trip_through_file() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), LoggingMode::Global);
    let svc = service(
        &cfg,
        vec![Some(59.6), Some(120.0)],
        Arc::new(StaticForeground::new(None)),
    );
    svc.show();
    svc.capture().start_capture();
    let sampled = vec![svc.tick_once().await, svc.tick_once().await];
    let ended = svc.capture().stop_capture();

    let FlushOutcome::Exported(path) = &ended[0].outcome else {
        panic!("export failed");
    };
    let reread = read_rows(path).unwrap();
    assert_eq!(reread, sampled);
    assert_eq!(reread[0].cpu_clocks_mhz, Reading::Unavailable);
}

// ── Per-app ────────────────────────────────────────────────────

#[tokio::test]
async fn test_per_app_foreground_teardown() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), LoggingMode::PerApp);
    let foreground = Arc::new(StaticForeground::new(Some("com.a".into())));
    let svc = service(&cfg, vec![Some(60.0)], Arc::clone(&foreground));
    svc.capture().set_app_logging_enabled("com.a", true);
    let mut events = svc.subscribe();

    svc.show();
    svc.apply_foreground(&change(None, Some("com.a")));
    assert!(svc.capture().start_capture());
    assert!(svc.capture().sessions().is_active(&SessionKey::app("com.a")));

    svc.tick_once().await;
    svc.tick_once().await;

    foreground.set(Some("com.b".into()));
    svc.apply_foreground(&change(Some("com.a"), Some("com.b")));
    svc.tick_once().await;

    assert_eq!(svc.capture().sessions().active_count(), 0);
    let index = LogIndex::new(&cfg.log_dir);
    let logs = index.logs_for(&SessionKey::app("com.a")).unwrap();
    assert_eq!(logs.len(), 1);
    assert_eq!(read_rows(&logs[0].path).unwrap().len(), 2);
    assert!(index.logs_for(&SessionKey::app("com.b")).unwrap().is_empty());

    let seen: Vec<SessionEvent> = std::iter::from_fn(|| events.try_recv().ok()).collect();
    assert!(seen
        .iter()
        .any(|e| matches!(e, SessionEvent::SessionEnded { key, rows: 2 } if *key == SessionKey::app("com.a"))));
}

#[tokio::test]
async fn test_per_app_stop_exports_every_session() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), LoggingMode::PerApp);
    let foreground = Arc::new(StaticForeground::new(Some("com.a".into())));
    let svc = service(&cfg, vec![Some(60.0)], Arc::clone(&foreground));
    svc.capture().set_app_logging_enabled("com.a", true);
    svc.capture().set_app_logging_enabled("com.b", true);

    svc.show();
    svc.capture().start_capture();
    svc.apply_foreground(&change(None, Some("com.a")));
    svc.tick_once().await;
    foreground.set(Some("com.b".into()));
    svc.apply_foreground(&change(Some("com.a"), Some("com.b")));
    svc.tick_once().await;

    let ended = svc.capture().stop_capture();
    assert_eq!(ended.len(), 1);
    assert_eq!(ended[0].key, SessionKey::app("com.b"));

    let grouped = LogIndex::new(&cfg.log_dir).all_per_app_logs().unwrap();
    assert_eq!(grouped.len(), 2);
}

#[tokio::test]
async fn test_enabled_apps_survive_restart() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), LoggingMode::PerApp);
    {
        let svc = service(&cfg, vec![Some(60.0)], Arc::new(StaticForeground::new(None)));
        svc.capture().set_app_logging_enabled("com.a", true);
    }
    let svc = service(
        &OverlayConfig {
            logging_mode: LoggingMode::Global,
            ..cfg.clone()
        },
        vec![Some(60.0)],
        Arc::new(StaticForeground::new(None)),
    );
    assert!(svc.capture().is_app_enabled("com.a"));
    assert_eq!(svc.capture().mode(), LoggingMode::PerApp);
}

// ── Bounds and failures ────────────────────────────────────────

#[tokio::test]
async fn test_row_ceiling_applies_to_capture() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = OverlayConfig {
        row_ceiling: 10,
        ..config(dir.path(), LoggingMode::Global)
    };
    let svc = service(&cfg, vec![Some(60.0)], Arc::new(StaticForeground::new(None)));
    svc.show();
    svc.capture().start_capture();
    for _ in 0..11 {
        svc.tick_once().await;
    }
    assert_eq!(
        svc.capture().sessions().row_count(&SessionKey::Global),
        Some(6)
    );
    let ended = svc.shutdown();
    assert_eq!(ended[0].rows, 6);
}

#[tokio::test]
async fn test_export_failure_does_not_stop_sampling() {
    let dir = tempfile::tempdir().unwrap();
    let blocker = dir.path().join("not-a-dir");
    std::fs::write(&blocker, "").unwrap();
    let cfg = OverlayConfig {
        log_dir: blocker.join("logs"),
        ..config(dir.path(), LoggingMode::Global)
    };
    let svc = service(&cfg, vec![Some(60.0)], Arc::new(StaticForeground::new(None)));
    svc.show();
    svc.capture().start_capture();
    svc.tick_once().await;

    let ended = svc.capture().stop_capture();
    assert!(matches!(ended[0].outcome, FlushOutcome::Failed(_)));

    let row = svc.tick_once().await;
    assert_eq!(row.fps, Reading::Value(60.0));
    assert!(svc.capture().start_capture());
}

#[tokio::test]
async fn test_hidden_overlay_refuses_capture() {
    let dir = tempfile::tempdir().unwrap();
    let cfg = config(dir.path(), LoggingMode::Global);
    let svc = service(&cfg, vec![Some(60.0)], Arc::new(StaticForeground::new(None)));
    let mut events = svc.subscribe();

    assert!(!svc.capture().start_capture());
    assert!(!svc.capture().is_capturing());
    assert!(matches!(
        events.try_recv().unwrap(),
        SessionEvent::SessionRefused { .. }
    ));
    svc.tick_once().await;
    assert!(LogIndex::new(&cfg.log_dir).all().unwrap().is_empty());
}
