// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `gamebar run` command: the overlay loop on a terminal.
//!
//! ```text
//! show → [set mode] → [start capture] → run loop ── Ctrl-C / --duration ──→ shutdown → exports
//! ```

use super::ModeArg;
use capture_session::{FlushOutcome, LoggingMode, SessionEvent};
use metric_sources::{FileForeground, ForegroundDetector, StaticForeground};
use overlay_runtime::{OverlayConfig, OverlayFormat, OverlayService, SourceSet};
use std::sync::Arc;
use std::time::Duration;
use tokio::sync::broadcast::error::RecvError;

pub async fn execute(
    mut config: OverlayConfig,
    capture: bool,
    mode: Option<ModeArg>,
    duration: Option<u64>,
    minimal: bool,
) -> anyhow::Result<()> {
    if minimal {
        config.overlay_format = OverlayFormat::Minimal;
    }

    let detector: Arc<dyn ForegroundDetector> = match &config.foreground_file {
        Some(path) => Arc::new(FileForeground::new(path.clone())),
        None => Arc::new(StaticForeground::new(None)),
    };
    let presenter = |lines: &[String]| {
        println!("── {} ──", chrono::Local::now().format("%H:%M:%S"));
        for line in lines {
            println!("  {line}");
        }
    };
    let service = Arc::new(OverlayService::new(
        &config,
        SourceSet::sysfs(&config.sources),
        detector,
        Arc::new(presenter),
    )?);

    let events = tokio::spawn(print_events(service.subscribe()));

    service.show();
    if let Some(mode) = mode {
        service.capture().set_logging_mode(LoggingMode::from(mode))?;
    }
    if capture && !service.capture().start_capture() {
        anyhow::bail!("capture could not be started");
    }

    println!(
        "  Sampling every {} ms, mode {}, capture {}",
        config.sample_interval().as_millis(),
        service.capture().mode(),
        if service.capture().is_capturing() { "on" } else { "off" },
    );
    println!();

    let looping = {
        let service = Arc::clone(&service);
        tokio::spawn(async move { service.run().await })
    };

    match duration {
        Some(secs) => {
            tokio::select! {
                _ = tokio::time::sleep(Duration::from_secs(secs)) => {}
                res = tokio::signal::ctrl_c() => res?,
            }
        }
        None => tokio::signal::ctrl_c().await?,
    }

    // Flushing writes every remaining session to disk.
    let ended = {
        let service = Arc::clone(&service);
        tokio::task::spawn_blocking(move || service.shutdown()).await?
    };
    looping.await??;
    events.abort();

    println!();
    println!("  {}", service.stats().summary());
    if ended.is_empty() {
        println!("  No sessions were active.");
    }
    for session in &ended {
        match &session.outcome {
            FlushOutcome::Exported(path) => {
                println!("  {} → {} ({} rows)", session.key, path.display(), session.rows)
            }
            FlushOutcome::Empty => println!("  {} had no rows", session.key),
            FlushOutcome::Failed(err) => println!("  {} export failed: {err}", session.key),
        }
    }
    Ok(())
}

async fn print_events(mut rx: tokio::sync::broadcast::Receiver<SessionEvent>) {
    loop {
        match rx.recv().await {
            Ok(event) => {
                if let Some(text) = describe(&event) {
                    println!("  * {text}");
                }
            }
            Err(RecvError::Lagged(n)) => tracing::warn!("skipped {n} session events"),
            Err(RecvError::Closed) => break,
        }
    }
}

fn describe(event: &SessionEvent) -> Option<String> {
    use capture_session::Notice;
    let text = match event {
        SessionEvent::CaptureStarted { mode } => format!("capture started ({mode})"),
        SessionEvent::CaptureStopped { mode } => format!("capture stopped ({mode})"),
        SessionEvent::SessionStarted { key, origin } => {
            format!("session started for {key} ({origin:?})")
        }
        SessionEvent::SessionRefused { key, reason } => {
            format!("session for {key} refused: {reason:?}")
        }
        SessionEvent::ExportFailed { key, error } => format!("export for {key} failed: {error}"),
        SessionEvent::Notice(Notice::AutoLoggingActive { key }) => {
            format!("{key} already logs automatically")
        }
        SessionEvent::Notice(Notice::NoForeground) => "no foreground application".to_string(),
        // Reported in the shutdown summary.
        SessionEvent::SessionEnded { .. } | SessionEvent::Exported { .. } => return None,
    };
    Some(text)
}
