// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `gamebar status` command: one sample of every metric family.
//!
//! Families that cannot be read on this machine show `N/A`; the command
//! still succeeds.

use capture_session::LoggingMode;
use metric_row::MetricRow;
use overlay_runtime::{OverlayConfig, OverlayFormat, OverlayService, SamplerStats};
use std::collections::BTreeSet;

#[derive(serde::Serialize)]
struct Status {
    row: MetricRow,
    lines: Vec<String>,
    format: OverlayFormat,
    logging_mode: LoggingMode,
    enabled_apps: BTreeSet<String>,
    sampler: SamplerStats,
}

pub async fn execute(config: OverlayConfig, json: bool) -> anyhow::Result<()> {
    let service = OverlayService::from_config(&config)?;
    let row = service.tick_once().await;
    let formatter = service.formatter();

    let status = Status {
        lines: formatter.render(&row),
        row,
        format: formatter.format(),
        logging_mode: service.capture().mode(),
        enabled_apps: service.capture().enabled_apps(),
        sampler: service.stats(),
    };

    if json {
        println!("{}", serde_json::to_string_pretty(&status)?);
        return Ok(());
    }

    println!("╔══════════════════════════════════════════════════════╗");
    println!("║             gamebar · Telemetry Status               ║");
    println!("╚══════════════════════════════════════════════════════╝");
    println!();

    // ── Overlay ────────────────────────────────────────────────
    println!("  Overlay ({})", status.row.subject);
    for line in &status.lines {
        println!("   {line}");
    }
    println!();

    // ── Capture ────────────────────────────────────────────────
    println!("  Capture");
    println!("   Mode:         {}", status.logging_mode);
    if status.enabled_apps.is_empty() {
        println!("   Enabled apps: none");
    } else {
        let apps: Vec<&str> = status.enabled_apps.iter().map(String::as_str).collect();
        println!("   Enabled apps: {}", apps.join(", "));
    }
    println!("   Log dir:      {}", config.log_dir.display());
    println!();
    println!("{}", status.sampler.summary());

    Ok(())
}
