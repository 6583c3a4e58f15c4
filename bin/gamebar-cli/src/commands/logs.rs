// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `gamebar logs` command: list exported capture files, newest first.

use capture_session::{read_rows, LogFile, LogIndex, SessionKey};
use chrono::{DateTime, Local};
use overlay_runtime::OverlayConfig;

pub fn execute(
    config: OverlayConfig,
    app: Option<String>,
    global: bool,
    rows: bool,
) -> anyhow::Result<()> {
    let index = LogIndex::new(&config.log_dir);
    let files = match (&app, global) {
        (Some(app), _) => index.logs_for(&SessionKey::app(app.as_str()))?,
        (None, true) => index.global_logs()?,
        (None, false) => index.all()?,
    };

    if files.is_empty() {
        println!("No logs in {}", index.dir().display());
        return Ok(());
    }

    println!("  {} log(s) in {}", files.len(), index.dir().display());
    println!();
    for file in &files {
        print_entry(file, rows);
    }
    Ok(())
}

fn print_entry(file: &LogFile, rows: bool) {
    let modified: DateTime<Local> = file.modified.into();
    let subject = file.subject.as_deref().unwrap_or("<global>");
    let mut line = format!(
        "   {}  {:>8} B  {:<28} {}",
        modified.format("%Y-%m-%d %H:%M:%S"),
        file.size_bytes,
        subject,
        file.file_name()
    );
    if rows {
        match read_rows(&file.path) {
            Ok(parsed) => line.push_str(&format!("  ({} rows)", parsed.len())),
            Err(e) => {
                tracing::warn!("cannot read {}: {e}", file.path.display());
                line.push_str("  (unreadable)");
            }
        }
    }
    println!("{line}");
}
