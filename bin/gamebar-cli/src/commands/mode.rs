// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `gamebar mode` command: show or persist the logging mode.

use super::{open_capture, ModeArg};
use capture_session::LoggingMode;
use overlay_runtime::OverlayConfig;

pub fn execute(config: OverlayConfig, mode: Option<ModeArg>) -> anyhow::Result<()> {
    let capture = open_capture(&config)?;
    let Some(mode) = mode else {
        println!("{}", capture.mode());
        return Ok(());
    };

    let mode = LoggingMode::from(mode);
    let previous = capture.mode();
    capture.set_logging_mode(mode)?;
    if previous == mode {
        println!("Logging mode already {mode}");
    } else {
        println!("Logging mode: {previous} -> {mode}");
    }
    println!("State file: {}", config.state_file.display());
    Ok(())
}
