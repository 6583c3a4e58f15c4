// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! `gamebar apps` command: the set of auto-logged applications.

use super::open_capture;
use capture_session::LoggingMode;
use overlay_runtime::OverlayConfig;

pub fn list(config: OverlayConfig) -> anyhow::Result<()> {
    let capture = open_capture(&config)?;
    let apps = capture.enabled_apps();
    if apps.is_empty() {
        println!("No applications enabled for automatic logging.");
    } else {
        for app in &apps {
            println!("{app}");
        }
    }
    if capture.mode() != LoggingMode::PerApp {
        println!();
        println!("Note: logging mode is {}; enabled apps only log in per-app mode.", capture.mode());
    }
    Ok(())
}

pub fn set(config: OverlayConfig, app: &str, enabled: bool) -> anyhow::Result<()> {
    let app = app.trim();
    if app.is_empty() {
        anyhow::bail!("application identifier must not be empty");
    }
    let capture = open_capture(&config)?;
    let was = capture.is_app_enabled(app);
    capture.set_app_logging_enabled(app, enabled);

    let verb = if enabled { "enabled" } else { "disabled" };
    if was == enabled {
        println!("{app} already {verb}");
    } else {
        println!("{app} {verb}");
    }
    Ok(())
}
