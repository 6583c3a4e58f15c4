// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Subcommand implementations and shared setup.

pub mod apps;
pub mod logs;
pub mod mode;
pub mod run;
pub mod status;

use capture_session::{
    CaptureController, CsvExporter, LoggingMode, OverlayGate, PersistedState, SessionManager,
};
use overlay_runtime::OverlayConfig;
use std::path::Path;
use std::sync::Arc;
use tracing_subscriber::EnvFilter;

/// Logging mode as typed on the command line.
#[derive(Debug, Clone, Copy, clap::ValueEnum)]
pub enum ModeArg {
    Global,
    PerApp,
}

impl From<ModeArg> for LoggingMode {
    fn from(arg: ModeArg) -> Self {
        match arg {
            ModeArg::Global => LoggingMode::Global,
            ModeArg::PerApp => LoggingMode::PerApp,
        }
    }
}

/// Installs the fmt subscriber. `RUST_LOG` wins over `-v` when set.
pub fn init_tracing(verbose: u8) {
    let level = match verbose {
        0 => "warn",
        1 => "info",
        2 => "debug",
        _ => "trace",
    };
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(level));
    tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .with_writer(std::io::stderr)
        .init();
}

/// An explicit `--config` must load; without one the defaults apply.
pub fn load_config(path: Option<&Path>) -> anyhow::Result<OverlayConfig> {
    match path {
        Some(path) => Ok(OverlayConfig::from_file(path)?),
        None => Ok(OverlayConfig::default()),
    }
}

/// Opens the persisted capture state without sampling anything.
///
/// A fresh state file is seeded with the configured logging mode, the same
/// way the overlay service does it.
pub fn open_capture(config: &OverlayConfig) -> anyhow::Result<CaptureController> {
    let sessions = Arc::new(SessionManager::new(
        config.row_ceiling,
        OverlayGate::new(false),
        Arc::new(CsvExporter::new(config.log_dir.clone())),
    ));
    if config.state_file.exists() {
        return Ok(CaptureController::open(sessions, &config.state_file)?);
    }
    let seeded = PersistedState {
        logging_mode: config.logging_mode,
        ..Default::default()
    };
    Ok(CaptureController::new(sessions, seeded).with_store(&config.state_file))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn config(dir: &Path, mode: LoggingMode) -> OverlayConfig {
        OverlayConfig {
            logging_mode: mode,
            log_dir: dir.join("logs"),
            state_file: dir.join("state.toml"),
            ..Default::default()
        }
    }

    #[test]
    fn test_mode_arg_conversion() {
        assert_eq!(LoggingMode::from(ModeArg::Global), LoggingMode::Global);
        assert_eq!(LoggingMode::from(ModeArg::PerApp), LoggingMode::PerApp);
    }

    #[test]
    fn test_fresh_state_seeded_from_config() {
        let dir = tempfile::tempdir().unwrap();
        let capture = open_capture(&config(dir.path(), LoggingMode::PerApp)).unwrap();
        assert_eq!(capture.mode(), LoggingMode::PerApp);
        assert!(capture.enabled_apps().is_empty());
    }

    #[test]
    fn test_state_file_wins_over_config() {
        let dir = tempfile::tempdir().unwrap();
        {
            let capture = open_capture(&config(dir.path(), LoggingMode::Global)).unwrap();
            capture.set_app_logging_enabled("com.a", true);
            capture.set_logging_mode(LoggingMode::PerApp).unwrap();
        }
        let capture = open_capture(&config(dir.path(), LoggingMode::Global)).unwrap();
        assert_eq!(capture.mode(), LoggingMode::PerApp);
        assert!(capture.is_app_enabled("com.a"));
    }

    #[test]
    fn test_missing_explicit_config_is_an_error() {
        let dir = tempfile::tempdir().unwrap();
        assert!(load_config(Some(dir.path().join("absent.toml").as_path())).is_err());
        assert_eq!(load_config(None).unwrap(), OverlayConfig::default());
    }
}
