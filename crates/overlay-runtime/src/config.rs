// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Overlay configuration loaded from TOML files or constructed programmatically.
//!
//! # TOML Format
//! ```toml
//! sample_interval_ms = 1000
//! row_ceiling = 5000
//! source_timeout_ms = 250
//! logging_mode = "per_app"
//! log_dir = "./gamebar-logs"
//! state_file = "./gamebar-state.toml"
//! overlay_format = "minimal"
//! foreground_file = "/run/gamebar/foreground"
//! foreground_poll_ms = 500
//!
//! [display]
//! fps = true
//! gpu_temp = true
//!
//! [log_columns]
//! ram_temp = false
//!
//! [sources.fps]
//! path = "/sys/class/drm/sde-crtc-0/measured_fps"
//! divisor = 1.0
//! ```
//!
//! Numeric settings are lenient: a non-positive or unparsable value falls
//! back to its default with a warning instead of rejecting the file.

use capture_session::{LoggingMode, DEFAULT_ROW_CEILING};
use metric_row::{Column, ColumnSet};
use metric_sources::SourcePaths;
use serde::{Deserialize, Deserializer};
use std::path::{Path, PathBuf};
use std::time::Duration;

pub const DEFAULT_SAMPLE_INTERVAL_MS: u64 = 1000;
pub const DEFAULT_SOURCE_TIMEOUT_MS: u64 = 250;
pub const DEFAULT_FOREGROUND_POLL_MS: u64 = 500;

/// How the overlay lays out its stat lines.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, serde::Serialize)]
#[serde(rename_all = "lowercase")]
pub enum OverlayFormat {
    /// One line per stat.
    #[default]
    Full,
    /// Every stat on a single line.
    Minimal,
}

impl OverlayFormat {
    fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().as_str() {
            "minimal" => OverlayFormat::Minimal,
            "full" => OverlayFormat::Full,
            other => {
                tracing::warn!("unknown overlay format '{other}', using full");
                OverlayFormat::Full
            }
        }
    }
}

impl<'de> Deserialize<'de> for OverlayFormat {
    fn deserialize<D: Deserializer<'de>>(d: D) -> Result<Self, D::Error> {
        let raw = String::deserialize(d)?;
        Ok(Self::parse_lenient(&raw))
    }
}

/// Which metric fields are shown on the overlay.
///
/// Every field is sampled regardless; these only affect rendering.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct DisplayToggles {
    pub fps: bool,
    pub frame_time: bool,
    pub battery_temp: bool,
    pub cpu_usage: bool,
    pub cpu_clock: bool,
    pub cpu_temp: bool,
    pub ram_usage: bool,
    pub ram_speed: bool,
    pub ram_temp: bool,
    pub gpu_usage: bool,
    pub gpu_clock: bool,
    pub gpu_temp: bool,
}

impl Default for DisplayToggles {
    fn default() -> Self {
        Self {
            fps: true,
            frame_time: false,
            battery_temp: false,
            cpu_usage: true,
            cpu_clock: false,
            cpu_temp: false,
            ram_usage: false,
            ram_speed: false,
            ram_temp: false,
            gpu_usage: true,
            gpu_clock: false,
            gpu_temp: false,
        }
    }
}

impl DisplayToggles {
    pub fn columns(&self) -> ColumnSet {
        metric_set([
            (Column::Fps, self.fps),
            (Column::FrameTime, self.frame_time),
            (Column::BatteryTemp, self.battery_temp),
            (Column::CpuUsage, self.cpu_usage),
            (Column::CpuClock, self.cpu_clock),
            (Column::CpuTemp, self.cpu_temp),
            (Column::RamUsage, self.ram_usage),
            (Column::RamSpeed, self.ram_speed),
            (Column::RamTemp, self.ram_temp),
            (Column::GpuUsage, self.gpu_usage),
            (Column::GpuClock, self.gpu_clock),
            (Column::GpuTemp, self.gpu_temp),
        ])
    }
}

/// Which metric columns are written to logs. Disabled columns are logged
/// as unavailable.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct LogColumns {
    pub fps: bool,
    pub frame_time: bool,
    pub battery_temp: bool,
    pub cpu_usage: bool,
    pub cpu_clock: bool,
    pub cpu_temp: bool,
    pub ram_usage: bool,
    pub ram_speed: bool,
    pub ram_temp: bool,
    pub gpu_usage: bool,
    pub gpu_clock: bool,
    pub gpu_temp: bool,
}

impl Default for LogColumns {
    fn default() -> Self {
        Self {
            fps: true,
            frame_time: true,
            battery_temp: true,
            cpu_usage: true,
            cpu_clock: true,
            cpu_temp: true,
            ram_usage: true,
            ram_speed: true,
            ram_temp: true,
            gpu_usage: true,
            gpu_clock: true,
            gpu_temp: true,
        }
    }
}

impl LogColumns {
    /// The kept columns, always including `DateTime` and `PackageName`.
    pub fn columns(&self) -> ColumnSet {
        metric_set([
            (Column::Fps, self.fps),
            (Column::FrameTime, self.frame_time),
            (Column::BatteryTemp, self.battery_temp),
            (Column::CpuUsage, self.cpu_usage),
            (Column::CpuClock, self.cpu_clock),
            (Column::CpuTemp, self.cpu_temp),
            (Column::RamUsage, self.ram_usage),
            (Column::RamSpeed, self.ram_speed),
            (Column::RamTemp, self.ram_temp),
            (Column::GpuUsage, self.gpu_usage),
            (Column::GpuClock, self.gpu_clock),
            (Column::GpuTemp, self.gpu_temp),
        ])
        .with(Column::DateTime)
        .with(Column::PackageName)
    }
}

fn metric_set(flags: [(Column, bool); 12]) -> ColumnSet {
    flags
        .into_iter()
        .filter(|(_, on)| *on)
        .map(|(column, _)| column)
        .collect()
}

/// Configuration for the overlay service.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct OverlayConfig {
    /// Sampling period in milliseconds.
    #[serde(deserialize_with = "lenient_interval")]
    pub sample_interval_ms: u64,
    /// Maximum data rows buffered per session before eviction.
    #[serde(deserialize_with = "lenient_ceiling")]
    pub row_ceiling: usize,
    /// Upper bound on a single source read; clamped to the interval.
    #[serde(deserialize_with = "lenient_timeout")]
    pub source_timeout_ms: u64,
    /// Initial logging mode, used until a state file records one.
    #[serde(deserialize_with = "lenient_mode")]
    pub logging_mode: LoggingMode,
    pub log_dir: PathBuf,
    pub state_file: PathBuf,
    pub overlay_format: OverlayFormat,
    /// One-line file holding the foreground application identifier.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub foreground_file: Option<PathBuf>,
    #[serde(deserialize_with = "lenient_poll")]
    pub foreground_poll_ms: u64,
    pub display: DisplayToggles,
    pub log_columns: LogColumns,
    pub sources: SourcePaths,
}

impl Default for OverlayConfig {
    fn default() -> Self {
        Self {
            sample_interval_ms: DEFAULT_SAMPLE_INTERVAL_MS,
            row_ceiling: DEFAULT_ROW_CEILING,
            source_timeout_ms: DEFAULT_SOURCE_TIMEOUT_MS,
            logging_mode: LoggingMode::Global,
            log_dir: PathBuf::from("./gamebar-logs"),
            state_file: PathBuf::from("./gamebar-state.toml"),
            overlay_format: OverlayFormat::Full,
            foreground_file: None,
            foreground_poll_ms: DEFAULT_FOREGROUND_POLL_MS,
            display: DisplayToggles::default(),
            log_columns: LogColumns::default(),
            sources: SourcePaths::default(),
        }
    }
}

impl OverlayConfig {
    /// Loads configuration from a TOML file.
    pub fn from_file(path: &Path) -> Result<Self, super::RuntimeError> {
        let content = std::fs::read_to_string(path).map_err(|e| {
            super::RuntimeError::ConfigError(format!(
                "cannot read config '{}': {e}",
                path.display()
            ))
        })?;
        Self::from_toml(&content)
    }

    /// Parses configuration from a TOML string.
    pub fn from_toml(toml_str: &str) -> Result<Self, super::RuntimeError> {
        toml::from_str(toml_str)
            .map_err(|e| super::RuntimeError::ConfigError(format!("TOML parse error: {e}")))
    }

    /// Serialises configuration to TOML.
    pub fn to_toml(&self) -> Result<String, super::RuntimeError> {
        toml::to_string_pretty(self)
            .map_err(|e| super::RuntimeError::ConfigError(format!("TOML serialise error: {e}")))
    }

    /// Loads `path` if given, falling back to defaults on any failure.
    pub fn load_or_default(path: Option<&Path>) -> Self {
        let Some(path) = path else {
            return Self::default();
        };
        match Self::from_file(path) {
            Ok(config) => {
                tracing::info!("configuration loaded from {}", path.display());
                config
            }
            Err(e) => {
                tracing::warn!("{e}; using default configuration");
                Self::default()
            }
        }
    }

    pub fn sample_interval(&self) -> Duration {
        Duration::from_millis(self.sample_interval_ms.max(1))
    }

    /// Per-read timeout, never longer than the sampling interval.
    pub fn source_timeout(&self) -> Duration {
        Duration::from_millis(self.source_timeout_ms.clamp(1, self.sample_interval_ms.max(1)))
    }

    pub fn foreground_poll(&self) -> Duration {
        Duration::from_millis(self.foreground_poll_ms.max(1))
    }
}

// ── Lenient field parsing ──────────────────────────────────────

/// Accepts integers, floats and numeric strings; anything else, or a
/// non-positive value, yields `fallback`.
fn positive_or(value: &toml::Value, field: &str, fallback: u64) -> u64 {
    let parsed = match value {
        toml::Value::Integer(i) => u64::try_from(*i).ok(),
        toml::Value::Float(f) if f.is_finite() && *f >= 1.0 => Some(f.trunc() as u64),
        toml::Value::String(s) => s.trim().parse::<u64>().ok(),
        _ => None,
    };
    match parsed.filter(|v| *v > 0) {
        Some(v) => v,
        None => {
            tracing::warn!("invalid {field} value {value}, using {fallback}");
            fallback
        }
    }
}

fn lenient_interval<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let value = toml::Value::deserialize(d)?;
    Ok(positive_or(&value, "sample_interval_ms", DEFAULT_SAMPLE_INTERVAL_MS))
}

fn lenient_timeout<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let value = toml::Value::deserialize(d)?;
    Ok(positive_or(&value, "source_timeout_ms", DEFAULT_SOURCE_TIMEOUT_MS))
}

fn lenient_poll<'de, D: Deserializer<'de>>(d: D) -> Result<u64, D::Error> {
    let value = toml::Value::deserialize(d)?;
    Ok(positive_or(&value, "foreground_poll_ms", DEFAULT_FOREGROUND_POLL_MS))
}

fn lenient_ceiling<'de, D: Deserializer<'de>>(d: D) -> Result<usize, D::Error> {
    let value = toml::Value::deserialize(d)?;
    let fallback = DEFAULT_ROW_CEILING as u64;
    Ok(usize::try_from(positive_or(&value, "row_ceiling", fallback)).unwrap_or(DEFAULT_ROW_CEILING))
}

fn lenient_mode<'de, D: Deserializer<'de>>(d: D) -> Result<LoggingMode, D::Error> {
    let value = toml::Value::deserialize(d)?;
    Ok(match value.as_str() {
        Some(raw) => LoggingMode::parse_lenient(raw),
        None => {
            tracing::warn!("invalid logging_mode value {value}, using global");
            LoggingMode::Global
        }
    })
}
