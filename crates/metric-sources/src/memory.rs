// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! System memory monitoring via `/proc/meminfo`, plus DDR clock and
//! temperature nodes.

use crate::sysfs::read_sysfs_file;
use crate::{MemorySample, MetricFamily, MetricSource, MonitorError, SourcePaths, SysfsNode};
use metric_row::Reading;
use std::path::{Path, PathBuf};

/// Key fields of `/proc/meminfo`, in kB.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct MemInfo {
    pub(crate) total_kb: u64,
    pub(crate) available_kb: u64,
}

impl MemInfo {
    /// Memory actively used, in MB (`total - available`).
    pub(crate) fn used_mb(&self) -> f64 {
        self.total_kb.saturating_sub(self.available_kb) as f64 / 1024.0
    }

    /// Parses the content of a `/proc/meminfo`-formatted string.
    pub(crate) fn parse(content: &str, source_path: &Path) -> Result<Self, MonitorError> {
        let mut total_kb: Option<u64> = None;
        let mut available_kb: Option<u64> = None;

        for line in content.lines() {
            let parts: Vec<&str> = line.split_whitespace().collect();
            if parts.len() < 2 {
                continue;
            }
            match parts[0] {
                "MemTotal:" => total_kb = parse_kb_value(parts[1], source_path)?,
                "MemAvailable:" => available_kb = parse_kb_value(parts[1], source_path)?,
                _ => {}
            }

            if total_kb.is_some() && available_kb.is_some() {
                break;
            }
        }

        let total_kb = total_kb.ok_or_else(|| MonitorError::ParseError {
            path: source_path.display().to_string(),
            detail: "MemTotal not found".to_string(),
        })?;
        let available_kb = available_kb.ok_or_else(|| MonitorError::ParseError {
            path: source_path.display().to_string(),
            detail: "MemAvailable not found".to_string(),
        })?;

        Ok(Self {
            total_kb,
            available_kb,
        })
    }
}

/// Parses a numeric string from `/proc/meminfo` (values are in kB).
fn parse_kb_value(s: &str, source_path: &Path) -> Result<Option<u64>, MonitorError> {
    s.parse::<u64>()
        .map(Some)
        .map_err(|_| MonitorError::ParseError {
            path: source_path.display().to_string(),
            detail: format!("expected integer kB value, got '{s}'"),
        })
}

/// Reads the memory family.
#[derive(Debug, Clone)]
pub struct ProcMemorySource {
    meminfo: PathBuf,
    speed: SysfsNode,
    temp: SysfsNode,
}

impl ProcMemorySource {
    pub fn new(paths: &SourcePaths) -> Self {
        Self {
            meminfo: paths.meminfo.clone(),
            speed: paths.ram_speed.clone(),
            temp: paths.ram_temp.clone(),
        }
    }

    fn read_usage(&self) -> Result<f64, MonitorError> {
        let content = read_sysfs_file(&self.meminfo)?;
        MemInfo::parse(&content, &self.meminfo).map(|m| m.used_mb())
    }
}

impl MetricSource for ProcMemorySource {
    type Sample = MemorySample;

    fn family(&self) -> MetricFamily {
        MetricFamily::Memory
    }

    fn read(&self) -> Result<MemorySample, MonitorError> {
        Ok(MemorySample {
            usage_mb: Reading::from_result(self.read_usage()),
            speed_mhz: Reading::from_result(self.speed.read()),
            temp_c: Reading::from_result(self.temp.read()),
        })
    }
}
