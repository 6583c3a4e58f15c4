// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! CPU usage, per-core clock and temperature.
//!
//! Reads CPU state from:
//! - `/proc/stat`: aggregate jiffy counters; usage is the busy share of
//!   the delta between two consecutive reads, so the first read after
//!   construction reports usage as unavailable.
//! - `/sys/devices/system/cpu/cpu*/cpufreq/scaling_cur_freq`: per-core
//!   clock in kHz.
//! - `/sys/devices/system/cpu/online`: online core ranges.
//! - a thermal zone node for the SoC temperature.

use crate::sysfs::read_sysfs_file;
use crate::{CpuSample, MetricFamily, MetricSource, MonitorError, SourcePaths, SysfsNode};
use metric_row::Reading;
use parking_lot::Mutex;
use std::path::{Path, PathBuf};

/// Aggregate CPU counters from the first line of `/proc/stat`.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub(crate) struct CpuTimes {
    pub(crate) total: u64,
    /// `idle + iowait`.
    pub(crate) idle: u64,
}

/// Reads the CPU family from sysfs and procfs.
pub struct SysfsCpuSource {
    cpu_base: PathBuf,
    proc_stat: PathBuf,
    temp: SysfsNode,
    previous: Mutex<Option<CpuTimes>>,
}

impl SysfsCpuSource {
    pub fn new(paths: &SourcePaths) -> Self {
        Self {
            cpu_base: paths.cpu_base.clone(),
            proc_stat: paths.proc_stat.clone(),
            temp: paths.cpu_temp.clone(),
            previous: Mutex::new(None),
        }
    }

    fn read_usage(&self) -> Result<Option<f64>, MonitorError> {
        let content = read_sysfs_file(&self.proc_stat)?;
        let now = parse_proc_stat(&content).ok_or_else(|| MonitorError::ParseError {
            path: self.proc_stat.display().to_string(),
            detail: "missing aggregate 'cpu' line".to_string(),
        })?;
        let previous = self.previous.lock().replace(now);
        Ok(previous.and_then(|prev| usage_between(prev, now)))
    }

    fn read_clocks(&self) -> Result<Vec<u32>, MonitorError> {
        let cores = online_cores(&self.cpu_base)?;
        let clocks: Vec<u32> = cores
            .iter()
            .filter_map(|core| {
                let path = self
                    .cpu_base
                    .join(format!("cpu{core}"))
                    .join("cpufreq/scaling_cur_freq");
                read_freq(&path).ok()
            })
            .collect();
        if clocks.is_empty() {
            return Err(MonitorError::NotAvailable {
                path: self.cpu_base.join("cpu*/cpufreq").display().to_string(),
            });
        }
        Ok(clocks)
    }
}

impl MetricSource for SysfsCpuSource {
    type Sample = CpuSample;

    fn family(&self) -> MetricFamily {
        MetricFamily::Cpu
    }

    fn read(&self) -> Result<CpuSample, MonitorError> {
        let usage_pct = match self.read_usage() {
            Ok(Some(pct)) => Reading::Value(pct),
            Ok(None) => Reading::Unavailable,
            Err(e) => {
                tracing::debug!("cpu usage unavailable: {e}");
                Reading::Unavailable
            }
        };
        Ok(CpuSample {
            usage_pct,
            clocks_mhz: Reading::from_result(self.read_clocks()),
            temp_c: Reading::from_result(self.temp.read()),
        })
    }
}

/// Parses the aggregate `cpu` line of `/proc/stat`.
///
/// Format: `cpu  user nice system idle iowait irq softirq steal guest guest_nice`.
pub(crate) fn parse_proc_stat(content: &str) -> Option<CpuTimes> {
    let line = content
        .lines()
        .find(|l| l.split_whitespace().next() == Some("cpu"))?;
    let values: Vec<u64> = line
        .split_whitespace()
        .skip(1)
        .map(|v| v.parse().ok())
        .collect::<Option<_>>()?;
    if values.len() < 4 {
        return None;
    }
    // guest and guest_nice are already folded into user and nice.
    let total: u64 = values.iter().take(8).sum();
    let idle = values[3] + values.get(4).copied().unwrap_or(0);
    Some(CpuTimes { total, idle })
}

/// Busy percentage between two counter snapshots.
pub(crate) fn usage_between(prev: CpuTimes, now: CpuTimes) -> Option<f64> {
    let total = now.total.checked_sub(prev.total)?;
    let idle = now.idle.checked_sub(prev.idle)?;
    if total == 0 {
        return None;
    }
    let busy = total.saturating_sub(idle) as f64;
    Some((busy / total as f64 * 100.0).clamp(0.0, 100.0))
}

/// Reads a CPU frequency value from sysfs (reported in kHz, returned as MHz).
fn read_freq(path: &Path) -> Result<u32, MonitorError> {
    let content = read_sysfs_file(path)?;
    let khz: u64 = content.parse::<u64>().map_err(|_| MonitorError::ParseError {
        path: path.display().to_string(),
        detail: format!("expected integer kHz value, got '{content}'"),
    })?;
    Ok((khz / 1000) as u32)
}

/// Lists the online core indices.
///
/// Tries `<base>/online` first (e.g., `"0-3"` → `[0, 1, 2, 3]`), then falls
/// back to listing `cpu[0-9]+` directories.
fn online_cores(base: &Path) -> Result<Vec<u32>, MonitorError> {
    if let Ok(content) = read_sysfs_file(&base.join("online")) {
        if let Some(cores) = parse_cpu_range(&content) {
            return Ok(cores);
        }
    }

    let entries = std::fs::read_dir(base).map_err(|e| MonitorError::ReadError {
        path: base.display().to_string(),
        source: e,
    })?;
    let mut cores: Vec<u32> = entries
        .filter_map(|e| e.ok())
        .filter_map(|e| {
            let name = e.file_name();
            let name = name.to_string_lossy();
            name.strip_prefix("cpu").and_then(|n| n.parse::<u32>().ok())
        })
        .collect();
    cores.sort_unstable();
    if cores.is_empty() {
        return Err(MonitorError::NotAvailable {
            path: base.display().to_string(),
        });
    }
    Ok(cores)
}

/// Parses a CPU range string like `"0-3"` → `[0,1,2,3]`, `"0,2-3"` → `[0,2,3]`.
fn parse_cpu_range(s: &str) -> Option<Vec<u32>> {
    let mut cores = Vec::new();
    for part in s.split(',') {
        let part = part.trim();
        if let Some((start_s, end_s)) = part.split_once('-') {
            let start: u32 = start_s.trim().parse().ok()?;
            let end: u32 = end_s.trim().parse().ok()?;
            if end < start {
                return None;
            }
            cores.extend(start..=end);
        } else {
            cores.push(part.parse().ok()?);
        }
    }
    if cores.is_empty() {
        None
    } else {
        Some(cores)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const STAT_A: &str = "cpu  100 0 100 700 100 0 0 0 0 0\ncpu0 50 0 50 350 50 0 0 0 0 0\n";
    const STAT_B: &str = "cpu  150 0 150 750 150 0 0 0 0 0\ncpu0 75 0 75 375 75 0 0 0 0 0\n";

    fn fake_tree(cores: &[(u32, u64)]) -> (tempfile::TempDir, SourcePaths) {
        let dir = tempfile::tempdir().unwrap();
        let paths = SourcePaths::default().rooted_at(dir.path());
        let last = cores.iter().map(|(c, _)| *c).max().unwrap_or(0);
        std::fs::create_dir_all(&paths.cpu_base).unwrap();
        std::fs::write(paths.cpu_base.join("online"), format!("0-{last}")).unwrap();
        for (core, khz) in cores {
            let freq_dir = paths.cpu_base.join(format!("cpu{core}/cpufreq"));
            std::fs::create_dir_all(&freq_dir).unwrap();
            std::fs::write(freq_dir.join("scaling_cur_freq"), khz.to_string()).unwrap();
        }
        std::fs::create_dir_all(paths.proc_stat.parent().unwrap()).unwrap();
        std::fs::write(&paths.proc_stat, STAT_A).unwrap();
        (dir, paths)
    }

    #[test]
    fn test_parse_cpu_range_simple() {
        assert_eq!(parse_cpu_range("0-3"), Some(vec![0, 1, 2, 3]));
        assert_eq!(parse_cpu_range("0"), Some(vec![0]));
    }

    #[test]
    fn test_parse_cpu_range_complex() {
        assert_eq!(parse_cpu_range("0,2-3"), Some(vec![0, 2, 3]));
        assert_eq!(parse_cpu_range("0-1,3-5").map(|v| v.len()), Some(5));
    }

    #[test]
    fn test_parse_cpu_range_invalid() {
        assert_eq!(parse_cpu_range(""), None);
        assert_eq!(parse_cpu_range("abc"), None);
        assert_eq!(parse_cpu_range("3-1"), None);
    }

    #[test]
    fn test_parse_proc_stat() {
        let times = parse_proc_stat(STAT_A).unwrap();
        assert_eq!(times.total, 1000);
        assert_eq!(times.idle, 800);
        assert!(parse_proc_stat("intr 1 2 3").is_none());
    }

    #[test]
    fn test_usage_between() {
        let a = parse_proc_stat(STAT_A).unwrap();
        let b = parse_proc_stat(STAT_B).unwrap();
        // 200 jiffies elapsed, 100 of them idle.
        assert_eq!(usage_between(a, b), Some(50.0));
        assert_eq!(usage_between(a, a), None);
        assert_eq!(usage_between(b, a), None);
    }

    #[test]
    fn test_first_read_has_no_usage() {
        let (_dir, paths) = fake_tree(&[(0, 1_804_800), (1, 2_419_200)]);
        let src = SysfsCpuSource::new(&paths);

        let first = src.read().unwrap();
        assert_eq!(first.usage_pct, Reading::Unavailable);
        assert_eq!(first.clocks_mhz, Reading::Value(vec![1804, 2419]));

        std::fs::write(&paths.proc_stat, STAT_B).unwrap();
        let second = src.read().unwrap();
        assert_eq!(second.usage_pct, Reading::Value(50.0));
    }

    #[test]
    fn test_missing_temperature_is_unavailable() {
        let (_dir, paths) = fake_tree(&[(0, 1_000_000)]);
        let sample = SysfsCpuSource::new(&paths).read().unwrap();
        assert_eq!(sample.temp_c, Reading::Unavailable);
    }

    #[test]
    fn test_offline_core_skipped() {
        let (_dir, paths) = fake_tree(&[(0, 1_000_000), (2, 2_000_000)]);
        // online says 0-2 but cpu1 has no cpufreq node.
        let sample = SysfsCpuSource::new(&paths).read().unwrap();
        assert_eq!(sample.clocks_mhz, Reading::Value(vec![1000, 2000]));
    }
}
