// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Sampling loop health counters.
//!
//! [`SamplerStats`] counts ticks and per-family read outcomes so a slow or
//! broken source shows up without reading the logs.

use metric_sources::MetricFamily;
use std::collections::BTreeMap;
use std::time::Duration;

/// How one bounded source read ended.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReadOutcome {
    Ok,
    Failed,
    TimedOut,
}

/// Failure counters for one metric family.
#[derive(Debug, Clone, Default, PartialEq, Eq, serde::Serialize)]
pub struct FamilyStats {
    pub failures: u64,
    pub timeouts: u64,
}

/// Aggregate counters for a sampler's lifetime.
#[derive(Debug, Clone, Default, serde::Serialize)]
pub struct SamplerStats {
    /// Ticks completed.
    pub ticks: u64,
    /// Duration of the most recent tick.
    pub last_tick: Duration,
    /// Longest tick seen.
    pub max_tick: Duration,
    /// Sum of all tick durations.
    pub total_tick: Duration,
    /// Read failures and timeouts keyed by family name.
    pub families: BTreeMap<&'static str, FamilyStats>,
}

impl SamplerStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn record_tick(&mut self, elapsed: Duration) {
        self.ticks += 1;
        self.last_tick = elapsed;
        self.total_tick += elapsed;
        if elapsed > self.max_tick {
            self.max_tick = elapsed;
        }
    }

    pub fn record_read(&mut self, family: MetricFamily, outcome: ReadOutcome) {
        match outcome {
            ReadOutcome::Ok => {}
            ReadOutcome::Failed => self.families.entry(family.name()).or_default().failures += 1,
            ReadOutcome::TimedOut => self.families.entry(family.name()).or_default().timeouts += 1,
        }
    }

    pub fn mean_tick(&self) -> Duration {
        if self.ticks == 0 {
            return Duration::ZERO;
        }
        self.total_tick / self.ticks as u32
    }

    pub fn total_timeouts(&self) -> u64 {
        self.families.values().map(|f| f.timeouts).sum()
    }

    pub fn total_failures(&self) -> u64 {
        self.families.values().map(|f| f.failures).sum()
    }

    /// Human-readable summary suitable for CLI output.
    pub fn summary(&self) -> String {
        format!(
            "Sampler: {} ticks, mean {:.2}ms, max {:.2}ms, {} read failures, {} timeouts",
            self.ticks,
            self.mean_tick().as_secs_f64() * 1000.0,
            self.max_tick.as_secs_f64() * 1000.0,
            self.total_failures(),
            self.total_timeouts(),
        )
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_empty_stats() {
        let s = SamplerStats::new();
        assert_eq!(s.mean_tick(), Duration::ZERO);
        assert_eq!(s.total_timeouts(), 0);
    }

    #[test]
    fn test_record_ticks() {
        let mut s = SamplerStats::new();
        s.record_tick(Duration::from_millis(4));
        s.record_tick(Duration::from_millis(8));
        assert_eq!(s.ticks, 2);
        assert_eq!(s.max_tick, Duration::from_millis(8));
        assert_eq!(s.last_tick, Duration::from_millis(8));
        assert_eq!(s.mean_tick(), Duration::from_millis(6));
    }

    #[test]
    fn test_record_reads() {
        let mut s = SamplerStats::new();
        s.record_read(MetricFamily::Gpu, ReadOutcome::Ok);
        s.record_read(MetricFamily::Gpu, ReadOutcome::TimedOut);
        s.record_read(MetricFamily::Cpu, ReadOutcome::Failed);
        s.record_read(MetricFamily::Cpu, ReadOutcome::Failed);
        assert_eq!(s.families["gpu"].timeouts, 1);
        assert_eq!(s.families["cpu"].failures, 2);
        assert_eq!(s.total_failures(), 2);
        assert!(s.summary().contains("1 timeouts"));
    }
}
