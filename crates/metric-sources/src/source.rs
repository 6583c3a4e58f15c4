// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The [`MetricSource`] trait and the sample type of every family.

use crate::MonitorError;
use metric_row::Reading;

/// The metric families read on every tick.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MetricFamily {
    Frame,
    Cpu,
    Memory,
    Gpu,
    Thermal,
}

impl MetricFamily {
    pub fn name(self) -> &'static str {
        match self {
            MetricFamily::Frame => "frame",
            MetricFamily::Cpu => "cpu",
            MetricFamily::Memory => "memory",
            MetricFamily::Gpu => "gpu",
            MetricFamily::Thermal => "thermal",
        }
    }
}

impl std::fmt::Display for MetricFamily {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.name())
    }
}

/// A reader for one metric family.
///
/// `read` may block on file I/O; callers that must not stall bound it
/// with a timeout. An `Err` means the whole family is unavailable this
/// tick; partially readable families return `Ok` with `Unavailable`
/// fields. `Sample::default()` must be the all-unavailable sample.
pub trait MetricSource: Send + Sync + 'static {
    type Sample: Default + Clone + Send + 'static;

    fn family(&self) -> MetricFamily;

    fn read(&self) -> Result<Self::Sample, MonitorError>;
}

/// Frame timing sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct FrameSample {
    pub fps: Reading,
}

/// CPU sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct CpuSample {
    /// Aggregate busy percentage since the previous read.
    pub usage_pct: Reading,
    /// Current clock of every online core.
    pub clocks_mhz: Reading<Vec<u32>>,
    pub temp_c: Reading,
}

/// Memory sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct MemorySample {
    pub usage_mb: Reading,
    pub speed_mhz: Reading,
    pub temp_c: Reading,
}

/// GPU sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct GpuSample {
    pub usage_pct: Reading,
    pub clock_mhz: Reading,
    pub temp_c: Reading,
}

/// Battery thermal sample.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ThermalSample {
    pub battery_temp_c: Reading,
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_default_samples_unavailable() {
        assert_eq!(FrameSample::default().fps, Reading::Unavailable);
        let cpu = CpuSample::default();
        assert!(!cpu.usage_pct.is_available());
        assert!(!cpu.clocks_mhz.is_available());
        assert!(!GpuSample::default().clock_mhz.is_available());
    }

    #[test]
    fn test_family_names() {
        assert_eq!(MetricFamily::Frame.to_string(), "frame");
        assert_eq!(MetricFamily::Thermal.name(), "thermal");
    }
}
