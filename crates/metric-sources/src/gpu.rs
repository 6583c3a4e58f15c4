// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! GPU busy percentage, clock and temperature.

use crate::{GpuSample, MetricFamily, MetricSource, MonitorError, SourcePaths, SysfsNode};
use metric_row::Reading;

/// Reads the GPU family from three independent nodes.
#[derive(Debug, Clone)]
pub struct SysfsGpuSource {
    usage: SysfsNode,
    clock: SysfsNode,
    temp: SysfsNode,
}

impl SysfsGpuSource {
    pub fn new(paths: &SourcePaths) -> Self {
        Self {
            usage: paths.gpu_usage.clone(),
            clock: paths.gpu_clock.clone(),
            temp: paths.gpu_temp.clone(),
        }
    }
}

impl MetricSource for SysfsGpuSource {
    type Sample = GpuSample;

    fn family(&self) -> MetricFamily {
        MetricFamily::Gpu
    }

    fn read(&self) -> Result<GpuSample, MonitorError> {
        Ok(GpuSample {
            usage_pct: Reading::from_result(self.usage.read()).map(|v| v.clamp(0.0, 100.0)),
            clock_mhz: Reading::from_result(self.clock.read()),
            temp_c: Reading::from_result(self.temp.read()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_read_gpu_nodes() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SourcePaths::default().rooted_at(dir.path());
        std::fs::create_dir_all(paths.gpu_usage.path.parent().unwrap()).unwrap();
        std::fs::write(&paths.gpu_usage.path, "37 %").unwrap();
        std::fs::write(&paths.gpu_clock.path, "585000000").unwrap();

        let sample = SysfsGpuSource::new(&paths).read().unwrap();
        assert_eq!(sample.usage_pct, Reading::Value(37.0));
        assert_eq!(sample.clock_mhz, Reading::Value(585.0));
        assert_eq!(sample.temp_c, Reading::Unavailable);
    }
}
