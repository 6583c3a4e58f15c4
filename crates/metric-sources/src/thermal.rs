// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Battery temperature via the power-supply class.
//!
//! The kernel reports `power_supply/battery/temp` in tenths of a degree
//! Celsius (`345` means 34.5 °C); the divisor comes from configuration.

use crate::{MetricFamily, MetricSource, MonitorError, SourcePaths, SysfsNode, ThermalSample};
use metric_row::Reading;

/// Reads the battery temperature.
#[derive(Debug, Clone)]
pub struct BatteryThermalSource {
    node: SysfsNode,
}

impl BatteryThermalSource {
    pub fn new(paths: &SourcePaths) -> Self {
        Self {
            node: paths.battery_temp.clone(),
        }
    }
}

impl MetricSource for BatteryThermalSource {
    type Sample = ThermalSample;

    fn family(&self) -> MetricFamily {
        MetricFamily::Thermal
    }

    fn read(&self) -> Result<ThermalSample, MonitorError> {
        Ok(ThermalSample {
            battery_temp_c: Reading::from_result(self.node.read()),
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_tenths() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SourcePaths::default().rooted_at(dir.path());
        std::fs::create_dir_all(paths.battery_temp.path.parent().unwrap()).unwrap();
        std::fs::write(&paths.battery_temp.path, "345\n").unwrap();

        let sample = BatteryThermalSource::new(&paths).read().unwrap();
        let Reading::Value(c) = sample.battery_temp_c else {
            panic!("expected a value");
        };
        assert!((c - 34.5).abs() < 1e-9);
    }

    #[test]
    fn test_missing_node() {
        let dir = tempfile::tempdir().unwrap();
        let paths = SourcePaths::default().rooted_at(dir.path());
        let sample = BatteryThermalSource::new(&paths).read().unwrap();
        assert_eq!(sample.battery_temp_c, Reading::Unavailable);
    }
}
