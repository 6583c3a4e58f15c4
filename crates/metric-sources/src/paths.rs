// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Sysfs node locations for every reader, deserialised from the
//! `[sources]` table of the overlay configuration.
//!
//! Node locations vary by SoC; the defaults target a Qualcomm-style
//! Android device and degrade to `N/A` elsewhere.

use crate::sysfs::read_number;
use crate::MonitorError;
use std::path::{Path, PathBuf};

/// A single numeric sysfs node: `value = raw / divisor`.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
pub struct SysfsNode {
    pub path: PathBuf,
    #[serde(default = "default_divisor")]
    pub divisor: f64,
}

fn default_divisor() -> f64 {
    1.0
}

impl SysfsNode {
    pub fn new(path: impl Into<PathBuf>, divisor: f64) -> Self {
        Self {
            path: path.into(),
            divisor,
        }
    }

    /// Reads the node and applies the divisor.
    ///
    /// A zero or non-finite divisor is treated as `1`.
    pub fn read(&self) -> Result<f64, MonitorError> {
        let raw = read_number(&self.path)?;
        let divisor = if self.divisor.is_finite() && self.divisor != 0.0 {
            self.divisor
        } else {
            1.0
        };
        Ok(raw / divisor)
    }
}

/// Locations of every node read by the built-in sources.
#[derive(Debug, Clone, PartialEq, serde::Serialize, serde::Deserialize)]
#[serde(default)]
pub struct SourcePaths {
    /// Display fps counter.
    pub fps: SysfsNode,
    /// Battery temperature (tenths of a degree).
    pub battery_temp: SysfsNode,
    /// Root of the per-core cpufreq tree.
    pub cpu_base: PathBuf,
    /// Aggregate CPU time counters.
    pub proc_stat: PathBuf,
    /// SoC temperature (millidegrees).
    pub cpu_temp: SysfsNode,
    pub meminfo: PathBuf,
    pub ram_speed: SysfsNode,
    pub ram_temp: SysfsNode,
    pub gpu_usage: SysfsNode,
    pub gpu_clock: SysfsNode,
    pub gpu_temp: SysfsNode,
}

impl Default for SourcePaths {
    fn default() -> Self {
        Self {
            fps: SysfsNode::new("/sys/class/drm/sde-crtc-0/measured_fps", 1.0),
            battery_temp: SysfsNode::new("/sys/class/power_supply/battery/temp", 10.0),
            cpu_base: PathBuf::from("/sys/devices/system/cpu"),
            proc_stat: PathBuf::from("/proc/stat"),
            cpu_temp: SysfsNode::new("/sys/class/thermal/thermal_zone0/temp", 1000.0),
            meminfo: PathBuf::from("/proc/meminfo"),
            ram_speed: SysfsNode::new("/sys/class/devfreq/ddrfreq/cur_freq", 1000.0),
            ram_temp: SysfsNode::new("/sys/class/thermal/thermal_zone1/temp", 1000.0),
            gpu_usage: SysfsNode::new("/sys/class/kgsl/kgsl-3d0/gpu_busy_percentage", 1.0),
            gpu_clock: SysfsNode::new("/sys/class/kgsl/kgsl-3d0/gpuclk", 1_000_000.0),
            gpu_temp: SysfsNode::new("/sys/class/kgsl/kgsl-3d0/temp", 1000.0),
        }
    }
}

impl SourcePaths {
    /// Re-roots every path under `root`. Used by tests to point every
    /// reader at a fake sysfs tree.
    pub fn rooted_at(&self, root: &Path) -> Self {
        let reroot = |p: &Path| root.join(p.strip_prefix("/").unwrap_or(p));
        let node = |n: &SysfsNode| SysfsNode::new(reroot(&n.path), n.divisor);
        Self {
            fps: node(&self.fps),
            battery_temp: node(&self.battery_temp),
            cpu_base: reroot(&self.cpu_base),
            proc_stat: reroot(&self.proc_stat),
            cpu_temp: node(&self.cpu_temp),
            meminfo: reroot(&self.meminfo),
            ram_speed: node(&self.ram_speed),
            ram_temp: node(&self.ram_temp),
            gpu_usage: node(&self.gpu_usage),
            gpu_clock: node(&self.gpu_clock),
            gpu_temp: node(&self.gpu_temp),
        }
    }
}
