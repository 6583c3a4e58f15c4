// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # metric-sources
//!
//! Readers for every metric family shown on the overlay, plus detection of
//! the foreground subject.
//!
//! # Metric Families
//! - **Frame**: display refresh counter (fps).
//! - **CPU**: usage from `/proc/stat` deltas, per-core clocks, SoC temperature.
//! - **Memory**: used RAM from `/proc/meminfo`, DDR clock, DDR temperature.
//! - **GPU**: busy percentage, clock, temperature.
//! - **Thermal**: battery temperature.
//!
//! Each family implements [`MetricSource`]. A reader is a thin wrapper that
//! reads a sysfs node and divides by a scale factor; every field of a
//! sample is a [`Reading`](metric_row::Reading), so a missing node degrades
//! that field to `Unavailable` rather than failing the whole sample.
//!
//! # Example
//! ```no_run
//! use metric_sources::{MetricSource, SourcePaths, SysfsCpuSource};
//!
//! let cpu = SysfsCpuSource::new(&SourcePaths::default());
//! let sample = cpu.read().expect("cpu family unreadable");
//! println!("clocks: {}", sample.clocks_mhz.format_list());
//! ```

mod cpu;
mod error;
mod foreground;
mod frame;
mod gpu;
mod memory;
mod paths;
mod source;
pub(crate) mod sysfs;
mod thermal;

pub use cpu::SysfsCpuSource;
pub use error::MonitorError;
pub use foreground::{
    ForegroundChange, ForegroundDetector, ForegroundTracker, FileForeground, StaticForeground,
    UNKNOWN_SUBJECT,
};
pub use frame::SysfsFrameSource;
pub use gpu::SysfsGpuSource;
pub use memory::ProcMemorySource;
pub use paths::{SourcePaths, SysfsNode};
pub use source::{
    CpuSample, FrameSample, GpuSample, MemorySample, MetricFamily, MetricSource, ThermalSample,
};
pub use thermal::BatteryThermalSource;
