// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! One sampling tick: read every source, assemble one row.
//!
//! Every family is read on every tick, whether or not it is displayed.
//! Reads run concurrently on the blocking pool, each bounded by the
//! source timeout; a read that fails, panics or times out contributes the
//! family's all-unavailable sample and the tick carries on.

use crate::metrics::{ReadOutcome, SamplerStats};
use metric_row::{frame_time_from_fps, MetricRow};
use metric_sources::{
    BatteryThermalSource, CpuSample, ForegroundDetector, FrameSample, GpuSample, MemorySample,
    MetricSource, ProcMemorySource, SourcePaths, SysfsCpuSource, SysfsFrameSource, SysfsGpuSource,
    ThermalSample, UNKNOWN_SUBJECT,
};
use parking_lot::Mutex;
use std::sync::Arc;
use std::time::{Duration, Instant};

/// One reader per metric family.
#[derive(Clone)]
pub struct SourceSet {
    pub frame: Arc<dyn MetricSource<Sample = FrameSample>>,
    pub cpu: Arc<dyn MetricSource<Sample = CpuSample>>,
    pub memory: Arc<dyn MetricSource<Sample = MemorySample>>,
    pub gpu: Arc<dyn MetricSource<Sample = GpuSample>>,
    pub thermal: Arc<dyn MetricSource<Sample = ThermalSample>>,
}

impl SourceSet {
    /// The built-in sysfs and procfs readers.
    pub fn sysfs(paths: &SourcePaths) -> Self {
        Self {
            frame: Arc::new(SysfsFrameSource::new(paths)),
            cpu: Arc::new(SysfsCpuSource::new(paths)),
            memory: Arc::new(ProcMemorySource::new(paths)),
            gpu: Arc::new(SysfsGpuSource::new(paths)),
            thermal: Arc::new(BatteryThermalSource::new(paths)),
        }
    }
}

/// Produces one [`MetricRow`] per call to [`Sampler::tick`].
pub struct Sampler {
    sources: SourceSet,
    foreground: Arc<dyn ForegroundDetector>,
    timeout: Duration,
    stats: Mutex<SamplerStats>,
}

impl Sampler {
    pub fn new(sources: SourceSet, foreground: Arc<dyn ForegroundDetector>, timeout: Duration) -> Self {
        Self {
            sources,
            foreground,
            timeout,
            stats: Mutex::new(SamplerStats::new()),
        }
    }

    pub fn timeout(&self) -> Duration {
        self.timeout
    }

    pub fn stats(&self) -> SamplerStats {
        self.stats.lock().clone()
    }

    /// Samples every family once and assembles the row.
    ///
    /// Never fails: unreadable families are recorded as unavailable. Frame
    /// time is derived from this tick's fps only.
    pub async fn tick(&self) -> MetricRow {
        let started = Instant::now();
        let timestamp = chrono::Local::now().naive_local();

        let (frame, cpu, memory, gpu, thermal, subject) = tokio::join!(
            bounded_read(Arc::clone(&self.sources.frame), self.timeout),
            bounded_read(Arc::clone(&self.sources.cpu), self.timeout),
            bounded_read(Arc::clone(&self.sources.memory), self.timeout),
            bounded_read(Arc::clone(&self.sources.gpu), self.timeout),
            bounded_read(Arc::clone(&self.sources.thermal), self.timeout),
            self.read_foreground(),
        );

        {
            let mut stats = self.stats.lock();
            for (family, outcome) in [frame.1, cpu.1, memory.1, gpu.1, thermal.1] {
                stats.record_read(family, outcome);
            }
        }
        let (frame, cpu, memory, gpu, thermal) = (frame.0, cpu.0, memory.0, gpu.0, thermal.0);

        let row = MetricRow {
            timestamp,
            subject,
            frame_time_ms: frame_time_from_fps(&frame.fps),
            fps: frame.fps,
            battery_temp_c: thermal.battery_temp_c,
            cpu_usage_pct: cpu.usage_pct,
            cpu_clocks_mhz: cpu.clocks_mhz,
            cpu_temp_c: cpu.temp_c,
            ram_usage_mb: memory.usage_mb,
            ram_speed_mhz: memory.speed_mhz,
            ram_temp_c: memory.temp_c,
            gpu_usage_pct: gpu.usage_pct,
            gpu_clock_mhz: gpu.clock_mhz,
            gpu_temp_c: gpu.temp_c,
        }
        .normalized();

        let elapsed = started.elapsed();
        self.stats.lock().record_tick(elapsed);
        tracing::trace!("tick for {} took {:?}", row.subject, elapsed);
        row
    }

    async fn read_foreground(&self) -> String {
        let detector = Arc::clone(&self.foreground);
        let subject = tokio::time::timeout(
            self.timeout,
            tokio::task::spawn_blocking(move || detector.foreground()),
        )
        .await;
        match subject {
            Ok(Ok(Some(s))) if !s.is_empty() => s,
            Ok(Ok(_)) => UNKNOWN_SUBJECT.to_string(),
            Ok(Err(e)) => {
                tracing::warn!("foreground detector panicked: {e}");
                UNKNOWN_SUBJECT.to_string()
            }
            Err(_) => {
                tracing::warn!("foreground detector timed out after {:?}", self.timeout);
                UNKNOWN_SUBJECT.to_string()
            }
        }
    }
}

impl std::fmt::Debug for Sampler {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Sampler")
            .field("timeout", &self.timeout)
            .field("ticks", &self.stats.lock().ticks)
            .finish()
    }
}

/// Reads `source` on the blocking pool, giving up after `timeout`.
///
/// A timed-out read keeps running on its blocking thread; its result is
/// discarded.
async fn bounded_read<S: Default + Clone + Send + 'static>(
    source: Arc<dyn MetricSource<Sample = S>>,
    timeout: Duration,
) -> (S, (metric_sources::MetricFamily, ReadOutcome)) {
    let family = source.family();
    let handle = tokio::task::spawn_blocking(move || source.read());
    match tokio::time::timeout(timeout, handle).await {
        Ok(Ok(Ok(sample))) => (sample, (family, ReadOutcome::Ok)),
        Ok(Ok(Err(e))) => {
            tracing::debug!("{family} source unavailable: {e}");
            (S::default(), (family, ReadOutcome::Failed))
        }
        Ok(Err(e)) => {
            tracing::warn!("{family} source panicked: {e}");
            (S::default(), (family, ReadOutcome::Failed))
        }
        Err(_) => {
            tracing::warn!("{family} source timed out after {timeout:?}");
            (S::default(), (family, ReadOutcome::TimedOut))
        }
    }
}
