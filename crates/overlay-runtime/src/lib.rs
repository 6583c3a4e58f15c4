// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # overlay-runtime
//!
//! The sampling loop that feeds the overlay and the capture layer.
//!
//! The runtime takes:
//! - A [`SourceSet`] of metric readers from `metric-sources`.
//! - A foreground detector.
//! - A [`CaptureController`](capture_session::CaptureController) from
//!   `capture-session`.
//!
//! And, once per interval, samples one row, renders it for the overlay when
//! it is visible, and hands it to capture for logging.
//!
//! # Async Execution
//! Uses `tokio`: an `interval` drives ticks, source reads run on the
//! blocking pool under a timeout, and foreground polling runs in its own
//! task that delivers transitions over a channel.
//!
//! # Example
//! ```no_run
//! use overlay_runtime::{OverlayConfig, OverlayService};
//!
//! # async fn example() -> Result<(), overlay_runtime::RuntimeError> {
//! let service = OverlayService::from_config(&OverlayConfig::default())?;
//! service.show();
//! service.capture().start_capture();
//! let row = service.tick_once().await;
//! println!("{}", row.to_csv_line());
//! service.shutdown();
//! # Ok(())
//! # }
//! ```

mod config;
mod error;
mod formatter;
mod metrics;
mod sampler;
mod service;

pub use config::{
    DisplayToggles, LogColumns, OverlayConfig, OverlayFormat, DEFAULT_FOREGROUND_POLL_MS,
    DEFAULT_SAMPLE_INTERVAL_MS, DEFAULT_SOURCE_TIMEOUT_MS,
};
pub use error::RuntimeError;
pub use formatter::{render, stat_lines, OverlayFormatter, StatLine, MINIMAL_SEPARATOR};
pub use metrics::{FamilyStats, ReadOutcome, SamplerStats};
pub use sampler::{Sampler, SourceSet};
pub use service::{LogPresenter, OverlayService, Presenter};
