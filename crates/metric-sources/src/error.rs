// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for metric sources.

/// Errors that can occur when reading a metric source.
#[derive(Debug, thiserror::Error)]
pub enum MonitorError {
    /// Failed to read a sysfs or procfs file.
    #[error("failed to read {path}: {source}")]
    ReadError {
        path: String,
        source: std::io::Error,
    },

    /// Failed to parse a numeric value from a system file.
    #[error("failed to parse value from {path}: {detail}")]
    ParseError { path: String, detail: String },

    /// The node does not exist on this device.
    #[error("sysfs path not found: {path}")]
    NotAvailable { path: String },

    /// The source did not answer within its read budget.
    #[error("{family} source timed out after {millis} ms")]
    Timeout { family: &'static str, millis: u64 },

    /// The source failed as a whole (used by non-sysfs sources).
    #[error("{family} source failed: {detail}")]
    SourceFailed { family: &'static str, detail: String },
}
