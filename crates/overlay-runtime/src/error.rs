// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for the overlay runtime.

/// Errors surfaced while configuring or starting the overlay service.
///
/// Nothing inside the sampling loop produces one of these: source failures
/// degrade the row and export failures are reported as session events.
#[derive(Debug, thiserror::Error)]
pub enum RuntimeError {
    /// The configuration file could not be read, parsed or written.
    #[error("configuration error: {0}")]
    ConfigError(String),

    /// Loading or persisting capture state failed.
    #[error("capture error: {0}")]
    Capture(#[from] capture_session::CaptureError),

    /// The service was asked to run twice.
    #[error("overlay service is already running")]
    AlreadyRunning,
}
