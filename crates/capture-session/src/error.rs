// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for capture control and log storage.

use crate::LoggingMode;
use std::path::PathBuf;

/// Errors raised while writing a session to disk.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// The log directory could not be created.
    #[error("cannot create log directory {}: {source}", .path.display())]
    CreateDir {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Opening or writing the log file failed.
    #[error("failed to write {}: {source}", .path.display())]
    Write {
        path: PathBuf,
        source: std::io::Error,
    },

    /// Every candidate file name for this timestamp is already taken.
    #[error("no free file name for {}", .path.display())]
    NameExhausted { path: PathBuf },
}

/// Errors raised while reading an exported log back.
#[derive(Debug, thiserror::Error)]
pub enum LogReadError {
    #[error("failed to read {}: {source}", .path.display())]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The first line is not the expected column header.
    #[error("{} does not start with the log header", .path.display())]
    MissingHeader { path: PathBuf },

    #[error("{}:{line}: {source}", .path.display())]
    Malformed {
        path: PathBuf,
        line: usize,
        #[source]
        source: metric_row::RowError,
    },
}

/// Errors raised by the capture controller.
#[derive(Debug, thiserror::Error)]
pub enum CaptureError {
    /// The logging mode can only change while capture is stopped.
    #[error("cannot switch to {requested:?} mode while capturing")]
    ModeChangeWhileCapturing { requested: LoggingMode },

    /// The persisted state file could not be read or written.
    #[error("state file {}: {source}", .path.display())]
    StateIo {
        path: PathBuf,
        source: std::io::Error,
    },

    /// The persisted state file is not valid TOML.
    #[error("state file {}: {detail}", .path.display())]
    StateParse { path: PathBuf, detail: String },
}
