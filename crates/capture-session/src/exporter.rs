// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Session export to comma-separated files.
//!
//! # File Naming
//! ```text
//! GameBar_log_20250314_092653.csv                 (global session)
//! com.example.game_GameBar_log_20250314_092653.csv (per-app session)
//! com.example.game_GameBar_log_20250314_092653_1.csv (same second, second export)
//! ```
//! Files are opened with create-new semantics; an existing file is never
//! truncated or overwritten.

use crate::{ExportError, SessionKey};
use metric_row::{header_line, MetricRow};
use std::fs::OpenOptions;
use std::io::{BufWriter, Write};
use std::path::{Path, PathBuf};

/// `chrono` format of the capture timestamp embedded in file names.
pub const FILE_STAMP_FORMAT: &str = "%Y%m%d_%H%M%S";

/// Marker separating the subject from the timestamp in file names.
pub(crate) const LOG_MARKER: &str = "GameBar_log_";

/// Candidate suffixes tried when a name is already taken.
const MAX_SUFFIX: u32 = 999;

/// Writes a finished session somewhere durable.
pub trait Exporter: Send + Sync {
    /// Writes the header and `rows`; returns where they went.
    fn flush(&self, key: &SessionKey, rows: &[MetricRow]) -> Result<PathBuf, ExportError>;
}

/// File name for a session export, without collision suffix.
///
/// Path separators in application identifiers are replaced by `_`.
pub fn file_name_for(key: &SessionKey, stamp: &str) -> String {
    match key {
        SessionKey::Global => format!("{LOG_MARKER}{stamp}.csv"),
        SessionKey::App(id) => {
            let safe: String = id
                .chars()
                .map(|c| if matches!(c, '/' | '\\' | '\0') { '_' } else { c })
                .collect();
            format!("{safe}_{LOG_MARKER}{stamp}.csv")
        }
    }
}

/// Writes one `.csv` file per session into a directory.
#[derive(Debug, Clone)]
pub struct CsvExporter {
    dir: PathBuf,
}

impl CsvExporter {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Opens a fresh file for `base_name`, appending `_1`, `_2`, ... to the
    /// stem until an unused name is found.
    fn create_unique(&self, base_name: &str) -> Result<(PathBuf, std::fs::File), ExportError> {
        let stem = base_name.trim_end_matches(".csv");
        for n in 0..=MAX_SUFFIX {
            let name = if n == 0 {
                base_name.to_string()
            } else {
                format!("{stem}_{n}.csv")
            };
            let path = self.dir.join(name);
            match OpenOptions::new().write(true).create_new(true).open(&path) {
                Ok(file) => return Ok((path, file)),
                Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => continue,
                Err(source) => return Err(ExportError::Write { path, source }),
            }
        }
        Err(ExportError::NameExhausted {
            path: self.dir.join(base_name),
        })
    }
}

impl Exporter for CsvExporter {
    fn flush(&self, key: &SessionKey, rows: &[MetricRow]) -> Result<PathBuf, ExportError> {
        std::fs::create_dir_all(&self.dir).map_err(|source| ExportError::CreateDir {
            path: self.dir.clone(),
            source,
        })?;

        let stamp = chrono::Local::now().format(FILE_STAMP_FORMAT).to_string();
        let (path, file) = self.create_unique(&file_name_for(key, &stamp))?;

        let write_all = |file: std::fs::File| -> std::io::Result<()> {
            let mut out = BufWriter::new(file);
            writeln!(out, "{}", header_line())?;
            for row in rows {
                writeln!(out, "{}", row.to_csv_line())?;
            }
            out.flush()
        };
        write_all(file).map_err(|source| ExportError::Write {
            path: path.clone(),
            source,
        })?;

        tracing::info!("exported {} rows for {key} to {}", rows.len(), path.display());
        Ok(path)
    }
}
