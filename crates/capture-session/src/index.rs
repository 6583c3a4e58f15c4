// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Listing and reading previously exported logs.

use crate::exporter::LOG_MARKER;
use crate::{LogReadError, SessionKey};
use metric_row::{header_line, MetricRow};
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};
use std::time::SystemTime;

/// One exported log on disk.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct LogFile {
    pub path: PathBuf,
    /// Application identifier, or `None` for a global log.
    pub subject: Option<String>,
    pub modified: SystemTime,
    pub size_bytes: u64,
}

impl LogFile {
    pub fn file_name(&self) -> String {
        self.path
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default()
    }
}

/// Read-only view over a log directory.
#[derive(Debug, Clone)]
pub struct LogIndex {
    dir: PathBuf,
}

impl LogIndex {
    pub fn new(dir: impl Into<PathBuf>) -> Self {
        Self { dir: dir.into() }
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    /// Every log in the directory, newest first. A missing directory is
    /// an empty index.
    pub fn all(&self) -> std::io::Result<Vec<LogFile>> {
        let entries = match std::fs::read_dir(&self.dir) {
            Ok(entries) => entries,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e),
        };

        let mut logs = Vec::new();
        for entry in entries {
            let entry = entry?;
            let name = entry.file_name().to_string_lossy().into_owned();
            let Some(subject) = classify(&name) else {
                continue;
            };
            let meta = entry.metadata()?;
            if !meta.is_file() {
                continue;
            }
            logs.push(LogFile {
                path: entry.path(),
                subject,
                modified: meta.modified().unwrap_or(SystemTime::UNIX_EPOCH),
                size_bytes: meta.len(),
            });
        }
        logs.sort_by(|a, b| b.modified.cmp(&a.modified).then_with(|| b.path.cmp(&a.path)));
        Ok(logs)
    }

    pub fn global_logs(&self) -> std::io::Result<Vec<LogFile>> {
        Ok(self.all()?.into_iter().filter(|l| l.subject.is_none()).collect())
    }

    /// Logs written for one session key, newest first.
    pub fn logs_for(&self, key: &SessionKey) -> std::io::Result<Vec<LogFile>> {
        let wanted = key.app_id();
        Ok(self
            .all()?
            .into_iter()
            .filter(|l| l.subject.as_deref() == wanted)
            .collect())
    }

    /// Per-application logs grouped by application identifier.
    pub fn all_per_app_logs(&self) -> std::io::Result<BTreeMap<String, Vec<LogFile>>> {
        let mut grouped: BTreeMap<String, Vec<LogFile>> = BTreeMap::new();
        for log in self.all()? {
            if let Some(subject) = log.subject.clone() {
                grouped.entry(subject).or_default().push(log);
            }
        }
        Ok(grouped)
    }
}

/// Classifies a file name: `Some(None)` for a global log, `Some(Some(id))`
/// for a per-app log, `None` for anything else.
fn classify(name: &str) -> Option<Option<String>> {
    if !name.ends_with(".csv") {
        return None;
    }
    // The stamp never contains the marker, so the last infix separates
    // the key even when the key itself contains the marker.
    let marker = format!("_{LOG_MARKER}");
    match name.rfind(&marker) {
        Some(pos) if pos > 0 => Some(Some(name[..pos].to_string())),
        _ if name.starts_with(LOG_MARKER) => Some(None),
        _ => None,
    }
}

/// Reads an exported log back into rows.
pub fn read_rows(path: &Path) -> Result<Vec<MetricRow>, LogReadError> {
    let content = std::fs::read_to_string(path).map_err(|source| LogReadError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    let mut lines = content.lines();
    if lines.next() != Some(header_line().as_str()) {
        return Err(LogReadError::MissingHeader {
            path: path.to_path_buf(),
        });
    }
    lines
        .enumerate()
        .filter(|(_, l)| !l.is_empty())
        .map(|(i, l)| {
            MetricRow::from_csv_line(l).map_err(|source| LogReadError::Malformed {
                path: path.to_path_buf(),
                line: i + 2,
                source,
            })
        })
        .collect()
}
