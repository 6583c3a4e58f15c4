// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The set of applications logged automatically, and its persisted form.

use crate::{CaptureError, LoggingMode};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::Path;

/// Settings that survive restarts.
///
/// ```toml
/// logging_mode = "per_app"
/// enabled_apps = ["com.example.game"]
/// ```
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(default)]
pub struct PersistedState {
    pub logging_mode: LoggingMode,
    pub enabled_apps: BTreeSet<String>,
}

impl PersistedState {
    /// Loads the state file. A missing file yields the default state.
    pub fn load(path: &Path) -> Result<Self, CaptureError> {
        let content = match std::fs::read_to_string(path) {
            Ok(c) => c,
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => return Ok(Self::default()),
            Err(source) => {
                return Err(CaptureError::StateIo {
                    path: path.to_path_buf(),
                    source,
                })
            }
        };
        toml::from_str(&content).map_err(|e| CaptureError::StateParse {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })
    }

    /// Writes the state file through a sibling temporary file and a rename.
    pub fn save(&self, path: &Path) -> Result<(), CaptureError> {
        let io_err = |source: std::io::Error| CaptureError::StateIo {
            path: path.to_path_buf(),
            source,
        };
        let content = toml::to_string_pretty(self).map_err(|e| CaptureError::StateParse {
            path: path.to_path_buf(),
            detail: e.to_string(),
        })?;
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent).map_err(io_err)?;
        }
        let tmp = path.with_extension("toml.tmp");
        std::fs::write(&tmp, content).map_err(io_err)?;
        std::fs::rename(&tmp, path).map_err(io_err)
    }
}

/// Applications whose foreground time is logged in per-app mode.
#[derive(Debug, Default)]
pub struct EnabledSet {
    apps: RwLock<BTreeSet<String>>,
}

impl EnabledSet {
    pub fn new(apps: impl IntoIterator<Item = String>) -> Self {
        Self {
            apps: RwLock::new(apps.into_iter().collect()),
        }
    }

    pub fn contains(&self, app: &str) -> bool {
        self.apps.read().contains(app)
    }

    /// Returns `true` when the app was not already enabled.
    pub fn insert(&self, app: &str) -> bool {
        self.apps.write().insert(app.to_string())
    }

    /// Returns `true` when the app was enabled.
    pub fn remove(&self, app: &str) -> bool {
        self.apps.write().remove(app)
    }

    pub fn snapshot(&self) -> BTreeSet<String> {
        self.apps.read().clone()
    }
}
