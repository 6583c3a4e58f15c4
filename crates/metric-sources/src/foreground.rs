// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Foreground subject detection.
//!
//! A [`ForegroundDetector`] answers "which application is in front right
//! now". Detectors are polled; [`ForegroundTracker`] turns polled answers
//! into `(previous, current)` transitions and suppresses repeats, so
//! consumers only ever see real changes.

use crate::sysfs::read_sysfs_file;
use parking_lot::RwLock;
use std::path::PathBuf;

/// Subject recorded in rows when no foreground application is known.
pub const UNKNOWN_SUBJECT: &str = "Unknown";

/// Reports the current foreground subject.
pub trait ForegroundDetector: Send + Sync {
    /// The foreground application identifier, or `None` if unknown.
    fn foreground(&self) -> Option<String>;
}

/// A foreground transition.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ForegroundChange {
    pub previous: Option<String>,
    pub current: Option<String>,
}

/// Deduplicates polled foreground readings into transitions.
#[derive(Debug, Default)]
pub struct ForegroundTracker {
    last: Option<String>,
}

impl ForegroundTracker {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently observed subject.
    pub fn current(&self) -> Option<&str> {
        self.last.as_deref()
    }

    /// Records a reading; returns the transition if it differs from the
    /// last one.
    pub fn observe(&mut self, current: Option<String>) -> Option<ForegroundChange> {
        let current = current.filter(|s| !s.is_empty() && s != UNKNOWN_SUBJECT);
        if current == self.last {
            return None;
        }
        let previous = std::mem::replace(&mut self.last, current.clone());
        Some(ForegroundChange { previous, current })
    }
}

/// A detector whose answer is set explicitly.
#[derive(Debug, Default)]
pub struct StaticForeground {
    subject: RwLock<Option<String>>,
}

impl StaticForeground {
    pub fn new(subject: Option<String>) -> Self {
        Self {
            subject: RwLock::new(subject),
        }
    }

    pub fn set(&self, subject: Option<String>) {
        *self.subject.write() = subject;
    }
}

impl ForegroundDetector for StaticForeground {
    fn foreground(&self) -> Option<String> {
        self.subject.read().clone()
    }
}

/// Reads the subject from a one-line file maintained by an external
/// activity monitor. A missing or empty file means no foreground subject.
#[derive(Debug, Clone)]
pub struct FileForeground {
    path: PathBuf,
}

impl FileForeground {
    pub fn new(path: impl Into<PathBuf>) -> Self {
        Self { path: path.into() }
    }
}

impl ForegroundDetector for FileForeground {
    fn foreground(&self) -> Option<String> {
        match read_sysfs_file(&self.path) {
            Ok(content) => content
                .lines()
                .next()
                .map(str::trim)
                .filter(|s| !s.is_empty())
                .map(str::to_string),
            Err(e) => {
                tracing::trace!("no foreground subject: {e}");
                None
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_tracker_emits_only_changes() {
        let mut t = ForegroundTracker::new();
        let first = t.observe(Some("a".into())).unwrap();
        assert_eq!(first.previous, None);
        assert_eq!(first.current.as_deref(), Some("a"));

        assert!(t.observe(Some("a".into())).is_none());

        let second = t.observe(Some("b".into())).unwrap();
        assert_eq!(second.previous.as_deref(), Some("a"));
        assert_eq!(second.current.as_deref(), Some("b"));
        assert_eq!(t.current(), Some("b"));
    }

    #[test]
    fn test_tracker_unknown_is_none() {
        let mut t = ForegroundTracker::new();
        assert!(t.observe(Some(UNKNOWN_SUBJECT.into())).is_none());
        t.observe(Some("a".into()));
        let gone = t.observe(Some(String::new())).unwrap();
        assert_eq!(gone.previous.as_deref(), Some("a"));
        assert_eq!(gone.current, None);
    }

    #[test]
    fn test_static_foreground() {
        let d = StaticForeground::new(None);
        assert_eq!(d.foreground(), None);
        d.set(Some("com.example.game".into()));
        assert_eq!(d.foreground().as_deref(), Some("com.example.game"));
    }

    #[test]
    fn test_file_foreground() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("foreground");
        let d = FileForeground::new(&path);
        assert_eq!(d.foreground(), None);

        std::fs::write(&path, "com.example.game\n").unwrap();
        assert_eq!(d.foreground().as_deref(), Some("com.example.game"));

        std::fs::write(&path, "\n").unwrap();
        assert_eq!(d.foreground(), None);
    }
}
