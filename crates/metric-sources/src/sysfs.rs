// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Shared helpers for reading sysfs/procfs nodes.

use crate::MonitorError;
use std::path::Path;

/// Reads a sysfs/procfs file and returns its trimmed content.
pub(crate) fn read_sysfs_file(path: &Path) -> Result<String, MonitorError> {
    if !path.exists() {
        return Err(MonitorError::NotAvailable {
            path: path.display().to_string(),
        });
    }
    std::fs::read_to_string(path)
        .map(|s| s.trim().to_string())
        .map_err(|e| MonitorError::ReadError {
            path: path.display().to_string(),
            source: e,
        })
}

/// Extracts the first decimal number in `content`.
///
/// Handles bare values (`"54321"`), values with units (`"42 %"`) and
/// labelled values (`"fps: 59.9 duration:16000"`).
pub(crate) fn first_number(content: &str) -> Option<f64> {
    let start = content.find(|c: char| c.is_ascii_digit() || c == '-')?;
    let rest = &content[start..];
    let end = rest
        .char_indices()
        .skip(1)
        .find(|&(_, c)| !(c.is_ascii_digit() || c == '.'))
        .map(|(i, _)| i)
        .unwrap_or(rest.len());
    rest[..end].parse().ok()
}

/// Reads `path` and parses its first number.
pub(crate) fn read_number(path: &Path) -> Result<f64, MonitorError> {
    let content = read_sysfs_file(path)?;
    first_number(&content).ok_or_else(|| MonitorError::ParseError {
        path: path.display().to_string(),
        detail: format!("expected a numeric value, got '{content}'"),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_first_number_plain() {
        assert_eq!(first_number("54321"), Some(54321.0));
        assert_eq!(first_number("  -12 "), Some(-12.0));
    }

    #[test]
    fn test_first_number_with_label_and_unit() {
        assert_eq!(first_number("fps: 59.9 duration:16000"), Some(59.9));
        assert_eq!(first_number("42 %"), Some(42.0));
    }

    #[test]
    fn test_first_number_none() {
        assert_eq!(first_number(""), None);
        assert_eq!(first_number("disabled"), None);
        assert_eq!(first_number("-"), None);
    }

    #[test]
    fn test_missing_file() {
        let result = read_number(Path::new("/nonexistent/gamebar/node"));
        assert!(matches!(result, Err(MonitorError::NotAvailable { .. })));
    }

    #[test]
    fn test_invalid_content() {
        let dir = tempfile::tempdir().unwrap();
        let p = dir.path().join("node");
        std::fs::write(&p, "not_a_number").unwrap();
        assert!(matches!(read_number(&p), Err(MonitorError::ParseError { .. })));
    }
}
