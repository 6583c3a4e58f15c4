// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Session identity.

/// Identity under which rows are grouped into a session.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum SessionKey {
    /// The single device-wide session used in `Global` mode.
    Global,
    /// One application, by identifier.
    App(String),
}

impl SessionKey {
    /// Key for an application. Line breaks in `id` become spaces, matching
    /// the subject of a normalized row.
    pub fn app(id: impl Into<String>) -> Self {
        SessionKey::App(metric_row::single_line_subject(id))
    }

    pub fn is_global(&self) -> bool {
        matches!(self, SessionKey::Global)
    }

    /// The application identifier, or `None` for the global key.
    pub fn app_id(&self) -> Option<&str> {
        match self {
            SessionKey::Global => None,
            SessionKey::App(id) => Some(id),
        }
    }
}

impl std::fmt::Display for SessionKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        match self {
            SessionKey::Global => f.write_str("<global>"),
            SessionKey::App(id) => f.write_str(id),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_key_identity() {
        assert!(SessionKey::Global.is_global());
        assert_eq!(SessionKey::app("com.a").app_id(), Some("com.a"));
        assert_eq!(SessionKey::Global.app_id(), None);
        assert_ne!(SessionKey::app("com.a"), SessionKey::app("com.b"));
        assert_eq!(SessionKey::app("com.a").to_string(), "com.a");
    }

    #[test]
    fn test_app_key_matches_row_subject() {
        assert_eq!(SessionKey::app("com.a\nx"), SessionKey::app("com.a x"));
    }
}
