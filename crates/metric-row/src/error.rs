// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Error types for row parsing.

/// Errors that can occur when decoding a comma-separated row.
#[derive(Debug, thiserror::Error)]
pub enum RowError {
    /// The line does not have exactly one field per header column.
    #[error("expected {expected} fields, got {actual}")]
    FieldCount { expected: usize, actual: usize },

    /// A field could not be parsed as the column's value type.
    #[error("invalid value for column '{column}': '{value}'")]
    InvalidValue { column: &'static str, value: String },

    /// A quoted field was opened but never closed.
    #[error("unterminated quoted field")]
    UnterminatedQuote,
}
