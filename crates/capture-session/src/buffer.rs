// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Bounded, header-prefixed row buffer.
//!
//! A [`SessionBuffer`] holds the data rows of one session; the column
//! header is implicit and always written first on export. When the number
//! of data rows reaches the ceiling, the oldest half is dropped in one
//! batch before the new row is appended, which bounds memory at
//! `ceiling` rows while keeping the most recent history.

use metric_row::{MetricRow, HEADER};

/// Default row ceiling per session.
pub const DEFAULT_ROW_CEILING: usize = 5000;

/// Smallest ceiling that still makes room on eviction.
const MIN_CEILING: usize = 2;

/// The rows accumulated by one session.
#[derive(Debug, Clone)]
pub struct SessionBuffer {
    rows: Vec<MetricRow>,
    ceiling: usize,
    evicted_total: u64,
}

impl SessionBuffer {
    /// Creates an empty buffer. Ceilings below 2 are raised to 2.
    pub fn new(ceiling: usize) -> Self {
        let ceiling = ceiling.max(MIN_CEILING);
        Self {
            rows: Vec::with_capacity(ceiling.min(64)),
            ceiling,
            evicted_total: 0,
        }
    }

    /// The column header every export starts with.
    pub fn header(&self) -> &'static [&'static str; 14] {
        &HEADER
    }

    /// Appends a row, evicting the oldest half first if the buffer is full.
    ///
    /// Returns the number of rows evicted by this call.
    pub fn push(&mut self, row: MetricRow) -> usize {
        let mut evicted = 0;
        if self.rows.len() >= self.ceiling {
            evicted = self.rows.len() / 2;
            self.rows.drain(..evicted);
            self.evicted_total += evicted as u64;
        }
        self.rows.push(row);
        evicted
    }

    /// Number of data rows (the header is not counted).
    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    pub fn ceiling(&self) -> usize {
        self.ceiling
    }

    /// Total rows dropped by eviction over the buffer's lifetime.
    pub fn evicted_total(&self) -> u64 {
        self.evicted_total
    }

    pub fn rows(&self) -> &[MetricRow] {
        &self.rows
    }

    pub fn into_rows(self) -> Vec<MetricRow> {
        self.rows
    }
}
