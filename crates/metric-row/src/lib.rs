// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # metric-row
//!
//! The unit of data flowing through the overlay: one [`MetricRow`] per
//! sample tick.
//!
//! This crate provides:
//! - [`Reading`]: a measured value or the typed `Unavailable` sentinel.
//! - [`MetricRow`]: the fixed 14-field record produced by every tick.
//! - [`Column`] / [`ColumnSet`]: the column header, per-column precision
//!   and masks used to select which columns are logged.
//! - A comma-separated line codec used by the exporter and log readers.
//!
//! # Round-trip Guarantee
//! Rows are quantized to their column precision when assembled
//! ([`MetricRow::normalized`]), so `MetricRow::from_csv_line(&row.to_csv_line())`
//! reproduces the row field-for-field, sentinels included.

mod column;
mod error;
mod reading;
mod row;

pub use column::{Column, ColumnSet, HEADER};
pub use error::RowError;
pub use reading::{Reading, UNAVAILABLE};
pub use row::{
    frame_time_from_fps, header_line, single_line_subject, split_csv_line, MetricRow,
    TIMESTAMP_FORMAT,
};
