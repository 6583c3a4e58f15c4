// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Column header, precision and column masks.

/// The fixed 14-column header, in [`MetricRow`](crate::MetricRow) field order.
pub const HEADER: [&str; 14] = [
    "DateTime",
    "PackageName",
    "FPS",
    "Frame_Time",
    "Battery_Temp",
    "CPU_Usage",
    "CPU_Clock",
    "CPU_Temp",
    "RAM_Usage",
    "RAM_Speed",
    "RAM_Temp",
    "GPU_Usage",
    "GPU_Clock",
    "GPU_Temp",
];

/// One column of a [`MetricRow`](crate::MetricRow).
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, serde::Serialize)]
pub enum Column {
    DateTime,
    PackageName,
    Fps,
    FrameTime,
    BatteryTemp,
    CpuUsage,
    CpuClock,
    CpuTemp,
    RamUsage,
    RamSpeed,
    RamTemp,
    GpuUsage,
    GpuClock,
    GpuTemp,
}

impl Column {
    /// All columns in header order.
    pub const ALL: [Column; 14] = [
        Column::DateTime,
        Column::PackageName,
        Column::Fps,
        Column::FrameTime,
        Column::BatteryTemp,
        Column::CpuUsage,
        Column::CpuClock,
        Column::CpuTemp,
        Column::RamUsage,
        Column::RamSpeed,
        Column::RamTemp,
        Column::GpuUsage,
        Column::GpuClock,
        Column::GpuTemp,
    ];

    /// Position of this column in the header.
    pub fn index(self) -> usize {
        self as usize
    }

    /// Header text for this column.
    pub fn header(self) -> &'static str {
        HEADER[self.index()]
    }

    /// Decimal places used when formatting this column's value.
    ///
    /// Returns `0` for the non-numeric columns.
    pub fn precision(self) -> u32 {
        match self {
            Column::FrameTime => 2,
            Column::BatteryTemp | Column::CpuTemp | Column::RamTemp | Column::GpuTemp => 1,
            _ => 0,
        }
    }

    /// Returns `true` for the twelve measured columns (everything except
    /// the timestamp and the subject).
    pub fn is_metric(self) -> bool {
        !matches!(self, Column::DateTime | Column::PackageName)
    }
}

/// A set of columns, stored as a bitmask.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct ColumnSet(u16);

impl ColumnSet {
    /// The empty set.
    pub const fn empty() -> Self {
        Self(0)
    }

    /// Every column.
    pub const fn all() -> Self {
        Self((1 << 14) - 1)
    }

    /// Returns this set with `column` added.
    pub fn with(self, column: Column) -> Self {
        Self(self.0 | (1 << column.index()))
    }

    /// Returns this set with `column` removed.
    pub fn without(self, column: Column) -> Self {
        Self(self.0 & !(1 << column.index()))
    }

    /// Returns `true` if `column` is in the set.
    pub fn contains(self, column: Column) -> bool {
        self.0 & (1 << column.index()) != 0
    }

    /// Number of columns in the set.
    pub fn len(self) -> usize {
        self.0.count_ones() as usize
    }

    /// Returns `true` if the set is empty.
    pub fn is_empty(self) -> bool {
        self.0 == 0
    }
}

impl Default for ColumnSet {
    fn default() -> Self {
        Self::all()
    }
}

impl FromIterator<Column> for ColumnSet {
    fn from_iter<I: IntoIterator<Item = Column>>(iter: I) -> Self {
        iter.into_iter().fold(Self::empty(), Self::with)
    }
}
