// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Projection of a row onto the overlay's stat lines.

use crate::OverlayFormat;
use metric_row::{Column, ColumnSet, MetricRow};

/// Separator between stats in the minimal format.
pub const MINIMAL_SEPARATOR: &str = " · ";

/// One displayed stat.
#[derive(Debug, Clone, PartialEq, Eq, serde::Serialize)]
pub struct StatLine {
    pub column: Column,
    pub title: &'static str,
    /// Value with its unit, or `N/A`.
    pub value: String,
}

/// Display title and unit suffix for each metric column, in overlay order.
const STATS: [(Column, &str, &str); 12] = [
    (Column::Fps, "FPS", ""),
    (Column::FrameTime, "Frame Time", "ms"),
    (Column::BatteryTemp, "Temp", "°C"),
    (Column::CpuUsage, "CPU", "%"),
    (Column::CpuClock, "CPU Clock", ""),
    (Column::CpuTemp, "CPU Temp", "°C"),
    (Column::RamUsage, "RAM", " MB"),
    (Column::RamSpeed, "RAM Freq", "MHz"),
    (Column::RamTemp, "RAM Temp", "°C"),
    (Column::GpuUsage, "GPU", "%"),
    (Column::GpuClock, "GPU Freq", "MHz"),
    (Column::GpuTemp, "GPU Temp", "°C"),
];

/// Stat lines for every column in `toggles`, in overlay order.
pub fn stat_lines(row: &MetricRow, toggles: ColumnSet) -> Vec<StatLine> {
    STATS
        .iter()
        .filter(|(column, _, _)| toggles.contains(*column))
        .map(|&(column, title, unit)| StatLine {
            column,
            title,
            value: value_text(row, column, unit),
        })
        .collect()
}

fn value_text(row: &MetricRow, column: Column, unit: &str) -> String {
    if column == Column::CpuClock {
        return row.cpu_clocks_mhz.format_list();
    }
    match row.scalar(column) {
        Some(reading) if reading.is_available() => {
            format!("{}{unit}", reading.format(column.precision()))
        }
        _ => metric_row::UNAVAILABLE.to_string(),
    }
}

/// Renders a row as text lines: one per stat in the full format, a single
/// line of bare values in the minimal format.
pub fn render(row: &MetricRow, toggles: ColumnSet, format: OverlayFormat) -> Vec<String> {
    let lines = stat_lines(row, toggles);
    match format {
        OverlayFormat::Full => lines
            .into_iter()
            .map(|l| format!("{} {}", l.title, l.value))
            .collect(),
        OverlayFormat::Minimal if lines.is_empty() => Vec::new(),
        OverlayFormat::Minimal => vec![lines
            .into_iter()
            .map(|l| l.value)
            .collect::<Vec<_>>()
            .join(MINIMAL_SEPARATOR)],
    }
}

/// Renders rows with a fixed toggle set and format.
#[derive(Debug, Clone, Copy)]
pub struct OverlayFormatter {
    toggles: ColumnSet,
    format: OverlayFormat,
}

impl OverlayFormatter {
    pub fn new(toggles: ColumnSet, format: OverlayFormat) -> Self {
        Self { toggles, format }
    }

    pub fn toggles(&self) -> ColumnSet {
        self.toggles
    }

    pub fn format(&self) -> OverlayFormat {
        self.format
    }

    /// Flips between the full and minimal formats.
    pub fn toggle_format(&mut self) {
        self.format = match self.format {
            OverlayFormat::Full => OverlayFormat::Minimal,
            OverlayFormat::Minimal => OverlayFormat::Full,
        };
    }

    pub fn render(&self, row: &MetricRow) -> Vec<String> {
        render(row, self.toggles, self.format)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;
    use metric_row::Reading;

    fn row() -> MetricRow {
        let ts = NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(9, 26, 53)
            .unwrap();
        let mut r = MetricRow::unavailable(ts, "com.a");
        r.fps = Reading::Value(60.0);
        r.frame_time_ms = Reading::Value(16.67);
        r.battery_temp_c = Reading::Value(34.5);
        r.cpu_usage_pct = Reading::Value(42.0);
        r.cpu_clocks_mhz = Reading::Value(vec![1804, 2419]);
        r.ram_usage_mb = Reading::Value(3120.0);
        r.gpu_clock_mhz = Reading::Value(585.0);
        r
    }

    #[test]
    fn test_full_format_units() {
        let all = ColumnSet::all();
        let lines = render(&row(), all, OverlayFormat::Full);
        assert_eq!(lines.len(), 12);
        assert_eq!(lines[0], "FPS 60");
        assert_eq!(lines[1], "Frame Time 16.67ms");
        assert_eq!(lines[2], "Temp 34.5°C");
        assert_eq!(lines[3], "CPU 42%");
        assert_eq!(lines[4], "CPU Clock 1804; 2419");
        assert_eq!(lines[5], "CPU Temp N/A");
        assert_eq!(lines[6], "RAM 3120 MB");
        assert_eq!(lines[10], "GPU Freq 585MHz");
    }

    #[test]
    fn test_toggles_filter_lines() {
        let toggles = ColumnSet::empty()
            .with(Column::Fps)
            .with(Column::GpuUsage);
        let lines = stat_lines(&row(), toggles);
        let titles: Vec<&str> = lines.iter().map(|l| l.title).collect();
        assert_eq!(titles, vec!["FPS", "GPU"]);
        assert_eq!(lines[1].value, "N/A");
    }

    #[test]
    fn test_minimal_format() {
        let toggles = ColumnSet::empty()
            .with(Column::Fps)
            .with(Column::CpuUsage)
            .with(Column::GpuUsage);
        let lines = render(&row(), toggles, OverlayFormat::Minimal);
        assert_eq!(lines, vec!["60 · 42% · N/A".to_string()]);
        assert!(render(&row(), ColumnSet::empty(), OverlayFormat::Minimal).is_empty());
    }

    #[test]
    fn test_formatter_toggle() {
        let mut f = OverlayFormatter::new(ColumnSet::empty().with(Column::Fps), OverlayFormat::Full);
        assert_eq!(f.render(&row()), vec!["FPS 60".to_string()]);
        f.toggle_format();
        assert_eq!(f.format(), OverlayFormat::Minimal);
        assert_eq!(f.render(&row()), vec!["60".to_string()]);
    }
}
