// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The per-tick [`MetricRow`] and its comma-separated encoding.

use crate::{Column, ColumnSet, Reading, RowError, HEADER};
use chrono::{NaiveDateTime, Timelike};

/// `chrono` format of the `DateTime` column.
pub const TIMESTAMP_FORMAT: &str = "%Y-%m-%d %H:%M:%S";

/// One sample of every metric, taken at a single tick.
///
/// All twelve metric fields are always present; a field that could not be
/// read holds [`Reading::Unavailable`]. Rows are never mutated after
/// assembly; masking produces a new row.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub struct MetricRow {
    /// Local wall-clock time of the tick, second resolution.
    pub timestamp: NaiveDateTime,
    /// Foreground subject at the tick (an application identifier).
    pub subject: String,
    pub fps: Reading,
    /// Derived from the same tick's `fps`.
    pub frame_time_ms: Reading,
    pub battery_temp_c: Reading,
    pub cpu_usage_pct: Reading,
    /// Current clock of every online core, in core order.
    pub cpu_clocks_mhz: Reading<Vec<u32>>,
    pub cpu_temp_c: Reading,
    pub ram_usage_mb: Reading,
    pub ram_speed_mhz: Reading,
    pub ram_temp_c: Reading,
    pub gpu_usage_pct: Reading,
    pub gpu_clock_mhz: Reading,
    pub gpu_temp_c: Reading,
}

/// Frame time in milliseconds for a given fps reading.
///
/// Non-positive and unavailable fps both yield `Unavailable`.
pub fn frame_time_from_fps(fps: &Reading) -> Reading {
    fps.clone().positive().map(|fps| 1000.0 / fps)
}

/// `subject` with every line break replaced by a space, so that a logged
/// row always occupies exactly one line.
pub fn single_line_subject(subject: impl Into<String>) -> String {
    let subject = subject.into();
    if subject.contains(['\n', '\r']) {
        subject.replace(['\n', '\r'], " ")
    } else {
        subject
    }
}

/// The header as a single comma-separated line.
pub fn header_line() -> String {
    HEADER.join(",")
}

impl MetricRow {
    /// A row with every metric unavailable.
    pub fn unavailable(timestamp: NaiveDateTime, subject: impl Into<String>) -> Self {
        Self {
            timestamp,
            subject: subject.into(),
            fps: Reading::Unavailable,
            frame_time_ms: Reading::Unavailable,
            battery_temp_c: Reading::Unavailable,
            cpu_usage_pct: Reading::Unavailable,
            cpu_clocks_mhz: Reading::Unavailable,
            cpu_temp_c: Reading::Unavailable,
            ram_usage_mb: Reading::Unavailable,
            ram_speed_mhz: Reading::Unavailable,
            ram_temp_c: Reading::Unavailable,
            gpu_usage_pct: Reading::Unavailable,
            gpu_clock_mhz: Reading::Unavailable,
            gpu_temp_c: Reading::Unavailable,
        }
    }

    /// Truncates the timestamp to whole seconds, rounds every numeric
    /// field to its column precision and flattens line breaks in the
    /// subject.
    pub fn normalized(self) -> Self {
        let q = |r: Reading, column: Column| r.quantized(column.precision());
        Self {
            timestamp: self.timestamp.with_nanosecond(0).unwrap_or(self.timestamp),
            subject: single_line_subject(self.subject),
            fps: q(self.fps, Column::Fps),
            frame_time_ms: q(self.frame_time_ms, Column::FrameTime),
            battery_temp_c: q(self.battery_temp_c, Column::BatteryTemp),
            cpu_usage_pct: q(self.cpu_usage_pct, Column::CpuUsage),
            cpu_clocks_mhz: self.cpu_clocks_mhz,
            cpu_temp_c: q(self.cpu_temp_c, Column::CpuTemp),
            ram_usage_mb: q(self.ram_usage_mb, Column::RamUsage),
            ram_speed_mhz: q(self.ram_speed_mhz, Column::RamSpeed),
            ram_temp_c: q(self.ram_temp_c, Column::RamTemp),
            gpu_usage_pct: q(self.gpu_usage_pct, Column::GpuUsage),
            gpu_clock_mhz: q(self.gpu_clock_mhz, Column::GpuClock),
            gpu_temp_c: q(self.gpu_temp_c, Column::GpuTemp),
        }
    }

    /// Returns a copy with every metric column outside `keep` replaced by
    /// `Unavailable`. `DateTime` and `PackageName` are always kept.
    pub fn masked(&self, keep: ColumnSet) -> Self {
        let pick = |column: Column, r: &Reading| {
            if keep.contains(column) {
                r.clone()
            } else {
                Reading::Unavailable
            }
        };
        Self {
            timestamp: self.timestamp,
            subject: self.subject.clone(),
            fps: pick(Column::Fps, &self.fps),
            frame_time_ms: pick(Column::FrameTime, &self.frame_time_ms),
            battery_temp_c: pick(Column::BatteryTemp, &self.battery_temp_c),
            cpu_usage_pct: pick(Column::CpuUsage, &self.cpu_usage_pct),
            cpu_clocks_mhz: if keep.contains(Column::CpuClock) {
                self.cpu_clocks_mhz.clone()
            } else {
                Reading::Unavailable
            },
            cpu_temp_c: pick(Column::CpuTemp, &self.cpu_temp_c),
            ram_usage_mb: pick(Column::RamUsage, &self.ram_usage_mb),
            ram_speed_mhz: pick(Column::RamSpeed, &self.ram_speed_mhz),
            ram_temp_c: pick(Column::RamTemp, &self.ram_temp_c),
            gpu_usage_pct: pick(Column::GpuUsage, &self.gpu_usage_pct),
            gpu_clock_mhz: pick(Column::GpuClock, &self.gpu_clock_mhz),
            gpu_temp_c: pick(Column::GpuTemp, &self.gpu_temp_c),
        }
    }

    /// The numeric reading stored in `column`, or `None` for the columns
    /// that are not scalar metrics.
    pub fn scalar(&self, column: Column) -> Option<&Reading> {
        match column {
            Column::Fps => Some(&self.fps),
            Column::FrameTime => Some(&self.frame_time_ms),
            Column::BatteryTemp => Some(&self.battery_temp_c),
            Column::CpuUsage => Some(&self.cpu_usage_pct),
            Column::CpuTemp => Some(&self.cpu_temp_c),
            Column::RamUsage => Some(&self.ram_usage_mb),
            Column::RamSpeed => Some(&self.ram_speed_mhz),
            Column::RamTemp => Some(&self.ram_temp_c),
            Column::GpuUsage => Some(&self.gpu_usage_pct),
            Column::GpuClock => Some(&self.gpu_clock_mhz),
            Column::GpuTemp => Some(&self.gpu_temp_c),
            Column::DateTime | Column::PackageName | Column::CpuClock => None,
        }
    }

    /// Formats every field, in header order.
    pub fn to_fields(&self) -> [String; 14] {
        Column::ALL.map(|column| match column {
            Column::DateTime => self.timestamp.format(TIMESTAMP_FORMAT).to_string(),
            Column::PackageName => self.subject.clone(),
            Column::CpuClock => self.cpu_clocks_mhz.format_list(),
            scalar => self
                .scalar(scalar)
                .map(|r| r.format(scalar.precision()))
                .unwrap_or_default(),
        })
    }

    /// Encodes the row as one comma-separated line (no trailing newline).
    ///
    /// Fields containing a comma, quote or line break are quoted.
    pub fn to_csv_line(&self) -> String {
        self.to_fields()
            .iter()
            .map(|f| escape_field(f))
            .collect::<Vec<_>>()
            .join(",")
    }

    /// Decodes a line produced by [`MetricRow::to_csv_line`].
    pub fn from_csv_line(line: &str) -> Result<Self, RowError> {
        let fields = split_csv_line(line)?;
        if fields.len() != HEADER.len() {
            return Err(RowError::FieldCount {
                expected: HEADER.len(),
                actual: fields.len(),
            });
        }

        let invalid = |column: Column, value: &str| RowError::InvalidValue {
            column: column.header(),
            value: value.to_string(),
        };
        let scalar = |column: Column| -> Result<Reading, RowError> {
            let raw = &fields[column.index()];
            Reading::parse(raw).ok_or_else(|| invalid(column, raw))
        };

        let raw_ts = &fields[Column::DateTime.index()];
        let timestamp = NaiveDateTime::parse_from_str(raw_ts, TIMESTAMP_FORMAT)
            .map_err(|_| invalid(Column::DateTime, raw_ts))?;
        let raw_clocks = &fields[Column::CpuClock.index()];
        let cpu_clocks_mhz =
            Reading::parse_list(raw_clocks).ok_or_else(|| invalid(Column::CpuClock, raw_clocks))?;

        Ok(Self {
            timestamp,
            subject: fields[Column::PackageName.index()].clone(),
            fps: scalar(Column::Fps)?,
            frame_time_ms: scalar(Column::FrameTime)?,
            battery_temp_c: scalar(Column::BatteryTemp)?,
            cpu_usage_pct: scalar(Column::CpuUsage)?,
            cpu_clocks_mhz,
            cpu_temp_c: scalar(Column::CpuTemp)?,
            ram_usage_mb: scalar(Column::RamUsage)?,
            ram_speed_mhz: scalar(Column::RamSpeed)?,
            ram_temp_c: scalar(Column::RamTemp)?,
            gpu_usage_pct: scalar(Column::GpuUsage)?,
            gpu_clock_mhz: scalar(Column::GpuClock)?,
            gpu_temp_c: scalar(Column::GpuTemp)?,
        })
    }
}

fn escape_field(field: &str) -> String {
    if field.contains([',', '"', '\n', '\r']) {
        format!("\"{}\"", field.replace('"', "\"\""))
    } else {
        field.to_string()
    }
}

/// Splits one comma-separated line into unescaped fields.
pub fn split_csv_line(line: &str) -> Result<Vec<String>, RowError> {
    let mut fields = Vec::new();
    let mut current = String::new();
    let mut in_quotes = false;
    let mut chars = line.chars().peekable();

    while let Some(c) = chars.next() {
        match (c, in_quotes) {
            ('"', true) if chars.peek() == Some(&'"') => {
                current.push('"');
                chars.next();
            }
            ('"', true) => in_quotes = false,
            ('"', false) if current.is_empty() => in_quotes = true,
            (',', false) => fields.push(std::mem::take(&mut current)),
            (c, _) => current.push(c),
        }
    }
    if in_quotes {
        return Err(RowError::UnterminatedQuote);
    }
    fields.push(current);
    Ok(fields)
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::NaiveDate;

    fn ts() -> NaiveDateTime {
        NaiveDate::from_ymd_opt(2025, 3, 14)
            .unwrap()
            .and_hms_opt(9, 26, 53)
            .unwrap()
    }

    fn sample_row() -> MetricRow {
        let fps = Reading::Value(60.0);
        MetricRow {
            timestamp: ts(),
            subject: "com.example.game".into(),
            frame_time_ms: frame_time_from_fps(&fps),
            fps,
            battery_temp_c: Reading::Value(34.5),
            cpu_usage_pct: Reading::Value(42.0),
            cpu_clocks_mhz: Reading::Value(vec![1804, 1804, 2419, 2841]),
            cpu_temp_c: Reading::Value(51.25),
            ram_usage_mb: Reading::Value(3120.0),
            ram_speed_mhz: Reading::Unavailable,
            ram_temp_c: Reading::Unavailable,
            gpu_usage_pct: Reading::Value(77.0),
            gpu_clock_mhz: Reading::Value(585.0),
            gpu_temp_c: Reading::Value(49.9),
        }
        .normalized()
    }

    #[test]
    fn test_header_line() {
        let header = header_line();
        assert!(header.starts_with("DateTime,PackageName,FPS,Frame_Time"));
        assert_eq!(header.split(',').count(), 14);
    }

    #[test]
    fn test_frame_time_from_fps() {
        assert_eq!(
            frame_time_from_fps(&Reading::Value(30.0)).quantized(2),
            Reading::Value(33.33)
        );
        assert_eq!(frame_time_from_fps(&Reading::Value(0.0)), Reading::Unavailable);
        assert_eq!(frame_time_from_fps(&Reading::Unavailable), Reading::Unavailable);
    }

    #[test]
    fn test_fields_always_fourteen() {
        let row = MetricRow::unavailable(ts(), "pkg");
        let fields = row.to_fields();
        assert_eq!(fields.len(), 14);
        assert!(fields.iter().all(|f| !f.is_empty()));
        assert_eq!(fields[2], "N/A");
    }

    #[test]
    fn test_csv_line_format() {
        let line = sample_row().to_csv_line();
        assert_eq!(
            line,
            "2025-03-14 09:26:53,com.example.game,60,16.67,34.5,42,1804; 1804; 2419; 2841,51.3,3120,N/A,N/A,77,585,49.9"
        );
    }

    #[test]
    fn test_csv_parse_reproduces_row() {
        let row = sample_row();
        let back = MetricRow::from_csv_line(&row.to_csv_line()).unwrap();
        assert_eq!(back, row);
    }

    #[test]
    fn test_csv_quoted_subject() {
        let mut row = sample_row();
        row.subject = "odd,\"name\"".into();
        let line = row.to_csv_line();
        let back = MetricRow::from_csv_line(&line).unwrap();
        assert_eq!(back.subject, "odd,\"name\"");
    }

    #[test]
    fn test_normalized_flattens_line_breaks() {
        let mut row = sample_row();
        row.subject = "com.a\r\nnext".into();
        let row = row.normalized();
        assert_eq!(row.subject, "com.a  next");
        let line = row.to_csv_line();
        assert_eq!(line.lines().count(), 1);
        assert_eq!(MetricRow::from_csv_line(&line).unwrap(), row);
    }

    #[test]
    fn test_csv_wrong_field_count() {
        let result = MetricRow::from_csv_line("a,b,c");
        assert!(matches!(
            result,
            Err(RowError::FieldCount { expected: 14, actual: 3 })
        ));
    }

    #[test]
    fn test_csv_invalid_value() {
        let line = sample_row().to_csv_line().replacen(",60,", ",Err,", 1);
        let result = MetricRow::from_csv_line(&line);
        assert!(matches!(
            result,
            Err(RowError::InvalidValue { column: "FPS", .. })
        ));
    }

    #[test]
    fn test_unterminated_quote() {
        assert!(matches!(
            split_csv_line("\"abc,def"),
            Err(RowError::UnterminatedQuote)
        ));
    }

    #[test]
    fn test_masked_keeps_identity_columns() {
        let row = sample_row();
        let masked = row.masked(ColumnSet::empty());
        assert_eq!(masked.timestamp, row.timestamp);
        assert_eq!(masked.subject, row.subject);
        assert_eq!(masked.fps, Reading::Unavailable);
        assert_eq!(masked.cpu_clocks_mhz, Reading::Unavailable);

        let partial = row.masked(ColumnSet::all().without(Column::GpuTemp));
        assert_eq!(partial.fps, row.fps);
        assert_eq!(partial.gpu_temp_c, Reading::Unavailable);
    }
}
