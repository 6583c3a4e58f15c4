// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! The measured-or-unavailable value type.

/// Text written in place of a value that could not be read.
pub const UNAVAILABLE: &str = "N/A";

/// One metric value for one tick.
///
/// `Unavailable` is distinct from zero: a CPU at 0% load is
/// `Value(0.0)`, an unreadable CPU counter is `Unavailable`.
#[derive(Debug, Clone, PartialEq, serde::Serialize)]
pub enum Reading<T = f64> {
    /// A value measured this tick.
    Value(T),
    /// The source could not be read this tick.
    Unavailable,
}

impl<T> Reading<T> {
    /// Returns `true` if a value was measured.
    pub fn is_available(&self) -> bool {
        matches!(self, Reading::Value(_))
    }

    /// Returns the measured value, if any.
    pub fn value(&self) -> Option<&T> {
        match self {
            Reading::Value(v) => Some(v),
            Reading::Unavailable => None,
        }
    }

    /// Maps the measured value, keeping `Unavailable` as-is.
    pub fn map<U>(self, f: impl FnOnce(T) -> U) -> Reading<U> {
        match self {
            Reading::Value(v) => Reading::Value(f(v)),
            Reading::Unavailable => Reading::Unavailable,
        }
    }

    /// Converts a read result into a reading, discarding the error.
    pub fn from_result<E>(result: Result<T, E>) -> Self {
        match result {
            Ok(v) => Reading::Value(v),
            Err(_) => Reading::Unavailable,
        }
    }
}

impl<T> Default for Reading<T> {
    fn default() -> Self {
        Reading::Unavailable
    }
}

impl<T> From<Option<T>> for Reading<T> {
    fn from(value: Option<T>) -> Self {
        match value {
            Some(v) => Reading::Value(v),
            None => Reading::Unavailable,
        }
    }
}

impl Reading<f64> {
    /// Rounds the value to `decimals` places.
    ///
    /// Non-finite values become `Unavailable`.
    pub fn quantized(self, decimals: u32) -> Self {
        match self {
            Reading::Value(v) if v.is_finite() => {
                let scale = 10f64.powi(decimals as i32);
                Reading::Value((v * scale).round() / scale)
            }
            _ => Reading::Unavailable,
        }
    }

    /// Keeps only strictly positive values.
    pub fn positive(self) -> Self {
        match self {
            Reading::Value(v) if v > 0.0 => Reading::Value(v),
            _ => Reading::Unavailable,
        }
    }

    /// Formats the value with `decimals` places, or [`UNAVAILABLE`].
    pub fn format(&self, decimals: u32) -> String {
        match self {
            Reading::Value(v) => format!("{:.*}", decimals as usize, v),
            Reading::Unavailable => UNAVAILABLE.to_string(),
        }
    }

    /// Parses a formatted value; [`UNAVAILABLE`] yields `Unavailable`.
    pub fn parse(s: &str) -> Option<Self> {
        let s = s.trim();
        if s == UNAVAILABLE {
            return Some(Reading::Unavailable);
        }
        s.parse::<f64>().ok().map(Reading::Value)
    }
}

impl Reading<Vec<u32>> {
    /// Formats a per-core list as `"1800; 1800; 2400"`, or [`UNAVAILABLE`].
    pub fn format_list(&self) -> String {
        match self {
            Reading::Value(list) if !list.is_empty() => list
                .iter()
                .map(|v| v.to_string())
                .collect::<Vec<_>>()
                .join("; "),
            _ => UNAVAILABLE.to_string(),
        }
    }

    /// Parses a list produced by [`Reading::format_list`].
    pub fn parse_list(s: &str) -> Option<Self> {
        let s = s.trim();
        if s == UNAVAILABLE {
            return Some(Reading::Unavailable);
        }
        s.split(';')
            .map(|part| part.trim().parse::<u32>().ok())
            .collect::<Option<Vec<_>>>()
            .map(Reading::Value)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_quantize_rounds_half_away() {
        let r = Reading::Value(1000.0_f64 / 60.0).quantized(2);
        assert_eq!(r, Reading::Value(16.67));
        assert_eq!(r.format(2), "16.67");
    }

    #[test]
    fn test_quantize_non_finite() {
        assert_eq!(Reading::Value(f64::NAN).quantized(1), Reading::Unavailable);
        assert_eq!(Reading::Value(f64::INFINITY).quantized(0), Reading::Unavailable);
    }

    #[test]
    fn test_positive() {
        assert_eq!(Reading::Value(30.0_f64).positive(), Reading::Value(30.0));
        assert_eq!(Reading::Value(0.0_f64).positive(), Reading::Unavailable);
        assert_eq!(Reading::Value(-1.0_f64).positive(), Reading::Unavailable);
        assert_eq!(Reading::<f64>::Unavailable.positive(), Reading::Unavailable);
    }

    #[test]
    fn test_parse_sentinel_distinct_from_zero() {
        assert_eq!(Reading::parse("N/A"), Some(Reading::Unavailable));
        assert_eq!(Reading::parse("0"), Some(Reading::Value(0.0)));
        assert_eq!(Reading::parse("Err"), None);
    }

    #[test]
    fn test_list_format_and_parse() {
        let clocks = Reading::Value(vec![1800, 1800, 2400]);
        let text = clocks.format_list();
        assert_eq!(text, "1800; 1800; 2400");
        assert_eq!(Reading::parse_list(&text), Some(clocks));
        assert_eq!(Reading::<Vec<u32>>::Value(vec![]).format_list(), "N/A");
        assert_eq!(Reading::parse_list("1800; x"), None);
    }

    #[test]
    fn test_from_result() {
        let ok: Result<f64, ()> = Ok(3.5);
        let err: Result<f64, ()> = Err(());
        assert_eq!(Reading::from_result(ok), Reading::Value(3.5));
        assert_eq!(Reading::from_result(err), Reading::Unavailable);
    }
}
