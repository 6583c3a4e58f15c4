// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Benchmarks for row append and ceiling eviction.

use capture_session::{Exporter, ExportError, OverlayGate, SessionBuffer, SessionKey, SessionManager, SessionOrigin};
use chrono::NaiveDate;
use criterion::{black_box, criterion_group, criterion_main, BatchSize, Criterion};
use metric_row::{MetricRow, Reading};
use std::path::PathBuf;
use std::sync::Arc;

struct NullExporter;

impl Exporter for NullExporter {
    fn flush(&self, _key: &SessionKey, _rows: &[MetricRow]) -> Result<PathBuf, ExportError> {
        Ok(PathBuf::new())
    }
}

fn sample_row() -> MetricRow {
    let ts = NaiveDate::from_ymd_opt(2025, 3, 14)
        .and_then(|d| d.and_hms_opt(9, 26, 53))
        .unwrap_or_default();
    let mut row = MetricRow::unavailable(ts, "com.example.game");
    row.fps = Reading::Value(60.0);
    row.frame_time_ms = Reading::Value(16.67);
    row.cpu_clocks_mhz = Reading::Value(vec![1804, 1804, 2419, 2841]);
    row
}

fn bench_buffer_push(c: &mut Criterion) {
    let row = sample_row();
    c.bench_function("buffer_push_to_ceiling_5000", |b| {
        b.iter_batched(
            || SessionBuffer::new(5000),
            |mut buf| {
                for _ in 0..5001 {
                    black_box(buf.push(row.clone()));
                }
                buf
            },
            BatchSize::SmallInput,
        )
    });
}

fn bench_manager_append(c: &mut Criterion) {
    let row = sample_row();
    let manager = SessionManager::new(5000, OverlayGate::new(true), Arc::new(NullExporter));
    let key = SessionKey::app("com.example.game");
    manager.begin_session(key.clone(), SessionOrigin::Automatic);
    c.bench_function("manager_append_row", |b| {
        b.iter(|| black_box(manager.append_row(&key, row.clone())))
    });
}

criterion_group!(benches, bench_buffer_push, bench_manager_append);
criterion_main!(benches);
