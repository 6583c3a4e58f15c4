// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! # capture-session
//!
//! Decides, per sample tick, whether a row is buffered, bounded and
//! eventually flushed to a log file.
//!
//! # Key Components
//!
//! - [`SessionManager`]: owns one bounded [`SessionBuffer`] per actively
//!   logged [`SessionKey`]. All map mutations go through a sharded
//!   `DashMap`, so begin/append/end are linearizable per key without a
//!   global lock across unrelated keys.
//! - [`CaptureController`]: the global on/off switch, in one of two
//!   [`LoggingMode`]s: `Global` (one device-wide session) or `PerApp`
//!   (sessions follow the foreground application, gated by the
//!   [`EnabledSet`]).
//! - [`Exporter`] / [`CsvExporter`]: serialises a finished session to a
//!   new comma-separated file; [`LogIndex`] lists the files written.
//! - [`SessionEvent`]: typed notifications published on a broadcast
//!   channel; presentation layers decide how to surface them.
//!
//! # Session Lifecycle
//!
//! ```text
//!   Idle ──begin_session──► Active ──end_session──► Idle
//!                            │  ▲                    │
//!                            └──┘ append_row         └─► Exporter::flush
//! ```
//!
//! `end_session` removes the buffer from the live map before exporting
//! it, so a new session for the same key can start while the old buffer
//! is still being written.

mod buffer;
mod capture;
mod enabled;
mod error;
mod event;
mod exporter;
mod index;
mod key;
mod manager;

pub use buffer::{SessionBuffer, DEFAULT_ROW_CEILING};
pub use capture::{CaptureController, GestureOutcome, LoggingMode};
pub use enabled::{EnabledSet, PersistedState};
pub use error::{CaptureError, ExportError, LogReadError};
pub use event::{EventBus, Notice, RefusalReason, SessionEvent};
pub use exporter::{file_name_for, CsvExporter, Exporter, FILE_STAMP_FORMAT};
pub use index::{read_rows, LogFile, LogIndex};
pub use key::SessionKey;
pub use manager::{
    BeginOutcome, EndedSession, FlushOutcome, OverlayGate, SessionManager, SessionOrigin,
    ToggleOutcome,
};
