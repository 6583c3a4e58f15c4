// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Session state machine over the live session map.
//!
//! Each key is either absent (idle) or present with one buffer (active).
//! Transitions for a single key go through the map's entry API, so two
//! concurrent `begin_session` calls for the same key produce exactly one
//! session. Foreground transitions (end old, begin new) additionally hold
//! `transition` so an end and the following begin are observed together.
//!
//! Lock order: `transition` before any map shard. Events are published
//! after the map guard is released.

use crate::{EventBus, Exporter, RefusalReason, SessionBuffer, SessionEvent, SessionKey};
use chrono::NaiveDateTime;
use dashmap::mapref::entry::Entry;
use dashmap::DashMap;
use metric_row::MetricRow;
use parking_lot::Mutex;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tokio::sync::broadcast;

/// How a session came to exist.
#[derive(Debug, Clone, Copy, PartialEq, Eq, serde::Serialize)]
#[serde(rename_all = "snake_case")]
pub enum SessionOrigin {
    /// Started by the capture controller (global start or foreground change).
    Automatic,
    /// Started by an explicit user toggle.
    Manual,
}

/// Shared flag telling the session layer whether the overlay is visible.
///
/// Sessions only begin while the overlay is shown; hiding it does not end
/// sessions already running.
#[derive(Debug, Clone, Default)]
pub struct OverlayGate(Arc<AtomicBool>);

impl OverlayGate {
    pub fn new(visible: bool) -> Self {
        Self(Arc::new(AtomicBool::new(visible)))
    }

    pub fn set_visible(&self, visible: bool) {
        self.0.store(visible, Ordering::SeqCst);
    }

    pub fn is_visible(&self) -> bool {
        self.0.load(Ordering::SeqCst)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum BeginOutcome {
    Started,
    /// A session for the key already exists; nothing changed.
    AlreadyActive,
    Refused(RefusalReason),
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ToggleOutcome {
    Started,
    Stopped(EndedSession),
    Refused(RefusalReason),
}

/// What happened to a session's rows when it ended.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum FlushOutcome {
    /// No data rows; nothing was written.
    Empty,
    Exported(PathBuf),
    Failed(String),
}

/// Summary of a session that has left the live map.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndedSession {
    pub key: SessionKey,
    pub origin: SessionOrigin,
    pub rows: usize,
    pub outcome: FlushOutcome,
}

struct Session {
    origin: SessionOrigin,
    started_at: NaiveDateTime,
    buffer: SessionBuffer,
}

/// Owns every active session and its bounded buffer.
pub struct SessionManager {
    sessions: DashMap<SessionKey, Session>,
    ceiling: usize,
    gate: OverlayGate,
    exporter: Arc<dyn Exporter>,
    events: EventBus,
    transition: Mutex<()>,
}

impl SessionManager {
    pub fn new(ceiling: usize, gate: OverlayGate, exporter: Arc<dyn Exporter>) -> Self {
        Self::with_events(ceiling, gate, exporter, EventBus::new())
    }

    pub fn with_events(
        ceiling: usize,
        gate: OverlayGate,
        exporter: Arc<dyn Exporter>,
        events: EventBus,
    ) -> Self {
        Self {
            sessions: DashMap::new(),
            ceiling,
            gate,
            exporter,
            events,
            transition: Mutex::new(()),
        }
    }

    pub fn gate(&self) -> &OverlayGate {
        &self.gate
    }

    pub fn events(&self) -> &EventBus {
        &self.events
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.events.subscribe()
    }

    /// Starts a session for `key` if none is active and the overlay is shown.
    pub fn begin_session(&self, key: SessionKey, origin: SessionOrigin) -> BeginOutcome {
        let outcome = match self.sessions.entry(key.clone()) {
            Entry::Occupied(_) => BeginOutcome::AlreadyActive,
            Entry::Vacant(_) if !self.gate.is_visible() => {
                BeginOutcome::Refused(RefusalReason::OverlayHidden)
            }
            Entry::Vacant(slot) => {
                slot.insert(Session {
                    origin,
                    started_at: chrono::Local::now().naive_local(),
                    buffer: SessionBuffer::new(self.ceiling),
                });
                BeginOutcome::Started
            }
        };

        match &outcome {
            BeginOutcome::Started => {
                tracing::info!("session started for {key} ({origin:?})");
                self.events.publish(SessionEvent::SessionStarted { key, origin });
            }
            BeginOutcome::Refused(reason) => {
                tracing::warn!("refusing to start session for {key}: overlay is hidden");
                self.events.publish(SessionEvent::SessionRefused {
                    key,
                    reason: *reason,
                });
            }
            BeginOutcome::AlreadyActive => {
                tracing::debug!("session for {key} already active");
            }
        }
        outcome
    }

    /// Appends a row to the session for `key`. Returns `false` when no
    /// session is active for it.
    pub fn append_row(&self, key: &SessionKey, row: MetricRow) -> bool {
        let Some(mut session) = self.sessions.get_mut(key) else {
            return false;
        };
        let evicted = session.buffer.push(row);
        if evicted > 0 {
            tracing::debug!(
                "session {key} reached {} rows, evicted {evicted} oldest",
                session.buffer.ceiling()
            );
        }
        true
    }

    /// Ends the session for `key` and exports its rows.
    ///
    /// The session is removed from the live map before export starts.
    /// Returns `None` when no session was active.
    pub fn end_session(&self, key: &SessionKey) -> Option<EndedSession> {
        let (key, session) = self.sessions.remove(key)?;
        let rows = session.buffer.len();
        tracing::info!(
            "session ended for {key} after {rows} rows (started {})",
            session.started_at.format(metric_row::TIMESTAMP_FORMAT)
        );
        self.events.publish(SessionEvent::SessionEnded {
            key: key.clone(),
            rows,
        });

        let outcome = if rows == 0 {
            FlushOutcome::Empty
        } else {
            let buffered = session.buffer.into_rows();
            match self.exporter.flush(&key, &buffered) {
                Ok(path) => {
                    self.events.publish(SessionEvent::Exported {
                        key: key.clone(),
                        path: path.clone(),
                    });
                    FlushOutcome::Exported(path)
                }
                Err(e) => {
                    tracing::error!("export failed for {key}: {e}");
                    self.events.publish(SessionEvent::ExportFailed {
                        key: key.clone(),
                        error: e.to_string(),
                    });
                    FlushOutcome::Failed(e.to_string())
                }
            }
        };

        Some(EndedSession {
            key,
            origin: session.origin,
            rows,
            outcome,
        })
    }

    /// Ends every active session, in key order.
    pub fn end_all(&self) -> Vec<EndedSession> {
        let _guard = self.transition.lock();
        self.active_keys()
            .iter()
            .filter_map(|key| self.end_session(key))
            .collect()
    }

    /// Runs `decide` under the transition lock and ends the session for
    /// `key` when it returns `true`. Returns the decision and the ended
    /// session, if one was active.
    pub fn end_if(
        &self,
        key: &SessionKey,
        decide: impl FnOnce() -> bool,
    ) -> (bool, Option<EndedSession>) {
        let _guard = self.transition.lock();
        if !decide() {
            return (false, None);
        }
        (true, self.end_session(key))
    }

    /// Starts a manual session for `key`, or ends it if one is active.
    pub fn toggle_manual_session(&self, key: SessionKey) -> ToggleOutcome {
        let _guard = self.transition.lock();
        if let Some(ended) = self.end_session(&key) {
            return ToggleOutcome::Stopped(ended);
        }
        match self.begin_session(key, SessionOrigin::Manual) {
            BeginOutcome::Refused(reason) => ToggleOutcome::Refused(reason),
            BeginOutcome::Started | BeginOutcome::AlreadyActive => ToggleOutcome::Started,
        }
    }

    /// Moves logging from `previous` to `current`.
    ///
    /// The previous subject's session, if any, is ended first. A session
    /// for `current` starts only when `admit` accepts its key.
    pub fn foreground_changed(
        &self,
        previous: Option<&str>,
        current: Option<&str>,
        admit: impl Fn(&SessionKey) -> bool,
    ) -> (Option<EndedSession>, Option<BeginOutcome>) {
        let _guard = self.transition.lock();
        let ended = previous.and_then(|id| self.end_session(&SessionKey::app(id)));
        let begun = current.map(SessionKey::app).and_then(|key| {
            admit(&key).then(|| self.begin_session(key, SessionOrigin::Automatic))
        });
        (ended, begun)
    }

    pub fn is_active(&self, key: &SessionKey) -> bool {
        self.sessions.contains_key(key)
    }

    /// Active keys, sorted.
    pub fn active_keys(&self) -> Vec<SessionKey> {
        let mut keys: Vec<SessionKey> = self.sessions.iter().map(|e| e.key().clone()).collect();
        keys.sort();
        keys
    }

    pub fn active_count(&self) -> usize {
        self.sessions.len()
    }

    pub fn origin_of(&self, key: &SessionKey) -> Option<SessionOrigin> {
        self.sessions.get(key).map(|s| s.origin)
    }

    pub fn row_count(&self, key: &SessionKey) -> Option<usize> {
        self.sessions.get(key).map(|s| s.buffer.len())
    }

    /// Copy of the rows currently buffered for `key`.
    pub fn buffer_snapshot(&self, key: &SessionKey) -> Option<Vec<MetricRow>> {
        self.sessions.get(key).map(|s| s.buffer.rows().to_vec())
    }
}

impl std::fmt::Debug for SessionManager {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("SessionManager")
            .field("active", &self.active_keys())
            .field("ceiling", &self.ceiling)
            .field("visible", &self.gate.is_visible())
            .finish()
    }
}
