// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Capture control: the on/off switch for logging and its two modes.
//!
//! # States
//!
//! ```text
//!              start_capture                  stop_capture
//!   Stopped ───────────────────► Capturing ─────────────────► Stopped
//!      │                            │
//!      └─ set_logging_mode          └─ set_logging_mode → Err
//! ```
//!
//! In `Global` mode starting capture opens the single device-wide session.
//! In `PerApp` mode it only arms auto-start: sessions then follow the
//! foreground application through [`CaptureController::on_foreground_changed`].
//!
//! Lock order: `state`, then the session manager's transition lock, then
//! the session map. The enabled set and the foreground slot are leaves.

use crate::{
    BeginOutcome, CaptureError, EnabledSet, EndedSession, Notice, PersistedState, RefusalReason,
    SessionEvent, SessionKey, SessionManager, SessionOrigin, ToggleOutcome,
};
use metric_row::{ColumnSet, MetricRow};
use parking_lot::RwLock;
use serde::{Deserialize, Serialize};
use std::collections::BTreeSet;
use std::path::PathBuf;
use std::sync::Arc;
use tokio::sync::broadcast;

/// Which subjects get a logging session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum LoggingMode {
    /// One continuous log for the whole device.
    #[default]
    Global,
    /// One log per enabled application while it is in the foreground.
    PerApp,
}

impl LoggingMode {
    pub fn as_str(self) -> &'static str {
        match self {
            LoggingMode::Global => "global",
            LoggingMode::PerApp => "per_app",
        }
    }

    /// Parses a mode name, accepting `per-app` and any letter case.
    /// Anything unrecognized is `Global`.
    pub fn parse_lenient(raw: &str) -> Self {
        match raw.trim().to_ascii_lowercase().replace('-', "_").as_str() {
            "global" => LoggingMode::Global,
            "per_app" | "perapp" => LoggingMode::PerApp,
            other => {
                tracing::warn!("unknown logging mode '{other}', using global");
                LoggingMode::Global
            }
        }
    }
}

impl std::fmt::Display for LoggingMode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Result of the overlay's capture gesture.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum GestureOutcome {
    CaptureStarted,
    CaptureStopped(Vec<EndedSession>),
    /// Global capture could not start (the overlay is hidden).
    CaptureRefused,
    /// The foreground app already logs automatically; nothing changed.
    AutoLoggingActive(SessionKey),
    Manual(ToggleOutcome),
    Refused(RefusalReason),
}

#[derive(Debug, Clone, Copy)]
struct CaptureState {
    capturing: bool,
    mode: LoggingMode,
}

/// Owns the capture switch, the logging mode and the enabled set, and
/// routes sampled rows to the right session.
pub struct CaptureController {
    sessions: Arc<SessionManager>,
    state: RwLock<CaptureState>,
    enabled: EnabledSet,
    foreground: RwLock<Option<String>>,
    store: Option<PathBuf>,
    columns: ColumnSet,
}

impl CaptureController {
    /// Creates a stopped controller from already-loaded state. Nothing is
    /// written back until a mutation happens and a store is attached.
    pub fn new(sessions: Arc<SessionManager>, state: PersistedState) -> Self {
        Self {
            sessions,
            state: RwLock::new(CaptureState {
                capturing: false,
                mode: state.logging_mode,
            }),
            enabled: EnabledSet::new(state.enabled_apps),
            foreground: RwLock::new(None),
            store: None,
            columns: ColumnSet::all(),
        }
    }

    /// Loads the state file at `store` and persists every later mutation
    /// back to it.
    pub fn open(sessions: Arc<SessionManager>, store: impl Into<PathBuf>) -> Result<Self, CaptureError> {
        let store = store.into();
        let state = PersistedState::load(&store)?;
        tracing::info!(
            "capture state loaded from {}: mode {}, {} enabled apps",
            store.display(),
            state.logging_mode,
            state.enabled_apps.len()
        );
        Ok(Self::new(sessions, state).with_store(store))
    }

    pub fn with_store(mut self, store: impl Into<PathBuf>) -> Self {
        self.store = Some(store.into());
        self
    }

    /// Columns kept in logged rows; the rest are written as unavailable.
    pub fn with_columns(mut self, columns: ColumnSet) -> Self {
        self.columns = columns;
        self
    }

    pub fn sessions(&self) -> &Arc<SessionManager> {
        &self.sessions
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sessions.subscribe()
    }

    pub fn is_capturing(&self) -> bool {
        self.state.read().capturing
    }

    pub fn mode(&self) -> LoggingMode {
        self.state.read().mode
    }

    pub fn columns(&self) -> ColumnSet {
        self.columns
    }

    pub fn enabled_apps(&self) -> BTreeSet<String> {
        self.enabled.snapshot()
    }

    pub fn is_app_enabled(&self, app: &str) -> bool {
        self.enabled.contains(app)
    }

    /// Last foreground subject reported through `on_foreground_changed`.
    pub fn foreground(&self) -> Option<String> {
        self.foreground.read().clone()
    }

    /// Switches the logging mode. Only legal while stopped; sessions left
    /// over from the previous mode (manual ones) are ended first.
    pub fn set_logging_mode(&self, mode: LoggingMode) -> Result<(), CaptureError> {
        let mut state = self.state.write();
        if state.mode == mode {
            return Ok(());
        }
        if state.capturing {
            return Err(CaptureError::ModeChangeWhileCapturing { requested: mode });
        }
        let leftover = self.sessions.end_all();
        if !leftover.is_empty() {
            tracing::info!("ended {} sessions before switching mode", leftover.len());
        }
        state.mode = mode;
        tracing::info!("logging mode set to {mode}");
        self.persist(state.mode);
        Ok(())
    }

    /// Opts an application in or out of per-app logging. Disabling ends
    /// the application's active session, if any, and exports it.
    pub fn set_app_logging_enabled(&self, app: &str, enabled: bool) -> Option<EndedSession> {
        let mode = self.state.read().mode;
        let ended = if enabled {
            if self.enabled.insert(app) {
                tracing::info!("per-app logging enabled for {app}");
            }
            None
        } else {
            // Ordered against foreground transitions, which check the set
            // and begin under the same lock.
            let (removed, ended) = self
                .sessions
                .end_if(&SessionKey::app(app), || self.enabled.remove(app));
            if removed {
                tracing::info!("per-app logging disabled for {app}");
            }
            ended
        };
        self.persist(mode);
        ended
    }

    /// Turns capture on. Returns whether capture is on afterwards.
    pub fn start_capture(&self) -> bool {
        let mut state = self.state.write();
        if state.capturing {
            return true;
        }
        match state.mode {
            LoggingMode::Global => {
                match self
                    .sessions
                    .begin_session(SessionKey::Global, SessionOrigin::Automatic)
                {
                    BeginOutcome::Started | BeginOutcome::AlreadyActive => {}
                    BeginOutcome::Refused(_) => return false,
                }
            }
            LoggingMode::PerApp => {
                let current = self.foreground();
                self.sessions
                    .foreground_changed(None, current.as_deref(), |key| self.admits(key));
            }
        }
        state.capturing = true;
        tracing::info!("capture started ({})", state.mode);
        self.sessions
            .events()
            .publish(SessionEvent::CaptureStarted { mode: state.mode });
        true
    }

    /// Turns capture off, ending and exporting the sessions the mode owns.
    pub fn stop_capture(&self) -> Vec<EndedSession> {
        let mut state = self.state.write();
        if !state.capturing {
            return Vec::new();
        }
        state.capturing = false;
        let ended = match state.mode {
            LoggingMode::Global => self
                .sessions
                .end_session(&SessionKey::Global)
                .into_iter()
                .collect(),
            LoggingMode::PerApp => self.sessions.end_all(),
        };
        tracing::info!("capture stopped ({}), {} sessions ended", state.mode, ended.len());
        self.sessions
            .events()
            .publish(SessionEvent::CaptureStopped { mode: state.mode });
        ended
    }

    /// Applies a foreground transition.
    ///
    /// In `PerApp` mode the previous subject's session (automatic or
    /// manual) ends; a session for the new subject begins if capture is on
    /// and the subject is enabled. In `Global` mode only the remembered
    /// foreground changes.
    pub fn on_foreground_changed(
        &self,
        previous: Option<&str>,
        current: Option<&str>,
    ) -> (Option<EndedSession>, Option<BeginOutcome>) {
        let state = self.state.read();
        *self.foreground.write() = current.map(str::to_string);
        if state.mode != LoggingMode::PerApp {
            return (None, None);
        }
        let capturing = state.capturing;
        self.sessions
            .foreground_changed(previous, current, |key| capturing && self.admits(key))
    }

    /// Hands a sampled row to the session it belongs to. Returns whether a
    /// session accepted it.
    pub fn record(&self, row: &MetricRow) -> bool {
        let state = self.state.read();
        let key = match state.mode {
            LoggingMode::Global => SessionKey::Global,
            LoggingMode::PerApp => SessionKey::app(row.subject.as_str()),
        };
        if !self.sessions.is_active(&key) {
            return false;
        }
        self.sessions.append_row(&key, row.masked(self.columns))
    }

    /// The overlay's double-tap action.
    pub fn handle_capture_gesture(&self) -> GestureOutcome {
        let (mode, capturing) = {
            let state = self.state.read();
            (state.mode, state.capturing)
        };
        match mode {
            LoggingMode::Global if capturing => GestureOutcome::CaptureStopped(self.stop_capture()),
            LoggingMode::Global => {
                if self.start_capture() {
                    GestureOutcome::CaptureStarted
                } else {
                    GestureOutcome::CaptureRefused
                }
            }
            LoggingMode::PerApp => {
                let Some(app) = self.foreground() else {
                    tracing::warn!("capture gesture ignored: no foreground application");
                    self.sessions
                        .events()
                        .publish(SessionEvent::Notice(Notice::NoForeground));
                    return GestureOutcome::Refused(RefusalReason::NoForeground);
                };
                let key = SessionKey::app(app.as_str());
                if self.enabled.contains(&app) {
                    self.sessions
                        .events()
                        .publish(SessionEvent::Notice(Notice::AutoLoggingActive {
                            key: key.clone(),
                        }));
                    return GestureOutcome::AutoLoggingActive(key);
                }
                GestureOutcome::Manual(self.sessions.toggle_manual_session(key))
            }
        }
    }

    /// Stops capture and ends every remaining session.
    pub fn shutdown(&self) -> Vec<EndedSession> {
        let mut ended = self.stop_capture();
        ended.extend(self.sessions.end_all());
        tracing::info!("capture controller shut down, {} sessions flushed", ended.len());
        ended
    }

    fn admits(&self, key: &SessionKey) -> bool {
        key.app_id().is_some_and(|app| self.enabled.contains(app))
    }

    fn persist(&self, mode: LoggingMode) {
        let Some(store) = &self.store else {
            return;
        };
        let state = PersistedState {
            logging_mode: mode,
            enabled_apps: self.enabled.snapshot(),
        };
        if let Err(e) = state.save(store) {
            tracing::warn!("failed to persist capture state: {e}");
        }
    }
}

impl std::fmt::Debug for CaptureController {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        let state = *self.state.read();
        f.debug_struct("CaptureController")
            .field("capturing", &state.capturing)
            .field("mode", &state.mode)
            .field("enabled", &self.enabled.snapshot())
            .field("sessions", &self.sessions)
            .finish()
    }
}
