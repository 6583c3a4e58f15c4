// Copyright (c) 2025 Dimitris Kafetzis
//
// Licensed under the MIT License.
// See LICENSE file in the project root for full license information.
//
// SPDX-License-Identifier: MIT

//! Typed session notifications.
//!
//! The core never calls into presentation code. It publishes
//! [`SessionEvent`]s on a broadcast channel; publishing never blocks and
//! succeeds with zero subscribers. Dropping a receiver unsubscribes it.
//! A receiver that falls more than [`EVENT_CAPACITY`] events behind sees
//! `RecvError::Lagged` and skips ahead.

use crate::{LoggingMode, SessionKey, SessionOrigin};
use std::path::PathBuf;
use tokio::sync::broadcast;

/// Events buffered per subscriber before it starts lagging.
pub const EVENT_CAPACITY: usize = 256;

/// Why a session start was refused.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RefusalReason {
    /// The overlay is hidden, so no rows would ever be sampled.
    OverlayHidden,
    /// No foreground subject is known to start a session for.
    NoForeground,
}

/// One-off notices for the user that are not session transitions.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Notice {
    /// A manual toggle was requested for an application that already logs
    /// automatically.
    AutoLoggingActive { key: SessionKey },
    /// A gesture needed the foreground application, but none is known.
    NoForeground,
}

#[derive(Debug, Clone, PartialEq)]
pub enum SessionEvent {
    CaptureStarted { mode: LoggingMode },
    CaptureStopped { mode: LoggingMode },
    SessionStarted { key: SessionKey, origin: SessionOrigin },
    SessionRefused { key: SessionKey, reason: RefusalReason },
    /// A session left the live map with `rows` data rows.
    SessionEnded { key: SessionKey, rows: usize },
    Exported { key: SessionKey, path: PathBuf },
    ExportFailed { key: SessionKey, error: String },
    Notice(Notice),
}

/// Publisher side of the event channel.
#[derive(Debug, Clone)]
pub struct EventBus {
    sender: broadcast::Sender<SessionEvent>,
}

impl EventBus {
    pub fn new() -> Self {
        let (sender, _) = broadcast::channel(EVENT_CAPACITY);
        Self { sender }
    }

    pub fn publish(&self, event: SessionEvent) {
        tracing::trace!(?event, "session event");
        // No subscribers is not an error.
        let _ = self.sender.send(event);
    }

    pub fn subscribe(&self) -> broadcast::Receiver<SessionEvent> {
        self.sender.subscribe()
    }
}

impl Default for EventBus {
    fn default() -> Self {
        Self::new()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_publish_without_subscribers() {
        let bus = EventBus::new();
        bus.publish(SessionEvent::CaptureStarted {
            mode: LoggingMode::Global,
        });
    }

    #[test]
    fn test_subscriber_receives_in_order() {
        let bus = EventBus::new();
        let mut rx = bus.subscribe();
        bus.publish(SessionEvent::CaptureStarted {
            mode: LoggingMode::PerApp,
        });
        bus.publish(SessionEvent::SessionEnded {
            key: SessionKey::Global,
            rows: 3,
        });
        assert_eq!(
            rx.try_recv().unwrap(),
            SessionEvent::CaptureStarted {
                mode: LoggingMode::PerApp
            }
        );
        assert!(matches!(
            rx.try_recv().unwrap(),
            SessionEvent::SessionEnded { rows: 3, .. }
        ));
        assert!(rx.try_recv().is_err());
    }

    #[test]
    fn test_dropped_receiver_unsubscribes() {
        let bus = EventBus::new();
        let rx = bus.subscribe();
        assert_eq!(bus.sender.receiver_count(), 1);
        drop(rx);
        assert_eq!(bus.sender.receiver_count(), 0);
    }
}
