// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the event loop.
//!
//! This module contains message types for logging events related to:
//! * Start and end of an event loop
//! * Start of an event on a worker
//! * Worker exits
//! * Failed events
//! * Release hooks failing while the store is reset

use std::fmt::{Display, Formatter};
use std::time::Duration;

use tracing::Span;

use crate::observability::messages::StructuredLog;

/// Event loop started.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RunStarted {
    pub evt_max: i64,
    pub n_procs: i64,
    pub tasks: usize,
}

impl Display for RunStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        let mode = if self.n_procs > 0 { "concurrent" } else { "sequential" };
        write!(
            f,
            "run: {} loop over {} events, workers={} tasks={}",
            mode,
            if self.evt_max < 0 {
                "all".to_string()
            } else {
                self.evt_max.to_string()
            },
            self.n_procs.max(1),
            self.tasks
        )
    }
}

impl StructuredLog for RunStarted {
    fn log(&self) {
        tracing::info!(
            evt_max = self.evt_max,
            n_procs = self.n_procs,
            tasks = self.tasks,
            "{}", self
        );
    }
}

impl RunStarted {
    /// Span enclosing the whole event loop.
    pub fn span(&self, name: &str) -> Span {
        tracing::info_span!(
            "run",
            span_name = name,
            evt_max = self.evt_max,
            n_procs = self.n_procs,
        )
    }
}

/// A worker took an event.
///
/// # Log Level
/// `trace!` - Per-event detail
pub struct EventStarted {
    pub id: i64,
    pub slot: usize,
}

impl Display for EventStarted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "event {} started on slot {}", self.id, self.slot)
    }
}

impl StructuredLog for EventStarted {
    fn log(&self) {
        tracing::trace!(id = self.id, slot = self.slot, "{}", self);
    }
}

impl EventStarted {
    /// Span every task of the event runs in.
    pub fn span(&self, name: &str) -> Span {
        tracing::debug_span!("event", span_name = name, id = self.id, slot = self.slot)
    }
}

/// Event loop finished.
///
/// # Log Level
/// `info!` - Important operational event
pub struct RunCompleted {
    pub processed: u64,
    pub exhausted: bool,
    pub duration: Duration,
}

impl Display for RunCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "run: processed {} events in {:?}{}",
            self.processed,
            self.duration,
            if self.exhausted { " (input exhausted)" } else { "" }
        )
    }
}

impl StructuredLog for RunCompleted {
    fn log(&self) {
        tracing::info!(
            processed = self.processed,
            exhausted = self.exhausted,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// A worker left its loop.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct WorkerExited {
    pub slot: usize,
    pub processed: u64,
}

impl Display for WorkerExited {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "worker {} exited after {} events", self.slot, self.processed)
    }
}

impl StructuredLog for WorkerExited {
    fn log(&self) {
        tracing::debug!(slot = self.slot, processed = self.processed, "{}", self);
    }
}

/// An event failed and terminates the run.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct EventFailed<'a> {
    pub id: i64,
    pub slot: usize,
    pub error: &'a dyn std::error::Error,
}

impl Display for EventFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "event {} (slot {}) failed: {}",
            self.id, self.slot, self.error
        )
    }
}

impl StructuredLog for EventFailed<'_> {
    fn log(&self) {
        tracing::error!(
            id = self.id,
            slot = self.slot,
            error = %self.error,
            "{}", self
        );
    }
}

/// A release hook failed while the store was reset.
///
/// # Log Level
/// `warn!` - Potential issue
pub struct ReleaseFailed<'a> {
    pub key: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for ReleaseFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "store: releasing [{}] failed: {}", self.key, self.error)
    }
}

impl StructuredLog for ReleaseFailed<'_> {
    fn log(&self) {
        tracing::warn!(key = self.key, error = %self.error, "{}", self);
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_started_display() {
        let msg = RunStarted {
            evt_max: -1,
            n_procs: 0,
            tasks: 3,
        };
        assert_eq!(msg.to_string(), "run: sequential loop over all events, workers=1 tasks=3");

        let msg = RunStarted {
            evt_max: 10,
            n_procs: 4,
            tasks: 2,
        };
        assert_eq!(msg.to_string(), "run: concurrent loop over 10 events, workers=4 tasks=2");
    }

    #[test]
    fn test_event_started_display() {
        let msg = EventStarted { id: 12, slot: 3 };
        assert_eq!(msg.to_string(), "event 12 started on slot 3");
    }

    #[test]
    fn test_run_completed_display() {
        let msg = RunCompleted {
            processed: 7,
            exhausted: true,
            duration: Duration::from_millis(5),
        };
        assert_eq!(msg.to_string(), "run: processed 7 events in 5ms (input exhausted)");
    }
}
