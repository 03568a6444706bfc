// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for component creation and application state transitions.

use std::fmt::{Display, Formatter};
use std::time::Duration;

use crate::engine::fsm::State;
use crate::observability::messages::StructuredLog;

/// A component was created from the registry.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct ComponentCreated<'a> {
    pub type_name: &'a str,
    pub name: &'a str,
    pub kind: &'static str,
}

impl Display for ComponentCreated<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "created {} [{}] of type [{}]",
            self.kind, self.name, self.type_name
        )
    }
}

impl StructuredLog for ComponentCreated<'_> {
    fn log(&self) {
        tracing::debug!(
            type_name = self.type_name,
            component = self.name,
            kind = self.kind,
            "{}", self
        );
    }
}

/// A lifecycle operation moved the application to a new state.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use eventloom::engine::fsm::State;
/// use eventloom::observability::messages::lifecycle::TransitionCompleted;
/// use std::time::Duration;
///
/// let msg = TransitionCompleted {
///     op: "start",
///     state: State::Started,
///     duration: Duration::from_millis(3),
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct TransitionCompleted {
    pub op: &'static str,
    pub state: State,
    pub duration: Duration,
}

impl Display for TransitionCompleted {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "app: {} done, state={} duration={:?}",
            self.op, self.state, self.duration
        )
    }
}

impl StructuredLog for TransitionCompleted {
    fn log(&self) {
        tracing::info!(
            op = self.op,
            state = %self.state,
            duration_ms = self.duration.as_millis() as u64,
            "{}", self
        );
    }
}

/// A component failed during a lifecycle step.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct LifecycleStepFailed<'a> {
    pub op: &'static str,
    pub component: &'a str,
    pub error: &'a dyn std::error::Error,
}

impl Display for LifecycleStepFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "app: {} of [{}] failed: {}", self.op, self.component, self.error)
    }
}

impl StructuredLog for LifecycleStepFailed<'_> {
    fn log(&self) {
        tracing::error!(
            op = self.op,
            component = self.component,
            error = %self.error,
            "{}", self
        );
    }
}
