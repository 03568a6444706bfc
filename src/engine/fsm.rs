// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Lifecycle states of an application.
//!
//! The states are totally ordered. Each lifecycle operation is guarded by a
//! [`Gate`]: the current state must be at least the gate's minimum and below
//! its limit, otherwise the operation fails without touching the state.

use std::fmt;

use crate::errors::{Error, Result};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Default)]
pub enum State {
    #[default]
    Undefined,
    Configuring,
    Configured,
    Starting,
    Started,
    Running,
    Stopping,
    Stopped,
    Offline,
}

impl fmt::Display for State {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let name = match self {
            State::Undefined => "UNDEFINED",
            State::Configuring => "CONFIGURING",
            State::Configured => "CONFIGURED",
            State::Starting => "STARTING",
            State::Started => "STARTED",
            State::Running => "RUNNING",
            State::Stopping => "STOPPING",
            State::Stopped => "STOPPED",
            State::Offline => "OFFLINE",
        };
        f.pad(name)
    }
}

/// Precondition of one lifecycle operation: `min <= state < limit`.
#[derive(Debug, Clone, Copy)]
pub struct Gate {
    pub op: &'static str,
    pub min: State,
    pub limit: State,
}

pub const CONFIGURE: Gate = Gate {
    op: "configure",
    min: State::Undefined,
    limit: State::Configured,
};

pub const START: Gate = Gate {
    op: "start",
    min: State::Configured,
    limit: State::Started,
};

pub const RUN: Gate = Gate {
    op: "run",
    min: State::Started,
    limit: State::Stopping,
};

pub const STOP: Gate = Gate {
    op: "stop",
    min: State::Started,
    limit: State::Stopped,
};

pub const SHUTDOWN: Gate = Gate {
    op: "shutdown",
    min: State::Stopped,
    limit: State::Offline,
};

impl Gate {
    pub fn check(&self, state: State) -> Result<()> {
        if state < self.min {
            return Err(Error::InvalidState {
                op: self.op,
                state,
                min: self.min,
            });
        }
        if state >= self.limit {
            return Err(Error::StateOverrun { op: self.op, state });
        }
        Ok(())
    }
}
