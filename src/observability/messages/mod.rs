// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Centralized message types for structured logging.
//!
//! Messages are organized by subsystem:
//!
//! * `lifecycle` - component creation and application state transitions
//! * `dataflow` - data-flow validation and graph export
//! * `scheduler` - event loop progress, worker exits and event failures
//! * `stream` - stream task connection and teardown
//!
//! # Usage Pattern
//!
//! ```rust
//! use eventloom::observability::messages::StructuredLog;
//! use eventloom::observability::messages::scheduler::RunStarted;
//!
//! let msg = RunStarted {
//!     evt_max: 10,
//!     n_procs: 4,
//!     tasks: 3,
//! };
//!
//! msg.log();
//! ```
//!
//! Messages that open a unit of work (`RunStarted`, `EventStarted`,
//! `StreamConnected`) also build the span that work runs in.

pub mod dataflow;
pub mod lifecycle;
pub mod scheduler;
pub mod stream;

/// A message that knows how to emit itself with structured fields.
pub trait StructuredLog {
    /// Emits the message at its own level, with its fields attached.
    fn log(&self);
}
