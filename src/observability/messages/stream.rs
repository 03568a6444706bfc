// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for the generic stream tasks.

use std::fmt::{Display, Formatter};

use tracing::Span;

use crate::errors::Direction;
use crate::observability::messages::StructuredLog;

/// A stream task connected its streamer and started its I/O worker.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct StreamConnected<'a> {
    pub component: &'a str,
    pub direction: Direction,
    pub ports: &'a [String],
}

impl Display for StreamConnected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "stream [{}] connected, {} ports [{}]",
            self.component,
            self.direction,
            self.ports.join(", ")
        )
    }
}

impl StructuredLog for StreamConnected<'_> {
    fn log(&self) {
        tracing::debug!(
            component = self.component,
            direction = %self.direction,
            ports = self.ports.len(),
            "{}", self
        );
    }
}

impl StreamConnected<'_> {
    /// Span the stream's I/O worker runs in.
    pub fn span(&self, name: &str) -> Span {
        tracing::debug_span!(
            "stream",
            span_name = name,
            component = self.component,
            direction = %self.direction,
        )
    }
}

/// A stream task stopped its I/O worker and disconnected its streamer.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct StreamDisconnected<'a> {
    pub component: &'a str,
    pub served: u64,
}

impl Display for StreamDisconnected<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "stream [{}] disconnected after {} requests",
            self.component, self.served
        )
    }
}

impl StructuredLog for StreamDisconnected<'_> {
    fn log(&self) {
        tracing::debug!(
            component = self.component,
            served = self.served,
            "{}", self
        );
    }
}
