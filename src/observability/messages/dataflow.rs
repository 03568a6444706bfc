// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Message types for data-flow validation and graph export.

use std::fmt::{Display, Formatter};

use crate::observability::messages::StructuredLog;

/// Shape of the declared data-flow graph, logged once configured.
///
/// # Log Level
/// `debug!` - Detailed diagnostic information
pub struct DataFlowSummary<'a> {
    pub nodes: usize,
    pub edges: &'a [String],
}

impl Display for DataFlowSummary<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(
            f,
            "dataflow: {} nodes, {} edges [{}]",
            self.nodes,
            self.edges.len(),
            self.edges.join(", ")
        )
    }
}

impl StructuredLog for DataFlowSummary<'_> {
    fn log(&self) {
        tracing::debug!(nodes = self.nodes, edges = self.edges.len(), "{}", self);
    }
}

/// The data-flow graph failed validation.
///
/// # Log Level
/// `error!` - Failure requiring attention
pub struct ValidationFailed<'a> {
    pub problem: &'a dyn std::error::Error,
}

impl Display for ValidationFailed<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "{}", self.problem)
    }
}

impl StructuredLog for ValidationFailed<'_> {
    fn log(&self) {
        tracing::error!(problem = %self.problem, "{}", self);
    }
}

/// The data-flow graph was written out for visualization.
///
/// # Log Level
/// `info!` - Important operational event
///
/// # Example
/// ```
/// use eventloom::observability::messages::dataflow::GraphExported;
///
/// let msg = GraphExported {
///     path: "dataflow.dot",
///     format: "dot",
/// };
///
/// tracing::info!("{}", msg);
/// ```
pub struct GraphExported<'a> {
    pub path: &'a str,
    pub format: &'static str,
}

impl Display for GraphExported<'_> {
    fn fmt(&self, f: &mut Formatter) -> std::fmt::Result {
        write!(f, "dataflow: graph written to [{}] as {}", self.path, self.format)
    }
}

impl StructuredLog for GraphExported<'_> {
    fn log(&self) {
        tracing::info!(path = self.path, format = self.format, "{}", self);
    }
}
