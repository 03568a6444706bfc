// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::fmt;

use crate::config::Kind;

/// Problems found while validating the data-flow graph at start.
///
/// Component and edge names inside every variant are kept in lexicographic
/// order so the same pipeline always produces the same message.
#[derive(Debug, Clone, PartialEq, thiserror::Error)]
pub enum ValidationError {
    /// Two components declared the same out-port.
    #[error(
        "dataflow: component [{first}] already declared out-port with name [{port} (type={first_kind})].\n\
         dataflow: component [{second}] is trying to add a duplicate out-port [{port} (type={second_kind})]"
    )]
    DuplicateProducer {
        port: String,
        first: String,
        first_kind: Kind,
        second: String,
        second_kind: Kind,
    },

    /// An in-port has no producer anywhere in the pipeline.
    #[error("dataflow: component [{component}] declared port [{port}] as input but NO KNOWN producer")]
    MissingProducer { component: String, port: String },

    /// An edge is declared with different kinds by different ports.
    #[error("dataflow: detected type inconsistency for port [{port}]:{}", format_refs(.refs))]
    KindMismatch { port: String, refs: Vec<PortRef> },

    /// A strongly-connected group of components.
    #[error("dataflow: cycle detected: {} components [{}]", .members.len(), .members.join(", "))]
    Cycle { members: Vec<String> },
}

/// One declaration of an edge: which component, which direction, which kind.
#[derive(Debug, Clone, PartialEq)]
pub struct PortRef {
    pub component: String,
    pub direction: Direction,
    pub kind: Kind,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    In,
    Out,
}

impl fmt::Display for Direction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Direction::In => f.pad("in"),
            Direction::Out => f.pad("out"),
        }
    }
}

fn format_refs(refs: &[PortRef]) -> String {
    refs.iter()
        .map(|r| {
            format!(
                "\n component={:?} port={:<3} type={}",
                r.component, r.direction, r.kind
            )
        })
        .collect()
}
