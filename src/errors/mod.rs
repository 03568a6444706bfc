// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Error types for the event loop.
//!
//! Every fallible operation in the crate returns [`Result`]. The variants of
//! [`Error`] fall into four groups:
//!
//! * configuration errors raised while building the pipeline
//!   (duplicate names, unknown factory types, property collisions and kinds)
//! * data-flow validation errors, accumulated as [`ValidationError`]s
//! * lifecycle precondition errors raised by the state machine
//! * runtime errors returned by components while configuring, starting,
//!   processing or stopping
//!
//! Runtime errors leaving the scheduler are decorated once with the call stack
//! captured at that point, see [`stack::wrap`].

pub mod stack;
mod validation;

use crate::config::Kind;
use crate::engine::fsm::State;

pub use stack::Traced;
pub use validation::{Direction, PortRef, ValidationError};

pub type Result<T, E = Error> = std::result::Result<T, E>;

#[derive(Debug, thiserror::Error)]
pub enum Error {
    #[error("app: duplicate component name [{0}]")]
    DuplicateComponent(String),

    #[error("registry: no factory registered for type [{0}]")]
    UnknownType(String),

    #[error("app: no component named [{0}]")]
    UnknownComponent(String),

    #[error("app: no service named [{0}]")]
    UnknownService(String),

    #[error("property: component [{component}] already declared property [{property}]")]
    DuplicateProperty { component: String, property: String },

    #[error("property: component [{component}] has no property [{property}]")]
    UnknownProperty { component: String, property: String },

    #[error("property: component [{component}] property [{property}] expects {expected}, got {actual}")]
    PropertyKind {
        component: String,
        property: String,
        expected: Kind,
        actual: Kind,
    },

    #[error("property: component [{component}] property [{property}] cannot be set in state {state}")]
    PropertyFrozen {
        component: String,
        property: String,
        state: State,
    },

    #[error("dataflow: component [{component}] already declared {direction} port with name [{port}]")]
    DuplicatePort {
        component: String,
        port: String,
        direction: &'static str,
    },

    #[error("{}", join_lines(.0))]
    Validation(Vec<ValidationError>),

    #[error("fsm: {op} requires state {min} or later (current state {state})")]
    InvalidState {
        op: &'static str,
        state: State,
        min: State,
    },

    #[error("fsm: {op} not allowed once state reached {state}")]
    StateOverrun { op: &'static str, state: State },

    #[error("kind mismatch: expected {expected}, got {actual}")]
    Kind { expected: Kind, actual: Kind },

    #[error("store: no such key [{0}]")]
    UnknownKey(String),

    #[error("store: aborted")]
    StoreAborted,

    #[error("event cancelled")]
    Cancelled,

    #[error("end of stream")]
    EndOfStream,

    #[error("config: {0}")]
    Config(String),

    #[error(transparent)]
    Component(#[from] anyhow::Error),

    #[error(transparent)]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Yaml(#[from] serde_yaml::Error),

    #[error(transparent)]
    Toml(#[from] toml::de::Error),

    #[error(transparent)]
    Json(#[from] serde_json::Error),

    #[error(transparent)]
    Join(#[from] tokio::task::JoinError),

    #[error(transparent)]
    Traced(Traced),
}

impl Error {
    /// The innermost error, with every stack decoration peeled off.
    pub fn root(&self) -> &Error {
        match self {
            Error::Traced(traced) => traced.inner().root(),
            other => other,
        }
    }

    /// The call stack captured when the error was first wrapped.
    pub fn stack(&self) -> Option<&std::sync::Arc<std::backtrace::Backtrace>> {
        match self {
            Error::Traced(traced) => Some(traced.stack()),
            _ => None,
        }
    }

    pub fn is_end_of_stream(&self) -> bool {
        matches!(self.root(), Error::EndOfStream)
    }

    pub fn is_cancelled(&self) -> bool {
        matches!(self.root(), Error::Cancelled | Error::StoreAborted)
    }

    /// The validation problems, when this is a data-flow validation failure.
    pub fn validation_errors(&self) -> Option<&[ValidationError]> {
        match self.root() {
            Error::Validation(errors) => Some(errors),
            _ => None,
        }
    }
}

fn join_lines(errors: &[ValidationError]) -> String {
    errors
        .iter()
        .map(ToString::to_string)
        .collect::<Vec<_>>()
        .join("\n")
}
