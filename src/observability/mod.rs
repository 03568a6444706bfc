// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Observability module for structured logging and tracing.
//!
//! Framework diagnostics are struct-based messages under [`messages`], each
//! with a `Display` impl and a [`messages::StructuredLog`] impl emitting the
//! message with its fields. Components talk through a [`MsgStream`], a leveled
//! sink named after the component and filtered by the application's
//! `MsgLevel` property.
//!
//! Nothing here decides where output goes: everything ends up in `tracing`.
//! [`init_tracing`] installs a default fmt subscriber for binaries and tests
//! that have none.

pub mod messages;
mod msg_stream;

pub use msg_stream::{Level, MsgStream};

use tracing_subscriber::EnvFilter;

/// Installs a fmt subscriber filtered by `RUST_LOG`, or by `default_directive`
/// when `RUST_LOG` is unset or invalid. Does nothing if a global subscriber
/// is already installed.
pub fn init_tracing(default_directive: &str) {
    let filter = EnvFilter::try_from_default_env()
        .or_else(|_| EnvFilter::try_new(default_directive))
        .unwrap_or_else(|_| EnvFilter::new("info"));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_target(false)
        .try_init();
}
