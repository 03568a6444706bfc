// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Components shipped with the engine.
//!
//! # Available Backends
//!
//! ## Stream tasks
//! [`stream::InputStream`] and [`stream::OutputStream`] connect the pipeline
//! to any sequential resource through a pluggable streamer. They are
//! registered by [`Registry::with_builtins`](crate::config::Registry::with_builtins)
//! and configured with two properties:
//! - **Ports**: the store keys read or written on every event
//! - **Streamer**: the [`InputStreamer`](crate::traits::InputStreamer) or
//!   [`OutputStreamer`](crate::traits::OutputStreamer) doing the I/O
//!
//! ## Stub Backend (Test-Only)
//! Tasks, a service and line-based streamers used by the crate's own tests.
//! NOT available in production builds.

pub mod stream;
#[cfg(test)]
pub mod stub;
