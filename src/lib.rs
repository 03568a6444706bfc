// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod backends;      // built-in stream tasks
pub mod config;        // properties, registry, data flow, job files
pub mod engine;        // application lifecycle and event loop
pub mod errors;        // error handling
pub mod observability;
pub mod traits;        // component and streamer contracts
pub(crate) mod utils;
