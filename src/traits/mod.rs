// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod component;
pub mod streamer;

pub use component::{Component, Configurer, Instance, Service, Task};
pub use streamer::{InputStreamer, InputStreamerHandle, OutputStreamer, OutputStreamerHandle};
