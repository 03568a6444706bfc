// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

pub mod consts;
mod dataflow;
mod loader;
mod properties;
mod registry;
pub mod tarjan;
mod value;

pub use dataflow::{DataFlow, Node};
pub use loader::{load_job, ComponentConfig, JobConfig};
pub use properties::{Prop, PropertyTable};
pub use registry::{Factory, Registry};
pub use value::{Kind, Object, Port, Typed, Value};
