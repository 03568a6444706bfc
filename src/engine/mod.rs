// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Application lifecycle and event loop.
//!
//! [`App`] owns the components and walks them through the state machine in
//! [`fsm`]. While running, the scheduler in `worker` hands events to one or
//! more workers, each with its own [`Store`].

pub mod app;
pub mod context;
pub mod dataflow_svc;
pub mod fsm;
pub mod handle;
pub mod store;
mod worker;


pub use app::{App, Scripter};
pub use context::{Context, Services};
pub use dataflow_svc::DataFlowSvc;
pub use fsm::State;
pub use handle::{AppHandle, ComponentBase, SvcBase, TaskBase};
pub use store::Store;
pub use worker::RunReport;
