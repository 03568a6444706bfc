// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;
use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;

use crate::engine::Context;
use crate::errors::Result;

/// A named, typed unit owned by the application.
pub trait Component: Send + Sync + 'static {
    /// Fully-qualified type of the component, the key it was registered under.
    fn type_name(&self) -> &str;

    /// Name of the component, unique within one application.
    fn name(&self) -> &str;

    fn as_any(&self) -> &dyn Any;
}

/// Components with a configuration step between construction and start.
///
/// Ports are declared here, once properties hold their final values.
#[async_trait]
pub trait Configurer: Send + Sync {
    async fn configure(&self, ctx: &Context) -> Result<()>;
}

/// A component processing every event.
#[async_trait]
pub trait Task: Component {
    async fn start_task(&self, _ctx: &Context) -> Result<()> {
        Ok(())
    }

    async fn process(&self, ctx: &Context) -> Result<()>;

    async fn stop_task(&self, _ctx: &Context) -> Result<()> {
        Ok(())
    }

    fn as_configurer(&self) -> Option<&dyn Configurer> {
        None
    }
}

/// A component started before the event loop and stopped after it.
#[async_trait]
pub trait Service: Component {
    async fn start_svc(&self, _ctx: &Context) -> Result<()> {
        Ok(())
    }

    async fn stop_svc(&self, _ctx: &Context) -> Result<()> {
        Ok(())
    }

    fn as_configurer(&self) -> Option<&dyn Configurer> {
        None
    }
}

/// What a factory hands back to the application.
#[derive(Clone)]
pub enum Instance {
    Task(Arc<dyn Task>),
    Service(Arc<dyn Service>),
}

impl Instance {
    pub fn task<T: Task>(task: T) -> Self {
        Instance::Task(Arc::new(task))
    }

    pub fn service<S: Service>(svc: S) -> Self {
        Instance::Service(Arc::new(svc))
    }

    pub fn name(&self) -> &str {
        match self {
            Instance::Task(t) => t.name(),
            Instance::Service(s) => s.name(),
        }
    }

    pub fn type_name(&self) -> &str {
        match self {
            Instance::Task(t) => t.type_name(),
            Instance::Service(s) => s.type_name(),
        }
    }
}

impl fmt::Debug for Instance {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let kind = match self {
            Instance::Task(_) => "Task",
            Instance::Service(_) => "Service",
        };
        f.debug_struct(kind)
            .field("type", &self.type_name())
            .field("name", &self.name())
            .finish()
    }
}
