// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Application state shared with the components.
//!
//! Factories receive an [`AppHandle`]; components keep it (usually inside a
//! [`TaskBase`] or [`SvcBase`]) to declare properties at construction and
//! ports while configuring. The handle deliberately knows nothing about the
//! components themselves.

use std::fmt;
use std::ops::Deref;
use std::sync::{Arc, Mutex};

use crate::config::{DataFlow, Kind, Prop, PropertyTable, Typed, Value};
use crate::engine::fsm::State;
use crate::errors::{Error, Result};
use crate::utils;

#[derive(Default)]
struct Shared {
    props: Mutex<PropertyTable>,
    dataflow: Mutex<DataFlow>,
    state: Mutex<State>,
}

#[derive(Clone, Default)]
pub struct AppHandle {
    shared: Arc<Shared>,
}

impl AppHandle {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn state(&self) -> State {
        *utils::lock(&self.shared.state)
    }

    pub(crate) fn set_state(&self, state: State) {
        *utils::lock(&self.shared.state) = state;
    }

    pub fn decl_prop<T: Typed>(&self, component: &str, name: &str, default: T) -> Result<Prop<T>> {
        utils::lock(&self.shared.props).declare(component, name, default)
    }

    /// Sets a property; refused once the application started starting.
    pub fn set_prop(&self, component: &str, name: &str, value: impl Into<Value>) -> Result<()> {
        let state = self.state();
        if state >= State::Starting {
            return Err(Error::PropertyFrozen {
                component: component.to_string(),
                property: name.to_string(),
                state,
            });
        }
        utils::lock(&self.shared.props).set(component, name, &value.into())
    }

    pub fn get_prop(&self, component: &str, name: &str) -> Result<Value> {
        utils::lock(&self.shared.props).get(component, name)
    }

    pub fn has_prop(&self, component: &str, name: &str) -> bool {
        utils::lock(&self.shared.props).has(component, name)
    }

    pub fn prop_kind(&self, component: &str, name: &str) -> Result<Kind> {
        utils::lock(&self.shared.props).kind(component, name)
    }

    pub fn prop_names(&self, component: &str) -> Vec<String> {
        utils::lock(&self.shared.props).names(component)
    }

    pub fn decl_in_port(&self, component: &str, name: &str, kind: Kind) -> Result<()> {
        self.check_port_state()?;
        utils::lock(&self.shared.dataflow).add_in(component, name, kind)
    }

    pub fn decl_out_port(&self, component: &str, name: &str, kind: Kind) -> Result<()> {
        self.check_port_state()?;
        utils::lock(&self.shared.dataflow).add_out(component, name, kind)
    }

    fn check_port_state(&self) -> Result<()> {
        let state = self.state();
        if state < State::Configuring {
            return Err(Error::InvalidState {
                op: "declare port",
                state,
                min: State::Configuring,
            });
        }
        if state > State::Configured {
            return Err(Error::StateOverrun {
                op: "declare port",
                state,
            });
        }
        Ok(())
    }

    pub fn with_dataflow<R>(&self, f: impl FnOnce(&DataFlow) -> R) -> R {
        f(&utils::lock(&self.shared.dataflow))
    }

    pub(crate) fn clear_dataflow(&self) {
        utils::lock(&self.shared.dataflow).clear();
    }
}

impl fmt::Debug for AppHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("AppHandle")
            .field("state", &self.state())
            .finish()
    }
}

/// Identity of a component plus its handle on the application.
#[derive(Debug, Clone)]
pub struct ComponentBase {
    type_name: String,
    name: String,
    app: AppHandle,
}

impl ComponentBase {
    pub fn new(type_name: &str, name: &str, app: &AppHandle) -> Self {
        Self {
            type_name: type_name.to_string(),
            name: name.to_string(),
            app: app.clone(),
        }
    }

    pub fn type_name(&self) -> &str {
        &self.type_name
    }

    pub fn name(&self) -> &str {
        &self.name
    }

    pub fn app(&self) -> &AppHandle {
        &self.app
    }

    pub fn fsm_state(&self) -> State {
        self.app.state()
    }

    pub fn decl_prop<T: Typed>(&self, name: &str, default: T) -> Result<Prop<T>> {
        self.app.decl_prop(&self.name, name, default)
    }

    pub fn set_prop(&self, name: &str, value: impl Into<Value>) -> Result<()> {
        self.app.set_prop(&self.name, name, value)
    }

    pub fn get_prop(&self, name: &str) -> Result<Value> {
        self.app.get_prop(&self.name, name)
    }
}

/// Embeddable base of a task: identity, properties and ports.
#[derive(Debug, Clone)]
pub struct TaskBase(ComponentBase);

impl TaskBase {
    pub fn new(type_name: &str, name: &str, app: &AppHandle) -> Self {
        Self(ComponentBase::new(type_name, name, app))
    }

    pub fn decl_in_port(&self, name: &str, kind: Kind) -> Result<()> {
        self.0.app.decl_in_port(&self.0.name, name, kind)
    }

    pub fn decl_out_port(&self, name: &str, kind: Kind) -> Result<()> {
        self.0.app.decl_out_port(&self.0.name, name, kind)
    }
}

impl Deref for TaskBase {
    type Target = ComponentBase;

    fn deref(&self) -> &ComponentBase {
        &self.0
    }
}

/// Embeddable base of a service: identity and properties.
#[derive(Debug, Clone)]
pub struct SvcBase(ComponentBase);

impl SvcBase {
    pub fn new(type_name: &str, name: &str, app: &AppHandle) -> Self {
        Self(ComponentBase::new(type_name, name, app))
    }
}

impl Deref for SvcBase {
    type Target = ComponentBase;

    fn deref(&self) -> &ComponentBase {
        &self.0
    }
}
