// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-component property storage.
//!
//! A component declares each property once, at construction, and keeps the
//! returned [`Prop`] handle. The table only knows the slot behind the handle,
//! so setting a property by name writes straight into the component's own
//! storage.

use std::collections::BTreeMap;
use std::fmt;
use std::sync::{Arc, RwLock};

use crate::config::value::{Kind, Typed, Value};
use crate::errors::{Error, Result};
use crate::utils;

trait Slot: Send + Sync {
    fn kind(&self) -> Kind;
    fn get(&self) -> Value;
    fn set(&self, value: &Value) -> bool;
}

impl<T: Typed> Slot for RwLock<T> {
    fn kind(&self) -> Kind {
        T::kind()
    }

    fn get(&self) -> Value {
        utils::read(self).clone().into_value()
    }

    fn set(&self, value: &Value) -> bool {
        match T::from_value(value) {
            Some(v) => {
                *utils::write(self) = v;
                true
            }
            None => false,
        }
    }
}

/// Typed handle to one declared property.
pub struct Prop<T> {
    slot: Arc<RwLock<T>>,
}

impl<T: Typed> Prop<T> {
    /// Current value of the property.
    pub fn get(&self) -> T {
        utils::read(&self.slot).clone()
    }
}

impl<T> Clone for Prop<T> {
    fn clone(&self) -> Self {
        Self {
            slot: Arc::clone(&self.slot),
        }
    }
}

impl<T: fmt::Debug> fmt::Debug for Prop<T> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_tuple("Prop").field(&*utils::read(&self.slot)).finish()
    }
}

#[derive(Default)]
pub struct PropertyTable {
    components: BTreeMap<String, BTreeMap<String, Arc<dyn Slot>>>,
}

impl PropertyTable {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn declare<T: Typed>(&mut self, component: &str, name: &str, default: T) -> Result<Prop<T>> {
        let props = self.components.entry(component.to_string()).or_default();
        if props.contains_key(name) {
            return Err(Error::DuplicateProperty {
                component: component.to_string(),
                property: name.to_string(),
            });
        }

        let slot = Arc::new(RwLock::new(default));
        props.insert(name.to_string(), slot.clone());
        Ok(Prop { slot })
    }

    pub fn set(&self, component: &str, name: &str, value: &Value) -> Result<()> {
        let slot = self.slot(component, name)?;
        if slot.set(value) {
            Ok(())
        } else {
            Err(Error::PropertyKind {
                component: component.to_string(),
                property: name.to_string(),
                expected: slot.kind(),
                actual: value.kind(),
            })
        }
    }

    pub fn get(&self, component: &str, name: &str) -> Result<Value> {
        Ok(self.slot(component, name)?.get())
    }

    pub fn kind(&self, component: &str, name: &str) -> Result<Kind> {
        Ok(self.slot(component, name)?.kind())
    }

    pub fn has(&self, component: &str, name: &str) -> bool {
        self.components
            .get(component)
            .is_some_and(|props| props.contains_key(name))
    }

    /// Declared property names of `component`, sorted.
    pub fn names(&self, component: &str) -> Vec<String> {
        self.components
            .get(component)
            .map(|props| props.keys().cloned().collect())
            .unwrap_or_default()
    }

    fn slot(&self, component: &str, name: &str) -> Result<&Arc<dyn Slot>> {
        self.components
            .get(component)
            .and_then(|props| props.get(name))
            .ok_or_else(|| Error::UnknownProperty {
                component: component.to_string(),
                property: name.to_string(),
            })
    }
}
