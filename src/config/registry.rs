// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::HashMap;
use std::fmt;
use std::sync::Arc;

use crate::backends::stream::{InputStream, OutputStream};
use crate::config::consts::{DATAFLOW_TYPE, INPUT_STREAM_TYPE, OUTPUT_STREAM_TYPE};
use crate::engine::{AppHandle, DataFlowSvc};
use crate::errors::{Error, Result};
use crate::traits::Instance;

/// Builds a component from its type name, its name and the owning application.
pub type Factory = Arc<dyn Fn(&str, &str, &AppHandle) -> Result<Instance> + Send + Sync>;

/// Maps fully-qualified type names to component factories.
///
/// Registering a type a second time replaces the earlier factory.
#[derive(Clone, Default)]
pub struct Registry {
    factories: HashMap<String, Factory>,
}

impl Registry {
    /// An empty registry.
    pub fn new() -> Self {
        Self::default()
    }

    /// A registry holding the built-in data-flow service and stream tasks.
    pub fn with_builtins() -> Self {
        let mut registry = Self::new();
        registry.register(DATAFLOW_TYPE, |typ, name, app| {
            Ok(Instance::service(DataFlowSvc::new(typ, name, app)?))
        });
        registry.register(INPUT_STREAM_TYPE, |typ, name, app| {
            Ok(Instance::task(InputStream::new(typ, name, app)?))
        });
        registry.register(OUTPUT_STREAM_TYPE, |typ, name, app| {
            Ok(Instance::task(OutputStream::new(typ, name, app)?))
        });
        registry
    }

    pub fn register<F>(&mut self, type_name: impl Into<String>, factory: F)
    where
        F: Fn(&str, &str, &AppHandle) -> Result<Instance> + Send + Sync + 'static,
    {
        let type_name = type_name.into();
        if self
            .factories
            .insert(type_name.clone(), Arc::new(factory))
            .is_some()
        {
            tracing::debug!(type_name = %type_name, "registry: replaced factory for [{}]", type_name);
        }
    }

    pub fn contains(&self, type_name: &str) -> bool {
        self.factories.contains_key(type_name)
    }

    /// Registered type names, sorted.
    pub fn types(&self) -> Vec<&str> {
        let mut types: Vec<&str> = self.factories.keys().map(String::as_str).collect();
        types.sort_unstable();
        types
    }

    pub fn create(&self, type_name: &str, name: &str, app: &AppHandle) -> Result<Instance> {
        let factory = self
            .factories
            .get(type_name)
            .ok_or_else(|| Error::UnknownType(type_name.to_string()))?;
        factory(type_name, name, app)
    }
}

impl fmt::Debug for Registry {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Registry")
            .field("types", &self.types())
            .finish()
    }
}
