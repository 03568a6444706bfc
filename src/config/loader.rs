// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::fs;
use std::path::Path;

use serde::Deserialize;
use serde_json::Value as Raw;

use crate::config::consts::{
    APP_NAME, DEFAULT_EVT_MAX, DEFAULT_MSG_LEVEL, DEFAULT_N_PROCS, PROP_EVT_MAX, PROP_MSG_LEVEL,
    PROP_N_PROCS,
};
use crate::config::{Kind, Port, Registry, Value};
use crate::engine::App;
use crate::errors::{Error, Result};

/// A job description: run-wide settings plus the components of the pipeline.
///
/// # Example
/// ```yaml
/// evt_max: 10
/// n_procs: 4
/// msg_level: DEBUG
/// components:
///   - type: "my::Squarer"
///     name: "t2"
///     props:
///       Input: "ints"
///       Output: "squares"
///   - type: "eventloom::OutputStream"
///     name: "out"
///     props:
///       Ports:
///         - { name: "squares", kind: "i64" }
/// ```
#[derive(Debug, Clone, Deserialize)]
pub struct JobConfig {
    #[serde(default = "default_evt_max")]
    pub evt_max: i64,
    #[serde(default = "default_n_procs")]
    pub n_procs: i64,
    #[serde(default = "default_msg_level")]
    pub msg_level: String,
    #[serde(default)]
    pub components: Vec<ComponentConfig>,
}

/// One component of a job. Property values are converted to the kind each
/// property was declared with.
#[derive(Debug, Clone, Deserialize)]
pub struct ComponentConfig {
    #[serde(rename = "type")]
    pub type_name: String,
    pub name: String,
    #[serde(default)]
    pub props: BTreeMap<String, Raw>,
}

fn default_evt_max() -> i64 {
    DEFAULT_EVT_MAX
}

fn default_n_procs() -> i64 {
    DEFAULT_N_PROCS
}

fn default_msg_level() -> String {
    DEFAULT_MSG_LEVEL.to_string()
}

impl JobConfig {
    /// Creates every component through `registry` and sets its properties.
    ///
    /// The returned application has not been configured yet; streamer
    /// properties, which cannot come from a file, may still be set on it.
    pub fn build(&self, registry: Registry) -> Result<App> {
        let mut app = App::new(registry)?;
        app.set_prop(APP_NAME, PROP_EVT_MAX, self.evt_max)?;
        app.set_prop(APP_NAME, PROP_N_PROCS, self.n_procs)?;
        app.set_prop(APP_NAME, PROP_MSG_LEVEL, self.msg_level.clone())?;

        for component in &self.components {
            app.create(&component.type_name, &component.name)?;
            for (prop, raw) in &component.props {
                let kind = app.handle().prop_kind(&component.name, prop)?;
                let value = convert(raw, &kind).ok_or_else(|| {
                    Error::Config(format!(
                        "component [{}] property [{}] expects {}, got {}",
                        component.name, prop, kind, raw
                    ))
                })?;
                app.set_prop(&component.name, prop, value)?;
            }
        }
        Ok(app)
    }
}

fn convert(raw: &Raw, kind: &Kind) -> Option<Value> {
    fn list<T>(raw: &Raw, item: impl Fn(&Raw) -> Option<T>) -> Option<Vec<T>> {
        raw.as_array()?.iter().map(item).collect()
    }

    let value = match kind {
        Kind::Bool => Value::Bool(raw.as_bool()?),
        Kind::Int => Value::Int(raw.as_i64()?),
        Kind::Float => Value::Float(raw.as_f64()?),
        Kind::Str => Value::Str(raw.as_str()?.to_string()),
        Kind::Ints => Value::Ints(list(raw, Raw::as_i64)?),
        Kind::Floats => Value::Floats(list(raw, Raw::as_f64)?),
        Kind::Strs => Value::Strs(list(raw, |r| r.as_str().map(str::to_string))?),
        Kind::Ports => Value::Ports(serde_json::from_value::<Vec<Port>>(raw.clone()).ok()?),
        Kind::InputStreamer | Kind::OutputStreamer | Kind::Object(_) => return None,
    };
    Some(value)
}

/// Loads a job from a YAML file, or from TOML when the path ends in `.toml`.
pub fn load_job<P: AsRef<Path>>(path: P) -> Result<JobConfig> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    let job = if path.extension().is_some_and(|ext| ext == "toml") {
        toml::from_str(&content)?
    } else {
        serde_yaml::from_str(&content)?
    };
    Ok(job)
}
