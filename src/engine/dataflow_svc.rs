// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::any::Any;

use async_trait::async_trait;

use crate::config::consts::PROP_DOT_FILE;
use crate::config::Prop;
use crate::engine::{AppHandle, Context, SvcBase};
use crate::errors::{Error, Result};
use crate::observability::messages::dataflow::{GraphExported, ValidationFailed};
use crate::observability::messages::StructuredLog;
use crate::traits::{Component, Service};

/// Built-in service validating the declared data flow when the application
/// starts. It is the first service started, so nothing else starts on an
/// invalid graph.
///
/// Its `DotFile` property names a file to write the graph to: JSON when the
/// path ends in `.json`, Graphviz otherwise. Empty means no export.
pub struct DataFlowSvc {
    base: SvcBase,
    dot_file: Prop<String>,
}

impl DataFlowSvc {
    pub fn new(type_name: &str, name: &str, app: &AppHandle) -> Result<Self> {
        let base = SvcBase::new(type_name, name, app);
        let dot_file = base.decl_prop(PROP_DOT_FILE, String::new())?;
        Ok(Self { base, dot_file })
    }

    async fn export(&self, path: &str) -> Result<()> {
        let (contents, format) = if path.ends_with(".json") {
            (self.base.app().with_dataflow(|df| df.to_json())?, "json")
        } else {
            (self.base.app().with_dataflow(|df| df.to_dot()), "dot")
        };
        tokio::fs::write(path, contents).await?;
        GraphExported { path, format }.log();
        Ok(())
    }
}

impl Component for DataFlowSvc {
    fn type_name(&self) -> &str {
        self.base.type_name()
    }

    fn name(&self) -> &str {
        self.base.name()
    }

    fn as_any(&self) -> &dyn Any {
        self
    }
}

#[async_trait]
impl Service for DataFlowSvc {
    async fn start_svc(&self, _ctx: &Context) -> Result<()> {
        if let Err(errors) = self.base.app().with_dataflow(|df| df.validate()) {
            for problem in &errors {
                ValidationFailed { problem }.log();
            }
            return Err(Error::Validation(errors));
        }

        let path = self.dot_file.get();
        if !path.is_empty() {
            self.export(&path).await?;
        }
        Ok(())
    }
}
