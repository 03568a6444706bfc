// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Pluggable sequential I/O for the generic stream tasks.
//!
//! A streamer owns one external resource (a file, a socket, a generator).
//! The stream tasks guarantee that `read`/`write` are never called
//! concurrently, so implementations need no internal locking.

use std::fmt;
use std::sync::Arc;

use async_trait::async_trait;
use tokio::sync::Mutex;

use crate::config::Port;
use crate::engine::Context;
use crate::errors::{Error, Result};

#[async_trait]
pub trait InputStreamer: Send {
    async fn connect(&mut self, ports: &[Port]) -> Result<()>;

    /// Reads the next record and puts one value per port into the event store.
    ///
    /// Returns [`Error::EndOfStream`] once the resource is exhausted.
    async fn read(&mut self, ctx: &Context) -> Result<()>;

    async fn disconnect(&mut self) -> Result<()>;
}

#[async_trait]
pub trait OutputStreamer: Send {
    async fn connect(&mut self, ports: &[Port]) -> Result<()>;

    /// Takes one value per port from the event store and writes a record.
    async fn write(&mut self, ctx: &Context) -> Result<()>;

    async fn disconnect(&mut self) -> Result<()>;
}

/// Property value holding an [`InputStreamer`]. The default handle is unset.
#[derive(Clone, Default)]
pub struct InputStreamerHandle {
    inner: Option<Arc<Mutex<Box<dyn InputStreamer>>>>,
}

/// Property value holding an [`OutputStreamer`]. The default handle is unset.
#[derive(Clone, Default)]
pub struct OutputStreamerHandle {
    inner: Option<Arc<Mutex<Box<dyn OutputStreamer>>>>,
}

impl InputStreamerHandle {
    pub fn new<S: InputStreamer + 'static>(streamer: S) -> Self {
        Self {
            inner: Some(Arc::new(Mutex::new(Box::new(streamer)))),
        }
    }

    pub fn is_set(&self) -> bool {
        self.inner.is_some()
    }

    fn streamer(&self) -> Result<&Arc<Mutex<Box<dyn InputStreamer>>>> {
        self.inner
            .as_ref()
            .ok_or_else(|| Error::Config("input stream has no streamer".into()))
    }

    pub async fn connect(&self, ports: &[Port]) -> Result<()> {
        self.streamer()?.lock().await.connect(ports).await
    }

    pub async fn read(&self, ctx: &Context) -> Result<()> {
        self.streamer()?.lock().await.read(ctx).await
    }

    pub async fn disconnect(&self) -> Result<()> {
        self.streamer()?.lock().await.disconnect().await
    }
}

impl OutputStreamerHandle {
    pub fn new<S: OutputStreamer + 'static>(streamer: S) -> Self {
        Self {
            inner: Some(Arc::new(Mutex::new(Box::new(streamer)))),
        }
    }

    pub fn is_set(&self) -> bool {
        self.inner.is_some()
    }

    fn streamer(&self) -> Result<&Arc<Mutex<Box<dyn OutputStreamer>>>> {
        self.inner
            .as_ref()
            .ok_or_else(|| Error::Config("output stream has no streamer".into()))
    }

    pub async fn connect(&self, ports: &[Port]) -> Result<()> {
        self.streamer()?.lock().await.connect(ports).await
    }

    pub async fn write(&self, ctx: &Context) -> Result<()> {
        self.streamer()?.lock().await.write(ctx).await
    }

    pub async fn disconnect(&self) -> Result<()> {
        self.streamer()?.lock().await.disconnect().await
    }
}

impl fmt::Debug for InputStreamerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("InputStreamerHandle")
            .field("set", &self.is_set())
            .finish()
    }
}

impl fmt::Debug for OutputStreamerHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("OutputStreamerHandle")
            .field("set", &self.is_set())
            .finish()
    }
}
