// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Generic tasks bridging the pipeline to sequential I/O.
//!
//! An [`InputStream`] declares its `Ports` as out-ports and fills them from
//! an [`InputStreamer`](crate::traits::InputStreamer) once per event; an
//! [`OutputStream`] declares them as in-ports and hands them to an
//! [`OutputStreamer`](crate::traits::OutputStreamer). The scheduler may call
//! `process` from several workers at once, so every call is funneled through
//! one I/O worker started with the task.

mod control;

use std::any::Any;
use std::sync::Mutex;

use async_trait::async_trait;

use crate::backends::stream::control::StreamControl;
use crate::config::consts::{PROP_PORTS, PROP_STREAMER};
use crate::config::{Port, Prop, Typed};
use crate::engine::{AppHandle, Context, TaskBase};
use crate::errors::{Direction, Error, Result};
use crate::observability::messages::stream::{StreamConnected, StreamDisconnected};
use crate::observability::messages::StructuredLog;
use crate::traits::{Component, Configurer, InputStreamerHandle, OutputStreamerHandle, Task};
use crate::utils;

/// A streamer handle as seen by a stream task.
#[async_trait]
pub trait Endpoint: Typed + Default {
    /// Direction of the ports the task declares.
    const DIRECTION: Direction;

    async fn open(&self, ports: &[Port]) -> Result<()>;

    async fn serve(&self, ctx: &Context) -> Result<()>;

    async fn close(&self) -> Result<()>;
}

#[async_trait]
impl Endpoint for InputStreamerHandle {
    const DIRECTION: Direction = Direction::Out;

    async fn open(&self, ports: &[Port]) -> Result<()> {
        self.connect(ports).await
    }

    async fn serve(&self, ctx: &Context) -> Result<()> {
        self.read(ctx).await
    }

    async fn close(&self) -> Result<()> {
        self.disconnect().await
    }
}

#[async_trait]
impl Endpoint for OutputStreamerHandle {
    const DIRECTION: Direction = Direction::In;

    async fn open(&self, ports: &[Port]) -> Result<()> {
        self.connect(ports).await
    }

    async fn serve(&self, ctx: &Context) -> Result<()> {
        self.write(ctx).await
    }

    async fn close(&self) -> Result<()> {
        self.disconnect().await
    }
}

/// Reads one record per event into the store.
pub type InputStream = Stream<InputStreamerHandle>;

/// Writes one record per event from the store.
pub type OutputStream = Stream<OutputStreamerHandle>;

pub struct Stream<E: Endpoint> {
    base: TaskBase,
    ports: Prop<Vec<Port>>,
    streamer: Prop<E>,
    control: Mutex<Option<StreamControl>>,
}

impl<E: Endpoint> Stream<E> {
    pub fn new(type_name: &str, name: &str, app: &AppHandle) -> Result<Self> {
        let base = TaskBase::new(type_name, name, app);
        let ports = base.decl_prop(PROP_PORTS, Vec::<Port>::new())?;
        let streamer = base.decl_prop(PROP_STREAMER, E::default())?;
        Ok(Self {
            base,
            ports,
            streamer,
            control: Mutex::new(None),
        })
    }

    pub fn ports(&self) -> Vec<Port> {
        self.ports.get()
    }
}

impl<E: Endpoint> Component for Stream<E> {
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
impl<E: Endpoint> Configurer for Stream<E> {
    async fn configure(&self, _ctx: &Context) -> Result<()> {
        for port in self.ports.get() {
            match E::DIRECTION {
                Direction::Out => self.base.decl_out_port(&port.name, port.kind)?,
                Direction::In => self.base.decl_in_port(&port.name, port.kind)?,
            }
        }
        Ok(())
    }
}

#[async_trait]
impl<E: Endpoint> Task for Stream<E> {
    async fn start_task(&self, _ctx: &Context) -> Result<()> {
        let streamer = self.streamer.get();
        let ports = self.ports.get();
        streamer.open(&ports).await?;

        let names: Vec<String> = ports.into_iter().map(|p| p.name).collect();
        let connected = StreamConnected {
            component: self.base.name(),
            direction: E::DIRECTION,
            ports: &names,
        };
        connected.log();

        let control = StreamControl::spawn(streamer, connected.span("io_worker"));
        *utils::lock(&self.control) = Some(control);
        Ok(())
    }

    async fn process(&self, ctx: &Context) -> Result<()> {
        let client = utils::lock(&self.control)
            .as_ref()
            .map(StreamControl::client)
            .ok_or_else(|| Error::Config(format!("stream [{}] is not started", self.base.name())))?;
        client.request(ctx).await
    }

    async fn stop_task(&self, _ctx: &Context) -> Result<()> {
        let control = utils::lock(&self.control).take();
        let Some(control) = control else {
            return Ok(());
        };

        let served = control.shutdown().await?;
        self.streamer.get().close().await?;
        StreamDisconnected {
            component: self.base.name(),
            served,
        }
        .log();
        Ok(())
    }

    fn as_configurer(&self) -> Option<&dyn Configurer> {
        Some(self)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backends::stub::{LineReader, LineWriter};
    use crate::config::Kind;
    use crate::engine::fsm::State;
    use crate::engine::Store;
    use crate::observability::{Level, MsgStream};
    use std::collections::BTreeMap;
    use std::sync::Arc;
    use tokio_util::sync::CancellationToken;

    fn lifecycle() -> Context {
        Context::lifecycle(MsgStream::new("test", Level::Error), Arc::new(BTreeMap::new()))
    }

    fn event(id: i64, keys: &[&str]) -> Context {
        Context::new(
            id,
            0,
            Arc::new(Store::new(keys.iter().copied())),
            MsgStream::new("test", Level::Error),
            Arc::new(BTreeMap::new()),
            CancellationToken::new(),
        )
    }

    #[tokio::test]
    async fn test_start_requires_a_streamer() {
        let app = AppHandle::new();
        let input = InputStream::new("eventloom::InputStream", "in", &app).unwrap();
        let err = input.start_task(&lifecycle()).await.unwrap_err();
        assert!(matches!(err, Error::Config(_)), "got {err}");
    }

    #[tokio::test]
    async fn test_process_before_start_fails() {
        let app = AppHandle::new();
        let output = OutputStream::new("eventloom::OutputStream", "out", &app).unwrap();
        let err = output.process(&event(0, &[])).await.unwrap_err();
        assert_eq!(err.to_string(), "config: stream [out] is not started");
        // stopping a stream that never started is a no-op
        output.stop_task(&lifecycle()).await.unwrap();
    }

    #[tokio::test]
    async fn test_configure_declares_ports_by_direction() {
        let app = AppHandle::new();
        let input = InputStream::new("eventloom::InputStream", "in", &app).unwrap();
        let output = OutputStream::new("eventloom::OutputStream", "out", &app).unwrap();
        let ports = vec![Port::new("ints", Kind::Int)];
        input.base.set_prop(PROP_PORTS, ports.clone()).unwrap();
        output.base.set_prop(PROP_PORTS, ports).unwrap();

        app.set_state(State::Configuring);
        input.configure(&lifecycle()).await.unwrap();
        output.configure(&lifecycle()).await.unwrap();

        app.with_dataflow(|df| {
            assert_eq!(df.nodes()["in"].outs.get("ints"), Some(&Kind::Int));
            assert_eq!(df.nodes()["out"].ins.get("ints"), Some(&Kind::Int));
            assert!(df.validate().is_ok());
        });
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn test_concurrent_reads_are_serialized() {
        let app = AppHandle::new();
        let input = Arc::new(InputStream::new("eventloom::InputStream", "in", &app).unwrap());
        input
            .base
            .set_prop(PROP_PORTS, vec![Port::new("ints", Kind::Int)])
            .unwrap();
        input
            .base
            .set_prop(PROP_STREAMER, InputStreamerHandle::new(LineReader::range(0..16)))
            .unwrap();
        input.start_task(&lifecycle()).await.unwrap();

        let mut handles = Vec::new();
        for id in 0..16 {
            let input = input.clone();
            handles.push(tokio::spawn(async move {
                let ctx = event(id, &["ints"]);
                input.process(&ctx).await.unwrap();
                ctx.store().get_as::<i64>("ints").await.unwrap()
            }));
        }

        let mut values = Vec::new();
        for handle in handles {
            values.push(handle.await.unwrap());
        }
        values.sort_unstable();
        assert_eq!(values, (0..16).collect::<Vec<i64>>());

        let err = input.process(&event(16, &["ints"])).await.unwrap_err();
        assert!(err.is_end_of_stream());
        input.stop_task(&lifecycle()).await.unwrap();
    }

    #[tokio::test]
    async fn test_output_writes_records() {
        let file = tempfile::NamedTempFile::new().unwrap();
        let app = AppHandle::new();
        let output = OutputStream::new("eventloom::OutputStream", "out", &app).unwrap();
        output
            .base
            .set_prop(PROP_PORTS, vec![Port::new("a", Kind::Int), Port::new("b", Kind::Int)])
            .unwrap();
        output
            .base
            .set_prop(
                PROP_STREAMER,
                OutputStreamerHandle::new(LineWriter::create(file.path()).unwrap()),
            )
            .unwrap();
        output.start_task(&lifecycle()).await.unwrap();

        for id in 0..3 {
            let ctx = event(id, &["a", "b"]);
            ctx.store().put("a", id).await.unwrap();
            ctx.store().put("b", id * 10).await.unwrap();
            output.process(&ctx).await.unwrap();
        }
        output.stop_task(&lifecycle()).await.unwrap();

        let written = std::fs::read_to_string(file.path()).unwrap();
        assert_eq!(written, "0 0\n1 10\n2 20\n");
    }
}
