// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Test-only tasks, services and streamers.

use std::any::Any;
use std::fs::File;
use std::io::{BufRead, BufWriter, Cursor, Write};
use std::ops::Range;
use std::path::Path;
use std::sync::atomic::{AtomicI64, AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Duration;

use anyhow::anyhow;
use async_trait::async_trait;
use tokio::sync::Notify;

use crate::config::{Kind, Port, Prop, Registry};
use crate::engine::{AppHandle, Context, SvcBase, TaskBase};
use crate::errors::{Error, Result};
use crate::traits::{
    Component, Configurer, InputStreamer, Instance, OutputStreamer, Service, Task,
};

pub const TASK1: &str = "stub::Task1";
pub const SQUARE: &str = "stub::Square";
pub const TASK4: &str = "stub::Task4";
pub const RELAY: &str = "stub::Relay";
pub const COUNTER: &str = "stub::Counter";
pub const FAIL_AT: &str = "stub::FailAt";
pub const PANICKER: &str = "stub::Panicker";
pub const SLOW: &str = "stub::Slow";
pub const REDUCER: &str = "stub::Reducer";
pub const PINGER: &str = "stub::Pinger";
pub const SVC1: &str = "stub::Svc1";

/// Built-ins plus every stub type.
pub fn registry() -> Registry {
    let mut registry = Registry::with_builtins();
    registry.register(TASK1, |t, n, app| Ok(Instance::task(Task1::new(t, n, app)?)));
    registry.register(SQUARE, |t, n, app| Ok(Instance::task(Square::new(t, n, app)?)));
    registry.register(TASK4, |t, n, app| Ok(Instance::task(Task4::new(t, n, app)?)));
    registry.register(RELAY, |t, n, app| Ok(Instance::task(Relay::new(t, n, app)?)));
    registry.register(COUNTER, |_, n, app| Ok(Instance::task(Counter::new(n, app, "ids")?)));
    registry.register(FAIL_AT, |_, n, app| Ok(Instance::task(FailAt::new(n, app, 0)?)));
    registry.register(PANICKER, |_, n, app| Ok(Instance::task(Panicker::new(n, app, 0)?)));
    registry.register(REDUCER, |t, n, app| Ok(Instance::task(Reducer::new(t, n, app)?)));
    registry.register(PINGER, |t, n, app| Ok(Instance::task(Pinger::new(t, n, app)?)));
    registry.register(SVC1, |t, n, app| Ok(Instance::service(Svc1::new(t, n, app)?)));
    registry
}

macro_rules! component {
    ($ty:ty) => {
        impl Component for $ty {
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
    };
}

/// Produces two constant integers.
pub struct Task1 {
    base: TaskBase,
    ints1: Prop<String>,
    ints2: Prop<String>,
    int1: Prop<i64>,
    int2: Prop<i64>,
}

impl Task1 {
    pub fn new(type_name: &str, name: &str, app: &AppHandle) -> Result<Self> {
        let base = TaskBase::new(type_name, name, app);
        Ok(Self {
            ints1: base.decl_prop("Ints1", "t1-ints1".to_string())?,
            ints2: base.decl_prop("Ints2", "t1-ints2".to_string())?,
            int1: base.decl_prop("Int1", 1i64)?,
            int2: base.decl_prop("Int2", 2i64)?,
            base,
        })
    }
}

component!(Task1);

#[async_trait]
impl Configurer for Task1 {
    async fn configure(&self, _ctx: &Context) -> Result<()> {
        self.base.decl_out_port(&self.ints1.get(), Kind::Int)?;
        self.base.decl_out_port(&self.ints2.get(), Kind::Int)
    }
}

#[async_trait]
impl Task for Task1 {
    async fn process(&self, ctx: &Context) -> Result<()> {
        ctx.store().put(&self.ints1.get(), self.int1.get()).await?;
        ctx.store().put(&self.ints2.get(), self.int2.get()).await
    }

    fn as_configurer(&self) -> Option<&dyn Configurer> {
        Some(self)
    }
}

/// Squares its integer input.
pub struct Square {
    base: TaskBase,
    input: Prop<String>,
    output: Prop<String>,
}

impl Square {
    pub fn new(type_name: &str, name: &str, app: &AppHandle) -> Result<Self> {
        let base = TaskBase::new(type_name, name, app);
        Ok(Self {
            input: base.decl_prop("Input", "t1-ints1".to_string())?,
            output: base.decl_prop("Output", "t2-ints1-massaged".to_string())?,
            base,
        })
    }

    pub fn with_ports(name: &str, app: &AppHandle, input: &str, output: &str) -> Result<Self> {
        let square = Self::new(SQUARE, name, app)?;
        square.base.set_prop("Input", input)?;
        square.base.set_prop("Output", output)?;
        Ok(square)
    }
}

component!(Square);

#[async_trait]
impl Configurer for Square {
    async fn configure(&self, _ctx: &Context) -> Result<()> {
        self.base.decl_in_port(&self.input.get(), Kind::Int)?;
        self.base.decl_out_port(&self.output.get(), Kind::Int)
    }
}

#[async_trait]
impl Task for Square {
    async fn process(&self, ctx: &Context) -> Result<()> {
        let v: i64 = ctx.store().get_as(&self.input.get()).await?;
        ctx.store().put(&self.output.get(), v * v).await
    }

    fn as_configurer(&self) -> Option<&dyn Configurer> {
        Some(self)
    }
}

/// Doubles a float input.
pub struct Task4 {
    base: TaskBase,
    input: Prop<String>,
    output: Prop<String>,
}

impl Task4 {
    pub fn new(type_name: &str, name: &str, app: &AppHandle) -> Result<Self> {
        let base = TaskBase::new(type_name, name, app);
        Ok(Self {
            input: base.decl_prop("Input", "t1-ints1".to_string())?,
            output: base.decl_prop("Output", "t4-floats".to_string())?,
            base,
        })
    }
}

component!(Task4);

#[async_trait]
impl Configurer for Task4 {
    async fn configure(&self, _ctx: &Context) -> Result<()> {
        self.base.decl_in_port(&self.input.get(), Kind::Float)?;
        self.base.decl_out_port(&self.output.get(), Kind::Float)
    }
}

#[async_trait]
impl Task for Task4 {
    async fn process(&self, ctx: &Context) -> Result<()> {
        let v: f64 = ctx.store().get_as(&self.input.get()).await?;
        ctx.store().put(&self.output.get(), v * 2.0).await
    }

    fn as_configurer(&self) -> Option<&dyn Configurer> {
        Some(self)
    }
}

/// Sums every integer input into every output.
pub struct Relay {
    base: TaskBase,
    inputs: Prop<Vec<String>>,
    outputs: Prop<Vec<String>>,
}

impl Relay {
    pub fn new(type_name: &str, name: &str, app: &AppHandle) -> Result<Self> {
        let base = TaskBase::new(type_name, name, app);
        Ok(Self {
            inputs: base.decl_prop("Inputs", Vec::<String>::new())?,
            outputs: base.decl_prop("Outputs", Vec::<String>::new())?,
            base,
        })
    }
}

component!(Relay);

#[async_trait]
impl Configurer for Relay {
    async fn configure(&self, _ctx: &Context) -> Result<()> {
        for input in self.inputs.get() {
            self.base.decl_in_port(&input, Kind::Int)?;
        }
        for output in self.outputs.get() {
            self.base.decl_out_port(&output, Kind::Int)?;
        }
        Ok(())
    }
}

#[async_trait]
impl Task for Relay {
    async fn process(&self, ctx: &Context) -> Result<()> {
        let mut sum = 0i64;
        for input in self.inputs.get() {
            sum += ctx.store().get_as::<i64>(&input).await?;
        }
        for output in self.outputs.get() {
            ctx.store().put(&output, sum).await?;
        }
        Ok(())
    }

    fn as_configurer(&self) -> Option<&dyn Configurer> {
        Some(self)
    }
}

/// Writes the event id.
pub struct Counter {
    base: TaskBase,
    output: Prop<String>,
}

impl Counter {
    pub fn new(name: &str, app: &AppHandle, output: &str) -> Result<Self> {
        let base = TaskBase::new(COUNTER, name, app);
        Ok(Self {
            output: base.decl_prop("Output", output.to_string())?,
            base,
        })
    }
}

component!(Counter);

#[async_trait]
impl Configurer for Counter {
    async fn configure(&self, _ctx: &Context) -> Result<()> {
        self.base.decl_out_port(&self.output.get(), Kind::Int)
    }
}

#[async_trait]
impl Task for Counter {
    async fn process(&self, ctx: &Context) -> Result<()> {
        ctx.store().put(&self.output.get(), ctx.id()).await
    }

    fn as_configurer(&self) -> Option<&dyn Configurer> {
        Some(self)
    }
}

/// Fails on one event, optionally only once `gate` was notified.
pub struct FailAt {
    base: TaskBase,
    at: Prop<i64>,
    gate: Option<Arc<Notify>>,
}

impl FailAt {
    pub fn new(name: &str, app: &AppHandle, at: i64) -> Result<Self> {
        let base = TaskBase::new(FAIL_AT, name, app);
        Ok(Self {
            at: base.decl_prop("At", at)?,
            gate: None,
            base,
        })
    }

    pub fn gated(name: &str, app: &AppHandle, at: i64, gate: Arc<Notify>) -> Result<Self> {
        Ok(Self {
            gate: Some(gate),
            ..Self::new(name, app, at)?
        })
    }
}

component!(FailAt);

#[async_trait]
impl Task for FailAt {
    async fn process(&self, ctx: &Context) -> Result<()> {
        if ctx.id() == self.at.get() {
            if let Some(gate) = &self.gate {
                gate.notified().await;
            }
            return Err(anyhow!("task [{}] failed on event {}", self.base.name(), ctx.id()).into());
        }
        Ok(())
    }
}

/// Panics on one event.
pub struct Panicker {
    base: TaskBase,
    at: Prop<i64>,
}

impl Panicker {
    pub fn new(name: &str, app: &AppHandle, at: i64) -> Result<Self> {
        let base = TaskBase::new(PANICKER, name, app);
        Ok(Self {
            at: base.decl_prop("At", at)?,
            base,
        })
    }
}

component!(Panicker);

#[async_trait]
impl Task for Panicker {
    async fn process(&self, ctx: &Context) -> Result<()> {
        if ctx.id() == self.at.get() {
            panic!("task [{}] panicked on event {}", self.base.name(), ctx.id());
        }
        Ok(())
    }
}

/// Takes `delay` on one event, notifying `started` when it begins and
/// counting the event once it is done.
pub struct Slow {
    base: TaskBase,
    at: i64,
    delay: Duration,
    started: Arc<Notify>,
    completed: AtomicU64,
}

impl Slow {
    pub fn new(name: &str, app: &AppHandle, at: i64, delay: Duration, started: Arc<Notify>) -> Self {
        Self {
            base: TaskBase::new(SLOW, name, app),
            at,
            delay,
            started,
            completed: AtomicU64::new(0),
        }
    }

    pub fn completed(&self) -> u64 {
        self.completed.load(Ordering::SeqCst)
    }
}

component!(Slow);

#[async_trait]
impl Task for Slow {
    async fn process(&self, ctx: &Context) -> Result<()> {
        if ctx.id() == self.at {
            self.started.notify_one();
            tokio::time::sleep(self.delay).await;
            self.completed.fetch_add(1, Ordering::SeqCst);
        }
        Ok(())
    }
}

/// Accumulates an integer input; checks the total against `Sum` when
/// stopping unless `Sum` is negative.
pub struct Reducer {
    base: TaskBase,
    input: Prop<String>,
    expected: Prop<i64>,
    sum: AtomicI64,
    events: AtomicU64,
}

impl Reducer {
    pub fn new(type_name: &str, name: &str, app: &AppHandle) -> Result<Self> {
        let base = TaskBase::new(type_name, name, app);
        Ok(Self {
            input: base.decl_prop("Input", "t2-ints1-massaged".to_string())?,
            expected: base.decl_prop("Sum", -1i64)?,
            sum: AtomicI64::new(0),
            events: AtomicU64::new(0),
            base,
        })
    }

    pub fn sum(&self) -> i64 {
        self.sum.load(Ordering::SeqCst)
    }

    pub fn events(&self) -> u64 {
        self.events.load(Ordering::SeqCst)
    }
}

component!(Reducer);

#[async_trait]
impl Configurer for Reducer {
    async fn configure(&self, _ctx: &Context) -> Result<()> {
        self.base.decl_in_port(&self.input.get(), Kind::Int)
    }
}

#[async_trait]
impl Task for Reducer {
    async fn process(&self, ctx: &Context) -> Result<()> {
        let v: i64 = ctx.store().get_as(&self.input.get()).await?;
        self.sum.fetch_add(v, Ordering::SeqCst);
        self.events.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stop_task(&self, _ctx: &Context) -> Result<()> {
        let expected = self.expected.get();
        if expected >= 0 && expected != self.sum() {
            return Err(anyhow!(
                "reducer [{}]: sum is {}, expected {}",
                self.base.name(),
                self.sum(),
                expected
            )
            .into());
        }
        Ok(())
    }

    fn as_configurer(&self) -> Option<&dyn Configurer> {
        Some(self)
    }
}

/// Pings the service named by `Service` on every event.
pub struct Pinger {
    base: TaskBase,
    service: Prop<String>,
}

impl Pinger {
    pub fn new(type_name: &str, name: &str, app: &AppHandle) -> Result<Self> {
        let base = TaskBase::new(type_name, name, app);
        Ok(Self {
            service: base.decl_prop("Service", "svc1".to_string())?,
            base,
        })
    }
}

component!(Pinger);

#[async_trait]
impl Task for Pinger {
    async fn process(&self, ctx: &Context) -> Result<()> {
        let svc = ctx.svc(&self.service.get())?;
        let svc1 = svc
            .as_any()
            .downcast_ref::<Svc1>()
            .ok_or_else(|| anyhow!("service [{}] is not a Svc1", svc.name()))?;
        svc1.pings.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

/// Counts its starts, stops and pings.
pub struct Svc1 {
    base: SvcBase,
    starts: AtomicU64,
    stops: AtomicU64,
    pings: AtomicU64,
}

impl Svc1 {
    pub fn new(type_name: &str, name: &str, app: &AppHandle) -> Result<Self> {
        Ok(Self {
            base: SvcBase::new(type_name, name, app),
            starts: AtomicU64::new(0),
            stops: AtomicU64::new(0),
            pings: AtomicU64::new(0),
        })
    }

    pub fn starts(&self) -> u64 {
        self.starts.load(Ordering::SeqCst)
    }

    pub fn stops(&self) -> u64 {
        self.stops.load(Ordering::SeqCst)
    }

    pub fn pings(&self) -> u64 {
        self.pings.load(Ordering::SeqCst)
    }
}

component!(Svc1);

#[async_trait]
impl Service for Svc1 {
    async fn start_svc(&self, _ctx: &Context) -> Result<()> {
        self.starts.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }

    async fn stop_svc(&self, _ctx: &Context) -> Result<()> {
        self.stops.fetch_add(1, Ordering::SeqCst);
        Ok(())
    }
}

fn int_ports(ports: &[Port]) -> Result<Vec<String>> {
    ports
        .iter()
        .map(|p| match p.kind {
            Kind::Int => Ok(p.name.clone()),
            ref other => Err(Error::Config(format!(
                "line streams carry i64 only, port [{}] is {}",
                p.name, other
            ))),
        })
        .collect()
}

/// Reads whitespace-separated integers, one line per event and one field per
/// port.
pub struct LineReader {
    source: Box<dyn BufRead + Send>,
    ports: Vec<String>,
}

impl LineReader {
    pub fn new(source: impl BufRead + Send + 'static) -> Self {
        Self {
            source: Box::new(source),
            ports: Vec::new(),
        }
    }

    /// One line per integer of `range`.
    pub fn range(range: Range<i64>) -> Self {
        let text: String = range.map(|i| format!("{i}\n")).collect();
        Self::new(Cursor::new(text.into_bytes()))
    }
}

#[async_trait]
impl InputStreamer for LineReader {
    async fn connect(&mut self, ports: &[Port]) -> Result<()> {
        self.ports = int_ports(ports)?;
        Ok(())
    }

    async fn read(&mut self, ctx: &Context) -> Result<()> {
        let mut line = String::new();
        if self.source.read_line(&mut line)? == 0 {
            return Err(Error::EndOfStream);
        }

        let fields: Vec<&str> = line.split_whitespace().collect();
        if fields.len() != self.ports.len() {
            return Err(anyhow!("expected {} fields, got [{}]", self.ports.len(), line.trim()).into());
        }
        for (port, field) in self.ports.iter().zip(fields) {
            let v: i64 = field.parse().map_err(anyhow::Error::from)?;
            ctx.store().put(port, v).await?;
        }
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        Ok(())
    }
}

/// Writes one line of space-separated integers per event.
pub struct LineWriter {
    sink: BufWriter<Box<dyn Write + Send>>,
    ports: Vec<String>,
}

impl LineWriter {
    pub fn new(sink: impl Write + Send + 'static) -> Self {
        Self {
            sink: BufWriter::new(Box::new(sink)),
            ports: Vec::new(),
        }
    }

    pub fn create(path: &Path) -> Result<Self> {
        Ok(Self::new(File::create(path)?))
    }
}

#[async_trait]
impl OutputStreamer for LineWriter {
    async fn connect(&mut self, ports: &[Port]) -> Result<()> {
        self.ports = int_ports(ports)?;
        Ok(())
    }

    async fn write(&mut self, ctx: &Context) -> Result<()> {
        let mut fields = Vec::with_capacity(self.ports.len());
        for port in &self.ports {
            fields.push(ctx.store().get_as::<i64>(port).await?.to_string());
        }
        writeln!(self.sink, "{}", fields.join(" "))?;
        Ok(())
    }

    async fn disconnect(&mut self) -> Result<()> {
        self.sink.flush()?;
        Ok(())
    }
}
