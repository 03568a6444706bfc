// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::{BTreeMap, BTreeSet};
use std::sync::Arc;
use std::time::Instant;

use crate::config::consts::{
    APP_NAME, DATAFLOW_NAME, DATAFLOW_TYPE, DEFAULT_EVT_MAX, DEFAULT_MSG_LEVEL, DEFAULT_N_PROCS,
    PROP_EVT_MAX, PROP_MSG_LEVEL, PROP_N_PROCS,
};
use crate::config::{Prop, Registry, Value};
use crate::engine::context::{Context, Services};
use crate::engine::dataflow_svc::DataFlowSvc;
use crate::engine::fsm::{self, Gate, State};
use crate::engine::handle::AppHandle;
use crate::engine::worker::{RunReport, Scheduler};
use crate::errors::{stack, Error, Result};
use crate::observability::messages::dataflow::DataFlowSummary;
use crate::observability::messages::lifecycle::{
    ComponentCreated, LifecycleStepFailed, TransitionCompleted,
};
use crate::observability::messages::StructuredLog;
use crate::observability::{Level, MsgStream};
use crate::traits::{Instance, Service, Task};

/// Owns every component of one pipeline and drives its lifecycle.
///
/// The application is itself the component named `app`, carrying the
/// properties `EvtMax`, `NProcs` and `MsgLevel`. The data-flow service is
/// created with it, ahead of any other service.
pub struct App {
    handle: AppHandle,
    registry: Registry,
    tasks: Vec<Arc<dyn Task>>,
    services: Vec<Arc<dyn Service>>,
    names: BTreeSet<String>,
    evt_max: Prop<i64>,
    n_procs: Prop<i64>,
    msg_level: Prop<String>,
    msg: MsgStream,
    next_event: i64,
}

impl App {
    pub fn new(registry: Registry) -> Result<Self> {
        let handle = AppHandle::new();
        let evt_max = handle.decl_prop(APP_NAME, PROP_EVT_MAX, DEFAULT_EVT_MAX)?;
        let n_procs = handle.decl_prop(APP_NAME, PROP_N_PROCS, DEFAULT_N_PROCS)?;
        let msg_level = handle.decl_prop(APP_NAME, PROP_MSG_LEVEL, DEFAULT_MSG_LEVEL.to_string())?;

        let mut app = Self {
            handle,
            registry,
            tasks: Vec::new(),
            services: Vec::new(),
            names: BTreeSet::from([APP_NAME.to_string()]),
            evt_max,
            n_procs,
            msg_level,
            msg: MsgStream::new(APP_NAME, Level::default()),
            next_event: 0,
        };

        let dataflow = DataFlowSvc::new(DATAFLOW_TYPE, DATAFLOW_NAME, &app.handle)?;
        app.add(Instance::service(dataflow))?;
        Ok(app)
    }

    pub fn handle(&self) -> &AppHandle {
        &self.handle
    }

    pub fn registry_mut(&mut self) -> &mut Registry {
        &mut self.registry
    }

    pub fn fsm_state(&self) -> State {
        self.handle.state()
    }

    /// Creates a component through the registry and adds it to the pipeline.
    pub fn create(&mut self, type_name: &str, name: &str) -> Result<()> {
        if self.names.contains(name) {
            return Err(Error::DuplicateComponent(name.to_string()));
        }
        let instance = self.registry.create(type_name, name, &self.handle)?;
        self.add(instance)
    }

    /// [`App::create`] followed by setting each of `props`.
    pub fn create_with<I, K>(&mut self, type_name: &str, name: &str, props: I) -> Result<()>
    where
        I: IntoIterator<Item = (K, Value)>,
        K: AsRef<str>,
    {
        self.create(type_name, name)?;
        for (prop, value) in props {
            self.handle.set_prop(name, prop.as_ref(), value)?;
        }
        Ok(())
    }

    /// Adds an already built component.
    pub fn add(&mut self, instance: Instance) -> Result<()> {
        let name = instance.name().to_string();
        if !self.names.insert(name.clone()) {
            return Err(Error::DuplicateComponent(name));
        }

        let kind = match &instance {
            Instance::Task(_) => "task",
            Instance::Service(_) => "service",
        };
        ComponentCreated {
            type_name: instance.type_name(),
            name: &name,
            kind,
        }
        .log();

        match instance {
            Instance::Task(task) => self.tasks.push(task),
            Instance::Service(svc) => self.services.push(svc),
        }
        Ok(())
    }

    pub fn set_prop(&self, component: &str, name: &str, value: impl Into<Value>) -> Result<()> {
        self.handle.set_prop(component, name, value)
    }

    pub fn get_prop(&self, component: &str, name: &str) -> Result<Value> {
        self.handle.get_prop(component, name)
    }

    pub fn task(&self, name: &str) -> Result<&Arc<dyn Task>> {
        self.tasks
            .iter()
            .find(|t| t.name() == name)
            .ok_or_else(|| Error::UnknownComponent(name.to_string()))
    }

    pub fn service(&self, name: &str) -> Result<&Arc<dyn Service>> {
        self.services
            .iter()
            .find(|s| s.name() == name)
            .ok_or_else(|| Error::UnknownService(name.to_string()))
    }

    pub fn tasks(&self) -> &[Arc<dyn Task>] {
        &self.tasks
    }

    pub fn services(&self) -> &[Arc<dyn Service>] {
        &self.services
    }

    pub fn has_component(&self, name: &str) -> bool {
        self.names.contains(name)
    }

    /// Step-by-step control over the lifecycle.
    pub fn scripter(&mut self) -> Scripter<'_> {
        Scripter { app: self }
    }

    /// Drives the lifecycle to the end from whatever state the application
    /// is in, processing `EvtMax` events.
    ///
    /// A failing run still stops and shuts down the components; the run's
    /// error is the one returned.
    pub async fn run(&mut self) -> Result<RunReport> {
        if self.fsm_state() == State::Undefined {
            self.configure().await?;
        }
        if self.fsm_state() == State::Configured {
            self.start().await?;
        }

        let mut report = RunReport::default();
        if matches!(self.fsm_state(), State::Started | State::Running) {
            match self.run_events(self.evt_max.get()).await {
                Ok(r) => report = r,
                Err(err) => {
                    if let Err(stop_err) = self.finish().await {
                        self.msg.error(format_args!("teardown after failed run: {stop_err}"));
                    }
                    return Err(err);
                }
            }
        }

        self.finish().await?;
        Ok(report)
    }

    async fn finish(&mut self) -> Result<()> {
        if matches!(self.fsm_state(), State::Started | State::Running) {
            self.stop().await?;
        }
        if self.fsm_state() == State::Stopped {
            self.shutdown().await?;
        }
        Ok(())
    }

    fn enter(&self, gate: Gate, transient: State) -> Result<Instant> {
        gate.check(self.fsm_state())?;
        self.handle.set_state(transient);
        Ok(Instant::now())
    }

    fn leave(&self, gate: Gate, state: State, started: Instant) {
        self.handle.set_state(state);
        TransitionCompleted {
            op: gate.op,
            state,
            duration: started.elapsed(),
        }
        .log();
    }

    fn services_by_name(&self) -> Services {
        Arc::new(
            self.services
                .iter()
                .map(|s| (s.name().to_string(), Arc::clone(s)))
                .collect::<BTreeMap<_, _>>(),
        )
    }

    fn step_context(&self) -> Context {
        Context::lifecycle(self.msg.clone(), self.services_by_name())
    }

    fn step_failed(op: &'static str, component: &str, err: Error) -> Error {
        LifecycleStepFailed {
            op,
            component,
            error: &err,
        }
        .log();
        stack::wrap(err)
    }

    async fn configure(&mut self) -> Result<()> {
        let started = self.enter(fsm::CONFIGURE, State::Configuring)?;

        let level: Level = self.msg_level.get().parse()?;
        self.msg = MsgStream::new(APP_NAME, level);
        let ctx = self.step_context();

        for svc in &self.services {
            if let Some(configurer) = svc.as_configurer() {
                let ctx = ctx.with_msg(self.msg.named(svc.name()));
                configurer
                    .configure(&ctx)
                    .await
                    .map_err(|e| Self::step_failed("configure", svc.name(), e))?;
            }
        }
        for task in &self.tasks {
            if let Some(configurer) = task.as_configurer() {
                let ctx = ctx.with_msg(self.msg.named(task.name()));
                configurer
                    .configure(&ctx)
                    .await
                    .map_err(|e| Self::step_failed("configure", task.name(), e))?;
            }
        }

        self.handle.with_dataflow(|df| {
            let edges: Vec<String> = df.edges().into_keys().collect();
            DataFlowSummary {
                nodes: df.nodes().len(),
                edges: &edges,
            }
            .log();
        });

        self.leave(fsm::CONFIGURE, State::Configured, started);
        Ok(())
    }

    async fn start(&mut self) -> Result<()> {
        let started = self.enter(fsm::START, State::Starting)?;
        let ctx = self.step_context();

        for svc in &self.services {
            let ctx = ctx.with_msg(self.msg.named(svc.name()));
            svc.start_svc(&ctx)
                .await
                .map_err(|e| Self::step_failed("start", svc.name(), e))?;
        }
        for task in &self.tasks {
            let ctx = ctx.with_msg(self.msg.named(task.name()));
            task.start_task(&ctx)
                .await
                .map_err(|e| Self::step_failed("start", task.name(), e))?;
        }

        self.leave(fsm::START, State::Started, started);
        Ok(())
    }

    async fn run_events(&mut self, evt_max: i64) -> Result<RunReport> {
        let started = self.enter(fsm::RUN, State::Running)?;

        let scheduler = Scheduler::new(
            self.tasks.clone(),
            self.handle.with_dataflow(|df| df.store_keys()),
            &self.msg,
            self.services_by_name(),
            self.n_procs.get(),
        );
        let report = scheduler.run(self.next_event, evt_max).await?;
        self.next_event += report.processed as i64;

        self.leave(fsm::RUN, State::Running, started);
        Ok(report)
    }

    async fn stop(&mut self) -> Result<()> {
        let started = self.enter(fsm::STOP, State::Stopping)?;
        let ctx = self.step_context();

        for task in &self.tasks {
            let ctx = ctx.with_msg(self.msg.named(task.name()));
            task.stop_task(&ctx)
                .await
                .map_err(|e| Self::step_failed("stop", task.name(), e))?;
        }
        for svc in &self.services {
            let ctx = ctx.with_msg(self.msg.named(svc.name()));
            svc.stop_svc(&ctx)
                .await
                .map_err(|e| Self::step_failed("stop", svc.name(), e))?;
        }

        self.leave(fsm::STOP, State::Stopped, started);
        Ok(())
    }

    async fn shutdown(&mut self) -> Result<()> {
        let started = self.enter(fsm::SHUTDOWN, State::Offline)?;
        self.handle.clear_dataflow();
        self.leave(fsm::SHUTDOWN, State::Offline, started);
        Ok(())
    }
}

/// Step-by-step lifecycle driver, see [`App::scripter`].
pub struct Scripter<'a> {
    app: &'a mut App,
}

impl Scripter<'_> {
    pub async fn configure(&mut self) -> Result<()> {
        self.app.configure().await
    }

    pub async fn start(&mut self) -> Result<()> {
        self.app.start().await
    }

    /// Processes up to `evt_max` more events; negative means until the input
    /// runs out. May be called again while the application is running.
    pub async fn run(&mut self, evt_max: i64) -> Result<RunReport> {
        self.app.run_events(evt_max).await
    }

    pub async fn stop(&mut self) -> Result<()> {
        self.app.stop().await
    }

    pub async fn shutdown(&mut self) -> Result<()> {
        self.app.shutdown().await
    }
}
