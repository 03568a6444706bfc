// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Event loop: workers pulling events and running every task on each.
//!
//! # Per event
//!
//! A worker runs one tokio task per pipeline task, all on the worker's own
//! [`Store`]. Tasks are launched in pipeline order but run concurrently; the
//! store's blocking cells order producers before consumers. Results land on
//! an error queue sized to the task count:
//!
//! - all tasks succeed: the store is reset for the next event
//! - a task fails or panics: the event's token is cancelled, the store is
//!   closed to release blocked readers and writers, the remaining tasks are
//!   awaited, and the error (stack-wrapped) ends the worker's loop
//!
//! # Scheduling
//!
//! With `NProcs <= 0` a single worker runs events one after the other on the
//! calling task. Otherwise `NProcs` workers share an intake queue fed with
//! event ids; each exits on its first error, forwarding it to the run-level
//! error sink. The first real error closes the intake: no worker takes a new
//! event, while events already in flight on other workers run to completion.
//! Event tokens descend from the run's abort token instead, which only fires
//! when the run itself is dropped. Running out of input is not an error: the
//! feeder stops and the remaining workers finish what they hold.

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;
use std::time::Instant;

use tokio::sync::{mpsc, Mutex};
use tokio::task::JoinSet;
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

use crate::config::consts::INTAKE_DEPTH_PER_WORKER;
use crate::engine::context::{Context, Services};
use crate::engine::store::Store;
use crate::errors::{stack, Error, Result};
use crate::observability::messages::scheduler::{
    EventFailed, EventStarted, RunCompleted, RunStarted, WorkerExited,
};
use crate::observability::messages::StructuredLog;
use crate::observability::MsgStream;
use crate::traits::Task;

/// Outcome of one event loop.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct RunReport {
    /// Events whose every task succeeded.
    pub processed: u64,
    /// The loop ended because an input stream ran out.
    pub exhausted: bool,
}

struct Worker {
    slot: usize,
    store: Arc<Store>,
    tasks: Arc<[Arc<dyn Task>]>,
    msgs: Arc<[MsgStream]>,
    services: Services,
}

impl Worker {
    async fn process_event(&self, id: i64, abort: &CancellationToken) -> Result<()> {
        let event = abort.child_token();
        let started = EventStarted {
            id,
            slot: self.slot,
        };
        started.log();
        let span = started.span("event");

        let mut running = JoinSet::new();
        for (task, msg) in self.tasks.iter().zip(self.msgs.iter()) {
            let task = Arc::clone(task);
            let ctx = Context::new(
                id,
                self.slot,
                self.store.clone(),
                msg.clone(),
                self.services.clone(),
                event.clone(),
            );
            running.spawn(
                async move {
                    let token = ctx.token().clone();
                    tokio::select! {
                        result = task.process(&ctx) => result,
                        _ = token.cancelled() => Err(Error::Cancelled),
                    }
                }
                .instrument(span.clone()),
            );
        }

        while let Some(joined) = running.join_next().await {
            let err = match joined {
                Ok(Ok(())) => continue,
                Ok(Err(err)) => err,
                Err(join) => Error::Join(join),
            };
            event.cancel();
            self.store.close();
            running.shutdown().await;
            return Err(stack::wrap(err));
        }

        self.store.reset().map_err(stack::wrap)
    }

    fn report_failure(&self, id: i64, err: &Error) {
        if !err.is_end_of_stream() && !err.is_cancelled() {
            EventFailed {
                id,
                slot: self.slot,
                error: err,
            }
            .log();
        }
    }
}

/// Runs the event loop over a fixed set of tasks.
pub(crate) struct Scheduler {
    tasks: Arc<[Arc<dyn Task>]>,
    msgs: Arc<[MsgStream]>,
    keys: Vec<String>,
    services: Services,
    n_procs: i64,
}

impl Scheduler {
    pub(crate) fn new(
        tasks: Vec<Arc<dyn Task>>,
        keys: Vec<String>,
        msg: &MsgStream,
        services: Services,
        n_procs: i64,
    ) -> Self {
        let msgs: Vec<MsgStream> = tasks.iter().map(|t| msg.named(t.name())).collect();
        Self {
            tasks: tasks.into(),
            msgs: msgs.into(),
            keys,
            services,
            n_procs,
        }
    }

    fn worker(&self, slot: usize) -> Worker {
        Worker {
            slot,
            store: Arc::new(Store::new(self.keys.iter().cloned())),
            tasks: self.tasks.clone(),
            msgs: self.msgs.clone(),
            services: self.services.clone(),
        }
    }

    /// Processes up to `evt_max` events (all of the input when negative),
    /// numbering them from `first_id`.
    pub(crate) async fn run(&self, first_id: i64, evt_max: i64) -> Result<RunReport> {
        let msg = RunStarted {
            evt_max,
            n_procs: self.n_procs,
            tasks: self.tasks.len(),
        };
        let span = msg.span("event_loop");
        async move {
            msg.log();
            self.drive(first_id, evt_max).await
        }
        .instrument(span)
        .await
    }

    async fn drive(&self, first_id: i64, evt_max: i64) -> Result<RunReport> {
        let started = Instant::now();
        let abort = CancellationToken::new();
        let _teardown = abort.clone().drop_guard();

        let report = if self.n_procs <= 0 {
            self.run_sequential(first_id, evt_max, &abort).await?
        } else {
            self.run_concurrent(first_id, evt_max, abort).await?
        };

        RunCompleted {
            processed: report.processed,
            exhausted: report.exhausted,
            duration: started.elapsed(),
        }
        .log();
        Ok(report)
    }

    async fn run_sequential(
        &self,
        first_id: i64,
        evt_max: i64,
        abort: &CancellationToken,
    ) -> Result<RunReport> {
        let worker = self.worker(0);
        let mut report = RunReport::default();

        while evt_max < 0 || (report.processed as i64) < evt_max {
            let id = first_id + report.processed as i64;
            match worker.process_event(id, abort).await {
                Ok(()) => report.processed += 1,
                Err(err) if err.is_end_of_stream() => {
                    report.exhausted = true;
                    break;
                }
                Err(err) => {
                    worker.report_failure(id, &err);
                    return Err(err);
                }
            }
        }

        WorkerExited {
            slot: 0,
            processed: report.processed,
        }
        .log();
        Ok(report)
    }

    async fn run_concurrent(
        &self,
        first_id: i64,
        evt_max: i64,
        abort: CancellationToken,
    ) -> Result<RunReport> {
        let n = self.n_procs as usize;
        let (evt_tx, evt_rx) = mpsc::channel::<i64>(n * INTAKE_DEPTH_PER_WORKER);
        let evt_rx = Arc::new(Mutex::new(evt_rx));
        let (err_tx, mut err_rx) = mpsc::channel::<Error>(n);
        let processed = Arc::new(AtomicU64::new(0));
        let feeder_stop = CancellationToken::new();
        let intake = CancellationToken::new();

        let feeder = tokio::spawn({
            let stop = feeder_stop.clone();
            let intake = intake.clone();
            async move {
                let mut id = first_id;
                while evt_max < 0 || id - first_id < evt_max {
                    tokio::select! {
                        _ = stop.cancelled() => break,
                        _ = intake.cancelled() => break,
                        sent = evt_tx.send(id) => {
                            if sent.is_err() {
                                break;
                            }
                        }
                    }
                    id += 1;
                }
            }
        });

        let mut workers = Vec::with_capacity(n);
        for slot in 0..n {
            let worker = self.worker(slot);
            let evt_rx = evt_rx.clone();
            let err_tx = err_tx.clone();
            let processed = processed.clone();
            let intake = intake.clone();
            let abort = abort.clone();

            workers.push(tokio::spawn(async move {
                let mut mine = 0;
                loop {
                    let next = tokio::select! {
                        biased;
                        _ = intake.cancelled() => None,
                        id = async { evt_rx.lock().await.recv().await } => id,
                    };
                    let Some(id) = next else {
                        break;
                    };

                    match worker.process_event(id, &abort).await {
                        Ok(()) => {
                            mine += 1;
                            processed.fetch_add(1, Ordering::SeqCst);
                        }
                        Err(err) => {
                            worker.report_failure(id, &err);
                            let _ = err_tx.send(err).await;
                            break;
                        }
                    }
                }
                WorkerExited {
                    slot: worker.slot,
                    processed: mine,
                }
                .log();
            }));
        }
        drop(err_tx);

        let mut first_error = None;
        let mut exhausted = false;
        while let Some(err) = err_rx.recv().await {
            if err.is_end_of_stream() {
                exhausted = true;
                feeder_stop.cancel();
            } else if first_error.is_none() {
                intake.cancel();
                first_error = Some(err);
            }
        }

        feeder_stop.cancel();
        feeder.await?;
        for worker in workers {
            worker.await?;
        }

        match first_error {
            Some(err) => Err(err),
            None => Ok(RunReport {
                processed: processed.load(Ordering::SeqCst),
                exhausted,
            }),
        }
    }
}
