// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Arc;

use tokio::sync::{mpsc, oneshot};
use tokio::task::JoinHandle;
use tokio_util::sync::CancellationToken;
use tracing::{Instrument, Span};

use crate::backends::stream::Endpoint;
use crate::engine::Context;
use crate::errors::{Error, Result};

type Request = (Context, oneshot::Sender<Result<()>>);

/// Wiring between a stream task and its I/O worker.
///
/// The worker owns the endpoint and serves one request at a time: a context
/// arrives on the hand-off slot, the endpoint reads or writes it, and the
/// result goes back on the oneshot paired with that request.
pub(crate) struct StreamControl {
    requests: mpsc::Sender<Request>,
    stop: CancellationToken,
    served: Arc<AtomicU64>,
    worker: JoinHandle<()>,
}

impl StreamControl {
    pub(crate) fn spawn<E: Endpoint>(endpoint: E, span: Span) -> Self {
        let (requests, mut rx) = mpsc::channel::<Request>(1);
        let stop = CancellationToken::new();
        let served = Arc::new(AtomicU64::new(0));

        let worker = tokio::spawn({
            let stop = stop.clone();
            let served = served.clone();
            async move {
                loop {
                    let (ctx, reply) = tokio::select! {
                        _ = stop.cancelled() => break,
                        request = rx.recv() => match request {
                            Some(request) => request,
                            None => break,
                        },
                    };
                    let result = endpoint.serve(&ctx).await;
                    served.fetch_add(1, Ordering::Relaxed);
                    // the caller may have been cancelled meanwhile
                    let _ = reply.send(result);
                }
            }
            .instrument(span)
        });

        Self {
            requests,
            stop,
            served,
            worker,
        }
    }

    pub(crate) fn client(&self) -> StreamClient {
        StreamClient {
            requests: self.requests.clone(),
        }
    }

    /// Stops the worker once its current request is served. Returns the
    /// number of requests served.
    pub(crate) async fn shutdown(self) -> Result<u64> {
        self.stop.cancel();
        self.worker.await?;
        Ok(self.served.load(Ordering::Relaxed))
    }
}

/// Sending half of a [`StreamControl`], cloned per `process` call.
pub(crate) struct StreamClient {
    requests: mpsc::Sender<Request>,
}

impl StreamClient {
    /// Hands `ctx` to the worker and waits for the outcome.
    pub(crate) async fn request(&self, ctx: &Context) -> Result<()> {
        let (reply, outcome) = oneshot::channel();
        self.requests
            .send((ctx.clone(), reply))
            .await
            .map_err(|_| Error::Config("stream: I/O worker is not running".into()))?;
        outcome
            .await
            .map_err(|_| Error::Config("stream: I/O worker dropped the request".into()))?
    }
}
