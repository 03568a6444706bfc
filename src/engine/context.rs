// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::collections::BTreeMap;
use std::fmt;
use std::sync::Arc;

use tokio_util::sync::CancellationToken;

use crate::engine::store::Store;
use crate::errors::{Error, Result};
use crate::observability::MsgStream;
use crate::traits::Service;

/// Running services, by name.
pub type Services = Arc<BTreeMap<String, Arc<dyn Service>>>;

/// What a component sees of the event it is working on.
///
/// One context is built per task per event and dropped once the task
/// returns. Lifecycle steps (configure, start, stop) get a context with
/// id `-1` and an empty store.
#[derive(Clone)]
pub struct Context {
    id: i64,
    slot: usize,
    store: Arc<Store>,
    msg: MsgStream,
    services: Services,
    token: CancellationToken,
}

impl Context {
    pub(crate) fn new(
        id: i64,
        slot: usize,
        store: Arc<Store>,
        msg: MsgStream,
        services: Services,
        token: CancellationToken,
    ) -> Self {
        Self {
            id,
            slot,
            store,
            msg,
            services,
            token,
        }
    }

    /// Context for a lifecycle step outside the event loop.
    pub(crate) fn lifecycle(msg: MsgStream, services: Services) -> Self {
        Self::new(
            -1,
            0,
            Arc::new(Store::new(Vec::<String>::new())),
            msg,
            services,
            CancellationToken::new(),
        )
    }

    /// Event number.
    pub fn id(&self) -> i64 {
        self.id
    }

    /// Worker slot handling the event.
    pub fn slot(&self) -> usize {
        self.slot
    }

    pub fn store(&self) -> &Store {
        &self.store
    }

    pub fn msg(&self) -> &MsgStream {
        &self.msg
    }

    /// Cancelled when the event is abandoned.
    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    /// A running service by name.
    pub fn svc(&self, name: &str) -> Result<Arc<dyn Service>> {
        self.services
            .get(name)
            .cloned()
            .ok_or_else(|| Error::UnknownService(name.to_string()))
    }

    pub(crate) fn with_msg(&self, msg: MsgStream) -> Self {
        Self {
            msg,
            ..self.clone()
        }
    }
}

impl fmt::Debug for Context {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Context")
            .field("id", &self.id)
            .field("slot", &self.slot)
            .field("msg", &self.msg)
            .finish()
    }
}
