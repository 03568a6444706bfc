// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

//! Per-event key/value store.
//!
//! Every key maps to a one-slot cell that is both mailbox and guard:
//!
//! - `put` waits while the cell holds a value, then deposits its own
//! - `get` waits while the cell is empty, then returns a copy and leaves the
//!   value in place, so every reader of the event sees the same value
//!
//! A consumer task therefore cannot read data its producer has not written
//! yet, whatever order the scheduler runs the tasks in.
//!
//! Every wait also watches the store's abort token. [`Store::close`] fires
//! it, failing anything blocked with [`Error::StoreAborted`];
//! [`Store::reset`] drains every cell for the next event and rearms it.

use std::collections::HashMap;
use std::fmt;
use std::sync::{Arc, Mutex};

use tokio::sync::Notify;
use tokio_util::sync::CancellationToken;

use crate::config::{Typed, Value};
use crate::errors::{Error, Result};
use crate::observability::messages::scheduler::ReleaseFailed;
use crate::observability::messages::StructuredLog;
use crate::utils;

#[derive(Default)]
struct Cell {
    slot: Mutex<Option<Value>>,
    changed: Notify,
}

pub struct Store {
    cells: Mutex<HashMap<String, Arc<Cell>>>,
    abort: Mutex<CancellationToken>,
}

impl Store {
    /// A store with one empty cell per key.
    pub fn new<I, K>(keys: I) -> Self
    where
        I: IntoIterator<Item = K>,
        K: Into<String>,
    {
        let cells = keys
            .into_iter()
            .map(|k| (k.into(), Arc::new(Cell::default())))
            .collect();
        Self {
            cells: Mutex::new(cells),
            abort: Mutex::new(CancellationToken::new()),
        }
    }

    /// Non-blocking key existence check.
    pub fn has(&self, key: &str) -> bool {
        utils::lock(&self.cells).contains_key(key)
    }

    /// Keys of the store, sorted.
    pub fn keys(&self) -> Vec<String> {
        let mut keys: Vec<String> = utils::lock(&self.cells).keys().cloned().collect();
        keys.sort();
        keys
    }

    fn cell(&self, key: &str) -> Result<Arc<Cell>> {
        utils::lock(&self.cells)
            .get(key)
            .cloned()
            .ok_or_else(|| Error::UnknownKey(key.to_string()))
    }

    fn abort_token(&self) -> CancellationToken {
        utils::lock(&self.abort).clone()
    }

    /// Deposits `value` under `key`, waiting while the cell is occupied.
    pub async fn put(&self, key: &str, value: impl Into<Value>) -> Result<()> {
        let cell = self.cell(key)?;
        let abort = self.abort_token();
        let mut pending = Some(value.into());

        loop {
            let changed = cell.changed.notified();
            tokio::pin!(changed);
            changed.as_mut().enable();

            {
                let mut slot = utils::lock(&cell.slot);
                if slot.is_none() {
                    *slot = pending.take();
                    drop(slot);
                    cell.changed.notify_waiters();
                    return Ok(());
                }
            }

            tokio::select! {
                _ = abort.cancelled() => return Err(Error::StoreAborted),
                _ = &mut changed => {}
            }
        }
    }

    /// Copy of the value under `key`, waiting until one was deposited.
    pub async fn get(&self, key: &str) -> Result<Value> {
        let cell = self.cell(key)?;
        let abort = self.abort_token();

        loop {
            let changed = cell.changed.notified();
            tokio::pin!(changed);
            changed.as_mut().enable();

            {
                let slot = utils::lock(&cell.slot);
                if let Some(value) = slot.as_ref() {
                    return Ok(value.clone());
                }
            }

            tokio::select! {
                _ = abort.cancelled() => return Err(Error::StoreAborted),
                _ = &mut changed => {}
            }
        }
    }

    /// [`Store::get`] converted to `T`, failing on a kind mismatch.
    pub async fn get_as<T: Typed>(&self, key: &str) -> Result<T> {
        self.get(key).await?.to::<T>()
    }

    /// Fires the abort signal, failing every blocked `put` and `get`.
    pub fn close(&self) {
        utils::lock(&self.abort).cancel();
    }

    /// Drains every cell, runs the release hooks of the drained values and
    /// rearms the abort signal.
    ///
    /// Every cell is replaced even when a release hook fails. All failures are
    /// logged; the first one is returned.
    pub fn reset(&self) -> Result<()> {
        let drained: Vec<(String, Value)> = {
            let mut cells = utils::lock(&self.cells);
            cells
                .iter_mut()
                .filter_map(|(key, cell)| {
                    let old = std::mem::take(cell);
                    let value = utils::lock(&old.slot).take();
                    value.map(|v| (key.clone(), v))
                })
                .collect()
        };

        {
            let mut abort = utils::lock(&self.abort);
            if abort.is_cancelled() {
                *abort = CancellationToken::new();
            }
        }

        let mut first = None;
        for (key, value) in drained {
            if let Err(err) = value.release() {
                ReleaseFailed {
                    key: &key,
                    error: &err,
                }
                .log();
                first.get_or_insert(err);
            }
        }

        match first {
            Some(err) => Err(err),
            None => Ok(()),
        }
    }
}

impl fmt::Debug for Store {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Store").field("keys", &self.keys()).finish()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Object;
    use std::any::Any;
    use std::sync::atomic::{AtomicUsize, Ordering};
    use std::time::Duration;

    struct Tracked {
        released: Arc<AtomicUsize>,
        fail: bool,
    }

    impl Object for Tracked {
        fn as_any(&self) -> &dyn Any {
            self
        }

        fn release(&self) -> Result<()> {
            self.released.fetch_add(1, Ordering::SeqCst);
            if self.fail {
                Err(Error::Config("release failed".into()))
            } else {
                Ok(())
            }
        }
    }

    #[tokio::test]
    async fn test_put_then_get_twice() {
        let store = Store::new(["ints"]);
        store.put("ints", 42i64).await.unwrap();

        assert_eq!(store.get_as::<i64>("ints").await.unwrap(), 42);
        assert_eq!(store.get_as::<i64>("ints").await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_unknown_key() {
        let store = Store::new(["ints"]);
        assert!(store.has("ints"));
        assert!(!store.has("floats"));
        assert!(matches!(store.get("floats").await, Err(Error::UnknownKey(_))));
        assert!(matches!(store.put("floats", 1.0).await, Err(Error::UnknownKey(_))));
    }

    #[tokio::test]
    async fn test_get_waits_for_producer() {
        let store = Arc::new(Store::new(["x"]));

        let reader = tokio::spawn({
            let store = store.clone();
            async move { store.get_as::<String>("x").await }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        assert!(!reader.is_finished());

        store.put("x", "hello").await.unwrap();
        assert_eq!(reader.await.unwrap().unwrap(), "hello");
    }

    #[tokio::test]
    async fn test_close_releases_blocked_waiters() {
        let store = Arc::new(Store::new(["x", "y"]));
        store.put("y", 1i64).await.unwrap();

        let getter = tokio::spawn({
            let store = store.clone();
            async move { store.get("x").await }
        });
        let putter = tokio::spawn({
            let store = store.clone();
            async move { store.put("y", 2i64).await }
        });

        tokio::time::sleep(Duration::from_millis(20)).await;
        store.close();

        assert!(matches!(getter.await.unwrap(), Err(Error::StoreAborted)));
        assert!(matches!(putter.await.unwrap(), Err(Error::StoreAborted)));
    }

    #[tokio::test]
    async fn test_reset_drains_and_rearms() {
        let store = Store::new(["x"]);
        store.put("x", 1i64).await.unwrap();
        store.close();
        store.reset().unwrap();

        // cell is empty again and the abort signal is rearmed
        store.put("x", 2i64).await.unwrap();
        assert_eq!(store.get_as::<i64>("x").await.unwrap(), 2);
    }

    #[tokio::test]
    async fn test_reset_releases_every_value_and_reports_failure() {
        let released = Arc::new(AtomicUsize::new(0));
        let store = Store::new(["a", "b", "c"]);
        store
            .put("a", Value::object(Tracked { released: released.clone(), fail: true }))
            .await
            .unwrap();
        store
            .put("b", Value::object(Tracked { released: released.clone(), fail: false }))
            .await
            .unwrap();
        store.put("c", 3i64).await.unwrap();

        let err = store.reset().unwrap_err();
        assert_eq!(err.to_string(), "config: release failed");
        assert_eq!(released.load(Ordering::SeqCst), 2);

        // every cell was replaced despite the failure
        for key in ["a", "b", "c"] {
            store.put(key, 0i64).await.unwrap();
        }
    }

    #[tokio::test]
    async fn test_get_as_kind_mismatch() {
        let store = Store::new(["x"]);
        store.put("x", 1.5f64).await.unwrap();
        assert!(matches!(store.get_as::<i64>("x").await, Err(Error::Kind { .. })));
    }
}
