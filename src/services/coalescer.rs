//! Request coalescing: at most one in-flight producer per key.
//!
//! The first caller for a key becomes the leader and runs the producer;
//! callers arriving while it is in flight await the leader's outcome through
//! a `watch` channel. Success and failure are both shared, so N concurrent
//! callers observe one network request and one identical result. The slot is
//! cleared when the leader settles (including when it is cancelled at an
//! await point), so a later call always starts fresh.

use crate::error::{AppError, Result};
use std::collections::HashMap;
use std::future::Future;
use std::sync::{Mutex, MutexGuard, PoisonError};
use tokio::sync::watch;
use tracing::debug;

type Outcome<T> = Option<Result<T>>;
type InflightMap<T> = HashMap<String, watch::Receiver<Outcome<T>>>;

pub struct FetchCoalescer<T> {
    inflight: Mutex<InflightMap<T>>,
}

impl<T> Default for FetchCoalescer<T> {
    fn default() -> Self {
        Self::new()
    }
}

impl<T> FetchCoalescer<T> {
    pub fn new() -> Self {
        Self {
            inflight: Mutex::new(HashMap::new()),
        }
    }

    fn lock(&self) -> MutexGuard<'_, InflightMap<T>> {
        // The map is only touched between await points; a poisoned lock just
        // means a panic elsewhere, and the map stays usable.
        self.inflight.lock().unwrap_or_else(PoisonError::into_inner)
    }

    /// Drop all in-flight slots so the next call for any key starts fresh.
    pub fn reset(&self) {
        self.lock().clear();
    }
}

impl<T: Clone + Send + Sync + 'static> FetchCoalescer<T> {
    /// Run `producer` for `key`, or piggyback on an invocation already in
    /// flight for the same key.
    pub async fn run<F, Fut>(&self, key: &str, producer: F) -> Result<T>
    where
        F: FnOnce() -> Fut,
        Fut: Future<Output = Result<T>>,
    {
        let claimed = {
            let mut inflight = self.lock();
            match inflight.get(key) {
                Some(receiver) => Err(receiver.clone()),
                None => {
                    let (sender, receiver) = watch::channel(None);
                    inflight.insert(key.to_string(), receiver);
                    Ok(sender)
                }
            }
        };

        match claimed {
            Err(mut receiver) => {
                debug!(key, "joining in-flight request");
                loop {
                    if let Some(outcome) = receiver.borrow_and_update().clone() {
                        return outcome;
                    }
                    if receiver.changed().await.is_err() {
                        // Leader was dropped mid-flight without settling.
                        return Err(AppError::Other(format!(
                            "in-flight request for '{key}' was abandoned"
                        )));
                    }
                }
            }
            Ok(sender) => {
                let _slot = SlotGuard {
                    inflight: &self.inflight,
                    key: key.to_string(),
                };
                let outcome = producer().await;
                let _ = sender.send(Some(outcome.clone()));
                outcome
            }
        }
    }
}

/// Clears the in-flight slot when the leader settles or is cancelled.
struct SlotGuard<'a, T> {
    inflight: &'a Mutex<InflightMap<T>>,
    key: String,
}

impl<T> Drop for SlotGuard<'_, T> {
    fn drop(&mut self) {
        self.inflight
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .remove(&self.key);
    }
}
