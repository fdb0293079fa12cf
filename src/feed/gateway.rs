use std::sync::{Arc, Mutex, MutexGuard, PoisonError};

use tokio::sync::broadcast;

use crate::model::TickBatch;
use crate::sim::HistoryStore;

struct Inner {
    history: HistoryStore,
    tx: broadcast::Sender<Arc<TickBatch>>,
}

/// What a newly connected consumer gets: the retained history as of the last
/// completed tick, and a live feed starting with the next one.
pub struct Subscription {
    pub history: Vec<Arc<TickBatch>>,
    pub updates: broadcast::Receiver<Arc<TickBatch>>,
}

/// Fan-out point between the ticker and connected consumers.
///
/// History append plus broadcast, and snapshot plus subscribe, each happen
/// under one lock, so every consumer sees each batch exactly once: either
/// in its history snapshot or as a live update.
pub struct BroadcastGateway {
    inner: Mutex<Inner>,
}

impl BroadcastGateway {
    pub fn new(history_capacity: usize, buffer: usize) -> Self {
        let (tx, _rx) = broadcast::channel(buffer);
        Self {
            inner: Mutex::new(Inner {
                history: HistoryStore::new(history_capacity),
                tx,
            }),
        }
    }

    /// Retain `batch` and deliver it to every connected consumer.
    /// Returns the number of consumers it was queued for.
    pub fn publish(&self, batch: TickBatch) -> usize {
        let batch = Arc::new(batch);
        let mut inner = self.lock();
        inner.history.append(Arc::clone(&batch));
        // No receivers is not an error here.
        inner.tx.send(batch).unwrap_or(0)
    }

    pub fn connect(&self) -> Subscription {
        let inner = self.lock();
        Subscription {
            history: inner.history.snapshot(),
            updates: inner.tx.subscribe(),
        }
    }

    pub fn history(&self) -> Vec<Arc<TickBatch>> {
        self.lock().history.snapshot()
    }

    pub fn history_len(&self) -> usize {
        self.lock().history.len()
    }

    pub fn consumer_count(&self) -> usize {
        self.lock().tx.receiver_count()
    }

    // A panic while holding the lock cannot leave the history half-written,
    // so a poisoned lock is still usable.
    fn lock(&self) -> MutexGuard<'_, Inner> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}
