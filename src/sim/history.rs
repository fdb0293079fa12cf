use std::collections::VecDeque;
use std::sync::Arc;

use crate::model::TickBatch;

/// Bounded log of past tick batches, oldest first.
///
/// Batches are shared behind `Arc`, so a snapshot is a cheap copy of
/// pointers that later appends can never alter.
#[derive(Debug, Clone)]
pub struct HistoryStore {
    capacity: usize,
    batches: VecDeque<Arc<TickBatch>>,
}

impl HistoryStore {
    pub fn new(capacity: usize) -> Self {
        assert!(capacity > 0, "history capacity must be > 0");
        Self {
            capacity,
            batches: VecDeque::with_capacity(capacity),
        }
    }

    /// Append to the tail, evicting the head once over capacity.
    pub fn append(&mut self, batch: Arc<TickBatch>) {
        self.batches.push_back(batch);
        while self.batches.len() > self.capacity {
            self.batches.pop_front();
        }
    }

    pub fn snapshot(&self) -> Vec<Arc<TickBatch>> {
        self.batches.iter().cloned().collect()
    }

    pub fn latest(&self) -> Option<&Arc<TickBatch>> {
        self.batches.back()
    }

    pub fn len(&self) -> usize {
        self.batches.len()
    }

    pub fn is_empty(&self) -> bool {
        self.batches.is_empty()
    }

    pub fn capacity(&self) -> usize {
        self.capacity
    }
}
