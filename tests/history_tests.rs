use std::sync::Arc;

use chrono::Utc;
use market_sim::model::TickBatch;
use market_sim::sim::HistoryStore;

fn batch(seq: u64) -> Arc<TickBatch> {
    Arc::new(TickBatch {
        seq,
        timestamp: Utc::now(),
        updates: Vec::new(),
    })
}

#[test]
fn length_tracks_min_of_appends_and_capacity() {
    let mut store = HistoryStore::new(500);
    assert!(store.is_empty());
    for n in 1..=600u64 {
        store.append(batch(n));
        assert_eq!(store.len(), (n as usize).min(500));
    }
}

#[test]
fn five_hundred_first_append_evicts_oldest() {
    let mut store = HistoryStore::new(500);
    for seq in 1..=500 {
        store.append(batch(seq));
    }
    assert_eq!(store.snapshot().first().map(|b| b.seq), Some(1));

    store.append(batch(501));
    let snap = store.snapshot();
    assert_eq!(snap.len(), 500);
    assert_eq!(snap.first().map(|b| b.seq), Some(2));
    assert_eq!(snap.last().map(|b| b.seq), Some(501));
}

#[test]
fn snapshot_is_oldest_first_and_unaffected_by_later_appends() {
    let mut store = HistoryStore::new(500);
    for seq in 1..=3 {
        store.append(batch(seq));
    }
    let snap = store.snapshot();
    for seq in 4..=10 {
        store.append(batch(seq));
    }
    let seqs: Vec<u64> = snap.iter().map(|b| b.seq).collect();
    assert_eq!(seqs, vec![1, 2, 3]);
}
