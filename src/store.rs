// src/store.rs
//
// Latest-snapshot store: single writer (the aggregation loop), any number
// of concurrent readers. A publish swaps a complete Arc'd snapshot through
// a watch channel, so a reader observes either the prior snapshot or the
// new one — never a mix and never a partial write.

use std::sync::Arc;

use tokio::sync::watch;

use crate::types::OccupancySnapshot;

/// Writer half. Deliberately not `Clone`: owning the store is owning the
/// sole right to publish.
#[derive(Debug)]
pub struct StatusStore {
    tx: watch::Sender<Arc<OccupancySnapshot>>,
}

/// Reader half, cheap to clone into every request handler.
#[derive(Debug, Clone)]
pub struct StatusReader {
    rx: watch::Receiver<Arc<OccupancySnapshot>>,
}

impl StatusStore {
    /// Create a store seeded with an all-vacant snapshot of `slot_count`
    /// flags, so readers get a well-formed answer before the first cycle
    /// completes.
    pub fn new(slot_count: usize) -> (Self, StatusReader) {
        let (tx, rx) = watch::channel(Arc::new(OccupancySnapshot::vacant(slot_count)));
        (Self { tx }, StatusReader { rx })
    }

    /// Replace the published snapshot. Total and atomic: concurrent readers
    /// keep whatever Arc they already cloned.
    pub fn publish(&self, snapshot: OccupancySnapshot) {
        self.tx.send_replace(Arc::new(snapshot));
    }
}

impl StatusReader {
    pub fn read(&self) -> Arc<OccupancySnapshot> {
        self.rx.borrow().clone()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn initial_value_is_all_vacant() {
        let (_store, reader) = StatusStore::new(5);
        assert_eq!(reader.read().status_string(), "00000");
    }

    #[test]
    fn publish_replaces_the_whole_snapshot() {
        let (store, reader) = StatusStore::new(3);
        store.publish(OccupancySnapshot::from_flags(vec![true, false, true]));
        assert_eq!(reader.read().status_string(), "101");
        store.publish(OccupancySnapshot::from_flags(vec![false, true, false]));
        assert_eq!(reader.read().status_string(), "010");
    }

    #[test]
    fn cloned_readers_see_the_latest_publish() {
        let (store, reader) = StatusStore::new(2);
        let other = reader.clone();
        store.publish(OccupancySnapshot::from_flags(vec![true, true]));
        assert_eq!(reader.read().status_string(), "11");
        assert_eq!(other.read().status_string(), "11");
    }

    #[test]
    fn concurrent_reads_never_observe_a_torn_snapshot() {
        const SLOTS: usize = 64;
        const PUBLISHES: usize = 2_000;

        let (store, reader) = StatusStore::new(SLOTS);
        let all_on = OccupancySnapshot::from_flags(vec![true; SLOTS]);
        let all_off = OccupancySnapshot::vacant(SLOTS);

        let readers: Vec<_> = (0..4)
            .map(|_| {
                let reader = reader.clone();
                std::thread::spawn(move || {
                    for _ in 0..PUBLISHES {
                        let seen = reader.read();
                        assert_eq!(seen.len(), SLOTS);
                        // Snapshots alternate between all-on and all-off; a
                        // mixed vector would mean a torn read.
                        let on = seen.iter().filter(|&o| o).count();
                        assert!(on == 0 || on == SLOTS, "torn snapshot: {on}/{SLOTS} on");
                    }
                })
            })
            .collect();

        for i in 0..PUBLISHES {
            let next = if i % 2 == 0 { &all_on } else { &all_off };
            store.publish(next.clone());
        }

        for handle in readers {
            handle.join().unwrap();
        }
    }
}
