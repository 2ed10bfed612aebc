// src/aggregator.rs
//
// The background cycle: fetch one frame of detections, classify them
// against the lot, publish the snapshot, sleep, repeat. A failed fetch
// keeps the previously published snapshot — stale data beats blank data —
// and a degenerate detection is dropped inside the classifier without
// aborting the cycle. The loop has no terminal state; it stops only when
// its task is dropped at process shutdown.

use std::sync::Arc;
use std::time::Duration;

use tracing::{debug, warn};

use crate::classifier;
use crate::detector::DetectionSource;
use crate::homography::Transform;
use crate::layout::SlotLayout;
use crate::store::StatusStore;

pub struct Aggregator<S> {
    source: S,
    transform: Transform,
    layout: Arc<SlotLayout>,
    store: StatusStore,
    cycle_delay: Duration,
}

impl<S: DetectionSource> Aggregator<S> {
    pub fn new(
        source: S,
        transform: Transform,
        layout: Arc<SlotLayout>,
        store: StatusStore,
        cycle_delay: Duration,
    ) -> Self {
        Self {
            source,
            transform,
            layout,
            store,
            cycle_delay,
        }
    }

    /// Run forever. Spawn on a detached task; the loop must never prevent
    /// process shutdown and each cycle is idempotent, so no drain is needed.
    pub async fn run(self) {
        loop {
            self.run_cycle().await;
            tokio::time::sleep(self.cycle_delay).await;
        }
    }

    /// One fetch → classify → publish pass. Returns whether a snapshot was
    /// published; exposed so tests can step the loop deterministically.
    pub async fn run_cycle(&self) -> bool {
        let detections = match self.source.fetch().await {
            Ok(detections) => detections,
            Err(err) => {
                warn!("detection fetch failed, keeping last snapshot: {err}");
                return false;
            }
        };

        let snapshot = classifier::classify(&detections, &self.transform, &self.layout);
        debug!(
            "cycle complete: {} detection(s) -> {}",
            detections.len(),
            snapshot.status_string()
        );
        self.store.publish(snapshot);
        true
    }
}
