// src/classifier.rs
//
// Turns one frame's raw detections into a complete occupancy snapshot.
//
// A detection claims at most one slot: slots are tested in layout order and
// the first containing rectangle wins, so overlapping slot rectangles stay
// deterministic. Flags OR-combine across the batch — occupancy is boolean,
// there is no count. Detections that transform to infinity or land outside
// every slot contribute nothing.

use tracing::debug;

use crate::homography::Transform;
use crate::layout::SlotLayout;
use crate::types::{OccupancySnapshot, RawDetection};

pub fn classify(
    detections: &[RawDetection],
    transform: &Transform,
    layout: &SlotLayout,
) -> OccupancySnapshot {
    let mut occupied = vec![false; layout.len()];

    for detection in detections {
        let mapped = match transform.apply(detection.point()) {
            Ok(point) => point,
            Err(err) => {
                debug!("dropping detection: {err}");
                continue;
            }
        };

        if let Some(index) = layout
            .slots()
            .iter()
            .position(|slot| slot.coordinates.contains(mapped))
        {
            occupied[index] = true;
        }
    }

    OccupancySnapshot::from_flags(occupied)
}
