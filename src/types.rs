// src/types.rs

use serde::{Deserialize, Serialize};

/// One raw detection from the external vision process, in camera-pixel
/// space. Wire shape: `{"x": 412.0, "y": 233.5, "type": "car"}` with `type`
/// optional. Anything else rejects the whole payload — the detection
/// contract is strict, not best-effort.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RawDetection {
    pub x: f64,
    pub y: f64,
    #[serde(rename = "type", default, skip_serializing_if = "Option::is_none")]
    pub kind: Option<String>,
}

impl RawDetection {
    pub fn point(&self) -> [f64; 2] {
        [self.x, self.y]
    }
}

/// Complete per-slot occupancy at one instant, one flag per slot in layout
/// order. Created whole by the classifier and replaced whole by the
/// aggregation loop; never mutated in place.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct OccupancySnapshot {
    occupied: Vec<bool>,
}

impl OccupancySnapshot {
    /// All-vacant snapshot; also the store's initial value so early readers
    /// get a well-formed answer before the first cycle lands.
    pub fn vacant(slot_count: usize) -> Self {
        Self {
            occupied: vec![false; slot_count],
        }
    }

    pub fn from_flags(occupied: Vec<bool>) -> Self {
        Self { occupied }
    }

    pub fn len(&self) -> usize {
        self.occupied.len()
    }

    pub fn is_empty(&self) -> bool {
        self.occupied.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<bool> {
        self.occupied.get(index).copied()
    }

    pub fn iter(&self) -> impl Iterator<Item = bool> + '_ {
        self.occupied.iter().copied()
    }

    /// Positional `'0'`/`'1'` encoding served by the status API.
    pub fn status_string(&self) -> String {
        self.occupied
            .iter()
            .map(|&occupied| if occupied { '1' } else { '0' })
            .collect()
    }
}
