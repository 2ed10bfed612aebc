// src/layout.rs
//
// Static lot geometry: named rectangular slots in map-pixel space.
//
// Loaded once at startup and immutable afterwards. Slot order is
// significant: it defines the positional encoding of the occupancy status
// string, so the document's array order is preserved exactly. A future
// hot-reload would have to resize the status store atomically with the new
// layout; until then the only reload is a process restart.

use std::collections::HashSet;
use std::fs;
use std::path::Path;

use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error)]
pub enum LayoutError {
    #[error("failed to read layout file: {0}")]
    Io(#[from] std::io::Error),
    #[error("malformed layout document: {0}")]
    Parse(#[from] serde_json::Error),
    #[error("duplicate slot id {id}")]
    DuplicateSlotId { id: u32 },
    #[error("slot {id} has an invalid rectangle (origin must be non-negative, extent positive)")]
    InvalidRect { id: u32 },
    #[error("layout contains no slots")]
    NoSlots,
}

/// Axis-aligned slot rectangle in map space. Containment is inclusive on
/// all four edges, so a detection landing exactly on a boundary counts.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct SlotRect {
    pub x: f64,
    pub y: f64,
    pub w: f64,
    pub h: f64,
}

impl SlotRect {
    pub fn contains(&self, point: [f64; 2]) -> bool {
        let [px, py] = point;
        self.x <= px && px <= self.x + self.w && self.y <= py && py <= self.y + self.h
    }
}

/// One monitored parking space.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Slot {
    pub id: u32,
    pub label: String,
    #[serde(rename = "type")]
    pub kind: String,
    pub coordinates: SlotRect,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ImageDimensions {
    pub width: u32,
    pub height: u32,
}

/// A parking lot layout as drawn by the offline slot builder.
///
/// Serde round-trips the document unchanged (including the optional
/// `map_image_url` the frontend uses), so the config API can serve it
/// verbatim.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SlotLayout {
    pub lot_id: String,
    pub lot_name: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub map_image_url: Option<String>,
    pub image_dimensions: ImageDimensions,
    slots: Vec<Slot>,
}

impl SlotLayout {
    pub fn new(
        lot_id: impl Into<String>,
        lot_name: impl Into<String>,
        image_dimensions: ImageDimensions,
        slots: Vec<Slot>,
    ) -> Result<Self, LayoutError> {
        let layout = Self {
            lot_id: lot_id.into(),
            lot_name: lot_name.into(),
            map_image_url: None,
            image_dimensions,
            slots,
        };
        layout.validate()?;
        Ok(layout)
    }

    pub fn from_json(text: &str) -> Result<Self, LayoutError> {
        let layout: SlotLayout = serde_json::from_str(text)?;
        layout.validate()?;
        Ok(layout)
    }

    pub fn from_path(path: impl AsRef<Path>) -> Result<Self, LayoutError> {
        Self::from_json(&fs::read_to_string(path)?)
    }

    fn validate(&self) -> Result<(), LayoutError> {
        if self.slots.is_empty() {
            return Err(LayoutError::NoSlots);
        }
        let mut seen = HashSet::with_capacity(self.slots.len());
        for slot in &self.slots {
            if !seen.insert(slot.id) {
                return Err(LayoutError::DuplicateSlotId { id: slot.id });
            }
            let r = &slot.coordinates;
            // The negated form also rejects NaN coordinates.
            if !(r.x >= 0.0 && r.y >= 0.0 && r.w > 0.0 && r.h > 0.0) {
                return Err(LayoutError::InvalidRect { id: slot.id });
            }
        }
        Ok(())
    }

    /// Slots in declaration order — the order of the status string.
    pub fn slots(&self) -> &[Slot] {
        &self.slots
    }

    pub fn len(&self) -> usize {
        self.slots.len()
    }

    pub fn is_empty(&self) -> bool {
        self.slots.is_empty()
    }

    /// Positional lookup matching the status string index.
    pub fn get(&self, index: usize) -> Option<&Slot> {
        self.slots.get(index)
    }
}
