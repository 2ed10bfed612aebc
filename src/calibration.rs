// src/calibration.rs
//
// Startup loading of the camera→map transform. The calibration file holds
// either the precomputed 3x3 matrix or the four point correspondences the
// offline picker produced; the latter runs through the estimator here so
// both forms end in the same Transform.
//
// A missing or unreadable file is fatal by default. The identity fallback
// the original behavior had (serve anyway, warn once) silently produces
// wrong occupancy, so it is opt-in via configuration.

use std::path::Path;

use anyhow::{bail, Context, Result};
use serde::Deserialize;
use tracing::warn;

use crate::homography::{self, Transform};

/// One picked correspondence: a camera pixel and the map pixel it lands on.
#[derive(Debug, Clone, Copy, Deserialize)]
pub struct CalibrationPointPair {
    pub camera: [f64; 2],
    pub map: [f64; 2],
}

#[derive(Debug, Deserialize)]
#[serde(untagged)]
enum CalibrationFile {
    Matrix { matrix: [[f64; 3]; 3] },
    Points { points: Vec<CalibrationPointPair> },
}

/// Load the transform per the configured fallback policy.
pub fn load(path: &Path, allow_identity_fallback: bool) -> Result<Transform> {
    match try_load(path) {
        Ok(transform) => Ok(transform),
        Err(err) if allow_identity_fallback => {
            warn!(
                "calibration unavailable ({err:#}); continuing with the identity transform — \
                 camera coordinates will be treated as map coordinates"
            );
            Ok(Transform::identity())
        }
        Err(err) => Err(err).with_context(|| {
            format!(
                "calibration file '{}' is required \
                 (set calibration.allow_identity_fallback to serve without it)",
                path.display()
            )
        }),
    }
}

fn try_load(path: &Path) -> Result<Transform> {
    let text = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read '{}'", path.display()))?;
    let file: CalibrationFile =
        serde_json::from_str(&text).context("malformed calibration file")?;

    match file {
        CalibrationFile::Matrix { matrix } => Ok(Transform::from_rows(matrix)),
        CalibrationFile::Points { points } => {
            if points.len() != homography::REQUIRED_PAIRS {
                bail!(
                    "expected {} calibration point pairs, got {}",
                    homography::REQUIRED_PAIRS,
                    points.len()
                );
            }
            let camera: Vec<[f64; 2]> = points.iter().map(|p| p.camera).collect();
            let map: Vec<[f64; 2]> = points.iter().map(|p| p.map).collect();
            Ok(homography::estimate(&camera, &map)?)
        }
    }
}
