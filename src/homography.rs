// src/homography.rs
//
// Planar homography between camera-pixel space and top-down map space.
//
// The estimator solves the exact four-point DLT system: two rows per
// correspondence, eight unknowns, h33 fixed to 1 after the solve. Input is
// human-picked calibration points, so there is no refinement or outlier
// rejection — degenerate geometry is rejected up front instead.

use nalgebra::{Matrix3, SMatrix, SVector, Vector3};
use thiserror::Error;

/// Correspondence pairs required by the four-point estimator. Any other
/// count is rejected; extra pairs are never silently truncated.
pub const REQUIRED_PAIRS: usize = 4;

/// Default lower bound on the DLT system's determinant magnitude. Below
/// this the source points are collinear or coincident for all practical
/// purposes and the solve would amplify noise into garbage.
pub const DEFAULT_DET_EPSILON: f64 = 1e-10;

/// Homogeneous divisors closer to zero than this map the point to infinity.
const DIVISOR_EPSILON: f64 = 1e-9;

#[derive(Debug, Error)]
pub enum HomographyError {
    #[error("expected exactly {REQUIRED_PAIRS} point pairs, got {actual}")]
    InputSize { actual: usize },
    #[error(
        "degenerate source geometry (collinear or coincident points): \
         |det| = {determinant:.3e} is below epsilon {epsilon:.3e}"
    )]
    DegenerateGeometry { determinant: f64, epsilon: f64 },
}

/// A point whose homogeneous divisor vanished under the transform.
/// Callers treat the point as matching no slot rather than failing the frame.
#[derive(Debug, Clone, Copy, Error)]
#[error("point ({x}, {y}) projects to infinity (divisor {divisor:.3e})")]
pub struct DegenerateProjection {
    pub x: f64,
    pub y: f64,
    pub divisor: f64,
}

/// Immutable 3x3 projective transform from camera pixels to map pixels.
///
/// Normalized so the bottom-right element is 1. Computed once at startup
/// and shared read-only afterwards; `apply` is pure and needs no locking.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    m: Matrix3<f64>,
}

impl Transform {
    pub fn identity() -> Self {
        Self {
            m: Matrix3::identity(),
        }
    }

    /// Build from row-major rows, the shape the calibration file serializes.
    pub fn from_rows(rows: [[f64; 3]; 3]) -> Self {
        Self {
            m: Matrix3::new(
                rows[0][0], rows[0][1], rows[0][2], //
                rows[1][0], rows[1][1], rows[1][2], //
                rows[2][0], rows[2][1], rows[2][2],
            ),
        }
    }

    pub fn to_rows(&self) -> [[f64; 3]; 3] {
        [
            [self.m[(0, 0)], self.m[(0, 1)], self.m[(0, 2)]],
            [self.m[(1, 0)], self.m[(1, 1)], self.m[(1, 2)]],
            [self.m[(2, 0)], self.m[(2, 1)], self.m[(2, 2)]],
        ]
    }

    pub fn is_identity(&self) -> bool {
        self.m == Matrix3::identity()
    }

    /// Map a camera-pixel point into map space: homogeneous multiply, then
    /// perspective divide.
    pub fn apply(&self, point: [f64; 2]) -> Result<[f64; 2], DegenerateProjection> {
        let v = self.m * Vector3::new(point[0], point[1], 1.0);
        let w = v[2];
        if !w.is_finite() || w.abs() <= DIVISOR_EPSILON {
            return Err(DegenerateProjection {
                x: point[0],
                y: point[1],
                divisor: w,
            });
        }
        let x = v[0] / w;
        let y = v[1] / w;
        if !x.is_finite() || !y.is_finite() {
            return Err(DegenerateProjection {
                x: point[0],
                y: point[1],
                divisor: w,
            });
        }
        Ok([x, y])
    }
}

/// Estimate the homography carrying each `camera` point onto its `map`
/// point, with the default determinant epsilon.
pub fn estimate(camera: &[[f64; 2]], map: &[[f64; 2]]) -> Result<Transform, HomographyError> {
    estimate_with_epsilon(camera, map, DEFAULT_DET_EPSILON)
}

/// Deterministic: identical inputs always produce the identical matrix.
pub fn estimate_with_epsilon(
    camera: &[[f64; 2]],
    map: &[[f64; 2]],
    epsilon: f64,
) -> Result<Transform, HomographyError> {
    if camera.len() != REQUIRED_PAIRS {
        return Err(HomographyError::InputSize {
            actual: camera.len(),
        });
    }
    if map.len() != REQUIRED_PAIRS {
        return Err(HomographyError::InputSize { actual: map.len() });
    }

    // For (x, y) -> (x', y') the projective constraint gives two rows:
    //   x*h1 + y*h2 + h3 - x'*x*h7 - x'*y*h8 = x'
    //   x*h4 + y*h5 + h6 - y'*x*h7 - y'*y*h8 = y'
    let mut a = SMatrix::<f64, 8, 8>::zeros();
    let mut b = SVector::<f64, 8>::zeros();
    for i in 0..REQUIRED_PAIRS {
        let [x, y] = camera[i];
        let [xp, yp] = map[i];
        let r = 2 * i;

        a[(r, 0)] = x;
        a[(r, 1)] = y;
        a[(r, 2)] = 1.0;
        a[(r, 6)] = -xp * x;
        a[(r, 7)] = -xp * y;
        b[r] = xp;

        a[(r + 1, 3)] = x;
        a[(r + 1, 4)] = y;
        a[(r + 1, 5)] = 1.0;
        a[(r + 1, 6)] = -yp * x;
        a[(r + 1, 7)] = -yp * y;
        b[r + 1] = yp;
    }

    let lu = a.lu();
    let determinant = lu.determinant();
    if !determinant.is_finite() || determinant.abs() < epsilon {
        return Err(HomographyError::DegenerateGeometry {
            determinant,
            epsilon,
        });
    }
    let h = lu
        .solve(&b)
        .ok_or(HomographyError::DegenerateGeometry {
            determinant,
            epsilon,
        })?;

    Ok(Transform {
        m: Matrix3::new(
            h[0], h[1], h[2], //
            h[3], h[4], h[5], //
            h[6], h[7], 1.0,
        ),
    })
}
