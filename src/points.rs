// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Points and batches of points.  A point lives in a five dimensional
//! space: two spatial coordinates followed by three (unnormalized)
//! color coordinates.  A batch is stored flat, five floats per point,
//! because every transform walks the whole batch anyway.

use std::f64::consts::PI;
use std::ops::Index;

/// The number of coordinates in a single point.
pub const DIMENSIONS: usize = 5;

/// Half the width of the wrapped coordinate space.
pub const TWO_PI: f64 = 2.0 * PI;

/// The full width of the wrapped coordinate space.
pub const FOUR_PI: f64 = 4.0 * PI;

/// The smallest squared norm the norm-based maps will work with.  A
/// point sitting exactly on the origin would otherwise send them to
/// infinity.
pub const NORM_FLOOR: f64 = 1.0e-12;

/// A single point: `[x, y, r, g, b]`.
pub type Point5 = [f64; DIMENSIONS];

/// Fold a coordinate into the half-open interval `[-2π, 2π)`.
#[inline]
pub fn wrap(v: f64) -> f64 {
    let w = (v + TWO_PI).rem_euclid(FOUR_PI) - TWO_PI;
    // rem_euclid may round up to exactly the modulus.
    if w >= TWO_PI {
        -TWO_PI
    } else {
        w
    }
}

/// The squared euclidean norm of a point, clamped away from zero.
#[inline]
pub fn norm_sqr(p: &[f64]) -> f64 {
    p.iter().map(|v| v * v).sum::<f64>().max(NORM_FLOOR)
}

/// An ordered collection of points.  Batches are never edited once
/// built; every transform produces a fresh one.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct PointBatch {
    coords: Vec<f64>,
}

impl PointBatch {
    /// Wrap a flat coordinate vector.  The length must be a multiple
    /// of five.
    pub fn from_flat(coords: Vec<f64>) -> PointBatch {
        assert!(
            coords.len() % DIMENSIONS == 0,
            "batch of {} floats is not a whole number of points",
            coords.len()
        );
        PointBatch { coords }
    }

    /// Build a batch out of individual points.
    pub fn from_points(points: &[Point5]) -> PointBatch {
        PointBatch {
            coords: points.iter().flat_map(|p| p.iter().cloned()).collect(),
        }
    }

    /// The starting batch for seeding: five points, the i-th of which
    /// is the i-th unit vector.
    pub fn canonical() -> PointBatch {
        let mut coords = vec![0.0; DIMENSIONS * DIMENSIONS];
        for i in 0..DIMENSIONS {
            coords[i * DIMENSIONS + i] = 1.0;
        }
        PointBatch { coords }
    }

    /// Append every batch, in order, into a single new batch.
    pub fn concatenate(batches: &[PointBatch]) -> PointBatch {
        let total = batches.iter().map(|b| b.coords.len()).sum();
        let mut coords = Vec::with_capacity(total);
        for batch in batches {
            coords.extend_from_slice(&batch.coords);
        }
        PointBatch { coords }
    }

    /// Build a batch of the same size by mapping every point
    /// independently.
    pub fn map_points<F>(&self, mut f: F) -> PointBatch
    where
        F: FnMut(&[f64], &mut [f64]),
    {
        let mut coords = vec![0.0; self.coords.len()];
        for (src, dst) in self
            .coords
            .chunks(DIMENSIONS)
            .zip(coords.chunks_mut(DIMENSIONS))
        {
            f(src, dst);
        }
        PointBatch { coords }
    }

    /// The number of points in the batch.
    pub fn len(&self) -> usize {
        self.coords.len() / DIMENSIONS
    }

    /// True if the batch holds no points.
    pub fn is_empty(&self) -> bool {
        self.coords.is_empty()
    }

    /// Iterate over the points, each as a five element slice.
    pub fn points(&self) -> std::slice::Chunks<'_, f64> {
        self.coords.chunks(DIMENSIONS)
    }

    /// The raw coordinates.
    pub fn as_flat(&self) -> &[f64] {
        &self.coords
    }
}

impl Index<usize> for PointBatch {
    type Output = [f64];

    fn index(&self, point: usize) -> &[f64] {
        &self.coords[point * DIMENSIONS..(point + 1) * DIMENSIONS]
    }
}
