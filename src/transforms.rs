// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The transform library.
//!
//! Two families of maps act on whole point batches.  *Parallel*
//! transforms treat every point on its own; they are the branches of
//! the iterated function system, and the traversal picks one of them
//! at every level of the tree.  *Sequential* transforms may look at a
//! point's neighbours in batch order; one of them follows every
//! parallel step to smear the batch back toward the attractor.
//!
//! Neither family edits its input.  Both always return a batch of the
//! same length as the one they were given.

use itertools::iproduct;
use rand::Rng;

use crate::points::{norm_sqr, wrap, PointBatch, DIMENSIONS};
use crate::random::box_muller;

const CONTRACT_EXPONENT: f64 = -1.0 / 3.0;
const EXPAND_EXPONENT: f64 = 1.0 / 4.0;

/// A fixed random linear map on the five dimensional space.
#[derive(Clone, Debug, PartialEq)]
pub struct AffineMap {
    matrix: [[f64; DIMENSIONS]; DIMENSIONS],
}

impl AffineMap {
    /// Draw a fresh matrix of independent standard normals, each
    /// multiplied by `scale`.
    pub fn random<R: Rng>(rng: &mut R, scale: f64) -> AffineMap {
        let mut matrix = [[0.0; DIMENSIONS]; DIMENSIONS];
        for (i, j) in iproduct!(0..DIMENSIONS, 0..DIMENSIONS) {
            matrix[i][j] = scale * box_muller(rng);
        }
        AffineMap { matrix }
    }

    /// Use a known matrix.
    pub fn from_matrix(matrix: [[f64; DIMENSIONS]; DIMENSIONS]) -> AffineMap {
        AffineMap { matrix }
    }

    /// Multiply, then wrap every coordinate.
    #[inline]
    fn apply_point(&self, src: &[f64], dst: &mut [f64]) {
        for (out, row) in dst.iter_mut().zip(self.matrix.iter()) {
            let v: f64 = row.iter().zip(src.iter()).map(|(m, p)| m * p).sum();
            *out = wrap(v);
        }
    }
}

/// Multiply every coordinate by `(|p|²)^(-1/3)`.  Pulls distant points
/// in and pushes near ones out; there is no wrap afterward.
#[inline]
fn contract_point(src: &[f64], dst: &mut [f64]) {
    let factor = norm_sqr(src).powf(CONTRACT_EXPONENT);
    for (out, v) in dst.iter_mut().zip(src.iter()) {
        *out = v * factor;
    }
}

/// The branches of the system.  Each acts on one point at a time.
#[derive(Clone, Debug, PartialEq)]
pub enum ParallelTransform {
    /// A random linear map, wrapped.
    Affine(AffineMap),
    /// `cos(v)` on every coordinate.
    Cosine,
    /// `2 sin(v)` on every coordinate.
    ScaledSine,
    /// The norm based contraction.
    Contract,
}

impl ParallelTransform {
    /// Map every point of the batch.
    pub fn apply(&self, batch: &PointBatch) -> PointBatch {
        match self {
            ParallelTransform::Affine(affine) => {
                batch.map_points(|src, dst| affine.apply_point(src, dst))
            }
            ParallelTransform::Cosine => batch.map_points(|src, dst| {
                for (out, v) in dst.iter_mut().zip(src.iter()) {
                    *out = wrap(v.cos());
                }
            }),
            ParallelTransform::ScaledSine => batch.map_points(|src, dst| {
                for (out, v) in dst.iter_mut().zip(src.iter()) {
                    *out = wrap(2.0 * v.sin());
                }
            }),
            ParallelTransform::Contract => batch.map_points(contract_point),
        }
    }

    /// Whether the output of this transform is folded into `[-2π, 2π)`.
    pub fn wraps(&self) -> bool {
        match self {
            ParallelTransform::Contract => false,
            _ => true,
        }
    }
}

/// Transforms that may depend on a point's position in the batch.
#[derive(Copy, Clone, Debug, PartialEq)]
pub enum SequentialTransform {
    /// Average every point with the one before it.  The first point is
    /// averaged with the last.
    WeightedMean,
    /// Push every coordinate up by the fourth root of the point's norm,
    /// then wrap.
    Expand,
    /// The norm based contraction.
    Contract,
}

impl SequentialTransform {
    /// Map the batch.
    pub fn apply(&self, batch: &PointBatch) -> PointBatch {
        match self {
            SequentialTransform::WeightedMean => weighted_mean(batch),
            SequentialTransform::Expand => batch.map_points(|src, dst| {
                let delta = norm_sqr(src).sqrt().powf(EXPAND_EXPONENT);
                for (out, v) in dst.iter_mut().zip(src.iter()) {
                    *out = wrap(v + delta);
                }
            }),
            SequentialTransform::Contract => batch.map_points(contract_point),
        }
    }

    /// Whether the output of this transform is folded into `[-2π, 2π)`.
    pub fn wraps(&self) -> bool {
        match self {
            SequentialTransform::Expand => true,
            _ => false,
        }
    }
}

fn weighted_mean(batch: &PointBatch) -> PointBatch {
    let n = batch.len();
    if n == 0 {
        return batch.clone();
    }
    let src = batch.as_flat();
    let mut coords = vec![0.0; src.len()];
    for p in 0..n {
        let prev = if p == 0 { n - 1 } else { p - 1 };
        for i in 0..DIMENSIONS {
            coords[p * DIMENSIONS + i] =
                0.5 * src[p * DIMENSIONS + i] + 0.5 * src[prev * DIMENSIONS + i];
        }
    }
    PointBatch::from_flat(coords)
}

/// The complete set of maps a render works with.  Built once; never
/// changed afterward.
#[derive(Clone, Debug, PartialEq)]
pub struct TransformSet {
    /// The branches, in the order the traversal tries them.
    pub parallel: Vec<ParallelTransform>,
    /// The smoothing maps, picked round-robin by depth.
    pub sequential: Vec<SequentialTransform>,
}

impl TransformSet {
    /// Three random affine maps, each paired with one of the fixed
    /// nonlinear maps, and all three sequential maps.
    pub fn standard<R: Rng>(rng: &mut R, scale: f64) -> TransformSet {
        let nonlinear = [
            ParallelTransform::Cosine,
            ParallelTransform::ScaledSine,
            ParallelTransform::Contract,
        ];
        let mut parallel = Vec::with_capacity(2 * nonlinear.len());
        for map in nonlinear.iter() {
            parallel.push(ParallelTransform::Affine(AffineMap::random(rng, scale)));
            parallel.push(map.clone());
        }
        TransformSet {
            parallel,
            sequential: vec![
                SequentialTransform::WeightedMean,
                SequentialTransform::Expand,
                SequentialTransform::Contract,
            ],
        }
    }

    /// The number of children of every node in the traversal tree.
    pub fn branching(&self) -> usize {
        self.parallel.len()
    }

    /// The sequential map used after `round` parallel steps.
    pub fn sequential_for(&self, round: usize) -> &SequentialTransform {
        &self.sequential[round % self.sequential.len()]
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::points::TWO_PI;
    use crate::random::session_rng;

    fn sample_batch() -> PointBatch {
        let mut rng = session_rng(Some(5));
        let coords = (0..500).map(|_| 3.0 * box_muller(&mut rng)).collect();
        PointBatch::from_flat(coords)
    }

    fn all_wrapped(batch: &PointBatch) -> bool {
        batch.as_flat().iter().all(|v| *v >= -TWO_PI && *v < TWO_PI)
    }

    #[test]
    fn wrapping_transforms_stay_in_range() {
        let mut rng = session_rng(Some(9));
        let set = TransformSet::standard(&mut rng, 4.0);
        let batch = sample_batch();
        for tx in set.parallel.iter().filter(|t| t.wraps()) {
            assert!(all_wrapped(&tx.apply(&batch)), "{:?}", tx);
        }
        for tx in set.sequential.iter().filter(|t| t.wraps()) {
            assert!(all_wrapped(&tx.apply(&batch)), "{:?}", tx);
        }
    }

    #[test]
    fn transforms_preserve_length_and_input() {
        let mut rng = session_rng(Some(10));
        let set = TransformSet::standard(&mut rng, 1.0);
        let batch = sample_batch();
        let before = batch.clone();
        for tx in &set.parallel {
            assert_eq!(tx.apply(&batch).len(), batch.len());
        }
        for tx in &set.sequential {
            assert_eq!(tx.apply(&batch).len(), batch.len());
        }
        assert_eq!(batch, before);
    }

    #[test]
    fn standard_set_interleaves_affine_and_nonlinear() {
        let mut rng = session_rng(Some(1));
        let set = TransformSet::standard(&mut rng, 1.0);
        assert_eq!(set.branching(), 6);
        assert_eq!(set.sequential.len(), 3);
        match (&set.parallel[0], &set.parallel[2]) {
            (ParallelTransform::Affine(a), ParallelTransform::Affine(b)) => assert_ne!(a, b),
            _ => panic!("expected affine maps at even positions"),
        }
        assert_eq!(set.parallel[1], ParallelTransform::Cosine);
        assert_eq!(set.parallel[3], ParallelTransform::ScaledSine);
        assert_eq!(set.parallel[5], ParallelTransform::Contract);
    }

    #[test]
    fn affine_multiplies_then_wraps() {
        let mut m = [[0.0; DIMENSIONS]; DIMENSIONS];
        for i in 0..DIMENSIONS {
            m[i][i] = 2.0;
        }
        m[0][1] = 1.0;
        let tx = ParallelTransform::Affine(AffineMap::from_matrix(m));
        let out = tx.apply(&PointBatch::from_points(&[[1.0, 1.0, 2.0, 4.0, 0.5]]));
        assert!((out[0][0] - 3.0).abs() < 1e-12);
        assert!((out[0][1] - 2.0).abs() < 1e-12);
        assert!((out[0][2] - 4.0).abs() < 1e-12);
        // 8 wraps around to 8 - 4π
        assert!((out[0][3] - (8.0 - 2.0 * TWO_PI)).abs() < 1e-12);
        assert!((out[0][4] - 1.0).abs() < 1e-12);
    }

    #[test]
    fn scaled_sine_doubles() {
        let out = ParallelTransform::ScaledSine.apply(&PointBatch::from_points(&[[
            0.5, 1.0, 0.0, -1.0, 2.0,
        ]]));
        assert!((out[0][0] - 2.0 * 0.5f64.sin()).abs() < 1e-12);
        assert!((out[0][3] + 2.0 * 1.0f64.sin()).abs() < 1e-12);
    }

    #[test]
    fn contraction_scales_by_norm() {
        let out = ParallelTransform::Contract.apply(&PointBatch::from_points(&[[
            8.0, 0.0, 0.0, 0.0, 0.0,
        ]]));
        // |p|² = 64, 64^(-1/3) = 1/4
        assert!((out[0][0] - 2.0).abs() < 1e-12);
    }

    #[test]
    fn contraction_survives_the_origin() {
        let out = SequentialTransform::Contract.apply(&PointBatch::from_points(&[[0.0; 5]]));
        assert!(out.as_flat().iter().all(|v| v.is_finite()));
    }

    #[test]
    fn expansion_adds_the_fourth_root_of_the_norm() {
        let out = SequentialTransform::Expand.apply(&PointBatch::from_points(&[[
            0.0, 0.0, 0.0, 0.0, 4.0,
        ]]));
        let delta = 4.0f64.powf(0.25);
        assert!((out[0][0] - delta).abs() < 1e-12);
        assert!((out[0][4] - (4.0 + delta)).abs() < 1e-12);
    }

    #[test]
    fn weighted_mean_wraps_to_the_last_point() {
        let batch = PointBatch::from_points(&[[0.0; 5], [2.0; 5], [4.0; 5]]);
        let out = SequentialTransform::WeightedMean.apply(&batch);
        assert_eq!(out[0], [2.0; 5]);
        assert_eq!(out[1], [1.0; 5]);
        assert_eq!(out[2], [3.0; 5]);
    }

    #[test]
    fn sequential_maps_are_picked_round_robin() {
        let mut rng = session_rng(None);
        let set = TransformSet::standard(&mut rng, 1.0);
        assert_eq!(*set.sequential_for(0), SequentialTransform::WeightedMean);
        assert_eq!(*set.sequential_for(4), SequentialTransform::Expand);
        assert_eq!(*set.sequential_for(8), SequentialTransform::Contract);
    }
}
