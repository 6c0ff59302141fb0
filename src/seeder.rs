// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Warm-up.  Before the exhaustive walk can start we need a batch of
//! points that already sits on (or very near) the attractor.  We get
//! it by brute force: push a handful of points through every branch,
//! keep all the results, smooth them, and repeat until there are
//! enough of them.

use tracing::debug;

use crate::points::PointBatch;
use crate::transforms::TransformSet;

/// The outcome of seeding: the warmed up batch, and how many rounds it
/// took to grow it.  The traversal continues the sequential schedule
/// from where the seeder left it.
#[derive(Clone, Debug, PartialEq)]
pub struct Seed {
    /// Points on the attractor.
    pub batch: PointBatch,
    /// Rounds of expansion performed.
    pub rounds: usize,
}

/// Grow the canonical batch until it holds at least `target_points`
/// points.  Every round multiplies its size by the number of parallel
/// transforms.  With a single parallel transform the batch can never
/// grow, so seeding gives up after one round.
pub fn seed(transforms: &TransformSet, target_points: usize) -> Seed {
    let mut batch = PointBatch::canonical();
    let mut rounds = 0;
    while batch.len() < target_points {
        let before = batch.len();
        let branches: Vec<PointBatch> = transforms
            .parallel
            .iter()
            .map(|tx| tx.apply(&batch))
            .collect();
        batch = transforms
            .sequential_for(rounds)
            .apply(&PointBatch::concatenate(&branches));
        rounds += 1;
        debug!(round = rounds, points = batch.len(), "seeding");
        if batch.len() <= before {
            break;
        }
    }
    Seed { batch, rounds }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::random::session_rng;
    use crate::transforms::{ParallelTransform, SequentialTransform};

    #[test]
    fn small_targets_need_no_rounds() {
        let mut rng = session_rng(Some(1));
        let set = TransformSet::standard(&mut rng, 1.0);
        let seed = seed(&set, 5);
        assert_eq!(seed.rounds, 0);
        assert_eq!(seed.batch, PointBatch::canonical());
    }

    #[test]
    fn each_round_multiplies_by_the_branching_factor() {
        let mut rng = session_rng(Some(2));
        let set = TransformSet::standard(&mut rng, 1.0);
        // 5 -> 30 -> 180 -> 1080
        let seed = seed(&set, 1000);
        assert_eq!(seed.rounds, 3);
        assert_eq!(seed.batch.len(), 1080);
    }

    #[test]
    fn a_single_branch_cannot_grow() {
        let set = TransformSet {
            parallel: vec![ParallelTransform::Cosine],
            sequential: vec![SequentialTransform::WeightedMean],
        };
        let seed = seed(&set, 1000);
        assert_eq!(seed.rounds, 1);
        assert_eq!(seed.batch.len(), 5);
    }

    #[test]
    fn sequential_maps_rotate_with_the_round() {
        let set = TransformSet {
            parallel: vec![ParallelTransform::Cosine, ParallelTransform::ScaledSine],
            sequential: vec![SequentialTransform::Contract, SequentialTransform::Expand],
        };
        let seeded = seed(&set, 20);
        assert_eq!(seeded.rounds, 2);

        let canonical = PointBatch::canonical();
        let round = |b: &PointBatch, s: SequentialTransform| {
            let parts: Vec<PointBatch> = set.parallel.iter().map(|t| t.apply(b)).collect();
            s.apply(&PointBatch::concatenate(&parts))
        };
        let first = round(&canonical, SequentialTransform::Contract);
        let second = round(&first, SequentialTransform::Expand);
        assert_eq!(seeded.batch, second);
    }
}
