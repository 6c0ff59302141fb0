// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The exhaustive walk.
//!
//! Every sequence of parallel transform choices of length `max_depth`
//! names one leaf of a tree whose branching factor is the number of
//! parallel transforms.  There are far too many leaves to compute them
//! all up front, so the walk is an explicit depth-first search that
//! hands back one leaf per call and remembers exactly where it stopped.
//!
//! The stack holds one frame per level: the transform chosen at that
//! level and the batch it produced.  A child's batch is its parent's
//! batch (or the seed, at depth one) run through the chosen parallel
//! transform and then the sequential transform for that depth.

use tracing::debug;

use crate::points::PointBatch;
use crate::seeder::Seed;
use crate::transforms::TransformSet;

/// Where the walk stands.
#[derive(Copy, Clone, Debug, PartialEq, Eq)]
pub enum Phase {
    /// Nothing has been visited yet.
    Idle,
    /// The last leaf was reached by descending from the root.
    Descending,
    /// The last leaf was reached by popping the levels whose children
    /// were all used up, moving to a sibling and descending from there.
    Advancing,
    /// Every leaf has been visited.  Terminal.
    Exhausted,
}

#[derive(Clone, Debug)]
struct Frame {
    transform: usize,
    batch: PointBatch,
}

/// The deepest level a walk may reach, given a budget on the number of
/// leaves and the rounds already spent seeding.  The level count is the
/// largest `d` with `branching^d <= leaf_budget`.  Budgets below one or
/// not finite give zero.
pub fn max_depth(leaf_budget: f64, branching: usize, seed_rounds: usize) -> usize {
    if branching < 2 || !leaf_budget.is_finite() || leaf_budget < 1.0 {
        return 0;
    }
    let b = branching as f64;
    let mut levels = (leaf_budget.ln() / b.ln()).floor() as i32;
    // The logarithms can land a hair either side of an exact power.
    while b.powi(levels + 1) <= leaf_budget {
        levels += 1;
    }
    while levels > 0 && b.powi(levels) > leaf_budget {
        levels -= 1;
    }
    (levels as usize).saturating_sub(seed_rounds)
}

/// Depth-first walk state.  Owns the transforms, the seed batch and
/// the stack.
#[derive(Debug)]
pub struct Traversal {
    transforms: TransformSet,
    seed: PointBatch,
    seed_rounds: usize,
    max_depth: usize,
    frames: Vec<Frame>,
    phase: Phase,
}

impl Traversal {
    /// Start a walk from a seed.  The branching factor is the number of
    /// parallel transforms in `transforms`.
    pub fn new(seed: Seed, transforms: TransformSet, max_depth: usize) -> Traversal {
        Traversal {
            transforms,
            seed: seed.batch,
            seed_rounds: seed.rounds,
            max_depth,
            frames: Vec::with_capacity(max_depth),
            phase: Phase::Idle,
        }
    }

    /// The maps the walk composes.
    pub fn transforms(&self) -> &TransformSet {
        &self.transforms
    }

    /// The number of levels currently on the stack.
    pub fn depth(&self) -> usize {
        self.frames.len()
    }

    /// The depth every leaf lives at.
    pub fn max_depth(&self) -> usize {
        self.max_depth
    }

    /// Rounds the seeder spent.
    pub fn seed_rounds(&self) -> usize {
        self.seed_rounds
    }

    /// The current phase.
    pub fn phase(&self) -> Phase {
        self.phase
    }

    /// The transform indices from the root to the current node.
    pub fn path(&self) -> Vec<usize> {
        self.frames.iter().map(|f| f.transform).collect()
    }

    /// The number of leaves a full walk visits.
    pub fn total_leaves(&self) -> u64 {
        (self.transforms.branching() as u64).saturating_pow(self.max_depth as u32)
    }

    fn push(&mut self, transform: usize) {
        let depth = self.frames.len() + 1;
        let batch = {
            let parent = self.frames.last().map_or(&self.seed, |f| &f.batch);
            let branched = self.transforms.parallel[transform].apply(parent);
            self.transforms
                .sequential_for(self.seed_rounds + depth)
                .apply(&branched)
        };
        self.frames.push(Frame { transform, batch });
    }

    /// Move to the next leaf and return its batch, or None once every
    /// leaf has been seen.  After the first None every later call
    /// returns None and touches nothing.
    pub fn advance(&mut self) -> Option<&PointBatch> {
        let branching = self.transforms.branching();
        let phase = self.phase;
        match phase {
            Phase::Exhausted => return None,
            Phase::Idle if self.max_depth == 0 => {
                // A zero depth tree has exactly one leaf: the root.
                self.phase = Phase::Exhausted;
                return Some(&self.seed);
            }
            Phase::Idle => self.phase = Phase::Descending,
            _ => {
                while self
                    .frames
                    .last()
                    .map_or(false, |f| f.transform + 1 == branching)
                {
                    self.frames.pop();
                }
                let next = match self.frames.pop() {
                    Some(frame) => frame.transform + 1,
                    None => {
                        self.phase = Phase::Exhausted;
                        debug!(max_depth = self.max_depth, "traversal exhausted");
                        return None;
                    }
                };
                self.phase = Phase::Advancing;
                self.push(next);
            }
        }

        while self.frames.len() < self.max_depth {
            self.push(0);
        }
        self.frames.last().map(|f| &f.batch)
    }
}
