// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! The engine ties seeding, traversal and accumulation together behind
//! three calls: build it, step it, look at the picture.

use tracing::info;

use crate::accumulator::PixelAccumulator;
use crate::config::Limits;
use crate::error::{ConfigurationError, Result};
use crate::random::ColorAxis;
use crate::seeder::seed;
use crate::transforms::{ParallelTransform, SequentialTransform, TransformSet};
use crate::traversal::{max_depth, Phase, Traversal};

/// A render in progress.
#[derive(Debug)]
pub struct Engine {
    axis: ColorAxis,
    traversal: Traversal,
    accumulator: PixelAccumulator,
    leaves: u64,
}

impl Engine {
    /// Seed the attractor and allocate a `resolution x resolution`
    /// image, using the default limits.
    pub fn initialize(
        sequential: Vec<SequentialTransform>,
        parallel: Vec<ParallelTransform>,
        resolution: usize,
        axis: ColorAxis,
    ) -> Result<Engine> {
        Engine::with_limits(
            TransformSet {
                parallel,
                sequential,
            },
            resolution,
            axis,
            Limits::default(),
        )
    }

    /// As `initialize`, with explicit limits.
    pub fn with_limits(
        transforms: TransformSet,
        resolution: usize,
        axis: ColorAxis,
        limits: Limits,
    ) -> Result<Engine> {
        if transforms.parallel.is_empty() {
            return Err(ConfigurationError::NoParallelTransforms);
        }
        if transforms.sequential.is_empty() {
            return Err(ConfigurationError::NoSequentialTransforms);
        }
        if !limits.leaf_budget.is_finite() || limits.leaf_budget < 1.0 {
            return Err(ConfigurationError::InvalidLeafBudget(limits.leaf_budget));
        }
        let accumulator =
            PixelAccumulator::new(resolution).map_err(|_| ConfigurationError::ZeroResolution)?;

        let seeded = seed(&transforms, limits.seed_points);
        let branching = transforms.branching();
        let depth = max_depth(limits.leaf_budget, branching, seeded.rounds);
        info!(
            rounds = seeded.rounds,
            points = seeded.batch.len(),
            branching,
            max_depth = depth,
            "attractor seeded"
        );
        let traversal = Traversal::new(seeded, transforms, depth);

        Ok(Engine {
            axis,
            traversal,
            accumulator,
            leaves: 0,
        })
    }

    /// Visit the next leaf and draw it.  Returns false once every leaf
    /// has been drawn; from then on it does nothing and keeps
    /// returning false.
    pub fn step(&mut self) -> bool {
        match self.traversal.advance() {
            Some(batch) => {
                self.accumulator.accumulate(batch, &self.axis);
                self.leaves += 1;
                true
            }
            None => false,
        }
    }

    /// The RGBA image as it stands.
    pub fn pixels(&self) -> &[u8] {
        self.accumulator.pixels()
    }

    /// Samples received per pixel.
    pub fn counts(&self) -> &[u32] {
        self.accumulator.counts()
    }

    /// The side of the image, in pixels.
    pub fn resolution(&self) -> usize {
        self.accumulator.resolution()
    }

    /// Leaves drawn so far.
    pub fn leaves(&self) -> u64 {
        self.leaves
    }

    /// Leaves a complete render draws.
    pub fn total_leaves(&self) -> u64 {
        self.traversal.total_leaves()
    }

    /// Current depth of the traversal stack.
    pub fn depth(&self) -> usize {
        self.traversal.depth()
    }

    /// The depth of every leaf.
    pub fn max_depth(&self) -> usize {
        self.traversal.max_depth()
    }

    /// Rounds spent seeding.
    pub fn seed_rounds(&self) -> usize {
        self.traversal.seed_rounds()
    }

    /// True once every leaf has been drawn.
    pub fn is_exhausted(&self) -> bool {
        self.traversal.phase() == Phase::Exhausted
    }

    /// Points that missed the image.
    pub fn dropped(&self) -> u64 {
        self.accumulator.dropped()
    }
}
