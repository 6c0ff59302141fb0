#![deny(missing_docs)]
// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Fractal flame renderer
//!
//! An iterated function system takes a handful of maps and composes
//! them over and over; the set of points that survives endless
//! composition is the system's attractor.  The usual way to draw one is
//! the "chaos game": follow a single point, picking a map at random at
//! every step, and plot where it goes.
//!
//! This crate plays a different game.  Points live in five dimensions,
//! two for position and three for color.  A warm-up pass pushes a small
//! batch through every map at once until the batch is large enough to
//! stand in for the attractor.  From there, instead of choosing maps at
//! random, we walk *every* sequence of map choices up to a fixed depth,
//! one leaf of that tree at a time, and project each leaf's batch onto
//! an image.  Each pixel shows the mean of the colors that landed on it,
//! through a cosine tone curve, so the picture only gets better the
//! longer it runs and never washes out.

pub mod accumulator;
pub mod config;
pub mod engine;
pub mod error;
pub mod planes;
pub mod points;
pub mod random;
pub mod seeder;
pub mod transforms;
pub mod traversal;

pub use config::Limits;
pub use engine::Engine;
pub use error::{ConfigurationError, Result};
pub use points::PointBatch;
pub use random::ColorAxis;
pub use transforms::{AffineMap, ParallelTransform, SequentialTransform, TransformSet};
