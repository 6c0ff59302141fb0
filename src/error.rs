// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Errors.  The engine does no I/O, so the only thing that can go
//! wrong is being handed a configuration it cannot work with.  That is
//! caught once, when the engine is built.

use failure::Fail;

/// Reasons an engine could not be built.
#[derive(Debug, Fail, PartialEq)]
pub enum ConfigurationError {
    /// The traversal tree needs at least one branch.
    #[fail(display = "at least one parallel transform is required")]
    NoParallelTransforms,

    /// Seeding and traversal both follow every branch with a
    /// sequential transform.
    #[fail(display = "at least one sequential transform is required")]
    NoSequentialTransforms,

    /// The image must have at least one pixel.
    #[fail(display = "resolution must be a positive number of pixels")]
    ZeroResolution,

    /// The leaf budget must be a finite number no smaller than one.
    #[fail(display = "leaf budget must be finite and at least 1, got {}", _0)]
    InvalidLeafBudget(f64),
}

/// Result type for building an engine.
pub type Result<T> = std::result::Result<T, ConfigurationError>;
