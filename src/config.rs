// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Default knobs.

/// Bounds on how much work a render does.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Limits {
    /// Seeding stops once the warm-up batch holds at least this many
    /// points.  Every leaf batch has the same size as the seed batch.
    pub seed_points: usize,
    /// The number of leaves the traversal may visit, counting the
    /// rounds spent seeding as levels already descended.
    pub leaf_budget: f64,
}

impl Default for Limits {
    fn default() -> Limits {
        Limits {
            seed_points: 50_000,
            leaf_budget: 3.0e8,
        }
    }
}
