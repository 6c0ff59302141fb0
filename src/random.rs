// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Random sources.  Everything random in a render (the affine
//! matrices and the color axis) is drawn once, up front, from a
//! single generator.  Handing that generator a seed makes a render
//! repeatable; without one it draws from the operating system.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Build the generator for a session.
pub fn session_rng(seed: Option<u64>) -> StdRng {
    match seed {
        Some(seed) => StdRng::seed_from_u64(seed),
        None => StdRng::from_entropy(),
    }
}

/// Draw a standard normal deviate using the Box-Muller transform.
pub fn box_muller<R: Rng>(rng: &mut R) -> f64 {
    let mut u1: f64 = 0.0;
    let mut u2: f64 = 0.0;
    // ln(0) is not a number we want to see.
    while u1 == 0.0 {
        u1 = rng.gen();
    }
    while u2 == 0.0 {
        u2 = rng.gen();
    }
    (-2.0 * u1.ln()).sqrt() * (2.0 * std::f64::consts::PI * u2).cos()
}

/// A fixed unit vector in color space.  The accumulator strips each
/// color of its component along this axis before summing, which takes
/// away one degree of freedom and with it the symmetric banding the
/// raw colors tend to show.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct ColorAxis([f64; 3]);

impl ColorAxis {
    /// Draw a random direction: three normals, normalized.
    pub fn random<R: Rng>(rng: &mut R) -> ColorAxis {
        loop {
            let v = [box_muller(rng), box_muller(rng), box_muller(rng)];
            if let Some(axis) = ColorAxis::new(v) {
                return axis;
            }
        }
    }

    /// Normalize an arbitrary vector into an axis.  Returns None for a
    /// vector too short to have a direction.
    pub fn new(v: [f64; 3]) -> Option<ColorAxis> {
        let len = (v[0] * v[0] + v[1] * v[1] + v[2] * v[2]).sqrt();
        if !len.is_finite() || len < 1.0e-12 {
            return None;
        }
        Some(ColorAxis([v[0] / len, v[1] / len, v[2] / len]))
    }

    /// The unit vector itself.
    pub fn components(&self) -> [f64; 3] {
        self.0
    }

    /// Subtract the component of `c` lying along the axis.
    #[inline]
    pub fn remove_from(&self, c: [f64; 3]) -> [f64; 3] {
        let a = &self.0;
        let dot = c[0] * a[0] + c[1] * a[1] + c[2] * a[2];
        [c[0] - dot * a[0], c[1] - dot * a[1], c[2] - dot * a[2]]
    }
}
