// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Contains the PlaneMapper struct, which describes a relationship
//! between a square on the integral plane with an origin at 0,0 (the
//! top left pixel), and the square `[-2π, 2π) x [-2π, 2π)` in which the
//! spatial half of every point lives.  The pixel grid is y-flipped:
//! row 0 is the top of the image, which is the largest y.

use crate::points::{FOUR_PI, TWO_PI};

/// Describes the column, row of a pixel in the grid.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct Pixel(pub usize, pub usize);

/// Maps spatial coordinates onto a `resolution x resolution` grid.
#[derive(Debug)]
pub struct PlaneMapper {
    /// The side of the integral square, in pixels.
    pub resolution: usize,
    // The largest pixel index, as a float.  A shifted coordinate times
    // this, over 4π, floored, is the coordinate on the grid.
    span: f64,
}

impl PlaneMapper {
    /// Constructor.  A zero sized plane is not a plane.
    pub fn new(resolution: usize) -> Result<PlaneMapper, String> {
        if resolution == 0 {
            return Err("The integral plane must be at least one pixel wide.".to_string());
        }
        Ok(PlaneMapper {
            resolution,
            span: (resolution - 1) as f64,
        })
    }

    /// The total number of points in the integral grid.  Used to
    /// calculate memory needs.
    pub(crate) fn len(&self) -> usize {
        self.resolution * self.resolution
    }

    /// Given a spatial point, map it as closely as possible to a point
    /// on the integral cartesian plane.  Returns None for points
    /// outside the square, including anything non-finite.
    pub fn point_to_pixel(&self, x: f64, y: f64) -> Option<Pixel> {
        let left = ((TWO_PI + x) * self.span / FOUR_PI).floor();
        let top = ((TWO_PI - y) * self.span / FOUR_PI).floor();
        let limit = self.resolution as f64;
        if !(left >= 0.0 && left < limit && top >= 0.0 && top < limit) {
            return None;
        }
        Some(Pixel(left as usize, top as usize))
    }

    /// Maps a point to pixel coordinates, then returns the linear offset
    /// of that pixel from the root of the image buffer.
    pub fn point_to_offset(&self, x: f64, y: f64) -> Option<usize> {
        self.point_to_pixel(x, y)
            .map(|Pixel(left, top)| top * self.resolution + left)
    }
}
