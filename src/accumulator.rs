// This Source Code Form is subject to the terms of the Mozilla Public
// License, v. 2.0. If a copy of the MPL was not distributed with this
// file, You can obtain one at http://mozilla.org/MPL/2.0/.

//! Projection and accumulation.  Every point of a leaf lands on a
//! pixel; the pixel keeps a running sum of the colors that landed on
//! it and a count of how many did.  What gets shown is the mean color
//! pushed through a cosine tone curve, which stays inside `[0, 255]`
//! no matter how many samples a pixel collects.

use num::clamp;
use tracing::trace;

use crate::planes::PlaneMapper;
use crate::points::PointBatch;
use crate::random::ColorAxis;

/// Alpha channel value for every presented pixel.
pub const OPAQUE: u8 = 255;

/// Map a mean color coordinate to a displayable channel value.
#[inline]
pub fn tone_map(mean: f64) -> u8 {
    clamp((127.5 * (1.0 - mean.cos())).floor(), 0.0, 255.0) as u8
}

/// Running per-pixel statistics and the RGBA image built from them.
#[derive(Debug)]
pub struct PixelAccumulator {
    plane: PlaneMapper,
    counts: Vec<u32>,
    sums: Vec<f64>,
    pixels: Vec<u8>,
    dropped: u64,
}

impl PixelAccumulator {
    /// An empty, opaque black `resolution x resolution` image.
    pub fn new(resolution: usize) -> Result<PixelAccumulator, String> {
        let plane = PlaneMapper::new(resolution)?;
        let len = plane.len();
        let mut pixels = vec![0 as u8; len * 4];
        for alpha in pixels.iter_mut().skip(3).step_by(4) {
            *alpha = OPAQUE;
        }
        Ok(PixelAccumulator {
            plane,
            counts: vec![0; len],
            sums: vec![0.0; len * 3],
            pixels,
            dropped: 0,
        })
    }

    /// Project a batch onto the image.  Colors lose their component
    /// along `axis` before being summed.  A pixel whose count has
    /// saturated keeps its mean; further samples leave it untouched.
    pub fn accumulate(&mut self, batch: &PointBatch, axis: &ColorAxis) {
        for point in batch.points() {
            let offset = match self.plane.point_to_offset(point[0], point[1]) {
                Some(offset) => offset,
                None => {
                    self.dropped += 1;
                    trace!(x = point[0], y = point[1], "point outside the plane");
                    continue;
                }
            };
            if self.counts[offset] == u32::MAX {
                continue;
            }
            let color = axis.remove_from([point[2], point[3], point[4]]);
            self.counts[offset] += 1;
            let count = f64::from(self.counts[offset]);
            let sums = &mut self.sums[offset * 3..offset * 3 + 3];
            let pixel = &mut self.pixels[offset * 4..offset * 4 + 4];
            for channel in 0..3 {
                sums[channel] += color[channel];
                pixel[channel] = tone_map(sums[channel] / count);
            }
            pixel[3] = OPAQUE;
        }
    }

    /// The side of the image, in pixels.
    pub fn resolution(&self) -> usize {
        self.plane.resolution
    }

    /// The RGBA image, row major, top row first.
    pub fn pixels(&self) -> &[u8] {
        &self.pixels
    }

    /// How many samples each pixel has received.
    pub fn counts(&self) -> &[u32] {
        &self.counts
    }

    /// The summed colors, three per pixel.
    pub fn sums(&self) -> &[f64] {
        &self.sums
    }

    /// Points that fell outside the plane and were not drawn.
    pub fn dropped(&self) -> u64 {
        self.dropped
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn axis() -> ColorAxis {
        ColorAxis::new([0.0, 0.0, 1.0]).unwrap()
    }

    #[test]
    fn fresh_image_is_opaque_black() {
        let acc = PixelAccumulator::new(4).unwrap();
        assert_eq!(acc.pixels().len(), 64);
        for px in acc.pixels().chunks(4) {
            assert_eq!(px, &[0, 0, 0, OPAQUE]);
        }
        assert!(acc.counts().iter().all(|c| *c == 0));
    }

    #[test]
    fn tone_curve_is_bounded_and_periodic() {
        assert_eq!(tone_map(0.0), 0);
        assert_eq!(tone_map(std::f64::consts::PI), 255);
        assert_eq!(tone_map(std::f64::consts::PI / 2.0), 127);
        assert_eq!(tone_map(2.0 * std::f64::consts::PI), 0);
        assert_eq!(tone_map(-std::f64::consts::PI), 255);
    }

    #[test]
    fn accumulates_the_running_mean() {
        let mut acc = PixelAccumulator::new(640).unwrap();
        let batch = PointBatch::from_points(&[[0.0, 0.0, 1.0, 3.0, 9.0], [0.0, 0.0, 2.0, 0.0, 9.0]]);
        acc.accumulate(&batch, &axis());
        let offset = 319 * 640 + 319;
        assert_eq!(acc.counts()[offset], 2);
        assert_eq!(&acc.sums()[offset * 3..offset * 3 + 3], &[3.0, 3.0, 0.0]);
        let px = &acc.pixels()[offset * 4..offset * 4 + 4];
        assert_eq!(px, &[tone_map(1.5), tone_map(1.5), 0, OPAQUE]);
        assert_eq!(acc.counts().iter().map(|c| *c as u64).sum::<u64>(), 2);
    }

    #[test]
    fn the_axis_itself_contributes_nothing() {
        let axis = ColorAxis::new([1.0, 2.0, -2.0]).unwrap();
        let a = axis.components();
        let mut acc = PixelAccumulator::new(8).unwrap();
        acc.accumulate(&PointBatch::from_points(&[[1.0, 1.0, a[0], a[1], a[2]]]), &axis);
        let offset = acc.counts().iter().position(|c| *c == 1).unwrap();
        for s in &acc.sums()[offset * 3..offset * 3 + 3] {
            assert!(s.abs() < 1e-12);
        }
    }

    #[test]
    fn counts_never_decrease() {
        let mut acc = PixelAccumulator::new(16).unwrap();
        let batch = PointBatch::from_points(&[[1.0, -2.0, 0.5, 0.5, 0.5], [-3.0, 3.0, 1.0, 0.0, 0.0]]);
        let mut previous = acc.counts().to_vec();
        for _ in 0..5 {
            acc.accumulate(&batch, &axis());
            assert!(acc.counts().iter().zip(previous.iter()).all(|(now, then)| now >= then));
            previous = acc.counts().to_vec();
        }
        assert_eq!(previous.iter().sum::<u32>(), 10);
    }

    #[test]
    fn saturated_pixels_keep_their_mean() {
        let mut acc = PixelAccumulator::new(4).unwrap();
        let offset = acc.plane.point_to_offset(0.0, 0.0).unwrap();
        let almost = f64::from(u32::MAX - 1);
        acc.counts[offset] = u32::MAX - 1;
        acc.sums[offset * 3] = almost;
        acc.sums[offset * 3 + 1] = almost;
        let batch = PointBatch::from_points(&[[0.0, 0.0, 1.0, 1.0, 7.0]; 4]);
        acc.accumulate(&batch, &axis());

        assert_eq!(acc.counts()[offset], u32::MAX);
        let count = f64::from(u32::MAX);
        assert_eq!(acc.sums()[offset * 3] / count, 1.0);
        assert_eq!(acc.sums()[offset * 3 + 1] / count, 1.0);
        let px = &acc.pixels()[offset * 4..offset * 4 + 4];
        assert_eq!(px, &[tone_map(1.0), tone_map(1.0), 0, OPAQUE]);
        assert_eq!(acc.dropped(), 0);
    }

    #[test]
    fn stray_points_are_dropped_not_drawn() {
        let mut acc = PixelAccumulator::new(16).unwrap();
        let batch = PointBatch::from_points(&[[50.0, 0.0, 1.0, 1.0, 1.0], [std::f64::NAN, 0.0, 0.0, 0.0, 0.0]]);
        acc.accumulate(&batch, &axis());
        assert_eq!(acc.dropped(), 2);
        assert!(acc.counts().iter().all(|c| *c == 0));
    }
}
