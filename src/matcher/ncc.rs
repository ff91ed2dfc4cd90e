//! Zero-mean normalized cross-correlation patch cost.

use crate::image::OwnedImage;
use crate::matcher::{Disparity, MatchGeometry};
use crate::util::{PmHuberError, PmHuberResult};

/// Patches with a variance below this are treated as textureless.
const MIN_VARIANCE: f32 = 1e-6;

/// Cost returned when either patch is textureless: the value of an
/// uncorrelated pair.
pub const UNCORRELATED_COST: f32 = 1.0;

/// Base patch matcher scoring `1 - zncc` over an odd `kernel` window.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct NccMatcher {
    kernel_width: usize,
    kernel_height: usize,
}

impl NccMatcher {
    /// Creates a matcher; both kernel sizes must be odd and non-zero.
    pub fn new(kernel_width: usize, kernel_height: usize) -> PmHuberResult<Self> {
        if kernel_width % 2 == 0 || kernel_height % 2 == 0 {
            return Err(PmHuberError::InvalidKernel {
                width: kernel_width,
                height: kernel_height,
            });
        }
        Ok(Self {
            kernel_width,
            kernel_height,
        })
    }

    pub fn kernel(&self) -> (usize, usize) {
        (self.kernel_width, self.kernel_height)
    }

    /// Kernel half-sizes `(kernel - 1) / 2`.
    pub fn half(&self) -> (i32, i32) {
        (
            (self.kernel_width / 2) as i32,
            (self.kernel_height / 2) as i32,
        )
    }

    /// Padding an expanded buffer needs around its region: the kernel
    /// half-size plus one pixel for bilinear taps and central differences.
    pub fn halo(&self) -> (i32, i32) {
        let (hw, hh) = self.half();
        (hw + 1, hh + 1)
    }

    /// Scores disparity `d` at output pixel `(x, y)`.
    ///
    /// The primary patch is read at integer positions from `a`; the secondary
    /// patch is bilinearly sampled from `b` around `(x, y) + d`. Buffer
    /// origins come from `geometry`. The result lies in `[0, 2]`.
    pub fn cost(
        &self,
        a: &OwnedImage<f32>,
        b: &OwnedImage<f32>,
        geometry: &MatchGeometry,
        x: usize,
        y: usize,
        d: Disparity,
    ) -> f32 {
        let (hw, hh) = self.half();
        let ax = x as i32 - geometry.a_exp_roi.min_x;
        let ay = y as i32 - geometry.a_exp_roi.min_y;
        let bx = x as f32 + d.x - geometry.b_exp_roi.min_x as f32;
        let by = y as f32 + d.y - geometry.b_exp_roi.min_y as f32;

        let mut sum_a = 0.0f32;
        let mut sum_b = 0.0f32;
        let mut sum_aa = 0.0f32;
        let mut sum_bb = 0.0f32;
        let mut sum_ab = 0.0f32;
        for ky in -hh..=hh {
            let a_row = a.row((ay + ky) as usize);
            for kx in -hw..=hw {
                let va = a_row[(ax + kx) as usize];
                let vb = b.sample_bilinear(bx + kx as f32, by + ky as f32);
                sum_a += va;
                sum_b += vb;
                sum_aa += va * va;
                sum_bb += vb * vb;
                sum_ab += va * vb;
            }
        }

        let n = (self.kernel_width * self.kernel_height) as f32;
        let var_a = sum_aa - sum_a * sum_a / n;
        let var_b = sum_bb - sum_b * sum_b / n;
        if var_a <= MIN_VARIANCE || var_b <= MIN_VARIANCE {
            return UNCORRELATED_COST;
        }
        let cov = sum_ab - sum_a * sum_b / n;
        let ncc = cov / (var_a * var_b).sqrt();
        if ncc.is_finite() {
            1.0 - ncc.clamp(-1.0, 1.0)
        } else {
            UNCORRELATED_COST
        }
    }
}

#[cfg(test)]
mod tests {
    use super::{NccMatcher, UNCORRELATED_COST};
    use crate::image::{OwnedImage, Roi};
    use crate::matcher::{Disparity, MatchGeometry, SearchRegion};

    fn textured(width: usize, height: usize, shift: usize) -> OwnedImage<f32> {
        let mut data = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                let sx = x + shift;
                data.push((((sx * 37 + y * 11) ^ (sx * y)) % 97) as f32 / 97.0);
            }
        }
        OwnedImage::new(data, width, height).unwrap()
    }

    fn geometry() -> MatchGeometry {
        MatchGeometry {
            a_exp_roi: Roi::new(-2, -2, 12, 12),
            b_exp_roi: Roi::new(-2, -2, 12, 12),
            b_roi: Roi::new(0, 0, 8, 8),
            search: SearchRegion::horizontal(-3, 3),
        }
    }

    #[test]
    fn rejects_even_kernels() {
        assert!(NccMatcher::new(4, 3).is_err());
        assert!(NccMatcher::new(3, 0).is_err());
        assert_eq!(NccMatcher::new(5, 3).unwrap().halo(), (3, 2));
    }

    #[test]
    fn true_shift_has_minimal_cost() {
        let matcher = NccMatcher::new(3, 3).unwrap();
        let a = textured(12, 12, 0);
        let b = textured(12, 12, 2);
        let geom = geometry();
        // a(x) == b(x - 2), so the match of x sits at disparity -2.
        let best = matcher.cost(&a, &b, &geom, 4, 4, Disparity::new(-2.0, 0.0));
        assert!(best < 1e-4, "cost at true shift {best}");
        let off = matcher.cost(&a, &b, &geom, 4, 4, Disparity::new(1.0, 0.0));
        assert!(off > best + 0.1);
    }

    #[test]
    fn flat_patches_are_uncorrelated() {
        let matcher = NccMatcher::new(3, 3).unwrap();
        let flat = OwnedImage::filled(12, 12, 0.5f32).unwrap();
        let cost = matcher.cost(&flat, &flat, &geometry(), 3, 3, Disparity::ZERO);
        assert_eq!(cost, UNCORRELATED_COST);
    }
}
