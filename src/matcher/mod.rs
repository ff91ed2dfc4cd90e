//! Base PatchMatch primitives.
//!
//! The base matcher owns everything that does not depend on the smoothness
//! prior: the ZNCC patch cost, uniform disparity noise, the lowest-cost merge
//! and the left-right consistency check. The smoothing layer in
//! [`crate::smooth`] decorates these primitives instead of extending them.

mod disparity;
mod merge;
mod ncc;
mod noise;

pub use disparity::{allowed_disparities, Disparity, DisparityBox, SearchRegion};
pub use merge::{consistency_check, keep_lowest_cost};
pub use ncc::{NccMatcher, UNCORRELATED_COST};
pub use noise::{add_uniform_noise, NoiseSource, UniformNoise, ZeroNoise};

use crate::image::Roi;

/// Regions of one match direction, expressed relative to the origin of the
/// primary side's output region.
///
/// `a_exp_roi` and `b_exp_roi` locate the expanded intensity buffers of the
/// primary and secondary image; `b_roi` is the matched region, the part of the
/// secondary image disparities may point into.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MatchGeometry {
    pub a_exp_roi: Roi,
    pub b_exp_roi: Roi,
    pub b_roi: Roi,
    pub search: SearchRegion,
}

impl MatchGeometry {
    /// Disparities admissible at output pixel `(x, y)`.
    pub fn allowed(&self, x: usize, y: usize) -> DisparityBox {
        allowed_disparities(&self.search, &self.b_roi, x as i32, y as i32)
    }
}
