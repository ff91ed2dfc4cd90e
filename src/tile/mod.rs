//! Per-tile joint PatchMatch + Huber-TV disparity estimation.
//!
//! [`compute_tile_disparity`] is the pure per-tile entry point a tiling layer
//! calls once per output rectangle. [`TileSolver`] exposes the same loop as an
//! explicit state machine for callers that want to inspect intermediate
//! fields between outer iterations.

mod solver;

pub use solver::TileSolver;

use crate::image::{ImageView, Intensity, OwnedImage, Roi};
use crate::matcher::{Disparity, NccMatcher, SearchRegion};
use crate::smooth::SmoothParams;
use crate::trace::trace_span;
use crate::util::{PmHuberError, PmHuberResult};

/// Configuration for tile disparity estimation.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PmHuberConfig {
    /// Inclusive disparity box searched from left to right.
    pub search_region: SearchRegion,
    /// Odd patch size `(width, height)` of the ZNCC cost.
    pub kernel: (usize, usize),
    /// Maximum Euclidean left-right disagreement for a valid pixel.
    pub consistency_threshold: f32,
    /// Number of outer iterations.
    pub max_iterations: usize,
    /// Also estimate the right-to-left field and check consistency.
    pub symmetric: bool,
    /// Evaluate rows and match directions on rayon workers when the `rayon`
    /// feature is enabled. Results do not depend on this flag.
    pub parallel: bool,
    /// Seed for the noise streams; each tile and direction derives its own.
    pub seed: u64,
    pub smooth: SmoothParams,
}

impl Default for PmHuberConfig {
    fn default() -> Self {
        Self {
            search_region: SearchRegion::default(),
            kernel: (7, 7),
            consistency_threshold: 1.0,
            max_iterations: 6,
            symmetric: true,
            parallel: false,
            seed: 0,
            smooth: SmoothParams::default(),
        }
    }
}

impl PmHuberConfig {
    /// Checks value ranges. An empty search region is accepted and produces
    /// masked output.
    pub fn validate(&self) -> PmHuberResult<()> {
        NccMatcher::new(self.kernel.0, self.kernel.1)?;
        if !(self.consistency_threshold.is_finite() && self.consistency_threshold >= 0.0) {
            return Err(PmHuberError::InvalidConfig {
                reason: "consistency_threshold must be finite and >= 0",
            });
        }
        self.smooth.validate()
    }
}

/// Disparity result covering exactly one requested output rectangle.
#[derive(Clone, Debug, PartialEq)]
pub struct DisparityTile {
    roi: Roi,
    disparity: OwnedImage<Disparity>,
    valid: OwnedImage<bool>,
}

impl DisparityTile {
    pub(crate) fn new(
        roi: Roi,
        disparity: OwnedImage<Disparity>,
        valid: OwnedImage<bool>,
    ) -> PmHuberResult<Self> {
        disparity.ensure_dims(roi.dims(), "tile disparity")?;
        valid.ensure_dims(roi.dims(), "tile validity mask")?;
        Ok(Self {
            roi,
            disparity,
            valid,
        })
    }

    /// Tile with every pixel masked.
    pub(crate) fn masked(roi: Roi) -> PmHuberResult<Self> {
        let (width, height) = roi.dims();
        Self::new(
            roi,
            OwnedImage::filled(width, height, Disparity::ZERO)?,
            OwnedImage::filled(width, height, false)?,
        )
    }

    /// Output rectangle in left-image coordinates.
    pub fn roi(&self) -> Roi {
        self.roi
    }

    /// Raw disparities, including masked pixels.
    pub fn disparity(&self) -> &OwnedImage<Disparity> {
        &self.disparity
    }

    pub fn valid(&self) -> &OwnedImage<bool> {
        &self.valid
    }

    /// Disparity at tile-local `(x, y)`, `None` when masked or out of range.
    pub fn get(&self, x: usize, y: usize) -> Option<Disparity> {
        match self.valid.get(x, y) {
            Some(true) => self.disparity.get(x, y).copied(),
            _ => None,
        }
    }

    pub fn valid_count(&self) -> usize {
        self.valid.data().iter().filter(|&&v| v).count()
    }
}

/// Estimates the disparity of `roi` (left-image coordinates) from left to right.
///
/// Pure function of the two images and the configuration: noise streams are
/// seeded from `config.seed`, the tile origin and the match direction.
pub fn compute_tile_disparity<T: Intensity>(
    left: ImageView<'_, T>,
    right: ImageView<'_, T>,
    roi: Roi,
    config: &PmHuberConfig,
) -> PmHuberResult<DisparityTile> {
    let _span = trace_span!(
        "tile",
        x = roi.min_x,
        y = roi.min_y,
        width = roi.width(),
        height = roi.height()
    )
    .entered();
    let mut solver = TileSolver::seeded(left, right, roi, *config)?;
    solver.run()?;
    solver.finish()
}

/// Tile disparity estimator holding a validated configuration.
#[derive(Clone, Debug, Default)]
pub struct PatchMatchHuber {
    config: PmHuberConfig,
}

impl PatchMatchHuber {
    /// Creates an estimator with the default configuration.
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the configuration.
    pub fn with_config(mut self, config: PmHuberConfig) -> Self {
        self.config = config;
        self
    }

    pub fn config(&self) -> &PmHuberConfig {
        &self.config
    }

    /// Estimates one tile; see [`compute_tile_disparity`].
    pub fn compute_tile<T: Intensity>(
        &self,
        left: ImageView<'_, T>,
        right: ImageView<'_, T>,
        roi: Roi,
    ) -> PmHuberResult<DisparityTile> {
        compute_tile_disparity(left, right, roi, &self.config)
    }
}

#[cfg(test)]
mod tests {
    use super::{DisparityTile, PmHuberConfig};
    use crate::image::{OwnedImage, Roi};
    use crate::matcher::Disparity;

    #[test]
    fn default_config_is_valid() {
        assert!(PmHuberConfig::default().validate().is_ok());
        let even = PmHuberConfig {
            kernel: (4, 3),
            ..PmHuberConfig::default()
        };
        assert!(even.validate().is_err());
        let negative = PmHuberConfig {
            consistency_threshold: -1.0,
            ..PmHuberConfig::default()
        };
        assert!(negative.validate().is_err());
    }

    #[test]
    fn tile_get_respects_mask() {
        let roi = Roi::new(4, 4, 2, 1);
        let disparity = OwnedImage::new(vec![Disparity::new(1.0, 0.0); 2], 2, 1).unwrap();
        let valid = OwnedImage::new(vec![true, false], 2, 1).unwrap();
        let tile = DisparityTile::new(roi, disparity, valid).unwrap();
        assert_eq!(tile.get(0, 0), Some(Disparity::new(1.0, 0.0)));
        assert_eq!(tile.get(1, 0), None);
        assert_eq!(tile.get(5, 0), None);
        assert_eq!(tile.valid_count(), 1);
        assert_eq!(DisparityTile::masked(roi).unwrap().valid_count(), 0);
    }
}
