//! Huber-regularized PatchMatch primitives.
//!
//! These wrap the base matcher with an edge-aware smoothness prior:
//!
//! - [`solve_gradient_weight`] turns intensity gradients into per-pixel
//!   smoothness weights,
//! - [`solve_smooth`] runs primal-dual Huber-TV iterations producing the
//!   smoothed prior,
//! - [`evaluate_8_connect_smooth`] propagates neighbour disparities,
//! - [`random_search`] scores randomly perturbed candidates.
//!
//! All coordinates are relative to the primary side's output region; the
//! combined cost of a disparity `d` at pixel `p` is
//! `lambda * ncc(p, d) + weight(p) * |d - prior(p)|^2 / (2 * theta)`.

mod propagate;
mod random_search;
mod regularize;
mod rows;
#[cfg(feature = "simd")]
mod simd;
mod weight;

pub use propagate::{evaluate_8_connect_smooth, CrossCheck};
pub use random_search::{evaluate_disparity_smooth, random_search};
pub use regularize::{solve_smooth, DualField};
pub use weight::{gradient_weight, solve_gradient_weight};

use crate::image::{OwnedImage, Roi};
use crate::matcher::{Disparity, DisparityBox, MatchGeometry, NccMatcher};
use crate::util::{PmHuberError, PmHuberResult};

/// Parameters of the smoothness prior and its coupling to the data term.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmoothParams {
    /// Weight of the patch cost in the combined cost.
    pub lambda: f32,
    /// Coupling between disparity and prior; also sets the fidelity `1/theta`
    /// of the regularization solve.
    pub theta: f32,
    /// Huber threshold of the regularizer.
    pub huber_epsilon: f32,
    /// Primal-dual steps per regularization call.
    pub smooth_steps: usize,
    /// Edge weight falloff `exp(-alpha * |grad|^beta)`.
    pub weight_alpha: f32,
    pub weight_beta: f32,
    /// Keep dual variables between outer iterations instead of resetting them.
    pub warm_start_duals: bool,
}

impl Default for SmoothParams {
    fn default() -> Self {
        Self {
            lambda: 1.0,
            theta: 1.0,
            huber_epsilon: 0.01,
            smooth_steps: 10,
            weight_alpha: 10.0,
            weight_beta: 1.0,
            warm_start_duals: true,
        }
    }
}

impl SmoothParams {
    pub fn validate(&self) -> PmHuberResult<()> {
        if !(self.lambda.is_finite() && self.lambda >= 0.0) {
            return Err(PmHuberError::InvalidConfig {
                reason: "lambda must be finite and >= 0",
            });
        }
        if !(self.theta.is_finite() && self.theta > 0.0) {
            return Err(PmHuberError::InvalidConfig {
                reason: "theta must be finite and > 0",
            });
        }
        if !(self.huber_epsilon.is_finite() && self.huber_epsilon >= 0.0) {
            return Err(PmHuberError::InvalidConfig {
                reason: "huber_epsilon must be finite and >= 0",
            });
        }
        if !(self.weight_alpha.is_finite() && self.weight_alpha > 0.0) {
            return Err(PmHuberError::InvalidConfig {
                reason: "weight_alpha must be finite and > 0",
            });
        }
        if !(self.weight_beta.is_finite() && self.weight_beta > 0.0) {
            return Err(PmHuberError::InvalidConfig {
                reason: "weight_beta must be finite and > 0",
            });
        }
        Ok(())
    }
}

/// Combined data + smoothness cost for one match direction.
///
/// Decorates [`NccMatcher`] with the coupling to the smoothed prior. All
/// inputs are borrowed; nothing is cached between calls.
#[derive(Clone, Copy, Debug)]
pub struct SmoothScorer<'a> {
    matcher: &'a NccMatcher,
    a: &'a OwnedImage<f32>,
    b: &'a OwnedImage<f32>,
    geometry: &'a MatchGeometry,
    prior: &'a OwnedImage<Disparity>,
    weight: &'a OwnedImage<f32>,
    params: &'a SmoothParams,
}

impl<'a> SmoothScorer<'a> {
    /// Bundles the inputs and checks that the halos cover every read.
    ///
    /// `a` and `b` are the expanded primary/secondary buffers located by
    /// `geometry`; `prior` and `weight` cover the output region.
    pub fn new(
        matcher: &'a NccMatcher,
        a: &'a OwnedImage<f32>,
        b: &'a OwnedImage<f32>,
        geometry: &'a MatchGeometry,
        prior: &'a OwnedImage<Disparity>,
        weight: &'a OwnedImage<f32>,
        params: &'a SmoothParams,
    ) -> PmHuberResult<Self> {
        a.ensure_dims(geometry.a_exp_roi.dims(), "primary expanded buffer")?;
        b.ensure_dims(geometry.b_exp_roi.dims(), "secondary expanded buffer")?;
        weight.ensure_dims(prior.dims(), "weight field")?;

        let (hw, hh) = matcher.half();
        let output = Roi::from_size(prior.width(), prior.height());
        if !geometry.a_exp_roi.contains(&output.expand(hw, hh)) {
            return Err(PmHuberError::HaloTooSmall {
                context: "patch footprint in the primary buffer",
            });
        }
        if !geometry.b_roi.is_empty()
            && !geometry.b_exp_roi.contains(&geometry.b_roi.expand(hw + 1, hh + 1))
        {
            return Err(PmHuberError::HaloTooSmall {
                context: "bilinear footprint in the secondary buffer",
            });
        }

        Ok(Self {
            matcher,
            a,
            b,
            geometry,
            prior,
            weight,
            params,
        })
    }

    /// Size of the output region.
    pub fn dims(&self) -> (usize, usize) {
        self.prior.dims()
    }

    pub fn geometry(&self) -> &MatchGeometry {
        self.geometry
    }

    pub fn allowed(&self, x: usize, y: usize) -> DisparityBox {
        self.geometry.allowed(x, y)
    }

    /// Combined cost of disparity `d` at pixel `(x, y)`.
    ///
    /// `d` must be admissible at `(x, y)`.
    pub fn cost(&self, x: usize, y: usize, d: Disparity) -> f32 {
        let data = self.matcher.cost(self.a, self.b, self.geometry, x, y, d);
        let deviation = (d - self.prior[(x, y)]).norm_squared();
        self.params.lambda * data + self.weight[(x, y)] * deviation / (2.0 * self.params.theta)
    }
}
