//! Low-level building blocks for custom disparity pipelines.
//!
//! These expose the base matcher and the smoothing primitives the tile solver
//! is built from. Most users should prefer [`crate::compute_tile_disparity`]
//! or [`crate::TileSolver`].

pub use crate::matcher::{
    add_uniform_noise, allowed_disparities, consistency_check, keep_lowest_cost, DisparityBox,
    MatchGeometry, NccMatcher, NoiseSource, UniformNoise, ZeroNoise, UNCORRELATED_COST,
};
pub use crate::smooth::{
    evaluate_8_connect_smooth, evaluate_disparity_smooth, gradient_weight, random_search,
    solve_gradient_weight, solve_smooth, CrossCheck, DualField, SmoothScorer,
};
