//! pmhuber is a CPU-first dense stereo disparity library combining PatchMatch
//! with a Huber-TV smoothness prior, solved per output tile.
//!
//! The crate provides the per-tile core of a tiled stereo pipeline: a ZNCC
//! base matcher, edge-aware smoothness weights, a primal-dual regularizer and
//! the propagation/random-search evaluators, driven by [`TileSolver`]. Row
//! parallelism is available via the `rayon` feature and the dual update is
//! vectorized with the `simd` feature.

pub mod image;
pub mod lowlevel;
pub mod matcher;
pub mod smooth;
pub mod tile;
mod trace;
pub mod util;

#[cfg(feature = "image-io")]
pub use image::io;
pub use image::{ImageView, Intensity, OwnedImage, Roi};
pub use matcher::{Disparity, SearchRegion};
pub use smooth::SmoothParams;
pub use tile::{compute_tile_disparity, DisparityTile, PatchMatchHuber, PmHuberConfig, TileSolver};
pub use util::{PmHuberError, PmHuberResult};
