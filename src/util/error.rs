//! Error types for pmhuber.

use thiserror::Error;

/// Result alias for pmhuber operations.
pub type PmHuberResult<T> = std::result::Result<T, PmHuberError>;

/// Errors that can occur when running pmhuber algorithms.
///
/// Every variant describes a violated precondition. Runtime degeneracies such
/// as an empty matched region are not errors; they yield masked output.
#[derive(Clone, Debug, PartialEq, Error)]
pub enum PmHuberError {
    /// Width or height is zero, or their product overflows.
    #[error("invalid dimensions: {width}x{height}")]
    InvalidDimensions { width: usize, height: usize },
    /// Row stride is smaller than the row width.
    #[error("invalid stride {stride} for width {width}")]
    InvalidStride { width: usize, stride: usize },
    /// Backing buffer is shorter than the dimensions require.
    #[error("buffer too small: needed {needed}, got {got}")]
    BufferTooSmall { needed: usize, got: usize },
    /// A region does not fit inside the image it refers to.
    #[error(
        "roi ({x}, {y}, {width}x{height}) out of bounds for {img_width}x{img_height} image"
    )]
    RoiOutOfBounds {
        x: i64,
        y: i64,
        width: usize,
        height: usize,
        img_width: usize,
        img_height: usize,
    },
    /// Paired fields disagree in size.
    #[error("dimension mismatch for {context}: expected {expected:?}, got {got:?}")]
    DimensionMismatch {
        expected: (usize, usize),
        got: (usize, usize),
        context: &'static str,
    },
    /// Patch kernel dimensions must be odd and non-zero.
    #[error("invalid kernel {width}x{height}: sizes must be odd and non-zero")]
    InvalidKernel { width: usize, height: usize },
    /// An expanded buffer does not cover the footprint an operation reads.
    #[error("halo too small for {context}")]
    HaloTooSmall { context: &'static str },
    /// A configuration value is out of range.
    #[error("invalid config: {reason}")]
    InvalidConfig { reason: &'static str },
    /// Image decoding failed.
    #[cfg(feature = "image-io")]
    #[error("image io: {reason}")]
    ImageIo { reason: String },
}
