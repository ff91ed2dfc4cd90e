//! Loading grayscale images via the `image` crate.
//!
//! Available when the `image-io` feature is enabled.

use crate::image::{ImageView, OwnedImage};
use crate::util::{PmHuberError, PmHuberResult};
use std::path::Path;

/// Creates a borrowed view from an 8-bit grayscale image buffer.
pub fn view_from_gray_image(img: &image::GrayImage) -> PmHuberResult<ImageView<'_, u8>> {
    ImageView::from_slice(img.as_raw(), img.width() as usize, img.height() as usize)
}

/// Loads an image from disk and reduces it to 8-bit luma.
pub fn load_gray_image<P: AsRef<Path>>(path: P) -> PmHuberResult<OwnedImage<u8>> {
    let img = image::open(path).map_err(|err| PmHuberError::ImageIo {
        reason: err.to_string(),
    })?;
    let gray = img.to_luma8();
    let width = gray.width() as usize;
    let height = gray.height() as usize;
    OwnedImage::new(gray.into_raw(), width, height)
}
