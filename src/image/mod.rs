//! Image views, owned fields and region arithmetic.
//!
//! `ImageView` is a borrowed 2D view into a 1D buffer with an explicit stride.
//! The stride counts elements between the starts of consecutive rows, so a
//! stride larger than the width represents padded rows. Everything the solver
//! allocates per tile (intensity halos, disparity, cost, weight and dual
//! fields) is an [`OwnedImage`].

use crate::util::{PmHuberError, PmHuberResult};

#[cfg(feature = "image-io")]
pub mod io;
mod owned;
mod roi;

pub use owned::OwnedImage;
pub use roi::Roi;

/// Pixel types that reduce to a scalar intensity in `[0, 1]`.
pub trait Intensity: Copy {
    fn intensity(self) -> f32;
}

impl Intensity for u8 {
    #[inline]
    fn intensity(self) -> f32 {
        self as f32 / 255.0
    }
}

impl Intensity for u16 {
    #[inline]
    fn intensity(self) -> f32 {
        self as f32 / 65535.0
    }
}

impl Intensity for f32 {
    #[inline]
    fn intensity(self) -> f32 {
        self
    }
}

/// Borrowed 2D image view with an explicit stride.
#[derive(Copy, Clone, Debug)]
pub struct ImageView<'a, T> {
    data: &'a [T],
    width: usize,
    height: usize,
    stride: usize,
}

impl<'a, T> ImageView<'a, T> {
    /// Creates a contiguous view with `stride == width`.
    pub fn from_slice(data: &'a [T], width: usize, height: usize) -> PmHuberResult<Self> {
        Self::new(data, width, height, width)
    }

    /// Creates a view with an explicit stride.
    pub fn new(data: &'a [T], width: usize, height: usize, stride: usize) -> PmHuberResult<Self> {
        let needed = required_len(width, height, stride)?;
        if data.len() < needed {
            return Err(PmHuberError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        Ok(Self {
            data,
            width,
            height,
            stride,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn stride(&self) -> usize {
        self.stride
    }

    /// Returns the image extent as a region anchored at the origin.
    pub fn bounds(&self) -> Roi {
        Roi::from_size(self.width, self.height)
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&'a T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        let idx = y.checked_mul(self.stride)?.checked_add(x)?;
        self.data.get(idx)
    }

    /// Returns a contiguous slice for row `y` with length `width`.
    pub fn row(&self, y: usize) -> Option<&'a [T]> {
        if y >= self.height {
            return None;
        }
        let start = y.checked_mul(self.stride)?;
        let end = start.checked_add(self.width)?;
        self.data.get(start..end)
    }
}

impl<T: Intensity> ImageView<'_, T> {
    /// Copies `roi` into an owned intensity buffer, replicating edge pixels
    /// wherever the region leaves the image.
    pub fn crop_edge_extended(&self, roi: Roi) -> PmHuberResult<OwnedImage<f32>> {
        let (width, height) = roi.dims();
        if width == 0 || height == 0 {
            return Err(PmHuberError::InvalidDimensions { width, height });
        }
        let max_x = self.width as i32 - 1;
        let max_y = self.height as i32 - 1;
        let mut data = Vec::with_capacity(width * height);
        for y in roi.min_y..roi.max_y {
            let src_y = y.clamp(0, max_y) as usize;
            let row = self.row(src_y).ok_or(PmHuberError::BufferTooSmall {
                needed: (src_y + 1) * self.stride,
                got: self.data.len(),
            })?;
            for x in roi.min_x..roi.max_x {
                data.push(row[x.clamp(0, max_x) as usize].intensity());
            }
        }
        OwnedImage::new(data, width, height)
    }
}

fn required_len(width: usize, height: usize, stride: usize) -> PmHuberResult<usize> {
    if width == 0 || height == 0 {
        return Err(PmHuberError::InvalidDimensions { width, height });
    }
    if stride < width {
        return Err(PmHuberError::InvalidStride { width, stride });
    }
    let needed = (height - 1)
        .checked_mul(stride)
        .and_then(|v| v.checked_add(width))
        .ok_or(PmHuberError::InvalidDimensions { width, height })?;
    Ok(needed)
}

#[cfg(test)]
mod tests {
    use super::{ImageView, Roi};

    #[test]
    fn crop_edge_extended_replicates_borders() {
        let data: Vec<u8> = vec![0, 51, 102, 153, 204, 255];
        let view = ImageView::from_slice(&data, 3, 2).unwrap();
        let crop = view.crop_edge_extended(Roi::new(-1, -1, 5, 4)).unwrap();
        assert_eq!(crop.dims(), (5, 4));
        let expect_row0 = [0.0, 0.0, 0.2, 0.4, 0.4];
        let expect_row3 = [0.6, 0.6, 0.8, 1.0, 1.0];
        for (got, want) in crop.row(0).iter().zip(expect_row0.iter()) {
            assert!((got - want).abs() < 1e-6);
        }
        for (got, want) in crop.row(3).iter().zip(expect_row3.iter()) {
            assert!((got - want).abs() < 1e-6);
        }
    }

    #[test]
    fn strided_view_skips_padding() {
        let data: Vec<f32> = vec![1.0, 2.0, -1.0, 3.0, 4.0, -1.0];
        let view = ImageView::new(&data, 2, 2, 3).unwrap();
        let crop = view.crop_edge_extended(view.bounds()).unwrap();
        assert_eq!(crop.data(), &[1.0, 2.0, 3.0, 4.0]);
    }
}
