//! Owned, contiguous 2D grids.

use crate::image::ImageView;
use crate::util::{PmHuberError, PmHuberResult};
use std::ops::{Index, IndexMut};

/// Owned contiguous row-major grid.
///
/// Indexing with `(x, y)` panics when out of range, like slice indexing.
#[derive(Clone, Debug, PartialEq)]
pub struct OwnedImage<T> {
    data: Vec<T>,
    width: usize,
    height: usize,
}

impl<T> OwnedImage<T> {
    /// Wraps a row-major buffer of exactly `width * height` elements.
    pub fn new(data: Vec<T>, width: usize, height: usize) -> PmHuberResult<Self> {
        if width == 0 || height == 0 {
            return Err(PmHuberError::InvalidDimensions { width, height });
        }
        let needed = width
            .checked_mul(height)
            .ok_or(PmHuberError::InvalidDimensions { width, height })?;
        if data.len() < needed {
            return Err(PmHuberError::BufferTooSmall {
                needed,
                got: data.len(),
            });
        }
        if data.len() > needed {
            return Err(PmHuberError::InvalidDimensions { width, height });
        }
        Ok(Self {
            data,
            width,
            height,
        })
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    /// Returns `(width, height)`.
    pub fn dims(&self) -> (usize, usize) {
        (self.width, self.height)
    }

    pub fn data(&self) -> &[T] {
        &self.data
    }

    pub fn data_mut(&mut self) -> &mut [T] {
        &mut self.data
    }

    /// Returns a borrowed view of the grid.
    pub fn view(&self) -> ImageView<'_, T> {
        ImageView {
            data: &self.data,
            width: self.width,
            height: self.height,
            stride: self.width,
        }
    }

    pub fn row(&self, y: usize) -> &[T] {
        let start = y * self.width;
        &self.data[start..start + self.width]
    }

    pub fn row_mut(&mut self, y: usize) -> &mut [T] {
        let start = y * self.width;
        &mut self.data[start..start + self.width]
    }

    /// Returns the element at `(x, y)` if it is within bounds.
    pub fn get(&self, x: usize, y: usize) -> Option<&T> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.data.get(y * self.width + x)
    }

    /// Signed lookup used for neighbour and cross-image access.
    pub(crate) fn get_signed(&self, x: i32, y: i32) -> Option<&T> {
        if x < 0 || y < 0 {
            return None;
        }
        self.get(x as usize, y as usize)
    }

    /// Fails with `DimensionMismatch` unless the grid is `expected` sized.
    pub(crate) fn ensure_dims(
        &self,
        expected: (usize, usize),
        context: &'static str,
    ) -> PmHuberResult<()> {
        if self.dims() != expected {
            return Err(PmHuberError::DimensionMismatch {
                expected,
                got: self.dims(),
                context,
            });
        }
        Ok(())
    }
}

impl<T: Clone> OwnedImage<T> {
    /// Allocates a grid with every element set to `value`.
    pub fn filled(width: usize, height: usize, value: T) -> PmHuberResult<Self> {
        let len = width
            .checked_mul(height)
            .ok_or(PmHuberError::InvalidDimensions { width, height })?;
        Self::new(vec![value; len], width, height)
    }

    /// Sets every element to `value`.
    pub fn fill(&mut self, value: T) {
        self.data.fill(value);
    }
}

impl OwnedImage<f32> {
    /// Bilinear interpolation at `(x, y)` with indices clamped to the grid.
    pub fn sample_bilinear(&self, x: f32, y: f32) -> f32 {
        let max_x = (self.width - 1) as f32;
        let max_y = (self.height - 1) as f32;
        let x = x.clamp(0.0, max_x);
        let y = y.clamp(0.0, max_y);
        let x0 = x.floor() as usize;
        let y0 = y.floor() as usize;
        let x1 = (x0 + 1).min(self.width - 1);
        let y1 = (y0 + 1).min(self.height - 1);
        let fx = x - x0 as f32;
        let fy = y - y0 as f32;

        let row0 = self.row(y0);
        let row1 = self.row(y1);
        let top = row0[x0] + (row0[x1] - row0[x0]) * fx;
        let bottom = row1[x0] + (row1[x1] - row1[x0]) * fx;
        top + (bottom - top) * fy
    }
}

impl<T> Index<(usize, usize)> for OwnedImage<T> {
    type Output = T;

    #[inline]
    fn index(&self, (x, y): (usize, usize)) -> &T {
        debug_assert!(x < self.width && y < self.height);
        &self.data[y * self.width + x]
    }
}

impl<T> IndexMut<(usize, usize)> for OwnedImage<T> {
    #[inline]
    fn index_mut(&mut self, (x, y): (usize, usize)) -> &mut T {
        debug_assert!(x < self.width && y < self.height);
        &mut self.data[y * self.width + x]
    }
}

#[cfg(test)]
mod tests {
    use super::OwnedImage;
    use crate::util::PmHuberError;

    #[test]
    fn bilinear_interpolates_and_clamps() {
        let img = OwnedImage::new(vec![0.0f32, 1.0, 2.0, 3.0], 2, 2).unwrap();
        assert!((img.sample_bilinear(0.5, 0.5) - 1.5).abs() < 1e-6);
        assert!((img.sample_bilinear(1.0, 0.0) - 1.0).abs() < 1e-6);
        assert!((img.sample_bilinear(-3.0, 9.0) - 2.0).abs() < 1e-6);
    }

    #[test]
    fn ensure_dims_reports_mismatch() {
        let img = OwnedImage::filled(3, 2, 0u8).unwrap();
        assert!(img.ensure_dims((3, 2), "test").is_ok());
        assert_eq!(
            img.ensure_dims((2, 3), "test"),
            Err(PmHuberError::DimensionMismatch {
                expected: (2, 3),
                got: (3, 2),
                context: "test",
            })
        );
    }
}
