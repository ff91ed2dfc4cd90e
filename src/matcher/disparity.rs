//! Disparity vectors, search regions and admissible disparity boxes.

use crate::image::Roi;
use std::ops::{Add, Neg, Sub};

/// Sub-pixel offset from a pixel to its match in the other image.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Disparity {
    pub x: f32,
    pub y: f32,
}

impl Disparity {
    pub const ZERO: Disparity = Disparity { x: 0.0, y: 0.0 };

    pub const fn new(x: f32, y: f32) -> Self {
        Self { x, y }
    }

    pub fn norm_squared(self) -> f32 {
        self.x * self.x + self.y * self.y
    }

    pub fn norm(self) -> f32 {
        self.norm_squared().sqrt()
    }
}

impl Add for Disparity {
    type Output = Disparity;

    fn add(self, rhs: Disparity) -> Disparity {
        Disparity::new(self.x + rhs.x, self.y + rhs.y)
    }
}

impl Sub for Disparity {
    type Output = Disparity;

    fn sub(self, rhs: Disparity) -> Disparity {
        Disparity::new(self.x - rhs.x, self.y - rhs.y)
    }
}

impl Neg for Disparity {
    type Output = Disparity;

    fn neg(self) -> Disparity {
        Disparity::new(-self.x, -self.y)
    }
}

/// Inclusive integer box of admissible disparities.
///
/// A region with `min > max` on either axis is empty and yields fully masked
/// output rather than an error.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct SearchRegion {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl SearchRegion {
    pub const fn new(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Horizontal-only search, the common case for epipolar-rectified pairs.
    pub const fn horizontal(min_x: i32, max_x: i32) -> Self {
        Self::new(min_x, 0, max_x, 0)
    }

    pub fn is_empty(&self) -> bool {
        self.min_x > self.max_x || self.min_y > self.max_y
    }

    /// Extent `max - min` per axis.
    pub fn size(&self) -> (f32, f32) {
        (
            (self.max_x - self.min_x) as f32,
            (self.max_y - self.min_y) as f32,
        )
    }

    /// Region used for the reverse (right-to-left) direction.
    pub fn mirrored(&self) -> Self {
        Self::new(-self.max_x, -self.max_y, -self.min_x, -self.min_y)
    }

    pub fn contains(&self, d: Disparity) -> bool {
        self.as_box().contains(d)
    }

    pub fn as_box(&self) -> DisparityBox {
        DisparityBox::new(
            Disparity::new(self.min_x as f32, self.min_y as f32),
            Disparity::new(self.max_x as f32, self.max_y as f32),
        )
    }
}

impl Default for SearchRegion {
    fn default() -> Self {
        Self::horizontal(-16, 16)
    }
}

/// Inclusive floating-point box in disparity space.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct DisparityBox {
    pub min: Disparity,
    pub max: Disparity,
}

impl DisparityBox {
    pub const fn new(min: Disparity, max: Disparity) -> Self {
        Self { min, max }
    }

    /// Box `[-half, half]`, used as a random-search window.
    pub fn centered(half: Disparity) -> Self {
        Self::new(-half, half)
    }

    pub fn is_empty(&self) -> bool {
        !(self.min.x <= self.max.x && self.min.y <= self.max.y)
    }

    pub fn contains(&self, d: Disparity) -> bool {
        d.x >= self.min.x && d.x <= self.max.x && d.y >= self.min.y && d.y <= self.max.y
    }

    pub fn intersect(&self, other: &DisparityBox) -> DisparityBox {
        DisparityBox::new(
            Disparity::new(self.min.x.max(other.min.x), self.min.y.max(other.min.y)),
            Disparity::new(self.max.x.min(other.max.x), self.max.y.min(other.max.y)),
        )
    }

    pub fn translate(&self, d: Disparity) -> DisparityBox {
        DisparityBox::new(self.min + d, self.max + d)
    }

    /// Clamps `d` into the box; the box must be non-empty.
    pub fn clamp(&self, d: Disparity) -> Disparity {
        Disparity::new(
            d.x.max(self.min.x).min(self.max.x),
            d.y.max(self.min.y).min(self.max.y),
        )
    }
}

/// Disparities admissible at pixel `(x, y)`.
///
/// The pixel and `matched` share one coordinate frame. The result is the
/// search region cropped so that `(x, y) + d` stays on a real pixel of the
/// matched region; it is empty when no such disparity exists.
pub fn allowed_disparities(search: &SearchRegion, matched: &Roi, x: i32, y: i32) -> DisparityBox {
    let min_x = search.min_x.max(matched.min_x - x);
    let min_y = search.min_y.max(matched.min_y - y);
    let max_x = search.max_x.min(matched.max_x - 1 - x);
    let max_y = search.max_y.min(matched.max_y - 1 - y);
    DisparityBox::new(
        Disparity::new(min_x as f32, min_y as f32),
        Disparity::new(max_x as f32, max_y as f32),
    )
}

#[cfg(test)]
mod tests {
    use super::{allowed_disparities, Disparity, SearchRegion};
    use crate::image::Roi;

    #[test]
    fn mirrored_region_negates_bounds() {
        let search = SearchRegion::new(-4, -1, 6, 2);
        assert_eq!(search.mirrored(), SearchRegion::new(-6, -2, 4, 1));
        assert_eq!(search.mirrored().mirrored(), search);
    }

    #[test]
    fn allowed_box_clips_to_matched_region() {
        let search = SearchRegion::horizontal(-4, 4);
        let matched = Roi::new(0, 0, 10, 1);
        let near_left = allowed_disparities(&search, &matched, 1, 0);
        assert_eq!(near_left.min, Disparity::new(-1.0, 0.0));
        assert_eq!(near_left.max, Disparity::new(4.0, 0.0));

        let near_right = allowed_disparities(&search, &matched, 8, 0);
        assert_eq!(near_right.max, Disparity::new(1.0, 0.0));

        let outside = allowed_disparities(&search, &matched, 20, 0);
        assert!(outside.is_empty());
    }

    #[test]
    fn empty_search_region_is_detected() {
        assert!(SearchRegion::new(3, 0, 2, 0).is_empty());
        assert!(!SearchRegion::horizontal(0, 0).is_empty());
        assert!(SearchRegion::new(3, 0, 2, 0).as_box().is_empty());
    }
}
