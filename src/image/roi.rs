//! Integer regions of interest.

/// Axis-aligned integer box with inclusive `min` and exclusive `max` corners.
///
/// Boxes may extend past image bounds (expanded halos do) and may be empty;
/// an empty box has `max <= min` on at least one axis.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash)]
pub struct Roi {
    pub min_x: i32,
    pub min_y: i32,
    pub max_x: i32,
    pub max_y: i32,
}

impl Roi {
    /// Creates a box from its top-left corner and size.
    pub const fn new(x: i32, y: i32, width: i32, height: i32) -> Self {
        Self {
            min_x: x,
            min_y: y,
            max_x: x + width,
            max_y: y + height,
        }
    }

    /// Creates a box from its corners.
    pub const fn from_corners(min_x: i32, min_y: i32, max_x: i32, max_y: i32) -> Self {
        Self {
            min_x,
            min_y,
            max_x,
            max_y,
        }
    }

    /// Returns the box `[0, width) x [0, height)`.
    pub fn from_size(width: usize, height: usize) -> Self {
        Self::new(0, 0, width as i32, height as i32)
    }

    /// Width in pixels, zero when empty.
    pub fn width(&self) -> i32 {
        (self.max_x - self.min_x).max(0)
    }

    /// Height in pixels, zero when empty.
    pub fn height(&self) -> i32 {
        (self.max_y - self.min_y).max(0)
    }

    /// Size as `(width, height)` in buffer units.
    pub fn dims(&self) -> (usize, usize) {
        (self.width() as usize, self.height() as usize)
    }

    pub fn is_empty(&self) -> bool {
        self.max_x <= self.min_x || self.max_y <= self.min_y
    }

    /// Returns the overlap of two boxes, possibly empty.
    pub fn intersect(&self, other: &Roi) -> Roi {
        Roi {
            min_x: self.min_x.max(other.min_x),
            min_y: self.min_y.max(other.min_y),
            max_x: self.max_x.min(other.max_x),
            max_y: self.max_y.min(other.max_y),
        }
    }

    /// Grows the box by `dx` columns and `dy` rows on every side.
    pub fn expand(&self, dx: i32, dy: i32) -> Roi {
        Roi {
            min_x: self.min_x - dx,
            min_y: self.min_y - dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }

    /// Shifts the box by `(dx, dy)`.
    pub fn translate(&self, dx: i32, dy: i32) -> Roi {
        Roi {
            min_x: self.min_x + dx,
            min_y: self.min_y + dy,
            max_x: self.max_x + dx,
            max_y: self.max_y + dy,
        }
    }

    /// Expresses the box in coordinates whose origin is `origin`'s min corner.
    pub fn relative_to(&self, origin: &Roi) -> Roi {
        self.translate(-origin.min_x, -origin.min_y)
    }

    pub fn contains_point(&self, x: i32, y: i32) -> bool {
        x >= self.min_x && x < self.max_x && y >= self.min_y && y < self.max_y
    }

    /// Returns true when `other` is non-empty and lies fully inside `self`.
    pub fn contains(&self, other: &Roi) -> bool {
        !other.is_empty()
            && other.min_x >= self.min_x
            && other.min_y >= self.min_y
            && other.max_x <= self.max_x
            && other.max_y <= self.max_y
    }
}

#[cfg(test)]
mod tests {
    use super::Roi;

    #[test]
    fn intersect_can_be_empty() {
        let a = Roi::new(0, 0, 4, 4);
        let b = Roi::new(6, 1, 3, 3);
        assert!(a.intersect(&b).is_empty());
        assert_eq!(a.intersect(&b).dims(), (0, 3));
        assert_eq!(a.intersect(&Roi::new(2, 2, 8, 8)), Roi::from_corners(2, 2, 4, 4));
    }

    #[test]
    fn relative_to_moves_origin() {
        let tile = Roi::new(10, 20, 8, 8);
        let halo = tile.expand(2, 3);
        let rel = halo.relative_to(&tile);
        assert_eq!(rel, Roi::from_corners(-2, -3, 10, 11));
        assert!(rel.contains(&Roi::new(0, 0, 8, 8)));
        assert!(rel.contains_point(-2, 10));
        assert!(!rel.contains_point(10, 0));
    }
}
