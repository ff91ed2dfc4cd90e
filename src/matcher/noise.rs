//! Uniform disparity noise for initialization and random search.

use crate::image::{OwnedImage, Roi};
use crate::matcher::disparity::{allowed_disparities, Disparity, DisparityBox, SearchRegion};
use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

/// Source of scalar noise drawn uniformly from a closed interval.
pub trait NoiseSource {
    /// Draws a value from `[lo, hi]`; callers guarantee `lo <= hi`.
    fn uniform(&mut self, lo: f32, hi: f32) -> f32;
}

/// Seeded uniform noise backed by `StdRng`.
#[derive(Clone, Debug)]
pub struct UniformNoise {
    rng: StdRng,
}

impl UniformNoise {
    pub fn seeded(seed: u64) -> Self {
        Self {
            rng: StdRng::seed_from_u64(seed),
        }
    }
}

impl NoiseSource for UniformNoise {
    fn uniform(&mut self, lo: f32, hi: f32) -> f32 {
        if hi <= lo {
            return lo;
        }
        self.rng.random_range(lo..=hi)
    }
}

/// Noise source that always draws the point of `[lo, hi]` closest to zero.
///
/// Perturbations degenerate to the current value, which isolates the
/// deterministic parts of the solver in tests.
#[derive(Clone, Copy, Debug, Default)]
pub struct ZeroNoise;

impl NoiseSource for ZeroNoise {
    fn uniform(&mut self, lo: f32, hi: f32) -> f32 {
        0.0f32.max(lo).min(hi)
    }
}

/// Perturbs every pixel of `field` uniformly inside `window`.
///
/// For pixel `p` with current value `c`, the new value is drawn from
/// `(c + window) ∩ allowed(p)`, where `allowed(p)` is the search region cropped
/// so that `p + d` stays inside `matched` (same frame as the field, origin at
/// the field's top-left pixel). Pixels with an empty allowed box are left
/// untouched; their count is returned.
pub fn add_uniform_noise<N: NoiseSource + ?Sized>(
    window: DisparityBox,
    search: &SearchRegion,
    matched: &Roi,
    field: &mut OwnedImage<Disparity>,
    noise: &mut N,
) -> usize {
    let height = field.height();
    let mut inadmissible = 0usize;
    for y in 0..height {
        let row = field.row_mut(y);
        for (x, value) in row.iter_mut().enumerate() {
            let allowed = allowed_disparities(search, matched, x as i32, y as i32);
            if allowed.is_empty() {
                inadmissible += 1;
                continue;
            }
            let current = *value;
            let mut bounds = window.translate(current).intersect(&allowed);
            if bounds.is_empty() {
                bounds = allowed;
            }
            let dx = noise.uniform(bounds.min.x - current.x, bounds.max.x - current.x);
            let dy = noise.uniform(bounds.min.y - current.y, bounds.max.y - current.y);
            *value = bounds.clamp(current + Disparity::new(dx, dy));
        }
    }
    inadmissible
}

#[cfg(test)]
mod tests {
    use super::{add_uniform_noise, NoiseSource, UniformNoise, ZeroNoise};
    use crate::image::{OwnedImage, Roi};
    use crate::matcher::{Disparity, DisparityBox, SearchRegion};

    #[test]
    fn initialization_stays_inside_allowed_boxes() {
        let search = SearchRegion::new(-4, -1, 4, 1);
        let matched = Roi::new(0, 0, 6, 6);
        let mut field = OwnedImage::filled(6, 6, Disparity::ZERO).unwrap();
        let mut noise = UniformNoise::seeded(3);
        let skipped = add_uniform_noise(search.as_box(), &search, &matched, &mut field, &mut noise);
        assert_eq!(skipped, 0);
        for y in 0..6 {
            for x in 0..6 {
                let d = field[(x, y)];
                assert!(search.contains(d));
                let (mx, my) = (x as f32 + d.x, y as f32 + d.y);
                assert!((0.0..=5.0).contains(&mx) && (0.0..=5.0).contains(&my));
            }
        }
    }

    #[test]
    fn zero_noise_keeps_current_values() {
        let search = SearchRegion::horizontal(-4, 4);
        let matched = Roi::new(0, 0, 8, 1);
        let mut field = OwnedImage::filled(4, 1, Disparity::new(1.5, 0.0)).unwrap();
        let before = field.clone();
        let window = DisparityBox::centered(Disparity::new(2.0, 0.0));
        add_uniform_noise(window, &search, &matched, &mut field, &mut ZeroNoise);
        assert_eq!(field, before);
    }

    #[test]
    fn uniform_noise_is_reproducible() {
        let mut a = UniformNoise::seeded(11);
        let mut b = UniformNoise::seeded(11);
        for _ in 0..16 {
            let va = a.uniform(-2.0, 3.0);
            assert!((-2.0..=3.0).contains(&va));
            assert_eq!(va, b.uniform(-2.0, 3.0));
        }
        assert_eq!(a.uniform(1.0, 1.0), 1.0);
    }
}
