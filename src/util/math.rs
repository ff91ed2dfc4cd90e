//! Small numeric helpers shared by the solvers.

/// SplitMix64 finalizer; spreads nearby inputs over the full `u64` range.
pub(crate) fn splitmix64(mut z: u64) -> u64 {
    z = z.wrapping_add(0x9E37_79B9_7F4A_7C15);
    z = (z ^ (z >> 30)).wrapping_mul(0xBF58_476D_1CE4_E5B9);
    z = (z ^ (z >> 27)).wrapping_mul(0x94D0_49BB_1331_11EB);
    z ^ (z >> 31)
}

/// Derives an independent stream seed for one tile and match direction.
pub(crate) fn stream_seed(seed: u64, x: i32, y: i32, direction: u64) -> u64 {
    let mut h = splitmix64(seed);
    h = splitmix64(h ^ (x as u32 as u64));
    h = splitmix64(h ^ ((y as u32 as u64) << 32));
    splitmix64(h ^ direction)
}

/// Random-search half-width after `iteration` halvings of `size / 2`.
pub(crate) fn halved_extent(size: f32, iteration: usize) -> f32 {
    size / 2.0_f32.powi(iteration as i32 + 1)
}

#[cfg(test)]
mod tests {
    use super::{halved_extent, stream_seed};

    #[test]
    fn stream_seed_separates_directions_and_tiles() {
        let a = stream_seed(7, 0, 0, 0);
        assert_ne!(a, stream_seed(7, 0, 0, 1));
        assert_ne!(a, stream_seed(7, 64, 0, 0));
        assert_ne!(a, stream_seed(7, 0, 64, 0));
        assert_eq!(a, stream_seed(7, 0, 0, 0));
    }

    #[test]
    fn halved_extent_halves_each_iteration() {
        assert_eq!(halved_extent(8.0, 0), 4.0);
        assert_eq!(halved_extent(8.0, 1), 2.0);
        assert_eq!(halved_extent(8.0, 3), 0.5);
    }
}
