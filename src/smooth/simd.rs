//! SIMD dual update using the `wide` crate.
//!
//! Processes 8 columns at a time with the same operation order as the scalar
//! path, so both produce identical duals.

use wide::f32x8;

const LANES: usize = 8;

/// Load 8 f32 values into f32x8.
#[inline]
fn load_f32x8(slice: &[f32]) -> f32x8 {
    f32x8::from([
        slice[0], slice[1], slice[2], slice[3], slice[4], slice[5], slice[6], slice[7],
    ])
}

#[inline]
fn store_f32x8(v: f32x8, out: &mut [f32]) {
    out[..LANES].copy_from_slice(&v.to_array());
}

/// Updates full 8-lane chunks whose forward difference stays inside the row.
///
/// Returns the first column left for the scalar tail.
pub(crate) fn dual_ascent_row_simd(
    row: &[f32],
    below: Option<&[f32]>,
    weight: &[f32],
    px: &mut [f32],
    py: &mut [f32],
    step: f32,
    shrink: f32,
) -> usize {
    let width = row.len();
    let step_v = f32x8::splat(step);
    let shrink_v = f32x8::splat(shrink);
    let one = f32x8::splat(1.0);

    let mut x = 0usize;
    while x + LANES < width {
        let here = load_f32x8(&row[x..]);
        let gx = load_f32x8(&row[x + 1..]) - here;
        let gy = match below {
            Some(next) => load_f32x8(&next[x..]) - here,
            None => f32x8::ZERO,
        };
        let qx = (load_f32x8(&px[x..]) + step_v * gx) * shrink_v;
        let qy = (load_f32x8(&py[x..]) + step_v * gy) * shrink_v;
        let scale = ((qx * qx + qy * qy).sqrt() / load_f32x8(&weight[x..])).max(one);
        store_f32x8(qx / scale, &mut px[x..]);
        store_f32x8(qy / scale, &mut py[x..]);
        x += LANES;
    }
    x
}

#[cfg(test)]
mod tests {
    use super::dual_ascent_row_simd;
    use crate::smooth::regularize::dual_ascent_row_scalar;

    #[test]
    fn matches_scalar_update() {
        let width = 21;
        let row: Vec<f32> = (0..width).map(|i| ((i * 7) % 5) as f32 * 0.3).collect();
        let below: Vec<f32> = (0..width).map(|i| ((i * 3) % 4) as f32 * 0.2).collect();
        let weight: Vec<f32> = (0..width).map(|i| 0.1 + (i % 3) as f32 * 0.4).collect();
        let init: Vec<f32> = (0..width).map(|i| (i as f32 - 10.0) * 0.05).collect();
        let step = 0.353_553_38f32;
        let shrink = 1.0 / (1.0 + step * 0.01);

        let (mut px_s, mut py_s) = (init.clone(), init.clone());
        dual_ascent_row_scalar(&row, Some(&below), &weight, &mut px_s, &mut py_s, shrink, 0);

        let (mut px_v, mut py_v) = (init.clone(), init);
        let tail =
            dual_ascent_row_simd(&row, Some(&below), &weight, &mut px_v, &mut py_v, step, shrink);
        assert_eq!(tail, 16);
        dual_ascent_row_scalar(&row, Some(&below), &weight, &mut px_v, &mut py_v, shrink, tail);

        for i in 0..width {
            assert!((px_s[i] - px_v[i]).abs() < 1e-6);
            assert!((py_s[i] - py_v[i]).abs() < 1e-6);
        }
    }
}
