//! Edge-aware smoothness weights from intensity gradients.

use crate::image::{OwnedImage, Roi};
use crate::smooth::SmoothParams;
use crate::util::{PmHuberError, PmHuberResult};

/// Maps a gradient magnitude to a weight in `(0, 1]`.
///
/// `exp(-alpha * magnitude^beta)`, floored at the smallest positive `f32`.
pub fn gradient_weight(magnitude: f32, params: &SmoothParams) -> f32 {
    let falloff = params.weight_alpha * magnitude.max(0.0).powf(params.weight_beta);
    (-falloff).exp().max(f32::MIN_POSITIVE)
}

/// Computes the smoothness weight of every pixel of `a_roi`.
///
/// `a_exp` holds the intensities of `a_exp_roi`; both ROIs share one frame.
/// Central differences read one pixel beyond `a_roi`, so `a_exp_roi` must
/// contain `a_roi` grown by one pixel. `weight` must be `a_roi` sized.
pub fn solve_gradient_weight(
    a_exp: &OwnedImage<f32>,
    a_exp_roi: Roi,
    a_roi: Roi,
    params: &SmoothParams,
    weight: &mut OwnedImage<f32>,
) -> PmHuberResult<()> {
    a_exp.ensure_dims(a_exp_roi.dims(), "expanded intensity buffer")?;
    weight.ensure_dims(a_roi.dims(), "weight field")?;
    if !a_exp_roi.contains(&a_roi.expand(1, 1)) {
        return Err(PmHuberError::HaloTooSmall {
            context: "gradient footprint",
        });
    }

    let off_x = (a_roi.min_x - a_exp_roi.min_x) as usize;
    let off_y = (a_roi.min_y - a_exp_roi.min_y) as usize;
    for y in 0..weight.height() {
        let ey = y + off_y;
        let above = a_exp.row(ey - 1);
        let center = a_exp.row(ey);
        let below = a_exp.row(ey + 1);
        let out = weight.row_mut(y);
        for (x, w) in out.iter_mut().enumerate() {
            let ex = x + off_x;
            let gx = 0.5 * (center[ex + 1] - center[ex - 1]);
            let gy = 0.5 * (below[ex] - above[ex]);
            *w = gradient_weight((gx * gx + gy * gy).sqrt(), params);
        }
    }
    Ok(())
}
