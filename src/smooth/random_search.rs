//! Random-search candidates scored with the smoothness-coupled cost.

use crate::image::OwnedImage;
use crate::matcher::{add_uniform_noise, Disparity, DisparityBox, NoiseSource};
use crate::smooth::rows::map_rows;
use crate::smooth::SmoothScorer;
use crate::trace::trace_event;
use crate::util::PmHuberResult;

/// Scores every pixel's disparity with the combined cost.
///
/// Pixels whose disparity is not admissible get an infinite cost.
pub fn evaluate_disparity_smooth(
    scorer: &SmoothScorer<'_>,
    disparity: &OwnedImage<Disparity>,
    cost: &mut OwnedImage<f32>,
    parallel: bool,
) -> PmHuberResult<()> {
    let dims = scorer.dims();
    disparity.ensure_dims(dims, "disparity field")?;
    cost.ensure_dims(dims, "cost field")?;

    let width = dims.0;
    map_rows(cost.data_mut(), width, parallel, |y, row| {
        for (x, c) in row.iter_mut().enumerate() {
            let d = disparity[(x, y)];
            *c = if scorer.allowed(x, y).contains(d) {
                scorer.cost(x, y, d)
            } else {
                f32::INFINITY
            };
        }
        0
    });
    Ok(())
}

/// Perturbs a copy of `disparity` inside `window` and scores it.
///
/// Each candidate is drawn from the window around the current value, clipped
/// to the pixel's admissible box. Noise is drawn sequentially in row-major
/// order, so `parallel` only affects scoring. Returns the candidate field and
/// its cost; merging is left to the caller.
pub fn random_search<N: NoiseSource + ?Sized>(
    scorer: &SmoothScorer<'_>,
    window: DisparityBox,
    disparity: &OwnedImage<Disparity>,
    noise: &mut N,
    parallel: bool,
) -> PmHuberResult<(OwnedImage<Disparity>, OwnedImage<f32>)> {
    disparity.ensure_dims(scorer.dims(), "disparity field")?;
    let geometry = scorer.geometry();
    let mut candidate = disparity.clone();
    let masked = add_uniform_noise(
        window,
        &geometry.search,
        &geometry.b_roi,
        &mut candidate,
        noise,
    );

    let (width, height) = scorer.dims();
    let mut cost = OwnedImage::filled(width, height, f32::INFINITY)?;
    evaluate_disparity_smooth(scorer, &candidate, &mut cost, parallel)?;
    trace_event!("random_search", masked = masked, window_x = window.max.x);
    Ok((candidate, cost))
}
