//! 8-connected propagation with the smoothness-coupled cost.

use crate::image::{OwnedImage, Roi};
use crate::matcher::Disparity;
use crate::smooth::rows::map_row_pairs;
use crate::smooth::SmoothScorer;
use crate::trace::trace_event;
use crate::util::PmHuberResult;

const NEIGHBOURS: [(i32, i32); 8] = [
    (-1, -1),
    (0, -1),
    (1, -1),
    (-1, 0),
    (1, 0),
    (-1, 1),
    (0, 1),
    (1, 1),
];

/// Disparity field of the opposite match direction.
///
/// `roi` places the field's top-left pixel in the current side's frame. A
/// pixel `p` with disparity `d` proposes `-other(round(p + d))`.
#[derive(Clone, Copy, Debug)]
pub struct CrossCheck<'a> {
    pub disparity: &'a OwnedImage<Disparity>,
    pub roi: Roi,
}

impl CrossCheck<'_> {
    fn candidate(&self, x: usize, y: usize, d: Disparity) -> Option<Disparity> {
        let qx = x as i32 + d.x.round() as i32 - self.roi.min_x;
        let qy = y as i32 + d.y.round() as i32 - self.roi.min_y;
        self.disparity.get_signed(qx, qy).map(|&r| -r)
    }
}

/// Lets every pixel adopt a neighbour's disparity when it scores lower.
///
/// Candidates are the pixel's own value, its 8 neighbours' values and, with
/// `cross`, the mirrored opposite-side disparity. Neighbour values come from
/// a snapshot taken before the pass. The own value keeps its stored cost and
/// is only scored when that cost is not finite, so costs never increase. A
/// candidate must be admissible at the pixel and must score strictly lower
/// to win. Pixels without admissible disparities get an infinite cost.
///
/// Returns the number of pixels that adopted a new disparity.
pub fn evaluate_8_connect_smooth(
    scorer: &SmoothScorer<'_>,
    cross: Option<CrossCheck<'_>>,
    disparity: &mut OwnedImage<Disparity>,
    cost: &mut OwnedImage<f32>,
    parallel: bool,
) -> PmHuberResult<usize> {
    let dims = scorer.dims();
    disparity.ensure_dims(dims, "disparity field")?;
    cost.ensure_dims(dims, "cost field")?;
    if let Some(cross) = &cross {
        cross.disparity.ensure_dims(cross.roi.dims(), "cross-check field")?;
    }

    let snapshot = disparity.clone();
    let (width, height) = dims;
    let adopted = map_row_pairs(
        disparity.data_mut(),
        cost.data_mut(),
        width,
        parallel,
        |y, d_row, c_row| {
            let mut adopted = 0usize;
            for x in 0..width {
                let allowed = scorer.allowed(x, y);
                if allowed.is_empty() {
                    c_row[x] = f32::INFINITY;
                    continue;
                }

                let own = snapshot[(x, y)];
                let mut best = own;
                let mut best_cost = if !allowed.contains(own) {
                    f32::INFINITY
                } else if c_row[x].is_finite() {
                    c_row[x]
                } else {
                    scorer.cost(x, y, own)
                };
                let mut replaced = false;
                let mut consider = |candidate: Disparity| {
                    if !allowed.contains(candidate) {
                        return;
                    }
                    let candidate_cost = scorer.cost(x, y, candidate);
                    if candidate_cost < best_cost {
                        best = candidate;
                        best_cost = candidate_cost;
                        replaced = true;
                    }
                };

                for (ox, oy) in NEIGHBOURS {
                    let (nx, ny) = (x as i32 + ox, y as i32 + oy);
                    if nx < 0 || ny < 0 || nx >= width as i32 || ny >= height as i32 {
                        continue;
                    }
                    consider(snapshot[(nx as usize, ny as usize)]);
                }
                if let Some(candidate) = cross.and_then(|c| c.candidate(x, y, own)) {
                    consider(candidate);
                }

                if replaced {
                    adopted += 1;
                }
                d_row[x] = best;
                c_row[x] = best_cost;
            }
            adopted
        },
    );
    trace_event!("propagation", adopted = adopted);
    Ok(adopted)
}
