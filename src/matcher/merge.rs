//! Lowest-cost merging and left-right consistency.

use crate::image::{OwnedImage, Roi};
use crate::matcher::Disparity;
use crate::util::PmHuberResult;

/// Adopts candidate pixels whose cost is strictly lower than the current one.
///
/// Disparity and cost are written together so the pair stays in lock-step.
/// Returns the number of replaced pixels.
pub fn keep_lowest_cost(
    candidate: &OwnedImage<Disparity>,
    candidate_cost: &OwnedImage<f32>,
    disparity: &mut OwnedImage<Disparity>,
    cost: &mut OwnedImage<f32>,
) -> PmHuberResult<usize> {
    let dims = disparity.dims();
    cost.ensure_dims(dims, "cost field")?;
    candidate.ensure_dims(dims, "candidate disparity")?;
    candidate_cost.ensure_dims(dims, "candidate cost")?;

    let mut replaced = 0usize;
    let pairs = disparity.data_mut().iter_mut().zip(cost.data_mut().iter_mut());
    let candidates = candidate.data().iter().zip(candidate_cost.data().iter());
    for ((d, c), (&cand_d, &cand_c)) in pairs.zip(candidates) {
        if cand_c < *c {
            *d = cand_d;
            *c = cand_c;
            replaced += 1;
        }
    }
    Ok(replaced)
}

/// Masks pixels whose forward and reverse disparities disagree.
///
/// `reverse_roi` places the reverse field's top-left pixel in the forward
/// field's frame. A pixel stays valid when the reverse disparity at its
/// rounded match location cancels its own disparity to within `threshold`
/// (Euclidean). Returns the number of pixels newly masked.
pub fn consistency_check(
    forward: &OwnedImage<Disparity>,
    reverse: &OwnedImage<Disparity>,
    reverse_roi: Roi,
    threshold: f32,
    mask: &mut OwnedImage<bool>,
) -> PmHuberResult<usize> {
    mask.ensure_dims(forward.dims(), "validity mask")?;
    let mut masked = 0usize;
    for y in 0..forward.height() {
        for x in 0..forward.width() {
            if !mask[(x, y)] {
                continue;
            }
            let d = forward[(x, y)];
            let qx = x as i32 + d.x.round() as i32 - reverse_roi.min_x;
            let qy = y as i32 + d.y.round() as i32 - reverse_roi.min_y;
            let consistent = reverse
                .get_signed(qx, qy)
                .is_some_and(|&r| (d + r).norm() <= threshold);
            if !consistent {
                mask[(x, y)] = false;
                masked += 1;
            }
        }
    }
    Ok(masked)
}

#[cfg(test)]
mod tests {
    use super::{consistency_check, keep_lowest_cost};
    use crate::image::{OwnedImage, Roi};
    use crate::matcher::Disparity;

    #[test]
    fn keeps_strictly_lower_costs_only() {
        let mut disp = OwnedImage::new(vec![Disparity::new(1.0, 0.0); 3], 3, 1).unwrap();
        let mut cost = OwnedImage::new(vec![0.5f32, 0.5, 0.5], 3, 1).unwrap();
        let cand = OwnedImage::new(vec![Disparity::new(2.0, 0.0); 3], 3, 1).unwrap();
        let cand_cost = OwnedImage::new(vec![0.4f32, 0.5, 0.6], 3, 1).unwrap();
        let replaced = keep_lowest_cost(&cand, &cand_cost, &mut disp, &mut cost).unwrap();
        assert_eq!(replaced, 1);
        assert_eq!(disp[(0, 0)].x, 2.0);
        assert_eq!(disp[(1, 0)].x, 1.0);
        assert_eq!(cost.data(), &[0.4, 0.5, 0.5]);
    }

    #[test]
    fn mismatched_candidate_is_rejected() {
        let mut disp = OwnedImage::filled(3, 1, Disparity::ZERO).unwrap();
        let mut cost = OwnedImage::filled(3, 1, 0.0f32).unwrap();
        let cand = OwnedImage::filled(2, 1, Disparity::ZERO).unwrap();
        let cand_cost = OwnedImage::filled(2, 1, 0.0f32).unwrap();
        assert!(keep_lowest_cost(&cand, &cand_cost, &mut disp, &mut cost).is_err());
    }

    #[test]
    fn consistency_masks_disagreeing_pixels() {
        // Forward field of width 4 at offset +1; reverse field covers x in [1, 5).
        let forward = OwnedImage::filled(4, 1, Disparity::new(1.0, 0.0)).unwrap();
        let mut reverse = OwnedImage::filled(4, 1, Disparity::new(-1.0, 0.0)).unwrap();
        reverse[(2, 0)] = Disparity::new(2.0, 0.0);
        let mut mask = OwnedImage::filled(4, 1, true).unwrap();
        let masked = consistency_check(&forward, &reverse, Roi::new(1, 0, 4, 1), 0.5, &mut mask)
            .unwrap();
        assert_eq!(masked, 1);
        assert_eq!(mask.data(), &[true, true, false, true]);
    }
}
