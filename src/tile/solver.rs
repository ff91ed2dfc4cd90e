//! Outer-iteration state machine for one tile.

use crate::image::{ImageView, Intensity, OwnedImage, Roi};
use crate::matcher::{
    add_uniform_noise, consistency_check, keep_lowest_cost, Disparity, DisparityBox,
    MatchGeometry, NccMatcher, NoiseSource, SearchRegion, UniformNoise,
};
use crate::smooth::{
    evaluate_8_connect_smooth, random_search, solve_gradient_weight, solve_smooth, CrossCheck,
    DualField, SmoothScorer,
};
use crate::tile::{DisparityTile, PmHuberConfig};
use crate::trace::{trace_event, trace_span};
use crate::util::math::{halved_extent, stream_seed};
use crate::util::{PmHuberError, PmHuberResult};

const LEFT_TO_RIGHT: u64 = 0;
const RIGHT_TO_LEFT: u64 = 1;

/// Edge-extended intensity buffer and its region in image coordinates.
#[derive(Debug)]
struct Halo {
    roi: Roi,
    image: OwnedImage<f32>,
}

impl Halo {
    fn crop<T: Intensity>(view: ImageView<'_, T>, roi: Roi) -> PmHuberResult<Self> {
        Ok(Self {
            roi,
            image: view.crop_edge_extended(roi)?,
        })
    }
}

/// Fields of one match direction, all sized to its output region.
#[derive(Debug)]
struct Side<N> {
    /// Output region in its own image's coordinates.
    roi: Roi,
    /// Regions relative to `roi`'s origin.
    geometry: MatchGeometry,
    weight: OwnedImage<f32>,
    disparity: OwnedImage<Disparity>,
    cost: OwnedImage<f32>,
    smooth: OwnedImage<Disparity>,
    duals: DualField,
    noise: N,
}

impl<N: NoiseSource> Side<N> {
    /// Allocates fields, draws the initial disparities and solves weights.
    fn init(
        own: &Halo,
        other: &Halo,
        roi: Roi,
        matched: Roi,
        search: SearchRegion,
        config: &PmHuberConfig,
        mut noise: N,
    ) -> PmHuberResult<Self> {
        let geometry = MatchGeometry {
            a_exp_roi: own.roi.relative_to(&roi),
            b_exp_roi: other.roi.relative_to(&roi),
            b_roi: matched.relative_to(&roi),
            search,
        };
        let (width, height) = roi.dims();
        let mut disparity = OwnedImage::filled(width, height, Disparity::ZERO)?;
        add_uniform_noise(
            search.as_box(),
            &search,
            &geometry.b_roi,
            &mut disparity,
            &mut noise,
        );
        let mut weight = OwnedImage::filled(width, height, 1.0f32)?;
        solve_gradient_weight(&own.image, own.roi, roi, &config.smooth, &mut weight)?;

        Ok(Self {
            roi,
            geometry,
            weight,
            smooth: disparity.clone(),
            disparity,
            cost: OwnedImage::filled(width, height, f32::INFINITY)?,
            duals: DualField::zeros(width, height)?,
            noise,
        })
    }

    /// Regularize, propagate, then random search merged by lowest cost.
    fn advance(
        &mut self,
        a: &OwnedImage<f32>,
        b: &OwnedImage<f32>,
        cross: Option<CrossCheck<'_>>,
        matcher: &NccMatcher,
        config: &PmHuberConfig,
        iteration: usize,
    ) -> PmHuberResult<usize> {
        solve_smooth(
            &self.disparity,
            &self.weight,
            &mut self.duals,
            &config.smooth,
            &mut self.smooth,
        )?;
        let scorer = SmoothScorer::new(
            matcher,
            a,
            b,
            &self.geometry,
            &self.smooth,
            &self.weight,
            &config.smooth,
        )?;
        let propagated = evaluate_8_connect_smooth(
            &scorer,
            cross,
            &mut self.disparity,
            &mut self.cost,
            config.parallel,
        )?;

        let (size_x, size_y) = self.geometry.search.size();
        let window = DisparityBox::centered(Disparity::new(
            halved_extent(size_x, iteration),
            halved_extent(size_y, iteration),
        ));
        let (candidate, candidate_cost) = random_search(
            &scorer,
            window,
            &self.disparity,
            &mut self.noise,
            config.parallel,
        )?;
        let searched =
            keep_lowest_cost(&candidate, &candidate_cost, &mut self.disparity, &mut self.cost)?;
        Ok(propagated + searched)
    }
}

/// Buffers and fields of a tile with a non-empty matched region.
#[derive(Debug)]
struct Workspace<N> {
    left: Halo,
    right: Halo,
    lr: Side<N>,
    rl: Option<Side<N>>,
}

/// Joint PatchMatch + Huber-TV estimation of one tile.
///
/// Construction computes the regions of both match directions, crops the
/// edge-extended halos, draws the initial disparities and solves the weights.
/// Each [`step`](Self::step) runs one outer iteration for every direction;
/// [`finish`](Self::finish) returns the masked result.
///
/// When the search region is empty or the matched region clips to nothing,
/// no fields are allocated and the result is fully masked.
#[derive(Debug)]
pub struct TileSolver<N> {
    roi: Roi,
    config: PmHuberConfig,
    matcher: NccMatcher,
    iteration: usize,
    work: Option<Workspace<N>>,
}

impl TileSolver<UniformNoise> {
    /// Creates a solver with noise streams derived from `config.seed`, the
    /// tile origin and the match direction.
    pub fn seeded<T: Intensity>(
        left: ImageView<'_, T>,
        right: ImageView<'_, T>,
        roi: Roi,
        config: PmHuberConfig,
    ) -> PmHuberResult<Self> {
        let stream = |direction| stream_seed(config.seed, roi.min_x, roi.min_y, direction);
        let lr = UniformNoise::seeded(stream(LEFT_TO_RIGHT));
        let rl = UniformNoise::seeded(stream(RIGHT_TO_LEFT));
        Self::new(left, right, roi, config, lr, rl)
    }
}

impl<N: NoiseSource + Send> TileSolver<N> {
    /// Prepares the tile `roi`, given in left-image coordinates.
    ///
    /// `roi` must be non-empty and inside the left image. `rl_noise` is only
    /// used in symmetric mode.
    pub fn new<T: Intensity>(
        left: ImageView<'_, T>,
        right: ImageView<'_, T>,
        roi: Roi,
        config: PmHuberConfig,
        lr_noise: N,
        rl_noise: N,
    ) -> PmHuberResult<Self> {
        config.validate()?;
        if !left.bounds().contains(&roi) {
            return Err(PmHuberError::RoiOutOfBounds {
                x: roi.min_x as i64,
                y: roi.min_y as i64,
                width: roi.dims().0,
                height: roi.dims().1,
                img_width: left.width(),
                img_height: left.height(),
            });
        }
        let matcher = NccMatcher::new(config.kernel.0, config.kernel.1)?;
        let search = config.search_region;

        let matched = if search.is_empty() {
            Roi::default()
        } else {
            Roi::from_corners(
                roi.min_x + search.min_x,
                roi.min_y + search.min_y,
                roi.max_x + search.max_x,
                roi.max_y + search.max_y,
            )
            .intersect(&right.bounds())
        };
        trace_event!(
            "tile_rois",
            left_x = roi.min_x,
            left_y = roi.min_y,
            right_x = matched.min_x,
            right_y = matched.min_y,
            right_width = matched.width(),
            right_height = matched.height()
        );

        let work = if matched.is_empty() {
            None
        } else {
            let (hx, hy) = matcher.halo();
            let left_halo = Halo::crop(left, roi.expand(hx, hy))?;
            let right_halo = Halo::crop(right, matched.expand(hx, hy))?;
            let lr = Side::init(&left_halo, &right_halo, roi, matched, search, &config, lr_noise)?;
            let rl = if config.symmetric {
                Some(Side::init(
                    &right_halo,
                    &left_halo,
                    matched,
                    roi,
                    search.mirrored(),
                    &config,
                    rl_noise,
                )?)
            } else {
                None
            };
            Some(Workspace {
                left: left_halo,
                right: right_halo,
                lr,
                rl,
            })
        };

        Ok(Self {
            roi,
            config,
            matcher,
            iteration: 0,
            work,
        })
    }

    /// Runs one outer iteration; a no-op once [`is_done`](Self::is_done).
    pub fn step(&mut self) -> PmHuberResult<()> {
        if self.is_done() {
            return Ok(());
        }
        let iteration = self.iteration;
        let _span = trace_span!("iteration", iteration = iteration).entered();
        if let Some(work) = self.work.as_mut() {
            advance_workspace(work, &self.matcher, &self.config, iteration)?;
        }
        self.iteration += 1;
        Ok(())
    }

    /// Steps until `max_iterations` outer iterations have run.
    pub fn run(&mut self) -> PmHuberResult<()> {
        while !self.is_done() {
            self.step()?;
        }
        Ok(())
    }

    /// Crops the left-to-right field to the requested window and masks
    /// inadmissible and (in symmetric mode) inconsistent pixels.
    pub fn finish(self) -> PmHuberResult<DisparityTile> {
        let Some(work) = self.work else {
            trace_event!("tile_done", valid = 0usize);
            return DisparityTile::masked(self.roi);
        };
        let lr = work.lr;
        let (width, height) = self.roi.dims();
        let mut valid = OwnedImage::filled(width, height, false)?;
        for y in 0..height {
            for x in 0..width {
                valid[(x, y)] = !lr.geometry.allowed(x, y).is_empty();
            }
        }
        if let Some(rl) = &work.rl {
            consistency_check(
                &lr.disparity,
                &rl.disparity,
                rl.roi.relative_to(&self.roi),
                self.config.consistency_threshold,
                &mut valid,
            )?;
        }

        let tile = DisparityTile::new(self.roi, lr.disparity, valid)?;
        trace_event!("tile_done", valid = tile.valid_count());
        Ok(tile)
    }
}

impl<N> TileSolver<N> {
    /// Number of outer iterations run so far.
    pub fn iteration(&self) -> usize {
        self.iteration
    }

    pub fn is_done(&self) -> bool {
        self.iteration >= self.config.max_iterations
    }

    pub fn config(&self) -> &PmHuberConfig {
        &self.config
    }

    /// Requested output region in left-image coordinates.
    pub fn output_roi(&self) -> Roi {
        self.roi
    }

    /// Right-image region disparities may point into, `None` when empty.
    pub fn matched_roi(&self) -> Option<Roi> {
        self.work.as_ref().map(|work| work.lr_matched())
    }

    /// Current left-to-right disparities.
    pub fn disparity(&self) -> Option<&OwnedImage<Disparity>> {
        self.work.as_ref().map(|work| &work.lr.disparity)
    }

    /// Current left-to-right costs; infinite where nothing was scored yet.
    pub fn cost(&self) -> Option<&OwnedImage<f32>> {
        self.work.as_ref().map(|work| &work.lr.cost)
    }

    /// Left-image smoothness weights.
    pub fn weight(&self) -> Option<&OwnedImage<f32>> {
        self.work.as_ref().map(|work| &work.lr.weight)
    }

    /// Smoothed prior of the last iteration.
    pub fn smoothed(&self) -> Option<&OwnedImage<Disparity>> {
        self.work.as_ref().map(|work| &work.lr.smooth)
    }

    /// Right-to-left disparities over [`matched_roi`](Self::matched_roi).
    pub fn reverse_disparity(&self) -> Option<&OwnedImage<Disparity>> {
        self.work
            .as_ref()
            .and_then(|work| work.rl.as_ref())
            .map(|rl| &rl.disparity)
    }
}

impl<N> Workspace<N> {
    fn lr_matched(&self) -> Roi {
        self.lr.geometry.b_roi.translate(self.lr.roi.min_x, self.lr.roi.min_y)
    }
}

/// Advances every direction by one outer iteration.
///
/// Cross candidates read the other direction's start-of-iteration snapshot,
/// so both directions may run concurrently.
fn advance_workspace<N: NoiseSource + Send>(
    work: &mut Workspace<N>,
    matcher: &NccMatcher,
    config: &PmHuberConfig,
    iteration: usize,
) -> PmHuberResult<()> {
    let Workspace {
        left,
        right,
        lr,
        rl,
    } = work;
    let (left, right) = (&left.image, &right.image);

    let Some(rl) = rl.as_mut() else {
        let updated = lr.advance(left, right, None, matcher, config, iteration)?;
        trace_event!("iteration_done", updated = updated);
        return Ok(());
    };

    let lr_snapshot = lr.disparity.clone();
    let rl_snapshot = rl.disparity.clone();
    let lr_cross = CrossCheck {
        disparity: &rl_snapshot,
        roi: rl.roi.relative_to(&lr.roi),
    };
    let rl_cross = CrossCheck {
        disparity: &lr_snapshot,
        roi: lr.roi.relative_to(&rl.roi),
    };

    let mut forward = || lr.advance(left, right, Some(lr_cross), matcher, config, iteration);
    let mut reverse = || rl.advance(right, left, Some(rl_cross), matcher, config, iteration);

    #[cfg(feature = "rayon")]
    let (forward, reverse) = if config.parallel {
        rayon::join(forward, reverse)
    } else {
        (forward(), reverse())
    };
    #[cfg(not(feature = "rayon"))]
    let (forward, reverse) = (forward(), reverse());

    let updated = forward? + reverse?;
    trace_event!("iteration_done", updated = updated);
    Ok(())
}
