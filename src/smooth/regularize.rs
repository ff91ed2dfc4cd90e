//! Weighted Huber-TV denoising of disparity fields.
//!
//! Each disparity channel is smoothed independently with first-order
//! primal-dual iterations:
//!
//! ```text
//! p  <- (p + sigma * grad(v_bar)) / (1 + sigma * eps)
//! p  <- p / max(1, |p| / w)
//! v' <- (v + tau * div(p) + (tau / theta) * f) / (1 + tau / theta)
//! v_bar <- 2 v' - v
//! ```
//!
//! Gradients are forward differences, zero on the last column and row, and
//! `div` is their negative adjoint.

use crate::image::OwnedImage;
use crate::matcher::Disparity;
use crate::smooth::SmoothParams;
use crate::util::PmHuberResult;

/// Primal and dual step size; `sigma * tau * |grad|^2 <= 1` with `|grad|^2 = 8`.
const STEP: f32 = 0.353_553_38;

/// Dual variables of both disparity channels.
///
/// `x_dx`/`x_dy` belong to the horizontal channel, `y_dx`/`y_dy` to the
/// vertical one. The tile solver keeps one field per side across outer
/// iterations.
#[derive(Clone, Debug, PartialEq)]
pub struct DualField {
    pub x_dx: OwnedImage<f32>,
    pub x_dy: OwnedImage<f32>,
    pub y_dx: OwnedImage<f32>,
    pub y_dy: OwnedImage<f32>,
}

impl DualField {
    /// Allocates zeroed duals for a `width x height` field.
    pub fn zeros(width: usize, height: usize) -> PmHuberResult<Self> {
        Ok(Self {
            x_dx: OwnedImage::filled(width, height, 0.0)?,
            x_dy: OwnedImage::filled(width, height, 0.0)?,
            y_dx: OwnedImage::filled(width, height, 0.0)?,
            y_dy: OwnedImage::filled(width, height, 0.0)?,
        })
    }

    pub fn dims(&self) -> (usize, usize) {
        self.x_dx.dims()
    }

    pub fn reset(&mut self) {
        self.x_dx.fill(0.0);
        self.x_dy.fill(0.0);
        self.y_dx.fill(0.0);
        self.y_dy.fill(0.0);
    }

    fn ensure_dims(&self, expected: (usize, usize)) -> PmHuberResult<()> {
        self.x_dx.ensure_dims(expected, "dual field x_dx")?;
        self.x_dy.ensure_dims(expected, "dual field x_dy")?;
        self.y_dx.ensure_dims(expected, "dual field y_dx")?;
        self.y_dy.ensure_dims(expected, "dual field y_dy")
    }
}

/// Smooths `noisy` into `smooth` with `params.smooth_steps` primal-dual steps.
///
/// `weight` bounds the dual norm per pixel, so low weights let the result
/// keep discontinuities. Duals are reset first unless
/// `params.warm_start_duals` is set.
pub fn solve_smooth(
    noisy: &OwnedImage<Disparity>,
    weight: &OwnedImage<f32>,
    duals: &mut DualField,
    params: &SmoothParams,
    smooth: &mut OwnedImage<Disparity>,
) -> PmHuberResult<()> {
    let dims = noisy.dims();
    weight.ensure_dims(dims, "weight field")?;
    smooth.ensure_dims(dims, "smoothed disparity")?;
    duals.ensure_dims(dims)?;
    if !params.warm_start_duals {
        duals.reset();
    }

    let mut solver = ChannelSolver::new(dims, params);
    let fidelity: Vec<f32> = noisy.data().iter().map(|d| d.x).collect();
    solver.run(&fidelity, weight, &mut duals.x_dx, &mut duals.x_dy);
    for (out, &v) in smooth.data_mut().iter_mut().zip(solver.v.iter()) {
        out.x = v;
    }

    let fidelity: Vec<f32> = noisy.data().iter().map(|d| d.y).collect();
    solver.run(&fidelity, weight, &mut duals.y_dx, &mut duals.y_dy);
    for (out, &v) in smooth.data_mut().iter_mut().zip(solver.v.iter()) {
        out.y = v;
    }
    Ok(())
}

/// Scratch buffers for one scalar channel, reused across channels.
struct ChannelSolver {
    width: usize,
    height: usize,
    steps: usize,
    epsilon: f32,
    theta: f32,
    v: Vec<f32>,
    v_bar: Vec<f32>,
}

impl ChannelSolver {
    fn new((width, height): (usize, usize), params: &SmoothParams) -> Self {
        Self {
            width,
            height,
            steps: params.smooth_steps,
            epsilon: params.huber_epsilon,
            theta: params.theta,
            v: vec![0.0; width * height],
            v_bar: vec![0.0; width * height],
        }
    }

    fn run(
        &mut self,
        f: &[f32],
        weight: &OwnedImage<f32>,
        px: &mut OwnedImage<f32>,
        py: &mut OwnedImage<f32>,
    ) {
        self.v.copy_from_slice(f);
        self.v_bar.copy_from_slice(f);
        for _ in 0..self.steps {
            self.dual_step(weight, px, py);
            self.primal_step(f, px, py);
        }
    }

    fn dual_step(
        &self,
        weight: &OwnedImage<f32>,
        px: &mut OwnedImage<f32>,
        py: &mut OwnedImage<f32>,
    ) {
        let width = self.width;
        let shrink = 1.0 / (1.0 + STEP * self.epsilon);
        for y in 0..self.height {
            let row = &self.v_bar[y * width..(y + 1) * width];
            let below = (y + 1 < self.height)
                .then(|| &self.v_bar[(y + 1) * width..(y + 2) * width]);
            dual_ascent_row(
                row,
                below,
                weight.row(y),
                px.row_mut(y),
                py.row_mut(y),
                shrink,
            );
        }
    }

    fn primal_step(&mut self, f: &[f32], px: &OwnedImage<f32>, py: &OwnedImage<f32>) {
        let (width, height) = (self.width, self.height);
        let fidelity = STEP / self.theta;
        let denom = 1.0 + fidelity;
        for y in 0..height {
            let px_row = px.row(y);
            let py_row = py.row(y);
            let py_above = (y > 0).then(|| py.row(y - 1));
            for x in 0..width {
                let mut div = 0.0f32;
                if x + 1 < width {
                    div += px_row[x];
                }
                if x > 0 {
                    div -= px_row[x - 1];
                }
                if y + 1 < height {
                    div += py_row[x];
                }
                if let Some(above) = py_above {
                    div -= above[x];
                }

                let i = y * width + x;
                let previous = self.v[i];
                let next = (previous + STEP * div + fidelity * f[i]) / denom;
                self.v[i] = next;
                self.v_bar[i] = 2.0 * next - previous;
            }
        }
    }
}

/// Dual ascent and weighted projection for one row.
///
/// `below` is the next row of `v_bar`, absent on the last row.
fn dual_ascent_row(
    row: &[f32],
    below: Option<&[f32]>,
    weight: &[f32],
    px: &mut [f32],
    py: &mut [f32],
    shrink: f32,
) {
    #[cfg(feature = "simd")]
    let start =
        crate::smooth::simd::dual_ascent_row_simd(row, below, weight, px, py, STEP, shrink);
    #[cfg(not(feature = "simd"))]
    let start = 0;

    dual_ascent_row_scalar(row, below, weight, px, py, shrink, start);
}

/// Scalar dual update of columns `start..`.
pub(crate) fn dual_ascent_row_scalar(
    row: &[f32],
    below: Option<&[f32]>,
    weight: &[f32],
    px: &mut [f32],
    py: &mut [f32],
    shrink: f32,
    start: usize,
) {
    let width = row.len();
    for x in start..width {
        let gx = if x + 1 < width { row[x + 1] - row[x] } else { 0.0 };
        let gy = match below {
            Some(next) => next[x] - row[x],
            None => 0.0,
        };
        let qx = (px[x] + STEP * gx) * shrink;
        let qy = (py[x] + STEP * gy) * shrink;
        let scale = ((qx * qx + qy * qy).sqrt() / weight[x]).max(1.0);
        px[x] = qx / scale;
        py[x] = qy / scale;
    }
}
