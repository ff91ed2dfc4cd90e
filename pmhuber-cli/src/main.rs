use clap::Parser;
use pmhuber::io::load_gray_image;
use pmhuber::{PatchMatchHuber, PmHuberConfig, Roi, SearchRegion, SmoothParams};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::PathBuf;
use tracing_subscriber::EnvFilter;

const SCHEMA_JSON: &str = include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.schema.json"));
const EXAMPLE_JSON: &str =
    include_str!(concat!(env!("CARGO_MANIFEST_DIR"), "/config.example.json"));

#[derive(Parser, Debug)]
#[command(author, version, about = "pmhuber CLI (JSON config driven)")]
struct Cli {
    /// Path to the JSON configuration file.
    #[arg(short, long, value_name = "FILE", default_value = "config.json")]
    config: PathBuf,
    /// Print the JSON schema and exit.
    #[arg(long)]
    print_schema: bool,
    /// Print an example config and exit.
    #[arg(long)]
    print_example: bool,
    /// Enable tracing output for performance profiling.
    #[arg(long)]
    trace: bool,
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SearchRegionJson {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

impl Default for SearchRegionJson {
    fn default() -> Self {
        let region = SearchRegion::default();
        Self {
            min_x: region.min_x,
            min_y: region.min_y,
            max_x: region.max_x,
            max_y: region.max_y,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct SmoothConfigJson {
    lambda: f32,
    theta: f32,
    huber_epsilon: f32,
    smooth_steps: usize,
    weight_alpha: f32,
    weight_beta: f32,
    warm_start_duals: bool,
}

impl Default for SmoothConfigJson {
    fn default() -> Self {
        let cfg = SmoothParams::default();
        Self {
            lambda: cfg.lambda,
            theta: cfg.theta,
            huber_epsilon: cfg.huber_epsilon,
            smooth_steps: cfg.smooth_steps,
            weight_alpha: cfg.weight_alpha,
            weight_beta: cfg.weight_beta,
            warm_start_duals: cfg.warm_start_duals,
        }
    }
}

#[derive(Debug, Deserialize)]
#[serde(default)]
struct Config {
    left_path: String,
    right_path: String,
    output_path: Option<String>,
    tile_size: usize,
    search_region: SearchRegionJson,
    kernel: [usize; 2],
    consistency_threshold: f32,
    max_iterations: usize,
    symmetric: bool,
    parallel: bool,
    seed: u64,
    smooth: SmoothConfigJson,
}

impl Default for Config {
    fn default() -> Self {
        let cfg = PmHuberConfig::default();
        Self {
            left_path: String::new(),
            right_path: String::new(),
            output_path: None,
            tile_size: 64,
            search_region: SearchRegionJson::default(),
            kernel: [cfg.kernel.0, cfg.kernel.1],
            consistency_threshold: cfg.consistency_threshold,
            max_iterations: cfg.max_iterations,
            symmetric: cfg.symmetric,
            parallel: cfg.parallel,
            seed: cfg.seed,
            smooth: SmoothConfigJson::default(),
        }
    }
}

impl Config {
    fn to_library(&self) -> PmHuberConfig {
        let search = &self.search_region;
        PmHuberConfig {
            search_region: SearchRegion::new(
                search.min_x,
                search.min_y,
                search.max_x,
                search.max_y,
            ),
            kernel: (self.kernel[0], self.kernel[1]),
            consistency_threshold: self.consistency_threshold,
            max_iterations: self.max_iterations,
            symmetric: self.symmetric,
            parallel: self.parallel,
            seed: self.seed,
            smooth: SmoothParams {
                lambda: self.smooth.lambda,
                theta: self.smooth.theta,
                huber_epsilon: self.smooth.huber_epsilon,
                smooth_steps: self.smooth.smooth_steps,
                weight_alpha: self.smooth.weight_alpha,
                weight_beta: self.smooth.weight_beta,
                warm_start_duals: self.smooth.warm_start_duals,
            },
        }
    }
}

#[derive(Clone, Copy, Debug, Serialize)]
struct PixelRecord {
    x: usize,
    y: usize,
    dx: f32,
    dy: f32,
}

#[derive(Debug, Serialize)]
struct Output {
    width: usize,
    height: usize,
    tile_size: usize,
    pixels: Vec<Option<PixelRecord>>,
}

fn main() -> Result<(), Box<dyn std::error::Error>> {
    let cli = Cli::parse();

    if cli.trace {
        tracing_subscriber::fmt()
            .with_env_filter(EnvFilter::from_default_env().add_directive("pmhuber=debug".parse()?))
            .with_target(false)
            .init();
    }

    if cli.print_schema {
        println!("{SCHEMA_JSON}");
        return Ok(());
    }
    if cli.print_example {
        println!("{EXAMPLE_JSON}");
        return Ok(());
    }

    let config_text = fs::read_to_string(&cli.config)?;
    let config: Config = serde_json::from_str(&config_text)?;
    if config.left_path.is_empty() || config.right_path.is_empty() {
        return Err("left_path and right_path must be set in the config".into());
    }
    if config.tile_size == 0 {
        return Err("tile_size must be at least 1".into());
    }

    let left = load_gray_image(&config.left_path)?;
    let right = load_gray_image(&config.right_path)?;
    let estimator = PatchMatchHuber::new().with_config(config.to_library());
    estimator.config().validate()?;

    let (width, height) = left.dims();
    let tile = config.tile_size;
    let mut pixels = vec![None; width * height];
    for ty in (0..height).step_by(tile) {
        for tx in (0..width).step_by(tile) {
            let roi = Roi::new(
                tx as i32,
                ty as i32,
                tile.min(width - tx) as i32,
                tile.min(height - ty) as i32,
            );
            let result = estimator.compute_tile(left.view(), right.view(), roi)?;
            tracing::info!(x = tx, y = ty, valid = result.valid_count(), "tile computed");
            let (tile_w, tile_h) = result.disparity().dims();
            for y in 0..tile_h {
                for x in 0..tile_w {
                    let (gx, gy) = (tx + x, ty + y);
                    pixels[gy * width + gx] = result.get(x, y).map(|d| PixelRecord {
                        x: gx,
                        y: gy,
                        dx: d.x,
                        dy: d.y,
                    });
                }
            }
        }
    }

    let output = Output {
        width,
        height,
        tile_size: tile,
        pixels,
    };
    let json = serde_json::to_string_pretty(&output)?;

    match config.output_path {
        Some(path) => fs::write(path, json)?,
        None => println!("{json}"),
    }

    Ok(())
}
