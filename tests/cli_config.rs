use pmhuber::{PmHuberConfig, SearchRegion, SmoothParams};
use serde::Deserialize;

const EXAMPLE_JSON: &str = include_str!("../pmhuber-cli/config.example.json");

#[derive(Debug, Deserialize)]
struct SearchRegionJson {
    min_x: i32,
    min_y: i32,
    max_x: i32,
    max_y: i32,
}

#[derive(Debug, Deserialize)]
struct SmoothJson {
    lambda: f32,
    theta: f32,
    huber_epsilon: f32,
    smooth_steps: usize,
    weight_alpha: f32,
    weight_beta: f32,
    warm_start_duals: bool,
}

#[derive(Debug, Deserialize)]
struct ExampleConfig {
    tile_size: usize,
    search_region: SearchRegionJson,
    kernel: [usize; 2],
    consistency_threshold: f32,
    max_iterations: usize,
    symmetric: bool,
    parallel: bool,
    seed: u64,
    smooth: SmoothJson,
}

#[test]
fn example_config_mirrors_library_defaults() {
    let example: ExampleConfig = serde_json::from_str(EXAMPLE_JSON).unwrap();
    assert!(example.tile_size > 0);

    let search = &example.search_region;
    let smooth = &example.smooth;
    let parsed = PmHuberConfig {
        search_region: SearchRegion::new(search.min_x, search.min_y, search.max_x, search.max_y),
        kernel: (example.kernel[0], example.kernel[1]),
        consistency_threshold: example.consistency_threshold,
        max_iterations: example.max_iterations,
        symmetric: example.symmetric,
        parallel: example.parallel,
        seed: example.seed,
        smooth: SmoothParams {
            lambda: smooth.lambda,
            theta: smooth.theta,
            huber_epsilon: smooth.huber_epsilon,
            smooth_steps: smooth.smooth_steps,
            weight_alpha: smooth.weight_alpha,
            weight_beta: smooth.weight_beta,
            warm_start_duals: smooth.warm_start_duals,
        },
    };
    assert_eq!(parsed, PmHuberConfig::default());
    assert!(parsed.validate().is_ok());
}

#[test]
fn schema_lists_every_config_field() {
    let schema: serde_json::Value =
        serde_json::from_str(include_str!("../pmhuber-cli/config.schema.json")).unwrap();
    let properties = schema["properties"].as_object().unwrap();
    for key in [
        "left_path",
        "right_path",
        "output_path",
        "tile_size",
        "search_region",
        "kernel",
        "consistency_threshold",
        "max_iterations",
        "symmetric",
        "parallel",
        "seed",
        "smooth",
    ] {
        assert!(properties.contains_key(key), "schema misses {key}");
    }
}
