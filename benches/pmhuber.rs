use criterion::{criterion_group, criterion_main, Criterion};
use pmhuber::lowlevel::{solve_smooth, DualField};
use pmhuber::{
    compute_tile_disparity, Disparity, ImageView, OwnedImage, PmHuberConfig, Roi, SearchRegion,
    SmoothParams,
};
use std::hint::black_box;

fn make_image(width: usize, height: usize, shift: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let sx = x + shift;
            let value = ((sx * 13) ^ (y * 7) ^ (sx * y)) & 0xFF;
            data.push(value as u8);
        }
    }
    data
}

fn bench_tile(c: &mut Criterion) {
    let width = 256;
    let height = 128;
    let left = make_image(width, height, 3);
    let right = make_image(width, height, 0);
    let left_view = ImageView::from_slice(&left, width, height).unwrap();
    let right_view = ImageView::from_slice(&right, width, height).unwrap();
    let roi = Roi::new(64, 32, 64, 64);

    let config = PmHuberConfig {
        search_region: SearchRegion::horizontal(-8, 8),
        kernel: (7, 7),
        symmetric: false,
        ..PmHuberConfig::default()
    };
    c.bench_function("tile_64_one_sided", |b| {
        b.iter(|| black_box(compute_tile_disparity(left_view, right_view, roi, &config).unwrap()));
    });

    let symmetric = PmHuberConfig {
        symmetric: true,
        ..config
    };
    c.bench_function("tile_64_symmetric", |b| {
        b.iter(|| {
            black_box(compute_tile_disparity(left_view, right_view, roi, &symmetric).unwrap())
        });
    });

    if cfg!(feature = "rayon") {
        let parallel = PmHuberConfig {
            parallel: true,
            ..symmetric
        };
        c.bench_function("tile_64_symmetric_parallel", |b| {
            b.iter(|| {
                black_box(compute_tile_disparity(left_view, right_view, roi, &parallel).unwrap())
            });
        });
    }
}

fn bench_regularize(c: &mut Criterion) {
    let (width, height) = (64, 64);
    let data = (0..width * height)
        .map(|i| Disparity::new(((i * 31) % 17) as f32 * 0.25, 0.0))
        .collect();
    let noisy = OwnedImage::new(data, width, height).unwrap();
    let weight = OwnedImage::filled(width, height, 0.5f32).unwrap();
    let params = SmoothParams::default();
    let mut duals = DualField::zeros(width, height).unwrap();
    let mut smooth = noisy.clone();

    c.bench_function("solve_smooth_64", |b| {
        b.iter(|| {
            solve_smooth(&noisy, &weight, &mut duals, &params, &mut smooth).unwrap();
            black_box(&smooth);
        });
    });
}

criterion_group!(benches, bench_tile, bench_regularize);
criterion_main!(benches);
