#![cfg(feature = "rayon")]

use pmhuber::{compute_tile_disparity, ImageView, PmHuberConfig, Roi, SearchRegion};

fn make_image(width: usize, height: usize, shift: usize) -> Vec<u8> {
    let mut data = Vec::with_capacity(width * height);
    for y in 0..height {
        for x in 0..width {
            let sx = x + shift;
            let value = ((sx * 11) ^ (y * 3) ^ (sx * y)) & 0xFF;
            data.push(value as u8);
        }
    }
    data
}

#[test]
fn parallel_matches_sequential_symmetric() {
    let (width, height) = (64, 40);
    let left = make_image(width, height, 4);
    let right = make_image(width, height, 0);
    let left_view = ImageView::from_slice(&left, width, height).unwrap();
    let right_view = ImageView::from_slice(&right, width, height).unwrap();
    let roi = Roi::new(10, 6, 32, 24);

    let sequential = PmHuberConfig {
        search_region: SearchRegion::new(-8, -1, 8, 1),
        kernel: (5, 5),
        max_iterations: 4,
        seed: 21,
        ..PmHuberConfig::default()
    };
    let parallel = PmHuberConfig {
        parallel: true,
        ..sequential
    };

    let seq = compute_tile_disparity(left_view, right_view, roi, &sequential).unwrap();
    let par = compute_tile_disparity(left_view, right_view, roi, &parallel).unwrap();
    assert_eq!(seq, par);
}

#[test]
fn parallel_matches_sequential_one_sided() {
    let (width, height) = (48, 32);
    let left = make_image(width, height, 2);
    let right = make_image(width, height, 0);
    let left_view = ImageView::from_slice(&left, width, height).unwrap();
    let right_view = ImageView::from_slice(&right, width, height).unwrap();
    let roi = Roi::new(0, 0, 48, 32);

    let sequential = PmHuberConfig {
        search_region: SearchRegion::horizontal(-6, 6),
        kernel: (3, 3),
        max_iterations: 3,
        symmetric: false,
        ..PmHuberConfig::default()
    };
    let parallel = PmHuberConfig {
        parallel: true,
        ..sequential
    };

    let seq = compute_tile_disparity(left_view, right_view, roi, &sequential).unwrap();
    let par = compute_tile_disparity(left_view, right_view, roi, &parallel).unwrap();
    assert_eq!(seq, par);
}
