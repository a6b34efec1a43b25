use criterion::{black_box, criterion_group, criterion_main, Criterion};

use cv_disparity::prelude::*;
use image::{DynamicImage, GrayImage};

const WIDTH: u32 = 320;
const HEIGHT: u32 = 240;
const SHIFT: u32 = 12;

/// Random texture pair, left pixel `(x, y)` seen at `(x - SHIFT, y)` on the right.
fn shifted_pair() -> StereoFrame {
    let mut state = 0x2545_f491_4f6c_dd1du64;
    let canvas: Vec<u8> = (0..(WIDTH + SHIFT) * HEIGHT)
        .map(|_| {
            state = state
                .wrapping_mul(6364136223846793005)
                .wrapping_add(1442695040888963407);
            (state >> 56) as u8
        })
        .collect();
    let at = |x: u32, y: u32| image::Luma([canvas[(y * (WIDTH + SHIFT) + x) as usize]]);

    StereoFrame::new(
        DynamicImage::ImageLuma8(GrayImage::from_fn(WIDTH, HEIGHT, |x, y| at(x, y))),
        DynamicImage::ImageLuma8(GrayImage::from_fn(WIDTH, HEIGHT, |x, y| at(x + SHIFT, y))),
    )
}

fn local_stereo_bench(c: &mut Criterion) {
    let frame = shifted_pair();

    // Default pipeline: BT cost, box aggregation, all filters
    let mut stereo = StereoBase::new(Params::new(9, 0, 32)).unwrap();
    c.bench_function("local_stereo bt box", |b| {
        b.iter(|| stereo.compute(black_box(&frame)))
    });

    let mut params = Params::new(9, 0, 32);
    params.pixel_matching_method = PixelMatchingMethod::Census5x5;
    params.aggregation_method = AggregationMethod::Guided;
    let mut stereo = StereoBase::new(params).unwrap();
    c.bench_function("local_stereo census guided", |b| {
        b.iter(|| stereo.compute(black_box(&frame)))
    });
}

criterion_group!(benches, local_stereo_bench);
criterion_main!(benches);
