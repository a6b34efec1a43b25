use image::{DynamicImage, GrayImage, Rgb, RgbImage};

/// Deterministic pseudo random bytes (64 bit LCG).
pub struct Lcg(u64);

impl Lcg {
    pub fn new(seed: u64) -> Self {
        Lcg(seed)
    }

    pub fn next_u8(&mut self) -> u8 {
        self.0 = self
            .0
            .wrapping_mul(6364136223846793005)
            .wrapping_add(1442695040888963407);
        (self.0 >> 56) as u8
    }
}

/// A textured gray pair where every left pixel `(x, y)` is seen in the right image at
/// `(x - shift, y)`. The leftmost `shift` columns of the left image have no match.
pub fn shifted_gray_pair(
    width: u32,
    height: u32,
    shift: u32,
    seed: u64,
) -> (DynamicImage, DynamicImage) {
    let canvas = texture(width + shift, height, seed);

    let left = GrayImage::from_fn(width, height, |x, y| image::Luma([canvas(x, y)]));
    let right = GrayImage::from_fn(width, height, |x, y| image::Luma([canvas(x + shift, y)]));

    (DynamicImage::ImageLuma8(left), DynamicImage::ImageLuma8(right))
}

/// Like [`shifted_gray_pair`], but the left half of the scene is a flat mid gray.
pub fn half_flat_gray_pair(
    width: u32,
    height: u32,
    shift: u32,
    seed: u64,
) -> (DynamicImage, DynamicImage) {
    let textured = texture(width + shift, height, seed);
    let canvas = |x: u32, y: u32| match x < width / 2 {
        true => 128,
        false => textured(x, y),
    };

    let left = GrayImage::from_fn(width, height, |x, y| image::Luma([canvas(x, y)]));
    let right = GrayImage::from_fn(width, height, |x, y| image::Luma([canvas(x + shift, y)]));

    (DynamicImage::ImageLuma8(left), DynamicImage::ImageLuma8(right))
}

/// Colour version of [`shifted_gray_pair`], channels are textured independently.
pub fn shifted_rgb_pair(
    width: u32,
    height: u32,
    shift: u32,
    seed: u64,
) -> (DynamicImage, DynamicImage) {
    let channels = [
        texture(width + shift, height, seed),
        texture(width + shift, height, seed.wrapping_add(1)),
        texture(width + shift, height, seed.wrapping_add(2)),
    ];
    let pixel = |x: u32, y: u32| Rgb([channels[0](x, y), channels[1](x, y), channels[2](x, y)]);

    let left = RgbImage::from_fn(width, height, |x, y| pixel(x, y));
    let right = RgbImage::from_fn(width, height, |x, y| pixel(x + shift, y));

    (DynamicImage::ImageRgb8(left), DynamicImage::ImageRgb8(right))
}

/// Random texture lookup over a `width x height` canvas.
fn texture(width: u32, height: u32, seed: u64) -> impl Fn(u32, u32) -> u8 {
    let mut rng = Lcg::new(seed);
    let data: Vec<u8> = (0..width * height).map(|_| rng.next_u8()).collect();
    move |x, y| data[(y * width + x) as usize]
}
