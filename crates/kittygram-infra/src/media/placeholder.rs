//! Placeholder image synthesis for seeded demo posts.

use image::codecs::jpeg::JpegEncoder;
use image::{ExtendedColorType, Rgb, RgbImage};
use rand::Rng;

use kittygram_core::error::MediaError;

/// Synthesize a placeholder JPEG: random 400-1200 px per side, a random
/// light background, and a contrasting horizontal band across the middle
/// where a caption would sit.
pub fn placeholder_jpeg<R: Rng>(rng: &mut R) -> Result<Vec<u8>, MediaError> {
    let width: u32 = rng.gen_range(400..=1200);
    let height: u32 = rng.gen_range(400..=1200);
    let color = Rgb([
        rng.gen_range(100..=255u8),
        rng.gen_range(100..=255u8),
        rng.gen_range(100..=255u8),
    ]);

    let mut img = RgbImage::from_pixel(width, height, color);

    let band_height = height / 8;
    let band_top = (height - band_height) / 2;
    for y in band_top..band_top + band_height {
        for x in 0..width {
            img.put_pixel(x, y, Rgb([255, 255, 255]));
        }
    }

    let mut buf = Vec::new();
    JpegEncoder::new_with_quality(&mut buf, 85)
        .encode(img.as_raw(), width, height, ExtendedColorType::Rgb8)
        .map_err(|e| MediaError::Io(e.to_string()))?;

    Ok(buf)
}
