//! Generated image fixtures and record builders.

use image::{DynamicImage, ImageFormat, Rgb, RgbImage};
use playlist_palette::models::SourceRecord;
use std::io::Cursor;

pub const RED: [u8; 3] = [220, 30, 40];
pub const GREEN: [u8; 3] = [40, 180, 60];
pub const BLUE: [u8; 3] = [30, 50, 200];

/// PNG bytes of a solid-color image
pub fn solid_png(width: u32, height: u32, rgb: [u8; 3]) -> Vec<u8> {
    encode(RgbImage::from_pixel(width, height, Rgb(rgb)))
}

/// PNG bytes of a small 2-D gradient around `base`
pub fn gradient_png(width: u32, height: u32, base: [u8; 3]) -> Vec<u8> {
    let image = RgbImage::from_fn(width, height, |x, y| {
        Rgb([
            base[0].saturating_add((x * 2) as u8),
            base[1].saturating_add((y * 2) as u8),
            base[2],
        ])
    });
    encode(image)
}

fn encode(image: RgbImage) -> Vec<u8> {
    let mut buf = Cursor::new(Vec::new());
    DynamicImage::ImageRgb8(image)
        .write_to(&mut buf, ImageFormat::Png)
        .unwrap();
    buf.into_inner()
}

/// Record whose cover lives at `url`
pub fn record(id: &str, url: impl Into<String>) -> SourceRecord {
    SourceRecord::new(
        id,
        format!("Track {id}"),
        vec!["Artist".to_string()],
        url,
    )
}
