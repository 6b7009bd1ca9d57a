//! Image grids and whole-image color conversion
//!
//! [`SrgbImage`] holds interleaved RGB channels as f32, either on the
//! 0..=255 byte scale or normalized to 0.0..=1.0. [`LabImage`] holds one
//! [`Lab`] per pixel. Both are row-major.

use crate::color::{Lab, LinearRgb, Srgb};
use crate::error::ClusterError;

/// Interleaved RGB image with f32 channels, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct SrgbImage {
    width: usize,
    height: usize,
    data: Vec<f32>,
}

impl SrgbImage {
    /// Wrap interleaved channel data. `data.len()` must equal `width * height * 3`.
    pub fn new(width: usize, height: usize, data: Vec<f32>) -> Result<Self, ClusterError> {
        let expected = width * height * 3;
        if data.len() != expected {
            return Err(ClusterError::InvalidShape {
                expected,
                actual: data.len(),
            });
        }
        Ok(Self {
            width,
            height,
            data,
        })
    }

    /// Build from 8-bit RGB bytes. Channels keep the 0..=255 scale, so
    /// convert with `to_lab(&image, false)`.
    ///
    /// ```
    /// use lab_cluster::{to_lab, SrgbImage};
    /// let image = SrgbImage::from_bytes(1, 1, &[255, 255, 255]).unwrap();
    /// let lab = to_lab(&image, false).unwrap();
    /// assert!((lab.pixels()[0].l - 100.0).abs() < 0.01);
    /// ```
    pub fn from_bytes(width: usize, height: usize, bytes: &[u8]) -> Result<Self, ClusterError> {
        Self::new(width, height, bytes.iter().map(|&v| v as f32).collect())
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    /// Interleaved channel values.
    #[inline]
    pub fn data(&self) -> &[f32] {
        &self.data
    }

    /// Convert to RGB bytes. `normalized` states which scale the data is on.
    pub fn to_bytes(&self, normalized: bool) -> Vec<u8> {
        let scale = if normalized { 255.0 } else { 1.0 };
        self.data
            .iter()
            .map(|&v| (v * scale).round().clamp(0.0, 255.0) as u8)
            .collect()
    }
}

/// A grid of LAB pixels, row-major.
#[derive(Debug, Clone, PartialEq)]
pub struct LabImage {
    width: usize,
    height: usize,
    pixels: Vec<Lab>,
}

impl LabImage {
    /// Wrap LAB pixels. `pixels.len()` must equal `width * height`.
    pub fn new(width: usize, height: usize, pixels: Vec<Lab>) -> Result<Self, ClusterError> {
        let expected = width * height;
        if pixels.len() != expected {
            return Err(ClusterError::InvalidShape {
                expected,
                actual: pixels.len(),
            });
        }
        Ok(Self {
            width,
            height,
            pixels,
        })
    }

    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    #[inline]
    pub fn pixels(&self) -> &[Lab] {
        &self.pixels
    }

    /// Give up the grid and keep the pixel vector.
    pub fn into_pixels(self) -> Vec<Lab> {
        self.pixels
    }
}

/// Convert an RGB image to LAB (D65).
///
/// With `normalized = true` channels are read as 0.0..=1.0, otherwise as
/// 0..=255. Values outside the chosen range are not meaningful.
pub fn to_lab(image: &SrgbImage, normalized: bool) -> Result<LabImage, ClusterError> {
    let expected = image.width * image.height * 3;
    if image.data.len() != expected {
        return Err(ClusterError::InvalidShape {
            expected,
            actual: image.data.len(),
        });
    }

    let scale = if normalized { 1.0 } else { 1.0 / 255.0 };
    let pixels = image
        .data
        .chunks_exact(3)
        .map(|px| {
            let srgb = Srgb::new(px[0] * scale, px[1] * scale, px[2] * scale);
            Lab::from(LinearRgb::from(srgb))
        })
        .collect();

    LabImage::new(image.width, image.height, pixels)
}

/// Convert a LAB image back to normalized (0.0..=1.0) sRGB.
///
/// Out-of-gamut colors are clamped into the sRGB cube.
pub fn to_rgb(image: &LabImage) -> Result<SrgbImage, ClusterError> {
    let expected = image.width * image.height;
    if image.pixels.len() != expected {
        return Err(ClusterError::InvalidShape {
            expected,
            actual: image.pixels.len(),
        });
    }

    let mut data = Vec::with_capacity(expected * 3);
    for &lab in &image.pixels {
        let srgb = Srgb::from(LinearRgb::from(lab));
        data.extend_from_slice(&[srgb.r, srgb.g, srgb.b]);
    }

    SrgbImage::new(image.width, image.height, data)
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn gradient(width: usize, height: usize) -> SrgbImage {
        let mut data = Vec::with_capacity(width * height * 3);
        for y in 0..height {
            for x in 0..width {
                data.push(x as f32 / (width - 1) as f32);
                data.push(y as f32 / (height - 1) as f32);
                data.push(((x + y) % 7) as f32 / 6.0);
            }
        }
        SrgbImage::new(width, height, data).unwrap()
    }

    #[test]
    fn test_round_trip_normalized() {
        let image = gradient(16, 9);
        let lab = to_lab(&image, true).unwrap();
        let back = to_rgb(&lab).unwrap();

        assert_eq!(back.width(), 16);
        assert_eq!(back.height(), 9);
        for (i, (a, b)) in image.data().iter().zip(back.data()).enumerate() {
            assert!((a - b).abs() < 2e-3, "channel {i}: {a} vs {b}");
        }
    }

    #[test]
    fn test_byte_scale_matches_normalized() {
        let bytes = [10u8, 20, 30, 200, 100, 50];
        let raw = SrgbImage::from_bytes(2, 1, &bytes).unwrap();
        let normalized = SrgbImage::new(
            2,
            1,
            bytes.iter().map(|&v| v as f32 / 255.0).collect(),
        )
        .unwrap();

        let a = to_lab(&raw, false).unwrap();
        let b = to_lab(&normalized, true).unwrap();
        for (pa, pb) in a.pixels().iter().zip(b.pixels()) {
            assert!(pa.distance(*pb) < 1e-3);
        }
    }

    #[test]
    fn test_round_trip_bytes() {
        let bytes: Vec<u8> = (0..=255u8).step_by(5).flat_map(|v| [v, 255 - v, v / 2]).collect();
        let width = bytes.len() / 3;
        let image = SrgbImage::from_bytes(width, 1, &bytes).unwrap();
        let back = to_rgb(&to_lab(&image, false).unwrap()).unwrap().to_bytes(true);
        for (a, b) in bytes.iter().zip(&back) {
            assert!((*a as i32 - *b as i32).abs() <= 1, "{a} vs {b}");
        }
    }

    #[test]
    fn test_shape_mismatch_is_rejected() {
        let err = SrgbImage::new(2, 2, vec![0.0; 11]).unwrap_err();
        assert_eq!(
            err,
            ClusterError::InvalidShape {
                expected: 12,
                actual: 11
            }
        );

        let err = LabImage::new(3, 1, vec![Lab::default(); 2]).unwrap_err();
        assert_eq!(
            err,
            ClusterError::InvalidShape {
                expected: 3,
                actual: 2
            }
        );
    }

    #[test]
    fn test_to_bytes_scales() {
        let image = SrgbImage::new(1, 1, vec![1.0, 0.5, 0.0]).unwrap();
        assert_eq!(image.to_bytes(true), vec![255, 128, 0]);

        let image = SrgbImage::new(1, 1, vec![300.0, 12.4, -3.0]).unwrap();
        assert_eq!(image.to_bytes(false), vec![255, 12, 0]);
    }

    #[test]
    fn test_empty_image_converts() {
        let image = SrgbImage::new(0, 0, Vec::new()).unwrap();
        let lab = to_lab(&image, true).unwrap();
        assert!(lab.pixels().is_empty());
    }
}
