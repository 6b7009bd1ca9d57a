//! Linear RGB color type
//!
//! Light-proportional RGB. This is the space the CIE XYZ matrices operate in.

use super::lut::srgb_to_linear;
use super::srgb::Srgb;

/// A color in linear-light RGB.
///
/// In-gamut values lie in 0.0..=1.0; conversions back from LAB may leave
/// that range for colors the sRGB gamut cannot show.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct LinearRgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl LinearRgb {
    #[inline]
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }
}

impl From<Srgb> for LinearRgb {
    fn from(srgb: Srgb) -> Self {
        Self {
            r: srgb_to_linear(srgb.r),
            g: srgb_to_linear(srgb.g),
            b: srgb_to_linear(srgb.b),
        }
    }
}
