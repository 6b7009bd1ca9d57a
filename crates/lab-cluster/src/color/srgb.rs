//! sRGB color type
//!
//! Gamma-encoded RGB as stored in image files. Channels are kept as f32 in
//! 0.0..=1.0; byte conversion happens only at the edges.

use super::linear_rgb::LinearRgb;
use super::lut::linear_to_srgb;

/// A color in gamma-encoded sRGB space, channels in 0.0..=1.0.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Srgb {
    pub r: f32,
    pub g: f32,
    pub b: f32,
}

impl Srgb {
    #[inline]
    pub fn new(r: f32, g: f32, b: f32) -> Self {
        Self { r, g, b }
    }

    /// Create an sRGB color from 8-bit channels.
    ///
    /// ```
    /// use lab_cluster::Srgb;
    /// let red = Srgb::from_u8(255, 0, 0);
    /// assert_eq!(red.r, 1.0);
    /// assert_eq!(red.g, 0.0);
    /// ```
    #[inline]
    pub fn from_u8(r: u8, g: u8, b: u8) -> Self {
        Self {
            r: r as f32 / 255.0,
            g: g as f32 / 255.0,
            b: b as f32 / 255.0,
        }
    }

    /// Convert to `[R, G, B]` bytes, rounding and clamping to 0..=255.
    #[inline]
    pub fn to_bytes(self) -> [u8; 3] {
        [
            (self.r * 255.0).round().clamp(0.0, 255.0) as u8,
            (self.g * 255.0).round().clamp(0.0, 255.0) as u8,
            (self.b * 255.0).round().clamp(0.0, 255.0) as u8,
        ]
    }

    /// Format as `#RRGGBB`.
    ///
    /// ```
    /// use lab_cluster::Srgb;
    /// assert_eq!(Srgb::from_u8(255, 128, 0).to_hex(), "#FF8000");
    /// ```
    pub fn to_hex(self) -> String {
        let [r, g, b] = self.to_bytes();
        format!("#{r:02X}{g:02X}{b:02X}")
    }
}

impl From<LinearRgb> for Srgb {
    /// Gamma-encode linear light. Channels outside 0.0..=1.0 are clamped
    /// into gamut by the lookup.
    fn from(linear: LinearRgb) -> Self {
        Self {
            r: linear_to_srgb(linear.r),
            g: linear_to_srgb(linear.g),
            b: linear_to_srgb(linear.b),
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_from_u8_scales_to_unit_range() {
        let c = Srgb::from_u8(0, 51, 255);
        assert_eq!(c.r, 0.0);
        assert!((c.g - 0.2).abs() < 1e-6);
        assert_eq!(c.b, 1.0);
    }

    #[test]
    fn test_to_bytes_clamps() {
        let c = Srgb::new(1.2, -0.1, 0.5);
        assert_eq!(c.to_bytes(), [255, 0, 128]);
    }

    #[test]
    fn test_bytes_round_trip() {
        for v in [0u8, 1, 17, 128, 200, 254, 255] {
            assert_eq!(Srgb::from_u8(v, v, v).to_bytes(), [v, v, v]);
        }
    }

    #[test]
    fn test_to_hex() {
        assert_eq!(Srgb::from_u8(0, 0, 0).to_hex(), "#000000");
        assert_eq!(Srgb::from_u8(18, 52, 86).to_hex(), "#123456");
    }

    #[test]
    fn test_out_of_gamut_linear_is_clamped() {
        let c = Srgb::from(LinearRgb::new(1.5, -0.2, 0.0));
        assert_eq!(c.to_bytes(), [255, 0, 0]);
    }
}
