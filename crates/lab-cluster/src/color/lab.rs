//! CIE L*a*b* color space (D65 white point)
//!
//! Conversion goes through CIE XYZ using the sRGB primaries. Euclidean
//! distance in this space approximates perceived color difference, which is
//! what the clustering relies on.
//!
//! # References
//!
//! Bruce Lindbloom, "RGB/XYZ Matrices" and "Lab to XYZ"
//! <http://www.brucelindbloom.com/>

use super::linear_rgb::LinearRgb;

/// D65 reference white, Y normalized to 1.0.
const WHITE_X: f32 = 0.950_47;
const WHITE_Y: f32 = 1.0;
const WHITE_Z: f32 = 1.088_83;

/// (6/29)^3: below this the cube-root segment switches to the linear one.
const EPSILON: f32 = 216.0 / 24389.0;
/// (29/3)^3 / 116, slope of the linear segment of f(t).
const LINEAR_SLOPE: f32 = 24389.0 / 27.0 / 116.0;
const DELTA: f32 = 6.0 / 29.0;

/// A color in CIE L*a*b*.
///
/// - `l`: lightness, 0.0 (black) to 100.0 (white)
/// - `a`: green (negative) to red (positive)
/// - `b`: blue (negative) to yellow (positive)
///
/// Values are never clamped; means of LAB colors and resampled pixels
/// stay in LAB until converted back to sRGB.
#[derive(Debug, Clone, Copy, PartialEq, Default)]
pub struct Lab {
    pub l: f32,
    pub a: f32,
    pub b: f32,
}

impl Lab {
    #[inline]
    pub fn new(l: f32, a: f32, b: f32) -> Self {
        Self { l, a, b }
    }

    /// Squared Euclidean distance.
    ///
    /// ```
    /// use lab_cluster::Lab;
    /// let d = Lab::new(50.0, 0.0, 0.0).distance_squared(Lab::new(53.0, 4.0, 0.0));
    /// assert_eq!(d, 25.0);
    /// ```
    #[inline]
    pub fn distance_squared(self, other: Lab) -> f32 {
        let dl = self.l - other.l;
        let da = self.a - other.a;
        let db = self.b - other.b;
        dl.mul_add(dl, da.mul_add(da, db * db))
    }

    /// Euclidean distance (CIE76 ΔE).
    #[inline]
    pub fn distance(self, other: Lab) -> f32 {
        self.distance_squared(other).sqrt()
    }
}

#[inline]
fn f(t: f32) -> f32 {
    if t > EPSILON {
        t.cbrt()
    } else {
        LINEAR_SLOPE * t + 16.0 / 116.0
    }
}

#[inline]
fn f_inv(v: f32) -> f32 {
    if v > DELTA {
        v * v * v
    } else {
        3.0 * DELTA * DELTA * (v - 4.0 / 29.0)
    }
}

impl From<LinearRgb> for Lab {
    fn from(rgb: LinearRgb) -> Self {
        let x = 0.412_456_4 * rgb.r + 0.357_576_1 * rgb.g + 0.180_437_5 * rgb.b;
        let y = 0.212_672_9 * rgb.r + 0.715_152_2 * rgb.g + 0.072_175 * rgb.b;
        let z = 0.019_333_9 * rgb.r + 0.119_192 * rgb.g + 0.950_304_1 * rgb.b;

        let fx = f(x / WHITE_X);
        let fy = f(y / WHITE_Y);
        let fz = f(z / WHITE_Z);

        Lab {
            l: 116.0 * fy - 16.0,
            a: 500.0 * (fx - fy),
            b: 200.0 * (fy - fz),
        }
    }
}

impl From<Lab> for LinearRgb {
    /// The result is not clamped: out-of-gamut LAB colors produce channels
    /// outside 0.0..=1.0.
    fn from(lab: Lab) -> Self {
        let fy = (lab.l + 16.0) / 116.0;
        let fx = fy + lab.a / 500.0;
        let fz = fy - lab.b / 200.0;

        let x = f_inv(fx) * WHITE_X;
        let y = f_inv(fy) * WHITE_Y;
        let z = f_inv(fz) * WHITE_Z;

        LinearRgb {
            r: 3.240_454_2 * x - 1.537_138_5 * y - 0.498_531_4 * z,
            g: -0.969_266 * x + 1.876_010_8 * y + 0.041_556 * z,
            b: 0.055_643_4 * x - 0.204_025_9 * y + 1.057_225_2 * z,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::color::Srgb;

    const PALETTE_TOLERANCE: f32 = 0.05;

    fn primaries() -> [(f32, f32, f32); 8] {
        [
            (1.0, 0.0, 0.0),
            (0.0, 1.0, 0.0),
            (0.0, 0.0, 1.0),
            (1.0, 1.0, 0.0),
            (0.5, 0.5, 0.5),
            (0.2, 0.6, 0.9),
            (1.0, 1.0, 1.0),
            (0.0, 0.0, 0.0),
        ]
    }

    #[test]
    fn test_lab_matches_palette_crate() {
        use palette::{FromColor, Lab as PaletteLab, LinSrgb};

        for (r, g, b) in primaries() {
            let ours = Lab::from(LinearRgb::new(r, g, b));
            let theirs: PaletteLab = PaletteLab::from_color(LinSrgb::new(r, g, b));

            assert!(
                (ours.l - theirs.l).abs() < PALETTE_TOLERANCE,
                "L mismatch for ({r}, {g}, {b}): ours={}, palette={}",
                ours.l,
                theirs.l
            );
            assert!(
                (ours.a - theirs.a).abs() < PALETTE_TOLERANCE,
                "a mismatch for ({r}, {g}, {b}): ours={}, palette={}",
                ours.a,
                theirs.a
            );
            assert!(
                (ours.b - theirs.b).abs() < PALETTE_TOLERANCE,
                "b mismatch for ({r}, {g}, {b}): ours={}, palette={}",
                ours.b,
                theirs.b
            );
        }
    }

    #[test]
    fn test_known_values() {
        let white = Lab::from(LinearRgb::new(1.0, 1.0, 1.0));
        assert!((white.l - 100.0).abs() < 0.01, "white L = {}", white.l);
        assert!(white.a.abs() < 0.01 && white.b.abs() < 0.01);

        let black = Lab::from(LinearRgb::new(0.0, 0.0, 0.0));
        assert!(black.l.abs() < 1e-4 && black.a.abs() < 1e-4 && black.b.abs() < 1e-4);

        // sRGB red: L 53.24, a 80.09, b 67.20
        let red = Lab::from(LinearRgb::new(1.0, 0.0, 0.0));
        assert!((red.l - 53.24).abs() < 0.05, "red L = {}", red.l);
        assert!((red.a - 80.09).abs() < 0.05, "red a = {}", red.a);
        assert!((red.b - 67.20).abs() < 0.05, "red b = {}", red.b);
    }

    #[test]
    fn test_linear_round_trip() {
        for (r, g, b) in primaries() {
            let back = LinearRgb::from(Lab::from(LinearRgb::new(r, g, b)));
            assert!((back.r - r).abs() < 1e-4, "r {r} -> {}", back.r);
            assert!((back.g - g).abs() < 1e-4, "g {g} -> {}", back.g);
            assert!((back.b - b).abs() < 1e-4, "b {b} -> {}", back.b);
        }
    }

    #[test]
    fn test_dark_colors_use_linear_segment() {
        // Very dark colors fall below EPSILON and must still round-trip
        let dark = LinearRgb::new(0.001, 0.002, 0.0005);
        let back = LinearRgb::from(Lab::from(dark));
        assert!((back.r - dark.r).abs() < 1e-5);
        assert!((back.g - dark.g).abs() < 1e-5);
        assert!((back.b - dark.b).abs() < 1e-5);
    }

    #[test]
    fn test_srgb_bytes_round_trip() {
        for bytes in [[255, 128, 64], [12, 200, 99], [0, 0, 255], [250, 250, 250]] {
            let srgb = Srgb::from_u8(bytes[0], bytes[1], bytes[2]);
            let back = Srgb::from(LinearRgb::from(Lab::from(LinearRgb::from(srgb))));
            let out = back.to_bytes();
            for c in 0..3 {
                assert!(
                    (out[c] as i32 - bytes[c] as i32).abs() <= 1,
                    "{bytes:?} came back as {out:?}"
                );
            }
        }
    }

    #[test]
    fn test_distance() {
        let a = Lab::new(10.0, 20.0, 30.0);
        let b = Lab::new(13.0, 24.0, 30.0);
        assert_eq!(a.distance_squared(b), 25.0);
        assert_eq!(a.distance(b), 5.0);
        assert_eq!(a.distance_squared(a), 0.0);
    }
}
