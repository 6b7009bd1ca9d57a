//! Gamma lookup tables
//!
//! Both tables are generated by build.rs from the IEC 61966-2-1 transfer
//! functions and sampled with linear interpolation between neighbours.

include!(concat!(env!("OUT_DIR"), "/gamma_lut.rs"));

#[inline]
fn interpolate(table: &[f32], value: f32) -> f32 {
    // Out-of-range inputs are clamped; callers only feed 0.0..=1.0.
    let scaled = value.clamp(0.0, 1.0) * LUT_LAST as f32;
    let index = scaled as usize;
    if index >= LUT_LAST {
        return table[LUT_LAST];
    }
    let frac = scaled - index as f32;
    let lo = table[index];
    lo + (table[index + 1] - lo) * frac
}

/// Decode one gamma-encoded sRGB channel (0.0..=1.0) to linear light.
#[inline]
pub fn srgb_to_linear(srgb: f32) -> f32 {
    interpolate(&SRGB_TO_LINEAR, srgb)
}

/// Encode one linear-light channel (0.0..=1.0) to gamma-encoded sRGB.
#[inline]
pub fn linear_to_srgb(linear: f32) -> f32 {
    interpolate(&LINEAR_TO_SRGB, linear)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn exact_decode(v: f32) -> f32 {
        if v <= 0.04045 {
            v / 12.92
        } else {
            ((v + 0.055) / 1.055).powf(2.4)
        }
    }

    #[test]
    fn test_endpoints() {
        assert!(srgb_to_linear(0.0).abs() < 1e-7);
        assert!((srgb_to_linear(1.0) - 1.0).abs() < 1e-6);
        assert!(linear_to_srgb(0.0).abs() < 1e-7);
        assert!((linear_to_srgb(1.0) - 1.0).abs() < 1e-6);
    }

    #[test]
    fn test_decode_matches_formula() {
        for i in 0..=255u8 {
            let v = i as f32 / 255.0;
            let diff = (srgb_to_linear(v) - exact_decode(v)).abs();
            assert!(diff < 1e-5, "decode({i}) off by {diff}");
        }
    }

    #[test]
    fn test_out_of_range_is_clamped() {
        assert_eq!(srgb_to_linear(-0.5), srgb_to_linear(0.0));
        assert_eq!(linear_to_srgb(1.7), linear_to_srgb(1.0));
    }

    #[test]
    fn test_round_trip_within_one_step() {
        for i in 0..=255u8 {
            let v = i as f32 / 255.0;
            let back = linear_to_srgb(srgb_to_linear(v));
            assert!(
                ((back * 255.0).round() as i32 - i as i32).abs() <= 1,
                "channel {i} came back as {back}"
            );
        }
    }
}
