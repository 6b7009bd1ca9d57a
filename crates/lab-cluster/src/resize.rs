//! Anti-aliased resampling of LAB images
//!
//! A separable triangle (tent) filter whose support widens with the
//! downscale factor, so every source pixel contributes when shrinking.
//! Output values are convex combinations of input values and are never
//! clamped: L stays in 0..=100 and a/b keep their sign.

use crate::color::Lab;
use crate::error::ClusterError;
use crate::image::LabImage;

/// Source index and normalized weight for one output sample.
type Taps = Vec<(usize, f32)>;

/// Precompute the filter taps mapping `src_len` samples onto `dst_len`.
fn filter_taps(src_len: usize, dst_len: usize) -> Vec<Taps> {
    let scale = src_len as f32 / dst_len as f32;
    let support = scale.max(1.0);
    let last = (src_len - 1) as isize;

    (0..dst_len)
        .map(|o| {
            let center = (o as f32 + 0.5) * scale - 0.5;
            let first = (center - support).ceil() as isize;
            let end = (center + support).floor() as isize;

            let mut taps: Taps = Vec::new();
            let mut total = 0.0f32;
            for i in first..=end {
                let weight = 1.0 - ((i as f32 - center) / support).abs();
                if weight <= 0.0 {
                    continue;
                }
                // Edge pixels are replicated past the border
                let index = i.clamp(0, last) as usize;
                match taps.last_mut() {
                    Some((prev, w)) if *prev == index => *w += weight,
                    _ => taps.push((index, weight)),
                }
                total += weight;
            }
            for (_, w) in &mut taps {
                *w /= total;
            }
            taps
        })
        .collect()
}

#[inline]
fn weighted_sum(samples: impl Iterator<Item = (Lab, f32)>) -> Lab {
    let (mut l, mut a, mut b) = (0.0f32, 0.0f32, 0.0f32);
    for (px, w) in samples {
        l += px.l * w;
        a += px.a * w;
        b += px.b * w;
    }
    Lab::new(l, a, b)
}

/// Resample `image` to `width` × `height`.
///
/// Same-size resampling returns an identical image.
///
/// # Errors
///
/// [`ClusterError::InvalidParameter`] if either the source or the target
/// has a zero dimension.
pub fn resample(image: &LabImage, width: usize, height: usize) -> Result<LabImage, ClusterError> {
    if width == 0 || height == 0 {
        return Err(ClusterError::InvalidParameter {
            name: "target_shape",
            reason: format!("{}x{} has a zero dimension", width, height),
        });
    }
    let (src_w, src_h) = (image.width(), image.height());
    if src_w == 0 || src_h == 0 {
        return Err(ClusterError::InvalidParameter {
            name: "image",
            reason: format!("source {}x{} has no pixels", src_w, src_h),
        });
    }
    if src_w == width && src_h == height {
        return Ok(image.clone());
    }

    let src = image.pixels();

    // Horizontal pass: src_h rows of `width` pixels
    let x_taps = filter_taps(src_w, width);
    let mut rows = Vec::with_capacity(src_h * width);
    for y in 0..src_h {
        let row = &src[y * src_w..(y + 1) * src_w];
        rows.extend(
            x_taps
                .iter()
                .map(|taps| weighted_sum(taps.iter().map(|&(i, w)| (row[i], w)))),
        );
    }

    // Vertical pass
    let y_taps = filter_taps(src_h, height);
    let mut out = Vec::with_capacity(width * height);
    for taps in &y_taps {
        for x in 0..width {
            out.push(weighted_sum(
                taps.iter().map(|&(y, w)| (rows[y * width + x], w)),
            ));
        }
    }

    LabImage::new(width, height, out)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn image_from(width: usize, height: usize, f: impl Fn(usize, usize) -> Lab) -> LabImage {
        let mut pixels = Vec::with_capacity(width * height);
        for y in 0..height {
            for x in 0..width {
                pixels.push(f(x, y));
            }
        }
        LabImage::new(width, height, pixels).unwrap()
    }

    #[test]
    fn test_taps_are_normalized() {
        for (src, dst) in [(256, 64), (10, 3), (3, 10), (7, 7), (1, 5)] {
            for taps in filter_taps(src, dst) {
                let sum: f32 = taps.iter().map(|&(_, w)| w).sum();
                assert!((sum - 1.0).abs() < 1e-5, "{src}->{dst}: sum {sum}");
                assert!(taps.iter().all(|&(i, _)| i < src));
            }
        }
    }

    #[test]
    fn test_same_size_is_identity() {
        let image = image_from(5, 4, |x, y| Lab::new(x as f32 * 10.0, y as f32, -3.0));
        assert_eq!(resample(&image, 5, 4).unwrap(), image);
    }

    #[test]
    fn test_constant_image_stays_constant() {
        let color = Lab::new(42.0, -17.5, 33.0);
        let image = image_from(37, 23, |_, _| color);
        for (w, h) in [(8, 8), (256, 256), (1, 1), (40, 5)] {
            let out = resample(&image, w, h).unwrap();
            assert_eq!(out.pixels().len(), w * h);
            for px in out.pixels() {
                assert!(px.distance(color) < 1e-3, "{w}x{h}: {px:?}");
            }
        }
    }

    #[test]
    fn test_halving_averages_blocks() {
        // 2x2 -> 1x1 averages all four pixels
        let image = image_from(2, 2, |x, y| Lab::new((x + 2 * y) as f32 * 10.0, 0.0, 0.0));
        let out = resample(&image, 1, 1).unwrap();
        assert!((out.pixels()[0].l - 15.0).abs() < 1e-4);
    }

    #[test]
    fn test_preserves_lab_range() {
        // Alternating extremes must not be clamped to 0..1 or lose sign
        let image = image_from(64, 64, |x, y| {
            if (x + y) % 2 == 0 {
                Lab::new(100.0, -80.0, -100.0)
            } else {
                Lab::new(0.0, 90.0, 60.0)
            }
        });
        let out = resample(&image, 16, 16).unwrap();
        for px in out.pixels() {
            assert!(px.l > 1.0 && px.l <= 100.0, "L {}", px.l);
            assert!(px.a >= -80.0 && px.a <= 90.0);
            assert!(px.b >= -100.0 && px.b <= 60.0);
        }

        let bright = image_from(4, 4, |_, _| Lab::new(95.0, -60.0, -70.0));
        let px = resample(&bright, 2, 2).unwrap().pixels()[0];
        assert!(px.l > 90.0 && px.a < -50.0 && px.b < -60.0);
    }

    #[test]
    fn test_upscale_interpolates() {
        let image = image_from(2, 1, |x, _| Lab::new(x as f32 * 100.0, 0.0, 0.0));
        let out = resample(&image, 4, 1).unwrap();
        let l: Vec<f32> = out.pixels().iter().map(|p| p.l).collect();
        // Monotone ramp between the two source values
        assert!(l.windows(2).all(|w| w[0] <= w[1]), "{l:?}");
        assert!(l[0] >= 0.0 && l[3] <= 100.0);
    }

    #[test]
    fn test_zero_target_is_rejected() {
        let image = image_from(2, 2, |_, _| Lab::default());
        assert!(matches!(
            resample(&image, 0, 4),
            Err(ClusterError::InvalidParameter { name: "target_shape", .. })
        ));
    }
}
