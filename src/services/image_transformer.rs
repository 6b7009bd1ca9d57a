use crate::error::ImageError;
use crate::models::Shape;
use image::DynamicImage;
use lab_cluster::{resample, to_lab, LabImage, SrgbImage};
use std::time::Duration;

/// Decoded cover: 8-bit RGB, height x width x 3
pub type RawImage = image::RgbImage;

/// Downloads album covers and turns them into fixed-size LAB images
#[derive(Clone)]
pub struct ImageTransformer {
    client: reqwest::Client,
}

impl ImageTransformer {
    pub fn new(timeout: Duration) -> Result<Self, ImageError> {
        let client = reqwest::Client::builder()
            .timeout(timeout)
            .build()
            .map_err(ImageError::Client)?;
        Ok(Self { client })
    }

    /// GET the body; any non-success status is a fetch failure
    pub async fn fetch_bytes(&self, url: &str) -> Result<Vec<u8>, ImageError> {
        let fetch_err = |source| ImageError::Fetch {
            url: url.to_string(),
            source,
        };

        let response = self.client.get(url).send().await.map_err(fetch_err)?;
        let status = response.status();
        if !status.is_success() {
            return Err(ImageError::HttpStatus {
                url: url.to_string(),
                status: status.as_u16(),
            });
        }

        let bytes = response.bytes().await.map_err(fetch_err)?;
        Ok(bytes.to_vec())
    }

    /// Download and decode one image
    pub async fn fetch(&self, url: &str) -> Result<RawImage, ImageError> {
        let bytes = self.fetch_bytes(url).await?;
        tokio::task::spawn_blocking(move || decode(&bytes))
            .await
            .map_err(|e| ImageError::Join(e.to_string()))?
    }

    /// Download, decode and transform, keeping the decoded original
    ///
    /// Decoding and resampling run on the blocking pool.
    pub async fn fetch_and_transform(
        &self,
        url: &str,
        shape: Shape,
    ) -> Result<(RawImage, LabImage), ImageError> {
        let bytes = self.fetch_bytes(url).await?;
        tokio::task::spawn_blocking(move || -> Result<_, ImageError> {
            let raw = decode(&bytes)?;
            let lab = transform(&raw, shape)?;
            Ok((raw, lab))
        })
        .await
        .map_err(|e| ImageError::Join(e.to_string()))?
    }
}

/// Decode and normalize to 3 channels
///
/// Grayscale is replicated and alpha dropped; other layouts are rejected.
pub fn decode(bytes: &[u8]) -> Result<RawImage, ImageError> {
    let image = image::load_from_memory(bytes)?;
    normalize_channels(image)
}

fn normalize_channels(image: DynamicImage) -> Result<RawImage, ImageError> {
    match image.color().channel_count() {
        1 | 3 | 4 => Ok(image.to_rgb8()),
        channels => Err(ImageError::UnsupportedFormat { channels }),
    }
}

/// Convert to LAB, then resample to `shape` without clamping
pub fn transform(raw: &RawImage, shape: Shape) -> Result<LabImage, ImageError> {
    let srgb = SrgbImage::from_bytes(raw.width() as usize, raw.height() as usize, raw.as_raw())?;
    let lab = to_lab(&srgb, false)?;
    Ok(resample(&lab, shape.width, shape.height)?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use image::{GrayImage, ImageFormat, Luma, LumaA, Rgba, RgbaImage};
    use std::io::Cursor;

    fn encode(image: DynamicImage) -> Vec<u8> {
        let mut buf = Cursor::new(Vec::new());
        image.write_to(&mut buf, ImageFormat::Png).unwrap();
        buf.into_inner()
    }

    #[test]
    fn test_decode_grayscale_replicates_channel() {
        let gray = GrayImage::from_pixel(3, 2, Luma([77]));
        let raw = decode(&encode(DynamicImage::ImageLuma8(gray))).unwrap();

        assert_eq!((raw.width(), raw.height()), (3, 2));
        assert!(raw.pixels().all(|p| p.0 == [77, 77, 77]));
    }

    #[test]
    fn test_decode_drops_alpha() {
        let rgba = RgbaImage::from_pixel(2, 2, Rgba([10, 20, 30, 0]));
        let raw = decode(&encode(DynamicImage::ImageRgba8(rgba))).unwrap();

        assert!(raw.pixels().all(|p| p.0 == [10, 20, 30]));
    }

    #[test]
    fn test_two_channel_is_unsupported() {
        let image = DynamicImage::ImageLumaA8(image::ImageBuffer::from_pixel(2, 2, LumaA([5, 255])));
        let result = normalize_channels(image);

        assert!(matches!(
            result,
            Err(ImageError::UnsupportedFormat { channels: 2 })
        ));
    }

    #[test]
    fn test_decode_garbage_fails() {
        let result = decode(b"definitely not an image");
        assert!(matches!(result, Err(ImageError::Decode(_))));
    }

    #[test]
    fn test_transform_shape() {
        let raw = RawImage::from_pixel(40, 30, image::Rgb([200, 100, 50]));
        let lab = transform(&raw, Shape::new(8, 4)).unwrap();

        assert_eq!((lab.width(), lab.height()), (8, 4));
        assert_eq!(lab.pixels().len(), 32);
        // Lightness of a mid orange, far outside 0..1
        assert!(lab.pixels()[0].l > 50.0);
    }
}
