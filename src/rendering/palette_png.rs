use crate::error::RenderError;
use lab_cluster::PaletteImage;

/// Encode a palette bitmap as PNG.
///
/// Up to 256 bands are written as an indexed image with one PLTE entry per
/// band; more fall back to 8-bit RGB. The result is recompressed with
/// oxipng, keeping the fast encoding if that fails.
pub fn encode_png(image: &PaletteImage) -> Result<Vec<u8>, RenderError> {
    let width = u32::try_from(image.width())
        .map_err(|_| RenderError::PngEncode(format!("width {} too large", image.width())))?;
    let height = u32::try_from(image.height())
        .map_err(|_| RenderError::PngEncode(format!("height {} too large", image.height())))?;

    let png_bytes = if image.bands().len() <= 256 {
        let (plte, indices) = indexed(image);
        encode(width, height, png::ColorType::Indexed, Some(&plte), &indices)?
    } else {
        encode(width, height, png::ColorType::Rgb, None, &image.to_rgb_bytes())?
    };

    let optimized = oxipng::optimize_from_memory(
        &png_bytes,
        &oxipng::Options {
            strip: oxipng::StripChunks::Safe,
            ..Default::default()
        },
    )
    .unwrap_or(png_bytes);
    Ok(optimized)
}

/// PLTE bytes and one band index per pixel, row-major
fn indexed(image: &PaletteImage) -> (Vec<u8>, Vec<u8>) {
    let plte: Vec<u8> = image
        .bands()
        .iter()
        .flat_map(|band| band.color.to_bytes())
        .collect();

    let mut row = Vec::with_capacity(image.width());
    for (index, band) in image.bands().iter().enumerate() {
        row.extend(std::iter::repeat(index as u8).take(band.width()));
    }
    (plte, row.repeat(image.height()))
}

fn encode(
    width: u32,
    height: u32,
    color_type: png::ColorType,
    plte: Option<&[u8]>,
    data: &[u8],
) -> Result<Vec<u8>, RenderError> {
    let mut buf = Vec::new();
    {
        let mut encoder = png::Encoder::new(&mut buf, width, height);
        encoder.set_color(color_type);
        encoder.set_depth(png::BitDepth::Eight);
        encoder.set_compression(png::Compression::Fast);
        if let Some(plte) = plte {
            encoder.set_palette(plte);
        }
        let mut writer = encoder
            .write_header()
            .map_err(|e| RenderError::PngEncode(e.to_string()))?;
        writer
            .write_image_data(data)
            .map_err(|e| RenderError::PngEncode(e.to_string()))?;
    }
    Ok(buf)
}

#[cfg(test)]
mod tests {
    use super::*;
    use lab_cluster::{KMeans, Lab};

    fn palette_image(width: usize, height: usize) -> PaletteImage {
        let mut pixels = vec![Lab::new(53.2, 80.1, 67.2); 3];
        pixels.push(Lab::new(32.3, 79.2, -107.9));
        let result = KMeans::new(2).cluster(&pixels).unwrap();
        lab_cluster::palette::render(&result, width, height).unwrap()
    }

    fn decode(bytes: &[u8]) -> image::RgbImage {
        image::load_from_memory(bytes).unwrap().to_rgb8()
    }

    #[test]
    fn test_png_signature_and_size() {
        let png = encode_png(&palette_image(20, 5)).unwrap();

        assert_eq!(&png[..8], b"\x89PNG\r\n\x1a\n");
        let decoded = decode(&png);
        assert_eq!((decoded.width(), decoded.height()), (20, 5));
    }

    #[test]
    fn test_png_pixels_match_bands() {
        let image = palette_image(8, 3);
        let decoded = decode(&encode_png(&image).unwrap());

        let expected = image.to_rgb_bytes();
        assert_eq!(decoded.as_raw(), &expected);
        // The 3/4 cluster takes the left six columns
        assert_eq!(image.bands()[0].width(), 6);
        assert_eq!(decoded.get_pixel(0, 0), decoded.get_pixel(5, 2));
        assert_ne!(decoded.get_pixel(5, 0), decoded.get_pixel(6, 0));
    }

    #[test]
    fn test_indexed_layout() {
        let image = palette_image(4, 2);
        let (plte, indices) = indexed(&image);

        assert_eq!(plte.len(), 6);
        assert_eq!(indices, vec![0, 0, 0, 1, 0, 0, 0, 1]);
    }
}
