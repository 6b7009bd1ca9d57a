//! Proportional color-band rendering

use crate::color::Srgb;
use crate::error::ClusterError;
use crate::kmeans::ClusterResult;

use super::Palette;

/// One vertical band: columns `start..end` filled with `color`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Band {
    pub color: Srgb,
    pub start: usize,
    pub end: usize,
}

impl Band {
    #[inline]
    pub fn width(&self) -> usize {
        self.end - self.start
    }
}

/// A rendered palette bar.
///
/// Bands are contiguous, in palette order, and together cover every column.
#[derive(Debug, Clone, PartialEq)]
pub struct PaletteImage {
    width: usize,
    height: usize,
    bands: Vec<Band>,
}

impl PaletteImage {
    #[inline]
    pub fn width(&self) -> usize {
        self.width
    }

    #[inline]
    pub fn height(&self) -> usize {
        self.height
    }

    pub fn bands(&self) -> &[Band] {
        &self.bands
    }

    /// Color of every column, left to right.
    pub fn column_colors(&self) -> Vec<Srgb> {
        let mut columns = Vec::with_capacity(self.width);
        for band in &self.bands {
            columns.extend(std::iter::repeat(band.color).take(band.width()));
        }
        columns
    }

    /// Interleaved RGB bytes, row-major, 3 bytes per pixel.
    pub fn to_rgb_bytes(&self) -> Vec<u8> {
        let row: Vec<u8> = self
            .column_colors()
            .into_iter()
            .flat_map(Srgb::to_bytes)
            .collect();
        row.repeat(self.height)
    }
}

/// Column boundaries for the given proportions.
///
/// Each boundary is the rounded cumulative proportion times `width`, kept
/// monotone; the last one is pinned to `width` so rounding never leaves
/// columns uncovered.
fn band_edges(proportions: &[f64], width: usize) -> Vec<usize> {
    let mut edges = Vec::with_capacity(proportions.len());
    let mut cumulative = 0.0f64;
    let mut prev = 0usize;
    for &p in proportions {
        cumulative += p;
        let edge = ((cumulative * width as f64).round() as usize).clamp(prev, width);
        edges.push(edge);
        prev = edge;
    }
    if let Some(last) = edges.last_mut() {
        *last = width;
    }
    edges
}

impl Palette {
    /// Render the palette as `width` × `height` vertical bands.
    ///
    /// # Errors
    ///
    /// [`ClusterError::InvalidParameter`] for a zero dimension or an empty
    /// palette.
    pub fn render(&self, width: usize, height: usize) -> Result<PaletteImage, ClusterError> {
        if width == 0 || height == 0 {
            return Err(ClusterError::InvalidParameter {
                name: "palette_shape",
                reason: format!("{}x{} has a zero dimension", width, height),
            });
        }
        if self.is_empty() {
            return Err(ClusterError::InvalidParameter {
                name: "palette",
                reason: "no colors to render".to_string(),
            });
        }

        let proportions: Vec<f64> = self.iter().map(|e| e.proportion).collect();
        let mut start = 0;
        let bands = self
            .iter()
            .zip(band_edges(&proportions, width))
            .map(|(entry, end)| {
                let band = Band {
                    color: entry.color,
                    start,
                    end,
                };
                start = end;
                band
            })
            .collect();

        Ok(PaletteImage {
            width,
            height,
            bands,
        })
    }
}

/// Render a clustering as a palette bar, largest cluster on the left.
///
/// ```
/// use lab_cluster::{palette, KMeans, Lab};
///
/// let pixels = vec![Lab::new(40.0, 60.0, 40.0); 3];
/// let result = KMeans::new(1).cluster(&pixels).unwrap();
/// let image = palette::render(&result, 10, 4).unwrap();
///
/// assert_eq!(image.bands().len(), 1);
/// assert_eq!(image.to_rgb_bytes().len(), 10 * 4 * 3);
/// ```
pub fn render(
    result: &ClusterResult,
    width: usize,
    height: usize,
) -> Result<PaletteImage, ClusterError> {
    Palette::from_result(result).render(width, height)
}
