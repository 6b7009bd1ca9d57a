//! Dominant-color palettes
//!
//! A [`Palette`] is the list of cluster centroids converted back to sRGB and
//! ordered by how much of the pool each one covers. [`PaletteImage`] is the
//! rendered bar: one solid vertical band per color, band width proportional
//! to coverage.

mod render;

pub use render::{render, Band, PaletteImage};

use crate::color::{Lab, LinearRgb, Srgb};
use crate::kmeans::ClusterResult;

/// One palette color.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct PaletteEntry {
    /// Index of the cluster this color came from
    pub cluster: usize,
    pub lab: Lab,
    /// Centroid in sRGB, clamped into gamut
    pub color: Srgb,
    /// Fraction of pixels in this cluster
    pub proportion: f64,
}

/// Palette colors sorted by proportion, largest first.
#[derive(Debug, Clone, PartialEq)]
pub struct Palette {
    entries: Vec<PaletteEntry>,
}

impl Palette {
    /// Build from a clustering. Equal proportions keep cluster order.
    pub fn from_result(result: &ClusterResult) -> Self {
        let mut entries: Vec<PaletteEntry> = result
            .centroids()
            .iter()
            .zip(result.proportions())
            .enumerate()
            .map(|(cluster, (&lab, &proportion))| PaletteEntry {
                cluster,
                lab,
                color: Srgb::from(LinearRgb::from(lab)),
                proportion,
            })
            .collect();
        // Stable sort
        entries.sort_by(|a, b| b.proportion.total_cmp(&a.proportion));
        Self { entries }
    }

    pub fn entries(&self) -> &[PaletteEntry] {
        &self.entries
    }

    pub fn len(&self) -> usize {
        self.entries.len()
    }

    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }

    pub fn iter(&self) -> impl Iterator<Item = &PaletteEntry> {
        self.entries.iter()
    }

    /// `#RRGGBB` strings in palette order.
    pub fn hex_colors(&self) -> Vec<String> {
        self.entries.iter().map(|e| e.color.to_hex()).collect()
    }
}
