// Generated LUT tables and published matrix constants carry more digits
// than f32 keeps
#![allow(clippy::excessive_precision)]

//! lab-cluster: dominant colors of images in CIE LAB
//!
//! Pure, synchronous building blocks for palette extraction: color
//! conversion, resampling, pixel pooling, K-means, automatic K selection
//! and palette rendering. No I/O; callers fetch and decode images.
//!
//! # Quick Start
//!
//! ```
//! use lab_cluster::{palette, resample, to_lab, KMeans, PixelPool, SrgbImage};
//!
//! // Two 4x4 covers, one red and one teal
//! let red = SrgbImage::from_bytes(4, 4, &[220, 20, 30].repeat(16)).unwrap();
//! let teal = SrgbImage::from_bytes(4, 4, &[10, 128, 128].repeat(16)).unwrap();
//!
//! let images = [red, teal]
//!     .into_iter()
//!     .map(|img| resample(&to_lab(&img, false).unwrap(), 2, 2).unwrap());
//! let pool = PixelPool::from_images(images).unwrap();
//!
//! let mut model = KMeans::new(2).seed(1);
//! let result = model.fit(&pool).unwrap();
//! let image = palette::render(result, 64, 8).unwrap();
//!
//! assert_eq!(image.bands().len(), 2);
//! assert_eq!(image.bands()[0].width(), 32);
//! ```
//!
//! # Color Space
//!
//! All clustering happens in CIE L*a*b* with the D65 white point:
//!
//! ```text
//! sRGB bytes -> sRGB 0..1 -> linear RGB (gamma LUT) -> XYZ -> LAB
//! ```
//!
//! Euclidean distance in LAB tracks perceived difference far better than in
//! sRGB, so centroids land on colors a viewer would call distinct. L ranges
//! 0..=100 and a/b are signed; nothing in the pipeline clamps them until
//! centroids are converted back to sRGB for display.
//!
//! # Choosing K
//!
//! [`KMeans`] takes a fixed K. [`ClusterCountSelector`] searches a range of K
//! by silhouette score over seeded subsamples, nudged towards larger K by
//! `alpha`. Everything random is seeded, so the same input and settings
//! always give the same palette.

pub mod color;
pub mod image;
pub mod kmeans;
pub mod palette;
pub mod pool;
pub mod resize;
pub mod selector;

mod error;


pub use color::{Lab, LinearRgb, Srgb};
pub use error::ClusterError;
pub use image::{to_lab, to_rgb, LabImage, SrgbImage};
pub use kmeans::{ClusterResult, InitStrategy, KMeans, DEFAULT_SEED};
pub use palette::{Palette, PaletteEntry, PaletteImage};
pub use pool::PixelPool;
pub use resize::resample;
pub use selector::{silhouette_score, ClusterCountSelector, KScore, SelectionReport};
