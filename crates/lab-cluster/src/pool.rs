//! Pooled pixel data for one run

use rand::rngs::StdRng;
use rand::seq::index;
use rand::SeedableRng;

use crate::color::Lab;
use crate::error::ClusterError;
use crate::image::LabImage;

/// The union of every image's LAB pixels, in image order.
///
/// Built once after all images are collected and read-only afterwards, so
/// a shared reference can be handed to parallel fits.
#[derive(Debug, Clone, PartialEq)]
pub struct PixelPool {
    pixels: Vec<Lab>,
}

impl PixelPool {
    /// Concatenate the pixels of `images`.
    ///
    /// The pool length is the sum of `width * height` over all images.
    ///
    /// # Errors
    ///
    /// [`ClusterError::EmptyPixelPool`] if the images contain no pixels.
    pub fn from_images<I>(images: I) -> Result<Self, ClusterError>
    where
        I: IntoIterator<Item = LabImage>,
    {
        let mut pixels = Vec::new();
        for image in images {
            pixels.extend(image.into_pixels());
        }
        Self::from_pixels(pixels)
    }

    pub fn from_pixels(pixels: Vec<Lab>) -> Result<Self, ClusterError> {
        if pixels.is_empty() {
            return Err(ClusterError::EmptyPixelPool);
        }
        Ok(Self { pixels })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.pixels.len()
    }

    /// Always false for a constructed pool.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.pixels.is_empty()
    }

    #[inline]
    pub fn pixels(&self) -> &[Lab] {
        &self.pixels
    }

    /// Draw `min(size, len)` distinct pixels using a seeded RNG.
    ///
    /// The same seed always yields the same subsample.
    pub fn subsample(&self, size: usize, seed: u64) -> Vec<Lab> {
        let amount = size.min(self.pixels.len());
        let mut rng = StdRng::seed_from_u64(seed);
        index::sample(&mut rng, self.pixels.len(), amount)
            .into_iter()
            .map(|i| self.pixels[i])
            .collect()
    }
}
