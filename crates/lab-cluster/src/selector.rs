//! Automatic cluster count selection
//!
//! Each candidate K is fitted on several random subsamples of the pool and
//! scored by the mean silhouette coefficient. Silhouette favours small K, so
//! the average is scaled by `1 + alpha * ln(K) / ln(k_max)` before picking
//! the maximum.
//!
//! Subsamples are drawn once and shared by every K. The (K, subsample) fits
//! are independent and run on the rayon thread pool; results are collected
//! in order, so the outcome does not depend on scheduling.

use rayon::prelude::*;

use crate::color::Lab;
use crate::error::ClusterError;
use crate::kmeans::{InitStrategy, KMeans, DEFAULT_SEED};
use crate::pool::PixelPool;

/// Mean silhouette coefficient of a clustering.
///
/// For each point, `a` is the mean distance to the other members of its
/// cluster and `b` the smallest mean distance to the members of another
/// non-empty cluster; the point scores `(b - a) / max(a, b)`. Points alone in
/// their cluster score 0, as do points with `a = b = 0`. With fewer than two
/// non-empty clusters the score is 0, and so is a labelling that does not
/// fit `points` (length mismatch or a label `>= k`).
///
/// Runs in O(n²); callers pass subsamples, not whole pools.
pub fn silhouette_score(points: &[Lab], assignments: &[usize], k: usize) -> f64 {
    let n = points.len();
    if n == 0 || assignments.len() != n || assignments.iter().any(|&c| c >= k) {
        return 0.0;
    }

    let mut sizes = vec![0usize; k];
    for &c in assignments {
        sizes[c] += 1;
    }
    if sizes.iter().filter(|&&s| s > 0).count() < 2 {
        return 0.0;
    }

    let mut sums = vec![0.0f64; k];
    let mut total = 0.0f64;
    for (i, &p) in points.iter().enumerate() {
        let own = assignments[i];
        if sizes[own] < 2 {
            continue;
        }

        sums.iter_mut().for_each(|s| *s = 0.0);
        for (&q, &c) in points.iter().zip(assignments) {
            sums[c] += p.distance(q) as f64;
        }

        let a = sums[own] / (sizes[own] - 1) as f64;
        let b = sums
            .iter()
            .zip(&sizes)
            .enumerate()
            .filter(|&(c, (_, &size))| c != own && size > 0)
            .map(|(_, (&sum, &size))| sum / size as f64)
            .fold(f64::INFINITY, f64::min);

        let denom = a.max(b);
        if denom > 0.0 {
            total += (b - a) / denom;
        }
    }

    total / n as f64
}

/// Score of one candidate K.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct KScore {
    pub k: usize,
    /// Silhouette averaged over subsamples
    pub silhouette: f64,
    /// Silhouette after the K reward
    pub composite: f64,
}

/// Outcome of a selection run.
#[derive(Debug, Clone, PartialEq)]
pub struct SelectionReport {
    pub best_k: usize,
    /// One entry per candidate, ascending K
    pub scores: Vec<KScore>,
}

/// Silhouette-based search for the best K over an inclusive range.
///
/// ```
/// use lab_cluster::{ClusterCountSelector, Lab, PixelPool};
///
/// let mut pixels = Vec::new();
/// for i in 0..60 {
///     let (dx, dy) = ((i % 6) as f32 * 0.5, (i / 6 % 6) as f32 * 0.5);
///     pixels.push(Lab::new(30.0 + dx, 50.0 + dy, 20.0));
///     pixels.push(Lab::new(85.0 - dy, -20.0, 70.0 + dx));
/// }
/// let pool = PixelPool::from_pixels(pixels).unwrap();
///
/// let report = ClusterCountSelector::new(2, 4)
///     .n_subsamples(3)
///     .subsample_size(80)
///     .select(&pool)
///     .unwrap();
/// assert_eq!(report.best_k, 2);
/// ```
#[derive(Debug, Clone)]
pub struct ClusterCountSelector {
    k_min: usize,
    k_max: usize,
    n_subsamples: usize,
    subsample_size: usize,
    alpha: f64,
    seed: u64,
    init: InitStrategy,
    max_iterations: usize,
    tolerance: f64,
}

impl ClusterCountSelector {
    /// Search `k_min..=k_max` with 5 subsamples of 10 000 pixels and
    /// `alpha = 0.5`.
    pub fn new(k_min: usize, k_max: usize) -> Self {
        Self {
            k_min,
            k_max,
            n_subsamples: 5,
            subsample_size: 10_000,
            alpha: 0.5,
            seed: DEFAULT_SEED,
            init: InitStrategy::default(),
            max_iterations: 300,
            tolerance: 1e-4,
        }
    }

    #[inline]
    pub fn n_subsamples(mut self, n_subsamples: usize) -> Self {
        self.n_subsamples = n_subsamples;
        self
    }

    #[inline]
    pub fn subsample_size(mut self, subsample_size: usize) -> Self {
        self.subsample_size = subsample_size;
        self
    }

    /// Weight of the K reward; 0 scores by silhouette alone.
    #[inline]
    pub fn alpha(mut self, alpha: f64) -> Self {
        self.alpha = alpha;
        self
    }

    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    /// K-means settings for the subsample fits.
    #[inline]
    pub fn kmeans(mut self, init: InitStrategy, max_iterations: usize, tolerance: f64) -> Self {
        self.init = init;
        self.max_iterations = max_iterations;
        self.tolerance = tolerance;
        self
    }

    fn composite(&self, k: usize, silhouette: f64) -> f64 {
        silhouette * (1.0 + self.alpha * (k as f64).ln() / (self.k_max as f64).ln())
    }

    /// Run the search.
    ///
    /// # Errors
    ///
    /// - [`ClusterError::InvalidRange`] unless
    ///   `2 <= k_min <= k_max <= min(subsample_size, pool.len())`
    /// - [`ClusterError::InvalidParameter`] for zero subsamples or a
    ///   non-finite alpha
    /// - any error from the underlying fits
    pub fn select(&self, pool: &PixelPool) -> Result<SelectionReport, ClusterError> {
        if self.n_subsamples == 0 {
            return Err(ClusterError::InvalidParameter {
                name: "n_subsamples",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.alpha.is_finite() {
            return Err(ClusterError::InvalidParameter {
                name: "alpha",
                reason: format!("must be finite, got {}", self.alpha),
            });
        }
        let sample_len = self.subsample_size.min(pool.len());
        if self.k_min < 2 || self.k_min > self.k_max || self.k_max > sample_len {
            return Err(ClusterError::InvalidRange {
                k_min: self.k_min,
                k_max: self.k_max,
                subsample_size: sample_len,
            });
        }

        let subsamples: Vec<Vec<Lab>> = (0..self.n_subsamples as u64)
            .map(|s| pool.subsample(sample_len, self.seed.wrapping_add(s)))
            .collect();

        let jobs: Vec<(usize, usize)> = (self.k_min..=self.k_max)
            .flat_map(|k| (0..self.n_subsamples).map(move |s| (k, s)))
            .collect();

        let silhouettes = jobs
            .par_iter()
            .map(|&(k, s)| {
                let points = &subsamples[s];
                let result = KMeans::new(k)
                    .init(self.init)
                    .max_iterations(self.max_iterations)
                    .tolerance(self.tolerance)
                    .seed(self.seed.wrapping_add(s as u64))
                    .cluster(points)?;
                // Collapsed fits (duplicate centroids) rank below any real one
                if result.non_empty_clusters() < k {
                    return Ok(-1.0);
                }
                Ok(silhouette_score(points, result.assignments(), k))
            })
            .collect::<Result<Vec<f64>, ClusterError>>()?;

        let scores: Vec<KScore> = silhouettes
            .chunks(self.n_subsamples)
            .zip(self.k_min..=self.k_max)
            .map(|(per_subsample, k)| {
                let silhouette = per_subsample.iter().sum::<f64>() / per_subsample.len() as f64;
                KScore {
                    k,
                    silhouette,
                    composite: self.composite(k, silhouette),
                }
            })
            .collect();

        // Ascending K with a strict comparison: ties keep the smaller K
        let mut best = scores[0];
        for score in &scores[1..] {
            if score.composite > best.composite {
                best = *score;
            }
        }

        Ok(SelectionReport {
            best_k: best.k,
            scores,
        })
    }
}
