//! K-means clustering in LAB space
//!
//! [`KMeans`] is a consuming builder holding the hyperparameters. It can be
//! run statelessly with [`KMeans::cluster`] (used for the many subsample
//! fits during K selection) or fitted in place with [`KMeans::fit`], after
//! which [`KMeans::cluster_centers`] is available.
//!
//! ```
//! use lab_cluster::{InitStrategy, KMeans, Lab};
//!
//! let pixels = [
//!     Lab::new(20.0, 10.0, 10.0),
//!     Lab::new(21.0, 10.0, 10.0),
//!     Lab::new(80.0, -10.0, 40.0),
//! ];
//! let result = KMeans::new(2)
//!     .init(InitStrategy::PlusPlus)
//!     .seed(7)
//!     .cluster(&pixels)
//!     .unwrap();
//!
//! assert_eq!(result.centroids().len(), 2);
//! assert_eq!(result.assignments()[0], result.assignments()[1]);
//! ```
//!
//! Every random draw goes through a `StdRng` seeded from [`KMeans::seed`],
//! so identical inputs produce bit-identical results.

mod init;
mod lloyds;

use rand::rngs::StdRng;
use rand::SeedableRng;

use crate::color::Lab;
use crate::error::ClusterError;
use crate::pool::PixelPool;

pub use lloyds::nearest;

/// Seed used when none is configured.
pub const DEFAULT_SEED: u64 = 42;

/// How initial centroids are chosen.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default)]
pub enum InitStrategy {
    /// `k` distinct pixels sampled uniformly.
    Random,
    /// k-means++ distance-weighted seeding.
    #[default]
    PlusPlus,
}

/// The outcome of one K-means run.
#[derive(Debug, Clone, PartialEq)]
pub struct ClusterResult {
    centroids: Vec<Lab>,
    assignments: Vec<usize>,
    counts: Vec<usize>,
    proportions: Vec<f64>,
    iterations: usize,
    converged: bool,
    inertia: f64,
}

impl ClusterResult {
    /// Centroid of each cluster, indexed by cluster.
    pub fn centroids(&self) -> &[Lab] {
        &self.centroids
    }

    /// Cluster index of each input pixel.
    pub fn assignments(&self) -> &[usize] {
        &self.assignments
    }

    /// Pixels per cluster.
    pub fn counts(&self) -> &[usize] {
        &self.counts
    }

    /// Fraction of pixels per cluster; sums to 1.0.
    pub fn proportions(&self) -> &[f64] {
        &self.proportions
    }

    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Number of centroid updates performed.
    pub fn iterations(&self) -> usize {
        self.iterations
    }

    /// Whether the tolerance was reached before the iteration cap.
    pub fn converged(&self) -> bool {
        self.converged
    }

    /// Sum of squared distances from each pixel to its centroid.
    pub fn inertia(&self) -> f64 {
        self.inertia
    }

    /// Clusters with at least one pixel.
    pub fn non_empty_clusters(&self) -> usize {
        self.counts.iter().filter(|&&c| c > 0).count()
    }
}

/// K-means hyperparameters and, after [`fit`](KMeans::fit), the fitted result.
#[derive(Debug, Clone)]
pub struct KMeans {
    k: usize,
    init: InitStrategy,
    max_iterations: usize,
    tolerance: f64,
    seed: u64,
    fitted: Option<ClusterResult>,
}

impl KMeans {
    /// New model with `k` clusters, k-means++ seeding, 300 iterations,
    /// tolerance 1e-4 and [`DEFAULT_SEED`].
    pub fn new(k: usize) -> Self {
        Self {
            k,
            init: InitStrategy::default(),
            max_iterations: 300,
            tolerance: 1e-4,
            seed: DEFAULT_SEED,
            fitted: None,
        }
    }

    #[inline]
    pub fn init(mut self, init: InitStrategy) -> Self {
        self.init = init;
        self
    }

    #[inline]
    pub fn max_iterations(mut self, max_iterations: usize) -> Self {
        self.max_iterations = max_iterations;
        self
    }

    /// Convergence threshold on the summed squared centroid shift.
    #[inline]
    pub fn tolerance(mut self, tolerance: f64) -> Self {
        self.tolerance = tolerance;
        self
    }

    #[inline]
    pub fn seed(mut self, seed: u64) -> Self {
        self.seed = seed;
        self
    }

    pub fn k(&self) -> usize {
        self.k
    }

    fn validate(&self, n: usize) -> Result<(), ClusterError> {
        if n == 0 {
            return Err(ClusterError::EmptyPixelPool);
        }
        if self.k == 0 || self.k > n {
            return Err(ClusterError::InvalidClusterCount {
                k: self.k,
                pixels: n,
            });
        }
        if self.max_iterations == 0 {
            return Err(ClusterError::InvalidParameter {
                name: "max_iterations",
                reason: "must be at least 1".to_string(),
            });
        }
        if !self.tolerance.is_finite() || self.tolerance < 0.0 {
            return Err(ClusterError::InvalidParameter {
                name: "tolerance",
                reason: format!("must be finite and >= 0, got {}", self.tolerance),
            });
        }
        Ok(())
    }

    /// Cluster `pixels` without storing the result.
    ///
    /// # Errors
    ///
    /// - [`ClusterError::EmptyPixelPool`] for no pixels
    /// - [`ClusterError::InvalidClusterCount`] unless `1 <= k <= pixels.len()`
    /// - [`ClusterError::InvalidParameter`] for a zero iteration cap or a
    ///   negative / non-finite tolerance
    pub fn cluster(&self, pixels: &[Lab]) -> Result<ClusterResult, ClusterError> {
        self.validate(pixels.len())?;

        let mut rng = StdRng::seed_from_u64(self.seed);
        let start = match self.init {
            InitStrategy::Random => init::random(&mut rng, pixels, self.k),
            InitStrategy::PlusPlus => init::plus_plus(&mut rng, pixels, self.k),
        };

        let outcome = lloyds::run(pixels, start, self.max_iterations, self.tolerance);

        let mut counts = vec![0usize; self.k];
        for &c in &outcome.assignments {
            counts[c] += 1;
        }
        let total = pixels.len() as f64;
        let proportions = counts.iter().map(|&c| c as f64 / total).collect();
        let inertia = outcome.distances.iter().map(|&d| d as f64).sum();

        Ok(ClusterResult {
            centroids: outcome.centroids,
            assignments: outcome.assignments,
            counts,
            proportions,
            iterations: outcome.iterations,
            converged: outcome.converged,
            inertia,
        })
    }

    /// Fit on the whole pool and keep the result.
    pub fn fit(&mut self, pool: &PixelPool) -> Result<&ClusterResult, ClusterError> {
        let result = self.cluster(pool.pixels())?;
        Ok(&*self.fitted.insert(result))
    }

    /// Centroids of the last fit.
    ///
    /// # Errors
    ///
    /// [`ClusterError::NotFitted`] before a successful [`fit`](KMeans::fit).
    pub fn cluster_centers(&self) -> Result<&[Lab], ClusterError> {
        self.result().map(ClusterResult::centroids)
    }

    /// The last fit result.
    pub fn result(&self) -> Result<&ClusterResult, ClusterError> {
        self.fitted.as_ref().ok_or(ClusterError::NotFitted)
    }

    /// Take the fitted result out of the model.
    pub fn into_result(self) -> Result<ClusterResult, ClusterError> {
        self.fitted.ok_or(ClusterError::NotFitted)
    }
}
