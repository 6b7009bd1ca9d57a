//! Initial centroid selection

use rand::seq::index;
use rand::Rng;

use crate::color::Lab;

/// `k` pixels at distinct positions, sampled uniformly.
pub fn random(rng: &mut impl Rng, pixels: &[Lab], k: usize) -> Vec<Lab> {
    index::sample(rng, pixels.len(), k)
        .into_iter()
        .map(|i| pixels[i])
        .collect()
}

/// Pick the index whose cumulative weight first exceeds a uniform draw.
fn sample_weighted(rng: &mut impl Rng, weights: &[f64], total: f64) -> usize {
    let threshold = rng.gen::<f64>() * total;
    let mut cumulative = 0.0;
    let mut last_positive = 0;
    for (i, &w) in weights.iter().enumerate() {
        if w <= 0.0 {
            continue;
        }
        cumulative += w;
        last_positive = i;
        if cumulative > threshold {
            return i;
        }
    }
    // Rounding left the threshold just past the end
    last_positive
}

/// k-means++ seeding.
///
/// The first centroid is a uniform pick; each following one is drawn with
/// probability proportional to its squared distance from the nearest
/// centroid chosen so far. When every pixel coincides with a centroid the
/// draw falls back to uniform.
pub fn plus_plus(rng: &mut impl Rng, pixels: &[Lab], k: usize) -> Vec<Lab> {
    let n = pixels.len();
    let mut centroids = Vec::with_capacity(k);
    if k == 0 || n == 0 {
        return centroids;
    }

    let first = pixels[rng.gen_range(0..n)];
    centroids.push(first);

    let mut min_distances: Vec<f64> = pixels
        .iter()
        .map(|&p| p.distance_squared(first) as f64)
        .collect();

    while centroids.len() < k {
        let total: f64 = min_distances.iter().sum();
        let chosen = if total > 0.0 {
            sample_weighted(rng, &min_distances, total)
        } else {
            rng.gen_range(0..n)
        };

        let centroid = pixels[chosen];
        centroids.push(centroid);
        for (d, &p) in min_distances.iter_mut().zip(pixels) {
            let candidate = p.distance_squared(centroid) as f64;
            if candidate < *d {
                *d = candidate;
            }
        }
    }

    centroids
}
