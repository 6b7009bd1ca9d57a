//! Lloyd's iteration: assign, recompute means, repeat

use crate::color::Lab;

/// Nearest centroid and its squared distance.
///
/// Ties go to the lowest centroid index.
#[inline]
pub fn nearest(centroids: &[Lab], pixel: Lab) -> (usize, f32) {
    let mut best = 0;
    let mut best_distance = f32::INFINITY;
    for (i, &c) in centroids.iter().enumerate() {
        let d = pixel.distance_squared(c);
        if d < best_distance {
            best_distance = d;
            best = i;
        }
    }
    (best, best_distance)
}

/// Assign every pixel, filling `assignments` and `distances`.
fn assign(pixels: &[Lab], centroids: &[Lab], assignments: &mut [usize], distances: &mut [f32]) {
    for ((px, slot), dist) in pixels.iter().zip(assignments.iter_mut()).zip(distances.iter_mut()) {
        let (index, d) = nearest(centroids, *px);
        *slot = index;
        *dist = d;
    }
}

/// Per-cluster means of the assigned pixels, accumulated in f64.
///
/// Empty clusters come back as `None`.
fn means(pixels: &[Lab], assignments: &[usize], k: usize) -> Vec<Option<Lab>> {
    let mut sums = vec![[0.0f64; 3]; k];
    let mut counts = vec![0usize; k];
    for (px, &c) in pixels.iter().zip(assignments) {
        sums[c][0] += px.l as f64;
        sums[c][1] += px.a as f64;
        sums[c][2] += px.b as f64;
        counts[c] += 1;
    }
    sums.iter()
        .zip(&counts)
        .map(|(s, &n)| {
            (n > 0).then(|| {
                let n = n as f64;
                Lab::new((s[0] / n) as f32, (s[1] / n) as f32, (s[2] / n) as f32)
            })
        })
        .collect()
}

pub struct LloydsOutcome {
    pub centroids: Vec<Lab>,
    pub assignments: Vec<usize>,
    pub distances: Vec<f32>,
    pub iterations: usize,
    pub converged: bool,
}

/// Run Lloyd's algorithm from `centroids`.
///
/// Stops once the summed squared centroid shift is at most `tolerance`, or
/// after `max_iterations` updates. A cluster left without pixels is moved
/// onto the pixel farthest from its current centroid; each such pixel is
/// used at most once per iteration. Assignments are recomputed against the
/// final centroids before returning.
pub fn run(
    pixels: &[Lab],
    mut centroids: Vec<Lab>,
    max_iterations: usize,
    tolerance: f64,
) -> LloydsOutcome {
    let n = pixels.len();
    let k = centroids.len();
    let mut assignments = vec![0usize; n];
    let mut distances = vec![0.0f32; n];
    let mut iterations = 0;
    let mut converged = false;

    while iterations < max_iterations {
        assign(pixels, &centroids, &mut assignments, &mut distances);

        let mut reseed_candidates = distances.clone();
        let mut shift = 0.0f64;
        for (c, mean) in means(pixels, &assignments, k).into_iter().enumerate() {
            let updated = match mean {
                Some(mean) => mean,
                None => {
                    let (far, _) = reseed_candidates.iter().enumerate().fold(
                        (0, f32::NEG_INFINITY),
                        |best, (i, &d)| if d > best.1 { (i, d) } else { best },
                    );
                    reseed_candidates[far] = f32::NEG_INFINITY;
                    pixels[far]
                }
            };
            shift += centroids[c].distance_squared(updated) as f64;
            centroids[c] = updated;
        }

        iterations += 1;
        if shift <= tolerance {
            converged = true;
            break;
        }
    }

    assign(pixels, &centroids, &mut assignments, &mut distances);

    LloydsOutcome {
        centroids,
        assignments,
        distances,
        iterations,
        converged,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn test_nearest_breaks_ties_low() {
        let centroids = [Lab::new(0.0, 0.0, 0.0), Lab::new(2.0, 0.0, 0.0)];
        assert_eq!(nearest(&centroids, Lab::new(1.0, 0.0, 0.0)), (0, 1.0));
        assert_eq!(nearest(&centroids, Lab::new(1.5, 0.0, 0.0)).0, 1);
    }

    #[test]
    fn test_two_groups_converge() {
        let mut pixels = vec![Lab::new(10.0, 0.0, 0.0); 5];
        pixels.extend(vec![Lab::new(90.0, 0.0, 0.0); 3]);

        let start = vec![Lab::new(10.0, 0.0, 0.0), Lab::new(20.0, 0.0, 0.0)];
        let outcome = run(&pixels, start, 100, 1e-4);

        assert!(outcome.converged);
        assert_eq!(outcome.centroids[0], Lab::new(10.0, 0.0, 0.0));
        assert_eq!(outcome.centroids[1], Lab::new(90.0, 0.0, 0.0));
        assert_eq!(outcome.assignments, vec![0, 0, 0, 0, 0, 1, 1, 1]);
        assert!(outcome.distances.iter().all(|&d| d == 0.0));
    }

    #[test]
    fn test_empty_cluster_is_reseeded_to_farthest_pixel() {
        let pixels = vec![
            Lab::new(0.0, 0.0, 0.0),
            Lab::new(1.0, 0.0, 0.0),
            Lab::new(50.0, 0.0, 0.0),
        ];
        // Second centroid is far from everything and gets no pixels
        let start = vec![Lab::new(0.5, 0.0, 0.0), Lab::new(-500.0, 0.0, 0.0)];
        let outcome = run(&pixels, start, 50, 0.0);

        assert_eq!(outcome.centroids[1], Lab::new(50.0, 0.0, 0.0));
        assert_eq!(outcome.assignments, vec![0, 0, 1]);
        assert!(outcome.converged);
    }

    #[test]
    fn test_iteration_cap() {
        let pixels: Vec<Lab> = (0..40).map(|i| Lab::new(i as f32, 0.0, 0.0)).collect();
        let start = vec![Lab::new(0.0, 0.0, 0.0), Lab::new(1.0, 0.0, 0.0)];
        let outcome = run(&pixels, start, 1, 0.0);
        assert_eq!(outcome.iterations, 1);
        assert!(!outcome.converged);
    }
}
