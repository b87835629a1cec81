//! One-dimensional k-means clustering
//!
//! Centroids start evenly spaced between the smallest and largest point and
//! are refined by Lloyd iterations until the summed centroid movement drops
//! below the convergence threshold or the iteration budget runs out. The
//! result is always reported with centroids in ascending order.

use crate::{CoreError, Result};
use serde::{Deserialize, Serialize};
use tracing::trace;

/// Iteration limits for [`KMeans`]
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct KMeansConfig {
    /// Upper bound on Lloyd iterations. Zero behaves like one.
    pub max_iterations: usize,
    /// Stop once the total centroid movement of an iteration is below this
    pub convergence_threshold: f64,
}

impl Default for KMeansConfig {
    fn default() -> Self {
        Self {
            max_iterations: 100,
            convergence_threshold: 0.001,
        }
    }
}

/// Outcome of a clustering run
#[derive(Debug, Clone, PartialEq)]
pub struct Clustering {
    /// Cluster index per input point, in input order
    pub assignments: Vec<usize>,
    /// Centroids sorted ascending; `assignments` index into this
    pub centroids: Vec<f64>,
    /// Iterations actually performed
    pub iterations: usize,
}

impl Clustering {
    pub fn k(&self) -> usize {
        self.centroids.len()
    }

    /// Number of points assigned to each cluster
    pub fn sizes(&self) -> Vec<usize> {
        let mut sizes = vec![0; self.k()];
        for &a in &self.assignments {
            sizes[a] += 1;
        }
        sizes
    }

    /// Drop clusters that ended up with no points, relabelling the rest
    pub fn without_empty(self) -> Self {
        let sizes = self.sizes();
        let mut relabel = vec![0usize; self.k()];
        let mut centroids = Vec::with_capacity(self.k());
        for (j, &centroid) in self.centroids.iter().enumerate() {
            if sizes[j] > 0 {
                relabel[j] = centroids.len();
                centroids.push(centroid);
            }
        }

        Self {
            assignments: self.assignments.iter().map(|&a| relabel[a]).collect(),
            centroids,
            iterations: self.iterations,
        }
    }
}

/// 1-D k-means engine
#[derive(Debug, Clone, Default)]
pub struct KMeans {
    config: KMeansConfig,
}

impl KMeans {
    pub fn new(config: KMeansConfig) -> Self {
        Self { config }
    }

    /// Partition `points` into `k` clusters.
    ///
    /// Fails when `k` is zero, exceeds the number of points, or a point is
    /// not finite. Ties between equidistant centroids go to the lower index,
    /// and a cluster that loses all its points keeps its previous centroid.
    pub fn cluster(&self, points: &[f64], k: usize) -> Result<Clustering> {
        if k == 0 || k > points.len() {
            return Err(CoreError::InvalidClusterCount {
                k,
                points: points.len(),
            });
        }
        if let Some(index) = points.iter().position(|p| !p.is_finite()) {
            return Err(CoreError::NonFinitePoint { index });
        }

        let mut centroids = initial_centroids(points, k);
        let mut assignments = vec![0usize; points.len()];
        let max_iterations = self.config.max_iterations.max(1);
        let mut iterations = 0;

        while iterations < max_iterations {
            iterations += 1;
            assign(points, &centroids, &mut assignments);
            let movement = update(points, &assignments, &mut centroids);
            trace!(iteration = iterations, movement, "k-means step");
            if movement < self.config.convergence_threshold {
                break;
            }
        }

        Ok(sort_clusters(assignments, centroids, iterations))
    }
}

fn initial_centroids(points: &[f64], k: usize) -> Vec<f64> {
    let min = points.iter().copied().fold(f64::INFINITY, f64::min);
    let max = points.iter().copied().fold(f64::NEG_INFINITY, f64::max);

    if k == 1 {
        return vec![min];
    }
    (0..k)
        .map(|i| min + (max - min) * i as f64 / (k - 1) as f64)
        .collect()
}

fn assign(points: &[f64], centroids: &[f64], assignments: &mut [usize]) {
    for (slot, &p) in assignments.iter_mut().zip(points) {
        let mut best = 0;
        let mut best_dist = (p - centroids[0]).abs();
        for (j, &c) in centroids.iter().enumerate().skip(1) {
            let dist = (p - c).abs();
            if dist < best_dist {
                best_dist = dist;
                best = j;
            }
        }
        *slot = best;
    }
}

/// Move each centroid to the mean of its points; returns total movement
fn update(points: &[f64], assignments: &[usize], centroids: &mut [f64]) -> f64 {
    let mut sums = vec![0.0; centroids.len()];
    let mut counts = vec![0usize; centroids.len()];
    for (&p, &a) in points.iter().zip(assignments) {
        sums[a] += p;
        counts[a] += 1;
    }

    let mut movement = 0.0;
    for (j, centroid) in centroids.iter_mut().enumerate() {
        if counts[j] == 0 {
            continue;
        }
        let next = sums[j] / counts[j] as f64;
        movement += (next - *centroid).abs();
        *centroid = next;
    }
    movement
}

/// Relabel clusters so centroids ascend, without re-running the assignment
fn sort_clusters(assignments: Vec<usize>, centroids: Vec<f64>, iterations: usize) -> Clustering {
    let mut order: Vec<usize> = (0..centroids.len()).collect();
    order.sort_by(|&a, &b| centroids[a].total_cmp(&centroids[b]));

    let mut rank = vec![0usize; centroids.len()];
    for (new, &old) in order.iter().enumerate() {
        rank[old] = new;
    }

    Clustering {
        assignments: assignments.into_iter().map(|a| rank[a]).collect(),
        centroids: order.iter().map(|&old| centroids[old]).collect(),
        iterations,
    }
}
