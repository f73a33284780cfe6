//! Density-aware clustering of denoised trip endpoints.
//!
//! Partitions points into labeled place clusters with a tunable
//! cluster-count expectation. The engine is a deterministic k-means over
//! locally projected planar meters: centroids are seeded by farthest-point
//! traversal (no randomness), candidate cluster counts are swept over
//! `[max(expected, 1), expected + slack]`, and the best partition is chosen
//! by simplified silhouette score. Ties prefer the smaller count.
//!
//! Pathological input never panics: non-convergence is reported as a zero
//! cluster count with every point labeled noise.

use log::debug;

use crate::geo_utils::{compute_center, haversine_distance, planar_distance, project_to_meters};
use crate::{PipelineConfig, PlaceLabel, TripPoint};

/// Result of one clustering pass.
#[derive(Debug, Clone)]
pub struct ClusterOutcome {
    /// Number of distinct place clusters (noise excluded).
    pub cluster_count: usize,
    /// One label per entry of `used_points`, in the same order.
    pub labels: Vec<PlaceLabel>,
    /// The points that were actually labeled.
    pub used_points: Vec<TripPoint>,
}

impl ClusterOutcome {
    /// Outcome for empty input: `(0, [], [])`.
    pub fn empty() -> Self {
        Self {
            cluster_count: 0,
            labels: Vec::new(),
            used_points: Vec::new(),
        }
    }

    /// Outcome for input the engine could not partition: zero clusters,
    /// every point labeled noise.
    fn all_noise(points: Vec<TripPoint>) -> Self {
        let labels = vec![PlaceLabel::Noise; points.len()];
        Self {
            cluster_count: 0,
            labels,
            used_points: points,
        }
    }

    /// Check whether this outcome carries no labeled points.
    pub fn is_empty(&self) -> bool {
        self.used_points.is_empty()
    }
}

/// Internal state of one converged k-means run.
///
/// Assignments are compacted: centroid ids are renumbered by order of first
/// appearance in the point sequence and empty centroids are dropped, so two
/// runs over the same input produce identical ids.
struct KMeansRun {
    assignments: Vec<usize>,
    centroids: Vec<[f64; 2]>,
}

/// Partition `points` into place clusters, targeting `expected_clusters`.
///
/// `expected_clusters` is a hint, typically the surviving bin count from
/// [`remove_noise`](crate::remove_noise); the realized count stays within
/// `[expected, expected + config.cluster_slack]` or is reported as 0 when no
/// candidate partition fits that window. `expected_clusters == 0` lets the
/// engine decide freely within the slack window.
///
/// Modes:
/// - `include_noise == true`: every input point is retained (`used_points ==
///   points`, same order); points farther than `config.noise_distance_meters`
///   from their centroid get the noise label.
/// - `include_noise == false`: points with no neighbor within
///   `config.outlier_cutoff_meters` are dropped before labeling; every
///   retained point receives a place label.
///
/// Empty input yields `(0, [], [])`. Fixed input and configuration always
/// reproduce the same labels.
pub fn cluster(
    points: &[TripPoint],
    expected_clusters: usize,
    include_noise: bool,
    config: &PipelineConfig,
) -> ClusterOutcome {
    if points.is_empty() {
        return ClusterOutcome::empty();
    }

    let retained = if include_noise {
        points.to_vec()
    } else {
        drop_isolated(points, config.outlier_cutoff_meters)
    };
    if retained.is_empty() {
        return ClusterOutcome::empty();
    }

    let (ref_lat, ref_lng) = compute_center(&retained);
    let features: Vec<[f64; 2]> = retained
        .iter()
        .map(|p| project_to_meters(p.latitude, p.longitude, ref_lat, ref_lng))
        .collect();

    let n = features.len();
    let lo = expected_clusters.max(1);
    let hi = n.min(expected_clusters + config.cluster_slack);
    if lo > hi {
        debug!(
            "clustering: no viable cluster count for {} points (expected {})",
            n, expected_clusters
        );
        return ClusterOutcome::all_noise(retained);
    }

    // Sweep candidate counts; keep the best-scoring partition whose realized
    // count still falls inside the expected window after empty-cluster
    // compaction. Ascending order plus strict comparison keeps the smallest
    // count on score ties.
    let mut best: Option<(f64, KMeansRun)> = None;
    for k in lo..=hi {
        let run = kmeans(&features, k, config.max_kmeans_iterations);
        if run.centroids.len() < lo {
            continue;
        }
        let score = simplified_silhouette(&features, &run);
        if best.as_ref().map_or(true, |(best_score, _)| score > *best_score) {
            best = Some((score, run));
        }
    }

    let Some((score, run)) = best else {
        return ClusterOutcome::all_noise(retained);
    };

    // Assemble labels, demoting stragglers to noise in include-noise mode.
    // Place ids are re-compacted in case entire clusters turn into noise.
    let mut labels = vec![PlaceLabel::Noise; n];
    let mut id_map: Vec<Option<usize>> = vec![None; run.centroids.len()];
    let mut next_id = 0;
    for i in 0..n {
        let c = run.assignments[i];
        if include_noise
            && planar_distance(&features[i], &run.centroids[c]) > config.noise_distance_meters
        {
            continue;
        }
        let id = *id_map[c].get_or_insert_with(|| {
            let id = next_id;
            next_id += 1;
            id
        });
        labels[i] = PlaceLabel::Place(id);
    }

    debug!(
        "clustering: {} points -> {} clusters (expected {}, silhouette {:.3})",
        n, next_id, expected_clusters, score
    );

    ClusterOutcome {
        cluster_count: next_id,
        labels,
        used_points: retained,
    }
}

/// Drop points with no neighbor within `cutoff_meters`.
///
/// A single isolated fix cannot evidence a recurring place, so it is removed
/// before labeling rather than handed a throwaway cluster.
fn drop_isolated(points: &[TripPoint], cutoff_meters: f64) -> Vec<TripPoint> {
    points
        .iter()
        .enumerate()
        .filter(|&(i, p)| {
            points
                .iter()
                .enumerate()
                .any(|(j, q)| j != i && haversine_distance(p, q) <= cutoff_meters)
        })
        .map(|(_, p)| p.clone())
        .collect()
}

/// One deterministic k-means run: farthest-point seeding, Lloyd iterations
/// up to `max_iterations`, then compaction of empty clusters.
fn kmeans(features: &[[f64; 2]], k: usize, max_iterations: usize) -> KMeansRun {
    let n = features.len();
    let mut centroids = farthest_point_seeds(features, k);
    let mut assignments = assign(features, &centroids);

    for _ in 0..max_iterations {
        // Update step: empty centroids keep their position so they can still
        // capture points on later iterations.
        let mut sums = vec![[0.0f64; 2]; centroids.len()];
        let mut counts = vec![0usize; centroids.len()];
        for (point, &c) in features.iter().zip(&assignments) {
            sums[c][0] += point[0];
            sums[c][1] += point[1];
            counts[c] += 1;
        }
        for (c, centroid) in centroids.iter_mut().enumerate() {
            if counts[c] > 0 {
                *centroid = [sums[c][0] / counts[c] as f64, sums[c][1] / counts[c] as f64];
            }
        }

        let next = assign(features, &centroids);
        if next == assignments {
            break;
        }
        assignments = next;
    }

    compact(assignments, centroids, n)
}

/// Assign each point to its nearest centroid; ties go to the lower index.
fn assign(features: &[[f64; 2]], centroids: &[[f64; 2]]) -> Vec<usize> {
    features
        .iter()
        .map(|point| {
            let mut best = 0;
            let mut best_dist = f64::MAX;
            for (c, centroid) in centroids.iter().enumerate() {
                let dist = planar_distance(point, centroid);
                if dist < best_dist {
                    best_dist = dist;
                    best = c;
                }
            }
            best
        })
        .collect()
}

/// Farthest-point traversal seeding: start from the first point, then
/// repeatedly take the point farthest from all chosen seeds. Fully
/// deterministic; ties keep the lowest index.
fn farthest_point_seeds(features: &[[f64; 2]], k: usize) -> Vec<[f64; 2]> {
    let mut seeds = vec![features[0]];
    let mut min_dist: Vec<f64> = features
        .iter()
        .map(|p| planar_distance(p, &seeds[0]))
        .collect();

    while seeds.len() < k.min(features.len()) {
        let mut farthest = 0;
        let mut farthest_dist = -1.0;
        for (i, &dist) in min_dist.iter().enumerate() {
            if dist > farthest_dist {
                farthest_dist = dist;
                farthest = i;
            }
        }
        let seed = features[farthest];
        for (i, point) in features.iter().enumerate() {
            min_dist[i] = min_dist[i].min(planar_distance(point, &seed));
        }
        seeds.push(seed);
    }

    seeds
}

/// Renumber centroid ids by order of first appearance and drop centroids
/// that ended up with no members.
fn compact(assignments: Vec<usize>, centroids: Vec<[f64; 2]>, n: usize) -> KMeansRun {
    let mut id_map: Vec<Option<usize>> = vec![None; centroids.len()];
    let mut kept_centroids = Vec::new();
    let mut compacted = Vec::with_capacity(n);

    for c in assignments {
        let id = *id_map[c].get_or_insert_with(|| {
            kept_centroids.push(centroids[c]);
            kept_centroids.len() - 1
        });
        compacted.push(id);
    }

    KMeansRun {
        assignments: compacted,
        centroids: kept_centroids,
    }
}

/// Simplified silhouette score: for each point, `a` is the distance to its
/// own centroid and `b` the distance to the nearest other centroid; the
/// score is the mean of `(b - a) / max(a, b)`. Single-cluster partitions
/// score 0.
fn simplified_silhouette(features: &[[f64; 2]], run: &KMeansRun) -> f64 {
    if run.centroids.len() <= 1 {
        return 0.0;
    }

    let mut total = 0.0;
    for (point, &c) in features.iter().zip(&run.assignments) {
        let a = planar_distance(point, &run.centroids[c]);
        let b = run
            .centroids
            .iter()
            .enumerate()
            .filter(|(other, _)| *other != c)
            .map(|(_, centroid)| planar_distance(point, centroid))
            .fold(f64::MAX, f64::min);

        let denom = a.max(b);
        if denom > 0.0 {
            total += (b - a) / denom;
        }
    }

    total / features.len() as f64
}
