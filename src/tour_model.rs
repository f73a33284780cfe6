//! Tour model construction: aggregation of labeled points into places.
//!
//! The tour model is the only artifact the pipeline hands back to the
//! caller. The single normalized "no confident places found" representation
//! is an empty [`TourModel`] — never `Option` or a sentinel.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use crate::clustering::ClusterOutcome;
use crate::geo_utils::compute_center;
use crate::{Bounds, PointRole, TripPoint};

/// Descriptive metadata for one discovered place.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PlaceMetadata {
    /// Representative coordinate: centroid latitude of the member points.
    pub latitude: f64,
    /// Representative coordinate: centroid longitude of the member points.
    pub longitude: f64,
    /// Total member points.
    pub point_count: usize,
    /// How many members are trip starts.
    pub trip_starts: usize,
    /// How many members are trip ends.
    pub trip_ends: usize,
    /// Earliest member timestamp.
    pub first_seen: i64,
    /// Latest member timestamp.
    pub last_seen: i64,
    /// Bounding box of the member points.
    pub bounds: Option<Bounds>,
    /// Member indices into the clustering outcome's `used_points`.
    pub members: Vec<usize>,
}

/// Mapping from place label id to place metadata.
///
/// Backed by a `BTreeMap` so iteration order is deterministic. Noise-labeled
/// points never contribute an entry, so `len() <= cluster_count` always
/// holds for the outcome the model was built from.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct TourModel {
    places: BTreeMap<usize, PlaceMetadata>,
}

impl TourModel {
    /// Create an empty tour model.
    pub fn new() -> Self {
        Self::default()
    }

    /// Number of discovered places.
    pub fn len(&self) -> usize {
        self.places.len()
    }

    /// Check whether no confident places were found.
    pub fn is_empty(&self) -> bool {
        self.places.is_empty()
    }

    /// Metadata for one place label id.
    pub fn get(&self, label: usize) -> Option<&PlaceMetadata> {
        self.places.get(&label)
    }

    /// Iterate places in ascending label order.
    pub fn iter(&self) -> impl Iterator<Item = (&usize, &PlaceMetadata)> {
        self.places.iter()
    }

    /// All place label ids in ascending order.
    pub fn labels(&self) -> impl Iterator<Item = &usize> {
        self.places.keys()
    }
}

/// Aggregate a clustering outcome into the final tour model.
///
/// Returns at most `outcome.cluster_count` entries; noise-labeled points are
/// skipped. An empty or all-noise outcome yields an empty model.
pub fn build_tour_model(outcome: &ClusterOutcome) -> TourModel {
    let mut model = TourModel::new();
    if outcome.is_empty() || outcome.cluster_count == 0 {
        return model;
    }

    // Gather member indices per place label.
    let mut members: BTreeMap<usize, Vec<usize>> = BTreeMap::new();
    for (index, label) in outcome.labels.iter().enumerate() {
        if let Some(id) = label.place_id() {
            members.entry(id).or_default().push(index);
        }
    }

    for (id, indices) in members {
        let points: Vec<TripPoint> = indices
            .iter()
            .map(|&i| outcome.used_points[i].clone())
            .collect();

        let (latitude, longitude) = compute_center(&points);
        let trip_starts = points
            .iter()
            .filter(|p| p.role == PointRole::TripStart)
            .count();
        let first_seen = points.iter().map(|p| p.timestamp).min().unwrap_or(0);
        let last_seen = points.iter().map(|p| p.timestamp).max().unwrap_or(0);

        model.places.insert(
            id,
            PlaceMetadata {
                latitude,
                longitude,
                point_count: points.len(),
                trip_starts,
                trip_ends: points.len() - trip_starts,
                first_seen,
                last_seen,
                bounds: Bounds::from_points(&points),
                members: indices,
            },
        );
    }

    model
}
