//! # Tour Model
//!
//! Derives a compact "tour model" — a traveler's recurring places and the
//! movement pattern between them — from a noisy stream of geolocated
//! trip-segment endpoints.
//!
//! The pipeline has four stages:
//! - Fetch: retrieve all trip endpoints for one identity ([`PointRepository`])
//! - Denoise: group endpoints into proximity bins, drop sparse bins ([`remove_noise`])
//! - Cluster: deterministic k-means with a bin-derived cluster-count hint ([`cluster`])
//! - Build: aggregate labeled points into place metadata ([`build_tour_model`])
//!
//! ## Features
//!
//! - **`parallel`** - Enable parallel batch processing across identities with rayon
//! - **`synthetic`** - Enable the synthetic trip data generator (tests/benchmarks)
//!
//! ## Quick Start
//!
//! ```rust
//! use tourmodel::{InMemoryPointRepository, PointRole, TourPipeline, TripPoint};
//!
//! let mut repo = InMemoryPointRepository::new();
//! for i in 0..3i64 {
//!     // Three trips between home and work
//!     repo.insert(TripPoint::new("u1", 37.7749, -122.4194, i * 3600, PointRole::TripStart));
//!     repo.insert(TripPoint::new("u1", 37.8044, -122.2712, i * 3600 + 1800, PointRole::TripEnd));
//! }
//!
//! let pipeline = TourPipeline::new(repo);
//! let model = pipeline.run("u1", false).unwrap();
//! assert!(!model.is_empty());
//!
//! // Unknown identities yield an empty model, never an error
//! let empty = pipeline.run("nobody", false).unwrap();
//! assert!(empty.is_empty());
//! ```

use serde::{Deserialize, Serialize};

// Unified error handling
pub mod error;
pub use error::{Result, TourModelError};

// Geographic utilities (distance, bounds, center calculations)
pub mod geo_utils;

// Point retrieval (dependency-injected store access)
pub mod repository;
pub use repository::{InMemoryPointRepository, PointRepository};

// Proximity binning / noise removal
pub mod binning;
pub use binning::{remove_noise, Bin};

// Deterministic clustering engine
pub mod clustering;
pub use clustering::{cluster, ClusterOutcome};

// Tour model construction
pub mod tour_model;
pub use tour_model::{build_tour_model, PlaceMetadata, TourModel};

// Pipeline driver
pub mod pipeline;
pub use pipeline::TourPipeline;

// Synthetic trip data generator for tests and benchmarks
#[cfg(feature = "synthetic")]
pub mod synthetic;

// ============================================================================
// Core Types
// ============================================================================

/// Whether a trip endpoint marks the start or the end of a trip segment.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PointRole {
    TripStart,
    TripEnd,
}

/// One recorded trip-segment endpoint: a geolocated, timestamped fix tied to
/// an identity.
///
/// Immutable once fetched; owned by the pipeline invocation that retrieved it.
///
/// # Example
/// ```
/// use tourmodel::{PointRole, TripPoint};
/// let point = TripPoint::new("u1", 51.5074, -0.1278, 1_440_633_600, PointRole::TripStart);
/// assert!(point.is_valid());
/// ```
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TripPoint {
    /// Opaque identity of the traveler this fix belongs to.
    pub identity: String,
    pub latitude: f64,
    pub longitude: f64,
    /// Unix timestamp in seconds.
    pub timestamp: i64,
    /// Trip-start or trip-end marker.
    pub role: PointRole,
}

impl TripPoint {
    /// Create a new trip endpoint.
    pub fn new(
        identity: &str,
        latitude: f64,
        longitude: f64,
        timestamp: i64,
        role: PointRole,
    ) -> Self {
        Self {
            identity: identity.to_string(),
            latitude,
            longitude,
            timestamp,
            role,
        }
    }

    /// Check if the point has valid coordinates.
    pub fn is_valid(&self) -> bool {
        self.latitude.is_finite()
            && self.longitude.is_finite()
            && self.latitude >= -90.0
            && self.latitude <= 90.0
            && self.longitude >= -180.0
            && self.longitude <= 180.0
    }
}

/// Bounding box for a set of points.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct Bounds {
    pub min_lat: f64,
    pub max_lat: f64,
    pub min_lng: f64,
    pub max_lng: f64,
}

impl Bounds {
    /// Create bounds from trip points.
    pub fn from_points(points: &[TripPoint]) -> Option<Self> {
        if points.is_empty() {
            return None;
        }
        let mut min_lat = f64::MAX;
        let mut max_lat = f64::MIN;
        let mut min_lng = f64::MAX;
        let mut max_lng = f64::MIN;

        for p in points {
            min_lat = min_lat.min(p.latitude);
            max_lat = max_lat.max(p.latitude);
            min_lng = min_lng.min(p.longitude);
            max_lng = max_lng.max(p.longitude);
        }

        Some(Self {
            min_lat,
            max_lat,
            min_lng,
            max_lng,
        })
    }

    /// Get the center coordinate of the bounds as (latitude, longitude).
    pub fn center(&self) -> (f64, f64) {
        (
            (self.min_lat + self.max_lat) / 2.0,
            (self.min_lng + self.max_lng) / 2.0,
        )
    }
}

/// Cluster label for one point: either a discovered place or noise.
///
/// Place ids are compact (`0..cluster_count`) and assigned in order of first
/// appearance in the input, so label assignment is reproducible.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum PlaceLabel {
    /// Member of the place cluster with this id.
    Place(usize),
    /// Not part of any recurring place.
    Noise,
}

impl PlaceLabel {
    /// Check whether this label is the noise sentinel.
    pub fn is_noise(&self) -> bool {
        matches!(self, PlaceLabel::Noise)
    }

    /// The place id, or `None` for noise.
    pub fn place_id(&self) -> Option<usize> {
        match self {
            PlaceLabel::Place(id) => Some(*id),
            PlaceLabel::Noise => None,
        }
    }
}

/// Configuration for the tour-model pipeline.
///
/// All thresholds are in meters. The defaults reproduce the reference
/// behavior: a 200 m bin radius and a realized cluster count within
/// `[bins, bins + 10]` of the bin-derived hint.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct PipelineConfig {
    /// Proximity radius for noise-removal binning, in meters.
    pub radius_meters: f64,
    /// Bins with fewer members than this are dropped as noise.
    pub min_bin_size: usize,
    /// How far above the expected cluster count the engine may settle.
    pub cluster_slack: usize,
    /// Clustering mode for the pipeline: `true` retains every denoised point
    /// (labeling stragglers as noise), `false` pre-drops isolated outliers.
    pub include_noise: bool,
    /// Iteration cap for one k-means run.
    pub max_kmeans_iterations: usize,
    /// In include-noise mode, points farther than this from their assigned
    /// centroid are labeled noise.
    pub noise_distance_meters: f64,
    /// In the default mode, points with no neighbor within this distance are
    /// dropped before labeling.
    pub outlier_cutoff_meters: f64,
}

impl Default for PipelineConfig {
    fn default() -> Self {
        Self {
            radius_meters: 200.0,
            min_bin_size: 2,
            cluster_slack: 10,
            include_noise: false,
            max_kmeans_iterations: 100,
            noise_distance_meters: 400.0,
            outlier_cutoff_meters: 400.0,
        }
    }
}
