//! Point retrieval from the external store.
//!
//! The repository is injected into the pipeline as a trait object or generic
//! parameter, constructed fresh per caller — never a process-wide singleton.
//! Unknown or malformed identities yield an empty result; `Err` is reserved
//! for genuine store failures (connectivity, corruption).

use std::collections::HashMap;

use crate::error::Result;
use crate::TripPoint;

/// Access to stored trip-segment endpoints for one identity.
///
/// Implementations assume the upstream ingestion pipeline has already
/// produced cleaned, segmented records; no point-quality re-validation
/// happens here.
pub trait PointRepository {
    /// Return all trip endpoints for `identity`, in a stable but otherwise
    /// meaningless order.
    ///
    /// `use_old_data` selects the legacy record set instead of the current
    /// one. An identity with no matching records returns an empty vec.
    fn fetch_points(&self, identity: &str, use_old_data: bool) -> Result<Vec<TripPoint>>;
}

/// In-memory point repository backed by per-identity vectors.
///
/// Preserves insertion order within each identity, which is all the ordering
/// the pipeline relies on.
#[derive(Debug, Default)]
pub struct InMemoryPointRepository {
    current: HashMap<String, Vec<TripPoint>>,
    legacy: HashMap<String, Vec<TripPoint>>,
}

impl InMemoryPointRepository {
    /// Create a new empty repository.
    pub fn new() -> Self {
        Self {
            current: HashMap::new(),
            legacy: HashMap::new(),
        }
    }

    /// Add a point to the current record set, keyed by its own identity.
    pub fn insert(&mut self, point: TripPoint) {
        self.current
            .entry(point.identity.clone())
            .or_default()
            .push(point);
    }

    /// Add a point to the legacy record set.
    pub fn insert_legacy(&mut self, point: TripPoint) {
        self.legacy
            .entry(point.identity.clone())
            .or_default()
            .push(point);
    }

    /// Bulk-add points to the current record set.
    pub fn insert_many(&mut self, points: impl IntoIterator<Item = TripPoint>) {
        for point in points {
            self.insert(point);
        }
    }

    /// Number of identities with at least one current record.
    pub fn len(&self) -> usize {
        self.current.len()
    }

    /// Check if the current record set is empty.
    pub fn is_empty(&self) -> bool {
        self.current.is_empty()
    }

    /// All identities present in the current record set.
    pub fn identities(&self) -> impl Iterator<Item = &String> {
        self.current.keys()
    }
}

impl PointRepository for InMemoryPointRepository {
    fn fetch_points(&self, identity: &str, use_old_data: bool) -> Result<Vec<TripPoint>> {
        let source = if use_old_data {
            &self.legacy
        } else {
            &self.current
        };
        Ok(source.get(identity).cloned().unwrap_or_default())
    }
}
