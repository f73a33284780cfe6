//! Spatial noise removal via proximity binning.
//!
//! Points are scanned greedily in encounter order and attached to the
//! nearest bin whose seed coordinate lies within the configured radius, or
//! seed a new bin when none qualifies. Bins that stay below the minimum
//! member count are dropped as noise. The surviving bin count feeds the
//! clustering stage as its cluster-count hint.

use log::debug;
use rstar::{RTree, RTreeObject, AABB};

use crate::geo_utils::{haversine_coords, meters_to_degrees};
use crate::TripPoint;

/// A proximity bin: an arena entry holding indices into the scanned slice.
///
/// `seed` and `members` are back-references into the input points, not owned
/// copies. The seed point's coordinate is the bin's representative; it never
/// moves once the bin is created, which keeps the nearest-bin search stable.
#[derive(Debug, Clone)]
pub struct Bin {
    /// Index of the point that seeded this bin. Always also a member.
    pub seed: usize,
    /// Indices of all member points, in encounter order.
    pub members: Vec<usize>,
    sum_lat: f64,
    sum_lng: f64,
}

impl Bin {
    fn new(seed: usize, point: &TripPoint) -> Self {
        Self {
            seed,
            members: vec![seed],
            sum_lat: point.latitude,
            sum_lng: point.longitude,
        }
    }

    fn push(&mut self, index: usize, point: &TripPoint) {
        self.members.push(index);
        self.sum_lat += point.latitude;
        self.sum_lng += point.longitude;
    }

    /// Number of member points. Always at least 1.
    pub fn len(&self) -> usize {
        self.members.len()
    }

    /// A bin is never empty; provided for API symmetry.
    pub fn is_empty(&self) -> bool {
        self.members.is_empty()
    }

    /// Mean coordinate of the members as (latitude, longitude).
    pub fn centroid(&self) -> (f64, f64) {
        let n = self.members.len() as f64;
        (self.sum_lat / n, self.sum_lng / n)
    }
}

/// Bin seed wrapper for R-tree lookup during the greedy scan.
#[derive(Debug, Clone)]
struct BinSeed {
    bin_index: usize,
    latitude: f64,
    longitude: f64,
}

impl RTreeObject for BinSeed {
    type Envelope = AABB<[f64; 2]>;

    fn envelope(&self) -> Self::Envelope {
        AABB::from_point([self.longitude, self.latitude])
    }
}

/// Remove spatial noise from a point sequence by proximity binning.
///
/// Returns the denoised points (original encounter order preserved) and the
/// surviving bins. Bin member indices refer to positions in the `points`
/// slice passed in, not into the filtered output.
///
/// Guarantees:
/// - `filtered.len() <= points.len()` and `bins.len() <= points.len()`
/// - empty input yields `(vec![], vec![])`
pub fn remove_noise(
    points: &[TripPoint],
    radius_meters: f64,
    min_bin_size: usize,
) -> (Vec<TripPoint>, Vec<Bin>) {
    if points.is_empty() {
        return (Vec::new(), Vec::new());
    }

    let mut bins: Vec<Bin> = Vec::new();
    let mut seeds: RTree<BinSeed> = RTree::new();

    for (index, point) in points.iter().enumerate() {
        match nearest_bin(&seeds, point, radius_meters) {
            Some(bin_index) => bins[bin_index].push(index, point),
            None => {
                let bin_index = bins.len();
                bins.push(Bin::new(index, point));
                seeds.insert(BinSeed {
                    bin_index,
                    latitude: point.latitude,
                    longitude: point.longitude,
                });
            }
        }
    }

    // Bins below the member cutoff are noise; their points are discarded.
    let survivors: Vec<Bin> = bins.into_iter().filter(|b| b.len() >= min_bin_size).collect();

    let mut keep = vec![false; points.len()];
    for bin in &survivors {
        for &member in &bin.members {
            keep[member] = true;
        }
    }

    let filtered: Vec<TripPoint> = points
        .iter()
        .enumerate()
        .filter(|(i, _)| keep[*i])
        .map(|(_, p)| p.clone())
        .collect();

    debug!(
        "noise removal: {} points -> {} points in {} bins (radius {} m)",
        points.len(),
        filtered.len(),
        survivors.len(),
        radius_meters
    );

    (filtered, survivors)
}

/// Find the nearest existing bin whose seed is within `radius_meters`.
///
/// The R-tree prefilters by a degree envelope; candidates are verified with
/// the haversine distance. Ties go to the lower bin index, so the result
/// only depends on encounter order.
fn nearest_bin(seeds: &RTree<BinSeed>, point: &TripPoint, radius_meters: f64) -> Option<usize> {
    let lat_pad = radius_meters / 111_320.0;
    let lng_pad = meters_to_degrees(radius_meters, point.latitude);
    let envelope = AABB::from_corners(
        [point.longitude - lng_pad, point.latitude - lat_pad],
        [point.longitude + lng_pad, point.latitude + lat_pad],
    );

    let mut best: Option<(f64, usize)> = None;
    for seed in seeds.locate_in_envelope_intersecting(&envelope) {
        let dist = haversine_coords(point.latitude, point.longitude, seed.latitude, seed.longitude);
        if dist > radius_meters {
            continue;
        }
        let closer = match best {
            None => true,
            Some((best_dist, best_index)) => {
                dist < best_dist || (dist == best_dist && seed.bin_index < best_index)
            }
        };
        if closer {
            best = Some((dist, seed.bin_index));
        }
    }

    best.map(|(_, index)| index)
}
