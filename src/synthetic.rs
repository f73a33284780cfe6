//! Synthetic trip-endpoint generator for tests and benchmarks.
//!
//! Produces endpoint sets with known ground truth: a configurable set of
//! place centers with jittered visits, plus scattered outlier fixes. All
//! randomness comes from a seeded `StdRng`, so a scenario always generates
//! the same points.
//!
//! Feature-gated behind `synthetic` — not included in production builds.
//!
//! # Example
//!
//! ```rust
//! use tourmodel::synthetic::{PlaceSpec, SyntheticScenario};
//!
//! let scenario = SyntheticScenario {
//!     identity: "u1".to_string(),
//!     places: vec![
//!         PlaceSpec { latitude: 37.7749, longitude: -122.4194, visits: 6 },
//!         PlaceSpec { latitude: 37.8044, longitude: -122.2712, visits: 6 },
//!     ],
//!     scatter_spread_meters: 20.0,
//!     outliers: 3,
//!     outlier_spread_meters: 20_000.0,
//!     seed: 42,
//! };
//!
//! let points = scenario.generate();
//! assert_eq!(points.len(), 15);
//! ```

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::geo_utils::meters_to_degrees;
use crate::{PointRole, TripPoint};

/// A ground-truth place: a center coordinate visited a number of times.
#[derive(Debug, Clone)]
pub struct PlaceSpec {
    pub latitude: f64,
    pub longitude: f64,
    /// Number of endpoint fixes generated around this center.
    pub visits: usize,
}

/// Configuration for one synthetic endpoint dataset.
#[derive(Debug, Clone)]
pub struct SyntheticScenario {
    /// Identity stamped on every generated point.
    pub identity: String,
    /// Ground-truth places, in generation order.
    pub places: Vec<PlaceSpec>,
    /// Uniform jitter applied around each place center, in meters.
    pub scatter_spread_meters: f64,
    /// Number of isolated outlier fixes appended after the place visits.
    pub outliers: usize,
    /// Spread of outlier fixes around the first place, in meters.
    pub outlier_spread_meters: f64,
    /// RNG seed; identical scenarios generate identical points.
    pub seed: u64,
}

impl SyntheticScenario {
    /// Generate the endpoint set for this scenario.
    ///
    /// Points alternate between trip-start and trip-end roles, with
    /// timestamps one hour apart in generation order.
    pub fn generate(&self) -> Vec<TripPoint> {
        let mut rng = StdRng::seed_from_u64(self.seed);
        let mut points = Vec::new();

        for place in &self.places {
            for _ in 0..place.visits {
                let (lat, lng) = jitter(
                    &mut rng,
                    place.latitude,
                    place.longitude,
                    self.scatter_spread_meters,
                );
                points.push(self.point(points.len(), lat, lng));
            }
        }

        let origin = self.places.first().cloned().unwrap_or(PlaceSpec {
            latitude: 0.0,
            longitude: 0.0,
            visits: 0,
        });
        for _ in 0..self.outliers {
            let (lat, lng) = jitter(
                &mut rng,
                origin.latitude,
                origin.longitude,
                self.outlier_spread_meters,
            );
            points.push(self.point(points.len(), lat, lng));
        }

        points
    }

    fn point(&self, index: usize, latitude: f64, longitude: f64) -> TripPoint {
        let role = if index % 2 == 0 {
            PointRole::TripStart
        } else {
            PointRole::TripEnd
        };
        TripPoint::new(&self.identity, latitude, longitude, index as i64 * 3600, role)
    }
}

/// Offset a coordinate by up to `spread_meters` in each axis, uniformly.
fn jitter(rng: &mut StdRng, latitude: f64, longitude: f64, spread_meters: f64) -> (f64, f64) {
    let lat_offset = (rng.gen::<f64>() - 0.5) * 2.0 * spread_meters / 111_320.0;
    let lng_offset =
        (rng.gen::<f64>() - 0.5) * 2.0 * meters_to_degrees(spread_meters, latitude);
    (latitude + lat_offset, longitude + lng_offset)
}
