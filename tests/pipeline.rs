//! End-to-end pipeline tests

use tourmodel::synthetic::{PlaceSpec, SyntheticScenario};
use tourmodel::{
    cluster, remove_noise, InMemoryPointRepository, PipelineConfig, PointRepository,
    TourModelError, TourPipeline, TripPoint,
};

/// Surface pipeline stage logs when tests run with RUST_LOG set.
fn init_diagnostics() {
    let _ = env_logger::builder().is_test(true).try_init();
}

fn two_place_scenario(identity: &str) -> SyntheticScenario {
    SyntheticScenario {
        identity: identity.to_string(),
        places: vec![
            PlaceSpec { latitude: 37.7749, longitude: -122.4194, visits: 6 },
            PlaceSpec { latitude: 37.8044, longitude: -122.2712, visits: 6 },
        ],
        scatter_spread_meters: 20.0,
        outliers: 3,
        outlier_spread_meters: 20_000.0,
        seed: 42,
    }
}

fn populated_repo(identity: &str) -> InMemoryPointRepository {
    let mut repo = InMemoryPointRepository::new();
    repo.insert_many(two_place_scenario(identity).generate());
    repo
}

#[test]
fn test_identity_without_points_yields_empty_model() {
    init_diagnostics();
    let pipeline = TourPipeline::new(InMemoryPointRepository::new());
    let model = pipeline.run("nobody", false).unwrap();
    assert!(model.is_empty());
}

#[test]
fn test_populated_identity_yields_places() {
    init_diagnostics();
    let pipeline = TourPipeline::new(populated_repo("u1"));
    let model = pipeline.run("u1", false).unwrap();

    assert!(!model.is_empty());

    // Entry count is bounded by the cluster count a direct invocation of the
    // stages computes over the same data
    let config = pipeline.config().clone();
    let points = pipeline.repository().fetch_points("u1", false).unwrap();
    let (filtered, bins) = remove_noise(&points, config.radius_meters, config.min_bin_size);
    let outcome = cluster(&filtered, bins.len(), config.include_noise, &config);
    assert!(model.len() <= outcome.cluster_count);
}

#[test]
fn test_repeated_runs_are_identical() {
    init_diagnostics();
    let pipeline = TourPipeline::new(populated_repo("u1"));
    let first = pipeline.run("u1", false).unwrap();
    let second = pipeline.run("u1", false).unwrap();
    assert_eq!(first, second);
}

#[test]
fn test_discovered_places_match_ground_truth() {
    init_diagnostics();
    let pipeline = TourPipeline::new(populated_repo("u1"));
    let model = pipeline.run("u1", false).unwrap();

    assert_eq!(model.len(), 2);

    // Each ground-truth center has a discovered place within the bin radius
    for (truth_lat, truth_lng) in [(37.7749, -122.4194), (37.8044, -122.2712)] {
        let matched = model.iter().any(|(_, place)| {
            tourmodel::geo_utils::haversine_coords(place.latitude, place.longitude, truth_lat, truth_lng)
                < 200.0
        });
        assert!(matched, "no place near ({truth_lat}, {truth_lng})");
    }
}

#[test]
fn test_use_old_data_selects_legacy_source() {
    init_diagnostics();
    let mut repo = InMemoryPointRepository::new();
    for point in two_place_scenario("u1").generate() {
        repo.insert_legacy(point);
    }
    let pipeline = TourPipeline::new(repo);

    assert!(pipeline.run("u1", false).unwrap().is_empty());
    assert!(!pipeline.run("u1", true).unwrap().is_empty());
}

#[test]
fn test_batch_mixes_populated_and_sparse_identities() {
    init_diagnostics();
    let pipeline = TourPipeline::new(populated_repo("u1"));
    let identities = vec!["u1".to_string(), "ghost".to_string()];

    let results = pipeline.run_batch(&identities, false).unwrap();
    assert_eq!(results.len(), 2);

    let by_identity: std::collections::HashMap<_, _> = results.into_iter().collect();
    assert!(!by_identity["u1"].is_empty());
    assert!(by_identity["ghost"].is_empty());
}

#[test]
fn test_custom_config_is_honored() {
    init_diagnostics();
    // A huge radius folds both places into one bin; with include_noise off
    // the pipeline still resolves them into at least one place
    let config = PipelineConfig {
        radius_meters: 50_000.0,
        ..PipelineConfig::default()
    };
    let pipeline = TourPipeline::with_config(populated_repo("u1"), config);
    let model = pipeline.run("u1", false).unwrap();
    assert!(!model.is_empty());
}

/// Repository that always fails, standing in for a broken store.
struct BrokenRepository;

impl PointRepository for BrokenRepository {
    fn fetch_points(&self, identity: &str, _use_old_data: bool) -> tourmodel::Result<Vec<TripPoint>> {
        Err(TourModelError::store_failure(identity, "connection refused"))
    }
}

#[test]
fn test_store_failure_propagates() {
    init_diagnostics();
    let pipeline = TourPipeline::new(BrokenRepository);
    let err = pipeline.run("u1", false).unwrap_err();
    assert!(matches!(err, TourModelError::StoreFailure { .. }));
    assert!(err.to_string().contains("u1"));
}
