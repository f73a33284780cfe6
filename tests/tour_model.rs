//! Tests for tour model construction

use tourmodel::{
    build_tour_model, ClusterOutcome, PlaceLabel, PointRole, TourModel, TripPoint,
};

fn pt(lat: f64, lng: f64, timestamp: i64, role: PointRole) -> TripPoint {
    TripPoint::new("u1", lat, lng, timestamp, role)
}

#[test]
fn test_empty_outcome_yields_empty_model() {
    let model = build_tour_model(&ClusterOutcome::empty());
    assert!(model.is_empty());
    assert_eq!(model.len(), 0);
}

#[test]
fn test_all_noise_outcome_yields_empty_model() {
    let outcome = ClusterOutcome {
        cluster_count: 0,
        labels: vec![PlaceLabel::Noise; 3],
        used_points: vec![
            pt(37.77, -122.41, 0, PointRole::TripStart),
            pt(37.78, -122.42, 1, PointRole::TripEnd),
            pt(37.79, -122.43, 2, PointRole::TripStart),
        ],
    };
    assert!(build_tour_model(&outcome).is_empty());
}

#[test]
fn test_entry_count_bounded_by_cluster_count() {
    let outcome = ClusterOutcome {
        cluster_count: 2,
        labels: vec![
            PlaceLabel::Place(0),
            PlaceLabel::Place(0),
            PlaceLabel::Noise,
            PlaceLabel::Place(1),
        ],
        used_points: vec![
            pt(37.7749, -122.4194, 100, PointRole::TripStart),
            pt(37.7751, -122.4196, 200, PointRole::TripEnd),
            pt(37.9000, -122.0000, 300, PointRole::TripStart),
            pt(37.8044, -122.2712, 400, PointRole::TripEnd),
        ],
    };

    let model = build_tour_model(&outcome);
    assert!(model.len() <= outcome.cluster_count);
    assert_eq!(model.len(), 2);
}

#[test]
fn test_metadata_aggregation() {
    let outcome = ClusterOutcome {
        cluster_count: 1,
        labels: vec![
            PlaceLabel::Place(0),
            PlaceLabel::Place(0),
            PlaceLabel::Place(0),
        ],
        used_points: vec![
            pt(37.7749, -122.4194, 300, PointRole::TripStart),
            pt(37.7751, -122.4196, 100, PointRole::TripEnd),
            pt(37.7753, -122.4198, 200, PointRole::TripStart),
        ],
    };

    let model = build_tour_model(&outcome);
    let place = model.get(0).expect("place 0 present");

    assert_eq!(place.point_count, 3);
    assert_eq!(place.trip_starts, 2);
    assert_eq!(place.trip_ends, 1);
    assert_eq!(place.first_seen, 100);
    assert_eq!(place.last_seen, 300);
    assert_eq!(place.members, vec![0, 1, 2]);

    // Centroid is the member mean
    assert!((place.latitude - 37.7751).abs() < 1e-9);
    assert!((place.longitude - (-122.4196)).abs() < 1e-9);

    let bounds = place.bounds.expect("bounds present");
    assert_eq!(bounds.min_lat, 37.7749);
    assert_eq!(bounds.max_lat, 37.7753);
}

#[test]
fn test_noise_contributes_nothing() {
    let outcome = ClusterOutcome {
        cluster_count: 1,
        labels: vec![PlaceLabel::Place(0), PlaceLabel::Noise],
        used_points: vec![
            pt(37.7749, -122.4194, 0, PointRole::TripStart),
            pt(37.9000, -122.0000, 1, PointRole::TripEnd),
        ],
    };

    let model = build_tour_model(&outcome);
    assert_eq!(model.len(), 1);
    assert_eq!(model.get(0).unwrap().point_count, 1);
}

#[test]
fn test_labels_iterate_in_order() {
    let outcome = ClusterOutcome {
        cluster_count: 3,
        labels: vec![
            PlaceLabel::Place(0),
            PlaceLabel::Place(1),
            PlaceLabel::Place(2),
        ],
        used_points: vec![
            pt(37.77, -122.41, 0, PointRole::TripStart),
            pt(37.80, -122.27, 1, PointRole::TripEnd),
            pt(37.68, -122.47, 2, PointRole::TripStart),
        ],
    };

    let model = build_tour_model(&outcome);
    let labels: Vec<usize> = model.labels().copied().collect();
    assert_eq!(labels, vec![0, 1, 2]);
}

#[test]
fn test_serde_round_trip() {
    let outcome = ClusterOutcome {
        cluster_count: 1,
        labels: vec![PlaceLabel::Place(0), PlaceLabel::Place(0)],
        used_points: vec![
            pt(37.7749, -122.4194, 0, PointRole::TripStart),
            pt(37.7751, -122.4196, 1, PointRole::TripEnd),
        ],
    };

    let model = build_tour_model(&outcome);
    let json = serde_json::to_string(&model).unwrap();
    let restored: TourModel = serde_json::from_str(&json).unwrap();
    assert_eq!(model, restored);
}
