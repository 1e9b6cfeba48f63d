use geocluster::mercator::{FINEST_LEVEL, NUM_LEVELS, lat2y};
use geocluster::{ClusterEngine, Config, MarkerType, cluster_scale};
use std::collections::HashMap;

#[test]
fn test_marker_ids_are_sequential() {
    let mut engine = ClusterEngine::new();

    let n = 50;
    for i in 0..n {
        let lat = -40.0 + f64::from(i) * 1.5;
        let lon = -170.0 + f64::from(i) * 6.0;
        let id = engine.add_marker(lat, lon);
        assert_eq!(id.value(), i as usize);
    }
    assert_eq!(engine.marker_count(), n as usize);
}

#[test]
fn test_clustering_disabled_shows_every_marker() {
    let config = Config::default().with_clustering(false);
    let mut engine = ClusterEngine::with_config(config).unwrap();

    let markers = [
        (40.7128, -74.0060),
        (40.7130, -74.0061), // nearly coincident with the first
        (51.5074, -0.1278),
        (-33.8688, 151.2093),
    ];
    for (lat, lon) in markers {
        engine.add_marker(lat, lon);
    }

    // Whatever the zoom, every marker stays an individual point
    for zoom in [0, 7, 19] {
        let batch = engine.update(zoom).clone();
        assert_eq!(batch.len(), markers.len());
        assert!(batch.types.iter().all(|t| *t == MarkerType::Point));
    }

    // Entries carry the projected marker positions
    let batch = engine.update(0).clone();
    for (i, (lat, lon)) in markers.iter().enumerate() {
        assert_eq!(batch.positions[i].x(), *lon);
        assert!((batch.positions[i].y() - lat2y(*lat)).abs() < 1e-12);
    }
}

#[test]
fn test_mutually_close_markers_collapse_at_level_zero() {
    let mut engine = ClusterEngine::new();

    let k = 12;
    for i in 0..k {
        engine.add_marker(48.85 + f64::from(i) * 0.00001, 2.35);
    }

    let batch = engine.update(0).clone();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch.types[0], MarkerType::Cluster);
    assert_eq!(
        batch.scales[0],
        cluster_scale(k, engine.config().max_cluster_scale_factor)
    );

    let node = engine.nodes_at_level(0)[0];
    assert_eq!(node.marker_count(), k);
}

#[test]
fn test_far_markers_stay_separate_at_finest_level() {
    let mut engine = ClusterEngine::new();
    engine.add_marker(0.0, 0.0);
    engine.add_marker(45.0, -122.0);

    let batch = engine.update(FINEST_LEVEL as i32).clone();
    assert_eq!(batch.len(), 2);
    assert!(batch.types.iter().all(|t| *t == MarkerType::Point));
}

#[test]
fn test_materialization_idempotent_without_changes() {
    let mut engine = ClusterEngine::new();
    for i in 0..10 {
        engine.add_marker(34.0 + f64::from(i) * 0.01, -118.2 - f64::from(i) * 0.01);
    }

    for zoom in [0, 8, 19] {
        let first = engine.update(zoom).clone();
        let second = engine.update(zoom).clone();
        assert_eq!(first, second, "zoom {zoom}");
    }
}

#[test]
fn test_near_pair_then_portland_scenario() {
    let mut engine = ClusterEngine::new();

    engine.add_marker(0.0, 0.0);
    engine.add_marker(0.0001, 0.0001);

    let batch = engine.update(0).clone();
    assert_eq!(batch.len(), 1);
    assert_eq!(batch.types[0], MarkerType::Cluster);
    let cluster = engine.nodes_at_level(0)[0];
    assert_eq!(cluster.marker_count(), 2);

    engine.add_marker(45.0, -122.0);

    let batch = engine.update(0).clone();
    assert_eq!(batch.len(), 2);
    let mut counts: Vec<u32> = engine
        .nodes_at_level(0)
        .iter()
        .map(|n| n.marker_count())
        .collect();
    counts.sort_unstable();
    assert_eq!(counts, vec![1, 2]);
}

#[test]
fn test_pick_round_trip_through_materialization() {
    let mut engine = ClusterEngine::new();
    let a = engine.add_marker(0.0, 0.0);
    let b = engine.add_marker(0.0001, 0.0001);
    let far = engine.add_marker(45.0, -122.0);

    let len = engine.update(0).len();
    let cell_points: HashMap<u64, usize> = (0..len).map(|i| (i as u64 * 10, i)).collect();
    let cells: Vec<u64> = cell_points.keys().copied().collect();

    let selection = engine.resolve_picks(&cells, &cell_points);
    assert_eq!(selection.markers, vec![far]);
    assert_eq!(selection.clusters.len(), 1);

    let cluster = engine.node(selection.clusters[0]).unwrap();
    assert_eq!(cluster.marker_count(), 2);

    // The cluster subsumes both original markers somewhere down its subtree
    let mut stack = vec![cluster.id()];
    let mut found = Vec::new();
    while let Some(id) = stack.pop() {
        let node = engine.node(id).unwrap();
        if let Some(marker) = node.marker_id() {
            found.push(marker);
        }
        stack.extend(node.children());
    }
    found.sort_unstable();
    assert_eq!(found, vec![a, b]);
}

#[test]
fn test_every_level_accounts_for_all_markers() {
    let mut engine = ClusterEngine::new();

    // A spread of world cities plus a dense downtown cluster
    let markers = [
        (40.7128, -74.0060),
        (40.7138, -74.0050),
        (40.7148, -74.0040),
        (51.5074, -0.1278),
        (35.6762, 139.6503),
        (-23.5505, -46.6333),
        (55.7558, 37.6173),
        (19.4326, -99.1332),
    ];
    for (lat, lon) in markers {
        engine.add_marker(lat, lon);
    }

    for level in 0..NUM_LEVELS {
        let total: u32 = engine
            .nodes_at_level(level)
            .iter()
            .map(|n| n.marker_count())
            .sum();
        assert_eq!(total, markers.len() as u32, "level {level}");
    }
}

#[test]
fn test_reset_then_reuse() {
    let mut engine = ClusterEngine::new();
    engine.add_marker(10.0, 10.0);
    engine.add_marker(10.1, 10.1);
    engine.update(0);

    engine.reset();
    assert_eq!(engine.marker_count(), 0);
    assert!(engine.update(0).is_empty());

    let id = engine.add_marker(-10.0, -10.0);
    assert_eq!(id.value(), 0);
    assert_eq!(engine.update(0).len(), 1);
}

#[test]
fn test_stats_track_growth() {
    let mut engine = ClusterEngine::new();
    assert_eq!(engine.stats().nodes_created, 0);

    engine.add_marker(0.0, 0.0);
    let after_one = engine.stats();
    // A lone marker creates one node per level
    assert_eq!(after_one.nodes_created, NUM_LEVELS);
    assert_eq!(after_one.nodes_live, NUM_LEVELS);

    engine.add_marker(0.0001, 0.0001);
    let after_two = engine.stats();
    assert_eq!(after_two.markers, 2);
    // The second marker merges during its climb, adding only its leaf
    assert_eq!(after_two.nodes_created, NUM_LEVELS + 1);
    assert_eq!(after_two.nodes_live, after_two.nodes_created);
}
