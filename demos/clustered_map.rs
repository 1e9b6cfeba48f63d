//! Walkthrough of the clustering engine: insert markers, materialize at a
//! few zoom levels, and resolve a pick.
//!
//! Run with: `cargo run --example clustered_map`

use geocluster::{ClusterEngine, Config, MarkerType};
use std::collections::HashMap;

fn main() {
    env_logger::init();

    let config = Config::default().with_cluster_distance(80.0);
    let mut engine = ClusterEngine::with_config(config).expect("valid config");

    // A handful of Pacific Northwest landmarks plus one outlier
    let markers = [
        ("Portland", 45.5152, -122.6784),
        ("Vancouver WA", 45.6387, -122.6615),
        ("Seattle", 47.6062, -122.3321),
        ("Tacoma", 47.2529, -122.4443),
        ("Honolulu", 21.3069, -157.8583),
    ];
    for (name, lat, lon) in markers {
        let id = engine.add_marker(lat, lon);
        println!("added {name} as marker {}", id.value());
    }

    for zoom in [0, 6, 12] {
        let batch = engine.update(zoom);
        let clusters = batch
            .types
            .iter()
            .filter(|t| **t == MarkerType::Cluster)
            .count();
        println!(
            "zoom {zoom:>2}: {} glyphs ({} clusters, {} points)",
            batch.len(),
            clusters,
            batch.len() - clusters
        );
    }

    // Pretend the renderer reports a selection of the first glyph at zoom 6
    let len = engine.update(6).len();
    let cell_points: HashMap<u64, usize> = (0..len).map(|i| (i as u64, i)).collect();
    let selection = engine.resolve_picks(&[0], &cell_points);
    for marker in &selection.markers {
        println!("picked marker {}", marker.value());
    }
    for cluster in &selection.clusters {
        let node = engine.node(*cluster).expect("live cluster");
        println!(
            "picked cluster {} holding {} markers",
            cluster.value(),
            node.marker_count()
        );
    }

    let stats = engine.stats();
    println!(
        "{} markers, {} nodes created, {} live",
        stats.markers, stats.nodes_created, stats.nodes_live
    );
}
