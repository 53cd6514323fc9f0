//! Live OSRM checks against a containerised `osrm-routed`.
//!
//! Needs Docker and a preprocessed (MLD) Nevada extract in `OSRM_DATA_DIR`
//! containing `nevada-latest.osrm*`. Run with `cargo test -- --ignored`.

mod fixtures;

use std::env;
use std::time::{Duration, Instant};

use testcontainers::core::{IntoContainerPort, Mount};
use testcontainers::runners::SyncRunner;
use testcontainers::{Container, GenericImage, ImageExt, ReuseDirective, TestcontainersError};

use delivery_planner::matrix::TravelMatrix;
use delivery_planner::osrm::{OsrmClient, OsrmConfig};
use delivery_planner::traits::{DistanceMatrixProvider, GeometryProvider};

use fixtures::{DEPOTS, STRIP_RESTAURANTS};

fn osrm_container() -> Result<(Container<GenericImage>, String), TestcontainersError> {
    let data_dir = env::var("OSRM_DATA_DIR").unwrap_or_else(|_| "osrm-data/nevada".to_string());

    let image = GenericImage::new("osrm/osrm-backend", "latest")
        .with_exposed_port(5000.tcp())
        .with_mount(Mount::bind_mount(data_dir, "/data"))
        .with_cmd(vec![
            "osrm-routed",
            "--algorithm",
            "mld",
            "/data/nevada-latest.osrm",
        ])
        .with_container_name("delivery-planner-osrm-nevada")
        .with_startup_timeout(Duration::from_secs(30))
        .with_reuse(ReuseDirective::Always);

    let container = image.start()?;
    let port = container.get_host_port_ipv4(5000.tcp())?;
    Ok((container, format!("http://127.0.0.1:{}", port)))
}

/// Polls until the server answers; it may still be loading data right after start.
fn wait_for_matrix(client: &OsrmClient, points: &[(f64, f64)]) -> Option<TravelMatrix> {
    let start = Instant::now();
    while start.elapsed() < Duration::from_secs(15) {
        if let Some(matrix) = client.matrix_for(points) {
            return Some(matrix);
        }
        std::thread::sleep(Duration::from_millis(500));
    }
    None
}

#[test]
#[ignore = "requires docker and a preprocessed OSRM extract"]
fn osrm_table_returns_live_matrix() {
    let (container, base_url) = osrm_container().expect("start OSRM container");
    let client = OsrmClient::new(OsrmConfig {
        base_url,
        ..OsrmConfig::default()
    })
    .expect("build OSRM client");

    let points = vec![
        DEPOTS[0].coords(),
        STRIP_RESTAURANTS[0].coords(),
        STRIP_RESTAURANTS[1].coords(),
    ];
    let matrix = wait_for_matrix(&client, &points).expect("OSRM answered with a matrix");

    assert!(matrix.used_live_data);
    assert!(matrix.is_valid_for(points.len()));
    assert!(matrix.distance(0, 2).unwrap() > 0.0);
    assert!(matrix.duration(0, 2).unwrap() > 0.0);

    drop(container);
}

#[test]
#[ignore = "requires docker and a preprocessed OSRM extract"]
fn osrm_route_returns_geometry() {
    let (container, base_url) = osrm_container().expect("start OSRM container");
    let client = OsrmClient::new(OsrmConfig {
        base_url,
        ..OsrmConfig::default()
    })
    .expect("build OSRM client");

    let stops = vec![DEPOTS[0].coords(), STRIP_RESTAURANTS[0].coords(), DEPOTS[0].coords()];
    wait_for_matrix(&client, &stops).expect("OSRM ready");

    let line = client.geometry_for(&stops, None).expect("route geometry");
    assert!(line.len() >= 2);

    drop(container);
}
