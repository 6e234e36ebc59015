//! Testing utilities.

use glam::DVec2;

use crate::geometry::Polygon;

/// Initialize tracing subscriber for tests.
/// Safe to call multiple times - will only initialize once.
/// Respects RUST_LOG env var, defaults to "info".
pub fn init_tracing() {
    use tracing_subscriber::EnvFilter;
    let filter = EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info"));
    let _ = tracing_subscriber::fmt()
        .with_env_filter(filter)
        .with_test_writer()
        .try_init();
}

/// Closed `n`-gon approximating a circle; the first vertex is repeated.
pub fn circle(center: DVec2, radius: f64, n: usize) -> Polygon {
    let mut vertices: Vec<DVec2> = (0..n)
        .map(|i| {
            let a = std::f64::consts::TAU * i as f64 / n as f64;
            center + DVec2::new(a.cos(), a.sin()) * radius
        })
        .collect();
    vertices.push(vertices[0]);
    Polygon::new(vertices)
}

/// Closed axis-aligned rectangle; the first vertex is repeated.
pub fn rectangle(min: DVec2, max: DVec2) -> Polygon {
    Polygon::from_xy(&[
        (min.x, min.y),
        (max.x, min.y),
        (max.x, max.y),
        (min.x, max.y),
        (min.x, min.y),
    ])
}
