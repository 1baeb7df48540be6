//! Helpers for flat coordinate buffers `[x, y, z, x, y, z, ...]`.

use rand::prelude::*;
use rand::rngs::StdRng;

use crate::partition::NUM_DIMS;

/// Number of points in a flat coordinate buffer.
pub fn count(points: &[f64]) -> usize {
    points.len() / NUM_DIMS
}

/// The point at the given original index.
pub fn point(points: &[f64], index: usize) -> [f64; 3] {
    [
        points[index * NUM_DIMS],
        points[index * NUM_DIMS + 1],
        points[index * NUM_DIMS + 2],
    ]
}

/// Squared Euclidean distance between two points.
pub fn squared_distance(a: [f64; 3], b: [f64; 3]) -> f64 {
    let dx = a[0] - b[0];
    let dy = a[1] - b[1];
    let dz = a[2] - b[2];
    dx * dx + dy * dy + dz * dz
}

/// Generate `count` points uniformly inside the axis-aligned box
/// `[min, max]`, as a flat coordinate buffer.
pub fn random_points(count: usize, min: [f64; 3], max: [f64; 3]) -> Vec<f64> {
    let mut rng = StdRng::seed_from_u64(get_seed());
    let mut points = Vec::with_capacity(count * NUM_DIMS);

    for _ in 0..count {
        for axis in 0..NUM_DIMS {
            points.push(min[axis] + rng.r#gen::<f64>() * (max[axis] - min[axis]));
        }
    }

    points
}

fn get_seed() -> u64 {
    #[cfg(target_arch = "wasm32")]
    {
        (js_sys::Math::random() * 4294967296.0) as u64
    }
    #[cfg(not(target_arch = "wasm32"))]
    {
        123456789 // Fixed seed for tests
    }
}
