use wasm_bindgen::prelude::*;

use crate::kdtree::KdTree;
use crate::kdtree_flat::KdTreeFlat;
use crate::points;

#[cfg(target_arch = "wasm32")]
use wasm_bindgen_rayon::init_thread_pool;

#[cfg(target_arch = "wasm32")]
#[wasm_bindgen]
pub fn init_threads(n: usize) -> js_sys::Promise {
    init_thread_pool(n)
}

/// Nearest-neighbour index backed by the node tree ([`KdTree`]).
///
/// The wrapper owns the point buffer alongside the tree, so JavaScript
/// callers hand coordinates over once and query by value afterwards.
/// Queries return `-1` (or `NaN` for distances) when the index is empty.
#[wasm_bindgen]
pub struct PointIndex {
    points: Vec<f64>,
    inner: KdTree,
}

#[wasm_bindgen]
impl PointIndex {
    /// Build from a flat coordinate array `[x, y, z, x, y, z, ...]`.
    #[wasm_bindgen(constructor)]
    pub fn new(points: Vec<f64>) -> PointIndex {
        let inner = KdTree::from_points(&points);
        PointIndex { points, inner }
    }

    #[wasm_bindgen(getter)]
    pub fn count_points(&self) -> usize {
        points::count(&self.points)
    }

    #[wasm_bindgen(getter)]
    pub fn points(&self) -> Vec<f64> {
        self.points.clone()
    }

    /// Replace all points at once and rebuild the tree.
    pub fn set_points(&mut self, points: &[f64]) {
        self.points = points.to_vec();
        self.inner = KdTree::from_points(&self.points);
    }

    /// Generate `count` random points inside the given box and rebuild.
    pub fn random_points(
        &mut self,
        count: usize,
        min_x: f64,
        min_y: f64,
        min_z: f64,
        max_x: f64,
        max_y: f64,
        max_z: f64,
    ) {
        self.points = points::random_points(count, [min_x, min_y, min_z], [max_x, max_y, max_z]);
        self.inner = KdTree::from_points(&self.points);
    }

    /// Original index of the nearest point, or `-1` if the index is empty.
    pub fn find_nearest(&self, x: f64, y: f64, z: f64) -> i32 {
        match self.inner.find_nearest([x, y, z]) {
            Some(index) => index as i32,
            None => -1,
        }
    }

    /// Distance to the nearest point, or `NaN` if the index is empty.
    pub fn find_nearest_distance(&self, x: f64, y: f64, z: f64) -> f64 {
        self.inner
            .find_nearest_distance([x, y, z])
            .unwrap_or(f64::NAN)
    }

    /// Indices of the `k` nearest points in non-decreasing distance order.
    pub fn find_k_nearest(&self, x: f64, y: f64, z: f64, k: usize) -> Vec<i32> {
        self.inner
            .find_k_nearest([x, y, z], k)
            .into_iter()
            .map(|index| index as i32)
            .collect()
    }

    /// Distances of the `k` nearest points in non-decreasing order.
    pub fn find_k_nearest_distances(&self, x: f64, y: f64, z: f64, k: usize) -> Vec<f64> {
        self.inner.find_k_nearest_distances([x, y, z], k)
    }

    /// Indices of up to `k` neighbours at strictly increasing distances.
    pub fn find_k_nearest_distinct(&self, x: f64, y: f64, z: f64, k: usize) -> Vec<i32> {
        self.inner
            .find_k_nearest_distinct([x, y, z], k)
            .into_iter()
            .map(|index| index as i32)
            .collect()
    }

    /// Pre-order dump of pivot indices, indented by depth.
    pub fn dump(&self) -> String {
        self.inner.dump()
    }
}

/// Nearest-neighbour index backed by the flattened layout ([`KdTreeFlat`]),
/// intended for batch queries.
///
/// Call `init_threads` once before batch queries in the browser so rayon
/// has workers to fan out to. The flat arrays are released exactly once by
/// the wasm-bindgen-generated `free()` (or when the wrapper is dropped on
/// the Rust side).
#[wasm_bindgen]
pub struct PointIndexFlat {
    points: Vec<f64>,
    inner: KdTreeFlat,
}

#[wasm_bindgen]
impl PointIndexFlat {
    /// Build from a flat coordinate array `[x, y, z, x, y, z, ...]`.
    #[wasm_bindgen(constructor)]
    pub fn new(points: Vec<f64>) -> PointIndexFlat {
        let inner = KdTreeFlat::from_points(&points);
        PointIndexFlat { points, inner }
    }

    #[wasm_bindgen(getter)]
    pub fn count_points(&self) -> usize {
        points::count(&self.points)
    }

    #[wasm_bindgen(getter)]
    pub fn points(&self) -> Vec<f64> {
        self.points.clone()
    }

    /// Replace all points at once and rebuild the index.
    pub fn set_points(&mut self, points: &[f64]) {
        self.points = points.to_vec();
        self.inner = KdTreeFlat::from_points(&self.points);
    }

    /// Generate `count` random points inside the given box and rebuild.
    pub fn random_points(
        &mut self,
        count: usize,
        min_x: f64,
        min_y: f64,
        min_z: f64,
        max_x: f64,
        max_y: f64,
        max_z: f64,
    ) {
        self.points = points::random_points(count, [min_x, min_y, min_z], [max_x, max_y, max_z]);
        self.inner = KdTreeFlat::from_points(&self.points);
    }

    /// Original index of the nearest point, or `-1` if the index is empty.
    pub fn find_nearest(&self, x: f64, y: f64, z: f64) -> i32 {
        match self.inner.find_nearest(&self.points, [x, y, z]) {
            Some(index) => index as i32,
            None => -1,
        }
    }

    /// Distance to the nearest point, or `NaN` if the index is empty.
    pub fn find_nearest_distance(&self, x: f64, y: f64, z: f64) -> f64 {
        self.inner
            .find_nearest_distance(&self.points, [x, y, z])
            .unwrap_or(f64::NAN)
    }

    /// One nearest query per `[x, y, z]` triple of `queries`, in parallel.
    /// Each answer is the original index of the nearest point, `-1` if the
    /// index is empty.
    pub fn find_nearest_batch(&self, queries: &[f64]) -> Vec<i32> {
        self.inner
            .find_nearest_batch(&self.points, queries)
            .into_iter()
            .map(|answer| match answer {
                Some(index) => index as i32,
                None => -1,
            })
            .collect()
    }

    /// Indices of the `k` nearest points in non-decreasing distance order.
    pub fn find_k_nearest(&self, x: f64, y: f64, z: f64, k: usize) -> Vec<i32> {
        self.inner
            .find_k_nearest(&self.points, [x, y, z], k)
            .into_iter()
            .map(|index| index as i32)
            .collect()
    }

    /// Distances of the `k` nearest points in non-decreasing order.
    pub fn find_k_nearest_distances(&self, x: f64, y: f64, z: f64, k: usize) -> Vec<f64> {
        self.inner
            .find_k_nearest_distances(&self.points, [x, y, z], k)
    }

    /// Indices of up to `k` neighbours at strictly increasing distances.
    pub fn find_k_nearest_distinct(&self, x: f64, y: f64, z: f64, k: usize) -> Vec<i32> {
        self.inner
            .find_k_nearest_distinct(&self.points, [x, y, z], k)
            .into_iter()
            .map(|index| index as i32)
            .collect()
    }

    /// Pre-order dump of pivot indices, indented by depth.
    pub fn dump(&self) -> String {
        self.inner.dump()
    }

    /// Release the child and axis arrays without dropping the wrapper.
    pub fn clear(&mut self) {
        self.inner.clear();
    }
}
