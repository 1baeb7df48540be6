//! # kdthree
//!
//! `kdthree` is a Rust library for exact nearest-neighbour and
//! k-nearest-neighbour search over 3D point sets, designed to be used in Rust
//! as well as compiled to WebAssembly (WASM). It provides a balanced k-d tree
//! built by median-of-three partitioning, in two storage layouts sharing the
//! same construction and search algorithms.
//!
//! ## Features
//!
//! - **Two layouts**: [`KdTree`] stores nodes with their pivot coordinates in
//!   an append-only arena; [`KdTreeFlat`] stores only child and axis arrays
//!   keyed by original point index, reading coordinates from the caller's
//!   buffer at query time.
//! - **Batch queries**: the flat layout answers many independent queries in
//!   parallel via `rayon` with no locking — the index is immutable once built.
//! - **WASM-first**: `wasm-bindgen` wrappers ([`PointIndex`],
//!   [`PointIndexFlat`]) expose both layouts to JavaScript and TypeScript.
//!
//! ## Example
//!
//! ```
//! use kdthree::KdTree;
//!
//! let points = vec![
//!     0.0, 0.0, 0.0,
//!     10.0, 0.0, 0.0,
//!     0.0, 10.0, 0.0,
//! ];
//! let tree = KdTree::from_points(&points);
//! assert_eq!(tree.find_nearest([1.0, 0.0, 0.0]), Some(0));
//! ```
//!
//! ## Main Interface
//!
//! Build either index once from a flat coordinate buffer
//! `[x, y, z, x, y, z, ...]`, then issue any number of side-effect-free
//! queries against it. Returned indices refer to the original buffer, which
//! must stay available for the lifetime of the index.

mod kbest;
mod kdtree;
mod kdtree_flat;
pub mod partition;
pub mod points;
mod wasm;

pub use kdtree::KdTree;
pub use kdtree_flat::KdTreeFlat;
pub use partition::NUM_DIMS;
pub use wasm::PointIndex;
pub use wasm::PointIndexFlat;
