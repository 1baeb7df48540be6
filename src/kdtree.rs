use crate::kbest::KBest;
use crate::partition::NUM_DIMS;
use crate::partition::partition_range;
use crate::points;

const NO_CHILD: u32 = u32::MAX;

#[derive(Clone, Copy, Debug)]
struct KdNode {
    pivot: [f64; 3],
    pivot_index: u32,
    axis: u8,
    left: u32, // NO_CHILD if absent
    right: u32,
}

/// A k-d tree over 3D points storing one node per point.
///
/// Nodes live in an append-only arena and carry their pivot coordinates, so
/// queries do not need the original buffer. Returned indices refer to the
/// buffer the tree was built from. The tree is immutable once built; queries
/// mutate only their own scratch state and can run concurrently.
pub struct KdTree {
    nodes: Vec<KdNode>,
    root: u32,
}

impl KdTree {
    /// Build a tree from a flat coordinate buffer `[x, y, z, x, y, z, ...]`.
    ///
    /// The buffer is read-only and is not retained. Construction reorders an
    /// internal index permutation, never the buffer itself. An empty buffer
    /// yields an empty index that answers every query with `None`.
    pub fn from_points(points: &[f64]) -> KdTree {
        let count = points::count(points);
        let mut tree = KdTree {
            nodes: Vec::with_capacity(count),
            root: NO_CHILD,
        };

        if count == 0 {
            return tree;
        }

        let mut inds: Vec<usize> = (0..count).collect();
        tree.root = tree.build_recursive(0, 0, count - 1, points, &mut inds);
        tree
    }

    fn build_recursive(
        &mut self,
        depth: usize,
        st: usize,
        en: usize,
        points: &[f64],
        inds: &mut [usize],
    ) -> u32 {
        let axis = depth % NUM_DIMS;
        let sp = partition_range(points, inds, st, en, axis);
        let pivot_index = inds[sp];

        let node_idx = self.nodes.len() as u32;
        self.nodes.push(KdNode {
            pivot: points::point(points, pivot_index),
            pivot_index: pivot_index as u32,
            axis: axis as u8,
            left: NO_CHILD,
            right: NO_CHILD,
        });

        if sp > st {
            let left = self.build_recursive(depth + 1, st, sp - 1, points, inds);
            self.nodes[node_idx as usize].left = left;
        }
        if sp < en {
            let right = self.build_recursive(depth + 1, sp + 1, en, points, inds);
            self.nodes[node_idx as usize].right = right;
        }

        node_idx
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    /// Original index of the root pivot, or `None` on an empty index.
    pub fn root(&self) -> Option<usize> {
        if self.root == NO_CHILD {
            return None;
        }
        Some(self.nodes[self.root as usize].pivot_index as usize)
    }

    /// Original index of the point nearest to `pt`, or `None` on an empty
    /// index.
    pub fn find_nearest(&self, pt: [f64; 3]) -> Option<usize> {
        if self.nodes.is_empty() {
            return None;
        }

        let mut best_sq = f64::INFINITY;
        let mut best_index = None;
        self.search(self.root, pt, f64::NEG_INFINITY, &mut best_sq, &mut best_index);
        best_index
    }

    /// Distance from `pt` to the nearest point, or `None` on an empty index.
    pub fn find_nearest_distance(&self, pt: [f64; 3]) -> Option<f64> {
        if self.nodes.is_empty() {
            return None;
        }

        let mut best_sq = f64::INFINITY;
        let mut best_index = None;
        self.search(self.root, pt, f64::NEG_INFINITY, &mut best_sq, &mut best_index);
        Some(best_sq.sqrt())
    }

    /// Original indices of the `k` points nearest to `pt`, in non-decreasing
    /// distance order.
    ///
    /// Single branch-and-bound descent accumulating into a bounded max-heap;
    /// coincident and equidistant points are all eligible, so the result is a
    /// true k-best multiset (unlike [`KdTree::find_k_nearest_distinct`]).
    ///
    /// # Panics
    ///
    /// Panics if `k` is zero or exceeds the number of indexed points.
    pub fn find_k_nearest(&self, pt: [f64; 3], k: usize) -> Vec<usize> {
        self.k_best(pt, k)
            .into_sorted()
            .into_iter()
            .map(|(index, _)| index)
            .collect()
    }

    /// Distances from `pt` to its `k` nearest points, in non-decreasing
    /// order.
    ///
    /// # Panics
    ///
    /// Panics if `k` is zero or exceeds the number of indexed points.
    pub fn find_k_nearest_distances(&self, pt: [f64; 3], k: usize) -> Vec<f64> {
        self.k_best(pt, k)
            .into_sorted()
            .into_iter()
            .map(|(_, sq)| sq.sqrt())
            .collect()
    }

    /// Original indices of up to `k` neighbours of `pt` at strictly
    /// increasing distances, found by repeated full descents with an
    /// exclusion floor.
    ///
    /// Each round only accepts candidates strictly farther than the previous
    /// round's winner, so of several points tied at one distance exactly one
    /// is returned, and a point coincident with `pt` is never returned (the
    /// floor starts at zero). The result holds fewer than `k` indices when
    /// the remaining points all tie excluded distances.
    ///
    /// # Panics
    ///
    /// Panics if `k` is zero or exceeds the number of indexed points.
    pub fn find_k_nearest_distinct(&self, pt: [f64; 3], k: usize) -> Vec<usize> {
        self.distinct_rounds(pt, k)
            .into_iter()
            .map(|(index, _)| index)
            .collect()
    }

    /// Distances of up to `k` neighbours found like
    /// [`KdTree::find_k_nearest_distinct`], strictly increasing.
    ///
    /// # Panics
    ///
    /// Panics if `k` is zero or exceeds the number of indexed points.
    pub fn find_k_nearest_distinct_distances(&self, pt: [f64; 3], k: usize) -> Vec<f64> {
        self.distinct_rounds(pt, k)
            .into_iter()
            .map(|(_, sq)| sq.sqrt())
            .collect()
    }

    /// Pre-order listing of pivot indices, one per line, indented by depth.
    /// Mainly useful for getting a rough idea of how deep the tree is, and
    /// therefore how well the splitting heuristic is performing.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        if self.root != NO_CHILD {
            self.dump_node(self.root, 0, &mut out);
        }
        out
    }

    fn dump_node(&self, node_idx: u32, level: usize, out: &mut String) {
        let node = &self.nodes[node_idx as usize];
        out.push_str(&format!("{:>width$}\n", node.pivot_index, width = level));

        if node.left != NO_CHILD {
            self.dump_node(node.left, level + 2, out);
        }
        if node.right != NO_CHILD {
            self.dump_node(node.right, level + 2, out);
        }
    }

    fn check_k(&self, k: usize) {
        if k < 1 || k > self.nodes.len() {
            panic!(
                "k must be between 1 and the number of indexed points ({}), got {}",
                self.nodes.len(),
                k
            );
        }
    }

    // Branch-and-bound descent. Candidates at squared distance <= floor_sq
    // are ignored; pass negative infinity to accept everything.
    fn search(
        &self,
        node_idx: u32,
        pt: [f64; 3],
        floor_sq: f64,
        best_sq: &mut f64,
        best_index: &mut Option<usize>,
    ) {
        let node = &self.nodes[node_idx as usize];

        let sq_dist = points::squared_distance(node.pivot, pt);
        if sq_dist < *best_sq && sq_dist > floor_sq {
            *best_sq = sq_dist;
            *best_index = Some(node.pivot_index as usize);
        }

        let axis = node.axis as usize;
        let plane_dist = pt[axis] - node.pivot[axis];

        // Near side first; ties go left.
        let (near, far) = if plane_dist <= 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if near != NO_CHILD {
            self.search(near, pt, floor_sq, best_sq, best_index);
        }

        // The far subtree can only hold a closer point if the splitting
        // plane itself is closer than the current best.
        if far != NO_CHILD && *best_sq > plane_dist * plane_dist {
            self.search(far, pt, floor_sq, best_sq, best_index);
        }
    }

    fn search_k(&self, node_idx: u32, pt: [f64; 3], best: &mut KBest) {
        let node = &self.nodes[node_idx as usize];

        best.offer(
            points::squared_distance(node.pivot, pt),
            node.pivot_index as usize,
        );

        let axis = node.axis as usize;
        let plane_dist = pt[axis] - node.pivot[axis];

        let (near, far) = if plane_dist <= 0.0 {
            (node.left, node.right)
        } else {
            (node.right, node.left)
        };

        if near != NO_CHILD {
            self.search_k(near, pt, best);
        }
        if far != NO_CHILD && best.bound_sq() > plane_dist * plane_dist {
            self.search_k(far, pt, best);
        }
    }

    fn k_best(&self, pt: [f64; 3], k: usize) -> KBest {
        self.check_k(k);

        let mut best = KBest::new(k);
        self.search_k(self.root, pt, &mut best);
        best
    }

    fn distinct_rounds(&self, pt: [f64; 3], k: usize) -> Vec<(usize, f64)> {
        self.check_k(k);

        let mut results = Vec::with_capacity(k);
        let mut min_sq = 0.0;

        for _ in 0..k {
            let mut best_sq = f64::INFINITY;
            let mut best_index = None;
            self.search(self.root, pt, min_sq, &mut best_sq, &mut best_index);

            let index = match best_index {
                Some(index) => index,
                None => break, // every remaining point ties an excluded distance
            };

            results.push((index, best_sq));
            min_sq = best_sq;
        }

        results
    }
}
