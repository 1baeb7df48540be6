use rayon::prelude::*;

use crate::kbest::KBest;
use crate::partition::NUM_DIMS;
use crate::partition::partition_range;
use crate::points;

/// A k-d tree flattened into parallel arrays keyed by original point index.
///
/// Node identity is the point's position in the input buffer: a node's split
/// axis lives at `axes[index]` and its children at `left_children[index]` /
/// `right_children[index]`, with `-1` for "no such child". No coordinates are
/// stored — queries read them from the caller's buffer, which must be the one
/// the index was built from.
///
/// The flat layout exists for batch workloads: once built the arrays are
/// never mutated, so any number of queries can run concurrently, each with
/// its own scratch state ([`KdTreeFlat::find_nearest_batch`]).
pub struct KdTreeFlat {
    /// Original index of each node's left child, `-1` if absent.
    pub left_children: Vec<i32>,
    /// Original index of each node's right child, `-1` if absent.
    pub right_children: Vec<i32>,
    /// Split axis of each node, `-1` for slots not yet linked.
    pub axes: Vec<i32>,
    /// Original index of the root pivot, `-1` on an empty index.
    pub root: i32,
}

impl KdTreeFlat {
    /// Build the flat index from a flat coordinate buffer
    /// `[x, y, z, x, y, z, ...]`.
    ///
    /// Same construction algorithm as [`crate::KdTree`]: recursive
    /// median-of-three partitioning of an index permutation, axis cycling by
    /// depth. The three arrays are allocated together up front and populated
    /// in one pass.
    pub fn from_points(points: &[f64]) -> KdTreeFlat {
        let count = points::count(points);
        let mut tree = KdTreeFlat {
            left_children: vec![-1; count],
            right_children: vec![-1; count],
            axes: vec![-1; count],
            root: -1,
        };

        if count == 0 {
            return tree;
        }

        let mut inds: Vec<usize> = (0..count).collect();
        tree.root = tree.build_recursive(0, 0, count - 1, points, &mut inds) as i32;
        tree
    }

    // Returns the original index of the subtree's pivot; the caller links it
    // into its own child slot.
    fn build_recursive(
        &mut self,
        depth: usize,
        st: usize,
        en: usize,
        points: &[f64],
        inds: &mut [usize],
    ) -> usize {
        let axis = depth % NUM_DIMS;
        let sp = partition_range(points, inds, st, en, axis);
        let pivot_index = inds[sp];

        self.axes[pivot_index] = axis as i32;

        if sp > st {
            let left = self.build_recursive(depth + 1, st, sp - 1, points, inds);
            self.left_children[pivot_index] = left as i32;
        }
        if sp < en {
            let right = self.build_recursive(depth + 1, sp + 1, en, points, inds);
            self.right_children[pivot_index] = right as i32;
        }

        pivot_index
    }

    /// Number of indexed points.
    pub fn len(&self) -> usize {
        self.axes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.axes.is_empty()
    }

    /// Original index of the point nearest to `pt`, or `None` on an empty
    /// index.
    pub fn find_nearest(&self, points: &[f64], pt: [f64; 3]) -> Option<usize> {
        if self.root < 0 {
            return None;
        }

        let mut best_sq = f64::INFINITY;
        let mut best_index = None;
        self.search(
            points,
            self.root as usize,
            pt,
            f64::NEG_INFINITY,
            &mut best_sq,
            &mut best_index,
        );
        best_index
    }

    /// Distance from `pt` to the nearest point, or `None` on an empty index.
    pub fn find_nearest_distance(&self, points: &[f64], pt: [f64; 3]) -> Option<f64> {
        if self.root < 0 {
            return None;
        }

        let mut best_sq = f64::INFINITY;
        let mut best_index = None;
        self.search(
            points,
            self.root as usize,
            pt,
            f64::NEG_INFINITY,
            &mut best_sq,
            &mut best_index,
        );
        Some(best_sq.sqrt())
    }

    /// One independent nearest query per `[x, y, z]` triple of `queries`,
    /// fanned across the rayon pool.
    ///
    /// The index and point buffer are shared read-only between workers; each
    /// query owns its scratch state, so no locking is involved. A trailing
    /// partial triple is ignored.
    pub fn find_nearest_batch(&self, points: &[f64], queries: &[f64]) -> Vec<Option<usize>> {
        queries
            .par_chunks_exact(NUM_DIMS)
            .map(|q| self.find_nearest(points, [q[0], q[1], q[2]]))
            .collect()
    }

    /// Original indices of the `k` points nearest to `pt`, in non-decreasing
    /// distance order.
    ///
    /// Single branch-and-bound descent accumulating into a bounded max-heap;
    /// coincident and equidistant points are all eligible, so the result is a
    /// true k-best multiset (unlike [`KdTreeFlat::find_k_nearest_distinct`]).
    ///
    /// # Panics
    ///
    /// Panics if `k` is zero or exceeds the number of indexed points.
    pub fn find_k_nearest(&self, points: &[f64], pt: [f64; 3], k: usize) -> Vec<usize> {
        self.k_best(points, pt, k)
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
    pub fn find_k_nearest_distances(&self, points: &[f64], pt: [f64; 3], k: usize) -> Vec<f64> {
        self.k_best(points, pt, k)
            .into_sorted()
            .into_iter()
            .map(|(_, sq)| sq.sqrt())
            .collect()
    }

    /// Original indices of up to `k` neighbours of `pt` at strictly
    /// increasing distances, found by repeated full descents with an
    /// exclusion floor.
    ///
    /// Same semantics as [`crate::KdTree::find_k_nearest_distinct`]: one
    /// winner per distance shell, a point coincident with `pt` is never
    /// returned, and fewer than `k` indices come back when the remaining
    /// points all tie excluded distances.
    ///
    /// # Panics
    ///
    /// Panics if `k` is zero or exceeds the number of indexed points.
    pub fn find_k_nearest_distinct(&self, points: &[f64], pt: [f64; 3], k: usize) -> Vec<usize> {
        self.distinct_rounds(points, pt, k)
            .into_iter()
            .map(|(index, _)| index)
            .collect()
    }

    /// Distances of up to `k` neighbours found like
    /// [`KdTreeFlat::find_k_nearest_distinct`], strictly increasing.
    ///
    /// # Panics
    ///
    /// Panics if `k` is zero or exceeds the number of indexed points.
    pub fn find_k_nearest_distinct_distances(
        &self,
        points: &[f64],
        pt: [f64; 3],
        k: usize,
    ) -> Vec<f64> {
        self.distinct_rounds(points, pt, k)
            .into_iter()
            .map(|(_, sq)| sq.sqrt())
            .collect()
    }

    /// Pre-order listing of pivot indices, one per line, indented by depth.
    /// Same format as [`crate::KdTree::dump`]: both layouts built from the
    /// same buffer produce identical output.
    pub fn dump(&self) -> String {
        let mut out = String::new();
        if self.root >= 0 {
            self.dump_node(self.root as usize, 0, &mut out);
        }
        out
    }

    fn dump_node(&self, index: usize, level: usize, out: &mut String) {
        out.push_str(&format!("{:>width$}\n", index, width = level));

        let left = self.left_children[index];
        if left >= 0 {
            self.dump_node(left as usize, level + 2, out);
        }
        let right = self.right_children[index];
        if right >= 0 {
            self.dump_node(right as usize, level + 2, out);
        }
    }

    /// Release the child and axis arrays, returning the index to its empty
    /// state. Dropping the value releases them just as well; this is for
    /// callers that keep the value around but are done querying.
    pub fn clear(&mut self) {
        self.left_children = Vec::new();
        self.right_children = Vec::new();
        self.axes = Vec::new();
        self.root = -1;
    }

    fn check_k(&self, k: usize) {
        if k < 1 || k > self.axes.len() {
            panic!(
                "k must be between 1 and the number of indexed points ({}), got {}",
                self.axes.len(),
                k
            );
        }
    }

    // Branch-and-bound descent by table lookup. Candidates at squared
    // distance <= floor_sq are ignored; pass negative infinity to accept
    // everything.
    fn search(
        &self,
        points: &[f64],
        index: usize,
        pt: [f64; 3],
        floor_sq: f64,
        best_sq: &mut f64,
        best_index: &mut Option<usize>,
    ) {
        let pivot = points::point(points, index);

        let sq_dist = points::squared_distance(pivot, pt);
        if sq_dist < *best_sq && sq_dist > floor_sq {
            *best_sq = sq_dist;
            *best_index = Some(index);
        }

        let axis = self.axes[index] as usize;
        let plane_dist = pt[axis] - pivot[axis];

        // Near side first; ties go left.
        let (near, far) = if plane_dist <= 0.0 {
            (self.left_children[index], self.right_children[index])
        } else {
            (self.right_children[index], self.left_children[index])
        };

        if near >= 0 {
            self.search(points, near as usize, pt, floor_sq, best_sq, best_index);
        }
        if far >= 0 && *best_sq > plane_dist * plane_dist {
            self.search(points, far as usize, pt, floor_sq, best_sq, best_index);
        }
    }

    fn search_k(&self, points: &[f64], index: usize, pt: [f64; 3], best: &mut KBest) {
        let pivot = points::point(points, index);

        best.offer(points::squared_distance(pivot, pt), index);

        let axis = self.axes[index] as usize;
        let plane_dist = pt[axis] - pivot[axis];

        let (near, far) = if plane_dist <= 0.0 {
            (self.left_children[index], self.right_children[index])
        } else {
            (self.right_children[index], self.left_children[index])
        };

        if near >= 0 {
            self.search_k(points, near as usize, pt, best);
        }
        if far >= 0 && best.bound_sq() > plane_dist * plane_dist {
            self.search_k(points, far as usize, pt, best);
        }
    }

    fn k_best(&self, points: &[f64], pt: [f64; 3], k: usize) -> KBest {
        self.check_k(k);

        let mut best = KBest::new(k);
        self.search_k(points, self.root as usize, pt, &mut best);
        best
    }

    fn distinct_rounds(&self, points: &[f64], pt: [f64; 3], k: usize) -> Vec<(usize, f64)> {
        self.check_k(k);

        let mut results = Vec::with_capacity(k);
        let mut min_sq = 0.0;

        for _ in 0..k {
            let mut best_sq = f64::INFINITY;
            let mut best_index = None;
            self.search(
                points,
                self.root as usize,
                pt,
                min_sq,
                &mut best_sq,
                &mut best_index,
            );

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

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn links_children_on_parent_slots() {
        // Three collinear points: median 1.0 roots the tree, the others hang
        // off its child slots.
        let points = vec![
            0.0, 0.0, 0.0, //
            1.0, 0.0, 0.0, //
            2.0, 0.0, 0.0,
        ];
        let tree = KdTreeFlat::from_points(&points);

        assert_eq!(tree.root, 1);
        assert_eq!(tree.left_children[1], 0);
        assert_eq!(tree.right_children[1], 2);
        assert_eq!(tree.axes, vec![1, 0, 1]);
    }

    #[test]
    fn clear_releases_the_arrays() {
        let points = vec![0.0, 0.0, 0.0, 1.0, 0.0, 0.0];
        let mut tree = KdTreeFlat::from_points(&points);

        tree.clear();

        assert!(tree.is_empty());
        assert_eq!(tree.root, -1);
        assert_eq!(tree.find_nearest(&points, [0.0, 0.0, 0.0]), None);
    }
}
