//! The partition kernel shared by both tree builds: median-of-three split
//! selection and a single in-place partition pass over the index permutation.

/// Number of coordinate dimensions. The split axis cycles through
/// `depth % NUM_DIMS` during construction.
pub const NUM_DIMS: usize = 3;

/// Pick a split position in `inds[st..=en]` at the given axis with the
/// "median of three" heuristic: of the coordinate values at `st`, `en` and
/// the midpoint, return the position holding the middle value.
///
/// This is a heuristic, not a true median — it only makes the degenerate
/// always-pick-an-extreme case unlikely for shuffled input.
pub fn median_of_three(points: &[f64], inds: &[usize], st: usize, en: usize, axis: usize) -> usize {
    let a = points[inds[st] * NUM_DIMS + axis];
    let b = points[inds[en] * NUM_DIMS + axis];
    let mid = (st + en) / 2;
    let m = points[inds[mid] * NUM_DIMS + axis];

    if a > b {
        if m > a {
            return st;
        }
        if b > m {
            return en;
        }
        mid
    } else {
        if a > m {
            return st;
        }
        if m > b {
            return en;
        }
        mid
    }
}

/// Reorder `inds[st..=en]` in place around a median-of-three pivot at the
/// given axis and return the pivot's final position: everything left of it
/// has coordinate `<=` the pivot's, everything right of it `>=`.
///
/// Single forward pass, no allocation. The pivot is swapped to `st` and then
/// bubbles right one slot for every entry that stays on its left; entries
/// strictly greater than the pivot are swapped to the back of the range.
pub fn partition_range(
    points: &[f64],
    inds: &mut [usize],
    st: usize,
    en: usize,
    axis: usize,
) -> usize {
    let split = median_of_three(points, inds, st, en, axis);
    let pivot = points[inds[split] * NUM_DIMS + axis];
    inds.swap(st, split);

    let mut curr = st + 1;
    let mut end = en;

    while curr <= end {
        if points[inds[curr] * NUM_DIMS + axis] > pivot {
            inds.swap(curr, end);
            end -= 1;
        } else {
            inds.swap(curr - 1, curr);
            curr += 1;
        }
    }

    curr - 1
}

#[cfg(test)]
mod tests {
    use super::*;

    // x-coordinates only; y and z stay zero so axis 0 carries the values.
    fn cloud(xs: &[f64]) -> Vec<f64> {
        let mut points = Vec::with_capacity(xs.len() * NUM_DIMS);
        for &x in xs {
            points.push(x);
            points.push(0.0);
            points.push(0.0);
        }
        points
    }

    #[test]
    fn median_of_three_picks_middle_value() {
        let points = cloud(&[5.0, 1.0, 9.0, 3.0]);
        let inds = vec![0, 1, 2, 3];

        // Examined values: st = 5, mid = 1, en = 3. Middle value is 3 at `en`.
        assert_eq!(median_of_three(&points, &inds, 0, 3, 0), 3);

        // st = 1, mid = 9, en = 3 over the tail. Middle value is 3 at `en`.
        assert_eq!(median_of_three(&points, &inds, 1, 3, 0), 3);
    }

    #[test]
    fn partition_splits_around_pivot() {
        let points = cloud(&[7.0, 2.0, 9.0, 4.0, 1.0, 8.0, 3.0]);
        let mut inds: Vec<usize> = (0..7).collect();

        let sp = partition_range(&points, &mut inds, 0, 6, 0);
        let pivot = points[inds[sp] * NUM_DIMS];

        for &i in &inds[0..sp] {
            assert!(points[i * NUM_DIMS] <= pivot, "left of split must be <= pivot");
        }
        for &i in &inds[sp + 1..7] {
            assert!(points[i * NUM_DIMS] >= pivot, "right of split must be >= pivot");
        }
    }

    #[test]
    fn partition_keeps_permutation_intact() {
        let points = cloud(&[7.0, 2.0, 9.0, 4.0, 1.0, 8.0, 3.0]);
        let mut inds: Vec<usize> = (0..7).collect();

        partition_range(&points, &mut inds, 2, 5, 0);

        let mut seen = inds.clone();
        seen.sort_unstable();
        assert_eq!(seen, (0..7).collect::<Vec<usize>>());
        // Entries outside the range are untouched.
        assert_eq!(inds[0], 0);
        assert_eq!(inds[1], 1);
        assert_eq!(inds[6], 6);
    }

    #[test]
    fn single_element_range_is_its_own_split() {
        let points = cloud(&[7.0, 2.0]);
        let mut inds = vec![0, 1];
        assert_eq!(partition_range(&points, &mut inds, 1, 1, 0), 1);
    }
}
