use kdthree::partition::{median_of_three, partition_range};
use rand::prelude::*;
use rand::rngs::StdRng;

fn random_cloud(rng: &mut StdRng, count: usize) -> Vec<f64> {
    let mut cloud = Vec::with_capacity(count * 3);
    for _ in 0..count {
        cloud.push(rng.gen_range(-100.0..100.0));
        cloud.push(rng.gen_range(-100.0..100.0));
        cloud.push(rng.gen_range(-100.0..100.0));
    }
    cloud
}

#[test]
fn test_partition_invariant_on_random_ranges() {
    let mut rng = StdRng::seed_from_u64(48);
    let cloud = random_cloud(&mut rng, 200);

    for _ in 0..500 {
        let st = rng.gen_range(0..200);
        let en = rng.gen_range(st..200);
        let axis = rng.gen_range(0..3);

        let mut inds: Vec<usize> = (0..200).collect();
        inds.shuffle(&mut rng);

        let sp = partition_range(&cloud, &mut inds, st, en, axis);
        assert!(sp >= st && sp <= en, "split must land inside the range");

        let pivot = cloud[inds[sp] * 3 + axis];
        for i in st..sp {
            assert!(
                cloud[inds[i] * 3 + axis] <= pivot,
                "entry left of the split exceeds the pivot"
            );
        }
        for i in sp + 1..=en {
            assert!(
                cloud[inds[i] * 3 + axis] >= pivot,
                "entry right of the split undercuts the pivot"
            );
        }
    }
}

#[test]
fn test_partition_preserves_the_permutation() {
    let mut rng = StdRng::seed_from_u64(9);
    let cloud = random_cloud(&mut rng, 64);

    let mut inds: Vec<usize> = (0..64).collect();
    inds.shuffle(&mut rng);
    let before = inds.clone();

    partition_range(&cloud, &mut inds, 10, 50, 1);

    let mut sorted = inds.clone();
    sorted.sort_unstable();
    assert_eq!(sorted, (0..64).collect::<Vec<usize>>());
    assert_eq!(&inds[..10], &before[..10], "entries before the range moved");
    assert_eq!(&inds[51..], &before[51..], "entries after the range moved");
}

#[test]
fn test_median_of_three_examines_only_three_positions() {
    let mut rng = StdRng::seed_from_u64(17);
    let cloud = random_cloud(&mut rng, 32);
    let inds: Vec<usize> = (0..32).collect();

    for _ in 0..200 {
        let st = rng.gen_range(0..32);
        let en = rng.gen_range(st..32);
        let axis = rng.gen_range(0..3);

        let choice = median_of_three(&cloud, &inds, st, en, axis);
        let mid = (st + en) / 2;
        assert!(
            choice == st || choice == en || choice == mid,
            "median of three must pick one of the examined positions"
        );

        // With three pairwise distinct values the heuristic picks the true
        // middle one.
        let a = cloud[inds[st] * 3 + axis];
        let b = cloud[inds[en] * 3 + axis];
        let m = cloud[inds[mid] * 3 + axis];
        let chosen = cloud[inds[choice] * 3 + axis];
        if a != b && a != m && b != m {
            let mut sorted = [a, b, m];
            sorted.sort_by(|x, y| x.partial_cmp(y).unwrap());
            assert_eq!(chosen, sorted[1], "median of three must pick the middle value");
        }
    }
}
