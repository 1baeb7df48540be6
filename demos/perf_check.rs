use kdthree::points;
use kdthree::KdTreeFlat;

fn main() {
    // Initialize Rayon explicitly so thread creation (clone3) happens
    // before the heavy batch query we want to profile.
    rayon::ThreadPoolBuilder::new().build_global().unwrap();

    let cloud = points::random_points(100_000, [0.0; 3], [100.0; 3]);
    // Offset the same distribution so queries don't coincide with points.
    let queries: Vec<f64> = cloud.iter().map(|c| c * 0.97 + 1.3).collect();

    let flat = KdTreeFlat::from_points(&cloud);

    // Run the batch query (this is the hot path)
    let answers = flat.find_nearest_batch(&cloud, &queries);

    let found = answers.iter().filter(|a| a.is_some()).count();
    println!("{} of {} queries answered", found, answers.len());
}
