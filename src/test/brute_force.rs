//! Compare tree searches against exhaustive scans.

use rand::rngs::StdRng;
use rand::{Rng, SeedableRng};

use crate::kdtree::{DistanceMetric, KDTree, KDTreeBuilder, KDTreeIndex, Manhattan};

fn random_points(rng: &mut StdRng, n: usize, dims: usize) -> Vec<Vec<f64>> {
    (0..n)
        .map(|_| (0..dims).map(|_| rng.gen_range(-100.0..100.0)).collect())
        .collect()
}

/// Every `(distance, id)` in the tree, nearest first.
fn scan<T: KDTreeIndex<f64>>(tree: &T, query: &[f64]) -> Vec<(f64, usize)> {
    let metric = tree.distance_metric();
    let mut all: Vec<(f64, usize)> = tree
        .nodes()
        .iter()
        .map(|node| (metric.distance(query, node.point()), node.id()))
        .collect();
    all.sort_by(|a, b| a.partial_cmp(b).unwrap());
    all
}

fn check_knn<T: KDTreeIndex<f64>>(tree: &T, query: &[f64]) {
    let expected = scan(tree, query);
    for k in 1..=tree.len() {
        let found = tree.knn(query, k);
        let want = &expected[..k];
        assert_eq!(
            found.distances,
            want.iter().map(|(d, _)| *d).collect::<Vec<_>>(),
            "k = {}",
            k
        );
        assert_eq!(
            found.ids,
            want.iter().map(|(_, id)| *id).collect::<Vec<_>>(),
            "k = {}",
            k
        );
        for (id, point, _) in found.iter() {
            assert_eq!(point, tree.nodes()[id].point());
        }
    }
}

fn check_dnn<T: KDTreeIndex<f64>>(tree: &T, query: &[f64], radius: f64) {
    let mut expected: Vec<usize> = scan(tree, query)
        .into_iter()
        .filter(|(d, _)| *d <= radius)
        .map(|(_, id)| id)
        .collect();
    let found = tree.dnn(query, radius);

    for pair in found.distances.windows(2) {
        assert!(pair[0] <= pair[1]);
    }
    assert!(found.distances.iter().all(|d| *d <= radius));

    let mut ids = found.ids.clone();
    ids.sort_unstable();
    expected.sort_unstable();
    assert_eq!(ids, expected, "radius {}", radius);
}

#[test]
fn knn_matches_scan_after_build() {
    let mut rng = StdRng::seed_from_u64(1);
    for dims in 1..=4 {
        let tree = KDTree::<f64>::from_points(dims, random_points(&mut rng, 80, dims)).unwrap();
        for query in random_points(&mut rng, 10, dims) {
            check_knn(&tree, &query);
        }
    }
}

#[test]
fn knn_matches_scan_after_inserts() {
    let mut rng = StdRng::seed_from_u64(2);
    let mut tree = KDTree::<f64>::new(3).unwrap();
    for point in random_points(&mut rng, 120, 3) {
        tree.insert(point);
    }
    for query in random_points(&mut rng, 10, 3) {
        check_knn(&tree, &query);
    }
}

#[test]
fn knn_matches_scan_with_manhattan() {
    let mut rng = StdRng::seed_from_u64(3);
    let mut builder = KDTreeBuilder::<f64>::new(2).metric(Manhattan);
    builder.add_all(random_points(&mut rng, 100, 2));
    let tree = builder.finish().unwrap();
    for query in random_points(&mut rng, 10, 2) {
        check_knn(&tree, &query);
    }
}

#[test]
fn dnn_matches_scan() {
    let mut rng = StdRng::seed_from_u64(4);
    let mut tree = KDTree::<f64>::from_points(2, random_points(&mut rng, 150, 2)).unwrap();
    for point in random_points(&mut rng, 50, 2) {
        tree.insert(point);
    }
    for query in random_points(&mut rng, 20, 2) {
        for radius in [1.0, 100.0, 900.0, 5000.0, 100000.0] {
            check_dnn(&tree, &query, radius);
        }
    }
}

#[test]
fn dnn_on_integer_grid_with_duplicates() {
    // many equal coordinates, and points sitting exactly on the radius
    let mut points = vec![];
    for x in 0..8 {
        for y in 0..8 {
            points.push(vec![x as f64, y as f64]);
            points.push(vec![x as f64, y as f64]);
        }
    }
    let tree = KDTree::<f64>::from_points(2, points).unwrap();
    for query in [[0., 0.], [3., 4.], [7., 7.], [3.5, 2.]] {
        for radius in [1.0, 2.0, 4.0, 8.0, 25.0] {
            check_dnn(&tree, &query, radius);
        }
        let expected = scan(&tree, &query);
        for k in [1, 5, 17, 128] {
            let found = tree.knn(&query, k);
            let want: Vec<f64> = expected[..k].iter().map(|(d, _)| *d).collect();
            assert_eq!(found.distances, want);
        }
    }
}

#[test]
fn insert_then_remove_restores_points() {
    let mut rng = StdRng::seed_from_u64(5);
    let mut tree = KDTree::<f64>::from_points(3, random_points(&mut rng, 40, 3)).unwrap();

    for point in random_points(&mut rng, 10, 3) {
        let mut before: Vec<Vec<f64>> = tree.points().into_iter().map(<[f64]>::to_vec).collect();
        before.sort_by(|a, b| a.partial_cmp(b).unwrap());

        assert!(tree.insert(point.clone()).is_some());
        assert!(tree.remove_by_point(&point));

        let mut after: Vec<Vec<f64>> = tree.points().into_iter().map(<[f64]>::to_vec).collect();
        after.sort_by(|a, b| a.partial_cmp(b).unwrap());
        assert_eq!(after, before);
    }
}

#[test]
fn rebalance_preserves_points_and_answers() {
    let mut rng = StdRng::seed_from_u64(6);
    let mut tree = KDTree::<f64>::new(2).unwrap();
    let mut points = random_points(&mut rng, 200, 2);
    points.sort_by(|a, b| a.partial_cmp(b).unwrap());
    for point in points.iter().cloned() {
        tree.insert(point);
    }
    let unbalanced = tree.height();

    tree.rebalance();
    assert!(tree.height() <= unbalanced);
    assert_eq!(tree.height(), 8);

    let mut held: Vec<Vec<f64>> = tree.points().into_iter().map(<[f64]>::to_vec).collect();
    held.sort_by(|a, b| a.partial_cmp(b).unwrap());
    assert_eq!(held, points);

    for query in random_points(&mut rng, 5, 2) {
        check_knn(&tree, &query);
    }
}

#[test]
fn metric_separability_default_plane_distance() {
    // the provided plane distance agrees with the closed forms
    let closure = |a: &[f64], b: &[f64]| -> f64 {
        a.iter()
            .zip(b)
            .map(|(x, y)| (x - y) * (x - y))
            .sum()
    };
    let q = [1.0, -4.0, 2.5];
    let n = [3.0, 7.0, -1.0];
    for axis in 0..3 {
        let expected = (q[axis] - n[axis]) * (q[axis] - n[axis]);
        assert_eq!(DistanceMetric::<f64>::plane_distance(&closure, &q, &n, axis), expected);
        assert_eq!(
            DistanceMetric::<f64>::plane_distance(&crate::kdtree::SquaredEuclidean, &q, &n, axis),
            expected
        );
        assert_eq!(
            DistanceMetric::<f64>::plane_distance(&Manhattan, &q, &n, axis),
            (q[axis] - n[axis]).abs()
        );
    }
}
