mod common;

use commentsim::{
    aggregate_excluding_diagonal, aggregate_excluding_same_users, column_totals, false_true,
    jaccard_cached, jaccard_matrix, true_false, true_true, OverlapMatrix, Precision, SimError,
    Statistic,
};
use common::assert_close;
use half::f16;
use tempfile::tempdir;

// 4 videos, 3 users: u0 -> {v0, v1}, u1 -> {v1, v2}, u2 -> {v0..v3}.
fn fixture() -> sprs::CsMat<u16> {
    common::incidence(
        4,
        3,
        &[(0, 0), (1, 0), (1, 1), (2, 1), (0, 2), (1, 2), (2, 2), (3, 2)],
    )
}

#[test]
fn overlap_counts_match_hand_computation() {
    let m = fixture();
    assert_eq!(column_totals(&m), vec![2, 2, 4]);

    let tt = true_true(&m, None).unwrap();
    assert_eq!(tt.shape(), (3, 3));
    assert_eq!(tt.get(0, 0), Some(&2));
    assert_eq!(tt.get(0, 1), Some(&1));
    assert_eq!(tt.get(0, 2), Some(&2));
    assert_eq!(tt.get(1, 2), Some(&2));
    assert_eq!(tt.get(2, 2), Some(&4));
}

#[test]
fn overlaps_conserve_union_size() {
    // For any user pair, tt + tf + ft is the size of the union of the two
    // users' video sets.
    let m = fixture();
    let tt = true_true(&m, None).unwrap();
    let (OverlapMatrix::Dense(tf), OverlapMatrix::Dense(ft)) = (
        true_false(&m, &tt, false).unwrap(),
        false_true(&m, &tt, false).unwrap(),
    ) else {
        panic!("expected dense overlaps");
    };
    let expected_union = [[2u32, 3, 4], [3, 2, 4], [4, 4, 4]];
    for a in 0..3 {
        for b in 0..3 {
            let v = *tt.get(a, b).unwrap_or(&0) as u32;
            let sum = v + tf[[a, b]] as u32 + ft[[a, b]] as u32;
            assert_eq!(sum, expected_union[a][b], "pair ({a}, {b})");
        }
    }
}

#[test]
fn jaccard_matches_hand_computation() {
    let m = fixture();
    let j = jaccard_matrix(&m, None, Precision::Single, true).unwrap();
    assert_eq!(j.dim(), (3, 3));
    for i in 0..3 {
        assert_close(j[[i, i]], 1.0);
    }
    assert_close(j[[0, 1]], 1.0 / 3.0);
    assert_close(j[[1, 0]], 1.0 / 3.0);
    assert_close(j[[0, 2]], 0.5);
    assert_close(j[[1, 2]], 0.5);
}

#[test]
fn sparse_and_dense_modes_agree() {
    let m = fixture();
    let sparse = jaccard_matrix(&m, None, Precision::Single, true).unwrap();
    let dense = jaccard_matrix(&m, None, Precision::Single, false).unwrap();
    assert_eq!(sparse, dense);
}

#[test]
fn user_with_no_videos_gets_zero_not_nan() {
    // Column 2 is empty, as after aligning in a user from another cluster.
    let m = common::incidence(2, 3, &[(0, 0), (1, 1)]);
    let j = jaccard_matrix(&m, None, Precision::Single, true).unwrap();
    assert_close(j[[0, 2]], 0.0);
    assert_close(j[[2, 0]], 0.0);
    assert_close(j[[2, 2]], 0.0);
    assert!(j.iter().all(|v| !v.is_nan()));
}

#[test]
fn cross_matrix_jaccard_uses_both_column_sets() {
    let m1 = common::incidence(3, 2, &[(0, 0), (1, 0), (1, 1), (2, 1)]);
    let m2 = common::incidence(3, 1, &[(0, 0), (2, 0)]);
    let j = jaccard_matrix(&m1, Some(&m2), Precision::Single, true).unwrap();
    assert_eq!(j.dim(), (2, 1));
    // {v0,v1} vs {v0,v2}: share 1 of 3. {v1,v2} vs {v0,v2}: share 1 of 3.
    assert_close(j[[0, 0]], 1.0 / 3.0);
    assert_close(j[[1, 0]], 1.0 / 3.0);
}

#[test]
fn overlap_rejects_totals_wider_than_the_count_type() {
    // One user on 70,000 videos: a valid input whose self-overlap does not
    // fit a u16. Every overlap entry point must refuse it, never wrap.
    let pairs: Vec<(usize, usize)> = (0..70_000).map(|v| (v, 0)).collect();
    let m = common::incidence(70_000, 1, &pairs);

    let err = true_true(&m, None).unwrap_err();
    assert!(matches!(err, SimError::OverflowRisk { max: 70_000, limit: 65_535 }));

    let tt = common::incidence(1, 1, &[(0, 0)]);
    assert!(matches!(
        true_false(&m, &tt, false).unwrap_err(),
        SimError::OverflowRisk { .. }
    ));
    assert!(matches!(
        false_true(&m, &tt, true).unwrap_err(),
        SimError::OverflowRisk { .. }
    ));
    assert!(matches!(
        jaccard_matrix(&m, None, Precision::Single, true).unwrap_err(),
        SimError::OverflowRisk { .. }
    ));

    // A second operand past the limit is caught too.
    let small = common::incidence(70_000, 1, &[(0, 0)]);
    assert!(matches!(
        true_true(&small, Some(&m)).unwrap_err(),
        SimError::OverflowRisk { .. }
    ));
}

#[test]
fn mismatched_row_counts_are_rejected() {
    let m1 = common::incidence(3, 1, &[(0, 0)]);
    let m2 = common::incidence(4, 1, &[(0, 0)]);
    let err = jaccard_matrix(&m1, Some(&m2), Precision::Single, true).unwrap_err();
    assert!(matches!(err, SimError::ShapeMismatch { left: 3, right: 4 }));
}

#[test]
fn half_precision_quantizes_values() {
    let m = fixture();
    let j = jaccard_matrix(&m, None, Precision::Half, true).unwrap();
    assert_close(j[[0, 1]], f16::from_f32(1.0 / 3.0).to_f32());
    assert_close(j[[0, 2]], 0.5); // exactly representable, survives untouched
    for &v in j.iter() {
        assert_eq!(v, f16::from_f32(v).to_f32());
    }
}

#[test]
fn precision_from_bits() {
    assert_eq!(Precision::from_bits(16).unwrap(), Precision::Half);
    assert_eq!(Precision::from_bits(32).unwrap(), Precision::Single);
    assert!(matches!(
        Precision::from_bits(64).unwrap_err(),
        SimError::InvalidPrecision(64)
    ));
}

#[test]
fn aggregate_skips_diagonal() {
    let m = fixture();
    let j = jaccard_matrix(&m, None, Precision::Single, true).unwrap();
    let mean = aggregate_excluding_diagonal(&j, Statistic::Mean).unwrap();
    assert_close(mean, 4.0 / 9.0);
}

#[test]
fn aggregate_rejects_non_square() {
    let j = ndarray::Array2::<f32>::zeros((2, 3));
    let err = aggregate_excluding_diagonal(&j, Statistic::Mean).unwrap_err();
    assert!(matches!(err, SimError::NotSquare { rows: 2, cols: 3 }));
}

#[test]
fn aggregate_skips_shared_users_across_clusters() {
    let m = fixture();
    let j = jaccard_matrix(&m, None, Precision::Single, true).unwrap();
    let users: Vec<String> = ["u0", "u1", "u2"].iter().map(|s| s.to_string()).collect();
    // Same list on both sides: exactly the diagonal is masked.
    let mean = aggregate_excluding_same_users(&j, &users, &users, Statistic::Mean).unwrap();
    assert_close(mean, 4.0 / 9.0);

    // Disjoint lists: nothing masked, the unit diagonal counts.
    let others: Vec<String> = ["w0", "w1", "w2"].iter().map(|s| s.to_string()).collect();
    let mean_all = aggregate_excluding_same_users(&j, &users, &others, Statistic::Mean).unwrap();
    let expected = (3.0 + 2.0 * (1.0 / 3.0) + 4.0 * 0.5) / 9.0;
    assert_close(mean_all, expected);
}

#[test]
fn cache_round_trip_and_staleness() {
    let dir = tempdir().unwrap();
    let cache = dir.path().join("pair.bin");
    let m = fixture();

    let first = jaccard_cached(&m, None, &cache, Precision::Single, true).unwrap();
    assert!(cache.exists());
    let second = jaccard_cached(&m, None, &cache, Precision::Single, true).unwrap();
    assert_eq!(first, second);

    // A hit is trusted blindly: different input, same path, stale answer.
    let other = common::incidence(4, 3, &[(0, 0)]);
    let stale = jaccard_cached(&other, None, &cache, Precision::Single, true).unwrap();
    assert_eq!(stale, first);
}
