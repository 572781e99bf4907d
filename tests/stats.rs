mod common;

use commentsim::{
    common_video_count, comments_per_user, nan_mean, nan_median, nan_percentile,
    normalized_common_count, users_with_at_least, SimError,
};
use common::assert_close;
use ndarray::array;

#[test]
fn nan_mean_skips_masked_cells() {
    let m = array![[1.0f32, f32::NAN], [3.0, f32::NAN]];
    assert_close(nan_mean(&m), 2.0);
}

#[test]
fn all_nan_input_yields_nan() {
    let m = array![[f32::NAN, f32::NAN]];
    assert!(nan_mean(&m).is_nan());
    assert!(nan_median(&m).is_nan());
    assert!(nan_percentile(&m, 90.0).is_nan());
}

#[test]
fn nan_median_even_and_odd_counts() {
    let odd = array![[3.0f32, 1.0, 2.0]];
    assert_close(nan_median(&odd), 2.0);
    let even = array![[4.0f32, 1.0, 2.0, 3.0]];
    assert_close(nan_median(&even), 2.5);
    let with_nan = array![[4.0f32, f32::NAN, 1.0, 3.0]];
    assert_close(nan_median(&with_nan), 3.0);
}

#[test]
fn percentile_interpolates_linearly() {
    let m = array![[10.0f32, 20.0, 30.0, 40.0, 50.0]];
    assert_close(nan_percentile(&m, 0.0), 10.0);
    assert_close(nan_percentile(&m, 100.0), 50.0);
    assert_close(nan_percentile(&m, 25.0), 20.0);
    assert_close(nan_percentile(&m, 10.0), 14.0);
}

#[test]
fn per_user_counts_and_threshold_filter() {
    let m = common::incidence(
        4,
        3,
        &[(0, 0), (1, 0), (1, 1), (2, 1), (0, 2), (1, 2), (2, 2), (3, 2)],
    );
    assert_eq!(comments_per_user(&m), vec![2, 2, 4]);
    assert_eq!(users_with_at_least(&m, 3), vec![2]);
    assert_eq!(users_with_at_least(&m, 1), vec![0, 1, 2]);
    assert_eq!(users_with_at_least(&m, 5), Vec::<usize>::new());
}

#[test]
fn common_videos_between_two_users() {
    let m = common::incidence(
        4,
        3,
        &[(0, 0), (1, 0), (1, 1), (2, 1), (0, 2), (1, 2), (2, 2), (3, 2)],
    );
    assert_eq!(common_video_count(&m, 0, 1).unwrap(), 1);
    assert_eq!(common_video_count(&m, 0, 2).unwrap(), 2);
    assert_eq!(common_video_count(&m, 1, 1).unwrap(), 2);

    let err = common_video_count(&m, 0, 7).unwrap_err();
    assert!(matches!(err, SimError::ColumnOutOfRange { index: 7, cols: 3 }));
}

#[test]
fn normalized_common_count_scales_by_mean_total() {
    let m = common::incidence(
        4,
        3,
        &[(0, 0), (1, 0), (1, 1), (2, 1), (0, 2), (1, 2), (2, 2), (3, 2)],
    );
    // 1 shared video, totals 2 and 2.
    assert_close(normalized_common_count(&m, 0, 1).unwrap(), 0.5);
    // 2 shared videos, totals 2 and 4.
    assert_close(normalized_common_count(&m, 0, 2).unwrap(), 2.0 / 3.0);

    let with_empty = common::incidence(2, 2, &[(0, 0)]);
    // One empty user: mean total is 0.5, shared count 0.
    assert_close(normalized_common_count(&with_empty, 0, 1).unwrap(), 0.0);
}
