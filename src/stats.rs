//! NaN-aware aggregation and per-user descriptive statistics.
//!
//! Masked cells (diagonal, same-user pairs) are set to NaN upstream and
//! every aggregator here skips them, matching the convention of treating
//! NaN as "not a data point" rather than poisoning the result.

use crate::error::{Result, SimError};
use crate::overlap::{self, Count};
use ndarray::Array2;
use sprs::CsMat;

/// Which summary number to reduce a similarity matrix to.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Statistic {
    Mean,
    Median,
    /// Percentile in `0..=100`.
    Percentile(f64),
}

impl Statistic {
    /// Short label used to key cache files and output columns, so results
    /// computed under different statistics never collide on disk.
    pub fn tag(&self) -> String {
        match self {
            Statistic::Mean => "mean".to_string(),
            Statistic::Median => "median".to_string(),
            Statistic::Percentile(p) => format!("p{}", p),
        }
    }
}

/// Mean over non-NaN cells. NaN if every cell is masked.
pub fn nan_mean(matrix: &Array2<f32>) -> f32 {
    let mut sum = 0.0f64;
    let mut n = 0usize;
    for &x in matrix.iter() {
        if !x.is_nan() {
            sum += x as f64;
            n += 1;
        }
    }
    if n == 0 {
        f32::NAN
    } else {
        (sum / n as f64) as f32
    }
}

/// Percentile over non-NaN cells with linear interpolation between the two
/// nearest order statistics. NaN if every cell is masked.
pub fn nan_percentile(matrix: &Array2<f32>, p: f64) -> f32 {
    let mut values: Vec<f32> = matrix.iter().copied().filter(|x| !x.is_nan()).collect();
    if values.is_empty() {
        return f32::NAN;
    }
    values.sort_by(|a, b| a.partial_cmp(b).unwrap_or(std::cmp::Ordering::Equal));
    let rank = p.clamp(0.0, 100.0) / 100.0 * (values.len() - 1) as f64;
    let lo = rank.floor() as usize;
    let hi = rank.ceil() as usize;
    if lo == hi {
        return values[lo];
    }
    let frac = (rank - lo as f64) as f32;
    values[lo] + (values[hi] - values[lo]) * frac
}

pub fn nan_median(matrix: &Array2<f32>) -> f32 {
    nan_percentile(matrix, 50.0)
}

pub fn nan_statistic(matrix: &Array2<f32>, stat: Statistic) -> f32 {
    match stat {
        Statistic::Mean => nan_mean(matrix),
        Statistic::Median => nan_median(matrix),
        Statistic::Percentile(p) => nan_percentile(matrix, p),
    }
}

/// Comment (video) count per user column.
pub fn comments_per_user(m: &CsMat<Count>) -> Vec<u32> {
    overlap::column_totals(m)
}

/// Column indices of users with at least `threshold` videos. Useful for
/// filtering out drive-by commenters before a similarity run.
pub fn users_with_at_least(m: &CsMat<Count>, threshold: u32) -> Vec<usize> {
    overlap::column_totals(m)
        .into_iter()
        .enumerate()
        .filter(|&(_, t)| t >= threshold)
        .map(|(i, _)| i)
        .collect()
}

/// Number of videos two users both commented on.
pub fn common_video_count(m: &CsMat<Count>, i: usize, j: usize) -> Result<u32> {
    let cols = m.cols();
    let csc = m.to_csc();
    let (a, b) = match (csc.outer_view(i), csc.outer_view(j)) {
        (Some(a), Some(b)) => (a, b),
        _ => {
            let index = if i >= cols { i } else { j };
            return Err(SimError::ColumnOutOfRange { index, cols });
        }
    };
    Ok(a.iter()
        .map(|(row, &v)| (row, v))
        .filter(|&(row, _)| b.get(row).is_some())
        .map(|(_, v)| v as u32)
        .sum())
}

/// Shared video count scaled by the mean of the two users' totals. Zero when
/// either user has no videos.
pub fn normalized_common_count(m: &CsMat<Count>, i: usize, j: usize) -> Result<f32> {
    let common = common_video_count(m, i, j)? as f32;
    let totals = overlap::column_totals(m);
    let mean = (totals[i] + totals[j]) as f32 / 2.0;
    if mean == 0.0 {
        Ok(0.0)
    } else {
        Ok(common / mean)
    }
}
