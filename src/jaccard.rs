//! Pairwise Jaccard similarity between user columns, plus the aggregation
//! into a single per-pair-of-clusters statistic.
//!
//! `jaccard[a, b] = tt / (tt + tf + ft)`. Output cells are zero-initialized
//! and only written where tt is nonzero, so disjoint pairs (0 shared videos)
//! come out as 0 rather than NaN — including pairs where one user has no
//! videos at all.

use crate::error::{Result, SimError};
use crate::overlap::{self, OverlapMatrix};
use crate::stats::{nan_statistic, Statistic};
use crate::storage;
use half::f16;
use ndarray::Array2;
use sprs::CsMat;
use std::path::Path;

/// Floating-point width of the persisted similarity values. `Half` rounds
/// each value through an f16 before storing, halving cache size at ~3
/// decimal digits of precision; computation is always done in f32.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Precision {
    Half,
    Single,
}

impl Precision {
    pub fn from_bits(bits: u8) -> Result<Self> {
        match bits {
            16 => Ok(Self::Half),
            32 => Ok(Self::Single),
            other => Err(SimError::InvalidPrecision(other)),
        }
    }
}

/// Full pairwise Jaccard matrix between the columns of `m` and the columns
/// of `m2` (or `m` itself when `m2` is `None`, giving a symmetric
/// within-cluster matrix with unit diagonal).
///
/// `sparse` selects how the asymmetric overlaps are materialized: restricted
/// to the true/true support (memory-lean) or as full dense arrays. Both
/// modes produce identical output; dense is only worth it when most user
/// pairs overlap.
pub fn jaccard_matrix(
    m: &CsMat<u16>,
    m2: Option<&CsMat<u16>>,
    precision: Precision,
    sparse: bool,
) -> Result<Array2<f32>> {
    let tt = overlap::true_true(m, m2)?;
    let other = m2.unwrap_or(m);
    let tf = overlap::true_false(m, &tt, sparse)?;
    let ft = overlap::false_true(other, &tt, sparse)?;

    let mut out = Array2::<f32>::zeros((tt.rows(), tt.cols()));
    let csr = tt.to_csr();
    match (&tf, &ft) {
        (OverlapMatrix::Masked(tf), OverlapMatrix::Masked(ft)) => {
            // Same support pattern as tt, so the raw value slices line up.
            let tf_csr = tf.to_csr();
            let ft_csr = ft.to_csr();
            let mut k = 0;
            for (a, row) in csr.outer_iterator().enumerate() {
                for (b, &v) in row.iter() {
                    let denom = v as u32 + tf_csr.data()[k] as u32 + ft_csr.data()[k] as u32;
                    out[[a, b]] = v as f32 / denom as f32;
                    k += 1;
                }
            }
        }
        (OverlapMatrix::Dense(tf), OverlapMatrix::Dense(ft)) => {
            for (a, row) in csr.outer_iterator().enumerate() {
                for (b, &v) in row.iter() {
                    let denom = v as u32 + tf[[a, b]] as u32 + ft[[a, b]] as u32;
                    out[[a, b]] = v as f32 / denom as f32;
                }
            }
        }
        _ => unreachable!("tf and ft are built with the same support flag"),
    }

    if precision == Precision::Half {
        out.mapv_inplace(|x| f16::from_f32(x).to_f32());
    }
    Ok(out)
}

/// Like [`jaccard_matrix`], memoized to `cache` on disk.
///
/// A hit is returned without recomputation or input verification, so the
/// cache file name must encode everything that shaped the matrix (cluster
/// pair at minimum; the statistic layer adds its own tag).
pub fn jaccard_cached(
    m: &CsMat<u16>,
    m2: Option<&CsMat<u16>>,
    cache: &Path,
    precision: Precision,
    sparse: bool,
) -> Result<Array2<f32>> {
    storage::load_or_compute(cache, || jaccard_matrix(m, m2, precision, sparse))
}

/// Aggregate a square within-cluster similarity matrix, ignoring the
/// diagonal (every user's similarity to themselves is 1 and says nothing
/// about the cluster).
pub fn aggregate_excluding_diagonal(matrix: &Array2<f32>, stat: Statistic) -> Result<f32> {
    let (rows, cols) = matrix.dim();
    if rows != cols {
        return Err(SimError::NotSquare { rows, cols });
    }
    let mut work = matrix.clone();
    for i in 0..rows {
        work[[i, i]] = f32::NAN;
    }
    Ok(nan_statistic(&work, stat))
}

/// Aggregate a cross-cluster similarity matrix, ignoring cells where the row
/// and column user are the same person (clusters may overlap; a user's
/// similarity to themselves would inflate the result).
pub fn aggregate_excluding_same_users(
    matrix: &Array2<f32>,
    users1: &[String],
    users2: &[String],
    stat: Statistic,
) -> Result<f32> {
    let (rows, cols) = matrix.dim();
    if users1.len() != rows {
        return Err(SimError::ShapeMismatch { left: users1.len(), right: rows });
    }
    if users2.len() != cols {
        return Err(SimError::ShapeMismatch { left: users2.len(), right: cols });
    }
    let mut work = matrix.clone();
    let mut removed = 0usize;
    for (i, u1) in users1.iter().enumerate() {
        for (j, u2) in users2.iter().enumerate() {
            if u1 == u2 {
                work[[i, j]] = f32::NAN;
                removed += 1;
            }
        }
    }
    tracing::debug!("masked {} same-user cells out of {}", removed, rows * cols);
    Ok(nan_statistic(&work, stat))
}
