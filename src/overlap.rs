//! Pairwise overlap counts between user columns: for users a and b, how many
//! videos both commented on (true/true), only a did (true/false), only b did
//! (false/true).
//!
//! tf and ft are never computed by multiplying against a complement matrix;
//! they fall out of the column totals: tf[a,b] = total(a) - tt[a,b] and
//! ft[a,b] = total(b) - tt[a,b].

use crate::error::{Result, SimError};
use ndarray::Array2;
use sprs::CsMat;

/// Element type of interaction and overlap matrices. A single column total
/// (videos per user) bounds every overlap count, so the range is validated
/// once up front instead of checking each arithmetic step.
pub type Count = u16;

/// Per-column sums (videos each user commented on), widened so the sum of a
/// u16-entry column cannot wrap.
pub fn column_totals(m: &CsMat<Count>) -> Vec<u32> {
    let csc = m.to_csc();
    let mut totals = vec![0u32; m.cols()];
    for (col, column) in csc.outer_iterator().enumerate() {
        totals[col] = column.iter().map(|(_, &v)| v as u32).sum();
    }
    totals
}

/// Fail if any column total exceeds what a [`Count`] can hold. All overlap
/// counts are bounded by the larger of the two totals involved, so this one
/// check covers every entry produced downstream.
pub fn validate_count_range(m: &CsMat<Count>) -> Result<()> {
    let max = column_totals(m).into_iter().max().unwrap_or(0) as u64;
    let limit = Count::MAX as u64;
    if max > limit {
        return Err(SimError::OverflowRisk { max, limit });
    }
    Ok(())
}

/// True/true overlap: `X^T * Y` where Y is `m2` (or `m` itself for the
/// within-cluster case). Entry (a, b) counts the videos both users share.
/// Naturally sparse: most user pairs share nothing.
pub fn true_true(m: &CsMat<Count>, m2: Option<&CsMat<Count>>) -> Result<CsMat<Count>> {
    validate_count_range(m)?;
    let other = m2.unwrap_or(m);
    validate_count_range(other)?;
    if m.rows() != other.rows() {
        return Err(SimError::ShapeMismatch { left: m.rows(), right: other.rows() });
    }
    let at = m.transpose_view().to_csr();
    let b = other.to_csr();
    Ok((&at * &b).to_csr())
}

/// Asymmetric overlap counts, dense or restricted to a support pattern.
/// The masked form only holds values where the true/true overlap is nonzero,
/// which is all the Jaccard computation ever reads.
#[derive(Debug)]
pub enum OverlapMatrix {
    Dense(Array2<Count>),
    Masked(CsMat<Count>),
}

// Rebuilds a matrix on tt's exact CSR pattern. Pattern identity (not just
// equality) is what lets the Jaccard loop walk tt, tf and ft in lockstep.
fn masked_from_totals(tt: &CsMat<Count>, totals: &[u32], total_of_row: bool) -> CsMat<Count> {
    let csr = tt.to_csr();
    let mut data = Vec::with_capacity(csr.nnz());
    for (a, row) in csr.outer_iterator().enumerate() {
        for (b, &v) in row.iter() {
            let total = if total_of_row { totals[a] } else { totals[b] };
            data.push((total - v as u32) as Count);
        }
    }
    let shape = (csr.rows(), csr.cols());
    let (indptr, indices, _) = csr.into_raw_storage();
    CsMat::new(shape, indptr, indices, data)
}

/// True/false overlap: videos user a commented on but user b did not.
/// `tf[a, b] = total_x(a) - tt[a, b]`, with x the matrix behind the rows of
/// tt (`m`). Pass `support` to get the masked form on tt's pattern.
pub fn true_false(
    m: &CsMat<Count>,
    tt: &CsMat<Count>,
    support: bool,
) -> Result<OverlapMatrix> {
    validate_count_range(m)?;
    if tt.rows() != m.cols() {
        return Err(SimError::ShapeMismatch { left: tt.rows(), right: m.cols() });
    }
    let totals = column_totals(m);
    if support {
        return Ok(OverlapMatrix::Masked(masked_from_totals(tt, &totals, true)));
    }
    let mut out = Array2::<Count>::zeros((tt.rows(), tt.cols()));
    for (a, mut row) in out.outer_iter_mut().enumerate() {
        row.fill(totals[a] as Count);
    }
    let csr = tt.to_csr();
    for (a, row) in csr.outer_iterator().enumerate() {
        for (b, &v) in row.iter() {
            out[[a, b]] = (totals[a] - v as u32) as Count;
        }
    }
    Ok(OverlapMatrix::Dense(out))
}

/// False/true overlap: videos user b commented on but user a did not.
/// `ft[a, b] = total_y(b) - tt[a, b]`, with y the matrix behind the columns
/// of tt (`m2`, or `m` itself within a cluster).
pub fn false_true(
    m2: &CsMat<Count>,
    tt: &CsMat<Count>,
    support: bool,
) -> Result<OverlapMatrix> {
    validate_count_range(m2)?;
    if tt.cols() != m2.cols() {
        return Err(SimError::ShapeMismatch { left: tt.cols(), right: m2.cols() });
    }
    let totals = column_totals(m2);
    if support {
        return Ok(OverlapMatrix::Masked(masked_from_totals(tt, &totals, false)));
    }
    let mut out = Array2::<Count>::zeros((tt.rows(), tt.cols()));
    for b in 0..tt.cols() {
        out.column_mut(b).fill(totals[b] as Count);
    }
    let csr = tt.to_csr();
    for (a, row) in csr.outer_iterator().enumerate() {
        for (b, &v) in row.iter() {
            out[[a, b]] = (totals[b] - v as u32) as Count;
        }
    }
    Ok(OverlapMatrix::Dense(out))
}
