//! Column alignment: rebuild two interaction matrices over the sorted union
//! of their user lists, so column `j` means the same user in both. Required
//! before any cross-cluster comparison.

use crate::error::{Result, SimError};
use sprs::{CsMat, TriMat};

fn check_sorted(users: &[String], side: &'static str) -> Result<()> {
    if users.windows(2).any(|w| w[0] >= w[1]) {
        return Err(SimError::UnsortedInput { side });
    }
    Ok(())
}

/// Merge two strictly ascending user lists into their sorted union.
fn sorted_union(a: &[String], b: &[String]) -> Vec<String> {
    let mut out = Vec::with_capacity(a.len() + b.len());
    let (mut i, mut j) = (0, 0);
    while i < a.len() && j < b.len() {
        match a[i].cmp(&b[j]) {
            std::cmp::Ordering::Less => {
                out.push(a[i].clone());
                i += 1;
            }
            std::cmp::Ordering::Greater => {
                out.push(b[j].clone());
                j += 1;
            }
            std::cmp::Ordering::Equal => {
                out.push(a[i].clone());
                i += 1;
                j += 1;
            }
        }
    }
    out.extend_from_slice(&a[i..]);
    out.extend_from_slice(&b[j..]);
    out
}

/// Scatter the columns of `m` into a wider matrix according to `positions`,
/// where `positions[old_col]` is the column in the union layout.
fn widen_columns(m: &CsMat<u16>, positions: &[usize], new_cols: usize) -> CsMat<u16> {
    let csc = m.to_csc();
    let mut tri = TriMat::with_capacity((m.rows(), new_cols), m.nnz());
    for (old_col, column) in csc.outer_iterator().enumerate() {
        let new_col = positions[old_col];
        for (row, &v) in column.iter() {
            tri.add_triplet(row, new_col, v);
        }
    }
    tri.to_csc()
}

/// Align two matrices on the sorted union of their user columns.
///
/// Both user lists must be strictly ascending and match their matrix's column
/// count. Users present in only one cluster get an all-zero column in the
/// other matrix. Returns the two widened matrices and the union user list;
/// the originals are not modified.
pub fn align_columns(
    m1: &CsMat<u16>,
    m2: &CsMat<u16>,
    users1: &[String],
    users2: &[String],
) -> Result<(CsMat<u16>, CsMat<u16>, Vec<String>)> {
    if users1.len() != m1.cols() {
        return Err(SimError::ShapeMismatch { left: users1.len(), right: m1.cols() });
    }
    if users2.len() != m2.cols() {
        return Err(SimError::ShapeMismatch { left: users2.len(), right: m2.cols() });
    }
    check_sorted(users1, "first")?;
    check_sorted(users2, "second")?;

    let union = sorted_union(users1, users2);

    // Both inputs are sorted subsequences of the union, so a single forward
    // scan finds each user's position.
    let positions_of = |users: &[String]| -> Vec<usize> {
        let mut pos = Vec::with_capacity(users.len());
        let mut u = 0;
        for id in users {
            while union[u] != *id {
                u += 1;
            }
            pos.push(u);
            u += 1;
        }
        pos
    };
    let pos1 = positions_of(users1);
    let pos2 = positions_of(users2);

    let a1 = widen_columns(m1, &pos1, union.len());
    let a2 = widen_columns(m2, &pos2, union.len());
    tracing::debug!(
        "aligned {} + {} users into union of {}",
        users1.len(),
        users2.len(),
        union.len()
    );
    Ok((a1, a2, union))
}
