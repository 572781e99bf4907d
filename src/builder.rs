//! Streaming construction of the user-video interaction matrix.
//!
//! Comment batches flow in from the chunked reader; each (video, author) pair
//! that belongs to the cluster becomes a coordinate in a growing pair buffer.
//! The buffer is deduplicated periodically so memory tracks the number of
//! *distinct* interactions, not the number of comments.

use crate::config::BuildOptions;
use crate::error::{Result, SimError};
use crate::progress::ProgressScope;
use crate::reader::CommentRecord;
use crate::remap::IdMap;
use crate::storage;
use sprs::{CsMat, TriMat};
use std::path::Path;

/// Accumulator of (video row, user column) coordinates. Duplicate pairs are
/// tolerated on push and removed by [`compact`](Self::compact); the final
/// matrix is boolean, so a user commenting on the same video a hundred times
/// contributes one entry.
pub struct PairBuffer {
    rows: Vec<u32>,
    cols: Vec<u32>,
}

impl PairBuffer {
    pub fn new() -> Self {
        Self { rows: Vec::new(), cols: Vec::new() }
    }

    #[inline]
    pub fn push(&mut self, row: usize, col: usize) {
        self.rows.push(row as u32);
        self.cols.push(col as u32);
    }

    pub fn len(&self) -> usize {
        self.rows.len()
    }

    pub fn is_empty(&self) -> bool {
        self.rows.is_empty()
    }

    /// Sort and deduplicate the buffered pairs. Idempotent.
    pub fn compact(&mut self) {
        let mut pairs: Vec<(u32, u32)> = self
            .cols
            .iter()
            .copied()
            .zip(self.rows.iter().copied())
            .collect();
        pairs.sort_unstable();
        pairs.dedup();
        self.cols.clear();
        self.rows.clear();
        for (c, r) in pairs {
            self.cols.push(c);
            self.rows.push(r);
        }
    }

    /// Consume the buffer into a CSC matrix of the given shape, every stored
    /// pair contributing the value 1. Call [`compact`](Self::compact) first;
    /// leftover duplicates would otherwise sum above 1.
    pub fn into_csc(self, shape: (usize, usize)) -> CsMat<u16> {
        let mut tri = TriMat::with_capacity(shape, self.rows.len());
        for (&r, &c) in self.rows.iter().zip(self.cols.iter()) {
            tri.add_triplet(r as usize, c as usize, 1u16);
        }
        tri.to_csc()
    }
}

impl Default for PairBuffer {
    fn default() -> Self {
        Self::new()
    }
}

/// Build the boolean interaction matrix for one user cluster from a stream of
/// comment batches, then persist it (plus the column user list) at `path`.
///
/// Rows are videos per `video_map`, columns are the users of `cluster_users`
/// in the given order. Comments on unknown videos or by users outside the
/// cluster are dropped silently — the video map and cluster list define the
/// universe, the comment log merely fills it in.
///
/// `path` must carry the `.smx` extension and must not exist yet; both are
/// checked before any reading happens.
pub fn build_interaction_matrix<I>(
    batches: I,
    video_map: &IdMap,
    cluster_users: &[String],
    path: &Path,
    opts: &BuildOptions,
) -> Result<CsMat<u16>>
where
    I: IntoIterator<Item = Result<Vec<CommentRecord>, SimError>>,
{
    storage::check_matrix_name(path)?;
    storage::ensure_absent(path)?;
    // A leftover sidecar would end up paired with the fresh matrix while
    // naming the wrong users; refuse before reading a single batch.
    storage::ensure_absent(&storage::users_sidecar_path(path))?;

    let user_map = IdMap::build(cluster_users.iter().cloned())?;
    let mut buf = PairBuffer::new();

    let progress = if opts.progress {
        let label = opts
            .progress_label
            .clone()
            .unwrap_or_else(|| "building interaction matrix".to_string());
        Some(ProgressScope::spinner(label))
    } else {
        None
    };

    let mut kept: u64 = 0;
    let mut seen: u64 = 0;
    for (i, batch) in batches.into_iter().enumerate() {
        let batch = batch?;
        seen += batch.len() as u64;
        for rec in &batch {
            let (Some(row), Some(col)) = (
                video_map.index_of(&rec.video_id),
                user_map.index_of(&rec.author),
            ) else {
                continue;
            };
            buf.push(row, col);
            kept += 1;
        }

        if (i + 1) % opts.compact_every == 0 && buf.len() > opts.compact_min_pairs {
            let before = buf.len();
            buf.compact();
            tracing::debug!("compacted pair buffer: {} -> {} pairs", before, buf.len());
        }
        if let Some(p) = &progress {
            p.inc(batch.len() as u64);
        }
    }
    if let Some(p) = &progress {
        p.finish("comments read");
    }

    buf.compact();
    let matrix = buf.into_csc((video_map.len(), user_map.len()));

    storage::save_matrix(path, &matrix)?;
    if let Err(e) = storage::save_users_sidecar(path, cluster_users) {
        // Never leave a matrix on disk without its column user list.
        let _ = std::fs::remove_file(path);
        return Err(e);
    }
    tracing::info!(
        "interaction matrix {}x{}: {} distinct pairs from {}/{} comments",
        matrix.rows(),
        matrix.cols(),
        matrix.nnz(),
        kept,
        seen
    );
    Ok(matrix)
}
