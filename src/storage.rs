//! Persisted artifacts: interaction matrices (`.smx`), Jaccard caches, and
//! the JSON user-list sidecars that tie matrix columns back to identifiers.
//!
//! All writers refuse to clobber existing files. The artifacts here are
//! expensive to recompute; a stale file being silently replaced is a worse
//! failure mode than a loud error.

use crate::error::{Result, SimError};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};
use sprs::{CsMat, TriMat};
use std::fs::File;
use std::io::{BufReader, BufWriter};
use std::path::{Path, PathBuf};

/// Reserved extension for persisted interaction matrices.
pub const MATRIX_EXT: &str = "smx";

/// Fail unless `path` ends in the reserved matrix extension.
pub fn check_matrix_name(path: &Path) -> Result<()> {
    match path.extension() {
        Some(ext) if ext == MATRIX_EXT => Ok(()),
        _ => Err(SimError::InvalidName { path: path.to_path_buf(), expected: MATRIX_EXT }),
    }
}

/// Fail if `path` already exists. The check-then-write pattern is a data
/// safety guard against repeated runs, not mutual exclusion; two processes
/// racing past the check is a known open issue.
pub fn ensure_absent(path: &Path) -> Result<()> {
    if path.exists() {
        Err(SimError::AlreadyExists(path.to_path_buf()))
    } else {
        Ok(())
    }
}

/// On-disk form of a boolean sparse matrix: shape plus the coordinates of
/// the true entries. Values are implicitly 1, so only the pattern is stored.
#[derive(Serialize, Deserialize)]
struct SparsePattern {
    rows: usize,
    cols: usize,
    row_idx: Vec<u32>,
    col_idx: Vec<u32>,
}

/// Persist an interaction matrix. The path must carry the `.smx` extension
/// and must not exist yet.
pub fn save_matrix(path: &Path, matrix: &CsMat<u16>) -> Result<()> {
    check_matrix_name(path)?;
    ensure_absent(path)?;

    let nnz = matrix.nnz();
    let mut row_idx = Vec::with_capacity(nnz);
    let mut col_idx = Vec::with_capacity(nnz);
    let csc = matrix.to_csc();
    for (col, column) in csc.outer_iterator().enumerate() {
        for (row, _) in column.iter() {
            row_idx.push(row as u32);
            col_idx.push(col as u32);
        }
    }
    let record = SparsePattern {
        rows: matrix.rows(),
        cols: matrix.cols(),
        row_idx,
        col_idx,
    };

    let f = File::create(path)?;
    let mut w = BufWriter::new(f);
    bincode::serialize_into(&mut w, &record)?;
    tracing::info!("saved {} ({} nonzeros)", path.display(), nnz);
    Ok(())
}

/// Load a persisted interaction matrix back into CSC layout.
pub fn load_matrix(path: &Path) -> Result<CsMat<u16>> {
    check_matrix_name(path)?;
    let f = File::open(path)?;
    let record: SparsePattern = bincode::deserialize_from(BufReader::new(f))?;
    let mut tri = TriMat::with_capacity((record.rows, record.cols), record.row_idx.len());
    for (&r, &c) in record.row_idx.iter().zip(record.col_idx.iter()) {
        tri.add_triplet(r as usize, c as usize, 1u16);
    }
    Ok(tri.to_csc())
}

/// Sidecar location for a matrix file (`foo.smx` -> `foo.users.json`).
pub fn users_sidecar_path(matrix_path: &Path) -> PathBuf {
    matrix_path.with_extension("users.json")
}

/// Write the user-id list for a matrix's columns next to the matrix file
/// (`foo.smx` -> `foo.users.json`). Position `j` in the list is the user in
/// column `j` — the correspondence every downstream computation relies on.
pub fn save_users_sidecar(matrix_path: &Path, users: &[String]) -> Result<()> {
    let path = users_sidecar_path(matrix_path);
    ensure_absent(&path)?;
    let f = File::create(&path)?;
    serde_json::to_writer(BufWriter::new(f), users)?;
    Ok(())
}

/// Load the column user-id list for a matrix file.
pub fn load_users_sidecar(matrix_path: &Path) -> Result<Vec<String>> {
    let f = File::open(users_sidecar_path(matrix_path))?;
    Ok(serde_json::from_reader(BufReader::new(f))?)
}

/// Generic memoize-to-disk: load `path` if it exists, otherwise run
/// `compute`, persist the result, and return it.
///
/// A cache hit is trusted as-is — nothing ties the file to the inputs that
/// produced it, so calling this with the same path and *different* inputs
/// returns the stale cached value. Callers own cache-file naming.
pub fn load_or_compute<T, F>(path: &Path, compute: F) -> Result<T>
where
    T: Serialize + DeserializeOwned,
    F: FnOnce() -> Result<T>,
{
    match File::open(path) {
        Ok(f) => {
            tracing::debug!("cache hit: {}", path.display());
            Ok(bincode::deserialize_from(BufReader::new(f))?)
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
            tracing::info!("cache miss, computing: {}", path.display());
            let value = compute()?;
            if let Some(parent) = path.parent() {
                if !parent.as_os_str().is_empty() {
                    std::fs::create_dir_all(parent)?;
                }
            }
            let f = File::create(path)?;
            let mut w = BufWriter::new(f);
            bincode::serialize_into(&mut w, &value)?;
            Ok(value)
        }
        Err(e) => Err(e.into()),
    }
}
