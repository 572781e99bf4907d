//! The cluster-by-cluster similarity table: one aggregated Jaccard statistic
//! per (cluster, cluster) pair, written out as a square CSV.

use crate::error::{Result, SimError};
use crate::jaccard::{self, Precision};
use crate::stats::Statistic;
use crate::storage;
use ndarray::Array2;
use sprs::CsMat;
use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

/// Symmetric table of aggregated similarities between named clusters.
#[derive(Debug)]
pub struct SimilarityTable {
    names: Vec<String>,
    values: Array2<f32>,
}

impl SimilarityTable {
    /// Cluster names in row/column order.
    pub fn names(&self) -> &[String] {
        &self.names
    }

    pub fn values(&self) -> &Array2<f32> {
        &self.values
    }

    /// Value for a pair of clusters by name.
    pub fn get(&self, a: &str, b: &str) -> Option<f32> {
        let i = self.names.iter().position(|n| n == a)?;
        let j = self.names.iter().position(|n| n == b)?;
        Some(self.values[[i, j]])
    }

    /// Write the table as CSV: empty-headed first column of cluster names,
    /// one column per cluster. Refuses to overwrite an existing file.
    pub fn write_csv(&self, path: &Path) -> Result<()> {
        storage::ensure_absent(path)?;
        let mut w = csv::Writer::from_path(path)?;
        let mut header = vec![String::new()];
        header.extend(self.names.iter().cloned());
        w.write_record(&header)?;
        for (i, name) in self.names.iter().enumerate() {
            let mut row = vec![name.clone()];
            row.extend(self.values.row(i).iter().map(|v| v.to_string()));
            w.write_record(&row)?;
        }
        w.flush()?;
        Ok(())
    }
}

/// Cache file for one cluster pair, with the statistic tag folded into the
/// stem so runs under different statistics never read each other's caches.
fn tagged_cache_path(base: &Path, stat: Statistic) -> PathBuf {
    let stem = base
        .file_stem()
        .map(|s| s.to_string_lossy().into_owned())
        .unwrap_or_default();
    let mut name = format!("{}_{}", stem, stat.tag());
    if let Some(ext) = base.extension() {
        name.push('.');
        name.push_str(&ext.to_string_lossy());
    }
    base.with_file_name(name)
}

fn pair_key(a: &str, b: &str) -> String {
    format!("{}_{}", a, b)
}

/// Build the full cluster similarity table and write it to `out_path`.
///
/// `matrices` and `users` are keyed by cluster name and must agree exactly;
/// all matrices must already be column-aligned so that `users[name]` is the
/// column list of `matrices[name]`. `cache_files` maps pair keys
/// (`"<a>_<b>"` for a <= b in iteration order) to the Jaccard cache path for
/// that pair; a missing or unknown key fails before any computation. `_` is
/// the pair-key separator and therefore forbidden in cluster names, else
/// distinct pairs could collide on one key and cache file.
///
/// Diagonal cells aggregate within-cluster similarity with the diagonal
/// masked; off-diagonal cells mask same-user pairs instead. The table is
/// filled symmetrically from the upper triangle.
pub fn build(
    matrices: &BTreeMap<String, CsMat<u16>>,
    users: &BTreeMap<String, Vec<String>>,
    cache_files: &BTreeMap<String, PathBuf>,
    out_path: &Path,
    stat: Statistic,
    precision: Precision,
    sparse: bool,
) -> Result<SimilarityTable> {
    storage::ensure_absent(out_path)?;

    let names: Vec<String> = matrices.keys().cloned().collect();
    for name in &names {
        if name.contains('_') {
            return Err(SimError::KeyMismatch(format!(
                "cluster name {name:?} contains the reserved pair-key separator '_'"
            )));
        }
    }
    let user_names: Vec<&String> = users.keys().collect();
    if names.iter().collect::<Vec<_>>() != user_names {
        return Err(SimError::KeyMismatch(
            "matrix and user-list cluster names differ".to_string(),
        ));
    }
    for key in cache_files.keys() {
        let known = names
            .iter()
            .any(|a| names.iter().any(|b| key == &pair_key(a, b)));
        if !known {
            return Err(SimError::KeyMismatch(format!(
                "cache key {key:?} names no known cluster pair"
            )));
        }
    }
    for (i, a) in names.iter().enumerate() {
        for b in &names[i..] {
            let key = pair_key(a, b);
            if !cache_files.contains_key(&key) {
                return Err(SimError::KeyMismatch(format!(
                    "no cache file for cluster pair {key:?}"
                )));
            }
        }
    }

    let n = names.len();
    let mut values = Array2::<f32>::zeros((n, n));
    for i in 0..n {
        for j in i..n {
            let (a, b) = (&names[i], &names[j]);
            let cache = tagged_cache_path(&cache_files[&pair_key(a, b)], stat);
            let value = if i == j {
                let sim = jaccard::jaccard_cached(&matrices[a], None, &cache, precision, sparse)?;
                jaccard::aggregate_excluding_diagonal(&sim, stat)?
            } else {
                let sim = jaccard::jaccard_cached(
                    &matrices[a],
                    Some(&matrices[b]),
                    &cache,
                    precision,
                    sparse,
                )?;
                jaccard::aggregate_excluding_same_users(&sim, &users[a], &users[b], stat)?
            };
            values[[i, j]] = value;
            values[[j, i]] = value;
            tracing::info!("{} vs {}: {} = {}", a, b, stat.tag(), value);
        }
    }

    let table = SimilarityTable { names, values };
    table.write_csv(out_path)?;
    Ok(table)
}
