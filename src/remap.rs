//! Bijective mapping between opaque identifiers (video display ids, author
//! hashes) and the dense range `0..n`, which downstream code uses as matrix
//! row/column indices. Built once per dataset/cluster, read-only afterwards.

use crate::error::{Result, SimError};
use ahash::AHashMap;

/// A bijection `identifier <-> index in 0..n`. The forward direction is a
/// hash lookup, the inverse is a plain slice indexed by position.
///
/// The integer assigned to an identifier carries no meaning beyond "this is
/// your row/column in the matrix"; only uniqueness and gap-freeness matter.
#[derive(Clone, Debug)]
pub struct IdMap {
    to_index: AHashMap<String, usize>,
    ids: Vec<String>,
}

impl IdMap {
    /// Build a mapping assigning `0..n` in first-appearance order.
    /// Fails if the input contains the same identifier twice.
    pub fn build<I, S>(identifiers: I) -> Result<Self>
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        let mut to_index = AHashMap::new();
        let mut ids = Vec::new();
        for id in identifiers {
            let id = id.into();
            let next = ids.len();
            if to_index.insert(id.clone(), next).is_some() {
                return Err(SimError::DuplicateIdentifier(id));
            }
            ids.push(id);
        }
        Ok(Self { to_index, ids })
    }

    /// Rebuild a mapping from raw (identifier, index) entries, e.g. a sidecar
    /// loaded from disk. Validates that the entries form a bijection onto a
    /// gap-free `0..n` range.
    pub fn from_entries<I>(entries: I) -> Result<Self>
    where
        I: IntoIterator<Item = (String, usize)>,
    {
        let entries: Vec<(String, usize)> = entries.into_iter().collect();
        let n = entries.len();
        let mut ids: Vec<Option<String>> = vec![None; n];
        let mut to_index = AHashMap::with_capacity(n);
        for (id, index) in entries {
            if index >= n {
                return Err(SimError::NotBijective(format!(
                    "index {index} out of range for {n} entries"
                )));
            }
            if ids[index].is_some() {
                return Err(SimError::NotBijective(format!("index {index} assigned twice")));
            }
            if to_index.insert(id.clone(), index).is_some() {
                return Err(SimError::NotBijective(format!("identifier {id:?} appears twice")));
            }
            ids[index] = Some(id);
        }
        // Every slot filled, since n entries landed in n distinct slots.
        let ids = ids.into_iter().flatten().collect();
        Ok(Self { to_index, ids })
    }

    pub fn len(&self) -> usize {
        self.ids.len()
    }

    pub fn is_empty(&self) -> bool {
        self.ids.is_empty()
    }

    /// Matrix index for an identifier, if it is part of this mapping.
    #[inline]
    pub fn index_of(&self, id: &str) -> Option<usize> {
        self.to_index.get(id).copied()
    }

    /// Identifier at a matrix index.
    #[inline]
    pub fn id_at(&self, index: usize) -> Option<&str> {
        self.ids.get(index).map(String::as_str)
    }

    /// The inverse view of the mapping: position `i` holds the identifier
    /// mapped to index `i`. Derived, never mutated in place.
    pub fn invert(&self) -> &[String] {
        &self.ids
    }

    /// All identifiers in index order (same as [`invert`](Self::invert)).
    pub fn ids(&self) -> &[String] {
        &self.ids
    }
}
