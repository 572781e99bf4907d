mod align;
mod builder;
mod cluster;
mod config;
mod error;
mod jaccard;
mod overlap;
mod progress;
mod reader;
mod remap;
mod stats;
mod storage;
mod util;

pub use crate::config::BuildOptions;
pub use crate::error::{Result, SimError};
pub use crate::remap::IdMap;

pub use crate::reader::{ChunkedCommentReader, CommentRecord};
pub use crate::builder::{build_interaction_matrix, PairBuffer};
pub use crate::align::align_columns;

// Overlap counts and the Jaccard layer on top of them.
pub use crate::overlap::{column_totals, false_true, true_false, true_true, validate_count_range, Count, OverlapMatrix};
pub use crate::jaccard::{
    aggregate_excluding_diagonal, aggregate_excluding_same_users, jaccard_cached, jaccard_matrix,
    Precision,
};

// NaN-aware aggregation and per-user statistics.
pub use crate::stats::{
    comments_per_user, common_video_count, nan_mean, nan_median, nan_percentile, nan_statistic,
    normalized_common_count, users_with_at_least, Statistic,
};

// Cluster table assembly.
pub use crate::cluster::{build as build_similarity_table, SimilarityTable};

// Persistence guards and matrix/sidecar IO, so binaries can manage artifacts.
pub use crate::storage::{
    check_matrix_name, ensure_absent, load_matrix, load_or_compute, load_users_sidecar,
    save_matrix, save_users_sidecar, users_sidecar_path, MATRIX_EXT,
};

pub use crate::progress::ProgressScope;
pub use crate::util::init_tracing_once;
