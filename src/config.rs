/// Options for the streaming matrix build, with safe defaults and builder
/// chaining. The compaction knobs trade buffer memory for compaction CPU;
/// they do not affect the result, only peak memory.
#[derive(Clone, Debug)]
pub struct BuildOptions {
    /// Rows per batch when reading the comment log.
    pub chunk_size: usize,
    /// Compaction is considered every this-many batches...
    pub compact_every: usize,
    /// ...and only runs once the pair buffer holds more entries than this.
    pub compact_min_pairs: usize,

    // IO tuning
    pub read_buffer_bytes: usize, // BufReader capacity for the comment log

    pub progress: bool,
    pub progress_label: Option<String>,
}

impl Default for BuildOptions {
    fn default() -> Self {
        Self {
            chunk_size: 1_000_000,
            compact_every: 10,
            compact_min_pairs: 10_000_000,
            read_buffer_bytes: 256 * 1024,
            progress: true,
            progress_label: None,
        }
    }
}

impl BuildOptions {
    pub fn with_chunk_size(mut self, rows: usize) -> Self {
        self.chunk_size = rows.max(1);
        self
    }
    pub fn with_compact_every(mut self, batches: usize) -> Self {
        self.compact_every = batches.max(1);
        self
    }
    pub fn with_compact_min_pairs(mut self, pairs: usize) -> Self {
        self.compact_min_pairs = pairs;
        self
    }
    pub fn with_io_read_buffer(mut self, bytes: usize) -> Self {
        self.read_buffer_bytes = bytes.max(8 * 1024);
        self
    }
    pub fn with_progress(mut self, yes: bool) -> Self {
        self.progress = yes;
        self
    }
    pub fn with_progress_label(mut self, label: impl Into<String>) -> Self {
        self.progress_label = Some(label.into());
        self
    }
}
