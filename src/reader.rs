//! Chunked comment-log reader: streams a (possibly zstd-compressed) CSV/TSV
//! comment dump in bounded-size batches so the matrix builder never holds the
//! whole log in memory.

use crate::error::{Result, SimError};
use serde::Deserialize;
use std::fs::File;
use std::io::{BufReader, Read};
use std::path::Path;
use zstd::stream::read::Decoder;

/// One comment row. Extra columns in the input (likes, replies, ...) are
/// ignored by serde; only the two identifier columns matter here.
#[derive(Clone, Debug, Deserialize)]
pub struct CommentRecord {
    pub video_id: String,
    pub author: String,
}

/// Iterator over batches of at most `chunk_size` comment records.
///
/// The upstream cleaning stage is expected to have removed null identifiers;
/// rows with an empty `video_id` or `author` are skipped here as a cheap
/// second line of defense rather than an error.
pub struct ChunkedCommentReader {
    records: csv::DeserializeRecordsIntoIter<Box<dyn Read>, CommentRecord>,
    chunk_size: usize,
    done: bool,
}

impl ChunkedCommentReader {
    /// Open a comment log. Files ending in `.zst` are decompressed on the
    /// fly; everything else is read as-is. `delimiter` is `b'\t'` for the
    /// usual TSV dumps, `b','` for plain CSV.
    pub fn open(path: &Path, delimiter: u8, chunk_size: usize, read_buf_bytes: usize) -> Result<Self> {
        let file = File::open(path)?;
        let is_zst = path.extension().map(|e| e == "zst").unwrap_or(false);
        let raw: Box<dyn Read> = if is_zst {
            Box::new(Decoder::new(file)?)
        } else {
            Box::new(BufReader::with_capacity(read_buf_bytes.max(8 * 1024), file))
        };

        let rdr = csv::ReaderBuilder::new()
            .delimiter(delimiter)
            .has_headers(true)
            .flexible(true)
            .from_reader(raw);

        Ok(Self {
            records: rdr.into_deserialize(),
            chunk_size: chunk_size.max(1),
            done: false,
        })
    }

    fn next_batch(&mut self) -> Result<Option<Vec<CommentRecord>>> {
        if self.done {
            return Ok(None);
        }
        let mut batch = Vec::with_capacity(self.chunk_size.min(64 * 1024));
        while batch.len() < self.chunk_size {
            match self.records.next() {
                Some(rec) => {
                    let rec = rec?;
                    if rec.video_id.is_empty() || rec.author.is_empty() {
                        continue;
                    }
                    batch.push(rec);
                }
                None => {
                    self.done = true;
                    break;
                }
            }
        }
        if batch.is_empty() {
            Ok(None)
        } else {
            Ok(Some(batch))
        }
    }
}

impl Iterator for ChunkedCommentReader {
    type Item = Result<Vec<CommentRecord>, SimError>;

    fn next(&mut self) -> Option<Self::Item> {
        self.next_batch().transpose()
    }
}
