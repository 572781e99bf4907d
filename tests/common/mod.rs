// Not every test binary uses every helper.
#![allow(dead_code)]

use sprs::{CsMat, TriMat};
use std::fs::File;
use std::io::Write;
use std::path::Path;

/// Boolean incidence matrix (videos x users) from (video row, user column)
/// pairs.
pub fn incidence(rows: usize, cols: usize, pairs: &[(usize, usize)]) -> CsMat<u16> {
    let mut tri = TriMat::with_capacity((rows, cols), pairs.len());
    for &(r, c) in pairs {
        tri.add_triplet(r, c, 1u16);
    }
    tri.to_csc()
}

/// Write a comment-log TSV with the columns a real dump carries; only
/// `author` and `video_id` matter to the reader.
pub fn write_comments_tsv(path: &Path, rows: &[(&str, &str)]) {
    let mut f = File::create(path).unwrap();
    writeln!(f, "author\tvideo_id\tlikes\treplies").unwrap();
    for (author, video) in rows {
        writeln!(f, "{author}\t{video}\t0\t0").unwrap();
    }
}

/// Same content as [`write_comments_tsv`], zstd-compressed.
pub fn write_comments_tsv_zst(path: &Path, rows: &[(&str, &str)]) {
    let f = File::create(path).unwrap();
    let mut enc = zstd::stream::write::Encoder::new(f, 3).unwrap();
    writeln!(enc, "author\tvideo_id\tlikes\treplies").unwrap();
    for (author, video) in rows {
        writeln!(enc, "{author}\t{video}\t0\t0").unwrap();
    }
    enc.finish().unwrap();
}

pub fn assert_close(a: f32, b: f32) {
    assert!((a - b).abs() < 1e-6, "expected {b}, got {a}");
}
