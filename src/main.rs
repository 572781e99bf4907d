use anyhow::{Context, Result};
use commentsim::{
    align_columns, build_interaction_matrix, build_similarity_table, init_tracing_once,
    BuildOptions, ChunkedCommentReader, IdMap, Precision, Statistic,
};
use std::collections::BTreeMap;
use std::fs;
use std::path::PathBuf;

const COMMENTS_PATH: &str = "./data/comments.tsv.zst";
const VIDEOS_PATH: &str = "./data/videos.txt";
const CLUSTERS_DIR: &str = "./data/clusters";
const WORK_ROOT: &str = "./sim_work";

fn read_lines(path: &PathBuf) -> Result<Vec<String>> {
    let text = fs::read_to_string(path).with_context(|| format!("reading {}", path.display()))?;
    Ok(text.lines().filter(|l| !l.is_empty()).map(str::to_string).collect())
}

fn main() -> Result<()> {
    init_tracing_once();

    let comments = PathBuf::from(COMMENTS_PATH);
    let work_dir = PathBuf::from(WORK_ROOT);
    fs::create_dir_all(&work_dir)?;

    let video_ids = read_lines(&PathBuf::from(VIDEOS_PATH))?;
    let video_map = IdMap::build(video_ids)?;
    println!("{} videos", video_map.len());

    // One user list per cluster: data/clusters/<name>.txt, sorted unique ids.
    let mut cluster_lists: BTreeMap<String, Vec<String>> = BTreeMap::new();
    for entry in fs::read_dir(CLUSTERS_DIR)? {
        let path = entry?.path();
        if path.extension().map(|e| e == "txt").unwrap_or(false) {
            let name = path
                .file_stem()
                .map(|s| s.to_string_lossy().into_owned())
                .unwrap_or_default();
            let mut list = read_lines(&path)?;
            list.sort();
            list.dedup();
            cluster_lists.insert(name, list);
        }
    }
    println!("{} clusters", cluster_lists.len());
    if cluster_lists.is_empty() {
        anyhow::bail!("no cluster user lists found under {CLUSTERS_DIR}");
    }

    let opts = BuildOptions::default().with_progress(true);
    let mut raw = BTreeMap::new();
    for (name, list) in &cluster_lists {
        let reader = ChunkedCommentReader::open(
            &comments,
            b'\t',
            opts.chunk_size,
            opts.read_buffer_bytes,
        )?;
        let matrix_path = work_dir.join(format!("{name}.smx"));
        let opts = opts.clone().with_progress_label(format!("cluster {name}"));
        let matrix = build_interaction_matrix(reader, &video_map, list, &matrix_path, &opts)?;
        raw.insert(name.clone(), matrix);
    }

    // Align every matrix onto one shared user universe so the table builder
    // can compare any pair directly.
    let names: Vec<String> = raw.keys().cloned().collect();
    let mut matrices = raw.clone();
    let mut user_lists: BTreeMap<String, Vec<String>> = cluster_lists.clone();
    for i in 1..names.len() {
        let (head, tail) = (names[0].clone(), names[i].clone());
        let (a, b, union) = align_columns(
            &matrices[&head],
            &matrices[&tail],
            &user_lists[&head],
            &user_lists[&tail],
        )?;
        matrices.insert(head.clone(), a);
        matrices.insert(tail.clone(), b);
        user_lists.insert(head, union.clone());
        user_lists.insert(tail, union);
    }
    // Earlier clusters were widened again by later unions; realign them all
    // onto the final universe.
    let universe = user_lists[&names[0]].clone();
    for name in &names {
        if user_lists[name] != universe {
            let (m, _, _) = align_columns(
                &matrices[name],
                &matrices[&names[0]],
                &user_lists[name],
                &universe,
            )?;
            matrices.insert(name.clone(), m);
            user_lists.insert(name.clone(), universe.clone());
        }
    }

    let mut cache_files = BTreeMap::new();
    for (i, a) in names.iter().enumerate() {
        for b in &names[i..] {
            cache_files.insert(
                format!("{a}_{b}"),
                work_dir.join(format!("jaccard_{a}_{b}.bin")),
            );
        }
    }

    let table = build_similarity_table(
        &matrices,
        &user_lists,
        &cache_files,
        &work_dir.join("cluster_similarity.csv"),
        Statistic::Mean,
        Precision::Half,
        true,
    )?;
    for a in table.names() {
        for b in table.names() {
            if let Some(v) = table.get(a, b) {
                println!("{a:>24} {b:>24} {v:.4}");
            }
        }
    }
    Ok(())
}
