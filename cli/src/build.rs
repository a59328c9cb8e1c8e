use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use wordex_core::{tokenizer, InvertedIndex, SharedIndex, WorkQueue};

use crate::walk;

/// Stems one file into `index`, numbering positions 1, 2, 3, ... across the
/// whole file.
pub fn index_file(index: &mut InvertedIndex, path: &Path) -> Result<()> {
    let reader = BufReader::new(File::open(path)?);
    let location = path.to_string_lossy().into_owned();
    let mut position = 1usize;
    for line in reader.lines() {
        for stem in tokenizer::stems(&line?) {
            index.add(&stem, &location, position);
            position += 1;
        }
    }
    Ok(())
}

/// Single-threaded build: indexes every text file under `root` in place.
/// A file that fails to read is reported once and skipped.
pub fn build(index: &mut InvertedIndex, root: &Path) -> Result<()> {
    let files = walk::text_files(root)?;
    let total = files.len();
    for file in files {
        if let Err(err) = index_file(index, &file) {
            tracing::error!(path = %file.display(), %err, "failed to index file");
        }
    }
    tracing::info!(files = total, words = index.word_count(), "index built");
    Ok(())
}

/// Pooled build: one task per file stems into a private index, then takes
/// the write lock once to merge it into the shared one. Returns after the
/// pool drains.
pub fn build_parallel(index: &Arc<SharedIndex>, root: &Path, queue: &WorkQueue) -> Result<()> {
    let files = walk::text_files(root)?;
    let total = files.len();
    let shared = Arc::clone(index);
    queue.fan_out(files, move |file| {
        let mut local = InvertedIndex::new();
        match index_file(&mut local, &file) {
            Ok(()) => shared.merge(local),
            Err(err) => tracing::error!(path = %file.display(), %err, "failed to index file"),
        }
    });
    tracing::info!(files = total, words = index.word_count(), "index built");
    Ok(())
}
