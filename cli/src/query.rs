use std::collections::BTreeMap;
use std::fs::File;
use std::io::{BufRead, BufReader};
use std::path::Path;
use std::sync::Arc;

use anyhow::Result;
use parking_lot::Mutex;
use wordex_core::{tokenizer, InvertedIndex, SearchResult, SharedIndex, WorkQueue};

/// Ranked results keyed by the canonical query: the sorted, deduplicated
/// stems of the line joined by single spaces.
pub type QueryResults = BTreeMap<String, Vec<SearchResult>>;

fn canonical(terms: &std::collections::BTreeSet<String>) -> String {
    terms
        .iter()
        .map(String::as_str)
        .collect::<Vec<_>>()
        .join(" ")
}

/// Runs every query line in `queries` against the index. Lines that stem to
/// nothing are skipped; a line whose canonical form was already answered is
/// not searched again.
pub fn run(index: &InvertedIndex, queries: &Path, exact: bool) -> Result<QueryResults> {
    let reader = BufReader::new(File::open(queries)?);
    let mut results = QueryResults::new();
    for line in reader.lines() {
        let terms = tokenizer::unique_stems(&line?);
        if terms.is_empty() {
            continue;
        }
        results
            .entry(canonical(&terms))
            .or_insert_with(|| index.search(&terms, exact));
    }
    Ok(results)
}

/// Pooled variant: one task per query line. A task claims its canonical key
/// under the map lock before searching, so two lines with the same key
/// cannot both compute and store; the search itself runs outside the map
/// lock against the internally-locked index.
pub fn run_parallel(
    index: &Arc<SharedIndex>,
    queries: &Path,
    exact: bool,
    queue: &WorkQueue,
) -> Result<QueryResults> {
    let reader = BufReader::new(File::open(queries)?);
    let lines = reader.lines().collect::<std::io::Result<Vec<String>>>()?;

    let results = Arc::new(Mutex::new(QueryResults::new()));
    let shared = Arc::clone(index);
    let sink = Arc::clone(&results);
    queue.fan_out(lines, move |line| {
        let terms = tokenizer::unique_stems(&line);
        if terms.is_empty() {
            return;
        }
        let key = canonical(&terms);
        {
            let mut map = sink.lock();
            if map.contains_key(&key) {
                return;
            }
            map.insert(key.clone(), Vec::new());
        }
        let ranked = shared.search(&terms, exact);
        sink.lock().insert(key, ranked);
    });

    let map = std::mem::take(&mut *results.lock());
    Ok(map)
}
