use std::fs;
use std::path::Path;
use std::sync::Arc;

use tempfile::tempdir;
use wordex::{build, output, query};
use wordex_core::{InvertedIndex, SharedIndex, WorkQueue};

fn write_corpus(dir: &Path) {
    fs::write(dir.join("a.txt"), "dog cat dog").unwrap();
    fs::write(dir.join("b.txt"), "cat").unwrap();
    fs::write(dir.join("notes.md"), "dog dog dog").unwrap();
}

fn location(dir: &Path, name: &str) -> String {
    dir.join(name).to_string_lossy().into_owned()
}

#[test]
fn single_threaded_build_indexes_the_corpus() {
    let dir = tempdir().unwrap();
    write_corpus(dir.path());

    let mut index = InvertedIndex::new();
    build::build(&mut index, dir.path()).unwrap();

    let a = location(dir.path(), "a.txt");
    let b = location(dir.path(), "b.txt");

    assert_eq!(index.word_count(), 2);
    assert_eq!(index.positions("dog", &a).collect::<Vec<_>>(), vec![1, 3]);
    assert_eq!(index.positions("cat", &a).collect::<Vec<_>>(), vec![2]);
    assert_eq!(index.positions("cat", &b).collect::<Vec<_>>(), vec![1]);
    assert_eq!(index.count_of(&a), 3);
    assert_eq!(index.count_of(&b), 1);
    // The markdown file is not a text file and must not be indexed.
    assert_eq!(index.locations("dog").count(), 1);
}

#[test]
fn exact_query_ranks_and_scores() {
    let dir = tempdir().unwrap();
    write_corpus(dir.path());
    let queries = dir.path().join("queries.txt");
    fs::write(&queries, "dog\n").unwrap();

    let mut index = InvertedIndex::new();
    build::build(&mut index, dir.path()).unwrap();
    let results = query::run(&index, &queries, true).unwrap();

    let hits = &results["dog"];
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].location, location(dir.path(), "a.txt"));
    assert_eq!(hits[0].count, 2);

    let out = dir.path().join("results.json");
    output::write_json(&results, &out).unwrap();
    let text = fs::read_to_string(&out).unwrap();
    assert!(text.contains("\"0.66666667\""));
    assert!(text.contains("\"where\""));
}

#[test]
fn partial_query_matches_prefixes() {
    let dir = tempdir().unwrap();
    write_corpus(dir.path());
    let queries = dir.path().join("queries.txt");
    fs::write(&queries, "do\n").unwrap();

    let mut index = InvertedIndex::new();
    build::build(&mut index, dir.path()).unwrap();
    let results = query::run(&index, &queries, false).unwrap();

    let hits = &results["do"];
    assert_eq!(hits.len(), 1);
    assert_eq!(hits[0].count, 2);
}

#[test]
fn duplicate_canonical_queries_collapse() {
    let dir = tempdir().unwrap();
    write_corpus(dir.path());
    let queries = dir.path().join("queries.txt");
    fs::write(&queries, "dog cat\ncat dog\ncat CAT dog\n\n!!\n").unwrap();

    let mut index = InvertedIndex::new();
    build::build(&mut index, dir.path()).unwrap();
    let results = query::run(&index, &queries, true).unwrap();

    assert_eq!(results.len(), 1);
    assert!(results.contains_key("cat dog"));
}

#[test]
fn pooled_builds_match_the_single_threaded_result() {
    let dir = tempdir().unwrap();
    write_corpus(dir.path());
    let queries = dir.path().join("queries.txt");
    fs::write(&queries, "dog\ncat dog\ndo\n").unwrap();

    let mut baseline = InvertedIndex::new();
    build::build(&mut baseline, dir.path()).unwrap();
    let baseline_results = query::run(&baseline, &queries, false).unwrap();
    let baseline_json = serde_json::to_string(&baseline_results).unwrap();

    for workers in [1, 2, 8] {
        let queue = WorkQueue::new(workers);
        let shared = Arc::new(SharedIndex::new());
        build::build_parallel(&shared, dir.path(), &queue).unwrap();

        {
            let built = shared.read();
            assert_eq!(built.entries(), baseline.entries());
            assert_eq!(built.counts(), baseline.counts());
        }

        let results = query::run_parallel(&shared, &queries, false, &queue).unwrap();
        assert_eq!(serde_json::to_string(&results).unwrap(), baseline_json);
        queue.shutdown();
    }
}

#[test]
fn missing_corpus_is_an_error() {
    let dir = tempdir().unwrap();
    let mut index = InvertedIndex::new();
    let missing = dir.path().join("nope");
    assert!(build::build(&mut index, &missing).is_err());
    assert!(index.is_empty());
}
