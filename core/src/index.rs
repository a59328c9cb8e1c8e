use std::cmp::Ordering;
use std::collections::{BTreeMap, BTreeSet};
use std::ops::Bound;

use serde::{Serialize, Serializer};

/// One ranked hit for a query: the location it matched in, how many
/// positions matched, and the match count relative to the location's size.
#[derive(Debug, Clone, Serialize)]
pub struct SearchResult {
    #[serde(rename = "where")]
    pub location: String,
    pub count: usize,
    #[serde(serialize_with = "eight_decimals")]
    pub score: f64,
}

fn eight_decimals<S: Serializer>(score: &f64, serializer: S) -> Result<S::Ok, S::Error> {
    serializer.serialize_str(&format!("{score:.8}"))
}

impl SearchResult {
    /// Ranking order: score descending, ties by count descending, then by
    /// location ascending ignoring case.
    pub fn cmp_rank(&self, other: &Self) -> Ordering {
        other
            .score
            .total_cmp(&self.score)
            .then_with(|| other.count.cmp(&self.count))
            .then_with(|| {
                self.location
                    .to_lowercase()
                    .cmp(&other.location.to_lowercase())
            })
    }
}

/// Word-position index over a corpus: word -> location -> sorted 1-based
/// positions, alongside the total indexed word count per location.
///
/// Both maps iterate in key order, which the JSON exports and the prefix
/// search rely on. The count for a location always equals the number of
/// distinct (word, position) pairs recorded for it.
#[derive(Debug, Default, Clone)]
pub struct InvertedIndex {
    index: BTreeMap<String, BTreeMap<String, BTreeSet<usize>>>,
    counts: BTreeMap<String, usize>,
}

impl InvertedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    /// Records one occurrence of `word` at `position` in `location`.
    /// Duplicate triples are a no-op; returns whether the position was new.
    pub fn add(&mut self, word: &str, location: &str, position: usize) -> bool {
        let inserted = self
            .index
            .entry(word.to_string())
            .or_default()
            .entry(location.to_string())
            .or_default()
            .insert(position);
        if inserted {
            *self.counts.entry(location.to_string()).or_insert(0) += 1;
        }
        inserted
    }

    /// Adds a sequence of words at positions 1, 2, 3, ...
    pub fn add_words<I, W>(&mut self, words: I, location: &str)
    where
        I: IntoIterator<Item = W>,
        W: AsRef<str>,
    {
        for (offset, word) in words.into_iter().enumerate() {
            self.add(word.as_ref(), location, offset + 1);
        }
    }

    /// Folds another index into this one, unioning words, locations, and
    /// position sets. Counts are re-derived from the positions actually
    /// inserted, so locations present in both indexes stay consistent with
    /// the count invariant.
    pub fn merge(&mut self, other: InvertedIndex) {
        for (word, locations) in other.index {
            let entry = self.index.entry(word).or_default();
            for (location, positions) in locations {
                let set = entry.entry(location.clone()).or_default();
                let before = set.len();
                set.extend(positions);
                let added = set.len() - before;
                if added > 0 {
                    *self.counts.entry(location).or_insert(0) += added;
                }
            }
        }
    }

    pub fn contains(&self, word: &str) -> bool {
        self.index.contains_key(word)
    }

    pub fn contains_location(&self, word: &str, location: &str) -> bool {
        self.index
            .get(word)
            .is_some_and(|locations| locations.contains_key(location))
    }

    pub fn contains_position(&self, word: &str, location: &str, position: usize) -> bool {
        self.index
            .get(word)
            .and_then(|locations| locations.get(location))
            .is_some_and(|positions| positions.contains(&position))
    }

    pub fn words(&self) -> impl Iterator<Item = &String> {
        self.index.keys()
    }

    pub fn locations<'a>(&'a self, word: &str) -> impl Iterator<Item = &'a String> {
        self.index
            .get(word)
            .into_iter()
            .flat_map(|locations| locations.keys())
    }

    pub fn positions<'a>(&'a self, word: &str, location: &str) -> impl Iterator<Item = usize> + 'a {
        self.index
            .get(word)
            .and_then(|locations| locations.get(location))
            .into_iter()
            .flatten()
            .copied()
    }

    pub fn word_count(&self) -> usize {
        self.index.len()
    }

    pub fn location_count(&self, word: &str) -> usize {
        self.index.get(word).map_or(0, BTreeMap::len)
    }

    pub fn position_count(&self, word: &str, location: &str) -> usize {
        self.index
            .get(word)
            .and_then(|locations| locations.get(location))
            .map_or(0, BTreeSet::len)
    }

    /// Total indexed words recorded for `location`; zero when absent.
    pub fn count_of(&self, location: &str) -> usize {
        self.counts.get(location).copied().unwrap_or(0)
    }

    pub fn is_empty(&self) -> bool {
        self.index.is_empty()
    }

    /// The full word -> location -> positions mapping, for serialization.
    pub fn entries(&self) -> &BTreeMap<String, BTreeMap<String, BTreeSet<usize>>> {
        &self.index
    }

    /// The location -> word count mapping, for serialization.
    pub fn counts(&self) -> &BTreeMap<String, usize> {
        &self.counts
    }

    /// Ranked results for index words exactly equal to a query term.
    pub fn exact_search(&self, terms: &BTreeSet<String>) -> Vec<SearchResult> {
        let mut matched: BTreeMap<&String, usize> = BTreeMap::new();
        for term in terms {
            if let Some(locations) = self.index.get(term) {
                for (location, positions) in locations {
                    *matched.entry(location).or_insert(0) += positions.len();
                }
            }
        }
        self.ranked(matched)
    }

    /// Ranked results for index words starting with a query term. Scans the
    /// sorted tail of the index from each term and stops as soon as the
    /// prefix no longer matches. A word reachable from two query terms is
    /// counted once.
    pub fn partial_search(&self, terms: &BTreeSet<String>) -> Vec<SearchResult> {
        let mut matched: BTreeMap<&String, usize> = BTreeMap::new();
        let mut seen = BTreeSet::new();
        for term in terms {
            for (word, locations) in self
                .index
                .range::<str, _>((Bound::Included(term.as_str()), Bound::Unbounded))
            {
                if !word.starts_with(term.as_str()) {
                    break;
                }
                if !seen.insert(word) {
                    continue;
                }
                for (location, positions) in locations {
                    *matched.entry(location).or_insert(0) += positions.len();
                }
            }
        }
        self.ranked(matched)
    }

    pub fn search(&self, terms: &BTreeSet<String>, exact: bool) -> Vec<SearchResult> {
        if exact {
            self.exact_search(terms)
        } else {
            self.partial_search(terms)
        }
    }

    fn ranked(&self, matched: BTreeMap<&String, usize>) -> Vec<SearchResult> {
        let mut results: Vec<SearchResult> = matched
            .into_iter()
            .map(|(location, count)| {
                let total = self.count_of(location);
                let score = if total == 0 {
                    0.0
                } else {
                    count as f64 / total as f64
                };
                SearchResult {
                    location: location.clone(),
                    count,
                    score,
                }
            })
            .collect();
        results.sort_by(|a, b| a.cmp_rank(b));
        results
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn terms(words: &[&str]) -> BTreeSet<String> {
        words.iter().map(|w| w.to_string()).collect()
    }

    #[test]
    fn counts_track_distinct_positions() {
        let mut index = InvertedIndex::new();
        assert!(index.add("dog", "a.txt", 1));
        assert!(index.add("cat", "a.txt", 2));
        assert!(index.add("dog", "a.txt", 3));
        assert!(!index.add("dog", "a.txt", 3));
        assert!(!index.add("dog", "a.txt", 1));
        assert_eq!(index.count_of("a.txt"), 3);
        assert_eq!(index.position_count("dog", "a.txt"), 2);
    }

    #[test]
    fn add_words_positions_start_at_one() {
        let mut index = InvertedIndex::new();
        index.add_words(["dog", "cat", "dog"], "a.txt");
        let positions: Vec<usize> = index.positions("dog", "a.txt").collect();
        assert_eq!(positions, vec![1, 3]);
        let positions: Vec<usize> = index.positions("cat", "a.txt").collect();
        assert_eq!(positions, vec![2]);
        assert_eq!(index.count_of("a.txt"), 3);
    }

    #[test]
    fn absent_keys_are_empty_not_errors() {
        let index = InvertedIndex::new();
        assert!(!index.contains("dog"));
        assert!(!index.contains_location("dog", "a.txt"));
        assert!(!index.contains_position("dog", "a.txt", 1));
        assert_eq!(index.locations("dog").count(), 0);
        assert_eq!(index.positions("dog", "a.txt").count(), 0);
        assert_eq!(index.count_of("a.txt"), 0);
        assert!(index.exact_search(&terms(&["dog"])).is_empty());
    }

    #[test]
    fn merge_matches_direct_union() {
        let mut left = InvertedIndex::new();
        left.add_words(["dog", "cat", "dog"], "a.txt");
        let mut right = InvertedIndex::new();
        right.add_words(["cat"], "b.txt");

        let mut merged = InvertedIndex::new();
        merged.merge(left.clone());
        merged.merge(right.clone());

        let mut direct = InvertedIndex::new();
        direct.add_words(["dog", "cat", "dog"], "a.txt");
        direct.add_words(["cat"], "b.txt");

        assert_eq!(merged.entries(), direct.entries());
        assert_eq!(merged.counts(), direct.counts());
    }

    #[test]
    fn merge_same_location_different_words() {
        let mut left = InvertedIndex::new();
        left.add("dog", "a.txt", 1);
        left.add("dog", "a.txt", 3);
        let mut right = InvertedIndex::new();
        right.add("cat", "a.txt", 2);

        let mut merged = InvertedIndex::new();
        merged.merge(left);
        merged.merge(right);
        assert_eq!(merged.count_of("a.txt"), 3);

        // Overlapping positions must not raise the count either.
        let mut overlap = InvertedIndex::new();
        overlap.add("dog", "a.txt", 1);
        merged.merge(overlap);
        assert_eq!(merged.count_of("a.txt"), 3);
    }

    #[test]
    fn exact_search_scores_and_orders() {
        let mut index = InvertedIndex::new();
        index.add_words(["dog", "cat", "dog"], "a.txt");
        index.add_words(["cat"], "b.txt");

        let results = index.exact_search(&terms(&["dog"]));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].location, "a.txt");
        assert_eq!(results[0].count, 2);
        assert!((results[0].score - 2.0 / 3.0).abs() < 1e-12);

        let results = index.exact_search(&terms(&["cat"]));
        assert_eq!(results.len(), 2);
        // b.txt scores 1/1, a.txt scores 1/3.
        assert_eq!(results[0].location, "b.txt");
        assert_eq!(results[1].location, "a.txt");
    }

    #[test]
    fn partial_search_stops_at_prefix_boundary() {
        let mut index = InvertedIndex::new();
        for (word, position) in [("computer", 1), ("computation", 2), ("compute", 3), ("dog", 4)]
        {
            index.add(word, "a.txt", position);
        }
        let results = index.partial_search(&terms(&["comput"]));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].count, 3);
        assert!(index.partial_search(&terms(&["dragon"])).is_empty());
    }

    #[test]
    fn overlapping_prefixes_count_a_word_once() {
        let mut index = InvertedIndex::new();
        index.add("computer", "a.txt", 1);
        index.add("dog", "a.txt", 2);
        let results = index.partial_search(&terms(&["comp", "comput"]));
        assert_eq!(results.len(), 1);
        assert_eq!(results[0].count, 1);
    }

    #[test]
    fn ranking_breaks_ties_by_count_then_location() {
        let a = SearchResult {
            location: "B.txt".into(),
            count: 2,
            score: 0.5,
        };
        let b = SearchResult {
            location: "a.txt".into(),
            count: 2,
            score: 0.5,
        };
        let c = SearchResult {
            location: "c.txt".into(),
            count: 1,
            score: 0.5,
        };
        let d = SearchResult {
            location: "d.txt".into(),
            count: 9,
            score: 0.9,
        };
        let mut results = vec![a, b, c, d];
        results.sort_by(|x, y| x.cmp_rank(y));
        let order: Vec<&str> = results.iter().map(|r| r.location.as_str()).collect();
        assert_eq!(order, vec!["d.txt", "a.txt", "B.txt", "c.txt"]);
    }

    #[test]
    fn scores_serialize_with_eight_decimals() {
        let result = SearchResult {
            location: "a.txt".into(),
            count: 2,
            score: 2.0 / 3.0,
        };
        let json = serde_json::to_value(&result).unwrap();
        assert_eq!(json["where"], "a.txt");
        assert_eq!(json["count"], 2);
        assert_eq!(json["score"], "0.66666667");
    }
}
