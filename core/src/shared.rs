use std::collections::{BTreeMap, BTreeSet};

use crate::index::{InvertedIndex, SearchResult};
use crate::lock::{ReadGuard, ReadWriteLock};

/// An [`InvertedIndex`] behind a [`ReadWriteLock`]: mutations take the write
/// lock, lookups and searches take the read lock, so concurrent per-file
/// merges during a build and concurrent searches during a query phase are
/// both safe.
#[derive(Default)]
pub struct SharedIndex {
    inner: ReadWriteLock<InvertedIndex>,
}

impl SharedIndex {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&self, word: &str, location: &str, position: usize) -> bool {
        self.inner.write().add(word, location, position)
    }

    pub fn add_words<I, W>(&self, words: I, location: &str)
    where
        I: IntoIterator<Item = W>,
        W: AsRef<str>,
    {
        self.inner.write().add_words(words, location);
    }

    pub fn merge(&self, other: InvertedIndex) {
        self.inner.write().merge(other);
    }

    pub fn contains(&self, word: &str) -> bool {
        self.inner.read().contains(word)
    }

    pub fn contains_location(&self, word: &str, location: &str) -> bool {
        self.inner.read().contains_location(word, location)
    }

    pub fn contains_position(&self, word: &str, location: &str, position: usize) -> bool {
        self.inner.read().contains_position(word, location, position)
    }

    pub fn words(&self) -> Vec<String> {
        self.inner.read().words().cloned().collect()
    }

    pub fn locations(&self, word: &str) -> Vec<String> {
        self.inner.read().locations(word).cloned().collect()
    }

    pub fn positions(&self, word: &str, location: &str) -> BTreeSet<usize> {
        self.inner.read().positions(word, location).collect()
    }

    pub fn word_count(&self) -> usize {
        self.inner.read().word_count()
    }

    pub fn location_count(&self, word: &str) -> usize {
        self.inner.read().location_count(word)
    }

    pub fn position_count(&self, word: &str, location: &str) -> usize {
        self.inner.read().position_count(word, location)
    }

    pub fn count_of(&self, location: &str) -> usize {
        self.inner.read().count_of(location)
    }

    pub fn counts(&self) -> BTreeMap<String, usize> {
        self.inner.read().counts().clone()
    }

    pub fn is_empty(&self) -> bool {
        self.inner.read().is_empty()
    }

    pub fn exact_search(&self, terms: &BTreeSet<String>) -> Vec<SearchResult> {
        self.inner.read().exact_search(terms)
    }

    pub fn partial_search(&self, terms: &BTreeSet<String>) -> Vec<SearchResult> {
        self.inner.read().partial_search(terms)
    }

    pub fn search(&self, terms: &BTreeSet<String>, exact: bool) -> Vec<SearchResult> {
        self.inner.read().search(terms, exact)
    }

    /// Borrows the underlying index for serialization between phases.
    /// Holds the read lock for the guard's lifetime.
    pub fn read(&self) -> ReadGuard<'_, InvertedIndex> {
        self.inner.read()
    }

    pub fn into_inner(self) -> InvertedIndex {
        self.inner.into_inner()
    }
}
