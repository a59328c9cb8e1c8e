//! Core data structures for wordex: an inverted word-position index, the
//! reader-writer lock and work queue that make it safe to build and query
//! concurrently, and the stemming tokenizer that feeds it.

pub mod index;
pub mod lock;
pub mod queue;
pub mod shared;
pub mod tokenizer;

pub use index::{InvertedIndex, SearchResult};
pub use lock::ReadWriteLock;
pub use queue::{WorkQueue, DEFAULT_WORKERS};
pub use shared::SharedIndex;
