//! # Anagram Indexer
//!
//! Builds an in-memory index of dictionary words grouped by anagram class.
//!
//! ## Pipeline
//!
//! ```text
//! Dictionary (sorted by length)
//!     │
//!     ├──> Partitioner
//!     │      └─> Runs of equal-length words
//!     │
//!     ├──> Worker pool (canonical key per word)
//!     │      └─> Partial key → class maps
//!     │
//!     └──> Merger (one lock, append only)
//!            └─> AnagramIndex
//! ```
//!
//! ## Example
//!
//! ```no_run
//! use anagram_indexer::{BuildConfig, IndexBuilder};
//!
//! #[tokio::main]
//! async fn main() -> anyhow::Result<()> {
//!     let builder = IndexBuilder::new(BuildConfig::new("/usr/share/dict/words"));
//!     let (index, stats) = builder.build().await?;
//!
//!     println!("{} classes from {} words", stats.classes, stats.words);
//!     for word in index.lookup("listen") {
//!         println!("{word}");
//!     }
//!     Ok(())
//! }
//! ```

mod canonical;
mod dictionary;
mod error;
mod index;
mod indexer;
mod limits;
mod merge;
mod partition;
mod pool;
mod stats;

pub use canonical::{canonical_key, AnagramKey};
pub use dictionary::{word_len, Dictionary, Word};
pub use error::{IndexerError, Result};
pub use index::AnagramIndex;
pub use indexer::{BuildConfig, IndexBuilder};
pub use limits::{
    clamp_max_workers, default_max_workers, max_workers_from_env, parse_max_workers,
    MAX_WORKERS_ENV,
};
pub use merge::{ClassMap, Merger, PartialMap};
pub use partition::{count_partitions, partitions, Partition, Partitions};
pub use pool::{group_partition, PoolReport, WorkerPool};
pub use stats::IndexStats;
