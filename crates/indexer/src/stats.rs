use serde::{Deserialize, Serialize};

/// Statistics about one index build
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct IndexStats {
    /// Number of dictionary words indexed
    pub words: usize,

    /// Number of length partitions dispatched
    pub partitions: usize,

    /// Number of workers that ran
    pub workers: usize,

    /// Number of anagram classes
    pub classes: usize,

    /// Classes with two or more members
    pub interesting_classes: usize,

    /// Size of the biggest class
    pub largest_class: usize,

    /// Time taken in milliseconds
    pub time_ms: u64,
}

impl IndexStats {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn singleton_classes(&self) -> usize {
        self.classes - self.interesting_classes
    }
}

impl std::fmt::Display for IndexStats {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(
            f,
            "{} words, {} classes ({} with anagrams, largest {}), {} partitions on {} workers in {} ms",
            self.words,
            self.classes,
            self.interesting_classes,
            self.largest_class,
            self.partitions,
            self.workers,
            self.time_ms
        )
    }
}
