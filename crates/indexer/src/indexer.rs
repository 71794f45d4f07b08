use crate::dictionary::Dictionary;
use crate::error::Result;
use crate::index::AnagramIndex;
use crate::limits::max_workers_from_env;
use crate::merge::Merger;
use crate::partition::{partitions, Partition};
use crate::pool::WorkerPool;
use crate::stats::IndexStats;
use std::path::{Path, PathBuf};
use std::time::Instant;

/// Where the dictionary lives and how many workers may group it.
#[derive(Clone, Debug)]
pub struct BuildConfig {
    pub dictionary: PathBuf,
    pub max_workers: usize,
}

impl BuildConfig {
    pub fn new(dictionary: impl AsRef<Path>) -> Self {
        Self {
            dictionary: dictionary.as_ref().to_path_buf(),
            max_workers: max_workers_from_env(),
        }
    }

    pub fn with_max_workers(mut self, max_workers: usize) -> Self {
        self.max_workers = max_workers.max(1);
        self
    }
}

/// Loads a dictionary and builds its anagram index
pub struct IndexBuilder {
    config: BuildConfig,
}

impl IndexBuilder {
    pub fn new(config: BuildConfig) -> Self {
        Self { config }
    }

    pub fn config(&self) -> &BuildConfig {
        &self.config
    }

    /// Load the configured dictionary and index it.
    pub async fn build(&self) -> Result<(AnagramIndex, IndexStats)> {
        let dictionary = Dictionary::load(&self.config.dictionary).await?;
        self.build_dictionary(&dictionary).await
    }

    /// Index an already loaded dictionary.
    ///
    /// Partitions are dispatched shortest first; the order in which workers finish decides
    /// the member order inside a class, not the membership.
    pub async fn build_dictionary(
        &self,
        dictionary: &Dictionary,
    ) -> Result<(AnagramIndex, IndexStats)> {
        let start = Instant::now();
        let jobs: Vec<Partition> = partitions(dictionary.words()).collect();
        let merger = Merger::new(jobs.len());

        log::info!(
            "Indexing {} words in {} partitions (max {} workers)",
            dictionary.len(),
            jobs.len(),
            self.config.max_workers
        );

        let report = WorkerPool::new(self.config.max_workers)
            .run(dictionary.shared_words(), jobs, &merger)
            .await?;
        let index = AnagramIndex::from_classes(merger.finish()?);

        let stats = IndexStats {
            words: index.word_count(),
            partitions: report.partitions,
            workers: report.workers,
            classes: index.len(),
            interesting_classes: index.interesting_classes().count(),
            largest_class: index.largest_class(),
            time_ms: start.elapsed().as_millis() as u64,
        };
        log::info!("Index ready: {stats}");
        Ok((index, stats))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use std::collections::{BTreeMap, BTreeSet};

    fn membership(index: &AnagramIndex) -> BTreeMap<String, BTreeSet<String>> {
        index
            .classes()
            .map(|(key, words)| {
                (
                    key.to_string(),
                    words.iter().map(|w| w.to_string()).collect(),
                )
            })
            .collect()
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 4)]
    async fn concurrent_build_matches_sequential_grouping() {
        let words = [
            "listen", "silent", "enlist", "tinsel", "cat", "act", "tac", "dog", "god", "a",
            "stop", "pots", "spot", "tops", "opts", "post", "tacos", "coast", "costa",
        ];
        let dictionary = Dictionary::from_words(words);
        let builder = IndexBuilder::new(BuildConfig::new("unused").with_max_workers(3));

        let (index, stats) = builder.build_dictionary(&dictionary).await.expect("build");

        assert_eq!(membership(&index), membership(&AnagramIndex::from_words(words)));
        assert_eq!(stats.words, words.len());
        assert_eq!(stats.partitions, 5);
        assert_eq!(stats.workers, 3);
        assert_eq!(stats.classes, index.len());
        assert_eq!(stats.interesting_classes, 5);
        assert_eq!(stats.singleton_classes(), 1);
        assert_eq!(stats.largest_class, 6);
    }

    #[tokio::test]
    async fn empty_dictionary_builds_empty_index() {
        let builder = IndexBuilder::new(BuildConfig::new("unused").with_max_workers(2));
        let (index, stats) = builder
            .build_dictionary(&Dictionary::default())
            .await
            .expect("build");
        assert!(index.is_empty());
        assert_eq!(stats, IndexStats { time_ms: stats.time_ms, ..IndexStats::new() });
    }

    #[test]
    fn with_max_workers_never_goes_below_one() {
        let config = BuildConfig::new("/tmp/words").with_max_workers(0);
        assert_eq!(config.max_workers, 1);
        assert_eq!(config.dictionary, PathBuf::from("/tmp/words"));
    }
}
