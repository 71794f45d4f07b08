use crate::canonical::AnagramKey;
use crate::dictionary::Word;
use crate::error::{IndexerError, Result};
use std::collections::{HashMap, HashSet};
use std::sync::Mutex;

pub type ClassMap = HashMap<AnagramKey, Vec<Word>>;

/// One worker's grouping of a single partition.
#[derive(Debug, Clone, Default)]
pub struct PartialMap {
    pub partition_id: usize,
    pub classes: ClassMap,
}

impl PartialMap {
    pub fn new(partition_id: usize) -> Self {
        Self {
            partition_id,
            classes: HashMap::new(),
        }
    }

    /// Append `word` to its class, keeping encounter order.
    pub fn insert(&mut self, key: AnagramKey, word: Word) {
        self.classes.entry(key).or_default().push(word);
    }

    pub fn word_count(&self) -> usize {
        self.classes.values().map(Vec::len).sum()
    }
}

#[derive(Default)]
struct MergeState {
    classes: ClassMap,
    merged: HashSet<usize>,
}

/// Fan-in point of the build: folds partial maps into the final class map.
///
/// The lock is held for exactly one partial at a time. Existing classes are extended,
/// never replaced, and a partition id is only ever merged once.
pub struct Merger {
    expected: usize,
    state: Mutex<MergeState>,
}

impl Merger {
    pub fn new(expected: usize) -> Self {
        Self {
            expected,
            state: Mutex::new(MergeState::default()),
        }
    }

    /// Merge one partial. Returns `false` when its partition was already merged.
    pub fn merge(&self, partial: PartialMap) -> Result<bool> {
        let mut state = self
            .state
            .lock()
            .map_err(|_| IndexerError::Other("merge state lock poisoned".to_string()))?;

        if !state.merged.insert(partial.partition_id) {
            log::warn!(
                "Partition {} merged twice; ignoring duplicate",
                partial.partition_id
            );
            return Ok(false);
        }

        for (key, words) in partial.classes {
            state.classes.entry(key).or_default().extend(words);
        }
        Ok(true)
    }

    pub fn merged(&self) -> usize {
        self.state
            .lock()
            .map(|state| state.merged.len())
            .unwrap_or_default()
    }

    pub fn expected(&self) -> usize {
        self.expected
    }

    /// Release the merged map once every expected partial has arrived.
    pub fn finish(self) -> Result<ClassMap> {
        let state = self
            .state
            .into_inner()
            .map_err(|_| IndexerError::Other("merge state lock poisoned".to_string()))?;
        if state.merged.len() != self.expected {
            return Err(IndexerError::IncompleteBuild {
                merged: state.merged.len(),
                expected: self.expected,
            });
        }
        Ok(state.classes)
    }
}
