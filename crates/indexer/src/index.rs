use crate::canonical::{canonical_key, AnagramKey};
use crate::dictionary::Word;
use crate::merge::ClassMap;
use std::collections::HashMap;

/// Finished anagram store: canonical key to the words sharing it.
///
/// Immutable once built; share it behind an `Arc` for concurrent readers.
#[derive(Debug, Clone, Default)]
pub struct AnagramIndex {
    classes: ClassMap,
    words: usize,
}

impl AnagramIndex {
    pub(crate) fn from_classes(classes: ClassMap) -> Self {
        let words = classes.values().map(Vec::len).sum();
        Self { classes, words }
    }

    /// Single-threaded grouping, in iteration order.
    pub fn from_words<I, W>(words: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: Into<Word>,
    {
        let mut classes: ClassMap = HashMap::new();
        for word in words {
            let word: Word = word.into();
            classes.entry(canonical_key(&word)).or_default().push(word);
        }
        Self::from_classes(classes)
    }

    /// The full class of `word`, including `word` itself when it is in the dictionary.
    pub fn lookup(&self, word: &str) -> &[Word] {
        self.get(&canonical_key(word))
    }

    pub fn get(&self, key: &AnagramKey) -> &[Word] {
        self.classes.get(key).map(Vec::as_slice).unwrap_or(&[])
    }

    /// The class of `word` without exact occurrences of `word`.
    pub fn anagrams_of<'a>(&'a self, word: &'a str) -> impl Iterator<Item = &'a Word> + 'a {
        self.lookup(word)
            .iter()
            .filter(move |candidate| candidate.as_ref() != word)
    }

    /// Number of classes.
    pub fn len(&self) -> usize {
        self.classes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.classes.is_empty()
    }

    pub fn word_count(&self) -> usize {
        self.words
    }

    pub fn classes(&self) -> impl Iterator<Item = (&AnagramKey, &[Word])> {
        self.classes
            .iter()
            .map(|(key, words)| (key, words.as_slice()))
    }

    /// Classes with at least two members.
    pub fn interesting_classes(&self) -> impl Iterator<Item = (&AnagramKey, &[Word])> {
        self.classes().filter(|(_, words)| words.len() > 1)
    }

    pub fn largest_class(&self) -> usize {
        self.classes.values().map(Vec::len).max().unwrap_or(0)
    }
}
