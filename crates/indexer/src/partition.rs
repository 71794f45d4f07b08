use crate::dictionary::{word_len, Word};
use std::ops::Range;

/// A contiguous run of equal-length words inside the length-sorted dictionary.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Partition {
    /// Emission order, starting at 0.
    pub id: usize,
    /// Length (in chars) shared by every word of the partition.
    pub length: usize,
    /// Position of the run inside the dictionary.
    pub range: Range<usize>,
}

impl Partition {
    pub fn len(&self) -> usize {
        self.range.len()
    }

    pub fn is_empty(&self) -> bool {
        self.range.is_empty()
    }

    pub fn words<'a>(&self, words: &'a [Word]) -> &'a [Word] {
        &words[self.range.clone()]
    }
}

/// Iterator over the length partitions of a word list sorted by ascending length.
///
/// The list is assumed sorted; an unsorted list yields one partition per run of equal
/// lengths, which is still a valid cover of the input.
pub struct Partitions<'a> {
    words: &'a [Word],
    start: usize,
    next_id: usize,
}

impl<'a> Partitions<'a> {
    pub fn new(words: &'a [Word]) -> Self {
        Self {
            words,
            start: 0,
            next_id: 0,
        }
    }
}

impl Iterator for Partitions<'_> {
    type Item = Partition;

    fn next(&mut self) -> Option<Partition> {
        let first = self.words.get(self.start)?;
        let length = word_len(first);
        let end = self.words[self.start..]
            .iter()
            .position(|word| word_len(word) != length)
            .map_or(self.words.len(), |offset| self.start + offset);

        let partition = Partition {
            id: self.next_id,
            length,
            range: self.start..end,
        };
        self.start = end;
        self.next_id += 1;
        Some(partition)
    }
}

pub fn partitions(words: &[Word]) -> Partitions<'_> {
    Partitions::new(words)
}

/// Number of partitions `partitions(words)` would yield.
pub fn count_partitions(words: &[Word]) -> usize {
    let mut count = 0;
    let mut current = None;
    for word in words {
        let length = word_len(word);
        if current != Some(length) {
            count += 1;
            current = Some(length);
        }
    }
    count
}
