use crate::error::{IndexerError, Result};
use std::path::Path;
use std::sync::Arc;

/// A dictionary word. Shared between the dictionary and the index, never copied.
pub type Word = Arc<str>;

/// Word list ordered by ascending length (in chars).
///
/// Words of equal length keep their file order, so partitions see words in the order the
/// dictionary lists them.
#[derive(Debug, Clone, Default)]
pub struct Dictionary {
    words: Arc<[Word]>,
}

impl Dictionary {
    /// Load a newline-delimited word list from disk.
    pub async fn load(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let bytes = tokio::fs::read(path)
            .await
            .map_err(|source| IndexerError::DictionaryUnavailable {
                path: path.to_path_buf(),
                source,
            })?;
        let dictionary = Self::parse(&bytes);
        log::info!(
            "Loaded {} words from {}",
            dictionary.len(),
            path.display()
        );
        Ok(dictionary)
    }

    /// Split raw bytes into words: one per line, trailing `\n`/`\r` stripped, blank lines
    /// skipped, invalid UTF-8 replaced.
    pub fn parse(bytes: &[u8]) -> Self {
        let words = bytes
            .split(|b| *b == b'\n')
            .map(|line| line.strip_suffix(b"\r").unwrap_or(line))
            .filter(|line| !line.iter().all(u8::is_ascii_whitespace))
            .map(|line| Word::from(String::from_utf8_lossy(line)));
        Self::from_words(words)
    }

    pub fn from_words<I, W>(words: I) -> Self
    where
        I: IntoIterator<Item = W>,
        W: Into<Word>,
    {
        let mut words: Vec<Word> = words.into_iter().map(Into::into).collect();
        words.sort_by_key(|word| word_len(word));
        Self {
            words: words.into(),
        }
    }

    pub fn words(&self) -> &[Word] {
        &self.words
    }

    pub fn shared_words(&self) -> Arc<[Word]> {
        Arc::clone(&self.words)
    }

    pub fn len(&self) -> usize {
        self.words.len()
    }

    pub fn is_empty(&self) -> bool {
        self.words.is_empty()
    }
}

/// Length used for partitioning.
pub fn word_len(word: &str) -> usize {
    word.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    fn as_strs(dictionary: &Dictionary) -> Vec<&str> {
        dictionary.words().iter().map(|w| w.as_ref()).collect()
    }

    #[test]
    fn parse_strips_line_endings_and_blank_lines() {
        let dictionary = Dictionary::parse(b"listen\r\nact\n\n  \ncat\nsilent");
        assert_eq!(as_strs(&dictionary), vec!["act", "cat", "listen", "silent"]);
    }

    #[test]
    fn sort_is_stable_within_a_length() {
        let dictionary = Dictionary::from_words(["dog", "a", "cat", "act", "be"]);
        assert_eq!(as_strs(&dictionary), vec!["a", "be", "dog", "cat", "act"]);
    }

    #[test]
    fn length_counts_chars_not_bytes() {
        let dictionary = Dictionary::from_words(["abc", "été"]);
        assert_eq!(as_strs(&dictionary), vec!["abc", "été"]);
        assert_eq!(word_len("été"), 3);
    }

    #[test]
    fn invalid_utf8_is_replaced() {
        let dictionary = Dictionary::parse(b"ok\n\xffz\n");
        assert_eq!(as_strs(&dictionary), vec!["ok", "\u{fffd}z"]);
    }

    #[tokio::test]
    async fn load_missing_file_reports_path() {
        let temp = tempfile::tempdir().expect("tempdir");
        let missing = temp.path().join("nope.txt");
        let err = Dictionary::load(&missing).await.expect_err("missing file");
        assert!(matches!(err, IndexerError::DictionaryUnavailable { .. }));
        assert!(err.to_string().contains("nope.txt"), "unexpected error: {err}");
    }
}
