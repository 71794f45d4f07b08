/// Canonical form shared by every member of one anagram class.
///
/// Built from the word's characters lowercased and sorted by code point, so `"Stop"`,
/// `"pots"` and `"spot"` all map to `"opst"`.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct AnagramKey(String);

impl AnagramKey {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }
}

impl std::fmt::Display for AnagramKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Compute the anagram key of `word`.
///
/// Simple lowering only: a character whose lowercase form expands to several characters
/// contributes all of them.
pub fn canonical_key(word: &str) -> AnagramKey {
    let mut chars: Vec<char> = word.chars().flat_map(char::to_lowercase).collect();
    chars.sort_unstable();
    AnagramKey(chars.into_iter().collect())
}
