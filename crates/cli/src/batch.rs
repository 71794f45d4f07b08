use anagram_indexer::{AnagramIndex, Word};
use std::io::{self, Write};

/// `first: second third ...`, or `None` for a class without anagrams.
pub fn format_class(words: &[Word]) -> Option<String> {
    let (first, rest) = words.split_first()?;
    if rest.is_empty() {
        return None;
    }
    let mut line = String::with_capacity(words.iter().map(|w| w.len() + 1).sum::<usize>() + 1);
    line.push_str(first);
    line.push(':');
    for word in rest {
        line.push(' ');
        line.push_str(word);
    }
    Some(line)
}

/// One line per class with two or more members. Unordered unless `sorted`.
pub fn render_batch(index: &AnagramIndex, sorted: bool) -> Vec<String> {
    let mut lines: Vec<String> = index
        .interesting_classes()
        .filter_map(|(_, words)| format_class(words))
        .collect();
    if sorted {
        lines.sort_unstable();
    }
    lines
}

/// Write the batch listing; a closed pipe ends the listing quietly.
pub fn write_batch<W: Write>(out: &mut W, index: &AnagramIndex, sorted: bool) -> io::Result<usize> {
    let lines = render_batch(index, sorted);
    let mut written = 0usize;
    for line in &lines {
        if let Err(err) = writeln!(out, "{line}") {
            if err.kind() == io::ErrorKind::BrokenPipe {
                return Ok(written);
            }
            return Err(err);
        }
        written += 1;
    }
    match out.flush() {
        Err(err) if err.kind() != io::ErrorKind::BrokenPipe => Err(err),
        _ => Ok(written),
    }
}
