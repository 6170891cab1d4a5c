//! Sentence-aware text chunking.
//!
//! Text is split into sentence-like segments at terminal punctuation, then
//! segments are greedily accumulated into chunks. The segment whose addition
//! makes a chunk reach the size threshold closes that chunk (and is included
//! in it), so chunk boundaries never split a sentence and every chunk except
//! the last is at least the threshold once a second sentence was available.

use std::sync::LazyLock;

use regex::Regex;

/// Default chunk size threshold in characters.
pub const DEFAULT_CHUNK_SIZE: usize = 800;

/// Matches one sentence-like segment: text up to terminal punctuation plus
/// trailing whitespace, or a trailing run with no terminal punctuation.
static SENTENCE_RE: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"[^.!?]*[.!?]+(?:\s+|$)|[^.!?]+$").expect("valid regex"));

/// Split text into trimmed sentence-like segments.
///
/// Empty and whitespace-only segments are dropped.
pub fn split_sentences(text: &str) -> Vec<&str> {
    SENTENCE_RE
        .find_iter(text)
        .map(|m| m.as_str().trim())
        .filter(|s| !s.is_empty())
        .collect()
}

/// Chunk text into segments of roughly `chunk_size` characters.
///
/// Empty input yields zero chunks.
pub fn chunk_text(text: &str, chunk_size: usize) -> Vec<String> {
    let mut chunks = Vec::new();
    let mut current: Vec<&str> = Vec::new();
    let mut current_len = 0usize;

    for sentence in split_sentences(text) {
        let joined_len = if current.is_empty() {
            sentence.len()
        } else {
            current_len + 1 + sentence.len()
        };

        if joined_len >= chunk_size {
            current.push(sentence);
            chunks.push(current.join(" "));
            current.clear();
            current_len = 0;
        } else {
            current.push(sentence);
            current_len = joined_len;
        }
    }

    if !current.is_empty() {
        chunks.push(current.join(" "));
    }

    chunks
}

#[cfg(test)]
mod tests {
    use super::*;

    /// Collapse all whitespace runs to single spaces for comparison.
    fn normalize_ws(s: &str) -> String {
        s.split_whitespace().collect::<Vec<_>>().join(" ")
    }

    #[test]
    fn empty_input_yields_no_chunks() {
        assert!(chunk_text("", 800).is_empty());
        assert!(chunk_text("   \n\t ", 800).is_empty());
    }

    #[test]
    fn short_text_is_one_chunk() {
        let chunks = chunk_text("One sentence. Another one.", 800);
        assert_eq!(chunks, vec!["One sentence. Another one."]);
    }

    #[test]
    fn sentences_are_split_on_terminal_punctuation() {
        let sentences = split_sentences("First one. Second one! Third one? Trailing bit");
        assert_eq!(
            sentences,
            vec!["First one.", "Second one!", "Third one?", "Trailing bit"]
        );
    }

    #[test]
    fn chunks_reconstruct_original_text() {
        let text = (0..60)
            .map(|i| format!("Sentence number {i} talks about workflow automation."))
            .collect::<Vec<_>>()
            .join(" ");

        let chunks = chunk_text(&text, 200);
        assert!(chunks.len() > 1);
        assert_eq!(normalize_ws(&chunks.join(" ")), normalize_ws(&text));
    }

    #[test]
    fn no_chunk_but_the_last_is_below_threshold() {
        let text = (0..40)
            .map(|i| format!("Entry {i} covers ticket deflection and self-service."))
            .collect::<Vec<_>>()
            .join(" ");

        let chunk_size = 150;
        let chunks = chunk_text(&text, chunk_size);
        assert!(chunks.len() > 1);
        for chunk in &chunks[..chunks.len() - 1] {
            assert!(
                chunk.len() >= chunk_size,
                "non-final chunk shorter than threshold: {} < {chunk_size}",
                chunk.len()
            );
        }
    }

    #[test]
    fn boundaries_never_split_a_sentence() {
        let text = "Alpha is first. Beta follows closely after that point. Gamma ends it.";
        for chunk in chunk_text(text, 30) {
            assert!(
                chunk.ends_with('.') || text.ends_with(chunk.as_str()),
                "chunk ends mid-sentence: {chunk:?}"
            );
        }
    }

    #[test]
    fn oversized_single_sentence_is_its_own_chunk() {
        let long = format!("{} end.", "word ".repeat(100));
        let chunks = chunk_text(&long, 50);
        assert_eq!(chunks.len(), 1);
        assert_eq!(normalize_ws(&chunks[0]), normalize_ws(&long));
    }

    #[test]
    fn deterministic_chunking() {
        let text = "Repeatable input. Same boundaries every time. No randomness involved.";
        assert_eq!(chunk_text(text, 40), chunk_text(text, 40));
    }
}
