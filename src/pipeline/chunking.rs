//! Recursive character splitting with natural-boundary preference.
//!
//! This module decides where document text gets cut before embedding. Highlights:
//!
//! - Boundary ladder: paragraph breaks first, then line breaks, then spaces, and
//!   finally hard cuts at character boundaries for runs containing no separator
//!   at all (long words, minified text).
//! - Lossless: a separator stays attached to the piece it terminates, so
//!   concatenating the output chunks in order reproduces the input exactly.
//! - Greedy packing: adjacent pieces are merged while the running chunk stays
//!   within the size budget, measured in Unicode scalar values.
//! - Source locations: every chunk records the 1-based line range it covers so
//!   retrieval results can point back into the original document.

use super::types::{Chunk, ChunkingError, LineRange};

const SEPARATORS: [&str; 3] = ["\n\n", "\n", " "];

/// Split `text` into chunks of at most `max_size` characters.
///
/// - Boundaries are chosen from the separator ladder above; a piece that fits no
///   budget at any level is cut mid-run.
/// - No returned chunk exceeds `max_size`.
/// - Empty and whitespace-only input produce an empty vector.
/// - Deterministic for a given `(text, max_size)` pair.
pub fn split_text(text: &str, max_size: usize) -> Result<Vec<Chunk>, ChunkingError> {
    if max_size == 0 {
        return Err(ChunkingError::InvalidChunkSize);
    }
    if text.trim().is_empty() {
        return Ok(Vec::new());
    }

    let pieces = split_recursive(text, max_size, &SEPARATORS);
    Ok(locate(pieces))
}

fn split_recursive(text: &str, max_size: usize, separators: &[&str]) -> Vec<String> {
    if char_len(text) <= max_size {
        return vec![text.to_string()];
    }
    let Some((separator, rest)) = separators.split_first() else {
        return hard_split(text, max_size);
    };

    let pieces = split_keeping_separator(text, separator);
    if pieces.len() == 1 {
        return split_recursive(text, max_size, rest);
    }
    merge_pieces(pieces, max_size, rest)
}

/// Pack separator-delimited pieces into chunks within the budget, descending the
/// separator ladder for any piece that is itself too large.
fn merge_pieces(pieces: Vec<&str>, max_size: usize, rest: &[&str]) -> Vec<String> {
    let mut merged = Vec::new();
    let mut current = String::new();
    let mut current_len = 0;

    for piece in pieces {
        let piece_len = char_len(piece);
        if piece_len > max_size {
            if !current.is_empty() {
                merged.push(std::mem::take(&mut current));
                current_len = 0;
            }
            merged.extend(split_recursive(piece, max_size, rest));
            continue;
        }
        if current_len + piece_len > max_size && !current.is_empty() {
            merged.push(std::mem::take(&mut current));
            current_len = 0;
        }
        current.push_str(piece);
        current_len += piece_len;
    }

    if !current.is_empty() {
        merged.push(current);
    }
    merged
}

/// Split on `separator`, keeping each occurrence attached to the piece it ends.
fn split_keeping_separator<'a>(text: &'a str, separator: &str) -> Vec<&'a str> {
    let mut pieces = Vec::new();
    let mut start = 0;

    for (index, matched) in text.match_indices(separator) {
        let end = index + matched.len();
        pieces.push(&text[start..end]);
        start = end;
    }
    if start < text.len() {
        pieces.push(&text[start..]);
    }
    pieces
}

fn hard_split(text: &str, max_size: usize) -> Vec<String> {
    let mut segments = Vec::new();
    let mut current = String::new();
    let mut count = 0;

    for ch in text.chars() {
        current.push(ch);
        count += 1;
        if count == max_size {
            segments.push(std::mem::take(&mut current));
            count = 0;
        }
    }
    if !current.is_empty() {
        segments.push(current);
    }
    segments
}

/// Attach line ranges by walking the pieces in document order.
fn locate(pieces: Vec<String>) -> Vec<Chunk> {
    let mut chunks = Vec::with_capacity(pieces.len());
    let mut line = 1;

    for content in pieces {
        let newlines = content.matches('\n').count();
        let trailing = content.len() - content.trim_end_matches('\n').len();
        let lines = LineRange {
            from: line,
            to: line + newlines - trailing,
        };
        line += newlines;
        chunks.push(Chunk { content, lines });
    }
    chunks
}

fn char_len(text: &str) -> usize {
    text.chars().count()
}

#[cfg(test)]
mod tests {
    use super::*;

    fn contents(chunks: &[Chunk]) -> Vec<&str> {
        chunks.iter().map(|chunk| chunk.content.as_str()).collect()
    }

    #[test]
    fn split_text_returns_single_chunk_when_text_fits() {
        let chunks = split_text("Paragraph one. Paragraph two.", 1000).unwrap();
        assert_eq!(contents(&chunks), vec!["Paragraph one. Paragraph two."]);
        assert_eq!(chunks[0].lines, LineRange { from: 1, to: 1 });
    }

    #[test]
    fn split_text_prefers_paragraph_boundaries() {
        let text = "First paragraph.\n\nSecond paragraph.";
        let chunks = split_text(text, 20).unwrap();
        assert_eq!(
            contents(&chunks),
            vec!["First paragraph.\n\n", "Second paragraph."]
        );
    }

    #[test]
    fn split_text_falls_back_to_line_boundaries() {
        let text = "alpha\nbravo\ncharlie";
        let chunks = split_text(text, 12).unwrap();
        assert_eq!(contents(&chunks), vec!["alpha\nbravo\n", "charlie"]);
    }

    #[test]
    fn split_text_packs_words_up_to_the_budget() {
        let chunks = split_text("aa bb cc dd ee", 6).unwrap();
        assert_eq!(contents(&chunks), vec!["aa bb ", "cc dd ", "ee"]);
    }

    #[test]
    fn split_text_hard_cuts_unbroken_runs() {
        let chunks = split_text("abcdefghij", 3).unwrap();
        assert_eq!(contents(&chunks), vec!["abc", "def", "ghi", "j"]);
    }

    #[test]
    fn split_text_respects_max_size() {
        let text = "hi supercalifragilistic yo\n\nshort tail";
        for max_size in [4, 7, 10, 25] {
            let chunks = split_text(text, max_size).unwrap();
            for chunk in &chunks {
                assert!(
                    chunk.content.chars().count() <= max_size,
                    "chunk {:?} exceeds {max_size}",
                    chunk.content
                );
            }
        }
    }

    #[test]
    fn concatenating_chunks_reproduces_the_input() {
        let text = "Caffè latte's rating: ★★★.\n\nLine two is longer than the budget.\nword-salad-without-spaces-anywhere\n\ntail";
        for max_size in [5, 9, 16, 100] {
            let chunks = split_text(text, max_size).unwrap();
            let rebuilt: String = chunks.iter().map(|chunk| chunk.content.as_str()).collect();
            assert_eq!(rebuilt, text, "lossy split at max_size {max_size}");
        }
    }

    #[test]
    fn split_text_counts_characters_not_bytes() {
        let chunks = split_text("ééééé", 2).unwrap();
        assert_eq!(contents(&chunks), vec!["éé", "éé", "é"]);
    }

    #[test]
    fn line_ranges_track_the_source_document() {
        let text = "alpha\nbravo\ncharlie";
        let chunks = split_text(text, 12).unwrap();
        assert_eq!(chunks[0].lines, LineRange { from: 1, to: 2 });
        assert_eq!(chunks[1].lines, LineRange { from: 3, to: 3 });
    }

    #[test]
    fn trailing_breaks_belong_to_the_line_they_end() {
        let text = "First paragraph.\n\nSecond paragraph.";
        let chunks = split_text(text, 20).unwrap();
        assert_eq!(chunks[0].lines, LineRange { from: 1, to: 1 });
        assert_eq!(chunks[1].lines, LineRange { from: 3, to: 3 });
    }

    #[test]
    fn split_text_handles_empty_input() {
        assert!(split_text("", 10).unwrap().is_empty());
        assert!(split_text("   \n\n  ", 10).unwrap().is_empty());
    }

    #[test]
    fn split_text_rejects_zero_chunk_size() {
        let error = split_text("hello", 0).unwrap_err();
        assert!(matches!(error, ChunkingError::InvalidChunkSize));
    }
}
