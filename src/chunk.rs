//! Overlapping sliding-window text chunker.
//!
//! Splits document text into windows of at most `chunk_size` characters,
//! advancing by `chunk_size - overlap` characters per step so that
//! consecutive chunks share exactly `overlap` characters. When a window
//! would cut mid-word, the break moves back to the nearest preceding
//! newline or whitespace inside the window (the following chunk still
//! starts `overlap` characters before the break, preserving the overlap
//! invariant). Splitting is deterministic: identical input and parameters
//! always yield an identical sequence.
//!
//! All sizes are in characters, not bytes; cuts always land on UTF-8
//! character boundaries.

use crate::models::Chunk;

/// Split `text` into overlapping chunks attributed to `source_id`.
///
/// Preconditions (`0 < overlap < chunk_size`) are enforced by config
/// validation; they are debug-asserted here.
///
/// - Empty `text` produces an empty sequence.
/// - Text shorter than `chunk_size` produces one chunk equal to the text.
/// - Chunk indices are contiguous starting at 0.
pub fn split_text(source_id: &str, text: &str, chunk_size: usize, overlap: usize) -> Vec<Chunk> {
    debug_assert!(overlap > 0 && overlap < chunk_size);

    if text.is_empty() {
        return Vec::new();
    }

    // Byte offset of every character, so windows can be sliced safely.
    let offsets: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
    let n = offsets.len();
    let byte_at = |char_idx: usize| -> usize {
        if char_idx >= n {
            text.len()
        } else {
            offsets[char_idx]
        }
    };

    let step = chunk_size - overlap;
    let mut chunks = Vec::new();
    let mut start = 0usize;
    let mut index = 0usize;

    while start < n {
        let hard_end = (start + chunk_size).min(n);
        let mut end = hard_end;
        let mut soft_break = false;

        // Prefer a whitespace boundary when the window cuts mid-text. The
        // break must leave at least `overlap + 1` characters in this chunk
        // so the next start still advances.
        if hard_end < n {
            if let Some(ws) = find_break(text, &offsets, start + overlap, hard_end) {
                end = ws + 1; // keep the whitespace in the current chunk
                soft_break = true;
            }
        }

        chunks.push(Chunk {
            index,
            text: text[byte_at(start)..byte_at(end)].to_string(),
            source_id: source_id.to_string(),
        });
        index += 1;

        start = if soft_break { end - overlap } else { start + step };
    }

    chunks
}

/// Find the last whitespace character position in `[from, to)`, preferring
/// paragraph/line breaks over plain spaces.
fn find_break(text: &str, offsets: &[usize], from: usize, to: usize) -> Option<usize> {
    let mut last_space = None;
    let mut last_newline = None;
    for (i, offset) in offsets[from..to].iter().enumerate() {
        // Cheap single-char decode at a known boundary.
        let ch = text[*offset..].chars().next().unwrap_or('\0');
        if ch == '\n' {
            last_newline = Some(from + i);
        } else if ch.is_whitespace() {
            last_space = Some(from + i);
        }
    }
    last_newline.or(last_space)
}
