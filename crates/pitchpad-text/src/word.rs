//! Word-boundary helpers for keyboard editing commands.

use unicode_segmentation::UnicodeSegmentation;

/// Converts a char offset into a byte offset within `text`.
///
/// Offsets past the end clamp to the text length.
pub fn char_to_byte(text: &str, char_idx: usize) -> usize {
    text.char_indices()
        .nth(char_idx)
        .map(|(byte, _)| byte)
        .unwrap_or(text.len())
}

/// Deletes the word before the caret, as ctrl+backspace does: a trailing
/// whitespace run is removed together with the word preceding it.
///
/// `caret` is a char offset; offsets past the end act at the end of the
/// text. Returns the new text and the new caret position.
pub fn delete_word_backward(text: &str, caret: usize) -> (String, usize) {
    let char_len = text.chars().count();
    let caret = caret.min(char_len);
    if caret == 0 {
        return (text.to_string(), 0);
    }

    let byte_caret = char_to_byte(text, caret);
    let before = &text[..byte_caret];

    let bounds: Vec<(usize, &str)> = before.split_word_bound_indices().collect();
    let mut cut_byte = before.len();
    if let Some(&(idx, segment)) = bounds.last() {
        cut_byte = idx;
        if segment.trim().is_empty() && bounds.len() >= 2 {
            cut_byte = bounds[bounds.len() - 2].0;
        }
    }

    let new_text = format!("{}{}", &before[..cut_byte], &text[byte_caret..]);
    let new_caret = before[..cut_byte].chars().count();
    (new_text, new_caret)
}
