//! Length-bounded output

/// Appended when text had to be cut
pub const ELLIPSIS: char = '…';

/// A whitespace boundary at or below this char offset is ignored, so texts
/// without early spaces are not reduced to a stub.
const MIN_WORD_BOUNDARY: usize = 120;

/// Clamp `text` to at most `max_chars` characters without splitting words.
///
/// The text is trimmed first. `max_chars == 0` means no limit: the trimmed
/// text comes back unchanged. Lengths count `char`s, not bytes.
pub fn clamp_to_chars(text: &str, max_chars: usize) -> String {
    let text = text.trim();
    if max_chars == 0 || text.chars().count() <= max_chars {
        return text.to_string();
    }

    let mut cut: String = text.chars().take(max_chars - 1).collect();

    if let Some((byte_idx, _)) = cut.char_indices().rev().find(|(_, c)| c.is_whitespace()) {
        if cut[..byte_idx].chars().count() > MIN_WORD_BOUNDARY {
            cut.truncate(byte_idx);
        }
    }

    let mut clamped = cut.trim_end().to_string();
    clamped.push(ELLIPSIS);
    clamped
}
