//! Splits stored text blobs into paragraphs.
//!
//! The store does not hold real newlines. Paragraph and image blobs are saved
//! with the two characters `\` and `n` between items, and this module is the
//! only place that knows about that encoding.

/// The two-character escape sequence separating items in a stored blob.
pub const DELIMITER: &str = "\\n";

/// Splits `blob` on [`DELIMITER`]. Segments are neither trimmed nor filtered,
/// so a leading or trailing delimiter yields an empty first or last element
/// and the empty string yields a single empty element.
pub fn split_text_blob(blob: &str) -> Vec<String> {
    blob.split(DELIMITER).map(str::to_owned).collect()
}
