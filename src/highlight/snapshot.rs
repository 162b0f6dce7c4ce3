//! Immutable text snapshots addressed by codepoint offset

/// An immutable view of document text at one point in time
///
/// All offsets handed out by the highlighter are codepoint (char)
/// positions, never byte positions. The snapshot keeps a table of
/// char boundaries so conversions in either direction are cheap.
#[derive(Debug, Clone)]
pub struct TextSnapshot<'a> {
    text: &'a str,
    /// Byte offset of each char, followed by `text.len()`
    boundaries: Vec<usize>,
}

impl<'a> TextSnapshot<'a> {
    /// Take a snapshot of the given text
    pub fn new(text: &'a str) -> Self {
        let mut boundaries: Vec<usize> = text.char_indices().map(|(i, _)| i).collect();
        boundaries.push(text.len());
        Self { text, boundaries }
    }

    /// The underlying text
    pub fn as_str(&self) -> &'a str {
        self.text
    }

    /// Length in chars
    pub fn len_chars(&self) -> usize {
        self.boundaries.len() - 1
    }

    /// Check if the snapshot holds no text
    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// Byte offset of a char offset (clamped to the end of the text)
    pub fn byte_offset(&self, char_offset: usize) -> usize {
        self.boundaries[char_offset.min(self.len_chars())]
    }

    /// Char offset of a byte offset
    ///
    /// A byte offset inside a multi-byte char maps to that char.
    pub fn char_offset(&self, byte_offset: usize) -> usize {
        match self.boundaries.binary_search(&byte_offset) {
            Ok(idx) => idx,
            Err(idx) => idx.saturating_sub(1),
        }
    }

    /// Text between two char offsets
    pub fn slice(&self, start: usize, end: usize) -> &'a str {
        let start = self.byte_offset(start);
        let end = self.byte_offset(end).max(start);
        &self.text[start..end]
    }

    /// Char offsets where each line begins (the first is always 0)
    pub fn line_starts(&self) -> Vec<usize> {
        let mut starts = vec![0];
        starts.extend(
            self.text
                .chars()
                .enumerate()
                .filter(|&(_, ch)| ch == '\n')
                .map(|(idx, _)| idx + 1),
        );
        starts
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_offsets_ascii() {
        let snap = TextSnapshot::new("hello world");
        assert_eq!(snap.len_chars(), 11);
        assert_eq!(snap.byte_offset(6), 6);
        assert_eq!(snap.char_offset(6), 6);
        assert_eq!(snap.slice(6, 11), "world");
    }

    #[test]
    fn test_offsets_multibyte() {
        let snap = TextSnapshot::new("туду done");
        assert_eq!(snap.len_chars(), 9);
        assert_eq!(snap.byte_offset(4), 8);
        assert_eq!(snap.char_offset(8), 4);
        // Inside the second Cyrillic char
        assert_eq!(snap.char_offset(3), 1);
        assert_eq!(snap.slice(0, 4), "туду");
        assert_eq!(snap.slice(5, 100), "done");
    }

    #[test]
    fn test_line_starts() {
        let snap = TextSnapshot::new("ab\nc\n\nд");
        assert_eq!(snap.line_starts(), vec![0, 3, 5, 6]);
        assert_eq!(TextSnapshot::new("").line_starts(), vec![0]);
    }

    #[test]
    fn test_empty() {
        let snap = TextSnapshot::new("");
        assert!(snap.is_empty());
        assert_eq!(snap.len_chars(), 0);
        assert_eq!(snap.slice(0, 3), "");
    }
}
