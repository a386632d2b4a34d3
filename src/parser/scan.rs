//! Brace-depth scanning and line lookup.
//!
//! Brace counting is used twice: to find where a class or mixin ends, and to
//! decide whether a position sits inside one. Both go through
//! [`scan_braces`] so the two answers always agree.

/// Result of scanning a range for a balanced brace block.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum BraceScan {
    /// The first opened block closed at this byte offset.
    Closed(usize),
    /// The range ended with this many blocks still open.
    Open(usize),
}

/// Count `{` and `}` from `from` up to (not including) `until`.
///
/// Stops at the first `}` that returns the depth to zero after at least one
/// `{` was seen. Closing braces at depth zero are ignored. Braces inside
/// strings and comments are counted like any other.
pub fn scan_braces(text: &str, from: usize, until: usize) -> BraceScan {
    let bytes = text.as_bytes();
    let end = until.min(bytes.len());
    let mut depth = 0usize;
    let mut opened = false;

    for (offset, &byte) in bytes.iter().enumerate().take(end).skip(from) {
        match byte {
            b'{' => {
                depth += 1;
                opened = true;
            }
            b'}' if depth > 0 => {
                depth -= 1;
                if opened && depth == 0 {
                    return BraceScan::Closed(offset);
                }
            }
            _ => {}
        }
    }

    BraceScan::Open(depth)
}

/// Offset of the brace closing the first block opened at or after `start`.
///
/// Returns `text.len()` when the block never closes.
pub fn block_end(text: &str, start: usize) -> usize {
    match scan_braces(text, start, text.len()) {
        BraceScan::Closed(offset) => offset,
        BraceScan::Open(_) => text.len(),
    }
}

/// Whether `pos` lies inside the block opened at or after `start`.
pub fn is_open_at(text: &str, start: usize, pos: usize) -> bool {
    matches!(scan_braces(text, start, pos), BraceScan::Open(depth) if depth > 0)
}

/// Maps byte offsets to 1-indexed line numbers.
#[derive(Debug, Clone)]
pub struct LineIndex {
    starts: Vec<usize>,
}

impl LineIndex {
    pub fn new(text: &str) -> Self {
        let mut starts = vec![0];
        starts.extend(text.match_indices('\n').map(|(i, _)| i + 1));
        Self { starts }
    }

    /// Line number (1-indexed) containing `offset`.
    pub fn line_of(&self, offset: usize) -> usize {
        match self.starts.binary_search(&offset) {
            Ok(idx) => idx + 1,
            Err(idx) => idx,
        }
    }

    /// Byte offset where the line holding `offset` begins.
    pub fn line_start(&self, offset: usize) -> usize {
        self.starts[self.line_of(offset) - 1]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_block_end_balanced() {
        let text = "class A {\n  void f() {\n  }\n}\nvoid g() {}";
        let end = block_end(text, 0);
        assert_eq!(&text[end..end + 1], "}");
        assert_eq!(text[..end].matches('\n').count(), 3);
    }

    #[test]
    fn test_block_end_unbalanced_runs_to_end() {
        let text = "class A {\n  void f() {\n";
        assert_eq!(block_end(text, 0), text.len());
    }

    #[test]
    fn test_stray_closer_before_open_is_ignored() {
        let text = "} class A { }";
        assert_eq!(block_end(text, 0), text.len() - 1);
    }

    #[test]
    fn test_braces_in_strings_are_counted() {
        let text = "class A {\n  void f() {\n    print('}');\n  }\n}\n";
        let end = block_end(text, 0);
        // The quoted brace closes `f`, so the class ends one brace early.
        assert_eq!(end, text.rfind("  }").unwrap() + 2);
    }

    #[test]
    fn test_is_open_at() {
        let text = "class A {\n  int x;\n}\nint y;";
        let inside = text.find("int x").unwrap();
        let outside = text.find("int y").unwrap();
        assert!(is_open_at(text, 0, inside));
        assert!(!is_open_at(text, 0, outside));
        // Before the opening brace nothing is open yet.
        assert!(!is_open_at(text, 0, 3));
    }

    #[test]
    fn test_line_index() {
        let text = "a\nbb\n\nccc";
        let index = LineIndex::new(text);
        assert_eq!(index.line_of(0), 1);
        assert_eq!(index.line_of(1), 1);
        assert_eq!(index.line_of(2), 2);
        assert_eq!(index.line_of(5), 3);
        assert_eq!(index.line_of(6), 4);
        assert_eq!(index.line_start(8), 6);
    }
}
