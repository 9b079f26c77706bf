/// A byte range into a source buffer.
///
/// `start` is inclusive, `length` is the number of bytes covered. Both are
/// measured in bytes, not characters, so they index directly into the
/// original UTF-8 source without re-walking it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize)]
pub struct Span {
    pub start: u32,
    pub length: u32,
}

impl Span {
    pub fn new(start: u32, length: u32) -> Self {
        Self { start, length }
    }

    pub fn from_bounds(start: u32, end: u32) -> Self {
        debug_assert!(end >= start);
        Self {
            start,
            length: end - start,
        }
    }

    pub fn end(&self) -> u32 {
        self.start + self.length
    }

    pub fn is_empty(&self) -> bool {
        self.length == 0
    }

    /// The smallest span that covers both `self` and `other`.
    pub fn merge(&self, other: Span) -> Span {
        let start = self.start.min(other.start);
        let end = self.end().max(other.end());
        Span::from_bounds(start, end)
    }
}

/// A byte-indexed view over source text with line/column lookup.
///
/// Lines and columns are both 1-based. Columns count bytes (not
/// characters) since the preceding line feed, or since the start of the
/// buffer for the first line.
pub struct SourceBuffer<'src> {
    text: &'src str,
    line_index: LineIndex,
}

impl<'src> SourceBuffer<'src> {
    pub fn new(text: &'src str) -> Self {
        Self {
            text,
            line_index: LineIndex::new(text),
        }
    }

    pub fn text(&self) -> &'src str {
        self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// The substring covered by `span`.
    pub fn slice(&self, span: Span) -> &'src str {
        &self.text[span.start as usize..span.end() as usize]
    }

    /// 1-based line number containing `offset`.
    pub fn line_at(&self, offset: u32) -> u32 {
        self.line_index.line_at(offset)
    }

    /// 1-based column of `offset` within its line.
    pub fn column_at(&self, offset: u32) -> u32 {
        self.line_index.column_at(offset)
    }

    /// The full text of the 1-based line `line`, without its trailing
    /// line feed.
    pub fn line_text(&self, line: u32) -> &'src str {
        let (start, end) = self.line_index.line_bounds(line, self.text.len() as u32);
        let raw = &self.text[start as usize..end as usize];
        raw.strip_suffix('\n').unwrap_or(raw)
    }
}

/// A table of line-start byte offsets, built once per source buffer.
struct LineIndex {
    /// `line_starts[i]` is the byte offset where line `i + 1` begins.
    line_starts: Vec<u32>,
}

impl LineIndex {
    fn new(text: &str) -> Self {
        let mut line_starts = vec![0u32];
        for (i, b) in text.bytes().enumerate() {
            if b == b'\n' {
                line_starts.push((i + 1) as u32);
            }
        }
        Self { line_starts }
    }

    fn line_at(&self, offset: u32) -> u32 {
        match self.line_starts.binary_search(&offset) {
            Ok(i) => (i + 1) as u32,
            Err(i) => i as u32,
        }
    }

    fn column_at(&self, offset: u32) -> u32 {
        let line = self.line_at(offset);
        let line_start = self.line_starts[(line - 1) as usize];
        offset - line_start + 1
    }

    fn line_bounds(&self, line: u32, text_len: u32) -> (u32, u32) {
        let start = self.line_starts[(line - 1) as usize];
        let end = self
            .line_starts
            .get(line as usize)
            .copied()
            .unwrap_or(text_len);
        (start, end)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn merge_spans() {
        let a = Span::new(2, 3);
        let b = Span::new(10, 1);
        assert_eq!(a.merge(b), Span::from_bounds(2, 11));
    }

    #[test]
    fn single_line() {
        let buf = SourceBuffer::new("hello");
        assert_eq!(buf.line_at(0), 1);
        assert_eq!(buf.column_at(3), 4);
        assert_eq!(buf.line_text(1), "hello");
    }

    #[test]
    fn multi_line() {
        let buf = SourceBuffer::new("one\ntwo\nthree");
        assert_eq!(buf.line_at(0), 1);
        assert_eq!(buf.line_at(4), 2);
        assert_eq!(buf.line_at(8), 3);
        assert_eq!(buf.column_at(4), 1);
        assert_eq!(buf.column_at(5), 2);
        assert_eq!(buf.line_text(2), "two");
        assert_eq!(buf.line_text(3), "three");
    }

    #[test]
    fn offset_exactly_at_newline() {
        let buf = SourceBuffer::new("ab\ncd");
        // offset 2 is the '\n' itself, still part of line 1.
        assert_eq!(buf.line_at(2), 1);
        assert_eq!(buf.column_at(2), 3);
    }
}
