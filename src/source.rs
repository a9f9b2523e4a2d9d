//! Owns program text and issues stable byte-offset references into it.

use std::fmt;

/// The text of a single registered function. Immutable after construction.
#[derive(Debug, Clone)]
pub struct SourceCode {
    text: String,
}

impl SourceCode {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn text(&self) -> &str {
        &self.text
    }

    pub fn len(&self) -> usize {
        self.text.len()
    }

    pub fn is_empty(&self) -> bool {
        self.text.is_empty()
    }

    /// 1-based (line, column) of a byte offset, scanning backward to the prior
    /// newline for the column and through the prefix for the line count.
    pub fn position(&self, offset: usize) -> CodePosition {
        let prefix = &self.text[..offset.min(self.text.len())];
        let line = prefix.bytes().filter(|&b| b == b'\n').count() + 1;
        let column = match prefix.rfind('\n') {
            Some(idx) => prefix[idx + 1..].chars().count() + 1,
            None => prefix.chars().count() + 1,
        };
        CodePosition { line, column }
    }

    /// The full source line containing `offset`, without its trailing newline.
    pub fn line_containing(&self, offset: usize) -> &str {
        let offset = offset.min(self.text.len());
        let start = self.text[..offset].rfind('\n').map_or(0, |i| i + 1);
        let end = self.text[offset..]
            .find('\n')
            .map_or(self.text.len(), |i| offset + i);
        &self.text[start..end]
    }

    fn line_start(&self, offset: usize) -> usize {
        self.text[..offset.min(self.text.len())]
            .rfind('\n')
            .map_or(0, |i| i + 1)
    }
}

/// A 1-based (line, column) position, derived on demand from a [`SourceCode`].
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CodePosition {
    pub line: usize,
    pub column: usize,
}

impl fmt::Display for CodePosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}:{}", self.line, self.column)
    }
}

/// A half-open `[start, end)` byte range into some [`SourceCode`]'s text.
///
/// Spans are plain offsets rather than borrows: the compiled representation
/// of a function outlives the parser that produced it, so references are
/// resolved against the owning `SourceCode` on demand (at render time) rather
/// than carried as a lifetime-tied slice.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SourceSpan {
    start: u32,
    end: u32,
}

impl SourceSpan {
    pub fn new(start: usize, end: usize) -> Self {
        assert!(start <= end, "span start must not exceed end");
        Self {
            start: start as u32,
            end: end as u32,
        }
    }

    pub fn at(offset: usize) -> Self {
        Self::new(offset, offset)
    }

    pub fn start(&self) -> usize {
        self.start as usize
    }

    pub fn end(&self) -> usize {
        self.end as usize
    }

    pub fn len(&self) -> usize {
        self.end() - self.start()
    }

    pub fn is_empty(&self) -> bool {
        self.start == self.end
    }

    /// Grows the right bound by `n` bytes. The caller must ensure the new end
    /// lies within the owning buffer.
    pub fn extend(&mut self, n: usize) {
        self.end += n as u32;
    }

    /// Concatenates two spans that must both borrow the same buffer, in order.
    pub fn to(&self, other: SourceSpan) -> Self {
        debug_assert!(self.start <= other.start);
        Self {
            start: self.start,
            end: other.end,
        }
    }

    pub fn slice<'a>(&self, source: &'a SourceCode) -> &'a str {
        &source.text()[self.start()..self.end()]
    }

    pub fn position(&self, source: &SourceCode) -> CodePosition {
        source.position(self.start())
    }
}

impl SourceSpan {
    /// Renders a caret/tilde underline for this span under its source line.
    pub fn underline(&self, source: &SourceCode) -> String {
        let line_start = source.line_start(self.start());
        let line = source.line_containing(self.start());

        let prefix: String = line[..self.start() - line_start]
            .chars()
            .map(|c| if c == '\t' { '\t' } else { ' ' })
            .collect();
        let tildes = "~".repeat(self.len().saturating_sub(1));
        format!("{prefix}^{tildes}")
    }
}
