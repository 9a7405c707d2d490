//! Byte offset to line/column conversion.

use crate::ByteOffset;
use serde::{Deserialize, Serialize};
use text_size::TextSize;

/// A 1-based line and column, as reported to users.
///
/// Columns count characters, not bytes, so a caret under a non-ASCII text
/// run still lands where an editor would put it.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct LineCol {
    pub line: u32,
    pub column: u32,
}

impl LineCol {
    #[inline]
    pub fn new(line: u32, column: u32) -> Self {
        Self { line, column }
    }
}

/// Start offsets of every line in a source text.
#[derive(Debug, Clone)]
pub struct LineIndex<'src> {
    text: &'src str,
    /// `line_starts[i]` is the offset where line `i + 1` begins.
    line_starts: Vec<ByteOffset>,
}

impl<'src> LineIndex<'src> {
    pub fn new(text: &'src str) -> Self {
        let mut line_starts = vec![TextSize::from(0)];
        line_starts.extend(
            text.match_indices('\n')
                .map(|(offset, _)| TextSize::from((offset + 1) as u32)),
        );
        Self { text, line_starts }
    }

    /// Converts a byte offset into a 1-based line/column pair.
    ///
    /// Offsets past the end of the text clamp to the last position.
    pub fn line_col(&self, offset: ByteOffset) -> LineCol {
        let offset = std::cmp::min(offset, TextSize::from(self.text.len() as u32));
        let line = match self.line_starts.binary_search(&offset) {
            Ok(line) => line,
            Err(line) => line.saturating_sub(1),
        };

        let line_start = u32::from(self.line_starts[line]) as usize;
        let end = u32::from(offset) as usize;
        let column = self
            .text
            .get(line_start..end)
            .map(|prefix| prefix.chars().count())
            .unwrap_or(0);

        LineCol {
            line: line as u32 + 1,
            column: column as u32 + 1,
        }
    }
}
