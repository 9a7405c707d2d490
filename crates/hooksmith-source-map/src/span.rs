//! Byte spans over DSL source text.

use serde::{Deserialize, Serialize};
use text_size::TextSize;

/// A byte offset into a source string.
pub type ByteOffset = TextSize;

/// A half-open byte range `[start, end)` into the source text.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Default, Serialize, Deserialize)]
pub struct Span {
    /// Inclusive start offset.
    pub start: ByteOffset,
    /// Exclusive end offset.
    pub end: ByteOffset,
}

impl Span {
    /// Creates a span from start and end offsets.
    #[inline]
    pub fn new(start: impl Into<ByteOffset>, end: impl Into<ByteOffset>) -> Self {
        Self {
            start: start.into(),
            end: end.into(),
        }
    }

    /// Creates a span from a `logos`-style `usize` range.
    #[inline]
    pub fn from_range(range: std::ops::Range<usize>) -> Self {
        Self::new(
            TextSize::from(range.start as u32),
            TextSize::from(range.end as u32),
        )
    }

    /// Creates an empty span at `offset`.
    #[inline]
    pub fn empty(offset: impl Into<ByteOffset>) -> Self {
        let offset = offset.into();
        Self {
            start: offset,
            end: offset,
        }
    }

    /// Whether `other` starts exactly where this span ends.
    ///
    /// The markup parser uses this to tell `aria-label` (one attribute name)
    /// apart from `aria - label`.
    #[inline]
    pub fn touches(&self, other: Span) -> bool {
        self.end == other.start
    }
}
