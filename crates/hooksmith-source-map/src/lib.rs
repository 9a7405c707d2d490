//! Source position tracking for hooksmith.
//!
//! Tokens carry byte [`Span`]s, the lexer turns them into human line/column
//! pairs through a [`LineIndex`], and the typed generator correlates generated
//! lines with DSL lines through a [`PositionMap`] that serializes to a
//! Source Map v3 document.

mod line_index;
mod position_map;
mod span;
mod vlq;

pub use line_index::{LineCol, LineIndex};
pub use position_map::{LineMapping, PositionMap, PositionMapBuilder, SourceMapV3};
pub use span::{ByteOffset, Span};
