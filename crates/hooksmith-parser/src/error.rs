//! Lex and parse error types.
//!
//! Every error is fatal to the compilation unit that raised it: the lexer and
//! parser stop at the first problem and never return a partial AST.

use hooksmith_source_map::Span;
use smol_str::SmolStr;
use thiserror::Error;

/// An unrecognized character in the source text.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unrecognized character '{character}' at line {line}, column {column}")]
pub struct LexError {
    /// The offending character.
    pub character: char,
    pub line: u32,
    pub column: u32,
    pub span: Span,
}

/// A token that does not fit the grammar at the point it was found.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("{kind} at line {line}")]
pub struct ParseError {
    pub kind: ParseErrorKind,
    pub line: u32,
    pub column: u32,
    pub span: Span,
}

impl ParseError {
    pub fn new(kind: ParseErrorKind, line: u32, column: u32, span: Span) -> Self {
        Self {
            kind,
            line,
            column,
            span,
        }
    }
}

/// The kind of parse error.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum ParseErrorKind {
    /// A statement or sub-grammar expected something else.
    #[error("unexpected {found}, expected {expected}")]
    UnexpectedToken {
        /// What was expected.
        expected: String,
        /// What was found.
        found: String,
    },

    /// A top-level line starts with a token that begins no statement.
    #[error("unexpected {found} at start of statement")]
    UnexpectedStatement { found: String },

    /// `@name:modifier` with a modifier other than reducer, transition,
    /// deferred or optimistic.
    #[error("unknown state modifier ':{modifier}'")]
    UnknownModifier { modifier: SmolStr },

    /// `@name:reducer = {initial}` without the `{action: handler}` block.
    #[error("reducer '{name}' is missing its action block")]
    MissingActionBlock { name: SmolStr },

    /// The unit ended before any markup tree was found.
    #[error("component has no markup tree")]
    MissingMarkup,

    /// A second top-level markup tree.
    #[error("component already has a markup tree")]
    DuplicateMarkup,

    /// An `<each>` loop in a position that is not inside an element.
    #[error("<each> must be nested inside an element")]
    EachAtRoot,

    /// The template of an `<each>` loop is not a single element.
    #[error("<each> expects exactly one element template")]
    InvalidEachTemplate,

    /// A nested `<each>` template reads the variable of an enclosing loop.
    /// Every loop binds `__item`, so the outer value is not reachable there.
    #[error("'{name}' from an enclosing <each> cannot be used inside a nested <each>")]
    OuterLoopBinding { name: SmolStr },
}

/// A closing tag whose name differs from its opening tag.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("mismatched closing tag at line {line}: expected </{expected}>, found </{found}>")]
pub struct MismatchedTagError {
    /// The opening tag name (empty for fragments).
    pub expected: SmolStr,
    /// The closing tag name that was found.
    pub found: SmolStr,
    pub line: u32,
    pub column: u32,
    pub span: Span,
}

/// Any failure of the lex → parse pipeline.
#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum CompileError {
    #[error(transparent)]
    Lex(#[from] LexError),
    #[error(transparent)]
    Parse(#[from] ParseError),
    #[error(transparent)]
    MismatchedTag(#[from] MismatchedTagError),
}

impl CompileError {
    pub fn line(&self) -> u32 {
        match self {
            CompileError::Lex(e) => e.line,
            CompileError::Parse(e) => e.line,
            CompileError::MismatchedTag(e) => e.line,
        }
    }

    pub fn column(&self) -> u32 {
        match self {
            CompileError::Lex(e) => e.column,
            CompileError::Parse(e) => e.column,
            CompileError::MismatchedTag(e) => e.column,
        }
    }

    pub fn span(&self) -> Span {
        match self {
            CompileError::Lex(e) => e.span,
            CompileError::Parse(e) => e.span,
            CompileError::MismatchedTag(e) => e.span,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_parse_error_display() {
        let error = ParseError::new(
            ParseErrorKind::UnexpectedToken {
                expected: "'='".to_string(),
                found: "newline".to_string(),
            },
            3,
            7,
            Span::new(20u32, 21u32),
        );
        assert_eq!(
            error.to_string(),
            "unexpected newline, expected '=' at line 3"
        );
    }

    #[test]
    fn test_mismatched_tag_display() {
        let error = MismatchedTagError {
            expected: "div".into(),
            found: "span".into(),
            line: 2,
            column: 9,
            span: Span::new(14u32, 18u32),
        };
        assert_eq!(
            error.to_string(),
            "mismatched closing tag at line 2: expected </div>, found </span>"
        );
    }

    #[test]
    fn test_compile_error_position() {
        let error: CompileError = LexError {
            character: '`',
            line: 4,
            column: 2,
            span: Span::new(30u32, 31u32),
        }
        .into();
        assert_eq!(error.line(), 4);
        assert_eq!(error.column(), 2);
        assert_eq!(
            error.to_string(),
            "unrecognized character '`' at line 4, column 2"
        );
    }
}
