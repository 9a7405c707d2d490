//! Lexer and parser for the hooksmith component DSL.
//!
//! This crate turns one DSL source unit into a [`Component`] AST:
//! - Lexer (tokenizer) using `logos`
//! - Recursive descent parser with one/two-token lookahead
//! - AST types for every declaration kind and the markup tree
//!
//! Errors are fatal: the first lex or parse error is returned and no partial
//! AST is produced.
//!
//! # Example
//!
//! ```
//! use hooksmith_parser::parse_source;
//!
//! let source = "@count = 0\n!click = count++\n<btn @click=click>{count}</btn>";
//! let component = parse_source(source).unwrap();
//! assert_eq!(component.states[0].name, "count");
//! ```

mod ast;
mod error;
mod lexer;
mod parser;

pub use ast::*;
pub use error::{CompileError, LexError, MismatchedTagError, ParseError, ParseErrorKind};
pub use hooksmith_source_map::Span;
pub use lexer::{tokenize, Lexer, Token, TokenKind, TokenValue};
pub use parser::Parser;

use smol_str::SmolStr;

/// Component name used when none is given.
pub const DEFAULT_COMPONENT_NAME: &str = "Component";

/// Options for parsing hooksmith source.
#[derive(Debug, Clone, Default)]
pub struct ParseOptions {
    /// Overrides the default component name.
    pub component_name: Option<SmolStr>,
}

impl ParseOptions {
    fn component_name(&self) -> SmolStr {
        self.component_name
            .clone()
            .unwrap_or_else(|| SmolStr::new_static(DEFAULT_COMPONENT_NAME))
    }
}

/// Parses a token sequence produced by [`tokenize`].
pub fn parse(tokens: Vec<Token>) -> Result<Component, CompileError> {
    Parser::new(tokens, DEFAULT_COMPONENT_NAME).parse()
}

/// Tokenizes and parses `source` with the default component name.
pub fn parse_source(source: &str) -> Result<Component, CompileError> {
    parse_with_options(source, &ParseOptions::default())
}

/// Tokenizes and parses `source` with custom options.
pub fn parse_with_options(source: &str, options: &ParseOptions) -> Result<Component, CompileError> {
    let tokens = tokenize(source)?;
    let component = Parser::new(tokens, options.component_name()).parse()?;
    tracing::debug!(
        component = %component.name,
        props = component.props.len(),
        states = component.states.len(),
        "parsed component"
    );
    Ok(component)
}
