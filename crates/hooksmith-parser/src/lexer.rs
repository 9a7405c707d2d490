//! Hooksmith lexer using logos.
//!
//! The lexer turns DSL source into a flat token sequence:
//! - declaration sigils (`@` state, `%` memo, `~` effect, ...)
//! - operators and punctuation shared by expressions, types and markup
//! - string, number and identifier literals
//! - explicit newlines, since statements are newline-terminated
//!
//! Spaces, tabs, carriage returns and `//` comments are skipped. Longest match
//! gives multi-character operators priority over their prefixes (`::` over
//! `:`, `~~` over `~`, `=>` over `=`, `++`/`+=` over `+`).

use crate::error::LexError;
use hooksmith_source_map::{LineIndex, Span};
use logos::Logos;
use smol_str::SmolStr;

/// A token produced by the lexer.
#[derive(Debug, Clone, PartialEq)]
pub struct Token {
    pub kind: TokenKind,
    /// The raw lexeme as written in the source.
    pub text: SmolStr,
    /// Decoded literal payload for strings, numbers and identifiers.
    pub value: Option<TokenValue>,
    pub span: Span,
    /// 1-based line.
    pub line: u32,
    /// 1-based column.
    pub column: u32,
}

/// The literal payload of a token.
#[derive(Debug, Clone, PartialEq)]
pub enum TokenValue {
    /// String contents with quotes removed and escapes passed through.
    Str(SmolStr),
    Number(f64),
    Ident(SmolStr),
}

impl Token {
    /// Identifier text, if this is an identifier.
    pub fn ident(&self) -> Option<&SmolStr> {
        match &self.value {
            Some(TokenValue::Ident(name)) => Some(name),
            _ => None,
        }
    }

    /// Whether this is the identifier `word`.
    pub fn is_word(&self, word: &str) -> bool {
        self.ident().is_some_and(|name| name == word)
    }
}

/// Token kinds for the hooksmith DSL.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Logos)]
#[logos(skip r"[ \t\r]+")]
pub enum TokenKind {
    // === Declaration sigils ===
    /// `$` prop
    #[token("$")]
    Dollar,

    /// `@` state
    #[token("@")]
    At,

    /// `%` memo
    #[token("%")]
    Percent,

    /// `~` effect
    #[token("~")]
    Tilde,

    /// `~~` layout effect
    #[token("~~")]
    TildeTilde,

    /// `!` event
    #[token("!")]
    Bang,

    /// `&` callback
    #[token("&")]
    Amp,

    /// `^` imperative handle
    #[token("^")]
    Caret,

    /// `#` ref
    #[token("#")]
    Hash,

    /// `##` id
    #[token("##")]
    HashHash,

    /// `?` context
    #[token("?")]
    Question,

    // === Operators ===
    /// `=`
    #[token("=")]
    Eq,

    /// `=>`
    #[token("=>")]
    FatArrow,

    /// `++`
    #[token("++")]
    PlusPlus,

    /// `--`
    #[token("--")]
    MinusMinus,

    /// `+=`
    #[token("+=")]
    PlusEq,

    /// `+`
    #[token("+")]
    Plus,

    /// `-`
    #[token("-")]
    Minus,

    /// `*`
    #[token("*")]
    Star,

    /// `/`
    #[token("/")]
    Slash,

    /// `|` (type unions)
    #[token("|")]
    Pipe,

    /// `...`
    #[token("...")]
    Ellipsis,

    // === Punctuation ===
    #[token("(")]
    LParen,

    #[token(")")]
    RParen,

    #[token("{")]
    LBrace,

    #[token("}")]
    RBrace,

    #[token("[")]
    LBracket,

    #[token("]")]
    RBracket,

    #[token("<")]
    LAngle,

    #[token(">")]
    RAngle,

    #[token(".")]
    Dot,

    #[token(",")]
    Comma,

    /// `:` state modifiers and reducer/handle keys
    #[token(":")]
    Colon,

    /// `::` type annotations
    #[token("::")]
    ColonColon,

    // === Literals ===
    /// A single- or double-quoted string.
    #[regex(r#""([^"\\\n]|\\.)*""#)]
    #[regex(r#"'([^'\\\n]|\\.)*'"#)]
    String,

    /// Digits with an optional fractional part.
    #[regex(r"[0-9]+(\.[0-9]+)?")]
    Number,

    /// An identifier.
    #[regex(r"[A-Za-z_][A-Za-z0-9_]*")]
    Ident,

    // === Trivia ===
    /// `//` line comment, skipped.
    #[regex(r"//[^\n]*", logos::skip, allow_greedy = true)]
    LineComment,

    // === Structure ===
    /// Newline (statement terminator)
    #[token("\n")]
    Newline,

    /// End of input
    Eof,
}

impl TokenKind {
    /// Returns true for `+ - * /`.
    pub fn is_arithmetic(&self) -> bool {
        matches!(
            self,
            TokenKind::Plus | TokenKind::Minus | TokenKind::Star | TokenKind::Slash
        )
    }

    /// Returns a human-readable name for this token kind.
    pub fn name(&self) -> &'static str {
        match self {
            TokenKind::Dollar => "'$'",
            TokenKind::At => "'@'",
            TokenKind::Percent => "'%'",
            TokenKind::Tilde => "'~'",
            TokenKind::TildeTilde => "'~~'",
            TokenKind::Bang => "'!'",
            TokenKind::Amp => "'&'",
            TokenKind::Caret => "'^'",
            TokenKind::Hash => "'#'",
            TokenKind::HashHash => "'##'",
            TokenKind::Question => "'?'",
            TokenKind::Eq => "'='",
            TokenKind::FatArrow => "'=>'",
            TokenKind::PlusPlus => "'++'",
            TokenKind::MinusMinus => "'--'",
            TokenKind::PlusEq => "'+='",
            TokenKind::Plus => "'+'",
            TokenKind::Minus => "'-'",
            TokenKind::Star => "'*'",
            TokenKind::Slash => "'/'",
            TokenKind::Pipe => "'|'",
            TokenKind::Ellipsis => "'...'",
            TokenKind::LParen => "'('",
            TokenKind::RParen => "')'",
            TokenKind::LBrace => "'{'",
            TokenKind::RBrace => "'}'",
            TokenKind::LBracket => "'['",
            TokenKind::RBracket => "']'",
            TokenKind::LAngle => "'<'",
            TokenKind::RAngle => "'>'",
            TokenKind::Dot => "'.'",
            TokenKind::Comma => "','",
            TokenKind::Colon => "':'",
            TokenKind::ColonColon => "'::'",
            TokenKind::String => "string",
            TokenKind::Number => "number",
            TokenKind::Ident => "identifier",
            TokenKind::LineComment => "comment",
            TokenKind::Newline => "newline",
            TokenKind::Eof => "end of input",
        }
    }
}

/// A lexer for hooksmith source code.
///
/// Yields `Ok` tokens ending with exactly one [`TokenKind::Eof`], or stops
/// after the first `Err`.
pub struct Lexer<'src> {
    inner: logos::Lexer<'src, TokenKind>,
    source: &'src str,
    lines: LineIndex<'src>,
    finished: bool,
}

impl<'src> Lexer<'src> {
    pub fn new(source: &'src str) -> Self {
        Self {
            inner: TokenKind::lexer(source),
            source,
            lines: LineIndex::new(source),
            finished: false,
        }
    }

    /// Returns the source string being lexed.
    pub fn source(&self) -> &'src str {
        self.source
    }

    fn token(&self, kind: TokenKind, span: Span) -> Token {
        let text = self.inner.slice();
        let value = match kind {
            TokenKind::String => Some(TokenValue::Str(unquote(text))),
            TokenKind::Number => text.parse::<f64>().ok().map(TokenValue::Number),
            TokenKind::Ident => Some(TokenValue::Ident(SmolStr::new(text))),
            _ => None,
        };
        let position = self.lines.line_col(span.start);
        Token {
            kind,
            text: SmolStr::new(text),
            value,
            span,
            line: position.line,
            column: position.column,
        }
    }
}

impl<'src> Iterator for Lexer<'src> {
    type Item = Result<Token, LexError>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.finished {
            return None;
        }

        match self.inner.next() {
            Some(Ok(kind)) => {
                let span = Span::from_range(self.inner.span());
                Some(Ok(self.token(kind, span)))
            }
            Some(Err(())) => {
                self.finished = true;
                let span = Span::from_range(self.inner.span());
                let position = self.lines.line_col(span.start);
                Some(Err(LexError {
                    character: self.inner.slice().chars().next().unwrap_or('\0'),
                    line: position.line,
                    column: position.column,
                    span,
                }))
            }
            None => {
                self.finished = true;
                let end = Span::from_range(self.source.len()..self.source.len());
                let position = self.lines.line_col(end.start);
                Some(Ok(Token {
                    kind: TokenKind::Eof,
                    text: SmolStr::default(),
                    value: None,
                    span: end,
                    line: position.line,
                    column: position.column,
                }))
            }
        }
    }
}

/// Tokenizes `source`, stopping at the first unrecognized character.
pub fn tokenize(source: &str) -> Result<Vec<Token>, LexError> {
    let tokens = Lexer::new(source).collect::<Result<Vec<_>, _>>()?;
    tracing::debug!(count = tokens.len(), "tokenized source");
    Ok(tokens)
}

/// Strips the quotes from a string lexeme. A backslash is dropped and the
/// character after it is kept as-is.
fn unquote(lexeme: &str) -> SmolStr {
    let inner = &lexeme[1..lexeme.len() - 1];
    let mut out = String::with_capacity(inner.len());
    let mut chars = inner.chars();
    while let Some(c) = chars.next() {
        if c == '\\' {
            if let Some(escaped) = chars.next() {
                out.push(escaped);
            }
        } else {
            out.push(c);
        }
    }
    SmolStr::new(out)
}
