//! Recursive descent parser for hooksmith components.
//!
//! The parser owns the token sequence and a cursor that only moves forward.
//! Every sub-parser returns `Result`; the first error aborts the unit.

use crate::ast::*;
use crate::error::{CompileError, MismatchedTagError, ParseError, ParseErrorKind};
use crate::lexer::{Token, TokenKind, TokenValue};
use hooksmith_source_map::Span;
use smol_str::{format_smolstr, SmolStr};

type ParseResult<T> = Result<T, CompileError>;

/// The forms a `@` statement can take.
enum StateForm {
    Plain(State),
    Reducer(Reducer),
    Transition(Transition),
    Deferred(Deferred),
    Optimistic(Optimistic),
}

/// The hooksmith parser.
pub struct Parser {
    tokens: Vec<Token>,
    /// Current position in the token stream.
    pos: usize,
    component_name: SmolStr,
    /// Variables of the `<each>` loops enclosing the cursor, outermost first.
    loop_bindings: Vec<SmolStr>,
    /// Returned when the cursor runs past the last token.
    eof_token: Token,
}

impl Parser {
    /// Creates a parser over `tokens`, normally the output of
    /// [`tokenize`](crate::tokenize).
    pub fn new(tokens: Vec<Token>, component_name: impl Into<SmolStr>) -> Self {
        let (span, line, column) = tokens
            .last()
            .map(|t| (Span::empty(t.span.end), t.line, t.column))
            .unwrap_or((Span::default(), 1, 1));
        let eof_token = Token {
            kind: TokenKind::Eof,
            text: SmolStr::default(),
            value: None,
            span,
            line,
            column,
        };
        Self {
            tokens,
            pos: 0,
            component_name: component_name.into(),
            loop_bindings: Vec::new(),
            eof_token,
        }
    }

    /// Parses the whole unit into a component.
    pub fn parse(mut self) -> ParseResult<Component> {
        let placeholder = Markup::Fragment(Fragment {
            children: Vec::new(),
            line: 0,
        });
        let mut component = Component::new(self.component_name.clone(), placeholder);
        let mut has_markup = false;

        loop {
            self.skip_newlines();
            let start = self.current().clone();

            let kind = match start.kind {
                TokenKind::Eof => break,
                TokenKind::Dollar => {
                    component.props.push(self.parse_prop()?);
                    Some(DeclarationKind::Prop)
                }
                TokenKind::At => Some(match self.parse_state_family()? {
                    StateForm::Plain(state) => {
                        component.states.push(state);
                        DeclarationKind::State
                    }
                    StateForm::Reducer(reducer) => {
                        component.reducers.push(reducer);
                        DeclarationKind::Reducer
                    }
                    StateForm::Transition(transition) => {
                        component.transitions.push(transition);
                        DeclarationKind::Transition
                    }
                    StateForm::Deferred(deferred) => {
                        component.deferreds.push(deferred);
                        DeclarationKind::Deferred
                    }
                    StateForm::Optimistic(optimistic) => {
                        component.optimistics.push(optimistic);
                        DeclarationKind::Optimistic
                    }
                }),
                TokenKind::Percent => {
                    component.memos.push(self.parse_memo()?);
                    Some(DeclarationKind::Memo)
                }
                TokenKind::Tilde => {
                    component.effects.push(self.parse_effect()?);
                    Some(DeclarationKind::Effect)
                }
                TokenKind::TildeTilde => {
                    component.layout_effects.push(self.parse_effect()?);
                    Some(DeclarationKind::LayoutEffect)
                }
                TokenKind::Bang => {
                    component.events.push(self.parse_event()?);
                    Some(DeclarationKind::Event)
                }
                TokenKind::Amp => {
                    component.callbacks.push(self.parse_callback()?);
                    Some(DeclarationKind::Callback)
                }
                TokenKind::Caret => {
                    component.handles.push(self.parse_handle()?);
                    Some(DeclarationKind::Handle)
                }
                TokenKind::Hash => {
                    component.refs.push(self.parse_ref()?);
                    Some(DeclarationKind::Ref)
                }
                TokenKind::Question => {
                    component.contexts.push(self.parse_context()?);
                    Some(DeclarationKind::Context)
                }
                TokenKind::HashHash => {
                    component.ids.push(self.parse_id()?);
                    Some(DeclarationKind::Id)
                }
                TokenKind::Ident if start.is_word("sync") => {
                    component.external_stores.push(self.parse_external_store()?);
                    Some(DeclarationKind::ExternalStore)
                }
                TokenKind::Ident if start.is_word("action") => {
                    component.action_states.push(self.parse_action_state()?);
                    Some(DeclarationKind::ActionState)
                }
                TokenKind::LAngle => {
                    if has_markup {
                        return Err(self.error_at(&start, ParseErrorKind::DuplicateMarkup));
                    }
                    component.markup = self.parse_markup_root()?;
                    has_markup = true;
                    None
                }
                _ => {
                    return Err(self.error_at(
                        &start,
                        ParseErrorKind::UnexpectedStatement {
                            found: describe(&start),
                        },
                    ))
                }
            };

            if let Some(kind) = kind {
                tracing::trace!(kind = kind.name(), line = start.line, "parsed declaration");
            }
            self.end_statement()?;
        }

        if !has_markup {
            let end = self.current().clone();
            return Err(self.error_at(&end, ParseErrorKind::MissingMarkup));
        }
        Ok(component)
    }

    // === Token helpers ===

    fn current(&self) -> &Token {
        self.peek(0)
    }

    fn peek(&self, offset: usize) -> &Token {
        self.tokens.get(self.pos + offset).unwrap_or(&self.eof_token)
    }

    fn previous(&self) -> Option<&Token> {
        self.pos.checked_sub(1).and_then(|idx| self.tokens.get(idx))
    }

    fn kind(&self) -> TokenKind {
        self.current().kind
    }

    /// Consumes the current token and returns it.
    fn advance(&mut self) -> Token {
        let token = self.current().clone();
        if self.pos < self.tokens.len() {
            self.pos += 1;
        }
        token
    }

    fn check(&self, kind: TokenKind) -> bool {
        self.kind() == kind
    }

    fn eat(&mut self, kind: TokenKind) -> bool {
        if self.check(kind) {
            self.advance();
            true
        } else {
            false
        }
    }

    fn expect(&mut self, kind: TokenKind) -> ParseResult<Token> {
        if self.check(kind) {
            Ok(self.advance())
        } else {
            Err(self.unexpected(kind.name()))
        }
    }

    fn expect_ident(&mut self, what: &str) -> ParseResult<SmolStr> {
        if self.check(TokenKind::Ident) {
            Ok(self.advance().text)
        } else {
            Err(self.unexpected(what))
        }
    }

    fn skip_newlines(&mut self) {
        while self.eat(TokenKind::Newline) {}
    }

    /// A statement ends at a newline or at end of input.
    fn end_statement(&mut self) -> ParseResult<()> {
        match self.kind() {
            TokenKind::Newline => {
                self.advance();
                Ok(())
            }
            TokenKind::Eof => Ok(()),
            _ => Err(self.unexpected("end of statement")),
        }
    }

    fn error_at(&self, token: &Token, kind: ParseErrorKind) -> CompileError {
        ParseError::new(kind, token.line, token.column, token.span).into()
    }

    fn unexpected(&self, expected: &str) -> CompileError {
        let token = self.current();
        self.error_at(
            token,
            ParseErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: describe(token),
            },
        )
    }

    // === Declarations ===

    fn parse_prop(&mut self) -> ParseResult<Prop> {
        let line = self.advance().line;
        let name = self.expect_ident("prop name")?;
        let ty = self.parse_type_annotation()?;
        let default = if self.eat(TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(Prop {
            name,
            ty,
            default,
            line,
        })
    }

    fn parse_state_family(&mut self) -> ParseResult<StateForm> {
        let line = self.advance().line;
        let name = self.expect_ident("state name")?;

        if self.eat(TokenKind::Colon) {
            let modifier_token = self.current().clone();
            let modifier = self.expect_ident("state modifier")?;
            return match modifier.as_str() {
                "reducer" => self.parse_reducer(name, line).map(StateForm::Reducer),
                "transition" => Ok(StateForm::Transition(Transition { name, line })),
                "deferred" => {
                    let ty = self.parse_type_annotation()?;
                    self.expect(TokenKind::Eq)?;
                    let source = self.parse_expression()?;
                    Ok(StateForm::Deferred(Deferred {
                        name,
                        ty,
                        source,
                        line,
                    }))
                }
                "optimistic" => {
                    let ty = self.parse_type_annotation()?;
                    self.expect(TokenKind::Eq)?;
                    let (state, update_fn) = self.parse_braced_pair()?;
                    Ok(StateForm::Optimistic(Optimistic {
                        name,
                        ty,
                        state,
                        update_fn,
                        line,
                    }))
                }
                _ => Err(self.error_at(
                    &modifier_token,
                    ParseErrorKind::UnknownModifier { modifier },
                )),
            };
        }

        let ty = self.parse_type_annotation()?;
        self.expect(TokenKind::Eq)?;
        let initial = self.parse_expression()?;
        Ok(StateForm::Plain(State {
            name,
            ty,
            initial,
            line,
        }))
    }

    fn parse_reducer(&mut self, name: SmolStr, line: u32) -> ParseResult<Reducer> {
        let ty = self.parse_type_annotation()?;
        self.expect(TokenKind::Eq)?;
        self.expect(TokenKind::LBrace)?;
        self.skip_newlines();
        let initial = self.parse_expression()?;
        self.skip_newlines();
        self.eat(TokenKind::Comma);
        self.skip_newlines();

        if !self.check(TokenKind::LBrace) {
            let token = self.current().clone();
            return Err(self.error_at(&token, ParseErrorKind::MissingActionBlock { name }));
        }
        let actions = self
            .parse_keyed_block()?
            .into_iter()
            .map(|(name, handler)| ReducerAction { name, handler })
            .collect();

        self.skip_newlines();
        self.eat(TokenKind::Comma);
        self.skip_newlines();
        self.expect(TokenKind::RBrace)?;

        Ok(Reducer {
            name,
            ty,
            initial,
            actions,
            line,
        })
    }

    fn parse_memo(&mut self) -> ParseResult<Memo> {
        let line = self.advance().line;
        let name = self.expect_ident("memo name")?;
        let ty = self.parse_type_annotation()?;
        self.expect(TokenKind::Eq)?;
        let value = self.parse_expression()?;
        Ok(Memo {
            name,
            ty,
            value,
            line,
        })
    }

    fn parse_effect(&mut self) -> ParseResult<Effect> {
        let line = self.advance().line;
        let deps = if self.check(TokenKind::LBracket) {
            Some(self.parse_list(TokenKind::LBracket, TokenKind::RBracket)?)
        } else {
            None
        };
        let body = self.parse_expression()?;
        Ok(Effect { deps, body, line })
    }

    fn parse_event(&mut self) -> ParseResult<Event> {
        let line = self.advance().line;
        let name = self.expect_ident("event name")?;
        self.expect(TokenKind::Eq)?;
        let handler = self.parse_expression()?;
        Ok(Event {
            name,
            handler,
            line,
        })
    }

    fn parse_callback(&mut self) -> ParseResult<Callback> {
        let line = self.advance().line;
        let name = self.expect_ident("callback name")?;
        self.expect(TokenKind::Eq)?;
        let value = self.parse_expression()?;
        Ok(Callback { name, value, line })
    }

    fn parse_handle(&mut self) -> ParseResult<Handle> {
        let line = self.advance().line;
        let name = self.expect_ident("ref name")?;
        self.expect(TokenKind::Eq)?;
        let methods = self
            .parse_keyed_block()?
            .into_iter()
            .map(|(name, body)| HandleMethod { name, body })
            .collect();
        Ok(Handle {
            name,
            methods,
            line,
        })
    }

    fn parse_ref(&mut self) -> ParseResult<Ref> {
        let line = self.advance().line;
        let name = self.expect_ident("ref name")?;
        let ty = self.parse_type_annotation()?;
        let initial = if self.eat(TokenKind::Eq) {
            Some(self.parse_expression()?)
        } else {
            None
        };
        Ok(Ref {
            name,
            ty,
            initial,
            line,
        })
    }

    fn parse_context(&mut self) -> ParseResult<Context> {
        let line = self.advance().line;
        let name = self.expect_ident("context name")?;
        let ty = self.parse_type_annotation()?;
        self.expect(TokenKind::Eq)?;
        let source = self.expect_ident("context object")?;
        Ok(Context {
            name,
            ty,
            source,
            line,
        })
    }

    fn parse_id(&mut self) -> ParseResult<Id> {
        let line = self.advance().line;
        let name = self.expect_ident("id name")?;
        Ok(Id { name, line })
    }

    fn parse_external_store(&mut self) -> ParseResult<ExternalStore> {
        let line = self.advance().line;
        let name = self.expect_ident("store name")?;
        let ty = self.parse_type_annotation()?;
        self.expect(TokenKind::Eq)?;

        let open = self.current().clone();
        let values = self.parse_list(TokenKind::LBrace, TokenKind::RBrace)?;
        let count = values.len();
        let mut values = values.into_iter();
        match (values.next(), values.next(), values.next(), values.next()) {
            (Some(subscribe), Some(snapshot), server_snapshot, None) => Ok(ExternalStore {
                name,
                ty,
                subscribe,
                snapshot,
                server_snapshot,
                line,
            }),
            _ => Err(self.entry_count_error(&open, "2 or 3 entries", count)),
        }
    }

    fn parse_action_state(&mut self) -> ParseResult<ActionState> {
        let line = self.advance().line;
        let name = self.expect_ident("action name")?;
        let ty = self.parse_type_annotation()?;
        self.expect(TokenKind::Eq)?;
        let (action_fn, initial) = self.parse_braced_pair()?;
        Ok(ActionState {
            name,
            ty,
            action_fn,
            initial,
            line,
        })
    }

    /// `{ a, b }` with exactly two entries.
    fn parse_braced_pair(&mut self) -> ParseResult<(Expression, Expression)> {
        let open = self.current().clone();
        let values = self.parse_list(TokenKind::LBrace, TokenKind::RBrace)?;
        let count = values.len();
        let mut values = values.into_iter();
        match (values.next(), values.next(), values.next()) {
            (Some(first), Some(second), None) => Ok((first, second)),
            _ => Err(self.entry_count_error(&open, "2 entries", count)),
        }
    }

    fn entry_count_error(&self, token: &Token, expected: &str, count: usize) -> CompileError {
        let noun = if count == 1 { "entry" } else { "entries" };
        self.error_at(
            token,
            ParseErrorKind::UnexpectedToken {
                expected: expected.to_string(),
                found: format!("{count} {noun}"),
            },
        )
    }

    /// `open expr, expr, ... close`, newlines allowed between entries.
    fn parse_list(&mut self, open: TokenKind, close: TokenKind) -> ParseResult<Vec<Expression>> {
        self.expect(open)?;
        let mut items = Vec::new();
        loop {
            self.skip_newlines();
            if self.eat(close) {
                break;
            }
            items.push(self.parse_list_item()?);
            self.skip_newlines();
            if !self.eat(TokenKind::Comma) {
                self.skip_newlines();
                self.expect(close)?;
                break;
            }
        }
        Ok(items)
    }

    fn parse_list_item(&mut self) -> ParseResult<Expression> {
        if self.eat(TokenKind::Ellipsis) {
            Ok(Expression::Spread(Box::new(self.parse_expression()?)))
        } else {
            self.parse_expression()
        }
    }

    /// `{ key: expr, ... }` with entries separated by commas or newlines.
    fn parse_keyed_block(&mut self) -> ParseResult<Vec<(SmolStr, Expression)>> {
        self.expect(TokenKind::LBrace)?;
        let mut entries = Vec::new();
        loop {
            self.skip_newlines();
            if self.eat(TokenKind::RBrace) {
                break;
            }
            let key = match self.kind() {
                TokenKind::Ident => self.advance().text,
                TokenKind::String => string_value(&self.advance()),
                _ => return Err(self.unexpected("key")),
            };
            self.expect(TokenKind::Colon)?;
            self.skip_newlines();
            let value = self.parse_expression()?;
            entries.push((key, value));
            self.skip_newlines();
            self.eat(TokenKind::Comma);
        }
        Ok(entries)
    }

    // === Types ===

    fn parse_type_annotation(&mut self) -> ParseResult<Option<TypeNode>> {
        if self.eat(TokenKind::ColonColon) {
            self.parse_type().map(Some)
        } else {
            Ok(None)
        }
    }

    fn parse_type(&mut self) -> ParseResult<TypeNode> {
        let first = self.parse_type_primary()?;
        if !self.check(TokenKind::Pipe) {
            return Ok(first);
        }
        let mut members = vec![first];
        while self.eat(TokenKind::Pipe) {
            members.push(self.parse_type_primary()?);
        }
        Ok(TypeNode::Union(members))
    }

    fn parse_type_primary(&mut self) -> ParseResult<TypeNode> {
        let name: SmolStr = match self.kind() {
            TokenKind::Ident => self.advance().text,
            TokenKind::String => format!("'{}'", string_value(&self.advance())).into(),
            _ => return Err(self.unexpected("type")),
        };

        let ty = if self.eat(TokenKind::LAngle) {
            let mut params = vec![self.parse_type()?];
            while self.eat(TokenKind::Comma) {
                params.push(self.parse_type()?);
            }
            self.expect(TokenKind::RAngle)?;
            TypeNode::Generic { name, params }
        } else {
            TypeNode::Simple(name)
        };

        if self.check(TokenKind::LBracket) && self.peek(1).kind == TokenKind::RBracket {
            self.advance();
            self.advance();
            return Ok(match ty {
                TypeNode::Simple(name) => TypeNode::Array(name),
                other => TypeNode::Generic {
                    name: "Array".into(),
                    params: vec![other],
                },
            });
        }
        Ok(ty)
    }

    // === Expressions ===

    /// Parses an expression. Binary operators are right-recursive and carry
    /// no precedence.
    pub(crate) fn parse_expression(&mut self) -> ParseResult<Expression> {
        match self.kind() {
            TokenKind::String => {
                let value = string_value(&self.advance());
                self.maybe_binary(Expression::Literal(Literal::String(value)))
            }
            TokenKind::Number => {
                let value = self.advance().text;
                self.maybe_binary(Expression::Literal(Literal::Number(value)))
            }
            TokenKind::Minus if self.peek(1).kind == TokenKind::Number => {
                self.advance();
                let value = format_smolstr!("-{}", self.advance().text);
                self.maybe_binary(Expression::Literal(Literal::Number(value)))
            }
            TokenKind::Ident => self.parse_identifier_expression(),
            TokenKind::LBracket => {
                let elements = self.parse_list(TokenKind::LBracket, TokenKind::RBracket)?;
                let chained = self.parse_member_chain(Expression::Array(elements))?;
                self.maybe_binary(chained)
            }
            TokenKind::LParen => self.parse_arrow_with_params(),
            _ => Err(self.unexpected("expression")),
        }
    }

    fn parse_identifier_expression(&mut self) -> ParseResult<Expression> {
        let name = self.advance().text;

        let literal = match name.as_str() {
            "true" => Some(Literal::Boolean(true)),
            "false" => Some(Literal::Boolean(false)),
            "null" => Some(Literal::Null),
            "undefined" => Some(Literal::Undefined),
            _ => None,
        };
        if let Some(literal) = literal {
            return self.maybe_binary(Expression::Literal(literal));
        }

        match self.kind() {
            TokenKind::FatArrow => {
                self.advance();
                let body = self.parse_expression()?;
                Ok(Expression::Arrow {
                    params: vec![name],
                    body: Box::new(body),
                })
            }
            TokenKind::PlusPlus => {
                self.advance();
                Ok(Expression::Update {
                    target: name,
                    op: UpdateOp::Increment,
                    value: None,
                })
            }
            TokenKind::MinusMinus => {
                self.advance();
                Ok(Expression::Update {
                    target: name,
                    op: UpdateOp::Decrement,
                    value: None,
                })
            }
            TokenKind::PlusEq => {
                self.advance();
                let value = self.parse_expression()?;
                Ok(Expression::Update {
                    target: name,
                    op: UpdateOp::AddAssign,
                    value: Some(Box::new(value)),
                })
            }
            _ => {
                let base = if self.check(TokenKind::LParen) {
                    let args = self.parse_list(TokenKind::LParen, TokenKind::RParen)?;
                    Expression::Call { callee: name, args }
                } else {
                    Expression::Identifier(name)
                };
                let chained = self.parse_member_chain(base)?;
                self.maybe_binary(chained)
            }
        }
    }

    /// `.prop` and `.method(args)` suffixes.
    fn parse_member_chain(&mut self, mut object: Expression) -> ParseResult<Expression> {
        while self.eat(TokenKind::Dot) {
            let property = self.expect_ident("property name")?;
            object = if self.check(TokenKind::LParen) {
                let args = self.parse_list(TokenKind::LParen, TokenKind::RParen)?;
                Expression::MethodCall {
                    object: Box::new(object),
                    method: property,
                    args,
                }
            } else {
                Expression::Member {
                    object: Box::new(object),
                    property,
                }
            };
        }
        Ok(object)
    }

    fn maybe_binary(&mut self, left: Expression) -> ParseResult<Expression> {
        let op = match self.kind() {
            TokenKind::Plus => BinaryOp::Add,
            TokenKind::Minus => BinaryOp::Sub,
            TokenKind::Star => BinaryOp::Mul,
            TokenKind::Slash => BinaryOp::Div,
            _ => return Ok(left),
        };
        self.advance();
        let right = self.parse_expression()?;
        Ok(Expression::Binary {
            op,
            left: Box::new(left),
            right: Box::new(right),
        })
    }

    /// `(a, b) => body`
    fn parse_arrow_with_params(&mut self) -> ParseResult<Expression> {
        self.expect(TokenKind::LParen)?;
        let mut params = Vec::new();
        if !self.eat(TokenKind::RParen) {
            loop {
                params.push(self.expect_ident("parameter name")?);
                if self.eat(TokenKind::Comma) {
                    continue;
                }
                self.expect(TokenKind::RParen)?;
                break;
            }
        }
        self.expect(TokenKind::FatArrow)?;
        let body = self.parse_expression()?;
        Ok(Expression::Arrow {
            params,
            body: Box::new(body),
        })
    }

    // === Markup ===

    fn parse_markup_root(&mut self) -> ParseResult<Markup> {
        let open = self.advance();
        if self.check(TokenKind::RAngle) {
            return self.parse_fragment(&open).map(Markup::Fragment);
        }
        if self.current().is_word("each") {
            return Err(self.error_at(&open, ParseErrorKind::EachAtRoot));
        }
        self.parse_element(&open).map(Markup::Element)
    }

    fn parse_fragment(&mut self, open: &Token) -> ParseResult<Fragment> {
        self.expect(TokenKind::RAngle)?;
        let children = self.parse_children("")?;
        self.parse_closing_tag("")?;
        Ok(Fragment {
            children,
            line: open.line,
        })
    }

    /// A name made of identifiers joined by touching hyphens (`aria-label`).
    fn parse_name(&mut self, what: &str) -> ParseResult<SmolStr> {
        if !self.check(TokenKind::Ident) {
            return Err(self.unexpected(what));
        }
        let first = self.advance();
        if !self.check(TokenKind::Minus) {
            return Ok(first.text);
        }

        let mut name = first.text.to_string();
        let mut end = first.span;
        while self.check(TokenKind::Minus)
            && end.touches(self.current().span)
            && self.peek(1).kind == TokenKind::Ident
            && self.current().span.touches(self.peek(1).span)
        {
            self.advance();
            let part = self.advance();
            name.push('-');
            name.push_str(&part.text);
            end = part.span;
        }
        Ok(name.into())
    }

    fn parse_element(&mut self, open: &Token) -> ParseResult<Element> {
        let tag = self.parse_name("tag name")?;
        let mut attributes = Vec::new();

        loop {
            self.skip_newlines();
            match self.kind() {
                TokenKind::RAngle => {
                    self.advance();
                    break;
                }
                TokenKind::Slash => {
                    self.advance();
                    self.expect(TokenKind::RAngle)?;
                    return Ok(Element {
                        tag,
                        attributes,
                        children: Vec::new(),
                        self_closing: true,
                        line: open.line,
                    });
                }
                TokenKind::At => attributes.push(self.parse_event_attribute()?),
                TokenKind::Ident => attributes.push(self.parse_attribute()?),
                _ => return Err(self.unexpected("attribute, '>' or '/>'")),
            }
        }

        let children = self.parse_children(&tag)?;
        self.parse_closing_tag(&tag)?;
        Ok(Element {
            tag,
            attributes,
            children,
            self_closing: false,
            line: open.line,
        })
    }

    /// `@event=handler` or `@event={expr}`
    fn parse_event_attribute(&mut self) -> ParseResult<Attribute> {
        self.advance();
        let name = self.parse_name("event name")?;
        self.expect(TokenKind::Eq)?;
        let handler = if self.check(TokenKind::LBrace) {
            EventHandler::Inline(self.parse_braced_expression()?)
        } else {
            EventHandler::Named(self.expect_ident("handler name")?)
        };
        Ok(Attribute {
            name,
            value: AttributeValue::Event(handler),
        })
    }

    fn parse_attribute(&mut self) -> ParseResult<Attribute> {
        let name = self.parse_name("attribute name")?;
        if !self.eat(TokenKind::Eq) {
            return Ok(Attribute {
                name,
                value: AttributeValue::True,
            });
        }
        let value = match self.kind() {
            TokenKind::LBrace => AttributeValue::Expression(self.parse_braced_expression()?),
            TokenKind::String => AttributeValue::Text(string_value(&self.advance())),
            _ => return Err(self.unexpected("'{' or string")),
        };
        Ok(Attribute { name, value })
    }

    fn parse_braced_expression(&mut self) -> ParseResult<Expression> {
        self.expect(TokenKind::LBrace)?;
        self.skip_newlines();
        let expression = self.parse_expression()?;
        self.skip_newlines();
        self.expect(TokenKind::RBrace)?;
        Ok(expression)
    }

    /// Children up to (not including) the `</` of the parent.
    fn parse_children(&mut self, parent: &str) -> ParseResult<Vec<Markup>> {
        let mut children = Vec::new();
        loop {
            match self.kind() {
                TokenKind::Newline => {
                    self.advance();
                }
                TokenKind::Eof => {
                    return Err(self.unexpected(&format!("closing tag </{parent}>")));
                }
                TokenKind::LAngle => {
                    let next = self.peek(1);
                    if next.kind == TokenKind::Slash {
                        break;
                    }
                    let is_each = next.is_word("each");
                    let open = self.advance();
                    let child = if self.check(TokenKind::RAngle) {
                        Markup::Fragment(self.parse_fragment(&open)?)
                    } else if is_each {
                        Markup::Each(self.parse_each()?)
                    } else {
                        Markup::Element(self.parse_element(&open)?)
                    };
                    children.push(child);
                }
                TokenKind::LBrace => {
                    children.push(Markup::Interpolation(self.parse_braced_expression()?));
                }
                TokenKind::RAngle | TokenKind::RBrace => {
                    return Err(self.unexpected("markup"));
                }
                _ => children.push(self.parse_text()),
            }
        }
        Ok(children)
    }

    /// `<each item [::Type] in source> <template/> </each>`, cursor on `each`.
    fn parse_each(&mut self) -> ParseResult<EachLoop> {
        let keyword = self.advance();
        let binding = self.expect_ident("loop variable")?;
        let item_type = self.parse_type_annotation()?;
        if !self.current().is_word("in") {
            return Err(self.unexpected("'in'"));
        }
        self.advance();
        let collection = Expression::Identifier(self.expect_ident("collection name")?);
        let source = self.parse_member_chain(collection)?;
        self.expect(TokenKind::RAngle)?;

        self.skip_newlines();
        let next = self.peek(1);
        let starts_element = self.check(TokenKind::LAngle)
            && next.kind == TokenKind::Ident
            && !next.is_word("each");
        if !starts_element {
            let token = self.current().clone();
            return Err(self.error_at(&token, ParseErrorKind::InvalidEachTemplate));
        }
        let open = self.advance();
        self.loop_bindings.push(binding.clone());
        let template = self.parse_element(&open);
        self.loop_bindings.pop();
        let template = template?;

        let shadowed = self
            .loop_bindings
            .iter()
            .find(|outer| **outer != binding && template.references(outer))
            .cloned();
        if let Some(name) = shadowed {
            return Err(self.error_at(&keyword, ParseErrorKind::OuterLoopBinding { name }));
        }

        self.skip_newlines();
        if !(self.check(TokenKind::LAngle) && self.peek(1).kind == TokenKind::Slash) {
            let token = self.current().clone();
            return Err(self.error_at(&token, ParseErrorKind::InvalidEachTemplate));
        }
        self.parse_closing_tag("each")?;

        Ok(EachLoop {
            binding,
            item_type,
            source,
            template: Box::new(template),
        })
    }

    fn parse_closing_tag(&mut self, expected: &str) -> ParseResult<()> {
        self.expect(TokenKind::LAngle)?;
        self.expect(TokenKind::Slash)?;
        let name_token = self.current().clone();
        let found = if self.check(TokenKind::RAngle) {
            SmolStr::default()
        } else {
            self.parse_name("closing tag name")?
        };
        if found != expected {
            return Err(MismatchedTagError {
                expected: expected.into(),
                found,
                line: name_token.line,
                column: name_token.column,
                span: name_token.span,
            }
            .into());
        }
        self.expect(TokenKind::RAngle)?;
        Ok(())
    }

    /// A run of text-like tokens rebuilt from their raw lexemes.
    ///
    /// Gaps between tokens become single spaces. A run continues over
    /// newlines when more text follows, and keeps a leading or trailing space
    /// next to a sibling on the same line.
    fn parse_text(&mut self) -> Markup {
        let mut text = String::new();
        if let Some(previous) = self.previous() {
            if previous.kind != TokenKind::Newline && previous.span.end < self.current().span.start
            {
                text.push(' ');
            }
        }

        let mut last_end = None;
        loop {
            if is_text(self.kind()) {
                let token = self.advance();
                if last_end.is_some_and(|end| end < token.span.start) {
                    text.push(' ');
                }
                text.push_str(&token.text);
                last_end = Some(token.span.end);
            } else if self.check(TokenKind::Newline) {
                let mut offset = 1;
                while self.peek(offset).kind == TokenKind::Newline {
                    offset += 1;
                }
                if !is_text(self.peek(offset).kind) {
                    break;
                }
                for _ in 0..offset {
                    self.advance();
                }
            } else {
                break;
            }
        }

        if let Some(end) = last_end {
            let next = self.current();
            if next.kind != TokenKind::Newline && next.kind != TokenKind::Eof && end < next.span.start
            {
                text.push(' ');
            }
        }
        Markup::Text(text.into())
    }
}

fn is_text(kind: TokenKind) -> bool {
    !matches!(
        kind,
        TokenKind::LAngle
            | TokenKind::RAngle
            | TokenKind::LBrace
            | TokenKind::RBrace
            | TokenKind::Newline
            | TokenKind::Eof
    )
}

fn describe(token: &Token) -> String {
    match token.kind {
        TokenKind::Ident | TokenKind::Number | TokenKind::String => {
            format!("{} {}", token.kind.name(), token.text)
        }
        kind => kind.name().to_string(),
    }
}

fn string_value(token: &Token) -> SmolStr {
    match &token.value {
        Some(TokenValue::Str(value)) => value.clone(),
        _ => token.text.clone(),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::lexer::tokenize;
    use pretty_assertions::assert_eq;

    fn parse(source: &str) -> Result<Component, CompileError> {
        Parser::new(tokenize(source)?, "Test").parse()
    }

    fn expr(source: &str) -> Expression {
        let mut parser = Parser::new(tokenize(source).unwrap(), "Test");
        parser.parse_expression().unwrap()
    }

    fn root_element(component: &Component) -> &Element {
        match &component.markup {
            Markup::Element(element) => element,
            other => panic!("expected element, got {other:?}"),
        }
    }

    fn parse_error_kind(source: &str) -> ParseErrorKind {
        match parse(source) {
            Err(CompileError::Parse(error)) => error.kind,
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_parse_counter() {
        let component = parse("@count = 0\n!click = count++\n<btn @click=click>{count}</btn>").unwrap();
        assert_eq!(component.name, "Test");
        assert_eq!(component.states.len(), 1);
        assert_eq!(component.states[0].name, "count");
        assert_eq!(component.states[0].line, 1);
        assert_eq!(
            component.events[0].handler,
            Expression::Update {
                target: "count".into(),
                op: UpdateOp::Increment,
                value: None,
            }
        );
        let button = root_element(&component);
        assert_eq!(button.tag, "btn");
        assert_eq!(button.line, 3);
        assert_eq!(
            button.attributes[0].value,
            AttributeValue::Event(EventHandler::Named("click".into()))
        );
        assert_eq!(
            button.children,
            vec![Markup::Interpolation(Expression::ident("count"))]
        );
    }

    #[test]
    fn test_binary_is_right_recursive() {
        assert_eq!(
            expr("a - b - c"),
            Expression::Binary {
                op: BinaryOp::Sub,
                left: Box::new(Expression::ident("a")),
                right: Box::new(Expression::Binary {
                    op: BinaryOp::Sub,
                    left: Box::new(Expression::ident("b")),
                    right: Box::new(Expression::ident("c")),
                }),
            }
        );
    }

    #[test]
    fn test_method_call_chain() {
        assert_eq!(
            expr("a + b.method(c)"),
            Expression::Binary {
                op: BinaryOp::Add,
                left: Box::new(Expression::ident("a")),
                right: Box::new(Expression::MethodCall {
                    object: Box::new(Expression::ident("b")),
                    method: "method".into(),
                    args: vec![Expression::ident("c")],
                }),
            }
        );
    }

    #[test]
    fn test_arrow_functions() {
        assert_eq!(
            expr("(x) => x + total"),
            Expression::Arrow {
                params: vec!["x".into()],
                body: Box::new(Expression::Binary {
                    op: BinaryOp::Add,
                    left: Box::new(Expression::ident("x")),
                    right: Box::new(Expression::ident("total")),
                }),
            }
        );
        assert_eq!(
            expr("() => reset()"),
            Expression::Arrow {
                params: vec![],
                body: Box::new(Expression::Call {
                    callee: "reset".into(),
                    args: vec![],
                }),
            }
        );
    }

    #[test]
    fn test_literals_and_arrays() {
        assert_eq!(expr("true"), Expression::Literal(Literal::Boolean(true)));
        assert_eq!(expr("undefined"), Expression::Literal(Literal::Undefined));
        assert_eq!(expr("-2.5"), Expression::Literal(Literal::Number("-2.5".into())));
        assert_eq!(
            expr("12345678901234567890"),
            Expression::Literal(Literal::Number("12345678901234567890".into()))
        );
        assert_eq!(
            expr("[...todos, 'x']"),
            Expression::Array(vec![
                Expression::Spread(Box::new(Expression::ident("todos"))),
                Expression::Literal(Literal::String("x".into())),
            ])
        );
    }

    #[test]
    fn test_compound_update() {
        assert_eq!(
            expr("total += price * 2"),
            Expression::Update {
                target: "total".into(),
                op: UpdateOp::AddAssign,
                value: Some(Box::new(Expression::Binary {
                    op: BinaryOp::Mul,
                    left: Box::new(Expression::ident("price")),
                    right: Box::new(Expression::Literal(Literal::Number("2".into()))),
                })),
            }
        );
    }

    #[test]
    fn test_state_modifiers() {
        let source = "@todos:reducer = {[], {\n  add: [...state, action.payload]\n  clear: []\n}}\n@saving:transition\n@slow:deferred = query\n@likes:optimistic = {count, (s, n) => s + n}\n<div></div>";
        let component = parse(source).unwrap();
        assert_eq!(component.reducers.len(), 1);
        let names: Vec<_> = component.reducers[0]
            .actions
            .iter()
            .map(|a| a.name.as_str())
            .collect();
        assert_eq!(names, vec!["add", "clear"]);
        assert_eq!(component.transitions[0].name, "saving");
        assert_eq!(component.transitions[0].line, 5);
        assert_eq!(component.deferreds[0].source, Expression::ident("query"));
        assert_eq!(component.optimistics[0].state, Expression::ident("count"));
        assert!(component.states.is_empty());
    }

    #[test]
    fn test_unknown_modifier() {
        assert_eq!(
            parse_error_kind("@x:lazy = 1\n<p></p>"),
            ParseErrorKind::UnknownModifier {
                modifier: "lazy".into()
            }
        );
    }

    #[test]
    fn test_reducer_without_actions() {
        assert_eq!(
            parse_error_kind("@todos:reducer = {[]}\n<p></p>"),
            ParseErrorKind::MissingActionBlock {
                name: "todos".into()
            }
        );
    }

    #[test]
    fn test_types() {
        let component = parse(
            "$size::'sm' | 'lg' = 'sm'\n@todos::string[] = []\n#cache::Map<string, num> \n<p></p>",
        )
        .unwrap();
        assert_eq!(
            component.props[0].ty,
            Some(TypeNode::Union(vec![
                TypeNode::Simple("'sm'".into()),
                TypeNode::Simple("'lg'".into()),
            ]))
        );
        assert_eq!(
            component.states[0].ty,
            Some(TypeNode::Array("string".into()))
        );
        assert_eq!(
            component.refs[0].ty,
            Some(TypeNode::Generic {
                name: "Map".into(),
                params: vec![
                    TypeNode::Simple("string".into()),
                    TypeNode::Simple("num".into()),
                ],
            })
        );
        assert_eq!(component.refs[0].initial, None);
    }

    #[test]
    fn test_effect_dependencies() {
        let component =
            parse("~ [user.id] fetchUser(user.id)\n~~ measure(box)\n<p></p>").unwrap();
        assert_eq!(component.effects[0].deps.as_ref().map(Vec::len), Some(1));
        assert_eq!(component.layout_effects[0].deps, None);
    }

    #[test]
    fn test_keyword_statements() {
        let component = parse(
            "sync width = {subscribe, getWidth, getServerWidth}\naction save = {submit, null}\n?theme = ThemeContext\n##field\n^api = {focus: input.current.focus()}\n<p></p>",
        )
        .unwrap();
        assert!(component.external_stores[0].server_snapshot.is_some());
        assert_eq!(component.action_states[0].name, "save");
        assert_eq!(component.contexts[0].source, "ThemeContext");
        assert_eq!(component.ids[0].name, "field");
        assert_eq!(component.handles[0].methods[0].name, "focus");
    }

    #[test]
    fn test_sync_requires_two_or_three_entries() {
        let kind = parse_error_kind("sync width = {subscribe}\n<p></p>");
        assert_eq!(
            kind,
            ParseErrorKind::UnexpectedToken {
                expected: "2 or 3 entries".to_string(),
                found: "1 entry".to_string(),
            }
        );
    }

    #[test]
    fn test_attributes() {
        let component = parse(
            "<inp aria-label=\"Name\" val={name} disabled @key-down={() => reset()} />",
        )
        .unwrap();
        let input = root_element(&component);
        assert!(input.self_closing);
        let names: Vec<_> = input.attributes.iter().map(|a| a.name.as_str()).collect();
        assert_eq!(names, vec!["aria-label", "val", "disabled", "key-down"]);
        assert_eq!(input.attributes[0].value, AttributeValue::Text("Name".into()));
        assert_eq!(input.attributes[2].value, AttributeValue::True);
    }

    #[test]
    fn test_text_runs() {
        let component = parse("<p>Count: {count} items\n  left now</p>").unwrap();
        assert_eq!(
            root_element(&component).children,
            vec![
                Markup::Text("Count: ".into()),
                Markup::Interpolation(Expression::ident("count")),
                Markup::Text(" items left now".into()),
            ]
        );
    }

    #[test]
    fn test_each_loop() {
        let component =
            parse("<ul>\n  <each todo::Todo in todos>\n    <li>{todo.title}</li>\n  </each>\n</ul>")
                .unwrap();
        let list = root_element(&component);
        let Markup::Each(each) = &list.children[0] else {
            panic!("expected each loop");
        };
        assert_eq!(each.binding, "todo");
        assert_eq!(each.item_type, Some(TypeNode::Simple("Todo".into())));
        assert_eq!(each.source, Expression::ident("todos"));
        assert_eq!(each.template.tag, "li");
    }

    #[test]
    fn test_each_errors() {
        assert_eq!(
            parse_error_kind("<each x in xs><li></li></each>"),
            ParseErrorKind::EachAtRoot
        );
        assert_eq!(
            parse_error_kind("<ul><each x in xs>{x}</each></ul>"),
            ParseErrorKind::InvalidEachTemplate
        );
        assert_eq!(
            parse_error_kind("<ul><each x in xs><li></li><li></li></each></ul>"),
            ParseErrorKind::InvalidEachTemplate
        );
    }

    #[test]
    fn test_fragment_root() {
        let component = parse("<>\n  <h1>Hi</h1>\n  <p>There</p>\n</>").unwrap();
        let Markup::Fragment(fragment) = &component.markup else {
            panic!("expected fragment");
        };
        assert_eq!(fragment.children.len(), 2);
    }

    #[test]
    fn test_mismatched_tag() {
        match parse("<div>hello</span>") {
            Err(CompileError::MismatchedTag(error)) => {
                assert_eq!(error.expected, "div");
                assert_eq!(error.found, "span");
                assert_eq!(error.line, 1);
            }
            other => panic!("expected mismatched tag, got {other:?}"),
        }
    }

    #[test]
    fn test_markup_count() {
        assert_eq!(parse_error_kind("@a = 1\n"), ParseErrorKind::MissingMarkup);
        assert_eq!(
            parse_error_kind("<p></p>\n<p></p>"),
            ParseErrorKind::DuplicateMarkup
        );
    }

    #[test]
    fn test_statements_after_markup() {
        let component = parse("<p>{total}</p>\n%total = a + b\n").unwrap();
        assert_eq!(component.memos[0].line, 2);
    }

    #[test]
    fn test_unexpected_statement() {
        match parse("@a = 1\n= 2\n<p></p>") {
            Err(CompileError::Parse(error)) => {
                assert_eq!(error.line, 2);
                assert_eq!(
                    error.kind,
                    ParseErrorKind::UnexpectedStatement {
                        found: "'='".to_string()
                    }
                );
            }
            other => panic!("expected parse error, got {other:?}"),
        }
    }

    #[test]
    fn test_statement_must_end_at_newline() {
        assert_eq!(
            parse_error_kind("@a = 1 2\n<p></p>"),
            ParseErrorKind::UnexpectedToken {
                expected: "end of statement".to_string(),
                found: "number 2".to_string(),
            }
        );
    }
}
