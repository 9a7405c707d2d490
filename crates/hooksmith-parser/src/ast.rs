//! AST types for hooksmith components.
//!
//! A source unit parses into exactly one [`Component`]: ordered declaration
//! collections (one per cell kind) plus a single markup tree. Nodes are built
//! once by the parser and only read afterwards.

use smol_str::SmolStr;

/// A complete component definition.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Component {
    /// The component name used for the function, props interface and export.
    pub name: SmolStr,
    pub props: Vec<Prop>,
    pub states: Vec<State>,
    pub reducers: Vec<Reducer>,
    pub transitions: Vec<Transition>,
    pub deferreds: Vec<Deferred>,
    pub optimistics: Vec<Optimistic>,
    pub memos: Vec<Memo>,
    pub effects: Vec<Effect>,
    pub layout_effects: Vec<Effect>,
    pub events: Vec<Event>,
    pub callbacks: Vec<Callback>,
    pub handles: Vec<Handle>,
    pub refs: Vec<Ref>,
    pub contexts: Vec<Context>,
    pub ids: Vec<Id>,
    pub external_stores: Vec<ExternalStore>,
    pub action_states: Vec<ActionState>,
    /// The rendered tree: always an element or a fragment.
    pub markup: Markup,
}

impl Component {
    /// Creates a component with no declarations.
    pub fn new(name: impl Into<SmolStr>, markup: Markup) -> Self {
        Self {
            name: name.into(),
            props: Vec::new(),
            states: Vec::new(),
            reducers: Vec::new(),
            transitions: Vec::new(),
            deferreds: Vec::new(),
            optimistics: Vec::new(),
            memos: Vec::new(),
            effects: Vec::new(),
            layout_effects: Vec::new(),
            events: Vec::new(),
            callbacks: Vec::new(),
            handles: Vec::new(),
            refs: Vec::new(),
            contexts: Vec::new(),
            ids: Vec::new(),
            external_stores: Vec::new(),
            action_states: Vec::new(),
            markup,
        }
    }

    /// Number of declarations of `kind`.
    pub fn count(&self, kind: DeclarationKind) -> usize {
        match kind {
            DeclarationKind::Prop => self.props.len(),
            DeclarationKind::State => self.states.len(),
            DeclarationKind::Reducer => self.reducers.len(),
            DeclarationKind::Transition => self.transitions.len(),
            DeclarationKind::Deferred => self.deferreds.len(),
            DeclarationKind::Optimistic => self.optimistics.len(),
            DeclarationKind::Memo => self.memos.len(),
            DeclarationKind::Effect => self.effects.len(),
            DeclarationKind::LayoutEffect => self.layout_effects.len(),
            DeclarationKind::Event => self.events.len(),
            DeclarationKind::Callback => self.callbacks.len(),
            DeclarationKind::Handle => self.handles.len(),
            DeclarationKind::Ref => self.refs.len(),
            DeclarationKind::Context => self.contexts.len(),
            DeclarationKind::Id => self.ids.len(),
            DeclarationKind::ExternalStore => self.external_stores.len(),
            DeclarationKind::ActionState => self.action_states.len(),
        }
    }

    /// Whether `name` is a plain state cell (one with an updater).
    pub fn is_state(&self, name: &str) -> bool {
        self.states.iter().any(|s| s.name == name)
    }

    /// Looks up a plain state cell by name. The last declaration wins.
    pub fn state(&self, name: &str) -> Option<&State> {
        self.states.iter().rev().find(|s| s.name == name)
    }
}

/// The kinds of declaration cells.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum DeclarationKind {
    Prop,
    State,
    Reducer,
    Transition,
    Deferred,
    Optimistic,
    Memo,
    Effect,
    LayoutEffect,
    Event,
    Callback,
    Handle,
    Ref,
    Context,
    Id,
    ExternalStore,
    ActionState,
}

impl DeclarationKind {
    /// Returns a human-readable name for this kind.
    pub fn name(&self) -> &'static str {
        match self {
            DeclarationKind::Prop => "prop",
            DeclarationKind::State => "state",
            DeclarationKind::Reducer => "reducer",
            DeclarationKind::Transition => "transition",
            DeclarationKind::Deferred => "deferred",
            DeclarationKind::Optimistic => "optimistic",
            DeclarationKind::Memo => "memo",
            DeclarationKind::Effect => "effect",
            DeclarationKind::LayoutEffect => "layout effect",
            DeclarationKind::Event => "event",
            DeclarationKind::Callback => "callback",
            DeclarationKind::Handle => "imperative handle",
            DeclarationKind::Ref => "ref",
            DeclarationKind::Context => "context",
            DeclarationKind::Id => "id",
            DeclarationKind::ExternalStore => "external store",
            DeclarationKind::ActionState => "action state",
        }
    }
}

// === Declarations ===

/// `$name [::Type] [= default]`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Prop {
    pub name: SmolStr,
    pub ty: Option<TypeNode>,
    pub default: Option<Expression>,
    /// 1-based line the declaration starts on.
    pub line: u32,
}

/// `@name [::Type] = initial`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct State {
    pub name: SmolStr,
    pub ty: Option<TypeNode>,
    pub initial: Expression,
    pub line: u32,
}

impl State {
    /// Whether this cell holds a collection: an array type or an array
    /// literal initial value.
    pub fn is_collection(&self) -> bool {
        let typed_array = match &self.ty {
            Some(TypeNode::Array(_)) => true,
            Some(TypeNode::Generic { name, .. }) => name == "Array",
            _ => false,
        };
        typed_array || matches!(self.initial, Expression::Array(_))
    }
}

/// `@name:reducer [::Type] = { initial, { action: handler, ... } }`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Reducer {
    pub name: SmolStr,
    pub ty: Option<TypeNode>,
    pub initial: Expression,
    pub actions: Vec<ReducerAction>,
    pub line: u32,
}

/// One `action: handler` pair of a reducer.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ReducerAction {
    pub name: SmolStr,
    pub handler: Expression,
}

/// `@name:transition`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Transition {
    pub name: SmolStr,
    pub line: u32,
}

/// `@name:deferred [::Type] = source`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Deferred {
    pub name: SmolStr,
    pub ty: Option<TypeNode>,
    pub source: Expression,
    pub line: u32,
}

/// `@name:optimistic [::Type] = { state, updateFn }`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Optimistic {
    pub name: SmolStr,
    pub ty: Option<TypeNode>,
    pub state: Expression,
    pub update_fn: Expression,
    pub line: u32,
}

/// `%name [::Type] = value`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Memo {
    pub name: SmolStr,
    pub ty: Option<TypeNode>,
    pub value: Expression,
    pub line: u32,
}

/// `~ [deps] body` or `~~ [deps] body`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Effect {
    /// Explicit dependency list. `None` means infer from the body.
    pub deps: Option<Vec<Expression>>,
    pub body: Expression,
    pub line: u32,
}

/// `!name = handler`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Event {
    pub name: SmolStr,
    pub handler: Expression,
    pub line: u32,
}

/// `&name = value`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Callback {
    pub name: SmolStr,
    pub value: Expression,
    pub line: u32,
}

/// `^name = { method: expr, ... }` where `name` is the forwarded ref.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Handle {
    pub name: SmolStr,
    pub methods: Vec<HandleMethod>,
    pub line: u32,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct HandleMethod {
    pub name: SmolStr,
    pub body: Expression,
}

/// `#name [::Type] [= initial]`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Ref {
    pub name: SmolStr,
    pub ty: Option<TypeNode>,
    pub initial: Option<Expression>,
    pub line: u32,
}

/// `?name [::Type] = ContextIdent`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Context {
    pub name: SmolStr,
    pub ty: Option<TypeNode>,
    /// The context object identifier.
    pub source: SmolStr,
    pub line: u32,
}

/// `##name`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Id {
    pub name: SmolStr,
    pub line: u32,
}

/// `sync name [::Type] = { subscribe, getSnapshot [, getServerSnapshot] }`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ExternalStore {
    pub name: SmolStr,
    pub ty: Option<TypeNode>,
    pub subscribe: Expression,
    pub snapshot: Expression,
    pub server_snapshot: Option<Expression>,
    pub line: u32,
}

/// `action name [::Type] = { actionFn, initialState }`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct ActionState {
    pub name: SmolStr,
    pub ty: Option<TypeNode>,
    pub action_fn: Expression,
    pub initial: Expression,
    pub line: u32,
}

// === Expressions ===

/// An expression.
///
/// Binary chains are right-recursive: `a - b - c` is
/// `Binary(a, -, Binary(b, -, c))`.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Expression {
    Literal(Literal),
    Identifier(SmolStr),
    Binary {
        op: BinaryOp,
        left: Box<Expression>,
        right: Box<Expression>,
    },
    /// `x++`, `x--`, `x += value`
    Update {
        target: SmolStr,
        op: UpdateOp,
        value: Option<Box<Expression>>,
    },
    /// `object.property`
    Member {
        object: Box<Expression>,
        property: SmolStr,
    },
    /// `object.method(args)`
    MethodCall {
        object: Box<Expression>,
        method: SmolStr,
        args: Vec<Expression>,
    },
    /// `callee(args)`
    Call {
        callee: SmolStr,
        args: Vec<Expression>,
    },
    /// `x => body` or `(a, b) => body`
    Arrow {
        params: Vec<SmolStr>,
        body: Box<Expression>,
    },
    /// `[a, ...rest]`
    Array(Vec<Expression>),
    /// `...value`, only inside array literals.
    Spread(Box<Expression>),
}

impl Expression {
    pub fn ident(name: impl Into<SmolStr>) -> Self {
        Expression::Identifier(name.into())
    }

    /// Returns the identifier name if this is a bare identifier.
    pub fn as_identifier(&self) -> Option<&SmolStr> {
        match self {
            Expression::Identifier(name) => Some(name),
            _ => None,
        }
    }

    /// Whether `name` is read as a free identifier anywhere in this
    /// expression. Arrow parameters hide it inside their body.
    pub fn references(&self, name: &str) -> bool {
        match self {
            Expression::Literal(_) => false,
            Expression::Identifier(ident) => ident == name,
            Expression::Binary { left, right, .. } => {
                left.references(name) || right.references(name)
            }
            Expression::Update { target, value, .. } => {
                target == name || value.as_ref().is_some_and(|v| v.references(name))
            }
            Expression::Member { object, .. } => object.references(name),
            Expression::MethodCall { object, args, .. } => {
                object.references(name) || args.iter().any(|arg| arg.references(name))
            }
            Expression::Call { callee, args } => {
                callee == name || args.iter().any(|arg| arg.references(name))
            }
            Expression::Arrow { params, body } => {
                !params.iter().any(|param| param == name) && body.references(name)
            }
            Expression::Array(elements) => elements.iter().any(|e| e.references(name)),
            Expression::Spread(inner) => inner.references(name),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Literal {
    String(SmolStr),
    /// The numeric lexeme as written, including a leading minus.
    Number(SmolStr),
    Boolean(bool),
    Null,
    Undefined,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum BinaryOp {
    Add,
    Sub,
    Mul,
    Div,
}

impl BinaryOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            BinaryOp::Add => "+",
            BinaryOp::Sub => "-",
            BinaryOp::Mul => "*",
            BinaryOp::Div => "/",
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum UpdateOp {
    Increment,
    Decrement,
    AddAssign,
}

impl UpdateOp {
    pub fn as_str(&self) -> &'static str {
        match self {
            UpdateOp::Increment => "++",
            UpdateOp::Decrement => "--",
            UpdateOp::AddAssign => "+=",
        }
    }
}

// === Markup ===

/// A markup node.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum Markup {
    Element(Element),
    Fragment(Fragment),
    /// `{expr}`
    Interpolation(Expression),
    /// A literal text run.
    Text(SmolStr),
    /// `<each item in items>...</each>`
    Each(EachLoop),
}

impl Markup {
    /// 1-based source line of an element or fragment.
    pub fn line(&self) -> Option<u32> {
        match self {
            Markup::Element(element) => Some(element.line),
            Markup::Fragment(fragment) => Some(fragment.line),
            _ => None,
        }
    }

    /// Whether an expression inside this subtree reads `name`.
    pub fn references(&self, name: &str) -> bool {
        match self {
            Markup::Element(element) => element.references(name),
            Markup::Fragment(fragment) => fragment.children.iter().any(|c| c.references(name)),
            Markup::Interpolation(expr) => expr.references(name),
            Markup::Text(_) => false,
            Markup::Each(each) => {
                each.source.references(name)
                    || (each.binding != name && each.template.references(name))
            }
        }
    }
}

/// `<tag attrs>children</tag>` or `<tag attrs />`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Element {
    /// The tag name as written (aliases are resolved by the generators).
    pub tag: SmolStr,
    pub attributes: Vec<Attribute>,
    pub children: Vec<Markup>,
    pub self_closing: bool,
    pub line: u32,
}

impl Element {
    /// Whether an attribute or child of this element reads `name`.
    pub fn references(&self, name: &str) -> bool {
        let in_attributes = self.attributes.iter().any(|attribute| match &attribute.value {
            AttributeValue::Expression(expr) => expr.references(name),
            AttributeValue::Event(EventHandler::Inline(expr)) => expr.references(name),
            AttributeValue::Event(EventHandler::Named(handler)) => handler == name,
            AttributeValue::Text(_) | AttributeValue::True => false,
        });
        in_attributes || self.children.iter().any(|child| child.references(name))
    }
}

/// `<>children</>`
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Fragment {
    pub children: Vec<Markup>,
    pub line: u32,
}

/// An iteration over a collection with a single element template.
#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct EachLoop {
    /// The loop variable.
    pub binding: SmolStr,
    pub item_type: Option<TypeNode>,
    /// The collection: an identifier or a property chain.
    pub source: Expression,
    pub template: Box<Element>,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub struct Attribute {
    pub name: SmolStr,
    pub value: AttributeValue,
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum AttributeValue {
    /// `name={expr}`
    Expression(Expression),
    /// `name="text"`
    Text(SmolStr),
    /// `name` with no value.
    True,
    /// `@event=handler`
    Event(EventHandler),
}

#[derive(Debug, Clone, PartialEq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum EventHandler {
    /// `@click=increment`
    Named(SmolStr),
    /// `@click={() => count++}`
    Inline(Expression),
}

// === Types ===

/// A type annotation.
#[derive(Debug, Clone, PartialEq, Eq)]
#[cfg_attr(feature = "serde", derive(serde::Serialize))]
pub enum TypeNode {
    /// A named type. String literal types keep their (single) quotes.
    Simple(SmolStr),
    /// `name[]`
    Array(SmolStr),
    /// `A | B | C`
    Union(Vec<TypeNode>),
    /// `Name<A, B>`
    Generic { name: SmolStr, params: Vec<TypeNode> },
}
