//! Shared module emitter for the plain and typed generators.
//!
//! The emitter writes the fixed module layout:
//!
//! 1. `import React, { ...hooks } from 'react';`
//! 2. module-level reducer functions
//! 3. (typed) the props interface
//! 4. the component function: signature, declarations in a fixed per-kind
//!    order, and the `return (...)` markup
//! 5. `export default Name;`
//!
//! Everything that differs between plain and typed output goes through the
//! [`Dialect`] trait.

use crate::deps::dependencies;
use crate::expr::{quote, render_expression, render_list};
use crate::lower::{lower_handler, lower_statement};
use crate::markup::MarkupWriter;
use crate::naming::{
    action_name, dispatch_name, optimistic_adder_name, pending_name, reducer_fn_name,
    setter_name, transition_starter_name,
};
use hooksmith_parser::{Component, DeclarationKind, Effect, Reducer, TypeNode};

/// Indentation unit.
pub(crate) const INDENT: &str = "  ";

/// Hooks in import order, with the declaration kind that uses each.
const HOOKS: &[(&str, DeclarationKind)] = &[
    ("useState", DeclarationKind::State),
    ("useReducer", DeclarationKind::Reducer),
    ("useEffect", DeclarationKind::Effect),
    ("useLayoutEffect", DeclarationKind::LayoutEffect),
    ("useMemo", DeclarationKind::Memo),
    ("useCallback", DeclarationKind::Callback),
    ("useRef", DeclarationKind::Ref),
    ("useContext", DeclarationKind::Context),
    ("useImperativeHandle", DeclarationKind::Handle),
    ("useId", DeclarationKind::Id),
    ("useTransition", DeclarationKind::Transition),
    ("useDeferredValue", DeclarationKind::Deferred),
    ("useOptimistic", DeclarationKind::Optimistic),
    ("useSyncExternalStore", DeclarationKind::ExternalStore),
    ("useActionState", DeclarationKind::ActionState),
];

/// Order of declarations inside the component body. Props are destructured
/// in the signature instead.
const BODY_ORDER: &[DeclarationKind] = &[
    DeclarationKind::State,
    DeclarationKind::Id,
    DeclarationKind::Deferred,
    DeclarationKind::Optimistic,
    DeclarationKind::ExternalStore,
    DeclarationKind::ActionState,
    DeclarationKind::Reducer,
    DeclarationKind::Transition,
    DeclarationKind::Context,
    DeclarationKind::Callback,
    DeclarationKind::Ref,
    DeclarationKind::Handle,
    DeclarationKind::Memo,
    DeclarationKind::Effect,
    DeclarationKind::LayoutEffect,
    DeclarationKind::Event,
];

/// Output differences between plain and typed generation.
pub(crate) trait Dialect {
    /// Explicit type arguments for a hook call (`<number>`), or empty.
    fn type_args(&self, ty: Option<&TypeNode>) -> String;

    /// Lines of the props type block; empty when none is emitted.
    fn props_block(&self, component: &Component) -> Vec<String>;

    /// Annotation appended to the destructured props parameter.
    fn props_annotation(&self, component: &Component) -> String;

    /// The opening line of a module-level reducer function.
    fn reducer_signature(&self, reducer: &Reducer) -> String;

    /// Parameter of the change handler generated for `val={x}`.
    fn change_event_param(&self, tag: &str) -> String;

    /// Parameter list of an each-loop mapping callback.
    fn each_params(&self, item_type: Option<&TypeNode>) -> String;
}

/// Emitted module text plus `(generated_line, original_line)` pairs.
pub(crate) struct Emitted {
    pub code: String,
    pub mappings: Vec<(u32, u32)>,
}

/// The hooks `component` needs, in import order.
pub(crate) fn hooks_used(component: &Component) -> Vec<&'static str> {
    HOOKS
        .iter()
        .filter(|(_, kind)| component.count(*kind) > 0)
        .map(|(hook, _)| *hook)
        .collect()
}

pub(crate) struct Emitter<'a, D: Dialect> {
    dialect: &'a D,
    component: &'a Component,
    out: String,
    /// Number of lines written so far.
    lines: u32,
    mappings: Vec<(u32, u32)>,
}

impl<'a, D: Dialect> Emitter<'a, D> {
    pub(crate) fn new(dialect: &'a D, component: &'a Component) -> Self {
        Self {
            dialect,
            component,
            out: String::new(),
            lines: 0,
            mappings: Vec::new(),
        }
    }

    pub(crate) fn emit(mut self) -> Emitted {
        self.imports();
        self.reducer_functions();
        self.props_block();
        self.function_body();
        self.line(&format!("export default {};", self.component.name));

        Emitted {
            code: self.out,
            mappings: self.mappings,
        }
    }

    // === Output helpers ===

    fn line(&mut self, text: &str) {
        self.out.push_str(text);
        self.out.push('\n');
        self.lines += 1;
    }

    /// Writes a line and records that it came from `original_line`.
    fn mapped_line(&mut self, text: &str, original_line: u32) {
        self.mappings.push((self.lines + 1, original_line));
        self.line(text);
    }

    /// Writes a possibly multi-line block; its first line is mapped.
    fn mapped_block(&mut self, block: &str, original_line: u32) {
        for (i, text) in block.lines().enumerate() {
            if i == 0 {
                self.mapped_line(text, original_line);
            } else {
                self.line(text);
            }
        }
    }

    fn blank(&mut self) {
        self.line("");
    }

    // === Sections ===

    fn imports(&mut self) {
        let hooks = hooks_used(self.component);
        if hooks.is_empty() {
            self.line("import React from 'react';");
        } else {
            self.line(&format!(
                "import React, {{ {} }} from 'react';",
                hooks.join(", ")
            ));
        }
        self.blank();
    }

    fn reducer_functions(&mut self) {
        let component = self.component;
        for reducer in &component.reducers {
            self.mapped_line(&self.dialect.reducer_signature(reducer), reducer.line);
            self.line(&format!("{INDENT}switch (action.type) {{"));
            for action in &reducer.actions {
                self.line(&format!("{INDENT}{INDENT}case {}:", quote(&action.name)));
                self.line(&format!(
                    "{INDENT}{INDENT}{INDENT}return {};",
                    render_expression(&action.handler, &[])
                ));
            }
            self.line(&format!("{INDENT}{INDENT}default:"));
            self.line(&format!("{INDENT}{INDENT}{INDENT}return state;"));
            self.line(&format!("{INDENT}}}"));
            self.line("}");
            self.blank();
        }
    }

    fn props_block(&mut self) {
        let block = self.dialect.props_block(self.component);
        if block.is_empty() {
            return;
        }
        // Header and footer are unmapped; one field line per prop.
        let component = self.component;
        for (i, text) in block.iter().enumerate() {
            match i.checked_sub(1).and_then(|idx| component.props.get(idx)) {
                Some(prop) if i + 1 < block.len() => self.mapped_line(text, prop.line),
                _ => self.line(text),
            }
        }
        self.blank();
    }

    fn function_body(&mut self) {
        let component = self.component;
        let params = self.signature_params();
        let signature = format!("function {}({params}) {{", component.name);
        match component.props.first() {
            Some(prop) => self.mapped_line(&signature, prop.line),
            None => self.line(&signature),
        }

        let before = self.lines;
        for kind in BODY_ORDER {
            self.declarations(*kind);
        }
        if self.lines > before {
            self.blank();
        }

        self.line(&format!("{INDENT}return ("));
        let writer = MarkupWriter::new(self.dialect, component);
        let markup = writer.render_root(&component.markup, 2);
        match component.markup.line() {
            Some(line) => self.mapped_block(&markup, line),
            None => {
                for text in markup.lines() {
                    self.line(text);
                }
            }
        }
        self.line(&format!("{INDENT});"));
        self.line("}");
        self.blank();
    }

    /// `{ a, b = 1 }: NameProps`, or nothing without props.
    fn signature_params(&self) -> String {
        let props = &self.component.props;
        if props.is_empty() {
            return String::new();
        }
        let fields: Vec<String> = props
            .iter()
            .map(|prop| match &prop.default {
                Some(default) => format!("{} = {}", prop.name, render_expression(default, &[])),
                None => prop.name.to_string(),
            })
            .collect();
        format!(
            "{{ {} }}{}",
            fields.join(", "),
            self.dialect.props_annotation(self.component)
        )
    }

    fn declarations(&mut self, kind: DeclarationKind) {
        let component = self.component;
        let dialect = self.dialect;
        match kind {
            DeclarationKind::Prop => {}
            DeclarationKind::State => {
                for state in &component.states {
                    self.mapped_line(
                        &format!(
                            "{INDENT}const [{}, {}] = useState{}({});",
                            state.name,
                            setter_name(&state.name),
                            dialect.type_args(state.ty.as_ref()),
                            render_expression(&state.initial, &[])
                        ),
                        state.line,
                    );
                }
            }
            DeclarationKind::Id => {
                for id in &component.ids {
                    self.mapped_line(&format!("{INDENT}const {} = useId();", id.name), id.line);
                }
            }
            DeclarationKind::Deferred => {
                for deferred in &component.deferreds {
                    self.mapped_line(
                        &format!(
                            "{INDENT}const {} = useDeferredValue{}({});",
                            deferred.name,
                            dialect.type_args(deferred.ty.as_ref()),
                            render_expression(&deferred.source, &[])
                        ),
                        deferred.line,
                    );
                }
            }
            DeclarationKind::Optimistic => {
                for optimistic in &component.optimistics {
                    self.mapped_line(
                        &format!(
                            "{INDENT}const [{}, {}] = useOptimistic{}({}, {});",
                            optimistic.name,
                            optimistic_adder_name(&optimistic.name),
                            dialect.type_args(optimistic.ty.as_ref()),
                            render_expression(&optimistic.state, &[]),
                            render_expression(&optimistic.update_fn, &[])
                        ),
                        optimistic.line,
                    );
                }
            }
            DeclarationKind::ExternalStore => {
                for store in &component.external_stores {
                    let mut args = vec![
                        render_expression(&store.subscribe, &[]),
                        render_expression(&store.snapshot, &[]),
                    ];
                    if let Some(server) = &store.server_snapshot {
                        args.push(render_expression(server, &[]));
                    }
                    self.mapped_line(
                        &format!(
                            "{INDENT}const {} = useSyncExternalStore{}({});",
                            store.name,
                            dialect.type_args(store.ty.as_ref()),
                            args.join(", ")
                        ),
                        store.line,
                    );
                }
            }
            DeclarationKind::ActionState => {
                for action in &component.action_states {
                    self.mapped_line(
                        &format!(
                            "{INDENT}const [{}, {}, {}] = useActionState{}({}, {});",
                            action.name,
                            action_name(&action.name),
                            pending_name(&action.name),
                            dialect.type_args(action.ty.as_ref()),
                            render_expression(&action.action_fn, &[]),
                            render_expression(&action.initial, &[])
                        ),
                        action.line,
                    );
                }
            }
            DeclarationKind::Reducer => {
                for reducer in &component.reducers {
                    self.mapped_line(
                        &format!(
                            "{INDENT}const [{}, {}] = useReducer({}, {});",
                            reducer.name,
                            dispatch_name(&reducer.name),
                            reducer_fn_name(&reducer.name),
                            render_expression(&reducer.initial, &[])
                        ),
                        reducer.line,
                    );
                }
            }
            DeclarationKind::Transition => {
                for transition in &component.transitions {
                    self.mapped_line(
                        &format!(
                            "{INDENT}const [{}, {}] = useTransition();",
                            pending_name(&transition.name),
                            transition_starter_name(&transition.name)
                        ),
                        transition.line,
                    );
                }
            }
            DeclarationKind::Context => {
                for context in &component.contexts {
                    self.mapped_line(
                        &format!(
                            "{INDENT}const {} = useContext{}({});",
                            context.name,
                            dialect.type_args(context.ty.as_ref()),
                            context.source
                        ),
                        context.line,
                    );
                }
            }
            DeclarationKind::Callback => {
                for callback in &component.callbacks {
                    self.mapped_line(
                        &format!(
                            "{INDENT}const {} = useCallback({}, [{}]);",
                            callback.name,
                            lower_handler(&callback.value, component, &[]),
                            dependencies(&callback.value).join(", ")
                        ),
                        callback.line,
                    );
                }
            }
            DeclarationKind::Ref => {
                for r in &component.refs {
                    let initial = r
                        .initial
                        .as_ref()
                        .map(|initial| render_expression(initial, &[]))
                        .unwrap_or_else(|| "null".to_string());
                    self.mapped_line(
                        &format!(
                            "{INDENT}const {} = useRef{}({initial});",
                            r.name,
                            dialect.type_args(r.ty.as_ref())
                        ),
                        r.line,
                    );
                }
            }
            DeclarationKind::Handle => {
                for handle in &component.handles {
                    self.mapped_line(
                        &format!("{INDENT}useImperativeHandle({}, () => ({{", handle.name),
                        handle.line,
                    );
                    for method in &handle.methods {
                        self.line(&format!(
                            "{INDENT}{INDENT}{}: {},",
                            method.name,
                            lower_handler(&method.body, component, &[])
                        ));
                    }
                    self.line(&format!("{INDENT}}}));"));
                }
            }
            DeclarationKind::Memo => {
                for memo in &component.memos {
                    self.mapped_line(
                        &format!(
                            "{INDENT}const {} = useMemo{}(() => {}, [{}]);",
                            memo.name,
                            dialect.type_args(memo.ty.as_ref()),
                            render_expression(&memo.value, &[]),
                            dependencies(&memo.value).join(", ")
                        ),
                        memo.line,
                    );
                }
            }
            DeclarationKind::Effect => {
                for effect in &component.effects {
                    self.effect("useEffect", effect);
                }
            }
            DeclarationKind::LayoutEffect => {
                for effect in &component.layout_effects {
                    self.effect("useLayoutEffect", effect);
                }
            }
            DeclarationKind::Event => {
                for event in &component.events {
                    self.mapped_line(
                        &format!(
                            "{INDENT}const {} = {};",
                            event.name,
                            lower_handler(&event.handler, component, &[])
                        ),
                        event.line,
                    );
                }
            }
        }
    }

    fn effect(&mut self, hook: &str, effect: &Effect) {
        let deps = match &effect.deps {
            Some(explicit) => render_list(explicit, &[]),
            None => dependencies(&effect.body).join(", "),
        };
        self.mapped_line(&format!("{INDENT}{hook}(() => {{"), effect.line);
        self.line(&format!(
            "{INDENT}{INDENT}{};",
            lower_statement(&effect.body, self.component)
        ));
        self.line(&format!("{INDENT}}}, [{deps}]);"));
    }
}
