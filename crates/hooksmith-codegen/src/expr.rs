//! Expression rendering.

use crate::naming::ITEM_NAME;
use hooksmith_parser::{Expression, Literal};
use smol_str::SmolStr;

/// Renders `expr` as source text.
///
/// Identifiers listed in `items` are each-loop bindings and render as the
/// loop variable, unless an arrow parameter shadows them. Binary chains keep
/// their parsed shape and get no parentheses, so `a - b - c` renders as
/// written.
pub fn render_expression(expr: &Expression, items: &[SmolStr]) -> String {
    let mut out = String::new();
    write_expression(expr, items, &mut out);
    out
}

/// Renders a comma-separated list.
pub fn render_list(exprs: &[Expression], items: &[SmolStr]) -> String {
    let mut out = String::new();
    write_list(exprs, items, &mut out);
    out
}

/// Renders a literal string with single quotes.
pub fn quote(value: &str) -> String {
    let mut out = String::with_capacity(value.len() + 2);
    out.push('\'');
    for c in value.chars() {
        match c {
            '\'' => out.push_str("\\'"),
            '\\' => out.push_str("\\\\"),
            '\n' => out.push_str("\\n"),
            c => out.push(c),
        }
    }
    out.push('\'');
    out
}

/// Renders `name`, substituting the loop variable for bound each-items.
pub fn render_name<'a>(name: &'a str, items: &[SmolStr]) -> &'a str {
    if items.iter().any(|item| item == name) {
        ITEM_NAME
    } else {
        name
    }
}

/// Removes arrow parameters from the set of renamed each-items.
pub fn shadow(items: &[SmolStr], params: &[SmolStr]) -> Vec<SmolStr> {
    items
        .iter()
        .filter(|item| !params.contains(item))
        .cloned()
        .collect()
}

/// `(a, b)`
pub fn render_params(params: &[SmolStr]) -> String {
    let joined: Vec<&str> = params.iter().map(SmolStr::as_str).collect();
    format!("({})", joined.join(", "))
}

fn write_list(exprs: &[Expression], items: &[SmolStr], out: &mut String) {
    for (i, expr) in exprs.iter().enumerate() {
        if i > 0 {
            out.push_str(", ");
        }
        write_expression(expr, items, out);
    }
}

fn write_expression(expr: &Expression, items: &[SmolStr], out: &mut String) {
    match expr {
        Expression::Literal(literal) => write_literal(literal, out),
        Expression::Identifier(name) => out.push_str(render_name(name, items)),
        Expression::Binary { op, left, right } => {
            write_expression(left, items, out);
            out.push(' ');
            out.push_str(op.as_str());
            out.push(' ');
            write_expression(right, items, out);
        }
        Expression::Update { target, op, value } => {
            out.push_str(render_name(target, items));
            match value {
                Some(value) => {
                    out.push(' ');
                    out.push_str(op.as_str());
                    out.push(' ');
                    write_expression(value, items, out);
                }
                None => out.push_str(op.as_str()),
            }
        }
        Expression::Member { object, property } => {
            write_expression(object, items, out);
            out.push('.');
            out.push_str(property);
        }
        Expression::MethodCall {
            object,
            method,
            args,
        } => {
            write_expression(object, items, out);
            out.push('.');
            out.push_str(method);
            out.push('(');
            write_list(args, items, out);
            out.push(')');
        }
        Expression::Call { callee, args } => {
            out.push_str(render_name(callee, items));
            out.push('(');
            write_list(args, items, out);
            out.push(')');
        }
        Expression::Arrow { params, body } => {
            out.push_str(&render_params(params));
            out.push_str(" => ");
            let visible = shadow(items, params);
            write_expression(body, &visible, out);
        }
        Expression::Array(elements) => {
            out.push('[');
            write_list(elements, items, out);
            out.push(']');
        }
        Expression::Spread(inner) => {
            out.push_str("...");
            write_expression(inner, items, out);
        }
    }
}

fn write_literal(literal: &Literal, out: &mut String) {
    match literal {
        Literal::String(value) => out.push_str(&quote(value)),
        Literal::Number(value) => out.push_str(value),
        Literal::Boolean(value) => out.push_str(if *value { "true" } else { "false" }),
        Literal::Null => out.push_str("null"),
        Literal::Undefined => out.push_str("undefined"),
    }
}
