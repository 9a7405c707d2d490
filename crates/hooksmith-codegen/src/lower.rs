//! Lowering of state updates in handlers and effect bodies.
//!
//! `count++` on a state cell becomes `setCount(count + 1)`, `x += v` becomes
//! `setX(x + v)`, and `xs.push(v)` on a collection cell becomes
//! `setXs([...xs, v])`. Anything else renders unchanged.

use crate::expr::{render_expression, render_list, render_name, render_params, shadow};
use crate::naming::setter_name;
use hooksmith_parser::{Component, Expression, UpdateOp};
use smol_str::SmolStr;

/// Renders the update call for `expr`, if it updates a state cell.
fn lower_update(expr: &Expression, component: &Component, items: &[SmolStr]) -> Option<String> {
    match expr {
        Expression::Update { target, op, value } if component.is_state(target) => {
            let setter = setter_name(target);
            let current = render_name(target, items);
            Some(match (op, value) {
                (UpdateOp::Increment, _) => format!("{setter}({current} + 1)"),
                (UpdateOp::Decrement, _) => format!("{setter}({current} - 1)"),
                (UpdateOp::AddAssign, Some(value)) => {
                    format!("{setter}({current} + {})", render_expression(value, items))
                }
                (UpdateOp::AddAssign, None) => format!("{setter}({current})"),
            })
        }
        Expression::MethodCall {
            object,
            method,
            args,
        } if method == "push" => {
            let target = object.as_identifier()?;
            let state = component.state(target)?;
            if !state.is_collection() {
                return None;
            }
            let current = render_name(target, items);
            let mut appended = format!("...{current}");
            if !args.is_empty() {
                appended.push_str(", ");
                appended.push_str(&render_list(args, items));
            }
            Some(format!("{}([{appended}])", setter_name(target)))
        }
        _ => None,
    }
}

/// Renders `expr` as a function value for an event, callback or handle.
///
/// Arrow functions stay arrow functions (their body is lowered); anything
/// else is wrapped in a zero-argument arrow.
pub fn lower_handler(expr: &Expression, component: &Component, items: &[SmolStr]) -> String {
    if let Expression::Arrow { params, body } = expr {
        let visible = shadow(items, params);
        let body = lower_update(body, component, &visible)
            .unwrap_or_else(|| render_expression(body, &visible));
        return format!("{} => {body}", render_params(params));
    }
    let body = lower_update(expr, component, items).unwrap_or_else(|| render_expression(expr, items));
    format!("() => {body}")
}

/// Renders `expr` as a statement inside an effect function.
///
/// A zero-argument arrow contributes its body.
pub fn lower_statement(expr: &Expression, component: &Component) -> String {
    match expr {
        Expression::Arrow { params, body } if params.is_empty() => lower_statement(body, component),
        _ => lower_update(expr, component, &[]).unwrap_or_else(|| render_expression(expr, &[])),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hooksmith_parser::parse_source;
    use pretty_assertions::assert_eq;

    fn event_handler(source: &str) -> String {
        let component = parse_source(source).unwrap();
        lower_handler(&component.events[0].handler, &component, &[])
    }

    #[test]
    fn test_increment_and_decrement() {
        assert_eq!(
            event_handler("@count = 0\n!inc = count++\n<p></p>"),
            "() => setCount(count + 1)"
        );
        assert_eq!(
            event_handler("@count = 0\n!dec = count--\n<p></p>"),
            "() => setCount(count - 1)"
        );
    }

    #[test]
    fn test_compound_add() {
        assert_eq!(
            event_handler("@total = 0\n!add = total += price * qty\n<p></p>"),
            "() => setTotal(total + price * qty)"
        );
    }

    #[test]
    fn test_push_on_collection() {
        assert_eq!(
            event_handler("@todos = []\n@draft = ''\n!add = todos.push(draft)\n<p></p>"),
            "() => setTodos([...todos, draft])"
        );
        assert_eq!(
            event_handler("@tags::str[] = null\n!tag = tags.push('x')\n<p></p>"),
            "() => setTags([...tags, 'x'])"
        );
    }

    #[test]
    fn test_push_on_non_collection_is_verbatim() {
        assert_eq!(
            event_handler("@log = 0\n!add = log.push(1)\n<p></p>"),
            "() => log.push(1)"
        );
    }

    #[test]
    fn test_non_state_update_is_verbatim() {
        assert_eq!(
            event_handler("!inc = counter++\n<p></p>"),
            "() => counter++"
        );
    }

    #[test]
    fn test_arrow_handlers() {
        assert_eq!(
            event_handler("@name = ''\n!rename = (e) => save(e.target.value)\n<p></p>"),
            "(e) => save(e.target.value)"
        );
        assert_eq!(
            event_handler("@count = 0\n!bump = (n) => count += n\n<p></p>"),
            "(n) => setCount(count + n)"
        );
    }

    #[test]
    fn test_effect_statement() {
        let component = parse_source("@ticks = 0\n~ () => ticks++\n~ log(ticks)\n<p></p>").unwrap();
        assert_eq!(
            lower_statement(&component.effects[0].body, &component),
            "setTicks(ticks + 1)"
        );
        assert_eq!(
            lower_statement(&component.effects[1].body, &component),
            "log(ticks)"
        );
    }

    #[test]
    fn test_each_item_inside_handler() {
        let component =
            parse_source("@todos = []\n!noop = () => remove(todo)\n<p></p>").unwrap();
        let items = vec![SmolStr::new("todo")];
        assert_eq!(
            lower_handler(&component.events[0].handler, &component, &items),
            "() => remove(__item)"
        );
    }
}
