//! Dependency-array extraction.
//!
//! The dependency array of an expression is every free identifier it reads,
//! once each, in first-seen order. Arrow parameters are bound within their
//! arrow and never count. Literals never count.

use hooksmith_parser::Expression;
use indexmap::IndexSet;
use rustc_hash::FxBuildHasher;
use smol_str::SmolStr;

type FxIndexSet<T> = IndexSet<T, FxBuildHasher>;

/// Collects the free identifiers of `expr`.
pub fn dependencies(expr: &Expression) -> Vec<SmolStr> {
    let mut found = FxIndexSet::default();
    let mut bound = Vec::new();
    visit(expr, &mut bound, &mut found);
    found.into_iter().collect()
}

fn note(name: &SmolStr, bound: &[SmolStr], found: &mut FxIndexSet<SmolStr>) {
    if !bound.contains(name) {
        found.insert(name.clone());
    }
}

fn visit(expr: &Expression, bound: &mut Vec<SmolStr>, found: &mut FxIndexSet<SmolStr>) {
    match expr {
        Expression::Literal(_) => {}
        Expression::Identifier(name) => note(name, bound, found),
        Expression::Binary { left, right, .. } => {
            visit(left, bound, found);
            visit(right, bound, found);
        }
        Expression::Update { target, value, .. } => {
            note(target, bound, found);
            if let Some(value) = value {
                visit(value, bound, found);
            }
        }
        Expression::Member { object, .. } => visit(object, bound, found),
        Expression::MethodCall { object, args, .. } => {
            visit(object, bound, found);
            for arg in args {
                visit(arg, bound, found);
            }
        }
        Expression::Call { callee, args } => {
            note(callee, bound, found);
            for arg in args {
                visit(arg, bound, found);
            }
        }
        Expression::Arrow { params, body } => {
            let depth = bound.len();
            bound.extend(params.iter().cloned());
            visit(body, bound, found);
            bound.truncate(depth);
        }
        Expression::Array(elements) => {
            for element in elements {
                visit(element, bound, found);
            }
        }
        Expression::Spread(inner) => visit(inner, bound, found),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hooksmith_parser::{parse_source, Component};
    use pretty_assertions::assert_eq;

    fn component(source: &str) -> Component {
        parse_source(source).unwrap()
    }

    fn names(deps: Vec<SmolStr>) -> Vec<String> {
        deps.into_iter().map(|d| d.to_string()).collect()
    }

    #[test]
    fn test_method_receiver_counts_once() {
        let c = component("%total = a + b.method(c)\n<p></p>");
        assert_eq!(names(dependencies(&c.memos[0].value)), vec!["a", "b", "c"]);
    }

    #[test]
    fn test_no_duplicates_first_seen_order() {
        let c = component("%x = b * a + b.size - a\n<p></p>");
        assert_eq!(names(dependencies(&c.memos[0].value)), vec!["b", "a"]);
    }

    #[test]
    fn test_arrow_params_excluded() {
        let c = component("&add = (x) => x + total\n<p></p>");
        assert_eq!(names(dependencies(&c.callbacks[0].value)), vec!["total"]);
    }

    #[test]
    fn test_nested_arrow_scope_ends() {
        let c = component("%picked = items.map(item => item.id).concat([item])\n<p></p>");
        assert_eq!(names(dependencies(&c.memos[0].value)), vec!["items", "item"]);
    }

    #[test]
    fn test_literals_are_not_dependencies() {
        let c = component("%label = flag + true + null + 'x' + 2\n<p></p>");
        assert_eq!(names(dependencies(&c.memos[0].value)), vec!["flag"]);
    }

    #[test]
    fn test_property_names_are_not_dependencies() {
        let c = component("%name = user.profile.name\n<p></p>");
        assert_eq!(names(dependencies(&c.memos[0].value)), vec!["user"]);
    }

    #[test]
    fn test_update_target_counts() {
        let c = component("&bump = () => count += step\n<p></p>");
        assert_eq!(
            names(dependencies(&c.callbacks[0].value)),
            vec!["count", "step"]
        );
    }
}
