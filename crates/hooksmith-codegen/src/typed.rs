//! Typed (TSX) generation.
//!
//! Same module layout as the plain output, plus:
//! - an `interface <Name>Props` block and a props annotation
//! - explicit type arguments on hooks whose cell declares a type
//! - typed reducer signatures, change events and each-loop parameters
//! - an optional line-level [`PositionMap`]

use crate::emit::{Dialect, Emitter, INDENT};
use crate::naming::{reducer_fn_name, INDEX_NAME, ITEM_NAME};
use hooksmith_parser::{Component, Reducer, TypeNode};
use hooksmith_source_map::PositionMap;

/// DSL type names with a different spelling in the output.
const TYPE_NAMES: &[(&str, &str)] = &[
    ("str", "string"),
    ("num", "number"),
    ("int", "number"),
    ("float", "number"),
    ("bool", "boolean"),
];

/// Options for typed generation.
#[derive(Debug, Clone, Default)]
pub struct TypedOptions {
    /// Record one mapping per emitted declaration line.
    pub source_map: bool,
    /// Explicit `(generated_line, original_line)` pairs. These win over
    /// derived mappings for the same generated line.
    pub hints: Vec<(u32, u32)>,
    /// `file` field of the map. Defaults to `<Name>.tsx`.
    pub file_name: Option<String>,
}

/// Result of typed generation.
#[derive(Debug, Clone)]
pub struct TypedOutput {
    pub code: String,
    /// Present when `source_map` is set or hints were given.
    pub position_map: Option<PositionMap>,
}

/// Renders a DSL type annotation as a TypeScript type.
pub fn ts_type(ty: &TypeNode) -> String {
    match ty {
        TypeNode::Simple(name) => type_name(name).to_string(),
        TypeNode::Array(name) => format!("{}[]", type_name(name)),
        TypeNode::Union(members) => join_types(members, " | "),
        TypeNode::Generic { name, params } => {
            format!("{}<{}>", type_name(name), join_types(params, ", "))
        }
    }
}

fn type_name(name: &str) -> &str {
    TYPE_NAMES
        .iter()
        .find(|(from, _)| *from == name)
        .map(|(_, to)| *to)
        .unwrap_or(name)
}

fn join_types(types: &[TypeNode], separator: &str) -> String {
    types.iter().map(ts_type).collect::<Vec<_>>().join(separator)
}

/// DOM element interface for a resolved form tag.
fn element_type(tag: &str) -> &'static str {
    match tag {
        "textarea" => "HTMLTextAreaElement",
        "select" => "HTMLSelectElement",
        _ => "HTMLInputElement",
    }
}

pub(crate) struct Typed;

impl Dialect for Typed {
    fn type_args(&self, ty: Option<&TypeNode>) -> String {
        ty.map(|ty| format!("<{}>", ts_type(ty))).unwrap_or_default()
    }

    fn props_block(&self, component: &Component) -> Vec<String> {
        if component.props.is_empty() {
            return Vec::new();
        }
        let mut block = vec![format!("interface {}Props {{", component.name)];
        for prop in &component.props {
            let optional = if prop.default.is_some() { "?" } else { "" };
            let ty = prop
                .ty
                .as_ref()
                .map(ts_type)
                .unwrap_or_else(|| "any".to_string());
            block.push(format!("{INDENT}{}{optional}: {ty};", prop.name));
        }
        block.push("}".to_string());
        block
    }

    fn props_annotation(&self, component: &Component) -> String {
        format!(": {}Props", component.name)
    }

    fn reducer_signature(&self, reducer: &Reducer) -> String {
        let ty = reducer
            .ty
            .as_ref()
            .map(ts_type)
            .unwrap_or_else(|| "any".to_string());
        format!(
            "function {}(state: {ty}, action: {{ type: string; payload?: any }}): {ty} {{",
            reducer_fn_name(&reducer.name)
        )
    }

    fn change_event_param(&self, tag: &str) -> String {
        format!("e: React.ChangeEvent<{}>", element_type(tag))
    }

    fn each_params(&self, item_type: Option<&TypeNode>) -> String {
        match item_type {
            Some(ty) => format!("({ITEM_NAME}: {}, {INDEX_NAME}: number)", ts_type(ty)),
            None => format!("({ITEM_NAME}, {INDEX_NAME})"),
        }
    }
}

/// Generates a typed hooks component module for `component`.
///
/// `source_id` names the DSL source in the position map.
pub fn generate_typed(component: &Component, source_id: &str, options: &TypedOptions) -> TypedOutput {
    let emitted = Emitter::new(&Typed, component).emit();

    let position_map = (options.source_map || !options.hints.is_empty()).then(|| {
        let file = options
            .file_name
            .clone()
            .unwrap_or_else(|| format!("{}.tsx", component.name));
        let mut builder = PositionMap::builder(file, source_id);
        for &(generated, original) in &options.hints {
            builder.add_mapping(generated, original);
        }
        if options.source_map {
            for &(generated, original) in &emitted.mappings {
                builder.add_mapping(generated, original);
            }
        }
        builder.build()
    });

    tracing::debug!(
        component = %component.name,
        bytes = emitted.code.len(),
        mappings = position_map.as_ref().map_or(0, PositionMap::len),
        "generated typed module"
    );

    TypedOutput {
        code: emitted.code,
        position_map,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use hooksmith_parser::parse_source;
    use pretty_assertions::assert_eq;

    const LABELED_COUNTER: &str = "\
$label::str
$step::num = 1
@count::num = 0
!click = count += step
<btn @click=click>{label}: {count}</btn>";

    fn typed(source: &str) -> String {
        generate_typed(&parse_source(source).unwrap(), "test.hks", &TypedOptions::default()).code
    }

    fn type_of(annotation: &str) -> String {
        let component = parse_source(&format!("$p::{annotation}\n<p></p>")).unwrap();
        ts_type(component.props[0].ty.as_ref().unwrap())
    }

    #[test]
    fn test_type_mapping() {
        assert_eq!(type_of("str"), "string");
        assert_eq!(type_of("int"), "number");
        assert_eq!(type_of("bool[]"), "boolean[]");
        assert_eq!(type_of("str | null"), "string | null");
        assert_eq!(type_of("Map<str, num>"), "Map<string, number>");
        assert_eq!(type_of("User"), "User");
        assert_eq!(type_of("'a' | 'b'"), "'a' | 'b'");
    }

    #[test]
    fn test_labeled_counter() {
        assert_eq!(
            typed(LABELED_COUNTER),
            "\
import React, { useState } from 'react';

interface ComponentProps {
  label: string;
  step?: number;
}

function Component({ label, step = 1 }: ComponentProps) {
  const [count, setCount] = useState<number>(0);
  const click = () => setCount(count + step);

  return (
    <button onClick={click}>{label}: {count}</button>
  );
}

export default Component;
"
        );
    }

    #[test]
    fn test_no_interface_without_props() {
        let output = typed("@on::bool = false\n<p>{on}</p>");
        assert!(!output.contains("interface"));
        assert!(output.contains("function Component() {\n"));
        assert!(output.contains("useState<boolean>(false)"));
    }

    #[test]
    fn test_untyped_prop_is_any() {
        let output = typed("$data\n<p>{data}</p>");
        assert!(output.contains("interface ComponentProps {\n  data: any;\n}\n"));
    }

    #[test]
    fn test_reducer_signature() {
        let output = typed("@n:reducer::num = {0, {inc: state + 1}}\n<p>{n}</p>");
        assert!(output.contains(
            "function nReducer(state: number, action: { type: string; payload?: any }): number {\n"
        ));
        assert!(output.contains("  const [n, dispatchN] = useReducer(nReducer, 0);\n"));
    }

    #[test]
    fn test_change_event_by_tag() {
        let output = typed("@bio = ''\n<area val={bio}></area>");
        assert!(output.contains(
            "<textarea value={bio} onChange={(e: React.ChangeEvent<HTMLTextAreaElement>) => setBio(e.target.value)}></textarea>"
        ));
    }

    #[test]
    fn test_typed_each_params() {
        let output = typed("@todos = []\n<ul><each todo::Todo in todos><li>{todo.title}</li></each></ul>");
        assert!(output.contains(
            "{todos.map((__item: Todo, __index: number) => <li key={__index}>{__item.title}</li>)}"
        ));
    }

    #[test]
    fn test_position_map() {
        let component = parse_source(LABELED_COUNTER).unwrap();
        let options = TypedOptions {
            source_map: true,
            ..TypedOptions::default()
        };
        let output = generate_typed(&component, "counter.hks", &options);
        let map = output.position_map.unwrap();
        assert_eq!(map.file(), "Component.tsx");
        assert_eq!(map.source(), "counter.hks");
        let pairs: Vec<(u32, u32)> = map
            .mappings()
            .map(|m| (m.generated_line, m.original_line))
            .collect();
        assert_eq!(pairs, vec![(4, 1), (5, 2), (8, 1), (9, 3), (10, 4), (13, 5)]);
    }

    #[test]
    fn test_hints_only() {
        let component = parse_source(LABELED_COUNTER).unwrap();
        let options = TypedOptions {
            hints: vec![(9, 3)],
            file_name: Some("counter.tsx".to_string()),
            ..TypedOptions::default()
        };
        let map = generate_typed(&component, "counter.hks", &options)
            .position_map
            .unwrap();
        assert_eq!(map.file(), "counter.tsx");
        assert_eq!(map.len(), 1);
        assert_eq!(map.original_line(9), Some(3));
    }

    #[test]
    fn test_no_map_by_default() {
        let component = parse_source(LABELED_COUNTER).unwrap();
        let output = generate_typed(&component, "counter.hks", &TypedOptions::default());
        assert!(output.position_map.is_none());
    }
}
