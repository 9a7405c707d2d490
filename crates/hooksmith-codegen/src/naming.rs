//! Naming conventions for generated identifiers, tags and attributes.
//!
//! Every auxiliary name is derived from a declaration name by a fixed rule.
//! Downstream code refers to these names by convention, so the exact
//! capitalization matters.

use std::path::Path;

/// Tag aliases; anything not listed passes through.
const TAG_ALIASES: &[(&str, &str)] = &[
    ("btn", "button"),
    ("inp", "input"),
    ("lbl", "label"),
    ("txt", "span"),
    ("sel", "select"),
    ("opt", "option"),
    ("area", "textarea"),
];

/// Event names with a fixed attribute; others become `on` + PascalCase.
const EVENT_ATTRIBUTES: &[(&str, &str)] = &[
    ("click", "onClick"),
    ("change", "onChange"),
    ("submit", "onSubmit"),
];

/// DSL attribute names that differ in the output.
const ATTRIBUTE_ALIASES: &[(&str, &str)] = &[("class", "className"), ("for", "htmlFor")];

/// Loop variable used in every lowered each-loop.
pub const ITEM_NAME: &str = "__item";

/// Index variable used for each-loop keys.
pub const INDEX_NAME: &str = "__index";

/// Name used when no component name can be derived.
pub const FALLBACK_COMPONENT_NAME: &str = "Component";

fn lookup(table: &[(&'static str, &'static str)], key: &str) -> Option<&'static str> {
    table.iter().find(|(k, _)| *k == key).map(|(_, v)| *v)
}

/// Uppercases the first character.
pub fn capitalize(name: &str) -> String {
    let mut chars = name.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}

/// `count` → `setCount`
pub fn setter_name(name: &str) -> String {
    format!("set{}", capitalize(name))
}

/// `todos` → `todosReducer`
pub fn reducer_fn_name(name: &str) -> String {
    format!("{name}Reducer")
}

/// `todos` → `dispatchTodos`
pub fn dispatch_name(name: &str) -> String {
    format!("dispatch{}", capitalize(name))
}

/// `saving` → `isPendingSaving`
pub fn pending_name(name: &str) -> String {
    format!("isPending{}", capitalize(name))
}

/// `saving` → `startSavingTransition`
pub fn transition_starter_name(name: &str) -> String {
    format!("start{}Transition", capitalize(name))
}

/// `likes` → `addLikes`
pub fn optimistic_adder_name(name: &str) -> String {
    format!("add{}", capitalize(name))
}

/// `save` → `saveAction`
pub fn action_name(name: &str) -> String {
    format!("{name}Action")
}

/// Resolves a DSL tag through the alias table.
pub fn resolve_tag(tag: &str) -> &str {
    lookup(TAG_ALIASES, tag).unwrap_or(tag)
}

/// `click` → `onClick`, `key-down` → `onKeyDown`
pub fn event_attribute(event: &str) -> String {
    match lookup(EVENT_ATTRIBUTES, event) {
        Some(attribute) => attribute.to_string(),
        None => format!("on{}", pascal_case(event)),
    }
}

/// `class` → `className`, `for` → `htmlFor`
pub fn attribute_name(name: &str) -> &str {
    lookup(ATTRIBUTE_ALIASES, name).unwrap_or(name)
}

/// Uppercases the first character and every character after a hyphen, then
/// drops anything that is not alphanumeric.
fn pascal_case(name: &str) -> String {
    let mut result = String::with_capacity(name.len());
    let mut capitalize_next = true;
    for c in name.chars() {
        if c == '-' {
            capitalize_next = true;
        } else if c.is_alphanumeric() {
            if capitalize_next {
                result.extend(c.to_uppercase());
                capitalize_next = false;
            } else {
                result.push(c);
            }
        }
    }
    result
}

/// Extracts a component name from a file path.
///
/// Given `/path/to/todo-list.hks`, returns `"TodoList"`. Leading characters
/// that cannot start an identifier are skipped; an empty result falls back
/// to `"Component"`.
pub fn component_name_from_path(path: &str) -> String {
    let stem = Path::new(path)
        .file_stem()
        .and_then(|s| s.to_str())
        .unwrap_or_default();
    let stem = stem.trim_start_matches(|c: char| !c.is_alphabetic());

    let name = pascal_case(stem);
    if name.is_empty() {
        FALLBACK_COMPONENT_NAME.to_string()
    } else {
        name
    }
}
