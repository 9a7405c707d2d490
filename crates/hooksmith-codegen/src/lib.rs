//! Hooks component generation for hooksmith.
//!
//! This crate turns a parsed [`Component`] into a React function component
//! module. It handles:
//! - Hook imports and declarations in a fixed order
//! - Dependency arrays for memos, callbacks and inferred effects
//! - State update lowering in handlers (`count++` → `setCount(count + 1)`)
//! - Markup lowering (tag aliases, events, `val` bindings, each-loops)
//! - Typed output with a props interface and an optional position map
//!
//! # Example
//!
//! ```
//! use hooksmith_codegen::{compile, CompileOptions};
//!
//! let source = "@count = 0\n!click = count++\n<btn @click=click>{count}</btn>";
//! let output = compile(source, &CompileOptions::default()).unwrap();
//! assert!(output.code.contains("const [count, setCount] = useState(0);"));
//! ```

mod deps;
mod emit;
mod expr;
mod lower;
mod markup;
mod naming;
mod plain;
mod typed;

pub use deps::dependencies;
pub use naming::{
    action_name, attribute_name, capitalize, component_name_from_path, dispatch_name,
    event_attribute, optimistic_adder_name, pending_name, reducer_fn_name, resolve_tag,
    setter_name, transition_starter_name, FALLBACK_COMPONENT_NAME, INDEX_NAME, ITEM_NAME,
};
pub use plain::generate;
pub use typed::{generate_typed, ts_type, TypedOptions, TypedOutput};

use hooksmith_parser::{parse_with_options, Component, CompileError, ParseOptions};
use hooksmith_source_map::PositionMap;
use smol_str::SmolStr;

/// Options for compiling one source unit.
#[derive(Debug, Clone)]
pub struct CompileOptions {
    /// Component name; `Component` when unset.
    pub component_name: Option<String>,
    /// Emit TSX instead of JSX.
    pub typed: bool,
    /// Build a position map (typed output only).
    pub source_map: bool,
    /// Name of the DSL source recorded in the position map.
    pub source_id: String,
    /// `file` field of the position map.
    pub file_name: Option<String>,
}

impl Default for CompileOptions {
    fn default() -> Self {
        Self {
            component_name: None,
            typed: false,
            source_map: false,
            source_id: "component.hks".to_string(),
            file_name: None,
        }
    }
}

/// Result of compiling one source unit.
#[derive(Debug, Clone)]
pub struct CompileOutput {
    pub code: String,
    pub position_map: Option<PositionMap>,
}

/// Tokenizes, parses and generates `source`.
///
/// The first lex or parse error aborts the unit; nothing is generated.
pub fn compile(source: &str, options: &CompileOptions) -> Result<CompileOutput, CompileError> {
    let parse_options = ParseOptions {
        component_name: options.component_name.as_deref().map(SmolStr::new),
    };
    let component = parse_with_options(source, &parse_options)?;
    Ok(generate_component(&component, options))
}

/// Generates output for an already parsed component.
pub fn generate_component(component: &Component, options: &CompileOptions) -> CompileOutput {
    if !options.typed {
        if options.source_map {
            tracing::warn!(
                component = %component.name,
                "position maps are only produced for typed output"
            );
        }
        return CompileOutput {
            code: generate(component),
            position_map: None,
        };
    }

    let typed_options = TypedOptions {
        source_map: options.source_map,
        hints: Vec::new(),
        file_name: options.file_name.clone(),
    };
    let output = generate_typed(component, &options.source_id, &typed_options);
    CompileOutput {
        code: output.code,
        position_map: output.position_map,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_compile_uses_component_name() {
        let options = CompileOptions {
            component_name: Some("Greeting".to_string()),
            ..CompileOptions::default()
        };
        let output = compile("$name\n<p>Hi {name}</p>", &options).unwrap();
        assert!(output.code.contains("function Greeting({ name }) {"));
        assert!(output.code.ends_with("export default Greeting;\n"));
        assert!(output.position_map.is_none());
    }

    #[test]
    fn test_compile_typed_with_map() {
        let options = CompileOptions {
            typed: true,
            source_map: true,
            source_id: "greeting.hks".to_string(),
            ..CompileOptions::default()
        };
        let output = compile("$name::str\n<p>Hi {name}</p>", &options).unwrap();
        assert!(output.code.contains("interface ComponentProps {\n  name: string;\n}"));
        let map = output.position_map.unwrap();
        assert_eq!(map.source(), "greeting.hks");
        assert_eq!(map.original_line(4), Some(1));
        assert_eq!(map.original_line(7), Some(1));
    }

    #[test]
    fn test_plain_ignores_source_map() {
        let options = CompileOptions {
            source_map: true,
            ..CompileOptions::default()
        };
        let output = compile("<p></p>", &options).unwrap();
        assert!(output.position_map.is_none());
    }

    #[test]
    fn test_compile_error_aborts() {
        let error = compile("<div></span>", &CompileOptions::default()).unwrap_err();
        assert!(matches!(error, CompileError::MismatchedTag(_)));
    }
}
