//! Plain (JSX) generation.

use crate::emit::{Dialect, Emitter};
use crate::naming::{reducer_fn_name, INDEX_NAME, ITEM_NAME};
use hooksmith_parser::{Component, Reducer, TypeNode};

/// Untyped output: no type arguments and no props type.
pub(crate) struct Plain;

impl Dialect for Plain {
    fn type_args(&self, _ty: Option<&TypeNode>) -> String {
        String::new()
    }

    fn props_block(&self, _component: &Component) -> Vec<String> {
        Vec::new()
    }

    fn props_annotation(&self, _component: &Component) -> String {
        String::new()
    }

    fn reducer_signature(&self, reducer: &Reducer) -> String {
        format!("function {}(state, action) {{", reducer_fn_name(&reducer.name))
    }

    fn change_event_param(&self, _tag: &str) -> String {
        "e".to_string()
    }

    fn each_params(&self, _item_type: Option<&TypeNode>) -> String {
        format!("({ITEM_NAME}, {INDEX_NAME})")
    }
}

/// Generates a plain hooks component module for `component`.
///
/// Declared types are ignored.
pub fn generate(component: &Component) -> String {
    let emitted = Emitter::new(&Plain, component).emit();
    tracing::debug!(
        component = %component.name,
        mappings = emitted.mappings.len(),
        bytes = emitted.code.len(),
        "generated plain module"
    );
    emitted.code
}
