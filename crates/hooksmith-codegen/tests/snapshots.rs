//! Snapshot tests for generated modules.

mod common;

use common::{HOOK_TOUR, TODO_LIST};
use hooksmith_codegen::{compile, CompileOptions};

fn compile_snapshot(name: &str, source: &str, options: CompileOptions) {
    let output = compile(source, &options).unwrap().code;
    insta::assert_snapshot!(name, output);
}

#[test]
fn test_todo_list_plain() {
    compile_snapshot("todo_list_plain", TODO_LIST, CompileOptions::default());
}

#[test]
fn test_todo_list_typed() {
    compile_snapshot(
        "todo_list_typed",
        TODO_LIST,
        CompileOptions {
            component_name: Some("TodoList".to_string()),
            typed: true,
            ..CompileOptions::default()
        },
    );
}

#[test]
fn test_hook_tour_plain() {
    compile_snapshot("hook_tour_plain", HOOK_TOUR, CompileOptions::default());
}

#[test]
fn test_hook_tour_typed() {
    compile_snapshot(
        "hook_tour_typed",
        HOOK_TOUR,
        CompileOptions {
            typed: true,
            ..CompileOptions::default()
        },
    );
}
