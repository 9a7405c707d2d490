//! End-to-end parsing tests over complete components.

use hooksmith_parser::{
    parse_source, tokenize, AttributeValue, CompileError, DeclarationKind, Expression, Markup,
    ParseErrorKind,
};
use pretty_assertions::assert_eq;

const TODO_LIST: &str = r#"// A small todo list
$title::str = "Todos"
@todos::string[] = []
@draft = ''
%remaining = todos.length
!add = todos.push(draft)
&clear = () => setTodos([])
~ [remaining] log(remaining)
#input::HTMLInputElement = null

<div class="todo">
  <h1>{title}</h1>
  <inp val={draft} />
  <btn @click=add>Add</btn>
  <ul>
    <each todo::str in todos>
      <li>{todo}</li>
    </each>
  </ul>
  <p>{remaining} left</p>
</div>
"#;

#[test]
fn test_todo_list_declarations() {
    let component = parse_source(TODO_LIST).unwrap();

    let counts: Vec<_> = [
        DeclarationKind::Prop,
        DeclarationKind::State,
        DeclarationKind::Memo,
        DeclarationKind::Event,
        DeclarationKind::Callback,
        DeclarationKind::Effect,
        DeclarationKind::Ref,
        DeclarationKind::Reducer,
    ]
    .iter()
    .map(|kind| component.count(*kind))
    .collect();
    assert_eq!(counts, vec![1, 2, 1, 1, 1, 1, 1, 0]);

    let lines: Vec<_> = component.states.iter().map(|s| s.line).collect();
    assert_eq!(lines, vec![3, 4]);
    assert!(component.states[0].is_collection());
    assert!(!component.states[1].is_collection());
}

#[test]
fn test_todo_list_markup() {
    let component = parse_source(TODO_LIST).unwrap();
    let Markup::Element(root) = &component.markup else {
        panic!("expected element root");
    };
    assert_eq!(root.tag, "div");
    assert_eq!(root.line, 11);
    assert_eq!(
        root.attributes[0].value,
        AttributeValue::Text("todo".into())
    );

    let tags: Vec<_> = root
        .children
        .iter()
        .filter_map(|child| match child {
            Markup::Element(element) => Some(element.tag.as_str()),
            _ => None,
        })
        .collect();
    assert_eq!(tags, vec!["h1", "inp", "btn", "ul", "p"]);

    let Markup::Element(paragraph) = &root.children[4] else {
        panic!("expected paragraph");
    };
    assert_eq!(
        paragraph.children,
        vec![
            Markup::Interpolation(Expression::ident("remaining")),
            Markup::Text(" left".into()),
        ]
    );
}

#[test]
fn test_tokenizing_is_deterministic() {
    assert_eq!(tokenize(TODO_LIST).unwrap(), tokenize(TODO_LIST).unwrap());
}

#[test]
fn test_errors_carry_positions() {
    let error = parse_source("@count = 0\n<div>\n  <p>{count}</p>\n</span>").unwrap_err();
    assert!(matches!(error, CompileError::MismatchedTag(_)));
    assert_eq!(error.line(), 4);
    assert_eq!(error.column(), 3);

    let error = parse_source("@count = \n<p></p>").unwrap_err();
    let CompileError::Parse(parse_error) = &error else {
        panic!("expected parse error");
    };
    assert_eq!(
        parse_error.kind,
        ParseErrorKind::UnexpectedToken {
            expected: "expression".to_string(),
            found: "newline".to_string(),
        }
    );
    assert_eq!(error.to_string(), "unexpected newline, expected expression at line 1");
}

#[test]
fn test_error_messages() {
    let message = |source: &str| parse_source(source).unwrap_err().to_string();

    insta::assert_snapshot!(
        message("@x:weird = 1\n<p></p>"),
        @"unknown state modifier ':weird' at line 1"
    );
    insta::assert_snapshot!(
        message("<div></span>"),
        @"mismatched closing tag at line 1: expected </div>, found </span>"
    );
    insta::assert_snapshot!(
        message("@x = 0\n<p></p>\n<p></p>"),
        @"component already has a markup tree at line 3"
    );
}

#[test]
fn test_nested_each_cannot_read_outer_variable() {
    let source = "\
@rows = []
<table>
  <each row in rows>
    <tr>
      <each cell in row.cells>
        <td>{cell}{row.id}</td>
      </each>
    </tr>
  </each>
</table>";
    let error = parse_source(source).unwrap_err();
    let CompileError::Parse(parse_error) = &error else {
        panic!("expected parse error");
    };
    assert_eq!(
        parse_error.kind,
        ParseErrorKind::OuterLoopBinding { name: "row".into() }
    );
    assert_eq!((error.line(), error.column()), (5, 8));
}

#[test]
fn test_nested_each_may_use_outer_variable_as_source() {
    let source = "\
@rows = []
<table>
  <each row in rows>
    <tr>
      <each cell in row.cells>
        <td @click={(row) => pick(row, cell)}>{cell}</td>
      </each>
    </tr>
  </each>
</table>";
    assert!(parse_source(source).is_ok());
}
