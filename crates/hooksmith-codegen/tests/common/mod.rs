//! Shared component sources for integration tests.

#![allow(dead_code)]

pub const COUNTER: &str = "\
@count = 0
!click = count++
<btn @click=click>{count}</btn>
";

pub const TODO_LIST: &str = r#"// A small todo list
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

pub const HOOK_TOUR: &str = "\
$onSave
@query = ''
@visible:deferred = query
@likes:optimistic = {likeCount, (state, n) => state + n}
@search:transition
@count:reducer::num = {0, {inc: state + 1, reset: 0}}
##fieldId
sync online::bool = {subscribe, getOnline}
action saved = {save, null}
?theme::Theme = ThemeContext
#box
^api = {focus: () => box.current.focus(), clear: () => setQuery('')}
&submit = (e) => onSave(query)
~~ measure(box)
<>
  <lbl for={fieldId}>Search</lbl>
  <inp id={fieldId} val={query} />
  <p>{visible}</p>
</>
";
