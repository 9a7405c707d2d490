//! Markup rendering.
//!
//! Children of an element or fragment render in block mode (one child per
//! line) when they contain an element, fragment or each-loop and no text;
//! otherwise they stay on one line with their parent.

use crate::emit::{Dialect, INDENT};
use crate::expr::{quote, render_expression, render_name};
use crate::lower::lower_handler;
use crate::naming::{attribute_name, event_attribute, resolve_tag, setter_name, INDEX_NAME};
use hooksmith_parser::{
    Attribute, AttributeValue, Component, EachLoop, Element, EventHandler, Markup,
};
use smol_str::SmolStr;

pub(crate) struct MarkupWriter<'a, D: Dialect> {
    dialect: &'a D,
    component: &'a Component,
}

fn use_block(children: &[Markup]) -> bool {
    let has_nested = children
        .iter()
        .any(|c| matches!(c, Markup::Element(_) | Markup::Fragment(_) | Markup::Each(_)));
    let has_text = children.iter().any(|c| matches!(c, Markup::Text(_)));
    has_nested && !has_text
}

/// Wraps characters JSX reads as syntax in string expressions.
fn escape_text(text: &str) -> String {
    let mut out = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '{' | '}' | '<' | '>' => {
                out.push_str("{'");
                out.push(c);
                out.push_str("'}");
            }
            c => out.push(c),
        }
    }
    out
}

impl<'a, D: Dialect> MarkupWriter<'a, D> {
    pub(crate) fn new(dialect: &'a D, component: &'a Component) -> Self {
        Self { dialect, component }
    }

    /// Renders `markup` as lines indented `depth` levels, joined by `\n`.
    pub(crate) fn render_root(&self, markup: &Markup, depth: usize) -> String {
        let mut lines = Vec::new();
        self.block(markup, depth, &[], &mut lines);
        lines.join("\n")
    }

    fn block(&self, markup: &Markup, depth: usize, items: &[SmolStr], out: &mut Vec<String>) {
        let indent = INDENT.repeat(depth);
        match markup {
            Markup::Element(element) => self.element_block(element, depth, items, false, out),
            Markup::Fragment(fragment) if use_block(&fragment.children) => {
                out.push(format!("{indent}<>"));
                for child in &fragment.children {
                    self.block(child, depth + 1, items, out);
                }
                out.push(format!("{indent}</>"));
            }
            Markup::Each(each) => self.each_block(each, depth, items, out),
            _ => out.push(format!("{indent}{}", self.inline(markup, items))),
        }
    }

    fn inline(&self, markup: &Markup, items: &[SmolStr]) -> String {
        match markup {
            Markup::Element(element) => self.element_inline(element, items, false),
            Markup::Fragment(fragment) => {
                format!("<>{}</>", self.inline_children(&fragment.children, items))
            }
            Markup::Interpolation(expr) => format!("{{{}}}", render_expression(expr, items)),
            Markup::Text(text) => escape_text(text),
            Markup::Each(each) => {
                let (source, params, inner) = self.each_parts(each, items);
                let template = self.element_inline(&each.template, &inner, true);
                format!("{{{source}.map({params} => {template})}}")
            }
        }
    }

    fn inline_children(&self, children: &[Markup], items: &[SmolStr]) -> String {
        children
            .iter()
            .map(|child| self.inline(child, items))
            .collect()
    }

    fn element_block(
        &self,
        element: &Element,
        depth: usize,
        items: &[SmolStr],
        keyed: bool,
        out: &mut Vec<String>,
    ) {
        let indent = INDENT.repeat(depth);
        if element.self_closing || !use_block(&element.children) {
            out.push(format!(
                "{indent}{}",
                self.element_inline(element, items, keyed)
            ));
            return;
        }

        out.push(format!("{indent}{}>", self.open_tag(element, items, keyed)));
        for child in &element.children {
            self.block(child, depth + 1, items, out);
        }
        out.push(format!("{indent}</{}>", resolve_tag(&element.tag)));
    }

    fn element_inline(&self, element: &Element, items: &[SmolStr], keyed: bool) -> String {
        let open = self.open_tag(element, items, keyed);
        if element.self_closing {
            return format!("{open} />");
        }
        format!(
            "{open}>{}</{}>",
            self.inline_children(&element.children, items),
            resolve_tag(&element.tag)
        )
    }

    /// `<tag attrs` without the closing `>`.
    fn open_tag(&self, element: &Element, items: &[SmolStr], keyed: bool) -> String {
        let tag = resolve_tag(&element.tag);
        let mut open = format!("<{tag}");
        if keyed {
            open.push_str(&format!(" key={{{INDEX_NAME}}}"));
        }
        for attribute in &element.attributes {
            open.push(' ');
            open.push_str(&self.attribute(attribute, tag, items));
        }
        open
    }

    fn attribute(&self, attribute: &Attribute, tag: &str, items: &[SmolStr]) -> String {
        let name = attribute.name.as_str();
        match &attribute.value {
            AttributeValue::Event(EventHandler::Named(handler)) => {
                format!("{}={{{}}}", event_attribute(name), render_name(handler, items))
            }
            AttributeValue::Event(EventHandler::Inline(expr)) => format!(
                "{}={{{}}}",
                event_attribute(name),
                lower_handler(expr, self.component, items)
            ),
            AttributeValue::Expression(expr) if name == "val" => match expr.as_identifier() {
                Some(bound) => format!(
                    "value={{{}}} onChange={{({}) => {}(e.target.value)}}",
                    render_name(bound, items),
                    self.dialect.change_event_param(tag),
                    setter_name(bound)
                ),
                None => format!("value={{{}}}", render_expression(expr, items)),
            },
            AttributeValue::Expression(expr) => {
                format!("{}={{{}}}", attribute_name(name), render_expression(expr, items))
            }
            AttributeValue::Text(text) if text.contains('"') => {
                format!("{}={{{}}}", attribute_name(name), quote(text))
            }
            AttributeValue::Text(text) => format!("{}=\"{text}\"", attribute_name(name)),
            AttributeValue::True => attribute_name(name).to_string(),
        }
    }

    /// Source expression, callback parameters, and the renamed items inside
    /// the template.
    fn each_parts(&self, each: &EachLoop, items: &[SmolStr]) -> (String, String, Vec<SmolStr>) {
        let source = render_expression(&each.source, items);
        let params = self.dialect.each_params(each.item_type.as_ref());
        let mut inner = items.to_vec();
        inner.push(each.binding.clone());
        (source, params, inner)
    }

    fn each_block(&self, each: &EachLoop, depth: usize, items: &[SmolStr], out: &mut Vec<String>) {
        let indent = INDENT.repeat(depth);
        let (source, params, inner) = self.each_parts(each, items);

        let mut template = Vec::new();
        self.element_block(&each.template, depth + 1, &inner, true, &mut template);
        match template.as_slice() {
            [single] => out.push(format!(
                "{indent}{{{source}.map({params} => {})}}",
                single.trim_start()
            )),
            _ => {
                out.push(format!("{indent}{{{source}.map({params} => ("));
                out.extend(template);
                out.push(format!("{indent}))}}"));
            }
        }
    }
}
