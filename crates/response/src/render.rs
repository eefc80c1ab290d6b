//! HTML rendering of justification forests
//!
//! Produces the collapsible nested-list markup used by interview pages:
//! the root list is `<ul id="explanation" class="active">`, deeper lists are
//! `<ul class="nested">`, and a node with children wraps its text in a
//! `caret` span that toggles its child list.

use crate::tree::JustificationNode;

const ROOT_LIST_OPEN: &str = "<ul id=\"explanation\" class=\"active\">";
const NESTED_LIST_OPEN: &str = "<ul class=\"nested\">";
const LIST_CLOSE: &str = "</ul>";

/// Render a forest as a nested HTML list
pub fn render_explanation(forest: &[JustificationNode]) -> String {
    let mut html = String::new();
    render_list(&mut html, forest, ROOT_LIST_OPEN);
    html
}

fn render_list(html: &mut String, nodes: &[JustificationNode], open: &str) {
    html.push_str(open);
    for node in nodes {
        match node {
            JustificationNode::Leaf { text } => {
                html.push_str("<li>");
                html.push_str(&escape_html(text));
                html.push_str("</li>");
            }
            JustificationNode::Internal { text, children } => {
                html.push_str("<li><span class=\"caret\">");
                html.push_str(&escape_html(text));
                html.push_str("</span>");
                render_list(html, children, NESTED_LIST_OPEN);
                html.push_str("</li>");
            }
        }
    }
    html.push_str(LIST_CLOSE);
}

/// Escape text for use inside HTML element content or attribute values
pub fn escape_html(text: &str) -> String {
    let mut escaped = String::with_capacity(text.len());
    for c in text.chars() {
        match c {
            '&' => escaped.push_str("&amp;"),
            '<' => escaped.push_str("&lt;"),
            '>' => escaped.push_str("&gt;"),
            '"' => escaped.push_str("&quot;"),
            _ => escaped.push(c),
        }
    }
    escaped
}
