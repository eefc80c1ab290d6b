//! Justification tree reconstruction
//!
//! The solver prints a justification tree as one goal per line, nested by
//! indentation in steps of four spaces. A line's subtree is the run of
//! following lines indented deeper than it, up to the next line at the same
//! depth or shallower.

use serde::{Deserialize, Serialize};

/// Columns per nesting level
pub const INDENT_WIDTH: usize = 4;

/// Line ending the justification content; it and everything after it is dropped
pub const GLOBAL_CONSTRAINTS_SENTINEL: &str = "The global constraints hold";

/// Prefix of the solver's bookkeeping lines for abducible atoms
pub const ABDUCIBLE_SENTINEL: &str = "'abducible' holds";

/// Trailing text of a goal the solver justifies with sub-goals
const DERIVATION_MARKERS: [&str; 2] = ["because", ":-"];

/// One node of a justification forest
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum JustificationNode {
    /// A goal justified without sub-goals
    Leaf { text: String },
    /// A goal followed by the sub-goals that justify it
    Internal {
        text: String,
        children: Vec<JustificationNode>,
    },
}

impl JustificationNode {
    pub fn leaf(text: impl Into<String>) -> Self {
        JustificationNode::Leaf { text: text.into() }
    }

    pub fn internal(text: impl Into<String>, children: Vec<JustificationNode>) -> Self {
        JustificationNode::Internal {
            text: text.into(),
            children,
        }
    }

    pub fn text(&self) -> &str {
        match self {
            JustificationNode::Leaf { text } | JustificationNode::Internal { text, .. } => text,
        }
    }

    pub fn children(&self) -> &[JustificationNode] {
        match self {
            JustificationNode::Leaf { .. } => &[],
            JustificationNode::Internal { children, .. } => children,
        }
    }

    pub fn is_leaf(&self) -> bool {
        matches!(self, JustificationNode::Leaf { .. })
    }

    /// Whether the text reads as a derivation (`..., because` / `... :-`).
    ///
    /// A rendering hint only; tree shape comes from indentation.
    pub fn has_derivation_marker(&self) -> bool {
        let text = self.text().trim_end();
        DERIVATION_MARKERS.iter().any(|m| text.ends_with(m))
    }

    /// Number of nodes in this subtree, the node itself included
    pub fn size(&self) -> usize {
        1 + self.children().iter().map(JustificationNode::size).sum::<usize>()
    }

    /// Nesting depth of this subtree (a leaf has depth 1)
    pub fn depth(&self) -> usize {
        1 + self
            .children()
            .iter()
            .map(JustificationNode::depth)
            .max()
            .unwrap_or(0)
    }
}

/// A justification line with its nesting depth
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct TreeLine {
    pub depth: usize,
    pub text: String,
}

/// Turn raw tree lines into depth-annotated lines.
///
/// Stops at the global-constraints sentinel, skips blank lines and
/// abducible bookkeeping lines, and strips one trailing period.
pub fn tree_lines<'a, I>(lines: I) -> Vec<TreeLine>
where
    I: IntoIterator<Item = &'a str>,
{
    let mut output = Vec::new();
    for line in lines {
        let content = line.trim_start_matches(' ');
        let trimmed = content.trim();
        if trimmed.starts_with(GLOBAL_CONSTRAINTS_SENTINEL) {
            break;
        }
        if trimmed.is_empty() || trimmed.starts_with(ABDUCIBLE_SENTINEL) {
            continue;
        }

        let indent = line.len() - content.len();
        let text = trimmed.strip_suffix('.').unwrap_or(trimmed);
        output.push(TreeLine {
            depth: indent / INDENT_WIDTH,
            text: text.to_string(),
        });
    }
    output
}

/// Build a forest from depth-annotated lines.
///
/// Keeps a stack of open nodes, one per enclosing level. Each line first
/// closes every open node at its depth or deeper, then opens itself under
/// whatever remains on top.
pub fn build_forest<I>(lines: I) -> Vec<JustificationNode>
where
    I: IntoIterator<Item = TreeLine>,
{
    let mut roots = Vec::new();
    let mut open: Vec<(usize, String, Vec<JustificationNode>)> = Vec::new();

    for line in lines {
        while open.last().is_some_and(|(depth, _, _)| *depth >= line.depth) {
            close_top(&mut open, &mut roots);
        }
        open.push((line.depth, line.text, Vec::new()));
    }
    while !open.is_empty() {
        close_top(&mut open, &mut roots);
    }

    roots
}

fn close_top(
    open: &mut Vec<(usize, String, Vec<JustificationNode>)>,
    roots: &mut Vec<JustificationNode>,
) {
    let Some((_, text, children)) = open.pop() else {
        return;
    };
    let node = if children.is_empty() {
        JustificationNode::leaf(text)
    } else {
        JustificationNode::internal(text, children)
    };
    match open.last_mut() {
        Some((_, _, siblings)) => siblings.push(node),
        None => roots.push(node),
    }
}

/// Parse a justification tree block into a forest
pub fn parse_tree(block: &str) -> Vec<JustificationNode> {
    build_forest(tree_lines(block.lines()))
}
