//! Renders a reconstructed parse tree. The crate ships one implementor, a
//! text outline; [`TreeRenderer`] is the seam an external image renderer
//! (graphviz-backed, matching the original's `_plot_parse_tree`) would
//! implement without pulling a graphics dependency into this crate.

use std::fmt;
use std::fmt::Write as _;

use crate::tree::Node;

/// A render failure. Kept distinct from [`crate::error::Ll1Error`] since
/// rendering is a display-layer concern, not a pipeline-construction or
/// parse one.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RenderError(pub String);

impl fmt::Display for RenderError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "render error: {}", self.0)
    }
}

impl std::error::Error for RenderError {}

/// Something that can turn a parse tree into a human- or machine-facing
/// rendering. An image renderer (graphviz, dot, SVG) would implement this
/// trait alongside [`TextRenderer`].
pub trait TreeRenderer {
    fn render(&self, root: &Node) -> Result<String, RenderError>;
}

/// Renders the tree as an indented outline: non-terminal nodes on their own
/// line, children indented two spaces beneath, leaves shown quoted.
#[derive(Debug, Default, Clone, Copy)]
pub struct TextRenderer;

impl TextRenderer {
    fn write_node(&self, node: &Node, depth: usize, out: &mut String) {
        let indent = "  ".repeat(depth);
        if node.is_leaf {
            let _ = writeln!(out, "{indent}\"{}\"", node.symbol);
        } else {
            let _ = writeln!(out, "{indent}{}", node.symbol);
        }
        for child in &node.children {
            self.write_node(child, depth + 1, out);
        }
    }
}

impl TreeRenderer for TextRenderer {
    fn render(&self, root: &Node) -> Result<String, RenderError> {
        let mut out = String::new();
        self.write_node(root, 0, &mut out);
        Ok(out)
    }
}
