//! Graphviz DOT emission for built trees.
//!
//! Nodes are identified by their quoted labels; every absent child becomes a
//! point-shaped `nullK` node so the rendered picture keeps left/right
//! positions visible. Rendering the text to an image is left to the caller.

use std::fmt::Write as _;
use std::fs::File;
use std::io::{BufWriter, Write};
use std::path::Path;

use crate::error::Result;
use crate::tree::{Node, Tree};

/// Graph, node and edge attributes written into the DOT header.
#[derive(Debug, Clone, PartialEq)]
pub struct DotStyle {
    pub graph_label: String,
    pub graph_font_size: u32,
    pub node_shape: String,
    pub node_style: String,
    pub node_color: String,
    pub node_font_color: String,
    pub node_font_size: u32,
    pub edge_color: String,
}

impl Default for DotStyle {
    fn default() -> Self {
        Self {
            graph_label: "Optimal Binary Search Tree".to_string(),
            graph_font_size: 20,
            node_shape: "circle".to_string(),
            node_style: "filled".to_string(),
            node_color: "lightblue".to_string(),
            node_font_color: "black".to_string(),
            node_font_size: 12,
            edge_color: "gray".to_string(),
        }
    }
}

fn quote(label: &str) -> String {
    let mut out = String::with_capacity(label.len() + 2);
    out.push('"');
    for c in label.chars() {
        if c == '"' || c == '\\' {
            out.push('\\');
        }
        out.push(c);
    }
    out.push('"');
    out
}

enum Step<'a> {
    Left(&'a Node),
    Right(&'a Node),
}

/// DOT description of `tree`.
pub fn to_dot(tree: &Tree, style: &DotStyle) -> String {
    let mut out = String::new();
    let _ = writeln!(out, "digraph OBST {{");
    let _ = writeln!(out, "  label={};", quote(&style.graph_label));
    let _ = writeln!(out, "  labelloc=\"t\";");
    let _ = writeln!(out, "  fontsize={};", style.graph_font_size);
    let _ = writeln!(
        out,
        "  node [shape={}, style={}, color={}, fontcolor={}, fontsize={}];",
        style.node_shape,
        style.node_style,
        style.node_color,
        style.node_font_color,
        style.node_font_size
    );
    let _ = writeln!(out, "  edge [color={}];", style.edge_color);

    if let Some(root) = tree.root() {
        if root.is_leaf() {
            let _ = writeln!(out, "  {};", quote(&root.label));
        }
        let mut null_count = 0usize;
        let mut null_edge = |out: &mut String, parent: &str| {
            let _ = writeln!(out, "  null{null_count} [shape=point];");
            let _ = writeln!(out, "  {parent} -> null{null_count};");
            null_count += 1;
        };
        // Depth-first, a left subtree is finished before its parent's right edge.
        let mut stack = vec![Step::Left(root)];
        while let Some(step) = stack.pop() {
            match step {
                Step::Left(node) => {
                    stack.push(Step::Right(node));
                    match node.left.as_deref() {
                        Some(left) => {
                            let _ = writeln!(out, "  {} -> {};", quote(&node.label), quote(&left.label));
                            stack.push(Step::Left(left));
                        }
                        None => null_edge(&mut out, &quote(&node.label)),
                    }
                }
                Step::Right(node) => match node.right.as_deref() {
                    Some(right) => {
                        let _ = writeln!(out, "  {} -> {};", quote(&node.label), quote(&right.label));
                        stack.push(Step::Left(right));
                    }
                    None => null_edge(&mut out, &quote(&node.label)),
                },
            }
        }
    }

    out.push_str("}\n");
    out
}

/// Write the DOT description of `tree` to `path`.
pub fn write_dot_file(path: impl AsRef<Path>, tree: &Tree, style: &DotStyle) -> Result<()> {
    let mut writer = BufWriter::new(File::create(path)?);
    writer.write_all(to_dot(tree, style).as_bytes())?;
    writer.flush()?;
    Ok(())
}
