//! Owned binary search tree produced by the engine.
//!
//! Each [`Node`] exclusively owns its children through `Option<Box<Node>>`,
//! so the structure can hold neither cycles nor shared nodes. `Clone` is a
//! deep copy; [`Tree::take`] moves the nodes out and leaves the source empty.
//!
//! All traversals use an explicit stack, so degenerate (chain-shaped) trees
//! with many thousands of keys neither overflow the call stack while being
//! walked nor while being dropped.

use std::cmp::Ordering;
use std::fmt;

use crate::error::{ObstError, Result};
use crate::traits::KeyOrder;

/// A labelled tree node.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Node {
    pub label: String,
    pub left: Option<Box<Node>>,
    pub right: Option<Box<Node>>,
}

impl Node {
    pub fn new(label: impl Into<String>) -> Self {
        Self {
            label: label.into(),
            left: None,
            right: None,
        }
    }

    #[inline]
    pub fn is_leaf(&self) -> bool {
        self.left.is_none() && self.right.is_none()
    }
}

/// Container owning the root slot. Empty iff the root slot is unset.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct Tree {
    root: Option<Box<Node>>,
}

/// Shape statistics of a tree.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct TreeStats {
    /// Number of levels; 0 for an empty tree.
    pub height: usize,
    pub nodes: usize,
    pub leaves: usize,
    /// Mean node depth with the root at depth 0.
    pub average_depth: f64,
}

impl fmt::Display for TreeStats {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        writeln!(f, "Height of the Tree: {}", self.height)?;
        writeln!(f, "Total Number of Nodes: {}", self.nodes)?;
        writeln!(f, "Number of Leaf Nodes: {}", self.leaves)?;
        write!(f, "Average Depth of Nodes: {:.4}", self.average_depth)
    }
}

impl Tree {
    pub fn new() -> Self {
        Self { root: None }
    }

    pub fn from_root(root: Option<Box<Node>>) -> Self {
        Self { root }
    }

    #[inline]
    pub fn root(&self) -> Option<&Node> {
        self.root.as_deref()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.root.is_none()
    }

    /// Replace the root slot, returning the previous one.
    pub fn set_root(&mut self, root: Option<Box<Node>>) -> Option<Box<Node>> {
        std::mem::replace(&mut self.root, root)
    }

    /// Move the whole tree out, leaving `self` empty.
    pub fn take(&mut self) -> Tree {
        Tree {
            root: self.root.take(),
        }
    }

    /// Visit nodes in order, passing each node's depth (root = 0).
    pub fn walk_in_order<'a, F>(&'a self, mut visit: F)
    where
        F: FnMut(&'a Node, usize),
    {
        let mut stack: Vec<(&'a Node, usize)> = Vec::new();
        let mut cur = self.root.as_deref().map(|n| (n, 0usize));
        loop {
            while let Some((node, depth)) = cur {
                stack.push((node, depth));
                cur = node.left.as_deref().map(|l| (l, depth + 1));
            }
            let Some((node, depth)) = stack.pop() else {
                break;
            };
            visit(node, depth);
            cur = node.right.as_deref().map(|r| (r, depth + 1));
        }
    }

    /// Labels in order. For an engine-built tree this is the sorted key order.
    pub fn in_order(&self) -> Vec<&str> {
        let mut labels = Vec::new();
        self.walk_in_order(|node, _| labels.push(node.label.as_str()));
        labels
    }

    pub fn height(&self) -> usize {
        let mut height = 0;
        self.walk_in_order(|_, depth| height = height.max(depth + 1));
        height
    }

    pub fn node_count(&self) -> usize {
        let mut count = 0;
        self.walk_in_order(|_, _| count += 1);
        count
    }

    pub fn leaf_count(&self) -> usize {
        let mut count = 0;
        self.walk_in_order(|node, _| {
            if node.is_leaf() {
                count += 1;
            }
        });
        count
    }

    pub fn average_depth(&self) -> f64 {
        self.stats().average_depth
    }

    /// Height, node count, leaf count and average depth in a single pass.
    pub fn stats(&self) -> TreeStats {
        let (mut height, mut nodes, mut leaves, mut depth_sum) = (0, 0, 0, 0usize);
        self.walk_in_order(|node, depth| {
            height = height.max(depth + 1);
            nodes += 1;
            depth_sum += depth;
            if node.is_leaf() {
                leaves += 1;
            }
        });
        TreeStats {
            height,
            nodes,
            leaves,
            average_depth: if nodes == 0 {
                0.0
            } else {
                depth_sum as f64 / nodes as f64
            },
        }
    }

    /// BST lookup under `order`.
    pub fn contains<O: KeyOrder + ?Sized>(&self, label: &str, order: &O) -> bool {
        let mut cur = self.root.as_deref();
        while let Some(node) = cur {
            cur = match order.compare(label, &node.label) {
                Ordering::Less => node.left.as_deref(),
                Ordering::Greater => node.right.as_deref(),
                Ordering::Equal => return true,
            };
        }
        false
    }

    /// Sideways rendering: right subtree on top, two spaces per level.
    pub fn render_sideways(&self) -> String {
        let mut out = String::new();
        let mut stack: Vec<(&Node, usize)> = Vec::new();
        let mut cur = self.root.as_deref().map(|n| (n, 0usize));
        loop {
            while let Some((node, depth)) = cur {
                stack.push((node, depth));
                cur = node.right.as_deref().map(|r| (r, depth + 1));
            }
            let Some((node, depth)) = stack.pop() else {
                break;
            };
            out.push_str(&" ".repeat(2 * depth));
            out.push_str(&node.label);
            out.push('\n');
            cur = node.left.as_deref().map(|l| (l, depth + 1));
        }
        out
    }

    /// Expected search cost of this tree under `p` (with `p[0]` unused) and `q`.
    ///
    /// A key at depth `d` (root = 1) costs `p * d`. A gap hanging off a leaf
    /// is charged at the leaf's depth; a gap hanging off an internal node at
    /// the node's depth + 1. This is the measure minimised by
    /// [`ObstEngine`](crate::engine::ObstEngine), so for any tree it
    /// reconstructs the result equals the optimal cost `E[1][n]`.
    pub fn expected_cost(&self, p: &[f64], q: &[f64]) -> Result<f64> {
        if p.is_empty() || p.len() != q.len() {
            return Err(ObstError::ShapeMismatch {
                p: p.len(),
                q: q.len(),
            });
        }
        let keys = p.len() - 1;
        let nodes = self.node_count();
        if nodes != keys {
            return Err(ObstError::LabelCountMismatch {
                labels: nodes,
                keys,
            });
        }
        if nodes == 0 {
            return Ok(0.0);
        }

        let mut rank = 0usize;
        let mut gap = 0usize;
        let mut total = 0.0;
        self.walk_in_order(|node, depth| {
            let level = (depth + 1) as f64;
            let gap_level = if node.is_leaf() { level } else { level + 1.0 };
            if node.left.is_none() {
                total += q[gap] * gap_level;
                gap += 1;
            }
            rank += 1;
            total += p[rank] * level;
            if node.right.is_none() {
                total += q[gap] * gap_level;
                gap += 1;
            }
        });
        Ok(total)
    }
}

impl Drop for Tree {
    fn drop(&mut self) {
        let mut stack: Vec<Box<Node>> = self.root.take().into_iter().collect();
        while let Some(mut node) = stack.pop() {
            stack.extend(node.left.take());
            stack.extend(node.right.take());
        }
    }
}
