//! Optimal binary search tree engine.
//!
//! This module implements the two-phase algorithm:
//! 1. An interval DP over increasing subtree length that fills the cost (E),
//!    weight (W) and root tables.
//! 2. A reconstruction that walks the root table to materialise a [`Tree`]
//!    whose in-order traversal is the sorted label order.
//!
//! Indices inside the tables are 1-based key ranks with a sentinel row and
//! column for empty ranges; labels are 0-based. That translation stays in
//! this module: callers hand in slices and get back a tree or the
//! [`ObstTables`] accessors, which reject cells outside the meaningful
//! triangle.
//!
//! Cost: O(n²) memory for the three tables. With [`RootSearch::Knuth`] the
//! candidate roots for `[i, j]` are limited to `[Root[i][j-1], Root[i+1][j]]`;
//! over one subtree length those ranges telescope to O(n) work, so the whole
//! build is O(n²). [`RootSearch::Full`] tries every root and is O(n³).

use std::str::FromStr;

use crate::error::{ObstError, Result};
use crate::table::Table;
use crate::tree::{Node, Tree};
use crate::utils::cost_sentinel;
#[cfg(feature = "parallel")]
use rayon::prelude::*;

/// Candidate-root strategy for the general case of the recurrence.
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum RootSearch {
    /// Only roots in `[Root[i][j-1], Root[i+1][j]]`.
    #[default]
    Knuth,
    /// Every root in `[i, j]`.
    ///
    /// Gives the exhaustive optimum, but with non-zero gap probabilities the
    /// root table is not guaranteed to be monotone: `Root[i][j-1] <= Root[i][j]
    /// <= Root[i+1][j]` only holds for [`RootSearch::Knuth`].
    Full,
}

impl FromStr for RootSearch {
    type Err = ObstError;

    fn from_str(value: &str) -> Result<Self> {
        match value {
            "knuth" => Ok(Self::Knuth),
            "full" => Ok(Self::Full),
            other => Err(ObstError::UnknownRootSearch(other.to_string())),
        }
    }
}

impl RootSearch {
    pub fn label(&self) -> &'static str {
        match self {
            RootSearch::Knuth => "knuth",
            RootSearch::Full => "full",
        }
    }
}

/// The E, W and Root tables for one construction call.
#[derive(Debug, Clone, PartialEq)]
pub struct ObstTables {
    n: usize,
    cost: Table<f64>,
    weight: Table<f64>,
    root: Table<Option<usize>>,
}

impl ObstTables {
    /// Number of keys.
    #[inline]
    pub fn n(&self) -> usize {
        self.n
    }

    /// True when built for zero keys.
    #[inline]
    pub fn is_empty(&self) -> bool {
        self.n == 0
    }

    /// `E[i][j]`: minimum expected cost over keys `i..=j` (`j = i - 1` is empty).
    pub fn cost(&self, i: usize, j: usize) -> Option<f64> {
        self.cost.is_meaningful(i, j).then(|| self.cost[(i, j)])
    }

    /// `W[i][j]`: total probability mass of keys `i..=j` and their gaps.
    pub fn weight(&self, i: usize, j: usize) -> Option<f64> {
        self.weight.is_meaningful(i, j).then(|| self.weight[(i, j)])
    }

    /// `Root[i][j]`: 1-based rank of the optimal root over `i..=j`.
    ///
    /// `None` for empty ranges and for cells the search left unset.
    pub fn root(&self, i: usize, j: usize) -> Option<usize> {
        if i == 0 || i > j || !self.root.is_meaningful(i, j) {
            return None;
        }
        self.root[(i, j)]
    }

    /// `E[1][n]`, or the single gap probability when there are no keys.
    pub fn optimal_cost(&self) -> f64 {
        self.cost[(1, self.n)]
    }

    /// `W[1][n]`.
    pub fn total_weight(&self) -> f64 {
        self.weight[(1, self.n)]
    }

    /// 0-based label index of the overall root.
    pub fn top_root(&self) -> Option<usize> {
        self.root(1, self.n).map(|r| r - 1)
    }

    pub fn cost_table(&self) -> &Table<f64> {
        &self.cost
    }

    pub fn weight_table(&self) -> &Table<f64> {
        &self.weight
    }

    pub fn root_table(&self) -> &Table<Option<usize>> {
        &self.root
    }

    /// Materialise the optimal tree for `labels` (sorted, `labels[r-1]` is key `r`).
    pub fn tree<S: AsRef<str>>(&self, labels: &[S]) -> Result<Tree> {
        if labels.len() != self.n {
            return Err(ObstError::LabelCountMismatch {
                labels: labels.len(),
                keys: self.n,
            });
        }
        Ok(Tree::from_root(reconstruct(&self.root, labels, 1, self.n)))
    }

    /// The three tables as triangular text blocks.
    pub fn render(&self) -> String {
        format!(
            "Cost Table (E):\n{}\nWeight Table (W):\n{}\nRoot Table:\n{}",
            self.cost, self.weight, self.root
        )
    }
}

/// OBST construction engine.
///
/// Typical usage:
/// ```
/// use obst_dp::ObstEngine;
///
/// let labels = ["A", "B", "C"];
/// let p = [0.0, 0.3, 0.1, 0.1];
/// let q = [0.1, 0.1, 0.1, 0.2];
/// let (cost, tree) = ObstEngine::new().run(&p, &q, &labels).unwrap();
/// assert!((cost - 1.9).abs() < 1e-9);
/// assert_eq!(tree.root().map(|n| n.label.as_str()), Some("B"));
/// ```
#[derive(Debug, Clone, Copy, Default)]
pub struct ObstEngine {
    search: RootSearch,
}

impl ObstEngine {
    /// Engine with the Knuth-bounded root search.
    pub fn new() -> Self {
        Self::default()
    }

    pub fn with_root_search(search: RootSearch) -> Self {
        Self { search }
    }

    pub fn root_search(&self) -> RootSearch {
        self.search
    }

    /// Fill E, W and Root for `p` (with `p[0]` unused) and `q`.
    ///
    /// Only shapes are validated: `|p| == |q| >= 1`. Probabilities are not
    /// required to lie in `[0, 1]` or to sum to one.
    pub fn build_tables(&self, p: &[f64], q: &[f64]) -> Result<ObstTables> {
        if p.is_empty() || p.len() != q.len() {
            return Err(ObstError::ShapeMismatch {
                p: p.len(),
                q: q.len(),
            });
        }
        let n = p.len() - 1;
        let sentinel = cost_sentinel(p, q);

        let mut tables = ObstTables {
            n,
            cost: Table::new(n + 2, 0.0),
            weight: Table::new(n + 2, 0.0),
            root: Table::new(n + 2, None),
        };

        for a in 1..=n {
            tables.weight[(a, a - 1)] = q[a - 1];
            tables.cost[(a, a - 1)] = q[a - 1];
            tables.root[(a, a)] = Some(a);
            tables.weight[(a, a)] = q[a - 1] + p[a] + q[a];
            tables.cost[(a, a)] = tables.weight[(a, a)];
        }
        tables.weight[(n + 1, n)] = q[n];
        tables.cost[(n + 1, n)] = q[n];

        for len in 2..=n {
            #[cfg(feature = "tracing")]
            let span = tracing::trace_span!("solve_diagonal", len);
            #[cfg(feature = "tracing")]
            let _enter = span.enter();

            let cells = self.solve_diagonal(&tables, p, q, len, sentinel);
            for (offset, cell) in cells.into_iter().enumerate() {
                let i = offset + 1;
                let j = i + len - 1;
                tables.weight[(i, j)] = cell.weight;
                tables.cost[(i, j)] = cell.cost;
                tables.root[(i, j)] = cell.root;
            }
        }

        Ok(tables)
    }

    #[cfg(not(feature = "parallel"))]
    fn solve_diagonal(
        &self,
        tables: &ObstTables,
        p: &[f64],
        q: &[f64],
        len: usize,
        sentinel: f64,
    ) -> Vec<Cell> {
        let n = tables.n;
        (1..=n - len + 1)
            .map(|i| self.solve_cell(tables, p, q, i, i + len - 1, sentinel))
            .collect()
    }

    /// Cells of one length only read shorter ranges, so a diagonal is
    /// embarrassingly parallel; results are written back in order.
    #[cfg(feature = "parallel")]
    fn solve_diagonal(
        &self,
        tables: &ObstTables,
        p: &[f64],
        q: &[f64],
        len: usize,
        sentinel: f64,
    ) -> Vec<Cell> {
        let n = tables.n;
        (1..=n - len + 1)
            .into_par_iter()
            .map(|i| self.solve_cell(tables, p, q, i, i + len - 1, sentinel))
            .collect()
    }

    /// Solve `[i, j]` for `j > i`. Ties keep the smallest root (strict `<`).
    #[inline]
    fn solve_cell(
        &self,
        tables: &ObstTables,
        p: &[f64],
        q: &[f64],
        i: usize,
        j: usize,
        sentinel: f64,
    ) -> Cell {
        let weight = tables.weight[(i, j - 1)] + p[j] + q[j];
        let (lo, hi) = match self.search {
            RootSearch::Knuth => match (tables.root[(i, j - 1)], tables.root[(i + 1, j)]) {
                (Some(lo), Some(hi)) => (lo, hi),
                _ => {
                    return Cell {
                        weight,
                        cost: sentinel,
                        root: None,
                    }
                }
            },
            RootSearch::Full => (i, j),
        };

        let mut best = Cell {
            weight,
            cost: sentinel,
            root: None,
        };
        for r in lo..=hi {
            let cost = tables.cost[(i, r - 1)] + tables.cost[(r + 1, j)] + weight;
            if cost < best.cost {
                best.cost = cost;
                best.root = Some(r);
            }
        }
        best
    }

    /// Build the tables and reconstruct the tree.
    ///
    /// Returns `(E[1][n], tree)`. With zero keys the tree is empty.
    pub fn run<S: AsRef<str>>(&self, p: &[f64], q: &[f64], labels: &[S]) -> Result<(f64, Tree)> {
        let (tables, tree) = self.run_with_tables(p, q, labels)?;
        Ok((tables.optimal_cost(), tree))
    }

    /// Like [`run`](Self::run) but hands back the tables as well.
    pub fn run_with_tables<S: AsRef<str>>(
        &self,
        p: &[f64],
        q: &[f64],
        labels: &[S],
    ) -> Result<(ObstTables, Tree)> {
        #[cfg(feature = "tracing")]
        let span = tracing::info_span!("obst_build", n = labels.len(), search = self.search.label());
        #[cfg(feature = "tracing")]
        let _enter = span.enter();

        if p.is_empty() || p.len() != q.len() {
            return Err(ObstError::ShapeMismatch {
                p: p.len(),
                q: q.len(),
            });
        }
        if labels.len() != p.len() - 1 {
            return Err(ObstError::LabelCountMismatch {
                labels: labels.len(),
                keys: p.len() - 1,
            });
        }

        let tables = {
            #[cfg(feature = "tracing")]
            let span = tracing::info_span!("build_tables");
            #[cfg(feature = "tracing")]
            let _enter = span.enter();
            self.build_tables(p, q)?
        };

        let tree = {
            #[cfg(feature = "tracing")]
            let span = tracing::info_span!("reconstruct");
            #[cfg(feature = "tracing")]
            let _enter = span.enter();
            tables.tree(labels)?
        };

        Ok((tables, tree))
    }
}

#[derive(Debug, Clone, Copy)]
struct Cell {
    weight: f64,
    cost: f64,
    root: Option<usize>,
}

enum Frame {
    Expand(usize, usize),
    Assemble(usize),
}

/// Rebuild the subtree over key ranks `i..=j` from a root table.
///
/// Ranges with `i > j` or an unset root yield `None`, as does a root outside
/// `[max(i, 1), j]` or past the last label. Uses an explicit
/// stack, so the depth of the result is not limited by the call stack.
pub fn reconstruct<S: AsRef<str>>(
    root: &Table<Option<usize>>,
    labels: &[S],
    i: usize,
    j: usize,
) -> Option<Box<Node>> {
    let mut work = vec![Frame::Expand(i, j)];
    let mut built: Vec<Option<Box<Node>>> = Vec::new();

    while let Some(frame) = work.pop() {
        match frame {
            Frame::Expand(i, j) => {
                let r = if i > j {
                    None
                } else {
                    root.get(i, j)
                        .copied()
                        .flatten()
                        .filter(|r| (i.max(1)..=j).contains(r) && *r <= labels.len())
                };
                match r {
                    Some(r) => {
                        work.push(Frame::Assemble(r));
                        work.push(Frame::Expand(r + 1, j));
                        work.push(Frame::Expand(i, r - 1));
                    }
                    None => built.push(None),
                }
            }
            Frame::Assemble(r) => {
                let right = built.pop().flatten();
                let left = built.pop().flatten();
                built.push(Some(Box::new(Node {
                    label: labels[r - 1].as_ref().to_string(),
                    left,
                    right,
                })));
            }
        }
    }

    built.pop().flatten()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::utils::approx_eq;

    #[test]
    fn three_key_scenario_picks_b() {
        let p = [0.0, 0.3, 0.1, 0.1];
        let q = [0.1, 0.1, 0.1, 0.2];
        let tables = ObstEngine::new().build_tables(&p, &q).unwrap();
        assert_eq!(tables.root(1, 3), Some(2));
        assert_eq!(tables.top_root(), Some(1));
        assert_eq!(tables.root(1, 2), Some(1));
        assert_eq!(tables.root(2, 3), Some(2));
        assert!(approx_eq(tables.cost(1, 3).unwrap(), 1.9));
        assert!(approx_eq(tables.weight(1, 3).unwrap(), 1.0));
        assert!(approx_eq(tables.cost(4, 3).unwrap(), 0.2));
    }

    #[test]
    fn zero_keys_degenerate() {
        let tables = ObstEngine::new().build_tables(&[0.0], &[0.4]).unwrap();
        assert!(tables.is_empty());
        assert_eq!(tables.top_root(), None);
        assert!(approx_eq(tables.optimal_cost(), 0.4));
        let empty: [&str; 0] = [];
        let tree = tables.tree(&empty).unwrap();
        assert!(tree.is_empty());
    }

    #[test]
    fn single_key_cost_is_its_weight() {
        let tables = ObstEngine::new()
            .build_tables(&[0.0, 0.5], &[0.2, 0.3])
            .unwrap();
        assert!(approx_eq(tables.cost(1, 1).unwrap(), 0.2 + 0.5 + 0.3));
        assert_eq!(tables.root(1, 1), Some(1));
    }

    #[test]
    fn ties_keep_first_root() {
        // [1, 2] with unit keys: r = 1 and r = 2 both cost 3.
        let tables = ObstEngine::new()
            .build_tables(&[0.0, 1.0, 1.0, 1.0], &[0.0; 4])
            .unwrap();
        assert_eq!(tables.root(1, 2), Some(1));
        assert_eq!(tables.root(2, 3), Some(2));
        assert_eq!(tables.root(1, 3), Some(2));
        assert!(approx_eq(tables.optimal_cost(), 5.0));
    }

    #[test]
    fn shape_violations_are_reported() {
        let engine = ObstEngine::new();
        assert!(matches!(
            engine.build_tables(&[0.0, 1.0], &[0.0]),
            Err(ObstError::ShapeMismatch { p: 2, q: 1 })
        ));
        assert!(matches!(
            engine.build_tables(&[], &[]),
            Err(ObstError::ShapeMismatch { p: 0, q: 0 })
        ));
        assert!(matches!(
            engine.run(&[0.0, 1.0], &[0.0, 0.0], &["a", "b"]),
            Err(ObstError::LabelCountMismatch { labels: 2, keys: 1 })
        ));
    }

    #[test]
    fn accessors_reject_cells_outside_triangle() {
        let tables = ObstEngine::new()
            .build_tables(&[0.0, 0.5, 0.5], &[0.0; 3])
            .unwrap();
        assert_eq!(tables.cost(3, 1), None);
        assert_eq!(tables.cost(0, 0), None);
        assert_eq!(tables.root(2, 1), None);
        assert!(tables.weight(3, 2).is_some());
    }

    #[test]
    fn nan_probabilities_leave_roots_unset() {
        let p = [0.0, f64::NAN, 0.5, 0.5];
        let q = [0.0; 4];
        let (tables, tree) = ObstEngine::new()
            .run_with_tables(&p, &q, &["a", "b", "c"])
            .unwrap();
        assert_eq!(tables.root(1, 2), None);
        assert_eq!(tables.root(1, 3), None);
        assert!(tree.is_empty());
    }

    #[test]
    fn reconstruct_skips_out_of_range_roots() {
        let mut root: Table<Option<usize>> = Table::new(4, None);
        root[(1, 2)] = Some(5);
        assert!(reconstruct(&root, &["a", "b"], 1, 2).is_none());
        root[(1, 2)] = Some(2);
        root[(1, 1)] = Some(1);
        let node = reconstruct(&root, &["a", "b"], 1, 2).unwrap();
        assert_eq!(node.label, "b");
        assert_eq!(node.left.as_ref().map(|n| n.label.as_str()), Some("a"));
        assert!(node.right.is_none());

        let mut root: Table<Option<usize>> = Table::new(3, None);
        root[(0, 1)] = Some(0);
        assert!(reconstruct(&root, &["a"], 0, 1).is_none());
        root[(0, 1)] = Some(1);
        root[(0, 0)] = Some(0);
        let node = reconstruct(&root, &["a"], 0, 1).unwrap();
        assert_eq!(node.label, "a");
        assert!(node.is_leaf());
    }

    #[test]
    fn root_search_parses_from_str() {
        assert_eq!("knuth".parse::<RootSearch>().unwrap(), RootSearch::Knuth);
        assert_eq!("full".parse::<RootSearch>().unwrap(), RootSearch::Full);
        assert!(matches!(
            "binary".parse::<RootSearch>(),
            Err(ObstError::UnknownRootSearch(s)) if s == "binary"
        ));
    }

    #[test]
    fn full_search_matches_knuth_without_gaps() {
        let p = [0.0, 0.05, 0.4, 0.08, 0.04, 0.1, 0.1, 0.23];
        let q = [0.0; 8];
        let knuth = ObstEngine::new().build_tables(&p, &q).unwrap();
        let full = ObstEngine::with_root_search(RootSearch::Full)
            .build_tables(&p, &q)
            .unwrap();
        assert!(approx_eq(knuth.optimal_cost(), full.optimal_cost()));
    }

    #[test]
    fn rendering_labels_each_table() {
        let tables = ObstEngine::new()
            .build_tables(&[0.0, 0.5], &[0.25, 0.25])
            .unwrap();
        let text = tables.render();
        assert!(text.starts_with("Cost Table (E):\n"));
        assert!(text.contains("\nWeight Table (W):\n"));
        assert!(text.contains("\nRoot Table:\n"));
        assert!(text.contains("1\t0.2500\t1.0000"));
    }
}
