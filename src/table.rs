//! Dense DP tables and their triangular rendering.
//!
//! A [`Table`] for `n` keys is `(n + 2) x (n + 2)` so that both the empty
//! ranges `[a, a-1]` (row `a`, column `a - 1`) and the trailing empty range
//! `[n+1, n]` have a cell. Only cells with `row <= col + 1` carry meaning.

use std::fmt::{self, Write as _};
use std::ops::{Index, IndexMut};

/// Row-major square matrix indexed by `(row, col)`.
#[derive(Debug, Clone, PartialEq)]
pub struct Table<T> {
    dim: usize,
    data: Vec<T>,
}

impl<T: Clone> Table<T> {
    /// Create a `dim x dim` table filled with `fill`.
    pub fn new(dim: usize, fill: T) -> Self {
        Self {
            dim,
            data: vec![fill; dim * dim],
        }
    }
}

impl<T> Table<T> {
    /// Side length.
    #[inline]
    pub fn dim(&self) -> usize {
        self.dim
    }

    /// Number of keys this table was sized for.
    #[inline]
    pub fn keys(&self) -> usize {
        self.dim.saturating_sub(2)
    }

    /// Checked access.
    #[inline]
    pub fn get(&self, row: usize, col: usize) -> Option<&T> {
        if row < self.dim && col < self.dim {
            self.data.get(row * self.dim + col)
        } else {
            None
        }
    }

    /// True for cells describing a (possibly empty) key range `[row, col]`.
    #[inline]
    pub fn is_meaningful(&self, row: usize, col: usize) -> bool {
        let n = self.keys();
        (1..=n + 1).contains(&row) && col <= n && row <= col + 1
    }

    /// Apply `f` to every cell.
    pub fn map<U, F: FnMut(&T) -> U>(&self, f: F) -> Table<U> {
        Table {
            dim: self.dim,
            data: self.data.iter().map(f).collect(),
        }
    }
}

impl<T> Index<(usize, usize)> for Table<T> {
    type Output = T;

    #[inline]
    fn index(&self, (row, col): (usize, usize)) -> &T {
        &self.data[row * self.dim + col]
    }
}

impl<T> IndexMut<(usize, usize)> for Table<T> {
    #[inline]
    fn index_mut(&mut self, (row, col): (usize, usize)) -> &mut T {
        &mut self.data[row * self.dim + col]
    }
}

/// Placeholder printed for cells outside the meaningful triangle.
pub const PLACEHOLDER: &str = "-";

/// Render rows `1..=n+1` and columns `0..=n` as tab-separated text.
///
/// Cells with `row > col + 1` print [`PLACEHOLDER`]; every other cell goes
/// through `cell`. The first line is a header of column indices.
pub fn render_triangular<T, F>(table: &Table<T>, mut cell: F) -> String
where
    F: FnMut(&T) -> String,
{
    let n = table.keys();
    let mut out = String::new();
    if table.dim() < 2 {
        return out;
    }

    out.push_str("i\\j");
    for col in 0..=n {
        let _ = write!(out, "\t{col}");
    }
    out.push('\n');

    for row in 1..=n + 1 {
        let _ = write!(out, "{row}");
        for col in 0..=n {
            out.push('\t');
            if table.is_meaningful(row, col) {
                out.push_str(&cell(&table[(row, col)]));
            } else {
                out.push_str(PLACEHOLDER);
            }
        }
        out.push('\n');
    }
    out
}

impl fmt::Display for Table<f64> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_triangular(self, |v| format!("{v:.4}")))
    }
}

impl fmt::Display for Table<Option<usize>> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&render_triangular(self, |v| match v {
            Some(r) => r.to_string(),
            None => PLACEHOLDER.to_string(),
        }))
    }
}
