//! Labels and their probabilities, kept in lockstep.
//!
//! A [`KeySet`] is what the editing layer owns and mutates. It stores:
//! - `labels[k]`, sorted by the set's [`KeyOrder`],
//! - `p[k]`, the success probability of `labels[k]` (no sentinel slot),
//! - `q[g]` for `g in 0..=n`, the probability of an unsuccessful search
//!   landing in gap `g` of the *sorted* order.
//!
//! Gap probabilities are always indexed against the sorted labels and are
//! never permuted. Edits are therefore only allowed while `q` is all zero;
//! see [`KeySet::ensure_editable`].

use std::fmt::Write as _;

use crate::error::{ObstError, Result};
use crate::traits::{KeyOrder, NumericAware};

#[derive(Debug, Clone, PartialEq)]
pub struct KeySet<O: KeyOrder = NumericAware> {
    labels: Vec<String>,
    p: Vec<f64>,
    q: Vec<f64>,
    uses_q: bool,
    order: O,
}

fn check_probability(label: &str, value: f64) -> Result<()> {
    if value.is_finite() && value >= 0.0 {
        Ok(())
    } else {
        Err(ObstError::InvalidProbability {
            label: label.to_string(),
            value,
        })
    }
}

impl KeySet<NumericAware> {
    /// Key set under the numeric-aware label order.
    ///
    /// `q = None` models no unsuccessful searches (all gaps zero) and keeps
    /// the set editable.
    pub fn new<S: Into<String>>(labels: Vec<S>, p: Vec<f64>, q: Option<Vec<f64>>) -> Result<Self> {
        Self::with_order(labels, p, q, NumericAware)
    }

    /// The empty, editable key set.
    pub fn empty() -> Self {
        Self::empty_with_order(NumericAware)
    }
}

impl<O: KeyOrder> KeySet<O> {
    pub fn empty_with_order(order: O) -> Self {
        Self {
            labels: Vec::new(),
            p: Vec::new(),
            q: vec![0.0],
            uses_q: false,
            order,
        }
    }

    /// Validate and sort. `labels` and `p` travel together; `q`, if given,
    /// is read as gap probabilities of the sorted order.
    pub fn with_order<S: Into<String>>(
        labels: Vec<S>,
        p: Vec<f64>,
        q: Option<Vec<f64>>,
        order: O,
    ) -> Result<Self> {
        let labels: Vec<String> = labels.into_iter().map(Into::into).collect();
        let n = labels.len();
        if p.len() != n {
            return Err(ObstError::LabelCountMismatch {
                labels: n,
                keys: p.len(),
            });
        }
        let (q, uses_q) = match q {
            Some(q) if q.len() != n + 1 => {
                return Err(ObstError::ShapeMismatch {
                    p: n + 1,
                    q: q.len(),
                })
            }
            Some(q) => (q, true),
            None => (vec![0.0; n + 1], false),
        };

        for (label, &value) in labels.iter().zip(&p) {
            check_probability(label, value)?;
        }
        for (gap, &value) in q.iter().enumerate() {
            check_probability(&format!("gap {gap}"), value)?;
        }

        let mut pairs: Vec<(String, f64)> = labels.into_iter().zip(p).collect();
        pairs.sort_by(|a, b| order.compare(&a.0, &b.0));
        if let Some(dup) = pairs
            .windows(2)
            .find(|w| order.compare(&w[0].0, &w[1].0).is_eq())
        {
            return Err(ObstError::DuplicateLabel(dup[1].0.clone()));
        }
        let (labels, p) = pairs.into_iter().unzip();

        Ok(Self {
            labels,
            p,
            q,
            uses_q,
            order,
        })
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.labels.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.labels.is_empty()
    }

    pub fn labels(&self) -> &[String] {
        &self.labels
    }

    /// Success probabilities without the sentinel slot.
    pub fn p(&self) -> &[f64] {
        &self.p
    }

    /// Gap probabilities, `len() + 1` entries.
    pub fn q(&self) -> &[f64] {
        &self.q
    }

    /// `P` as the engine expects it: `P[0] = 0`, `P[k] = p(label k-1)`.
    pub fn p_with_sentinel(&self) -> Vec<f64> {
        std::iter::once(0.0).chain(self.p.iter().copied()).collect()
    }

    /// True when built with caller-supplied gap probabilities.
    #[inline]
    pub fn uses_dummy_probabilities(&self) -> bool {
        self.uses_q
    }

    pub fn order(&self) -> &O {
        &self.order
    }

    /// Position of `label` in sorted order.
    pub fn position(&self, label: &str) -> Option<usize> {
        self.labels
            .binary_search_by(|probe| self.order.compare(probe, label))
            .ok()
    }

    /// Reject edits on a set with modelled gap probabilities.
    pub fn ensure_editable(&self) -> Result<()> {
        if self.uses_q {
            Err(ObstError::DummyProbabilitiesInUse)
        } else {
            Ok(())
        }
    }

    /// Add a key with success probability `p` and a zero gap, keeping order.
    pub fn insert(&mut self, label: impl Into<String>, p: f64) -> Result<()> {
        self.ensure_editable()?;
        let label = label.into();
        check_probability(&label, p)?;
        let at = match self
            .labels
            .binary_search_by(|probe| self.order.compare(probe, &label))
        {
            Ok(_) => return Err(ObstError::DuplicateLabel(label)),
            Err(at) => at,
        };
        self.labels.insert(at, label);
        self.p.insert(at, p);
        self.q.insert(at + 1, 0.0);
        Ok(())
    }

    /// Remove `label` with its probability and the gap to its right.
    pub fn remove(&mut self, label: &str) -> Result<()> {
        self.ensure_editable()?;
        let at = self
            .position(label)
            .ok_or_else(|| ObstError::LabelNotFound(label.to_string()))?;
        self.labels.remove(at);
        self.p.remove(at);
        self.q.remove(at + 1);
        Ok(())
    }

    /// Tabular `Label  P  Q` listing, one row per key plus the trailing gap.
    pub fn render(&self) -> String {
        let mut out = String::new();
        let _ = writeln!(out, "{:<15}{:<15}{:<15}", "Label", "P", "Q");
        let _ = writeln!(out, "{}", "-".repeat(45));
        for (idx, &q) in self.q.iter().enumerate() {
            let label = self.labels.get(idx).map(String::as_str).unwrap_or("");
            let p = self
                .p
                .get(idx)
                .map(|p| format!("{p:.6}"))
                .unwrap_or_default();
            let _ = writeln!(out, "{:<15}{:<15}{:<15}", label, p, format!("{q:.6}"));
        }
        out
    }
}
