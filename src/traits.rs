//! Core trait definitions.
//!
//! The construction engine itself is monomorphic over `f64` probabilities;
//! the one place callers customise behaviour is the total order used to sort
//! labels before probabilities are attached to key ranks. Implement
//! [`KeyOrder`] to plug in your own order; [`NumericAware`] is the default.

use std::cmp::Ordering;

use crate::utils::compare_labels;

/// Total order over key labels.
///
/// Requirements:
/// - must be a total order (reflexive, antisymmetric, transitive),
/// - two distinct labels must never compare `Equal`, otherwise lookups in a
///   built tree cannot distinguish them.
pub trait KeyOrder {
    /// Compare two labels.
    fn compare(&self, a: &str, b: &str) -> Ordering;
}

/// Digits-as-integers, everything else lexicographic.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct NumericAware;

impl KeyOrder for NumericAware {
    #[inline]
    fn compare(&self, a: &str, b: &str) -> Ordering {
        compare_labels(a, b)
    }
}

/// Plain byte-wise lexicographic order.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct Lexicographic;

impl KeyOrder for Lexicographic {
    #[inline]
    fn compare(&self, a: &str, b: &str) -> Ordering {
        a.cmp(b)
    }
}

impl<F> KeyOrder for F
where
    F: Fn(&str, &str) -> Ordering,
{
    #[inline]
    fn compare(&self, a: &str, b: &str) -> Ordering {
        self(a, b)
    }
}
