//! Label ordering and numeric helpers shared by the engine and key set.

use std::cmp::Ordering;

/// Absolute tolerance used when comparing accumulated costs.
pub const COST_EPSILON: f64 = 1e-9;

/// Returns true if `s` is a non-empty run of ASCII digits.
#[inline]
pub fn is_numeric(s: &str) -> bool {
    !s.is_empty() && s.bytes().all(|b| b.is_ascii_digit())
}

/// Numeric-aware label comparison.
///
/// Two all-digit labels compare as integers (`"9" < "10"`); any other pair
/// compares lexicographically. Digit runs too long for `u128` fall back to
/// comparing by length and then lexicographically, which is the same
/// integer order for values without leading zeros.
pub fn compare_labels(a: &str, b: &str) -> Ordering {
    if is_numeric(a) && is_numeric(b) {
        match (a.parse::<u128>(), b.parse::<u128>()) {
            (Ok(x), Ok(y)) => x.cmp(&y),
            _ => {
                let a = a.trim_start_matches('0');
                let b = b.trim_start_matches('0');
                a.len().cmp(&b.len()).then_with(|| a.cmp(b))
            }
        }
    } else {
        a.cmp(b)
    }
}

/// Sentinel "infinite" cost for a problem with probabilities `p` and `q`.
///
/// Every subtree sits at depth at most `n + 1`, so no achievable cost can
/// exceed `(n + 1) * Σ(|p| + |q|)`; the sentinel is strictly above that.
/// Non-finite entries are left out so the sentinel itself stays finite.
pub fn cost_sentinel(p: &[f64], q: &[f64]) -> f64 {
    let n = p.len().saturating_sub(1);
    let mass: f64 = p
        .iter()
        .chain(q.iter())
        .filter(|x| x.is_finite())
        .map(|x| x.abs())
        .sum();
    (n as f64 + 2.0) * mass + 1.0
}

/// Compare two costs within [`COST_EPSILON`], scaled by magnitude.
#[inline]
pub fn approx_eq(a: f64, b: f64) -> bool {
    (a - b).abs() <= COST_EPSILON * a.abs().max(b.abs()).max(1.0)
}
