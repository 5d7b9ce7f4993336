//! Optimal Binary Search Trees (OBST)
//!
//! This crate builds the binary search tree that minimises expected search
//! cost for keys with known success probabilities `p` and gap (unsuccessful
//! search) probabilities `q`, following the classic interval dynamic
//! program with Knuth's bounded root search.
//!
//! ## Core idea
//! 1. Fill the cost (E), weight (W) and root tables over key ranges of
//!    increasing length. The root of `[i, j]` is searched only between
//!    `Root[i][j-1]` and `Root[i+1][j]`.
//! 2. Walk the root table to materialise an owned [`Tree`] whose in-order
//!    traversal is the sorted label order.
//!
//! Both phases are pure, synchronous computations: O(n²) memory for the
//! tables and, with the bounded search, O(n) work per subtree length, so
//! O(n²) for the whole build.
//!
//! ## Quick start
//! ```
//! use obst_dp::ObstEngine;
//!
//! let labels = ["A", "B", "C"];
//! let p = [0.0, 0.3, 0.1, 0.1]; // p[0] is unused
//! let q = [0.1, 0.1, 0.1, 0.2];
//! let (cost, tree) = ObstEngine::new().run(&p, &q, &labels).unwrap();
//! assert_eq!(tree.in_order(), vec!["A", "B", "C"]);
//! assert_eq!(tree.root().unwrap().label, "B");
//! assert!((cost - tree.expected_cost(&p, &q).unwrap()).abs() < 1e-9);
//! ```
//!
//! ## Editing
//! [`ObstSession`] owns a [`KeySet`] and the tree built from it. Insertions
//! and deletions rerun the whole construction; they are refused while the
//! key set carries non-zero gap probabilities.
//!
//! ## Features
//! - `tracing` (default): spans around table building and reconstruction.
//! - `parallel`: solve each subtree-length diagonal with rayon.

pub mod builder;
pub mod dot;
pub mod engine;
pub mod error;
pub mod keys;
pub mod session;
pub mod table;
pub mod traits;
pub mod tree;
pub mod utils;

pub use crate::builder::ObstEngineBuilder;
pub use crate::engine::{ObstEngine, ObstTables, RootSearch};
pub use crate::error::{ObstError, Result};
pub use crate::keys::KeySet;
pub use crate::session::{ObstSession, SessionState};
pub use crate::traits::KeyOrder;
pub use crate::tree::{Node, Tree, TreeStats};
