//! Editing session: a key set plus the tree built from it.
//!
//! State machine:
//! - `Empty -> Built` on the first [`build`](ObstSession::build) or
//!   [`insert`](ObstSession::insert),
//! - `Built -> Built` on every successful edit,
//! - `Built -> Empty` only through [`reset`](ObstSession::reset).
//!
//! Every edit reruns the full table build and reconstruction; there is no
//! incremental update. Edits are staged on a copy of the key set and only
//! committed, together with the new tree, once the rebuild succeeded, so a
//! rejected edit leaves both keys and tree untouched.

use crate::engine::{ObstEngine, ObstTables};
use crate::error::{ObstError, Result};
use crate::keys::KeySet;
use crate::traits::{KeyOrder, NumericAware};
use crate::tree::Tree;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SessionState {
    Empty,
    Built,
}

#[derive(Debug, Clone)]
pub struct ObstSession<O: KeyOrder = NumericAware> {
    engine: ObstEngine,
    keys: KeySet<O>,
    tree: Tree,
    state: SessionState,
}

impl ObstSession<NumericAware> {
    pub fn new() -> Self {
        Self::with_engine(ObstEngine::new(), NumericAware)
    }
}

impl Default for ObstSession<NumericAware> {
    fn default() -> Self {
        Self::new()
    }
}

impl<O: KeyOrder + Clone> ObstSession<O> {
    pub fn with_engine(engine: ObstEngine, order: O) -> Self {
        Self {
            engine,
            keys: KeySet::empty_with_order(order),
            tree: Tree::new(),
            state: SessionState::Empty,
        }
    }

    pub fn state(&self) -> SessionState {
        self.state
    }

    pub fn keys(&self) -> &KeySet<O> {
        &self.keys
    }

    pub fn tree(&self) -> &Tree {
        &self.tree
    }

    pub fn engine(&self) -> &ObstEngine {
        &self.engine
    }

    fn rebuild(&self, keys: &KeySet<O>) -> Result<Tree> {
        let (_cost, tree) = self
            .engine
            .run(&keys.p_with_sentinel(), keys.q(), keys.labels())?;
        #[cfg(feature = "tracing")]
        tracing::debug!(keys = keys.len(), height = tree.height(), "rebuilt tree");
        Ok(tree)
    }

    fn commit(&mut self, keys: KeySet<O>, tree: Tree) {
        self.keys = keys;
        self.tree = tree;
        self.state = SessionState::Built;
    }

    /// Replace the key set wholesale and build its tree.
    pub fn build(&mut self, keys: KeySet<O>) -> Result<&Tree> {
        let tree = self.rebuild(&keys)?;
        self.commit(keys, tree);
        Ok(&self.tree)
    }

    /// Add a key and rebuild. On an empty session this creates a one-key set.
    pub fn insert(&mut self, label: impl Into<String>, p: f64) -> Result<&Tree> {
        let mut staged = self.keys.clone();
        if let Err(err) = staged.insert(label, p) {
            #[cfg(feature = "tracing")]
            tracing::debug!(%err, "insert rejected");
            return Err(err);
        }
        let tree = self.rebuild(&staged)?;
        self.commit(staged, tree);
        Ok(&self.tree)
    }

    /// Remove a key and rebuild.
    pub fn delete(&mut self, label: &str) -> Result<&Tree> {
        if self.state == SessionState::Empty {
            return Err(ObstError::EmptyTree);
        }
        let mut staged = self.keys.clone();
        if let Err(err) = staged.remove(label) {
            #[cfg(feature = "tracing")]
            tracing::debug!(%err, label, "delete rejected");
            return Err(err);
        }
        let tree = self.rebuild(&staged)?;
        self.commit(staged, tree);
        Ok(&self.tree)
    }

    /// Drop keys and tree.
    pub fn reset(&mut self) {
        self.keys = KeySet::empty_with_order(self.keys.order().clone());
        self.tree = Tree::new();
        self.state = SessionState::Empty;
    }

    /// Fresh tables for the current keys; a read-only side product.
    pub fn tables(&self) -> Result<ObstTables> {
        if self.state == SessionState::Empty {
            return Err(ObstError::EmptyTree);
        }
        self.engine
            .build_tables(&self.keys.p_with_sentinel(), self.keys.q())
    }

    /// Expected cost of the current tree.
    pub fn expected_cost(&self) -> Result<f64> {
        self.tree
            .expected_cost(&self.keys.p_with_sentinel(), self.keys.q())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn starts_empty() {
        let session = ObstSession::new();
        assert_eq!(session.state(), SessionState::Empty);
        assert!(session.tree().is_empty());
        assert!(matches!(session.tables(), Err(ObstError::EmptyTree)));
    }

    #[test]
    fn insert_on_empty_builds_single_node() {
        let mut session = ObstSession::new();
        session.insert("k", 0.4).unwrap();
        assert_eq!(session.state(), SessionState::Built);
        assert_eq!(session.tree().in_order(), vec!["k"]);
    }

    #[test]
    fn delete_on_empty_is_rejected() {
        let mut session = ObstSession::new();
        assert!(matches!(session.delete("k"), Err(ObstError::EmptyTree)));
    }

    #[test]
    fn deleting_last_key_stays_built() {
        let mut session = ObstSession::new();
        session.insert("k", 0.4).unwrap();
        session.delete("k").unwrap();
        assert_eq!(session.state(), SessionState::Built);
        assert!(session.tree().is_empty());
        session.reset();
        assert_eq!(session.state(), SessionState::Empty);
    }
}
