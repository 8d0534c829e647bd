//! Memoisation of derived values for the current calculation pass.
use petgraph::graph::{EdgeIndex, NodeIndex};
use std::cell::RefCell;
use std::collections::{HashMap, HashSet};

/// The element a memoised value belongs to
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) enum MemoOwner {
    Node(NodeIndex),
    Edge(EdgeIndex),
}

/// Identifies one derived value of one element
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct MemoKey {
    owner: MemoOwner,
    name: &'static str,
}

impl MemoKey {
    pub(crate) fn node(node: NodeIndex, name: &'static str) -> Self {
        Self {
            owner: MemoOwner::Node(node),
            name,
        }
    }

    pub(crate) fn edge(edge: EdgeIndex, name: &'static str) -> Self {
        Self {
            owner: MemoOwner::Edge(edge),
            name,
        }
    }
}

/// Memoised values plus the computations currently being evaluated.
///
/// Values are only ever recorded once determined, so clearing is the only invalidation.
#[derive(Debug, Default)]
pub(crate) struct Memo {
    values: RefCell<HashMap<MemoKey, f64>>,
    in_progress: RefCell<HashSet<MemoKey>>,
}

impl Memo {
    pub(crate) fn get(&self, key: MemoKey) -> Option<f64> {
        self.values.borrow().get(&key).copied()
    }

    pub(crate) fn insert(&self, key: MemoKey, value: f64) {
        self.values.borrow_mut().insert(key, value);
    }

    /// Mark a computation as started. Returns false if it is already running.
    pub(crate) fn enter(&self, key: MemoKey) -> bool {
        self.in_progress.borrow_mut().insert(key)
    }

    pub(crate) fn leave(&self, key: MemoKey) {
        self.in_progress.borrow_mut().remove(&key);
    }

    pub(crate) fn clear(&mut self) {
        self.values.get_mut().clear();
    }

    pub(crate) fn len(&self) -> usize {
        self.values.borrow().len()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_memo() {
        let mut memo = Memo::default();
        let key = MemoKey::node(NodeIndex::new(0), "primary_demand");
        assert_eq!(memo.get(key), None);

        memo.insert(key, 4.0);
        assert_eq!(memo.get(key), Some(4.0));
        assert_eq!(memo.get(MemoKey::edge(EdgeIndex::new(0), "primary_demand")), None);

        memo.clear();
        assert_eq!(memo.len(), 0);
    }

    #[test]
    fn test_reentry() {
        let memo = Memo::default();
        let key = MemoKey::edge(EdgeIndex::new(1), "parent_share");
        assert!(memo.enter(key));
        assert!(!memo.enter(key));
        memo.leave(key);
        assert!(memo.enter(key));
    }
}
