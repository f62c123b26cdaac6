//! Ancestry queries over the commit graph
//!
//! The walker is generic over a parent-loader function so it runs against
//! the object database in production and an in-memory graph in tests. The
//! ancestor closure of a commit includes the commit itself, which makes
//! `is_ancestor` reflexive.

use crate::artifacts::objects::object_id::ObjectId;
use std::collections::BTreeSet;

pub struct CommitWalker<LoaderFn>
where
    LoaderFn: Fn(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
{
    parents_of: LoaderFn,
}

impl<LoaderFn> CommitWalker<LoaderFn>
where
    LoaderFn: Fn(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
{
    pub fn new(parents_of: LoaderFn) -> Self {
        Self { parents_of }
    }

    /// Transitive closure over parent links, including the start commit.
    /// No ordering is implied; callers compare sets, never walk order.
    pub fn ancestors(&self, oid: &ObjectId) -> anyhow::Result<BTreeSet<ObjectId>> {
        let mut seen = BTreeSet::new();
        let mut queue = vec![oid.clone()];

        while let Some(current) = queue.pop() {
            if !seen.insert(current.clone()) {
                continue;
            }
            for parent in (self.parents_of)(&current)? {
                if !seen.contains(&parent) {
                    queue.push(parent);
                }
            }
        }

        Ok(seen)
    }

    /// True when `a` is reachable from `b` via parent links. Reflexive.
    pub fn is_ancestor(&self, a: &ObjectId, b: &ObjectId) -> anyhow::Result<bool> {
        Ok(self.ancestors(b)?.contains(a))
    }

    /// A receiver is up to date with a giver when it already contains the
    /// giver's history. A missing giver is trivially up to date.
    pub fn is_up_to_date(
        &self,
        receiver: Option<&ObjectId>,
        giver: Option<&ObjectId>,
    ) -> anyhow::Result<bool> {
        match (receiver, giver) {
            (_, None) => Ok(true),
            (None, Some(_)) => Ok(false),
            (Some(receiver), Some(giver)) => {
                Ok(receiver == giver || self.is_ancestor(giver, receiver)?)
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::graph::test_graph::{oid, InMemoryCommitGraph};
    use rstest::*;

    #[fixture]
    fn linear_history() -> InMemoryCommitGraph {
        // A <- B <- C <- D
        let mut graph = InMemoryCommitGraph::new();
        graph.add_commit("a", &[]);
        graph.add_commit("b", &["a"]);
        graph.add_commit("c", &["b"]);
        graph.add_commit("d", &["c"]);
        graph
    }

    #[rstest]
    fn ancestors_include_self_and_all_parents(linear_history: InMemoryCommitGraph) {
        let walker = linear_history.walker();
        let ancestors = walker.ancestors(&oid("c")).unwrap();
        assert!(ancestors.contains(&oid("a")));
        assert!(ancestors.contains(&oid("b")));
        assert!(ancestors.contains(&oid("c")));
        assert!(!ancestors.contains(&oid("d")));
    }

    #[rstest]
    fn is_ancestor_is_reflexive(linear_history: InMemoryCommitGraph) {
        let walker = linear_history.walker();
        assert!(walker.is_ancestor(&oid("b"), &oid("b")).unwrap());
    }

    #[rstest]
    fn is_ancestor_is_transitive(linear_history: InMemoryCommitGraph) {
        let walker = linear_history.walker();
        assert!(walker.is_ancestor(&oid("a"), &oid("b")).unwrap());
        assert!(walker.is_ancestor(&oid("b"), &oid("c")).unwrap());
        assert!(walker.is_ancestor(&oid("a"), &oid("c")).unwrap());
    }

    #[rstest]
    fn is_ancestor_follows_both_merge_parents() {
        //   A
        //  / \
        // B   C
        //  \ /
        //   D
        let mut graph = InMemoryCommitGraph::new();
        graph.add_commit("a", &[]);
        graph.add_commit("b", &["a"]);
        graph.add_commit("c", &["a"]);
        graph.add_commit("d", &["b", "c"]);

        let walker = graph.walker();
        assert!(walker.is_ancestor(&oid("b"), &oid("d")).unwrap());
        assert!(walker.is_ancestor(&oid("c"), &oid("d")).unwrap());
        assert!(!walker.is_ancestor(&oid("b"), &oid("c")).unwrap());
    }

    #[rstest]
    fn up_to_date_rules(linear_history: InMemoryCommitGraph) {
        let walker = linear_history.walker();

        // identical tips
        assert!(walker
            .is_up_to_date(Some(&oid("d")), Some(&oid("d")))
            .unwrap());
        // receiver already contains giver
        assert!(walker
            .is_up_to_date(Some(&oid("d")), Some(&oid("b")))
            .unwrap());
        // receiver is behind
        assert!(!walker
            .is_up_to_date(Some(&oid("b")), Some(&oid("d")))
            .unwrap());
        // nothing to take is always up to date
        assert!(walker.is_up_to_date(Some(&oid("b")), None).unwrap());
        assert!(walker.is_up_to_date(None, None).unwrap());
        // an empty receiver is behind any giver
        assert!(!walker.is_up_to_date(None, Some(&oid("a"))).unwrap());
    }
}
