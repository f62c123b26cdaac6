//! Best common ancestor search
//!
//! The best common ancestor of commits X and Y is any common ancestor of X
//! and Y that is not a proper ancestor of another common ancestor. The
//! search compares ancestor sets rather than relying on any walk order:
//!
//! 1. intersect the ancestor closures of both commits;
//! 2. drop every candidate that is a proper ancestor of another candidate;
//! 3. return one survivor.
//!
//! Criss-cross histories can leave several best common ancestors; one of
//! them is returned, deterministically for a given store.

use crate::artifacts::graph::ancestry::CommitWalker;
use crate::artifacts::objects::object_id::ObjectId;
use std::collections::{BTreeMap, BTreeSet};

pub struct BcaFinder<LoaderFn>
where
    LoaderFn: Fn(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
{
    walker: CommitWalker<LoaderFn>,
}

impl<LoaderFn> BcaFinder<LoaderFn>
where
    LoaderFn: Fn(&ObjectId) -> anyhow::Result<Vec<ObjectId>>,
{
    pub fn new(parents_of: LoaderFn) -> Self {
        Self {
            walker: CommitWalker::new(parents_of),
        }
    }

    pub fn find_best_common_ancestor(
        &self,
        source: &ObjectId,
        target: &ObjectId,
    ) -> anyhow::Result<Option<ObjectId>> {
        let source_ancestors = self.walker.ancestors(source)?;
        let target_ancestors = self.walker.ancestors(target)?;

        let common: BTreeSet<ObjectId> = source_ancestors
            .intersection(&target_ancestors)
            .cloned()
            .collect();
        if common.is_empty() {
            return Ok(None);
        }

        // ancestor closure per candidate, computed once
        let mut closures: BTreeMap<ObjectId, BTreeSet<ObjectId>> = BTreeMap::new();
        for candidate in &common {
            closures.insert(candidate.clone(), self.walker.ancestors(candidate)?);
        }

        let mut redundant = BTreeSet::new();
        for candidate in &common {
            for other in &common {
                if candidate == other {
                    continue;
                }
                // a proper ancestor of another candidate cannot be best
                if closures[other].contains(candidate) {
                    redundant.insert(candidate.clone());
                    break;
                }
            }
        }

        Ok(common.into_iter().find(|c| !redundant.contains(c)))
    }
}
