//! Diffing flat tables of contents
//!
//! Commits flatten to TOCs, and the index and working copy project to the
//! same shape, so every comparison in the engine is a TOC diff. A two-way
//! diff is the three-way form with the base defaulted to the receiver side.

use crate::artifacts::diff::file_status::{Diff, DiffEntry};
use crate::artifacts::objects::tree::Toc;
use std::collections::BTreeSet;
use std::path::PathBuf;

/// Diff `receiver` against `giver` with an optional `base`. Without a base
/// this degenerates to a plain left/right comparison.
pub fn toc_diff(receiver: &Toc, giver: &Toc, base: Option<&Toc>) -> Diff {
    let base = base.unwrap_or(receiver);

    let paths: BTreeSet<PathBuf> = receiver
        .keys()
        .chain(giver.keys())
        .chain(base.keys())
        .cloned()
        .collect();

    paths
        .into_iter()
        .map(|path| {
            let entry = DiffEntry::classify(
                base.get(&path).cloned(),
                receiver.get(&path).cloned(),
                giver.get(&path).cloned(),
            );
            (path, entry)
        })
        .collect()
}
