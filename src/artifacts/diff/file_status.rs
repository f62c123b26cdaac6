//! Per-path change classification
//!
//! A diff entry records the three hashes a path can carry across a
//! comparison (base, receiver, giver) plus the derived status and, for
//! non-conflicting entries, the content the receiver side should end up
//! with. Statuses describe what must happen to the receiver:
//!
//! - `Add`/`Modify`/`Delete`: exactly one side changed relative to base;
//! - `Conflict`: both sides changed differently, including a deletion
//!   against a modification;
//! - `Same`: nothing to do, either because both sides agree or because the
//!   receiver already carries the only change.

use crate::artifacts::objects::object_id::ObjectId;
use std::collections::BTreeMap;
use std::path::PathBuf;

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum FileStatus {
    Add,
    Modify,
    Delete,
    Conflict,
    Same,
}

impl FileStatus {
    pub fn status_char(&self) -> char {
        match self {
            FileStatus::Add => 'A',
            FileStatus::Modify => 'M',
            FileStatus::Delete => 'D',
            FileStatus::Conflict => 'C',
            FileStatus::Same => ' ',
        }
    }

    pub fn is_change(&self) -> bool {
        *self != FileStatus::Same
    }
}

/// A semantic diff between two sides of a comparison.
pub type Diff = BTreeMap<PathBuf, DiffEntry>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct DiffEntry {
    pub status: FileStatus,
    pub base: Option<ObjectId>,
    pub receiver: Option<ObjectId>,
    pub giver: Option<ObjectId>,
    /// Content the receiver should carry after applying the entry. `None`
    /// for deletions and for conflicts, which have no single answer.
    pub target: Option<ObjectId>,
}

impl DiffEntry {
    /// Classify one path across (base, receiver, giver). When both sides
    /// agree they win over the base; when only one side moved it is taken;
    /// divergent changes conflict.
    pub fn classify(
        base: Option<ObjectId>,
        receiver: Option<ObjectId>,
        giver: Option<ObjectId>,
    ) -> Self {
        let (status, target) = if receiver == giver {
            (FileStatus::Same, receiver.clone())
        } else if receiver == base {
            (Self::status_against_receiver(&receiver, &giver), giver.clone())
        } else if giver == base {
            // the receiver already carries the only change
            (FileStatus::Same, receiver.clone())
        } else {
            (FileStatus::Conflict, None)
        };

        DiffEntry {
            status,
            base,
            receiver,
            giver,
            target,
        }
    }

    fn status_against_receiver(
        receiver: &Option<ObjectId>,
        target: &Option<ObjectId>,
    ) -> FileStatus {
        match (receiver, target) {
            (None, Some(_)) => FileStatus::Add,
            (Some(_), None) => FileStatus::Delete,
            (Some(r), Some(t)) if r != t => FileStatus::Modify,
            _ => FileStatus::Same,
        }
    }
}

/// Project a diff down to the changed paths and their status letters.
pub fn name_status(diff: &Diff) -> BTreeMap<PathBuf, FileStatus> {
    diff.iter()
        .filter(|(_, entry)| entry.status.is_change())
        .map(|(path, entry)| (path.clone(), entry.status))
        .collect()
}
