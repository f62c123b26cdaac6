//! Three-way merge engine
//!
//! Merging happens against flat TOCs: the receiver (current HEAD), the
//! giver, and their best common ancestor as base. Single-sided changes are
//! taken; divergent changes become conflicts, materialized as marker-framed
//! files in the working copy and stage 1/2/3 entries in the index. A merge
//! with no conflicts is closed immediately by a two-parent commit; one with
//! conflicts parks its state in MERGE_HEAD and MERGE_MSG until a later
//! commit resolves it.

use crate::artifacts::diff::file_status::{Diff, FileStatus};
use crate::artifacts::diff::toc_diff::toc_diff;
use crate::artifacts::graph::ancestry::CommitWalker;
use crate::artifacts::graph::bca_finder::BcaFinder;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Toc;
use crate::areas::repository::Repository;
use bytes::Bytes;

const CONFLICT_START: &[u8] = b"<<<<<<<\n";
const CONFLICT_SEPARATOR: &[u8] = b"=======\n";
const CONFLICT_END: &[u8] = b">>>>>>>\n";

impl Repository {
    fn walker(
        &self,
    ) -> CommitWalker<impl Fn(&ObjectId) -> anyhow::Result<Vec<ObjectId>> + '_> {
        CommitWalker::new(move |oid| self.database().parents_of(oid))
    }

    pub fn is_merge_in_progress(&self) -> bool {
        self.refs().exists("MERGE_HEAD")
    }

    pub fn is_up_to_date(
        &self,
        receiver: Option<&ObjectId>,
        giver: Option<&ObjectId>,
    ) -> anyhow::Result<bool> {
        self.walker().is_up_to_date(receiver, giver)
    }

    /// A merge can fast-forward when the receiver has no commits yet or is
    /// an ancestor of the giver.
    pub fn can_fast_forward(
        &self,
        receiver: Option<&ObjectId>,
        giver: &ObjectId,
    ) -> anyhow::Result<bool> {
        match receiver {
            None => Ok(true),
            Some(receiver) => self.walker().is_ancestor(receiver, giver),
        }
    }

    /// A fetched update is forced when it does not descend from what the
    /// remote-tracking ref held before. Reporting only.
    pub fn is_a_force_fetch(
        &self,
        old: Option<&ObjectId>,
        new: &ObjectId,
    ) -> anyhow::Result<bool> {
        match old {
            None => Ok(false),
            Some(old) => Ok(!self.walker().is_ancestor(old, new)?),
        }
    }

    pub fn common_ancestor(
        &self,
        a: &ObjectId,
        b: &ObjectId,
    ) -> anyhow::Result<Option<ObjectId>> {
        BcaFinder::new(move |oid| self.database().parents_of(oid)).find_best_common_ancestor(a, b)
    }

    /// Advance the current branch to the giver, rewrite the index to the
    /// giver's tree, and reshape the working copy accordingly.
    pub fn write_fast_forward_merge(
        &self,
        receiver: Option<&ObjectId>,
        giver: &ObjectId,
    ) -> anyhow::Result<()> {
        let branch_ref = self.refs().terminal_ref("HEAD")?;
        self.refs().write(&branch_ref, giver.as_ref())?;

        let giver_toc = self.database().commit_toc(giver)?;
        {
            let mut index = self.index();
            index.toc_to_index(&giver_toc);
            index.write_updates()?;
        }

        if !self.is_bare() {
            let receiver_toc = match receiver {
                Some(receiver) => self.database().commit_toc(receiver)?,
                None => Toc::new(),
            };
            self.write_working_copy(&toc_diff(&receiver_toc, &giver_toc, None))?;
        }

        Ok(())
    }

    /// Three-way diff of receiver and giver over their merge base.
    pub fn merge_diff(&self, receiver: &ObjectId, giver: &ObjectId) -> anyhow::Result<Diff> {
        let base_toc = match self.common_ancestor(receiver, giver)? {
            Some(base) => self.database().commit_toc(&base)?,
            None => Toc::new(),
        };

        Ok(toc_diff(
            &self.database().commit_toc(receiver)?,
            &self.database().commit_toc(giver)?,
            Some(&base_toc),
        ))
    }

    /// Open a merge: record MERGE_HEAD and MERGE_MSG, then write the merged
    /// result into the index and working copy, with conflicts at stages
    /// 1/2/3 and marker-framed files on disk. Returns the diff so the
    /// caller can see whether conflicts remain.
    pub fn write_non_fast_forward_merge(
        &self,
        receiver: &ObjectId,
        giver: &ObjectId,
        giver_ref: &str,
    ) -> anyhow::Result<Diff> {
        self.refs().write("MERGE_HEAD", giver.as_ref())?;
        self.refs().write_merge_msg(&format!(
            "Merge {} into {}",
            giver_ref,
            self.head_description()?
        ))?;

        let diff = self.merge_diff(receiver, giver)?;

        {
            let mut index = self.index();
            // the merged result replaces the index wholesale
            index.toc_to_index(&Toc::new());
            for (path, entry) in &diff {
                match entry.status {
                    FileStatus::Conflict => index.write_conflict(
                        path,
                        entry.base.clone(),
                        entry.receiver.clone(),
                        entry.giver.clone(),
                    ),
                    _ => match &entry.target {
                        Some(oid) => index.write_non_conflict(path, oid.clone()),
                        None => index.write_rm(path),
                    },
                }
            }
            index.write_updates()?;
        }

        if !self.is_bare() {
            self.write_working_copy(&diff)?;
        }

        Ok(diff)
    }

    /// Materialize a semantic diff onto the working copy. Conflicts become
    /// marker-framed files holding both sides.
    pub fn write_working_copy(&self, diff: &Diff) -> anyhow::Result<()> {
        for (path, entry) in diff {
            match entry.status {
                FileStatus::Same => {}
                FileStatus::Delete => self.workspace().remove_file(path)?,
                FileStatus::Add | FileStatus::Modify => {
                    let data = self.database().blob_data(entry.target.as_ref())?;
                    self.workspace().write_file(path, &data)?;
                }
                FileStatus::Conflict => {
                    let composed = self.compose_conflict(
                        entry.receiver.as_ref(),
                        entry.giver.as_ref(),
                    )?;
                    self.workspace().write_file(path, &composed)?;
                }
            }
        }

        Ok(())
    }

    /// Both sides of a conflicted path between conventional markers. A side
    /// deleted in one of the commits contributes empty content.
    pub fn compose_conflict(
        &self,
        receiver: Option<&ObjectId>,
        giver: Option<&ObjectId>,
    ) -> anyhow::Result<Bytes> {
        let receiver_data = self.database().blob_data(receiver)?;
        let giver_data = self.database().blob_data(giver)?;

        let mut composed =
            Vec::with_capacity(receiver_data.len() + giver_data.len() + 3 * CONFLICT_START.len());
        composed.extend_from_slice(CONFLICT_START);
        composed.extend_from_slice(&receiver_data);
        composed.extend_from_slice(CONFLICT_SEPARATOR);
        composed.extend_from_slice(&giver_data);
        composed.extend_from_slice(CONFLICT_END);

        Ok(Bytes::from(composed))
    }

    pub fn has_conflicts(diff: &Diff) -> bool {
        diff.values()
            .any(|entry| entry.status == FileStatus::Conflict)
    }
}
