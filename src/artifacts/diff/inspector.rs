//! Repository-level comparisons
//!
//! Joins over HEAD, the index, and the working copy. These live here rather
//! than on the workspace because they need the object database and the
//! index, not just the filesystem.

use crate::artifacts::core::NitError;
use crate::artifacts::diff::file_status::{Diff, FileStatus};
use crate::artifacts::diff::toc_diff::toc_diff;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Toc;
use crate::areas::repository::Repository;
use std::path::PathBuf;

impl Repository {
    /// TOC of the HEAD commit, empty before the first commit.
    pub fn head_toc(&self) -> anyhow::Result<Toc> {
        match self.refs().hash(self.database(), "HEAD")? {
            None => Ok(Toc::new()),
            Some(oid) => self.database().commit_toc(&oid),
        }
    }

    /// Hashes of tracked files as they currently sit on disk. Tracked paths
    /// missing from the working copy are simply absent.
    pub fn working_copy_toc(&self) -> anyhow::Result<Toc> {
        let mut toc = Toc::new();
        for path in self.index().tracked_paths() {
            if self.workspace().file_exists(&path) {
                toc.insert(path.clone(), self.workspace().hash_file(&path)?);
            }
        }
        Ok(toc)
    }

    /// Two-way diff with the side selection porcelain exposes: a named ref
    /// resolves to its commit tree; an omitted left side is the index and an
    /// omitted right side is the working copy.
    pub fn diff_range(&self, ref1: Option<&str>, ref2: Option<&str>) -> anyhow::Result<Diff> {
        let left = match ref1 {
            Some(name) => self.resolved_commit_toc(name)?,
            None => self.index().toc(),
        };
        let right = match ref2 {
            Some(name) => self.resolved_commit_toc(name)?,
            None => self.working_copy_toc()?,
        };

        Ok(toc_diff(&left, &right, None))
    }

    fn resolved_commit_toc(&self, name: &str) -> anyhow::Result<Toc> {
        let oid = self
            .refs()
            .hash(self.database(), name)?
            .ok_or_else(|| NitError::unknown_revision(name))?;
        self.database().commit_toc(&oid)
    }

    /// Paths that both differ between HEAD and `to` and carry local edits
    /// relative to HEAD. A non-empty result blocks checkout and merge.
    pub fn changed_files_commit_would_overwrite(
        &self,
        to: &ObjectId,
    ) -> anyhow::Result<Vec<PathBuf>> {
        let head_toc = self.head_toc()?;

        let local_changes = toc_diff(&head_toc, &self.working_copy_toc()?, None);
        let incoming_changes = toc_diff(&head_toc, &self.database().commit_toc(to)?, None);

        Ok(local_changes
            .iter()
            .filter(|(_, entry)| entry.status.is_change())
            .filter(|(path, _)| {
                incoming_changes
                    .get(*path)
                    .is_some_and(|entry| entry.status.is_change())
            })
            .map(|(path, _)| path.clone())
            .collect())
    }

    /// Tracked files whose on-disk content no longer matches stage 0.
    /// Deletions do not count; removing an already deleted file is fine.
    pub fn added_or_modified_files(&self) -> anyhow::Result<Vec<PathBuf>> {
        let staged = self.index().toc();
        let diff = toc_diff(&staged, &self.working_copy_toc()?, None);

        Ok(diff
            .into_iter()
            .filter(|(_, entry)| {
                entry.status.is_change() && entry.status != FileStatus::Delete
            })
            .map(|(path, _)| path)
            .collect())
    }
}
