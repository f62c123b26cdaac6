use crate::artifacts::core::{path_block, NitError};
use crate::areas::repository::Repository;
use anyhow::Context;
use std::io::Write;

impl Repository {
    /// Merge `target` into the current branch. Already-up-to-date and
    /// fast-forward outcomes report and return; a true three-way merge
    /// either closes itself with a merge commit or leaves conflict state
    /// behind for a later commit.
    pub fn merge(&self, target: &str) -> anyhow::Result<()> {
        if self.refs().is_head_detached()? {
            // merging into a detached HEAD is not supported
            return Err(NitError::UnsupportedFlag.into());
        }

        let receiver = self.refs().hash(self.database(), "HEAD")?;
        let giver = self
            .refs()
            .hash(self.database(), target)?
            .ok_or_else(|| NitError::unknown_revision(target))?;
        if !self.database().is_commit(&giver)? {
            let kind = self
                .database()
                .object_type(&giver)?
                .map(|k| k.to_string())
                .unwrap_or_else(|| "unknown".to_string());
            return Err(NitError::WrongObjectType { kind }.into());
        }

        if self.is_up_to_date(receiver.as_ref(), Some(&giver))? {
            writeln!(self.writer(), "Already up-to-date")?;
            return Ok(());
        }

        let dirty = self.changed_files_commit_would_overwrite(&giver)?;
        if !dirty.is_empty() {
            return Err(NitError::DirtyMerge {
                paths: path_block(&dirty),
            }
            .into());
        }

        if self.can_fast_forward(receiver.as_ref(), &giver)? {
            self.write_fast_forward_merge(receiver.as_ref(), &giver)?;
            writeln!(self.writer(), "Fast-forward")?;
            return Ok(());
        }

        let receiver = receiver.context("a non-fast-forward merge needs a HEAD commit")?;
        let diff = self.write_non_fast_forward_merge(&receiver, &giver, target)?;

        if Repository::has_conflicts(&diff) {
            writeln!(
                self.writer(),
                "Automatic merge failed. Fix conflicts and commit the result."
            )?;
        } else {
            self.commit(None)?;
        }

        Ok(())
    }
}
