use crate::artifacts::core::NitError;
use crate::artifacts::objects::tree::nest_toc;
use crate::areas::repository::Repository;
use anyhow::Context;
use std::io::Write;

impl Repository {
    /// Write the index as a tree and record a commit on top of it. While a
    /// merge is in progress the message comes from MERGE_MSG and finishing
    /// the commit clears the merge state.
    pub fn commit(&self, message: Option<&str>) -> anyhow::Result<()> {
        self.assert_not_bare()?;

        let tree_oid = self.database().write_tree(&nest_toc(&self.index().toc())?)?;
        let head_description = self.head_description()?;

        if let Some(head) = self.refs().hash(self.database(), "HEAD")? {
            let head_commit = self.database().read_commit(&head)?;
            if head_commit.tree_oid() == &tree_oid {
                return Err(NitError::NothingToCommit {
                    head: head_description,
                }
                .into());
            }
        }

        let was_merging = self.is_merge_in_progress();
        let conflicted = self.index().conflicted_paths();
        if was_merging && !conflicted.is_empty() {
            let paths = conflicted
                .iter()
                .map(|p| format!("U {}", p.display()))
                .collect::<Vec<_>>()
                .join("\n");
            return Err(NitError::UnresolvedConflicts { paths }.into());
        }

        let message = if was_merging {
            self.refs()
                .read_merge_msg()?
                .context("merge in progress but MERGE_MSG is missing")?
        } else {
            message.context("no commit message given")?.to_string()
        };

        let parents = self.refs().commit_parent_hashes(self.database())?;
        let commit_oid = self
            .database()
            .write_commit(tree_oid, message.clone(), parents)?;
        self.update_ref("HEAD", commit_oid.as_ref())?;

        if was_merging {
            self.refs().rm_merge_msg()?;
            self.refs().rm("MERGE_HEAD")?;
            writeln!(self.writer(), "Merge made by the three-way strategy")?;
        } else {
            writeln!(
                self.writer(),
                "[{} {}] {}",
                head_description,
                commit_oid,
                message
            )?;
        }

        Ok(())
    }
}
