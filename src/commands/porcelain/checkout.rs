use crate::artifacts::core::{path_block, NitError};
use crate::artifacts::diff::toc_diff::toc_diff;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Move HEAD to another commit, reshaping the index and working copy.
    /// Checking out a branch attaches HEAD; checking out a raw hash
    /// detaches it.
    pub fn checkout(&self, target: &str) -> anyhow::Result<()> {
        self.assert_not_bare()?;

        let to = self
            .refs()
            .hash(self.database(), target)?
            .ok_or_else(|| NitError::unknown_revision(target))?;
        match self.database().object_type(&to)? {
            Some(ObjectType::Commit) => {}
            Some(kind) => {
                return Err(NitError::WrongObjectType {
                    kind: kind.to_string(),
                }
                .into())
            }
            None => return Err(NitError::unknown_revision(target).into()),
        }

        if self.is_already_on(target)? {
            writeln!(self.writer(), "Already on {}", target)?;
            return Ok(());
        }

        let overwritten = self.changed_files_commit_would_overwrite(&to)?;
        if !overwritten.is_empty() {
            return Err(NitError::DirtyCheckout {
                paths: path_block(&overwritten),
            }
            .into());
        }

        // a literal hash argument means a detached checkout
        let detaching = ObjectId::try_parse(target.to_string())
            .map(|oid| self.database().exists(&oid))
            .unwrap_or(false);

        let head_toc = self.head_toc()?;
        let to_toc = self.database().commit_toc(&to)?;
        self.write_working_copy(&toc_diff(&head_toc, &to_toc, None))?;

        if detaching {
            self.refs().detach_head(&to)?;
        } else {
            self.refs().attach_head(target)?;
        }

        {
            let mut index = self.index();
            index.toc_to_index(&to_toc);
            index.write_updates()?;
        }

        if detaching {
            writeln!(
                self.writer(),
                "Note: checking out {}\nYou are in detached HEAD state.",
                to
            )?;
        } else {
            writeln!(self.writer(), "Switched to branch {}", target)?;
        }

        Ok(())
    }

    fn is_already_on(&self, target: &str) -> anyhow::Result<bool> {
        if self.refs().head_branch_name()?.as_deref() == Some(target) {
            return Ok(true);
        }
        // detached on exactly this hash
        if self.refs().is_head_detached()? {
            let head = self.refs().hash(self.database(), "HEAD")?;
            return Ok(head.map(|oid| oid.as_ref() == target).unwrap_or(false));
        }
        Ok(false)
    }
}
