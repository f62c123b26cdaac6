use crate::artifacts::core::NitError;
use crate::areas::refs::Refs;
use crate::areas::repository::Repository;
use colored::Colorize;
use std::io::Write;

impl Repository {
    /// With no name, list local branches marking the checked-out one. With
    /// a name, create a branch at HEAD's commit.
    pub fn branch(&self, name: Option<&str>) -> anyhow::Result<()> {
        let Some(name) = name else {
            return self.list_branches();
        };

        let head = match self.refs().hash(self.database(), "HEAD")? {
            Some(head) => head,
            None => return Err(NitError::unknown_revision(self.head_description()?).into()),
        };

        let local_ref = Refs::to_local_ref(name);
        if !Refs::is_ref(&local_ref) {
            return Err(NitError::InvalidRefName {
                name: name.to_string(),
            }
            .into());
        }
        if self.refs().exists(&local_ref) {
            return Err(NitError::branch_already_exists(name).into());
        }

        self.refs().write(&local_ref, head.as_ref())
    }

    fn list_branches(&self) -> anyhow::Result<()> {
        let current = self.refs().head_branch_name()?;

        for branch in self.refs().local_heads()?.keys() {
            if Some(branch.as_str()) == current.as_deref() {
                writeln!(self.writer(), "* {}", branch.as_str().green())?;
            } else {
                writeln!(self.writer(), "  {}", branch)?;
            }
        }

        Ok(())
    }
}
