use crate::artifacts::diff::file_status::name_status;
use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Name-status listing between two commits, a commit and the index, or
    /// the index and the working copy, depending on which refs are given.
    pub fn diff(&self, ref1: Option<&str>, ref2: Option<&str>) -> anyhow::Result<()> {
        self.assert_not_bare()?;

        let diff = self.diff_range(ref1, ref2)?;
        for (path, status) in name_status(&diff) {
            writeln!(self.writer(), "{} {}", status.status_char(), path.display())?;
        }

        Ok(())
    }
}
