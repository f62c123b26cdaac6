use crate::artifacts::diff::file_status::name_status;
use crate::artifacts::diff::toc_diff::toc_diff;
use crate::areas::repository::Repository;
use colored::Colorize;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::PathBuf;

impl Repository {
    /// Current branch, untracked files, unmerged paths, staged changes, and
    /// unstaged changes, each section shown only when non-empty.
    pub fn status(&self) -> anyhow::Result<()> {
        self.assert_not_bare()?;

        writeln!(self.writer(), "On branch {}", self.head_description()?)?;

        let tracked: BTreeSet<PathBuf> = self.index().tracked_paths().into_iter().collect();
        let untracked: Vec<String> = self
            .workspace()
            .ls_recursive(None)?
            .into_iter()
            .filter(|path| !tracked.contains(path))
            .map(|path| path.display().to_string().red().to_string())
            .collect();
        self.print_section("Untracked files:", &untracked)?;

        let unmerged: Vec<String> = self
            .index()
            .conflicted_paths()
            .into_iter()
            .map(|path| path.display().to_string().red().to_string())
            .collect();
        self.print_section("Unmerged paths:", &unmerged)?;

        let staged: Vec<String> =
            name_status(&toc_diff(&self.head_toc()?, &self.index().toc(), None))
                .into_iter()
                .map(|(path, status)| {
                    format!("{} {}", status.status_char(), path.display())
                        .green()
                        .to_string()
                })
                .collect();
        self.print_section("Changes to be committed:", &staged)?;

        let staged_toc = self.index().toc();
        let working_toc = self.working_copy_toc()?;
        let unstaged: Vec<String> = name_status(&toc_diff(&staged_toc, &working_toc, None))
            .into_iter()
            .map(|(path, status)| {
                format!("{} {}", status.status_char(), path.display())
                    .red()
                    .to_string()
            })
            .collect();
        self.print_section("Changes not staged for commit:", &unstaged)?;

        Ok(())
    }

    fn print_section(&self, header: &str, lines: &[String]) -> anyhow::Result<()> {
        if lines.is_empty() {
            return Ok(());
        }
        writeln!(self.writer(), "{}", header)?;
        for line in lines {
            writeln!(self.writer(), "{}", line)?;
        }
        Ok(())
    }
}
