use crate::artifacts::core::NitError;
use crate::areas::repository::Repository;
use crate::commands::plumbing::update_index::UpdateIndexOpts;
use std::path::Path;

impl Repository {
    /// Stage every working-copy file under `path`.
    pub fn add(&self, path: &Path) -> anyhow::Result<()> {
        self.assert_not_bare()?;

        let matched = self.workspace().ls_recursive(Some(path))?;
        if matched.is_empty() {
            return Err(NitError::no_match(path.display()).into());
        }

        for file in matched {
            self.update_index(
                &file,
                UpdateIndexOpts {
                    add: true,
                    ..Default::default()
                },
            )?;
        }

        Ok(())
    }
}
