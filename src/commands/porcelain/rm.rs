use crate::artifacts::core::{path_block, NitError};
use crate::areas::repository::Repository;
use crate::commands::plumbing::update_index::UpdateIndexOpts;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct RmOpts {
    pub recursive: bool,
    pub force: bool,
}

impl Repository {
    /// Remove tracked files from the working copy and the index. Refuses
    /// directories without `-r` and files with unstaged changes; `-f` is
    /// deliberately not implemented.
    pub fn rm(&self, path: &Path, opts: RmOpts) -> anyhow::Result<()> {
        self.assert_not_bare()?;

        if opts.force {
            return Err(NitError::UnsupportedFlag.into());
        }

        let targets = self.index().matching_files(path);
        if targets.is_empty() {
            return Err(NitError::no_match(path.display()).into());
        }
        if self.workspace().is_directory(path) && !opts.recursive {
            return Err(NitError::directory_needs_recursive(path.display()).into());
        }

        let changed = self.added_or_modified_files()?;
        let blocked: Vec<_> = targets
            .iter()
            .filter(|t| changed.contains(t))
            .cloned()
            .collect();
        if !blocked.is_empty() {
            return Err(NitError::DirtyCheckout {
                paths: path_block(&blocked),
            }
            .into());
        }

        for target in targets {
            self.workspace().remove_file(&target)?;
            self.update_index(
                &target,
                UpdateIndexOpts {
                    remove: true,
                    ..Default::default()
                },
            )?;
        }

        Ok(())
    }
}
