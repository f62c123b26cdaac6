//! Low-level index mutation behind `add` and `rm`.

use crate::artifacts::core::NitError;
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::areas::index::Stage;
use crate::areas::repository::Repository;
use std::path::Path;

/// What `update_index` is allowed to do for the given path.
#[derive(Debug, Clone, Copy, Default)]
pub struct UpdateIndexOpts {
    pub add: bool,
    pub remove: bool,
}

impl Repository {
    /// Case analysis over (on disk, in index, opts). Staging a file stores
    /// its blob first, so the index never references an absent object.
    pub fn update_index(&self, path: &Path, opts: UpdateIndexOpts) -> anyhow::Result<()> {
        let is_on_disk = self.workspace().file_exists(path);
        let is_in_index = self.index().has_file(path, Stage::Normal);

        if self.workspace().is_directory(path) {
            return Err(NitError::directory_needs_contents(path.display()).into());
        }

        if opts.remove && !is_on_disk {
            if self.index().is_file_in_conflict(path) {
                // removing one side of a conflict is not supported
                return Err(NitError::UnsupportedFlag.into());
            }
            if is_in_index {
                let mut index = self.index();
                index.write_rm(path);
                index.write_updates()?;
            }
            return Ok(());
        }

        if is_on_disk && (opts.add || is_in_index) {
            let data = self.workspace().read_file(path)?;
            let oid = self.database().write(&Object::Blob(Blob::new(data)))?;
            let mut index = self.index();
            index.write_non_conflict(path, oid);
            index.write_updates()?;
            return Ok(());
        }

        if is_on_disk {
            anyhow::bail!("cannot add {} to index - use the add option", path.display());
        }
        anyhow::bail!(
            "{} does not exist and the remove option was not passed",
            path.display()
        );
    }
}
