use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::areas::repository::Repository;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Print the blob hash a working-copy file would get, optionally
    /// writing the blob into the store.
    pub fn hash_object(&self, path: &Path, write: bool) -> anyhow::Result<()> {
        let data = self.workspace().read_file(path)?;
        let blob = Object::Blob(Blob::new(data));

        let oid = if write {
            self.database().write(&blob)?
        } else {
            blob.object_id()?
        };
        writeln!(self.writer(), "{}", oid)?;

        Ok(())
    }
}
