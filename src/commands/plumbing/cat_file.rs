use crate::artifacts::core::NitError;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Pretty-print a stored object: blob bytes verbatim, a tree as a
    /// listing, a commit as its record.
    pub fn cat_file(&self, hash: &str) -> anyhow::Result<()> {
        let oid = ObjectId::try_parse(hash.to_string())
            .map_err(|_| NitError::unknown_revision(hash))?;
        let object = self
            .database()
            .read(&oid)?
            .ok_or_else(|| NitError::unknown_revision(hash))?;

        match object {
            Object::Blob(blob) => {
                self.writer().write_all(blob.data())?;
            }
            Object::Tree(tree) => {
                for (name, entry) in tree.entries() {
                    writeln!(self.writer(), "{} {}\t{}", entry.kind, entry.oid, name)?;
                }
            }
            Object::Commit(commit) => {
                writeln!(self.writer(), "tree {}", commit.tree_oid())?;
                for parent in commit.parents() {
                    writeln!(self.writer(), "parent {}", parent)?;
                }
                writeln!(self.writer(), "\n{}", commit.message())?;
            }
        }

        Ok(())
    }
}
