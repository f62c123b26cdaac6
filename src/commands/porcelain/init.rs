use crate::areas::repository::Repository;
use std::io::Write;
use std::path::Path;

impl Repository {
    /// Create a repository at `root`. Running inside an existing repository
    /// is a silent no-op.
    pub fn init(root: &Path, bare: bool, writer: &mut dyn Write) -> anyhow::Result<()> {
        if Repository::create(root, bare)? {
            writeln!(
                writer,
                "Initialized empty nit repository in {}",
                root.display()
            )?;
        }
        Ok(())
    }
}
