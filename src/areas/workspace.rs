//! Working tree
//!
//! File operations relative to the repository root. Paths given to and
//! returned from this type are repository-relative; the repository
//! directory itself is never listed or touched.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::areas::repository::REPO_DIR;
use anyhow::Context;
use bytes::Bytes;
use std::path::{Path, PathBuf};
use walkdir::WalkDir;

#[derive(Debug)]
pub struct Workspace {
    path: Box<Path>,
}

impl Workspace {
    pub fn new(path: Box<Path>) -> Self {
        Workspace { path }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn file_exists(&self, path: &Path) -> bool {
        self.path.join(path).is_file()
    }

    pub fn is_directory(&self, path: &Path) -> bool {
        self.path.join(path).is_dir()
    }

    pub fn read_file(&self, path: &Path) -> anyhow::Result<Bytes> {
        let full_path = self.path.join(path);
        let data = std::fs::read(&full_path)
            .with_context(|| format!("unable to read file {:?}", full_path))?;
        Ok(Bytes::from(data))
    }

    pub fn write_file(&self, path: &Path, data: &[u8]) -> anyhow::Result<()> {
        let full_path = self.path.join(path);
        if let Some(parent) = full_path.parent() {
            std::fs::create_dir_all(parent)
                .with_context(|| format!("unable to create directory {:?}", parent))?;
        }
        std::fs::write(&full_path, data)
            .with_context(|| format!("unable to write file {:?}", full_path))
    }

    /// Delete a file and prune any directories the deletion left empty.
    pub fn remove_file(&self, path: &Path) -> anyhow::Result<()> {
        let full_path = self.path.join(path);
        if full_path.is_file() {
            std::fs::remove_file(&full_path)
                .with_context(|| format!("unable to remove file {:?}", full_path))?;
        }

        let mut dir = full_path.parent().map(Path::to_path_buf);
        while let Some(current) = dir {
            if current == *self.path || !current.starts_with(self.path.as_ref()) {
                break;
            }
            if std::fs::read_dir(&current)?.next().is_some() {
                break;
            }
            std::fs::remove_dir(&current)?;
            dir = current.parent().map(Path::to_path_buf);
        }

        Ok(())
    }

    /// All files under `path` (the whole tree when `None`), repository
    /// relative, skipping the repository directory.
    pub fn ls_recursive(&self, path: Option<&Path>) -> anyhow::Result<Vec<PathBuf>> {
        let start = match path {
            Some(p) => self.path.join(p),
            None => self.path.to_path_buf(),
        };
        if !start.exists() {
            return Ok(vec![]);
        }

        if start.is_file() {
            let relative = start
                .strip_prefix(self.path.as_ref())
                .map(Path::to_path_buf)
                .unwrap_or_default();
            return Ok(vec![relative]);
        }

        let mut files = WalkDir::new(&start)
            .into_iter()
            .filter_entry(|entry| entry.file_name() != REPO_DIR)
            .filter_map(|entry| entry.ok())
            .filter(|entry| entry.file_type().is_file())
            .filter_map(|entry| {
                entry
                    .path()
                    .strip_prefix(self.path.as_ref())
                    .map(Path::to_path_buf)
                    .ok()
            })
            .collect::<Vec<_>>();
        files.sort();

        Ok(files)
    }

    /// Content address the file at `path` would have as a blob, without
    /// storing anything.
    pub fn hash_file(&self, path: &Path) -> anyhow::Result<ObjectId> {
        let data = self.read_file(path)?;
        Object::Blob(Blob::new(data)).object_id()
    }
}
