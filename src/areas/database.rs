//! Content-addressed object database
//!
//! One file per object under `<repo>/objects/<hash>`, holding the object's
//! canonical bytes. Writes are idempotent: the same object always lands at
//! the same key with the same content, so re-writing is a no-op. Objects are
//! never mutated or deleted.
//!
//! Reading an absent hash is a normal outcome and returns `None`. Bytes that
//! do not decode as any known object kind are a fatal corruption error.

use crate::artifacts::core::NitError;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object::Object;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::{join_toc_path, Toc, TocNode, Tree, TreeEntry};
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeSet;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Upper bound on tree nesting. Content addressing already rules out cycles
/// (a tree cannot contain its own hash), this bound keeps a corrupt store
/// from recursing unbounded.
const MAX_TREE_DEPTH: usize = 512;

pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Store an object under its content address and return the address.
    pub fn write(&self, object: &Object) -> anyhow::Result<ObjectId> {
        let oid = object.object_id()?;
        self.store_raw(&oid, object.serialize())?;
        Ok(oid)
    }

    /// Decode the object stored under `oid`, or `None` when absent.
    pub fn read(&self, oid: &ObjectId) -> anyhow::Result<Option<Object>> {
        match self.load_raw(oid)? {
            None => Ok(None),
            Some(bytes) => {
                let object = Object::deserialize(&bytes).map_err(|_| NitError::Corruption {
                    hash: oid.to_string(),
                })?;
                Ok(Some(object))
            }
        }
    }

    pub fn exists(&self, oid: &ObjectId) -> bool {
        self.path.join(oid.to_path()).is_file()
    }

    /// Every hash in the store.
    pub fn all_hashes(&self) -> anyhow::Result<BTreeSet<ObjectId>> {
        let mut hashes = BTreeSet::new();

        if !self.path.exists() {
            return Ok(hashes);
        }
        for entry in std::fs::read_dir(&self.path)
            .with_context(|| format!("unable to list object store at {:?}", self.path))?
        {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            if let Ok(oid) = ObjectId::try_parse(name) {
                hashes.insert(oid);
            }
        }

        Ok(hashes)
    }

    /// Raw canonical bytes stored under `oid`, without decoding. Used when
    /// copying objects between stores.
    pub fn load_raw(&self, oid: &ObjectId) -> anyhow::Result<Option<Bytes>> {
        let object_path = self.path.join(oid.to_path());
        if !object_path.exists() {
            return Ok(None);
        }

        let bytes = std::fs::read(&object_path)
            .with_context(|| format!("unable to read object file {}", object_path.display()))?;
        Ok(Some(Bytes::from(bytes)))
    }

    /// Store raw canonical bytes under `oid`. Content addressing makes this
    /// last-wins safe: two writers of the same key write the same bytes.
    pub fn store_raw(&self, oid: &ObjectId, bytes: Bytes) -> anyhow::Result<()> {
        let object_path = self.path.join(oid.to_path());
        if object_path.exists() {
            return Ok(());
        }

        if !self.path.exists() {
            std::fs::create_dir_all(&self.path).with_context(|| {
                format!("unable to create object directory {}", self.path.display())
            })?;
        }

        // write to a temp name, then rename, so readers never observe a
        // half-written object
        let temp_path = self
            .path
            .join(format!("tmp-{}-{}", std::process::id(), oid.to_short_oid()));
        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_path)
            .with_context(|| format!("unable to open object file {}", temp_path.display()))?;
        file.write_all(&bytes)
            .with_context(|| format!("unable to write object file {}", temp_path.display()))?;

        std::fs::rename(&temp_path, &object_path).with_context(|| {
            format!("unable to rename object file to {}", object_path.display())
        })?;

        Ok(())
    }

    /// Write a nested TOC as tree objects, children before parents, and
    /// return the root tree's hash.
    pub fn write_tree(&self, node: &TocNode) -> anyhow::Result<ObjectId> {
        self.write_tree_at_depth(node, 0)
    }

    fn write_tree_at_depth(&self, node: &TocNode, depth: usize) -> anyhow::Result<ObjectId> {
        if depth > MAX_TREE_DEPTH {
            anyhow::bail!("tree nesting exceeds {} levels", MAX_TREE_DEPTH);
        }

        let TocNode::Dir(children) = node else {
            anyhow::bail!("write_tree requires a directory node");
        };

        let mut tree = Tree::default();
        for (name, child) in children {
            let entry = match child {
                TocNode::Blob(oid) => TreeEntry::new(ObjectType::Blob, oid.clone()),
                TocNode::Dir(_) => {
                    let sub_oid = self.write_tree_at_depth(child, depth + 1)?;
                    TreeEntry::new(ObjectType::Tree, sub_oid)
                }
            };
            tree.insert(name.clone(), entry)?;
        }

        self.write(&Object::Tree(tree))
    }

    /// Write a commit object and return its hash.
    pub fn write_commit(
        &self,
        tree_oid: ObjectId,
        message: String,
        parents: Vec<ObjectId>,
    ) -> anyhow::Result<ObjectId> {
        self.write(&Object::Commit(Commit::new(tree_oid, parents, message)))
    }

    /// Read `oid` expecting a commit.
    pub fn read_commit(&self, oid: &ObjectId) -> anyhow::Result<Commit> {
        let object = self
            .read(oid)?
            .ok_or_else(|| NitError::unknown_revision(oid))?;
        match object {
            Object::Commit(commit) => Ok(commit),
            other => Err(NitError::WrongObjectType {
                kind: other.object_type().to_string(),
            }
            .into()),
        }
    }

    /// Flatten the tree referenced by a commit into path to blob-hash.
    pub fn commit_toc(&self, commit_oid: &ObjectId) -> anyhow::Result<Toc> {
        let commit = self.read_commit(commit_oid)?;
        let mut toc = Toc::new();
        self.flatten_tree(commit.tree_oid(), Path::new(""), &mut toc, 0)?;
        Ok(toc)
    }

    fn flatten_tree(
        &self,
        tree_oid: &ObjectId,
        prefix: &Path,
        toc: &mut Toc,
        depth: usize,
    ) -> anyhow::Result<()> {
        if depth > MAX_TREE_DEPTH {
            anyhow::bail!("tree nesting exceeds {} levels", MAX_TREE_DEPTH);
        }

        let object = self
            .read(tree_oid)?
            .ok_or_else(|| NitError::unknown_revision(tree_oid))?;
        let tree = object.as_tree().ok_or_else(|| NitError::WrongObjectType {
            kind: object.object_type().to_string(),
        })?;

        for (name, entry) in tree.entries() {
            let path = join_toc_path(prefix, name);
            if entry.is_tree() {
                self.flatten_tree(&entry.oid, &path, toc, depth + 1)?;
            } else {
                toc.insert(path, entry.oid.clone());
            }
        }

        Ok(())
    }

    /// Read the blob under `oid` and return its bytes. Absent blobs read as
    /// empty, which is what conflict composition wants for a deleted side.
    pub fn blob_data(&self, oid: Option<&ObjectId>) -> anyhow::Result<Bytes> {
        match oid {
            None => Ok(Bytes::new()),
            Some(oid) => {
                let object = self
                    .read(oid)?
                    .ok_or_else(|| NitError::unknown_revision(oid))?;
                match object {
                    Object::Blob(blob) => Ok(blob.data().clone()),
                    other => Err(NitError::WrongObjectType {
                        kind: other.object_type().to_string(),
                    }
                    .into()),
                }
            }
        }
    }

    /// Kind of the object stored under `oid`, if present.
    pub fn object_type(&self, oid: &ObjectId) -> anyhow::Result<Option<ObjectType>> {
        Ok(self.read(oid)?.map(|object| object.object_type()))
    }

    pub fn is_commit(&self, oid: &ObjectId) -> anyhow::Result<bool> {
        Ok(self.object_type(oid)? == Some(ObjectType::Commit))
    }

    /// Parent hashes of a commit, the edge set of the commit graph.
    pub fn parents_of(&self, oid: &ObjectId) -> anyhow::Result<Vec<ObjectId>> {
        Ok(self.read_commit(oid)?.parents().to_vec())
    }
}
