//! Tree objects
//!
//! A tree is an ordered mapping from single path segments to blob or tree
//! references. Entries are kept sorted by name, which makes the canonical
//! payload deterministic: equal logical trees serialize to equal bytes and
//! therefore share a hash.
//!
//! Payload grammar, one entry per line:
//!
//! ```text
//! <kind> <hash> <name>\n
//! ```
//!
//! with kind either `blob` or `tree`.

use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use derive_new::new;
use std::collections::BTreeMap;
use std::path::{Component, Path, PathBuf};

/// Flat table of contents: repository-relative file path to blob hash.
pub type Toc = BTreeMap<PathBuf, ObjectId>;

/// One tree entry. `kind` is restricted to blob and tree; commits never
/// appear inside trees.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct TreeEntry {
    pub kind: ObjectType,
    pub oid: ObjectId,
}

impl TreeEntry {
    pub fn is_tree(&self) -> bool {
        self.kind == ObjectType::Tree
    }
}

/// A directory snapshot: name to entry, sorted by name.
#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct Tree {
    entries: BTreeMap<String, TreeEntry>,
}

impl Tree {
    pub fn entries(&self) -> impl Iterator<Item = (&String, &TreeEntry)> {
        self.entries.iter()
    }

    pub fn insert(&mut self, name: String, entry: TreeEntry) -> anyhow::Result<()> {
        if name.is_empty() || name.contains('/') || name.contains('\0') {
            anyhow::bail!("invalid tree entry name: {:?}", name);
        }
        self.entries.insert(name, entry);
        Ok(())
    }

    pub fn serialize_payload(&self) -> Bytes {
        let mut payload = String::new();
        for (name, entry) in &self.entries {
            payload.push_str(entry.kind.as_str());
            payload.push(' ');
            payload.push_str(entry.oid.as_ref());
            payload.push(' ');
            payload.push_str(name);
            payload.push('\n');
        }
        Bytes::from(payload)
    }

    pub fn deserialize_payload(payload: Bytes) -> anyhow::Result<Self> {
        let text = std::str::from_utf8(&payload).context("tree payload is not valid UTF-8")?;
        let mut tree = Tree::default();

        for line in text.lines() {
            let mut parts = line.splitn(3, ' ');
            let kind = parts.next().context("tree entry missing kind")?;
            let oid = parts.next().context("tree entry missing hash")?;
            let name = parts.next().context("tree entry missing name")?;

            let kind = ObjectType::try_parse(kind)?;
            if kind == ObjectType::Commit {
                anyhow::bail!("commit entry inside tree");
            }
            tree.insert(
                name.to_string(),
                TreeEntry::new(kind, ObjectId::try_parse(oid.to_string())?),
            )?;
        }

        Ok(tree)
    }
}

/// Recursive table of contents, the input shape for writing trees. Leaves
/// are blob hashes; interior nodes are named sub-directories.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum TocNode {
    Blob(ObjectId),
    Dir(BTreeMap<String, TocNode>),
}

impl TocNode {
    pub fn empty_dir() -> Self {
        TocNode::Dir(BTreeMap::new())
    }
}

/// Nest a flat TOC into the recursive shape `write_tree` consumes.
///
/// Equal flat TOCs nest identically, so tree writing stays deterministic.
pub fn nest_toc(flat: &Toc) -> anyhow::Result<TocNode> {
    let mut root = BTreeMap::new();

    for (path, oid) in flat {
        let segments = path
            .components()
            .map(|c| match c {
                Component::Normal(s) => s
                    .to_str()
                    .map(|s| s.to_string())
                    .context("non UTF-8 path segment"),
                _ => Err(anyhow::anyhow!("non-relative path in TOC: {:?}", path)),
            })
            .collect::<anyhow::Result<Vec<_>>>()?;

        insert_nested(&mut root, &segments, oid)
            .with_context(|| format!("cannot nest path {:?}", path))?;
    }

    Ok(TocNode::Dir(root))
}

fn insert_nested(
    dir: &mut BTreeMap<String, TocNode>,
    segments: &[String],
    oid: &ObjectId,
) -> anyhow::Result<()> {
    match segments {
        [] => anyhow::bail!("empty path"),
        [leaf] => {
            dir.insert(leaf.clone(), TocNode::Blob(oid.clone()));
            Ok(())
        }
        [head, rest @ ..] => {
            let child = dir
                .entry(head.clone())
                .or_insert_with(TocNode::empty_dir);
            match child {
                TocNode::Dir(sub) => insert_nested(sub, rest, oid),
                TocNode::Blob(_) => anyhow::bail!("path segment {:?} is both file and directory", head),
            }
        }
    }
}

/// Join a directory prefix and an entry name into a TOC path.
pub fn join_toc_path(prefix: &Path, name: &str) -> PathBuf {
    if prefix.as_os_str().is_empty() {
        PathBuf::from(name)
    } else {
        prefix.join(name)
    }
}
