//! Peer handles
//!
//! A peer is another repository the sync engine can query and write to. The
//! trait carries exactly the operations fetch, push, and clone need; any
//! transport that can satisfy it would do. The one provided implementation
//! opens a second repository handle at a filesystem path, which is all the
//! same-machine design requires.

use crate::artifacts::core::NitError;
use crate::artifacts::objects::object_id::ObjectId;
use crate::areas::repository::Repository;
use bytes::Bytes;
use std::collections::BTreeSet;
use std::path::{Path, PathBuf};

pub trait Peer {
    /// The URL this peer was opened from, for reporting.
    fn url(&self) -> &str;

    /// Resolve a ref name to a commit hash in the peer's namespace.
    fn ref_hash(&self, name: &str) -> anyhow::Result<Option<ObjectId>>;

    /// Every object hash the peer stores.
    fn all_hashes(&self) -> anyhow::Result<BTreeSet<ObjectId>>;

    /// Raw canonical bytes of one object.
    fn read_raw(&self, oid: &ObjectId) -> anyhow::Result<Option<Bytes>>;

    /// Store raw canonical bytes under their hash.
    fn write_raw(&self, oid: &ObjectId, bytes: Bytes) -> anyhow::Result<()>;

    /// Whether `branch` is checked out in the peer's working copy.
    fn is_checked_out(&self, branch: &str) -> anyhow::Result<bool>;

    /// Run the peer's own ref update, including its commit-type check.
    fn update_ref(&self, ref_name: &str, target: &str) -> anyhow::Result<()>;
}

/// A peer reached by opening the repository at a local path.
pub struct LocalPeer {
    url: String,
    repo: Repository,
}

impl LocalPeer {
    /// Open the repository behind `url`. Relative URLs resolve against
    /// `base`; for a repository-initiated operation that is the parent of
    /// the repository root, which makes the common sibling layout
    /// (`clone ./src ./dst`, then push from inside `dst`) work with the URL
    /// stored verbatim.
    pub fn open(url: &str, base: &Path) -> anyhow::Result<Self> {
        let path = Self::resolve(url, base);
        let root = match Repository::find_root(&path) {
            Ok(Some(root)) if root == path.canonicalize().unwrap_or(path.clone()) => root,
            _ => {
                return Err(NitError::RemoteMissing {
                    remote: url.to_string(),
                }
                .into())
            }
        };

        let repo = Repository::open(root, Box::new(std::io::sink()))?;
        Ok(LocalPeer {
            url: url.to_string(),
            repo,
        })
    }

    fn resolve(url: &str, base: &Path) -> PathBuf {
        let url_path = Path::new(url);
        if url_path.is_absolute() {
            url_path.to_path_buf()
        } else {
            base.join(url_path)
        }
    }
}

impl Peer for LocalPeer {
    fn url(&self) -> &str {
        &self.url
    }

    fn ref_hash(&self, name: &str) -> anyhow::Result<Option<ObjectId>> {
        self.repo.refs().hash(self.repo.database(), name)
    }

    fn all_hashes(&self) -> anyhow::Result<BTreeSet<ObjectId>> {
        self.repo.database().all_hashes()
    }

    fn read_raw(&self, oid: &ObjectId) -> anyhow::Result<Option<Bytes>> {
        self.repo.database().load_raw(oid)
    }

    fn write_raw(&self, oid: &ObjectId, bytes: Bytes) -> anyhow::Result<()> {
        self.repo.database().store_raw(oid, bytes)
    }

    fn is_checked_out(&self, branch: &str) -> anyhow::Result<bool> {
        self.repo.is_checked_out(branch)
    }

    fn update_ref(&self, ref_name: &str, target: &str) -> anyhow::Result<()> {
        self.repo.update_ref(ref_name, target)
    }
}
