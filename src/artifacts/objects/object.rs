//! The object sum type and its canonical serialization
//!
//! The three object kinds form a closed sum. Every object is stored as
//!
//! ```text
//! <type> <payload-len>\0<payload>
//! ```
//!
//! and its ID is the SHA-1 digest of exactly those bytes. The header makes
//! decoding self-describing, and hashing the full serialization keeps blobs,
//! trees, and commits with coincidentally equal payloads distinct.

use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::Commit;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use crate::artifacts::objects::tree::Tree;
use anyhow::Context;
use bytes::Bytes;
use sha1::{Digest, Sha1};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Object {
    Blob(Blob),
    Tree(Tree),
    Commit(Commit),
}

impl Object {
    pub fn object_type(&self) -> ObjectType {
        match self {
            Object::Blob(_) => ObjectType::Blob,
            Object::Tree(_) => ObjectType::Tree,
            Object::Commit(_) => ObjectType::Commit,
        }
    }

    /// Canonical bytes: header plus payload.
    pub fn serialize(&self) -> Bytes {
        let payload = match self {
            Object::Blob(blob) => blob.serialize_payload(),
            Object::Tree(tree) => tree.serialize_payload(),
            Object::Commit(commit) => commit.serialize_payload(),
        };

        let mut bytes = Vec::with_capacity(payload.len() + 16);
        bytes.extend_from_slice(
            format!("{} {}\0", self.object_type().as_str(), payload.len()).as_bytes(),
        );
        bytes.extend_from_slice(&payload);
        Bytes::from(bytes)
    }

    /// Decode canonical bytes. A record that does not parse as any known
    /// variant is corruption, which callers treat as fatal.
    pub fn deserialize(bytes: &[u8]) -> anyhow::Result<Self> {
        let nul = bytes
            .iter()
            .position(|&b| b == 0)
            .context("object record missing header terminator")?;
        let header = std::str::from_utf8(&bytes[..nul]).context("object header is not UTF-8")?;

        let mut parts = header.splitn(2, ' ');
        let kind = parts.next().context("object header missing type")?;
        let len = parts
            .next()
            .context("object header missing length")?
            .parse::<usize>()
            .context("object header has invalid length")?;

        let payload = &bytes[nul + 1..];
        if payload.len() != len {
            anyhow::bail!(
                "object payload length mismatch: header says {}, found {}",
                len,
                payload.len()
            );
        }
        let payload = Bytes::copy_from_slice(payload);

        match ObjectType::try_parse(kind)? {
            ObjectType::Blob => Ok(Object::Blob(Blob::deserialize_payload(payload))),
            ObjectType::Tree => Ok(Object::Tree(Tree::deserialize_payload(payload)?)),
            ObjectType::Commit => Ok(Object::Commit(Commit::deserialize_payload(payload)?)),
        }
    }

    /// The content address: SHA-1 over the canonical serialization.
    pub fn object_id(&self) -> anyhow::Result<ObjectId> {
        let mut hasher = Sha1::new();
        hasher.update(self.serialize());

        let digest = hasher.finalize();
        ObjectId::try_parse(format!("{digest:x}"))
    }

    pub fn as_blob(&self) -> Option<&Blob> {
        match self {
            Object::Blob(blob) => Some(blob),
            _ => None,
        }
    }

    pub fn as_tree(&self) -> Option<&Tree> {
        match self {
            Object::Tree(tree) => Some(tree),
            _ => None,
        }
    }

    pub fn as_commit(&self) -> Option<&Commit> {
        match self {
            Object::Commit(commit) => Some(commit),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::tree::TreeEntry;
    use pretty_assertions::assert_eq;

    fn oid(seed: u8) -> ObjectId {
        ObjectId::try_parse(format!("{:02x}", seed).repeat(20)).unwrap()
    }

    #[test]
    fn blob_round_trips_through_canonical_bytes() {
        let object = Object::Blob(Blob::new(Bytes::from_static(b"1\n")));
        let decoded = Object::deserialize(&object.serialize()).unwrap();
        assert_eq!(decoded, object);
    }

    #[test]
    fn tree_round_trips_through_canonical_bytes() {
        let mut tree = Tree::default();
        tree.insert("a.txt".to_string(), TreeEntry::new(ObjectType::Blob, oid(1)))
            .unwrap();
        let object = Object::Tree(tree);
        let decoded = Object::deserialize(&object.serialize()).unwrap();
        assert_eq!(decoded, object);
    }

    #[test]
    fn commit_round_trips_through_canonical_bytes() {
        let object = Object::Commit(Commit::new(oid(1), vec![oid(2)], "c1".to_string()));
        let decoded = Object::deserialize(&object.serialize()).unwrap();
        assert_eq!(decoded, object);
    }

    #[test]
    fn equal_content_hashes_identically() {
        let a = Object::Blob(Blob::new(Bytes::from_static(b"same")));
        let b = Object::Blob(Blob::new(Bytes::from_static(b"same")));
        assert_eq!(a.object_id().unwrap(), b.object_id().unwrap());
    }

    #[test]
    fn kinds_with_equal_payloads_hash_differently() {
        // an empty blob and an empty tree share a payload but not a header
        let blob = Object::Blob(Blob::new(Bytes::new()));
        let tree = Object::Tree(Tree::default());
        assert_ne!(blob.object_id().unwrap(), tree.object_id().unwrap());
    }

    #[test]
    fn garbage_bytes_are_rejected() {
        assert!(Object::deserialize(b"not an object").is_err());
        assert!(Object::deserialize(b"widget 4\0abcd").is_err());
        assert!(Object::deserialize(b"blob 10\0short").is_err());
    }
}
