//! Commit objects
//!
//! A commit names a tree, an ordered list of parent commits (zero for the
//! initial commit, two for merges, with the receiver first), and a message.
//! Commits carry no author or timestamp, so equal logical content always
//! hashes identically.
//!
//! Payload grammar:
//!
//! ```text
//! tree <hash>
//! parent <hash>        (zero, one, or two lines, insertion order)
//!
//! <message>
//! ```

use crate::artifacts::objects::object_id::ObjectId;
use anyhow::Context;
use bytes::Bytes;

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Commit {
    tree_oid: ObjectId,
    parents: Vec<ObjectId>,
    message: String,
}

impl Commit {
    pub fn new(tree_oid: ObjectId, parents: Vec<ObjectId>, message: String) -> Self {
        Commit {
            tree_oid,
            parents,
            message,
        }
    }

    pub fn tree_oid(&self) -> &ObjectId {
        &self.tree_oid
    }

    pub fn parents(&self) -> &[ObjectId] {
        &self.parents
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    /// First line of the message, for compact reporting.
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn serialize_payload(&self) -> Bytes {
        let mut lines = vec![format!("tree {}", self.tree_oid.as_ref())];
        for parent in &self.parents {
            lines.push(format!("parent {}", parent.as_ref()));
        }
        lines.push(String::new());
        lines.push(self.message.clone());

        Bytes::from(lines.join("\n"))
    }

    pub fn deserialize_payload(payload: Bytes) -> anyhow::Result<Self> {
        let content =
            String::from_utf8(payload.to_vec()).context("commit payload is not valid UTF-8")?;
        let mut lines = content.lines();

        let tree_line = lines.next().context("commit missing tree line")?;
        let tree_oid = tree_line
            .strip_prefix("tree ")
            .context("commit has invalid tree line")?;
        let tree_oid = ObjectId::try_parse(tree_oid.to_string())?;

        let mut parents = Vec::new();
        let mut next_line = lines.next();
        while let Some(line) = next_line {
            match line.strip_prefix("parent ") {
                Some(parent) => {
                    parents.push(ObjectId::try_parse(parent.to_string())?);
                    next_line = lines.next();
                }
                None => break,
            }
        }

        // next_line is the blank separator, or absent for an empty message
        let message = lines.collect::<Vec<&str>>().join("\n");

        Ok(Commit::new(tree_oid, parents, message))
    }
}
