//! Object model: blobs, trees, commits, and their content addressing.

pub(crate) mod blob;
pub(crate) mod commit;
pub(crate) mod object;
pub(crate) mod object_id;
pub(crate) mod object_type;
pub(crate) mod tree;

/// Length of an object ID in hex characters (SHA-1).
pub const OBJECT_ID_LENGTH: usize = 40;
