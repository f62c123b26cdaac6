//! Commit graph algorithms: ancestry closure and merge-base search.

pub(crate) mod ancestry;
pub(crate) mod bca_finder;
