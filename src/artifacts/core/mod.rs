//! Closed error taxonomy
//!
//! Every failure the engine can surface is a variant of [`NitError`]. The
//! display strings are the stable, user-facing wording; porcelain never
//! invents its own failure text. Informational outcomes ("Already
//! up-to-date", "Fast-forward", ...) are ordinary return values, not errors.

use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum NitError {
    #[error("not in a nit repository")]
    NotInRepo,

    #[error("this operation must be run in a work tree")]
    BareDisallowed,

    #[error("{path} did not match any files")]
    NoMatch { path: String },

    #[error("unsupported")]
    UnsupportedFlag,

    #[error("{message}")]
    PathIsDirectory { message: String },

    #[error("local changes would be lost\n{paths}")]
    DirtyCheckout { paths: String },

    #[error("local changes would be lost\n{paths}")]
    DirtyMerge { paths: String },

    #[error("cannot commit because you have unmerged files\n{paths}")]
    UnresolvedConflicts { paths: String },

    #[error("# On {head}\nnothing to commit, working directory clean")]
    NothingToCommit { head: String },

    #[error("{name} not a valid object name")]
    UnknownRevision { name: String },

    #[error("expected commit, got {kind}")]
    WrongObjectType { kind: String },

    #[error("invalid ref name {name}")]
    InvalidRefName { name: String },

    #[error("{remote} does not appear to be a nit repository")]
    RemoteMissing { remote: String },

    #[error("couldn't find remote ref {branch}")]
    RemoteRefMissing { branch: String },

    #[error("failed to push some refs to {url}")]
    NonFastForward { url: String },

    #[error("refusing to update checked out branch {branch}")]
    CheckedOutBranch { branch: String },

    #[error("{message}")]
    AlreadyExists { message: String },

    #[error("object {hash} is corrupt")]
    Corruption { hash: String },
}

impl NitError {
    pub fn no_match(path: impl std::fmt::Display) -> Self {
        NitError::NoMatch {
            path: path.to_string(),
        }
    }

    pub fn directory_needs_contents(path: impl std::fmt::Display) -> Self {
        NitError::PathIsDirectory {
            message: format!("{} is a directory - add files inside instead", path),
        }
    }

    pub fn directory_needs_recursive(path: impl std::fmt::Display) -> Self {
        NitError::PathIsDirectory {
            message: format!("not removing {} recursively without -r", path),
        }
    }

    pub fn branch_already_exists(name: &str) -> Self {
        NitError::AlreadyExists {
            message: format!("A branch named {} already exists", name),
        }
    }

    pub fn remote_already_exists(name: &str) -> Self {
        NitError::AlreadyExists {
            message: format!("remote {} already exists", name),
        }
    }

    pub fn target_not_empty(path: impl std::fmt::Display) -> Self {
        NitError::AlreadyExists {
            message: format!("{} already exists and is not empty", path),
        }
    }

    pub fn unknown_revision(name: impl std::fmt::Display) -> Self {
        NitError::UnknownRevision {
            name: name.to_string(),
        }
    }
}

/// Join paths into the newline-separated block used by the dirty and
/// unmerged error variants.
pub fn path_block<P: AsRef<std::path::Path>>(paths: &[P]) -> String {
    paths
        .iter()
        .map(|p| p.as_ref().display().to_string())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;

    #[test]
    fn display_strings_are_stable() {
        assert_eq!(NitError::NotInRepo.to_string(), "not in a nit repository");
        assert_eq!(
            NitError::no_match("a.txt").to_string(),
            "a.txt did not match any files"
        );
        assert_eq!(
            NitError::NothingToCommit {
                head: "master".to_string()
            }
            .to_string(),
            "# On master\nnothing to commit, working directory clean"
        );
        assert_eq!(
            NitError::NonFastForward {
                url: "./src".to_string()
            }
            .to_string(),
            "failed to push some refs to ./src"
        );
    }

    #[test]
    fn already_exists_flavors() {
        assert_eq!(
            NitError::branch_already_exists("feat").to_string(),
            "A branch named feat already exists"
        );
        assert_eq!(
            NitError::remote_already_exists("origin").to_string(),
            "remote origin already exists"
        );
    }
}
