//! Repository handle
//!
//! A `Repository` owns the root path and the four areas (database, index,
//! refs, workspace) plus the configuration, and is the receiver for every
//! porcelain and plumbing operation. Nothing in the core consults the
//! ambient working directory: `discover` is the one adapter that walks
//! parents looking for a repository, and it is only called from the CLI
//! driver and from peers opening a repository by path.

use crate::artifacts::core::NitError;
use crate::areas::config::Config;
use crate::areas::database::Database;
use crate::areas::index::Index;
use crate::areas::refs::Refs;
use crate::areas::workspace::Workspace;
use anyhow::Context;
use std::cell::{Ref, RefCell, RefMut};
use std::io::Write;
use std::path::{Component, Path, PathBuf};

/// Repository directory name for non-bare repositories.
pub const REPO_DIR: &str = ".version";

/// Object database directory name.
const DATABASE_DIR: &str = "objects";

/// Index file name.
const INDEX_FILE: &str = "index";

/// Config file name.
const CONFIG_FILE: &str = "config";

pub struct Repository {
    /// Working tree root; for a bare repository, the repository root itself.
    root: Box<Path>,
    /// Directory holding HEAD, objects, refs and config.
    repo_path: Box<Path>,
    /// Output writer (stdout, or a sink for peer handles).
    writer: RefCell<Box<dyn Write>>,
    config: RefCell<Config>,
    database: Database,
    index: RefCell<Index>,
    refs: Refs,
    workspace: Workspace,
}

impl std::fmt::Debug for Repository {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("Repository")
            .field("root", &self.root)
            .field("repo_path", &self.repo_path)
            .finish_non_exhaustive()
    }
}

impl Repository {
    /// Open the repository rooted exactly at `root`.
    pub fn open(root: PathBuf, writer: Box<dyn Write>) -> anyhow::Result<Self> {
        let root = root
            .canonicalize()
            .with_context(|| format!("unable to resolve repository root {:?}", root))?;

        let repo_path = if root.join(REPO_DIR).is_dir() {
            root.join(REPO_DIR)
        } else {
            root.clone()
        };
        if !repo_path.join("HEAD").is_file() || !repo_path.join(CONFIG_FILE).is_file() {
            return Err(NitError::NotInRepo.into());
        }

        let config = Config::load(&repo_path.join(CONFIG_FILE))?;
        let database = Database::new(repo_path.join(DATABASE_DIR).into_boxed_path());
        let refs = Refs::new(repo_path.clone().into_boxed_path());
        let workspace = Workspace::new(root.clone().into_boxed_path());

        let mut index = Index::new(repo_path.join(INDEX_FILE).into_boxed_path());
        index.rehydrate()?;

        Ok(Repository {
            root: root.into_boxed_path(),
            repo_path: repo_path.into_boxed_path(),
            writer: RefCell::new(writer),
            config: RefCell::new(config),
            database,
            index: RefCell::new(index),
            refs,
            workspace,
        })
    }

    /// Walk parent directories from `start` until a repository root is
    /// found. This is the only ambient-directory lookup in the engine.
    pub fn discover(start: &Path, writer: Box<dyn Write>) -> anyhow::Result<Self> {
        match Self::find_root(start)? {
            Some(root) => Self::open(root, writer),
            None => Err(NitError::NotInRepo.into()),
        }
    }

    pub fn find_root(start: &Path) -> anyhow::Result<Option<PathBuf>> {
        let start = start
            .canonicalize()
            .with_context(|| format!("unable to resolve path {:?}", start))?;

        let mut dir = Some(start.as_path());
        while let Some(current) = dir {
            if current.join(REPO_DIR).join("HEAD").is_file() {
                return Ok(Some(current.to_path_buf()));
            }
            let config_path = current.join(CONFIG_FILE);
            if current.join("HEAD").is_file() && config_path.is_file() {
                if Config::load(&config_path)?.is_bare() {
                    return Ok(Some(current.to_path_buf()));
                }
            }
            dir = current.parent();
        }

        Ok(None)
    }

    pub fn is_in_repo(path: &Path) -> bool {
        matches!(Self::find_root(path), Ok(Some(_)))
    }

    /// Create the repository structure at `root`. Returns `false` when
    /// `root` already sits inside a repository, in which case nothing is
    /// touched.
    pub fn create(root: &Path, bare: bool) -> anyhow::Result<bool> {
        std::fs::create_dir_all(root)
            .with_context(|| format!("unable to create directory {:?}", root))?;
        if Self::is_in_repo(root) {
            return Ok(false);
        }

        let repo_path = if bare {
            root.to_path_buf()
        } else {
            root.join(REPO_DIR)
        };
        std::fs::create_dir_all(repo_path.join(DATABASE_DIR))?;
        std::fs::create_dir_all(repo_path.join("refs").join("heads"))?;
        std::fs::write(repo_path.join("HEAD"), "ref: refs/heads/master\n")?;
        Config::with_bare(bare).save(&repo_path.join(CONFIG_FILE))?;

        Ok(true)
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    pub fn repo_path(&self) -> &Path {
        &self.repo_path
    }

    pub fn writer(&'_ self) -> RefMut<'_, Box<dyn Write>> {
        self.writer.borrow_mut()
    }

    pub fn database(&self) -> &Database {
        &self.database
    }

    pub fn refs(&self) -> &Refs {
        &self.refs
    }

    pub fn workspace(&self) -> &Workspace {
        &self.workspace
    }

    pub fn index(&'_ self) -> RefMut<'_, Index> {
        self.index.borrow_mut()
    }

    pub fn config(&'_ self) -> Ref<'_, Config> {
        self.config.borrow()
    }

    pub fn config_mut(&'_ self) -> RefMut<'_, Config> {
        self.config.borrow_mut()
    }

    pub fn save_config(&self) -> anyhow::Result<()> {
        self.config.borrow().save(&self.repo_path.join(CONFIG_FILE))
    }

    pub fn is_bare(&self) -> bool {
        self.config.borrow().is_bare()
    }

    pub fn assert_not_bare(&self) -> anyhow::Result<()> {
        if self.is_bare() {
            return Err(NitError::BareDisallowed.into());
        }
        Ok(())
    }

    /// Whether `branch` is the currently checked-out branch. Bare
    /// repositories have no checkout, so this is always false for them.
    pub fn is_checked_out(&self, branch: &str) -> anyhow::Result<bool> {
        if self.is_bare() {
            return Ok(false);
        }
        Ok(self.refs.head_branch_name()?.as_deref() == Some(branch))
    }

    /// Base directory for resolving relative remote URLs: the parent of the
    /// repository root, so sibling repositories can point at each other
    /// with the URL recorded verbatim.
    pub fn peer_base(&self) -> &Path {
        self.root.parent().unwrap_or(&self.root)
    }

    /// Branch name for reporting, or "detached HEAD".
    pub fn head_description(&self) -> anyhow::Result<String> {
        Ok(self
            .refs
            .head_branch_name()?
            .unwrap_or_else(|| "detached HEAD".to_string()))
    }

    /// Turn a user-supplied path, interpreted relative to `cwd`, into a
    /// repository-relative path.
    pub fn relativize(&self, cwd: &Path, arg: &Path) -> anyhow::Result<PathBuf> {
        let absolute = if arg.is_absolute() {
            normalize(arg)
        } else {
            normalize(&cwd.join(arg))
        };

        absolute
            .strip_prefix(self.root.as_ref())
            .map(Path::to_path_buf)
            .map_err(|_| NitError::no_match(arg.display()).into())
    }
}

/// Collapse `.` and `..` components without touching the filesystem.
fn normalize(path: &Path) -> PathBuf {
    let mut result = PathBuf::new();
    for component in path.components() {
        match component {
            Component::CurDir => {}
            Component::ParentDir => {
                result.pop();
            }
            other => result.push(other),
        }
    }
    result
}
