//! Staging index
//!
//! The index maps `(path, stage)` to a blob hash. Stage 0 is a normally
//! staged file; stages 1/2/3 hold the base/ours/theirs sides of an
//! unresolved conflict. A path is conflicted when any of stages 1..3 is
//! present, and the invariant that stage 0 never coexists with stages 1..3
//! is enforced on every mutation.
//!
//! The file is line-structured text, one entry per line:
//!
//! ```text
//! <hash> <stage>\t<path>
//! ```
//!
//! rewritten whole under an exclusive advisory lock on every save.

use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::tree::Toc;
use anyhow::Context;
use file_guard::Lock;
use std::collections::BTreeMap;
use std::io::Write;
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

/// Conflict stage of an index entry.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub enum Stage {
    Normal,
    Base,
    Ours,
    Theirs,
}

impl Stage {
    pub fn as_u8(&self) -> u8 {
        match self {
            Stage::Normal => 0,
            Stage::Base => 1,
            Stage::Ours => 2,
            Stage::Theirs => 3,
        }
    }

    pub fn try_parse(value: u8) -> anyhow::Result<Self> {
        match value {
            0 => Ok(Stage::Normal),
            1 => Ok(Stage::Base),
            2 => Ok(Stage::Ours),
            3 => Ok(Stage::Theirs),
            other => Err(anyhow::anyhow!("invalid index stage {}", other)),
        }
    }

    const CONFLICT_STAGES: [Stage; 3] = [Stage::Base, Stage::Ours, Stage::Theirs];
}

#[derive(Debug)]
pub struct Index {
    path: Box<Path>,
    entries: BTreeMap<(PathBuf, Stage), ObjectId>,
}

impl Index {
    pub fn new(path: Box<Path>) -> Self {
        Index {
            path,
            entries: BTreeMap::new(),
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Load entries from disk, replacing the in-memory table.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.entries.clear();

        if !self.path.exists() {
            return Ok(());
        }
        let content = std::fs::read_to_string(&self.path)
            .with_context(|| format!("unable to read index file {:?}", self.path))?;

        for (number, line) in content.lines().enumerate() {
            let (front, path) = line
                .split_once('\t')
                .with_context(|| format!("malformed index line {}", number + 1))?;
            let (hash, stage) = front
                .split_once(' ')
                .with_context(|| format!("malformed index line {}", number + 1))?;

            let oid = ObjectId::try_parse(hash.to_string())?;
            let stage = Stage::try_parse(
                stage
                    .parse::<u8>()
                    .with_context(|| format!("malformed index stage on line {}", number + 1))?,
            )?;
            self.entries.insert((PathBuf::from(path), stage), oid);
        }

        Ok(())
    }

    /// Rewrite the index file from the in-memory table.
    pub fn write_updates(&self) -> anyhow::Result<()> {
        let mut index_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&self.path)
            .with_context(|| format!("unable to open index file {:?}", self.path))?;
        let mut lock = file_guard::lock(&mut index_file, Lock::Exclusive, 0, 1)?;

        let mut out = String::new();
        for ((path, stage), oid) in &self.entries {
            out.push_str(&format!("{} {}\t{}\n", oid, stage.as_u8(), path.display()));
        }
        lock.deref_mut().write_all(out.as_bytes())?;

        Ok(())
    }

    /// Table of contents over stage-0 entries.
    pub fn toc(&self) -> Toc {
        self.entries
            .iter()
            .filter(|((_, stage), _)| *stage == Stage::Normal)
            .map(|((path, _), oid)| (path.clone(), oid.clone()))
            .collect()
    }

    pub fn has_file(&self, path: &Path, stage: Stage) -> bool {
        self.entries.contains_key(&(path.to_path_buf(), stage))
    }

    pub fn entry(&self, path: &Path, stage: Stage) -> Option<&ObjectId> {
        self.entries.get(&(path.to_path_buf(), stage))
    }

    pub fn is_file_in_conflict(&self, path: &Path) -> bool {
        Stage::CONFLICT_STAGES
            .iter()
            .any(|stage| self.has_file(path, *stage))
    }

    pub fn conflicted_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self
            .entries
            .keys()
            .filter(|(_, stage)| *stage != Stage::Normal)
            .map(|(path, _)| path.clone())
            .collect();
        paths.dedup();
        paths
    }

    /// Every tracked path, at any stage.
    pub fn tracked_paths(&self) -> Vec<PathBuf> {
        let mut paths: Vec<PathBuf> = self.entries.keys().map(|(path, _)| path.clone()).collect();
        paths.dedup();
        paths
    }

    /// Index paths under `path`, which may name a file or a directory
    /// prefix. `.` and the empty path match everything.
    pub fn matching_files(&self, path: &Path) -> Vec<PathBuf> {
        self.tracked_paths()
            .into_iter()
            .filter(|tracked| {
                if path == Path::new(".") || path.as_os_str().is_empty() {
                    return true;
                }
                tracked == path || tracked.starts_with(path)
            })
            .collect()
    }

    /// Stage a file normally, clearing any conflict stages for the path.
    pub fn write_non_conflict(&mut self, path: &Path, oid: ObjectId) {
        for stage in Stage::CONFLICT_STAGES {
            self.entries.remove(&(path.to_path_buf(), stage));
        }
        self.entries.insert((path.to_path_buf(), Stage::Normal), oid);
    }

    /// Drop every stage for the path.
    pub fn write_rm(&mut self, path: &Path) {
        self.entries.remove(&(path.to_path_buf(), Stage::Normal));
        for stage in Stage::CONFLICT_STAGES {
            self.entries.remove(&(path.to_path_buf(), stage));
        }
    }

    /// Record an unresolved conflict. Absent sides (a deletion against a
    /// modification, or no base version) simply leave their stage out.
    pub fn write_conflict(
        &mut self,
        path: &Path,
        base: Option<ObjectId>,
        ours: Option<ObjectId>,
        theirs: Option<ObjectId>,
    ) {
        self.entries.remove(&(path.to_path_buf(), Stage::Normal));
        for (stage, oid) in [
            (Stage::Base, base),
            (Stage::Ours, ours),
            (Stage::Theirs, theirs),
        ] {
            match oid {
                Some(oid) => {
                    self.entries.insert((path.to_path_buf(), stage), oid);
                }
                None => {
                    self.entries.remove(&(path.to_path_buf(), stage));
                }
            }
        }
    }

    /// Replace the entire index with a stage-0 mapping.
    pub fn toc_to_index(&mut self, toc: &Toc) {
        self.entries = toc
            .iter()
            .map(|(path, oid)| ((path.clone(), Stage::Normal), oid.clone()))
            .collect();
    }
}
