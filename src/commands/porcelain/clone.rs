use crate::artifacts::core::NitError;
use crate::artifacts::sync::peer::{LocalPeer, Peer};
use crate::areas::repository::Repository;
use std::io::Write;
use std::path::Path;

#[derive(Debug, Clone, Copy, Default)]
pub struct CloneOpts {
    pub bare: bool,
}

impl Repository {
    /// Copy a repository: init the target, register the source as `origin`,
    /// and fast-forward a fresh `master` to the source's `master` when it
    /// has one. The remote URL is recorded exactly as given.
    pub fn clone(
        remote_url: &str,
        target: &str,
        opts: CloneOpts,
        cwd: &Path,
        writer: &mut dyn Write,
    ) -> anyhow::Result<()> {
        let peer = LocalPeer::open(remote_url, cwd)?;

        let target_path = if Path::new(target).is_absolute() {
            Path::new(target).to_path_buf()
        } else {
            cwd.join(target)
        };
        if target_path.exists() && std::fs::read_dir(&target_path)?.next().is_some() {
            return Err(NitError::target_not_empty(target).into());
        }

        writeln!(writer, "Cloning into {}", target)?;

        Repository::create(&target_path, opts.bare)?;
        let repo = Repository::open(target_path, Box::new(std::io::sink()))?;
        repo.remote("add", "origin", remote_url)?;

        if let Some(remote_head) = peer.ref_hash("master")? {
            repo.fetch("origin", "master")?;
            repo.write_fast_forward_merge(None, &remote_head)?;
        }

        Ok(())
    }
}
