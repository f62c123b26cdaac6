use crate::artifacts::core::NitError;
use crate::artifacts::sync::peer::{LocalPeer, Peer};
use crate::artifacts::sync::copy_objects_from_peer;
use crate::areas::refs::Refs;
use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Bring a remote branch's history into the local store and advance the
    /// remote-tracking ref. Objects are copied before the ref moves, so an
    /// interrupted fetch never leaves a dangling ref.
    pub fn fetch(&self, remote: &str, branch: &str) -> anyhow::Result<()> {
        let url = self
            .config()
            .remote_url(remote)
            .map(str::to_string)
            .ok_or_else(|| NitError::RemoteMissing {
                remote: remote.to_string(),
            })?;

        let peer = LocalPeer::open(&url, self.peer_base())?;
        let new = peer
            .ref_hash(branch)?
            .ok_or_else(|| NitError::RemoteRefMissing {
                branch: branch.to_string(),
            })?;

        let remote_ref = Refs::to_remote_ref(remote, branch);
        let old = self.refs().hash(self.database(), &remote_ref)?;

        let count = copy_objects_from_peer(self, &peer)?;
        self.update_ref(&remote_ref, new.as_ref())?;
        self.refs().write_fetch_head(&new, branch, &url)?;

        let forced = if self.is_a_force_fetch(old.as_ref(), &new)? {
            " (forced)"
        } else {
            ""
        };
        writeln!(
            self.writer(),
            "From {}\nCount {}\n{} -> {}/{}{}",
            url,
            count,
            branch,
            remote,
            branch,
            forced
        )?;

        Ok(())
    }
}
