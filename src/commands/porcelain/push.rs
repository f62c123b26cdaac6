use crate::artifacts::core::NitError;
use crate::artifacts::sync::copy_objects_to_peer;
use crate::artifacts::sync::peer::{LocalPeer, Peer};
use crate::areas::refs::Refs;
use crate::areas::repository::Repository;
use std::io::Write;

impl Repository {
    /// Publish a local branch to a remote. Refused when it would move the
    /// remote's checked-out branch, and when the update is not a
    /// fast-forward unless forced.
    pub fn push(&self, remote: &str, branch: &str, force: bool) -> anyhow::Result<()> {
        let url = self
            .config()
            .remote_url(remote)
            .map(str::to_string)
            .ok_or_else(|| NitError::RemoteMissing {
                remote: remote.to_string(),
            })?;

        let peer = LocalPeer::open(&url, self.peer_base())?;
        if peer.is_checked_out(branch)? {
            return Err(NitError::CheckedOutBranch {
                branch: branch.to_string(),
            }
            .into());
        }

        let receiver = peer.ref_hash(branch)?;
        let giver = self
            .refs()
            .hash(self.database(), branch)?
            .ok_or_else(|| NitError::unknown_revision(branch))?;

        // the receiver may name a commit this store has never seen; that
        // can only happen when the remote is ahead, which is neither
        // up-to-date nor fast-forwardable from here
        let receiver_known = receiver
            .as_ref()
            .map(|oid| self.database().exists(oid))
            .unwrap_or(true);

        if receiver_known && self.is_up_to_date(receiver.as_ref(), Some(&giver))? {
            writeln!(self.writer(), "Already up-to-date")?;
            return Ok(());
        }

        let can_fast_forward =
            receiver_known && self.can_fast_forward(receiver.as_ref(), &giver)?;
        if !force && !can_fast_forward {
            return Err(NitError::NonFastForward { url }.into());
        }

        let count = copy_objects_to_peer(self, &peer)?;
        peer.update_ref(&Refs::to_local_ref(branch), giver.as_ref())?;
        self.update_ref(&Refs::to_remote_ref(remote, branch), giver.as_ref())?;

        writeln!(
            self.writer(),
            "To {}\nCount {}\n{} -> {}",
            url,
            count,
            branch,
            branch
        )?;

        Ok(())
    }
}
