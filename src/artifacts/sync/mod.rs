//! Object transfer between repositories
//!
//! Objects move between stores as raw canonical bytes keyed by hash, so a
//! transfer is idempotent and order-free: content addressing guarantees
//! that re-copying an object writes the same bytes to the same key. Sync
//! operations always move objects before touching any ref, so a crash
//! mid-transfer never leaves a ref pointing at an absent object.

pub(crate) mod peer;

use crate::areas::repository::Repository;
use peer::Peer;

/// Copy every peer object into the local store. Returns the number of
/// objects the peer holds.
pub fn copy_objects_from_peer(repo: &Repository, peer: &dyn Peer) -> anyhow::Result<usize> {
    let hashes = peer.all_hashes()?;
    for oid in &hashes {
        if repo.database().exists(oid) {
            continue;
        }
        let bytes = peer
            .read_raw(oid)?
            .ok_or_else(|| anyhow::anyhow!("peer listed {} but cannot produce it", oid))?;
        repo.database().store_raw(oid, bytes)?;
    }
    Ok(hashes.len())
}

/// Copy every local object to the peer. Returns the number of objects the
/// local store holds.
pub fn copy_objects_to_peer(repo: &Repository, peer: &dyn Peer) -> anyhow::Result<usize> {
    let hashes = repo.database().all_hashes()?;
    for oid in &hashes {
        let bytes = repo
            .database()
            .load_raw(oid)?
            .ok_or_else(|| anyhow::anyhow!("store listed {} but cannot produce it", oid))?;
        peer.write_raw(oid, bytes)?;
    }
    Ok(hashes.len())
}
