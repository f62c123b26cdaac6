//! Low-level ref update with the commit-type guard.

use crate::artifacts::core::NitError;
use crate::artifacts::objects::object_type::ObjectType;
use crate::areas::refs::Refs;
use crate::areas::repository::Repository;

impl Repository {
    /// Point `ref_to_update` at whatever `target` resolves to. The target
    /// must resolve to an existing commit, and the ref name must pass the
    /// ref grammar; unlike the quiet low-level write, this entry point
    /// rejects bad names loudly.
    pub fn update_ref(&self, ref_to_update: &str, target: &str) -> anyhow::Result<()> {
        let oid = self
            .refs()
            .hash(self.database(), target)?
            .ok_or_else(|| NitError::unknown_revision(target))?;

        let terminal = self.refs().terminal_ref(ref_to_update)?;
        if !Refs::is_ref(&terminal) {
            return Err(NitError::InvalidRefName {
                name: ref_to_update.to_string(),
            }
            .into());
        }

        match self.database().object_type(&oid)? {
            Some(ObjectType::Commit) => {}
            Some(kind) => {
                return Err(NitError::WrongObjectType {
                    kind: kind.to_string(),
                }
                .into())
            }
            None => return Err(NitError::unknown_revision(target).into()),
        }

        self.refs().write(&terminal, oid.as_ref())
    }
}
