use crate::artifacts::core::NitError;
use crate::areas::repository::Repository;

impl Repository {
    /// Record a named remote. Only `add` is supported.
    pub fn remote(&self, command: &str, name: &str, url: &str) -> anyhow::Result<()> {
        if command != "add" {
            return Err(NitError::UnsupportedFlag.into());
        }
        if self.config().has_remote(name) {
            return Err(NitError::remote_already_exists(name).into());
        }

        self.config_mut().add_remote(name, url);
        self.save_config()
    }
}
