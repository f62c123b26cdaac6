use crate::areas::repository::Repository;

impl Repository {
    /// Fetch, then merge the fetched branch through FETCH_HEAD.
    pub fn pull(&self, remote: &str, branch: &str) -> anyhow::Result<()> {
        self.assert_not_bare()?;
        self.fetch(remote, branch)?;
        self.merge("FETCH_HEAD")
    }
}
