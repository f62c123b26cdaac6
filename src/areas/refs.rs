//! Ref namespace
//!
//! Refs are named pointers into the object graph, stored one file per ref
//! under the repository directory:
//!
//! - `HEAD` is symbolic (`ref: refs/heads/<b>`) when attached, or a raw
//!   commit hash when detached;
//! - `MERGE_HEAD` and `FETCH_HEAD` are transient operational refs;
//! - `refs/heads/<name>` are local branches, `refs/remotes/<r>/<name>`
//!   remote-tracking branches.
//!
//! Branch and remote names are restricted to `[A-Za-z-]+`. Ref files are
//! rewritten whole under an exclusive advisory lock.

use crate::artifacts::objects::object_id::ObjectId;
use crate::areas::database::Database;
use anyhow::Context;
use derive_new::new;
use file_guard::Lock;
use std::collections::BTreeMap;
use std::io::Write;
use std::ops::DerefMut;
use std::path::Path;

const REF_NAME_REGEX: &str =
    r"^(HEAD|FETCH_HEAD|MERGE_HEAD|refs/heads/[A-Za-z-]+|refs/remotes/[A-Za-z-]+/[A-Za-z-]+)$";

const SYMBOLIC_PREFIX: &str = "ref: ";
const MERGE_MSG: &str = "MERGE_MSG";

#[derive(Debug, new)]
pub struct Refs {
    /// Repository directory holding HEAD, refs/ and the transient files.
    path: Box<Path>,
}

impl Refs {
    /// Syntactic validation. Total and deterministic over all strings.
    pub fn is_ref(name: &str) -> bool {
        let re = regex::Regex::new(REF_NAME_REGEX).expect("ref name grammar must compile");
        re.is_match(name)
    }

    pub fn to_local_ref(name: &str) -> String {
        format!("refs/heads/{}", name)
    }

    pub fn to_remote_ref(remote: &str, branch: &str) -> String {
        format!("refs/remotes/{}/{}", remote, branch)
    }

    /// Resolve symbolic layers down to a concrete ref name. An attached
    /// `HEAD` resolves to its branch; qualified names pass through; anything
    /// else is treated as an unqualified local branch.
    pub fn terminal_ref(&self, name: &str) -> anyhow::Result<String> {
        if name == "HEAD" && !self.is_head_detached()? {
            let head = self.read_repo_file("HEAD")?.unwrap_or_default();
            return head
                .strip_prefix(SYMBOLIC_PREFIX)
                .map(|target| target.trim().to_string())
                .context("HEAD is attached but not symbolic");
        }
        if Self::is_ref(name) {
            return Ok(name.to_string());
        }
        Ok(Self::to_local_ref(name))
    }

    /// Resolve a ref name or raw hash to a commit hash, or `None` when
    /// nothing stands behind the name. `FETCH_HEAD` resolves through the
    /// record matching the currently checked-out branch.
    pub fn hash(&self, database: &Database, name_or_hash: &str) -> anyhow::Result<Option<ObjectId>> {
        if let Ok(oid) = ObjectId::try_parse(name_or_hash.to_string()) {
            if database.exists(&oid) {
                return Ok(Some(oid));
            }
        }

        let terminal = self.terminal_ref(name_or_hash)?;
        if terminal == "FETCH_HEAD" {
            let Some(branch) = self.head_branch_name()? else {
                return Ok(None);
            };
            return self.fetch_head_branch_hash(&branch);
        }

        match self.read_repo_file(&terminal)? {
            None => Ok(None),
            Some(content) => Ok(Some(ObjectId::try_parse(content.trim().to_string())?)),
        }
    }

    pub fn exists(&self, name: &str) -> bool {
        Self::is_ref(name) && self.path.join(name).is_file()
    }

    /// Stored content of a ref, or `None` when absent.
    pub fn read(&self, name: &str) -> anyhow::Result<Option<String>> {
        if !Self::is_ref(name) {
            return Ok(None);
        }
        self.read_repo_file(name)
    }

    /// Rewrite a ref. A name that fails ref syntax is silently ignored; the
    /// porcelain entry points validate loudly before getting here.
    pub fn write(&self, name: &str, content: &str) -> anyhow::Result<()> {
        if !Self::is_ref(name) {
            return Ok(());
        }
        self.write_repo_file(name, content)
    }

    pub fn rm(&self, name: &str) -> anyhow::Result<()> {
        if !Self::is_ref(name) {
            return Ok(());
        }
        let ref_path = self.path.join(name);
        if ref_path.exists() {
            std::fs::remove_file(&ref_path)
                .with_context(|| format!("unable to remove ref file {:?}", ref_path))?;
        }
        Ok(())
    }

    /// Branch name behind an attached HEAD, or `None` when detached.
    pub fn head_branch_name(&self) -> anyhow::Result<Option<String>> {
        let Some(head) = self.read_repo_file("HEAD")? else {
            return Ok(None);
        };
        Ok(head
            .strip_prefix(SYMBOLIC_PREFIX)
            .and_then(|target| target.trim().strip_prefix("refs/heads/"))
            .map(|branch| branch.to_string()))
    }

    pub fn is_head_detached(&self) -> anyhow::Result<bool> {
        match self.read_repo_file("HEAD")? {
            None => Ok(false),
            Some(head) => Ok(!head.starts_with(SYMBOLIC_PREFIX)),
        }
    }

    pub fn attach_head(&self, branch: &str) -> anyhow::Result<()> {
        self.write_repo_file("HEAD", &format!("{}{}", SYMBOLIC_PREFIX, Self::to_local_ref(branch)))
    }

    pub fn detach_head(&self, oid: &ObjectId) -> anyhow::Result<()> {
        self.write_repo_file("HEAD", oid.as_ref())
    }

    /// Local branches and the commits they point at.
    pub fn local_heads(&self) -> anyhow::Result<BTreeMap<String, ObjectId>> {
        let heads_path = self.path.join("refs").join("heads");
        let mut heads = BTreeMap::new();

        if !heads_path.exists() {
            return Ok(heads);
        }
        for entry in std::fs::read_dir(&heads_path)
            .with_context(|| format!("unable to list branches at {:?}", heads_path))?
        {
            let entry = entry?;
            if !entry.file_type()?.is_file() {
                continue;
            }
            let name = entry.file_name().to_string_lossy().into_owned();
            let content = std::fs::read_to_string(entry.path())?;
            heads.insert(name, ObjectId::try_parse(content.trim().to_string())?);
        }

        Ok(heads)
    }

    /// Parent list for the next commit: `[HEAD, MERGE_HEAD]` while a merge
    /// is in progress, empty before the first commit, `[HEAD]` otherwise.
    pub fn commit_parent_hashes(&self, database: &Database) -> anyhow::Result<Vec<ObjectId>> {
        let head = self.hash(database, "HEAD")?;

        if self.exists("MERGE_HEAD") {
            let merge_head = self
                .hash(database, "MERGE_HEAD")?
                .context("MERGE_HEAD present but unreadable")?;
            let head = head.context("merge in progress without a HEAD commit")?;
            return Ok(vec![head, merge_head]);
        }

        Ok(head.into_iter().collect())
    }

    /// Record written by fetch: one line per fetched branch.
    pub fn write_fetch_head(&self, oid: &ObjectId, branch: &str, url: &str) -> anyhow::Result<()> {
        self.write_repo_file("FETCH_HEAD", &format!("{} branch {} of {}", oid, branch, url))
    }

    /// Look up the FETCH_HEAD record for `branch`. Lines follow the grammar
    /// `<hash> branch <branch> of <url>`; anything else is a parse error.
    fn fetch_head_branch_hash(&self, branch: &str) -> anyhow::Result<Option<ObjectId>> {
        let Some(content) = self.read_repo_file("FETCH_HEAD")? else {
            return Ok(None);
        };

        for line in content.lines() {
            let mut parts = line.splitn(4, ' ');
            let hash = parts.next().context("FETCH_HEAD line missing hash")?;
            let keyword = parts.next().context("FETCH_HEAD line missing keyword")?;
            let line_branch = parts.next().context("FETCH_HEAD line missing branch")?;
            if keyword != "branch" {
                anyhow::bail!("malformed FETCH_HEAD line: {}", line);
            }
            if line_branch == branch {
                return Ok(Some(ObjectId::try_parse(hash.to_string())?));
            }
        }

        Ok(None)
    }

    pub fn read_merge_msg(&self) -> anyhow::Result<Option<String>> {
        self.read_repo_file(MERGE_MSG)
    }

    pub fn write_merge_msg(&self, message: &str) -> anyhow::Result<()> {
        self.write_repo_file(MERGE_MSG, message)
    }

    pub fn rm_merge_msg(&self) -> anyhow::Result<()> {
        let path = self.path.join(MERGE_MSG);
        if path.exists() {
            std::fs::remove_file(&path)
                .with_context(|| format!("unable to remove {:?}", path))?;
        }
        Ok(())
    }

    fn read_repo_file(&self, name: &str) -> anyhow::Result<Option<String>> {
        let path = self.path.join(name);
        if !path.is_file() {
            return Ok(None);
        }
        let content = std::fs::read_to_string(&path)
            .with_context(|| format!("unable to read ref file {:?}", path))?;
        Ok(Some(content.trim_end_matches('\n').to_string()))
    }

    fn write_repo_file(&self, name: &str, content: &str) -> anyhow::Result<()> {
        let path = self.path.join(name);
        std::fs::create_dir_all(
            path.parent()
                .with_context(|| format!("ref file {:?} has no parent directory", path))?,
        )?;

        let mut ref_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&path)
            .with_context(|| format!("unable to open ref file {:?}", path))?;
        let mut lock = file_guard::lock(&mut ref_file, Lock::Exclusive, 0, 1)?;
        lock.deref_mut().write_all(content.as_bytes())?;
        lock.deref_mut().write_all(b"\n")?;

        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::blob::Blob;
    use crate::artifacts::objects::object::Object;
    use bytes::Bytes;
    use pretty_assertions::assert_eq;
    use proptest::proptest;

    fn temp_refs() -> (assert_fs::TempDir, Refs, Database) {
        let dir = assert_fs::TempDir::new().expect("failed to create temp dir");
        let refs = Refs::new(dir.path().to_path_buf().into_boxed_path());
        let database = Database::new(dir.path().join("objects").into_boxed_path());
        (dir, refs, database)
    }

    fn commit_oid(database: &Database, message: &str) -> ObjectId {
        let blob = database
            .write(&Object::Blob(Blob::new(Bytes::from(message.to_string()))))
            .unwrap();
        let mut toc = crate::artifacts::objects::tree::Toc::new();
        toc.insert(std::path::PathBuf::from("f.txt"), blob);
        let tree = database
            .write_tree(&crate::artifacts::objects::tree::nest_toc(&toc).unwrap())
            .unwrap();
        database
            .write_commit(tree, message.to_string(), vec![])
            .unwrap()
    }

    #[test]
    fn recognizes_the_ref_grammar() {
        assert!(Refs::is_ref("HEAD"));
        assert!(Refs::is_ref("FETCH_HEAD"));
        assert!(Refs::is_ref("MERGE_HEAD"));
        assert!(Refs::is_ref("refs/heads/master"));
        assert!(Refs::is_ref("refs/heads/my-branch"));
        assert!(Refs::is_ref("refs/remotes/origin/master"));

        assert!(!Refs::is_ref("master"));
        assert!(!Refs::is_ref("MERGE_MSG"));
        assert!(!Refs::is_ref("refs/heads/with/slash"));
        assert!(!Refs::is_ref("refs/heads/number1"));
        assert!(!Refs::is_ref("refs/tags/v-one"));
        assert!(!Refs::is_ref(""));
    }

    proptest! {
        #[test]
        fn is_ref_is_total_over_arbitrary_strings(input in ".*") {
            // must not panic, and must agree with itself
            let first = Refs::is_ref(&input);
            let second = Refs::is_ref(&input);
            assert_eq!(first, second);
        }

        #[test]
        fn local_branch_names_qualify(name in "[A-Za-z-]+") {
            assert!(Refs::is_ref(&Refs::to_local_ref(&name)));
        }
    }

    #[test]
    fn terminal_ref_resolves_attached_head() {
        let (_dir, refs, _db) = temp_refs();
        refs.attach_head("master").unwrap();

        assert_eq!(refs.terminal_ref("HEAD").unwrap(), "refs/heads/master");
        assert_eq!(
            refs.terminal_ref("refs/heads/feat").unwrap(),
            "refs/heads/feat"
        );
        assert_eq!(refs.terminal_ref("feat").unwrap(), "refs/heads/feat");
    }

    #[test]
    fn detached_head_resolves_to_its_hash() {
        let (_dir, refs, database) = temp_refs();
        let oid = commit_oid(&database, "c1");
        refs.detach_head(&oid).unwrap();

        assert!(refs.is_head_detached().unwrap());
        assert_eq!(refs.head_branch_name().unwrap(), None);
        assert_eq!(refs.hash(&database, "HEAD").unwrap(), Some(oid));
    }

    #[test]
    fn hash_passes_through_existing_object_hashes() {
        let (_dir, refs, database) = temp_refs();
        let oid = commit_oid(&database, "c1");

        assert_eq!(
            refs.hash(&database, oid.as_ref()).unwrap(),
            Some(oid.clone())
        );
        // a well-formed hash that is not in the store resolves like a name
        let absent = ObjectId::try_parse("ab".repeat(20)).unwrap();
        assert_eq!(refs.hash(&database, absent.as_ref()).unwrap(), None);
    }

    #[test]
    fn writing_a_non_ref_name_is_a_silent_no_op() {
        let (dir, refs, _db) = temp_refs();

        refs.write("not a ref", "whatever").unwrap();
        assert!(!dir.path().join("not a ref").exists());
    }

    #[test]
    fn fetch_head_resolves_through_the_current_branch() {
        let (_dir, refs, database) = temp_refs();
        let oid = commit_oid(&database, "fetched");

        refs.attach_head("master").unwrap();
        refs.write_fetch_head(&oid, "master", "./src").unwrap();
        assert_eq!(refs.hash(&database, "FETCH_HEAD").unwrap(), Some(oid));
    }

    #[test]
    fn fetch_head_for_a_different_branch_is_none() {
        let (_dir, refs, database) = temp_refs();
        let oid = commit_oid(&database, "fetched");

        refs.attach_head("master").unwrap();
        refs.write_fetch_head(&oid, "feat", "./src").unwrap();
        assert_eq!(refs.hash(&database, "FETCH_HEAD").unwrap(), None);
    }

    #[test]
    fn commit_parent_hashes_follows_the_merge_state() {
        let (_dir, refs, database) = temp_refs();

        refs.attach_head("master").unwrap();
        // no commits yet
        assert_eq!(refs.commit_parent_hashes(&database).unwrap(), vec![]);

        let head = commit_oid(&database, "c1");
        refs.write("refs/heads/master", head.as_ref()).unwrap();
        assert_eq!(
            refs.commit_parent_hashes(&database).unwrap(),
            vec![head.clone()]
        );

        let giver = commit_oid(&database, "c2");
        refs.write("MERGE_HEAD", giver.as_ref()).unwrap();
        assert_eq!(
            refs.commit_parent_hashes(&database).unwrap(),
            vec![head, giver]
        );
    }

    #[test]
    fn local_heads_lists_branches() {
        let (_dir, refs, database) = temp_refs();
        let oid = commit_oid(&database, "c1");

        refs.write("refs/heads/master", oid.as_ref()).unwrap();
        refs.write("refs/heads/feat", oid.as_ref()).unwrap();

        let heads = refs.local_heads().unwrap();
        assert_eq!(
            heads.keys().collect::<Vec<_>>(),
            vec!["feat", "master"]
        );
    }
}
