use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("failed to create temp dir")
}

/// A fresh repository with one committed file, `a.txt` containing "1\n".
#[fixture]
pub fn committed_repository_dir(repository_dir: TempDir) -> TempDir {
    run_nit_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    crate::common::file::write_file(repository_dir.path().join("a.txt"), "1\n");
    run_nit_command(repository_dir.path(), &["add", "a.txt"])
        .assert()
        .success();
    nit_commit(repository_dir.path(), "c1").assert().success();

    repository_dir
}

pub fn run_nit_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("nit").expect("failed to find nit binary");
    cmd.current_dir(dir);
    for arg in args {
        cmd.arg(arg);
    }
    cmd
}

pub fn nit_commit(dir: &Path, message: &str) -> Command {
    run_nit_command(dir, &["commit", "-m", message])
}

/// Content of a file inside the repository directory (`.version` for
/// non-bare repositories).
pub fn read_repo_file(root: &Path, name: &str) -> String {
    let path = root.join(".version").join(name);
    std::fs::read_to_string(&path)
        .unwrap_or_else(|e| panic!("failed to read repo file {:?}: {}", path, e))
}

/// Commit hash a local branch points at.
pub fn branch_hash(root: &Path, branch: &str) -> String {
    read_repo_file(root, &format!("refs/heads/{}", branch))
        .trim()
        .to_string()
}
