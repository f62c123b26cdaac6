use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

mod common;

use common::command::{
    branch_hash, committed_repository_dir, nit_commit, run_nit_command,
};
use common::file::write_file;

#[rstest]
fn diff_between_commits_lists_name_statuses(
    committed_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = committed_repository_dir;
    let first = branch_hash(dir.path(), "master");

    write_file(dir.path().join("a.txt"), "2\n");
    write_file(dir.path().join("b.txt"), "new\n");
    run_nit_command(dir.path(), &["add", "."]).assert().success();
    nit_commit(dir.path(), "c2").assert().success();
    let second = branch_hash(dir.path(), "master");

    run_nit_command(dir.path(), &["diff", &first, &second])
        .assert()
        .success()
        .stdout(predicate::str::contains("M a.txt"))
        .stdout(predicate::str::contains("A b.txt"));

    // swapped operands invert the statuses
    run_nit_command(dir.path(), &["diff", &second, &first])
        .assert()
        .success()
        .stdout(predicate::str::contains("M a.txt"))
        .stdout(predicate::str::contains("D b.txt"));

    Ok(())
}

#[rstest]
fn diff_with_no_refs_compares_index_to_working_copy(
    committed_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = committed_repository_dir;

    write_file(dir.path().join("a.txt"), "edited\n");

    run_nit_command(dir.path(), &["diff"])
        .assert()
        .success()
        .stdout(predicate::eq("M a.txt\n"));

    Ok(())
}

#[rstest]
fn unchanged_trees_diff_to_nothing(
    committed_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = committed_repository_dir;

    run_nit_command(dir.path(), &["diff"])
        .assert()
        .success()
        .stdout(predicate::str::is_empty());

    Ok(())
}

#[rstest]
fn diff_of_an_unknown_revision_fails(
    committed_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = committed_repository_dir;

    run_nit_command(dir.path(), &["diff", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("ghost not a valid object name"));

    Ok(())
}
