use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

mod common;

use common::command::{branch_hash, committed_repository_dir, repository_dir, run_nit_command};

#[rstest]
fn branch_is_created_at_head(
    committed_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = committed_repository_dir;

    run_nit_command(dir.path(), &["branch", "feat"])
        .assert()
        .success();

    assert_eq!(
        branch_hash(dir.path(), "feat"),
        branch_hash(dir.path(), "master")
    );

    Ok(())
}

#[rstest]
fn listing_marks_the_current_branch(
    committed_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = committed_repository_dir;

    run_nit_command(dir.path(), &["branch", "feat"])
        .assert()
        .success();

    run_nit_command(dir.path(), &["branch"])
        .assert()
        .success()
        .stdout(predicate::str::contains("* master"))
        .stdout(predicate::str::contains("  feat"));

    Ok(())
}

#[rstest]
fn duplicate_branch_names_are_rejected(
    committed_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = committed_repository_dir;

    run_nit_command(dir.path(), &["branch", "feat"])
        .assert()
        .success();
    run_nit_command(dir.path(), &["branch", "feat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("A branch named feat already exists"));

    Ok(())
}

#[rstest]
fn branching_before_the_first_commit_fails(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = repository_dir;
    run_nit_command(dir.path(), &["init"]).assert().success();

    run_nit_command(dir.path(), &["branch", "feat"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("master not a valid object name"));

    Ok(())
}

#[rstest]
fn branch_names_outside_the_grammar_are_rejected(
    committed_repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let dir = committed_repository_dir;

    for bad in ["feat1", "with/slash", "no_underscores"] {
        run_nit_command(dir.path(), &["branch", bad])
            .assert()
            .failure()
            .stderr(predicate::str::contains("invalid ref name"));
    }

    Ok(())
}
