use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

mod common;

use common::command::{branch_hash, nit_commit, read_repo_file, repository_dir, run_nit_command};
use common::file::{read_file, write_file};
use std::path::Path;

/// Build a source repository at `<parent>/src` with one commit on master,
/// then park HEAD on a side branch so master can receive pushes.
fn seed_source(parent: &Path) -> std::path::PathBuf {
    let src = parent.join("src");
    std::fs::create_dir(&src).expect("failed to create src dir");

    run_nit_command(&src, &["init"]).assert().success();
    write_file(src.join("a.txt"), "1\n");
    run_nit_command(&src, &["add", "a.txt"]).assert().success();
    nit_commit(&src, "c1").assert().success();
    run_nit_command(&src, &["branch", "other"]).assert().success();
    run_nit_command(&src, &["checkout", "other"])
        .assert()
        .success();

    src
}

/// One commit on top of the source's master, leaving HEAD back on `other`.
fn advance_source_master(src: &Path, content: &str, message: &str) {
    run_nit_command(src, &["checkout", "master"])
        .assert()
        .success();
    write_file(src.join("a.txt"), content);
    run_nit_command(src, &["add", "a.txt"]).assert().success();
    nit_commit(src, message).assert().success();
    run_nit_command(src, &["checkout", "other"])
        .assert()
        .success();
}

#[rstest]
fn clone_copies_master_and_registers_origin(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let parent = repository_dir;
    let src = seed_source(parent.path());

    run_nit_command(parent.path(), &["clone", "./src", "./dst"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Cloning into ./dst"));

    let dst = parent.path().join("dst");
    // the remote is recorded under the URL exactly as given
    assert!(read_repo_file(&dst, "config").contains("url = ./src"));
    // master and the remote-tracking ref match the source
    assert_eq!(branch_hash(&dst, "master"), branch_hash(&src, "master"));
    assert_eq!(
        read_repo_file(&dst, "refs/remotes/origin/master").trim(),
        branch_hash(&src, "master")
    );
    // the working copy is populated
    assert_eq!(read_file(&dst.join("a.txt")), "1\n");

    Ok(())
}

#[rstest]
fn clone_into_a_non_empty_directory_fails(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let parent = repository_dir;
    seed_source(parent.path());
    write_file(parent.path().join("dst/occupied.txt"), "here first\n");

    run_nit_command(parent.path(), &["clone", "./src", "./dst"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "./dst already exists and is not empty",
        ));

    Ok(())
}

#[rstest]
fn clone_of_a_non_repository_fails(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let parent = repository_dir;
    std::fs::create_dir(parent.path().join("plain"))?;

    run_nit_command(parent.path(), &["clone", "./plain", "./dst"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "./plain does not appear to be a nit repository",
        ));

    Ok(())
}

#[rstest]
fn fast_forward_push_updates_the_source_branch(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let parent = repository_dir;
    let src = seed_source(parent.path());
    run_nit_command(parent.path(), &["clone", "./src", "./dst"])
        .assert()
        .success();
    let dst = parent.path().join("dst");

    write_file(dst.join("a.txt"), "2\n");
    run_nit_command(&dst, &["add", "a.txt"]).assert().success();
    nit_commit(&dst, "c2").assert().success();

    run_nit_command(&dst, &["push", "origin", "master"])
        .assert()
        .success()
        .stdout(predicate::str::contains("To ./src"))
        .stdout(predicate::str::contains("master -> master"));

    // push symmetry: both ends agree on master
    assert_eq!(branch_hash(&src, "master"), branch_hash(&dst, "master"));
    assert_eq!(
        read_repo_file(&dst, "refs/remotes/origin/master").trim(),
        branch_hash(&dst, "master")
    );

    Ok(())
}

#[rstest]
fn pushing_twice_reports_up_to_date(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let parent = repository_dir;
    seed_source(parent.path());
    run_nit_command(parent.path(), &["clone", "./src", "./dst"])
        .assert()
        .success();
    let dst = parent.path().join("dst");

    run_nit_command(&dst, &["push", "origin", "master"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Already up-to-date"));

    Ok(())
}

#[rstest]
fn non_fast_forward_push_is_rejected_without_force(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let parent = repository_dir;
    let src = seed_source(parent.path());
    run_nit_command(parent.path(), &["clone", "./src", "./dst"])
        .assert()
        .success();
    let dst = parent.path().join("dst");

    // the histories diverge
    advance_source_master(&src, "source change\n", "src edit");
    write_file(dst.join("a.txt"), "clone change\n");
    run_nit_command(&dst, &["add", "a.txt"]).assert().success();
    nit_commit(&dst, "dst edit").assert().success();

    run_nit_command(&dst, &["push", "origin", "master"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("failed to push some refs to ./src"));

    // forcing overwrites the source's master
    run_nit_command(&dst, &["push", "--force", "origin", "master"])
        .assert()
        .success();
    assert_eq!(branch_hash(&src, "master"), branch_hash(&dst, "master"));

    Ok(())
}

#[rstest]
fn pushing_to_a_checked_out_branch_is_refused(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let parent = repository_dir;
    seed_source(parent.path());
    run_nit_command(parent.path(), &["clone", "./src", "./dst"])
        .assert()
        .success();
    let dst = parent.path().join("dst");

    // the source parked its HEAD on `other`
    run_nit_command(&dst, &["push", "origin", "other"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "refusing to update checked out branch other",
        ));

    Ok(())
}

#[rstest]
fn fetch_advances_the_remote_tracking_ref(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let parent = repository_dir;
    let src = seed_source(parent.path());
    run_nit_command(parent.path(), &["clone", "./src", "./dst"])
        .assert()
        .success();
    let dst = parent.path().join("dst");

    advance_source_master(&src, "fetched content\n", "src edit");

    run_nit_command(&dst, &["fetch", "origin", "master"])
        .assert()
        .success()
        .stdout(predicate::str::contains("From ./src"))
        .stdout(predicate::str::contains("master -> origin/master"));

    // fetch symmetry: the remote-tracking ref mirrors the source
    assert_eq!(
        read_repo_file(&dst, "refs/remotes/origin/master").trim(),
        branch_hash(&src, "master")
    );
    // the FETCH_HEAD record names the branch and the URL
    let fetch_head = read_repo_file(&dst, "FETCH_HEAD");
    assert!(fetch_head.contains("branch master of ./src"));
    // the local branch is untouched until merge
    assert_ne!(branch_hash(&dst, "master"), branch_hash(&src, "master"));

    Ok(())
}

#[rstest]
fn fetching_an_unknown_remote_or_branch_fails(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let parent = repository_dir;
    seed_source(parent.path());
    run_nit_command(parent.path(), &["clone", "./src", "./dst"])
        .assert()
        .success();
    let dst = parent.path().join("dst");

    run_nit_command(&dst, &["fetch", "upstream", "master"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "upstream does not appear to be a nit repository",
        ));

    run_nit_command(&dst, &["fetch", "origin", "ghost"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("couldn't find remote ref ghost"));

    Ok(())
}

#[rstest]
fn pull_fetches_and_fast_forwards(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let parent = repository_dir;
    let src = seed_source(parent.path());
    run_nit_command(parent.path(), &["clone", "./src", "./dst"])
        .assert()
        .success();
    let dst = parent.path().join("dst");

    advance_source_master(&src, "pulled content\n", "src edit");

    run_nit_command(&dst, &["pull", "origin", "master"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Fast-forward"));

    assert_eq!(branch_hash(&dst, "master"), branch_hash(&src, "master"));
    assert_eq!(read_file(&dst.join("a.txt")), "pulled content\n");

    Ok(())
}
