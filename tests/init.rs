use crate::common::command::{repository_dir, run_graft_command};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use pretty_assertions::assert_eq;
use rstest::rstest;

mod common;

#[rstest]
fn new_repository_initiated_with_graft_directory(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let git_path = repository_dir.path().canonicalize()?.join(".graft");

    run_graft_command(repository_dir.path(), &["init"])
        .assert()
        .success()
        .stdout(predicate::str::is_match(
            r"^Initialized empty Graft repository in .+\n$",
        )?)
        .stdout(predicate::str::contains(git_path.display().to_string()));

    assert!(git_path.join("objects").is_dir());
    assert_eq!(
        std::fs::read_to_string(git_path.join("HEAD"))?,
        "ref: refs/heads/main"
    );
    assert!(git_path.join("refs").join("heads").join("main").is_file());

    Ok(())
}

#[rstest]
fn init_at_an_explicit_path_creates_it(
    repository_dir: TempDir,
) -> Result<(), Box<dyn std::error::Error>> {
    let nested = repository_dir.path().join("projects").join("demo");

    run_graft_command(repository_dir.path(), &["init", "projects/demo"])
        .assert()
        .success();

    assert!(nested.join(".graft").is_dir());

    Ok(())
}

#[rstest]
fn new_repository_starts_with_the_initial_commit(repository_dir: TempDir) {
    run_graft_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_graft_command(repository_dir.path(), &["log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("initial commit"))
        .stdout(predicate::str::contains("Date: Thu Jan 1 00:00:00 1970 +0000"));
}

#[rstest]
fn initializing_twice_fails(repository_dir: TempDir) {
    run_graft_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    run_graft_command(repository_dir.path(), &["init"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("already exists"));
}

#[rstest]
fn commands_outside_a_repository_fail(repository_dir: TempDir) {
    run_graft_command(repository_dir.path(), &["status"])
        .assert()
        .failure()
        .stderr(predicate::str::contains(
            "not in an initialized graft directory",
        ));
}
