use crate::common::command::{
    branch_tip, commit_file, head_commit_sha, init_repository_dir, run_graft_command,
};
use crate::common::file::{FileSpec, read_file, write_file};
use assert_fs::TempDir;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

mod common;

/// `1.txt` is "one" in First commit, "uno" in Second commit and "eins" in Third commit
#[fixture]
fn repository_with_versions(init_repository_dir: TempDir) -> TempDir {
    let dir = init_repository_dir;
    commit_file(dir.path(), "1.txt", "uno", "Second commit");
    commit_file(dir.path(), "1.txt", "eins", "Third commit");
    dir
}

#[rstest]
fn restore_from_head_discards_working_changes(repository_with_versions: TempDir) {
    let dir = repository_with_versions;
    write_file(FileSpec::new(dir.path().join("1.txt"), "scratch".to_string()));

    run_graft_command(dir.path(), &["restore", "--", "1.txt"])
        .assert()
        .success();

    assert_eq!(read_file(&dir.path().join("1.txt")), "eins");
}

#[rstest]
#[case::ancestor("HEAD~2", "one")]
#[case::parent("HEAD^", "uno")]
#[case::alias("@", "eins")]
#[case::branch("main", "eins")]
fn restore_from_revision(
    repository_with_versions: TempDir,
    #[case] revision: &str,
    #[case] expected: &str,
) {
    let dir = repository_with_versions;

    run_graft_command(dir.path(), &["restore", revision, "--", "1.txt"])
        .assert()
        .success();

    assert_eq!(read_file(&dir.path().join("1.txt")), expected);
}

#[rstest]
fn restore_from_abbreviated_id_keeps_the_branch(repository_with_versions: TempDir) {
    let dir = repository_with_versions;
    let head = head_commit_sha(dir.path());
    let first = crate::common::command::find_commits(dir.path(), "First commit")
        .pop()
        .expect("First commit not found");

    run_graft_command(dir.path(), &["restore", &first[..6], "--", "1.txt"])
        .assert()
        .success();

    assert_eq!(read_file(&dir.path().join("1.txt")), "one");
    assert_eq!(head_commit_sha(dir.path()), head);
}

#[rstest]
fn restore_drops_staged_change(repository_with_versions: TempDir) {
    let dir = repository_with_versions;
    write_file(FileSpec::new(dir.path().join("1.txt"), "staged".to_string()));
    run_graft_command(dir.path(), &["add", "1.txt"])
        .assert()
        .success();

    run_graft_command(dir.path(), &["restore", "--", "1.txt"])
        .assert()
        .success();

    run_graft_command(dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("=== Staged Files ===\n\n"));
}

#[rstest]
#[case::unknown_file(&["restore", "--", "missing.txt"], "file 'missing.txt' not found")]
#[case::unknown_commit(&["restore", "ffffffff", "--", "1.txt"], "not found")]
#[case::beyond_root(&["restore", "HEAD~9", "--", "1.txt"], "not found")]
fn restore_fails(
    repository_with_versions: TempDir,
    #[case] args: &[&str],
    #[case] message: &str,
) {
    let dir = repository_with_versions;

    run_graft_command(dir.path(), args)
        .assert()
        .failure()
        .stderr(predicate::str::contains(message));

    assert_eq!(read_file(&dir.path().join("1.txt")), "eins");
}

#[rstest]
fn reset_moves_the_branch_and_checks_out(repository_with_versions: TempDir) {
    let dir = repository_with_versions;
    commit_file(dir.path(), "late.txt", "late", "Fourth commit");
    let target = crate::common::command::find_commits(dir.path(), "Second commit")
        .pop()
        .expect("Second commit not found");

    run_graft_command(dir.path(), &["reset", &target])
        .assert()
        .success()
        .stdout(format!("HEAD is now at {} Second commit\n", &target[..7]));

    assert_eq!(branch_tip(dir.path(), "main"), target);
    assert_eq!(read_file(&dir.path().join("1.txt")), "uno");
    assert!(!dir.path().join("late.txt").exists());
    run_graft_command(dir.path(), &["log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Third commit").not());
}

#[rstest]
fn reset_refuses_to_overwrite_untracked_files(repository_with_versions: TempDir) {
    let dir = repository_with_versions;
    run_graft_command(dir.path(), &["rm", "a/2.txt"])
        .assert()
        .success();
    crate::common::command::graft_commit(dir.path(), "Drop two")
        .assert()
        .success();
    write_file(FileSpec::new(dir.path().join("a/2.txt"), "mine".to_string()));
    let head = head_commit_sha(dir.path());

    run_graft_command(dir.path(), &["reset", "HEAD^"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("a/2.txt"));

    assert_eq!(head_commit_sha(dir.path()), head);
    assert_eq!(read_file(&dir.path().join("a/2.txt")), "mine");
}
