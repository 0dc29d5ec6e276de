use crate::common::READABLE_COMMIT_DATE;
use crate::common::command::{
    branch_tip, commit_file, find_commits, head_commit_sha, init_repository_dir,
    run_graft_command,
};
use assert_fs::TempDir;
use predicates::prelude::*;
use pretty_assertions::assert_eq;
use rstest::{fixture, rstest};

mod common;

/// `main`: initial commit, First commit, Second commit, Third commit
#[fixture]
fn repository_with_history(init_repository_dir: TempDir) -> TempDir {
    let dir = init_repository_dir;
    commit_file(dir.path(), "1.txt", "uno", "Second commit");
    commit_file(dir.path(), "4.txt", "four", "Third commit");
    dir
}

fn stdout_of(dir: &TempDir, args: &[&str]) -> String {
    let output = run_graft_command(dir.path(), args)
        .output()
        .expect("Failed to run graft");
    assert!(output.status.success());
    String::from_utf8_lossy(&output.stdout).to_string()
}

#[rstest]
fn log_shows_first_parent_history_newest_first(repository_with_history: TempDir) {
    let dir = repository_with_history;
    let head = head_commit_sha(dir.path());

    let log = stdout_of(&dir, &["log"]);
    let messages = log
        .split("===\n")
        .filter(|entry| !entry.is_empty())
        .map(|entry| entry.lines().nth(2).unwrap_or_default().to_string())
        .collect::<Vec<_>>();

    assert_eq!(
        messages,
        vec![
            "Third commit",
            "Second commit",
            "First commit",
            "initial commit"
        ]
    );
    assert!(log.starts_with(&format!(
        "===\ncommit {head}\nDate: {READABLE_COMMIT_DATE}\nThird commit\n\n"
    )));
}

#[rstest]
fn log_follows_the_current_branch_only(repository_with_history: TempDir) {
    let dir = repository_with_history;
    run_graft_command(dir.path(), &["branch", "side"])
        .assert()
        .success();
    run_graft_command(dir.path(), &["switch", "side"])
        .assert()
        .success();
    commit_file(dir.path(), "side.txt", "side", "Side commit");
    run_graft_command(dir.path(), &["switch", "main"])
        .assert()
        .success();

    run_graft_command(dir.path(), &["log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Side commit").not());
    run_graft_command(dir.path(), &["global-log"])
        .assert()
        .success()
        .stdout(predicate::str::contains("Side commit"))
        .stdout(predicate::str::contains("Third commit"))
        .stdout(predicate::str::contains("initial commit"));
}

#[rstest]
fn global_log_lists_every_commit_once(repository_with_history: TempDir) {
    let dir = repository_with_history;

    let global_log = stdout_of(&dir, &["global-log"]);

    assert_eq!(global_log.matches("===\n").count(), 4);
}

#[rstest]
fn find_prints_ids_of_matching_commits(repository_with_history: TempDir) {
    let dir = repository_with_history;

    assert_eq!(
        find_commits(dir.path(), "Third commit"),
        vec![branch_tip(dir.path(), "main")]
    );
}

#[rstest]
fn find_matches_the_whole_message(repository_with_history: TempDir) {
    let dir = repository_with_history;

    run_graft_command(dir.path(), &["find", "Third"])
        .assert()
        .failure()
        .stderr(predicate::str::contains("commit 'Third' not found"));
}

#[rstest]
fn find_matches_messages_with_surrounding_spaces(repository_with_history: TempDir) {
    let dir = repository_with_history;
    commit_file(dir.path(), "5.txt", "five", " padded message ");

    assert_eq!(
        find_commits(dir.path(), " padded message "),
        vec![branch_tip(dir.path(), "main")]
    );
    run_graft_command(dir.path(), &["find", "padded message"])
        .assert()
        .failure();
}
