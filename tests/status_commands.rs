use crate::common::command::{init_repository_dir, run_graft_command};
use crate::common::file::{FileSpec, write_file};
use assert_fs::TempDir;
use predicates::prelude::predicate;
use rstest::rstest;

mod common;

#[rstest]
fn clean_repository_prints_empty_sections(init_repository_dir: TempDir) {
    let dir = init_repository_dir;

    run_graft_command(dir.path(), &["status"])
        .assert()
        .success()
        .stdout(
            "=== Branches ===\n\
             *main\n\
             \n\
             === Staged Files ===\n\
             \n\
             === Removed Files ===\n\
             \n\
             === Modifications Not Staged For Commit ===\n\
             \n\
             === Untracked Files ===\n\
             \n",
        );
}

#[rstest]
fn every_section_is_filled_and_sorted(init_repository_dir: TempDir) {
    let dir = init_repository_dir;
    run_graft_command(dir.path(), &["branch", "zeta"])
        .assert()
        .success();
    run_graft_command(dir.path(), &["branch", "alpha"])
        .assert()
        .success();

    write_file(FileSpec::new(dir.path().join("z.txt"), "z".to_string()));
    write_file(FileSpec::new(dir.path().join("y.txt"), "y".to_string()));
    run_graft_command(dir.path(), &["add", "z.txt", "y.txt"])
        .assert()
        .success();
    run_graft_command(dir.path(), &["rm", "1.txt"])
        .assert()
        .success();
    write_file(FileSpec::new(dir.path().join("a/2.txt"), "deux".to_string()));
    std::fs::remove_file(dir.path().join("a/b/3.txt")).unwrap();
    write_file(FileSpec::new(dir.path().join("untracked.txt"), "?".to_string()));

    run_graft_command(dir.path(), &["status"])
        .assert()
        .success()
        .stdout(
            "=== Branches ===\n\
             alpha\n\
             *main\n\
             zeta\n\
             \n\
             === Staged Files ===\n\
             y.txt\n\
             z.txt\n\
             \n\
             === Removed Files ===\n\
             1.txt\n\
             \n\
             === Modifications Not Staged For Commit ===\n\
             a/2.txt (modified)\n\
             a/b/3.txt (deleted)\n\
             \n\
             === Untracked Files ===\n\
             untracked.txt\n\
             \n",
        );
}

#[rstest]
fn staged_file_changed_again_is_reported_modified(init_repository_dir: TempDir) {
    let dir = init_repository_dir;
    write_file(FileSpec::new(dir.path().join("new.txt"), "v1".to_string()));
    run_graft_command(dir.path(), &["add", "new.txt"])
        .assert()
        .success();
    write_file(FileSpec::new(dir.path().join("new.txt"), "v2".to_string()));

    run_graft_command(dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("=== Staged Files ===\nnew.txt\n"))
        .stdout(predicate::str::contains("new.txt (modified)"));
}

#[rstest]
fn recreated_removed_file_is_untracked(init_repository_dir: TempDir) {
    let dir = init_repository_dir;
    run_graft_command(dir.path(), &["rm", "1.txt"])
        .assert()
        .success();
    write_file(FileSpec::new(dir.path().join("1.txt"), "one".to_string()));

    run_graft_command(dir.path(), &["status"])
        .assert()
        .success()
        .stdout(predicate::str::contains("=== Removed Files ===\n1.txt\n"))
        .stdout(predicate::str::contains(
            "=== Untracked Files ===\n1.txt\n",
        ));
}
