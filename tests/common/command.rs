use crate::common::COMMIT_DATE;
use crate::common::file::{FileSpec, write_file};
use assert_cmd::Command;
use assert_fs::TempDir;
use rstest::fixture;
use std::path::Path;

#[fixture]
pub fn repository_dir() -> TempDir {
    TempDir::new().expect("Failed to create temp dir")
}

/// Repository with `1.txt`, `a/2.txt` and `a/b/3.txt` committed on `main`
#[fixture]
pub fn init_repository_dir(repository_dir: TempDir) -> TempDir {
    run_graft_command(repository_dir.path(), &["init"])
        .assert()
        .success();

    write_file(FileSpec::new(
        repository_dir.path().join("1.txt"),
        "one".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("2.txt"),
        "two".to_string(),
    ));
    write_file(FileSpec::new(
        repository_dir.path().join("a").join("b").join("3.txt"),
        "three".to_string(),
    ));

    run_graft_command(repository_dir.path(), &["add", "."])
        .assert()
        .success();
    graft_commit(repository_dir.path(), "First commit")
        .assert()
        .success();

    repository_dir
}

pub fn run_graft_command(dir: &Path, args: &[&str]) -> Command {
    let mut cmd = Command::cargo_bin("graft").expect("Failed to find graft binary");
    cmd.current_dir(dir)
        .env("GRAFT_COMMIT_DATE", COMMIT_DATE)
        .env("NO_PAGER", "1")
        .env_remove("RUST_LOG")
        .args(args);
    cmd
}

pub fn graft_commit(dir: &Path, message: &str) -> Command {
    run_graft_command(dir, &["commit", "-m", message])
}

/// Write `content` to `path`, stage it and commit it
pub fn commit_file(dir: &Path, path: &str, content: &str, message: &str) {
    write_file(FileSpec::new(dir.join(path), content.to_string()));
    run_graft_command(dir, &["add", path]).assert().success();
    graft_commit(dir, message).assert().success();
}

/// Id of the commit a branch points at
pub fn branch_tip(dir: &Path, branch: &str) -> String {
    let ref_path = dir.join(".graft").join("refs").join("heads").join(branch);
    std::fs::read_to_string(&ref_path)
        .unwrap_or_else(|e| panic!("Failed to read branch {:?}: {}", ref_path, e))
        .trim()
        .to_string()
}

/// Id of the commit HEAD resolves to
pub fn head_commit_sha(dir: &Path) -> String {
    let head = std::fs::read_to_string(dir.join(".graft").join("HEAD"))
        .expect("Failed to read HEAD");
    let branch = head
        .trim()
        .strip_prefix("ref: refs/heads/")
        .expect("HEAD is not a symbolic ref");

    branch_tip(dir, branch)
}

/// Commit ids printed by `find`
pub fn find_commits(dir: &Path, message: &str) -> Vec<String> {
    let output = run_graft_command(dir, &["find", message])
        .output()
        .expect("Failed to run find");

    String::from_utf8_lossy(&output.stdout)
        .lines()
        .map(str::to_string)
        .collect()
}
