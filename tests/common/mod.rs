#![allow(dead_code)]

pub mod command;
pub mod file;

/// Fixed timestamp for every commit made by the tests
pub const COMMIT_DATE: &str = "2024-01-01 12:00:00 +0000";

/// `log` rendering of [`COMMIT_DATE`]
pub const READABLE_COMMIT_DATE: &str = "Mon Jan 1 12:00:00 2024 +0000";
