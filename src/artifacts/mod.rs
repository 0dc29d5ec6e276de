//! Version-control data structures and algorithms
//!
//! - `branch`: branch names and revision parsing
//! - `core`: typed errors and the pager wrapper
//! - `log`: commit history traversal
//! - `merge`: split point discovery, per-path resolution and conflict blocks
//! - `objects`: object types (blob, commit) and their identifiers
//! - `staging`: on-disk format of the staging file
//! - `status`: working tree status inspection

pub mod branch;
pub mod core;
pub mod log;
pub mod merge;
pub mod objects;
pub mod staging;
pub mod status;
