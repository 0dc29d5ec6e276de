//! Staging file format
//!
//! The staging area (pending additions and removals) is persisted between invocations in a
//! single checksummed file.
//!
//! ## File Format (Version 1)
//!
//! ```text
//! Header (12 bytes):
//!   - Signature: "STAG" (4 bytes)
//!   - Version: 1 (4 bytes)
//!   - Entry count (4 bytes)
//!
//! Entries (variable length):
//!   - Change kind: 'A' (addition) or 'R' (removal) (1 byte)
//!   - Blob id (20 bytes)
//!   - Path length (4 bytes)
//!   - Path (UTF-8)
//!
//! Checksum (20 bytes):
//!   - SHA-1 hash of all preceding bytes
//! ```

pub mod checksum;
pub mod staging_entry;
pub mod staging_header;

/// Size of SHA-1 checksum in bytes
pub const CHECKSUM_SIZE: usize = 20;

/// Size of the staging header in bytes
pub const HEADER_SIZE: usize = 12; // 4 bytes for marker, 4 for version, 4 for entries_count

/// Fixed-size prefix of every entry: kind, binary blob id, path length
pub const ENTRY_PREFIX_SIZE: usize = 1 + 20 + 4;

/// Magic signature identifying staging files
pub const SIGNATURE: &str = "STAG";

/// Staging file format version
pub const VERSION: u32 = 1;
