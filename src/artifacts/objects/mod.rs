//! Stored object types
//!
//! Everything the object store holds is addressed by the SHA-1 of its canonical serialization:
//!
//! - **Blob**: file content (raw bytes)
//! - **Commit**: snapshot record (message, timestamp, path → blob map, up to two parents)
//!
//! All objects share the envelope `<type> <size>\0<payload>`.

pub mod blob;
pub mod commit;
pub mod object;
pub mod object_id;
pub mod object_type;

/// Length of a SHA-1 hash in hexadecimal format
pub const OBJECT_ID_LENGTH: usize = 40;

/// Shortest id prefix accepted where a full object id is expected
pub const MIN_PREFIX_LENGTH: usize = 4;
