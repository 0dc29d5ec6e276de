//! Commit object
//!
//! Commits are immutable snapshots of the tracked file tree. They contain:
//! - The blob map (repository-relative path → blob id)
//! - Up to two parent commit ids (two only for merge commits)
//! - A timestamp
//! - The commit message
//!
//! ## Format
//!
//! The payload is versioned and its field order is fixed, so ids are stable across
//! implementations:
//!
//! ```text
//! commit <size>\0
//! format 1
//! parent <parent1-sha>
//! parent <parent2-sha>
//! timestamp <unix-seconds> <+hhmm>
//! blob <blob-sha> <path>
//!
//! <commit message>
//! ```
//!
//! Parent lines appear only when present, blob lines are sorted by path.

use crate::artifacts::objects::object::{Object, Packable, Unpackable, envelope};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use std::collections::BTreeMap;
use std::io::BufRead;
use std::path::{Path, PathBuf};

/// Version written in the first payload line
pub const COMMIT_FORMAT_VERSION: u32 = 1;

/// Environment variable fixing the timestamp of new commits
pub const COMMIT_DATE_ENV: &str = "GRAFT_COMMIT_DATE";

/// Human-readable timestamp layout used by `log`
pub const READABLE_TIMESTAMP_FORMAT: &str = "%a %b %-d %H:%M:%S %Y %z";

/// Tracked files of a commit
pub type BlobMap = BTreeMap<PathBuf, ObjectId>;

/// Point in time a commit was recorded, with the committer's UTC offset
#[derive(Debug, Clone, Copy, Eq, PartialEq)]
pub struct Timestamp(chrono::DateTime<chrono::FixedOffset>);

impl Timestamp {
    pub fn new(datetime: chrono::DateTime<chrono::FixedOffset>) -> Self {
        Timestamp(datetime)
    }

    pub fn now() -> Self {
        Timestamp(chrono::Local::now().fixed_offset())
    }

    /// Timestamp of the initial commit
    pub fn epoch() -> Self {
        Timestamp(chrono::DateTime::<chrono::Utc>::UNIX_EPOCH.fixed_offset())
    }

    /// Read the timestamp for a new commit from `GRAFT_COMMIT_DATE`, falling back to now
    ///
    /// Accepts RFC 2822 or `%Y-%m-%d %H:%M:%S %z`.
    pub fn load_from_env() -> Self {
        let Ok(date_str) = std::env::var(COMMIT_DATE_ENV) else {
            return Self::now();
        };

        match chrono::DateTime::parse_from_rfc2822(&date_str)
            .or_else(|_| chrono::DateTime::parse_from_str(&date_str, "%Y-%m-%d %H:%M:%S %z"))
        {
            Ok(datetime) => Timestamp(datetime),
            Err(error) => {
                tracing::warn!(value = %date_str, %error, "ignoring unparsable {COMMIT_DATE_ENV}");
                Self::now()
            }
        }
    }

    pub fn datetime(&self) -> chrono::DateTime<chrono::FixedOffset> {
        self.0
    }

    /// Format timestamp in human-readable form
    ///
    /// String like "Mon Jan 1 12:34:56 2024 +0000"
    pub fn readable(&self) -> String {
        self.0.format(READABLE_TIMESTAMP_FORMAT).to_string()
    }

    fn parse_offset(offset: &str) -> anyhow::Result<chrono::FixedOffset> {
        let (sign, digits) = match offset.split_at_checked(1) {
            Some(("+", digits)) => (1, digits),
            Some(("-", digits)) => (-1, digits),
            _ => anyhow::bail!("Invalid timezone offset: {offset}"),
        };
        if digits.len() != 4 || !digits.chars().all(|c| c.is_ascii_digit()) {
            anyhow::bail!("Invalid timezone offset: {offset}");
        }

        let hours = digits[..2].parse::<i32>()?;
        let minutes = digits[2..].parse::<i32>()?;

        chrono::FixedOffset::east_opt(sign * (hours * 3600 + minutes * 60))
            .with_context(|| format!("Timezone offset out of range: {offset}"))
    }
}

/// Canonical form: `<unix-seconds> <+hhmm>`
impl std::fmt::Display for Timestamp {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} {}", self.0.timestamp(), self.0.format("%z"))
    }
}

impl TryFrom<&str> for Timestamp {
    type Error = anyhow::Error;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        let (seconds, offset) = value
            .split_once(' ')
            .context("Invalid timestamp format")?;
        let seconds = seconds
            .parse::<i64>()
            .map_err(|_| anyhow::anyhow!("Invalid timestamp: {seconds}"))?;
        let offset = Self::parse_offset(offset)?;

        let datetime = chrono::DateTime::from_timestamp(seconds, 0)
            .ok_or_else(|| anyhow::anyhow!("Invalid timestamp: {seconds}"))?;

        Ok(Timestamp(datetime.with_timezone(&offset)))
    }
}

/// Slim representation of a commit
///
/// Contains only what graph traversal needs: the commit's own id and its parents.
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct SlimCommit {
    /// The commit's object ID
    pub oid: ObjectId,
    /// The commit's parent object IDs (first parent first)
    pub parents: Vec<ObjectId>,
}

/// Immutable snapshot of the tracked file tree
#[derive(Debug, Clone, Eq, PartialEq)]
pub struct Commit {
    parent1: Option<ObjectId>,
    /// Only present on merge commits
    parent2: Option<ObjectId>,
    timestamp: Timestamp,
    blobs: BlobMap,
    message: String,
}

impl Commit {
    /// Create a new commit
    ///
    /// A second parent without a first one is normalized into the first slot.
    pub fn new(
        message: String,
        timestamp: Timestamp,
        blobs: BlobMap,
        parent1: Option<ObjectId>,
        parent2: Option<ObjectId>,
    ) -> Self {
        let (parent1, parent2) = match (parent1, parent2) {
            (None, Some(parent2)) => (Some(parent2), None),
            parents => parents,
        };

        Commit {
            parent1,
            parent2,
            timestamp,
            blobs,
            message,
        }
    }

    /// The root of every history: no parents, no files, epoch timestamp
    pub fn initial(message: &str) -> Self {
        Commit::new(
            message.to_string(),
            Timestamp::epoch(),
            BlobMap::new(),
            None,
            None,
        )
    }

    /// Get the first line of the commit message
    pub fn short_message(&self) -> String {
        self.message.lines().next().unwrap_or("").to_string()
    }

    pub fn message(&self) -> &str {
        &self.message
    }

    pub fn timestamp(&self) -> &Timestamp {
        &self.timestamp
    }

    pub fn blobs(&self) -> &BlobMap {
        &self.blobs
    }

    /// Blob id tracked at `path`, if any
    pub fn blob(&self, path: &Path) -> Option<&ObjectId> {
        self.blobs.get(path)
    }

    pub fn tracks(&self, path: &Path) -> bool {
        self.blobs.contains_key(path)
    }

    pub fn parent(&self) -> Option<&ObjectId> {
        self.parent1.as_ref()
    }

    pub fn second_parent(&self) -> Option<&ObjectId> {
        self.parent2.as_ref()
    }

    /// Parents in order, first parent first
    pub fn parents(&self) -> impl Iterator<Item = &ObjectId> {
        self.parent1.iter().chain(self.parent2.iter())
    }

    pub fn is_merge(&self) -> bool {
        self.parent2.is_some()
    }

    fn payload(&self) -> anyhow::Result<String> {
        let mut lines = vec![format!("format {COMMIT_FORMAT_VERSION}")];

        for parent in self.parents() {
            lines.push(format!("parent {}", parent.as_ref()));
        }
        lines.push(format!("timestamp {}", self.timestamp));
        for (path, oid) in &self.blobs {
            let path_str = path
                .to_str()
                .with_context(|| format!("Path is not valid UTF-8: {}", path.display()))?;
            if path_str.is_empty() || path_str.contains('\n') {
                anyhow::bail!("Path cannot be recorded in a commit: {:?}", path_str);
            }
            lines.push(format!("blob {} {}", oid.as_ref(), path_str));
        }

        Ok(format!("{}\n\n{}", lines.join("\n"), self.message))
    }
}

impl Packable for Commit {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        envelope(self.object_type(), self.payload()?.as_bytes())
    }
}

impl Unpackable for Commit {
    fn deserialize(reader: impl BufRead) -> anyhow::Result<Self> {
        let content = reader
            .bytes()
            .collect::<Result<Vec<u8>, std::io::Error>>()?;
        let content = String::from_utf8(content)?;

        let (headers, message) = content
            .split_once("\n\n")
            .context("Invalid commit object: missing message separator")?;
        // `lines` would drop a trailing `\r` from recorded paths
        let mut lines = headers.split('\n');

        let format_line = lines
            .next()
            .context("Invalid commit object: missing format line")?;
        let version = format_line
            .strip_prefix("format ")
            .context("Invalid commit object: invalid format line")?
            .parse::<u32>()
            .context("Invalid commit object: invalid format version")?;
        if version != COMMIT_FORMAT_VERSION {
            anyhow::bail!("Unsupported commit format version: {version}");
        }

        let mut parents = Vec::new();
        let mut timestamp = None;
        let mut blobs = BlobMap::new();

        for line in lines {
            let (key, value) = line
                .split_once(' ')
                .with_context(|| format!("Invalid commit object: malformed line {line:?}"))?;

            match key {
                "parent" if parents.len() < 2 => {
                    parents.push(ObjectId::try_parse(value.to_string())?);
                }
                "timestamp" if timestamp.is_none() => {
                    timestamp = Some(Timestamp::try_from(value)?);
                }
                "blob" => {
                    let (oid, path) = value
                        .split_once(' ')
                        .context("Invalid commit object: invalid blob line")?;
                    blobs.insert(PathBuf::from(path), ObjectId::try_parse(oid.to_string())?);
                }
                _ => anyhow::bail!("Invalid commit object: unexpected line {line:?}"),
            }
        }

        let timestamp = timestamp.context("Invalid commit object: missing timestamp line")?;
        let mut parents = parents.into_iter();

        Ok(Self::new(
            message.to_string(),
            timestamp,
            blobs,
            parents.next(),
            parents.next(),
        ))
    }
}

impl Object for Commit {
    fn object_type(&self) -> ObjectType {
        ObjectType::Commit
    }

    fn display(&self) -> String {
        self.payload().unwrap_or_default()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};
    use std::io::Cursor;

    fn oid(c: char) -> ObjectId {
        ObjectId::try_parse(c.to_string().repeat(40)).unwrap()
    }

    #[fixture]
    fn timestamp() -> Timestamp {
        Timestamp::try_from("1672574400 +0200").unwrap()
    }

    #[fixture]
    fn merge_commit(timestamp: Timestamp) -> Commit {
        let blobs = BlobMap::from([
            (PathBuf::from("a.txt"), oid('1')),
            (PathBuf::from("dir/with space.txt"), oid('2')),
        ]);
        Commit::new(
            "Merged feature into main.\n\nbody line\n".to_string(),
            timestamp,
            blobs,
            Some(oid('a')),
            Some(oid('b')),
        )
    }

    fn reparse(commit: &Commit) -> Commit {
        let bytes = commit.serialize().unwrap();
        let mut reader = Cursor::new(bytes.to_vec());
        ObjectType::parse_object_type(&mut reader).unwrap();
        Commit::deserialize(reader).unwrap()
    }

    #[rstest]
    fn payload_layout_is_fixed(merge_commit: Commit) {
        let expected = format!(
            "format 1\nparent {}\nparent {}\ntimestamp 1672574400 +0200\nblob {} a.txt\nblob {} dir/with space.txt\n\nMerged feature into main.\n\nbody line\n",
            oid('a'),
            oid('b'),
            oid('1'),
            oid('2'),
        );
        assert_eq!(merge_commit.display(), expected);
    }

    #[rstest]
    fn parsing_restores_every_field(merge_commit: Commit) {
        let parsed = reparse(&merge_commit);

        assert_eq!(parsed, merge_commit);
        assert_eq!(parsed.object_id().unwrap(), merge_commit.object_id().unwrap());
        assert_eq!(parsed.second_parent(), Some(&oid('b')));
    }

    #[rstest]
    fn initial_commit_has_no_parents_or_files() {
        let commit = Commit::initial("initial commit");
        let parsed = reparse(&commit);

        assert_eq!(parsed.parents().count(), 0);
        assert!(parsed.blobs().is_empty());
        assert_eq!(parsed.timestamp().readable(), "Thu Jan 1 00:00:00 1970 +0000");
    }

    #[rstest]
    fn identical_fields_collide(merge_commit: Commit) {
        let twin = merge_commit.clone();
        assert_eq!(twin.object_id().unwrap(), merge_commit.object_id().unwrap());
    }

    #[rstest]
    fn negative_offsets_are_preserved() {
        let timestamp = Timestamp::try_from("0 -0800").unwrap();
        assert_eq!(timestamp.to_string(), "0 -0800");
        assert_eq!(timestamp.readable(), "Wed Dec 31 16:00:00 1969 -0800");
    }

    #[rstest]
    #[case("format 2\ntimestamp 0 +0000\n\nmsg")]
    #[case("format 1\n\nmsg")]
    #[case("format 1\ntimestamp 0 +0000\ntree abc\n\nmsg")]
    #[case("format 1\ntimestamp 0 +0000")]
    fn malformed_payloads_are_rejected(#[case] payload: &str) {
        assert!(Commit::deserialize(Cursor::new(payload.as_bytes().to_vec())).is_err());
    }

    #[rstest]
    fn paths_ending_in_carriage_return_survive_parsing(timestamp: Timestamp) {
        let blobs = BlobMap::from([(PathBuf::from("notes\r"), oid('1'))]);
        let commit = Commit::new("msg".to_string(), timestamp, blobs, Some(oid('a')), None);

        let parsed = reparse(&commit);

        assert!(parsed.tracks(Path::new("notes\r")));
        assert_eq!(parsed.object_id().unwrap(), commit.object_id().unwrap());
    }

    #[rstest]
    fn lone_second_parent_moves_to_first_slot(timestamp: Timestamp) {
        let commit = Commit::new(String::new(), timestamp, BlobMap::new(), None, Some(oid('c')));
        assert_eq!(commit.parent(), Some(&oid('c')));
        assert!(!commit.is_merge());
    }
}
