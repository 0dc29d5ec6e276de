use crate::artifacts::objects::object::Packable;
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::staging::ENTRY_PREFIX_SIZE;
use anyhow::{Context, anyhow};
use byteorder::{ByteOrder, WriteBytesExt};
use bytes::Bytes;
use derive_new::new;
use std::io::{Cursor, Write};
use std::path::PathBuf;

/// Which map of the staging area an entry belongs to
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StagedChange {
    Addition,
    Removal,
}

impl StagedChange {
    fn as_byte(&self) -> u8 {
        match self {
            StagedChange::Addition => b'A',
            StagedChange::Removal => b'R',
        }
    }
}

impl TryFrom<u8> for StagedChange {
    type Error = anyhow::Error;

    fn try_from(value: u8) -> anyhow::Result<Self> {
        match value {
            b'A' => Ok(StagedChange::Addition),
            b'R' => Ok(StagedChange::Removal),
            other => Err(anyhow!("Invalid staged change kind: {other:#04x}")),
        }
    }
}

/// One persisted staging record
///
/// For additions `oid` is the staged content; for removals it is the blob the path tracked
/// before it was removed.
#[derive(Debug, Clone, PartialEq, Eq, new)]
pub struct StagedEntry {
    pub change: StagedChange,
    pub path: PathBuf,
    pub oid: ObjectId,
}

impl StagedEntry {
    /// Decode the fixed-size prefix, returning the change kind, blob id and path length
    pub(crate) fn parse_prefix(prefix: &[u8]) -> anyhow::Result<(StagedChange, ObjectId, usize)> {
        if prefix.len() != ENTRY_PREFIX_SIZE {
            anyhow::bail!("Invalid staging entry prefix size: {}", prefix.len());
        }

        let change = StagedChange::try_from(prefix[0])?;
        let oid = ObjectId::read_h40_from(&mut Cursor::new(&prefix[1..21]))?;
        let path_len = byteorder::NetworkEndian::read_u32(&prefix[21..25]) as usize;

        Ok((change, oid, path_len))
    }

    pub(crate) fn from_parts(
        change: StagedChange,
        oid: ObjectId,
        path: &[u8],
    ) -> anyhow::Result<Self> {
        let path = String::from_utf8(path.to_vec()).context("Staged path is not valid UTF-8")?;

        Ok(StagedEntry::new(change, PathBuf::from(path), oid))
    }
}

impl Packable for StagedEntry {
    fn serialize(&self) -> anyhow::Result<Bytes> {
        let path = self
            .path
            .to_str()
            .with_context(|| format!("Path is not valid UTF-8: {}", self.path.display()))?;

        let mut bytes = Vec::with_capacity(ENTRY_PREFIX_SIZE + path.len());
        bytes.write_u8(self.change.as_byte())?;
        self.oid.write_h40_to(&mut bytes)?;
        bytes.write_u32::<byteorder::NetworkEndian>(path.len() as u32)?;
        bytes.write_all(path.as_bytes())?;

        Ok(Bytes::from(bytes))
    }
}
