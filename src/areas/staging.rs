//! Staging area
//!
//! Pending changes for the next commit: an add-map (path → staged blob id) and a remove-map
//! (path → blob id the path tracked before removal). A path is never in both maps.
//!
//! The area is loaded when a repository is opened (`rehydrate`) and written back after every
//! mutating command (`write_updates`). Staged content itself lives in the object store, so the
//! staging file only records ids.

use crate::artifacts::objects::commit::BlobMap;
use crate::artifacts::objects::object::{Packable, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::staging::checksum::Checksum;
use crate::artifacts::staging::staging_entry::{StagedChange, StagedEntry};
use crate::artifacts::staging::staging_header::StagingHeader;
use crate::artifacts::staging::{ENTRY_PREFIX_SIZE, HEADER_SIZE, SIGNATURE, VERSION};
use anyhow::anyhow;
use std::collections::BTreeMap;
use std::ops::DerefMut;
use std::path::{Path, PathBuf};

#[derive(Debug, Clone)]
pub struct StagingArea {
    /// Path to the staging file (typically `.graft/staging`)
    path: Box<Path>,
    additions: BTreeMap<PathBuf, ObjectId>,
    removals: BTreeMap<PathBuf, ObjectId>,
    /// Flag indicating if the area has been modified since loading
    changed: bool,
}

impl StagingArea {
    pub fn new(path: Box<Path>) -> Self {
        StagingArea {
            path,
            additions: BTreeMap::new(),
            removals: BTreeMap::new(),
            changed: false,
        }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn is_empty(&self) -> bool {
        self.additions.is_empty() && self.removals.is_empty()
    }

    pub fn is_changed(&self) -> bool {
        self.changed
    }

    pub fn additions(&self) -> &BTreeMap<PathBuf, ObjectId> {
        &self.additions
    }

    pub fn removals(&self) -> &BTreeMap<PathBuf, ObjectId> {
        &self.removals
    }

    pub fn addition(&self, path: &Path) -> Option<&ObjectId> {
        self.additions.get(path)
    }

    pub fn is_staged_for_removal(&self, path: &Path) -> bool {
        self.removals.contains_key(path)
    }

    /// Stage `oid` as the next content of `path`
    ///
    /// Staging a path back to the content `tracked` by the current commit is not a pending
    /// change: any staged entry for the path is dropped instead. Returns whether an addition
    /// ends up pending.
    pub fn stage_for_addition(
        &mut self,
        path: PathBuf,
        oid: ObjectId,
        tracked: Option<&ObjectId>,
    ) -> bool {
        self.changed = true;
        self.removals.remove(&path);

        if tracked == Some(&oid) {
            self.additions.remove(&path);
            false
        } else {
            self.additions.insert(path, oid);
            true
        }
    }

    /// Record `path` (which tracked `oid`) for deletion from the next commit
    pub fn stage_for_removal(&mut self, path: PathBuf, oid: ObjectId) {
        self.changed = true;
        self.additions.remove(&path);
        self.removals.insert(path, oid);
    }

    /// Drop any staged entry for `path`, returning whether there was one
    pub fn unstage(&mut self, path: &Path) -> bool {
        let removed = self.additions.remove(path).is_some() | self.removals.remove(path).is_some();
        self.changed |= removed;
        removed
    }

    pub fn clear(&mut self) {
        self.changed |= !self.is_empty();
        self.additions.clear();
        self.removals.clear();
    }

    /// Blob map of the next commit: `base` overlaid with additions, minus removals
    pub fn apply_to(&self, base: &BlobMap) -> BlobMap {
        let mut blobs = base.clone();
        blobs.extend(
            self.additions
                .iter()
                .map(|(path, oid)| (path.clone(), oid.clone())),
        );
        for path in self.removals.keys() {
            blobs.remove(path);
        }

        blobs
    }

    fn reset(&mut self) {
        self.additions.clear();
        self.removals.clear();
        self.changed = false;
    }

    /// Load the staging area from disk
    ///
    /// A missing or empty file is an empty staging area. The trailing checksum is verified.
    ///
    /// # Locking
    ///
    /// Acquires a shared lock on the staging file during reading.
    pub fn rehydrate(&mut self) -> anyhow::Result<()> {
        self.reset();

        if !self.path.exists() {
            return Ok(());
        }

        let mut staging_file = std::fs::OpenOptions::new().read(true).open(self.path())?;
        let mut lock = file_guard::lock(&mut staging_file, file_guard::Lock::Shared, 0, 1)?;

        // if the staging file is empty, return early
        if lock.deref_mut().metadata()?.len() == 0 {
            return Ok(());
        }

        let mut reader = Checksum::new(lock);
        let entries_count = self.parse_header(&mut reader)?;
        self.parse_entries(entries_count, &mut reader)?;

        reader.verify()?;
        self.changed = false;

        tracing::debug!(
            additions = self.additions.len(),
            removals = self.removals.len(),
            "loaded staging area"
        );

        Ok(())
    }

    fn parse_header(&self, reader: &mut Checksum) -> anyhow::Result<u32> {
        let header_bytes = reader.read(HEADER_SIZE)?;
        let header = StagingHeader::deserialize(std::io::Cursor::new(header_bytes))?;

        if header.marker != SIGNATURE {
            return Err(anyhow!("Invalid staging file signature"));
        }

        if header.version != VERSION {
            return Err(anyhow!(
                "Unsupported staging file version: {}",
                header.version
            ));
        }

        Ok(header.entries_count)
    }

    fn parse_entries(&mut self, entries_count: u32, reader: &mut Checksum) -> anyhow::Result<()> {
        for _ in 0..entries_count {
            let prefix = reader.read(ENTRY_PREFIX_SIZE)?;
            let (change, oid, path_len) = StagedEntry::parse_prefix(&prefix)?;
            let path = reader.read(path_len)?;
            let entry = StagedEntry::from_parts(change, oid, &path)?;

            match entry.change {
                StagedChange::Addition => self.additions.insert(entry.path, entry.oid),
                StagedChange::Removal => self.removals.insert(entry.path, entry.oid),
            };
        }

        Ok(())
    }

    fn entries(&self) -> impl Iterator<Item = StagedEntry> + '_ {
        let additions = self.additions.iter().map(|(path, oid)| {
            StagedEntry::new(StagedChange::Addition, path.clone(), oid.clone())
        });
        let removals = self
            .removals
            .iter()
            .map(|(path, oid)| StagedEntry::new(StagedChange::Removal, path.clone(), oid.clone()));

        additions.chain(removals)
    }

    /// Persist the staging area
    ///
    /// # Locking
    ///
    /// Acquires an exclusive lock on the staging file during writing.
    pub fn write_updates(&mut self) -> anyhow::Result<()> {
        let mut staging_file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(self.path())?;
        let lock = file_guard::lock(&mut staging_file, file_guard::Lock::Exclusive, 0, 1)?;

        let mut writer = Checksum::new(lock);

        let header = StagingHeader {
            entries_count: (self.additions.len() + self.removals.len()) as u32,
            ..StagingHeader::empty()
        };
        writer.write(&header.serialize()?)?;

        for entry in self.entries() {
            writer.write(&entry.serialize()?)?;
        }

        writer.write_checksum()?;
        self.changed = false;

        Ok(())
    }
}
