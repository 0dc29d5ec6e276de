use crate::artifacts::core::error::{GraftError, Result, Subject};
use crate::artifacts::objects::blob::Blob;
use crate::artifacts::objects::commit::{Commit, SlimCommit};
use crate::artifacts::objects::object::{Object, ObjectBox, Unpackable};
use crate::artifacts::objects::object_id::ObjectId;
use crate::artifacts::objects::object_type::ObjectType;
use anyhow::Context;
use bytes::Bytes;
use fake::rand;
use std::io::{BufRead, Cursor, Read, Write};
use std::path::{Path, PathBuf};

/// Content-addressed, append-only object store under `.graft/objects`
#[derive(Debug)]
pub struct Database {
    path: Box<Path>,
}

impl Database {
    pub fn new(path: Box<Path>) -> Self {
        Database { path }
    }

    pub fn objects_path(&self) -> &Path {
        &self.path
    }

    /// Write an object unless it is already stored, returning its id
    pub fn store(&self, object: &impl Object) -> Result<ObjectId> {
        let object_id = object.object_id()?;
        let object_path = self.path.join(object_id.to_path());

        if !object_path.exists() {
            std::fs::create_dir_all(
                object_path
                    .parent()
                    .context(format!("Invalid object path {}", object_path.display()))?,
            )
            .context(format!(
                "Unable to create object directory {}",
                object_path.display()
            ))?;

            self.write_object(object_path, object.serialize()?)?;
            tracing::debug!(oid = %object_id, kind = %object.object_type(), "stored object");
        }

        Ok(object_id)
    }

    pub fn exists(&self, object_id: &ObjectId) -> bool {
        self.path.join(object_id.to_path()).is_file()
    }

    /// Raw (decompressed) object bytes, envelope included
    pub fn load(&self, object_id: &ObjectId) -> Result<Bytes> {
        if !self.exists(object_id) {
            return Err(GraftError::not_found(Subject::Object, object_id));
        }

        Ok(self.read_object(self.path.join(object_id.to_path()))?)
    }

    pub fn parse_object(&self, object_id: &ObjectId) -> Result<ObjectBox> {
        let (object_type, object_reader) = self.parse_object_as_bytes(object_id)?;

        Ok(match object_type {
            ObjectType::Blob => ObjectBox::Blob(Box::new(Blob::deserialize(object_reader)?)),
            ObjectType::Commit => ObjectBox::Commit(Box::new(Commit::deserialize(object_reader)?)),
        })
    }

    /// Load a commit; ids of missing objects or of blobs are reported as unknown commits
    pub fn get_commit(&self, object_id: &ObjectId) -> Result<Commit> {
        match self.parse_object(object_id) {
            Ok(ObjectBox::Commit(commit)) => Ok(*commit),
            Ok(_) | Err(GraftError::NotFound { .. }) => {
                Err(GraftError::not_found(Subject::Commit, object_id))
            }
            Err(error) => Err(error),
        }
    }

    pub fn get_blob(&self, object_id: &ObjectId) -> Result<Blob> {
        match self.parse_object(object_id)? {
            ObjectBox::Blob(blob) => Ok(*blob),
            ObjectBox::Commit(_) => Err(GraftError::not_found(Subject::Object, object_id)),
        }
    }

    /// Parents of a commit, for graph traversal
    pub fn get_slim_commit(&self, object_id: &ObjectId) -> anyhow::Result<SlimCommit> {
        let commit = self
            .get_commit(object_id)
            .with_context(|| format!("Unable to load commit {object_id}"))?;

        Ok(SlimCommit {
            oid: object_id.clone(),
            parents: commit.parents().cloned().collect(),
        })
    }

    fn parse_object_as_bytes(&self, object_id: &ObjectId) -> Result<(ObjectType, impl BufRead)> {
        let object_content = self.load(object_id)?;
        let mut object_reader = Cursor::new(object_content);

        let object_type = ObjectType::parse_object_type(&mut object_reader)?;

        Ok((object_type, object_reader))
    }

    fn read_object(&self, object_path: PathBuf) -> anyhow::Result<Bytes> {
        let object_content = std::fs::read(&object_path).context(format!(
            "Unable to read object file {}",
            object_path.display()
        ))?;

        Self::decompress(object_content.into())
    }

    fn write_object(&self, object_path: PathBuf, object_content: Bytes) -> anyhow::Result<()> {
        let object_dir = object_path
            .parent()
            .context(format!("Invalid object path {}", object_path.display()))?;
        let temp_object_path = object_dir.join(Self::generate_temp_name());

        let object_content = Self::compress(object_content)?;

        let mut file = std::fs::OpenOptions::new()
            .write(true)
            .create(true)
            .truncate(true)
            .open(&temp_object_path)
            .context(format!(
                "Unable to open object file {}",
                temp_object_path.display()
            ))?;

        file.write_all(&object_content).context(format!(
            "Unable to write object file {}",
            temp_object_path.display()
        ))?;
        file.sync_all()?;

        // rename the temp file to the object file to make it atomic
        std::fs::rename(&temp_object_path, &object_path).context(format!(
            "Unable to rename object file to {}",
            object_path.display()
        ))?;

        Ok(())
    }

    fn compress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut encoder =
            flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
        encoder
            .write_all(&data)
            .context("Unable to compress object content")?;

        encoder
            .finish()
            .map(|compressed_content| compressed_content.into())
            .context("Unable to finish compressing object content")
    }

    fn decompress(data: Bytes) -> anyhow::Result<Bytes> {
        let mut decoder = flate2::read::ZlibDecoder::new(&*data);
        let mut decompressed_content = Vec::new();
        decoder
            .read_to_end(&mut decompressed_content)
            .context("Unable to decompress object content")?;

        Ok(decompressed_content.into())
    }

    fn generate_temp_name() -> String {
        format!("tmp-obj-{}", rand::random::<u32>())
    }

    /// All stored objects whose id starts with `prefix` (at least two characters)
    pub fn find_objects_by_prefix(&self, prefix: &str) -> anyhow::Result<Vec<ObjectId>> {
        let prefix = prefix.to_ascii_lowercase();
        let (dir_name, file_prefix) = prefix
            .split_at_checked(2)
            .context(format!("Object id prefix {prefix} is too short"))?;
        let dir_path = self.path.join(dir_name);

        if !dir_path.is_dir() {
            return Ok(Vec::new());
        }

        let mut matches = Vec::new();
        for entry in std::fs::read_dir(&dir_path)? {
            let file_name = entry?.file_name();
            let file_name = file_name.to_string_lossy();

            // temp files of in-flight writes never parse as ids
            if file_name.starts_with(file_prefix)
                && let Ok(oid) = ObjectId::try_parse(format!("{dir_name}{file_name}"))
            {
                matches.push(oid);
            }
        }
        matches.sort();

        Ok(matches)
    }

    /// Expand an abbreviated id to the unique stored id it names
    pub fn resolve_prefix(&self, prefix: &str) -> Result<ObjectId> {
        if !ObjectId::is_valid_prefix(prefix) {
            return Err(GraftError::InvalidOperand(format!(
                "'{prefix}' is not a valid object id"
            )));
        }

        let mut matches = self.find_objects_by_prefix(prefix)?;
        match matches.len() {
            0 => Err(GraftError::not_found(Subject::Object, prefix)),
            1 => Ok(matches.remove(0)),
            _ => Err(GraftError::AmbiguousPrefix {
                prefix: prefix.to_string(),
                candidates: matches,
            }),
        }
    }

    /// Every stored object id, sorted
    pub fn list_objects(&self) -> anyhow::Result<Vec<ObjectId>> {
        let mut object_ids = Vec::new();

        if !self.path.is_dir() {
            return Ok(object_ids);
        }

        for entry in std::fs::read_dir(&self.path)? {
            let entry = entry?;
            let dir_name = entry.file_name();
            let dir_name = dir_name.to_string_lossy();

            if dir_name.len() != 2 || !entry.path().is_dir() {
                continue;
            }

            object_ids.extend(self.find_objects_by_prefix(&dir_name)?);
        }
        object_ids.sort();

        Ok(object_ids)
    }

    /// Every stored commit, in object id order
    pub fn list_commits(&self) -> Result<Vec<(ObjectId, Commit)>> {
        let mut commits = Vec::new();

        for object_id in self.list_objects()? {
            if let ObjectBox::Commit(commit) = self.parse_object(&object_id)? {
                commits.push((object_id, *commit));
            }
        }

        Ok(commits)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::artifacts::objects::commit::{BlobMap, Timestamp};
    use assert_fs::TempDir;
    use pretty_assertions::assert_eq;
    use rstest::{fixture, rstest};

    #[fixture]
    fn database() -> (TempDir, Database) {
        let dir = TempDir::new().expect("Failed to create temp dir");
        let database = Database::new(dir.path().join("objects").into_boxed_path());
        (dir, database)
    }

    #[rstest]
    fn storing_twice_yields_the_same_id(database: (TempDir, Database)) {
        let (_dir, database) = database;
        let blob = Blob::from("hello\n");

        let first = database.store(&blob).unwrap();
        let second = database.store(&blob).unwrap();

        assert_eq!(first, second);
        assert_eq!(database.get_blob(&first).unwrap(), blob);
        assert_eq!(database.list_objects().unwrap(), vec![first]);
    }

    #[rstest]
    fn stored_commit_reads_back_equal(database: (TempDir, Database)) {
        let (_dir, database) = database;
        let blob_id = database.store(&Blob::from("x")).unwrap();
        let root_id = database.store(&Commit::initial("initial commit")).unwrap();
        let commit = Commit::new(
            "first".to_string(),
            Timestamp::epoch(),
            BlobMap::from([(PathBuf::from("f"), blob_id)]),
            Some(root_id.clone()),
            None,
        );

        let commit_id = database.store(&commit).unwrap();

        assert_eq!(database.get_commit(&commit_id).unwrap(), commit);
        assert_eq!(
            database.get_slim_commit(&commit_id).unwrap().parents,
            vec![root_id]
        );
        assert_eq!(database.list_commits().unwrap().len(), 2);
    }

    #[rstest]
    fn unknown_ids_are_not_found(database: (TempDir, Database)) {
        let (_dir, database) = database;
        let oid = ObjectId::try_parse("ab".repeat(20)).unwrap();

        assert!(matches!(
            database.load(&oid),
            Err(GraftError::NotFound {
                subject: Subject::Object,
                ..
            })
        ));
        assert!(matches!(
            database.get_commit(&oid),
            Err(GraftError::NotFound {
                subject: Subject::Commit,
                ..
            })
        ));
    }

    #[rstest]
    fn blob_ids_are_not_commits(database: (TempDir, Database)) {
        let (_dir, database) = database;
        let blob_id = database.store(&Blob::from("x")).unwrap();

        assert!(matches!(
            database.get_commit(&blob_id),
            Err(GraftError::NotFound { .. })
        ));
    }

    #[rstest]
    fn prefixes_resolve_to_unique_ids(database: (TempDir, Database)) {
        let (_dir, database) = database;
        let oid = database.store(&Blob::from("x")).unwrap();

        assert_eq!(database.resolve_prefix(&oid.as_ref()[..4]).unwrap(), oid);
        assert_eq!(database.resolve_prefix(oid.as_ref()).unwrap(), oid);
        assert_eq!(
            database
                .resolve_prefix(&oid.as_ref()[..6].to_ascii_uppercase())
                .unwrap(),
            oid
        );
    }

    #[rstest]
    #[case("abc")]
    #[case("zzzz")]
    #[case("")]
    fn malformed_prefixes_are_invalid(database: (TempDir, Database), #[case] prefix: &str) {
        let (_dir, database) = database;
        assert!(matches!(
            database.resolve_prefix(prefix),
            Err(GraftError::InvalidOperand(_))
        ));
    }

    #[rstest]
    fn ambiguous_prefixes_list_every_candidate(database: (TempDir, Database)) {
        let (_dir, database) = database;
        let dir = database.objects_path().join("ab");
        std::fs::create_dir_all(&dir).unwrap();
        std::fs::write(dir.join(format!("cd{}", "1".repeat(36))), b"").unwrap();
        std::fs::write(dir.join(format!("cd{}", "2".repeat(36))), b"").unwrap();

        match database.resolve_prefix("abcd") {
            Err(GraftError::AmbiguousPrefix { candidates, .. }) => {
                assert_eq!(candidates.len(), 2)
            }
            other => panic!("expected an ambiguous prefix, got {other:?}"),
        }
        assert!(matches!(
            database.resolve_prefix("abce"),
            Err(GraftError::NotFound { .. })
        ));
    }
}
