use super::{decode, encode, Snapshot, SnapshotStore};
use crate::error::{AlchemyError, Result};
use std::fs::{self, File};
use std::io::{BufReader, BufWriter, Write};
use std::path::{Path, PathBuf};
use tracing::info;

/// Stores one snapshot as a gzip-compressed JSON file.
pub struct FileStore {
    path: PathBuf,
}

impl FileStore {
    pub fn new<P: Into<PathBuf>>(path: P) -> Self {
        Self { path: path.into() }
    }

    pub fn path(&self) -> &Path {
        &self.path
    }

    pub fn exists(&self) -> bool {
        self.path.is_file()
    }

    fn ensure_parent(&self) -> Result<()> {
        if let Some(parent) = self.path.parent() {
            if !parent.as_os_str().is_empty() && !parent.exists() {
                fs::create_dir_all(parent).map_err(AlchemyError::Io)?;
            }
        }
        Ok(())
    }

    fn temp_path(&self) -> PathBuf {
        let mut name = self
            .path
            .file_name()
            .map(|n| n.to_os_string())
            .unwrap_or_default();
        name.push(".tmp");
        self.path.with_file_name(name)
    }
}

impl SnapshotStore for FileStore {
    fn load(&self) -> Result<Option<Snapshot>> {
        if !self.exists() {
            return Ok(None);
        }
        let file = File::open(&self.path).map_err(AlchemyError::Io)?;
        decode(BufReader::new(file)).map(Some)
    }

    fn save(&mut self, snapshot: &Snapshot) -> Result<()> {
        self.ensure_parent()?;
        let temp = self.temp_path();
        if let Err(e) = write_then_rename(&temp, &self.path, snapshot) {
            // The target is untouched; drop the partial write with it
            let _ = fs::remove_file(&temp);
            return Err(e);
        }
        info!(path = %self.path.display(), items = snapshot.items.len(), "snapshot saved");
        Ok(())
    }

    fn location(&self) -> String {
        self.path.display().to_string()
    }
}

fn write_then_rename(temp: &Path, target: &Path, snapshot: &Snapshot) -> Result<()> {
    let mut writer = BufWriter::new(File::create(temp)?);
    encode(&mut writer, snapshot)?;
    writer.flush()?;
    drop(writer);
    fs::rename(temp, target)?;
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::store::{LoadOptions, SaveOptions};
    use crate::test_utils::{engine, five_items};

    #[test]
    fn test_load_missing_file() {
        let dir = tempfile::tempdir().unwrap();
        let store = FileStore::new(dir.path().join("none.json.gz"));
        assert!(store.load().unwrap().is_none());
    }

    #[test]
    fn test_save_creates_parent_and_roundtrips() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("nested").join("snap.json.gz");
        let mut store = FileStore::new(&path);

        let mut eng = engine(five_items(), 3);
        eng.catalog_all(3).unwrap();
        store
            .save(&Snapshot::capture(&eng, SaveOptions::full()))
            .unwrap();
        assert!(path.is_file());
        assert!(!store.temp_path().exists());

        let restored = store
            .load()
            .unwrap()
            .unwrap()
            .restore(&LoadOptions::default())
            .unwrap();
        assert_eq!(restored.recipe_count(), eng.recipe_count());
    }

    #[test]
    fn test_save_overwrites() {
        let dir = tempfile::tempdir().unwrap();
        let mut store = FileStore::new(dir.path().join("snap.json.gz"));

        let mut eng = engine(five_items(), 3);
        store
            .save(&Snapshot::capture(&eng, SaveOptions::full()))
            .unwrap();
        eng.catalog_all(2).unwrap();
        store
            .save(&Snapshot::capture(&eng, SaveOptions::full()))
            .unwrap();

        let snapshot = store.load().unwrap().unwrap();
        assert_eq!(snapshot.recipes.unwrap().len(), 7);
    }

    #[test]
    fn test_failed_save_removes_temp_file() {
        let dir = tempfile::tempdir().unwrap();
        // A non-empty directory where the snapshot should go makes the rename fail
        let path = dir.path().join("snap.json.gz");
        fs::create_dir(&path).unwrap();
        fs::write(path.join("occupied"), "x").unwrap();
        let mut store = FileStore::new(&path);

        let eng = engine(five_items(), 3);
        assert!(store
            .save(&Snapshot::capture(&eng, SaveOptions::full()))
            .is_err());
        assert!(!store.temp_path().exists());
        assert!(path.join("occupied").is_file());
    }

    #[test]
    fn test_corrupt_file_is_malformed() {
        let dir = tempfile::tempdir().unwrap();
        let path = dir.path().join("snap.json.gz");
        fs::write(&path, "definitely not gzip").unwrap();
        assert!(matches!(
            FileStore::new(path).load(),
            Err(AlchemyError::MalformedSnapshot(_))
        ));
    }
}
