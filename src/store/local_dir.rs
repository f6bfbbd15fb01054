//! Definition store backed by a local directory.
//!
//! Layout: `<root>/tests/<uuid>/meta.json` and `<root>/tests/<uuid>/data.bin`.

use super::DefinitionStore;
use crate::domain::TestId;
use crate::error::StoreResult;
use crate::models::TestFunctionMeta;
use std::fs;
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::sync::Mutex;

const META_FILE: &str = "meta.json";
const DATA_FILE: &str = "data.bin";

/// Stores definitions as JSON files under a root directory.
#[derive(Debug)]
pub struct LocalDirStore {
    root: PathBuf,
    // Serializes read-increment-write of versions within this process
    write_lock: Mutex<()>,
}

impl LocalDirStore {
    pub fn new(root: impl AsRef<Path>) -> Self {
        Self {
            root: root.as_ref().to_path_buf(),
            write_lock: Mutex::new(()),
        }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    fn tests_dir(&self) -> PathBuf {
        self.root.join("tests")
    }

    fn entry_dir(&self, id: &TestId) -> PathBuf {
        self.tests_dir().join(id.as_str())
    }

    /// Raw payload saved with a definition.
    pub fn payload(&self, id: &TestId) -> StoreResult<Option<Vec<u8>>> {
        match fs::read(self.entry_dir(id).join(DATA_FILE)) {
            Ok(bytes) => Ok(Some(bytes)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    fn read_meta(path: &Path) -> StoreResult<Option<TestFunctionMeta>> {
        match fs::read_to_string(path) {
            Ok(text) => Ok(Some(serde_json::from_str(&text)?)),
            Err(e) if e.kind() == ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }
}

impl DefinitionStore for LocalDirStore {
    fn load(&self, id: &TestId) -> StoreResult<Option<TestFunctionMeta>> {
        Self::read_meta(&self.entry_dir(id).join(META_FILE))
    }

    fn save(&self, meta: &TestFunctionMeta, payload: &[u8]) -> StoreResult<u32> {
        let _guard = self
            .write_lock
            .lock()
            .unwrap_or_else(std::sync::PoisonError::into_inner);

        let dir = self.entry_dir(&meta.uuid);
        fs::create_dir_all(&dir)?;

        let previous = Self::read_meta(&dir.join(META_FILE))?
            .and_then(|stored| stored.version)
            .unwrap_or(0);
        let version = previous + 1;

        let stored = meta.with_version(version);
        fs::write(dir.join(META_FILE), serde_json::to_vec_pretty(&stored)?)?;
        fs::write(dir.join(DATA_FILE), payload)?;

        tracing::debug!(test_id = %meta.uuid, version, dir = %dir.display(), "Saved definition locally");
        Ok(version)
    }

    fn list(&self) -> StoreResult<Vec<TestFunctionMeta>> {
        let entries = match fs::read_dir(self.tests_dir()) {
            Ok(entries) => entries,
            Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
            Err(e) => return Err(e.into()),
        };

        let mut metas = Vec::new();
        for entry in entries {
            let entry = entry?;
            if let Some(meta) = Self::read_meta(&entry.path().join(META_FILE))? {
                metas.push(meta);
            }
        }
        metas.sort_by(|a, b| (&a.module, &a.name).cmp(&(&b.module, &b.name)));
        Ok(metas)
    }
}
