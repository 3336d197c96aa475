use std::collections::BTreeMap;
use std::fs;

use camino::{Utf8Path, Utf8PathBuf};
use directories::BaseDirs;
use serde::{Deserialize, Serialize};
use tracing::debug;

use crate::domain::{FileType, Identifier, SourceDb, StructureData};
use crate::error::ProtfetchError;

pub const MANIFEST_FILE: &str = "manifest.txt";

/// Flat directory of `<id>.pdb` / `<id>.cif` files plus a JSON manifest.
///
/// Reads of a missing identifier fail with
/// [`ProtfetchError::MissingCacheEntry`]; there is no `Option` variant.
/// Writes are plain file writes, so two processes writing the same key race
/// and the last one wins, manifest included.
#[derive(Debug, Clone)]
pub struct FileCache {
    directory: Utf8PathBuf,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ManifestEntry {
    pub fileorigin: SourceDb,
    pub filetype: FileType,
    pub filename: String,
    #[serde(default)]
    pub saved_at: Option<String>,
    #[serde(default)]
    pub tool: Option<String>,
}

pub type Manifest = BTreeMap<String, ManifestEntry>;

impl FileCache {
    pub fn new(directory: Option<Utf8PathBuf>) -> Result<Self, ProtfetchError> {
        let directory = match directory {
            Some(dir) => absolutize(dir)?,
            None => default_directory()?,
        };
        fs::create_dir_all(directory.as_std_path())
            .map_err(|err| ProtfetchError::Filesystem(format!("create {directory}: {err}")))?;
        Ok(Self { directory })
    }

    pub fn directory(&self) -> &Utf8Path {
        &self.directory
    }

    pub fn manifest_path(&self) -> Utf8PathBuf {
        self.directory.join(MANIFEST_FILE)
    }

    pub fn path(&self, id: &Identifier, filetype: FileType) -> Utf8PathBuf {
        self.directory
            .join(format!("{}.{}", id.cache_key(), filetype.extension()))
    }

    /// Same as [`FileCache::path`] for a file type given as free text.
    pub fn path_str(&self, id: &Identifier, filetype: &str) -> Result<Utf8PathBuf, ProtfetchError> {
        Ok(self.path(id, filetype.parse()?))
    }

    /// Existing files for `id`, pdb before cif.
    pub fn find(&self, id: &Identifier) -> Vec<Utf8PathBuf> {
        FileType::ALL
            .into_iter()
            .map(|filetype| self.path(id, filetype))
            .filter(|path| path.as_std_path().is_file())
            .collect()
    }

    pub fn contains(&self, id: &Identifier) -> bool {
        !self.find(id).is_empty()
    }

    pub fn get(&self, id: &Identifier) -> Result<Utf8PathBuf, ProtfetchError> {
        self.find(id)
            .into_iter()
            .next()
            .ok_or_else(|| ProtfetchError::MissingCacheEntry(id.to_string()))
    }

    pub fn read(&self, path: &Utf8Path) -> Result<StructureData, ProtfetchError> {
        let bytes = fs::read(path.as_std_path())
            .map_err(|err| ProtfetchError::Filesystem(format!("read {path}: {err}")))?;
        Ok(StructureData::from_bytes(bytes))
    }

    pub fn insert(
        &self,
        id: &Identifier,
        origin: SourceDb,
        filetype: FileType,
        data: &StructureData,
    ) -> Result<Utf8PathBuf, ProtfetchError> {
        let path = self.path(id, filetype);
        let written = match data {
            StructureData::Text(text) => fs::write(path.as_std_path(), text),
            StructureData::Binary(bytes) => fs::write(path.as_std_path(), bytes),
        };
        written.map_err(|err| ProtfetchError::Filesystem(format!("write {path}: {err}")))?;
        debug!(id = %id, path = %path, bytes = data.len(), "stored structure");

        let mut manifest = self.manifest()?;
        manifest.insert(
            id.cache_key(),
            ManifestEntry {
                fileorigin: origin,
                filetype,
                filename: path.to_string(),
                saved_at: Some(chrono::Utc::now().to_rfc3339()),
                tool: Some(format!("protfetch/{}", env!("CARGO_PKG_VERSION"))),
            },
        );
        self.write_manifest(&manifest)?;
        Ok(path)
    }

    pub fn manifest(&self) -> Result<Manifest, ProtfetchError> {
        let path = self.manifest_path();
        if !path.as_std_path().exists() {
            return Ok(Manifest::new());
        }
        let content = fs::read_to_string(path.as_std_path())
            .map_err(|err| ProtfetchError::Filesystem(format!("read {path}: {err}")))?;
        serde_json::from_str(&content).map_err(|err| ProtfetchError::ManifestParse(err.to_string()))
    }

    fn write_manifest(&self, manifest: &Manifest) -> Result<(), ProtfetchError> {
        let path = self.manifest_path();
        let content = serde_json::to_vec_pretty(manifest)
            .map_err(|err| ProtfetchError::Filesystem(err.to_string()))?;
        fs::write(path.as_std_path(), content)
            .map_err(|err| ProtfetchError::Filesystem(format!("write {path}: {err}")))
    }

    /// Scans the directory as it is now, one pair per structure file.
    pub fn items(&self) -> Result<Vec<(String, Utf8PathBuf)>, ProtfetchError> {
        let entries = fs::read_dir(self.directory.as_std_path())
            .map_err(|err| ProtfetchError::Filesystem(err.to_string()))?;
        let mut items = Vec::new();
        for entry in entries {
            let entry = entry.map_err(|err| ProtfetchError::Filesystem(err.to_string()))?;
            let Ok(path) = Utf8PathBuf::from_path_buf(entry.path()) else {
                continue;
            };
            let is_structure = matches!(path.extension(), Some("pdb") | Some("cif"));
            if !is_structure || !path.as_std_path().is_file() {
                continue;
            }
            if let Some(stem) = path.file_stem() {
                items.push((stem.to_string(), path.clone()));
            }
        }
        items.sort();
        Ok(items)
    }
}

fn default_directory() -> Result<Utf8PathBuf, ProtfetchError> {
    BaseDirs::new()
        .and_then(|dirs| Utf8PathBuf::from_path_buf(dirs.home_dir().join(".cache").join("pdb")).ok())
        .ok_or_else(|| ProtfetchError::Filesystem("unable to resolve cache directory".to_string()))
}

fn absolutize(dir: Utf8PathBuf) -> Result<Utf8PathBuf, ProtfetchError> {
    if dir.is_absolute() {
        return Ok(dir);
    }
    let cwd = std::env::current_dir().map_err(|err| ProtfetchError::Filesystem(err.to_string()))?;
    Utf8PathBuf::from_path_buf(cwd.join(dir.as_std_path()))
        .map_err(|_| ProtfetchError::Filesystem("invalid cache path".to_string()))
}
