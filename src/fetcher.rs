use std::collections::HashMap;

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::{debug, info};

use crate::cache::FileCache;
use crate::cleaver::{Cleaver, FilterOptions, FilterReport};
use crate::domain::{FileType, Identifier, Retrieved, SourceDb, StructureData};
use crate::error::ProtfetchError;
use crate::source::{AnnotationClient, StructureSource};

/// Result of [`Fetcher::get_file`].
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct FetchedFile {
    /// Location in the cache; `None` unless `filesave` was requested.
    pub path: Option<Utf8PathBuf>,
    /// Database the file came from; `None` for cache hits.
    pub source: Option<SourceDb>,
    pub filetype: FileType,
    pub data: StructureData,
}

#[derive(Debug, Clone, Serialize)]
pub struct SearchRecord {
    pub id: String,
    pub available: Vec<SourceDb>,
}

/// Finds a structure in the PDB or AlphaFold DB, preferring the default
/// database, and keeps downloaded files in a [`FileCache`].
pub struct Fetcher<P: StructureSource, A: StructureSource, U: AnnotationClient> {
    main_db: SourceDb,
    cache: FileCache,
    pdb: P,
    alphafold: A,
    cleaver: Cleaver<U>,
    search_results: HashMap<Identifier, Vec<SourceDb>>,
    saved: HashMap<Identifier, Utf8PathBuf>,
}

impl<P: StructureSource, A: StructureSource, U: AnnotationClient> Fetcher<P, A, U> {
    pub fn new(
        main_db: SourceDb,
        save_directory: Option<Utf8PathBuf>,
        pdb: P,
        alphafold: A,
        annotations: U,
    ) -> Result<Self, ProtfetchError> {
        Ok(Self {
            main_db,
            cache: FileCache::new(save_directory)?,
            pdb,
            alphafold,
            cleaver: Cleaver::new(annotations),
            search_results: HashMap::new(),
            saved: HashMap::new(),
        })
    }

    pub fn default_db(&self) -> SourceDb {
        self.main_db
    }

    pub fn set_default_db(&mut self, db: SourceDb) {
        self.main_db = db;
    }

    pub fn cache(&self) -> &FileCache {
        &self.cache
    }

    pub fn set_directory(&mut self, directory: Utf8PathBuf) -> Result<(), ProtfetchError> {
        self.cache = FileCache::new(Some(directory))?;
        self.saved.clear();
        Ok(())
    }

    pub fn search_history(&self) -> &HashMap<Identifier, Vec<SourceDb>> {
        &self.search_results
    }

    pub fn search_records(&self) -> Vec<SearchRecord> {
        let mut records = self
            .search_results
            .iter()
            .map(|(id, available)| SearchRecord {
                id: id.to_string(),
                available: available.clone(),
            })
            .collect::<Vec<_>>();
        records.sort_by(|a, b| a.id.cmp(&b.id));
        records
    }

    fn source(&self, db: SourceDb) -> &dyn StructureSource {
        match db {
            SourceDb::Pdb => &self.pdb,
            SourceDb::Alphafold => &self.alphafold,
        }
    }

    /// Databases reporting `id`, pdb first.
    pub fn check_db(&self, id: &Identifier) -> Result<Vec<SourceDb>, ProtfetchError> {
        let mut available = Vec::new();
        for db in SourceDb::ALL {
            if self.source(db).check_structure(id)? {
                available.push(db);
            }
        }
        Ok(available)
    }

    pub fn file_from_db(
        &self,
        id: &Identifier,
        filetype: FileType,
        db: SourceDb,
    ) -> Result<Retrieved, ProtfetchError> {
        self.source(db).get_structure(id, filetype)
    }

    pub fn get_file(
        &mut self,
        id: &Identifier,
        filetype: FileType,
        filesave: bool,
        db: SourceDb,
    ) -> Result<FetchedFile, ProtfetchError> {
        let cached = self.cache.path(id, filetype);
        if cached.as_std_path().is_file() {
            debug!(id = %id, path = %cached, "cache hit");
            let data = self.cache.read(&cached)?;
            self.saved.insert(id.clone(), cached.clone());
            return Ok(FetchedFile {
                path: filesave.then_some(cached),
                source: None,
                filetype,
                data,
            });
        }

        let available = self.check_db(id)?;
        self.search_results.insert(id.clone(), available.clone());

        let chosen = if available.contains(&db) {
            info!(id = %id, db = %db, "structure available on default database");
            db
        } else {
            let alternative = available
                .first()
                .copied()
                .ok_or_else(|| ProtfetchError::NotFoundInAnySource(id.to_string()))?;
            info!(id = %id, db = %alternative, "structure available in alternative database");
            alternative
        };

        let retrieved = self.file_from_db(id, filetype, chosen)?;
        let path = if filesave {
            let stored: Identifier = retrieved.identifier.parse()?;
            let path = self
                .cache
                .insert(&stored, chosen, retrieved.filetype, &retrieved.data)?;
            self.saved.insert(id.clone(), path.clone());
            Some(path)
        } else {
            None
        };

        Ok(FetchedFile {
            path,
            source: Some(chosen),
            filetype: retrieved.filetype,
            data: retrieved.data,
        })
    }

    /// Cached file for `id`: the one this fetcher last saved or served,
    /// else `<id>.pdb` / `<id>.cif`, else a manifest entry stored as
    /// `<id>_<entry>` by an earlier run.
    pub fn stored_path(&self, id: &Identifier) -> Result<Utf8PathBuf, ProtfetchError> {
        if let Some(path) = self.saved.get(id).filter(|path| path.as_std_path().is_file()) {
            return Ok(path.clone());
        }
        if let Ok(path) = self.cache.get(id) {
            return Ok(path);
        }
        let prefix = format!("{}_", id.cache_key());
        self.cache
            .manifest()?
            .into_iter()
            .filter(|(key, _)| key.starts_with(&prefix))
            .map(|(_, entry)| Utf8PathBuf::from(entry.filename))
            .find(|path| path.as_std_path().is_file())
            .ok_or_else(|| ProtfetchError::MissingCacheEntry(id.to_string()))
    }

    /// Filters the cached structure of `id` into a new file next to it.
    /// Signal peptides are looked up for `id` itself, not the stored key.
    pub fn remove(
        &self,
        id: &Identifier,
        options: FilterOptions,
        output: Option<&Utf8Path>,
    ) -> Result<FilterReport, ProtfetchError> {
        let input = self.stored_path(id)?;
        self.cleaver.cleave(id, &input, options, output)
    }
}
