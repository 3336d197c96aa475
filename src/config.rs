use std::fs;
use std::path::PathBuf;

use camino::Utf8PathBuf;
use serde::{Deserialize, Serialize};

use crate::alphafold::DEFAULT_MODEL_VERSION;
use crate::domain::{FileType, SourceDb};
use crate::error::ProtfetchError;

pub const CONFIG_FILE: &str = "protfetch.json";

/// Optional defaults read from `protfetch.json`.
#[derive(Debug, Default, Deserialize, Serialize)]
pub struct Config {
    #[serde(default)]
    pub main_db: Option<String>,
    #[serde(default)]
    pub filetype: Option<String>,
    #[serde(default)]
    pub save_directory: Option<Utf8PathBuf>,
    #[serde(default)]
    pub alphafold_version: Option<u32>,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ResolvedConfig {
    pub main_db: SourceDb,
    pub filetype: FileType,
    /// `None` selects the cache's default directory.
    pub save_directory: Option<Utf8PathBuf>,
    pub alphafold_version: u32,
}

pub struct ConfigLoader;

impl ConfigLoader {
    /// Reads `path`, or `protfetch.json` in the current directory when it
    /// exists. An explicit path that cannot be read is an error.
    pub fn resolve(path: Option<&str>) -> Result<ResolvedConfig, ProtfetchError> {
        let config_path = match path {
            Some(path) => PathBuf::from(path),
            None => PathBuf::from(CONFIG_FILE),
        };

        if path.is_none() && !config_path.exists() {
            return Self::resolve_config(Config::default());
        }

        let content = fs::read_to_string(&config_path)
            .map_err(|_| ProtfetchError::ConfigRead(config_path.clone()))?;
        let config: Config = serde_json::from_str(&content)
            .map_err(|err| ProtfetchError::ConfigParse(err.to_string()))?;

        Self::resolve_config(config)
    }

    pub fn resolve_config(config: Config) -> Result<ResolvedConfig, ProtfetchError> {
        let main_db = match config.main_db {
            Some(name) => name.parse()?,
            None => SourceDb::Pdb,
        };
        let filetype = match config.filetype {
            Some(name) => name.parse()?,
            None => FileType::Cif,
        };
        Ok(ResolvedConfig {
            main_db,
            filetype,
            save_directory: config.save_directory,
            alphafold_version: config.alphafold_version.unwrap_or(DEFAULT_MODEL_VERSION),
        })
    }
}
