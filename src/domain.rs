use std::fmt;
use std::hash::{Hash, Hasher};
use std::str::FromStr;

use clap::ValueEnum;
use serde::{Deserialize, Serialize};

use crate::error::ProtfetchError;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum FileType {
    Pdb,
    Cif,
}

impl FileType {
    pub const ALL: [FileType; 2] = [FileType::Pdb, FileType::Cif];

    pub fn extension(self) -> &'static str {
        match self {
            FileType::Pdb => "pdb",
            FileType::Cif => "cif",
        }
    }

    /// The format a source falls back to when this one is unavailable.
    pub fn other(self) -> FileType {
        match self {
            FileType::Pdb => FileType::Cif,
            FileType::Cif => FileType::Pdb,
        }
    }
}

impl fmt::Display for FileType {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.extension())
    }
}

impl FromStr for FileType {
    type Err = ProtfetchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pdb" => Ok(FileType::Pdb),
            "cif" => Ok(FileType::Cif),
            _ => Err(ProtfetchError::InvalidFileType(value.to_string())),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize, ValueEnum)]
#[serde(rename_all = "lowercase")]
pub enum SourceDb {
    Pdb,
    Alphafold,
}

impl SourceDb {
    /// Order in which availability is checked and alternatives are tried.
    pub const ALL: [SourceDb; 2] = [SourceDb::Pdb, SourceDb::Alphafold];

    pub fn as_str(self) -> &'static str {
        match self {
            SourceDb::Pdb => "pdb",
            SourceDb::Alphafold => "alphafold",
        }
    }
}

impl fmt::Display for SourceDb {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for SourceDb {
    type Err = ProtfetchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value.trim().to_ascii_lowercase().as_str() {
            "pdb" => Ok(SourceDb::Pdb),
            "alphafold" => Ok(SourceDb::Alphafold),
            _ => Err(ProtfetchError::UnknownSource(value.to_string())),
        }
    }
}

/// A UniProt accession (or any accession a source understands).
///
/// Comparison and hashing ignore case; the spelling the caller used is kept
/// for display.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Identifier(String);

impl Identifier {
    pub fn as_str(&self) -> &str {
        &self.0
    }

    /// Lower-case form used for cache file names.
    pub fn cache_key(&self) -> String {
        self.0.to_ascii_lowercase()
    }

    /// Upper-case form sent to remote databases.
    pub fn query_key(&self) -> String {
        self.0.to_ascii_uppercase()
    }
}

impl PartialEq for Identifier {
    fn eq(&self, other: &Self) -> bool {
        self.0.eq_ignore_ascii_case(&other.0)
    }
}

impl Eq for Identifier {}

impl Hash for Identifier {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.cache_key().hash(state);
    }
}

impl fmt::Display for Identifier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.0)
    }
}

impl FromStr for Identifier {
    type Err = ProtfetchError;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let trimmed = value.trim();
        let is_valid = !trimmed.is_empty()
            && trimmed
                .chars()
                .all(|ch| ch.is_ascii_alphanumeric() || ch == '_' || ch == '-');
        if !is_valid {
            return Err(ProtfetchError::InvalidIdentifier(value.to_string()));
        }
        Ok(Self(trimmed.to_string()))
    }
}

/// 1-based inclusive residue span, e.g. a signal peptide.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct ResidueRange {
    pub start: i64,
    pub end: i64,
}

impl ResidueRange {
    pub fn new(start: i64, end: i64) -> Self {
        Self { start, end }
    }

    pub fn contains(&self, residue: i64) -> bool {
        self.start <= residue && residue <= self.end
    }
}

impl fmt::Display for ResidueRange {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}to{}", self.start, self.end)
    }
}

impl From<(i64, i64)> for ResidueRange {
    fn from((start, end): (i64, i64)) -> Self {
        Self { start, end }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum StructureData {
    Text(String),
    Binary(Vec<u8>),
}

impl StructureData {
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        match String::from_utf8(bytes) {
            Ok(text) => StructureData::Text(text),
            Err(err) => StructureData::Binary(err.into_bytes()),
        }
    }

    pub fn as_bytes(&self) -> &[u8] {
        match self {
            StructureData::Text(text) => text.as_bytes(),
            StructureData::Binary(bytes) => bytes,
        }
    }

    pub fn len(&self) -> usize {
        self.as_bytes().len()
    }

    pub fn is_empty(&self) -> bool {
        self.len() == 0
    }
}

/// What a structure source hands back for one request.
///
/// `filetype` may differ from the requested one when the source fell back
/// to the other format.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Retrieved {
    pub identifier: String,
    pub filetype: FileType,
    pub data: StructureData,
}
