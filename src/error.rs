use std::path::PathBuf;

use miette::Diagnostic;
use thiserror::Error;

#[derive(Debug, Error, Diagnostic)]
pub enum ProtfetchError {
    #[error("invalid identifier: {0}")]
    InvalidIdentifier(String),

    #[error("invalid file type: {0} (expected pdb or cif)")]
    InvalidFileType(String),

    #[error("unknown database: {0} (expected pdb or alphafold)")]
    UnknownSource(String),

    #[error("structure {0} not available on any database")]
    NotFoundInAnySource(String),

    #[error("no cached structure for {0}")]
    MissingCacheEntry(String),

    #[error("unsupported file format: {0} (only pdb and cif are supported)")]
    UnsupportedFileFormat(String),

    #[error("output {0} would overwrite the input structure")]
    OutputOverwritesInput(String),

    #[error("{0} is not a text structure file")]
    NotTextStructure(String),

    #[error("failed to read config file at {0}")]
    ConfigRead(PathBuf),

    #[error("failed to parse JSON config: {0}")]
    ConfigParse(String),

    #[error("failed to parse cache manifest: {0}")]
    ManifestParse(String),

    #[error("filesystem error: {0}")]
    Filesystem(String),

    #[error("RCSB request failed: {0}")]
    RcsbHttp(String),

    #[error("RCSB returned status {status}: {message}")]
    RcsbStatus { status: u16, message: String },

    #[error("AlphaFold request failed: {0}")]
    AlphafoldHttp(String),

    #[error("AlphaFold returned status {status}: {message}")]
    AlphafoldStatus { status: u16, message: String },

    #[error("uniprot request failed: {0}")]
    UniprotHttp(String),

    #[error("uniprot returned status {status}: {message}")]
    UniprotStatus { status: u16, message: String },
}
