use std::fs;

use assert_matches::assert_matches;
use camino::Utf8PathBuf;

use protfetch::config::{Config, ConfigLoader};
use protfetch::domain::{FileType, SourceDb};
use protfetch::error::ProtfetchError;

#[test]
fn parse_config_values() {
    let config = Config {
        main_db: Some("AlphaFold".to_string()),
        filetype: Some("pdb".to_string()),
        save_directory: Some(Utf8PathBuf::from("/tmp/structures")),
        alphafold_version: Some(6),
    };

    let resolved = ConfigLoader::resolve_config(config).unwrap();
    assert_eq!(resolved.main_db, SourceDb::Alphafold);
    assert_eq!(resolved.filetype, FileType::Pdb);
    assert_eq!(
        resolved.save_directory,
        Some(Utf8PathBuf::from("/tmp/structures"))
    );
    assert_eq!(resolved.alphafold_version, 6);
}

#[test]
fn read_config_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("protfetch.json");
    fs::write(&path, r#"{ "main_db": "alphafold", "filetype": "cif" }"#).unwrap();

    let resolved = ConfigLoader::resolve(path.to_str()).unwrap();
    assert_eq!(resolved.main_db, SourceDb::Alphafold);
    assert_eq!(resolved.filetype, FileType::Cif);
    assert_eq!(resolved.save_directory, None);
}

#[test]
fn invalid_file_type_in_config() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("protfetch.json");
    fs::write(&path, r#"{ "filetype": "mmtf" }"#).unwrap();

    assert_matches!(
        ConfigLoader::resolve(path.to_str()),
        Err(ProtfetchError::InvalidFileType(name)) if name == "mmtf"
    );
}

#[test]
fn malformed_config_file() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("protfetch.json");
    fs::write(&path, "{ main_db = pdb }").unwrap();

    assert_matches!(
        ConfigLoader::resolve(path.to_str()),
        Err(ProtfetchError::ConfigParse(_))
    );
}

#[test]
fn explicit_missing_config_is_an_error() {
    let temp = tempfile::tempdir().unwrap();
    let path = temp.path().join("absent.json");

    assert_matches!(
        ConfigLoader::resolve(path.to_str()),
        Err(ProtfetchError::ConfigRead(_))
    );
}
