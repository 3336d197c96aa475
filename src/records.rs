//! Single-line field access for PDB and mmCIF coordinate records.
//!
//! PDB fields are fixed byte columns (1-based, inclusive in the format
//! documentation): atom name 13-16, residue name 18-20, residue sequence
//! number 23-26. mmCIF `atom_site` rows are whitespace separated and the
//! residue number used here is the 9th token (`label_seq_id`).

use camino::Utf8Path;

use crate::domain::ResidueRange;
use crate::error::ProtfetchError;

pub const ATOM: &str = "ATOM";
pub const HETATM: &str = "HETATM";
pub const WATER: &str = "HOH";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StructureFormat {
    Pdb,
    Cif,
}

impl StructureFormat {
    pub fn from_path(path: &Utf8Path) -> Result<Self, ProtfetchError> {
        match path.extension().map(|ext| ext.to_ascii_lowercase()).as_deref() {
            Some("pdb") => Ok(StructureFormat::Pdb),
            Some("cif") => Ok(StructureFormat::Cif),
            _ => Err(ProtfetchError::UnsupportedFileFormat(path.to_string())),
        }
    }
}

pub fn is_atom(line: &str) -> bool {
    line.starts_with(ATOM)
}

pub fn is_hetatm(line: &str) -> bool {
    line.starts_with(HETATM)
}

fn is_coordinate(line: &str) -> bool {
    is_atom(line) || is_hetatm(line)
}

/// Bytes `start..end` of the line, clipped to its length.
fn column(line: &str, start: usize, end: usize) -> Option<&str> {
    let end = end.min(line.len());
    if start >= end {
        return None;
    }
    line.get(start..end)
}

pub fn pdb_atom_name(line: &str) -> Option<&str> {
    column(line, 12, 16).map(str::trim)
}

pub fn pdb_residue_name(line: &str) -> Option<&str> {
    column(line, 17, 20).map(str::trim)
}

pub fn pdb_residue_number(line: &str) -> Option<i64> {
    column(line, 22, 26)?.trim().parse().ok()
}

pub fn cif_residue_number(line: &str) -> Option<i64> {
    line.split_whitespace().nth(8)?.parse().ok()
}

pub fn cif_has_token(line: &str, token: &str) -> bool {
    line.split_whitespace().any(|field| field == token)
}

pub fn in_ranges(residue: i64, ranges: &[ResidueRange]) -> bool {
    ranges.iter().any(|range| range.contains(residue))
}

/// Residue number of an `ATOM` record, the only records the signal peptide
/// filter looks at.
pub fn atom_residue_number(format: StructureFormat, line: &str) -> Option<i64> {
    if !is_atom(line) {
        return None;
    }
    match format {
        StructureFormat::Pdb => pdb_residue_number(line),
        StructureFormat::Cif => cif_residue_number(line),
    }
}

pub fn is_signal_peptide(format: StructureFormat, line: &str, ranges: &[ResidueRange]) -> bool {
    atom_residue_number(format, line).is_some_and(|residue| in_ranges(residue, ranges))
}

pub fn is_hydrogen(format: StructureFormat, line: &str) -> bool {
    match format {
        StructureFormat::Pdb => {
            is_coordinate(line) && pdb_atom_name(line).is_some_and(|name| name.starts_with('H'))
        }
        StructureFormat::Cif => is_atom(line) && cif_has_token(line, "H"),
    }
}

pub fn is_water(format: StructureFormat, line: &str) -> bool {
    match format {
        StructureFormat::Pdb => is_coordinate(line) && pdb_residue_name(line) == Some(WATER),
        StructureFormat::Cif => is_coordinate(line) && line.contains(WATER),
    }
}

pub fn is_heteroatom(format: StructureFormat, line: &str) -> bool {
    match format {
        StructureFormat::Pdb => is_hetatm(line),
        StructureFormat::Cif => line.contains(HETATM),
    }
}
