#![allow(dead_code)]

use std::sync::Mutex;

use camino::Utf8PathBuf;

use protfetch::domain::{FileType, Identifier, ResidueRange, Retrieved, StructureData};
use protfetch::error::ProtfetchError;
use protfetch::source::{AnnotationClient, StructureSource};

pub const PDB_FIXTURE: &str = "\
HEADER    SIGNAL PEPTIDE TEST
ATOM      1  N   MET A   1      27.340  24.430   2.614  1.00  9.67           N
ATOM      2  H   MET A   1      27.800  24.900   2.100  1.00  9.67           H
ATOM      3  CA  ALA A  24      26.266  25.413   2.842  1.00 10.38           C
ATOM      4  CA  GLY A  25      26.913  26.639   3.531  1.00  9.62           C
ATOM      5  HA  GLY A  25      27.300  26.900   4.400  1.00  9.62           H
ATOM      6  CA  SER A  26      27.886  26.463   4.263  1.00  9.62           C
ATOM      7  HB2 SER A  26      28.100  27.000   5.100  1.00  9.62           H
HETATM    8  O   HOH A 101      30.000  20.000   1.000  1.00 30.00           O
HETATM    9  C1  NAG A 102      12.000  11.000  10.000  1.00 40.00           C
END
";

pub const CIF_FIXTURE: &str = "\
data_TEST
loop_
_atom_site.group_PDB
_atom_site.id
_atom_site.type_symbol
_atom_site.label_atom_id
_atom_site.label_alt_id
_atom_site.label_comp_id
_atom_site.label_asym_id
_atom_site.label_entity_id
_atom_site.label_seq_id
ATOM   1 N N   . MET A 1 1  ? 27.340 24.430 2.614 1.00 9.67 ? 1  MET A N   1
ATOM   2 H H   . MET A 1 1  ? 27.800 24.900 2.100 1.00 9.67 ? 1  MET A H   1
ATOM   3 C CA  . GLY A 1 25 ? 26.913 26.639 3.531 1.00 9.62 ? 25 GLY A CA  1
ATOM   4 C CA  . SER A 1 26 ? 27.886 26.463 4.263 1.00 9.62 ? 26 SER A CA  1
HETATM 5 O O   . HOH B 2 .  ? 30.000 20.000 1.000 1.00 30.00 ? 101 HOH A O 1
#
";

pub struct MockSource {
    pub available: bool,
    pub entry: Option<String>,
    pub only: Option<FileType>,
    pub checks: Mutex<usize>,
    pub gets: Mutex<usize>,
}

impl MockSource {
    pub fn available() -> Self {
        Self {
            available: true,
            entry: None,
            only: None,
            checks: Mutex::new(0),
            gets: Mutex::new(0),
        }
    }

    pub fn missing() -> Self {
        Self {
            available: false,
            ..Self::available()
        }
    }

    pub fn with_entry(entry: &str) -> Self {
        Self {
            entry: Some(entry.to_string()),
            ..Self::available()
        }
    }

    pub fn only(filetype: FileType) -> Self {
        Self {
            only: Some(filetype),
            ..Self::available()
        }
    }

    pub fn checks(&self) -> usize {
        *self.checks.lock().unwrap()
    }

    pub fn gets(&self) -> usize {
        *self.gets.lock().unwrap()
    }
}

impl StructureSource for MockSource {
    fn check_structure(&self, _id: &Identifier) -> Result<bool, ProtfetchError> {
        *self.checks.lock().unwrap() += 1;
        Ok(self.available)
    }

    fn get_structure(
        &self,
        id: &Identifier,
        filetype: FileType,
    ) -> Result<Retrieved, ProtfetchError> {
        *self.gets.lock().unwrap() += 1;
        let filetype = self.only.unwrap_or(filetype);
        let data = match filetype {
            FileType::Pdb => PDB_FIXTURE,
            FileType::Cif => CIF_FIXTURE,
        };
        let identifier = match &self.entry {
            Some(entry) => format!("{id}_{entry}"),
            None => id.to_string(),
        };
        Ok(Retrieved {
            identifier,
            filetype,
            data: StructureData::Text(data.to_string()),
        })
    }
}

pub struct FailingSource;

impl StructureSource for FailingSource {
    fn check_structure(&self, _id: &Identifier) -> Result<bool, ProtfetchError> {
        Err(ProtfetchError::RcsbStatus {
            status: 503,
            message: "unavailable".to_string(),
        })
    }

    fn get_structure(
        &self,
        _id: &Identifier,
        _filetype: FileType,
    ) -> Result<Retrieved, ProtfetchError> {
        Err(ProtfetchError::RcsbHttp("not implemented".to_string()))
    }
}

#[derive(Default)]
pub struct MockAnnotations {
    pub ranges: Vec<ResidueRange>,
    pub calls: Mutex<usize>,
}

impl MockAnnotations {
    pub fn with(ranges: &[(i64, i64)]) -> Self {
        Self {
            ranges: ranges.iter().copied().map(ResidueRange::from).collect(),
            calls: Mutex::new(0),
        }
    }
}

impl AnnotationClient for MockAnnotations {
    fn signal_peptides(&self, _id: &Identifier) -> Result<Vec<ResidueRange>, ProtfetchError> {
        *self.calls.lock().unwrap() += 1;
        Ok(self.ranges.clone())
    }
}

pub fn temp_dir() -> (tempfile::TempDir, Utf8PathBuf) {
    let temp = tempfile::tempdir().unwrap();
    let dir = Utf8PathBuf::from_path_buf(temp.path().join("cache")).unwrap();
    (temp, dir)
}

pub fn id(value: &str) -> Identifier {
    value.parse().unwrap()
}
