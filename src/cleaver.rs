use std::fs::{self, File};
use std::io::{self, BufRead, BufReader, BufWriter, Write};

use camino::{Utf8Path, Utf8PathBuf};
use serde::Serialize;
use tracing::info;

use crate::domain::{Identifier, ResidueRange};
use crate::error::ProtfetchError;
use crate::records::{self, StructureFormat};
use crate::source::AnnotationClient;

/// Which record classes to drop. Every flag is independent.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct FilterOptions {
    pub signal_peptides: bool,
    pub hydrogens: bool,
    pub water: bool,
    pub hetatoms: bool,
}

impl Default for FilterOptions {
    fn default() -> Self {
        Self {
            signal_peptides: true,
            hydrogens: true,
            water: true,
            hetatoms: true,
        }
    }
}

impl FilterOptions {
    pub fn none() -> Self {
        Self {
            signal_peptides: false,
            hydrogens: false,
            water: false,
            hetatoms: false,
        }
    }

    pub fn any(&self) -> bool {
        self.signal_peptides || self.hydrogens || self.water || self.hetatoms
    }

    /// Filename tags in the order they are appended.
    pub fn tags(&self, ranges: &[ResidueRange]) -> Vec<String> {
        let mut tags = Vec::new();
        if self.signal_peptides {
            if ranges.is_empty() {
                tags.push("nosignalnone".to_string());
            } else {
                let spans = ranges
                    .iter()
                    .map(ResidueRange::to_string)
                    .collect::<Vec<_>>()
                    .join("_");
                tags.push(format!("nosignal{spans}"));
            }
        }
        if self.hydrogens {
            tags.push("nohydrogens".to_string());
        }
        if self.water {
            tags.push("nowater".to_string());
        }
        if self.hetatoms {
            tags.push("nohetatm".to_string());
        }
        tags
    }

    fn drops(&self, format: StructureFormat, line: &str, ranges: &[ResidueRange]) -> bool {
        (self.signal_peptides && records::is_signal_peptide(format, line, ranges))
            || (self.hydrogens && records::is_hydrogen(format, line))
            || (self.water && records::is_water(format, line))
            || (self.hetatoms && records::is_heteroatom(format, line))
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct FilterReport {
    pub output: Utf8PathBuf,
    pub lines_read: usize,
    pub lines_removed: usize,
}

/// `<base>_<tags>.<ext>`, or `<base>_unmodified.<ext>` with no filter set.
pub fn output_name(input: &Utf8Path, ranges: &[ResidueRange], options: &FilterOptions) -> Utf8PathBuf {
    let tags = options.tags(ranges);
    let suffix = if tags.is_empty() {
        "unmodified".to_string()
    } else {
        tags.join("_")
    };
    suffixed(input, &suffix)
}

fn suffixed(input: &Utf8Path, suffix: &str) -> Utf8PathBuf {
    let stem = input.file_stem().unwrap_or_default();
    let name = match input.extension() {
        Some(ext) => format!("{stem}_{suffix}.{ext}"),
        None => format!("{stem}_{suffix}"),
    };
    input.with_file_name(name)
}

/// Copies `input` to `output` (or the derived name) without the records the
/// options select. Lines are copied byte for byte, terminators included.
/// `output` must differ from `input`, and input that is not UTF-8 text fails
/// with [`ProtfetchError::NotTextStructure`] leaving no output behind.
pub fn remove_nonmain(
    input: &Utf8Path,
    ranges: &[ResidueRange],
    options: FilterOptions,
    output: Option<&Utf8Path>,
) -> Result<FilterReport, ProtfetchError> {
    let output = output
        .map(Utf8Path::to_path_buf)
        .unwrap_or_else(|| output_name(input, ranges, &options));
    filter_file(input, &output, ranges, options)
}

pub fn remove_hydrogens(
    input: &Utf8Path,
    output: Option<&Utf8Path>,
) -> Result<FilterReport, ProtfetchError> {
    let options = FilterOptions {
        hydrogens: true,
        ..FilterOptions::none()
    };
    single_filter(input, output, options, "nohydrogens")
}

pub fn remove_water_atoms(
    input: &Utf8Path,
    output: Option<&Utf8Path>,
) -> Result<FilterReport, ProtfetchError> {
    let options = FilterOptions {
        water: true,
        ..FilterOptions::none()
    };
    single_filter(input, output, options, "nowater")
}

pub fn remove_hetatoms(
    input: &Utf8Path,
    output: Option<&Utf8Path>,
) -> Result<FilterReport, ProtfetchError> {
    let options = FilterOptions {
        hetatoms: true,
        ..FilterOptions::none()
    };
    single_filter(input, output, options, "nohetatm")
}

fn single_filter(
    input: &Utf8Path,
    output: Option<&Utf8Path>,
    options: FilterOptions,
    suffix: &str,
) -> Result<FilterReport, ProtfetchError> {
    let output = output
        .map(Utf8Path::to_path_buf)
        .unwrap_or_else(|| suffixed(input, suffix));
    filter_file(input, &output, &[], options)
}

/// In-memory counterpart of [`remove_nonmain`].
pub fn filter_text(
    format: StructureFormat,
    text: &str,
    ranges: &[ResidueRange],
    options: FilterOptions,
) -> String {
    text.split_inclusive('\n')
        .filter(|line| !options.drops(format, line, ranges))
        .collect()
}

fn filter_file(
    input: &Utf8Path,
    output: &Utf8Path,
    ranges: &[ResidueRange],
    options: FilterOptions,
) -> Result<FilterReport, ProtfetchError> {
    let format = StructureFormat::from_path(input)?;
    if same_file(input, output) {
        return Err(ProtfetchError::OutputOverwritesInput(output.to_string()));
    }
    let reader = File::open(input.as_std_path())
        .map(BufReader::new)
        .map_err(|err| ProtfetchError::Filesystem(format!("open {input}: {err}")))?;
    let mut writer = File::create(output.as_std_path())
        .map(BufWriter::new)
        .map_err(|err| ProtfetchError::Filesystem(format!("create {output}: {err}")))?;

    let copied = copy_kept_lines(reader, &mut writer, format, ranges, &options)
        .and_then(|counts| writer.flush().map(|()| counts));
    let (lines_read, lines_removed) = match copied {
        Ok(counts) => counts,
        Err(err) => {
            drop(writer);
            let _ = fs::remove_file(output.as_std_path());
            return Err(match err.kind() {
                io::ErrorKind::InvalidData => ProtfetchError::NotTextStructure(input.to_string()),
                _ => ProtfetchError::Filesystem(format!("filter {input} into {output}: {err}")),
            });
        }
    };

    info!(input = %input, output = %output, lines_read, lines_removed, "filtered structure");
    Ok(FilterReport {
        output: output.to_path_buf(),
        lines_read,
        lines_removed,
    })
}

/// Paths are compared as written, then resolved when both exist.
fn same_file(input: &Utf8Path, output: &Utf8Path) -> bool {
    if input == output {
        return true;
    }
    match (input.canonicalize_utf8(), output.canonicalize_utf8()) {
        (Ok(input), Ok(output)) => input == output,
        _ => false,
    }
}

fn copy_kept_lines<R: BufRead, W: Write>(
    mut reader: R,
    writer: &mut W,
    format: StructureFormat,
    ranges: &[ResidueRange],
    options: &FilterOptions,
) -> io::Result<(usize, usize)> {
    let mut line = String::new();
    let mut read = 0;
    let mut removed = 0;
    loop {
        line.clear();
        if reader.read_line(&mut line)? == 0 {
            break;
        }
        read += 1;
        if options.drops(format, &line, ranges) {
            removed += 1;
        } else {
            writer.write_all(line.as_bytes())?;
        }
    }
    Ok((read, removed))
}

/// Signal peptide lookup plus filtering for one protein.
pub struct Cleaver<U: AnnotationClient> {
    annotations: U,
}

impl<U: AnnotationClient> Cleaver<U> {
    pub fn new(annotations: U) -> Self {
        Self { annotations }
    }

    pub fn signal_residuenumbers_requester(
        &self,
        id: &Identifier,
    ) -> Result<Vec<ResidueRange>, ProtfetchError> {
        let ranges = self.annotations.signal_peptides(id)?;
        if ranges.is_empty() {
            info!(id = %id, "no signal peptide annotated");
        }
        Ok(ranges)
    }

    /// Resolves signal peptides for `id` only when that filter is enabled,
    /// then runs [`remove_nonmain`].
    pub fn cleave(
        &self,
        id: &Identifier,
        input: &Utf8Path,
        options: FilterOptions,
        output: Option<&Utf8Path>,
    ) -> Result<FilterReport, ProtfetchError> {
        StructureFormat::from_path(input)?;
        let ranges = if options.signal_peptides {
            self.signal_residuenumbers_requester(id)?
        } else {
            Vec::new()
        };
        remove_nonmain(input, &ranges, options, output)
    }
}
