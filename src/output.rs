use std::io::{self, Write};

use serde::Serialize;

use crate::cleaver::FilterReport;
use crate::domain::{FileType, SourceDb};
use crate::fetcher::SearchRecord;

#[derive(Debug, Clone, Copy)]
pub enum OutputMode {
    Human,
    Json,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchItemResult {
    pub id: String,
    pub source: Option<SourceDb>,
    pub filetype: FileType,
    pub path: Option<String>,
    pub cleaned: Option<FilterReport>,
}

#[derive(Debug, Clone, Serialize)]
pub struct FetchResult {
    pub items: Vec<FetchItemResult>,
    /// Databases reporting each identifier that was looked up remotely.
    pub searches: Vec<SearchRecord>,
}

pub struct HumanOutput;

impl HumanOutput {
    pub fn print_item(item: &FetchItemResult) {
        if let Some(path) = &item.path {
            println!("Saved {} to '{}'", item.id, path);
        }
        if let Some(report) = &item.cleaned {
            println!("Cleaned {} to '{}'", item.id, report.output);
        }
    }
}

pub struct JsonOutput;

impl JsonOutput {
    pub fn print_fetch(result: &FetchResult) -> io::Result<()> {
        Self::print_json(result)
    }

    fn print_json<T: Serialize>(value: &T) -> io::Result<()> {
        let json = serde_json::to_string_pretty(value).map_err(io::Error::other)?;
        let mut stdout = io::stdout();
        stdout.write_all(json.as_bytes())?;
        stdout.write_all(b"\n")?;
        Ok(())
    }
}
