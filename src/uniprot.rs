use reqwest::blocking::Client;
use serde_json::Value;
use tracing::warn;

use crate::domain::{Identifier, ResidueRange};
use crate::error::ProtfetchError;
use crate::rcsb::build_client;
use crate::source::AnnotationClient;

const SIGNAL_PEPTIDE: &str = "Signal peptide";

#[derive(Clone)]
pub struct UniprotHttpClient {
    client: Client,
}

impl UniprotHttpClient {
    pub fn new() -> Result<Self, ProtfetchError> {
        let client = build_client().map_err(|err| ProtfetchError::UniprotHttp(err.to_string()))?;
        Ok(Self { client })
    }

    pub fn entry_url(id: &Identifier) -> String {
        format!("https://rest.uniprot.org/uniprotkb/{}.json", id.query_key())
    }

    fn handle_status(
        response: reqwest::blocking::Response,
    ) -> Result<reqwest::blocking::Response, ProtfetchError> {
        if response.status().is_success() {
            return Ok(response);
        }
        let status = response.status().as_u16();
        let message = response
            .text()
            .unwrap_or_else(|_| "UniProt request failed".to_string());
        Err(ProtfetchError::UniprotStatus { status, message })
    }
}

impl AnnotationClient for UniprotHttpClient {
    fn signal_peptides(&self, id: &Identifier) -> Result<Vec<ResidueRange>, ProtfetchError> {
        let url = Self::entry_url(id);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| ProtfetchError::UniprotHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;
        let raw: Value = response
            .json()
            .map_err(|err| ProtfetchError::UniprotHttp(err.to_string()))?;
        Ok(extract_signal_peptides(id, &raw))
    }
}

/// Signal peptide spans in entry order. Features without both a start and
/// an end position are skipped with a warning.
pub fn extract_signal_peptides(id: &Identifier, raw: &Value) -> Vec<ResidueRange> {
    let Some(features) = raw.get("features").and_then(|v| v.as_array()) else {
        return Vec::new();
    };

    let mut ranges = Vec::new();
    for item in features {
        if item.get("type").and_then(|v| v.as_str()) != Some(SIGNAL_PEPTIDE) {
            continue;
        }
        let start = position(item, "start");
        let end = position(item, "end");
        match (start, end) {
            (Some(start), Some(end)) => ranges.push(ResidueRange::new(start, end)),
            _ => warn!(id = %id, ?start, ?end, "signal peptide without complete position, skipped"),
        }
    }
    ranges
}

fn position(item: &Value, bound: &str) -> Option<i64> {
    item.get("location")
        .and_then(|v| v.get(bound))
        .and_then(|v| v.get("value"))
        .and_then(|v| v.as_i64())
}
