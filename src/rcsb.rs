use std::collections::HashMap;
use std::sync::Mutex;
use std::time::Duration;

use reqwest::StatusCode;
use reqwest::blocking::Client;
use reqwest::header::{HeaderMap, HeaderValue, USER_AGENT};
use serde_json::{Value, json};
use tracing::{debug, warn};

use crate::domain::{FileType, Identifier, Retrieved, StructureData};
use crate::error::ProtfetchError;
use crate::source::StructureSource;

const SEARCH_URL: &str = "https://search.rcsb.org/rcsbsearch/v2/query";

/// RCSB PDB client. A UniProt accession is mapped to the first PDB entry a
/// full-text search returns; the mapping is remembered per identifier.
pub struct RcsbHttpClient {
    client: Client,
    entries: Mutex<HashMap<Identifier, String>>,
}

impl RcsbHttpClient {
    pub fn new() -> Result<Self, ProtfetchError> {
        Ok(Self {
            client: build_client().map_err(|err| ProtfetchError::RcsbHttp(err.to_string()))?,
            entries: Mutex::new(HashMap::new()),
        })
    }

    pub fn structure_url(pdb_id: &str, filetype: FileType) -> String {
        format!(
            "https://files.rcsb.org/download/{}.{}",
            pdb_id.to_ascii_uppercase(),
            filetype.extension()
        )
    }

    pub fn search_query(id: &Identifier) -> Value {
        json!({
            "query": {
                "type": "terminal",
                "service": "full_text",
                "parameters": { "value": id.query_key() }
            },
            "return_type": "entry",
            "request_options": { "paginate": { "start": 0, "rows": 1 } }
        })
    }

    /// PDB entry for `id`, or `None` when the search has no hits.
    pub fn resolve_entry(&self, id: &Identifier) -> Result<Option<String>, ProtfetchError> {
        if let Some(entry) = self.remembered(id) {
            return Ok(Some(entry));
        }

        let response = self
            .client
            .post(SEARCH_URL)
            .json(&Self::search_query(id))
            .send()
            .map_err(|err| ProtfetchError::RcsbHttp(err.to_string()))?;
        if response.status() == StatusCode::NO_CONTENT {
            return Ok(None);
        }
        let response = Self::handle_status(response)?;
        let body: Value = response
            .json()
            .map_err(|err| ProtfetchError::RcsbHttp(err.to_string()))?;

        let entry = first_search_hit(&body);
        if let Some(entry) = &entry {
            debug!(id = %id, entry = %entry, "resolved PDB entry");
            self.entries
                .lock()
                .unwrap_or_else(|poisoned| poisoned.into_inner())
                .insert(id.clone(), entry.clone());
        }
        Ok(entry)
    }

    fn remembered(&self, id: &Identifier) -> Option<String> {
        self.entries
            .lock()
            .unwrap_or_else(|poisoned| poisoned.into_inner())
            .get(id)
            .cloned()
    }

    fn download(&self, pdb_id: &str, filetype: FileType) -> Result<String, ProtfetchError> {
        let url = Self::structure_url(pdb_id, filetype);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| ProtfetchError::RcsbHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;
        response
            .text()
            .map_err(|err| ProtfetchError::RcsbHttp(err.to_string()))
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
            .unwrap_or_else(|_| "RCSB request failed".to_string());
        Err(ProtfetchError::RcsbStatus { status, message })
    }
}

impl StructureSource for RcsbHttpClient {
    fn check_structure(&self, id: &Identifier) -> Result<bool, ProtfetchError> {
        Ok(self.resolve_entry(id)?.is_some())
    }

    fn get_structure(
        &self,
        id: &Identifier,
        filetype: FileType,
    ) -> Result<Retrieved, ProtfetchError> {
        let pdb_id = self
            .resolve_entry(id)?
            .ok_or_else(|| ProtfetchError::RcsbStatus {
                status: 404,
                message: format!("no PDB entry matches {id}"),
            })?;

        let (filetype, text) = match self.download(&pdb_id, filetype) {
            Ok(text) => (filetype, text),
            Err(err) => {
                warn!(entry = %pdb_id, %filetype, error = %err, "falling back to {}", filetype.other());
                (filetype.other(), self.download(&pdb_id, filetype.other())?)
            }
        };

        Ok(Retrieved {
            identifier: backend_identifier(id, &pdb_id),
            filetype,
            data: StructureData::Text(text),
        })
    }
}

/// `<uniprot>_<entry>` when the PDB entry differs from the requested id.
pub fn backend_identifier(id: &Identifier, entry: &str) -> String {
    if id.as_str().eq_ignore_ascii_case(entry) {
        id.to_string()
    } else {
        format!("{id}_{entry}")
    }
}

pub fn first_search_hit(body: &Value) -> Option<String> {
    body.get("result_set")
        .and_then(|value| value.as_array())
        .and_then(|array| array.first())
        .and_then(|value| value.get("identifier"))
        .and_then(|value| value.as_str())
        .map(|value| value.to_string())
}

pub(crate) fn build_client() -> Result<Client, reqwest::Error> {
    let mut headers = HeaderMap::new();
    headers.insert(
        USER_AGENT,
        HeaderValue::from_static(concat!("protfetch/", env!("CARGO_PKG_VERSION"))),
    );
    Client::builder()
        .default_headers(headers)
        .timeout(Duration::from_secs(30))
        .build()
}
