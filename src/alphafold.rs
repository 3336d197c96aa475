use reqwest::StatusCode;
use reqwest::blocking::Client;
use serde_json::Value;
use tracing::{debug, warn};

use crate::domain::{FileType, Identifier, Retrieved, StructureData};
use crate::error::ProtfetchError;
use crate::rcsb::build_client;
use crate::source::StructureSource;

pub const DEFAULT_MODEL_VERSION: u32 = 4;

/// Bodies shorter than this are error pages, not models.
const MIN_MODEL_BYTES: usize = 200;

#[derive(Clone)]
pub struct AlphafoldHttpClient {
    client: Client,
    version: u32,
}

impl AlphafoldHttpClient {
    pub fn new() -> Result<Self, ProtfetchError> {
        Self::with_version(DEFAULT_MODEL_VERSION)
    }

    pub fn with_version(version: u32) -> Result<Self, ProtfetchError> {
        let client = build_client().map_err(|err| ProtfetchError::AlphafoldHttp(err.to_string()))?;
        Ok(Self { client, version })
    }

    pub fn model_url(id: &Identifier, filetype: FileType, version: u32) -> String {
        format!(
            "https://alphafold.ebi.ac.uk/files/AF-{}-F1-model_v{}.{}",
            id.query_key(),
            version,
            filetype.extension()
        )
    }

    pub fn prediction_url(id: &Identifier) -> String {
        format!(
            "https://alphafold.ebi.ac.uk/api/prediction/{}",
            id.query_key()
        )
    }

    /// Asks the prediction API where the current model file lives.
    fn lookup_file_url(&self, id: &Identifier, filetype: FileType) -> Result<String, ProtfetchError> {
        let url = Self::prediction_url(id);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| ProtfetchError::AlphafoldHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;
        let body: Value = response
            .json()
            .map_err(|err| ProtfetchError::AlphafoldHttp(err.to_string()))?;
        prediction_file_url(&body, filetype).ok_or_else(|| ProtfetchError::AlphafoldStatus {
            status: 404,
            message: format!("no {filetype} model listed for {id}"),
        })
    }

    fn download(&self, id: &Identifier, filetype: FileType) -> Result<String, ProtfetchError> {
        let mut text = self.get_text(&Self::model_url(id, filetype, self.version))?;
        if text.len() < MIN_MODEL_BYTES {
            debug!(id = %id, bytes = text.len(), "model body too short, asking prediction API");
            let url = self.lookup_file_url(id, filetype)?;
            text = self.get_text(&url)?;
        }
        Ok(text)
    }

    fn get_text(&self, url: &str) -> Result<String, ProtfetchError> {
        let response = self
            .client
            .get(url)
            .send()
            .map_err(|err| ProtfetchError::AlphafoldHttp(err.to_string()))?;
        let response = Self::handle_status(response)?;
        response
            .text()
            .map_err(|err| ProtfetchError::AlphafoldHttp(err.to_string()))
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
            .unwrap_or_else(|_| "AlphaFold request failed".to_string());
        Err(ProtfetchError::AlphafoldStatus { status, message })
    }
}

impl StructureSource for AlphafoldHttpClient {
    fn check_structure(&self, id: &Identifier) -> Result<bool, ProtfetchError> {
        let url = Self::model_url(id, FileType::Pdb, self.version);
        let response = self
            .client
            .get(&url)
            .send()
            .map_err(|err| ProtfetchError::AlphafoldHttp(err.to_string()))?;
        Ok(response.status() != StatusCode::NOT_FOUND)
    }

    fn get_structure(
        &self,
        id: &Identifier,
        filetype: FileType,
    ) -> Result<Retrieved, ProtfetchError> {
        let (filetype, text) = match self.download(id, filetype) {
            Ok(text) => (filetype, text),
            Err(err) => {
                warn!(id = %id, %filetype, error = %err, "falling back to {}", filetype.other());
                (filetype.other(), self.download(id, filetype.other())?)
            }
        };
        Ok(Retrieved {
            identifier: id.to_string(),
            filetype,
            data: StructureData::Text(text),
        })
    }
}

pub fn prediction_file_url(body: &Value, filetype: FileType) -> Option<String> {
    let key = match filetype {
        FileType::Pdb => "pdbUrl",
        FileType::Cif => "cifUrl",
    };
    body.as_array()
        .and_then(|array| array.first())
        .and_then(|entry| entry.get(key))
        .and_then(|value| value.as_str())
        .map(|value| value.to_string())
}
