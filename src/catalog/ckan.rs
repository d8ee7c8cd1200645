use anyhow::{Context, Result};
use log::{debug, info};
use reqwest::StatusCode;
use reqwest::blocking::Response;
use serde::Deserialize;
use serde_json::{Map, Value};

use super::CatalogClient;
use super::models::Dataset;
use crate::config::CatalogSettings;
use crate::errors::CatalogError;
use crate::http::ApiClient;

const NOT_FOUND_ERROR: &str = "Not Found Error";

/// Client for the CKAN action API
pub struct CkanClient {
    client: ApiClient,
    endpoint: String,
}

/// `{ "success": ..., "result": ..., "error": ... }` wrapper of every action response
#[derive(Debug, Deserialize)]
struct ActionResponse {
    #[serde(default)]
    success: bool,
    #[serde(default)]
    result: Option<Value>,
    #[serde(default)]
    error: Option<ActionError>,
}

#[derive(Debug, Deserialize)]
struct ActionError {
    #[serde(rename = "__type", default)]
    error_type: Option<String>,
    #[serde(default)]
    message: Option<String>,
    #[serde(flatten)]
    details: Map<String, Value>,
}

impl CkanClient {
    pub fn new(settings: &CatalogSettings) -> Result<Self> {
        let endpoint = settings.api_endpoint.trim_end_matches('/').to_string();
        reqwest::Url::parse(&endpoint)
            .with_context(|| format!("Invalid catalog API endpoint: {}", settings.api_endpoint))?;

        let client = ApiClient::new(
            &settings.user_agent,
            settings.timeout_secs,
            settings.api_key.as_deref(),
        )?;

        info!("Catalog client configured for {}", endpoint);
        Ok(Self { client, endpoint })
    }

    // --- Helper Methods ---

    fn build_show_url(&self, dataset_id: &str) -> String {
        format!(
            "{}/action/package_show?id={}",
            self.endpoint,
            urlencoding::encode(dataset_id)
        )
    }

    fn build_update_url(&self) -> String {
        format!("{}/action/package_update", self.endpoint)
    }

    fn read_dataset(response: Response, dataset_id: &str) -> Result<Dataset, CatalogError> {
        let status = response.status();
        let body = response.text()?;
        let result = unwrap_envelope(status, &body, dataset_id)?;
        Ok(serde_json::from_value(result)?)
    }
}

impl CatalogClient for CkanClient {
    fn fetch_dataset(&self, dataset_id: &str) -> Result<Dataset, CatalogError> {
        let url = self.build_show_url(dataset_id);
        debug!("Fetching dataset {} from {}", dataset_id, url);

        let response = self.client.get(&url)?;
        Self::read_dataset(response, dataset_id)
    }

    fn update_dataset(&self, dataset: &Dataset) -> Result<Dataset, CatalogError> {
        let dataset_id = dataset.id().unwrap_or_default();
        let url = self.build_update_url();
        debug!("Updating dataset {} at {}", dataset_id, url);

        let response = self.client.post_json(&url, dataset)?;
        Self::read_dataset(response, dataset_id)
    }
}

/// Extracts `result` from an action response or turns the failure into a typed error
fn unwrap_envelope(status: StatusCode, body: &str, dataset_id: &str) -> Result<Value, CatalogError> {
    let envelope = match serde_json::from_str::<ActionResponse>(body) {
        Ok(envelope) => envelope,
        Err(_) if status == StatusCode::NOT_FOUND => {
            return Err(CatalogError::NotFound(dataset_id.to_string()));
        }
        Err(_) if !status.is_success() => {
            return Err(CatalogError::Status {
                status: status.as_u16(),
                body: truncate(body, 200),
            });
        }
        Err(e) => return Err(CatalogError::Decode(e)),
    };

    if envelope.success {
        if let Some(result) = envelope.result {
            return Ok(result);
        }
    }

    match envelope.error {
        Some(error) => Err(action_error(error, dataset_id)),
        None if status == StatusCode::NOT_FOUND => Err(CatalogError::NotFound(dataset_id.to_string())),
        None => Err(CatalogError::Status {
            status: status.as_u16(),
            body: truncate(body, 200),
        }),
    }
}

fn action_error(error: ActionError, dataset_id: &str) -> CatalogError {
    let error_type = error.error_type.unwrap_or_else(|| "Unknown Error".to_string());
    if error_type == NOT_FOUND_ERROR {
        return CatalogError::NotFound(dataset_id.to_string());
    }

    let message = error
        .message
        .unwrap_or_else(|| Value::Object(error.details).to_string());
    CatalogError::Api {
        error_type,
        message,
    }
}

fn truncate(text: &str, max_chars: usize) -> String {
    text.chars().take(max_chars).collect()
}
