use anyhow::{Context, Result};
use reqwest::blocking::{Client, Response};
use reqwest::header::{AUTHORIZATION, HeaderMap, HeaderValue};
use serde::Serialize;
use std::time::Duration;

use crate::errors::CatalogError;

/// Blocking HTTP client that signs every request with the catalog API key
pub struct ApiClient {
    client: Client,
}

impl ApiClient {
    pub fn new(user_agent: &str, timeout_secs: u64, api_key: Option<&str>) -> Result<Self> {
        let client = Self::build_client(user_agent, timeout_secs, api_key)?;
        Ok(Self { client })
    }

    pub fn get(&self, url: &str) -> Result<Response, CatalogError> {
        self.client.get(url).send().map_err(CatalogError::from)
    }

    pub fn post_json<T: Serialize + ?Sized>(
        &self,
        url: &str,
        body: &T,
    ) -> Result<Response, CatalogError> {
        self.client
            .post(url)
            .json(body)
            .send()
            .map_err(CatalogError::from)
    }

    fn build_client(user_agent: &str, timeout_secs: u64, api_key: Option<&str>) -> Result<Client> {
        Client::builder()
            .user_agent(user_agent)
            .timeout(Duration::from_secs(timeout_secs))
            .default_headers(Self::default_headers(api_key)?)
            .build()
            .context("Failed to build HTTP client")
    }

    fn default_headers(api_key: Option<&str>) -> Result<HeaderMap> {
        let mut headers = HeaderMap::new();
        if let Some(key) = api_key {
            let mut value = HeaderValue::from_str(key).context("API key is not a valid header value")?;
            value.set_sensitive(true);
            headers.insert(AUTHORIZATION, value);
        }
        Ok(headers)
    }
}
