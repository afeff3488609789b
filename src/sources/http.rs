// src/sources/http.rs

//! HTTP fetcher for the backend REST API.

use async_trait::async_trait;
use reqwest::Client;
use serde_json::Value;
use url::Url;

use crate::error::{AppError, Result};
use crate::models::FetchConfig;
use crate::sources::SourceFetcher;
use crate::utils::http::create_async_client;

/// Fetches sources from `base_url`.
pub struct HttpFetcher {
    client: Client,
    base_url: Url,
    auth_token: Option<String>,
}

impl HttpFetcher {
    /// Create a fetcher with a configured HTTP client.
    pub fn new(config: &FetchConfig) -> Result<Self> {
        Ok(Self {
            client: create_async_client(config)?,
            base_url: Url::parse(&config.base_url)?,
            auth_token: config.auth_token.clone(),
        })
    }

    /// Absolute URL for a source path.
    pub fn endpoint(&self, path: &str) -> Result<Url> {
        Ok(self.base_url.join(path)?)
    }
}

#[async_trait]
impl SourceFetcher for HttpFetcher {
    async fn request(&self, path: &str) -> Result<Value> {
        let url = self.endpoint(path)?;
        log::debug!("GET {}", url);

        let mut request = self.client.get(url).header("Accept", "application/json");
        if let Some(token) = &self.auth_token {
            request = request.bearer_auth(token);
        }

        let response = request.send().await?;
        let status = response.status();
        if !status.is_success() {
            return Err(AppError::fetch(path, format!("HTTP {}", status)));
        }

        Ok(response.json::<Value>().await?)
    }
}
