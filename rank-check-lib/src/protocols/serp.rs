//! ValueSERP search API client.
//!
//! Issues one `GET` per search against the configured endpoint and returns
//! the raw JSON document. Normalizing the document into a result record is
//! done by the executor, not here.

use crate::error::RankCheckError;
use crate::protocols::SearchProvider;
use crate::types::CheckConfig;
use async_trait::async_trait;
use reqwest::StatusCode;
use std::time::Duration;

/// Longest response excerpt kept on parse errors.
const MAX_ERROR_BODY: usize = 200;

/// HTTP client for the ValueSERP `/search` endpoint.
#[derive(Clone)]
pub struct ValueSerpClient {
    http_client: reqwest::Client,
    endpoint: String,
    api_key: String,
    google_domain: String,
    gl: String,
    hl: String,
    num: u32,
    timeout: Duration,
}

impl ValueSerpClient {
    /// Create a client from a run configuration.
    ///
    /// # Errors
    ///
    /// Returns `RankCheckError::InvalidInput` if no API key is configured, or
    /// a network error if the HTTP client cannot be built.
    pub fn with_config(config: &CheckConfig) -> Result<Self, RankCheckError> {
        let api_key = config
            .api_key
            .as_deref()
            .map(str::trim)
            .filter(|key| !key.is_empty())
            .ok_or_else(|| {
                RankCheckError::invalid_input(
                    "API key",
                    "a ValueSERP API key is required (set RC_API_KEY or VALUESERP_API_KEY)",
                )
            })?
            .to_string();

        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .build()
            .map_err(|e| {
                RankCheckError::network_with_source(
                    "Failed to create search HTTP client",
                    e.to_string(),
                )
            })?;

        Ok(Self {
            http_client,
            endpoint: config.endpoint.clone(),
            api_key,
            google_domain: config.google_domain.clone(),
            gl: config.gl.clone(),
            hl: config.hl.clone(),
            num: config.num,
            timeout: config.timeout,
        })
    }

    pub fn endpoint(&self) -> &str {
        &self.endpoint
    }

    fn transport_error(&self, query: &str, err: reqwest::Error) -> RankCheckError {
        if err.is_timeout() {
            RankCheckError::timeout(format!("search request '{}'", query), self.timeout)
        } else {
            err.into()
        }
    }
}

#[async_trait]
impl SearchProvider for ValueSerpClient {
    async fn search(
        &self,
        query: &str,
        location: &str,
    ) -> Result<serde_json::Value, RankCheckError> {
        let num = self.num.to_string();
        let params = [
            ("api_key", self.api_key.as_str()),
            ("q", query),
            ("location", location),
            ("google_domain", self.google_domain.as_str()),
            ("gl", self.gl.as_str()),
            ("hl", self.hl.as_str()),
            ("num", num.as_str()),
            ("output", "json"),
        ];

        tracing::debug!(query, location, endpoint = %self.endpoint, "sending search request");

        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&params)
            .send()
            .await
            .map_err(|e| self.transport_error(query, e))?;

        match response.status() {
            status if status.is_success() => {
                let body = response
                    .text()
                    .await
                    .map_err(|e| self.transport_error(query, e))?;
                serde_json::from_str(&body).map_err(|e| RankCheckError::ParseError {
                    message: format!("Malformed JSON for '{}': {}", query, e),
                    content: Some(body.chars().take(MAX_ERROR_BODY).collect()),
                })
            }
            StatusCode::TOO_MANY_REQUESTS => Err(RankCheckError::RateLimited {
                service: "ValueSERP".to_string(),
                message: format!("request for '{}' was throttled", query),
            }),
            code => Err(RankCheckError::provider_with_status(
                query,
                format!("search provider returned {}", code),
                code.as_u16(),
            )),
        }
    }
}
