//! Location validation through the Nominatim geocoder.
//!
//! The public Nominatim service allows one request per second and requires a
//! descriptive User-Agent, so every validator owns its own one-per-second
//! [`RateLimiter`].

use crate::error::RankCheckError;
use crate::protocols::LocationValidator;
use crate::rate_limit::RateLimiter;
use crate::types::{CheckConfig, Location};
use async_trait::async_trait;

/// Validates locations by asking Nominatim whether they resolve to a place.
pub struct NominatimValidator {
    http_client: reqwest::Client,
    endpoint: String,
    limiter: RateLimiter,
}

impl NominatimValidator {
    /// Create a validator from a run configuration.
    pub fn with_config(config: &CheckConfig) -> Result<Self, RankCheckError> {
        Self::with_limiter(config, RateLimiter::per_second(1.0))
    }

    /// Create a validator with custom pacing (tests use an unthrottled one).
    pub fn with_limiter(config: &CheckConfig, limiter: RateLimiter) -> Result<Self, RankCheckError> {
        let http_client = reqwest::Client::builder()
            .timeout(config.timeout)
            .user_agent(concat!("rank-check/", env!("CARGO_PKG_VERSION")))
            .build()
            .map_err(|e| {
                RankCheckError::network_with_source(
                    "Failed to create geocoder HTTP client",
                    e.to_string(),
                )
            })?;

        Ok(Self {
            http_client,
            endpoint: config.geocoder_endpoint.clone(),
            limiter,
        })
    }

    async fn lookup(&self, location: &Location) -> Result<bool, RankCheckError> {
        self.limiter.acquire().await;

        let query = location.to_query_string();
        let response = self
            .http_client
            .get(&self.endpoint)
            .query(&[("q", query.as_str()), ("format", "json"), ("limit", "1")])
            .send()
            .await?;

        if !response.status().is_success() {
            return Err(RankCheckError::network(format!(
                "geocoder returned {} for '{}'",
                response.status(),
                query
            )));
        }

        let json = response.json::<serde_json::Value>().await?;
        json.as_array()
            .map(|matches| !matches.is_empty())
            .ok_or_else(|| RankCheckError::parse("geocoder response is not a JSON array"))
    }
}

#[async_trait]
impl LocationValidator for NominatimValidator {
    async fn is_valid(&self, location: &Location) -> bool {
        match self.lookup(location).await {
            Ok(found) => found,
            Err(e) => {
                tracing::debug!(location = %location, error = %e, "location lookup failed");
                false
            }
        }
    }
}
