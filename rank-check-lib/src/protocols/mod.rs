//! External service clients.
//!
//! The analysis core talks to two outside services through the traits defined
//! here: a ranked-results search provider and an address-validation geocoder.
//! Concrete HTTP implementations live in the submodules; tests and embedders
//! can supply their own.

use crate::error::RankCheckError;
use crate::types::Location;
use async_trait::async_trait;

/// ValueSERP search API client
pub mod serp;

/// Nominatim (OpenStreetMap) geocoder used for location validation
pub mod geocode;

pub use geocode::NominatimValidator;
pub use serp::ValueSerpClient;

/// A source of ranked search results.
///
/// Implementations perform exactly one request per call and never retry;
/// pacing is the caller's job.
#[async_trait]
pub trait SearchProvider: Send + Sync {
    /// Run `query` localized to `location` and return the raw JSON response.
    async fn search(&self, query: &str, location: &str)
        -> Result<serde_json::Value, RankCheckError>;
}

/// Decides whether a location resolves to a real place.
///
/// Must be safe to call concurrently. Any failure inside the check, including
/// transport errors and unexpected response shapes, reports `false`.
#[async_trait]
pub trait LocationValidator: Send + Sync {
    async fn is_valid(&self, location: &Location) -> bool;
}
