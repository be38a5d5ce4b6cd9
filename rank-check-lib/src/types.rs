//! Core data types for ranking analysis.
//!
//! This module defines the data structures shared across the library:
//! locations, query units, normalized result records, progress state and the
//! run configuration.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::time::Duration;

/// Marker used when the target domain is absent from the first results page.
pub const NOT_ON_PAGE_ONE: &str = "Not on Page 1";

/// Number of organic positions that make up the first results page.
pub const PAGE_ONE_SIZE: usize = 10;

/// How many organic and local entries are kept per record.
pub const TOP_RESULTS: usize = 3;

/// Upper bound for configured timeouts and rate-limit periods.
pub const MAX_DURATION: Duration = Duration::from_secs(24 * 60 * 60);

/// A geographic location a query is localized to.
///
/// Either a US ZIP code or a city/state pair. Locations are parsed from raw
/// input lines by [`crate::parse_location_line`] and are immutable afterwards.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Location {
    /// Five-digit ZIP code
    Zip(String),

    /// City and state, e.g. `Austin` / `TX`
    CityState { city: String, state: String },
}

impl Location {
    /// Human-readable form used in tables, reports and provider requests.
    pub fn to_display_string(&self) -> String {
        match self {
            Location::Zip(zip) => zip.clone(),
            Location::CityState { city, state } => format!("{}, {}", city, state),
        }
    }

    /// Free-form query handed to the geocoder when validating the location.
    pub fn to_query_string(&self) -> String {
        match self {
            Location::Zip(zip) => format!("{}, USA", zip),
            Location::CityState { city, state } => format!("{}, {}, USA", city, state),
        }
    }
}

impl fmt::Display for Location {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(&self.to_display_string())
    }
}

/// One (keyword, location) pair, sent as exactly one provider request.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct QueryUnit {
    pub keyword: String,
    /// Display form of the location
    pub location: String,
    /// Search string sent to the provider (`"{keyword} {location}"`)
    pub raw_query: String,
}

/// Where the target domain ranks among the organic results.
///
/// Ordering is best-first: `Ranked(1) < Ranked(2) < NotOnPageOne`.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(into = "String", try_from = "String")]
pub enum TargetPosition {
    /// 1-based organic position
    Ranked(usize),
    NotOnPageOne,
}

impl TargetPosition {
    pub fn is_ranked(&self) -> bool {
        matches!(self, TargetPosition::Ranked(_))
    }
}

impl fmt::Display for TargetPosition {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            TargetPosition::Ranked(rank) => write!(f, "#{}", rank),
            TargetPosition::NotOnPageOne => f.write_str(NOT_ON_PAGE_ONE),
        }
    }
}

impl From<TargetPosition> for String {
    fn from(position: TargetPosition) -> Self {
        position.to_string()
    }
}

impl TryFrom<String> for TargetPosition {
    type Error = String;

    fn try_from(value: String) -> Result<Self, Self::Error> {
        if value == NOT_ON_PAGE_ONE {
            return Ok(TargetPosition::NotOnPageOne);
        }
        value
            .strip_prefix('#')
            .and_then(|rank| rank.parse::<usize>().ok())
            .filter(|rank| (1..=PAGE_ONE_SIZE).contains(rank))
            .map(TargetPosition::Ranked)
            .ok_or_else(|| format!("invalid target position '{}'", value))
    }
}

/// A normalized organic search result.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct OrganicResult {
    pub domain: String,
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// A normalized local (map pack) listing.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct LocalResult {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rating: Option<f64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviews: Option<u64>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub website: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub link: Option<String>,
}

/// The outcome of one successful query.
///
/// Both result lists hold at most [`TOP_RESULTS`] entries.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ResultRecord {
    pub keyword: String,
    pub location: String,
    pub target_position: TargetPosition,
    pub organic_results: Vec<OrganicResult>,
    pub local_results: Vec<LocalResult>,
}

/// Non-fatal warning for a query that failed.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QueryFailure {
    pub keyword: String,
    pub location: String,
    pub message: String,
}

impl fmt::Display for QueryFailure {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "Error processing query '{}' in {}: {}",
            self.keyword, self.location, self.message
        )
    }
}

/// Batch progress, reported after every unit reaches a terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize)]
pub struct ProgressState {
    pub completed: usize,
    pub total: usize,
}

impl ProgressState {
    /// Completed share in `0.0..=1.0`; an empty batch counts as done.
    pub fn fraction(&self) -> f64 {
        if self.total == 0 {
            1.0
        } else {
            self.completed as f64 / self.total as f64
        }
    }

    pub fn is_complete(&self) -> bool {
        self.completed >= self.total
    }
}

/// Pacing policy for the shared rate limiter.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum RatePolicy {
    /// Fixed minimum spacing of `period / max_calls` between grants
    Spacing,

    /// At most `max_calls` grants in any rolling `period`
    Window,
}

impl std::str::FromStr for RatePolicy {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_lowercase().as_str() {
            "spacing" => Ok(RatePolicy::Spacing),
            "window" => Ok(RatePolicy::Window),
            other => Err(format!(
                "unknown rate policy '{}', use 'spacing' or 'window'",
                other
            )),
        }
    }
}

impl fmt::Display for RatePolicy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RatePolicy::Spacing => write!(f, "spacing"),
            RatePolicy::Window => write!(f, "window"),
        }
    }
}

/// Configuration options for an analysis run.
///
/// Controls worker-pool size, provider pacing and request parameters.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct CheckConfig {
    /// Number of queries in flight at once.
    /// Default: 5, Range: 1-20. The rate limiter, not this value, bounds throughput.
    pub concurrency: usize,

    /// Timeout for each provider or geocoder HTTP call
    /// Default: 30 seconds
    #[serde(skip)]
    pub timeout: Duration,

    /// Calls allowed per `rate_period`
    /// Default: 5
    pub rate_limit: u32,

    /// Length of the pacing period
    /// Default: 1 second
    #[serde(skip)]
    pub rate_period: Duration,

    /// Default: window
    pub rate_policy: RatePolicy,

    /// ValueSERP API key; required for any run that dispatches queries
    #[serde(skip)]
    pub api_key: Option<String>,

    /// Search provider endpoint
    pub endpoint: String,

    pub google_domain: String,
    pub gl: String,
    pub hl: String,
    pub num: u32,

    /// Whether locations are checked against the geocoder before dispatch
    /// Default: true
    pub validate_locations: bool,

    /// Geocoder search endpoint used for location validation
    pub geocoder_endpoint: String,

    /// Concurrent geocoder lookups during validation
    /// Default: 3
    pub validation_concurrency: usize,
}

impl Default for CheckConfig {
    fn default() -> Self {
        Self {
            concurrency: 5,
            timeout: Duration::from_secs(30),
            rate_limit: 5,
            rate_period: Duration::from_secs(1),
            rate_policy: RatePolicy::Window,
            api_key: None,
            endpoint: "https://api.valueserp.com/search".to_string(),
            google_domain: "google.com".to_string(),
            gl: "us".to_string(),
            hl: "en".to_string(),
            num: PAGE_ONE_SIZE as u32,
            validate_locations: true,
            geocoder_endpoint: "https://nominatim.openstreetmap.org/search".to_string(),
            validation_concurrency: 3,
        }
    }
}

impl CheckConfig {
    /// Set the worker-pool size, capped to 1-20.
    pub fn with_concurrency(mut self, concurrency: usize) -> Self {
        self.concurrency = concurrency.clamp(1, 20);
        self
    }

    /// Set the per-request HTTP timeout, capped to [`MAX_DURATION`].
    pub fn with_timeout(mut self, timeout: Duration) -> Self {
        self.timeout = timeout.min(MAX_DURATION);
        self
    }

    /// Allow `calls` provider calls per `period` (capped to [`MAX_DURATION`]).
    pub fn with_rate_limit(mut self, calls: u32, period: Duration) -> Self {
        self.rate_limit = calls.max(1);
        self.rate_period = period.min(MAX_DURATION);
        self
    }

    pub fn with_rate_policy(mut self, policy: RatePolicy) -> Self {
        self.rate_policy = policy;
        self
    }

    pub fn with_api_key<K: Into<String>>(mut self, api_key: K) -> Self {
        self.api_key = Some(api_key.into());
        self
    }

    pub fn with_endpoint<E: Into<String>>(mut self, endpoint: E) -> Self {
        self.endpoint = endpoint.into();
        self
    }

    pub fn with_geocoder_endpoint<E: Into<String>>(mut self, endpoint: E) -> Self {
        self.geocoder_endpoint = endpoint.into();
        self
    }

    /// Enable or disable geocoder validation of locations.
    pub fn with_location_validation(mut self, enabled: bool) -> Self {
        self.validate_locations = enabled;
        self
    }
}
