//! Single-query execution.
//!
//! A [`QueryExecutor`] turns one [`QueryUnit`] into one [`ResultRecord`]:
//! wait for a rate-limit slot, call the search provider exactly once, then
//! normalize the response and locate the target domain among the organic
//! results.

use crate::error::RankCheckError;
use crate::protocols::SearchProvider;
use crate::rate_limit::RateLimiter;
use crate::types::{
    LocalResult, OrganicResult, QueryUnit, ResultRecord, TargetPosition, PAGE_ONE_SIZE,
    TOP_RESULTS,
};
use crate::utils::contains_domain;
use serde_json::Value;
use std::sync::Arc;

/// Provider response reduced to the two lists the analysis cares about.
///
/// Every response shape the provider is known to return is mapped onto this
/// one struct; nothing past [`normalize_response`] looks at raw JSON.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SerpPage {
    /// Organic results in rank order (untruncated)
    pub organic: Vec<OrganicResult>,
    /// Local listings in rank order (untruncated)
    pub local: Vec<LocalResult>,
}

/// Executes query units against a search provider under a shared rate limit.
pub struct QueryExecutor {
    provider: Arc<dyn SearchProvider>,
    limiter: Arc<RateLimiter>,
    target: String,
}

impl QueryExecutor {
    /// `target` must already be normalized (see [`crate::normalize_target_domain`]).
    pub fn new<T: Into<String>>(
        provider: Arc<dyn SearchProvider>,
        limiter: Arc<RateLimiter>,
        target: T,
    ) -> Self {
        Self {
            provider,
            limiter,
            target: target.into(),
        }
    }

    pub fn target(&self) -> &str {
        &self.target
    }

    /// Run one query.
    ///
    /// Performs exactly one provider call and never retries. On any failure
    /// no record is produced.
    pub async fn execute(&self, unit: &QueryUnit) -> Result<ResultRecord, RankCheckError> {
        self.limiter.acquire().await;

        tracing::debug!(keyword = %unit.keyword, location = %unit.location, "dispatching query");
        let json = self.provider.search(&unit.raw_query, &unit.location).await?;

        let SerpPage {
            mut organic,
            mut local,
        } = normalize_response(&json)?;

        let target_position = find_target_position(&organic, &self.target);
        organic.truncate(TOP_RESULTS);
        local.truncate(TOP_RESULTS);

        Ok(ResultRecord {
            keyword: unit.keyword.clone(),
            location: unit.location.clone(),
            target_position,
            organic_results: organic,
            local_results: local,
        })
    }
}

/// Reduce a raw provider response to a [`SerpPage`].
///
/// `organic_results` must be present and be an array. Local listings are
/// taken from the first of these that holds an array: `local_results`,
/// `local_results.places`, `places_results`. A response without any of them
/// has no local listings.
pub fn normalize_response(json: &Value) -> Result<SerpPage, RankCheckError> {
    let organic = json
        .get("organic_results")
        .and_then(Value::as_array)
        .ok_or_else(|| RankCheckError::parse("response has no organic_results array"))?
        .iter()
        .filter_map(parse_organic)
        .collect();

    let local = local_entries(json)
        .map(|entries| entries.iter().filter_map(parse_local).collect())
        .unwrap_or_default();

    Ok(SerpPage { organic, local })
}

/// 1-based position of the first organic entry whose domain contains
/// `target`, looking at the first page only.
pub fn find_target_position(organic: &[OrganicResult], target: &str) -> TargetPosition {
    organic
        .iter()
        .take(PAGE_ONE_SIZE)
        .position(|result| contains_domain(&result.domain, target))
        .map(|idx| TargetPosition::Ranked(idx + 1))
        .unwrap_or(TargetPosition::NotOnPageOne)
}

fn local_entries(json: &Value) -> Option<&Vec<Value>> {
    let local = match json.get("local_results") {
        Some(Value::Array(entries)) => Some(entries),
        Some(nested) => nested.get("places").and_then(Value::as_array),
        None => None,
    };
    local.or_else(|| json.get("places_results").and_then(Value::as_array))
}

fn parse_organic(entry: &Value) -> Option<OrganicResult> {
    let entry = entry.as_object()?;
    let link = string_field(entry, "link");
    let domain = string_field(entry, "domain")
        .or_else(|| link.as_deref().map(host_of))
        .unwrap_or_default();

    Some(OrganicResult {
        domain,
        title: string_field(entry, "title").unwrap_or_default(),
        link,
    })
}

fn parse_local(entry: &Value) -> Option<LocalResult> {
    let entry = entry.as_object()?;
    Some(LocalResult {
        title: string_field(entry, "title").unwrap_or_default(),
        rating: entry.get("rating").and_then(number_f64),
        reviews: entry.get("reviews").and_then(number_u64),
        website: string_field(entry, "website"),
        link: string_field(entry, "link"),
    })
}

fn string_field(entry: &serde_json::Map<String, Value>, key: &str) -> Option<String> {
    entry
        .get(key)
        .and_then(Value::as_str)
        .map(str::trim)
        .filter(|s| !s.is_empty())
        .map(str::to_string)
}

// Providers send ratings and review counts either as numbers or as strings
// like "4.5" and "1,204".
fn number_f64(value: &Value) -> Option<f64> {
    match value {
        Value::Number(n) => n.as_f64(),
        Value::String(s) => s.trim().parse().ok(),
        _ => None,
    }
}

fn number_u64(value: &Value) -> Option<u64> {
    match value {
        Value::Number(n) => n.as_u64(),
        Value::String(s) => s.trim().replace(',', "").parse().ok(),
        _ => None,
    }
}

fn host_of(link: &str) -> String {
    let rest = link
        .split_once("://")
        .map(|(_, rest)| rest)
        .unwrap_or(link);
    rest.split(['/', '?', '#'])
        .next()
        .unwrap_or_default()
        .to_lowercase()
}
