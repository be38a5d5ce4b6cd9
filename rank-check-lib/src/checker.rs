//! Main rank checker implementation.
//!
//! This module provides the `RankChecker` struct that orchestrates a complete
//! analysis run: input validation, location validation, batch execution and
//! aggregation into an [`AnalysisReport`].

use crate::batch::BatchRunner;
use crate::error::RankCheckError;
use crate::executor::QueryExecutor;
use crate::protocols::{LocationValidator, NominatimValidator, SearchProvider, ValueSerpClient};
use crate::query::build_queries;
use crate::rate_limit::RateLimiter;
use crate::report::AnalysisReport;
use crate::types::{CheckConfig, Location, ProgressState};
use crate::utils::normalize_target_domain;
use futures::stream::{self, StreamExt};
use std::sync::Arc;

/// Result of checking locations against the address validator.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ValidationOutcome {
    /// Locations that resolved, in input order
    pub valid: Vec<Location>,
    /// Locations that did not resolve, in input order
    pub dropped: Vec<Location>,
}

/// Coordinates a ranking analysis run.
///
/// Owns the search provider, the location validator and the provider rate
/// limiter. The limiter is shared by every query this checker dispatches.
///
/// # Example
///
/// ```rust,no_run
/// use rank_check_lib::{parse_locations, CheckConfig, RankChecker};
///
/// #[tokio::main]
/// async fn main() -> Result<(), Box<dyn std::error::Error>> {
///     let config = CheckConfig::default().with_api_key("your-key");
///     let checker = RankChecker::with_config(config)?;
///
///     let keywords = vec!["plumber".to_string()];
///     let locations = parse_locations("Austin, TX\n78701")?;
///     let report = checker.analyze("acme.com", &keywords, &locations, |_| {}).await?;
///
///     println!("Ranking rate: {:.1}%", report.aggregate.summary.ranking_rate);
///     Ok(())
/// }
/// ```
pub struct RankChecker {
    config: CheckConfig,
    provider: Arc<dyn SearchProvider>,
    validator: Arc<dyn LocationValidator>,
    limiter: Arc<RateLimiter>,
}

impl RankChecker {
    /// Create a checker backed by ValueSERP and Nominatim.
    ///
    /// # Errors
    ///
    /// Fails when no API key is configured or an HTTP client cannot be built.
    pub fn with_config(config: CheckConfig) -> Result<Self, RankCheckError> {
        let provider = Arc::new(ValueSerpClient::with_config(&config)?);
        let validator = Arc::new(NominatimValidator::with_config(&config)?);
        Ok(Self::with_components(config, provider, validator))
    }

    /// Create a checker from custom provider and validator implementations.
    pub fn with_components(
        config: CheckConfig,
        provider: Arc<dyn SearchProvider>,
        validator: Arc<dyn LocationValidator>,
    ) -> Self {
        let limiter = Arc::new(RateLimiter::from_config(&config));
        Self {
            config,
            provider,
            validator,
            limiter,
        }
    }

    pub fn config(&self) -> &CheckConfig {
        &self.config
    }

    /// Split `locations` into those that resolve and those that don't.
    ///
    /// Lookups run `validation_concurrency` at a time and the output keeps
    /// input order. With validation disabled every location is kept.
    ///
    /// # Errors
    ///
    /// Returns `NoValidLocations` when nothing is left.
    pub async fn validate_locations(
        &self,
        locations: &[Location],
    ) -> Result<ValidationOutcome, RankCheckError> {
        if !self.config.validate_locations {
            tracing::debug!("location validation disabled");
            return Ok(ValidationOutcome {
                valid: locations.to_vec(),
                dropped: Vec::new(),
            });
        }

        let validator = self.validator.as_ref();
        let checked: Vec<(&Location, bool)> = stream::iter(locations)
            .map(|location| async move { (location, validator.is_valid(location).await) })
            .buffered(self.config.validation_concurrency.max(1))
            .collect()
            .await;

        let mut outcome = ValidationOutcome::default();
        for (location, valid) in checked {
            if valid {
                outcome.valid.push(location.clone());
            } else {
                tracing::warn!(location = %location, "location could not be resolved, skipping");
                outcome.dropped.push(location.clone());
            }
        }

        if outcome.valid.is_empty() {
            return Err(RankCheckError::NoValidLocations {
                dropped: outcome.dropped.iter().map(Location::to_display_string).collect(),
            });
        }

        Ok(outcome)
    }

    /// Run a full analysis: validate inputs and locations, execute every
    /// (keyword, location) query and aggregate the records.
    pub async fn analyze<F>(
        &self,
        target: &str,
        keywords: &[String],
        locations: &[Location],
        on_progress: F,
    ) -> Result<AnalysisReport, RankCheckError>
    where
        F: FnMut(ProgressState),
    {
        let target = normalize_target_domain(target)?;
        check_inputs(keywords, locations)?;

        let validation = self.validate_locations(locations).await?;
        let dropped = validation
            .dropped
            .iter()
            .map(Location::to_display_string)
            .collect();

        self.analyze_validated(&target, keywords, &validation.valid, dropped, on_progress)
            .await
    }

    /// Run the query batch for locations that were already validated.
    ///
    /// `target` must already be normalized (see [`normalize_target_domain`]);
    /// it is matched as given. `dropped` is carried into the report unchanged.
    ///
    /// # Errors
    ///
    /// Input errors for an empty target, keyword or location list, and
    /// `NoResults`, listing every failed query, when nothing succeeded.
    pub async fn analyze_validated<F>(
        &self,
        target: &str,
        keywords: &[String],
        locations: &[Location],
        dropped: Vec<String>,
        on_progress: F,
    ) -> Result<AnalysisReport, RankCheckError>
    where
        F: FnMut(ProgressState),
    {
        let target = target.trim();
        if target.is_empty() {
            return Err(RankCheckError::invalid_input(
                "target domain",
                "target website cannot be empty",
            ));
        }
        check_inputs(keywords, locations)?;

        let units = build_queries(keywords, locations);
        let executor = QueryExecutor::new(
            Arc::clone(&self.provider),
            Arc::clone(&self.limiter),
            target,
        );
        let runner = BatchRunner::new(executor, self.config.concurrency);
        let outcome = runner.run(&units, on_progress).await;

        if outcome.records.is_empty() {
            return Err(RankCheckError::NoResults {
                attempted: units.len(),
                failures: outcome.failures,
            });
        }

        Ok(AnalysisReport::new(
            target,
            outcome.records,
            outcome.failures,
            dropped,
        ))
    }
}

fn check_inputs(keywords: &[String], locations: &[Location]) -> Result<(), RankCheckError> {
    if keywords.iter().all(|k| k.trim().is_empty()) {
        return Err(RankCheckError::invalid_input(
            "keywords",
            "at least one keyword is required",
        ));
    }
    if locations.is_empty() {
        return Err(RankCheckError::invalid_input(
            "locations",
            "at least one location is required",
        ));
    }
    Ok(())
}
