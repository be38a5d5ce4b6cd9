//! # Rank Check Library
//!
//! Concurrent, rate-limited search ranking analysis.
//!
//! Given a target domain, a list of keywords and a list of locations, the
//! library issues one search per (keyword, location) pair against a
//! ranked-results provider, records where the target appears on the first
//! results page, and aggregates the outcome into summary metrics, a rankings
//! matrix and a competitor table.
//!
//! ## Quick Start
//!
//! ```rust,no_run
//! use rank_check_lib::{parse_keywords, parse_locations, CheckConfig, RankChecker};
//!
//! #[tokio::main]
//! async fn main() -> Result<(), Box<dyn std::error::Error>> {
//!     let checker = RankChecker::with_config(CheckConfig::default().with_api_key("key"))?;
//!     let keywords = parse_keywords("plumber\nemergency plumber");
//!     let locations = parse_locations("Austin, TX\n78701")?;
//!
//!     let report = checker
//!         .analyze("acme.com", &keywords, &locations, |p| {
//!             eprintln!("{}/{}", p.completed, p.total)
//!         })
//!         .await?;
//!
//!     for record in &report.records {
//!         println!("{} in {}: {}", record.keyword, record.location, record.target_position);
//!     }
//!     Ok(())
//! }
//! ```
//!
//! ## Features
//!
//! - **Shared rate limiting**: one pacing gate for every in-flight query
//! - **Bounded concurrency**: a fixed-size worker pool over all query units
//! - **Failure isolation**: a failed query becomes a warning, not an abort
//! - **Location validation**: optional geocoder check before dispatch
//! - **Reports**: HTML, CSV and JSON renderings of a finished run

pub use aggregate::{aggregate, Aggregate, CompetitorRow, RankingMatrix, Summary};
pub use batch::{BatchOutcome, BatchRunner};
pub use checker::{RankChecker, ValidationOutcome};
pub use config::{
    load_env_config, load_env_config_from, parse_timeout_string, ConfigManager, DefaultsConfig,
    EnvConfig, FileConfig, OutputConfig, ProviderConfig,
};
pub use error::RankCheckError;
pub use executor::{find_target_position, normalize_response, QueryExecutor, SerpPage};
pub use protocols::{LocationValidator, NominatimValidator, SearchProvider, ValueSerpClient};
pub use query::build_queries;
pub use rate_limit::RateLimiter;
pub use report::{
    csv_row, render_csv, render_html, render_json, report_filename, AnalysisReport, REPORT_LABEL,
};
pub use types::{
    CheckConfig, LocalResult, Location, OrganicResult, ProgressState, QueryFailure, QueryUnit,
    RatePolicy, ResultRecord, TargetPosition, MAX_DURATION, NOT_ON_PAGE_ONE, PAGE_ONE_SIZE,
    TOP_RESULTS,
};
pub use utils::{normalize_target_domain, parse_keywords, parse_location_line, parse_locations};

pub mod protocols;

mod aggregate;
mod batch;
mod checker;
mod config;
mod error;
mod executor;
mod query;
mod rate_limit;
mod report;
mod types;
mod utils;

// Type alias for convenience
pub type Result<T> = std::result::Result<T, RankCheckError>;

pub const VERSION: &str = env!("CARGO_PKG_VERSION");
