//! Rank Check CLI Application
//!
//! A command-line interface for tracking where a website ranks in search
//! results across many keywords and locations. This application provides a
//! user-friendly interface to the rank-check-lib library.

mod ui;

use clap::builder::styling::{AnsiColor, Effects, Styles};
use clap::Parser;
use rank_check_lib::{
    build_queries, csv_row, load_env_config, normalize_target_domain, parse_keywords,
    parse_location_line, parse_timeout_string, render_csv, render_html, render_json,
    report_filename, AnalysisReport, CheckConfig, ConfigManager, EnvConfig, FileConfig,
    Location, OutputConfig, RankCheckError, RankChecker, RatePolicy, REPORT_LABEL,
};
use std::fs;
use std::path::{Path, PathBuf};
use std::process;
use tracing_subscriber::EnvFilter;

const STYLES: Styles = Styles::styled()
    .header(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .usage(AnsiColor::Yellow.on_default().effects(Effects::BOLD))
    .literal(AnsiColor::Green.on_default().effects(Effects::BOLD))
    .placeholder(AnsiColor::Cyan.on_default());

/// CLI arguments for rank-check
#[derive(Parser, Debug)]
#[command(name = "rank-check")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Track where a website ranks in search results across keywords and locations")]
#[command(
    long_about = "Track where a website ranks in search results across keywords and locations.\n\nRuns one rate-limited search per (keyword, location) pair, reports the target's first-page position, local pack presence and top competitors, and can write HTML, CSV and JSON reports.\n\nThe ValueSERP API key is read from RC_API_KEY or VALUESERP_API_KEY."
)]
#[command(styles = STYLES)]
pub struct Args {
    /// Target website (e.g. example.com or https://www.example.com/)
    #[arg(value_name = "TARGET", help_heading = "Analysis Input")]
    pub target: String,

    /// Keyword to analyze (repeatable)
    #[arg(short = 'k', long = "keyword", value_name = "KEYWORD", action = clap::ArgAction::Append, help_heading = "Analysis Input")]
    pub keywords: Vec<String>,

    /// File with one keyword per line
    #[arg(long = "keywords-file", value_name = "FILE", help_heading = "Analysis Input")]
    pub keywords_file: Option<String>,

    /// Location as "City, State" or a 5-digit ZIP code (repeatable)
    #[arg(short = 'l', long = "location", value_name = "LOCATION", action = clap::ArgAction::Append, help_heading = "Analysis Input")]
    pub locations: Vec<String>,

    /// File with one location per line
    #[arg(long = "locations-file", value_name = "FILE", help_heading = "Analysis Input")]
    pub locations_file: Option<String>,

    /// Skip geocoder validation of locations
    #[arg(long = "no-validate", help_heading = "Analysis Input")]
    pub no_validate: bool,

    /// Print the queries that would be run and exit
    #[arg(long = "dry-run", help_heading = "Analysis Input")]
    pub dry_run: bool,

    /// Output results in JSON format
    #[arg(short = 'j', long = "json", help_heading = "Output Format")]
    pub json: bool,

    /// Output results in CSV format
    #[arg(long = "csv", help_heading = "Output Format")]
    pub csv: bool,

    /// Write HTML, CSV and JSON reports into this directory
    #[arg(long = "report-dir", value_name = "DIR", help_heading = "Output Format")]
    pub report_dir: Option<String>,

    /// Max concurrent queries (default: 5, max: 20)
    #[arg(short = 'c', long = "concurrency", help_heading = "Performance")]
    pub concurrency: Option<usize>,

    /// Provider calls allowed per second (default: 5)
    #[arg(long = "rate-limit", value_name = "N", help_heading = "Performance")]
    pub rate_limit: Option<u32>,

    /// Pacing policy: spacing or window (default: window)
    #[arg(long = "rate-policy", value_name = "POLICY", help_heading = "Performance")]
    pub rate_policy: Option<String>,

    /// Per-request timeout, e.g. "30s" or "2m" (default: 30s)
    #[arg(long = "timeout", value_name = "DURATION", help_heading = "Performance")]
    pub timeout: Option<String>,

    /// Search provider endpoint
    #[arg(long = "endpoint", value_name = "URL", help_heading = "Configuration")]
    pub endpoint: Option<String>,

    /// Use specific config file instead of automatic discovery
    #[arg(long = "config", value_name = "FILE", help_heading = "Configuration")]
    pub config: Option<String>,

    /// Show detailed debug information and error messages
    #[arg(short = 'd', long = "debug", help_heading = "Configuration")]
    pub debug: bool,

    /// Verbose logging
    #[arg(short = 'v', long = "verbose", help_heading = "Configuration")]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum OutputFormat {
    Text,
    Json,
    Csv,
}

#[tokio::main]
async fn main() {
    let args = Args::parse();

    if let Err(e) = validate_args(&args) {
        eprintln!("Error: {}", e);
        process::exit(1);
    }

    init_tracing(&args);

    if args.verbose {
        eprintln!(
            "🔧 Rank Check CLI v{} starting...",
            env!("CARGO_PKG_VERSION")
        );
    }

    if let Err(e) = run_rank_check(args).await {
        eprintln!("Error: {}", e);
        process::exit(1);
    }
}

/// Validate command line arguments
fn validate_args(args: &Args) -> Result<(), String> {
    if args.keywords.is_empty() && args.keywords_file.is_none() {
        return Err("You must specify keywords with -k/--keyword or --keywords-file".to_string());
    }

    if args.locations.is_empty() && args.locations_file.is_none() {
        return Err(
            "You must specify locations with -l/--location or --locations-file".to_string(),
        );
    }

    if args.json && args.csv {
        return Err("Cannot specify multiple output formats (--json, --csv)".to_string());
    }

    if let Some(concurrency) = args.concurrency {
        if concurrency == 0 || concurrency > 20 {
            return Err("Concurrency must be between 1 and 20".to_string());
        }
    }

    if args.rate_limit == Some(0) {
        return Err("Rate limit must be at least 1 call per second".to_string());
    }

    if let Some(policy) = &args.rate_policy {
        policy.parse::<RatePolicy>()?;
    }

    if let Some(timeout) = &args.timeout {
        if parse_timeout_string(timeout).is_none() {
            return Err(format!(
                "Invalid timeout '{}'. Use format like '5s', '30s', '2m'",
                timeout
            ));
        }
    }

    Ok(())
}

/// Install the tracing subscriber on stderr.
///
/// `RUST_LOG` wins when set. Otherwise text mode only logs errors, since the
/// terminal UI reports warnings itself; structured modes log warnings.
fn init_tracing(args: &Args) {
    let default_level = if args.debug {
        "debug"
    } else if args.verbose {
        "info"
    } else if args.json || args.csv {
        "warn"
    } else {
        "error"
    };

    let env_filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));

    let _ = tracing_subscriber::fmt()
        .with_env_filter(env_filter)
        .with_writer(std::io::stderr)
        .with_target(false)
        .try_init();
}

/// Main analysis flow
async fn run_rank_check(args: Args) -> Result<(), Box<dyn std::error::Error>> {
    let (config, output_config) = build_config(&args)?;
    let format = resolve_output_format(&args, &output_config);
    tracing::debug!(
        concurrency = config.concurrency,
        rate_limit = config.rate_limit,
        rate_policy = %config.rate_policy,
        endpoint = %config.endpoint,
        "resolved configuration"
    );

    // All input validation happens before any network activity
    let target = normalize_target_domain(&args.target)?;
    let keywords = collect_keywords(&args)?;
    let locations = collect_locations(&args)?;

    if args.dry_run {
        return print_dry_run(&keywords, &locations, format);
    }

    let checker = RankChecker::with_config(config.clone())?;
    let is_text = format == OutputFormat::Text;

    if is_text {
        ui::print_header(&target, keywords.len(), locations.len(), &config);
    }

    let spinner = if is_text && config.validate_locations {
        ui::Spinner::start(format!("Validating {} locations...", locations.len()))
    } else {
        None
    };
    let validation = checker.validate_locations(&locations).await;
    if let Some(s) = spinner {
        s.stop().await;
    }
    let validation = validation?;

    let dropped: Vec<String> = validation
        .dropped
        .iter()
        .map(Location::to_display_string)
        .collect();
    if is_text {
        ui::print_dropped_locations(&dropped);
    }

    let start_time = std::time::Instant::now();
    let mut progress = ui::ProgressLine::new(is_text);
    let result = checker
        .analyze_validated(&target, &keywords, &validation.valid, dropped, |p| {
            progress.update(p.completed, p.total)
        })
        .await;
    progress.finish();
    let report = result?;
    let duration = start_time.elapsed();

    display_report(&report, format, duration)?;

    if let Some(dir) = &output_config.report_dir {
        let written = write_reports(&report, Path::new(dir))?;
        for path in written {
            eprintln!("📄 Report written to {}", path.display());
        }
    }

    Ok(())
}

/// Collect keywords from `-k` flags and `--keywords-file`.
fn collect_keywords(args: &Args) -> Result<Vec<String>, RankCheckError> {
    let mut keywords: Vec<String> = args
        .keywords
        .iter()
        .map(|k| k.trim().to_string())
        .filter(|k| !k.is_empty())
        .collect();

    if let Some(path) = &args.keywords_file {
        keywords.extend(parse_keywords(&read_input_file(path)?));
    }

    if keywords.is_empty() {
        return Err(RankCheckError::invalid_input(
            "keywords",
            "at least one keyword is required",
        ));
    }

    Ok(keywords)
}

/// Collect locations from `-l` flags and `--locations-file`.
///
/// Any malformed entry aborts the run. Errors name the flag position for
/// `-l` values and the file line for file entries.
fn collect_locations(args: &Args) -> Result<Vec<Location>, Box<dyn std::error::Error>> {
    let mut locations = Vec::new();

    for (idx, raw) in args.locations.iter().enumerate() {
        if raw.trim().is_empty() {
            continue;
        }
        locations.push(parse_location_line(idx + 1, raw)?);
    }

    if let Some(path) = &args.locations_file {
        let content = read_input_file(path)?;
        for (idx, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let location =
                parse_location_line(idx + 1, line).map_err(|e| format!("{}: {}", path, e))?;
            locations.push(location);
        }
    }

    if locations.is_empty() {
        return Err(RankCheckError::invalid_input(
            "locations",
            "at least one location is required",
        )
        .into());
    }

    Ok(locations)
}

fn read_input_file(path: &str) -> Result<String, RankCheckError> {
    fs::read_to_string(path).map_err(|e| RankCheckError::file_error(path, e.to_string()))
}

fn print_dry_run(
    keywords: &[String],
    locations: &[Location],
    format: OutputFormat,
) -> Result<(), Box<dyn std::error::Error>> {
    let units = build_queries(keywords, locations);

    match format {
        OutputFormat::Json => println!("{}", serde_json::to_string_pretty(&units)?),
        OutputFormat::Csv => {
            println!("keyword,location,query");
            for unit in &units {
                println!(
                    "{}",
                    csv_row(&[
                        unit.keyword.as_str(),
                        unit.location.as_str(),
                        unit.raw_query.as_str(),
                    ])
                );
            }
        }
        OutputFormat::Text => {
            for unit in &units {
                println!("{}", unit.raw_query);
            }
        }
    }

    eprintln!("{} queries would be run", units.len());
    Ok(())
}

fn resolve_output_format(args: &Args, output_config: &OutputConfig) -> OutputFormat {
    if args.json {
        OutputFormat::Json
    } else if args.csv {
        OutputFormat::Csv
    } else {
        match output_config.default_format.as_deref() {
            Some("json") => OutputFormat::Json,
            Some("csv") => OutputFormat::Csv,
            _ => OutputFormat::Text,
        }
    }
}

fn display_report(
    report: &AnalysisReport,
    format: OutputFormat,
    duration: std::time::Duration,
) -> Result<(), Box<dyn std::error::Error>> {
    match format {
        OutputFormat::Json => println!("{}", render_json(report)?),
        OutputFormat::Csv => print!("{}", render_csv(&report.records)),
        OutputFormat::Text => {
            ui::print_failures(&report.failures);
            ui::print_summary(&report.aggregate.summary, duration);
            ui::print_matrix(&report.aggregate.matrix);
            ui::print_details(&report.records);
        }
    }
    Ok(())
}

/// Write HTML, CSV and JSON reports for `report` into `dir`.
fn write_reports(
    report: &AnalysisReport,
    dir: &Path,
) -> Result<Vec<PathBuf>, Box<dyn std::error::Error>> {
    fs::create_dir_all(dir)
        .map_err(|e| RankCheckError::file_error(dir.to_string_lossy(), e.to_string()))?;

    let date = report.generated_at.date_naive();
    let outputs = [
        ("html", render_html(report)),
        ("csv", render_csv(&report.records)),
        ("json", render_json(report)?),
    ];

    let mut written = Vec::with_capacity(outputs.len());
    for (ext, content) in outputs {
        let path = dir.join(report_filename(&report.target, REPORT_LABEL, date, ext));
        fs::write(&path, content)
            .map_err(|e| RankCheckError::file_error(path.to_string_lossy(), e.to_string()))?;
        written.push(path);
    }

    Ok(written)
}

/// Build the run configuration and output settings.
///
/// Precedence order (highest to lowest):
/// 1. CLI arguments (explicit user input)
/// 2. Environment variables (RC_*)
/// 3. Local config file (./rank-check.toml)
/// 4. Global config file (~/.rank-check.toml)
/// 5. XDG config file (~/.config/rank-check/config.toml)
/// 6. Built-in defaults
fn build_config(
    args: &Args,
) -> Result<(CheckConfig, OutputConfig), Box<dyn std::error::Error>> {
    let config_manager = ConfigManager::new(args.verbose);
    let env_config = load_env_config(args.verbose);

    // Step 1: Explicit config file or automatic discovery
    let explicit_path = args.config.as_ref().or(env_config.config.as_ref());
    let file_config = if let Some(path) = explicit_path {
        if args.verbose {
            eprintln!("🔧 Using explicit config file: {}", path);
        }
        config_manager
            .load_file(path)
            .map_err(|e| format!("Failed to load config file '{}': {}", path, e))?
    } else {
        match config_manager.discover_and_load() {
            Ok(file_config) => file_config,
            Err(e) => {
                if args.verbose {
                    eprintln!("⚠️ Config discovery warning: {}", e);
                }
                FileConfig::default()
            }
        }
    };

    let mut output_config = file_config.output.clone().unwrap_or_default();
    let config = merge_file_config_into_check_config(CheckConfig::default(), file_config);

    // Step 2: Environment variables (RC_*)
    if let Some(dir) = &env_config.report_dir {
        output_config.report_dir = Some(dir.clone());
    }
    let config = apply_environment_config(config, &env_config);

    // Step 3: CLI arguments
    if let Some(dir) = &args.report_dir {
        output_config.report_dir = Some(dir.clone());
    }
    let config = apply_cli_args_to_config(config, args)?;

    Ok((config, output_config))
}

/// Merge FileConfig into CheckConfig
fn merge_file_config_into_check_config(
    mut config: CheckConfig,
    file_config: FileConfig,
) -> CheckConfig {
    if let Some(defaults) = file_config.defaults {
        if let Some(concurrency) = defaults.concurrency {
            config = config.with_concurrency(concurrency);
        }
        if let Some(timeout) = defaults.timeout.as_deref().and_then(parse_timeout_string) {
            config.timeout = timeout;
        }

        let period = defaults
            .rate_period
            .as_deref()
            .and_then(parse_timeout_string)
            .unwrap_or(config.rate_period);
        let calls = defaults.rate_limit.unwrap_or(config.rate_limit);
        config = config.with_rate_limit(calls, period);

        if let Some(policy) = defaults
            .rate_policy
            .as_deref()
            .and_then(|p| p.parse::<RatePolicy>().ok())
        {
            config.rate_policy = policy;
        }
        if let Some(validate) = defaults.validate_locations {
            config.validate_locations = validate;
        }
    }

    if let Some(provider) = file_config.provider {
        if let Some(endpoint) = provider.endpoint {
            config.endpoint = endpoint;
        }
        if let Some(google_domain) = provider.google_domain {
            config.google_domain = google_domain;
        }
        if let Some(gl) = provider.gl {
            config.gl = gl;
        }
        if let Some(hl) = provider.hl {
            config.hl = hl;
        }
        if let Some(num) = provider.num {
            config.num = num;
        }
    }

    config
}

/// Apply `RC_*` environment variables to config.
fn apply_environment_config(mut config: CheckConfig, env_config: &EnvConfig) -> CheckConfig {
    if let Some(api_key) = &env_config.api_key {
        config.api_key = Some(api_key.clone());
    }
    if let Some(concurrency) = env_config.concurrency {
        config = config.with_concurrency(concurrency);
    }
    if let Some(timeout) = env_config.timeout.as_deref().and_then(parse_timeout_string) {
        config.timeout = timeout;
    }
    if let Some(calls) = env_config.rate_limit {
        let period = config.rate_period;
        config = config.with_rate_limit(calls, period);
    }
    if let Some(policy) = env_config.rate_policy {
        config.rate_policy = policy;
    }
    if let Some(validate) = env_config.validate {
        config.validate_locations = validate;
    }
    if let Some(endpoint) = &env_config.endpoint {
        config.endpoint = endpoint.clone();
    }

    config
}

/// Apply CLI arguments to config (highest precedence).
///
/// Only flags the user actually passed override earlier layers.
fn apply_cli_args_to_config(
    mut config: CheckConfig,
    args: &Args,
) -> Result<CheckConfig, Box<dyn std::error::Error>> {
    if let Some(concurrency) = args.concurrency {
        config = config.with_concurrency(concurrency);
    }
    if let Some(calls) = args.rate_limit {
        config = config.with_rate_limit(calls, std::time::Duration::from_secs(1));
    }
    if let Some(policy) = &args.rate_policy {
        config.rate_policy = policy.parse::<RatePolicy>()?;
    }
    if let Some(timeout) = &args.timeout {
        config.timeout = parse_timeout_string(timeout)
            .ok_or_else(|| format!("Invalid timeout '{}'", timeout))?;
    }
    if let Some(endpoint) = &args.endpoint {
        config.endpoint = endpoint.clone();
    }
    if args.no_validate {
        config.validate_locations = false;
    }

    Ok(config)
}

// rank-check/src/main.rs tests module

#[cfg(test)]
mod tests {
    use super::*;
    use rank_check_lib::{DefaultsConfig, ProviderConfig};
    use std::io::Write;
    use std::time::Duration;
    use tempfile::NamedTempFile;

    fn create_test_args() -> Args {
        Args::try_parse_from([
            "rank-check",
            "acme.com",
            "-k",
            "plumber",
            "-l",
            "Austin, TX",
        ])
        .unwrap()
    }

    #[test]
    fn test_args_accept_repeated_keywords_and_locations() {
        let args = Args::try_parse_from([
            "rank-check",
            "acme.com",
            "-k",
            "plumber",
            "--keyword",
            "electrician",
            "-l",
            "Austin, TX",
            "-l",
            "78701",
        ])
        .unwrap();

        assert_eq!(args.keywords, vec!["plumber", "electrician"]);
        // Commas inside a location are not treated as delimiters
        assert_eq!(args.locations, vec!["Austin, TX", "78701"]);
    }

    #[test]
    fn test_validate_args_requires_inputs() {
        let mut args = create_test_args();
        args.keywords.clear();
        assert!(validate_args(&args).is_err());

        let mut args = create_test_args();
        args.locations.clear();
        assert!(validate_args(&args).is_err());

        let mut args = create_test_args();
        args.locations.clear();
        args.locations_file = Some("locations.txt".to_string());
        assert!(validate_args(&args).is_ok());
    }

    #[test]
    fn test_validate_args_conflicting_formats() {
        let mut args = create_test_args();
        args.json = true;
        args.csv = true;
        let result = validate_args(&args);
        assert!(result.unwrap_err().contains("multiple output formats"));
    }

    #[test]
    fn test_validate_args_ranges() {
        let mut args = create_test_args();
        args.concurrency = Some(0);
        assert!(validate_args(&args).is_err());

        let mut args = create_test_args();
        args.concurrency = Some(21);
        assert!(validate_args(&args).is_err());

        let mut args = create_test_args();
        args.rate_limit = Some(0);
        assert!(validate_args(&args).is_err());

        let mut args = create_test_args();
        args.rate_policy = Some("burst".to_string());
        assert!(validate_args(&args).is_err());

        let mut args = create_test_args();
        args.timeout = Some("later".to_string());
        assert!(validate_args(&args).is_err());
    }

    #[test]
    fn test_collect_locations_reports_bad_line() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "Austin, TX\n\nSpringfield").unwrap();

        let mut args = create_test_args();
        args.locations.clear();
        args.locations_file = Some(file.path().to_string_lossy().to_string());

        let err = collect_locations(&args).unwrap_err().to_string();
        assert!(err.contains("line 3"), "unexpected error: {}", err);
        assert!(err.contains("Springfield"));
    }

    #[test]
    fn test_collect_locations_combines_flags_and_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "78701\nDallas, TX").unwrap();

        let mut args = create_test_args();
        args.locations_file = Some(file.path().to_string_lossy().to_string());

        let locations = collect_locations(&args).unwrap();
        let display: Vec<String> = locations.iter().map(Location::to_display_string).collect();
        assert_eq!(display, vec!["Austin, TX", "78701", "Dallas, TX"]);
    }

    #[test]
    fn test_collect_keywords_from_file() {
        let mut file = NamedTempFile::new().unwrap();
        writeln!(file, "  emergency plumber  \n\nwater heater").unwrap();

        let mut args = create_test_args();
        args.keywords_file = Some(file.path().to_string_lossy().to_string());

        assert_eq!(
            collect_keywords(&args).unwrap(),
            vec!["plumber", "emergency plumber", "water heater"]
        );
    }

    #[test]
    fn test_missing_keywords_file_is_file_error() {
        let mut args = create_test_args();
        args.keywords_file = Some("/no/such/keywords.txt".to_string());
        assert!(matches!(
            collect_keywords(&args),
            Err(RankCheckError::FileError { .. })
        ));
    }

    #[test]
    fn test_file_config_merge() {
        let file_config = FileConfig {
            defaults: Some(DefaultsConfig {
                concurrency: Some(3),
                timeout: Some("10s".to_string()),
                rate_limit: Some(2),
                rate_period: Some("2s".to_string()),
                rate_policy: Some("spacing".to_string()),
                validate_locations: Some(false),
            }),
            provider: Some(ProviderConfig {
                gl: Some("ca".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let config = merge_file_config_into_check_config(CheckConfig::default(), file_config);

        assert_eq!(config.concurrency, 3);
        assert_eq!(config.timeout, Duration::from_secs(10));
        assert_eq!(config.rate_limit, 2);
        assert_eq!(config.rate_period, Duration::from_secs(2));
        assert_eq!(config.rate_policy, RatePolicy::Spacing);
        assert!(!config.validate_locations);
        assert_eq!(config.gl, "ca");
        assert_eq!(config.hl, "en");
    }

    #[test]
    fn test_cli_args_override_environment() {
        let env_config = EnvConfig {
            api_key: Some("env-key".to_string()),
            concurrency: Some(8),
            endpoint: Some("http://env.example/search".to_string()),
            ..Default::default()
        };
        let config = apply_environment_config(CheckConfig::default(), &env_config);
        assert_eq!(config.concurrency, 8);
        assert_eq!(config.api_key.as_deref(), Some("env-key"));

        let mut args = create_test_args();
        args.concurrency = Some(2);
        args.rate_policy = Some("spacing".to_string());
        args.no_validate = true;
        let config = apply_cli_args_to_config(config, &args).unwrap();

        assert_eq!(config.concurrency, 2);
        assert_eq!(config.rate_policy, RatePolicy::Spacing);
        assert!(!config.validate_locations);
        // Not passed on the command line, so the environment value stays
        assert_eq!(config.endpoint, "http://env.example/search");
    }

    #[test]
    fn test_resolve_output_format() {
        let args = create_test_args();
        let json_default = OutputConfig {
            default_format: Some("json".to_string()),
            ..Default::default()
        };
        assert_eq!(
            resolve_output_format(&args, &OutputConfig::default()),
            OutputFormat::Text
        );
        assert_eq!(
            resolve_output_format(&args, &json_default),
            OutputFormat::Json
        );

        let mut args = create_test_args();
        args.csv = true;
        assert_eq!(resolve_output_format(&args, &json_default), OutputFormat::Csv);
    }

    #[test]
    fn test_write_reports_uses_keyed_filenames() {
        let dir = tempfile::tempdir().unwrap();
        let report = AnalysisReport::new("acme.com", Vec::new(), Vec::new(), Vec::new());

        let written = write_reports(&report, dir.path()).unwrap();
        let stamp = report.generated_at.format("%Y%m%d").to_string();

        assert_eq!(written.len(), 3);
        for (path, ext) in written.iter().zip(["html", "csv", "json"]) {
            assert_eq!(
                path.file_name().unwrap().to_string_lossy(),
                format!("acme_com_SEO_Analysis_Report_{}.{}", stamp, ext)
            );
            assert!(path.exists());
        }
    }
}
