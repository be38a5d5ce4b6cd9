//! Configuration file parsing and management.
//!
//! This module handles loading configuration from TOML files and `RC_*`
//! environment variables, and merging file configurations with proper
//! precedence rules.

use crate::error::RankCheckError;
use crate::types::{RatePolicy, MAX_DURATION};
use serde::{Deserialize, Serialize};
use std::env;
use std::fs;
use std::path::{Path, PathBuf};
use std::time::Duration;

/// Configuration loaded from TOML files.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct FileConfig {
    /// Default values for run options
    #[serde(skip_serializing_if = "Option::is_none")]
    pub defaults: Option<DefaultsConfig>,

    /// Search provider request settings
    #[serde(skip_serializing_if = "Option::is_none")]
    pub provider: Option<ProviderConfig>,

    /// Output formatting preferences
    #[serde(skip_serializing_if = "Option::is_none")]
    pub output: Option<OutputConfig>,
}

/// Default configuration values that map to CLI options.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct DefaultsConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub concurrency: Option<usize>,

    /// Request timeout (as string, e.g., "5s", "30s")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub timeout: Option<String>,

    /// Provider calls allowed per `rate_period`
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_limit: Option<u32>,

    /// Pacing period (as string, e.g., "1s")
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_period: Option<String>,

    /// "spacing" or "window"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub rate_policy: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub validate_locations: Option<bool>,
}

/// Search provider request settings.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct ProviderConfig {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub endpoint: Option<String>,

    #[serde(skip_serializing_if = "Option::is_none")]
    pub google_domain: Option<String>,

    /// Country code (`gl`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub gl: Option<String>,

    /// Interface language (`hl`)
    #[serde(skip_serializing_if = "Option::is_none")]
    pub hl: Option<String>,

    /// Results requested per query
    #[serde(skip_serializing_if = "Option::is_none")]
    pub num: Option<u32>,
}

/// Output formatting configuration.
#[derive(Debug, Clone, Serialize, Deserialize, Default)]
pub struct OutputConfig {
    /// Directory HTML/CSV/JSON reports are written to
    #[serde(skip_serializing_if = "Option::is_none")]
    pub report_dir: Option<String>,

    /// "text", "json" or "csv"
    #[serde(skip_serializing_if = "Option::is_none")]
    pub default_format: Option<String>,
}

/// Configuration discovery and loading functionality.
pub struct ConfigManager {
    /// Whether to emit warnings for config issues
    pub verbose: bool,
}

impl ConfigManager {
    pub fn new(verbose: bool) -> Self {
        Self { verbose }
    }

    /// Load configuration from a specific file.
    pub fn load_file<P: AsRef<Path>>(&self, path: P) -> Result<FileConfig, RankCheckError> {
        let path = path.as_ref();

        if !path.exists() {
            return Err(RankCheckError::file_error(
                path.to_string_lossy(),
                "Configuration file not found",
            ));
        }

        let content = fs::read_to_string(path).map_err(|e| {
            RankCheckError::file_error(
                path.to_string_lossy(),
                format!("Failed to read configuration file: {}", e),
            )
        })?;

        let config: FileConfig = toml::from_str(&content).map_err(|e| {
            RankCheckError::config(format!("Failed to parse TOML configuration: {}", e))
        })?;

        self.validate_config(&config)?;
        tracing::debug!(path = %path.display(), "loaded configuration file");

        Ok(config)
    }

    /// Discover and load configuration files in precedence order.
    ///
    /// XDG config, then `~/.rank-check.toml`, then a file in the current
    /// directory; later files override earlier ones field by field.
    pub fn discover_and_load(&self) -> Result<FileConfig, RankCheckError> {
        let mut merged_config = FileConfig::default();
        let mut loaded_files = Vec::new();

        let candidates = [
            self.get_xdg_config_path(),
            self.get_global_config_path(),
            self.get_local_config_path(),
        ];

        for path in candidates.into_iter().flatten() {
            match self.load_file(&path) {
                Ok(config) => {
                    merged_config = self.merge_configs(merged_config, config);
                    loaded_files.push(path);
                }
                Err(e) => {
                    if self.verbose {
                        eprintln!("⚠️  Skipping config {}: {}", path.display(), e);
                    }
                }
            }
        }

        if self.verbose && loaded_files.len() > 1 {
            eprintln!("⚠️  Multiple config files found. Later files take precedence:");
            for path in &loaded_files {
                eprintln!("   {}", path.display());
            }
        }

        Ok(merged_config)
    }

    fn get_local_config_path(&self) -> Option<PathBuf> {
        ["./rank-check.toml", "./.rank-check.toml"]
            .iter()
            .map(Path::new)
            .find(|path| path.exists())
            .map(Path::to_path_buf)
    }

    fn get_global_config_path(&self) -> Option<PathBuf> {
        let home = env::var_os("HOME")?;
        [".rank-check.toml", "rank-check.toml"]
            .iter()
            .map(|candidate| Path::new(&home).join(candidate))
            .find(|path| path.exists())
    }

    /// Follows the XDG Base Directory Specification.
    fn get_xdg_config_path(&self) -> Option<PathBuf> {
        let config_dir = env::var_os("XDG_CONFIG_HOME")
            .map(PathBuf::from)
            .or_else(|| env::var_os("HOME").map(|home| Path::new(&home).join(".config")))?;

        let path = config_dir.join("rank-check").join("config.toml");
        path.exists().then_some(path)
    }

    /// Merge two configurations; values from `higher` win.
    fn merge_configs(&self, lower: FileConfig, higher: FileConfig) -> FileConfig {
        FileConfig {
            defaults: match (lower.defaults, higher.defaults) {
                (Some(lower), Some(higher)) => Some(DefaultsConfig {
                    concurrency: higher.concurrency.or(lower.concurrency),
                    timeout: higher.timeout.or(lower.timeout),
                    rate_limit: higher.rate_limit.or(lower.rate_limit),
                    rate_period: higher.rate_period.or(lower.rate_period),
                    rate_policy: higher.rate_policy.or(lower.rate_policy),
                    validate_locations: higher.validate_locations.or(lower.validate_locations),
                }),
                (lower, higher) => higher.or(lower),
            },
            provider: match (lower.provider, higher.provider) {
                (Some(lower), Some(higher)) => Some(ProviderConfig {
                    endpoint: higher.endpoint.or(lower.endpoint),
                    google_domain: higher.google_domain.or(lower.google_domain),
                    gl: higher.gl.or(lower.gl),
                    hl: higher.hl.or(lower.hl),
                    num: higher.num.or(lower.num),
                }),
                (lower, higher) => higher.or(lower),
            },
            output: match (lower.output, higher.output) {
                (Some(lower), Some(higher)) => Some(OutputConfig {
                    report_dir: higher.report_dir.or(lower.report_dir),
                    default_format: higher.default_format.or(lower.default_format),
                }),
                (lower, higher) => higher.or(lower),
            },
        }
    }

    /// Validate a configuration for common issues.
    fn validate_config(&self, config: &FileConfig) -> Result<(), RankCheckError> {
        if let Some(defaults) = &config.defaults {
            if let Some(concurrency) = defaults.concurrency {
                if concurrency == 0 || concurrency > 20 {
                    return Err(RankCheckError::config("Concurrency must be between 1 and 20"));
                }
            }

            for (name, value) in [
                ("timeout", &defaults.timeout),
                ("rate_period", &defaults.rate_period),
            ] {
                if let Some(value) = value {
                    if parse_timeout_string(value).is_none() {
                        return Err(RankCheckError::config(format!(
                            "Invalid {} '{}'. Use format like '5s', '30s', '2m' (at most 1440m)",
                            name, value
                        )));
                    }
                }
            }

            if defaults.rate_limit == Some(0) {
                return Err(RankCheckError::config("rate_limit must be at least 1"));
            }

            if let Some(policy) = &defaults.rate_policy {
                policy
                    .parse::<RatePolicy>()
                    .map_err(RankCheckError::config)?;
            }
        }

        if let Some(provider) = &config.provider {
            if let Some(num) = provider.num {
                if num == 0 || num > 100 {
                    return Err(RankCheckError::config("provider.num must be between 1 and 100"));
                }
            }
            if provider.endpoint.as_deref().is_some_and(|e| e.trim().is_empty()) {
                return Err(RankCheckError::config("provider.endpoint cannot be empty"));
            }
        }

        if let Some(format) = config.output.as_ref().and_then(|o| o.default_format.as_deref()) {
            if !matches!(format, "text" | "json" | "csv") {
                return Err(RankCheckError::config(format!(
                    "Invalid default_format '{}', use text, json or csv",
                    format
                )));
            }
        }

        Ok(())
    }
}

/// Configuration values that can be set via `RC_*` environment variables.
#[derive(Debug, Clone, Default)]
pub struct EnvConfig {
    pub api_key: Option<String>,
    pub concurrency: Option<usize>,
    pub timeout: Option<String>,
    pub rate_limit: Option<u32>,
    pub rate_policy: Option<RatePolicy>,
    pub validate: Option<bool>,
    pub endpoint: Option<String>,
    pub report_dir: Option<String>,
    pub config: Option<String>,
}

/// Load configuration from the process environment.
///
/// Invalid values are reported when `verbose` is set and ignored.
pub fn load_env_config(verbose: bool) -> EnvConfig {
    load_env_config_from(|key| env::var(key).ok(), verbose)
}

/// Load configuration from an arbitrary variable lookup.
pub fn load_env_config_from<F>(lookup: F, verbose: bool) -> EnvConfig
where
    F: Fn(&str) -> Option<String>,
{
    let mut env_config = EnvConfig::default();
    let non_empty = |key: &str| lookup(key).filter(|v| !v.trim().is_empty());
    let report_use = |key: &str, value: &str| {
        if verbose {
            eprintln!("🔧 Using {}={}", key, value);
        }
    };
    let report_invalid = |key: &str, value: &str, hint: &str| {
        if verbose {
            eprintln!("⚠️ Invalid {}='{}', {}", key, value, hint);
        }
    };

    // RC_API_KEY wins over the provider's conventional variable name
    env_config.api_key = non_empty("RC_API_KEY").or_else(|| non_empty("VALUESERP_API_KEY"));
    if env_config.api_key.is_some() {
        report_use("RC_API_KEY", "<redacted>");
    }

    if let Some(val) = non_empty("RC_CONCURRENCY") {
        match val.trim().parse::<usize>() {
            Ok(concurrency) if (1..=20).contains(&concurrency) => {
                env_config.concurrency = Some(concurrency);
                report_use("RC_CONCURRENCY", &val);
            }
            _ => report_invalid("RC_CONCURRENCY", &val, "must be 1-20"),
        }
    }

    if let Some(val) = non_empty("RC_TIMEOUT") {
        if parse_timeout_string(&val).is_some() {
            env_config.timeout = Some(val.clone());
            report_use("RC_TIMEOUT", &val);
        } else {
            report_invalid("RC_TIMEOUT", &val, "use format like '5s', '30s', '2m'");
        }
    }

    if let Some(val) = non_empty("RC_RATE_LIMIT") {
        match val.trim().parse::<u32>() {
            Ok(calls) if calls > 0 => {
                env_config.rate_limit = Some(calls);
                report_use("RC_RATE_LIMIT", &val);
            }
            _ => report_invalid("RC_RATE_LIMIT", &val, "must be a positive integer"),
        }
    }

    if let Some(val) = non_empty("RC_RATE_POLICY") {
        match val.parse::<RatePolicy>() {
            Ok(policy) => {
                env_config.rate_policy = Some(policy);
                report_use("RC_RATE_POLICY", &val);
            }
            Err(_) => report_invalid("RC_RATE_POLICY", &val, "use spacing or window"),
        }
    }

    if let Some(val) = non_empty("RC_VALIDATE") {
        match parse_bool(&val) {
            Some(enabled) => {
                env_config.validate = Some(enabled);
                report_use("RC_VALIDATE", &val);
            }
            None => report_invalid("RC_VALIDATE", &val, "use true/false"),
        }
    }

    if let Some(val) = non_empty("RC_ENDPOINT") {
        report_use("RC_ENDPOINT", &val);
        env_config.endpoint = Some(val);
    }

    if let Some(val) = non_empty("RC_REPORT_DIR") {
        report_use("RC_REPORT_DIR", &val);
        env_config.report_dir = Some(val);
    }

    if let Some(val) = non_empty("RC_CONFIG") {
        report_use("RC_CONFIG", &val);
        env_config.config = Some(val);
    }

    env_config
}

fn parse_bool(value: &str) -> Option<bool> {
    match value.trim().to_lowercase().as_str() {
        "true" | "1" | "yes" | "on" => Some(true),
        "false" | "0" | "no" | "off" => Some(false),
        _ => None,
    }
}

/// Parse a duration string like "5s", "30s", "2m" or a bare number of seconds.
///
/// Durations longer than [`MAX_DURATION`] are rejected.
pub fn parse_timeout_string(timeout_str: &str) -> Option<Duration> {
    let timeout_str = timeout_str.trim().to_lowercase();

    let seconds = if let Some(secs) = timeout_str.strip_suffix('s') {
        secs.trim().parse::<u64>().ok()
    } else if let Some(mins) = timeout_str.strip_suffix('m') {
        mins.trim().parse::<u64>().ok()?.checked_mul(60)
    } else {
        timeout_str.parse::<u64>().ok()
    }?;

    let duration = Duration::from_secs(seconds);
    (duration <= MAX_DURATION).then_some(duration)
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::collections::HashMap;
    use std::io::Write;
    use tempfile::NamedTempFile;

    fn write_config(content: &str) -> NamedTempFile {
        let mut temp_file = NamedTempFile::new().unwrap();
        temp_file.write_all(content.as_bytes()).unwrap();
        temp_file.flush().unwrap();
        temp_file
    }

    #[test]
    fn test_parse_timeout_string() {
        assert_eq!(parse_timeout_string("5s"), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout_string("30s"), Some(Duration::from_secs(30)));
        assert_eq!(parse_timeout_string("2m"), Some(Duration::from_secs(120)));
        assert_eq!(parse_timeout_string("5"), Some(Duration::from_secs(5)));
        assert_eq!(parse_timeout_string("invalid"), None);
    }

    #[test]
    fn test_parse_timeout_string_rejects_oversized_values() {
        assert_eq!(parse_timeout_string("1440m"), Some(MAX_DURATION));
        assert_eq!(parse_timeout_string("86401s"), None);
        assert_eq!(parse_timeout_string("18446744073709551615s"), None);
        // Minutes that overflow u64 seconds
        assert_eq!(parse_timeout_string("307445734561825861m"), None);
    }

    #[test]
    fn test_oversized_rate_period_is_rejected() {
        let temp_file = write_config("[defaults]\nrate_period = \"18446744073709551615s\"\n");
        let result = ConfigManager::new(false).load_file(temp_file.path());
        assert!(matches!(result, Err(RankCheckError::ConfigError { .. })));
    }

    #[test]
    fn test_load_valid_config() {
        let temp_file = write_config(
            r#"
[defaults]
concurrency = 3
timeout = "10s"
rate_limit = 2
rate_policy = "spacing"
validate_locations = false

[provider]
gl = "ca"
num = 20

[output]
report_dir = "reports"
default_format = "json"
"#,
        );

        let config = ConfigManager::new(false).load_file(temp_file.path()).unwrap();

        let defaults = config.defaults.unwrap();
        assert_eq!(defaults.concurrency, Some(3));
        assert_eq!(defaults.timeout.as_deref(), Some("10s"));
        assert_eq!(defaults.rate_limit, Some(2));
        assert_eq!(defaults.rate_policy.as_deref(), Some("spacing"));
        assert_eq!(defaults.validate_locations, Some(false));

        let provider = config.provider.unwrap();
        assert_eq!(provider.gl.as_deref(), Some("ca"));
        assert_eq!(provider.num, Some(20));
        assert_eq!(provider.endpoint, None);

        let output = config.output.unwrap();
        assert_eq!(output.report_dir.as_deref(), Some("reports"));
        assert_eq!(output.default_format.as_deref(), Some("json"));
    }

    #[test]
    fn test_invalid_values_rejected() {
        let manager = ConfigManager::new(false);
        for content in [
            "[defaults]\nconcurrency = 0\n",
            "[defaults]\nconcurrency = 50\n",
            "[defaults]\ntimeout = \"soon\"\n",
            "[defaults]\nrate_limit = 0\n",
            "[defaults]\nrate_policy = \"burst\"\n",
            "[provider]\nnum = 0\n",
            "[output]\ndefault_format = \"xml\"\n",
            "not = [valid toml",
        ] {
            let temp_file = write_config(content);
            assert!(
                manager.load_file(temp_file.path()).is_err(),
                "expected rejection of {:?}",
                content
            );
        }
    }

    #[test]
    fn test_missing_file_is_file_error() {
        let result = ConfigManager::new(false).load_file("/definitely/not/here.toml");
        assert!(matches!(result, Err(RankCheckError::FileError { .. })));
    }

    #[test]
    fn test_merge_configs() {
        let manager = ConfigManager::new(false);

        let lower = FileConfig {
            defaults: Some(DefaultsConfig {
                concurrency: Some(10),
                rate_policy: Some("spacing".to_string()),
                ..Default::default()
            }),
            provider: Some(ProviderConfig {
                gl: Some("us".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let higher = FileConfig {
            defaults: Some(DefaultsConfig {
                concurrency: Some(4),
                ..Default::default()
            }),
            output: Some(OutputConfig {
                report_dir: Some("out".to_string()),
                ..Default::default()
            }),
            ..Default::default()
        };

        let merged = manager.merge_configs(lower, higher);
        let defaults = merged.defaults.unwrap();

        assert_eq!(defaults.concurrency, Some(4)); // Higher wins
        assert_eq!(defaults.rate_policy.as_deref(), Some("spacing")); // Lower preserved
        assert_eq!(merged.provider.unwrap().gl.as_deref(), Some("us"));
        assert_eq!(merged.output.unwrap().report_dir.as_deref(), Some("out"));
    }

    #[test]
    fn test_env_config_parses_and_ignores_invalid() {
        let vars: HashMap<&str, &str> = [
            ("RC_CONCURRENCY", "7"),
            ("RC_TIMEOUT", "forever"),
            ("RC_RATE_LIMIT", "3"),
            ("RC_RATE_POLICY", "Spacing"),
            ("RC_VALIDATE", "off"),
            ("RC_ENDPOINT", "http://localhost:8080/search"),
            ("VALUESERP_API_KEY", "fallback-key"),
        ]
        .into_iter()
        .collect();

        let env_config =
            load_env_config_from(|key| vars.get(key).map(|v| v.to_string()), false);

        assert_eq!(env_config.concurrency, Some(7));
        assert_eq!(env_config.timeout, None);
        assert_eq!(env_config.rate_limit, Some(3));
        assert_eq!(env_config.rate_policy, Some(RatePolicy::Spacing));
        assert_eq!(env_config.validate, Some(false));
        assert_eq!(
            env_config.endpoint.as_deref(),
            Some("http://localhost:8080/search")
        );
        assert_eq!(env_config.api_key.as_deref(), Some("fallback-key"));
    }

    #[test]
    fn test_env_api_key_prefers_rc_variable() {
        let vars: HashMap<&str, &str> = [
            ("RC_API_KEY", "primary"),
            ("VALUESERP_API_KEY", "fallback"),
            ("RC_CONCURRENCY", "0"),
        ]
        .into_iter()
        .collect();

        let env_config =
            load_env_config_from(|key| vars.get(key).map(|v| v.to_string()), false);

        assert_eq!(env_config.api_key.as_deref(), Some("primary"));
        assert_eq!(env_config.concurrency, None);
    }
}
