#[cfg(feature = "cli")]
pub mod cli;
pub mod toml_config;

use crate::adapters::compute::DEFAULT_COMPUTE_ENDPOINT;
use crate::adapters::http::{GcpHttpClient, RetryPolicy};
use crate::adapters::resource_manager::DEFAULT_RESOURCE_MANAGER_ENDPOINT;
use crate::core::comparer::ComparisonRequest;
use crate::core::report::OutputFormat;
use crate::utils::error::{QuotaComparerError, Result};
use crate::utils::validation::{self, Validate};
use std::fmt;
use std::path::PathBuf;
use std::time::Duration;
use toml_config::TomlConfig;

pub const DEFAULT_REGEX_FROM: &str = r"prj-\w+-(?P<Name>.*)-[a-zA-Z0-9]{4}$";
pub const DEFAULT_REGEX_TO: &str = r"prj-\w+-%s-[a-zA-Z0-9]{4}$";
pub const DEFAULT_MAX_RETRIES: u32 = 0;
pub const DEFAULT_HTTP_TIMEOUT: Duration = Duration::from_secs(10);
pub const DEFAULT_MAX_BACKOFF: Duration = Duration::from_secs(5);
pub const DEFAULT_BACKOFF_JITTER: Duration = Duration::from_secs(1);
pub const DEFAULT_RETRY_STATUSES: [u16; 1] = [503];

/// Fully resolved configuration for one run.
#[derive(Debug, Clone)]
pub struct Settings {
    pub from: String,
    pub to: String,
    pub regex_from: String,
    pub regex_to: String,
    pub gcp: GcpSettings,
    pub output: OutputSettings,
}

#[derive(Clone)]
pub struct GcpSettings {
    pub max_retries: u32,
    pub http_timeout: Duration,
    pub max_backoff: Duration,
    pub backoff_jitter: Duration,
    pub retry_statuses: Vec<u16>,
    pub access_token: Option<String>,
    pub resource_manager_endpoint: String,
    pub compute_endpoint: String,
}

impl fmt::Debug for GcpSettings {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("GcpSettings")
            .field("max_retries", &self.max_retries)
            .field("http_timeout", &self.http_timeout)
            .field("max_backoff", &self.max_backoff)
            .field("backoff_jitter", &self.backoff_jitter)
            .field("retry_statuses", &self.retry_statuses)
            .field("access_token", &self.access_token.as_ref().map(|_| "<redacted>"))
            .field("resource_manager_endpoint", &self.resource_manager_endpoint)
            .field("compute_endpoint", &self.compute_endpoint)
            .finish()
    }
}

#[derive(Debug, Clone, Default)]
pub struct OutputSettings {
    pub format: OutputFormat,
    pub file: Option<PathBuf>,
}

fn parse_duration(field: &str, value: Option<String>, default: Duration) -> Result<Duration> {
    match value {
        None => Ok(default),
        Some(raw) => humantime::parse_duration(raw.trim()).map_err(|e| {
            QuotaComparerError::InvalidConfigValueError {
                field: field.to_string(),
                value: raw,
                reason: e.to_string(),
            }
        }),
    }
}

impl Settings {
    /// Applies built-in defaults to a layered configuration.
    pub fn resolve(config: TomlConfig) -> Result<Self> {
        let from = config.from.ok_or_else(|| QuotaComparerError::MissingConfigError {
            field: "from".to_string(),
        })?;
        let to = config.to.ok_or_else(|| QuotaComparerError::MissingConfigError {
            field: "to".to_string(),
        })?;

        let gcp = config.gcp;
        let gcp = GcpSettings {
            max_retries: gcp.max_retries.unwrap_or(DEFAULT_MAX_RETRIES),
            http_timeout: parse_duration("gcp.http-timeout", gcp.http_timeout, DEFAULT_HTTP_TIMEOUT)?,
            max_backoff: parse_duration("gcp.max-backoff", gcp.max_backoff, DEFAULT_MAX_BACKOFF)?,
            backoff_jitter: parse_duration(
                "gcp.backoff-jitter",
                gcp.backoff_jitter,
                DEFAULT_BACKOFF_JITTER,
            )?,
            retry_statuses: gcp
                .retry_statuses
                .unwrap_or_else(|| DEFAULT_RETRY_STATUSES.to_vec()),
            access_token: gcp.access_token.filter(|t| !t.trim().is_empty()),
            resource_manager_endpoint: gcp
                .resource_manager_endpoint
                .unwrap_or_else(|| DEFAULT_RESOURCE_MANAGER_ENDPOINT.to_string()),
            compute_endpoint: gcp
                .compute_endpoint
                .unwrap_or_else(|| DEFAULT_COMPUTE_ENDPOINT.to_string()),
        };

        Ok(Self {
            from,
            to,
            regex_from: config.regex.from.unwrap_or_else(|| DEFAULT_REGEX_FROM.to_string()),
            regex_to: config.regex.to.unwrap_or_else(|| DEFAULT_REGEX_TO.to_string()),
            gcp,
            output: OutputSettings {
                format: config.output.format.unwrap_or_default(),
                file: config.output.file,
            },
        })
    }

    pub fn comparison_request(&self) -> ComparisonRequest {
        ComparisonRequest {
            from_filter: self.from.clone(),
            to_filter: self.to.clone(),
            source_pattern: self.regex_from.clone(),
            target_template: self.regex_to.clone(),
        }
    }
}

impl GcpSettings {
    pub fn retry_policy(&self) -> RetryPolicy {
        RetryPolicy {
            max_retries: self.max_retries,
            retry_statuses: self.retry_statuses.clone(),
            jitter_base: self.backoff_jitter,
            max_backoff: self.max_backoff,
        }
    }

    pub fn http_client(&self) -> Result<GcpHttpClient> {
        GcpHttpClient::new(self.http_timeout, self.access_token.clone(), self.retry_policy())
    }
}

impl Validate for Settings {
    fn validate(&self) -> Result<()> {
        validation::validate_non_empty_string("from", &self.from)?;
        validation::validate_non_empty_string("to", &self.to)?;
        validation::validate_non_empty_string("regex.from", &self.regex_from)?;
        validation::validate_non_empty_string("regex.to", &self.regex_to)?;
        self.gcp.validate()
    }
}

impl Validate for GcpSettings {
    fn validate(&self) -> Result<()> {
        validation::validate_non_zero_duration("gcp.http-timeout", self.http_timeout)?;
        validation::validate_http_statuses("gcp.retry-statuses", &self.retry_statuses)?;
        validation::validate_url("resource-manager-endpoint", &self.resource_manager_endpoint)?;
        validation::validate_url("compute-endpoint", &self.compute_endpoint)?;
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn minimal() -> TomlConfig {
        TomlConfig::from_toml_str("from = \"labels.env:dev\"\nto = \"labels.env:staging\"\n").unwrap()
    }

    #[test]
    fn test_resolve_applies_defaults() {
        let settings = Settings::resolve(minimal()).unwrap();

        assert_eq!(settings.regex_from, DEFAULT_REGEX_FROM);
        assert_eq!(settings.regex_to, DEFAULT_REGEX_TO);
        assert_eq!(settings.gcp.max_retries, 0);
        assert_eq!(settings.gcp.http_timeout, Duration::from_secs(10));
        assert_eq!(settings.gcp.max_backoff, Duration::from_secs(5));
        assert_eq!(settings.gcp.backoff_jitter, Duration::from_secs(1));
        assert_eq!(settings.gcp.retry_statuses, vec![503]);
        assert_eq!(settings.gcp.compute_endpoint, DEFAULT_COMPUTE_ENDPOINT);
        assert_eq!(settings.output.format, OutputFormat::Text);
        assert!(settings.validate().is_ok());
    }

    #[test]
    fn test_resolve_requires_both_filters() {
        let mut config = minimal();
        config.to = None;

        match Settings::resolve(config) {
            Err(QuotaComparerError::MissingConfigError { field }) => assert_eq!(field, "to"),
            other => panic!("unexpected result: {other:?}"),
        }
    }

    #[test]
    fn test_resolve_parses_durations() {
        let mut config = minimal();
        config.gcp.http_timeout = Some("1m 30s".to_string());
        config.gcp.backoff_jitter = Some("250ms".to_string());

        let settings = Settings::resolve(config).unwrap();
        assert_eq!(settings.gcp.http_timeout, Duration::from_secs(90));
        assert_eq!(settings.gcp.backoff_jitter, Duration::from_millis(250));

        let mut config = minimal();
        config.gcp.max_backoff = Some("soon".to_string());
        assert!(Settings::resolve(config).is_err());
    }

    #[test]
    fn test_validation_rejects_bad_values() {
        let mut settings = Settings::resolve(minimal()).unwrap();
        settings.gcp.http_timeout = Duration::ZERO;
        assert!(settings.validate().is_err());

        let mut settings = Settings::resolve(minimal()).unwrap();
        settings.gcp.compute_endpoint = "compute.googleapis.com".to_string();
        assert!(settings.validate().is_err());

        let mut settings = Settings::resolve(minimal()).unwrap();
        settings.from = " ".to_string();
        assert!(settings.validate().is_err());
    }

    #[test]
    fn test_debug_redacts_access_token() {
        let mut config = minimal();
        config.gcp.access_token = Some("ya29.secret".to_string());

        let settings = Settings::resolve(config).unwrap();
        let debug = format!("{:?}", settings);
        assert!(!debug.contains("ya29.secret"));
        assert!(debug.contains("<redacted>"));
    }

    #[test]
    fn test_retry_policy_mirrors_settings() {
        let mut config = minimal();
        config.gcp.max_retries = Some(4);
        config.gcp.retry_statuses = Some(vec![429, 503]);

        let policy = Settings::resolve(config).unwrap().gcp.retry_policy();
        assert_eq!(policy.max_retries, 4);
        assert_eq!(policy.retry_statuses, vec![429, 503]);
        assert_eq!(policy.jitter_base, Duration::from_secs(1));
    }
}
