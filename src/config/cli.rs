use crate::config::toml_config::{GcpConfig, OutputConfig, RegexConfig, TomlConfig};
use crate::config::Settings;
use crate::core::report::OutputFormat;
use crate::utils::error::Result;
use clap::Parser;
use std::path::PathBuf;

#[derive(Debug, Clone, Parser)]
#[command(name = "quota-comparer")]
#[command(version)]
#[command(about = "Compare GCP quotas between two sets of projects")]
pub struct CliConfig {
    /// Filter selecting the projects to compare from
    #[arg(long, env = "GCP_QUOTA_COMPARER_FROM")]
    pub from: Option<String>,

    /// Filter selecting the projects to compare to
    #[arg(long, env = "GCP_QUOTA_COMPARER_TO")]
    pub to: Option<String>,

    /// The regex to use to match against the source projects
    #[arg(long = "regex.from", env = "GCP_QUOTA_COMPARER_REGEX_FROM")]
    pub regex_from: Option<String>,

    /// The regex to use to match against the target project, with %s for the name
    #[arg(long = "regex.to", env = "GCP_QUOTA_COMPARER_REGEX_TO")]
    pub regex_to: Option<String>,

    /// Max number of retries on retryable statuses [default: 0]
    #[arg(long = "gcp.max-retries", env = "GCP_QUOTA_COMPARER_MAX_RETRIES")]
    pub max_retries: Option<u32>,

    /// How long to wait for a result from the Google API [default: 10s]
    #[arg(long = "gcp.http-timeout", env = "GCP_QUOTA_COMPARER_HTTP_TIMEOUT")]
    pub http_timeout: Option<String>,

    /// Max time between retries [default: 5s]
    #[arg(long = "gcp.max-backoff", env = "GCP_QUOTA_COMPARER_MAX_BACKOFF_DURATION")]
    pub max_backoff: Option<String>,

    /// Base of the exponential backoff jitter [default: 1s]
    #[arg(long = "gcp.backoff-jitter", env = "GCP_QUOTA_COMPARER_BACKOFF_JITTER_BASE")]
    pub backoff_jitter: Option<String>,

    /// HTTP statuses that trigger a retry [default: 503]
    #[arg(
        long = "gcp.retry-statuses",
        env = "GCP_QUOTA_COMPARER_RETRY_STATUSES",
        value_delimiter = ','
    )]
    pub retry_statuses: Vec<u16>,

    /// OAuth2 access token sent as a bearer token
    #[arg(long, env = "GOOGLE_OAUTH_ACCESS_TOKEN", hide_env_values = true)]
    pub access_token: Option<String>,

    #[arg(long, env = "GCP_QUOTA_COMPARER_RESOURCE_MANAGER_ENDPOINT")]
    pub resource_manager_endpoint: Option<String>,

    #[arg(long, env = "GCP_QUOTA_COMPARER_COMPUTE_ENDPOINT")]
    pub compute_endpoint: Option<String>,

    #[arg(long, value_enum)]
    pub output_format: Option<OutputFormat>,

    /// Write the report to this file instead of stdout
    #[arg(long)]
    pub output_file: Option<PathBuf>,

    /// Path to a TOML configuration file
    #[arg(short, long)]
    pub config: Option<PathBuf>,

    /// Enable verbose output
    #[arg(short, long)]
    pub verbose: bool,

    /// Log as JSON lines
    #[arg(long)]
    pub log_json: bool,
}

impl From<&CliConfig> for TomlConfig {
    fn from(cli: &CliConfig) -> Self {
        TomlConfig {
            from: cli.from.clone(),
            to: cli.to.clone(),
            regex: RegexConfig {
                from: cli.regex_from.clone(),
                to: cli.regex_to.clone(),
            },
            gcp: GcpConfig {
                max_retries: cli.max_retries,
                http_timeout: cli.http_timeout.clone(),
                max_backoff: cli.max_backoff.clone(),
                backoff_jitter: cli.backoff_jitter.clone(),
                retry_statuses: (!cli.retry_statuses.is_empty()).then(|| cli.retry_statuses.clone()),
                access_token: cli.access_token.clone(),
                resource_manager_endpoint: cli.resource_manager_endpoint.clone(),
                compute_endpoint: cli.compute_endpoint.clone(),
            },
            output: OutputConfig {
                format: cli.output_format,
                file: cli.output_file.clone(),
            },
        }
    }
}

impl CliConfig {
    /// Flags and environment over the config file over built-in defaults.
    pub fn settings(&self) -> Result<Settings> {
        let file = match &self.config {
            Some(path) => {
                tracing::info!("Loading configuration from {}", path.display());
                TomlConfig::from_file(path)?
            }
            None => TomlConfig::default(),
        };

        Settings::resolve(TomlConfig::from(self).or(file))
    }
}
