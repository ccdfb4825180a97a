use crate::core::report::OutputFormat;
use crate::utils::error::Result;
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};

/// Optional configuration file. Every key may also be given on the command
/// line or through the environment, which take precedence.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct TomlConfig {
    pub from: Option<String>,
    pub to: Option<String>,
    #[serde(default)]
    pub regex: RegexConfig,
    #[serde(default)]
    pub gcp: GcpConfig,
    #[serde(default)]
    pub output: OutputConfig,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct RegexConfig {
    pub from: Option<String>,
    pub to: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct GcpConfig {
    pub max_retries: Option<u32>,
    /// Durations use humantime syntax, e.g. `10s` or `500ms`.
    pub http_timeout: Option<String>,
    pub max_backoff: Option<String>,
    pub backoff_jitter: Option<String>,
    pub retry_statuses: Option<Vec<u16>>,
    pub access_token: Option<String>,
    pub resource_manager_endpoint: Option<String>,
    pub compute_endpoint: Option<String>,
}

#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct OutputConfig {
    pub format: Option<OutputFormat>,
    pub file: Option<PathBuf>,
}

impl TomlConfig {
    pub fn from_file<P: AsRef<Path>>(path: P) -> Result<Self> {
        let content = std::fs::read_to_string(&path)?;
        Self::from_toml_str(&content)
    }

    pub fn from_toml_str(content: &str) -> Result<Self> {
        let processed_content = Self::substitute_env_vars(content);
        Ok(toml::from_str(&processed_content)?)
    }

    /// Replaces `${VAR}` with the value of the environment variable. Unset
    /// variables are left untouched.
    fn substitute_env_vars(content: &str) -> String {
        use regex::Regex;
        use std::sync::OnceLock;

        static ENV_VAR: OnceLock<Regex> = OnceLock::new();
        let re = ENV_VAR.get_or_init(|| {
            Regex::new(r"\$\{([A-Za-z_][A-Za-z0-9_]*)\}").expect("static pattern compiles")
        });

        re.replace_all(content, |caps: &regex::Captures| {
            let var_name = &caps[1];
            std::env::var(var_name).unwrap_or_else(|_| format!("${{{}}}", var_name))
        })
        .into_owned()
    }

    /// Layers `self` over `lower`: a key set here wins.
    pub fn or(self, lower: TomlConfig) -> TomlConfig {
        TomlConfig {
            from: self.from.or(lower.from),
            to: self.to.or(lower.to),
            regex: RegexConfig {
                from: self.regex.from.or(lower.regex.from),
                to: self.regex.to.or(lower.regex.to),
            },
            gcp: GcpConfig {
                max_retries: self.gcp.max_retries.or(lower.gcp.max_retries),
                http_timeout: self.gcp.http_timeout.or(lower.gcp.http_timeout),
                max_backoff: self.gcp.max_backoff.or(lower.gcp.max_backoff),
                backoff_jitter: self.gcp.backoff_jitter.or(lower.gcp.backoff_jitter),
                retry_statuses: self.gcp.retry_statuses.or(lower.gcp.retry_statuses),
                access_token: self.gcp.access_token.or(lower.gcp.access_token),
                resource_manager_endpoint: self
                    .gcp
                    .resource_manager_endpoint
                    .or(lower.gcp.resource_manager_endpoint),
                compute_endpoint: self.gcp.compute_endpoint.or(lower.gcp.compute_endpoint),
            },
            output: OutputConfig {
                format: self.output.format.or(lower.output.format),
                file: self.output.file.or(lower.output.file),
            },
        }
    }
}
