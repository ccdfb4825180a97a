use thiserror::Error;

#[derive(Error, Debug)]
pub enum QuotaComparerError {
    #[error("Project listing failed for filter '{filter}': {message}")]
    DirectoryError { filter: String, message: String },

    #[error("Quota fetch failed for project {project_id}: {message}")]
    QuotaFetchError { project_id: String, message: String },

    #[error("Pattern '{pattern}' did not extract a name from project {project_id}")]
    PatternMismatch { project_id: String, pattern: String },

    #[error("Invalid regular expression: {0}")]
    InvalidPattern(#[from] regex::Error),

    #[error("Invalid target template '{template}': {reason}")]
    InvalidTemplate { template: String, reason: String },

    #[error("API request failed: {0}")]
    ApiError(#[from] reqwest::Error),

    #[error("API returned {status} for {url}: {body}")]
    ApiStatus {
        status: u16,
        url: String,
        body: String,
    },

    #[error("IO error: {0}")]
    IoError(#[from] std::io::Error),

    #[error("Serialization error: {0}")]
    SerializationError(#[from] serde_json::Error),

    #[error("CSV processing error: {0}")]
    CsvError(#[from] csv::Error),

    #[error("TOML parsing error: {0}")]
    TomlError(#[from] toml::de::Error),

    #[error("Missing required configuration: {field}")]
    MissingConfigError { field: String },

    #[error("Invalid value '{value}' for {field}: {reason}")]
    InvalidConfigValueError {
        field: String,
        value: String,
        reason: String,
    },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ErrorCategory {
    Configuration,
    Matching,
    CloudApi,
    Output,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub enum ErrorSeverity {
    Low,
    Medium,
    High,
    Critical,
}

impl QuotaComparerError {
    pub fn category(&self) -> ErrorCategory {
        match self {
            Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. }
            | Self::InvalidTemplate { .. }
            | Self::InvalidPattern(_)
            | Self::TomlError(_) => ErrorCategory::Configuration,
            Self::PatternMismatch { .. } => ErrorCategory::Matching,
            Self::DirectoryError { .. }
            | Self::QuotaFetchError { .. }
            | Self::ApiError(_)
            | Self::ApiStatus { .. } => ErrorCategory::CloudApi,
            Self::IoError(_) | Self::SerializationError(_) | Self::CsvError(_) => {
                ErrorCategory::Output
            }
        }
    }

    pub fn severity(&self) -> ErrorSeverity {
        match self {
            Self::ApiStatus { status, .. } if *status == 429 || *status >= 500 => {
                ErrorSeverity::Medium
            }
            Self::ApiError(e) if e.is_timeout() || e.is_connect() => ErrorSeverity::Medium,
            Self::IoError(_) => ErrorSeverity::Critical,
            _ => ErrorSeverity::High,
        }
    }

    /// Process exit code for a run that ended with this error.
    pub fn exit_code(&self) -> i32 {
        match self.severity() {
            ErrorSeverity::Low => 0,
            ErrorSeverity::Medium => 2,
            ErrorSeverity::High => 1,
            ErrorSeverity::Critical => 3,
        }
    }

    pub fn recovery_suggestion(&self) -> &'static str {
        match self {
            Self::DirectoryError { .. } => {
                "Check the filter syntax and that the access token may list projects"
            }
            Self::QuotaFetchError { .. } => {
                "Check that the Compute Engine API is enabled and readable for the project"
            }
            Self::PatternMismatch { .. } => {
                "Adjust --regex.from or narrow --from so every project id follows the naming convention"
            }
            Self::InvalidPattern(_) | Self::InvalidTemplate { .. } => {
                "Fix --regex.from / --regex.to: one capture group and exactly one %s placeholder"
            }
            Self::ApiError(_) | Self::ApiStatus { .. } => {
                "Retry later or raise --gcp.max-retries and --gcp.http-timeout"
            }
            Self::IoError(_) => "Check that the output path is writable",
            Self::SerializationError(_) | Self::CsvError(_) => {
                "Report this as a bug together with the --verbose log"
            }
            Self::TomlError(_)
            | Self::MissingConfigError { .. }
            | Self::InvalidConfigValueError { .. } => {
                "Check the command-line flags, environment variables and config file"
            }
        }
    }

    pub fn user_friendly_message(&self) -> String {
        match self.category() {
            ErrorCategory::Configuration => format!("Invalid configuration: {}", self),
            ErrorCategory::Matching => format!("Project matching aborted: {}", self),
            ErrorCategory::CloudApi => format!("Cloud API call failed: {}", self),
            ErrorCategory::Output => format!("Could not write the report: {}", self),
        }
    }
}

pub type Result<T> = std::result::Result<T, QuotaComparerError>;
