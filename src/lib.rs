pub mod adapters;
pub mod config;
pub mod core;
pub mod domain;
pub mod utils;

#[cfg(feature = "cli")]
pub use config::cli::CliConfig;
pub use config::Settings;

pub use adapters::{ComputeQuotaSource, GcpHttpClient, ResourceManagerDirectory, RetryPolicy};
pub use crate::core::comparer::{ComparisonRequest, QuotaComparer};
pub use crate::core::report::OutputFormat;
pub use domain::model::{ComparisonReport, Discrepancy, Notice};
pub use utils::error::{QuotaComparerError, Result};
