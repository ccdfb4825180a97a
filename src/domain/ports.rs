use crate::domain::model::{ProjectQuotaSnapshot, ProjectRef};
use crate::utils::error::Result;
use async_trait::async_trait;

/// Lists the active projects matching a filter expression.
#[async_trait]
pub trait ProjectDirectory: Send + Sync {
    async fn list_projects(&self, filter: &str) -> Result<Vec<ProjectRef>>;
}

/// Fetches the quota snapshot of a single project.
///
/// Returns `Ok(None)` when the project-level quotas cannot be read. A failed
/// region listing is not an error: the snapshot comes back with
/// `region_quotas: None`.
#[async_trait]
pub trait QuotaSource: Send + Sync {
    async fn project_quotas(&self, project: &ProjectRef) -> Result<Option<ProjectQuotaSnapshot>>;
}
