use crate::core::differ::diff;
use crate::core::matcher::NameMatcher;
use crate::core::report::ReportEmitter;
use crate::core::{
    ComparisonReport, Notice, ProjectDirectory, ProjectQuotaSnapshot, ProjectRef, QuotaSource,
};
use crate::utils::error::{QuotaComparerError, Result};

/// Inputs of one comparison run.
#[derive(Debug, Clone)]
pub struct ComparisonRequest {
    pub from_filter: String,
    pub to_filter: String,
    pub source_pattern: String,
    pub target_template: String,
}

pub struct QuotaComparer<D: ProjectDirectory, Q: QuotaSource> {
    directory: D,
    quotas: Q,
}

impl<D: ProjectDirectory, Q: QuotaSource> QuotaComparer<D, Q> {
    pub fn new(directory: D, quotas: Q) -> Self {
        Self { directory, quotas }
    }

    pub async fn compare(&self, request: &ComparisonRequest) -> Result<ComparisonReport> {
        let matcher = NameMatcher::new(&request.source_pattern, &request.target_template)?;

        let from_projects = self.directory.list_projects(&request.from_filter).await?;
        let to_projects = self.directory.list_projects(&request.to_filter).await?;
        tracing::info!(
            "Found {} source and {} target projects",
            from_projects.len(),
            to_projects.len()
        );

        let mut emitter = ReportEmitter::new();

        for from_project in &from_projects {
            let target = matcher.find_match(from_project, &to_projects)?;
            let Some(to_project) = target.project else {
                emitter.notice(Notice::NoMatchFound {
                    from_project_id: from_project.id.clone(),
                    target_pattern: target.pattern.as_str().to_string(),
                });
                continue;
            };

            tracing::debug!("Checking {} against {}...", from_project.id, to_project.id);

            let from_snapshot = self.snapshot(from_project, &mut emitter).await?;
            let to_snapshot = self.snapshot(to_project, &mut emitter).await?;

            emitter.record(diff(&from_snapshot, &to_snapshot));
        }

        Ok(emitter.finish(&request.from_filter, &request.to_filter))
    }

    async fn snapshot(
        &self,
        project: &ProjectRef,
        emitter: &mut ReportEmitter,
    ) -> Result<ProjectQuotaSnapshot> {
        let snapshot = self
            .quotas
            .project_quotas(project)
            .await?
            .ok_or_else(|| QuotaComparerError::QuotaFetchError {
                project_id: project.id.clone(),
                message: "project quotas unavailable".to_string(),
            })?;

        if snapshot.region_quotas.is_none() {
            emitter.notice(Notice::RegionQuotasUnavailable {
                project_id: project.id.clone(),
            });
        }

        Ok(snapshot)
    }
}
