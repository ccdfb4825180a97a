use crate::adapters::http::GcpHttpClient;
use crate::core::{ProjectDirectory, ProjectRef};
use crate::utils::error::{QuotaComparerError, Result};
use async_trait::async_trait;
use serde::Deserialize;

pub const DEFAULT_RESOURCE_MANAGER_ENDPOINT: &str = "https://cloudresourcemanager.googleapis.com";

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ListProjectsResponse {
    #[serde(default)]
    projects: Vec<ApiProject>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct ApiProject {
    project_id: String,
    #[serde(default)]
    name: String,
}

/// Project listing through the Cloud Resource Manager v1 API.
pub struct ResourceManagerDirectory {
    http: GcpHttpClient,
    endpoint: String,
}

impl ResourceManagerDirectory {
    pub fn new(http: GcpHttpClient, endpoint: &str) -> Self {
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    /// Only active projects are ever compared.
    pub fn effective_filter(filter: &str) -> String {
        format!("lifecycleState:ACTIVE {}", filter.trim())
            .trim_end()
            .to_string()
    }

    async fn fetch_all(&self, filter: &str) -> Result<Vec<ProjectRef>> {
        let url = format!("{}/v1/projects", self.endpoint);
        let mut projects = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let mut query = vec![("filter", filter)];
            if let Some(token) = page_token.as_deref() {
                query.push(("pageToken", token));
            }

            let page: ListProjectsResponse = self.http.get_json(&url, &query).await?;
            projects.extend(
                page.projects
                    .into_iter()
                    .map(|p| ProjectRef::new(p.project_id, p.name)),
            );

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) if page_token.as_deref() != Some(next.as_str()) => {
                    page_token = Some(next)
                }
                _ => break,
            }
        }

        Ok(projects)
    }
}

#[async_trait]
impl ProjectDirectory for ResourceManagerDirectory {
    async fn list_projects(&self, filter: &str) -> Result<Vec<ProjectRef>> {
        let filter = Self::effective_filter(filter);
        tracing::info!("Project filter: {}", filter);

        let projects = self
            .fetch_all(&filter)
            .await
            .map_err(|e| QuotaComparerError::DirectoryError {
                filter: filter.clone(),
                message: e.to_string(),
            })?;

        tracing::debug!("Retrieved {} projects for '{}'", projects.len(), filter);
        Ok(projects)
    }
}
