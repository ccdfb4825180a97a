use crate::adapters::http::GcpHttpClient;
use crate::core::{ProjectQuotaSnapshot, ProjectRef, QuotaEntry, QuotaSource, RegionQuotas};
use crate::utils::error::Result;
use async_trait::async_trait;
use serde::Deserialize;

pub const DEFAULT_COMPUTE_ENDPOINT: &str = "https://compute.googleapis.com";

#[derive(Debug, Deserialize)]
struct ApiQuota {
    metric: String,
    limit: f64,
}

impl From<ApiQuota> for QuotaEntry {
    fn from(q: ApiQuota) -> Self {
        QuotaEntry::new(q.metric, q.limit)
    }
}

#[derive(Debug, Deserialize)]
struct ApiProject {
    #[serde(default)]
    quotas: Vec<ApiQuota>,
}

#[derive(Debug, Deserialize)]
#[serde(rename_all = "camelCase")]
struct RegionList {
    #[serde(default)]
    items: Vec<ApiRegion>,
    next_page_token: Option<String>,
}

#[derive(Debug, Deserialize)]
struct ApiRegion {
    name: String,
    #[serde(default)]
    quotas: Vec<ApiQuota>,
}

/// Project and region quotas from the Compute Engine v1 API.
pub struct ComputeQuotaSource {
    http: GcpHttpClient,
    endpoint: String,
}

impl ComputeQuotaSource {
    pub fn new(http: GcpHttpClient, endpoint: &str) -> Self {
        Self {
            http,
            endpoint: endpoint.trim_end_matches('/').to_string(),
        }
    }

    fn project_url(&self, project_id: &str) -> String {
        format!("{}/compute/v1/projects/{}", self.endpoint, project_id)
    }

    async fn fetch_project_quotas(&self, project_id: &str) -> Result<Vec<QuotaEntry>> {
        let project: ApiProject = self.http.get_json(&self.project_url(project_id), &[]).await?;
        Ok(project.quotas.into_iter().map(QuotaEntry::from).collect())
    }

    async fn fetch_region_quotas(&self, project_id: &str) -> Result<Vec<RegionQuotas>> {
        let url = format!("{}/regions", self.project_url(project_id));
        let mut regions = Vec::new();
        let mut page_token: Option<String> = None;

        loop {
            let query: Vec<(&str, &str)> = match page_token.as_deref() {
                Some(token) => vec![("pageToken", token)],
                None => Vec::new(),
            };

            let page: RegionList = self.http.get_json(&url, &query).await?;
            regions.extend(page.items.into_iter().map(|r| {
                RegionQuotas::new(r.name, r.quotas.into_iter().map(QuotaEntry::from).collect())
            }));

            match page.next_page_token.filter(|t| !t.is_empty()) {
                Some(next) if page_token.as_deref() != Some(next.as_str()) => {
                    page_token = Some(next)
                }
                _ => break,
            }
        }

        Ok(regions)
    }
}

#[async_trait]
impl QuotaSource for ComputeQuotaSource {
    async fn project_quotas(&self, project: &ProjectRef) -> Result<Option<ProjectQuotaSnapshot>> {
        let project_quotas = match self.fetch_project_quotas(&project.id).await {
            Ok(quotas) => quotas,
            Err(e) => {
                tracing::warn!("Failure when querying project quotas for {}: {}", project.id, e);
                return Ok(None);
            }
        };

        let region_quotas = match self.fetch_region_quotas(&project.id).await {
            Ok(regions) => Some(regions),
            Err(e) => {
                tracing::warn!("Failure when querying region quotas for {}: {}", project.id, e);
                None
            }
        };

        tracing::debug!(
            "{}: {} project quotas, {} regions",
            project.id,
            project_quotas.len(),
            region_quotas.as_ref().map_or(0, Vec::len)
        );

        Ok(Some(ProjectQuotaSnapshot {
            project: project.clone(),
            project_quotas,
            region_quotas,
        }))
    }
}
