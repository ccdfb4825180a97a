use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::fmt;

/// A cloud project as returned by the project directory.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct ProjectRef {
    pub id: String,
    pub display_name: String,
}

impl ProjectRef {
    pub fn new(id: impl Into<String>, display_name: impl Into<String>) -> Self {
        Self {
            id: id.into(),
            display_name: display_name.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct QuotaEntry {
    pub metric: String,
    pub limit: f64,
}

impl QuotaEntry {
    pub fn new(metric: impl Into<String>, limit: f64) -> Self {
        Self {
            metric: metric.into(),
            limit,
        }
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RegionQuotas {
    pub region: String,
    pub quotas: Vec<QuotaEntry>,
}

impl RegionQuotas {
    pub fn new(region: impl Into<String>, quotas: Vec<QuotaEntry>) -> Self {
        Self {
            region: region.into(),
            quotas,
        }
    }
}

/// Quota state of one project: project-wide limits plus one list per region.
///
/// `region_quotas` is `None` when the region listing failed; the snapshot is
/// still usable and is compared as if it had no regions.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ProjectQuotaSnapshot {
    pub project: ProjectRef,
    pub project_quotas: Vec<QuotaEntry>,
    pub region_quotas: Option<Vec<RegionQuotas>>,
}

impl ProjectQuotaSnapshot {
    pub fn regions(&self) -> &[RegionQuotas] {
        self.region_quotas.as_deref().unwrap_or(&[])
    }

    pub fn region(&self, name: &str) -> Option<&RegionQuotas> {
        self.regions().iter().find(|r| r.region == name)
    }
}

/// A metric whose limit differs between a matched pair of projects.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Discrepancy {
    pub from_project_id: String,
    pub to_project_id: String,
    /// `None` for project-level quotas.
    pub region: Option<String>,
    pub metric: String,
    pub from_limit: f64,
    pub to_limit: f64,
}

fn scoped(project_id: &str, region: Option<&str>) -> String {
    match region {
        Some(region) => format!("{}/{}", project_id, region),
        None => project_id.to_string(),
    }
}

impl fmt::Display for Discrepancy {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "[{}] [{}] ({:.6}) limit differs from [{}] [{}] ({:.6})",
            scoped(&self.from_project_id, self.region.as_deref()),
            self.metric,
            self.from_limit,
            scoped(&self.to_project_id, self.region.as_deref()),
            self.metric,
            self.to_limit
        )
    }
}

/// A non-fatal condition met during a run. Never counted as a discrepancy.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum Notice {
    NoMatchFound {
        from_project_id: String,
        target_pattern: String,
    },
    MetricMissing {
        from_project_id: String,
        to_project_id: String,
        region: Option<String>,
        metric: String,
    },
    RegionMissing {
        from_project_id: String,
        to_project_id: String,
        region: String,
    },
    RegionQuotasUnavailable {
        project_id: String,
    },
}

impl fmt::Display for Notice {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Notice::NoMatchFound {
                from_project_id,
                target_pattern,
            } => write!(
                f,
                "[{}]: No target project matches {}",
                from_project_id, target_pattern
            ),
            Notice::MetricMissing {
                from_project_id,
                to_project_id,
                region,
                metric,
            } => write!(
                f,
                "[{}]: Metric {} does not exist in {}",
                scoped(from_project_id, region.as_deref()),
                metric,
                scoped(to_project_id, region.as_deref())
            ),
            Notice::RegionMissing {
                from_project_id,
                to_project_id,
                region,
            } => write!(
                f,
                "[{}]: Region {} does not exist in {}",
                from_project_id, region, to_project_id
            ),
            Notice::RegionQuotasUnavailable { project_id } => write!(
                f,
                "[{}]: Region quotas unavailable, compared as empty",
                project_id
            ),
        }
    }
}

/// Everything a comparison run produced.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ComparisonReport {
    pub generated_at: DateTime<Utc>,
    pub from_filter: String,
    pub to_filter: String,
    pub pairs_compared: usize,
    pub discrepancies: Vec<Discrepancy>,
    pub notices: Vec<Notice>,
}

impl ComparisonReport {
    pub fn has_discrepancies(&self) -> bool {
        !self.discrepancies.is_empty()
    }
}
