use crate::core::{Discrepancy, Notice, ProjectQuotaSnapshot, QuotaEntry};

/// Result of comparing one matched pair of snapshots.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct QuotaDiff {
    pub discrepancies: Vec<Discrepancy>,
    pub notices: Vec<Notice>,
}

impl QuotaDiff {
    pub fn is_empty(&self) -> bool {
        self.discrepancies.is_empty() && self.notices.is_empty()
    }
}

/// Compares `from` against `to`, project-level quotas first, then region by
/// region. Output follows the iteration order of `from`.
pub fn diff(from: &ProjectQuotaSnapshot, to: &ProjectQuotaSnapshot) -> QuotaDiff {
    let mut out = QuotaDiff::default();
    let pair = Pair {
        from_id: &from.project.id,
        to_id: &to.project.id,
    };

    compare_quotas(pair, None, &from.project_quotas, &to.project_quotas, &mut out);

    for from_region in from.regions() {
        let Some(to_region) = to.region(&from_region.region) else {
            out.notices.push(Notice::RegionMissing {
                from_project_id: pair.from_id.to_string(),
                to_project_id: pair.to_id.to_string(),
                region: from_region.region.clone(),
            });
            continue;
        };

        compare_quotas(
            pair,
            Some(&from_region.region),
            &from_region.quotas,
            &to_region.quotas,
            &mut out,
        );
    }

    out
}

#[derive(Clone, Copy)]
struct Pair<'a> {
    from_id: &'a str,
    to_id: &'a str,
}

fn compare_quotas(
    pair: Pair<'_>,
    region: Option<&str>,
    from: &[QuotaEntry],
    to: &[QuotaEntry],
    out: &mut QuotaDiff,
) {
    for from_quota in from {
        let Some(to_quota) = to.iter().find(|q| q.metric == from_quota.metric) else {
            out.notices.push(Notice::MetricMissing {
                from_project_id: pair.from_id.to_string(),
                to_project_id: pair.to_id.to_string(),
                region: region.map(str::to_string),
                metric: from_quota.metric.clone(),
            });
            continue;
        };

        // exact comparison, -1 (unlimited) included
        if from_quota.limit != to_quota.limit {
            out.discrepancies.push(Discrepancy {
                from_project_id: pair.from_id.to_string(),
                to_project_id: pair.to_id.to_string(),
                region: region.map(str::to_string),
                metric: from_quota.metric.clone(),
                from_limit: from_quota.limit,
                to_limit: to_quota.limit,
            });
        }
    }
}
