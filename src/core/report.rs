use crate::core::{ComparisonReport, Discrepancy, Notice, QuotaDiff};
use crate::utils::error::Result;
use chrono::Utc;
use serde::{Deserialize, Serialize};
use std::path::Path;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize, Deserialize)]
#[cfg_attr(feature = "cli", derive(clap::ValueEnum))]
#[serde(rename_all = "lowercase")]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

/// Logs findings as they arrive and collects them for the final report.
#[derive(Debug, Default)]
pub struct ReportEmitter {
    pairs_compared: usize,
    discrepancies: Vec<Discrepancy>,
    notices: Vec<Notice>,
}

impl ReportEmitter {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn notice(&mut self, notice: Notice) {
        tracing::info!("{}", notice);
        self.notices.push(notice);
    }

    pub fn record(&mut self, diff: QuotaDiff) {
        self.pairs_compared += 1;
        for notice in diff.notices {
            self.notice(notice);
        }
        for discrepancy in diff.discrepancies {
            tracing::warn!("{}", discrepancy);
            self.discrepancies.push(discrepancy);
        }
    }

    pub fn finish(self, from_filter: &str, to_filter: &str) -> ComparisonReport {
        tracing::info!(
            "Compared {} project pairs: {} discrepancies, {} notices",
            self.pairs_compared,
            self.discrepancies.len(),
            self.notices.len()
        );

        ComparisonReport {
            generated_at: Utc::now(),
            from_filter: from_filter.to_string(),
            to_filter: to_filter.to_string(),
            pairs_compared: self.pairs_compared,
            discrepancies: self.discrepancies,
            notices: self.notices,
        }
    }
}

#[derive(Serialize)]
struct CsvRow<'a> {
    from_project_id: &'a str,
    to_project_id: &'a str,
    region: &'a str,
    metric: &'a str,
    from_limit: f64,
    to_limit: f64,
}

impl ComparisonReport {
    pub fn render(&self, format: OutputFormat) -> Result<String> {
        match format {
            OutputFormat::Text => Ok(self.render_text()),
            OutputFormat::Json => Ok(serde_json::to_string_pretty(self)?),
            OutputFormat::Csv => self.render_csv(),
        }
    }

    fn render_text(&self) -> String {
        let mut lines: Vec<String> = self.discrepancies.iter().map(|d| d.to_string()).collect();
        lines.extend(self.notices.iter().map(|n| n.to_string()));
        lines.push(format!(
            "{} pairs compared, {} discrepancies, {} notices",
            self.pairs_compared,
            self.discrepancies.len(),
            self.notices.len()
        ));
        lines.join("\n")
    }

    fn render_csv(&self) -> Result<String> {
        let mut writer = csv::Writer::from_writer(Vec::new());
        for d in &self.discrepancies {
            writer.serialize(CsvRow {
                from_project_id: &d.from_project_id,
                to_project_id: &d.to_project_id,
                region: d.region.as_deref().unwrap_or(""),
                metric: &d.metric,
                from_limit: d.from_limit,
                to_limit: d.to_limit,
            })?;
        }
        // header only appears once a row is serialized
        if self.discrepancies.is_empty() {
            writer.write_record([
                "from_project_id",
                "to_project_id",
                "region",
                "metric",
                "from_limit",
                "to_limit",
            ])?;
        }

        let bytes = writer.into_inner().map_err(|e| e.into_error())?;
        Ok(String::from_utf8_lossy(&bytes).into_owned())
    }

    pub fn write_to<P: AsRef<Path>>(&self, path: P, format: OutputFormat) -> Result<()> {
        let path = path.as_ref();
        if let Some(parent) = path.parent() {
            if !parent.as_os_str().is_empty() {
                std::fs::create_dir_all(parent)?;
            }
        }
        std::fs::write(path, self.render(format)?)?;
        tracing::debug!("Report written to {}", path.display());
        Ok(())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn report() -> ComparisonReport {
        let mut emitter = ReportEmitter::new();
        emitter.notice(Notice::NoMatchFound {
            from_project_id: "prj-dev-search-ab12".to_string(),
            target_pattern: r"prj-\w+-search-[a-zA-Z0-9]{4}$".to_string(),
        });
        emitter.record(QuotaDiff {
            discrepancies: vec![
                Discrepancy {
                    from_project_id: "prj-dev-billing-ab12".to_string(),
                    to_project_id: "prj-staging-billing-cd34".to_string(),
                    region: None,
                    metric: "CPUS".to_string(),
                    from_limit: 24.0,
                    to_limit: 32.0,
                },
                Discrepancy {
                    from_project_id: "prj-dev-billing-ab12".to_string(),
                    to_project_id: "prj-staging-billing-cd34".to_string(),
                    region: Some("us-east1".to_string()),
                    metric: "DISKS_TOTAL_GB".to_string(),
                    from_limit: 500.0,
                    to_limit: 4096.0,
                },
            ],
            notices: vec![],
        });
        emitter.finish("labels.env:dev", "labels.env:staging")
    }

    #[test]
    fn test_emitter_accumulates_in_order() {
        let report = report();
        assert_eq!(report.pairs_compared, 1);
        assert_eq!(report.discrepancies.len(), 2);
        assert_eq!(report.notices.len(), 1);
        assert_eq!(report.discrepancies[0].metric, "CPUS");
        assert!(report.has_discrepancies());
    }

    #[test]
    fn test_render_csv() {
        let csv = report().render(OutputFormat::Csv).unwrap();
        let lines: Vec<&str> = csv.lines().collect();
        assert_eq!(lines[0], "from_project_id,to_project_id,region,metric,from_limit,to_limit");
        assert_eq!(lines[1], "prj-dev-billing-ab12,prj-staging-billing-cd34,,CPUS,24.0,32.0");
        assert_eq!(
            lines[2],
            "prj-dev-billing-ab12,prj-staging-billing-cd34,us-east1,DISKS_TOTAL_GB,500.0,4096.0"
        );
    }

    #[test]
    fn test_render_csv_without_rows_keeps_header() {
        let report = ReportEmitter::new().finish("a", "b");
        let csv = report.render(OutputFormat::Csv).unwrap();
        assert_eq!(csv.trim_end(), "from_project_id,to_project_id,region,metric,from_limit,to_limit");
    }

    #[test]
    fn test_render_json_and_text() {
        let report = report();
        let json: serde_json::Value =
            serde_json::from_str(&report.render(OutputFormat::Json).unwrap()).unwrap();
        assert_eq!(json["discrepancies"][1]["region"], "us-east1");
        assert_eq!(json["notices"][0]["kind"], "no_match_found");

        let text = report.render(OutputFormat::Text).unwrap();
        assert!(text.contains("[prj-dev-billing-ab12] [CPUS] (24.000000) limit differs"));
        assert!(text.ends_with("1 pairs compared, 2 discrepancies, 1 notices"));
    }
}
