use anyhow::Context;
use clap::Parser;
use quota_comparer::utils::{logger, validation::Validate};
use quota_comparer::{
    CliConfig, ComparisonReport, ComputeQuotaSource, QuotaComparer, QuotaComparerError,
    ResourceManagerDirectory, Settings,
};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = CliConfig::parse();

    if cli.log_json {
        logger::init_json_logger(cli.verbose);
    } else {
        logger::init_cli_logger(cli.verbose);
    }

    tracing::info!("Starting quota-comparer {}", env!("CARGO_PKG_VERSION"));

    let settings = match cli.settings().and_then(|s| s.validate().map(|_| s)) {
        Ok(settings) => settings,
        Err(e) => exit_with(&e),
    };
    tracing::debug!("Settings: {:?}", settings);

    let report = match run(&settings).await {
        Ok(report) => report,
        Err(e) => exit_with(&e),
    };

    write_report(&settings, &report)?;

    if report.has_discrepancies() {
        tracing::warn!("{} quota discrepancies found", report.discrepancies.len());
    } else {
        tracing::info!("No quota discrepancies found");
    }

    Ok(())
}

async fn run(settings: &Settings) -> quota_comparer::Result<ComparisonReport> {
    let http = settings.gcp.http_client()?;
    let directory = ResourceManagerDirectory::new(http.clone(), &settings.gcp.resource_manager_endpoint);
    let quotas = ComputeQuotaSource::new(http, &settings.gcp.compute_endpoint);

    QuotaComparer::new(directory, quotas)
        .compare(&settings.comparison_request())
        .await
}

fn write_report(settings: &Settings, report: &ComparisonReport) -> anyhow::Result<()> {
    match &settings.output.file {
        Some(path) => {
            report
                .write_to(path, settings.output.format)
                .with_context(|| format!("failed to write report to {}", path.display()))?;
            tracing::info!("Report saved to: {}", path.display());
        }
        None => {
            let rendered = report
                .render(settings.output.format)
                .context("failed to render report")?;
            println!("{}", rendered);
        }
    }
    Ok(())
}

fn exit_with(e: &QuotaComparerError) -> ! {
    tracing::error!(
        "Run aborted: {} (Category: {:?}, Severity: {:?})",
        e,
        e.category(),
        e.severity()
    );
    tracing::error!("Recovery suggestion: {}", e.recovery_suggestion());

    eprintln!("❌ {}", e.user_friendly_message());
    eprintln!("💡 {}", e.recovery_suggestion());

    std::process::exit(e.exit_code().max(1))
}
