use axum::body::Bytes;
use axum::extract::State;
use axum::http::{header, StatusCode};
use axum::response::IntoResponse;
use axum::routing::{get, post};
use axum::{Json, Router};
use axum_prometheus::PrometheusMetricLayer;
use benefits_ai::config::AppConfig;
use benefits_ai::error::AppError;
use benefits_ai::telemetry;
use benefits_ai::workflows::benefits::BenefitRecord;
use benefits_ai::workflows::ingest::{IngestError, SourceBundle};
use benefits_ai::workflows::narrative::UnavailableNarrator;
use benefits_ai::workflows::pipeline::{
    BenefitsPipeline, PipelineError, PipelineOutput, ProcessReport,
};
use chrono::Local;
use clap::{Args, Parser, Subcommand};
use metrics_exporter_prometheus::PrometheusHandle;
use serde_json::json;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use tracing::info;

#[derive(Clone)]
struct AppState {
    readiness: Arc<AtomicBool>,
    metrics: PrometheusHandle,
    pipeline: Arc<BenefitsPipeline>,
    narrative_enabled: bool,
}

#[derive(Parser, Debug)]
#[command(
    name = "Benefits Eligibility Orchestrator",
    about = "Compute employee benefit eligibility and payouts from spreadsheet bundles",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Start the HTTP service (default command)
    Serve(ServeArgs),
    /// Run the benefits workflows from the command line
    Benefits {
        #[command(subcommand)]
        command: BenefitsCommand,
    },
}

#[derive(Args, Debug, Default)]
struct ServeArgs {
    /// Override the configured host for the HTTP server
    #[arg(long)]
    host: Option<String>,
    /// Override the configured port for the HTTP server
    #[arg(long)]
    port: Option<u16>,
}

#[derive(Subcommand, Debug)]
enum BenefitsCommand {
    /// Process a bundle and print the eligibility report
    Report(BenefitsReportArgs),
}

#[derive(Args, Debug)]
struct BenefitsReportArgs {
    /// Bundle to process: a ZIP archive or a directory of CSV/XLSX files
    #[arg(long)]
    bundle: PathBuf,
    /// Include the full per-employee listing in the output
    #[arg(long)]
    list_records: bool,
    /// Write the computed table plus a summary digest section to a CSV file
    #[arg(long)]
    export_csv: Option<PathBuf>,
    /// Ask the configured collaborator for narrative sections
    #[arg(long)]
    narrative: bool,
}

#[tokio::main]
async fn main() {
    if let Err(err) = run_cli().await {
        eprintln!("application error: {err}");
        std::process::exit(1);
    }
}

async fn run_cli() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Serve(ServeArgs::default()));

    match command {
        Command::Serve(args) => run_server(args).await,
        Command::Benefits {
            command: BenefitsCommand::Report(args),
        } => run_benefits_report(args),
    }
}

async fn run_server(mut args: ServeArgs) -> Result<(), AppError> {
    let mut config = AppConfig::load()?;

    if let Some(host) = args.host.take() {
        config.server.host = host;
    }
    if let Some(port) = args.port.take() {
        config.server.port = port;
    }

    telemetry::init(&config.telemetry)?;

    let (prometheus_layer, prometheus_handle) = PrometheusMetricLayer::pair();
    let readiness_flag = Arc::new(AtomicBool::new(false));
    let state = AppState {
        readiness: readiness_flag.clone(),
        metrics: prometheus_handle,
        pipeline: Arc::new(BenefitsPipeline::with_standard_policy()),
        narrative_enabled: config.narrative.enabled,
    };

    let app = app_router(state).layer(prometheus_layer);

    let addr = config.server.socket_addr()?;
    let listener = tokio::net::TcpListener::bind(addr).await?;
    readiness_flag.store(true, Ordering::Release);

    info!(?config.environment, %addr, "benefits orchestrator ready");

    axum::serve(listener, app).await?;
    Ok(())
}

fn app_router(state: AppState) -> Router {
    Router::new()
        .route("/health", get(healthcheck))
        .route("/ready", get(readiness_endpoint))
        .route("/metrics", get(metrics_endpoint))
        .route("/api/v1/benefits/process", post(process_bundle_endpoint))
        .with_state(state)
}

async fn healthcheck() -> Json<serde_json::Value> {
    Json(json!({ "status": "ok" }))
}

async fn readiness_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    let ready = state.readiness.load(Ordering::Relaxed);
    let status = if ready {
        StatusCode::OK
    } else {
        StatusCode::SERVICE_UNAVAILABLE
    };

    let payload = if ready {
        json!({ "status": "ready" })
    } else {
        json!({ "status": "initializing" })
    };

    (status, Json(payload))
}

async fn metrics_endpoint(State(state): State<AppState>) -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/plain; version=0.0.4")],
        state.metrics.render(),
    )
}

/// Takes the uploaded ZIP bundle as the raw request body and always answers
/// with the tagged process report; data problems surface inside the report,
/// not as HTTP errors.
async fn process_bundle_endpoint(
    State(state): State<AppState>,
    body: Bytes,
) -> Json<ProcessReport> {
    let result = match SourceBundle::from_zip_bytes(&body) {
        Ok(bundle) if state.narrative_enabled => state
            .pipeline
            .process_with_narrative(bundle, &UnavailableNarrator),
        Ok(bundle) => state.pipeline.process(bundle),
        Err(err) => Err(PipelineError::Ingest(IngestError::Extraction(err))),
    };

    Json(ProcessReport::from(result))
}

fn run_benefits_report(args: BenefitsReportArgs) -> Result<(), AppError> {
    let BenefitsReportArgs {
        bundle,
        list_records,
        export_csv,
        narrative,
    } = args;

    let pipeline = BenefitsPipeline::with_standard_policy();
    let source = SourceBundle::from_path(&bundle)
        .map_err(|err| PipelineError::Ingest(IngestError::Extraction(err)))?;

    let output = if narrative {
        pipeline.process_with_narrative(source, &UnavailableNarrator)?
    } else {
        pipeline.process(source)?
    };

    render_benefits_report(&output, list_records);

    if let Some(path) = export_csv {
        write_csv_export(&path, &output)?;
        println!("\nComputed table exported to {}", path.display());
    }

    Ok(())
}

fn render_benefits_report(output: &PipelineOutput, list_records: bool) {
    println!("Benefits eligibility report");
    println!("Generated {}", Local::now().format("%Y-%m-%d %H:%M:%S"));

    let diagnostics = &output.diagnostics;
    println!(
        "\nSources: {} file(s) read, {} skipped, {} unified record(s)",
        diagnostics.files_read, diagnostics.files_skipped, diagnostics.total_records
    );
    println!("Columns: {}", diagnostics.columns.join(", "));

    let summary = &output.summary;
    println!("\nSummary");
    println!("- Total employees: {}", summary.total_count);
    println!("- Eligible: {}", summary.eligible_count);
    println!("- Ineligible: {}", summary.ineligible_count);
    println!("- Total benefit amount: {:.2}", summary.total_amount);

    println!("\nBreakdown by group");
    for entry in &summary.group_breakdown {
        println!(
            "- {}: {} eligible, total {:.2}",
            entry.group, entry.eligible_count, entry.total_amount
        );
    }

    if output.histogram.is_empty() {
        println!("\nExclusion reasons: none");
    } else {
        println!("\nExclusion reasons");
        for (reason, count) in &output.histogram {
            println!("- {}: {}", reason, count);
        }
    }

    if let Some(narrative) = &output.narrative {
        println!("\nDetailed analysis\n{}", narrative.detailed_analysis);
        println!("\nExecutive summary\n{}", narrative.executive_summary);
        println!(
            "\nEligibility criteria\n{}",
            narrative.eligibility_explanation
        );
    }

    if list_records {
        println!("\nEmployee records");
        for record in &output.records {
            let id = record.employee_id.as_deref().unwrap_or("-");
            let group = record.group.as_deref().unwrap_or("-");
            let status = if record.eligible {
                format!("eligible, final {:.2}", record.final_amount)
            } else {
                format!("ineligible ({})", record.exclusion_reasons.join("; "))
            };
            println!("- {} | group {} | {}", id, group, status);
        }
    }
}

const EXPORT_COLUMNS: &[&str] = &[
    "employee_id",
    "company",
    "role",
    "status",
    "group",
    "base_amount",
    "eligible",
    "exclusion_reasons",
    "adjustment",
    "final_amount",
];

/// Writes the computed table followed by a blank line and the four-line
/// summary digest, the delimited-text equivalent of the original export's
/// second sheet.
fn write_csv_export(path: &PathBuf, output: &PipelineOutput) -> Result<(), AppError> {
    let mut writer = csv::WriterBuilder::new().flexible(true).from_path(path)?;

    let extra_columns = extra_column_union(&output.records);
    let mut header: Vec<String> = EXPORT_COLUMNS.iter().map(|c| c.to_string()).collect();
    header.extend(extra_columns.iter().cloned());
    writer.write_record(&header)?;

    for record in &output.records {
        let mut cells = vec![
            record.employee_id.clone().unwrap_or_default(),
            record.company.clone().unwrap_or_default(),
            record.role.clone().unwrap_or_default(),
            record.status.clone().unwrap_or_default(),
            record.group.clone().unwrap_or_default(),
            format!("{:.2}", record.base_amount),
            record.eligible.to_string(),
            record.exclusion_reasons.join("; "),
            format!("{:.2}", record.adjustment),
            format!("{:.2}", record.final_amount),
        ];
        for column in &extra_columns {
            cells.push(record.extras.get(column).cloned().unwrap_or_default());
        }
        writer.write_record(&cells)?;
    }

    let summary = &output.summary;
    writer.write_record([""])?;
    writer.write_record([
        "Total employees".to_string(),
        summary.total_count.to_string(),
    ])?;
    writer.write_record([
        "Eligible employees".to_string(),
        summary.eligible_count.to_string(),
    ])?;
    writer.write_record([
        "Ineligible employees".to_string(),
        summary.ineligible_count.to_string(),
    ])?;
    writer.write_record([
        "Total benefit amount".to_string(),
        format!("{:.2}", summary.total_amount),
    ])?;
    writer.flush().map_err(AppError::Io)?;

    Ok(())
}

fn extra_column_union(records: &[BenefitRecord]) -> Vec<String> {
    let mut columns: Vec<String> = Vec::new();
    for record in records {
        for name in record.extras.keys() {
            if !columns.iter().any(|existing| existing == name) {
                columns.push(name.clone());
            }
        }
    }
    columns
}
