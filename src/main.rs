//! CLI entry point for the mobilstats job.
//!
//! Recomputes mobile-subscription price statistics from the Webflow CMS
//! and publishes the aggregated figures and carrier badges back into it.

use anyhow::Result;
use chrono::Local;
use clap::Parser;
use mobilstats::{infra::webflow::WebflowClient, run::Collections, run::run};
use std::ffi::OsStr;
use std::path::Path;
use tracing_subscriber::{
    EnvFilter, Layer,
    fmt::{self, format::FmtSpan},
    layer::SubscriberExt,
    util::SubscriberInitExt,
};

#[derive(Parser)]
#[command(name = "mobilstats")]
#[command(about = "Recompute and publish mobile subscription price statistics", long_about = None)]
struct Cli {
    /// Compute and log the full report without writing anything back
    #[arg(long, default_value_t = false)]
    dry_run: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    dotenvy::dotenv().ok(); // Load .env file

    // Logging setup: colored stderr + JSON rolling log file
    let log_file_path =
        std::env::var("LOG_FILE_PATH").unwrap_or_else(|_| "logs/mobilstats.log".to_string());
    let log_dir = Path::new(&log_file_path)
        .parent()
        .unwrap_or(Path::new("logs"));
    let log_file_name = Path::new(&log_file_path)
        .file_name()
        .unwrap_or(OsStr::new("mobilstats.log"));

    let file_appender = tracing_appender::rolling::daily(log_dir, log_file_name);
    let (non_blocking_file, _file_guard) = tracing_appender::non_blocking(file_appender);

    let stderr_layer = fmt::layer()
        .with_target(true)
        .with_span_events(FmtSpan::CLOSE)
        .with_ansi(true)
        .with_writer(std::io::stderr)
        .with_filter(EnvFilter::from_env("RUST_LOG").add_directive("info".parse().unwrap()));

    let json_layer = fmt::layer()
        .json()
        .with_current_span(true)
        .with_span_list(true)
        .with_writer(non_blocking_file)
        .with_filter(EnvFilter::from_env("RUST_LOG_JSON").add_directive("debug".parse().unwrap()));

    tracing_subscriber::registry()
        .with(stderr_layer)
        .with(json_layer)
        .init();

    let cli = Cli::parse();

    let token =
        std::env::var("WEBFLOW_BEARER_TOKEN").expect("WEBFLOW_BEARER_TOKEN must be set");
    let client = WebflowClient::new(token)?;

    let today = Local::now().date_naive();
    run(&client, &Collections::default(), today, cli.dry_run).await?;

    Ok(())
}
