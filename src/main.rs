//! Skillboard - Team Knowledge Dashboard CLI
//!
//! Fetches employees, the knowledge catalog, and employee-knowledge links
//! from an HR backend and generates a dashboard analytics report.
//!
//! Exit codes:
//!   0 - Success
//!   1 - Runtime error (connection, config, write failure, etc.)
//!   2 - Alerts found at or above the --fail-on priority

mod analytics;
mod api;
mod cli;
mod config;
mod models;
mod report;

use anyhow::{Context, Result};
use chrono::Utc;
use cli::{Args, OutputFormat};
use config::Config;
use indicatif::{ProgressBar, ProgressStyle};
use models::{AlertPriority, ReportDocument, ReportMetadata};
use std::path::PathBuf;
use std::time::{Duration, Instant};
use tracing::{debug, error, info, warn};
use tracing_subscriber::FmtSubscriber;

#[tokio::main]
async fn main() -> Result<()> {
    // Parse command-line arguments
    let args = Args::parse_args();

    // Validate arguments
    if let Err(e) = args.validate() {
        eprintln!("Error: {}", e);
        std::process::exit(1);
    }

    // Handle --init-config early (no logging needed)
    if args.init_config {
        return handle_init_config();
    }

    // Initialize logging
    init_logging(&args);

    info!("Skillboard v{}", env!("CARGO_PKG_VERSION"));
    debug!("Arguments: {:?}", args);

    // Generate the dashboard
    match run_dashboard(args).await {
        Ok(exit_code) => {
            std::process::exit(exit_code);
        }
        Err(e) => {
            error!("Dashboard generation failed: {}", e);
            eprintln!("\n❌ Error: {}", e);
            std::process::exit(1);
        }
    }
}

/// Handle --init-config: generate a default .skillboard.toml.
fn handle_init_config() -> Result<()> {
    let path = std::path::Path::new(".skillboard.toml");

    if path.exists() {
        eprintln!("⚠️  .skillboard.toml already exists. Remove it first or edit it manually.");
        std::process::exit(1);
    }

    let content = Config::default_toml();
    std::fs::write(path, &content).context("Failed to write .skillboard.toml")?;

    println!("✅ Created .skillboard.toml with default settings.");
    println!("   Edit it to customize the backend URL, timeout, and report sections.");
    Ok(())
}

/// Initialize logging based on verbosity settings.
fn init_logging(args: &Args) {
    let level = args.log_level();

    let subscriber = FmtSubscriber::builder()
        .with_max_level(level)
        .with_target(false)
        .with_thread_ids(false)
        .with_file(false)
        .with_line_number(false)
        .compact()
        .finish();

    tracing::subscriber::set_global_default(subscriber).expect("Failed to set tracing subscriber");
}

/// Run the complete dashboard workflow. Returns exit code (0 or 2).
async fn run_dashboard(args: Args) -> Result<i32> {
    let start_time = Instant::now();

    // Load configuration
    let mut config = load_config(&args)?;
    config.merge_with_args(&args);

    let base_url = config.api.base_url.clone();

    // Step 1: Fetch the three collections
    println!("📡 Fetching data from: {}", base_url);

    let client = api::ApiClient::new(api::ApiClientConfig {
        base_url: base_url.clone(),
        timeout_seconds: config.api.timeout_seconds,
        retries: config.api.retries,
        token: config.api.token.clone(),
    });

    let spinner = fetch_spinner(!args.quiet);
    let snapshot = client.fetch_snapshot().await;
    if let Some(pb) = spinner {
        pb.finish_and_clear();
    }

    if snapshot.is_partial() {
        warn!(
            "Backend delivered partial data, report will be best-effort: {}",
            snapshot.unavailable_names().join(", ")
        );
        println!(
            "⚠️  Partial data — unavailable: {}",
            snapshot.unavailable_names().join(", ")
        );
    }

    println!("   Knowledge items: {}", snapshot.knowledge.len());
    println!("   Employees: {}", snapshot.employees.len());
    println!("   Links: {}", snapshot.links.len());

    // Handle --dry-run: fetch counts only, no report
    if args.dry_run {
        println!("\n✅ Dry run complete. No report was written.");
        return Ok(0);
    }

    // Step 2: Compute the analytics
    println!("\n📊 Computing analytics...");
    let analytics = analytics::compute_analytics(
        &snapshot.knowledge,
        &snapshot.employees,
        &snapshot.links,
        Utc::now(),
    );

    // Step 3: Build the report document
    let duration = start_time.elapsed().as_secs_f64();
    let metadata = ReportMetadata {
        base_url,
        generated_at: Utc::now(),
        duration_seconds: duration,
        unavailable_collections: snapshot.unavailable_names(),
    };

    let document = ReportDocument {
        metadata,
        analytics,
    };

    // Step 4: Generate and save the report
    println!("📝 Generating report...");

    let output_path = args
        .output
        .clone()
        .unwrap_or_else(|| PathBuf::from(&config.general.output));

    let output = match args.format {
        OutputFormat::Json => report::generate_json_report(&document)?,
        OutputFormat::Markdown => report::generate_markdown_report(&document, &config.report),
    };

    std::fs::write(&output_path, &output)
        .with_context(|| format!("Failed to write report to {}", output_path.display()))?;

    // Print summary
    print_summary(&document);
    println!(
        "\n✅ Dashboard report saved to: {}",
        output_path.display()
    );

    // Check --fail-on threshold
    if let Some(fail_level) = args.fail_on {
        let threshold: AlertPriority = fail_level.into();
        let has_alerts_above = document
            .analytics
            .alerts
            .iter()
            .any(|alert| alert.priority >= threshold);

        if has_alerts_above {
            eprintln!(
                "\n⛔ Alerts found at or above {:?} priority. Failing (exit code 2).",
                fail_level
            );
            return Ok(2);
        }
    }

    Ok(0)
}

/// Console summary of the generated dashboard.
fn print_summary(document: &ReportDocument) {
    let analytics = &document.analytics;

    println!("\n📈 Dashboard Summary:");
    println!(
        "   Coverage: {}% ({} of {} links obtained)",
        analytics.coverage_rate, analytics.total_obtained, analytics.total_links
    );
    println!("   Teams: {}", analytics.team_coverage.len());
    println!(
        "   Expiring certifications (30 days): {}",
        analytics.total_expiring
    );

    if analytics.alerts.is_empty() {
        println!("   Alerts: none");
    } else {
        for alert in &analytics.alerts {
            println!("   {} {}", alert.priority.emoji(), alert.title);
        }
    }
}

/// Spinner shown while waiting on the backend.
fn fetch_spinner(show: bool) -> Option<ProgressBar> {
    if !show {
        return None;
    }

    let pb = ProgressBar::new_spinner();
    pb.set_style(
        ProgressStyle::default_spinner()
            .template("{spinner:.green} {msg}")
            .unwrap()
            .tick_chars("⠁⠂⠄⡀⢀⠠⠐⠈ "),
    );
    pb.set_message("Waiting for the backend...");
    pb.enable_steady_tick(Duration::from_millis(100));
    Some(pb)
}

/// Load configuration from file or use defaults.
fn load_config(args: &Args) -> Result<Config> {
    // Try explicit config path
    if let Some(ref config_path) = args.config {
        info!("Loading config from: {}", config_path.display());
        return Config::load(config_path);
    }

    // Try default location
    match Config::load_default() {
        Ok(Some(config)) => {
            info!("Loaded default config from .skillboard.toml");
            Ok(config)
        }
        Ok(None) => {
            debug!("No config file found, using defaults");
            Ok(Config::default())
        }
        Err(e) => {
            warn!("Failed to load config: {}", e);
            Ok(Config::default())
        }
    }
}
