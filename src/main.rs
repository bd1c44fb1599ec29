use clap::{Parser, Subcommand};
use std::path::PathBuf;
use std::sync::Arc;
use tracing::{error, info};

use ncix_ingest::config::AppConfig;
use ncix_ingest::domain::Snapshot;
use ncix_ingest::logging;
use ncix_ingest::membership::MembershipTier;
use ncix_ingest::metrics::init_metrics;
use ncix_ingest::pipeline::Ingestor;
use ncix_ingest::server;
use ncix_ingest::storage::{FsSnapshotStore, SnapshotStore};

#[derive(Parser)]
#[command(name = "ncix_ingest")]
#[command(about = "NCIX membership CSV ingestion and classification pipeline")]
#[command(version = "0.1.0")]
struct Cli {
    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
enum Commands {
    /// Ingest one CSV export and persist the resulting snapshot
    Process {
        /// Path to the CSV file to ingest
        #[arg(long)]
        input: PathBuf,
        /// Override the snapshot output directory
        #[arg(long)]
        data_dir: Option<String>,
    },
    /// Serve the upload and dashboard-data HTTP API
    Serve {
        /// Override the listen port
        #[arg(long)]
        port: Option<u16>,
        /// Override the snapshot output directory
        #[arg(long)]
        data_dir: Option<String>,
    },
    /// Summarize the latest persisted snapshot
    Show {
        /// Override the snapshot output directory
        #[arg(long)]
        data_dir: Option<String>,
    },
}

fn build_store(config: &AppConfig, data_dir_override: Option<String>) -> Arc<FsSnapshotStore> {
    let data_dir = data_dir_override.unwrap_or_else(|| config.data_dir.clone());
    Arc::new(
        FsSnapshotStore::new(data_dir)
            .keep_history(config.keep_history)
            .max_age_days(config.max_snapshot_age_days),
    )
}

fn print_summary(snapshot: &Snapshot) {
    let stats = &snapshot.metadata.statistics;

    println!("📈 Latest snapshot: {}", snapshot.metadata.source_file);
    println!("   Processed at: {}", snapshot.metadata.processed_at);
    println!("   Checksum: {}", snapshot.metadata.source_checksum);
    println!("   Members: {}", snapshot.metadata.total_records);
    println!("   Rows skipped at ingest: {}", stats.skipped);

    println!("\n   Tier distribution:");
    for tier in MembershipTier::ALL {
        println!("   {:>10}: {}", tier.label(), stats.membership_types.get(tier));
    }
    println!("   Top class: {}", stats.membership_types.top_class());

    let mut by_location: Vec<(&String, &u64)> = stats.members_by_location.iter().collect();
    by_location.sort_by(|a, b| b.1.cmp(a.1).then_with(|| a.0.cmp(b.0)));

    println!("\n   Top locations:");
    for (key, count) in by_location.into_iter().take(5) {
        println!("   {count:>5}  {key}");
    }
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    dotenv::dotenv().ok();
    logging::init_logging();

    let cli = Cli::parse();
    let config = AppConfig::load()?;

    match cli.command {
        Commands::Process { input, data_dir } => {
            println!("🔄 Processing {}...", input.display());

            let csv_text = std::fs::read_to_string(&input)?;
            let source_file = input
                .file_name()
                .map(|name| name.to_string_lossy().to_string())
                .unwrap_or_else(|| input.display().to_string());
            let store = build_store(&config, data_dir);

            match Ingestor::run(&csv_text, &source_file, store).await {
                Ok(report) => {
                    info!("Ingestion run {} finished", report.run_id);
                    println!("\n📊 Ingestion report for {}:", report.source_file);
                    println!("   Run id: {}", report.run_id);
                    println!("   Total rows: {}", report.statistics.total);
                    println!("   Processed: {}", report.statistics.processed);
                    println!("   Skipped: {}", report.statistics.skipped);
                    println!("   Checksum: {}", report.source_checksum);
                    println!("   Output file: {}", report.output_file);

                    if !report.diagnostics.is_empty() {
                        println!("\n⚠️  Skipped rows:");
                        for diagnostic in &report.diagnostics {
                            println!("   - row {}: {}", diagnostic.row, diagnostic.rejection);
                        }
                    }
                }
                Err(e) => {
                    error!("Ingestion failed: {}", e);
                    println!("❌ Ingestion failed: {e}");
                    std::process::exit(1);
                }
            }
        }
        Commands::Serve { port, data_dir } => {
            init_metrics();

            let port = port.unwrap_or(config.server.port);
            let store: Arc<dyn SnapshotStore> = build_store(&config, data_dir);
            server::start_server(store, port).await?;
        }
        Commands::Show { data_dir } => {
            let store = build_store(&config, data_dir);
            match store.load_latest().await? {
                Some(snapshot) => print_summary(&snapshot),
                None => println!("ℹ️  No snapshot persisted yet"),
            }
        }
    }

    Ok(())
}
