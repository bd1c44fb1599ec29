// CSV ingestion pipeline: tokenize, normalize, aggregate, persist

pub mod aggregate;
pub mod csv;
pub mod normalize;

pub use aggregate::{aggregate, validate_headers, BatchOutput, RowDiagnostic};
pub use csv::{parse_csv, CsvBatch, RawRow};
pub use normalize::{normalize_row, RowRejection};

use metrics::{counter, histogram};
use serde::Serialize;
use sha2::{Digest, Sha256};
use std::sync::Arc;
use tracing::{info, instrument, warn};
use uuid::Uuid;

use crate::domain::Statistics;
use crate::error::Result;
use crate::storage::SnapshotStore;

/// Result of one complete ingestion run.
#[derive(Debug, Serialize)]
pub struct IngestReport {
    pub run_id: Uuid,
    pub source_file: String,
    pub source_checksum: String,
    pub statistics: Statistics,
    pub diagnostics: Vec<RowDiagnostic>,
    pub output_file: String,
}

pub struct Ingestor;

impl Ingestor {
    /// Run the full pipeline over one CSV document and persist the result.
    ///
    /// Fails wholesale for unusable input (`EmptyInput`, `MissingColumns`)
    /// and for store errors; per-row problems surface as skip diagnostics in
    /// the report instead.
    #[instrument(skip(csv_text, store))]
    pub async fn run(
        csv_text: &str,
        source_file: &str,
        store: Arc<dyn SnapshotStore>,
    ) -> Result<IngestReport> {
        let run_id = Uuid::new_v4();
        info!("🚀 Starting ingestion run {} for {}", run_id, source_file);
        counter!("ncix_ingest_runs_total").increment(1);
        let t_run = std::time::Instant::now();

        let source_checksum = hex::encode(Sha256::digest(csv_text.as_bytes()));

        let batch = parse_csv(csv_text)?;
        info!("📄 Parsed {} data rows", batch.rows.len());

        let output = aggregate(&batch, source_file, &source_checksum)?;
        for diagnostic in &output.diagnostics {
            warn!("Row {} skipped: {}", diagnostic.row, diagnostic.rejection);
        }
        let statistics = output.snapshot.metadata.statistics.clone();
        info!(
            "✅ Processed {} records, skipped {}",
            statistics.processed, statistics.skipped
        );
        counter!("ncix_rows_processed_total").increment(statistics.processed);
        counter!("ncix_rows_skipped_total").increment(statistics.skipped);

        let persisted = store.persist(&output.snapshot).await?;
        info!(
            "💾 Saved snapshot to {} and {}",
            persisted.snapshot_file, persisted.latest_file
        );

        histogram!("ncix_ingest_duration_seconds").record(t_run.elapsed().as_secs_f64());

        Ok(IngestReport {
            run_id,
            source_file: source_file.to_string(),
            source_checksum,
            statistics,
            diagnostics: output.diagnostics,
            output_file: persisted.snapshot_file,
        })
    }
}
