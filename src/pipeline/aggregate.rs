use chrono::Utc;
use serde::Serialize;
use tracing::debug;

use crate::constants::REQUIRED_COLUMNS;
use crate::domain::{Snapshot, SnapshotMetadata, Statistics};
use crate::error::{IngestError, Result};
use crate::gazetteer::Gazetteer;
use crate::pipeline::csv::CsvBatch;
use crate::pipeline::normalize::{normalize_row, RowRejection};

/// One rejected row, kept for operator-facing logs and the run report.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RowDiagnostic {
    /// 1-based position among the parsed data rows; equals the id the row
    /// would have carried.
    pub row: usize,
    pub rejection: RowRejection,
}

/// Aggregation result: the assembled snapshot plus per-row diagnostics.
#[derive(Debug)]
pub struct BatchOutput {
    pub snapshot: Snapshot,
    pub diagnostics: Vec<RowDiagnostic>,
}

/// Fail when any required column is missing from the header.
///
/// Extra columns are allowed and ignored; order does not matter. The error
/// lists exactly the absent names so the caller can surface them verbatim.
pub fn validate_headers(headers: &[String]) -> Result<()> {
    let missing: Vec<String> = REQUIRED_COLUMNS
        .iter()
        .filter(|required| !headers.iter().any(|h| h == *required))
        .map(|c| c.to_string())
        .collect();

    if missing.is_empty() {
        Ok(())
    } else {
        Err(IngestError::MissingColumns(missing))
    }
}

/// Run the normalizer over every row in file order and assemble a snapshot.
///
/// Per-row failures never abort the batch; they become `skipped` plus a
/// collected diagnostic. The whole batch fails only when the header is
/// unusable. Record order follows file order, so the output is a pure
/// function of the input text.
pub fn aggregate(batch: &CsvBatch, source_file: &str, source_checksum: &str) -> Result<BatchOutput> {
    validate_headers(&batch.headers)?;

    let header_width = batch.headers.len();
    let mut statistics = Statistics {
        total: batch.rows.len() as u64,
        ..Statistics::default()
    };
    let mut members = Vec::with_capacity(batch.rows.len());
    let mut diagnostics = Vec::new();

    for (index, row) in batch.rows.iter().enumerate() {
        match normalize_row(row, index, header_width) {
            Ok(record) => {
                debug!(
                    "Row {} accepted: {} at {}",
                    index + 1,
                    record.customer,
                    record.location_key
                );
                statistics.processed += 1;
                *statistics
                    .members_by_location
                    .entry(record.location_key.clone())
                    .or_insert(0) += 1;
                statistics.membership_types.record(record.membership_type);
                members.push(record);
            }
            Err(rejection) => {
                statistics.skipped += 1;
                diagnostics.push(RowDiagnostic {
                    row: index + 1,
                    rejection,
                });
            }
        }
    }

    let snapshot = Snapshot {
        metadata: SnapshotMetadata {
            processed_at: Utc::now(),
            source_file: source_file.to_string(),
            source_checksum: source_checksum.to_string(),
            total_records: members.len() as u64,
            statistics,
        },
        locations: Gazetteer::global().entries().to_vec(),
        members,
    };

    Ok(BatchOutput {
        snapshot,
        diagnostics,
    })
}
