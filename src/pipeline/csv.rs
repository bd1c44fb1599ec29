use std::collections::HashMap;

use crate::error::{IngestError, Result};

/// One parsed data row: header-keyed values plus the raw field count.
///
/// Values are trimmed at parse time. Missing trailing fields read as empty
/// strings; `width` keeps the raw field count so a row wider than the
/// header can be rejected downstream instead of silently dropping fields.
#[derive(Debug, Clone)]
pub struct RawRow {
    values: HashMap<String, String>,
    width: usize,
}

impl RawRow {
    /// Value under a header name, empty string when absent.
    pub fn get(&self, column: &str) -> &str {
        self.values.get(column).map(String::as_str).unwrap_or("")
    }

    pub fn width(&self) -> usize {
        self.width
    }

    #[cfg(test)]
    pub fn from_pairs(pairs: &[(&str, &str)]) -> Self {
        Self {
            values: pairs
                .iter()
                .map(|(k, v)| (k.to_string(), v.to_string()))
                .collect(),
            width: pairs.len(),
        }
    }
}

/// Header plus data rows, in file order.
#[derive(Debug)]
pub struct CsvBatch {
    pub headers: Vec<String>,
    pub rows: Vec<RawRow>,
}

/// Tokenize CSV text into a header and positionally mapped rows.
///
/// RFC 4180 quoting is honored, so a quoted field may carry embedded commas
/// or newlines without shifting its neighbors. Headers and values are
/// trimmed; blank lines are skipped. Fails with `EmptyInput` when the text
/// holds no header line at all.
pub fn parse_csv(input: &str) -> Result<CsvBatch> {
    if input.trim().is_empty() {
        return Err(IngestError::EmptyInput);
    }

    let mut reader = csv::ReaderBuilder::new()
        .flexible(true)
        .trim(csv::Trim::All)
        .from_reader(input.as_bytes());

    let headers: Vec<String> = reader.headers()?.iter().map(|h| h.to_string()).collect();

    let mut rows = Vec::with_capacity(16);
    for record in reader.records() {
        let record = record?;
        // A whitespace-only line tokenizes as a single empty field.
        if record.len() <= 1 && record.iter().all(|f| f.is_empty()) {
            continue;
        }

        let mut values = HashMap::with_capacity(headers.len());
        for (idx, header) in headers.iter().enumerate() {
            values.insert(header.clone(), record.get(idx).unwrap_or("").to_string());
        }
        rows.push(RawRow {
            values,
            width: record.len(),
        });
    }

    Ok(CsvBatch { headers, rows })
}
