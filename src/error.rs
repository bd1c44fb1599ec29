use thiserror::Error;

/// Whole-batch and infrastructure failures. Per-row problems never surface
/// here; they are folded into statistics as skips (see `pipeline::normalize`).
#[derive(Error, Debug)]
pub enum IngestError {
    #[error("CSV input is empty or has no header line")]
    EmptyInput,

    #[error("missing required columns: {}", .0.join(", "))]
    MissingColumns(Vec<String>),

    #[error("CSV read failed: {0}")]
    Csv(#[from] csv::Error),

    #[error("JSON serialization failed: {0}")]
    Json(#[from] serde_json::Error),

    #[error("TOML deserialization failed: {0}")]
    Toml(#[from] toml::de::Error),

    #[error("I/O error: {0}")]
    Io(#[from] std::io::Error),

    #[error("Configuration error: {0}")]
    Config(String),
}

pub type Result<T> = std::result::Result<T, IngestError>;
