//! Column and artifact name constants shared across the pipeline, store,
//! and CLI. The column names are the header spelling used by the membership
//! system's CSV export; the pipeline matches them verbatim after trimming.

// Required CSV columns
pub const PERIOD_COLUMN: &str = "PERIOD";
pub const CUSTOMER_COLUMN: &str = "CUSTOMER";
pub const LOCATION_COLUMN: &str = "LOCATION_DC";
pub const MEMBERSHIP_COLUMN: &str = "MEMBERSHIP_NCIX";

/// Every column the header line must contain before any row is processed.
pub const REQUIRED_COLUMNS: [&str; 4] = [
    PERIOD_COLUMN,
    CUSTOMER_COLUMN,
    LOCATION_COLUMN,
    MEMBERSHIP_COLUMN,
];

// Snapshot artifact names. Historical copies get a timestamp suffix; the
// latest pointer is a fixed name that is always overwritten.
pub const SNAPSHOT_PREFIX: &str = "members-";
pub const LATEST_SNAPSHOT_FILE: &str = "members-latest.json";
