use serde::Serialize;
use std::fmt;

use crate::constants::{CUSTOMER_COLUMN, LOCATION_COLUMN, MEMBERSHIP_COLUMN, PERIOD_COLUMN};
use crate::domain::MemberRecord;
use crate::gazetteer::Gazetteer;
use crate::membership;
use crate::pipeline::csv::RawRow;

/// Why a row produced no record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum RowRejection {
    /// The row carried more fields than the header, which means an unquoted
    /// delimiter shifted values out of their columns.
    ExtraFields { expected: usize, actual: usize },
    /// A required field was absent or blank after trimming.
    MissingField { column: &'static str },
    /// The location text matched no gazetteer entry.
    UnknownLocation {
        customer: String,
        raw_location: String,
    },
}

impl fmt::Display for RowRejection {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            RowRejection::ExtraFields { expected, actual } => {
                write!(f, "row has {actual} fields but the header has {expected}")
            }
            RowRejection::MissingField { column } => {
                write!(f, "required field {column} is blank")
            }
            RowRejection::UnknownLocation {
                customer,
                raw_location,
            } => {
                write!(f, "unknown location \"{raw_location}\" for customer {customer}")
            }
        }
    }
}

/// Normalize one raw row into a member record, or reject it whole.
///
/// `row_index` is the 0-based position among parsed data rows and fixes the
/// record id at `row_index + 1`, so a rejected row consumes an id slot
/// without emitting a record. There are no partial records: missing
/// coordinates are never defaulted.
pub fn normalize_row(
    row: &RawRow,
    row_index: usize,
    header_width: usize,
) -> std::result::Result<MemberRecord, RowRejection> {
    if row.width() > header_width {
        return Err(RowRejection::ExtraFields {
            expected: header_width,
            actual: row.width(),
        });
    }

    let customer = row.get(CUSTOMER_COLUMN);
    if customer.is_empty() {
        return Err(RowRejection::MissingField {
            column: CUSTOMER_COLUMN,
        });
    }

    let raw_location = row.get(LOCATION_COLUMN);
    if raw_location.is_empty() {
        return Err(RowRejection::MissingField {
            column: LOCATION_COLUMN,
        });
    }

    let entry =
        Gazetteer::global()
            .resolve(raw_location)
            .ok_or_else(|| RowRejection::UnknownLocation {
                customer: customer.to_string(),
                raw_location: raw_location.to_string(),
            })?;

    let membership_raw = row.get(MEMBERSHIP_COLUMN);
    Ok(MemberRecord {
        id: (row_index + 1) as u64,
        period: row.get(PERIOD_COLUMN).to_string(),
        customer: customer.to_string(),
        location_key: entry.key.clone(),
        location_display: entry.city.clone(),
        region: entry.region.clone(),
        latitude: entry.lat,
        longitude: entry.lng,
        membership_type: membership::classify(membership_raw),
        membership_raw: membership_raw.to_string(),
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::membership::MembershipTier;

    fn row(period: &str, customer: &str, location: &str, membership: &str) -> RawRow {
        RawRow::from_pairs(&[
            ("PERIOD", period),
            ("CUSTOMER", customer),
            ("LOCATION_DC", location),
            ("MEMBERSHIP_NCIX", membership),
        ])
    }

    #[test]
    fn test_normalize_happy_path() {
        let record = normalize_row(
            &row("202412", "Acme Corp", "JAKARTA MERUYA", "Membership Class A"),
            0,
            4,
        )
        .unwrap();

        assert_eq!(record.id, 1);
        assert_eq!(record.period, "202412");
        assert_eq!(record.customer, "Acme Corp");
        assert_eq!(record.location_key, "JAKARTA MERUYA");
        assert_eq!(record.location_display, "Jakarta");
        assert_eq!(record.region, "DKI Jakarta");
        assert_eq!(record.latitude, -6.1951);
        assert_eq!(record.longitude, 106.7328);
        assert_eq!(record.membership_type, MembershipTier::ClassA);
        assert_eq!(record.membership_raw, "Membership Class A");
    }

    #[test]
    fn test_normalize_id_follows_row_index() {
        let record = normalize_row(&row("202412", "Acme", "MALANG", ""), 41, 4).unwrap();
        assert_eq!(record.id, 42);
    }

    #[test]
    fn test_blank_membership_becomes_non_member() {
        let record = normalize_row(&row("202412", "Acme", "CIREBON", ""), 0, 4).unwrap();
        assert_eq!(record.membership_type, MembershipTier::NonMember);
        assert_eq!(record.membership_raw, "");
    }

    #[test]
    fn test_blank_customer_is_rejected() {
        let err = normalize_row(&row("202412", "", "JAKARTA MERUYA", "x"), 0, 4).unwrap_err();
        assert_eq!(err, RowRejection::MissingField { column: "CUSTOMER" });
    }

    #[test]
    fn test_blank_location_is_rejected() {
        let err = normalize_row(&row("202412", "Acme", "", "x"), 0, 4).unwrap_err();
        assert_eq!(
            err,
            RowRejection::MissingField {
                column: "LOCATION_DC"
            }
        );
    }

    #[test]
    fn test_unknown_location_carries_diagnostics() {
        let err = normalize_row(&row("202412", "Acme", "ATLANTIS DC", "x"), 0, 4).unwrap_err();
        assert_eq!(
            err,
            RowRejection::UnknownLocation {
                customer: "Acme".to_string(),
                raw_location: "ATLANTIS DC".to_string(),
            }
        );
        assert_eq!(
            err.to_string(),
            "unknown location \"ATLANTIS DC\" for customer Acme"
        );
    }

    #[test]
    fn test_overlong_row_is_rejected() {
        let batch = crate::pipeline::csv::parse_csv(
            "PERIOD,CUSTOMER,LOCATION_DC,MEMBERSHIP_NCIX\n202412,Acme, Inc,JAKARTA MERUYA,Member\n",
        )
        .unwrap();
        let err = normalize_row(&batch.rows[0], 0, batch.headers.len()).unwrap_err();
        assert_eq!(
            err,
            RowRejection::ExtraFields {
                expected: 4,
                actual: 5
            }
        );
    }

    #[test]
    fn test_location_resolution_tolerates_noise() {
        let record =
            normalize_row(&row("202412", "Acme", "ncix jakarta meruya lt 2", "Member"), 0, 4)
                .unwrap();
        assert_eq!(record.location_key, "JAKARTA MERUYA");
    }
}
