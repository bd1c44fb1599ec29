use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;

use crate::gazetteer::LocationEntry;
use crate::membership::MembershipTier;

/// One normalized membership row as it appears in a persisted snapshot.
///
/// Field names follow the dashboard's wire contract. `id` is the 1-based
/// position of the source row among all parsed rows; rejected rows consume a
/// position but emit no record, so ids keep their file position rather than
/// being renumbered densely.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct MemberRecord {
    pub id: u64,
    pub period: String,
    pub customer: String,
    #[serde(rename = "location")]
    pub location_key: String,
    pub location_display: String,
    pub region: String,
    pub latitude: f64,
    pub longitude: f64,
    pub membership_type: MembershipTier,
    pub membership_raw: String,
}

/// Per-tier counters, serialized under the tier display labels.
///
/// All five keys are always present in the document, zeroes included, so
/// consumers never have to guard against a missing key.
#[derive(Debug, Clone, Copy, Default, Serialize, Deserialize, PartialEq, Eq)]
pub struct TierCounts {
    #[serde(rename = "Class A")]
    pub class_a: u64,
    #[serde(rename = "Class B")]
    pub class_b: u64,
    #[serde(rename = "Class C")]
    pub class_c: u64,
    #[serde(rename = "Member")]
    pub member: u64,
    #[serde(rename = "Non-Member")]
    pub non_member: u64,
}

impl TierCounts {
    pub fn record(&mut self, tier: MembershipTier) {
        *self.slot_mut(tier) += 1;
    }

    pub fn get(&self, tier: MembershipTier) -> u64 {
        match tier {
            MembershipTier::ClassA => self.class_a,
            MembershipTier::ClassB => self.class_b,
            MembershipTier::ClassC => self.class_c,
            MembershipTier::Member => self.member,
            MembershipTier::NonMember => self.non_member,
        }
    }

    /// Sum over all five tiers; equals the processed record count.
    pub fn total(&self) -> u64 {
        self.class_a + self.class_b + self.class_c + self.member + self.non_member
    }

    /// The dominant lettered class, ties favoring the earlier letter.
    ///
    /// `Member` and `NonMember` are residual categories and stay out of the
    /// comparison. All comparisons are `>=`, so an all-zero count lands on
    /// `ClassA`; that default is intentional.
    pub fn top_class(&self) -> MembershipTier {
        if self.class_a >= self.class_b && self.class_a >= self.class_c {
            MembershipTier::ClassA
        } else if self.class_b >= self.class_c {
            MembershipTier::ClassB
        } else {
            MembershipTier::ClassC
        }
    }

    fn slot_mut(&mut self, tier: MembershipTier) -> &mut u64 {
        match tier {
            MembershipTier::ClassA => &mut self.class_a,
            MembershipTier::ClassB => &mut self.class_b,
            MembershipTier::ClassC => &mut self.class_c,
            MembershipTier::Member => &mut self.member,
            MembershipTier::NonMember => &mut self.non_member,
        }
    }
}

/// Summary counters for one ingestion run.
///
/// `total` counts every data row in the input and always equals
/// `processed + skipped`. `members_by_location` is keyed by canonical
/// gazetteer key; a BTreeMap keeps the serialized document deterministic.
#[derive(Debug, Clone, Default, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct Statistics {
    pub total: u64,
    pub processed: u64,
    pub skipped: u64,
    pub members_by_location: BTreeMap<String, u64>,
    pub membership_types: TierCounts,
}

/// Snapshot header block.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct SnapshotMetadata {
    pub processed_at: DateTime<Utc>,
    pub source_file: String,
    pub source_checksum: String,
    pub total_records: u64,
    pub statistics: Statistics,
}

/// The persisted unit: everything the dashboard needs to render one upload.
///
/// Immutable once written. A later ingestion supersedes it wholesale and
/// repoints "latest"; snapshots are never merged.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Snapshot {
    pub metadata: SnapshotMetadata,
    pub locations: Vec<LocationEntry>,
    pub members: Vec<MemberRecord>,
}
