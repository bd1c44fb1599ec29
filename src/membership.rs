use serde::{Deserialize, Serialize};
use std::fmt;

/// Closed set of membership classification outcomes. The serialized labels
/// are the exact strings the dashboard keys its tier breakdowns on.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub enum MembershipTier {
    #[serde(rename = "Class A")]
    ClassA,
    #[serde(rename = "Class B")]
    ClassB,
    #[serde(rename = "Class C")]
    ClassC,
    Member,
    #[serde(rename = "Non-Member")]
    NonMember,
}

impl MembershipTier {
    /// All five tiers, in reporting order.
    pub const ALL: [MembershipTier; 5] = [
        MembershipTier::ClassA,
        MembershipTier::ClassB,
        MembershipTier::ClassC,
        MembershipTier::Member,
        MembershipTier::NonMember,
    ];

    pub fn label(&self) -> &'static str {
        match self {
            MembershipTier::ClassA => "Class A",
            MembershipTier::ClassB => "Class B",
            MembershipTier::ClassC => "Class C",
            MembershipTier::Member => "Member",
            MembershipTier::NonMember => "Non-Member",
        }
    }
}

impl fmt::Display for MembershipTier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

/// Classify a raw membership field into a tier.
///
/// Keyword containment in fixed priority order: "class a" beats "class b"
/// beats "class c". Blank input is a non-member; any other text that names no
/// class falls through to plain `Member` (typos and unknown labels included).
/// Total function: every input maps to exactly one tier, there is no
/// rejection path here.
pub fn classify(raw: &str) -> MembershipTier {
    let text = raw.to_lowercase();
    if text.trim().is_empty() {
        return MembershipTier::NonMember;
    }

    if text.contains("class a") {
        MembershipTier::ClassA
    } else if text.contains("class b") {
        MembershipTier::ClassB
    } else if text.contains("class c") {
        MembershipTier::ClassC
    } else {
        MembershipTier::Member
    }
}
