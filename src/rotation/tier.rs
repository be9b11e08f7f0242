use chrono::NaiveDate;
use serde::Serialize;
use std::fmt;

/// Retention buckets, ordered by decreasing density / increasing age.
/// Quarantine is a terminal holding tier before deletion, not a density tier.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Tier {
    Daily,
    Weekly,
    Monthly,
    Yearly,
    Quarantine,
}

impl Tier {
    pub const ALL: [Tier; 5] = [
        Tier::Daily,
        Tier::Weekly,
        Tier::Monthly,
        Tier::Yearly,
        Tier::Quarantine,
    ];

    pub fn dir_name(self) -> &'static str {
        match self {
            Tier::Daily => "daily",
            Tier::Weekly => "weekly",
            Tier::Monthly => "monthly",
            Tier::Yearly => "yearly",
            Tier::Quarantine => "quarantine",
        }
    }
}

impl fmt::Display for Tier {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.dir_name())
    }
}

/// A backup file as discovered during a scan. Ephemeral: rebuilt on every
/// rotation pass, never persisted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BackupFile {
    pub name: String,
    pub embedded_date: NaiveDate,
    pub current_tier: Tier,
    /// Date the file entered quarantine, recovered from the stamp prefix.
    /// Only meaningful for files in `Tier::Quarantine`.
    pub quarantined_at: Option<NaiveDate>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum Destination {
    Tier(Tier),
    Delete,
}

impl fmt::Display for Destination {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Destination::Tier(tier) => tier.fmt(f),
            Destination::Delete => f.write_str("delete"),
        }
    }
}

/// One planned action for one file. Produced fresh each run, never persisted.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct RotationDecision {
    pub file: String,
    pub source: Tier,
    pub destination: Destination,
}
