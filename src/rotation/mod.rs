mod date_extractor;
mod planner;
mod tier;

pub use date_extractor::extract_date;
pub use planner::{classify, plan_rotation, RejectedFile, RotationPlan};
pub use tier::{BackupFile, Destination, RotationDecision, Tier};
