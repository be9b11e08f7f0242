mod tier_store;

pub use tier_store::{ApplyReport, SkippedFile, TierStore, QUARANTINE_STAMP_SEP};
