use chrono::NaiveDate;
use std::fs;
use std::path::PathBuf;
use tracing::{debug, error, info};

use crate::error::{Result, RotationError, StorageError};
use crate::rotation::{extract_date, BackupFile, Destination, RotationDecision, Tier};

/// Separator between the quarantine entry stamp and the original filename.
/// A stamped name (`2018-04-01_____<original>`) is itself a valid dated
/// filename, so the entry date survives re-scanning.
pub const QUARANTINE_STAMP_SEP: &str = "_____";

/// The physical side of rotation: five sibling tier directories under a root.
/// All planning happens elsewhere; this type only scans directories into
/// `BackupFile` records and executes a finished plan.
pub struct TierStore {
    root: PathBuf,
}

/// A scanned file that could not be dated. Reported, left untouched.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SkippedFile {
    pub name: String,
    pub tier: Tier,
    pub reason: RotationError,
}

/// Outcome of one apply phase.
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct ApplyReport {
    pub moved: usize,
    pub quarantined: usize,
    pub deleted: usize,
    pub errors: usize,
}

impl TierStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn tier_dir(&self, tier: Tier) -> PathBuf {
        self.root.join(tier.dir_name())
    }

    /// Create the sibling tier directories next to an existing `daily/`.
    /// A missing root or `daily/` means we are pointed at the wrong place;
    /// refusing beats scaffolding an empty tree there.
    pub fn ensure_layout(&self) -> Result<()> {
        if !self.root.is_dir() {
            return Err(StorageError::RootNotFound(self.root.clone()).into());
        }
        if !self.tier_dir(Tier::Daily).is_dir() {
            return Err(StorageError::DailyNotFound(self.root.clone()).into());
        }
        for tier in [Tier::Weekly, Tier::Monthly, Tier::Yearly, Tier::Quarantine] {
            let path = self.tier_dir(tier);
            if !path.is_dir() {
                info!("Creating folder {:?}", path);
                fs::create_dir_all(&path)
                    .map_err(|source| StorageError::DirectoryCreation { path, source })?;
            }
        }
        Ok(())
    }

    /// Enumerate every tier directory into `BackupFile` records. Undatable
    /// names are returned separately so the caller can report them; they are
    /// never guessed at and never touched.
    pub fn scan(&self) -> Result<(Vec<BackupFile>, Vec<SkippedFile>)> {
        let mut files = Vec::new();
        let mut skipped = Vec::new();

        for tier in Tier::ALL {
            let dir = self.tier_dir(tier);
            let entries = fs::read_dir(&dir).map_err(|source| StorageError::DirectoryRead {
                path: dir.clone(),
                source,
            })?;

            for entry in entries {
                let entry = entry.map_err(|source| StorageError::DirectoryRead {
                    path: dir.clone(),
                    source,
                })?;
                if entry.path().is_dir() {
                    continue;
                }
                let name = match entry.file_name().into_string() {
                    Ok(name) => name,
                    Err(raw) => {
                        let lossy = raw.to_string_lossy().into_owned();
                        skipped.push(SkippedFile {
                            name: lossy.clone(),
                            tier,
                            reason: RotationError::UnparseableFilename(lossy),
                        });
                        continue;
                    }
                };

                let (quarantined_at, inner) = if tier == Tier::Quarantine {
                    split_quarantine_stamp(&name)
                } else {
                    (None, name.as_str())
                };

                // A stamped quarantine name whose inner part is undatable
                // still carries the stamp itself as a valid date.
                match extract_date(inner).or_else(|_| extract_date(&name)) {
                    Ok(embedded_date) => files.push(BackupFile {
                        name: name.clone(),
                        embedded_date,
                        current_tier: tier,
                        quarantined_at,
                    }),
                    Err(reason) => skipped.push(SkippedFile { name, tier, reason }),
                }
            }
        }

        Ok((files, skipped))
    }

    /// Execute a finished plan. Per-file failures are logged and counted but
    /// never abort the pass. With `dry_run` every action is logged and
    /// nothing on disk changes.
    pub fn apply(
        &self,
        decisions: &[RotationDecision],
        today: NaiveDate,
        dry_run: bool,
    ) -> ApplyReport {
        let mut report = ApplyReport::default();

        for decision in decisions {
            match decision.destination {
                Destination::Tier(target) if target == decision.source => {
                    debug!("Keeping {:?} in {}", decision.file, decision.source);
                }
                Destination::Tier(target) => match self.move_file(decision, target, today, dry_run)
                {
                    Ok(()) if target == Tier::Quarantine => report.quarantined += 1,
                    Ok(()) => report.moved += 1,
                    Err(e) => {
                        error!("{}", e);
                        report.errors += 1;
                    }
                },
                Destination::Delete => match self.delete_file(decision, dry_run) {
                    Ok(()) => report.deleted += 1,
                    Err(e) => {
                        error!("{}", e);
                        report.errors += 1;
                    }
                },
            }
        }

        report
    }

    /// Move one file between tier directories. Moves into quarantine prepend
    /// today's date so we always know when that happened.
    fn move_file(
        &self,
        decision: &RotationDecision,
        target: Tier,
        today: NaiveDate,
        dry_run: bool,
    ) -> std::result::Result<(), StorageError> {
        let target_name = if target == Tier::Quarantine {
            format!(
                "{}{}{}",
                today.format("%Y-%m-%d"),
                QUARANTINE_STAMP_SEP,
                decision.file
            )
        } else {
            decision.file.clone()
        };
        let target_path = self.tier_dir(target).join(&target_name);

        if dry_run {
            info!(
                "Would move {:?} from {} to {}",
                decision.file, decision.source, target
            );
            return Ok(());
        }

        info!(
            "Moving {:?} from {} to {}",
            decision.file, decision.source, target
        );
        fs::rename(self.tier_dir(decision.source).join(&decision.file), &target_path).map_err(
            |source| StorageError::FileMove {
                file: decision.file.clone(),
                target: target_path,
                source,
            },
        )
    }

    /// Remove one file. Only quarantine has a deletion path.
    fn delete_file(
        &self,
        decision: &RotationDecision,
        dry_run: bool,
    ) -> std::result::Result<(), StorageError> {
        if decision.source != Tier::Quarantine {
            return Err(StorageError::DeleteOutsideQuarantine(decision.file.clone()));
        }

        if dry_run {
            info!("Would erase {:?} from quarantine", decision.file);
            return Ok(());
        }

        info!("Erasing {:?} from quarantine", decision.file);
        fs::remove_file(self.tier_dir(Tier::Quarantine).join(&decision.file)).map_err(|source| {
            StorageError::FileDelete {
                file: decision.file.clone(),
                source,
            }
        })
    }
}

/// Split `2018-04-01_____original.tar` into the entry date and the original
/// name. Names without a well-formed stamp pass through unchanged.
fn split_quarantine_stamp(name: &str) -> (Option<NaiveDate>, &str) {
    if let Some((stamp, rest)) = name.split_once(QUARANTINE_STAMP_SEP) {
        if stamp.len() == 10 && !rest.is_empty() {
            if let Ok(date) = NaiveDate::parse_from_str(stamp, "%Y-%m-%d") {
                return (Some(date), rest);
            }
        }
    }
    (None, name)
}
