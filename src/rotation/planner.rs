use chrono::{Datelike, Days, Months, NaiveDate, Weekday};

use crate::error::RotationError;
use crate::rotation::tier::{BackupFile, Destination, RotationDecision, Tier};

/// Complete plan for one rotation pass: every scanned file lands in exactly
/// one of the two lists, so nothing is silently dropped from the report.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RotationPlan {
    pub decisions: Vec<RotationDecision>,
    pub rejected: Vec<RejectedFile>,
}

/// A file the planner refused to process; fatal to that file only.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct RejectedFile {
    pub file: String,
    pub reason: RotationError,
}

/// Assign a file to its retention tier from its embedded date alone.
///
/// Rules, first match wins (coarser tiers take precedence, so a Jan 1 that is
/// a year old lands in Yearly even though it also qualifies for Monthly):
/// 1. Yearly:  at least a year old and dated Jan 1.
/// 2. Monthly: at least a month old and dated the 1st.
/// 3. Weekly:  at least a week old and dated a Monday or the 1st.
/// 4. Daily:   younger than a week.
/// 5. Quarantine: aged past a boundary without the calendar alignment that
///    tier keeps, i.e. superseded by a denser tier's retained copy.
///
/// Month and year ages use calendar arithmetic; when the anchor day does not
/// exist that many months back, `Months` subtraction clamps to the last valid
/// day of the target month (Mar 31 - 1 month = Feb 28/29).
pub fn classify(embedded: NaiveDate, today: NaiveDate) -> Tier {
    let week_ago = today
        .checked_sub_days(Days::new(7))
        .unwrap_or(NaiveDate::MIN);
    let month_ago = today
        .checked_sub_months(Months::new(1))
        .unwrap_or(NaiveDate::MIN);
    let year_ago = today
        .checked_sub_months(Months::new(12))
        .unwrap_or(NaiveDate::MIN);

    let first_of_month = embedded.day() == 1;
    let first_of_year = first_of_month && embedded.month() == 1;
    let monday = embedded.weekday() == Weekday::Mon;

    if embedded <= year_ago && first_of_year {
        Tier::Yearly
    } else if embedded <= month_ago && first_of_month {
        Tier::Monthly
    } else if embedded <= week_ago && (monday || first_of_month) {
        Tier::Weekly
    } else if embedded > week_ago {
        Tier::Daily
    } else {
        Tier::Quarantine
    }
}

/// Compute one decision per input file, independent of the tier each file
/// currently sits in (a file can jump from Daily straight to Monthly when
/// runs were skipped). Pure and deterministic: same inputs, same plan.
///
/// Quarantine is terminal: a quarantined file either stays put or is marked
/// for deletion once it has sat there for over a month, measured from its
/// stamped entry date, or from its embedded date when no stamp exists.
///
/// A file dated after `today` violates the planner's contract and is
/// rejected with `InvalidInput`; the rest of the run is unaffected.
pub fn plan_rotation(files: &[BackupFile], today: NaiveDate) -> RotationPlan {
    let month_ago = today
        .checked_sub_months(Months::new(1))
        .unwrap_or(NaiveDate::MIN);

    let mut decisions = Vec::with_capacity(files.len());
    let mut rejected = Vec::new();

    for file in files {
        if file.embedded_date > today {
            rejected.push(RejectedFile {
                file: file.name.clone(),
                reason: RotationError::InvalidInput {
                    file: file.name.clone(),
                    reason: format!(
                        "embedded date {} is in the future of {}",
                        file.embedded_date, today
                    ),
                },
            });
            continue;
        }

        let destination = match file.current_tier {
            Tier::Quarantine => {
                let entered = file.quarantined_at.unwrap_or(file.embedded_date);
                if entered < month_ago {
                    Destination::Delete
                } else {
                    Destination::Tier(Tier::Quarantine)
                }
            }
            _ => Destination::Tier(classify(file.embedded_date, today)),
        };

        decisions.push(RotationDecision {
            file: file.name.clone(),
            source: file.current_tier,
            destination,
        });
    }

    RotationPlan {
        decisions,
        rejected,
    }
}
