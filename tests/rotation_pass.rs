use backup_rotate::rotation::{plan_rotation, Tier};
use backup_rotate::storage::{TierStore, QUARANTINE_STAMP_SEP};
use chrono::NaiveDate;
use std::fs;
use std::path::Path;
use tempfile::TempDir;

fn date(y: i32, m: u32, d: u32) -> NaiveDate {
    NaiveDate::from_ymd_opt(y, m, d).unwrap()
}

fn touch(dir: &Path, name: &str) {
    fs::write(dir.join(name), b"backup payload").unwrap();
}

fn names_in(dir: &Path) -> Vec<String> {
    let mut names: Vec<String> = fs::read_dir(dir)
        .unwrap()
        .map(|e| e.unwrap().file_name().into_string().unwrap())
        .collect();
    names.sort();
    names
}

/// Build a root with a populated daily/ directory, as the backup producer
/// leaves it, and run ensure_layout to scaffold the sibling tiers.
fn setup_store(tmp: &TempDir) -> TierStore {
    fs::create_dir(tmp.path().join("daily")).unwrap();
    let store = TierStore::new(tmp.path());
    store.ensure_layout().unwrap();
    store
}

#[test]
fn full_pass_moves_files_to_their_tiers() {
    let tmp = TempDir::new().unwrap();
    let store = setup_store(&tmp);
    let daily = tmp.path().join("daily");

    // today = 2018-04-01
    touch(&daily, "1521766816_2018_03_23_10.5.6-ee_gitlab_backup.tar"); // Friday, 9 days
    touch(&daily, "2018-03-24_01.02.57_nexterbox3.media.tar.gz"); // Saturday, 8 days
    touch(&daily, "2018-03-26_03.00.00_fresh.tar.gz"); // Monday, 6 days
    touch(&daily, "2018-03-19_03.00.00_weekly.tar.gz"); // Monday, 13 days
    touch(&daily, "2018-03-01_03.00.00_monthly.tar.gz"); // 1st, one month
    touch(&daily, "2017-01-01_03.00.00_yearly.tar.gz"); // Jan 1, over a year
    touch(&daily, "notes.txt"); // undatable

    let today = date(2018, 4, 1);
    let (files, skipped) = store.scan().unwrap();
    assert_eq!(files.len(), 6);
    assert_eq!(skipped.len(), 1);
    assert_eq!(skipped[0].name, "notes.txt");

    let plan = plan_rotation(&files, today);
    assert!(plan.rejected.is_empty());
    let report = store.apply(&plan.decisions, today, false);
    assert_eq!(report.errors, 0);
    assert_eq!(report.moved, 3);
    assert_eq!(report.quarantined, 2);
    assert_eq!(report.deleted, 0);

    // Undatable and fresh files stay in daily.
    assert_eq!(
        names_in(&daily),
        vec![
            "2018-03-26_03.00.00_fresh.tar.gz".to_string(),
            "notes.txt".to_string(),
        ]
    );
    assert_eq!(
        names_in(&tmp.path().join("weekly")),
        vec!["2018-03-19_03.00.00_weekly.tar.gz".to_string()]
    );
    assert_eq!(
        names_in(&tmp.path().join("monthly")),
        vec!["2018-03-01_03.00.00_monthly.tar.gz".to_string()]
    );
    assert_eq!(
        names_in(&tmp.path().join("yearly")),
        vec!["2017-01-01_03.00.00_yearly.tar.gz".to_string()]
    );
    // Quarantined files are stamped with today's date.
    assert_eq!(
        names_in(&tmp.path().join("quarantine")),
        vec![
            format!(
                "2018-04-01{}1521766816_2018_03_23_10.5.6-ee_gitlab_backup.tar",
                QUARANTINE_STAMP_SEP
            ),
            format!(
                "2018-04-01{}2018-03-24_01.02.57_nexterbox3.media.tar.gz",
                QUARANTINE_STAMP_SEP
            ),
        ]
    );
}

#[test]
fn expired_quarantine_files_are_purged() {
    let tmp = TempDir::new().unwrap();
    let store = setup_store(&tmp);
    let quarantine = tmp.path().join("quarantine");

    let expired = format!(
        "2018-02-20{}2018-02-13_01.00.00_old.tar.gz",
        QUARANTINE_STAMP_SEP
    );
    let held = format!(
        "2018-03-15{}2018-03-08_01.00.00_recent.tar.gz",
        QUARANTINE_STAMP_SEP
    );
    touch(&quarantine, &expired);
    touch(&quarantine, &held);

    let today = date(2018, 4, 1);
    let (files, skipped) = store.scan().unwrap();
    assert!(skipped.is_empty());

    // Entry dates come from the stamp, not the embedded backup date.
    let mut entries: Vec<_> = files
        .iter()
        .map(|f| (f.name.as_str(), f.quarantined_at))
        .collect();
    entries.sort();
    assert_eq!(
        entries,
        vec![
            (expired.as_str(), Some(date(2018, 2, 20))),
            (held.as_str(), Some(date(2018, 3, 15))),
        ]
    );

    let plan = plan_rotation(&files, today);
    let report = store.apply(&plan.decisions, today, false);
    assert_eq!(report.deleted, 1);
    assert_eq!(report.errors, 0);
    assert_eq!(names_in(&quarantine), vec![held]);
}

#[test]
fn skipped_runs_jump_tiers_in_one_pass() {
    let tmp = TempDir::new().unwrap();
    let store = setup_store(&tmp);

    // A month-aligned file left in daily because no rotation ran for weeks
    // goes straight to monthly, skipping weekly.
    touch(&tmp.path().join("daily"), "2018-02-01_01.00.00_db.tar.gz");
    // An already rotated weekly file (a Tuesday) that has aged past a month
    // and is not month-aligned gets quarantined.
    touch(&tmp.path().join("weekly"), "2018-02-13_01.00.00_db.tar.gz");

    let today = date(2018, 4, 1);
    let (files, _) = store.scan().unwrap();
    let plan = plan_rotation(&files, today);
    let report = store.apply(&plan.decisions, today, false);
    assert_eq!(report.errors, 0);

    assert_eq!(
        names_in(&tmp.path().join("monthly")),
        vec!["2018-02-01_01.00.00_db.tar.gz".to_string()]
    );
    assert!(names_in(&tmp.path().join("weekly")).is_empty());
    assert_eq!(
        names_in(&tmp.path().join("quarantine")),
        vec![format!(
            "2018-04-01{}2018-02-13_01.00.00_db.tar.gz",
            QUARANTINE_STAMP_SEP
        )]
    );
}

#[test]
fn dry_run_touches_nothing() {
    let tmp = TempDir::new().unwrap();
    let store = setup_store(&tmp);
    let daily = tmp.path().join("daily");

    touch(&daily, "2018-03-01_01.00.00_db.tar.gz");
    touch(&daily, "1521766816_2018_03_23_db.tar");

    let today = date(2018, 4, 1);
    let (files, _) = store.scan().unwrap();
    let plan = plan_rotation(&files, today);
    let report = store.apply(&plan.decisions, today, true);

    assert_eq!(report.errors, 0);
    assert_eq!(report.moved + report.quarantined, 2);
    assert_eq!(names_in(&daily).len(), 2);
    assert!(names_in(&tmp.path().join("monthly")).is_empty());
    assert!(names_in(&tmp.path().join("quarantine")).is_empty());
}

#[test]
fn ensure_layout_requires_an_existing_daily_dir() {
    let tmp = TempDir::new().unwrap();
    let store = TierStore::new(tmp.path());
    assert!(store.ensure_layout().is_err());

    fs::create_dir(tmp.path().join("daily")).unwrap();
    store.ensure_layout().unwrap();
    for tier in Tier::ALL {
        assert!(tmp.path().join(tier.dir_name()).is_dir());
    }
}

#[test]
fn repeated_passes_are_idempotent_on_disk() {
    let tmp = TempDir::new().unwrap();
    let store = setup_store(&tmp);

    touch(&tmp.path().join("daily"), "2018-03-19_01.00.00_db.tar.gz");
    let today = date(2018, 4, 1);

    for _ in 0..2 {
        let (files, _) = store.scan().unwrap();
        let plan = plan_rotation(&files, today);
        let report = store.apply(&plan.decisions, today, false);
        assert_eq!(report.errors, 0);
    }

    assert_eq!(
        names_in(&tmp.path().join("weekly")),
        vec!["2018-03-19_01.00.00_db.tar.gz".to_string()]
    );
    assert!(names_in(&tmp.path().join("daily")).is_empty());
}
