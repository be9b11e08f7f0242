use chrono::NaiveDate;

use crate::error::RotationError;

/// Recover the backup date embedded in a filename.
///
/// Recognized formats, tried in order:
/// 1. `<unix_timestamp>_<YYYY>_<MM>_<DD>[_<rest>]` — the explicit date fields
///    win; the leading timestamp is ignored.
/// 2. `<YYYY>-<MM>-<DD>[_<rest>]`
///
/// Matching is all-or-nothing per format: a name that structurally matches a
/// format but carries an invalid calendar field (month 13, Feb 30) fails the
/// whole extraction instead of falling through to a looser format.
pub fn extract_date(filename: &str) -> Result<NaiveDate, RotationError> {
    for matcher in [timestamp_prefixed, iso_prefixed] {
        match matcher(filename) {
            FormatMatch::Date(date) => return Ok(date),
            FormatMatch::Malformed => break,
            FormatMatch::NoMatch => {}
        }
    }
    Err(RotationError::UnparseableFilename(filename.to_string()))
}

enum FormatMatch {
    Date(NaiveDate),
    /// Structural match with an invalid calendar field; stops the search.
    Malformed,
    NoMatch,
}

/// Format 1: `1521766816_2018_03_23_10.5.6-ee_gitlab_backup.tar`
fn timestamp_prefixed(name: &str) -> FormatMatch {
    let Some((timestamp, rest)) = name.split_once('_') else {
        return FormatMatch::NoMatch;
    };
    if timestamp.is_empty() || !timestamp.bytes().all(|b| b.is_ascii_digit()) {
        return FormatMatch::NoMatch;
    }
    date_prefix(rest, b'_')
}

/// Format 2: `2018-03-24_01.02.57_nexterbox3.media.tar.gz`
fn iso_prefixed(name: &str) -> FormatMatch {
    date_prefix(name, b'-')
}

/// Match an exact `YYYY<sep>MM<sep>DD` prefix followed by `_` or end-of-name.
fn date_prefix(s: &str, sep: u8) -> FormatMatch {
    let b = s.as_bytes();
    if b.len() < 10 {
        return FormatMatch::NoMatch;
    }
    let digits = |range: std::ops::Range<usize>| b[range].iter().all(u8::is_ascii_digit);
    if !(digits(0..4) && b[4] == sep && digits(5..7) && b[7] == sep && digits(8..10)) {
        return FormatMatch::NoMatch;
    }
    if b.len() > 10 && b[10] != b'_' {
        return FormatMatch::NoMatch;
    }

    match (s[..4].parse(), s[5..7].parse(), s[8..10].parse()) {
        (Ok(year), Ok(month), Ok(day)) => NaiveDate::from_ymd_opt(year, month, day)
            .map_or(FormatMatch::Malformed, FormatMatch::Date),
        _ => FormatMatch::NoMatch,
    }
}
