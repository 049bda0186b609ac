//! Journal status machine and calendar-period helpers.

use std::fmt;
use std::str::FromStr;

use chrono::TimeZone;
use serde::{Deserialize, Serialize};

use crate::error::CoreError;
use crate::types::Timestamp;

/// Earliest year a journal may be generated for.
pub const MIN_JOURNAL_YEAR: i32 = 2000;

/// Latest year a journal may be generated for.
pub const MAX_JOURNAL_YEAR: i32 = 2100;

/// Maximum length for a journal title.
pub const MAX_JOURNAL_TITLE_LENGTH: usize = 200;

/// Maximum length for an editorial note.
pub const MAX_EDITORIAL_NOTE_LENGTH: usize = 10_000;

/// English month names, indexed by `month - 1`, for derived titles.
const MONTH_NAMES: [&str; 12] = [
    "January", "February", "March", "April", "May", "June",
    "July", "August", "September", "October", "November", "December",
];

/// Status of a journal compilation.
///
/// `generating` is the in-transaction construction phase: readers never see
/// a `draft` journal with partial content because the flip to `draft`
/// commits together with the entry snapshot.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum JournalStatus {
    Generating,
    Draft,
    Published,
    Archived,
}

impl JournalStatus {
    /// The stored form, matching the `journals.status` CHECK constraint.
    pub fn as_str(self) -> &'static str {
        match self {
            JournalStatus::Generating => "generating",
            JournalStatus::Draft => "draft",
            JournalStatus::Published => "published",
            JournalStatus::Archived => "archived",
        }
    }
}

impl fmt::Display for JournalStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for JournalStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "generating" => Ok(JournalStatus::Generating),
            "draft" => Ok(JournalStatus::Draft),
            "published" => Ok(JournalStatus::Published),
            "archived" => Ok(JournalStatus::Archived),
            other => Err(CoreError::Internal(format!(
                "Unknown journal status '{other}' in store"
            ))),
        }
    }
}

/// Check that a journal may be published. Only finished drafts publish; a
/// `generating` journal is an aborted run and must be discarded.
pub fn check_publish(status: JournalStatus) -> Result<(), CoreError> {
    if status == JournalStatus::Draft {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition(format!(
            "Cannot publish a journal in status '{status}'; only drafts publish"
        )))
    }
}

/// Check that a journal may be archived. One-way, legal from any status
/// except `archived` itself.
pub fn check_archive(status: JournalStatus) -> Result<(), CoreError> {
    if status == JournalStatus::Archived {
        Err(CoreError::InvalidTransition(
            "Journal is already archived".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate a (year, month) calendar period.
pub fn validate_period(year: i32, month: u32) -> Result<(), CoreError> {
    if !(1..=12).contains(&month) {
        return Err(CoreError::Validation(format!(
            "Invalid month {month}. Must be between 1 and 12"
        )));
    }
    if !(MIN_JOURNAL_YEAR..=MAX_JOURNAL_YEAR).contains(&year) {
        return Err(CoreError::Validation(format!(
            "Invalid year {year}. Must be between {MIN_JOURNAL_YEAR} and {MAX_JOURNAL_YEAR}"
        )));
    }
    Ok(())
}

/// The half-open UTC interval `[start, end)` covering a calendar month.
///
/// Callers must have validated the period first; an unrepresentable date
/// after that is a programming error and surfaces as `Internal`.
pub fn period_bounds(year: i32, month: u32) -> Result<(Timestamp, Timestamp), CoreError> {
    let start = chrono::Utc
        .with_ymd_and_hms(year, month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| CoreError::Internal(format!("Unrepresentable period {year}-{month}")))?;

    let (next_year, next_month) = if month == 12 { (year + 1, 1) } else { (year, month + 1) };
    let end = chrono::Utc
        .with_ymd_and_hms(next_year, next_month, 1, 0, 0, 0)
        .single()
        .ok_or_else(|| {
            CoreError::Internal(format!("Unrepresentable period {next_year}-{next_month}"))
        })?;

    Ok((start, end))
}

/// Derive the default title for a period, e.g. `"May 2024 Journal"`.
pub fn default_title(year: i32, month: u32) -> String {
    let name = MONTH_NAMES[(month - 1) as usize];
    format!("{name} {year} Journal")
}

/// Validate an explicit journal title.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation(
            "Journal title must not be empty".to_string(),
        ));
    }
    if title.len() > MAX_JOURNAL_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Journal title exceeds maximum length of {MAX_JOURNAL_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate an optional editorial note.
pub fn validate_editorial_note(note: &Option<String>) -> Result<(), CoreError> {
    if let Some(n) = note {
        if n.len() > MAX_EDITORIAL_NOTE_LENGTH {
            return Err(CoreError::Validation(format!(
                "Editorial note exceeds maximum length of {MAX_EDITORIAL_NOTE_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_status_round_trips_through_str() {
        for status in [
            JournalStatus::Generating,
            JournalStatus::Draft,
            JournalStatus::Published,
            JournalStatus::Archived,
        ] {
            assert_eq!(status.as_str().parse::<JournalStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_only_drafts_publish() {
        assert!(check_publish(JournalStatus::Draft).is_ok());
        assert!(check_publish(JournalStatus::Generating).is_err());
        assert!(check_publish(JournalStatus::Published).is_err());
        assert!(check_publish(JournalStatus::Archived).is_err());
    }

    #[test]
    fn test_archive_is_one_way() {
        assert!(check_archive(JournalStatus::Generating).is_ok());
        assert!(check_archive(JournalStatus::Draft).is_ok());
        assert!(check_archive(JournalStatus::Published).is_ok());
        assert!(check_archive(JournalStatus::Archived).is_err());
    }

    #[test]
    fn test_month_zero_and_thirteen_rejected() {
        assert!(validate_period(2024, 0).is_err());
        assert!(validate_period(2024, 13).is_err());
        assert!(validate_period(2024, 5).is_ok());
    }

    #[test]
    fn test_year_bounds_enforced() {
        assert!(validate_period(MIN_JOURNAL_YEAR - 1, 5).is_err());
        assert!(validate_period(MAX_JOURNAL_YEAR + 1, 5).is_err());
        assert!(validate_period(MIN_JOURNAL_YEAR, 1).is_ok());
        assert!(validate_period(MAX_JOURNAL_YEAR, 12).is_ok());
    }

    #[test]
    fn test_period_bounds_cover_one_month() {
        let (start, end) = period_bounds(2024, 5).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-05-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2024-06-01T00:00:00+00:00");
    }

    #[test]
    fn test_period_bounds_wrap_december() {
        let (start, end) = period_bounds(2024, 12).unwrap();
        assert_eq!(start.to_rfc3339(), "2024-12-01T00:00:00+00:00");
        assert_eq!(end.to_rfc3339(), "2025-01-01T00:00:00+00:00");
    }

    #[test]
    fn test_default_title_spells_out_month() {
        assert_eq!(default_title(2024, 5), "May 2024 Journal");
        assert_eq!(default_title(2026, 1), "January 2026 Journal");
    }

    #[test]
    fn test_blank_title_rejected() {
        assert!(validate_title("  ").is_err());
        assert!(validate_title("Spring Grand Rounds").is_ok());
    }

    #[test]
    fn test_overlong_editorial_note_rejected() {
        let long = "x".repeat(MAX_EDITORIAL_NOTE_LENGTH + 1);
        assert!(validate_editorial_note(&Some(long)).is_err());
        assert!(validate_editorial_note(&None).is_ok());
    }
}
