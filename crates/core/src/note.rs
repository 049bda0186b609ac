//! Case-note status machine and content validation.
//!
//! A note's status only changes through the review workflow or the explicit
//! publish/archive actions; the legality checks for those moves live here so
//! the data layer and tests share one transition table.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};

use crate::error::CoreError;

/// Maximum length for a note title.
pub const MAX_TITLE_LENGTH: usize = 200;

/// Maximum length for a note body.
pub const MAX_BODY_LENGTH: usize = 50_000;

/// Maximum length for a topic label.
pub const MAX_TOPIC_LENGTH: usize = 100;

/// Maximum number of tags on a note.
pub const MAX_TAGS: usize = 20;

/// Maximum length of a single tag.
pub const MAX_TAG_LENGTH: usize = 50;

/// Publication status of a case note.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum NoteStatus {
    Draft,
    UnderReview,
    Approved,
    Published,
    Archived,
}

impl NoteStatus {
    /// The stored form, matching the `notes.status` CHECK constraint.
    pub fn as_str(self) -> &'static str {
        match self {
            NoteStatus::Draft => "draft",
            NoteStatus::UnderReview => "under_review",
            NoteStatus::Approved => "approved",
            NoteStatus::Published => "published",
            NoteStatus::Archived => "archived",
        }
    }

    /// Whether a review request may be opened for a note in this status.
    ///
    /// Only drafts enter review: a note that is already under review has an
    /// open request, and approved/published/archived notes are past the
    /// review stage.
    pub fn can_enter_review(self) -> bool {
        self == NoteStatus::Draft
    }

    /// Whether the note may be edited by its author.
    ///
    /// Drafts are freely editable; a note under review may receive revised
    /// content (recorded on the request's ledger). Approved content is
    /// frozen until published or sent back to draft by a verdict.
    pub fn is_editable(self) -> bool {
        matches!(self, NoteStatus::Draft | NoteStatus::UnderReview)
    }
}

impl fmt::Display for NoteStatus {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for NoteStatus {
    type Err = CoreError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "draft" => Ok(NoteStatus::Draft),
            "under_review" => Ok(NoteStatus::UnderReview),
            "approved" => Ok(NoteStatus::Approved),
            "published" => Ok(NoteStatus::Published),
            "archived" => Ok(NoteStatus::Archived),
            other => Err(CoreError::Internal(format!(
                "Unknown note status '{other}' in store"
            ))),
        }
    }
}

/// Check that a note may be published.
///
/// Publication is forward-only and requires a prior `approved` verdict, so
/// the only legal source status is `approved`.
pub fn check_publish(status: NoteStatus) -> Result<(), CoreError> {
    if status == NoteStatus::Approved {
        Ok(())
    } else {
        Err(CoreError::InvalidTransition(format!(
            "Cannot publish a note in status '{status}'; it must be approved first"
        )))
    }
}

/// Check that a note may be archived. Archiving is one-way: every status is
/// a legal source except `archived` itself.
pub fn check_archive(status: NoteStatus) -> Result<(), CoreError> {
    if status == NoteStatus::Archived {
        Err(CoreError::InvalidTransition(
            "Note is already archived".to_string(),
        ))
    } else {
        Ok(())
    }
}

/// Validate a note title: non-empty after trimming, within the length cap.
pub fn validate_title(title: &str) -> Result<(), CoreError> {
    if title.trim().is_empty() {
        return Err(CoreError::Validation(
            "Note title must not be empty".to_string(),
        ));
    }
    if title.len() > MAX_TITLE_LENGTH {
        return Err(CoreError::Validation(format!(
            "Note title exceeds maximum length of {MAX_TITLE_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate a note body: non-empty after trimming, within the length cap.
pub fn validate_body(body: &str) -> Result<(), CoreError> {
    if body.trim().is_empty() {
        return Err(CoreError::Validation(
            "Note body must not be empty".to_string(),
        ));
    }
    if body.len() > MAX_BODY_LENGTH {
        return Err(CoreError::Validation(format!(
            "Note body exceeds maximum length of {MAX_BODY_LENGTH} characters"
        )));
    }
    Ok(())
}

/// Validate an optional topic label.
pub fn validate_topic(topic: &Option<String>) -> Result<(), CoreError> {
    if let Some(t) = topic {
        if t.trim().is_empty() {
            return Err(CoreError::Validation(
                "Topic must not be blank; omit it instead".to_string(),
            ));
        }
        if t.len() > MAX_TOPIC_LENGTH {
            return Err(CoreError::Validation(format!(
                "Topic exceeds maximum length of {MAX_TOPIC_LENGTH} characters"
            )));
        }
    }
    Ok(())
}

/// Validate a tag set: bounded count, each tag non-blank and within length.
///
/// Duplicates are rejected rather than silently deduplicated so the client
/// learns about the mistake.
pub fn validate_tags(tags: &[String]) -> Result<(), CoreError> {
    if tags.len() > MAX_TAGS {
        return Err(CoreError::Validation(format!(
            "A note may carry at most {MAX_TAGS} tags"
        )));
    }
    for tag in tags {
        if tag.trim().is_empty() {
            return Err(CoreError::Validation(
                "Tags must not be blank".to_string(),
            ));
        }
        if tag.len() > MAX_TAG_LENGTH {
            return Err(CoreError::Validation(format!(
                "Tag '{tag}' exceeds maximum length of {MAX_TAG_LENGTH} characters"
            )));
        }
    }
    for (i, tag) in tags.iter().enumerate() {
        if tags[..i].contains(tag) {
            return Err(CoreError::Validation(format!("Duplicate tag '{tag}'")));
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
            NoteStatus::Draft,
            NoteStatus::UnderReview,
            NoteStatus::Approved,
            NoteStatus::Published,
            NoteStatus::Archived,
        ] {
            assert_eq!(status.as_str().parse::<NoteStatus>().unwrap(), status);
        }
    }

    #[test]
    fn test_unknown_status_rejected() {
        assert!("pending".parse::<NoteStatus>().is_err());
    }

    #[test]
    fn test_only_drafts_enter_review() {
        assert!(NoteStatus::Draft.can_enter_review());
        assert!(!NoteStatus::UnderReview.can_enter_review());
        assert!(!NoteStatus::Approved.can_enter_review());
        assert!(!NoteStatus::Published.can_enter_review());
        assert!(!NoteStatus::Archived.can_enter_review());
    }

    #[test]
    fn test_publish_requires_approved() {
        assert!(check_publish(NoteStatus::Approved).is_ok());
        for status in [
            NoteStatus::Draft,
            NoteStatus::UnderReview,
            NoteStatus::Published,
            NoteStatus::Archived,
        ] {
            let result = check_publish(status);
            assert!(result.is_err(), "publish from {status} should fail");
            assert!(result
                .unwrap_err()
                .to_string()
                .contains("Invalid transition"));
        }
    }

    #[test]
    fn test_archive_is_one_way() {
        for status in [
            NoteStatus::Draft,
            NoteStatus::UnderReview,
            NoteStatus::Approved,
            NoteStatus::Published,
        ] {
            assert!(check_archive(status).is_ok());
        }
        assert!(check_archive(NoteStatus::Archived).is_err());
    }

    #[test]
    fn test_empty_title_rejected() {
        assert!(validate_title("").is_err());
        assert!(validate_title("   ").is_err());
        assert!(validate_title("Ward round, bed 12").is_ok());
    }

    #[test]
    fn test_overlong_title_rejected() {
        let long = "x".repeat(MAX_TITLE_LENGTH + 1);
        let result = validate_title(&long);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("maximum length"));
    }

    #[test]
    fn test_empty_body_rejected() {
        assert!(validate_body("  \n ").is_err());
        assert!(validate_body("Patient stable overnight.").is_ok());
    }

    #[test]
    fn test_blank_topic_rejected_but_absent_topic_ok() {
        assert!(validate_topic(&None).is_ok());
        assert!(validate_topic(&Some("cardiology".to_string())).is_ok());
        assert!(validate_topic(&Some("  ".to_string())).is_err());
    }

    #[test]
    fn test_tag_limits() {
        let ok = vec!["icu".to_string(), "post-op".to_string()];
        assert!(validate_tags(&ok).is_ok());

        let too_many: Vec<String> = (0..=MAX_TAGS).map(|i| format!("t{i}")).collect();
        assert!(validate_tags(&too_many).is_err());

        let blank = vec!["icu".to_string(), " ".to_string()];
        assert!(validate_tags(&blank).is_err());

        let dup = vec!["icu".to_string(), "icu".to_string()];
        let result = validate_tags(&dup);
        assert!(result.is_err());
        assert!(result.unwrap_err().to_string().contains("Duplicate tag"));
    }
}
