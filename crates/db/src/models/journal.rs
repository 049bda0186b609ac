//! Journal and journal-entry entity models and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use caselog_core::error::CoreError;
use caselog_core::journal::JournalStatus;
use caselog_core::types::{DbId, Timestamp};

/// A row from the `journals` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Journal {
    pub id: DbId,
    pub workspace_id: DbId,
    pub year: i32,
    pub month: i32,
    pub title: String,
    pub editorial_note: Option<String>,
    pub status: String,
    pub published_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Journal {
    /// The journal's status, parsed from the stored form.
    pub fn status(&self) -> Result<JournalStatus, CoreError> {
        self.status.parse()
    }
}

/// A row from the `journal_entries` table. Read-only after generation.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct JournalEntry {
    pub id: DbId,
    pub journal_id: DbId,
    pub note_id: DbId,
    pub position: i32,
    pub created_at: Timestamp,
}

/// A journal entry joined with the headline fields of its note.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct JournalEntryDetail {
    pub id: DbId,
    pub note_id: DbId,
    pub position: i32,
    pub title: String,
    pub author_id: DbId,
    pub topic: Option<String>,
    pub published_at: Option<Timestamp>,
}

/// DTO for generating a journal.
#[derive(Debug, Deserialize)]
pub struct GenerateJournal {
    pub year: i32,
    pub month: u32,
    pub title: Option<String>,
    pub editorial_note: Option<String>,
    /// Restrict the selection to notes flagged `recommend_for_journal`.
    #[serde(default)]
    pub only_recommended: bool,
}

/// Query parameters for listing journals.
#[derive(Debug, Deserialize)]
pub struct JournalListParams {
    pub status: Option<String>,
    pub year: Option<i32>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}
