//! Case-note entity model and DTOs.

use serde::{Deserialize, Serialize};
use sqlx::FromRow;

use caselog_core::error::CoreError;
use caselog_core::note::NoteStatus;
use caselog_core::types::{DbId, Timestamp};

/// A row from the `notes` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct Note {
    pub id: DbId,
    pub workspace_id: DbId,
    pub author_id: DbId,
    pub title: String,
    pub body: String,
    pub topic: Option<String>,
    pub tags: Vec<String>,
    pub recommend_for_journal: bool,
    pub status: String,
    pub published_at: Option<Timestamp>,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}

impl Note {
    /// The note's status, parsed from the stored form.
    pub fn status(&self) -> Result<NoteStatus, CoreError> {
        self.status.parse()
    }
}

/// DTO for creating a new draft note.
#[derive(Debug, Deserialize)]
pub struct CreateNote {
    pub title: String,
    pub body: String,
    pub topic: Option<String>,
    #[serde(default)]
    pub tags: Vec<String>,
    #[serde(default)]
    pub recommend_for_journal: bool,
}

/// DTO for updating a note's content. Only provided fields change.
#[derive(Debug, Deserialize)]
pub struct UpdateNote {
    pub title: Option<String>,
    pub body: Option<String>,
    pub topic: Option<String>,
    pub tags: Option<Vec<String>>,
    pub recommend_for_journal: Option<bool>,
}

/// Query parameters for listing notes.
#[derive(Debug, Deserialize)]
pub struct NoteListParams {
    pub status: Option<String>,
    pub page: Option<i64>,
    pub page_size: Option<i64>,
}
