//! User entity model.
//!
//! Users are provisioned outside this system (the identity provider owns
//! them); the row exists so actions and notifications can reference a
//! stable id and email.

use serde::Serialize;
use sqlx::FromRow;

use caselog_core::types::{DbId, Timestamp};

/// A row from the `users` table.
#[derive(Debug, Clone, FromRow, Serialize)]
pub struct User {
    pub id: DbId,
    pub email: String,
    pub display_name: String,
    pub created_at: Timestamp,
    pub updated_at: Timestamp,
}
