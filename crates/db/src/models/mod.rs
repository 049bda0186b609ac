//! Domain model structs and DTOs.
//!
//! Each submodule contains:
//! - A `FromRow` + `Serialize` entity struct matching the database row
//! - A `Deserialize` create DTO for inserts
//! - A `Deserialize` update DTO (all `Option` fields) for patches
//!
//! Status, role, and priority columns are stored as `TEXT` and parsed into
//! the caselog-core enums through accessor methods; all transition logic
//! operates on the parsed values.

pub mod journal;
pub mod note;
pub mod review;
pub mod user;
pub mod workspace;
