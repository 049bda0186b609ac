//! Caselog domain layer.
//!
//! Pure domain logic with no database or transport dependencies: shared id
//! and timestamp types, the error taxonomy, workspace roles and their
//! capability predicates, and the note / review-request / journal state
//! machines. The data layer (`caselog-db`) consults this crate for every
//! transition decision; the API layer maps [`error::CoreError`] onto HTTP.

pub mod error;
pub mod journal;
pub mod note;
pub mod review;
pub mod roles;
pub mod types;
