use caselog_core::error::CoreError;

/// Error type for the data layer.
///
/// Plain CRUD repositories return bare `sqlx::Error`; the workflow engines
/// also surface domain errors (precondition failures, capability checks)
/// discovered inside their transactions, so their methods return this
/// two-sided type. The API layer maps each side independently.
#[derive(Debug, thiserror::Error)]
pub enum DbError {
    #[error(transparent)]
    Core(#[from] CoreError),

    #[error(transparent)]
    Sqlx(#[from] sqlx::Error),
}

/// Convenience alias for workflow-engine return values.
pub type DbResult<T> = Result<T, DbError>;
