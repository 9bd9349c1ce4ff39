pub mod company_repository;
pub mod invoice_repository;

#[derive(thiserror::Error, Debug)]
pub enum RepoError {
    #[error("db error: {0}")]
    DbError(String),

    /// Unique, not-null, foreign-key or check constraint rejected the write.
    #[error("constraint violation: {0}")]
    Constraint(String),
}
