//! Store Errors

use thiserror::Error;

#[derive(Error, Debug)]
pub enum StoreError {
    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),

    #[error("Constraint violated: {0}")]
    Constraint(String),

    #[error("Corrupt row: {0}")]
    Decode(String),
}

impl StoreError {
    /// Map unique/foreign-key failures onto `Constraint` so callers can tell
    /// them apart from an unavailable store.
    pub fn from_sqlx(err: sqlx::Error) -> Self {
        if let sqlx::Error::Database(db) = &err {
            if db.is_foreign_key_violation() || db.is_unique_violation() || db.is_check_violation() {
                return StoreError::Constraint(db.message().to_string());
            }
        }
        StoreError::Database(err)
    }
}

pub type Result<T> = std::result::Result<T, StoreError>;
