pub mod config;

use diesel::result::{DatabaseErrorKind, Error as DieselError};
use thiserror::Error;

/** Holds the errors raised while reading or writing the schema */
#[derive(Debug, Error)]
pub enum AppError {
    /// A UNIQUE key (single column or pair) already holds the value.
    #[error("uniqueness violation: {0}")]
    UniquenessViolation(String),
    /// A foreign key names a missing row, or a delete would orphan dependents.
    #[error("referential integrity violation: {0}")]
    ReferentialIntegrityViolation(String),
    /// A value lies outside its column's domain (enum code, length, shape).
    #[error("domain violation: {0}")]
    DomainViolation(String),
    #[error("row not found")]
    NotFound,
    #[error("database error: {0}")]
    Database(DieselError),
    #[error("connection pool error: {0}")]
    Pool(#[from] diesel::r2d2::PoolError),
    #[error("connection error: {0}")]
    Connection(#[from] diesel::ConnectionError),
    #[error("migration error: {0}")]
    Migration(#[from] diesel_migrations::RunMigrationsError),
    #[error("configuration error: {0}")]
    Config(String),
}

impl AppError {
    /// True for the three recoverable kinds a write can be rejected with.
    pub fn is_constraint_violation(&self) -> bool {
        matches!(
            self,
            AppError::UniquenessViolation(_)
                | AppError::ReferentialIntegrityViolation(_)
                | AppError::DomainViolation(_)
        )
    }
}

// Matched when diesel reports a constraint failure with an unknown kind.
const UNIQUE_PREFIX: &str = "UNIQUE constraint failed: ";
const FOREIGN_KEY_PREFIX: &str = "FOREIGN KEY constraint failed";
const CHECK_PREFIX: &str = "CHECK constraint failed: ";

impl From<DieselError> for AppError {
    fn from(err: DieselError) -> Self {
        match err {
            DieselError::NotFound => AppError::NotFound,
            DieselError::DatabaseError(kind, info) => {
                let message = info.message().to_string();
                match kind {
                    DatabaseErrorKind::UniqueViolation => AppError::UniquenessViolation(
                        message.trim_start_matches(UNIQUE_PREFIX).to_string(),
                    ),
                    DatabaseErrorKind::ForeignKeyViolation => {
                        AppError::ReferentialIntegrityViolation(message)
                    }
                    _ if message.starts_with(UNIQUE_PREFIX) => AppError::UniquenessViolation(
                        message[UNIQUE_PREFIX.len()..].to_string(),
                    ),
                    _ if message.starts_with(FOREIGN_KEY_PREFIX) => {
                        AppError::ReferentialIntegrityViolation(message)
                    }
                    _ if message.starts_with(CHECK_PREFIX) => {
                        AppError::DomainViolation(message[CHECK_PREFIX.len()..].to_string())
                    }
                    _ => AppError::Database(DieselError::DatabaseError(kind, info)),
                }
            }
            other => AppError::Database(other),
        }
    }
}
