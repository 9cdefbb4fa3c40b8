//! Error type definitions
//!
//! Repository failures are classified once (constraint violation, missing
//! row, anything else) and services surface them as [`AppError`].

use sea_orm::{DbErr, SqlErr};
use thiserror::Error;

use crate::services::stream_prober::ProbeError;

/// Top-level application error type
#[derive(Error, Debug)]
pub enum AppError {
    /// Database-related errors (SeaORM)
    #[error("Database error: {0}")]
    Database(#[from] DbErr),

    /// Repository layer errors
    #[error("Repository error: {0}")]
    Repository(#[from] RepositoryError),

    /// Invalid caller input
    #[error("Validation error: {message}")]
    Validation { message: String },

    /// Resource not found errors
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },

    /// Duplicate combination or duplicate unique field
    #[error("Conflict: {resource} - {message}")]
    Conflict { resource: String, message: String },

    /// Live stream probe failures
    #[error("Probe failed: {0}")]
    Probe(#[from] ProbeError),

    /// Generic internal errors
    #[error("Internal error: {message}")]
    Internal { message: String },
}

/// Repository layer specific errors
#[derive(Error, Debug)]
pub enum RepositoryError {
    /// Database errors from SeaORM
    #[error("Database error: {0}")]
    Database(DbErr),

    /// Constraint violations (unique, foreign key, etc.)
    #[error("Constraint violation: {constraint} - {message}")]
    ConstraintViolation { constraint: String, message: String },

    /// Record not found
    #[error("Not found: {resource} with id {id}")]
    NotFound { resource: String, id: String },
}

impl From<DbErr> for RepositoryError {
    fn from(err: DbErr) -> Self {
        match err.sql_err() {
            Some(SqlErr::UniqueConstraintViolation(message)) => Self::ConstraintViolation {
                constraint: "unique".to_string(),
                message,
            },
            Some(SqlErr::ForeignKeyConstraintViolation(message)) => Self::ConstraintViolation {
                constraint: "foreign_key".to_string(),
                message,
            },
            _ => Self::Database(err),
        }
    }
}

impl RepositoryError {
    pub fn not_found<R: Into<String>, I: ToString>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }
}

/// Convenience methods for creating common error types
impl AppError {
    /// Create a validation error with a custom message
    pub fn validation<S: Into<String>>(message: S) -> Self {
        Self::Validation {
            message: message.into(),
        }
    }

    pub fn not_found<R: Into<String>, I: ToString>(resource: R, id: I) -> Self {
        Self::NotFound {
            resource: resource.into(),
            id: id.to_string(),
        }
    }

    pub fn conflict<R: Into<String>, M: Into<String>>(resource: R, message: M) -> Self {
        Self::Conflict {
            resource: resource.into(),
            message: message.into(),
        }
    }

    /// Create an internal error
    pub fn internal<S: Into<String>>(message: S) -> Self {
        Self::Internal {
            message: message.into(),
        }
    }

    /// Lift a repository error, turning constraint violations into conflicts on
    /// `resource` and missing rows into not-found errors.
    pub fn from_repository<R: Into<String>>(resource: R, err: RepositoryError) -> Self {
        match err {
            RepositoryError::ConstraintViolation { message, .. } => Self::conflict(resource, message),
            RepositoryError::NotFound { resource, id } => Self::NotFound { resource, id },
            other => Self::Repository(other),
        }
    }
}
