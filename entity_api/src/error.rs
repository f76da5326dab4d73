//! Error types for entity API
use std::error::Error as StdError;
use std::fmt;

use serde::Serialize;

use sea_orm::error::{DbErr, SqlErr};

/// Errors while executing operations related to entities.
/// The intent is to categorize errors into two major types:
///  * Errors related to data. Ex DbError::RecordNotFound
///  * Errors related to interactions with the database itself. Ex DbError::Conn
#[derive(Debug, PartialEq)]
pub struct Error {
    // Underlying error emitted from seaORM internals
    pub source: Option<DbErr>,
    // Enum representing which category of error
    pub error_kind: EntityApiErrorKind,
}

#[derive(Debug, PartialEq, Serialize)]
pub enum EntityApiErrorKind {
    // Invalid search term
    InvalidQueryTerm,
    // Record not found
    RecordNotFound,
    // Record not updated
    RecordNotUpdated,
    // A unique constraint rejected the write (duplicate email, duplicate link)
    RecordAlreadyExists,
    // Record not authenticated
    RecordUnauthenticated,
    // Errors related to interactions with the database itself. Ex DbError::Conn
    SystemError,
    // Validation error
    ValidationError,
    // Other errors
    Other,
}

impl Error {
    pub fn not_found() -> Self {
        Error {
            source: None,
            error_kind: EntityApiErrorKind::RecordNotFound,
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Entity API Error: {:?}", self)
    }
}

impl StdError for Error {}

impl From<DbErr> for Error {
    fn from(err: DbErr) -> Self {
        if let Some(SqlErr::UniqueConstraintViolation(_)) = err.sql_err() {
            return Error {
                source: Some(err),
                error_kind: EntityApiErrorKind::RecordAlreadyExists,
            };
        }

        let error_kind = match err {
            DbErr::RecordNotFound(_) => EntityApiErrorKind::RecordNotFound,
            DbErr::RecordNotUpdated => EntityApiErrorKind::RecordNotUpdated,
            DbErr::Json(_) | DbErr::Type(_) => EntityApiErrorKind::ValidationError,
            _ => EntityApiErrorKind::SystemError,
        };

        Error {
            source: Some(err),
            error_kind,
        }
    }
}
