//! Error types for the `domain` layer.
use entity_api::error::{EntityApiErrorKind, Error as EntityApiError};
use std::error::Error as StdError;
use std::fmt;

/// Top-level domain error type.
/// Errors in the Domain layer are modeled as a tree structure
/// with `domain::error::Error` as the root type holding a tree of `error_kind`
/// enums that represent the kinds of errors that can occur in the domain layer or
/// in lower layers. The `source` field is used to hold the original error that caused
/// the domain error. The intent is to translate errors between layers while maintaining
/// layer boundaries. Ex. `domain` is dependent on `entity_api`, and `web` is dependent on `domain`.
/// but `web` should not be dependent, directly, on `entity_api`. Ultimately the various
/// `error_kind`s are used by `web` to return appropriate HTTP status codes to the client.
#[derive(Debug)]
pub struct Error {
    pub source: Option<Box<dyn StdError + Send + Sync>>,
    pub error_kind: DomainErrorKind,
}

/// Enum representing the major categories of errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum DomainErrorKind {
    Internal(InternalErrorKind),
    External(ExternalErrorKind),
    Business(BusinessErrorKind),
}

/// Enum representing the various kinds of internal errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum InternalErrorKind {
    Entity(EntityErrorKind),
    Config,
    Other(String),
}

/// Enum representing the various kinds of entity errors that can bubble up from the "Entity" layer (`entity_api` and `entity`).
/// These errors are translated from the `entity_api` layer to the `domain` layer and reduced to a subset of error kinds
/// that are relevant to the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum EntityErrorKind {
    NotFound,
    Invalid,
    Unauthenticated,
    DbTransaction,
    Other(String),
}

/// Enum representing the various kinds of external errors that can occur in the `domain` layer.
#[derive(Debug, PartialEq)]
pub enum ExternalErrorKind {
    Network,
    Other(String),
}

/// Rule violations detected by the domain itself, each carrying a human readable reason.
#[derive(Debug, PartialEq)]
pub enum BusinessErrorKind {
    /// The trainer's plan does not allow another student
    PlanLimitReached,
    InvalidInput(String),
    Conflict(String),
    Forbidden(String),
}

impl Error {
    pub fn business(kind: BusinessErrorKind) -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Business(kind),
        }
    }

    pub fn invalid_input(reason: impl Into<String>) -> Self {
        Self::business(BusinessErrorKind::InvalidInput(reason.into()))
    }

    pub fn conflict(reason: impl Into<String>) -> Self {
        Self::business(BusinessErrorKind::Conflict(reason.into()))
    }

    pub fn forbidden(reason: impl Into<String>) -> Self {
        Self::business(BusinessErrorKind::Forbidden(reason.into()))
    }

    pub fn plan_limit_reached() -> Self {
        Self::business(BusinessErrorKind::PlanLimitReached)
    }

    pub fn not_found() -> Self {
        Error {
            source: None,
            error_kind: DomainErrorKind::Internal(InternalErrorKind::Entity(
                EntityErrorKind::NotFound,
            )),
        }
    }
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        write!(f, "Domain Error: {self:?}")
    }
}

impl StdError for Error {
    fn source(&self) -> Option<&(dyn StdError + 'static)> {
        self.source
            .as_ref()
            .map(|e| e.as_ref() as &(dyn StdError + 'static))
    }
}

// This is where we translate errors from the `entity_api` layer to the `domain` layer.
impl From<EntityApiError> for Error {
    fn from(err: EntityApiError) -> Self {
        let error_kind = match err.error_kind {
            EntityApiErrorKind::RecordNotFound => {
                DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::NotFound))
            }
            EntityApiErrorKind::InvalidQueryTerm | EntityApiErrorKind::ValidationError => {
                DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Invalid))
            }
            EntityApiErrorKind::RecordUnauthenticated => DomainErrorKind::Internal(
                InternalErrorKind::Entity(EntityErrorKind::Unauthenticated),
            ),
            EntityApiErrorKind::RecordAlreadyExists => DomainErrorKind::Business(
                BusinessErrorKind::Conflict("record already exists".to_string()),
            ),
            EntityApiErrorKind::SystemError => DomainErrorKind::Internal(
                InternalErrorKind::Entity(EntityErrorKind::DbTransaction),
            ),
            _ => DomainErrorKind::Internal(InternalErrorKind::Entity(EntityErrorKind::Other(
                "EntityErrorKind".to_string(),
            ))),
        };

        Error {
            source: Some(Box::new(err)),
            error_kind,
        }
    }
}

// Transaction begin/commit failures come straight from SeaORM.
impl From<sea_orm::DbErr> for Error {
    fn from(err: sea_orm::DbErr) -> Self {
        EntityApiError::from(err).into()
    }
}
