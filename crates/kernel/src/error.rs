//! Error taxonomy for the lending engine.

use std::fmt;

use serde::Serialize;
use thiserror::Error;

/// Policy rule an actor violated. Every variant is terminal for the request.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "kebab-case")]
pub enum ForbiddenReason {
    NotOwner,
    OwnBook,
    NonShareableOrArchived,
    AlreadyBorrowed,
    NotBorrowed,
    NotYetReturned,
}

impl ForbiddenReason {
    /// Stable machine-readable code, surfaced to clients verbatim.
    pub const fn code(self) -> &'static str {
        match self {
            Self::NotOwner => "not-owner",
            Self::OwnBook => "own-book",
            Self::NonShareableOrArchived => "non-shareable-or-archived",
            Self::AlreadyBorrowed => "already-borrowed",
            Self::NotBorrowed => "not-borrowed",
            Self::NotYetReturned => "not-yet-returned",
        }
    }

    pub const fn message(self) -> &'static str {
        match self {
            Self::NotOwner => "only the owner of this book may change it",
            Self::OwnBook => "you cannot borrow, return, or review your own book",
            Self::NonShareableOrArchived => "the book is archived or not shareable",
            Self::AlreadyBorrowed => "you already borrowed this book",
            Self::NotBorrowed => "you did not borrow this book",
            Self::NotYetReturned => "the book has not been returned yet",
        }
    }
}

impl fmt::Display for ForbiddenReason {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.code())
    }
}

/// Failure reported by the persistence collaborator.
#[derive(Error, Debug)]
pub enum StoreError {
    #[error("store unavailable: {0}")]
    Unavailable(String),
}

/// Errors surfaced by every engine operation.
///
/// Preconditions are checked before any write, so an `Err` always means the
/// store was left untouched by the failed call.
#[derive(Error, Debug)]
pub enum DomainError {
    #[error("{entity} not found: {id}")]
    NotFound { entity: &'static str, id: String },

    #[error("forbidden ({reason}): {}", reason.message())]
    Forbidden { reason: ForbiddenReason },

    #[error("invalid {field}: {message}")]
    Validation {
        field: &'static str,
        message: String,
    },

    #[error(transparent)]
    Store(#[from] StoreError),
}

impl DomainError {
    pub fn not_found(entity: &'static str, id: impl fmt::Display) -> Self {
        Self::NotFound {
            entity,
            id: id.to_string(),
        }
    }

    pub const fn forbidden(reason: ForbiddenReason) -> Self {
        Self::Forbidden { reason }
    }

    pub fn validation(field: &'static str, message: impl Into<String>) -> Self {
        Self::Validation {
            field,
            message: message.into(),
        }
    }

    /// The violated rule, if this is a policy rejection.
    pub fn forbidden_reason(&self) -> Option<ForbiddenReason> {
        match self {
            Self::Forbidden { reason } => Some(*reason),
            _ => None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn forbidden_display_includes_code_and_message() {
        let err = DomainError::forbidden(ForbiddenReason::AlreadyBorrowed);
        assert_eq!(
            err.to_string(),
            "forbidden (already-borrowed): you already borrowed this book"
        );
        assert_eq!(err.forbidden_reason(), Some(ForbiddenReason::AlreadyBorrowed));
    }

    #[test]
    fn reason_serializes_as_code() {
        let json = serde_json::to_string(&ForbiddenReason::NonShareableOrArchived).unwrap();
        assert_eq!(json, "\"non-shareable-or-archived\"");
    }

    #[test]
    fn store_errors_convert() {
        let err: DomainError = StoreError::Unavailable("disk gone".into()).into();
        assert!(matches!(err, DomainError::Store(_)));
        assert_eq!(err.forbidden_reason(), None);
    }
}
