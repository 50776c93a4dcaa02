//! Lending domain entities.
//!
//! Entities are built through validating constructors and mutated only
//! through methods that keep their invariants; fields are private.

use std::fmt;
use std::str::FromStr;

use serde::{Deserialize, Serialize};
use time::OffsetDateTime;
use uuid::Uuid;

use crate::error::DomainError;

pub const MIN_RATING: f64 = 1.0;
pub const MAX_RATING: f64 = 5.0;

macro_rules! entity_id {
    ($(#[$meta:meta])* $name:ident) => {
        $(#[$meta])*
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
        #[serde(transparent)]
        pub struct $name(Uuid);

        impl $name {
            /// Generate a fresh time-ordered identifier.
            pub fn new() -> Self {
                Self(Uuid::now_v7())
            }
        }

        impl Default for $name {
            fn default() -> Self {
                Self::new()
            }
        }

        impl fmt::Display for $name {
            fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
                self.0.fmt(f)
            }
        }

        impl FromStr for $name {
            type Err = uuid::Error;

            fn from_str(s: &str) -> Result<Self, Self::Err> {
                Uuid::parse_str(s).map(Self)
            }
        }
    };
}

entity_id!(
    /// Identity of an authenticated user, supplied by the identity collaborator.
    UserId
);
entity_id!(BookId);
entity_id!(TransactionId);
entity_id!(FeedbackId);

/// Audit columns embedded in every entity.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuditInfo {
    created_by: UserId,
    created_at: OffsetDateTime,
    modified_at: Option<OffsetDateTime>,
}

impl AuditInfo {
    pub fn new(created_by: UserId, created_at: OffsetDateTime) -> Self {
        Self {
            created_by,
            created_at,
            modified_at: None,
        }
    }

    pub fn created_by(&self) -> UserId {
        self.created_by
    }

    pub fn created_at(&self) -> OffsetDateTime {
        self.created_at
    }

    pub fn modified_at(&self) -> Option<OffsetDateTime> {
        self.modified_at
    }

    pub fn touch(&mut self, now: OffsetDateTime) {
        self.modified_at = Some(now);
    }
}

/// Owner-supplied fields for a new listing.
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct BookDraft {
    pub title: String,
    pub author_name: String,
    pub isbn: String,
    #[serde(default)]
    pub synopsis: Option<String>,
    #[serde(default)]
    pub shareable: bool,
}

fn require_non_blank(field: &'static str, value: &str) -> Result<(), DomainError> {
    if value.trim().is_empty() {
        return Err(DomainError::validation(field, "must not be blank"));
    }
    Ok(())
}

#[derive(Debug, Clone, PartialEq)]
pub struct Book {
    id: BookId,
    owner: UserId,
    title: String,
    author_name: String,
    isbn: String,
    synopsis: Option<String>,
    shareable: bool,
    archived: bool,
    cover: Option<String>,
    audit: AuditInfo,
}

impl Book {
    /// Create a listing owned by `owner`. New books are never archived.
    pub fn new(owner: UserId, draft: BookDraft, now: OffsetDateTime) -> Result<Self, DomainError> {
        require_non_blank("title", &draft.title)?;
        require_non_blank("author_name", &draft.author_name)?;
        require_non_blank("isbn", &draft.isbn)?;

        Ok(Self {
            id: BookId::new(),
            owner,
            title: draft.title,
            author_name: draft.author_name,
            isbn: draft.isbn,
            synopsis: draft.synopsis,
            shareable: draft.shareable,
            archived: false,
            cover: None,
            audit: AuditInfo::new(owner, now),
        })
    }

    pub fn id(&self) -> BookId {
        self.id
    }

    pub fn owner(&self) -> UserId {
        self.owner
    }

    pub fn title(&self) -> &str {
        &self.title
    }

    pub fn author_name(&self) -> &str {
        &self.author_name
    }

    pub fn isbn(&self) -> &str {
        &self.isbn
    }

    pub fn synopsis(&self) -> Option<&str> {
        self.synopsis.as_deref()
    }

    pub fn is_shareable(&self) -> bool {
        self.shareable
    }

    pub fn is_archived(&self) -> bool {
        self.archived
    }

    pub fn cover(&self) -> Option<&str> {
        self.cover.as_deref()
    }

    pub fn audit(&self) -> &AuditInfo {
        &self.audit
    }

    /// Flip the shareable flag, returning the new value.
    pub fn toggle_shareable(&mut self, now: OffsetDateTime) -> bool {
        self.shareable = !self.shareable;
        self.audit.touch(now);
        self.shareable
    }

    /// Flip the archived flag, returning the new value.
    pub fn toggle_archived(&mut self, now: OffsetDateTime) -> bool {
        self.archived = !self.archived;
        self.audit.touch(now);
        self.archived
    }

    pub fn set_cover(&mut self, cover: impl Into<String>, now: OffsetDateTime) {
        self.cover = Some(cover.into());
        self.audit.touch(now);
    }
}

/// Lifecycle position of a borrow, derived from the stored flags.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum TransactionState {
    Active,
    ReturnedPendingApproval,
    Approved,
}

#[derive(Debug, Clone, PartialEq)]
pub struct BorrowTransaction {
    id: TransactionId,
    book: BookId,
    borrower: UserId,
    returned: bool,
    return_approved: bool,
    audit: AuditInfo,
}

impl BorrowTransaction {
    /// Open a new borrow in the `Active` state.
    pub fn open(book: BookId, borrower: UserId, now: OffsetDateTime) -> Self {
        Self {
            id: TransactionId::new(),
            book,
            borrower,
            returned: false,
            return_approved: false,
            audit: AuditInfo::new(borrower, now),
        }
    }

    pub fn id(&self) -> TransactionId {
        self.id
    }

    pub fn book(&self) -> BookId {
        self.book
    }

    pub fn borrower(&self) -> UserId {
        self.borrower
    }

    pub fn is_returned(&self) -> bool {
        self.returned
    }

    pub fn is_return_approved(&self) -> bool {
        self.return_approved
    }

    pub fn audit(&self) -> &AuditInfo {
        &self.audit
    }

    pub fn state(&self) -> TransactionState {
        match (self.returned, self.return_approved) {
            (_, true) => TransactionState::Approved,
            (true, false) => TransactionState::ReturnedPendingApproval,
            (false, false) => TransactionState::Active,
        }
    }

    /// `Active -> ReturnedPendingApproval`. On any other state the current
    /// state is handed back and nothing changes.
    pub fn mark_returned(&mut self, now: OffsetDateTime) -> Result<(), TransactionState> {
        match self.state() {
            TransactionState::Active => {
                self.returned = true;
                self.audit.touch(now);
                Ok(())
            }
            other => Err(other),
        }
    }

    /// `ReturnedPendingApproval -> Approved`.
    pub fn approve_return(&mut self, now: OffsetDateTime) -> Result<(), TransactionState> {
        match self.state() {
            TransactionState::ReturnedPendingApproval => {
                self.return_approved = true;
                self.audit.touch(now);
                Ok(())
            }
            other => Err(other),
        }
    }
}

#[derive(Debug, Clone, PartialEq)]
pub struct Feedback {
    id: FeedbackId,
    book: BookId,
    rating: f64,
    comment: String,
    audit: AuditInfo,
}

impl Feedback {
    /// Rating must lie in `[MIN_RATING, MAX_RATING]` and the comment must not
    /// be blank.
    pub fn new(
        book: BookId,
        author: UserId,
        rating: f64,
        comment: impl Into<String>,
        now: OffsetDateTime,
    ) -> Result<Self, DomainError> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(DomainError::validation(
                "rating",
                format!("must be between {MIN_RATING} and {MAX_RATING}"),
            ));
        }
        let comment = comment.into();
        require_non_blank("comment", &comment)?;

        Ok(Self {
            id: FeedbackId::new(),
            book,
            rating,
            comment,
            audit: AuditInfo::new(author, now),
        })
    }

    pub fn id(&self) -> FeedbackId {
        self.id
    }

    pub fn book(&self) -> BookId {
        self.book
    }

    pub fn author(&self) -> UserId {
        self.audit.created_by()
    }

    pub fn rating(&self) -> f64 {
        self.rating
    }

    pub fn comment(&self) -> &str {
        &self.comment
    }

    pub fn audit(&self) -> &AuditInfo {
        &self.audit
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn draft() -> BookDraft {
        BookDraft {
            title: "Dune".into(),
            author_name: "Frank Herbert".into(),
            isbn: "9780441013593".into(),
            synopsis: None,
            shareable: true,
        }
    }

    #[test]
    fn new_book_is_unarchived_and_owned_by_creator() {
        let owner = UserId::new();
        let book = Book::new(owner, draft(), OffsetDateTime::UNIX_EPOCH).unwrap();
        assert_eq!(book.owner(), owner);
        assert_eq!(book.audit().created_by(), owner);
        assert!(book.is_shareable());
        assert!(!book.is_archived());
        assert!(book.audit().modified_at().is_none());
    }

    #[test]
    fn blank_title_is_rejected() {
        let mut d = draft();
        d.title = "   ".into();
        let err = Book::new(UserId::new(), d, OffsetDateTime::UNIX_EPOCH).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "title", .. }));
    }

    #[test]
    fn toggles_flip_and_touch_audit() {
        let mut book = Book::new(UserId::new(), draft(), OffsetDateTime::UNIX_EPOCH).unwrap();
        let later = OffsetDateTime::UNIX_EPOCH + time::Duration::seconds(10);
        assert!(!book.toggle_shareable(later));
        assert!(book.toggle_shareable(later));
        assert!(book.toggle_archived(later));
        assert_eq!(book.audit().modified_at(), Some(later));
    }

    #[test]
    fn transaction_walks_forward_only() {
        let now = OffsetDateTime::UNIX_EPOCH;
        let mut tx = BorrowTransaction::open(BookId::new(), UserId::new(), now);
        assert_eq!(tx.state(), TransactionState::Active);

        assert_eq!(tx.approve_return(now), Err(TransactionState::Active));
        tx.mark_returned(now).unwrap();
        assert_eq!(tx.state(), TransactionState::ReturnedPendingApproval);
        assert_eq!(
            tx.mark_returned(now),
            Err(TransactionState::ReturnedPendingApproval)
        );

        tx.approve_return(now).unwrap();
        assert_eq!(tx.state(), TransactionState::Approved);
        assert!(tx.is_returned() && tx.is_return_approved());
    }

    #[test]
    fn feedback_rating_bounds() {
        let now = OffsetDateTime::UNIX_EPOCH;
        let (book, author) = (BookId::new(), UserId::new());
        assert!(Feedback::new(book, author, 1.0, "ok", now).is_ok());
        assert!(Feedback::new(book, author, 5.0, "great", now).is_ok());
        for bad in [0.0, 5.5, f64::NAN] {
            let err = Feedback::new(book, author, bad, "meh", now).unwrap_err();
            assert!(matches!(err, DomainError::Validation { field: "rating", .. }));
        }
        let err = Feedback::new(book, author, 3.0, "", now).unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "comment", .. }));
    }

    #[test]
    fn ids_parse_from_display() {
        let id = BookId::new();
        assert_eq!(id.to_string().parse::<BookId>().unwrap(), id);
    }
}
