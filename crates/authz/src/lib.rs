//! Access policy for the lending engine.
//!
//! The predicates are pure functions over the actor and the entities handed
//! in; they never consult the store. The `ensure_*` guards wrap them and
//! produce the typed rejection every mutating operation propagates.

use bookshare_kernel::model::{Book, UserId};
use bookshare_kernel::{DomainError, ForbiddenReason};

pub fn is_owner(actor: UserId, book: &Book) -> bool {
    book.owner() == actor
}

/// A book may circulate only while it is shareable and not archived.
pub fn is_borrowable(book: &Book) -> bool {
    !book.is_archived() && book.is_shareable()
}

/// Whether the actor would be acting on their own listing.
pub fn is_self_transaction(actor: UserId, book: &Book) -> bool {
    is_owner(actor, book)
}

fn deny(actor: UserId, book: &Book, reason: ForbiddenReason) -> DomainError {
    tracing::debug!(%actor, book_id = %book.id(), %reason, "access denied");
    DomainError::forbidden(reason)
}

pub fn ensure_owner(actor: UserId, book: &Book) -> Result<(), DomainError> {
    if is_owner(actor, book) {
        Ok(())
    } else {
        Err(deny(actor, book, ForbiddenReason::NotOwner))
    }
}

pub fn ensure_borrowable(actor: UserId, book: &Book) -> Result<(), DomainError> {
    if is_borrowable(book) {
        Ok(())
    } else {
        Err(deny(actor, book, ForbiddenReason::NonShareableOrArchived))
    }
}

pub fn ensure_not_own_book(actor: UserId, book: &Book) -> Result<(), DomainError> {
    if is_self_transaction(actor, book) {
        Err(deny(actor, book, ForbiddenReason::OwnBook))
    } else {
        Ok(())
    }
}

/// Gate shared by borrow, return, and feedback submission: the book must be
/// in circulation and must belong to someone else. Circulation is checked
/// first.
pub fn ensure_can_circulate(actor: UserId, book: &Book) -> Result<(), DomainError> {
    ensure_borrowable(actor, book)?;
    ensure_not_own_book(actor, book)
}
