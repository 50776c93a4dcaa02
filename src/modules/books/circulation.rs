//! Borrow / return / approve state machine and the owner-only listing
//! controls.
//!
//! Every operation loads the book, runs the access-policy guards, and only
//! then writes. A rejected call never touches the store.
//!
//! Borrowing is checked per (book, borrower): several users may hold an
//! active borrow on the same book at once. Inventory is not modelled.

use bookshare_authz as authz;
use bookshare_db::Repository;
use bookshare_kernel::model::{Book, BookDraft, BookId, BorrowTransaction, TransactionId, UserId};
use bookshare_kernel::{DomainError, ForbiddenReason};
use time::OffsetDateTime;

use super::load_book;

pub struct Circulation<'r, R: Repository + ?Sized> {
    repo: &'r mut R,
}

impl<'r, R: Repository + ?Sized> Circulation<'r, R> {
    pub fn new(repo: &'r mut R) -> Self {
        Self { repo }
    }

    /// List a new book owned by `actor`.
    pub fn create_book(
        &mut self,
        actor: UserId,
        draft: BookDraft,
    ) -> Result<BookId, DomainError> {
        let book = Book::new(actor, draft, OffsetDateTime::now_utc())?;
        let id = self.repo.save_book(&book)?;
        tracing::info!(%actor, book_id = %id, "book listed");
        Ok(id)
    }

    pub fn borrow(
        &mut self,
        actor: UserId,
        book_id: BookId,
    ) -> Result<TransactionId, DomainError> {
        let book = load_book(&*self.repo, book_id)?;
        authz::ensure_can_circulate(actor, &book)?;

        if self.repo.has_active_transaction(book_id, actor)? {
            tracing::debug!(%actor, %book_id, "borrow rejected: already borrowed");
            return Err(DomainError::forbidden(ForbiddenReason::AlreadyBorrowed));
        }

        let transaction = BorrowTransaction::open(book_id, actor, OffsetDateTime::now_utc());
        let id = self.repo.save_transaction(&transaction)?;
        tracing::info!(%actor, %book_id, transaction_id = %id, "book borrowed");
        Ok(id)
    }

    /// Move the actor's current borrow of the book to pending approval.
    pub fn return_book(
        &mut self,
        actor: UserId,
        book_id: BookId,
    ) -> Result<TransactionId, DomainError> {
        let book = load_book(&*self.repo, book_id)?;
        authz::ensure_can_circulate(actor, &book)?;

        let mut transaction = self
            .repo
            .find_transaction_by_book_and_borrower(book_id, actor)?
            .ok_or_else(|| DomainError::forbidden(ForbiddenReason::NotBorrowed))?;
        transaction
            .mark_returned(OffsetDateTime::now_utc())
            .map_err(|state| {
                tracing::debug!(%actor, %book_id, ?state, "return rejected");
                DomainError::forbidden(ForbiddenReason::NotBorrowed)
            })?;

        let id = self.repo.save_transaction(&transaction)?;
        tracing::info!(%actor, %book_id, transaction_id = %id, "book returned");
        Ok(id)
    }

    /// Confirm a pending return. The lookup is scoped to the book's owner,
    /// so any other actor is told the book is not yet returned.
    pub fn approve_return(
        &mut self,
        actor: UserId,
        book_id: BookId,
    ) -> Result<TransactionId, DomainError> {
        let book = load_book(&*self.repo, book_id)?;
        authz::ensure_borrowable(actor, &book)?;

        let mut transaction = self
            .repo
            .find_transaction_by_book_and_owner(book_id, actor, true)?
            .ok_or_else(|| DomainError::forbidden(ForbiddenReason::NotYetReturned))?;
        transaction
            .approve_return(OffsetDateTime::now_utc())
            .map_err(|_| DomainError::forbidden(ForbiddenReason::NotYetReturned))?;

        let id = self.repo.save_transaction(&transaction)?;
        tracing::info!(%actor, %book_id, transaction_id = %id, "return approved");
        Ok(id)
    }

    pub fn toggle_shareable(
        &mut self,
        actor: UserId,
        book_id: BookId,
    ) -> Result<BookId, DomainError> {
        let mut book = self.owned_book(actor, book_id)?;
        let shareable = book.toggle_shareable(OffsetDateTime::now_utc());
        self.repo.save_book(&book)?;
        tracing::info!(%actor, %book_id, shareable, "shareable toggled");
        Ok(book_id)
    }

    pub fn toggle_archived(
        &mut self,
        actor: UserId,
        book_id: BookId,
    ) -> Result<BookId, DomainError> {
        let mut book = self.owned_book(actor, book_id)?;
        let archived = book.toggle_archived(OffsetDateTime::now_utc());
        self.repo.save_book(&book)?;
        tracing::info!(%actor, %book_id, archived, "archived toggled");
        Ok(book_id)
    }

    /// Attach a cover reference produced by the storage service.
    pub fn assign_cover(
        &mut self,
        actor: UserId,
        book_id: BookId,
        cover: String,
    ) -> Result<(), DomainError> {
        if cover.trim().is_empty() {
            return Err(DomainError::validation("cover", "must not be blank"));
        }
        let mut book = self.owned_book(actor, book_id)?;
        book.set_cover(cover, OffsetDateTime::now_utc());
        self.repo.save_book(&book)?;
        tracing::info!(%actor, %book_id, "cover assigned");
        Ok(())
    }

    fn owned_book(&self, actor: UserId, book_id: BookId) -> Result<Book, DomainError> {
        let book = load_book(&*self.repo, book_id)?;
        authz::ensure_owner(actor, &book)?;
        Ok(book)
    }
}
