//! Persistence contract consumed by the lending engine.

use bookshare_kernel::model::{
    Book, BookId, BorrowTransaction, Feedback, FeedbackId, TransactionId, UserId,
};
use bookshare_kernel::{Page, PageRequest, StoreError};

pub type StoreResult<T> = Result<T, StoreError>;

/// Store operations the engine composes.
///
/// Every lookup returns `Ok(None)` when nothing matches; mapping absence to a
/// domain error is the engine's job. A `&mut` borrow of an implementation is
/// one unit of work: the checks and writes of a single engine call happen
/// through the same exclusive borrow.
///
/// Listing orders are part of the contract: books and transactions come back
/// newest first by creation time, feedback oldest first. Entries created at
/// the same instant keep their insertion order relative to each other.
pub trait Repository {
    fn find_book_by_id(&self, id: BookId) -> StoreResult<Option<Book>>;

    /// Insert or replace by id.
    fn save_book(&mut self, book: &Book) -> StoreResult<BookId>;

    /// Most recent transaction of `borrower` on `book` that is not yet
    /// return-approved.
    fn find_transaction_by_book_and_borrower(
        &self,
        book: BookId,
        borrower: UserId,
    ) -> StoreResult<Option<BorrowTransaction>>;

    /// Most recent transaction on `book` owned by `owner`. With
    /// `pending_approval_only` only returned, not yet approved transactions
    /// match; otherwise any non-approved transaction does.
    fn find_transaction_by_book_and_owner(
        &self,
        book: BookId,
        owner: UserId,
        pending_approval_only: bool,
    ) -> StoreResult<Option<BorrowTransaction>>;

    /// Whether `borrower` holds a transaction on `book` that is `Active` or
    /// `ReturnedPendingApproval`.
    fn has_active_transaction(&self, book: BookId, borrower: UserId) -> StoreResult<bool>;

    /// Insert or replace by id.
    fn save_transaction(&mut self, transaction: &BorrowTransaction)
        -> StoreResult<TransactionId>;

    fn find_feedback_by_book(
        &self,
        book: BookId,
        request: PageRequest,
    ) -> StoreResult<Page<Feedback>>;

    /// Mean rating of the book's feedback, `None` without feedback.
    fn average_rating(&self, book: BookId) -> StoreResult<Option<f64>>;

    fn save_feedback(&mut self, feedback: &Feedback) -> StoreResult<FeedbackId>;

    /// Books in circulation (shareable, not archived) not owned by `viewer`.
    fn find_displayable_books(
        &self,
        viewer: UserId,
        request: PageRequest,
    ) -> StoreResult<Page<Book>>;

    fn find_books_by_owner(&self, owner: UserId, request: PageRequest)
        -> StoreResult<Page<Book>>;

    /// Transactions of `borrower` that are not yet return-approved.
    fn find_borrowed_transactions(
        &self,
        borrower: UserId,
        request: PageRequest,
    ) -> StoreResult<Page<BorrowTransaction>>;

    /// Transactions of `borrower` whose return has been approved.
    fn find_returned_transactions(
        &self,
        borrower: UserId,
        request: PageRequest,
    ) -> StoreResult<Page<BorrowTransaction>>;

    /// Create the role if absent. Returns `true` when it was created.
    fn ensure_role(&mut self, name: &str) -> StoreResult<bool>;
}
