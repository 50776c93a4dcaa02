//! Which books and borrow records an actor gets to see.

use bookshare_db::Repository;
use bookshare_kernel::model::{Book, BookId, BorrowTransaction, UserId};
use bookshare_kernel::{DomainError, Page, PageRequest};

use super::load_book;
use super::models::{display_rate, BookView, BorrowedBookView};

pub struct Catalog<'r, R: Repository + ?Sized> {
    repo: &'r R,
}

impl<'r, R: Repository + ?Sized> Catalog<'r, R> {
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }

    pub fn find_book(&self, book_id: BookId) -> Result<BookView, DomainError> {
        let book = load_book(self.repo, book_id)?;
        let rate = display_rate(self.repo.average_rating(book_id)?);
        Ok(BookView::new(&book, rate))
    }

    /// Books in circulation that belong to someone other than `actor`,
    /// newest first.
    pub fn displayable_books(
        &self,
        actor: UserId,
        request: PageRequest,
    ) -> Result<Page<BookView>, DomainError> {
        let page = self.repo.find_displayable_books(actor, request)?;
        self.with_rates(page)
    }

    pub fn owned_books(
        &self,
        actor: UserId,
        request: PageRequest,
    ) -> Result<Page<BookView>, DomainError> {
        let page = self.repo.find_books_by_owner(actor, request)?;
        self.with_rates(page)
    }

    /// The actor's borrows that are active or awaiting approval.
    pub fn borrowed_history(
        &self,
        actor: UserId,
        request: PageRequest,
    ) -> Result<Page<BorrowedBookView>, DomainError> {
        let page = self.repo.find_borrowed_transactions(actor, request)?;
        self.project_history(page)
    }

    /// The actor's borrows whose return the owner approved.
    pub fn returned_history(
        &self,
        actor: UserId,
        request: PageRequest,
    ) -> Result<Page<BorrowedBookView>, DomainError> {
        let page = self.repo.find_returned_transactions(actor, request)?;
        self.project_history(page)
    }

    fn with_rates(&self, page: Page<Book>) -> Result<Page<BookView>, DomainError> {
        page.try_map(|book| {
            let rate = display_rate(self.repo.average_rating(book.id())?);
            Ok(BookView::new(&book, rate))
        })
    }

    fn project_history(
        &self,
        page: Page<BorrowTransaction>,
    ) -> Result<Page<BorrowedBookView>, DomainError> {
        page.try_map(|transaction| {
            let book = load_book(self.repo, transaction.book())?;
            let rate = display_rate(self.repo.average_rating(book.id())?);
            Ok(BorrowedBookView::new(&transaction, &book, rate))
        })
    }
}
