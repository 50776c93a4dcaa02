use bookshare_kernel::model::{Book, BookId, BorrowTransaction, TransactionId, UserId};
use serde::{Deserialize, Serialize};

/// Mean rating rounded to one decimal, `0.0` for books without feedback.
pub fn display_rate(average: Option<f64>) -> f64 {
    average.map_or(0.0, |avg| (avg * 10.0).round() / 10.0)
}

/// Public projection of a book listing.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BookView {
    pub id: BookId,
    pub title: String,
    pub author_name: String,
    pub isbn: String,
    pub synopsis: Option<String>,
    pub owner: UserId,
    pub cover: Option<String>,
    pub rate: f64,
    pub archived: bool,
    pub shareable: bool,
}

impl BookView {
    pub fn new(book: &Book, rate: f64) -> Self {
        Self {
            id: book.id(),
            title: book.title().to_string(),
            author_name: book.author_name().to_string(),
            isbn: book.isbn().to_string(),
            synopsis: book.synopsis().map(str::to_string),
            owner: book.owner(),
            cover: book.cover().map(str::to_string),
            rate,
            archived: book.is_archived(),
            shareable: book.is_shareable(),
        }
    }
}

/// One entry of a borrower's history.
#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct BorrowedBookView {
    pub id: TransactionId,
    pub book_id: BookId,
    pub title: String,
    pub author_name: String,
    pub isbn: String,
    pub rate: f64,
    pub returned: bool,
    pub return_approved: bool,
}

impl BorrowedBookView {
    pub fn new(transaction: &BorrowTransaction, book: &Book, rate: f64) -> Self {
        Self {
            id: transaction.id(),
            book_id: book.id(),
            title: book.title().to_string(),
            author_name: book.author_name().to_string(),
            isbn: book.isbn().to_string(),
            rate,
            returned: transaction.is_returned(),
            return_approved: transaction.is_return_approved(),
        }
    }
}

/// Body of the cover assignment endpoint; `cover` is the reference returned
/// by the storage service.
#[derive(Debug, Clone, Deserialize)]
pub struct CoverRequest {
    pub cover: String,
}
