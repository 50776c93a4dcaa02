//! In-process implementation of [`Repository`].

use std::collections::BTreeSet;

use bookshare_kernel::model::{
    Book, BookId, BorrowTransaction, Feedback, FeedbackId, TransactionId, TransactionState,
    UserId,
};
use bookshare_kernel::{Page, PageRequest};
use time::OffsetDateTime;

use crate::repository::{Repository, StoreResult};

/// Tables kept in insertion order; the vector index doubles as the
/// tie-break sequence for entries sharing a creation instant.
#[derive(Debug, Default)]
pub struct MemoryRepository {
    books: Vec<Book>,
    transactions: Vec<BorrowTransaction>,
    feedback: Vec<Feedback>,
    roles: BTreeSet<String>,
}

fn upsert<T>(rows: &mut Vec<T>, row: &T, same: impl Fn(&T) -> bool)
where
    T: Clone,
{
    match rows.iter_mut().find(|existing| same(existing)) {
        Some(existing) => *existing = row.clone(),
        None => rows.push(row.clone()),
    }
}

/// Clone the matching rows, newest first.
fn newest_first<'a, T>(
    rows: &'a [T],
    keep: impl Fn(&T) -> bool,
    created_at: impl Fn(&T) -> OffsetDateTime,
) -> Vec<T>
where
    T: Clone + 'a,
{
    let mut matched: Vec<(usize, &T)> = rows
        .iter()
        .enumerate()
        .filter(|&(_, row)| keep(row))
        .collect();
    matched.sort_by(|&(ia, a), &(ib, b)| created_at(b).cmp(&created_at(a)).then(ib.cmp(&ia)));
    matched.into_iter().map(|(_, row)| row.clone()).collect()
}

impl MemoryRepository {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn book_count(&self) -> usize {
        self.books.len()
    }

    pub fn transaction_count(&self) -> usize {
        self.transactions.len()
    }

    pub fn feedback_count(&self) -> usize {
        self.feedback.len()
    }

    pub fn roles(&self) -> impl Iterator<Item = &str> {
        self.roles.iter().map(String::as_str)
    }

    fn owner_of(&self, book: BookId) -> Option<UserId> {
        self.books
            .iter()
            .find(|b| b.id() == book)
            .map(Book::owner)
    }

    fn borrower_transactions(
        &self,
        borrower: UserId,
        approved: bool,
        request: PageRequest,
    ) -> Page<BorrowTransaction> {
        let rows = newest_first(
            &self.transactions,
            |t| t.borrower() == borrower && t.is_return_approved() == approved,
            |t| t.audit().created_at(),
        );
        Page::paginate(rows, request)
    }
}

impl Repository for MemoryRepository {
    fn find_book_by_id(&self, id: BookId) -> StoreResult<Option<Book>> {
        Ok(self.books.iter().find(|b| b.id() == id).cloned())
    }

    fn save_book(&mut self, book: &Book) -> StoreResult<BookId> {
        upsert(&mut self.books, book, |b| b.id() == book.id());
        Ok(book.id())
    }

    fn find_transaction_by_book_and_borrower(
        &self,
        book: BookId,
        borrower: UserId,
    ) -> StoreResult<Option<BorrowTransaction>> {
        Ok(newest_first(
            &self.transactions,
            |t| t.book() == book && t.borrower() == borrower && !t.is_return_approved(),
            |t| t.audit().created_at(),
        )
        .into_iter()
        .next())
    }

    fn find_transaction_by_book_and_owner(
        &self,
        book: BookId,
        owner: UserId,
        pending_approval_only: bool,
    ) -> StoreResult<Option<BorrowTransaction>> {
        if self.owner_of(book) != Some(owner) {
            return Ok(None);
        }
        Ok(newest_first(
            &self.transactions,
            |t| {
                t.book() == book
                    && match t.state() {
                        TransactionState::ReturnedPendingApproval => true,
                        TransactionState::Active => !pending_approval_only,
                        TransactionState::Approved => false,
                    }
            },
            |t| t.audit().created_at(),
        )
        .into_iter()
        .next())
    }

    fn has_active_transaction(&self, book: BookId, borrower: UserId) -> StoreResult<bool> {
        Ok(self.transactions.iter().any(|t| {
            t.book() == book && t.borrower() == borrower && !t.is_return_approved()
        }))
    }

    fn save_transaction(
        &mut self,
        transaction: &BorrowTransaction,
    ) -> StoreResult<TransactionId> {
        upsert(&mut self.transactions, transaction, |t| {
            t.id() == transaction.id()
        });
        Ok(transaction.id())
    }

    fn find_feedback_by_book(
        &self,
        book: BookId,
        request: PageRequest,
    ) -> StoreResult<Page<Feedback>> {
        let mut rows: Vec<(usize, &Feedback)> = self
            .feedback
            .iter()
            .enumerate()
            .filter(|(_, f)| f.book() == book)
            .collect();
        rows.sort_by(|(ia, a), (ib, b)| {
            a.audit()
                .created_at()
                .cmp(&b.audit().created_at())
                .then(ia.cmp(ib))
        });
        let rows = rows.into_iter().map(|(_, f)| f.clone()).collect();
        Ok(Page::paginate(rows, request))
    }

    fn average_rating(&self, book: BookId) -> StoreResult<Option<f64>> {
        let (sum, count) = self
            .feedback
            .iter()
            .filter(|f| f.book() == book)
            .fold((0.0, 0usize), |(sum, count), f| (sum + f.rating(), count + 1));
        Ok((count > 0).then(|| sum / count as f64))
    }

    fn save_feedback(&mut self, feedback: &Feedback) -> StoreResult<FeedbackId> {
        upsert(&mut self.feedback, feedback, |f| f.id() == feedback.id());
        Ok(feedback.id())
    }

    fn find_displayable_books(
        &self,
        viewer: UserId,
        request: PageRequest,
    ) -> StoreResult<Page<Book>> {
        let rows = newest_first(
            &self.books,
            |b| b.owner() != viewer && b.is_shareable() && !b.is_archived(),
            |b| b.audit().created_at(),
        );
        Ok(Page::paginate(rows, request))
    }

    fn find_books_by_owner(
        &self,
        owner: UserId,
        request: PageRequest,
    ) -> StoreResult<Page<Book>> {
        let rows = newest_first(&self.books, |b| b.owner() == owner, |b| {
            b.audit().created_at()
        });
        Ok(Page::paginate(rows, request))
    }

    fn find_borrowed_transactions(
        &self,
        borrower: UserId,
        request: PageRequest,
    ) -> StoreResult<Page<BorrowTransaction>> {
        Ok(self.borrower_transactions(borrower, false, request))
    }

    fn find_returned_transactions(
        &self,
        borrower: UserId,
        request: PageRequest,
    ) -> StoreResult<Page<BorrowTransaction>> {
        Ok(self.borrower_transactions(borrower, true, request))
    }

    fn ensure_role(&mut self, name: &str) -> StoreResult<bool> {
        Ok(self.roles.insert(name.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use bookshare_kernel::model::BookDraft;
    use time::Duration;

    fn at(secs: i64) -> OffsetDateTime {
        OffsetDateTime::UNIX_EPOCH + Duration::seconds(secs)
    }

    fn book(owner: UserId, title: &str, created: OffsetDateTime) -> Book {
        Book::new(
            owner,
            BookDraft {
                title: title.into(),
                author_name: "Ursula K. Le Guin".into(),
                isbn: "9780441478125".into(),
                synopsis: None,
                shareable: true,
            },
            created,
        )
        .unwrap()
    }

    fn page(n: usize, size: usize) -> PageRequest {
        PageRequest::new(n, size).unwrap()
    }

    #[test]
    fn save_book_replaces_by_id() {
        let mut repo = MemoryRepository::new();
        let mut b = book(UserId::new(), "The Dispossessed", at(0));
        repo.save_book(&b).unwrap();
        b.toggle_archived(at(1));
        repo.save_book(&b).unwrap();

        assert_eq!(repo.book_count(), 1);
        assert!(repo.find_book_by_id(b.id()).unwrap().unwrap().is_archived());
        assert!(repo.find_book_by_id(BookId::new()).unwrap().is_none());
    }

    #[test]
    fn displayable_excludes_own_and_out_of_circulation() {
        let mut repo = MemoryRepository::new();
        let (me, other) = (UserId::new(), UserId::new());
        let mine = book(me, "Mine", at(0));
        let older = book(other, "Older", at(1));
        let newer = book(other, "Newer", at(2));
        let mut archived = book(other, "Archived", at(3));
        archived.toggle_archived(at(3));
        let mut private = book(other, "Private", at(4));
        private.toggle_shareable(at(4));
        for b in [&mine, &older, &newer, &archived, &private] {
            repo.save_book(b).unwrap();
        }

        let shown = repo.find_displayable_books(me, page(0, 10)).unwrap();
        let titles: Vec<_> = shown.content.iter().map(|b| b.title().to_string()).collect();
        assert_eq!(titles, vec!["Newer", "Older"]);

        let owned = repo.find_books_by_owner(other, page(0, 10)).unwrap();
        assert_eq!(owned.total_elements, 4);
        assert_eq!(owned.content[0].title(), "Private");
    }

    #[test]
    fn current_transaction_is_most_recent_non_approved() {
        let mut repo = MemoryRepository::new();
        let (owner, borrower) = (UserId::new(), UserId::new());
        let b = book(owner, "Lathe of Heaven", at(0));
        repo.save_book(&b).unwrap();

        let mut first = BorrowTransaction::open(b.id(), borrower, at(1));
        first.mark_returned(at(2)).unwrap();
        first.approve_return(at(3)).unwrap();
        let stale = BorrowTransaction::open(b.id(), borrower, at(4));
        let latest = BorrowTransaction::open(b.id(), borrower, at(4));
        for t in [&first, &stale, &latest] {
            repo.save_transaction(t).unwrap();
        }

        let found = repo
            .find_transaction_by_book_and_borrower(b.id(), borrower)
            .unwrap()
            .unwrap();
        assert_eq!(found.id(), latest.id());
        assert!(repo.has_active_transaction(b.id(), borrower).unwrap());
        assert!(!repo.has_active_transaction(b.id(), owner).unwrap());
    }

    #[test]
    fn owner_lookup_is_scoped_to_owner_and_pending_state() {
        let mut repo = MemoryRepository::new();
        let (owner, borrower) = (UserId::new(), UserId::new());
        let b = book(owner, "Always Coming Home", at(0));
        repo.save_book(&b).unwrap();
        let mut tx = BorrowTransaction::open(b.id(), borrower, at(1));
        repo.save_transaction(&tx).unwrap();

        assert!(repo
            .find_transaction_by_book_and_owner(b.id(), owner, true)
            .unwrap()
            .is_none());
        assert!(repo
            .find_transaction_by_book_and_owner(b.id(), owner, false)
            .unwrap()
            .is_some());

        tx.mark_returned(at(2)).unwrap();
        repo.save_transaction(&tx).unwrap();
        assert!(repo
            .find_transaction_by_book_and_owner(b.id(), owner, true)
            .unwrap()
            .is_some());
        assert!(repo
            .find_transaction_by_book_and_owner(b.id(), borrower, true)
            .unwrap()
            .is_none());
    }

    #[test]
    fn borrower_history_splits_on_approval() {
        let mut repo = MemoryRepository::new();
        let borrower = UserId::new();
        let b = book(UserId::new(), "Tehanu", at(0));
        let mut done = BorrowTransaction::open(b.id(), borrower, at(1));
        done.mark_returned(at(2)).unwrap();
        done.approve_return(at(3)).unwrap();
        let mut pending = BorrowTransaction::open(b.id(), borrower, at(4));
        pending.mark_returned(at(5)).unwrap();
        let active = BorrowTransaction::open(b.id(), borrower, at(6));
        for t in [&done, &pending, &active] {
            repo.save_transaction(t).unwrap();
        }

        let borrowed = repo.find_borrowed_transactions(borrower, page(0, 10)).unwrap();
        let ids: Vec<_> = borrowed.content.iter().map(BorrowTransaction::id).collect();
        assert_eq!(ids, vec![active.id(), pending.id()]);

        let returned = repo.find_returned_transactions(borrower, page(0, 10)).unwrap();
        assert_eq!(returned.total_elements, 1);
        assert_eq!(returned.content[0].id(), done.id());
    }

    #[test]
    fn feedback_is_listed_oldest_first_and_averaged() {
        let mut repo = MemoryRepository::new();
        let b = BookId::new();
        assert_eq!(repo.average_rating(b).unwrap(), None);

        let first = Feedback::new(b, UserId::new(), 4.0, "good", at(1)).unwrap();
        let second = Feedback::new(b, UserId::new(), 5.0, "great", at(2)).unwrap();
        let elsewhere = Feedback::new(BookId::new(), UserId::new(), 1.0, "bad", at(0)).unwrap();
        for f in [&second, &first, &elsewhere] {
            repo.save_feedback(f).unwrap();
        }

        let listed = repo.find_feedback_by_book(b, page(0, 10)).unwrap();
        let comments: Vec<_> = listed.content.iter().map(|f| f.comment().to_string()).collect();
        assert_eq!(comments, vec!["good", "great"]);
        assert_eq!(repo.average_rating(b).unwrap(), Some(4.5));
    }

    #[test]
    fn ensure_role_is_idempotent() {
        let mut repo = MemoryRepository::new();
        assert!(repo.ensure_role("USER").unwrap());
        assert!(!repo.ensure_role("USER").unwrap());
        assert_eq!(repo.roles().collect::<Vec<_>>(), vec!["USER"]);
    }
}
