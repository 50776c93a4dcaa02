//! Who may review a book, and how reviews are shown back.

use bookshare_authz as authz;
use bookshare_db::Repository;
use bookshare_kernel::model::{BookId, Feedback, FeedbackId, UserId};
use bookshare_kernel::{DomainError, Page, PageRequest};
use time::OffsetDateTime;

use super::models::FeedbackView;
use crate::modules::books::load_book;

pub struct FeedbackGate<'r, R: Repository + ?Sized> {
    repo: &'r mut R,
}

impl<'r, R: Repository + ?Sized> FeedbackGate<'r, R> {
    pub fn new(repo: &'r mut R) -> Self {
        Self { repo }
    }

    /// Record a review by `actor`. The book must be in circulation and not
    /// owned by the reviewer; rating and comment are validated afterwards.
    pub fn submit(
        &mut self,
        actor: UserId,
        book_id: BookId,
        rating: f64,
        comment: String,
    ) -> Result<FeedbackId, DomainError> {
        let book = load_book(&*self.repo, book_id)?;
        authz::ensure_can_circulate(actor, &book)?;

        let feedback = Feedback::new(book_id, actor, rating, comment, OffsetDateTime::now_utc())?;
        let id = self.repo.save_feedback(&feedback)?;
        tracing::info!(%actor, %book_id, feedback_id = %id, rating, "feedback submitted");
        Ok(id)
    }
}

/// Read side of the feedback store, shown to any authenticated viewer.
pub struct FeedbackBoard<'r, R: Repository + ?Sized> {
    repo: &'r R,
}

impl<'r, R: Repository + ?Sized> FeedbackBoard<'r, R> {
    pub fn new(repo: &'r R) -> Self {
        Self { repo }
    }

    /// Feedback on a book in submission order, flagged for the viewer.
    pub fn list(
        &self,
        book_id: BookId,
        viewer: UserId,
        request: PageRequest,
    ) -> Result<Page<FeedbackView>, DomainError> {
        let page = self.repo.find_feedback_by_book(book_id, request)?;
        Ok(page.map(|feedback| FeedbackView::new(&feedback, viewer)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::modules::books::circulation::Circulation;
    use bookshare_db::MemoryRepository;
    use bookshare_kernel::model::BookDraft;
    use bookshare_kernel::ForbiddenReason;

    fn setup(shareable: bool) -> (MemoryRepository, UserId, BookId) {
        let mut repo = MemoryRepository::new();
        let owner = UserId::new();
        let book = Circulation::new(&mut repo)
            .create_book(
                owner,
                BookDraft {
                    title: "A Fire Upon the Deep".into(),
                    author_name: "Vernor Vinge".into(),
                    isbn: "9780812515282".into(),
                    synopsis: None,
                    shareable,
                },
            )
            .unwrap();
        (repo, owner, book)
    }

    fn page() -> PageRequest {
        PageRequest::new(0, 10).unwrap()
    }

    #[test]
    fn owner_cannot_review_own_book() {
        let (mut repo, owner, book) = setup(true);
        let err = FeedbackGate::new(&mut repo)
            .submit(owner, book, 5.0, "mine is great".into())
            .unwrap_err();
        assert_eq!(err.forbidden_reason(), Some(ForbiddenReason::OwnBook));
        assert_eq!(repo.feedback_count(), 0);
    }

    #[test]
    fn out_of_circulation_books_cannot_be_reviewed() {
        let (mut repo, _owner, book) = setup(false);
        let err = FeedbackGate::new(&mut repo)
            .submit(UserId::new(), book, 3.0, "hm".into())
            .unwrap_err();
        assert_eq!(
            err.forbidden_reason(),
            Some(ForbiddenReason::NonShareableOrArchived)
        );
    }

    #[test]
    fn rating_out_of_range_is_a_validation_error() {
        let (mut repo, _owner, book) = setup(true);
        let err = FeedbackGate::new(&mut repo)
            .submit(UserId::new(), book, 6.0, "too good".into())
            .unwrap_err();
        assert!(matches!(err, DomainError::Validation { field: "rating", .. }));
        assert_eq!(repo.feedback_count(), 0);
    }

    #[test]
    fn policy_is_checked_before_input() {
        let (mut repo, owner, book) = setup(true);
        let err = FeedbackGate::new(&mut repo)
            .submit(owner, book, 0.0, String::new())
            .unwrap_err();
        assert_eq!(err.forbidden_reason(), Some(ForbiddenReason::OwnBook));
    }

    #[test]
    fn listing_flags_viewer_entries() {
        let (mut repo, _owner, book) = setup(true);
        let (alice, bob) = (UserId::new(), UserId::new());
        let mut gate = FeedbackGate::new(&mut repo);
        gate.submit(alice, book, 4.0, "solid".into()).unwrap();
        gate.submit(bob, book, 2.0, "slow start".into()).unwrap();

        let board = FeedbackBoard::new(&repo);
        let for_alice = board.list(book, alice, page()).unwrap();
        let flags: Vec<_> = for_alice.content.iter().map(|f| f.own_feedback).collect();
        assert_eq!(flags, vec![true, false]);

        let for_stranger = board.list(book, UserId::new(), page()).unwrap();
        assert!(for_stranger.content.iter().all(|f| !f.own_feedback));
        assert_eq!(for_stranger.total_elements, 2);
    }

    #[test]
    fn unknown_book_lists_empty() {
        let repo = MemoryRepository::new();
        let page = FeedbackBoard::new(&repo)
            .list(BookId::new(), UserId::new(), page())
            .unwrap();
        assert!(page.content.is_empty());
    }
}
