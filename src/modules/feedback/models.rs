use bookshare_kernel::model::{BookId, Feedback, UserId};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Deserialize)]
pub struct FeedbackRequest {
    pub book_id: BookId,
    pub rating: f64,
    pub comment: String,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
pub struct FeedbackView {
    pub rating: f64,
    pub comment: String,
    /// Set when the requesting actor wrote this entry.
    pub own_feedback: bool,
}

impl FeedbackView {
    pub fn new(feedback: &Feedback, viewer: UserId) -> Self {
        Self {
            rating: feedback.rating(),
            comment: feedback.comment().to_string(),
            own_feedback: feedback.author() == viewer,
        }
    }
}
