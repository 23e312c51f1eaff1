//! Product comments.

use serde::{Deserialize, Serialize};

use super::id::{CommentId, ProductId};
use super::status::SentimentLabel;
use super::timestamp::Timestamp;

/// A customer comment on a product, scored by the backend's sentiment model.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct Comment {
    pub id: CommentId,
    pub product_id: ProductId,
    pub content: String,
    pub rating: f64,
    pub created_at: Timestamp,
    pub sentiment_score: f64,
    pub sentiment_label: SentimentLabel,
}

/// Request body for posting or editing a comment.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct CommentInput {
    pub content: String,
    pub rating: f64,
}

impl From<&Comment> for CommentInput {
    fn from(comment: &Comment) -> Self {
        Self {
            content: comment.content.clone(),
            rating: comment.rating,
        }
    }
}
