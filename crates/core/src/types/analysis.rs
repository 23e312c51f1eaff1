//! Backend-computed comment analysis for a product.

use std::collections::BTreeMap;

use serde::{Deserialize, Serialize};

use super::catalog::Product;

/// Aggregate sentiment over a product's comments plus a generated summary.
///
/// `sentiment_score_avg` is the mean of +1 (positive), -1 (negative) and
/// 0 (anything else) over all comments, so it lies in `[-1, 1]`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct AiAnalysis {
    pub product: Product,
    pub sentiment_score_avg: f64,
    #[serde(default)]
    pub sentiment_label_counts: BTreeMap<String, u32>,
    pub comments_summary: String,
}

impl AiAnalysis {
    /// Number of comments the analysis was computed over.
    #[must_use]
    pub fn comment_count(&self) -> u32 {
        self.sentiment_label_counts.values().sum()
    }
}
