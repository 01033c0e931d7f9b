use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use uuid::Uuid;

use crate::domain::agent::AgentId;
use crate::errors::{DomainError, ValidationError};

pub const MAX_REVIEW_TITLE_CHARS: usize = 100;
pub const MAX_REVIEW_CONTENT_CHARS: usize = 2000;

#[derive(Clone, Debug, PartialEq, Eq, Hash, Serialize, Deserialize)]
pub struct ReviewId(pub String);

/// A star rating in `1..=5`.
#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(try_from = "u8", into = "u8")]
pub struct Rating(u8);

impl Rating {
    pub fn value(&self) -> u8 {
        self.0
    }
}

impl TryFrom<u8> for Rating {
    type Error = DomainError;

    fn try_from(value: u8) -> Result<Self, Self::Error> {
        if (1..=5).contains(&value) {
            Ok(Self(value))
        } else {
            Err(DomainError::InvalidRating { value })
        }
    }
}

impl From<Rating> for u8 {
    fn from(rating: Rating) -> Self {
        rating.0
    }
}

#[derive(Clone, Debug, Default, PartialEq, Eq, Deserialize)]
pub struct ReviewDraft {
    pub rating: u8,
    pub title: String,
    pub content: String,
}

#[derive(Clone, Debug, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub id: ReviewId,
    pub agent_id: AgentId,
    pub author_id: String,
    pub rating: Rating,
    pub title: String,
    pub content: String,
    pub helpful: u32,
    pub not_helpful: u32,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

impl Review {
    pub fn from_draft(
        agent_id: AgentId,
        author_id: impl Into<String>,
        draft: ReviewDraft,
    ) -> Result<Self, ValidationError> {
        let rating = Rating::try_from(draft.rating)
            .map_err(|_| ValidationError::field("rating", "Please select a rating"))?;
        if draft.title.trim().is_empty() {
            return Err(ValidationError::field("title", "Please enter a title for your review"));
        }
        if draft.title.chars().count() > MAX_REVIEW_TITLE_CHARS {
            return Err(ValidationError::field(
                "title",
                format!("Title must be at most {MAX_REVIEW_TITLE_CHARS} characters"),
            ));
        }
        if draft.content.trim().is_empty() {
            return Err(ValidationError::field("content", "Please enter your review"));
        }
        if draft.content.chars().count() > MAX_REVIEW_CONTENT_CHARS {
            return Err(ValidationError::field(
                "content",
                format!("Review must be at most {MAX_REVIEW_CONTENT_CHARS} characters"),
            ));
        }

        let now = Utc::now();
        Ok(Self {
            id: ReviewId(Uuid::new_v4().to_string()),
            agent_id,
            author_id: author_id.into(),
            rating,
            title: draft.title,
            content: draft.content,
            helpful: 0,
            not_helpful: 0,
            created_at: now,
            updated_at: now,
        })
    }

    pub fn mark_helpful(&mut self) {
        self.helpful = self.helpful.saturating_add(1);
    }

    pub fn mark_not_helpful(&mut self) {
        self.not_helpful = self.not_helpful.saturating_add(1);
    }
}

/// Displayed aggregate rating of an agent: mean score and number of reviews.
#[derive(Clone, Copy, Debug, Default, PartialEq, Serialize, Deserialize)]
pub struct RatingSummary {
    pub score: f64,
    pub count: u32,
}

impl RatingSummary {
    pub fn new(score: f64, count: u32) -> Self {
        Self { score, count }
    }

    pub fn from_reviews(reviews: &[Review]) -> Self {
        if reviews.is_empty() {
            return Self::default();
        }
        let total: u32 = reviews.iter().map(|review| u32::from(review.rating.value())).sum();
        let count = reviews.len() as u32;
        Self { score: f64::from(total) / f64::from(count), count }
    }

    /// Folds one more rating into the mean: `(score * count + rating) / (count + 1)`.
    pub fn record(self, rating: Rating) -> Result<Self, DomainError> {
        let count = self.count.checked_add(1).ok_or(DomainError::RatingCountOverflow)?;
        let score =
            (self.score * f64::from(self.count) + f64::from(rating.value())) / f64::from(count);
        Ok(Self { score, count })
    }
}
