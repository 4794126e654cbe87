//! Course reviews.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Review {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewReview {
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub rating: i32,
    pub comment: String,
}

/// Average rating (one decimal) and review count.
pub fn rating_summary(ratings: &[i32]) -> (f64, i32) {
    if ratings.is_empty() {
        return (0.0, 0);
    }
    let total: i64 = ratings.iter().map(|r| i64::from(*r)).sum();
    let average = total as f64 / ratings.len() as f64;
    ((average * 10.0).round() / 10.0, ratings.len() as i32)
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct ReviewResponse {
    pub id: Uuid,
    pub user_id: Uuid,
    pub course_id: Uuid,
    #[schema(example = 5)]
    pub rating: i32,
    pub comment: String,
    pub created_at: DateTime<Utc>,
}

impl From<Review> for ReviewResponse {
    fn from(review: Review) -> Self {
        Self {
            id: review.id,
            user_id: review.user_id,
            course_id: review.course_id,
            rating: review.rating,
            comment: review.comment,
            created_at: review.created_at,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_rating_summary() {
        assert_eq!(rating_summary(&[]), (0.0, 0));
        assert_eq!(rating_summary(&[5, 4]), (4.5, 2));
        assert_eq!(rating_summary(&[5, 4, 4]), (4.3, 3));
    }
}
