//! Review service - One review per enrolled student and course.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::access::require_enrollment;
use crate::config::{MAX_RATING, MIN_RATING};
use crate::domain::review::{rating_summary, NewReview};
use crate::domain::Review;
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait ReviewService: Send + Sync {
    async fn add_review(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        rating: i32,
        comment: String,
    ) -> AppResult<Review>;

    async fn list_reviews(&self, course_id: Uuid) -> AppResult<Vec<Review>>;
}

pub struct ReviewBoard<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> ReviewBoard<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }
}

#[async_trait]
impl<U: UnitOfWork> ReviewService for ReviewBoard<U> {
    async fn add_review(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        rating: i32,
        comment: String,
    ) -> AppResult<Review> {
        if !(MIN_RATING..=MAX_RATING).contains(&rating) {
            return Err(AppError::validation(format!(
                "Rating must be between {} and {}",
                MIN_RATING, MAX_RATING
            )));
        }

        self.uow
            .courses()
            .find_by_id(course_id)
            .await?
            .ok_or_not_found()?;
        require_enrollment(self.uow.as_ref(), user_id, course_id).await?;

        let review = self
            .uow
            .reviews()
            .create(NewReview {
                user_id,
                course_id,
                rating,
                comment: comment.trim().to_string(),
            })
            .await?;

        // Cached aggregate, recomputed from the rows each time
        let ratings = self.uow.reviews().ratings_for_course(course_id).await?;
        let (average, count) = rating_summary(&ratings);
        self.uow
            .courses()
            .update_rating(course_id, average, count)
            .await?;

        tracing::info!(course_id = %course_id, user_id = %user_id, rating, "Review added");
        Ok(review)
    }

    async fn list_reviews(&self, course_id: Uuid) -> AppResult<Vec<Review>> {
        self.uow.reviews().list_by_course(course_id).await
    }
}
