//! Review repository.

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use super::entities::review::{self, Entity as ReviewEntity};
use crate::domain::review::NewReview;
use crate::domain::Review;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait ReviewRepository: Send + Sync {
    async fn find(&self, user_id: Uuid, course_id: Uuid) -> AppResult<Option<Review>>;

    /// Insert a review; a second review of the same course is a `Conflict`
    async fn create(&self, new_review: NewReview) -> AppResult<Review>;

    async fn list_by_course(&self, course_id: Uuid) -> AppResult<Vec<Review>>;

    async fn ratings_for_course(&self, course_id: Uuid) -> AppResult<Vec<i32>>;
}

pub struct ReviewStore {
    db: DatabaseConnection,
}

impl ReviewStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl ReviewRepository for ReviewStore {
    async fn find(&self, user_id: Uuid, course_id: Uuid) -> AppResult<Option<Review>> {
        let result = ReviewEntity::find()
            .filter(review::Column::UserId.eq(user_id))
            .filter(review::Column::CourseId.eq(course_id))
            .one(&self.db)
            .await?;
        Ok(result.map(Review::from))
    }

    async fn create(&self, new_review: NewReview) -> AppResult<Review> {
        let (user_id, course_id) = (new_review.user_id, new_review.course_id);
        let active_model = review::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            course_id: Set(course_id),
            rating: Set(new_review.rating),
            comment: Set(new_review.comment),
            created_at: Set(chrono::Utc::now()),
        };

        let inserted = ReviewEntity::insert(active_model)
            .on_conflict(
                OnConflict::columns([review::Column::UserId, review::Column::CourseId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        if inserted == 0 {
            return Err(AppError::conflict("Review"));
        }

        self.find(user_id, course_id)
            .await?
            .ok_or_else(|| AppError::internal("review missing after insert"))
    }

    async fn list_by_course(&self, course_id: Uuid) -> AppResult<Vec<Review>> {
        let models = ReviewEntity::find()
            .filter(review::Column::CourseId.eq(course_id))
            .order_by_desc(review::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Review::from).collect())
    }

    async fn ratings_for_course(&self, course_id: Uuid) -> AppResult<Vec<i32>> {
        let models = ReviewEntity::find()
            .filter(review::Column::CourseId.eq(course_id))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(|model| model.rating).collect())
    }
}
