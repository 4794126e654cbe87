//! Course and lesson repositories.

use async_trait::async_trait;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::course::{self, Entity as CourseEntity};
use super::entities::lesson::{self, Entity as LessonEntity};
use crate::domain::course::{CourseChanges, LessonChanges, NewCourse, NewLesson};
use crate::domain::{Course, CourseStatus, Lesson};
use crate::errors::{AppError, AppResult};
use crate::types::PaginationParams;

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CourseRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Course>>;

    /// Load several courses at once; unknown ids are skipped
    async fn find_many(&self, ids: Vec<Uuid>) -> AppResult<Vec<Course>>;

    /// Published courses, newest first, with the total count
    async fn list_published(&self, params: PaginationParams) -> AppResult<(Vec<Course>, u64)>;

    async fn list_by_instructor(&self, instructor_id: Uuid) -> AppResult<Vec<Course>>;

    /// Create a course in `draft` status
    async fn create(&self, new_course: NewCourse) -> AppResult<Course>;

    async fn update(&self, id: Uuid, changes: CourseChanges) -> AppResult<Course>;

    async fn set_status(&self, id: Uuid, status: CourseStatus) -> AppResult<Course>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;

    /// Overwrite the cached rating summary
    async fn update_rating(&self, id: Uuid, average_rating: f64, num_reviews: i32)
        -> AppResult<()>;
}

pub struct CourseStore {
    db: DatabaseConnection,
}

impl CourseStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn find_model(&self, id: Uuid) -> AppResult<course::Model> {
        CourseEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)
    }
}

#[async_trait]
impl CourseRepository for CourseStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Course>> {
        let result = CourseEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Course::from))
    }

    async fn find_many(&self, ids: Vec<Uuid>) -> AppResult<Vec<Course>> {
        if ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = CourseEntity::find()
            .filter(course::Column::Id.is_in(ids))
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Course::from).collect())
    }

    async fn list_published(&self, params: PaginationParams) -> AppResult<(Vec<Course>, u64)> {
        let paginator = CourseEntity::find()
            .filter(course::Column::Status.eq(CourseStatus::Published.as_str()))
            .order_by_desc(course::Column::CreatedAt)
            .paginate(&self.db, params.limit());
        let total = paginator.num_items().await?;
        let models = paginator
            .fetch_page(params.page.saturating_sub(1))
            .await?;

        Ok((models.into_iter().map(Course::from).collect(), total))
    }

    async fn list_by_instructor(&self, instructor_id: Uuid) -> AppResult<Vec<Course>> {
        let models = CourseEntity::find()
            .filter(course::Column::InstructorId.eq(instructor_id))
            .order_by_desc(course::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Course::from).collect())
    }

    async fn create(&self, new_course: NewCourse) -> AppResult<Course> {
        let now = chrono::Utc::now();
        let active_model = course::ActiveModel {
            id: Set(Uuid::new_v4()),
            instructor_id: Set(new_course.instructor_id),
            title: Set(new_course.title),
            description: Set(new_course.description),
            price: Set(new_course.price),
            status: Set(CourseStatus::Draft.as_str().to_string()),
            average_rating: Set(0.0),
            num_reviews: Set(0),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Course::from(model))
    }

    async fn update(&self, id: Uuid, changes: CourseChanges) -> AppResult<Course> {
        let mut active: course::ActiveModel = self.find_model(id).await?.into();

        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(description) = changes.description {
            active.description = Set(description);
        }
        if let Some(price) = changes.price {
            active.price = Set(price);
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Course::from(model))
    }

    async fn set_status(&self, id: Uuid, status: CourseStatus) -> AppResult<Course> {
        let mut active: course::ActiveModel = self.find_model(id).await?.into();
        active.status = Set(status.as_str().to_string());
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Course::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = CourseEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn update_rating(
        &self,
        id: Uuid,
        average_rating: f64,
        num_reviews: i32,
    ) -> AppResult<()> {
        let mut active: course::ActiveModel = self.find_model(id).await?.into();
        active.average_rating = Set(average_rating);
        active.num_reviews = Set(num_reviews);
        active.updated_at = Set(chrono::Utc::now());

        active.update(&self.db).await?;
        Ok(())
    }
}

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait LessonRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Lesson>>;

    /// Lessons of a course in curriculum order
    async fn list_by_course(&self, course_id: Uuid) -> AppResult<Vec<Lesson>>;

    async fn create(&self, new_lesson: NewLesson) -> AppResult<Lesson>;

    async fn update(&self, id: Uuid, changes: LessonChanges) -> AppResult<Lesson>;

    async fn delete(&self, id: Uuid) -> AppResult<()>;
}

pub struct LessonStore {
    db: DatabaseConnection,
}

impl LessonStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl LessonRepository for LessonStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Lesson>> {
        let result = LessonEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Lesson::from))
    }

    async fn list_by_course(&self, course_id: Uuid) -> AppResult<Vec<Lesson>> {
        let models = LessonEntity::find()
            .filter(lesson::Column::CourseId.eq(course_id))
            .order_by_asc(lesson::Column::OrderIndex)
            .order_by_asc(lesson::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Lesson::from).collect())
    }

    async fn create(&self, new_lesson: NewLesson) -> AppResult<Lesson> {
        let now = chrono::Utc::now();
        let active_model = lesson::ActiveModel {
            id: Set(Uuid::new_v4()),
            course_id: Set(new_lesson.course_id),
            title: Set(new_lesson.title),
            order_index: Set(new_lesson.order_index),
            duration_minutes: Set(new_lesson.duration_minutes),
            is_preview: Set(new_lesson.is_preview),
            content: Set(new_lesson.content),
            video_url: Set(new_lesson.video_url),
            resources: Set(serde_json::to_value(&new_lesson.resources)
                .map_err(|e| AppError::internal(e.to_string()))?),
            created_at: Set(now),
            updated_at: Set(now),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(Lesson::from(model))
    }

    async fn update(&self, id: Uuid, changes: LessonChanges) -> AppResult<Lesson> {
        let model = LessonEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        let mut active: lesson::ActiveModel = model.into();

        if let Some(title) = changes.title {
            active.title = Set(title);
        }
        if let Some(order_index) = changes.order_index {
            active.order_index = Set(order_index);
        }
        if let Some(duration) = changes.duration_minutes {
            active.duration_minutes = Set(duration);
        }
        if let Some(is_preview) = changes.is_preview {
            active.is_preview = Set(is_preview);
        }
        if let Some(content) = changes.content {
            active.content = Set(content);
        }
        if let Some(video_url) = changes.video_url {
            active.video_url = Set(Some(video_url));
        }
        if let Some(resources) = changes.resources {
            active.resources = Set(
                serde_json::to_value(&resources).map_err(|e| AppError::internal(e.to_string()))?
            );
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Lesson::from(model))
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let result = LessonEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }
}
