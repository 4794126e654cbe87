//! Enrollment repository.
//!
//! Enrollment creation and lesson completion are single
//! `INSERT ... ON CONFLICT DO NOTHING` statements followed by a read, so
//! concurrent requests for the same (user, course) converge on one row and
//! re-completing a lesson is a no-op.

use std::collections::HashMap;

use async_trait::async_trait;
use sea_orm::sea_query::{Expr, OnConflict};
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use super::entities::enrollment::{self, Entity as EnrollmentEntity};
use super::entities::enrollment_lesson::{self, Entity as EnrollmentLessonEntity};
use crate::domain::Enrollment;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait EnrollmentRepository: Send + Sync {
    async fn find(&self, user_id: Uuid, course_id: Uuid) -> AppResult<Option<Enrollment>>;

    /// Return the enrollment for (user, course), creating it if absent
    async fn ensure(&self, user_id: Uuid, course_id: Uuid) -> AppResult<Enrollment>;

    /// Add a lesson to the completed set and return the whole set
    async fn add_completed_lesson(&self, enrollment_id: Uuid, lesson_id: Uuid)
        -> AppResult<Vec<Uuid>>;

    async fn set_progress(&self, enrollment_id: Uuid, progress: i32) -> AppResult<()>;

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Enrollment>>;

    /// Students currently enrolled in a course
    async fn list_student_ids(&self, course_id: Uuid) -> AppResult<Vec<Uuid>>;
}

pub struct EnrollmentStore {
    db: DatabaseConnection,
}

impl EnrollmentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }

    async fn completed_lessons(&self, enrollment_id: Uuid) -> AppResult<Vec<Uuid>> {
        let rows = EnrollmentLessonEntity::find()
            .filter(enrollment_lesson::Column::EnrollmentId.eq(enrollment_id))
            .order_by_asc(enrollment_lesson::Column::CompletedAt)
            .all(&self.db)
            .await?;

        Ok(rows.into_iter().map(|row| row.lesson_id).collect())
    }

    async fn assemble(&self, model: enrollment::Model) -> AppResult<Enrollment> {
        let completed_lessons = self.completed_lessons(model.id).await?;
        Ok(into_enrollment(model, completed_lessons))
    }
}

fn into_enrollment(model: enrollment::Model, completed_lessons: Vec<Uuid>) -> Enrollment {
    Enrollment {
        id: model.id,
        user_id: model.user_id,
        course_id: model.course_id,
        completed_lessons,
        progress: model.progress,
        enrolled_at: model.enrolled_at,
        updated_at: model.updated_at,
    }
}

#[async_trait]
impl EnrollmentRepository for EnrollmentStore {
    async fn find(&self, user_id: Uuid, course_id: Uuid) -> AppResult<Option<Enrollment>> {
        let model = EnrollmentEntity::find()
            .filter(enrollment::Column::UserId.eq(user_id))
            .filter(enrollment::Column::CourseId.eq(course_id))
            .one(&self.db)
            .await?;

        match model {
            Some(model) => Ok(Some(self.assemble(model).await?)),
            None => Ok(None),
        }
    }

    async fn ensure(&self, user_id: Uuid, course_id: Uuid) -> AppResult<Enrollment> {
        let now = chrono::Utc::now();
        let active_model = enrollment::ActiveModel {
            id: Set(Uuid::new_v4()),
            user_id: Set(user_id),
            course_id: Set(course_id),
            progress: Set(0),
            enrolled_at: Set(now),
            updated_at: Set(now),
        };

        let inserted = EnrollmentEntity::insert(active_model)
            .on_conflict(
                OnConflict::columns([enrollment::Column::UserId, enrollment::Column::CourseId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        if inserted > 0 {
            tracing::info!(user_id = %user_id, course_id = %course_id, "Enrollment created");
        }

        self.find(user_id, course_id)
            .await?
            .ok_or_else(|| AppError::internal("enrollment missing after upsert"))
    }

    async fn add_completed_lesson(
        &self,
        enrollment_id: Uuid,
        lesson_id: Uuid,
    ) -> AppResult<Vec<Uuid>> {
        let row = enrollment_lesson::ActiveModel {
            enrollment_id: Set(enrollment_id),
            lesson_id: Set(lesson_id),
            completed_at: Set(chrono::Utc::now()),
        };

        EnrollmentLessonEntity::insert(row)
            .on_conflict(
                OnConflict::columns([
                    enrollment_lesson::Column::EnrollmentId,
                    enrollment_lesson::Column::LessonId,
                ])
                .do_nothing()
                .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        self.completed_lessons(enrollment_id).await
    }

    async fn set_progress(&self, enrollment_id: Uuid, progress: i32) -> AppResult<()> {
        let result = EnrollmentEntity::update_many()
            .col_expr(enrollment::Column::Progress, Expr::value(progress))
            .col_expr(enrollment::Column::UpdatedAt, Expr::value(chrono::Utc::now()))
            .filter(enrollment::Column::Id.eq(enrollment_id))
            .exec(&self.db)
            .await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Enrollment>> {
        let models = EnrollmentEntity::find()
            .filter(enrollment::Column::UserId.eq(user_id))
            .order_by_desc(enrollment::Column::EnrolledAt)
            .all(&self.db)
            .await?;
        if models.is_empty() {
            return Ok(Vec::new());
        }

        let ids: Vec<Uuid> = models.iter().map(|model| model.id).collect();
        let mut completed: HashMap<Uuid, Vec<Uuid>> = HashMap::new();
        for row in EnrollmentLessonEntity::find()
            .filter(enrollment_lesson::Column::EnrollmentId.is_in(ids))
            .order_by_asc(enrollment_lesson::Column::CompletedAt)
            .all(&self.db)
            .await?
        {
            completed.entry(row.enrollment_id).or_default().push(row.lesson_id);
        }

        Ok(models
            .into_iter()
            .map(|model| {
                let lessons = completed.remove(&model.id).unwrap_or_default();
                into_enrollment(model, lessons)
            })
            .collect())
    }

    async fn list_student_ids(&self, course_id: Uuid) -> AppResult<Vec<Uuid>> {
        let models = EnrollmentEntity::find()
            .filter(enrollment::Column::CourseId.eq(course_id))
            .order_by_asc(enrollment::Column::EnrolledAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(|model| model.user_id).collect())
    }
}
