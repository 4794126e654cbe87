//! Assessment repository: the course's final assessment, its question bank
//! and the append-only attempt log.

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::assessment::{self, Entity as AssessmentEntity};
use super::entities::assessment_attempt::{self, Entity as AttemptEntity};
use super::entities::assessment_question::{self, Entity as QuestionEntity};
use crate::domain::assessment::NewAttempt;
use crate::domain::{Assessment, AssessmentAttempt, AssessmentQuestion, QuestionDraft};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait AssessmentRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Assessment>>;

    async fn find_by_course(&self, course_id: Uuid) -> AppResult<Option<Assessment>>;

    /// Return the course's assessment, creating it with `title` and
    /// `passing_score` if the course has none yet
    async fn create_if_absent(
        &self,
        course_id: Uuid,
        title: String,
        passing_score: f64,
    ) -> AppResult<Assessment>;

    async fn update(
        &self,
        id: Uuid,
        title: Option<String>,
        passing_score: Option<f64>,
    ) -> AppResult<Assessment>;

    async fn list_by_courses(&self, course_ids: Vec<Uuid>) -> AppResult<Vec<Assessment>>;

    /// Question bank in authoring order
    async fn list_questions(&self, assessment_id: Uuid) -> AppResult<Vec<AssessmentQuestion>>;

    async fn add_question(
        &self,
        assessment_id: Uuid,
        draft: QuestionDraft,
    ) -> AppResult<AssessmentQuestion>;

    async fn find_question(&self, id: Uuid) -> AppResult<Option<AssessmentQuestion>>;

    async fn delete_question(&self, id: Uuid) -> AppResult<()>;

    async fn record_attempt(&self, attempt: NewAttempt) -> AppResult<AssessmentAttempt>;

    /// A student's attempts, oldest first
    async fn list_attempts(
        &self,
        assessment_id: Uuid,
        student_id: Uuid,
    ) -> AppResult<Vec<AssessmentAttempt>>;
}

pub struct AssessmentStore {
    db: DatabaseConnection,
}

impl AssessmentStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

fn to_json<T: serde::Serialize>(value: &T) -> AppResult<serde_json::Value> {
    serde_json::to_value(value).map_err(|e| AppError::internal(e.to_string()))
}

#[async_trait]
impl AssessmentRepository for AssessmentStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Assessment>> {
        let result = AssessmentEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Assessment::from))
    }

    async fn find_by_course(&self, course_id: Uuid) -> AppResult<Option<Assessment>> {
        let result = AssessmentEntity::find()
            .filter(assessment::Column::CourseId.eq(course_id))
            .one(&self.db)
            .await?;
        Ok(result.map(Assessment::from))
    }

    async fn create_if_absent(
        &self,
        course_id: Uuid,
        title: String,
        passing_score: f64,
    ) -> AppResult<Assessment> {
        let now = chrono::Utc::now();
        let active_model = assessment::ActiveModel {
            id: Set(Uuid::new_v4()),
            course_id: Set(course_id),
            title: Set(title),
            passing_score: Set(passing_score),
            created_at: Set(now),
            updated_at: Set(now),
        };

        AssessmentEntity::insert(active_model)
            .on_conflict(
                OnConflict::column(assessment::Column::CourseId)
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        self.find_by_course(course_id)
            .await?
            .ok_or_else(|| AppError::internal("assessment missing after upsert"))
    }

    async fn update(
        &self,
        id: Uuid,
        title: Option<String>,
        passing_score: Option<f64>,
    ) -> AppResult<Assessment> {
        let model = AssessmentEntity::find_by_id(id)
            .one(&self.db)
            .await?
            .ok_or(AppError::NotFound)?;
        let mut active: assessment::ActiveModel = model.into();

        if let Some(title) = title {
            active.title = Set(title);
        }
        if let Some(passing_score) = passing_score {
            active.passing_score = Set(passing_score);
        }
        active.updated_at = Set(chrono::Utc::now());

        let model = active.update(&self.db).await?;
        Ok(Assessment::from(model))
    }

    async fn list_by_courses(&self, course_ids: Vec<Uuid>) -> AppResult<Vec<Assessment>> {
        if course_ids.is_empty() {
            return Ok(Vec::new());
        }
        let models = AssessmentEntity::find()
            .filter(assessment::Column::CourseId.is_in(course_ids))
            .order_by_asc(assessment::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Assessment::from).collect())
    }

    async fn list_questions(&self, assessment_id: Uuid) -> AppResult<Vec<AssessmentQuestion>> {
        let models = QuestionEntity::find()
            .filter(assessment_question::Column::AssessmentId.eq(assessment_id))
            .order_by_asc(assessment_question::Column::Position)
            .order_by_asc(assessment_question::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(AssessmentQuestion::from).collect())
    }

    async fn add_question(
        &self,
        assessment_id: Uuid,
        draft: QuestionDraft,
    ) -> AppResult<AssessmentQuestion> {
        let position = QuestionEntity::find()
            .filter(assessment_question::Column::AssessmentId.eq(assessment_id))
            .count(&self.db)
            .await?;

        let active_model = assessment_question::ActiveModel {
            id: Set(Uuid::new_v4()),
            assessment_id: Set(assessment_id),
            position: Set(position as i32),
            text: Set(draft.text),
            media_url: Set(draft.media_url),
            media_kind: Set(draft.media_kind.map(|kind| kind.as_str().to_string())),
            question_type: Set(draft.question_type.as_str().to_string()),
            options: Set(to_json(&draft.options)?),
            correct_answer: Set(draft.correct_answer),
            created_at: Set(chrono::Utc::now()),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(AssessmentQuestion::from(model))
    }

    async fn find_question(&self, id: Uuid) -> AppResult<Option<AssessmentQuestion>> {
        let result = QuestionEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(AssessmentQuestion::from))
    }

    async fn delete_question(&self, id: Uuid) -> AppResult<()> {
        let result = QuestionEntity::delete_by_id(id).exec(&self.db).await?;

        if result.rows_affected == 0 {
            return Err(AppError::NotFound);
        }

        Ok(())
    }

    async fn record_attempt(&self, attempt: NewAttempt) -> AppResult<AssessmentAttempt> {
        let active_model = assessment_attempt::ActiveModel {
            id: Set(Uuid::new_v4()),
            assessment_id: Set(attempt.assessment_id),
            student_id: Set(attempt.student_id),
            answers: Set(to_json(&attempt.answers)?),
            score: Set(attempt.score),
            passed: Set(attempt.passed),
            created_at: Set(chrono::Utc::now()),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(AssessmentAttempt::from(model))
    }

    async fn list_attempts(
        &self,
        assessment_id: Uuid,
        student_id: Uuid,
    ) -> AppResult<Vec<AssessmentAttempt>> {
        let models = AttemptEntity::find()
            .filter(assessment_attempt::Column::AssessmentId.eq(assessment_id))
            .filter(assessment_attempt::Column::StudentId.eq(student_id))
            .order_by_asc(assessment_attempt::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(AssessmentAttempt::from).collect())
    }
}
