//! Lesson quiz repository.

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{
    ActiveModelTrait, ColumnTrait, DatabaseConnection, EntityTrait, PaginatorTrait, QueryFilter,
    QueryOrder, Set,
};
use uuid::Uuid;

use super::entities::quiz::{self, Entity as QuizEntity};
use super::entities::quiz_attempt;
use super::entities::quiz_question::{self, Entity as QuizQuestionEntity};
use crate::domain::quiz::{NewQuizAttempt, QuizAttempt, QuizQuestionDraft};
use crate::domain::{Quiz, QuizQuestion};
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait QuizRepository: Send + Sync {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Quiz>>;

    async fn find_by_lesson(&self, lesson_id: Uuid) -> AppResult<Option<Quiz>>;

    /// Return the lesson's quiz, creating it if the lesson has none yet
    async fn create_if_absent(
        &self,
        lesson_id: Uuid,
        course_id: Uuid,
        title: String,
    ) -> AppResult<Quiz>;

    async fn list_questions(&self, quiz_id: Uuid) -> AppResult<Vec<QuizQuestion>>;

    async fn add_question(&self, quiz_id: Uuid, draft: QuizQuestionDraft)
        -> AppResult<QuizQuestion>;

    async fn record_attempt(&self, attempt: NewQuizAttempt) -> AppResult<QuizAttempt>;
}

pub struct QuizStore {
    db: DatabaseConnection,
}

impl QuizStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl QuizRepository for QuizStore {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Quiz>> {
        let result = QuizEntity::find_by_id(id).one(&self.db).await?;
        Ok(result.map(Quiz::from))
    }

    async fn find_by_lesson(&self, lesson_id: Uuid) -> AppResult<Option<Quiz>> {
        let result = QuizEntity::find()
            .filter(quiz::Column::LessonId.eq(lesson_id))
            .one(&self.db)
            .await?;
        Ok(result.map(Quiz::from))
    }

    async fn create_if_absent(
        &self,
        lesson_id: Uuid,
        course_id: Uuid,
        title: String,
    ) -> AppResult<Quiz> {
        let active_model = quiz::ActiveModel {
            id: Set(Uuid::new_v4()),
            lesson_id: Set(lesson_id),
            course_id: Set(course_id),
            title: Set(title),
            created_at: Set(chrono::Utc::now()),
        };

        QuizEntity::insert(active_model)
            .on_conflict(OnConflict::column(quiz::Column::LessonId).do_nothing().to_owned())
            .exec_without_returning(&self.db)
            .await?;

        self.find_by_lesson(lesson_id)
            .await?
            .ok_or_else(|| AppError::internal("quiz missing after upsert"))
    }

    async fn list_questions(&self, quiz_id: Uuid) -> AppResult<Vec<QuizQuestion>> {
        let models = QuizQuestionEntity::find()
            .filter(quiz_question::Column::QuizId.eq(quiz_id))
            .order_by_asc(quiz_question::Column::Position)
            .order_by_asc(quiz_question::Column::CreatedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(QuizQuestion::from).collect())
    }

    async fn add_question(
        &self,
        quiz_id: Uuid,
        draft: QuizQuestionDraft,
    ) -> AppResult<QuizQuestion> {
        let position = QuizQuestionEntity::find()
            .filter(quiz_question::Column::QuizId.eq(quiz_id))
            .count(&self.db)
            .await?;

        let active_model = quiz_question::ActiveModel {
            id: Set(Uuid::new_v4()),
            quiz_id: Set(quiz_id),
            position: Set(position as i32),
            text: Set(draft.text),
            options: Set(serde_json::to_value(&draft.options)
                .map_err(|e| AppError::internal(e.to_string()))?),
            correct_answer: Set(draft.correct_answer),
            created_at: Set(chrono::Utc::now()),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(QuizQuestion::from(model))
    }

    async fn record_attempt(&self, attempt: NewQuizAttempt) -> AppResult<QuizAttempt> {
        let active_model = quiz_attempt::ActiveModel {
            id: Set(Uuid::new_v4()),
            quiz_id: Set(attempt.quiz_id),
            student_id: Set(attempt.student_id),
            answers: Set(serde_json::to_value(&attempt.answers)
                .map_err(|e| AppError::internal(e.to_string()))?),
            score: Set(attempt.score),
            correct_count: Set(attempt.correct_count),
            total_questions: Set(attempt.total_questions),
            created_at: Set(chrono::Utc::now()),
        };

        let model = active_model.insert(&self.db).await?;
        Ok(QuizAttempt::from(model))
    }
}
