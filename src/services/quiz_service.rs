//! Lesson quizzes - practice questions graded by option index.
//!
//! Independent of the course assessment: no pass mark, no certificate,
//! and an answer is correct only when the selected option's text equals
//! the stored answer exactly.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::access::{can_read_course, owned_course};
use crate::config::QUIZ_TITLE_SUFFIX;
use crate::domain::quiz::{
    grade_quiz, NewQuizAttempt, QuizQuestionDraft, QuizResponse, QuizResult, TakeQuizResponse,
};
use crate::domain::{Quiz, QuizAnswer, QuizQuestion};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::UnitOfWork;

#[async_trait]
pub trait QuizService: Send + Sync {
    async fn get_or_create(&self, actor: Uuid, lesson_id: Uuid) -> AppResult<QuizResponse>;

    async fn add_question(
        &self,
        actor: Uuid,
        quiz_id: Uuid,
        draft: QuizQuestionDraft,
    ) -> AppResult<QuizQuestion>;

    async fn take(&self, viewer: Uuid, quiz_id: Uuid) -> AppResult<TakeQuizResponse>;

    async fn submit(
        &self,
        student_id: Uuid,
        quiz_id: Uuid,
        answers: Vec<QuizAnswer>,
    ) -> AppResult<QuizResult>;
}

pub struct QuizEngine<U: UnitOfWork> {
    uow: Arc<U>,
}

impl<U: UnitOfWork> QuizEngine<U> {
    pub fn new(uow: Arc<U>) -> Self {
        Self { uow }
    }

    async fn find_quiz(&self, quiz_id: Uuid) -> AppResult<Quiz> {
        self.uow.quizzes().find_by_id(quiz_id).await?.ok_or_not_found()
    }

    /// Quiz of a course the viewer owns or is enrolled in.
    async fn readable_quiz(&self, viewer: Uuid, quiz_id: Uuid) -> AppResult<Quiz> {
        let quiz = self.find_quiz(quiz_id).await?;
        let course = self
            .uow
            .courses()
            .find_by_id(quiz.course_id)
            .await?
            .ok_or_not_found()?;
        if !can_read_course(self.uow.as_ref(), &course, Some(viewer)).await? {
            return Err(AppError::forbidden("You are not enrolled in this course"));
        }
        Ok(quiz)
    }
}

#[async_trait]
impl<U: UnitOfWork> QuizService for QuizEngine<U> {
    async fn get_or_create(&self, actor: Uuid, lesson_id: Uuid) -> AppResult<QuizResponse> {
        let lesson = self
            .uow
            .lessons()
            .find_by_id(lesson_id)
            .await?
            .ok_or_not_found()?;
        owned_course(self.uow.as_ref(), lesson.course_id, actor).await?;

        let quiz = self
            .uow
            .quizzes()
            .create_if_absent(
                lesson_id,
                lesson.course_id,
                format!("{}{}", lesson.title, QUIZ_TITLE_SUFFIX),
            )
            .await?;
        let questions = self.uow.quizzes().list_questions(quiz.id).await?;
        Ok(QuizResponse::new(quiz, questions))
    }

    async fn add_question(
        &self,
        actor: Uuid,
        quiz_id: Uuid,
        draft: QuizQuestionDraft,
    ) -> AppResult<QuizQuestion> {
        let draft = draft.validated()?;
        let quiz = self.find_quiz(quiz_id).await?;
        owned_course(self.uow.as_ref(), quiz.course_id, actor).await?;
        self.uow.quizzes().add_question(quiz_id, draft).await
    }

    async fn take(&self, viewer: Uuid, quiz_id: Uuid) -> AppResult<TakeQuizResponse> {
        let quiz = self.readable_quiz(viewer, quiz_id).await?;
        let questions = self.uow.quizzes().list_questions(quiz_id).await?;

        Ok(TakeQuizResponse {
            id: quiz.id,
            lesson_id: quiz.lesson_id,
            title: quiz.title,
            questions: questions.into_iter().map(Into::into).collect(),
        })
    }

    async fn submit(
        &self,
        student_id: Uuid,
        quiz_id: Uuid,
        answers: Vec<QuizAnswer>,
    ) -> AppResult<QuizResult> {
        self.readable_quiz(student_id, quiz_id).await?;
        let questions = self.uow.quizzes().list_questions(quiz_id).await?;
        let outcome = grade_quiz(&questions, &answers);

        let attempt = self
            .uow
            .quizzes()
            .record_attempt(NewQuizAttempt {
                quiz_id,
                student_id,
                answers,
                score: outcome.score,
                correct_count: outcome.correct_count as i32,
                total_questions: outcome.total_questions as i32,
            })
            .await?;

        tracing::debug!(student_id = %student_id, quiz_id = %quiz_id, score = outcome.score, "Quiz attempt graded");

        Ok(QuizResult {
            attempt_id: attempt.id,
            score: outcome.score,
            correct_count: outcome.correct_count,
            total_questions: outcome.total_questions,
            outcomes: outcome.outcomes,
        })
    }
}
