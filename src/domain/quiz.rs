//! Per-lesson practice quizzes.
//!
//! Unlike the course assessment, a quiz answer is the *index* of the chosen
//! option. It is correct when the option text at that index equals the
//! stored answer exactly. Quizzes have no pass/fail and never lead to a
//! certificate.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::MIN_CHOICE_OPTIONS;
use crate::errors::{AppError, AppResult};

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Quiz {
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizQuestion {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub position: i32,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub created_at: DateTime<Utc>,
}

/// Quiz question as authored
#[derive(Debug, Clone)]
pub struct QuizQuestionDraft {
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl QuizQuestionDraft {
    pub fn validated(self) -> AppResult<Self> {
        let text = self.text.trim().to_string();
        if text.is_empty() {
            return Err(AppError::validation("Question text is required"));
        }
        if self.options.len() < MIN_CHOICE_OPTIONS {
            return Err(AppError::validation(format!(
                "Quiz questions need at least {} options",
                MIN_CHOICE_OPTIONS
            )));
        }
        if !self.options.contains(&self.correct_answer) {
            return Err(AppError::validation(
                "Correct answer must be one of the options",
            ));
        }
        Ok(Self { text, ..self })
    }
}

/// Selected option for one question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizAnswer {
    pub question_id: Uuid,
    #[schema(example = 1)]
    pub selected_option: usize,
}

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct QuizAttempt {
    pub id: Uuid,
    pub quiz_id: Uuid,
    pub student_id: Uuid,
    pub answers: Vec<QuizAnswer>,
    pub score: f64,
    pub correct_count: i32,
    pub total_questions: i32,
    pub created_at: DateTime<Utc>,
}

#[derive(Debug, Clone)]
pub struct NewQuizAttempt {
    pub quiz_id: Uuid,
    pub student_id: Uuid,
    pub answers: Vec<QuizAnswer>,
    pub score: f64,
    pub correct_count: i32,
    pub total_questions: i32,
}

/// Per-question feedback returned after submission
#[derive(Debug, Clone, PartialEq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionOutcome {
    pub question_id: Uuid,
    pub selected_option: Option<usize>,
    pub correct: bool,
    pub correct_answer: String,
}

#[derive(Debug, Clone, PartialEq)]
pub struct QuizGrade {
    pub correct_count: usize,
    pub total_questions: usize,
    pub score: f64,
    pub outcomes: Vec<QuestionOutcome>,
}

/// Does `selected` point at the option holding the stored answer?
pub fn option_matches(question: &QuizQuestion, selected: usize) -> bool {
    question
        .options
        .get(selected)
        .is_some_and(|option| *option == question.correct_answer)
}

/// Grade a quiz submission. An empty quiz scores 0.
pub fn grade_quiz(questions: &[QuizQuestion], answers: &[QuizAnswer]) -> QuizGrade {
    let outcomes: Vec<QuestionOutcome> = questions
        .iter()
        .map(|question| {
            let selected = answers
                .iter()
                .find(|answer| answer.question_id == question.id)
                .map(|answer| answer.selected_option);
            QuestionOutcome {
                question_id: question.id,
                selected_option: selected,
                correct: selected.is_some_and(|index| option_matches(question, index)),
                correct_answer: question.correct_answer.clone(),
            }
        })
        .collect();

    let total_questions = questions.len();
    let correct_count = outcomes.iter().filter(|outcome| outcome.correct).count();
    let score = if total_questions == 0 {
        0.0
    } else {
        correct_count as f64 * 100.0 / total_questions as f64
    };

    QuizGrade {
        correct_count,
        total_questions,
        score,
        outcomes,
    }
}

/// Quiz question without the answer key
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentQuizQuestion {
    pub id: Uuid,
    pub text: String,
    pub options: Vec<String>,
}

impl From<QuizQuestion> for StudentQuizQuestion {
    fn from(question: QuizQuestion) -> Self {
        Self {
            id: question.id,
            text: question.text,
            options: question.options,
        }
    }
}

/// Quiz with answer keys (instructor view)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizResponse {
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub title: String,
    pub questions: Vec<QuizQuestionResponse>,
}

#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizQuestionResponse {
    pub id: Uuid,
    pub text: String,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl From<QuizQuestion> for QuizQuestionResponse {
    fn from(question: QuizQuestion) -> Self {
        Self {
            id: question.id,
            text: question.text,
            options: question.options,
            correct_answer: question.correct_answer,
        }
    }
}

impl QuizResponse {
    pub fn new(quiz: Quiz, questions: Vec<QuizQuestion>) -> Self {
        Self {
            id: quiz.id,
            lesson_id: quiz.lesson_id,
            title: quiz.title,
            questions: questions.into_iter().map(Into::into).collect(),
        }
    }
}

/// Student-facing quiz payload
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TakeQuizResponse {
    pub id: Uuid,
    pub lesson_id: Uuid,
    pub title: String,
    pub questions: Vec<StudentQuizQuestion>,
}

/// Result of a quiz submission
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuizResult {
    pub attempt_id: Uuid,
    pub score: f64,
    pub correct_count: usize,
    pub total_questions: usize,
    pub outcomes: Vec<QuestionOutcome>,
}
