//! Course-level final assessment.
//!
//! Grading compares the submitted literal text with the stored correct
//! answer, ignoring case and surrounding whitespace, for every question
//! type. Multiple-choice answers are therefore the option *text*, not an
//! option index (lesson quizzes use indices, see [`crate::domain::quiz`]).
//!
//! The per-student status is never stored; [`derive_status`] projects it
//! from enrollment progress and attempt history on every read.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::{FULL_PROGRESS, MIN_CHOICE_OPTIONS};
use crate::errors::{AppError, AppResult};

/// Kind of assessment question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "kebab-case")]
pub enum QuestionType {
    MultipleChoice,
    TrueFalse,
    FillInTheBlank,
}

impl QuestionType {
    pub fn as_str(&self) -> &'static str {
        match self {
            QuestionType::MultipleChoice => "multiple-choice",
            QuestionType::TrueFalse => "true-false",
            QuestionType::FillInTheBlank => "fill-in-the-blank",
        }
    }
}

impl TryFrom<&str> for QuestionType {
    type Error = AppError;

    fn try_from(value: &str) -> Result<Self, Self::Error> {
        match value {
            "multiple-choice" => Ok(QuestionType::MultipleChoice),
            "true-false" => Ok(QuestionType::TrueFalse),
            "fill-in-the-blank" => Ok(QuestionType::FillInTheBlank),
            other => Err(AppError::validation(format!(
                "Unknown question type '{}'",
                other
            ))),
        }
    }
}

/// Attached media of a question
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "lowercase")]
pub enum MediaKind {
    Image,
    Video,
}

impl MediaKind {
    pub fn as_str(&self) -> &'static str {
        match self {
            MediaKind::Image => "image",
            MediaKind::Video => "video",
        }
    }

    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "image" => Some(MediaKind::Image),
            "video" => Some(MediaKind::Video),
            _ => None,
        }
    }
}

/// The single final assessment of a course
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Assessment {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub passing_score: f64,
    pub created_at: DateTime<Utc>,
    pub updated_at: DateTime<Utc>,
}

/// Question in an assessment bank, including its answer key
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentQuestion {
    pub id: Uuid,
    pub assessment_id: Uuid,
    pub position: i32,
    pub text: String,
    pub media_url: Option<String>,
    pub media_kind: Option<MediaKind>,
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub correct_answer: String,
    pub created_at: DateTime<Utc>,
}

/// Question content as authored by the instructor
#[derive(Debug, Clone)]
pub struct QuestionDraft {
    pub text: String,
    pub media_url: Option<String>,
    pub media_kind: Option<MediaKind>,
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl QuestionDraft {
    /// Normalize and check the draft against the rules of its question type.
    pub fn validated(mut self) -> AppResult<Self> {
        self.text = self.text.trim().to_string();
        self.correct_answer = self.correct_answer.trim().to_string();
        self.options = self
            .options
            .into_iter()
            .map(|option| option.trim().to_string())
            .filter(|option| !option.is_empty())
            .collect();

        if self.text.is_empty() {
            return Err(AppError::validation("Question text is required"));
        }
        if self.media_url.is_some() != self.media_kind.is_some() {
            return Err(AppError::validation(
                "Media URL and media type must be provided together",
            ));
        }

        match self.question_type {
            QuestionType::MultipleChoice => {
                if self.options.len() < MIN_CHOICE_OPTIONS {
                    return Err(AppError::validation(format!(
                        "Multiple-choice questions need at least {} options",
                        MIN_CHOICE_OPTIONS
                    )));
                }
                if !self
                    .options
                    .iter()
                    .any(|option| answers_match(option, &self.correct_answer))
                {
                    return Err(AppError::validation(
                        "Correct answer must be one of the options",
                    ));
                }
            }
            QuestionType::TrueFalse => {
                let answer = self.correct_answer.to_lowercase();
                if answer != "true" && answer != "false" {
                    return Err(AppError::validation(
                        "True/false questions must have 'true' or 'false' as the answer",
                    ));
                }
                self.correct_answer = answer;
                self.options = vec!["true".to_string(), "false".to_string()];
            }
            QuestionType::FillInTheBlank => {
                if self.correct_answer.is_empty() {
                    return Err(AppError::validation("Correct answer is required"));
                }
                self.options.clear();
            }
        }

        Ok(self)
    }
}

/// One submitted answer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmittedAnswer {
    pub question_id: Uuid,
    #[schema(example = "Ownership")]
    pub answer: String,
}

/// Append-only record of one graded submission
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct AssessmentAttempt {
    pub id: Uuid,
    pub assessment_id: Uuid,
    pub student_id: Uuid,
    pub answers: Vec<SubmittedAnswer>,
    pub score: f64,
    pub passed: bool,
    pub created_at: DateTime<Utc>,
}

/// Attempt before it is persisted
#[derive(Debug, Clone)]
pub struct NewAttempt {
    pub assessment_id: Uuid,
    pub student_id: Uuid,
    pub answers: Vec<SubmittedAnswer>,
    pub score: f64,
    pub passed: bool,
}

/// Outcome of grading an answer set
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Grade {
    pub correct_count: usize,
    pub total_questions: usize,
    pub score: f64,
    pub passed: bool,
}

/// Case-insensitive comparison of literal answers.
pub fn answers_match(submitted: &str, correct: &str) -> bool {
    submitted.trim().to_lowercase() == correct.trim().to_lowercase()
}

/// Grade `answers` against the question bank.
///
/// Questions without a matching submitted answer count as wrong. An empty
/// bank scores 0 and never passes.
pub fn grade(
    questions: &[AssessmentQuestion],
    answers: &[SubmittedAnswer],
    passing_score: f64,
) -> Grade {
    let total_questions = questions.len();
    let correct_count = questions
        .iter()
        .filter(|question| {
            answers
                .iter()
                .find(|answer| answer.question_id == question.id)
                .is_some_and(|answer| answers_match(&answer.answer, &question.correct_answer))
        })
        .count();

    if total_questions == 0 {
        return Grade {
            correct_count: 0,
            total_questions: 0,
            score: 0.0,
            passed: false,
        };
    }

    let score = correct_count as f64 * 100.0 / total_questions as f64;
    Grade {
        correct_count,
        total_questions,
        score,
        passed: score >= passing_score,
    }
}

/// Per-student state of an assessment
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub enum AssessmentStatus {
    /// Course progress below 100%
    Locked,
    /// Unlocked, never attempted
    NotStarted,
    /// At least one passing attempt
    Completed,
    /// Attempted, nothing passed yet; re-attempts allowed
    Failed,
}

/// Project the status from enrollment progress and attempt history.
///
/// A passing attempt wins over everything else. Otherwise an incomplete
/// course keeps the assessment locked, even after earlier failed attempts
/// (lessons added after the attempt re-lock it).
pub fn derive_status(progress: i32, attempts: &[AssessmentAttempt]) -> AssessmentStatus {
    if attempts.iter().any(|attempt| attempt.passed) {
        AssessmentStatus::Completed
    } else if progress < FULL_PROGRESS {
        AssessmentStatus::Locked
    } else if attempts.is_empty() {
        AssessmentStatus::NotStarted
    } else {
        AssessmentStatus::Failed
    }
}

/// Highest-scoring passing attempt, if any.
pub fn best_passing_attempt(attempts: &[AssessmentAttempt]) -> Option<&AssessmentAttempt> {
    attempts
        .iter()
        .filter(|attempt| attempt.passed)
        .max_by(|a, b| a.score.total_cmp(&b.score))
}

/// Assessment as shown to the owning instructor
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    #[schema(example = "Rust for Backend Engineers - Final Assessment")]
    pub title: String,
    #[schema(example = 75.0)]
    pub passing_score: f64,
    pub questions: Vec<QuestionResponse>,
}

impl AssessmentResponse {
    pub fn new(assessment: Assessment, questions: Vec<AssessmentQuestion>) -> Self {
        Self {
            id: assessment.id,
            course_id: assessment.course_id,
            title: assessment.title,
            passing_score: assessment.passing_score,
            questions: questions.into_iter().map(QuestionResponse::from).collect(),
        }
    }
}

/// Question with its answer key (instructor view)
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct QuestionResponse {
    pub id: Uuid,
    pub text: String,
    pub media_url: Option<String>,
    pub media_kind: Option<MediaKind>,
    pub question_type: QuestionType,
    pub options: Vec<String>,
    pub correct_answer: String,
}

impl From<AssessmentQuestion> for QuestionResponse {
    fn from(question: AssessmentQuestion) -> Self {
        Self {
            id: question.id,
            text: question.text,
            media_url: question.media_url,
            media_kind: question.media_kind,
            question_type: question.question_type,
            options: question.options,
            correct_answer: question.correct_answer,
        }
    }
}

/// Question as delivered to a student: no answer key
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct StudentQuestion {
    pub id: Uuid,
    pub text: String,
    pub media_url: Option<String>,
    pub media_kind: Option<MediaKind>,
    pub question_type: QuestionType,
    pub options: Vec<String>,
}

impl From<AssessmentQuestion> for StudentQuestion {
    fn from(question: AssessmentQuestion) -> Self {
        Self {
            id: question.id,
            text: question.text,
            media_url: question.media_url,
            media_kind: question.media_kind,
            question_type: question.question_type,
            options: question.options,
        }
    }
}

/// Student-facing payload of `GET /assessments/:id/take`
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct TakeAssessmentResponse {
    pub id: Uuid,
    pub course_id: Uuid,
    pub title: String,
    pub passing_score: f64,
    pub questions: Vec<StudentQuestion>,
}

/// Grading result returned from a submission
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct SubmissionResult {
    pub attempt_id: Uuid,
    #[schema(example = 75.0)]
    pub score: f64,
    pub passed: bool,
    pub correct_count: usize,
    pub total_questions: usize,
    pub passing_score: f64,
    pub certificate_id: Option<String>,
}

/// Attempt history row
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AttemptResponse {
    pub id: Uuid,
    pub score: f64,
    pub passed: bool,
    pub created_at: DateTime<Utc>,
}

impl From<AssessmentAttempt> for AttemptResponse {
    fn from(attempt: AssessmentAttempt) -> Self {
        Self {
            id: attempt.id,
            score: attempt.score,
            passed: attempt.passed,
            created_at: attempt.created_at,
        }
    }
}

/// Student dashboard row for one enrolled course's assessment
#[derive(Debug, Clone, Serialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct AssessmentDashboardRow {
    pub assessment_id: Uuid,
    pub course_id: Uuid,
    pub course_title: String,
    pub title: String,
    pub passing_score: f64,
    pub progress: i32,
    pub status: AssessmentStatus,
    pub attempts: usize,
    pub best_score: Option<f64>,
    /// Present only when `status` is `completed`
    pub certificate_id: Option<String>,
}

#[cfg(test)]
mod tests {
    use super::*;

    fn question(correct: &str) -> AssessmentQuestion {
        AssessmentQuestion {
            id: Uuid::new_v4(),
            assessment_id: Uuid::new_v4(),
            position: 0,
            text: "Q".to_string(),
            media_url: None,
            media_kind: None,
            question_type: QuestionType::FillInTheBlank,
            options: vec![],
            correct_answer: correct.to_string(),
            created_at: Utc::now(),
        }
    }

    fn answer(question: &AssessmentQuestion, text: &str) -> SubmittedAnswer {
        SubmittedAnswer {
            question_id: question.id,
            answer: text.to_string(),
        }
    }

    fn attempt(score: f64, passed: bool) -> AssessmentAttempt {
        AssessmentAttempt {
            id: Uuid::new_v4(),
            assessment_id: Uuid::new_v4(),
            student_id: Uuid::new_v4(),
            answers: vec![],
            score,
            passed,
            created_at: Utc::now(),
        }
    }

    #[test]
    fn test_three_of_four_passes_at_default_threshold() {
        let questions: Vec<_> = ["a", "b", "c", "d"].iter().map(|c| question(c)).collect();
        let answers = vec![
            answer(&questions[0], "a"),
            answer(&questions[1], "b"),
            answer(&questions[2], "c"),
            answer(&questions[3], "wrong"),
        ];

        let grade = grade(&questions, &answers, 75.0);
        assert_eq!(grade.correct_count, 3);
        assert_eq!(grade.total_questions, 4);
        assert_eq!(grade.score, 75.0);
        assert!(grade.passed);
    }

    #[test]
    fn test_exact_passing_mark_is_not_lost_to_rounding() {
        let questions: Vec<_> = (0..50).map(|i| question(&i.to_string())).collect();
        let answers: Vec<_> = questions
            .iter()
            .enumerate()
            .map(|(i, q)| answer(q, if i < 29 { q.correct_answer.as_str() } else { "no" }))
            .collect();

        let grade = grade(&questions, &answers, 58.0);
        assert_eq!(grade.correct_count, 29);
        assert_eq!(grade.score, 58.0);
        assert!(grade.passed);
    }

    #[test]
    fn test_empty_bank_scores_zero() {
        let grade = grade(&[], &[], 75.0);
        assert_eq!(grade.score, 0.0);
        assert!(!grade.passed);
    }

    #[test]
    fn test_empty_bank_never_passes_even_at_zero_threshold() {
        assert!(!grade(&[], &[], 0.0).passed);
    }

    #[test]
    fn test_missing_answers_count_as_wrong() {
        let questions = vec![question("x"), question("y")];
        let answers = vec![answer(&questions[0], "x")];

        let grade = grade(&questions, &answers, 75.0);
        assert_eq!(grade.correct_count, 1);
        assert_eq!(grade.score, 50.0);
        assert!(!grade.passed);
    }

    #[test]
    fn test_answers_for_unknown_questions_are_ignored() {
        let questions = vec![question("x")];
        let stray = SubmittedAnswer {
            question_id: Uuid::new_v4(),
            answer: "x".to_string(),
        };

        assert_eq!(grade(&questions, &[stray], 75.0).correct_count, 0);
    }

    #[test]
    fn test_comparison_ignores_case_and_padding() {
        assert!(answers_match("  OwnerShip ", "ownership"));
        assert!(answers_match("TRUE", "true"));
        assert!(!answers_match("borrow", "ownership"));
    }

    #[test]
    fn test_passed_tracks_threshold() {
        let questions: Vec<_> = (0..10).map(|i| question(&i.to_string())).collect();
        for correct in 0..=10usize {
            let answers: Vec<_> = questions
                .iter()
                .enumerate()
                .map(|(i, q)| answer(q, if i < correct { q.correct_answer.as_str() } else { "no" }))
                .collect();
            for threshold in [0.0, 50.0, 75.0, 100.0] {
                let grade = grade(&questions, &answers, threshold);
                assert_eq!(grade.passed, grade.score >= threshold);
            }
        }
    }

    #[test]
    fn test_status_projection() {
        assert_eq!(derive_status(50, &[]), AssessmentStatus::Locked);
        assert_eq!(derive_status(100, &[]), AssessmentStatus::NotStarted);
        assert_eq!(
            derive_status(100, &[attempt(50.0, false)]),
            AssessmentStatus::Failed
        );
        assert_eq!(
            derive_status(100, &[attempt(50.0, false), attempt(80.0, true)]),
            AssessmentStatus::Completed
        );
    }

    #[test]
    fn test_pass_survives_relocking() {
        assert_eq!(
            derive_status(80, &[attempt(90.0, true)]),
            AssessmentStatus::Completed
        );
        assert_eq!(
            derive_status(80, &[attempt(10.0, false)]),
            AssessmentStatus::Locked
        );
    }

    #[test]
    fn test_best_passing_attempt() {
        let attempts = vec![attempt(100.0, false), attempt(80.0, true), attempt(95.0, true)];
        assert_eq!(best_passing_attempt(&attempts).map(|a| a.score), Some(95.0));
        assert!(best_passing_attempt(&[attempt(20.0, false)]).is_none());
    }

    #[test]
    fn test_multiple_choice_draft_requires_answer_among_options() {
        let draft = QuestionDraft {
            text: "Pick one".to_string(),
            media_url: None,
            media_kind: None,
            question_type: QuestionType::MultipleChoice,
            options: vec!["Box".to_string(), "Rc".to_string()],
            correct_answer: "Arc".to_string(),
        };
        assert!(draft.clone().validated().is_err());

        let valid = QuestionDraft {
            correct_answer: "rc".to_string(),
            ..draft
        };
        assert!(valid.validated().is_ok());
    }

    #[test]
    fn test_true_false_draft_is_normalized() {
        let draft = QuestionDraft {
            text: "Rust has a GC".to_string(),
            media_url: None,
            media_kind: None,
            question_type: QuestionType::TrueFalse,
            options: vec![],
            correct_answer: " False ".to_string(),
        }
        .validated()
        .unwrap();

        assert_eq!(draft.correct_answer, "false");
        assert_eq!(draft.options, vec!["true", "false"]);
    }

    #[test]
    fn test_media_requires_kind() {
        let draft = QuestionDraft {
            text: "Look".to_string(),
            media_url: Some("https://media.example.com/a.png".to_string()),
            media_kind: None,
            question_type: QuestionType::FillInTheBlank,
            options: vec![],
            correct_answer: "x".to_string(),
        };
        assert!(draft.validated().is_err());
    }

    #[test]
    fn test_student_view_has_no_answer_key() {
        for question_type in [
            QuestionType::MultipleChoice,
            QuestionType::TrueFalse,
            QuestionType::FillInTheBlank,
        ] {
            let mut q = question("secret-answer");
            q.question_type = question_type;
            let json = serde_json::to_value(StudentQuestion::from(q)).unwrap();
            assert!(json.get("correctAnswer").is_none());
            assert!(!json.to_string().contains("secret-answer"));
        }
    }

    #[test]
    fn test_question_type_wire_names() {
        assert_eq!(
            serde_json::to_string(&QuestionType::FillInTheBlank).unwrap(),
            "\"fill-in-the-blank\""
        );
        assert_eq!(
            QuestionType::try_from("true-false").unwrap(),
            QuestionType::TrueFalse
        );
    }
}
