//! Shared test fixtures: an in-memory Unit of Work and service wiring.
//!
//! The in-memory repositories keep the same uniqueness rules as the
//! PostgreSQL schema (one enrollment, certificate and review per student
//! and course; one assessment per course; one quiz per lesson; one direct
//! conversation per pair) so workflow tests exercise real service logic.

#![allow(dead_code)]

use std::collections::HashMap;
use std::sync::{Arc, Mutex, MutexGuard};

use async_trait::async_trait;
use chrono::{Duration, Utc};
use uuid::Uuid;

use course_market::config::Config;
use course_market::domain::assessment::NewAttempt;
use course_market::domain::course::{CourseChanges, LessonChanges, NewCourse, NewLesson};
use course_market::domain::messaging::{direct_key, LastMessage};
use course_market::domain::payment::NewPaymentOrder;
use course_market::domain::quiz::{NewQuizAttempt, QuizAttempt, QuizQuestionDraft};
use course_market::domain::review::NewReview;
use course_market::domain::{
    Assessment, AssessmentAttempt, AssessmentQuestion, Certificate, Conversation, Course,
    CourseStatus, Enrollment, Lesson, Message, NewUser, OrderStatus, PaymentOrder, QuestionDraft,
    Quiz, QuizQuestion, Review, User, UserRole,
};
use course_market::errors::{AppError, AppResult};
use course_market::infra::external::{
    MockCertificateRenderer, MockMediaHost, MockPaymentGateway, MockSummarizer,
};
use course_market::infra::{
    AssessmentRepository, CertificateRepository, ConversationRepository, CourseRepository,
    EnrollmentRepository, LessonRepository, PaymentRepository, PresenceRegistry, QuizRepository,
    ReviewRepository, UnitOfWork, UserRepository,
};
use course_market::services::{Collaborators, Services};
use course_market::types::PaginationParams;

pub const TEST_SECRET: &str = "test-secret-key-for-testing-only-32chars";

#[derive(Default)]
struct Tables {
    users: Vec<User>,
    courses: Vec<Course>,
    lessons: Vec<Lesson>,
    enrollments: Vec<Enrollment>,
    assessments: Vec<Assessment>,
    questions: Vec<AssessmentQuestion>,
    attempts: Vec<AssessmentAttempt>,
    certificates: Vec<Certificate>,
    quizzes: Vec<Quiz>,
    quiz_questions: Vec<QuizQuestion>,
    quiz_attempts: Vec<QuizAttempt>,
    reviews: Vec<Review>,
    conversations: Vec<Conversation>,
    direct_keys: HashMap<String, Uuid>,
    messages: Vec<Message>,
    orders: Vec<PaymentOrder>,
}

/// In-memory database; every repository trait is implemented on it.
#[derive(Default)]
pub struct MemoryDb {
    tables: Mutex<Tables>,
}

impl MemoryDb {
    fn lock(&self) -> MutexGuard<'_, Tables> {
        self.tables.lock().unwrap_or_else(|poisoned| poisoned.into_inner())
    }

    pub fn attempt_count(&self) -> usize {
        self.lock().attempts.len()
    }

    pub fn certificate_count(&self) -> usize {
        self.lock().certificates.len()
    }

    pub fn stored_progress(&self, user_id: Uuid, course_id: Uuid) -> Option<i32> {
        self.lock()
            .enrollments
            .iter()
            .find(|e| e.user_id == user_id && e.course_id == course_id)
            .map(|e| e.progress)
    }
}

/// Unit of Work handing out the one in-memory database for every repository
#[derive(Clone, Default)]
pub struct MemoryUnitOfWork {
    pub db: Arc<MemoryDb>,
}

impl UnitOfWork for MemoryUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.db.clone()
    }

    fn courses(&self) -> Arc<dyn CourseRepository> {
        self.db.clone()
    }

    fn lessons(&self) -> Arc<dyn LessonRepository> {
        self.db.clone()
    }

    fn enrollments(&self) -> Arc<dyn EnrollmentRepository> {
        self.db.clone()
    }

    fn assessments(&self) -> Arc<dyn AssessmentRepository> {
        self.db.clone()
    }

    fn certificates(&self) -> Arc<dyn CertificateRepository> {
        self.db.clone()
    }

    fn quizzes(&self) -> Arc<dyn QuizRepository> {
        self.db.clone()
    }

    fn reviews(&self) -> Arc<dyn ReviewRepository> {
        self.db.clone()
    }

    fn conversations(&self) -> Arc<dyn ConversationRepository> {
        self.db.clone()
    }

    fn payments(&self) -> Arc<dyn PaymentRepository> {
        self.db.clone()
    }
}

#[async_trait]
impl UserRepository for MemoryDb {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.id == id).cloned())
    }

    async fn find_by_email(&self, email: &str) -> AppResult<Option<User>> {
        Ok(self.lock().users.iter().find(|u| u.email == email).cloned())
    }

    async fn find_many(&self, ids: Vec<Uuid>) -> AppResult<Vec<User>> {
        Ok(self
            .lock()
            .users
            .iter()
            .filter(|u| ids.contains(&u.id))
            .cloned()
            .collect())
    }

    async fn create(&self, new_user: NewUser) -> AppResult<User> {
        let mut tables = self.lock();
        if tables.users.iter().any(|u| u.email == new_user.email) {
            return Err(AppError::conflict("User"));
        }
        let user = User {
            id: Uuid::new_v4(),
            name: new_user.name,
            email: new_user.email,
            password_hash: new_user.password_hash,
            role: new_user.role,
            profile_image_url: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        tables.users.push(user.clone());
        Ok(user)
    }

    async fn update_profile(
        &self,
        id: Uuid,
        name: Option<String>,
        profile_image_url: Option<String>,
    ) -> AppResult<User> {
        let mut tables = self.lock();
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AppError::NotFound)?;
        if let Some(name) = name {
            user.name = name;
        }
        if let Some(url) = profile_image_url {
            user.profile_image_url = Some(url);
        }
        user.updated_at = Utc::now();
        Ok(user.clone())
    }

    async fn update_password(&self, id: Uuid, password_hash: String) -> AppResult<()> {
        let mut tables = self.lock();
        let user = tables
            .users
            .iter_mut()
            .find(|u| u.id == id)
            .ok_or(AppError::NotFound)?;
        user.password_hash = Some(password_hash);
        Ok(())
    }
}

#[async_trait]
impl CourseRepository for MemoryDb {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Course>> {
        Ok(self.lock().courses.iter().find(|c| c.id == id).cloned())
    }

    async fn find_many(&self, ids: Vec<Uuid>) -> AppResult<Vec<Course>> {
        Ok(self
            .lock()
            .courses
            .iter()
            .filter(|c| ids.contains(&c.id))
            .cloned()
            .collect())
    }

    async fn list_published(&self, params: PaginationParams) -> AppResult<(Vec<Course>, u64)> {
        let mut published: Vec<Course> = self
            .lock()
            .courses
            .iter()
            .filter(|c| c.is_published())
            .cloned()
            .collect();
        published.sort_by(|a, b| b.created_at.cmp(&a.created_at));
        let total = published.len() as u64;
        let page = published
            .into_iter()
            .skip(params.offset() as usize)
            .take(params.limit() as usize)
            .collect();
        Ok((page, total))
    }

    async fn list_by_instructor(&self, instructor_id: Uuid) -> AppResult<Vec<Course>> {
        Ok(self
            .lock()
            .courses
            .iter()
            .filter(|c| c.instructor_id == instructor_id)
            .cloned()
            .collect())
    }

    async fn create(&self, new_course: NewCourse) -> AppResult<Course> {
        let course = Course {
            id: Uuid::new_v4(),
            instructor_id: new_course.instructor_id,
            title: new_course.title,
            description: new_course.description,
            price: new_course.price,
            status: CourseStatus::Draft,
            average_rating: 0.0,
            num_reviews: 0,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.lock().courses.push(course.clone());
        Ok(course)
    }

    async fn update(&self, id: Uuid, changes: CourseChanges) -> AppResult<Course> {
        let mut tables = self.lock();
        let course = tables
            .courses
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(AppError::NotFound)?;
        if let Some(title) = changes.title {
            course.title = title;
        }
        if let Some(description) = changes.description {
            course.description = description;
        }
        if let Some(price) = changes.price {
            course.price = price;
        }
        course.updated_at = Utc::now();
        Ok(course.clone())
    }

    async fn set_status(&self, id: Uuid, status: CourseStatus) -> AppResult<Course> {
        let mut tables = self.lock();
        let course = tables
            .courses
            .iter_mut()
            .find(|c| c.id == id)
            .ok_or(AppError::NotFound)?;
        course.status = status;
        Ok(course.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        let mut tables = self.lock();
        tables.courses.retain(|c| c.id != id);
        tables.lessons.retain(|l| l.course_id != id);
        Ok(())
    }

    async fn update_rating(
        &self,
        id: Uuid,
        average_rating: f64,
        num_reviews: i32,
    ) -> AppResult<()> {
        let mut tables = self.lock();
        if let Some(course) = tables.courses.iter_mut().find(|c| c.id == id) {
            course.average_rating = average_rating;
            course.num_reviews = num_reviews;
        }
        Ok(())
    }
}

#[async_trait]
impl LessonRepository for MemoryDb {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Lesson>> {
        Ok(self.lock().lessons.iter().find(|l| l.id == id).cloned())
    }

    async fn list_by_course(&self, course_id: Uuid) -> AppResult<Vec<Lesson>> {
        let mut lessons: Vec<Lesson> = self
            .lock()
            .lessons
            .iter()
            .filter(|l| l.course_id == course_id)
            .cloned()
            .collect();
        course_market::domain::course::curriculum_order(&mut lessons);
        Ok(lessons)
    }


    async fn create(&self, new_lesson: NewLesson) -> AppResult<Lesson> {
        let mut tables = self.lock();
        // Distinct timestamps keep curriculum order deterministic
        let created_at = Utc::now() + Duration::microseconds(tables.lessons.len() as i64);
        let lesson = Lesson {
            id: Uuid::new_v4(),
            course_id: new_lesson.course_id,
            title: new_lesson.title,
            order_index: new_lesson.order_index,
            duration_minutes: new_lesson.duration_minutes,
            is_preview: new_lesson.is_preview,
            content: new_lesson.content,
            video_url: new_lesson.video_url,
            resources: new_lesson.resources,
            created_at,
            updated_at: created_at,
        };
        tables.lessons.push(lesson.clone());
        Ok(lesson)
    }

    async fn update(&self, id: Uuid, changes: LessonChanges) -> AppResult<Lesson> {
        let mut tables = self.lock();
        let lesson = tables
            .lessons
            .iter_mut()
            .find(|l| l.id == id)
            .ok_or(AppError::NotFound)?;
        if let Some(title) = changes.title {
            lesson.title = title;
        }
        if let Some(order_index) = changes.order_index {
            lesson.order_index = order_index;
        }
        if let Some(content) = changes.content {
            lesson.content = content;
        }
        if let Some(is_preview) = changes.is_preview {
            lesson.is_preview = is_preview;
        }
        if let Some(duration) = changes.duration_minutes {
            lesson.duration_minutes = duration;
        }
        if let Some(url) = changes.video_url {
            lesson.video_url = Some(url);
        }
        if let Some(resources) = changes.resources {
            lesson.resources = resources;
        }
        lesson.updated_at = Utc::now();
        Ok(lesson.clone())
    }

    async fn delete(&self, id: Uuid) -> AppResult<()> {
        self.lock().lessons.retain(|l| l.id != id);
        Ok(())
    }
}

#[async_trait]
impl EnrollmentRepository for MemoryDb {
    async fn find(&self, user_id: Uuid, course_id: Uuid) -> AppResult<Option<Enrollment>> {
        Ok(self
            .lock()
            .enrollments
            .iter()
            .find(|e| e.user_id == user_id && e.course_id == course_id)
            .cloned())
    }

    async fn ensure(&self, user_id: Uuid, course_id: Uuid) -> AppResult<Enrollment> {
        let mut tables = self.lock();
        if let Some(existing) = tables
            .enrollments
            .iter()
            .find(|e| e.user_id == user_id && e.course_id == course_id)
        {
            return Ok(existing.clone());
        }
        let enrollment = Enrollment {
            id: Uuid::new_v4(),
            user_id,
            course_id,
            completed_lessons: Vec::new(),
            progress: 0,
            enrolled_at: Utc::now(),
            updated_at: Utc::now(),
        };
        tables.enrollments.push(enrollment.clone());
        Ok(enrollment)
    }

    async fn add_completed_lesson(
        &self,
        enrollment_id: Uuid,
        lesson_id: Uuid,
    ) -> AppResult<Vec<Uuid>> {
        let mut tables = self.lock();
        let enrollment = tables
            .enrollments
            .iter_mut()
            .find(|e| e.id == enrollment_id)
            .ok_or(AppError::NotFound)?;
        if !enrollment.completed_lessons.contains(&lesson_id) {
            enrollment.completed_lessons.push(lesson_id);
        }
        Ok(enrollment.completed_lessons.clone())
    }

    async fn set_progress(&self, enrollment_id: Uuid, progress: i32) -> AppResult<()> {
        let mut tables = self.lock();
        if let Some(enrollment) = tables.enrollments.iter_mut().find(|e| e.id == enrollment_id) {
            enrollment.progress = progress;
            enrollment.updated_at = Utc::now();
        }
        Ok(())
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Enrollment>> {
        Ok(self
            .lock()
            .enrollments
            .iter()
            .filter(|e| e.user_id == user_id)
            .cloned()
            .collect())
    }

    async fn list_student_ids(&self, course_id: Uuid) -> AppResult<Vec<Uuid>> {
        Ok(self
            .lock()
            .enrollments
            .iter()
            .filter(|e| e.course_id == course_id)
            .map(|e| e.user_id)
            .collect())
    }
}

#[async_trait]
impl AssessmentRepository for MemoryDb {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Assessment>> {
        Ok(self.lock().assessments.iter().find(|a| a.id == id).cloned())
    }

    async fn find_by_course(&self, course_id: Uuid) -> AppResult<Option<Assessment>> {
        Ok(self
            .lock()
            .assessments
            .iter()
            .find(|a| a.course_id == course_id)
            .cloned())
    }

    async fn create_if_absent(
        &self,
        course_id: Uuid,
        title: String,
        passing_score: f64,
    ) -> AppResult<Assessment> {
        let mut tables = self.lock();
        if let Some(existing) = tables.assessments.iter().find(|a| a.course_id == course_id) {
            return Ok(existing.clone());
        }
        let assessment = Assessment {
            id: Uuid::new_v4(),
            course_id,
            title,
            passing_score,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        tables.assessments.push(assessment.clone());
        Ok(assessment)
    }

    async fn update(
        &self,
        id: Uuid,
        title: Option<String>,
        passing_score: Option<f64>,
    ) -> AppResult<Assessment> {
        let mut tables = self.lock();
        let assessment = tables
            .assessments
            .iter_mut()
            .find(|a| a.id == id)
            .ok_or(AppError::NotFound)?;
        if let Some(title) = title {
            assessment.title = title;
        }
        if let Some(score) = passing_score {
            assessment.passing_score = score;
        }
        Ok(assessment.clone())
    }

    async fn list_by_courses(&self, course_ids: Vec<Uuid>) -> AppResult<Vec<Assessment>> {
        Ok(self
            .lock()
            .assessments
            .iter()
            .filter(|a| course_ids.contains(&a.course_id))
            .cloned()
            .collect())
    }

    async fn list_questions(&self, assessment_id: Uuid) -> AppResult<Vec<AssessmentQuestion>> {
        Ok(self
            .lock()
            .questions
            .iter()
            .filter(|q| q.assessment_id == assessment_id)
            .cloned()
            .collect())
    }

    async fn add_question(
        &self,
        assessment_id: Uuid,
        draft: QuestionDraft,
    ) -> AppResult<AssessmentQuestion> {
        let mut tables = self.lock();
        let position = tables
            .questions
            .iter()
            .filter(|q| q.assessment_id == assessment_id)
            .count() as i32;
        let question = AssessmentQuestion {
            id: Uuid::new_v4(),
            assessment_id,
            position,
            text: draft.text,
            media_url: draft.media_url,
            media_kind: draft.media_kind,
            question_type: draft.question_type,
            options: draft.options,
            correct_answer: draft.correct_answer,
            created_at: Utc::now(),
        };
        tables.questions.push(question.clone());
        Ok(question)
    }

    async fn find_question(&self, id: Uuid) -> AppResult<Option<AssessmentQuestion>> {
        Ok(self.lock().questions.iter().find(|q| q.id == id).cloned())
    }

    async fn delete_question(&self, id: Uuid) -> AppResult<()> {
        self.lock().questions.retain(|q| q.id != id);
        Ok(())
    }

    async fn record_attempt(&self, attempt: NewAttempt) -> AppResult<AssessmentAttempt> {
        let mut tables = self.lock();
        let created_at = Utc::now() + Duration::microseconds(tables.attempts.len() as i64);
        let stored = AssessmentAttempt {
            id: Uuid::new_v4(),
            assessment_id: attempt.assessment_id,
            student_id: attempt.student_id,
            answers: attempt.answers,
            score: attempt.score,
            passed: attempt.passed,
            created_at,
        };
        tables.attempts.push(stored.clone());
        Ok(stored)
    }

    async fn list_attempts(
        &self,
        assessment_id: Uuid,
        student_id: Uuid,
    ) -> AppResult<Vec<AssessmentAttempt>> {
        Ok(self
            .lock()
            .attempts
            .iter()
            .filter(|a| a.assessment_id == assessment_id && a.student_id == student_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl CertificateRepository for MemoryDb {
    async fn find_by_user_course(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<Option<Certificate>> {
        Ok(self
            .lock()
            .certificates
            .iter()
            .find(|c| c.user_id == user_id && c.course_id == course_id)
            .cloned())
    }

    async fn find_by_certificate_id(
        &self,
        certificate_id: &str,
    ) -> AppResult<Option<Certificate>> {
        Ok(self
            .lock()
            .certificates
            .iter()
            .find(|c| c.certificate_id == certificate_id)
            .cloned())
    }

    async fn issue(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        certificate_id: String,
    ) -> AppResult<Certificate> {
        let mut tables = self.lock();
        if let Some(existing) = tables
            .certificates
            .iter()
            .find(|c| c.user_id == user_id && c.course_id == course_id)
        {
            return Ok(existing.clone());
        }
        let certificate = Certificate {
            id: Uuid::new_v4(),
            certificate_id,
            user_id,
            course_id,
            issued_at: Utc::now(),
        };
        tables.certificates.push(certificate.clone());
        Ok(certificate)
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Certificate>> {
        Ok(self
            .lock()
            .certificates
            .iter()
            .filter(|c| c.user_id == user_id)
            .cloned()
            .collect())
    }
}

#[async_trait]
impl QuizRepository for MemoryDb {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Quiz>> {
        Ok(self.lock().quizzes.iter().find(|q| q.id == id).cloned())
    }

    async fn find_by_lesson(&self, lesson_id: Uuid) -> AppResult<Option<Quiz>> {
        Ok(self
            .lock()
            .quizzes
            .iter()
            .find(|q| q.lesson_id == lesson_id)
            .cloned())
    }

    async fn create_if_absent(
        &self,
        lesson_id: Uuid,
        course_id: Uuid,
        title: String,
    ) -> AppResult<Quiz> {
        let mut tables = self.lock();
        if let Some(existing) = tables.quizzes.iter().find(|q| q.lesson_id == lesson_id) {
            return Ok(existing.clone());
        }
        let quiz = Quiz {
            id: Uuid::new_v4(),
            lesson_id,
            course_id,
            title,
            created_at: Utc::now(),
        };
        tables.quizzes.push(quiz.clone());
        Ok(quiz)
    }

    async fn list_questions(&self, quiz_id: Uuid) -> AppResult<Vec<QuizQuestion>> {
        Ok(self
            .lock()
            .quiz_questions
            .iter()
            .filter(|q| q.quiz_id == quiz_id)
            .cloned()
            .collect())
    }

    async fn add_question(
        &self,
        quiz_id: Uuid,
        draft: QuizQuestionDraft,
    ) -> AppResult<QuizQuestion> {
        let mut tables = self.lock();
        let position = tables
            .quiz_questions
            .iter()
            .filter(|q| q.quiz_id == quiz_id)
            .count() as i32;
        let question = QuizQuestion {
            id: Uuid::new_v4(),
            quiz_id,
            position,
            text: draft.text,
            options: draft.options,
            correct_answer: draft.correct_answer,
            created_at: Utc::now(),
        };
        tables.quiz_questions.push(question.clone());
        Ok(question)
    }

    async fn record_attempt(&self, attempt: NewQuizAttempt) -> AppResult<QuizAttempt> {
        let stored = QuizAttempt {
            id: Uuid::new_v4(),
            quiz_id: attempt.quiz_id,
            student_id: attempt.student_id,
            answers: attempt.answers,
            score: attempt.score,
            correct_count: attempt.correct_count,
            total_questions: attempt.total_questions,
            created_at: Utc::now(),
        };
        self.lock().quiz_attempts.push(stored.clone());
        Ok(stored)
    }
}

#[async_trait]
impl ReviewRepository for MemoryDb {
    async fn find(&self, user_id: Uuid, course_id: Uuid) -> AppResult<Option<Review>> {
        Ok(self
            .lock()
            .reviews
            .iter()
            .find(|r| r.user_id == user_id && r.course_id == course_id)
            .cloned())
    }

    async fn create(&self, new_review: NewReview) -> AppResult<Review> {
        let mut tables = self.lock();
        if tables
            .reviews
            .iter()
            .any(|r| r.user_id == new_review.user_id && r.course_id == new_review.course_id)
        {
            return Err(AppError::conflict("Review"));
        }
        let review = Review {
            id: Uuid::new_v4(),
            user_id: new_review.user_id,
            course_id: new_review.course_id,
            rating: new_review.rating,
            comment: new_review.comment,
            created_at: Utc::now(),
        };
        tables.reviews.push(review.clone());
        Ok(review)
    }

    async fn list_by_course(&self, course_id: Uuid) -> AppResult<Vec<Review>> {
        Ok(self
            .lock()
            .reviews
            .iter()
            .filter(|r| r.course_id == course_id)
            .cloned()
            .collect())
    }

    async fn ratings_for_course(&self, course_id: Uuid) -> AppResult<Vec<i32>> {
        Ok(self
            .lock()
            .reviews
            .iter()
            .filter(|r| r.course_id == course_id)
            .map(|r| r.rating)
            .collect())
    }
}

#[async_trait]
impl ConversationRepository for MemoryDb {
    async fn find_by_id(&self, id: Uuid) -> AppResult<Option<Conversation>> {
        Ok(self
            .lock()
            .conversations
            .iter()
            .find(|c| c.id == id)
            .cloned())
    }

    async fn find_or_create_direct(&self, a: Uuid, b: Uuid) -> AppResult<Conversation> {
        let mut tables = self.lock();
        let key = direct_key(a, b);
        if let Some(id) = tables.direct_keys.get(&key).copied() {
            if let Some(existing) = tables.conversations.iter().find(|c| c.id == id) {
                return Ok(existing.clone());
            }
        }
        let conversation = Conversation {
            id: Uuid::new_v4(),
            course_id: None,
            participants: vec![a, b],
            last_message: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        tables.direct_keys.insert(key, conversation.id);
        tables.conversations.push(conversation.clone());
        Ok(conversation)
    }

    async fn create_broadcast(
        &self,
        course_id: Uuid,
        participants: Vec<Uuid>,
    ) -> AppResult<Conversation> {
        let conversation = Conversation {
            id: Uuid::new_v4(),
            course_id: Some(course_id),
            participants,
            last_message: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.lock().conversations.push(conversation.clone());
        Ok(conversation)
    }

    async fn list_for_user(&self, user_id: Uuid) -> AppResult<Vec<Conversation>> {
        let mut conversations: Vec<Conversation> = self
            .lock()
            .conversations
            .iter()
            .filter(|c| c.has_participant(user_id))
            .cloned()
            .collect();
        conversations.sort_by(|a, b| b.updated_at.cmp(&a.updated_at));
        Ok(conversations)
    }

    async fn add_message(
        &self,
        conversation_id: Uuid,
        sender_id: Uuid,
        text: String,
    ) -> AppResult<Message> {
        let mut tables = self.lock();
        let message = Message {
            id: Uuid::new_v4(),
            conversation_id,
            sender_id,
            text,
            read_by: vec![sender_id],
            created_at: Utc::now(),
        };
        let conversation = tables
            .conversations
            .iter_mut()
            .find(|c| c.id == conversation_id)
            .ok_or(AppError::NotFound)?;
        conversation.last_message = Some(LastMessage {
            text: message.text.clone(),
            sender_id,
            sent_at: message.created_at,
        });
        conversation.updated_at = message.created_at;
        tables.messages.push(message.clone());
        Ok(message)
    }

    async fn list_messages(&self, conversation_id: Uuid) -> AppResult<Vec<Message>> {
        Ok(self
            .lock()
            .messages
            .iter()
            .filter(|m| m.conversation_id == conversation_id)
            .cloned()
            .collect())
    }

    async fn mark_read(&self, conversation_id: Uuid, user_id: Uuid) -> AppResult<u64> {
        let mut changed = 0;
        for message in self
            .lock()
            .messages
            .iter_mut()
            .filter(|m| m.conversation_id == conversation_id)
        {
            if !message.read_by.contains(&user_id) {
                message.read_by.push(user_id);
                changed += 1;
            }
        }
        Ok(changed)
    }
}

#[async_trait]
impl PaymentRepository for MemoryDb {
    async fn create_order(&self, order: NewPaymentOrder) -> AppResult<PaymentOrder> {
        let stored = PaymentOrder {
            id: Uuid::new_v4(),
            order_id: order.order_id,
            user_id: order.user_id,
            course_id: order.course_id,
            amount: order.amount,
            currency: order.currency,
            status: OrderStatus::Created,
            payment_id: None,
            created_at: Utc::now(),
            updated_at: Utc::now(),
        };
        self.lock().orders.push(stored.clone());
        Ok(stored)
    }

    async fn find_by_order_id(&self, order_id: &str) -> AppResult<Option<PaymentOrder>> {
        Ok(self
            .lock()
            .orders
            .iter()
            .find(|o| o.order_id == order_id)
            .cloned())
    }

    async fn mark_paid(&self, order_id: &str, payment_id: String) -> AppResult<PaymentOrder> {
        let mut tables = self.lock();
        let order = tables
            .orders
            .iter_mut()
            .find(|o| o.order_id == order_id)
            .ok_or(AppError::NotFound)?;
        order.status = OrderStatus::Paid;
        order.payment_id = Some(payment_id);
        Ok(order.clone())
    }
}

/// Vendor mocks, each configured by the test that needs it
pub struct Vendors {
    pub payments: MockPaymentGateway,
    pub media: MockMediaHost,
    pub renderer: MockCertificateRenderer,
    pub summarizer: MockSummarizer,
}

impl Default for Vendors {
    fn default() -> Self {
        Self {
            payments: MockPaymentGateway::new(),
            media: MockMediaHost::new(),
            renderer: MockCertificateRenderer::new(),
            summarizer: MockSummarizer::new(),
        }
    }
}

impl Vendors {
    pub fn into_collaborators(self) -> Collaborators {
        Collaborators {
            payments: Arc::new(self.payments),
            media: Arc::new(self.media),
            renderer: Arc::new(self.renderer),
            summarizer: Arc::new(self.summarizer),
        }
    }
}

/// Fully wired services over a fresh in-memory database
pub struct TestApp {
    pub uow: MemoryUnitOfWork,
    pub services: Services,
    pub presence: PresenceRegistry,
}

impl TestApp {
    pub fn new() -> Self {
        Self::with_vendors(Vendors::default())
    }

    pub fn with_vendors(vendors: Vendors) -> Self {
        Self::build(Config::for_secret(TEST_SECRET), vendors)
    }

    pub fn build(config: Config, vendors: Vendors) -> Self {
        let uow = MemoryUnitOfWork::default();
        let presence = PresenceRegistry::new();
        let services = Services::new(
            Arc::new(uow.clone()),
            config,
            presence.clone(),
            vendors.into_collaborators(),
        );
        Self {
            uow,
            services,
            presence,
        }
    }

    pub fn db(&self) -> &MemoryDb {
        &self.uow.db
    }

    pub async fn user(&self, name: &str, role: UserRole) -> User {
        UserRepository::create(
            self.db(),
            NewUser {
                name: name.to_string(),
                email: format!("{}@example.com", name.to_lowercase()),
                password_hash: None,
                role,
            },
        )
        .await
        .unwrap()
    }

    /// Published course owned by `instructor` with `lessons` lessons
    pub async fn published_course(
        &self,
        instructor: &User,
        price: i64,
        lessons: usize,
    ) -> (Course, Vec<Lesson>) {
        let course = CourseRepository::create(
            self.db(),
            NewCourse {
                instructor_id: instructor.id,
                title: "Rust for Backend Engineers".to_string(),
                description: "Ship services in Rust".to_string(),
                price,
            },
        )
        .await
        .unwrap();
        let course = CourseRepository::set_status(self.db(), course.id, CourseStatus::Published)
            .await
            .unwrap();

        let mut created = Vec::with_capacity(lessons);
        for index in 0..lessons {
            let lesson = LessonRepository::create(
                self.db(),
                NewLesson {
                    course_id: course.id,
                    title: format!("Lesson {}", index + 1),
                    order_index: index as i32,
                    duration_minutes: 10,
                    is_preview: index == 0,
                    content: format!("Body of lesson {}", index + 1),
                    video_url: None,
                    resources: vec![],
                },
            )
            .await
            .unwrap();
            created.push(lesson);
        }
        (course, created)
    }

    pub async fn enroll(&self, student: &User, course: &Course) -> Enrollment {
        EnrollmentRepository::ensure(self.db(), student.id, course.id)
            .await
            .unwrap()
    }
}
