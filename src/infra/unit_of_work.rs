//! Unit of Work pattern implementation.
//!
//! Centralizes access to every repository so services depend on one
//! injectable handle. Atomicity of the workflow's read-then-write steps is
//! pushed down into the repositories as single upserts, so no
//! cross-repository transaction is exposed here.

use std::sync::Arc;

use sea_orm::DatabaseConnection;

use super::repositories::{
    AssessmentRepository, AssessmentStore, CertificateRepository, CertificateStore,
    ConversationRepository, ConversationStore, CourseRepository, CourseStore,
    EnrollmentRepository, EnrollmentStore, LessonRepository, LessonStore, PaymentRepository,
    PaymentStore, QuizRepository, QuizStore, ReviewRepository, ReviewStore, UserRepository,
    UserStore,
};

/// Unit of Work trait for dependency injection.
///
/// Tests implement it over mock or in-memory repositories.
pub trait UnitOfWork: Send + Sync {
    fn users(&self) -> Arc<dyn UserRepository>;

    fn courses(&self) -> Arc<dyn CourseRepository>;

    fn lessons(&self) -> Arc<dyn LessonRepository>;

    fn enrollments(&self) -> Arc<dyn EnrollmentRepository>;

    fn assessments(&self) -> Arc<dyn AssessmentRepository>;

    fn certificates(&self) -> Arc<dyn CertificateRepository>;

    fn quizzes(&self) -> Arc<dyn QuizRepository>;

    fn reviews(&self) -> Arc<dyn ReviewRepository>;

    fn conversations(&self) -> Arc<dyn ConversationRepository>;

    fn payments(&self) -> Arc<dyn PaymentRepository>;
}

/// Concrete implementation of UnitOfWork over PostgreSQL
pub struct Persistence {
    users: Arc<UserStore>,
    courses: Arc<CourseStore>,
    lessons: Arc<LessonStore>,
    enrollments: Arc<EnrollmentStore>,
    assessments: Arc<AssessmentStore>,
    certificates: Arc<CertificateStore>,
    quizzes: Arc<QuizStore>,
    reviews: Arc<ReviewStore>,
    conversations: Arc<ConversationStore>,
    payments: Arc<PaymentStore>,
}

impl Persistence {
    /// Create new UnitOfWork instance
    pub fn new(db: DatabaseConnection) -> Self {
        Self {
            users: Arc::new(UserStore::new(db.clone())),
            courses: Arc::new(CourseStore::new(db.clone())),
            lessons: Arc::new(LessonStore::new(db.clone())),
            enrollments: Arc::new(EnrollmentStore::new(db.clone())),
            assessments: Arc::new(AssessmentStore::new(db.clone())),
            certificates: Arc::new(CertificateStore::new(db.clone())),
            quizzes: Arc::new(QuizStore::new(db.clone())),
            reviews: Arc::new(ReviewStore::new(db.clone())),
            conversations: Arc::new(ConversationStore::new(db.clone())),
            payments: Arc::new(PaymentStore::new(db)),
        }
    }
}

impl UnitOfWork for Persistence {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.users.clone()
    }

    fn courses(&self) -> Arc<dyn CourseRepository> {
        self.courses.clone()
    }

    fn lessons(&self) -> Arc<dyn LessonRepository> {
        self.lessons.clone()
    }

    fn enrollments(&self) -> Arc<dyn EnrollmentRepository> {
        self.enrollments.clone()
    }

    fn assessments(&self) -> Arc<dyn AssessmentRepository> {
        self.assessments.clone()
    }

    fn certificates(&self) -> Arc<dyn CertificateRepository> {
        self.certificates.clone()
    }

    fn quizzes(&self) -> Arc<dyn QuizRepository> {
        self.quizzes.clone()
    }

    fn reviews(&self) -> Arc<dyn ReviewRepository> {
        self.reviews.clone()
    }

    fn conversations(&self) -> Arc<dyn ConversationRepository> {
        self.conversations.clone()
    }

    fn payments(&self) -> Arc<dyn PaymentRepository> {
        self.payments.clone()
    }
}
