//! Infrastructure layer - External systems integration
//!
//! This module handles all external system concerns:
//! - Database connections, migrations and repositories
//! - Caching and rate limiting (Redis)
//! - The in-process presence registry for websocket delivery
//! - Interfaces to third-party vendors
//! - Unit of Work for repository access

pub mod cache;
pub mod db;
pub mod external;
pub mod presence;
pub mod repositories;
pub mod unit_of_work;

pub use cache::Cache;
pub use db::{Database, Migrator};
pub use external::{CertificateRenderer, MediaHost, PaymentGateway, Summarizer};
pub use presence::{PresenceRegistry, RealtimeEvent};
pub use repositories::{
    AssessmentRepository, CertificateRepository, ConversationRepository, CourseRepository,
    EnrollmentRepository, LessonRepository, PaymentRepository, QuizRepository, ReviewRepository,
    UserRepository,
};
pub use unit_of_work::{Persistence, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
pub use repositories::{
    MockAssessmentRepository, MockCertificateRepository, MockConversationRepository,
    MockCourseRepository, MockEnrollmentRepository, MockLessonRepository, MockPaymentRepository,
    MockQuizRepository, MockReviewRepository, MockUserRepository,
};
