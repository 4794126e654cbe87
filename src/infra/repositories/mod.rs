//! Repository layer - Data access abstraction
//!
//! Repositories provide an abstraction over data persistence,
//! following the Repository pattern for clean separation of concerns.

mod assessment_repository;
mod certificate_repository;
mod conversation_repository;
mod course_repository;
mod enrollment_repository;
pub(crate) mod entities;
mod payment_repository;
mod quiz_repository;
mod review_repository;
mod user_repository;

pub use assessment_repository::{AssessmentRepository, AssessmentStore};
pub use certificate_repository::{CertificateRepository, CertificateStore};
pub use conversation_repository::{ConversationRepository, ConversationStore};
pub use course_repository::{CourseRepository, CourseStore, LessonRepository, LessonStore};
pub use enrollment_repository::{EnrollmentRepository, EnrollmentStore};
pub use payment_repository::{PaymentRepository, PaymentStore};
pub use quiz_repository::{QuizRepository, QuizStore};
pub use review_repository::{ReviewRepository, ReviewStore};
pub use user_repository::{UserRepository, UserStore};

// Export mocks for tests (both unit and integration)
#[cfg(any(test, feature = "test-utils"))]
pub use assessment_repository::MockAssessmentRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use certificate_repository::MockCertificateRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use conversation_repository::MockConversationRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use course_repository::{MockCourseRepository, MockLessonRepository};
#[cfg(any(test, feature = "test-utils"))]
pub use enrollment_repository::MockEnrollmentRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use payment_repository::MockPaymentRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use quiz_repository::MockQuizRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use review_repository::MockReviewRepository;
#[cfg(any(test, feature = "test-utils"))]
pub use user_repository::MockUserRepository;
