//! Application services layer - Use cases and business logic.
//!
//! Services orchestrate domain rules and repositories to fulfill the
//! marketplace's use cases. Each area is an async trait plus one concrete
//! implementation generic over the Unit of Work, so tests can swap storage.

mod access;
mod assessment_service;
mod auth_service;
mod catalog_service;
mod certificate_service;
pub mod container;
mod enrollment_service;
mod messaging_service;
mod payment_service;
mod quiz_service;
mod review_service;
mod user_service;

// Service Container
pub use container::{Collaborators, ServiceContainer, Services};

// Service traits and implementations
pub use assessment_service::{AssessmentEngine, AssessmentService};
pub use auth_service::{AuthService, Authenticator, Claims, TokenResponse};
pub use catalog_service::{CatalogManager, CatalogService};
pub use certificate_service::{CertificateIssuer, CertificateService};
pub use enrollment_service::{EnrollmentService, EnrollmentTracker};
pub use messaging_service::{MessagingRelay, MessagingService};
pub use payment_service::{PaymentProcessor, PaymentService};
pub use quiz_service::{QuizEngine, QuizService};
pub use review_service::{ReviewBoard, ReviewService};
pub use user_service::{UserManager, UserService};

// Parallel execution utilities
pub use container::parallel;

#[cfg(any(test, feature = "test-utils"))]
pub use container::MockServiceContainer;
