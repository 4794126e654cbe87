//! Domain layer - Core business entities and rules
//!
//! Entities, value objects and the pure workflow rules (progress, grading,
//! derived assessment status). Nothing in here touches storage or HTTP.

pub mod assessment;
pub mod certificate;
pub mod course;
pub mod enrollment;
pub mod messaging;
pub mod password;
pub mod payment;
pub mod quiz;
pub mod review;
pub mod user;

pub use assessment::{
    Assessment, AssessmentAttempt, AssessmentQuestion, AssessmentStatus, QuestionDraft,
    QuestionType, SubmittedAnswer,
};
pub use certificate::{Certificate, CertificateVerification, CertificateView};
pub use course::{Course, CourseStatus, Lesson, LessonResource};
pub use enrollment::{Enrollment, ProgressResponse};
pub use messaging::{Conversation, Message};
pub use password::Password;
pub use payment::{OrderStatus, PaymentOrder};
pub use quiz::{Quiz, QuizAnswer, QuizQuestion};
pub use review::Review;
pub use user::{NewUser, User, UserResponse, UserRole};
