//! OpenAPI documentation configuration.
//!
//! Provides Swagger UI for API exploration and testing.

use utoipa::openapi::security::{HttpAuthScheme, HttpBuilder, SecurityScheme};
use utoipa::{Modify, OpenApi};

use crate::api::handlers::{
    assessment_handler, auth_handler, certificate_handler, course_handler, enrollment_handler,
    lesson_handler, media_handler, messaging_handler, payment_handler, quiz_handler, user_handler,
};
use crate::domain::assessment::{
    AssessmentDashboardRow, AssessmentResponse, AttemptResponse, MediaKind, QuestionResponse,
    StudentQuestion, SubmissionResult, TakeAssessmentResponse,
};
use crate::domain::course::{CourseResponse, LessonResponse};
use crate::domain::enrollment::EnrollmentResponse;
use crate::domain::messaging::{ConversationResponse, LastMessage, MessageResponse};
use crate::domain::payment::OrderResponse;
use crate::domain::quiz::{
    QuestionOutcome, QuizQuestionResponse, QuizResponse, QuizResult, StudentQuizQuestion,
    TakeQuizResponse,
};
use crate::domain::review::ReviewResponse;
use crate::domain::{
    AssessmentStatus, CertificateVerification, CertificateView, CourseStatus, LessonResource,
    OrderStatus, ProgressResponse, QuestionType, QuizAnswer, SubmittedAnswer, UserResponse,
    UserRole,
};
use crate::infra::external::UploadedMedia;
use crate::services::TokenResponse;
use crate::types::{CoursePage, Notice, PaginationMeta};

/// OpenAPI documentation for the course marketplace
#[derive(OpenApi)]
#[openapi(
    info(
        title = "Course Market API",
        version = "0.1.0",
        description = "Online course marketplace: catalog, enrollment progress, assessments, certificates and messaging",
        license(name = "MIT", url = "https://opensource.org/licenses/MIT")
    ),
    servers(
        (url = "http://localhost:3000", description = "Local development server")
    ),
    paths(
        // Authentication
        auth_handler::register,
        auth_handler::login,
        auth_handler::logout,
        // Users
        user_handler::get_me,
        user_handler::update_me,
        user_handler::change_password,
        // Courses
        course_handler::list_courses,
        course_handler::create_course,
        course_handler::my_courses,
        course_handler::get_course,
        course_handler::update_course,
        course_handler::delete_course,
        course_handler::publish_course,
        course_handler::unpublish_course,
        // Lessons
        course_handler::list_lessons,
        course_handler::create_lesson,
        lesson_handler::get_lesson,
        lesson_handler::update_lesson,
        lesson_handler::delete_lesson,
        lesson_handler::summarize_lesson,
        // Reviews
        course_handler::list_reviews,
        course_handler::add_review,
        // Enrollments and payments
        enrollment_handler::enroll_free,
        enrollment_handler::my_enrollments,
        enrollment_handler::get_progress,
        enrollment_handler::complete_lesson,
        payment_handler::create_order,
        payment_handler::verify_payment,
        // Assessments
        assessment_handler::get_or_create_assessment,
        assessment_handler::update_assessment,
        assessment_handler::add_question,
        assessment_handler::delete_question,
        assessment_handler::take_assessment,
        assessment_handler::submit_assessment,
        assessment_handler::my_assessments,
        assessment_handler::list_attempts,
        // Certificates
        certificate_handler::my_certificates,
        certificate_handler::get_certificate,
        certificate_handler::verify_certificate,
        certificate_handler::certificate_pdf,
        // Quizzes
        lesson_handler::get_or_create_quiz,
        quiz_handler::add_question,
        quiz_handler::take_quiz,
        quiz_handler::submit_quiz,
        // Messaging
        messaging_handler::start_direct,
        messaging_handler::broadcast,
        messaging_handler::list_conversations,
        messaging_handler::list_messages,
        messaging_handler::send_message,
        messaging_handler::mark_read,
        messaging_handler::online_users,
        // Media
        media_handler::upload_media,
    ),
    components(
        schemas(
            // Shared envelopes
            Notice,
            CoursePage,
            PaginationMeta,
            // Users and auth
            UserRole,
            UserResponse,
            TokenResponse,
            auth_handler::RegisterRequest,
            auth_handler::LoginRequest,
            user_handler::UpdateProfileRequest,
            user_handler::ChangePasswordRequest,
            // Catalog
            CourseStatus,
            CourseResponse,
            LessonResource,
            LessonResponse,
            ReviewResponse,
            course_handler::CreateCourseRequest,
            course_handler::UpdateCourseRequest,
            course_handler::CreateLessonRequest,
            course_handler::ReviewRequest,
            lesson_handler::UpdateLessonRequest,
            lesson_handler::LessonSummary,
            UploadedMedia,
            // Enrollment and payments
            ProgressResponse,
            EnrollmentResponse,
            OrderStatus,
            OrderResponse,
            payment_handler::CreateOrderRequest,
            payment_handler::VerifyPaymentRequest,
            // Assessments and certificates
            QuestionType,
            MediaKind,
            AssessmentStatus,
            AssessmentResponse,
            QuestionResponse,
            StudentQuestion,
            TakeAssessmentResponse,
            SubmittedAnswer,
            SubmissionResult,
            AttemptResponse,
            AssessmentDashboardRow,
            assessment_handler::UpdateAssessmentRequest,
            assessment_handler::AddQuestionRequest,
            assessment_handler::SubmitAssessmentRequest,
            CertificateView,
            CertificateVerification,
            // Quizzes
            QuizResponse,
            QuizQuestionResponse,
            StudentQuizQuestion,
            TakeQuizResponse,
            QuizAnswer,
            QuizResult,
            QuestionOutcome,
            quiz_handler::AddQuizQuestionRequest,
            quiz_handler::SubmitQuizRequest,
            // Messaging
            LastMessage,
            ConversationResponse,
            MessageResponse,
            messaging_handler::DirectConversationRequest,
            messaging_handler::BroadcastRequest,
            messaging_handler::SendMessageRequest,
            messaging_handler::BroadcastResponse,
            messaging_handler::ReadReceipt,
            messaging_handler::OnlineUsers,
        )
    ),
    modifiers(&SecurityAddon),
    tags(
        (name = "Authentication", description = "Registration, login and session cookie"),
        (name = "Users", description = "Profile of the signed-in user"),
        (name = "Courses", description = "Course catalog and authoring"),
        (name = "Lessons", description = "Curriculum and lesson content"),
        (name = "Reviews", description = "Course ratings"),
        (name = "Enrollments", description = "Enrollment and lesson progress"),
        (name = "Payments", description = "Paid enrollment through the gateway"),
        (name = "Assessments", description = "Final course assessments"),
        (name = "Certificates", description = "Completion certificates and public verification"),
        (name = "Quizzes", description = "Per-lesson practice quizzes"),
        (name = "Messaging", description = "Conversations and presence"),
        (name = "Media", description = "Hosted media uploads")
    )
)]
pub struct ApiDoc;

/// Security scheme modifier for JWT Bearer authentication
struct SecurityAddon;

impl Modify for SecurityAddon {
    fn modify(&self, openapi: &mut utoipa::openapi::OpenApi) {
        if let Some(components) = openapi.components.as_mut() {
            components.add_security_scheme(
                "bearer_auth",
                SecurityScheme::Http(
                    HttpBuilder::new()
                        .scheme(HttpAuthScheme::Bearer)
                        .bearer_format("JWT")
                        .description(Some("JWT from /auth/login, or the `token` cookie"))
                        .build(),
                ),
            );
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_document_lists_core_workflow_paths() {
        let doc = ApiDoc::openapi();
        for path in [
            "/assessments/{assessment_id}/submit",
            "/assessments/my-assessments",
            "/enrollments/{course_id}/lessons/{lesson_id}/complete",
            "/certificates/verify/{certificate_id}",
        ] {
            assert!(doc.paths.paths.contains_key(path), "missing {}", path);
        }
    }
}
