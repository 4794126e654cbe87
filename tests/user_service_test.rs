//! User and auth service unit tests.

use std::sync::Arc;

use chrono::Utc;
use mockall::predicate::{always, eq, function};
use tokio_test::{assert_err, assert_ok};
use uuid::Uuid;

use course_market::config::Config;
use course_market::domain::{Password, User, UserRole};
use course_market::errors::AppError;
use course_market::infra::repositories::{
    MockAssessmentRepository, MockCertificateRepository, MockConversationRepository,
    MockCourseRepository, MockEnrollmentRepository, MockLessonRepository, MockPaymentRepository,
    MockQuizRepository, MockReviewRepository, MockUserRepository,
};
use course_market::infra::{
    AssessmentRepository, CertificateRepository, ConversationRepository, CourseRepository,
    EnrollmentRepository, LessonRepository, PaymentRepository, QuizRepository, ReviewRepository,
    UnitOfWork, UserRepository,
};
use course_market::services::{AuthService, Authenticator, UserManager, UserService};

const SECRET: &str = "test-secret-key-for-testing-only-32chars";

fn create_test_user(id: Uuid, password_hash: Option<String>) -> User {
    User {
        id,
        name: "Test User".to_string(),
        email: "test@example.com".to_string(),
        password_hash,
        role: UserRole::Student,
        profile_image_url: None,
        created_at: Utc::now(),
        updated_at: Utc::now(),
    }
}

/// Test mock for UnitOfWork that wraps a MockUserRepository
struct TestUnitOfWork {
    user_repo: Arc<MockUserRepository>,
}

impl TestUnitOfWork {
    fn new(user_repo: MockUserRepository) -> Self {
        Self {
            user_repo: Arc::new(user_repo),
        }
    }
}

// Only the user repository is configured; any other call fails the test.
impl UnitOfWork for TestUnitOfWork {
    fn users(&self) -> Arc<dyn UserRepository> {
        self.user_repo.clone()
    }

    fn courses(&self) -> Arc<dyn CourseRepository> {
        Arc::new(MockCourseRepository::new())
    }

    fn lessons(&self) -> Arc<dyn LessonRepository> {
        Arc::new(MockLessonRepository::new())
    }

    fn enrollments(&self) -> Arc<dyn EnrollmentRepository> {
        Arc::new(MockEnrollmentRepository::new())
    }

    fn assessments(&self) -> Arc<dyn AssessmentRepository> {
        Arc::new(MockAssessmentRepository::new())
    }

    fn certificates(&self) -> Arc<dyn CertificateRepository> {
        Arc::new(MockCertificateRepository::new())
    }

    fn quizzes(&self) -> Arc<dyn QuizRepository> {
        Arc::new(MockQuizRepository::new())
    }

    fn reviews(&self) -> Arc<dyn ReviewRepository> {
        Arc::new(MockReviewRepository::new())
    }

    fn conversations(&self) -> Arc<dyn ConversationRepository> {
        Arc::new(MockConversationRepository::new())
    }

    fn payments(&self) -> Arc<dyn PaymentRepository> {
        Arc::new(MockPaymentRepository::new())
    }
}

fn auth_service(repo: MockUserRepository) -> Authenticator<TestUnitOfWork> {
    Authenticator::new(
        Arc::new(TestUnitOfWork::new(repo)),
        Config::for_secret(SECRET),
    )
}

#[tokio::test]
async fn test_get_user_success() {
    let user_id = Uuid::new_v4();

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .with(eq(user_id))
        .returning(|id| Ok(Some(create_test_user(id, None))));

    let service = UserManager::new(Arc::new(TestUnitOfWork::new(repo)));
    let user = assert_ok!(service.get_user(user_id).await);

    assert_eq!(user.id, user_id);
}

#[tokio::test]
async fn test_get_user_not_found() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id().returning(|_| Ok(None));

    let service = UserManager::new(Arc::new(TestUnitOfWork::new(repo)));
    let err = assert_err!(service.get_user(Uuid::new_v4()).await);

    assert!(matches!(err, AppError::NotFound));
}

#[tokio::test]
async fn test_update_profile_trims_name() {
    let user_id = Uuid::new_v4();

    let mut repo = MockUserRepository::new();
    repo.expect_update_profile()
        .with(eq(user_id), eq(Some("Ada".to_string())), eq(None::<String>))
        .times(1)
        .returning(|id, name, _| {
            let mut user = create_test_user(id, None);
            user.name = name.unwrap_or_default();
            Ok(user)
        });

    let service = UserManager::new(Arc::new(TestUnitOfWork::new(repo)));
    let user = service
        .update_profile(user_id, Some("  Ada ".to_string()), None)
        .await
        .unwrap();

    assert_eq!(user.name, "Ada");
}

#[tokio::test]
async fn test_update_profile_rejects_blank_name() {
    let mut repo = MockUserRepository::new();
    repo.expect_update_profile().never();

    let service = UserManager::new(Arc::new(TestUnitOfWork::new(repo)));
    let err = service
        .update_profile(Uuid::new_v4(), Some("   ".to_string()), None)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_change_password_requires_current_password() {
    let hash = Password::new("correct-horse").unwrap().into_string();

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .returning(move |id| Ok(Some(create_test_user(id, Some(hash.clone())))));
    repo.expect_update_password().never();

    let service = UserManager::new(Arc::new(TestUnitOfWork::new(repo)));
    let err = service
        .change_password(
            Uuid::new_v4(),
            "wrong-password".to_string(),
            "new-password-123".to_string(),
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidCredentials));
}

#[tokio::test]
async fn test_change_password_stores_new_hash() {
    let hash = Password::new("correct-horse").unwrap().into_string();

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_id()
        .returning(move |id| Ok(Some(create_test_user(id, Some(hash.clone())))));
    repo.expect_update_password()
        .with(
            always(),
            function(|hash: &String| Password::from_hash(hash.clone()).verify("battery-staple")),
        )
        .times(1)
        .returning(|_, _| Ok(()));

    let service = UserManager::new(Arc::new(TestUnitOfWork::new(repo)));
    let result = service
        .change_password(
            Uuid::new_v4(),
            "correct-horse".to_string(),
            "battery-staple".to_string(),
        )
        .await;

    assert_ok!(result);
}

#[tokio::test]
async fn test_register_normalizes_email_and_hashes_password() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email().times(1).returning(|email| {
        assert_eq!(email, "ada@example.com");
        Ok(None)
    });
    repo.expect_create().times(1).returning(|new_user| {
        assert_eq!(new_user.email, "ada@example.com");
        assert!(new_user.password_hash.is_some());
        let mut user = create_test_user(Uuid::new_v4(), new_user.password_hash);
        user.email = new_user.email;
        user.role = new_user.role;
        Ok(user)
    });

    let user = auth_service(repo)
        .register(
            "Ada".to_string(),
            "  Ada@Example.COM ".to_string(),
            "password123".to_string(),
            UserRole::Instructor,
        )
        .await
        .unwrap();

    assert_eq!(user.role, UserRole::Instructor);
}

#[tokio::test]
async fn test_register_duplicate_email_conflicts() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .returning(|_| Ok(Some(create_test_user(Uuid::new_v4(), None))));
    repo.expect_create().never();

    let err = auth_service(repo)
        .register(
            "Ada".to_string(),
            "test@example.com".to_string(),
            "password123".to_string(),
            UserRole::Student,
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Conflict(_)));
}

#[tokio::test]
async fn test_login_issues_verifiable_token() {
    let user_id = Uuid::new_v4();
    let hash = Password::new("password123").unwrap().into_string();

    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .returning(move |_| Ok(Some(create_test_user(user_id, Some(hash.clone())))));

    let service = auth_service(repo);
    let token = service
        .login("test@example.com".to_string(), "password123".to_string())
        .await
        .unwrap();
    let claims = service.verify_token(&token.access_token).unwrap();

    assert_eq!(claims.sub, user_id);
    assert_eq!(claims.role(), UserRole::Student);
}

#[tokio::test]
async fn test_login_rejects_federated_account_without_password() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email()
        .returning(|_| Ok(Some(create_test_user(Uuid::new_v4(), None))));

    let err = auth_service(repo)
        .login("test@example.com".to_string(), "anything".to_string())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidCredentials));
}

#[tokio::test]
async fn test_login_unknown_email_is_invalid_credentials() {
    let mut repo = MockUserRepository::new();
    repo.expect_find_by_email().returning(|_| Ok(None));

    let err = auth_service(repo)
        .login("nobody@example.com".to_string(), "password123".to_string())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::InvalidCredentials));
}
