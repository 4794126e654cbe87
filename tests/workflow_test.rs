//! End-to-end service workflows over the in-memory Unit of Work.
//!
//! Run with: cargo test --test workflow_test

mod common;

use common::{TestApp, Vendors};
use course_market::domain::assessment::AssessmentQuestion;
use course_market::domain::course::NewLesson;
use course_market::domain::quiz::QuizQuestionDraft;
use course_market::domain::{
    AssessmentStatus, Course, Lesson, OrderStatus, QuestionDraft, QuestionType, QuizAnswer,
    SubmittedAnswer, User, UserRole,
};
use course_market::errors::AppError;
use course_market::infra::external::GatewayOrder;
use course_market::infra::{CertificateRepository, RealtimeEvent};
use course_market::services::ServiceContainer;
use course_market::Config;
use uuid::Uuid;

fn fill_in(text: &str, answer: &str) -> QuestionDraft {
    QuestionDraft {
        text: text.to_string(),
        media_url: None,
        media_kind: None,
        question_type: QuestionType::FillInTheBlank,
        options: vec![],
        correct_answer: answer.to_string(),
    }
}

/// Course with four lessons and a four-question assessment
struct Classroom {
    app: TestApp,
    instructor: User,
    student: User,
    course: Course,
    lessons: Vec<Lesson>,
    assessment_id: Uuid,
    questions: Vec<AssessmentQuestion>,
}

impl Classroom {
    async fn new() -> Self {
        let app = TestApp::new();
        let instructor = app.user("Grace", UserRole::Instructor).await;
        let student = app.user("Linus", UserRole::Student).await;
        let (course, lessons) = app.published_course(&instructor, 0, 4).await;

        let assessments = app.services.assessments();
        let assessment = assessments
            .get_or_create(instructor.id, course.id)
            .await
            .unwrap();
        let mut questions = Vec::new();
        for (text, answer) in [
            ("Ownership moves on ___", "assignment"),
            ("Borrow checker runs at ___ time", "compile"),
            ("Shared reference symbol", "&"),
            ("Keyword for a trait object", "dyn"),
        ] {
            questions.push(
                assessments
                    .add_question(instructor.id, assessment.id, fill_in(text, answer))
                    .await
                    .unwrap(),
            );
        }

        Self {
            app,
            instructor,
            student,
            course,
            lessons,
            assessment_id: assessment.id,
            questions,
        }
    }

    async fn complete_lessons(&self, count: usize) -> i32 {
        let enrollments = self.app.services.enrollments();
        let mut progress = 0;
        for lesson in self.lessons.iter().take(count) {
            progress = enrollments
                .mark_lesson_complete(self.student.id, self.course.id, lesson.id)
                .await
                .unwrap()
                .progress;
        }
        progress
    }

    /// Answers with the first `correct` questions right and the rest wrong
    fn answers(&self, correct: usize) -> Vec<SubmittedAnswer> {
        self.questions
            .iter()
            .enumerate()
            .map(|(index, question)| SubmittedAnswer {
                question_id: question.id,
                answer: if index < correct {
                    question.correct_answer.to_uppercase()
                } else {
                    "wrong".to_string()
                },
            })
            .collect()
    }

    async fn status(&self) -> AssessmentStatus {
        let rows = self
            .app
            .services
            .assessments()
            .dashboard(self.student.id)
            .await
            .unwrap();
        rows.into_iter()
            .find(|row| row.assessment_id == self.assessment_id)
            .map(|row| row.status)
            .unwrap()
    }
}

#[tokio::test]
async fn test_half_the_lessons_keeps_assessment_locked() {
    let class = Classroom::new().await;

    let progress = class.complete_lessons(2).await;

    assert_eq!(progress, 50);
    assert_eq!(class.status().await, AssessmentStatus::Locked);
    let err = class
        .app
        .services
        .assessments()
        .submit(class.student.id, class.assessment_id, class.answers(4))
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Forbidden(_)));
    assert_eq!(class.app.db().attempt_count(), 0);
}

#[tokio::test]
async fn test_all_lessons_unlock_assessment() {
    let class = Classroom::new().await;

    let progress = class.complete_lessons(4).await;

    assert_eq!(progress, 100);
    assert_eq!(
        class.app.db().stored_progress(class.student.id, class.course.id),
        Some(100)
    );
    assert_eq!(class.status().await, AssessmentStatus::NotStarted);
}

#[tokio::test]
async fn test_completing_lesson_twice_is_idempotent() {
    let class = Classroom::new().await;
    let enrollments = class.app.services.enrollments();
    let lesson = class.lessons[0].id;

    enrollments
        .mark_lesson_complete(class.student.id, class.course.id, lesson)
        .await
        .unwrap();
    let again = enrollments
        .mark_lesson_complete(class.student.id, class.course.id, lesson)
        .await
        .unwrap();

    assert_eq!(again.completed_lessons, vec![lesson]);
    assert_eq!(again.progress, 25);
}

#[tokio::test]
async fn test_lesson_from_another_course_is_rejected() {
    let class = Classroom::new().await;
    let (_, other_lessons) = class
        .app
        .published_course(&class.instructor, 0, 1)
        .await;

    let err = class
        .app
        .services
        .enrollments()
        .mark_lesson_complete(class.student.id, class.course.id, other_lessons[0].id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_progress_without_enrollment_is_zero() {
    let class = Classroom::new().await;

    let progress = class
        .app
        .services
        .enrollments()
        .get_progress(class.student.id, class.course.id)
        .await
        .unwrap();

    assert_eq!(progress.progress, 0);
    assert!(progress.completed_lessons.is_empty());
}

#[tokio::test]
async fn test_paid_course_needs_enrollment_before_progress() {
    let app = TestApp::new();
    let instructor = app.user("Grace", UserRole::Instructor).await;
    let student = app.user("Linus", UserRole::Student).await;
    let (course, lessons) = app.published_course(&instructor, 49_900, 2).await;

    let err = app
        .services
        .enrollments()
        .mark_lesson_complete(student.id, course.id, lessons[0].id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_passing_submission_issues_certificate() {
    let class = Classroom::new().await;
    class.complete_lessons(4).await;

    let result = class
        .app
        .services
        .assessments()
        .submit(class.student.id, class.assessment_id, class.answers(3))
        .await
        .unwrap();

    assert_eq!(result.correct_count, 3);
    assert_eq!(result.total_questions, 4);
    assert_eq!(result.score, 75.0);
    assert!(result.passed);
    let certificate_id = result.certificate_id.expect("certificate issued");
    assert!(certificate_id.starts_with("CERT-"));
    assert_eq!(class.status().await, AssessmentStatus::Completed);

    let rows = class
        .app
        .services
        .assessments()
        .dashboard(class.student.id)
        .await
        .unwrap();
    assert_eq!(rows[0].certificate_id.as_deref(), Some(certificate_id.as_str()));
    assert_eq!(rows[0].best_score, Some(75.0));
}

#[tokio::test]
async fn test_failed_then_passed_keeps_every_attempt() {
    let class = Classroom::new().await;
    class.complete_lessons(4).await;
    let assessments = class.app.services.assessments();

    let first = assessments
        .submit(class.student.id, class.assessment_id, class.answers(2))
        .await
        .unwrap();
    assert!(!first.passed);
    assert!(first.certificate_id.is_none());
    assert_eq!(class.status().await, AssessmentStatus::Failed);

    let second = assessments
        .submit(class.student.id, class.assessment_id, class.answers(4))
        .await
        .unwrap();
    assert!(second.passed);
    assert_ne!(first.attempt_id, second.attempt_id);

    let attempts = assessments
        .list_attempts(class.student.id, class.assessment_id)
        .await
        .unwrap();
    assert_eq!(attempts.len(), 2);
    assert_eq!(class.status().await, AssessmentStatus::Completed);
}

#[tokio::test]
async fn test_passing_again_reuses_certificate() {
    let class = Classroom::new().await;
    class.complete_lessons(4).await;
    let assessments = class.app.services.assessments();

    let first = assessments
        .submit(class.student.id, class.assessment_id, class.answers(4))
        .await
        .unwrap();
    let second = assessments
        .submit(class.student.id, class.assessment_id, class.answers(3))
        .await
        .unwrap();

    assert_eq!(first.certificate_id, second.certificate_id);
    assert_eq!(class.app.db().certificate_count(), 1);
}

#[tokio::test]
async fn test_concurrent_issuance_yields_one_certificate() {
    let class = Classroom::new().await;
    class.complete_lessons(4).await;
    class
        .app
        .services
        .assessments()
        .submit(class.student.id, class.assessment_id, class.answers(4))
        .await
        .unwrap();

    let certificates = class.app.services.certificates();
    let issued = futures::future::join_all(
        (0..8).map(|_| certificates.issue(class.student.id, class.course.id)),
    )
    .await;

    let ids: Vec<String> = issued
        .into_iter()
        .map(|certificate| certificate.unwrap().certificate_id)
        .collect();
    assert!(ids.windows(2).all(|pair| pair[0] == pair[1]));
    assert_eq!(class.app.db().certificate_count(), 1);
}

#[tokio::test]
async fn test_certificate_requires_passing_attempt() {
    let class = Classroom::new().await;

    let err = class
        .app
        .services
        .certificates()
        .issue(class.student.id, class.course.id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
    let stored = CertificateRepository::list_by_user(class.app.db(), class.student.id)
        .await
        .unwrap();
    assert!(stored.is_empty());
}

#[tokio::test]
async fn test_verify_reports_unknown_certificate_as_invalid() {
    let class = Classroom::new().await;
    class.complete_lessons(4).await;
    let result = class
        .app
        .services
        .assessments()
        .submit(class.student.id, class.assessment_id, class.answers(4))
        .await
        .unwrap();
    let certificates = class.app.services.certificates();

    let valid = certificates
        .verify(result.certificate_id.as_deref().unwrap())
        .await
        .unwrap();
    assert!(valid.is_valid);
    assert_eq!(valid.student_name.as_deref(), Some("Linus"));
    assert_eq!(valid.instructor_name.as_deref(), Some("Grace"));
    assert_eq!(valid.score, Some(100.0));

    let invalid = certificates.verify("CERT-NOPE").await.unwrap();
    assert!(!invalid.is_valid);
    assert!(invalid.student_name.is_none());
}

#[tokio::test]
async fn test_take_hides_answer_keys() {
    let class = Classroom::new().await;
    class.complete_lessons(4).await;

    let sheet = class
        .app
        .services
        .assessments()
        .take(class.student.id, class.assessment_id)
        .await
        .unwrap();

    assert_eq!(sheet.questions.len(), 4);
    let json = serde_json::to_value(&sheet).unwrap();
    for question in json["questions"].as_array().unwrap() {
        assert!(question.get("correctAnswer").is_none());
    }
}

#[tokio::test]
async fn test_only_owner_authors_assessment() {
    let class = Classroom::new().await;
    let intruder = class.app.user("Mallory", UserRole::Instructor).await;

    let err = class
        .app
        .services
        .assessments()
        .add_question(intruder.id, class.assessment_id, fill_in("Q", "A"))
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_get_or_create_returns_same_assessment() {
    let class = Classroom::new().await;

    let again = class
        .app
        .services
        .assessments()
        .get_or_create(class.instructor.id, class.course.id)
        .await
        .unwrap();

    assert_eq!(again.id, class.assessment_id);
    assert_eq!(again.questions.len(), 4);
    assert_eq!(again.passing_score, 75.0);
}

impl Classroom {
    async fn add_lesson(&self, title: &str) -> Lesson {
        self.app
            .services
            .catalog()
            .create_lesson(
                self.instructor.id,
                NewLesson {
                    course_id: self.course.id,
                    title: title.to_string(),
                    order_index: self.lessons.len() as i32,
                    duration_minutes: 5,
                    is_preview: false,
                    content: "More".to_string(),
                    video_url: None,
                    resources: vec![],
                },
            )
            .await
            .unwrap()
    }

    async fn progress(&self) -> i32 {
        self.app
            .services
            .enrollments()
            .get_progress(self.student.id, self.course.id)
            .await
            .unwrap()
            .progress
    }
}

#[tokio::test]
async fn test_new_lesson_relocks_incomplete_course() {
    let class = Classroom::new().await;
    class.complete_lessons(4).await;
    class
        .app
        .services
        .assessments()
        .submit(class.student.id, class.assessment_id, class.answers(1))
        .await
        .unwrap();
    assert_eq!(class.status().await, AssessmentStatus::Failed);

    class.add_lesson("Bonus").await;

    assert_eq!(class.progress().await, 80);
    assert_eq!(class.status().await, AssessmentStatus::Locked);
}

#[tokio::test]
async fn test_new_lesson_blocks_assessment_until_completed() {
    let class = Classroom::new().await;
    assert_eq!(class.complete_lessons(4).await, 100);
    let bonus = class.add_lesson("Bonus").await;
    let assessments = class.app.services.assessments();

    let take = assessments
        .take(class.student.id, class.assessment_id)
        .await
        .unwrap_err();
    let submit = assessments
        .submit(class.student.id, class.assessment_id, class.answers(4))
        .await
        .unwrap_err();

    assert!(matches!(take, AppError::Forbidden(_)));
    assert!(matches!(submit, AppError::Forbidden(_)));
    assert_eq!(class.app.db().attempt_count(), 0);
    assert_eq!(class.app.db().certificate_count(), 0);

    let progress = class
        .app
        .services
        .enrollments()
        .mark_lesson_complete(class.student.id, class.course.id, bonus.id)
        .await
        .unwrap();
    assert_eq!(progress.progress, 100);
    assert_eq!(progress.completed_lessons.len(), 5);
    assert!(assessments
        .take(class.student.id, class.assessment_id)
        .await
        .is_ok());
}

#[tokio::test]
async fn test_deleted_lesson_unlocks_remaining_curriculum() {
    let class = Classroom::new().await;
    class.complete_lessons(3).await;
    assert_eq!(class.status().await, AssessmentStatus::Locked);

    class
        .app
        .services
        .catalog()
        .delete_lesson(class.instructor.id, class.lessons[3].id)
        .await
        .unwrap();

    assert_eq!(class.progress().await, 100);
    assert_eq!(class.status().await, AssessmentStatus::NotStarted);
    let result = class
        .app
        .services
        .assessments()
        .submit(class.student.id, class.assessment_id, class.answers(4))
        .await
        .unwrap();
    assert!(result.passed);
}

#[tokio::test]
async fn test_quiz_scores_selected_options() {
    let app = TestApp::new();
    let instructor = app.user("Grace", UserRole::Instructor).await;
    let student = app.user("Linus", UserRole::Student).await;
    let (course, lessons) = app.published_course(&instructor, 0, 1).await;
    app.enroll(&student, &course).await;
    let quizzes = app.services.quizzes();

    let quiz = quizzes
        .get_or_create(instructor.id, lessons[0].id)
        .await
        .unwrap();
    let same = quizzes
        .get_or_create(instructor.id, lessons[0].id)
        .await
        .unwrap();
    assert_eq!(quiz.id, same.id);

    let first = quizzes
        .add_question(
            instructor.id,
            quiz.id,
            QuizQuestionDraft {
                text: "2 + 2".to_string(),
                options: vec!["3".to_string(), "4".to_string()],
                correct_answer: "4".to_string(),
            },
        )
        .await
        .unwrap();
    let second = quizzes
        .add_question(
            instructor.id,
            quiz.id,
            QuizQuestionDraft {
                text: "Rust mascot".to_string(),
                options: vec!["Ferris".to_string(), "Gopher".to_string()],
                correct_answer: "Ferris".to_string(),
            },
        )
        .await
        .unwrap();

    let result = quizzes
        .submit(
            student.id,
            quiz.id,
            vec![
                QuizAnswer {
                    question_id: first.id,
                    selected_option: 1,
                },
                QuizAnswer {
                    question_id: second.id,
                    selected_option: 1,
                },
            ],
        )
        .await
        .unwrap();

    assert_eq!(result.correct_count, 1);
    assert_eq!(result.total_questions, 2);
    assert_eq!(result.score, 50.0);
    assert!(result.outcomes[0].correct);
    assert!(!result.outcomes[1].correct);
    assert_eq!(result.outcomes[1].correct_answer, "Ferris");
}

#[tokio::test]
async fn test_quiz_rejects_answer_outside_options() {
    let app = TestApp::new();
    let instructor = app.user("Grace", UserRole::Instructor).await;
    let (_, lessons) = app.published_course(&instructor, 0, 1).await;
    let quizzes = app.services.quizzes();
    let quiz = quizzes
        .get_or_create(instructor.id, lessons[0].id)
        .await
        .unwrap();

    let err = quizzes
        .add_question(
            instructor.id,
            quiz.id,
            QuizQuestionDraft {
                text: "2 + 2".to_string(),
                options: vec!["3".to_string(), "5".to_string()],
                correct_answer: "4".to_string(),
            },
        )
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Validation(_)));
}

#[tokio::test]
async fn test_review_updates_course_rating_once_per_student() {
    let app = TestApp::new();
    let instructor = app.user("Grace", UserRole::Instructor).await;
    let alice = app.user("Alice", UserRole::Student).await;
    let bob = app.user("Bob", UserRole::Student).await;
    let (course, _) = app.published_course(&instructor, 0, 1).await;
    app.enroll(&alice, &course).await;
    app.enroll(&bob, &course).await;
    let reviews = app.services.reviews();

    reviews
        .add_review(alice.id, course.id, 5, "Great".to_string())
        .await
        .unwrap();
    reviews
        .add_review(bob.id, course.id, 4, "Good".to_string())
        .await
        .unwrap();
    let err = reviews
        .add_review(alice.id, course.id, 1, "Changed my mind".to_string())
        .await
        .unwrap_err();
    assert!(matches!(err, AppError::Conflict(_)));

    let course = app
        .services
        .catalog()
        .get_course(None, course.id)
        .await
        .unwrap();
    assert_eq!(course.num_reviews, 2);
    assert_eq!(course.average_rating, 4.5);
}

#[tokio::test]
async fn test_review_requires_enrollment() {
    let app = TestApp::new();
    let instructor = app.user("Grace", UserRole::Instructor).await;
    let stranger = app.user("Eve", UserRole::Student).await;
    let (course, _) = app.published_course(&instructor, 0, 1).await;

    let err = app
        .services
        .reviews()
        .add_review(stranger.id, course.id, 5, "Looks fun".to_string())
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_verified_payment_enrolls_student() {
    let mut vendors = Vendors::default();
    vendors.payments.expect_create_order().returning(|amount, currency, _| {
        Ok(GatewayOrder {
            order_id: "order_123".to_string(),
            amount,
            currency,
        })
    });
    vendors
        .payments
        .expect_verify_signature()
        .times(1)
        .returning(|_, _, signature| Ok(signature == "good"));
    let app = TestApp::with_vendors(vendors);
    let instructor = app.user("Grace", UserRole::Instructor).await;
    let student = app.user("Linus", UserRole::Student).await;
    let (course, _) = app.published_course(&instructor, 49_900, 1).await;
    let payments = app.services.payments();

    let order = payments.create_order(student.id, course.id).await.unwrap();
    assert_eq!(order.amount, 49_900);

    let paid = payments
        .verify_payment(
            student.id,
            order.order_id.clone(),
            "pay_1".to_string(),
            "good".to_string(),
        )
        .await
        .unwrap();
    assert_eq!(paid.status, OrderStatus::Paid);

    // Replay is answered from the stored order
    payments
        .verify_payment(
            student.id,
            order.order_id,
            "pay_1".to_string(),
            "good".to_string(),
        )
        .await
        .unwrap();

    let progress = app
        .services
        .enrollments()
        .list_enrollments(student.id)
        .await
        .unwrap();
    assert_eq!(progress.len(), 1);
}

#[tokio::test]
async fn test_free_course_rejects_payment_order() {
    let app = TestApp::new();
    let instructor = app.user("Grace", UserRole::Instructor).await;
    let student = app.user("Linus", UserRole::Student).await;
    let (course, _) = app.published_course(&instructor, 0, 1).await;

    let err = app
        .services
        .payments()
        .create_order(student.id, course.id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::BadRequest(_)));
}

#[tokio::test]
async fn test_free_enrollment_can_be_disabled() {
    let mut config = Config::for_secret(common::TEST_SECRET);
    config.free_enrollment_enabled = false;
    let app = TestApp::build(config, Vendors::default());
    let instructor = app.user("Grace", UserRole::Instructor).await;
    let student = app.user("Linus", UserRole::Student).await;
    let (course, _) = app.published_course(&instructor, 0, 1).await;

    let err = app
        .services
        .enrollments()
        .enroll_free(student.id, course.id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_direct_conversation_is_reused_and_delivers_live() {
    let app = TestApp::new();
    let alice = app.user("Alice", UserRole::Student).await;
    let bob = app.user("Bob", UserRole::Instructor).await;
    let messaging = app.services.messaging();

    let first = messaging.start_direct(alice.id, bob.id).await.unwrap();
    let second = messaging.start_direct(bob.id, alice.id).await.unwrap();
    assert_eq!(first.id, second.id);

    let mut bob_session = messaging.connect(bob.id).await;
    let sent = messaging
        .send_message(alice.id, first.id, "  hello  ".to_string())
        .await
        .unwrap();
    assert_eq!(sent.text, "hello");

    match bob_session.events.recv().await {
        Some(RealtimeEvent::NewMessage(message)) => assert_eq!(message.id, sent.id),
        other => panic!("unexpected event: {:?}", other),
    }

    assert_eq!(messaging.mark_read(bob.id, first.id).await.unwrap(), 1);
    assert_eq!(messaging.mark_read(bob.id, first.id).await.unwrap(), 0);

    let conversations = messaging.list_conversations(alice.id).await.unwrap();
    assert_eq!(
        conversations[0].last_message.as_ref().map(|m| m.text.as_str()),
        Some("hello")
    );
}

#[tokio::test]
async fn test_outsider_cannot_read_conversation() {
    let app = TestApp::new();
    let alice = app.user("Alice", UserRole::Student).await;
    let bob = app.user("Bob", UserRole::Student).await;
    let eve = app.user("Eve", UserRole::Student).await;
    let messaging = app.services.messaging();
    let conversation = messaging.start_direct(alice.id, bob.id).await.unwrap();

    let err = messaging
        .list_messages(eve.id, conversation.id)
        .await
        .unwrap_err();

    assert!(matches!(err, AppError::Forbidden(_)));
}

#[tokio::test]
async fn test_broadcast_reaches_enrolled_students() {
    let app = TestApp::new();
    let instructor = app.user("Grace", UserRole::Instructor).await;
    let alice = app.user("Alice", UserRole::Student).await;
    let bob = app.user("Bob", UserRole::Student).await;
    let outsider = app.user("Eve", UserRole::Student).await;
    let (course, _) = app.published_course(&instructor, 0, 1).await;
    app.enroll(&alice, &course).await;
    app.enroll(&bob, &course).await;

    let (conversation, message) = app
        .services
        .messaging()
        .broadcast(instructor.id, course.id, "Office hours at 5".to_string())
        .await
        .unwrap();

    assert_eq!(conversation.course_id, Some(course.id));
    assert!(conversation.has_participant(alice.id));
    assert!(conversation.has_participant(bob.id));
    assert!(!conversation.has_participant(outsider.id));
    assert_eq!(message.read_by, vec![instructor.id]);
}

#[tokio::test]
async fn test_presence_tracks_connected_users() {
    let app = TestApp::new();
    let alice = app.user("Alice", UserRole::Student).await;
    let bob = app.user("Bob", UserRole::Student).await;
    let messaging = app.services.messaging();

    let mut alice_session = messaging.connect(alice.id).await;
    let bob_session = messaging.connect(bob.id).await;
    assert!(matches!(
        alice_session.events.recv().await,
        Some(RealtimeEvent::Presence { online: true, .. })
    ));

    let mut online = messaging.online_users().await;
    online.sort();
    let mut expected = vec![alice.id, bob.id];
    expected.sort();
    assert_eq!(online, expected);

    messaging.disconnect(bob.id, bob_session.session_id).await;
    assert_eq!(messaging.online_users().await, vec![alice.id]);
    assert!(app.presence.is_online(alice.id).await);
}
