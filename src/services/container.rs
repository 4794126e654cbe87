//! Service Container - Centralized service access with parallel execution support.
//!
//! Features:
//! - Centralized access to all application services
//! - Thread-safe concurrent access via Arc
//! - Parallel execution helpers for independent reads

use std::future::Future;
use std::sync::Arc;

use super::{
    AssessmentEngine, AssessmentService, AuthService, Authenticator, CatalogManager,
    CatalogService, CertificateIssuer, CertificateService, EnrollmentService, EnrollmentTracker,
    MessagingRelay, MessagingService, PaymentProcessor, PaymentService, QuizEngine, QuizService,
    ReviewBoard, ReviewService, UserManager, UserService,
};
use crate::config::Config;
use crate::errors::AppResult;
use crate::infra::external::{
    CertificateRenderer, MediaHost, PaymentGateway, Summarizer, UnconfiguredMediaHost,
    UnconfiguredPaymentGateway, UnconfiguredRenderer, UnconfiguredSummarizer,
};
use crate::infra::{Persistence, PresenceRegistry, UnitOfWork};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

/// Service container trait for dependency injection.
#[cfg_attr(any(test, feature = "test-utils"), automock)]
pub trait ServiceContainer: Send + Sync {
    fn auth(&self) -> Arc<dyn AuthService>;

    fn users(&self) -> Arc<dyn UserService>;

    fn catalog(&self) -> Arc<dyn CatalogService>;

    fn enrollments(&self) -> Arc<dyn EnrollmentService>;

    fn payments(&self) -> Arc<dyn PaymentService>;

    fn reviews(&self) -> Arc<dyn ReviewService>;

    fn assessments(&self) -> Arc<dyn AssessmentService>;

    fn certificates(&self) -> Arc<dyn CertificateService>;

    fn quizzes(&self) -> Arc<dyn QuizService>;

    fn messaging(&self) -> Arc<dyn MessagingService>;
}

/// Third-party vendors the services call out to
#[derive(Clone)]
pub struct Collaborators {
    pub payments: Arc<dyn PaymentGateway>,
    pub media: Arc<dyn MediaHost>,
    pub renderer: Arc<dyn CertificateRenderer>,
    pub summarizer: Arc<dyn Summarizer>,
}

impl Collaborators {
    /// Every vendor answers with an upstream error until configured
    pub fn unconfigured() -> Self {
        Self {
            payments: Arc::new(UnconfiguredPaymentGateway),
            media: Arc::new(UnconfiguredMediaHost),
            renderer: Arc::new(UnconfiguredRenderer),
            summarizer: Arc::new(UnconfiguredSummarizer),
        }
    }
}

/// Concrete implementation of ServiceContainer
#[derive(Clone)]
pub struct Services {
    auth: Arc<dyn AuthService>,
    users: Arc<dyn UserService>,
    catalog: Arc<dyn CatalogService>,
    enrollments: Arc<dyn EnrollmentService>,
    payments: Arc<dyn PaymentService>,
    reviews: Arc<dyn ReviewService>,
    assessments: Arc<dyn AssessmentService>,
    certificates: Arc<dyn CertificateService>,
    quizzes: Arc<dyn QuizService>,
    messaging: Arc<dyn MessagingService>,
}

impl Services {
    /// Wire every service over one Unit of Work
    pub fn new<U: UnitOfWork + 'static>(
        uow: Arc<U>,
        config: Config,
        presence: PresenceRegistry,
        collaborators: Collaborators,
    ) -> Self {
        let certificates: Arc<dyn CertificateService> = Arc::new(CertificateIssuer::new(
            uow.clone(),
            collaborators.renderer,
        ));

        Self {
            auth: Arc::new(Authenticator::new(uow.clone(), config.clone())),
            users: Arc::new(UserManager::new(uow.clone())),
            catalog: Arc::new(CatalogManager::new(
                uow.clone(),
                collaborators.media,
                collaborators.summarizer,
            )),
            enrollments: Arc::new(EnrollmentTracker::new(uow.clone(), config.clone())),
            payments: Arc::new(PaymentProcessor::new(uow.clone(), collaborators.payments)),
            reviews: Arc::new(ReviewBoard::new(uow.clone())),
            assessments: Arc::new(AssessmentEngine::new(
                uow.clone(),
                certificates.clone(),
                config,
            )),
            certificates,
            quizzes: Arc::new(QuizEngine::new(uow.clone())),
            messaging: Arc::new(MessagingRelay::new(uow, presence)),
        }
    }

    /// Create service container from database connection and config
    pub fn from_connection(
        db: sea_orm::DatabaseConnection,
        config: Config,
        presence: PresenceRegistry,
        collaborators: Collaborators,
    ) -> Self {
        Self::new(
            Arc::new(Persistence::new(db)),
            config,
            presence,
            collaborators,
        )
    }
}

impl ServiceContainer for Services {
    fn auth(&self) -> Arc<dyn AuthService> {
        self.auth.clone()
    }

    fn users(&self) -> Arc<dyn UserService> {
        self.users.clone()
    }

    fn catalog(&self) -> Arc<dyn CatalogService> {
        self.catalog.clone()
    }

    fn enrollments(&self) -> Arc<dyn EnrollmentService> {
        self.enrollments.clone()
    }

    fn payments(&self) -> Arc<dyn PaymentService> {
        self.payments.clone()
    }

    fn reviews(&self) -> Arc<dyn ReviewService> {
        self.reviews.clone()
    }

    fn assessments(&self) -> Arc<dyn AssessmentService> {
        self.assessments.clone()
    }

    fn certificates(&self) -> Arc<dyn CertificateService> {
        self.certificates.clone()
    }

    fn quizzes(&self) -> Arc<dyn QuizService> {
        self.quizzes.clone()
    }

    fn messaging(&self) -> Arc<dyn MessagingService> {
        self.messaging.clone()
    }
}

/// Parallel execution utilities for running independent operations concurrently.
pub mod parallel {
    use super::*;
    use tokio::try_join;

    /// Execute two independent async operations in parallel.
    ///
    /// If either operation fails, the error is returned immediately.
    pub async fn join2<F1, F2, T1, T2>(f1: F1, f2: F2) -> AppResult<(T1, T2)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
    {
        try_join!(f1, f2)
    }

    /// Execute three independent async operations in parallel.
    pub async fn join3<F1, F2, F3, T1, T2, T3>(
        f1: F1,
        f2: F2,
        f3: F3,
    ) -> AppResult<(T1, T2, T3)>
    where
        F1: Future<Output = AppResult<T1>>,
        F2: Future<Output = AppResult<T2>>,
        F3: Future<Output = AppResult<T3>>,
    {
        try_join!(f1, f2, f3)
    }

    /// Execute a collection of homogeneous async operations in parallel.
    ///
    /// Results are returned in the same order as the input futures.
    pub async fn join_all<F, T>(futures: Vec<F>) -> AppResult<Vec<T>>
    where
        F: Future<Output = AppResult<T>>,
    {
        let results = futures::future::join_all(futures).await;
        results.into_iter().collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::errors::AppError;

    #[tokio::test]
    async fn test_parallel_join2() {
        async fn op1() -> AppResult<i32> {
            Ok(1)
        }
        async fn op2() -> AppResult<i32> {
            Ok(2)
        }

        let (a, b) = parallel::join2(op1(), op2()).await.unwrap();
        assert_eq!(a, 1);
        assert_eq!(b, 2);
    }

    #[tokio::test]
    async fn test_parallel_join_all_keeps_order() {
        let futures: Vec<_> = (0..5).map(|i| async move { Ok(i) as AppResult<i32> }).collect();
        let results = parallel::join_all(futures).await.unwrap();
        assert_eq!(results, vec![0, 1, 2, 3, 4]);
    }

    #[tokio::test]
    async fn test_parallel_join_all_surfaces_errors() {
        let futures: Vec<_> = (0..3)
            .map(|i| async move {
                if i == 1 {
                    Err(AppError::NotFound)
                } else {
                    Ok(i)
                }
            })
            .collect();
        assert!(matches!(
            parallel::join_all(futures).await,
            Err(AppError::NotFound)
        ));
    }
}
