//! Certificate issuer - Idempotent minting, display and public verification.
//!
//! Issuance is find-or-create keyed by (user, course) and backed by a unique
//! index, so concurrent passing submissions converge on one record. The
//! displayed score is looked up from the best passing attempt at read time.

use async_trait::async_trait;
use std::sync::Arc;
use uuid::Uuid;

use super::container::parallel;
use crate::domain::assessment::best_passing_attempt;
use crate::domain::certificate::generate_certificate_id;
use crate::domain::{Certificate, CertificateVerification, CertificateView};
use crate::errors::{AppError, AppResult, OptionExt};
use crate::infra::external::CertificateRenderer;
use crate::infra::UnitOfWork;

#[async_trait]
pub trait CertificateService: Send + Sync {
    /// Return the existing certificate or mint one. Requires a passing attempt.
    async fn issue(&self, user_id: Uuid, course_id: Uuid) -> AppResult<Certificate>;

    async fn get_certificate(&self, certificate_id: &str) -> AppResult<CertificateView>;

    /// Public check; unknown identifiers yield `is_valid = false`
    async fn verify(&self, certificate_id: &str) -> AppResult<CertificateVerification>;

    async fn list_certificates(&self, user_id: Uuid) -> AppResult<Vec<CertificateView>>;

    async fn render_pdf(&self, certificate_id: &str) -> AppResult<Vec<u8>>;
}

pub struct CertificateIssuer<U: UnitOfWork> {
    uow: Arc<U>,
    renderer: Arc<dyn CertificateRenderer>,
}

impl<U: UnitOfWork> CertificateIssuer<U> {
    pub fn new(uow: Arc<U>, renderer: Arc<dyn CertificateRenderer>) -> Self {
        Self { uow, renderer }
    }

    /// Score of the best passing attempt for the certificate's (user, course).
    async fn best_score(&self, user_id: Uuid, course_id: Uuid) -> AppResult<Option<f64>> {
        let Some(assessment) = self.uow.assessments().find_by_course(course_id).await? else {
            return Ok(None);
        };
        let attempts = self
            .uow
            .assessments()
            .list_attempts(assessment.id, user_id)
            .await?;
        Ok(best_passing_attempt(&attempts).map(|attempt| attempt.score))
    }

    async fn view(&self, certificate: Certificate) -> AppResult<CertificateView> {
        let (student, course, score) = parallel::join3(
            self.uow.users().find_by_id(certificate.user_id),
            self.uow.courses().find_by_id(certificate.course_id),
            self.best_score(certificate.user_id, certificate.course_id),
        )
        .await?;
        let student = student.ok_or_not_found()?;
        let course = course.ok_or_not_found()?;
        let instructor = self
            .uow
            .users()
            .find_by_id(course.instructor_id)
            .await?
            .ok_or_not_found()?;

        Ok(CertificateView {
            certificate_id: certificate.certificate_id,
            course_id: course.id,
            student_name: student.name,
            course_title: course.title,
            instructor_name: instructor.name,
            issued_at: certificate.issued_at,
            score,
        })
    }
}

#[async_trait]
impl<U: UnitOfWork> CertificateService for CertificateIssuer<U> {
    async fn issue(&self, user_id: Uuid, course_id: Uuid) -> AppResult<Certificate> {
        if let Some(existing) = self
            .uow
            .certificates()
            .find_by_user_course(user_id, course_id)
            .await?
        {
            return Ok(existing);
        }

        if self.best_score(user_id, course_id).await?.is_none() {
            return Err(AppError::forbidden(
                "A passing assessment attempt is required for a certificate",
            ));
        }

        let certificate = self
            .uow
            .certificates()
            .issue(user_id, course_id, generate_certificate_id())
            .await?;

        tracing::info!(
            user_id = %user_id,
            course_id = %course_id,
            certificate_id = %certificate.certificate_id,
            "Certificate issued"
        );
        Ok(certificate)
    }

    async fn get_certificate(&self, certificate_id: &str) -> AppResult<CertificateView> {
        let certificate = self
            .uow
            .certificates()
            .find_by_certificate_id(certificate_id)
            .await?
            .ok_or_not_found()?;
        self.view(certificate).await
    }

    async fn verify(&self, certificate_id: &str) -> AppResult<CertificateVerification> {
        match self.get_certificate(certificate_id).await {
            Ok(view) => Ok(CertificateVerification::valid(view)),
            Err(AppError::NotFound) => Ok(CertificateVerification::invalid(certificate_id)),
            Err(e) => Err(e),
        }
    }

    async fn list_certificates(&self, user_id: Uuid) -> AppResult<Vec<CertificateView>> {
        let certificates = self.uow.certificates().list_by_user(user_id).await?;
        let views = certificates
            .into_iter()
            .map(|certificate| self.view(certificate))
            .collect();
        parallel::join_all(views).await
    }

    async fn render_pdf(&self, certificate_id: &str) -> AppResult<Vec<u8>> {
        self.uow
            .certificates()
            .find_by_certificate_id(certificate_id)
            .await?
            .ok_or_not_found()?;
        self.renderer.render_pdf(certificate_id.to_string()).await
    }
}
