//! Proof-of-completion certificates, unique per (student, course).

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use utoipa::ToSchema;
use uuid::Uuid;

use crate::config::CERTIFICATE_ID_PREFIX;

#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct Certificate {
    pub id: Uuid,
    /// Public identifier printed on the certificate and used for verification
    pub certificate_id: String,
    pub user_id: Uuid,
    pub course_id: Uuid,
    pub issued_at: DateTime<Utc>,
}

/// Generate a public certificate identifier.
///
/// Uniqueness comes from the random v4 UUID, independent of the storage
/// constraint on `certificate_id`.
pub fn generate_certificate_id() -> String {
    format!(
        "{}{}",
        CERTIFICATE_ID_PREFIX,
        Uuid::new_v4().simple().to_string().to_uppercase()
    )
}

/// Certificate detail for display and download. The score is looked up
/// from the best passing attempt; the certificate row does not store it.
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateView {
    #[schema(example = "CERT-6F1C0A9E4B2D4C7E9A1B3C5D7E9F1A2B")]
    pub certificate_id: String,
    pub course_id: Uuid,
    pub student_name: String,
    pub course_title: String,
    pub instructor_name: String,
    pub issued_at: DateTime<Utc>,
    #[schema(example = 87.5)]
    pub score: Option<f64>,
}

/// Public verification payload
#[derive(Debug, Clone, Serialize, Deserialize, ToSchema)]
#[serde(rename_all = "camelCase")]
pub struct CertificateVerification {
    pub is_valid: bool,
    pub certificate_id: String,
    pub student_name: Option<String>,
    pub course_title: Option<String>,
    pub instructor_name: Option<String>,
    pub issued_at: Option<DateTime<Utc>>,
    pub score: Option<f64>,
}

impl CertificateVerification {
    pub fn valid(view: CertificateView) -> Self {
        Self {
            is_valid: true,
            certificate_id: view.certificate_id,
            student_name: Some(view.student_name),
            course_title: Some(view.course_title),
            instructor_name: Some(view.instructor_name),
            issued_at: Some(view.issued_at),
            score: view.score,
        }
    }

    pub fn invalid(certificate_id: impl Into<String>) -> Self {
        Self {
            is_valid: false,
            certificate_id: certificate_id.into(),
            student_name: None,
            course_title: None,
            instructor_name: None,
            issued_at: None,
            score: None,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_generated_ids_are_prefixed_and_distinct() {
        let first = generate_certificate_id();
        let second = generate_certificate_id();

        assert!(first.starts_with("CERT-"));
        assert_eq!(first.len(), "CERT-".len() + 32);
        assert_ne!(first, second);
    }

    #[test]
    fn test_invalid_verification_carries_no_identity() {
        let verification = CertificateVerification::invalid("CERT-NOPE");
        assert!(!verification.is_valid);
        assert!(verification.student_name.is_none());
        assert!(verification.score.is_none());
    }
}
