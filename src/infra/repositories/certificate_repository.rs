//! Certificate repository.

use async_trait::async_trait;
use sea_orm::sea_query::OnConflict;
use sea_orm::{ColumnTrait, DatabaseConnection, EntityTrait, QueryFilter, QueryOrder, Set};
use uuid::Uuid;

use super::entities::certificate::{self, Entity as CertificateEntity};
use crate::domain::Certificate;
use crate::errors::{AppError, AppResult};

#[cfg(any(test, feature = "test-utils"))]
use mockall::automock;

#[cfg_attr(any(test, feature = "test-utils"), automock)]
#[async_trait]
pub trait CertificateRepository: Send + Sync {
    async fn find_by_user_course(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<Option<Certificate>>;

    async fn find_by_certificate_id(&self, certificate_id: &str)
        -> AppResult<Option<Certificate>>;

    /// Insert a certificate unless (user, course) already has one, and
    /// return whichever row exists afterwards
    async fn issue(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        certificate_id: String,
    ) -> AppResult<Certificate>;

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Certificate>>;
}

pub struct CertificateStore {
    db: DatabaseConnection,
}

impl CertificateStore {
    pub fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

#[async_trait]
impl CertificateRepository for CertificateStore {
    async fn find_by_user_course(
        &self,
        user_id: Uuid,
        course_id: Uuid,
    ) -> AppResult<Option<Certificate>> {
        let result = CertificateEntity::find()
            .filter(certificate::Column::UserId.eq(user_id))
            .filter(certificate::Column::CourseId.eq(course_id))
            .one(&self.db)
            .await?;
        Ok(result.map(Certificate::from))
    }

    async fn find_by_certificate_id(
        &self,
        certificate_id: &str,
    ) -> AppResult<Option<Certificate>> {
        let result = CertificateEntity::find()
            .filter(certificate::Column::CertificateId.eq(certificate_id))
            .one(&self.db)
            .await?;
        Ok(result.map(Certificate::from))
    }

    async fn issue(
        &self,
        user_id: Uuid,
        course_id: Uuid,
        certificate_id: String,
    ) -> AppResult<Certificate> {
        let active_model = certificate::ActiveModel {
            id: Set(Uuid::new_v4()),
            certificate_id: Set(certificate_id),
            user_id: Set(user_id),
            course_id: Set(course_id),
            issued_at: Set(chrono::Utc::now()),
        };

        CertificateEntity::insert(active_model)
            .on_conflict(
                OnConflict::columns([certificate::Column::UserId, certificate::Column::CourseId])
                    .do_nothing()
                    .to_owned(),
            )
            .exec_without_returning(&self.db)
            .await?;

        self.find_by_user_course(user_id, course_id)
            .await?
            .ok_or_else(|| AppError::internal("certificate missing after upsert"))
    }

    async fn list_by_user(&self, user_id: Uuid) -> AppResult<Vec<Certificate>> {
        let models = CertificateEntity::find()
            .filter(certificate::Column::UserId.eq(user_id))
            .order_by_desc(certificate::Column::IssuedAt)
            .all(&self.db)
            .await?;

        Ok(models.into_iter().map(Certificate::from).collect())
    }
}
