//! Migration: final assessments, attempts and certificates.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_and_catalog::{Courses, Users};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Assessments::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Assessments::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    // One assessment per course
                    .col(
                        ColumnDef::new(Assessments::CourseId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Assessments::Title).string().not_null())
                    .col(ColumnDef::new(Assessments::PassingScore).double().not_null())
                    .col(
                        ColumnDef::new(Assessments::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Assessments::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assessments_course")
                            .from(Assessments::Table, Assessments::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AssessmentQuestions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AssessmentQuestions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AssessmentQuestions::AssessmentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssessmentQuestions::Position)
                            .integer()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AssessmentQuestions::Text).text().not_null())
                    .col(ColumnDef::new(AssessmentQuestions::MediaUrl).string().null())
                    .col(ColumnDef::new(AssessmentQuestions::MediaKind).string().null())
                    .col(
                        ColumnDef::new(AssessmentQuestions::QuestionType)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssessmentQuestions::Options)
                            .json_binary()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssessmentQuestions::CorrectAnswer)
                            .string()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AssessmentQuestions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assessment_questions_assessment")
                            .from(AssessmentQuestions::Table, AssessmentQuestions::AssessmentId)
                            .to(Assessments::Table, Assessments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Append-only, many per student
        manager
            .create_table(
                Table::create()
                    .table(AssessmentAttempts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AssessmentAttempts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AssessmentAttempts::AssessmentId)
                            .uuid()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AssessmentAttempts::StudentId).uuid().not_null())
                    .col(
                        ColumnDef::new(AssessmentAttempts::Answers)
                            .json_binary()
                            .not_null(),
                    )
                    .col(ColumnDef::new(AssessmentAttempts::Score).double().not_null())
                    .col(ColumnDef::new(AssessmentAttempts::Passed).boolean().not_null())
                    .col(
                        ColumnDef::new(AssessmentAttempts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_assessment_attempts_assessment")
                            .from(AssessmentAttempts::Table, AssessmentAttempts::AssessmentId)
                            .to(Assessments::Table, Assessments::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_assessment_attempts_student")
                    .table(AssessmentAttempts::Table)
                    .col(AssessmentAttempts::AssessmentId)
                    .col(AssessmentAttempts::StudentId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Certificates::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Certificates::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Certificates::CertificateId)
                            .string()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Certificates::UserId).uuid().not_null())
                    .col(ColumnDef::new(Certificates::CourseId).uuid().not_null())
                    .col(
                        ColumnDef::new(Certificates::IssuedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_certificates_user")
                            .from(Certificates::Table, Certificates::UserId)
                            .to(Users::Table, Users::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_certificates_course")
                            .from(Certificates::Table, Certificates::CourseId)
                            .to(Courses::Table, Courses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // At most one certificate per (user, course), even under concurrent issuance
        manager
            .create_index(
                Index::create()
                    .name("uq_certificates_user_course")
                    .table(Certificates::Table)
                    .col(Certificates::UserId)
                    .col(Certificates::CourseId)
                    .unique()
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Certificates::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AssessmentAttempts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(AssessmentQuestions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Assessments::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Assessments {
    Table,
    Id,
    CourseId,
    Title,
    PassingScore,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum AssessmentQuestions {
    Table,
    Id,
    AssessmentId,
    Position,
    Text,
    MediaUrl,
    MediaKind,
    QuestionType,
    Options,
    CorrectAnswer,
    CreatedAt,
}

#[derive(Iden)]
enum AssessmentAttempts {
    Table,
    Id,
    AssessmentId,
    StudentId,
    Answers,
    Score,
    Passed,
    CreatedAt,
}

#[derive(Iden)]
enum Certificates {
    Table,
    Id,
    CertificateId,
    UserId,
    CourseId,
    IssuedAt,
}
