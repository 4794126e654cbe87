//! Migration: per-lesson quizzes.

use sea_orm_migration::prelude::*;

use super::m20240101_000001_create_users_and_catalog::Lessons;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Quizzes::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Quizzes::Id).uuid().not_null().primary_key())
                    .col(
                        ColumnDef::new(Quizzes::LessonId)
                            .uuid()
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Quizzes::CourseId).uuid().not_null())
                    .col(ColumnDef::new(Quizzes::Title).string().not_null())
                    .col(
                        ColumnDef::new(Quizzes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quizzes_lesson")
                            .from(Quizzes::Table, Quizzes::LessonId)
                            .to(Lessons::Table, Lessons::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(QuizQuestions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(QuizQuestions::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(QuizQuestions::QuizId).uuid().not_null())
                    .col(ColumnDef::new(QuizQuestions::Position).integer().not_null())
                    .col(ColumnDef::new(QuizQuestions::Text).text().not_null())
                    .col(ColumnDef::new(QuizQuestions::Options).json_binary().not_null())
                    .col(ColumnDef::new(QuizQuestions::CorrectAnswer).string().not_null())
                    .col(
                        ColumnDef::new(QuizQuestions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quiz_questions_quiz")
                            .from(QuizQuestions::Table, QuizQuestions::QuizId)
                            .to(Quizzes::Table, Quizzes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(QuizAttempts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(QuizAttempts::Id)
                            .uuid()
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(QuizAttempts::QuizId).uuid().not_null())
                    .col(ColumnDef::new(QuizAttempts::StudentId).uuid().not_null())
                    .col(ColumnDef::new(QuizAttempts::Answers).json_binary().not_null())
                    .col(ColumnDef::new(QuizAttempts::Score).double().not_null())
                    .col(ColumnDef::new(QuizAttempts::CorrectCount).integer().not_null())
                    .col(
                        ColumnDef::new(QuizAttempts::TotalQuestions)
                            .integer()
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(QuizAttempts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_quiz_attempts_quiz")
                            .from(QuizAttempts::Table, QuizAttempts::QuizId)
                            .to(Quizzes::Table, Quizzes::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(QuizAttempts::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(QuizQuestions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Quizzes::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Quizzes {
    Table,
    Id,
    LessonId,
    CourseId,
    Title,
    CreatedAt,
}

#[derive(Iden)]
enum QuizQuestions {
    Table,
    Id,
    QuizId,
    Position,
    Text,
    Options,
    CorrectAnswer,
    CreatedAt,
}

#[derive(Iden)]
enum QuizAttempts {
    Table,
    Id,
    QuizId,
    StudentId,
    Answers,
    Score,
    CorrectCount,
    TotalQuestions,
    CreatedAt,
}
