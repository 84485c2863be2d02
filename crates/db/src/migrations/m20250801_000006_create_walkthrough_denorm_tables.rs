//! Create walkthrough denormalization tables migration.
//!
//! Three side tables track a walkthrough's selected answers, its
//! answered-question set and its running per-profile scores.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(WalkthroughAnswer::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WalkthroughAnswer::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WalkthroughAnswer::WalkthroughId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(WalkthroughAnswer::AnswerId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(WalkthroughAnswer::QuestionId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalkthroughAnswer::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_walkthrough_answer_walkthrough")
                            .from(WalkthroughAnswer::Table, WalkthroughAnswer::WalkthroughId)
                            .to(Walkthrough::Table, Walkthrough::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_walkthrough_answer_answer")
                            .from(WalkthroughAnswer::Table, WalkthroughAnswer::AnswerId)
                            .to(Answer::Table, Answer::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_walkthrough_answer_unique")
                    .table(WalkthroughAnswer::Table)
                    .col(WalkthroughAnswer::WalkthroughId)
                    .col(WalkthroughAnswer::AnswerId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_walkthrough_answer_question")
                    .table(WalkthroughAnswer::Table)
                    .col(WalkthroughAnswer::WalkthroughId)
                    .col(WalkthroughAnswer::QuestionId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WalkthroughQuestion::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WalkthroughQuestion::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WalkthroughQuestion::WalkthroughId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalkthroughQuestion::QuestionId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalkthroughQuestion::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_walkthrough_question_walkthrough")
                            .from(
                                WalkthroughQuestion::Table,
                                WalkthroughQuestion::WalkthroughId,
                            )
                            .to(Walkthrough::Table, Walkthrough::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_walkthrough_question_question")
                            .from(WalkthroughQuestion::Table, WalkthroughQuestion::QuestionId)
                            .to(Question::Table, Question::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_walkthrough_question_unique")
                    .table(WalkthroughQuestion::Table)
                    .col(WalkthroughQuestion::WalkthroughId)
                    .col(WalkthroughQuestion::QuestionId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(WalkthroughProfile::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(WalkthroughProfile::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(WalkthroughProfile::WalkthroughId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(WalkthroughProfile::ProfileId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(WalkthroughProfile::Quantifier).integer().not_null())
                    .col(
                        ColumnDef::new(WalkthroughProfile::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(WalkthroughProfile::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_walkthrough_profile_walkthrough")
                            .from(WalkthroughProfile::Table, WalkthroughProfile::WalkthroughId)
                            .to(Walkthrough::Table, Walkthrough::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_walkthrough_profile_profile")
                            .from(WalkthroughProfile::Table, WalkthroughProfile::ProfileId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_walkthrough_profile_unique")
                    .table(WalkthroughProfile::Table)
                    .col(WalkthroughProfile::WalkthroughId)
                    .col(WalkthroughProfile::ProfileId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(WalkthroughProfile::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WalkthroughQuestion::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(WalkthroughAnswer::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum WalkthroughAnswer {
    Table,
    Id,
    WalkthroughId,
    AnswerId,
    QuestionId,
    CreatedAt,
}

#[derive(Iden)]
enum WalkthroughQuestion {
    Table,
    Id,
    WalkthroughId,
    QuestionId,
    CreatedAt,
}

#[derive(Iden)]
enum WalkthroughProfile {
    Table,
    Id,
    WalkthroughId,
    ProfileId,
    Quantifier,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Walkthrough {
    Table,
    Id,
}

#[derive(Iden)]
enum Answer {
    Table,
    Id,
}

#[derive(Iden)]
enum Question {
    Table,
    Id,
}

#[derive(Iden)]
enum Profile {
    Table,
    Id,
}
