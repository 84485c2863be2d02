//! Create profile and answer_profile tables migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Profile::Table)
                    .if_not_exists()
                    .col(ColumnDef::new(Profile::Id).string_len(32).not_null().primary_key())
                    .col(ColumnDef::new(Profile::Text).text().not_null())
                    .col(
                        ColumnDef::new(Profile::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Profile::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(AnswerProfile::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AnswerProfile::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(AnswerProfile::AnswerId).string_len(32).not_null())
                    .col(ColumnDef::new(AnswerProfile::ProfileId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(AnswerProfile::Quantifier)
                            .integer()
                            .not_null()
                            .default(1),
                    )
                    .col(
                        ColumnDef::new(AnswerProfile::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_answer_profile_answer")
                            .from(AnswerProfile::Table, AnswerProfile::AnswerId)
                            .to(Answer::Table, Answer::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_answer_profile_profile")
                            .from(AnswerProfile::Table, AnswerProfile::ProfileId)
                            .to(Profile::Table, Profile::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_answer_profile_answer_profile")
                    .table(AnswerProfile::Table)
                    .col(AnswerProfile::AnswerId)
                    .col(AnswerProfile::ProfileId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AnswerProfile::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Profile::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Profile {
    Table,
    Id,
    Text,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum AnswerProfile {
    Table,
    Id,
    AnswerId,
    ProfileId,
    Quantifier,
    CreatedAt,
}

#[derive(Iden)]
enum Answer {
    Table,
    Id,
}
