//! Create walkthrough table migration.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Walkthrough::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Walkthrough::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Walkthrough::PollId).string_len(32).not_null())
                    .col(ColumnDef::new(Walkthrough::Email).string_len(254))
                    .col(ColumnDef::new(Walkthrough::Ip).string_len(64))
                    .col(ColumnDef::new(Walkthrough::UserAgent).string_len(512))
                    .col(ColumnDef::new(Walkthrough::CompletedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Walkthrough::Progress).double())
                    .col(
                        ColumnDef::new(Walkthrough::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Walkthrough::UpdatedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_walkthrough_poll")
                            .from(Walkthrough::Table, Walkthrough::PollId)
                            .to(Poll::Table, Poll::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_walkthrough_poll")
                    .table(Walkthrough::Table)
                    .col(Walkthrough::PollId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Walkthrough::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Walkthrough {
    Table,
    Id,
    PollId,
    Email,
    Ip,
    UserAgent,
    CompletedAt,
    Progress,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Poll {
    Table,
    Id,
}
