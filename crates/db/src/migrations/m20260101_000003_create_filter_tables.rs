//! Create custom filter tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CustomFilters::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CustomFilters::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CustomFilters::AccountId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CustomFilters::Title).string_len(256).not_null())
                    .col(
                        ColumnDef::new(CustomFilters::Context)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(CustomFilters::Action)
                            .string_len(16)
                            .not_null()
                            .default("warn"),
                    )
                    .col(ColumnDef::new(CustomFilters::ExpiresAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(CustomFilters::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_custom_filters_account")
                            .from(CustomFilters::Table, CustomFilters::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_custom_filters_account_id")
                    .table(CustomFilters::Table)
                    .col(CustomFilters::AccountId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CustomFilterKeywords::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CustomFilterKeywords::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CustomFilterKeywords::CustomFilterId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CustomFilterKeywords::Keyword)
                            .string_len(512)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CustomFilterKeywords::WholeWord)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_custom_filter_keywords_filter")
                            .from(
                                CustomFilterKeywords::Table,
                                CustomFilterKeywords::CustomFilterId,
                            )
                            .to(CustomFilters::Table, CustomFilters::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(CustomFilterStatuses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CustomFilterStatuses::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CustomFilterStatuses::CustomFilterId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(CustomFilterStatuses::StatusId)
                            .string_len(32)
                            .not_null(),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_custom_filter_statuses_filter")
                            .from(
                                CustomFilterStatuses::Table,
                                CustomFilterStatuses::CustomFilterId,
                            )
                            .to(CustomFilters::Table, CustomFilters::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_custom_filter_statuses_filter_status")
                    .table(CustomFilterStatuses::Table)
                    .col(CustomFilterStatuses::CustomFilterId)
                    .col(CustomFilterStatuses::StatusId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(CustomFilterStatuses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CustomFilterKeywords::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CustomFilters::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum CustomFilters {
    Table,
    Id,
    AccountId,
    Title,
    Context,
    Action,
    ExpiresAt,
    CreatedAt,
}

#[derive(Iden)]
enum CustomFilterKeywords {
    Table,
    Id,
    CustomFilterId,
    Keyword,
    WholeWord,
}

#[derive(Iden)]
enum CustomFilterStatuses {
    Table,
    Id,
    CustomFilterId,
    StatusId,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
}
