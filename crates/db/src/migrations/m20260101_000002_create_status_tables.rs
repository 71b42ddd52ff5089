//! Create statuses and the per-status interaction tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Applications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Applications::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Applications::Name).string_len(256).not_null())
                    .col(ColumnDef::new(Applications::Website).string_len(512))
                    .col(
                        ColumnDef::new(Applications::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Statuses::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Statuses::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Statuses::AccountId).string_len(32).not_null())
                    .col(ColumnDef::new(Statuses::Uri).string_len(512))
                    .col(ColumnDef::new(Statuses::Url).string_len(512))
                    .col(ColumnDef::new(Statuses::Text).text().not_null().default(""))
                    .col(
                        ColumnDef::new(Statuses::SpoilerText)
                            .text()
                            .not_null()
                            .default(""),
                    )
                    .col(
                        ColumnDef::new(Statuses::Visibility)
                            .string_len(16)
                            .not_null()
                            .default("public"),
                    )
                    .col(
                        ColumnDef::new(Statuses::Searchability)
                            .string_len(16)
                            .not_null()
                            .default("public"),
                    )
                    .col(
                        ColumnDef::new(Statuses::Local)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Statuses::LocalOnly)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(ColumnDef::new(Statuses::InReplyToId).string_len(32))
                    .col(ColumnDef::new(Statuses::InReplyToAccountId).string_len(32))
                    .col(ColumnDef::new(Statuses::ReblogOfId).string_len(32))
                    .col(ColumnDef::new(Statuses::ConversationId).string_len(32))
                    .col(ColumnDef::new(Statuses::PollId).string_len(32))
                    .col(ColumnDef::new(Statuses::ApplicationId).string_len(32))
                    .col(
                        ColumnDef::new(Statuses::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(Statuses::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Statuses::EditedAt).timestamp_with_time_zone())
                    .col(ColumnDef::new(Statuses::DeletedAt).timestamp_with_time_zone())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_statuses_account")
                            .from(Statuses::Table, Statuses::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_statuses_application")
                            .from(Statuses::Table, Statuses::ApplicationId)
                            .to(Applications::Table, Applications::Id)
                            .on_delete(ForeignKeyAction::SetNull),
                    )
                    .to_owned(),
            )
            .await?;

        for (name, column) in [
            ("idx_statuses_account_id", Statuses::AccountId),
            ("idx_statuses_reblog_of_id", Statuses::ReblogOfId),
            ("idx_statuses_in_reply_to_id", Statuses::InReplyToId),
        ] {
            manager
                .create_index(
                    Index::create()
                        .name(name)
                        .table(Statuses::Table)
                        .col(column)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(Mentions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Mentions::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Mentions::StatusId).string_len(32).not_null())
                    .col(ColumnDef::new(Mentions::AccountId).string_len(32).not_null())
                    .col(
                        ColumnDef::new(Mentions::Silent)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_mentions_status")
                            .from(Mentions::Table, Mentions::StatusId)
                            .to(Statuses::Table, Statuses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_mentions_status_account")
                    .table(Mentions::Table)
                    .col(Mentions::StatusId)
                    .col(Mentions::AccountId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Favourites, bookmarks and pins share a layout
        for table in [
            Interactions::Favourites,
            Interactions::Bookmarks,
            Interactions::StatusPins,
        ] {
            let name = table.to_string();
            manager
                .create_table(
                    Table::create()
                        .table(table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Interactions::Id)
                                .string_len(32)
                                .not_null()
                                .primary_key(),
                        )
                        .col(
                            ColumnDef::new(Interactions::AccountId)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Interactions::StatusId)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Interactions::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name(format!("fk_{name}_status"))
                                .from(table, Interactions::StatusId)
                                .to(Statuses::Table, Statuses::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            manager
                .create_index(
                    Index::create()
                        .name(format!("idx_{name}_account_status"))
                        .table(table)
                        .col(Interactions::AccountId)
                        .col(Interactions::StatusId)
                        .unique()
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(ConversationMutes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(ConversationMutes::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(ConversationMutes::AccountId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(ConversationMutes::ConversationId)
                            .string_len(32)
                            .not_null(),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_conversation_mutes_account_conversation")
                    .table(ConversationMutes::Table)
                    .col(ConversationMutes::AccountId)
                    .col(ConversationMutes::ConversationId)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Polls::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Polls::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Polls::StatusId)
                            .string_len(32)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(Polls::AccountId).string_len(32).not_null())
                    .col(ColumnDef::new(Polls::Options).json_binary().not_null())
                    .col(ColumnDef::new(Polls::CachedTallies).json_binary().not_null())
                    .col(
                        ColumnDef::new(Polls::Multiple)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Polls::VotesCount)
                            .integer()
                            .not_null()
                            .default(0),
                    )
                    .col(ColumnDef::new(Polls::VotersCount).integer())
                    .col(ColumnDef::new(Polls::ExpiresAt).timestamp_with_time_zone())
                    .col(
                        ColumnDef::new(Polls::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_polls_status")
                            .from(Polls::Table, Polls::StatusId)
                            .to(Statuses::Table, Statuses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(PollVotes::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(PollVotes::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(PollVotes::PollId).string_len(32).not_null())
                    .col(ColumnDef::new(PollVotes::AccountId).string_len(32).not_null())
                    .col(ColumnDef::new(PollVotes::Choice).integer().not_null())
                    .col(
                        ColumnDef::new(PollVotes::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_poll_votes_poll")
                            .from(PollVotes::Table, PollVotes::PollId)
                            .to(Polls::Table, Polls::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_poll_votes_poll_account")
                    .table(PollVotes::Table)
                    .col(PollVotes::PollId)
                    .col(PollVotes::AccountId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(PollVotes::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Polls::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(ConversationMutes::Table).to_owned())
            .await?;
        for table in [
            Interactions::StatusPins,
            Interactions::Bookmarks,
            Interactions::Favourites,
        ] {
            manager
                .drop_table(Table::drop().table(table).to_owned())
                .await?;
        }
        manager
            .drop_table(Table::drop().table(Mentions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Statuses::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Applications::Table).to_owned())
            .await
    }
}

#[derive(Iden, Clone, Copy)]
enum Statuses {
    Table,
    Id,
    AccountId,
    Uri,
    Url,
    Text,
    SpoilerText,
    Visibility,
    Searchability,
    Local,
    LocalOnly,
    InReplyToId,
    InReplyToAccountId,
    ReblogOfId,
    ConversationId,
    PollId,
    ApplicationId,
    CreatedAt,
    UpdatedAt,
    EditedAt,
    DeletedAt,
}

#[derive(Iden)]
enum Applications {
    Table,
    Id,
    Name,
    Website,
    CreatedAt,
}

#[derive(Iden)]
enum Mentions {
    Table,
    Id,
    StatusId,
    AccountId,
    Silent,
}

#[derive(Iden, Clone, Copy)]
enum Interactions {
    Favourites,
    Bookmarks,
    StatusPins,
    Id,
    AccountId,
    StatusId,
    CreatedAt,
}

#[derive(Iden)]
enum ConversationMutes {
    Table,
    Id,
    AccountId,
    ConversationId,
}

#[derive(Iden)]
enum Polls {
    Table,
    Id,
    StatusId,
    AccountId,
    Options,
    CachedTallies,
    Multiple,
    VotesCount,
    VotersCount,
    ExpiresAt,
    CreatedAt,
}

#[derive(Iden)]
enum PollVotes {
    Table,
    Id,
    PollId,
    AccountId,
    Choice,
    CreatedAt,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
}
