//! Create custom emoji, emoji reaction and notification tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(CustomEmojis::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(CustomEmojis::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(CustomEmojis::Shortcode)
                            .string_len(128)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CustomEmojis::Domain).string_len(256))
                    .col(ColumnDef::new(CustomEmojis::Uri).string_len(512))
                    .col(
                        ColumnDef::new(CustomEmojis::ImageUrl)
                            .string_len(1024)
                            .not_null(),
                    )
                    .col(ColumnDef::new(CustomEmojis::StaticImageUrl).string_len(1024))
                    .col(
                        ColumnDef::new(CustomEmojis::Disabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(CustomEmojis::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(CustomEmojis::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Unique index: (shortcode, domain)
        manager
            .create_index(
                Index::create()
                    .name("idx_custom_emojis_shortcode_domain")
                    .table(CustomEmojis::Table)
                    .col(CustomEmojis::Shortcode)
                    .col(CustomEmojis::Domain)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(EmojiReactions::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(EmojiReactions::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(EmojiReactions::AccountId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmojiReactions::StatusId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(EmojiReactions::Name)
                            .string_len(256)
                            .not_null()
                            .default(""),
                    )
                    .col(ColumnDef::new(EmojiReactions::CustomEmojiId).string_len(32))
                    .col(ColumnDef::new(EmojiReactions::Uri).string_len(512))
                    .col(
                        ColumnDef::new(EmojiReactions::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(
                        ColumnDef::new(EmojiReactions::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_emoji_reactions_account")
                            .from(EmojiReactions::Table, EmojiReactions::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_emoji_reactions_status")
                            .from(EmojiReactions::Table, EmojiReactions::StatusId)
                            .to(Statuses::Table, Statuses::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_emoji_reactions_custom_emoji")
                            .from(EmojiReactions::Table, EmojiReactions::CustomEmojiId)
                            .to(CustomEmojis::Table, CustomEmojis::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        // Unique index: one reaction per account, status and emoji name
        manager
            .create_index(
                Index::create()
                    .name("idx_emoji_reactions_account_status_name")
                    .table(EmojiReactions::Table)
                    .col(EmojiReactions::AccountId)
                    .col(EmojiReactions::StatusId)
                    .col(EmojiReactions::Name)
                    .unique()
                    .to_owned(),
            )
            .await?;

        // Index: status_id (for grouping reactions on a status)
        manager
            .create_index(
                Index::create()
                    .name("idx_emoji_reactions_status_id")
                    .table(EmojiReactions::Table)
                    .col(EmojiReactions::StatusId)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(Notifications::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Notifications::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Notifications::AccountId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Notifications::FromAccountId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Notifications::ActivityId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Notifications::ActivityType)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Notifications::NotificationType)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(Notifications::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_notifications_account")
                            .from(Notifications::Table, Notifications::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_notifications_account_id")
                    .table(Notifications::Table)
                    .col(Notifications::AccountId)
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(Notifications::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(EmojiReactions::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(CustomEmojis::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum CustomEmojis {
    Table,
    Id,
    Shortcode,
    Domain,
    Uri,
    ImageUrl,
    StaticImageUrl,
    Disabled,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum EmojiReactions {
    Table,
    Id,
    AccountId,
    StatusId,
    Name,
    CustomEmojiId,
    Uri,
    CreatedAt,
    UpdatedAt,
}

#[derive(Iden)]
enum Notifications {
    Table,
    Id,
    AccountId,
    FromAccountId,
    ActivityId,
    ActivityType,
    NotificationType,
    CreatedAt,
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
}

#[derive(Iden)]
enum Statuses {
    Table,
    Id,
}
