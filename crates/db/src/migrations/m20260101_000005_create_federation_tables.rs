//! Create relay, instance info, domain block and friend server tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Relays::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Relays::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(Relays::InboxUrl)
                            .string_len(512)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(Relays::Enabled)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Relays::CreatedAt)
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
                    .table(InstanceInfos::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(InstanceInfos::Domain)
                            .string_len(256)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(InstanceInfos::Software)
                            .string_len(64)
                            .not_null(),
                    )
                    .col(ColumnDef::new(InstanceInfos::Version).string_len(64))
                    .col(
                        ColumnDef::new(InstanceInfos::UpdatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        // Index: software (incompatible software lookups)
        manager
            .create_index(
                Index::create()
                    .name("idx_instance_infos_software")
                    .table(InstanceInfos::Table)
                    .col(InstanceInfos::Software)
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(DomainBlocks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(DomainBlocks::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(DomainBlocks::Domain)
                            .string_len(256)
                            .not_null()
                            .unique_key(),
                    )
                    .col(
                        ColumnDef::new(DomainBlocks::Severity)
                            .string_len(16)
                            .not_null()
                            .default("silence"),
                    )
                    .col(
                        ColumnDef::new(DomainBlocks::DetectInvalidSubscription)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(DomainBlocks::CreatedAt)
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
                    .table(FriendDomains::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(FriendDomains::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(FriendDomains::Domain)
                            .string_len(256)
                            .not_null()
                            .unique_key(),
                    )
                    .col(ColumnDef::new(FriendDomains::InboxUrl).string_len(512))
                    .col(
                        ColumnDef::new(FriendDomains::ActiveState)
                            .string_len(16)
                            .not_null()
                            .default("idle"),
                    )
                    .col(
                        ColumnDef::new(FriendDomains::PassiveState)
                            .string_len(16)
                            .not_null()
                            .default("idle"),
                    )
                    .col(
                        ColumnDef::new(FriendDomains::Available)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(FriendDomains::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(FriendDomains::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(DomainBlocks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(InstanceInfos::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Relays::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Relays {
    Table,
    Id,
    InboxUrl,
    Enabled,
    CreatedAt,
}

#[derive(Iden)]
enum InstanceInfos {
    Table,
    Domain,
    Software,
    Version,
    UpdatedAt,
}

#[derive(Iden)]
enum DomainBlocks {
    Table,
    Id,
    Domain,
    Severity,
    DetectInvalidSubscription,
    CreatedAt,
}

#[derive(Iden)]
enum FriendDomains {
    Table,
    Id,
    Domain,
    InboxUrl,
    ActiveState,
    PassiveState,
    Available,
    CreatedAt,
}
