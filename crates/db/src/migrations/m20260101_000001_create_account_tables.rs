//! Create accounts and account relationship tables.

use sea_orm_migration::prelude::*;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Accounts::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(Accounts::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(ColumnDef::new(Accounts::Username).string_len(128).not_null())
                    .col(ColumnDef::new(Accounts::Domain).string_len(256))
                    .col(ColumnDef::new(Accounts::Uri).string_len(512))
                    .col(ColumnDef::new(Accounts::Url).string_len(512))
                    .col(ColumnDef::new(Accounts::InboxUrl).string_len(512))
                    .col(ColumnDef::new(Accounts::SharedInboxUrl).string_len(512))
                    .col(
                        ColumnDef::new(Accounts::Protocol)
                            .string_len(16)
                            .not_null()
                            .default("activitypub"),
                    )
                    .col(
                        ColumnDef::new(Accounts::ActorType)
                            .string_len(16)
                            .not_null()
                            .default("Person"),
                    )
                    .col(
                        ColumnDef::new(Accounts::Locked)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Accounts::Suspended)
                            .boolean()
                            .not_null()
                            .default(false),
                    )
                    .col(
                        ColumnDef::new(Accounts::ShowApplication)
                            .boolean()
                            .not_null()
                            .default(true),
                    )
                    .col(
                        ColumnDef::new(Accounts::ReactionPolicy)
                            .string_len(16)
                            .not_null()
                            .default("allow"),
                    )
                    .col(
                        ColumnDef::new(Accounts::ExcludeTimelineDomains)
                            .json_binary()
                            .not_null()
                            .default(Expr::cust("'[]'::jsonb")),
                    )
                    .col(
                        ColumnDef::new(Accounts::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .col(ColumnDef::new(Accounts::UpdatedAt).timestamp_with_time_zone())
                    .to_owned(),
            )
            .await?;

        // Unique index: (username, domain)
        manager
            .create_index(
                Index::create()
                    .name("idx_accounts_username_domain")
                    .table(Accounts::Table)
                    .col(Accounts::Username)
                    .col(Accounts::Domain)
                    .unique()
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_accounts_domain")
                    .table(Accounts::Table)
                    .col(Accounts::Domain)
                    .to_owned(),
            )
            .await?;

        for (table, name) in [(Follows::Table, "follows"), (Follows::BlocksTable, "blocks")] {
            manager
                .create_table(
                    Table::create()
                        .table(table)
                        .if_not_exists()
                        .col(
                            ColumnDef::new(Follows::Id)
                                .string_len(32)
                                .not_null()
                                .primary_key(),
                        )
                        .col(ColumnDef::new(Follows::AccountId).string_len(32).not_null())
                        .col(
                            ColumnDef::new(Follows::TargetAccountId)
                                .string_len(32)
                                .not_null(),
                        )
                        .col(
                            ColumnDef::new(Follows::CreatedAt)
                                .timestamp_with_time_zone()
                                .not_null()
                                .default(Expr::current_timestamp()),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name(format!("fk_{name}_account"))
                                .from(table, Follows::AccountId)
                                .to(Accounts::Table, Accounts::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .foreign_key(
                            ForeignKey::create()
                                .name(format!("fk_{name}_target_account"))
                                .from(table, Follows::TargetAccountId)
                                .to(Accounts::Table, Accounts::Id)
                                .on_delete(ForeignKeyAction::Cascade),
                        )
                        .to_owned(),
                )
                .await?;

            // Unique index: one relationship per pair
            manager
                .create_index(
                    Index::create()
                        .name(format!("idx_{name}_account_target"))
                        .table(table)
                        .col(Follows::AccountId)
                        .col(Follows::TargetAccountId)
                        .unique()
                        .to_owned(),
                )
                .await?;

            // Index: target_account_id (follower / blocker lookups)
            manager
                .create_index(
                    Index::create()
                        .name(format!("idx_{name}_target_account_id"))
                        .table(table)
                        .col(Follows::TargetAccountId)
                        .to_owned(),
                )
                .await?;
        }

        manager
            .create_table(
                Table::create()
                    .table(AccountDomainBlocks::Table)
                    .if_not_exists()
                    .col(
                        ColumnDef::new(AccountDomainBlocks::Id)
                            .string_len(32)
                            .not_null()
                            .primary_key(),
                    )
                    .col(
                        ColumnDef::new(AccountDomainBlocks::AccountId)
                            .string_len(32)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountDomainBlocks::Domain)
                            .string_len(256)
                            .not_null(),
                    )
                    .col(
                        ColumnDef::new(AccountDomainBlocks::CreatedAt)
                            .timestamp_with_time_zone()
                            .not_null()
                            .default(Expr::current_timestamp()),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_account_domain_blocks_account")
                            .from(AccountDomainBlocks::Table, AccountDomainBlocks::AccountId)
                            .to(Accounts::Table, Accounts::Id)
                            .on_delete(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await?;

        manager
            .create_index(
                Index::create()
                    .name("idx_account_domain_blocks_account_domain")
                    .table(AccountDomainBlocks::Table)
                    .col(AccountDomainBlocks::AccountId)
                    .col(AccountDomainBlocks::Domain)
                    .unique()
                    .to_owned(),
            )
            .await?;

        Ok(())
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .drop_table(Table::drop().table(AccountDomainBlocks::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Follows::BlocksTable).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Follows::Table).to_owned())
            .await?;
        manager
            .drop_table(Table::drop().table(Accounts::Table).to_owned())
            .await
    }
}

#[derive(Iden)]
enum Accounts {
    Table,
    Id,
    Username,
    Domain,
    Uri,
    Url,
    InboxUrl,
    SharedInboxUrl,
    Protocol,
    ActorType,
    Locked,
    Suspended,
    ShowApplication,
    ReactionPolicy,
    ExcludeTimelineDomains,
    CreatedAt,
    UpdatedAt,
}

/// Follows and blocks share a layout.
#[derive(Iden, Clone, Copy)]
enum Follows {
    Table,
    #[iden = "blocks"]
    BlocksTable,
    Id,
    AccountId,
    TargetAccountId,
    CreatedAt,
}

#[derive(Iden)]
enum AccountDomainBlocks {
    Table,
    Id,
    AccountId,
    Domain,
    CreatedAt,
}
