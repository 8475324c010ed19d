//! Create `user` (FK to `role`, optional FK to `personal`) and `user_credentials`.
use sea_orm_migration::{prelude::*, schema::*};

use crate::columns::audit_columns;

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        let mut user = Table::create();
        user
            .table(User::Table)
            .if_not_exists()
            .col(uuid(User::Id).primary_key())
            .col(string_len(User::Username, 64).unique_key().not_null())
            .col(ColumnDef::new(User::Email).string_len(255).null())
            .col(string_len(User::FullName, 255).not_null())
            .col(uuid(User::RoleId).not_null())
            .col(ColumnDef::new(User::PersonalId).uuid().null())
            .col(ColumnDef::new(User::LastLoginAt).timestamp_with_time_zone().null())
            .foreign_key(
                ForeignKey::create()
                    .name("fk_user_role")
                    .from(User::Table, User::RoleId)
                    .to(Role::Table, Role::Id)
                    .on_delete(ForeignKeyAction::Restrict)
                    .on_update(ForeignKeyAction::Cascade),
            )
            .foreign_key(
                ForeignKey::create()
                    .name("fk_user_personal")
                    .from(User::Table, User::PersonalId)
                    .to(Personal::Table, Personal::Id)
                    .on_delete(ForeignKeyAction::SetNull)
                    .on_update(ForeignKeyAction::Cascade),
            );
        audit_columns(&mut user);
        manager.create_table(user.to_owned()).await?;

        manager
            .create_table(
                Table::create()
                    .table(UserCredentials::Table)
                    .if_not_exists()
                    .col(uuid(UserCredentials::Id).primary_key())
                    .col(uuid(UserCredentials::UserId).unique_key().not_null())
                    .col(string_len(UserCredentials::PasswordHash, 255).not_null())
                    .col(string_len(UserCredentials::PasswordAlgorithm, 32).not_null())
                    .col(timestamp_with_time_zone(UserCredentials::CreatedAt).not_null())
                    .col(timestamp_with_time_zone(UserCredentials::UpdatedAt).not_null())
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_user_credentials_user")
                            .from(UserCredentials::Table, UserCredentials::UserId)
                            .to(User::Table, User::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(UserCredentials::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(User::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum User { Table, Id, Username, Email, FullName, RoleId, PersonalId, LastLoginAt }

#[derive(DeriveIden)]
enum UserCredentials { Table, Id, UserId, PasswordHash, PasswordAlgorithm, CreatedAt, UpdatedAt }

#[derive(DeriveIden)]
enum Role { Table, Id }

#[derive(DeriveIden)]
enum Personal { Table, Id }
