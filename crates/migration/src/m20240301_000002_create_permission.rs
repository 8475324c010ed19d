//! Create `permission` catalog and the `role_permission` join table.
use sea_orm_migration::{prelude::*, schema::*};

#[derive(DeriveMigrationName)]
pub struct Migration;

#[async_trait::async_trait]
impl MigrationTrait for Migration {
    async fn up(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager
            .create_table(
                Table::create()
                    .table(Permission::Table)
                    .if_not_exists()
                    .col(uuid(Permission::Id).primary_key())
                    .col(string_len(Permission::Code, 64).unique_key().not_null())
                    .col(string_len(Permission::Module, 64).not_null())
                    .col(string_len(Permission::Description, 255).not_null())
                    .col(timestamp_with_time_zone(Permission::CreatedAt).not_null())
                    .to_owned(),
            )
            .await?;

        manager
            .create_table(
                Table::create()
                    .table(RolePermission::Table)
                    .if_not_exists()
                    .col(uuid(RolePermission::RoleId).not_null())
                    .col(uuid(RolePermission::PermissionId).not_null())
                    .primary_key(
                        Index::create()
                            .col(RolePermission::RoleId)
                            .col(RolePermission::PermissionId),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_role_permission_role")
                            .from(RolePermission::Table, RolePermission::RoleId)
                            .to(Role::Table, Role::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .foreign_key(
                        ForeignKey::create()
                            .name("fk_role_permission_permission")
                            .from(RolePermission::Table, RolePermission::PermissionId)
                            .to(Permission::Table, Permission::Id)
                            .on_delete(ForeignKeyAction::Cascade)
                            .on_update(ForeignKeyAction::Cascade),
                    )
                    .to_owned(),
            )
            .await
    }

    async fn down(&self, manager: &SchemaManager) -> Result<(), DbErr> {
        manager.drop_table(Table::drop().table(RolePermission::Table).to_owned()).await?;
        manager.drop_table(Table::drop().table(Permission::Table).to_owned()).await
    }
}

#[derive(DeriveIden)]
enum Permission { Table, Id, Code, Module, Description, CreatedAt }

#[derive(DeriveIden)]
enum RolePermission { Table, RoleId, PermissionId }

#[derive(DeriveIden)]
enum Role { Table, Id }
