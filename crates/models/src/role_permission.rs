use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{permission, role};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "role_permission")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub role_id: Uuid,
    #[sea_orm(primary_key, auto_increment = false)]
    pub permission_id: Uuid,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Role,
    Permission,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Role => Entity::belongs_to(role::Entity)
                .from(Column::RoleId)
                .to(role::Column::Id)
                .into(),
            Relation::Permission => Entity::belongs_to(permission::Entity)
                .from(Column::PermissionId)
                .to(permission::Column::Id)
                .into(),
        }
    }
}

impl Related<permission::Entity> for Entity {
    fn to() -> RelationDef { Relation::Permission.def() }
}

impl ActiveModelBehavior for ActiveModel {}
