use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::distrito;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "nucleo")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub distrito_id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub address: Option<String>,
    pub status: String,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Distrito,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Distrito => Entity::belongs_to(distrito::Entity)
                .from(Column::DistritoId)
                .to(distrito::Column::Id)
                .into(),
        }
    }
}

impl Related<distrito::Entity> for Entity {
    fn to() -> RelationDef { Relation::Distrito.def() }
}

impl ActiveModelBehavior for ActiveModel {}

crate::soft_state!("nucleo");
