use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ambiente;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "cargo")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub ambiente_id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub status: String,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Ambiente,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Ambiente => Entity::belongs_to(ambiente::Entity)
                .from(Column::AmbienteId)
                .to(ambiente::Column::Id)
                .into(),
        }
    }
}

impl Related<ambiente::Entity> for Entity {
    fn to() -> RelationDef { Relation::Ambiente.def() }
}

impl ActiveModelBehavior for ActiveModel {}

crate::soft_state!("cargo");
