use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::unidad_organizacional;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "area")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub unidad_organizacional_id: Uuid,
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
    UnidadOrganizacional,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::UnidadOrganizacional => Entity::belongs_to(unidad_organizacional::Entity)
                .from(Column::UnidadOrganizacionalId)
                .to(unidad_organizacional::Column::Id)
                .into(),
        }
    }
}

impl Related<unidad_organizacional::Entity> for Entity {
    fn to() -> RelationDef { Relation::UnidadOrganizacional.def() }
}

impl ActiveModelBehavior for ActiveModel {}

crate::soft_state!("area");
