use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::ciudad;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "distrito")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub ciudad_id: Uuid,
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
    Ciudad,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Ciudad => Entity::belongs_to(ciudad::Entity)
                .from(Column::CiudadId)
                .to(ciudad::Column::Id)
                .into(),
        }
    }
}

impl Related<ciudad::Entity> for Entity {
    fn to() -> RelationDef { Relation::Ciudad.def() }
}

impl ActiveModelBehavior for ActiveModel {}

crate::soft_state!("distrito");
