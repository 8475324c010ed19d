use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::edificio;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ampliacion")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub edificio_id: Uuid,
    pub date: Date,
    pub description: String,
    pub added_surface_m2: f64,
    pub value: f64,
    pub document: Option<String>,
    pub status: String,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Edificio,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Edificio => Entity::belongs_to(edificio::Entity)
                .from(Column::EdificioId)
                .to(edificio::Column::Id)
                .into(),
        }
    }
}

impl Related<edificio::Entity> for Entity {
    fn to() -> RelationDef { Relation::Edificio.def() }
}

impl ActiveModelBehavior for ActiveModel {}

crate::soft_state!("ampliacion");
