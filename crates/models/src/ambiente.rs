use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::area;

/// Width of the numeric suffix in `{area}.{nnn}`.
pub const CODE_WIDTH: usize = 3;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "ambiente")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub area_id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub floor: Option<String>,
    pub description: Option<String>,
    pub status: String,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Area,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Area => Entity::belongs_to(area::Entity)
                .from(Column::AreaId)
                .to(area::Column::Id)
                .into(),
        }
    }
}

impl Related<area::Entity> for Entity {
    fn to() -> RelationDef { Relation::Area.def() }
}

impl ActiveModelBehavior for ActiveModel {}

crate::soft_state!("ambiente");

pub fn code_prefix(area_code: &str) -> String {
    format!("{area_code}.")
}
