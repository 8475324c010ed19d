use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::grupo_contable;

/// Width of the numeric suffix in `{grupo}.{nnnn}`.
pub const CODE_WIDTH: usize = 4;

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "auxiliar")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    pub grupo_contable_id: Uuid,
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
    GrupoContable,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::GrupoContable => Entity::belongs_to(grupo_contable::Entity)
                .from(Column::GrupoContableId)
                .to(grupo_contable::Column::Id)
                .into(),
        }
    }
}

impl Related<grupo_contable::Entity> for Entity {
    fn to() -> RelationDef { Relation::GrupoContable.def() }
}

impl ActiveModelBehavior for ActiveModel {}

crate::soft_state!("auxiliar");

pub fn code_prefix(grupo_code: &str) -> String {
    format!("{grupo_code}.")
}
