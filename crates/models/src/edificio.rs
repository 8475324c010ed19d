use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

use crate::errors::ModelError;
use crate::{auxiliar, nucleo, unidad_organizacional};

#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "edificio")]
pub struct Model {
    #[sea_orm(primary_key, auto_increment = false)]
    pub id: Uuid,
    #[sea_orm(unique)]
    pub code: String,
    pub name: String,
    pub address: String,
    pub nucleo_id: Uuid,
    pub auxiliar_id: Uuid,
    pub unidad_organizacional_id: Uuid,
    pub acquisition_date: Date,
    pub acquisition_value: f64,
    pub land_surface_m2: f64,
    pub built_surface_m2: f64,
    pub floors: i32,
    pub deed_number: Option<String>,
    pub notes: Option<String>,
    pub status: String,
    pub created_by: Option<Uuid>,
    pub updated_by: Option<Uuid>,
    pub created_at: DateTimeWithTimeZone,
    pub updated_at: DateTimeWithTimeZone,
}

#[derive(Copy, Clone, Debug, EnumIter)]
pub enum Relation {
    Nucleo,
    Auxiliar,
    UnidadOrganizacional,
}

impl RelationTrait for Relation {
    fn def(&self) -> RelationDef {
        match self {
            Relation::Nucleo => Entity::belongs_to(nucleo::Entity)
                .from(Column::NucleoId)
                .to(nucleo::Column::Id)
                .into(),
            Relation::Auxiliar => Entity::belongs_to(auxiliar::Entity)
                .from(Column::AuxiliarId)
                .to(auxiliar::Column::Id)
                .into(),
            Relation::UnidadOrganizacional => Entity::belongs_to(unidad_organizacional::Entity)
                .from(Column::UnidadOrganizacionalId)
                .to(unidad_organizacional::Column::Id)
                .into(),
        }
    }
}

impl Related<nucleo::Entity> for Entity {
    fn to() -> RelationDef { Relation::Nucleo.def() }
}

impl Related<auxiliar::Entity> for Entity {
    fn to() -> RelationDef { Relation::Auxiliar.def() }
}

impl Related<unidad_organizacional::Entity> for Entity {
    fn to() -> RelationDef { Relation::UnidadOrganizacional.def() }
}

impl ActiveModelBehavior for ActiveModel {}

crate::soft_state!("edificio");

pub fn validate_floors(floors: i32) -> Result<i32, ModelError> {
    if !(1..=200).contains(&floors) {
        return Err(ModelError::validation("floors must be within 1..=200"));
    }
    Ok(floors)
}
