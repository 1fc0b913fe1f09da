//! Restriccion entity - A dietary restriction or allergy with a severity level.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Severity level of a restriction.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum NivelSeveridad {
    /// Low severity
    #[sea_orm(string_value = "Bajo")]
    Bajo,
    /// Medium severity
    #[sea_orm(string_value = "Medio")]
    Medio,
    /// High severity (e.g. anaphylactic allergies)
    #[sea_orm(string_value = "Alto")]
    Alto,
}

/// Restriccion database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "restricciones")]
pub struct Model {
    /// Unique identifier for the restriccion
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name, unique across all restricciones
    #[sea_orm(unique)]
    pub nombre: String,
    /// Optional free-form description
    pub descripcion: Option<String>,
    /// Severity level: `Bajo`, `Medio` or `Alto`
    pub nivel_severidad: NivelSeveridad,
    /// When the restriccion was created
    pub fecha_creacion: DateTimeUtc,
}

/// Defines relationships between Restriccion and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One restriccion restricts many alimentos through the association table
    #[sea_orm(has_many = "super::restriccion_alimento::Entity")]
    Alimentos,
}

impl Related<super::restriccion_alimento::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Alimentos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
