//! `RestriccionAlimento` entity - Join table marking an alimento as
//! incompatible with a restriction. Drives the compatibility search.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Restriccion-alimento association model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "restriccion_alimentos")]
pub struct Model {
    /// Restriccion side of the association
    #[sea_orm(primary_key, auto_increment = false)]
    pub restriccion_id: i64,
    /// Alimento side of the association
    #[sea_orm(primary_key, auto_increment = false)]
    pub alimento_id: i64,
    /// When the association was created
    pub fecha_asociacion: DateTimeUtc,
}

/// Defines relationships between the association and its endpoints
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each association belongs to one restriccion
    #[sea_orm(
        belongs_to = "super::restriccion::Entity",
        from = "Column::RestriccionId",
        to = "super::restriccion::Column::Id",
        on_delete = "Cascade"
    )]
    Restriccion,
    /// Each association belongs to one alimento
    #[sea_orm(
        belongs_to = "super::alimento::Entity",
        from = "Column::AlimentoId",
        to = "super::alimento::Column::Id",
        on_delete = "Cascade"
    )]
    Alimento,
}

impl Related<super::restriccion::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Restriccion.def()
    }
}

impl Related<super::alimento::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Alimento.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
