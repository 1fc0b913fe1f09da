//! `LoncheraAlimento` entity - Join table associating alimentos to a lonchera
//! with the portion weight in grams. The composite primary key guarantees at
//! most one association per (lonchera, alimento) pair.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lonchera-alimento association model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "lonchera_alimentos")]
pub struct Model {
    /// Lonchera side of the association
    #[sea_orm(primary_key, auto_increment = false)]
    pub lonchera_id: i64,
    /// Alimento side of the association
    #[sea_orm(primary_key, auto_increment = false)]
    pub alimento_id: i64,
    /// Portion weight in grams, always greater than zero
    pub cantidad_gramos: f64,
}

/// Defines relationships between the association and its endpoints
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each association belongs to one lonchera
    #[sea_orm(
        belongs_to = "super::lonchera::Entity",
        from = "Column::LoncheraId",
        to = "super::lonchera::Column::Id",
        on_delete = "Cascade"
    )]
    Lonchera,
    /// Each association belongs to one alimento
    #[sea_orm(
        belongs_to = "super::alimento::Entity",
        from = "Column::AlimentoId",
        to = "super::alimento::Column::Id",
        on_delete = "Cascade"
    )]
    Alimento,
}

impl Related<super::lonchera::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Lonchera.def()
    }
}

impl Related<super::alimento::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Alimento.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
