//! Lonchera entity - A lunchbox composed of weighted food portions.
//!
//! `calorias` and `precio` are derived totals: they are recomputed from the
//! current `lonchera_alimento` associations after every association change.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lonchera database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "loncheras")]
pub struct Model {
    /// Unique identifier for the lonchera
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name, 1 to 100 characters
    pub nombre: String,
    /// Optional free-form description
    pub descripcion: Option<String>,
    /// Total calories, recomputed from associated alimentos (rounded)
    pub calorias: i32,
    /// Total price, recomputed from associated alimentos (2 decimals)
    pub precio: f64,
    /// Owning usuario
    pub usuario_id: i64,
    /// When the lonchera was created
    pub fecha_creacion: DateTimeUtc,
    /// Soft delete flag - if false, the lonchera is hidden but data is preserved
    pub is_active: bool,
}

/// Defines relationships between Lonchera and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each lonchera belongs to exactly one usuario
    #[sea_orm(
        belongs_to = "super::usuario::Entity",
        from = "Column::UsuarioId",
        to = "super::usuario::Column::Id"
    )]
    Usuario,
    /// One lonchera has many alimento associations
    #[sea_orm(has_many = "super::lonchera_alimento::Entity")]
    Alimentos,
}

impl Related<super::usuario::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Usuario.def()
    }
}

impl Related<super::lonchera_alimento::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Alimentos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
