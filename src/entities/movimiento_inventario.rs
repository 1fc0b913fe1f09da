//! `MovimientoInventario` entity - Immutable ledger of alimento stock changes.
//!
//! Every stock mutation records the stock before and after the movement, so
//! `alimentos.stock_actual` always equals the `stock_nuevo` of the latest
//! movement for that alimento.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Kind of inventory movement.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum TipoMovimiento {
    /// Stock received: adds the absolute quantity
    #[sea_orm(string_value = "Entrada")]
    Entrada,
    /// Stock dispatched: subtracts the absolute quantity
    #[sea_orm(string_value = "Salida")]
    Salida,
    /// Manual correction: sets the stock to the given quantity
    #[sea_orm(string_value = "Ajuste")]
    Ajuste,
}

/// Inventory movement model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "movimientos_inventario")]
pub struct Model {
    /// Unique identifier for the movimiento
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Alimento whose stock changed
    pub alimento_id: i64,
    /// Kind of movement: `Entrada`, `Salida` or `Ajuste`
    pub tipo_movimiento: TipoMovimiento,
    /// Quantity as submitted by the caller
    pub cantidad: i32,
    /// Optional reason, up to 200 characters
    pub motivo: Option<String>,
    /// When the movement happened
    pub fecha: DateTimeUtc,
    /// Stock before the movement
    pub stock_anterior: i32,
    /// Stock after the movement, never negative
    pub stock_nuevo: i32,
    /// Usuario who performed the movement, if known
    pub usuario_id: Option<i64>,
}

/// Defines relationships between the movimiento and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each movimiento belongs to one alimento
    #[sea_orm(
        belongs_to = "super::alimento::Entity",
        from = "Column::AlimentoId",
        to = "super::alimento::Column::Id"
    )]
    Alimento,
    /// The usuario reference survives usuario deletion as NULL
    #[sea_orm(
        belongs_to = "super::usuario::Entity",
        from = "Column::UsuarioId",
        to = "super::usuario::Column::Id",
        on_delete = "SetNull"
    )]
    Usuario,
}

impl Related<super::alimento::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Alimento.def()
    }
}

impl Related<super::usuario::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Usuario.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
