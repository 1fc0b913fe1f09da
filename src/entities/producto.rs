//! Producto entity - A store product that can be ordered through pedidos.
//!
//! Unlike alimentos, producto stock has no movement ledger; it changes through
//! the stock adjustment endpoint and through order confirmation.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Producto database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "productos")]
pub struct Model {
    /// Unique identifier for the producto
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name
    pub nombre: String,
    /// Optional free-form description
    pub descripcion: Option<String>,
    /// Unit price used to compute order subtotals
    pub precio: f64,
    /// Current stock; never negative
    pub stock_actual: i32,
    /// Soft delete flag - if false, the producto is hidden but data is preserved
    pub is_active: bool,
    /// When the producto was created
    pub fecha_creacion: DateTimeUtc,
}

/// Defines relationships between Producto and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One producto appears in many order lines
    #[sea_orm(has_many = "super::pedido_producto::Entity")]
    PedidoProductos,
}

impl Related<super::pedido_producto::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::PedidoProductos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
