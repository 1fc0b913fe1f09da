//! `PedidoProducto` entity - Join table holding the lines of a pedido.
//!
//! `precio_unitario` is captured from the producto at the moment the line is
//! created, so later price changes never alter an existing order.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Pedido line model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pedido_productos")]
pub struct Model {
    /// Pedido side of the line
    #[sea_orm(primary_key, auto_increment = false)]
    pub pedido_id: i64,
    /// Producto side of the line
    #[sea_orm(primary_key, auto_increment = false)]
    pub producto_id: i64,
    /// Ordered quantity, at least 1
    pub cantidad: i32,
    /// Price per unit captured at order time
    pub precio_unitario: f64,
    /// `cantidad` times `precio_unitario`
    pub subtotal: f64,
}

/// Defines relationships between the line and its endpoints
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each line belongs to one pedido
    #[sea_orm(
        belongs_to = "super::pedido::Entity",
        from = "Column::PedidoId",
        to = "super::pedido::Column::Id",
        on_delete = "Cascade"
    )]
    Pedido,
    /// Each line belongs to one producto
    #[sea_orm(
        belongs_to = "super::producto::Entity",
        from = "Column::ProductoId",
        to = "super::producto::Column::Id"
    )]
    Producto,
}

impl Related<super::pedido::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pedido.def()
    }
}

impl Related<super::producto::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Producto.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
