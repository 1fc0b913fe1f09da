//! Pedido entity - An order of productos placed by a usuario.
//!
//! `total` is a derived value: the sum of all line subtotals, recomputed after
//! every line change. `estado` follows the order state machine
//! (Pendiente → Confirmado → Entregado, with cancellation before delivery).

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Lifecycle state of a pedido.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum EstadoPedido {
    /// Open for line changes; stock not yet reserved
    #[sea_orm(string_value = "Pendiente")]
    Pendiente,
    /// Stock validated and decremented; awaiting delivery
    #[sea_orm(string_value = "Confirmado")]
    Confirmado,
    /// Delivered; terminal state
    #[sea_orm(string_value = "Entregado")]
    Entregado,
    /// Cancelled; terminal state
    #[sea_orm(string_value = "Cancelado")]
    Cancelado,
}

/// Pedido database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "pedidos")]
pub struct Model {
    /// Unique identifier for the pedido
    #[sea_orm(primary_key)]
    pub id: i64,
    /// When the pedido was placed
    pub fecha: DateTimeUtc,
    /// Usuario who placed the pedido
    pub usuario_id: i64,
    /// Sum of all line subtotals
    pub total: f64,
    /// Current lifecycle state
    pub estado: EstadoPedido,
}

/// Defines relationships between Pedido and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each pedido belongs to exactly one usuario
    #[sea_orm(
        belongs_to = "super::usuario::Entity",
        from = "Column::UsuarioId",
        to = "super::usuario::Column::Id"
    )]
    Usuario,
    /// One pedido has many order lines
    #[sea_orm(has_many = "super::pedido_producto::Entity")]
    Productos,
}

impl Related<super::usuario::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Usuario.def()
    }
}

impl Related<super::pedido_producto::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Productos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
