//! Alimento entity - Represents a food item available for lunchbox composition.
//!
//! Nutritional values are stored per 100 grams; `precio_unitario` is the price
//! of a 100 gram portion. `stock_actual` is only modified through inventory
//! movements so the movement ledger stays consistent with the stored stock.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Category of an alimento.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(16))")]
pub enum CategoriaAlimento {
    /// Fruits
    #[sea_orm(string_value = "Frutas")]
    Frutas,
    /// Vegetables
    #[sea_orm(string_value = "Vegetales")]
    Vegetales,
    /// Proteins
    #[sea_orm(string_value = "Proteínas")]
    #[serde(rename = "Proteínas")]
    Proteinas,
    /// Dairy
    #[sea_orm(string_value = "Lácteos")]
    #[serde(rename = "Lácteos")]
    Lacteos,
    /// Cereals
    #[sea_orm(string_value = "Cereales")]
    Cereales,
    /// Snacks
    #[sea_orm(string_value = "Snacks")]
    Snacks,
    /// Drinks
    #[sea_orm(string_value = "Bebidas")]
    Bebidas,
}

/// Alimento database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "alimentos")]
pub struct Model {
    /// Unique identifier for the alimento
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Human-readable name, unique across all alimentos
    pub nombre: String,
    /// Category for filtering and inventory breakdowns
    pub categoria: CategoriaAlimento,
    /// Calories per 100 grams
    pub calorias_por_100g: f64,
    /// Protein grams per 100 grams
    pub proteinas_por_100g: f64,
    /// Carbohydrate grams per 100 grams
    pub carbohidratos_por_100g: f64,
    /// Fat grams per 100 grams
    pub grasas_por_100g: f64,
    /// Price of a 100 gram portion
    pub precio_unitario: f64,
    /// Current stock; never negative, updated only via inventory movements
    pub stock_actual: i32,
    /// Soft delete flag - if false, the alimento is hidden but data is preserved
    pub is_active: bool,
    /// When the alimento was created
    pub fecha_creacion: DateTimeUtc,
}

/// Defines relationships between Alimento and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One alimento appears in many lunchbox associations
    #[sea_orm(has_many = "super::lonchera_alimento::Entity")]
    LoncheraAlimentos,
    /// One alimento appears in many restriction associations
    #[sea_orm(has_many = "super::restriccion_alimento::Entity")]
    RestriccionAlimentos,
    /// One alimento has many inventory movements
    #[sea_orm(has_many = "super::movimiento_inventario::Entity")]
    Movimientos,
}

impl Related<super::lonchera_alimento::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::LoncheraAlimentos.def()
    }
}

impl Related<super::restriccion_alimento::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::RestriccionAlimentos.def()
    }
}

impl Related<super::movimiento_inventario::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Movimientos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
