//! Usuario entity - Represents the registered users of the system.
//!
//! Each usuario has personal data (name, surname, locality, age), a role,
//! a unique `cedula` (national ID) and a soft-delete flag. Lunchboxes and
//! orders reference their owning usuario.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Role of a usuario within the system.
#[derive(Debug, Clone, Copy, PartialEq, Eq, EnumIter, DeriveActiveEnum, Serialize, Deserialize)]
#[sea_orm(rs_type = "String", db_type = "String(StringLen::N(8))")]
pub enum RolUsuario {
    /// Parent account, owner of lunchboxes and orders
    #[sea_orm(string_value = "Padre")]
    Padre,
    /// Child account
    #[sea_orm(string_value = "Hijo")]
    Hijo,
}

/// Usuario database model
#[derive(Clone, Debug, PartialEq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "usuarios")]
pub struct Model {
    /// Unique identifier for the usuario
    #[sea_orm(primary_key)]
    pub id: i64,
    /// First name
    pub nombre: String,
    /// Last name
    pub apellido: String,
    /// Locality of residence
    pub localidad: String,
    /// Age in years, valid range 1 to 120
    pub edad: i32,
    /// Role: `Padre` or `Hijo`
    pub rol: RolUsuario,
    /// National ID, unique across all usuarios (active or not)
    #[sea_orm(unique)]
    pub cedula: String,
    /// Soft delete flag - if false, the usuario is hidden but data is preserved
    pub is_active: bool,
    /// When the usuario was created
    pub fecha_creacion: DateTimeUtc,
    /// When the usuario was last modified, None if never updated
    pub fecha_modificacion: Option<DateTimeUtc>,
}

/// Defines relationships between Usuario and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// One usuario has at most one perfil
    #[sea_orm(has_one = "super::perfil::Entity")]
    Perfil,
    /// One usuario has many loncheras
    #[sea_orm(has_many = "super::lonchera::Entity")]
    Loncheras,
    /// One usuario has many pedidos
    #[sea_orm(has_many = "super::pedido::Entity")]
    Pedidos,
}

impl Related<super::perfil::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Perfil.def()
    }
}

impl Related<super::lonchera::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Loncheras.def()
    }
}

impl Related<super::pedido::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Pedidos.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
