//! Perfil entity - Optional profile data attached one-to-one to a usuario.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Perfil database model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "perfiles")]
pub struct Model {
    /// Unique identifier for the perfil
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Owning usuario; at most one perfil per usuario
    #[sea_orm(unique)]
    pub usuario_id: i64,
    /// Free-form biography, up to 500 characters
    pub bio: Option<String>,
    /// Contact phone number, up to 20 characters
    pub telefono: Option<String>,
    /// URL of the profile picture
    pub foto_url: Option<String>,
}

/// Defines relationships between Perfil and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// Each perfil belongs to exactly one usuario
    #[sea_orm(
        belongs_to = "super::usuario::Entity",
        from = "Column::UsuarioId",
        to = "super::usuario::Column::Id"
    )]
    Usuario,
}

impl Related<super::usuario::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::Usuario.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
