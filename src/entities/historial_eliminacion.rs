//! `HistorialEliminacion` entity - Audit trail of hard-deleted records.
//!
//! `datos_json` holds the full JSON serialization of the deleted row, so an
//! audit entry can be decoded back into the original field values. Rows are
//! never updated once written.

use sea_orm::entity::prelude::*;
use serde::{Deserialize, Serialize};

/// Deletion audit model
#[derive(Clone, Debug, PartialEq, Eq, DeriveEntityModel, Serialize, Deserialize)]
#[sea_orm(table_name = "historial_eliminaciones")]
pub struct Model {
    /// Unique identifier for the audit entry
    #[sea_orm(primary_key)]
    pub id: i64,
    /// Table the deleted record belonged to (e.g. `"usuarios"`)
    pub tabla_nombre: String,
    /// Primary key the deleted record had
    pub registro_id: i64,
    /// JSON snapshot of the deleted row
    #[sea_orm(column_type = "Text")]
    pub datos_json: String,
    /// Optional reason given by the caller, up to 500 characters
    pub motivo: Option<String>,
    /// When the deletion happened
    pub fecha_eliminacion: DateTimeUtc,
    /// Usuario who performed the deletion, if known
    pub usuario_eliminador_id: Option<i64>,
}

/// Defines relationships between the audit entry and other entities
#[derive(Copy, Clone, Debug, EnumIter, DeriveRelation)]
pub enum Relation {
    /// The deleting usuario reference survives usuario deletion as NULL
    #[sea_orm(
        belongs_to = "super::usuario::Entity",
        from = "Column::UsuarioEliminadorId",
        to = "super::usuario::Column::Id",
        on_delete = "SetNull"
    )]
    UsuarioEliminador,
}

impl Related<super::usuario::Entity> for Entity {
    fn to() -> RelationDef {
        Relation::UsuarioEliminador.def()
    }
}

impl ActiveModelBehavior for ActiveModel {}
