//! Usuario business logic - Handles all usuario-related operations.
//!
//! Provides functions for creating, retrieving, updating, soft/hard deleting
//! and reactivating usuarios. Uniqueness of the cedula is checked explicitly
//! before any insert or update so callers get a clean conflict instead of a
//! driver-level constraint error. Hard deletion writes a JSON snapshot of the
//! row to the deletion audit trail and refuses while dependent records exist.

use crate::{
    entities::{Lonchera, Pedido, Perfil, lonchera, pedido, perfil, usuario},
    entities::{Usuario, usuario::RolUsuario},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::Deserialize;

/// Payload for creating a usuario.
#[derive(Debug, Clone, Deserialize)]
pub struct UsuarioCreate {
    /// First name
    pub nombre: String,
    /// Last name
    pub apellido: String,
    /// Locality of residence
    pub localidad: String,
    /// Age in years, 1 to 120
    pub edad: i32,
    /// Role of the usuario
    pub rol: RolUsuario,
    /// National ID, unique across all usuarios
    pub cedula: String,
}

/// Partial update payload for a usuario. Omitted fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct UsuarioUpdate {
    /// New first name
    pub nombre: Option<String>,
    /// New last name
    pub apellido: Option<String>,
    /// New locality
    pub localidad: Option<String>,
    /// New age, 1 to 120
    pub edad: Option<i32>,
    /// New role
    pub rol: Option<RolUsuario>,
    /// New cedula; re-validated for uniqueness
    pub cedula: Option<String>,
}

impl UsuarioUpdate {
    /// True when no field was provided.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nombre.is_none()
            && self.apellido.is_none()
            && self.localidad.is_none()
            && self.edad.is_none()
            && self.rol.is_none()
            && self.cedula.is_none()
    }
}

fn validate_edad(edad: i32) -> Result<()> {
    if !(1..=120).contains(&edad) {
        return Err(Error::invalid_input("La edad debe estar entre 1 y 120"));
    }
    Ok(())
}

/// Creates a new usuario, checking the cedula for uniqueness first.
///
/// The uniqueness check covers inactive usuarios as well, so a soft-deleted
/// usuario still reserves its cedula.
pub async fn create_usuario(
    db: &DatabaseConnection,
    payload: UsuarioCreate,
) -> Result<usuario::Model> {
    if payload.nombre.trim().is_empty() || payload.apellido.trim().is_empty() {
        return Err(Error::invalid_input(
            "El nombre y el apellido no pueden estar vacíos",
        ));
    }
    if payload.cedula.trim().is_empty() {
        return Err(Error::invalid_input("La cédula no puede estar vacía"));
    }
    validate_edad(payload.edad)?;

    let existente = Usuario::find()
        .filter(usuario::Column::Cedula.eq(payload.cedula.trim()))
        .one(db)
        .await?;
    if existente.is_some() {
        return Err(Error::conflict("La cédula ya está registrada"));
    }

    let nuevo = usuario::ActiveModel {
        nombre: Set(payload.nombre.trim().to_string()),
        apellido: Set(payload.apellido.trim().to_string()),
        localidad: Set(payload.localidad.trim().to_string()),
        edad: Set(payload.edad),
        rol: Set(payload.rol),
        cedula: Set(payload.cedula.trim().to_string()),
        is_active: Set(true),
        fecha_creacion: Set(chrono::Utc::now()),
        fecha_modificacion: Set(None),
        ..Default::default()
    };

    nuevo.insert(db).await.map_err(Into::into)
}

/// Retrieves an active usuario by id.
///
/// # Errors
/// Returns `NotFound` when the usuario does not exist or is soft-deleted.
pub async fn get_usuario(db: &DatabaseConnection, usuario_id: i64) -> Result<usuario::Model> {
    let usuario = Usuario::find_by_id(usuario_id).one(db).await?;
    match usuario {
        Some(u) if u.is_active => Ok(u),
        _ => Err(Error::not_found("Usuario no encontrado")),
    }
}

/// Lists usuarios, newest first. Inactive usuarios are hidden unless
/// `incluir_inactivos` is set.
pub async fn list_usuarios(
    db: &DatabaseConnection,
    incluir_inactivos: bool,
) -> Result<Vec<usuario::Model>> {
    let mut query = Usuario::find();
    if !incluir_inactivos {
        query = query.filter(usuario::Column::IsActive.eq(true));
    }
    query
        .order_by_desc(usuario::Column::FechaCreacion)
        .order_by_desc(usuario::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies a partial update to an active usuario and refreshes
/// `fecha_modificacion`.
///
/// # Errors
/// Returns `InvalidInput` for an empty payload, `NotFound` when the usuario
/// is absent or inactive, and `Conflict` when the new cedula is taken.
pub async fn update_usuario(
    db: &DatabaseConnection,
    usuario_id: i64,
    payload: UsuarioUpdate,
) -> Result<usuario::Model> {
    if payload.is_empty() {
        return Err(Error::invalid_input(
            "No se proporcionaron datos para actualizar",
        ));
    }

    let usuario = get_usuario(db, usuario_id).await?;

    if let Some(edad) = payload.edad {
        validate_edad(edad)?;
    }
    if let Some(cedula) = &payload.cedula {
        if cedula.trim().is_empty() {
            return Err(Error::invalid_input("La cédula no puede estar vacía"));
        }
        let en_uso = Usuario::find()
            .filter(usuario::Column::Cedula.eq(cedula.trim()))
            .filter(usuario::Column::Id.ne(usuario_id))
            .one(db)
            .await?;
        if en_uso.is_some() {
            return Err(Error::conflict("La cédula ya está registrada"));
        }
    }

    let mut activo: usuario::ActiveModel = usuario.into();
    if let Some(nombre) = payload.nombre {
        activo.nombre = Set(nombre.trim().to_string());
    }
    if let Some(apellido) = payload.apellido {
        activo.apellido = Set(apellido.trim().to_string());
    }
    if let Some(localidad) = payload.localidad {
        activo.localidad = Set(localidad.trim().to_string());
    }
    if let Some(edad) = payload.edad {
        activo.edad = Set(edad);
    }
    if let Some(rol) = payload.rol {
        activo.rol = Set(rol);
    }
    if let Some(cedula) = payload.cedula {
        activo.cedula = Set(cedula.trim().to_string());
    }
    activo.fecha_modificacion = Set(Some(chrono::Utc::now()));

    activo.update(db).await.map_err(Into::into)
}

/// Soft-deletes a usuario by clearing its active flag. The row and all its
/// dependent records are preserved.
pub async fn soft_delete_usuario(
    db: &DatabaseConnection,
    usuario_id: i64,
) -> Result<usuario::Model> {
    let usuario = Usuario::find_by_id(usuario_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Usuario no encontrado"))?;

    let mut activo: usuario::ActiveModel = usuario.into();
    activo.is_active = Set(false);
    activo.fecha_modificacion = Set(Some(chrono::Utc::now()));
    activo.update(db).await.map_err(Into::into)
}

/// Permanently deletes a usuario, writing a JSON snapshot to the audit trail
/// first.
///
/// # Errors
/// Returns `Conflict` while the usuario still owns a perfil, loncheras or
/// pedidos; those must be removed (or the usuario soft-deleted) first.
pub async fn hard_delete_usuario(
    db: &DatabaseConnection,
    usuario_id: i64,
    motivo: Option<String>,
    usuario_eliminador_id: Option<i64>,
) -> Result<()> {
    let txn = db.begin().await?;

    let usuario = Usuario::find_by_id(usuario_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Usuario no encontrado"))?;

    let perfiles = Perfil::find()
        .filter(perfil::Column::UsuarioId.eq(usuario_id))
        .count(&txn)
        .await?;
    if perfiles > 0 {
        return Err(Error::conflict(
            "No se puede eliminar. El usuario tiene un perfil asociado. Use soft delete.",
        ));
    }

    let loncheras = Lonchera::find()
        .filter(lonchera::Column::UsuarioId.eq(usuario_id))
        .count(&txn)
        .await?;
    if loncheras > 0 {
        return Err(Error::conflict(format!(
            "No se puede eliminar. El usuario tiene {loncheras} loncheras asociadas. Use soft delete."
        )));
    }

    let pedidos = Pedido::find()
        .filter(pedido::Column::UsuarioId.eq(usuario_id))
        .count(&txn)
        .await?;
    if pedidos > 0 {
        return Err(Error::conflict(format!(
            "No se puede eliminar. El usuario tiene {pedidos} pedidos asociados. Use soft delete."
        )));
    }

    let datos_json = serde_json::to_string(&usuario)?;
    crate::core::historial::record_eliminacion(
        &txn,
        "usuarios",
        usuario_id,
        datos_json,
        motivo,
        usuario_eliminador_id,
    )
    .await?;

    usuario.delete(&txn).await?;
    txn.commit().await?;
    Ok(())
}

/// Turns a soft-deleted usuario back on.
///
/// # Errors
/// Returns `InvalidInput` when the usuario is already active.
pub async fn reactivate_usuario(
    db: &DatabaseConnection,
    usuario_id: i64,
) -> Result<usuario::Model> {
    let usuario = Usuario::find_by_id(usuario_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Usuario no encontrado"))?;

    if usuario.is_active {
        return Err(Error::invalid_input("El usuario ya está activo"));
    }

    let mut activo: usuario::ActiveModel = usuario.into();
    activo.is_active = Set(true);
    activo.fecha_modificacion = Set(Some(chrono::Utc::now()));
    activo.update(db).await.map_err(Into::into)
}
