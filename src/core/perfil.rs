//! Perfil business logic - Handles the one-to-one profile of a usuario.
//!
//! A usuario has at most one perfil; creating a second one is a conflict.
//! Perfiles have no soft-delete flag, deletion is always physical.

use crate::{
    entities::{Perfil, Usuario, perfil, usuario},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::{Deserialize, Serialize};

const BIO_MAX: usize = 500;
const TELEFONO_MAX: usize = 20;

/// Payload for creating a perfil.
#[derive(Debug, Clone, Deserialize)]
pub struct PerfilCreate {
    /// Owning usuario
    pub usuario_id: i64,
    /// Biography, up to 500 characters
    pub bio: Option<String>,
    /// Phone number, up to 20 characters
    pub telefono: Option<String>,
    /// Profile picture URL
    pub foto_url: Option<String>,
}

/// Partial update payload for a perfil. Omitted fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct PerfilUpdate {
    /// New biography
    pub bio: Option<String>,
    /// New phone number
    pub telefono: Option<String>,
    /// New picture URL
    pub foto_url: Option<String>,
}

impl PerfilUpdate {
    /// True when no field was provided.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.bio.is_none() && self.telefono.is_none() && self.foto_url.is_none()
    }
}

/// A perfil joined with its owning usuario.
#[derive(Debug, Clone, Serialize)]
pub struct PerfilCompleto {
    /// The perfil itself
    pub perfil: perfil::Model,
    /// The owning usuario
    pub usuario: usuario::Model,
}

fn validate_campos(bio: Option<&str>, telefono: Option<&str>) -> Result<()> {
    if bio.is_some_and(|b| b.chars().count() > BIO_MAX) {
        return Err(Error::invalid_input(format!(
            "La bio no puede superar los {BIO_MAX} caracteres"
        )));
    }
    if telefono.is_some_and(|t| t.chars().count() > TELEFONO_MAX) {
        return Err(Error::invalid_input(format!(
            "El teléfono no puede superar los {TELEFONO_MAX} caracteres"
        )));
    }
    Ok(())
}

/// Creates the perfil of a usuario.
///
/// # Errors
/// Returns `NotFound` when the usuario is absent or inactive and `Conflict`
/// when the usuario already has a perfil.
pub async fn create_perfil(db: &DatabaseConnection, payload: PerfilCreate) -> Result<perfil::Model> {
    validate_campos(payload.bio.as_deref(), payload.telefono.as_deref())?;

    let usuario = Usuario::find_by_id(payload.usuario_id).one(db).await?;
    if !usuario.is_some_and(|u| u.is_active) {
        return Err(Error::not_found("Usuario no encontrado o inactivo"));
    }

    let existente = Perfil::find()
        .filter(perfil::Column::UsuarioId.eq(payload.usuario_id))
        .one(db)
        .await?;
    if existente.is_some() {
        return Err(Error::conflict(
            "El usuario ya tiene un perfil. Use PUT para actualizar.",
        ));
    }

    let nuevo = perfil::ActiveModel {
        usuario_id: Set(payload.usuario_id),
        bio: Set(payload.bio),
        telefono: Set(payload.telefono),
        foto_url: Set(payload.foto_url),
        ..Default::default()
    };
    nuevo.insert(db).await.map_err(Into::into)
}

/// Retrieves a perfil by its own id.
pub async fn get_perfil(db: &DatabaseConnection, perfil_id: i64) -> Result<perfil::Model> {
    Perfil::find_by_id(perfil_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Perfil no encontrado"))
}

/// Retrieves the perfil belonging to a usuario.
pub async fn get_perfil_by_usuario(
    db: &DatabaseConnection,
    usuario_id: i64,
) -> Result<perfil::Model> {
    Perfil::find()
        .filter(perfil::Column::UsuarioId.eq(usuario_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("El usuario no tiene un perfil creado"))
}

/// Lists all perfiles.
pub async fn list_perfiles(db: &DatabaseConnection) -> Result<Vec<perfil::Model>> {
    Perfil::find()
        .order_by_asc(perfil::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies a partial update to a perfil.
pub async fn update_perfil(
    db: &DatabaseConnection,
    perfil_id: i64,
    payload: PerfilUpdate,
) -> Result<perfil::Model> {
    if payload.is_empty() {
        return Err(Error::invalid_input(
            "No se proporcionaron datos para actualizar",
        ));
    }
    validate_campos(payload.bio.as_deref(), payload.telefono.as_deref())?;

    let perfil = get_perfil(db, perfil_id).await?;

    let mut activo: perfil::ActiveModel = perfil.into();
    if let Some(bio) = payload.bio {
        activo.bio = Set(Some(bio));
    }
    if let Some(telefono) = payload.telefono {
        activo.telefono = Set(Some(telefono));
    }
    if let Some(foto_url) = payload.foto_url {
        activo.foto_url = Set(Some(foto_url));
    }
    activo.update(db).await.map_err(Into::into)
}

/// Permanently deletes a perfil.
pub async fn delete_perfil(db: &DatabaseConnection, perfil_id: i64) -> Result<()> {
    let perfil = get_perfil(db, perfil_id).await?;
    perfil.delete(db).await?;
    Ok(())
}

/// Retrieves a perfil joined with its owning usuario.
pub async fn get_perfil_completo(
    db: &DatabaseConnection,
    perfil_id: i64,
) -> Result<PerfilCompleto> {
    let perfil = get_perfil(db, perfil_id).await?;
    let usuario = Usuario::find_by_id(perfil.usuario_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Usuario no encontrado"))?;
    Ok(PerfilCompleto { perfil, usuario })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::usuario::soft_delete_usuario;
    use crate::test_utils::*;

    #[tokio::test]
    async fn test_create_perfil_integration() -> Result<()> {
        let (db, usuario) = setup_with_usuario().await?;

        let perfil = create_perfil(
            &db,
            PerfilCreate {
                usuario_id: usuario.id,
                bio: Some("Amante de la cocina".to_string()),
                telefono: Some("0991234567".to_string()),
                foto_url: None,
            },
        )
        .await?;

        assert_eq!(perfil.usuario_id, usuario.id);
        assert_eq!(perfil.bio.as_deref(), Some("Amante de la cocina"));
        assert!(perfil.foto_url.is_none());

        Ok(())
    }

    #[tokio::test]
    async fn test_create_perfil_one_per_usuario() -> Result<()> {
        let (db, usuario) = setup_with_usuario().await?;

        create_test_perfil(&db, usuario.id).await?;
        let result = create_test_perfil(&db, usuario.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Conflict { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_perfil_requires_active_usuario() -> Result<()> {
        let (db, usuario) = setup_with_usuario().await?;
        soft_delete_usuario(&db, usuario.id).await?;

        let result = create_test_perfil(&db, usuario.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { message: _ }
        ));

        // Completely unknown usuario behaves the same
        let result = create_test_perfil(&db, 999).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_perfil_field_limits() -> Result<()> {
        let (db, usuario) = setup_with_usuario().await?;

        let result = create_perfil(
            &db,
            PerfilCreate {
                usuario_id: usuario.id,
                bio: Some("x".repeat(501)),
                telefono: None,
                foto_url: None,
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidInput { message: _ }
        ));

        let result = create_perfil(
            &db,
            PerfilCreate {
                usuario_id: usuario.id,
                bio: None,
                telefono: Some("9".repeat(21)),
                foto_url: None,
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidInput { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_get_perfil_by_usuario() -> Result<()> {
        let (db, usuario) = setup_with_usuario().await?;
        let perfil = create_test_perfil(&db, usuario.id).await?;

        let encontrado = get_perfil_by_usuario(&db, usuario.id).await?;
        assert_eq!(encontrado.id, perfil.id);

        let otro = create_test_usuario(&db, "999888777").await?;
        let result = get_perfil_by_usuario(&db, otro.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_perfil() -> Result<()> {
        let (db, usuario) = setup_with_usuario().await?;
        let perfil = create_test_perfil(&db, usuario.id).await?;

        let actualizado = update_perfil(
            &db,
            perfil.id,
            PerfilUpdate {
                telefono: Some("022222222".to_string()),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(actualizado.telefono.as_deref(), Some("022222222"));
        assert_eq!(actualizado.bio, perfil.bio);

        let result = update_perfil(&db, perfil.id, PerfilUpdate::default()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidInput { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_perfil() -> Result<()> {
        let (db, usuario) = setup_with_usuario().await?;
        let perfil = create_test_perfil(&db, usuario.id).await?;

        delete_perfil(&db, perfil.id).await?;
        let result = get_perfil(&db, perfil.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { message: _ }
        ));

        // The usuario can create a fresh perfil afterwards
        create_test_perfil(&db, usuario.id).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_get_perfil_completo() -> Result<()> {
        let (db, usuario) = setup_with_usuario().await?;
        let perfil = create_test_perfil(&db, usuario.id).await?;

        let completo = get_perfil_completo(&db, perfil.id).await?;
        assert_eq!(completo.perfil.id, perfil.id);
        assert_eq!(completo.usuario.id, usuario.id);

        Ok(())
    }
}
