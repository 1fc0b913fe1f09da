//! Historial business logic - Handles the deletion audit trail.
//!
//! Every hard delete of an audited table writes one row here carrying a full
//! JSON snapshot of the deleted record. Rows are immutable once written; the
//! only mutation is deleting a single audit row itself.

use crate::{
    entities::{Historial, Usuario, historial_eliminacion, usuario},
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, prelude::*};
use serde::Serialize;
use std::collections::BTreeMap;

const MOTIVO_MAX: usize = 500;

/// How many audit rows each table accumulated.
#[derive(Debug, Clone, Serialize)]
pub struct TablaConteo {
    /// Source table of the deletions
    pub tabla_nombre: String,
    /// Audit rows for it
    pub cantidad: usize,
}

/// How many deletions a usuario performed.
#[derive(Debug, Clone, Serialize)]
pub struct EliminadorConteo {
    /// The deleting usuario
    pub usuario_id: i64,
    /// Deletions attributed to them
    pub cantidad: usize,
}

/// Statistics over the whole audit trail.
#[derive(Debug, Clone, Serialize)]
pub struct EstadisticasHistorial {
    /// Audit rows in total
    pub total_eliminaciones: usize,
    /// Counts per source table
    pub por_tabla: Vec<TablaConteo>,
    /// Counts per deleting usuario, anonymous deletions excluded
    pub por_usuario: Vec<EliminadorConteo>,
    /// Timestamp of the most recent deletion
    pub ultima_eliminacion: Option<DateTimeUtc>,
}

/// Writes one audit row for a hard delete. Works inside the deleting
/// transaction, so it takes any connection.
///
/// # Errors
/// Returns `InvalidInput` for an over-long reason and `NotFound` when the
/// deleting usuario does not exist or is inactive.
pub async fn record_eliminacion<C: ConnectionTrait>(
    db: &C,
    tabla_nombre: &str,
    registro_id: i64,
    datos_json: String,
    motivo: Option<String>,
    usuario_eliminador_id: Option<i64>,
) -> Result<historial_eliminacion::Model> {
    if let Some(motivo) = &motivo {
        if motivo.chars().count() > MOTIVO_MAX {
            return Err(Error::invalid_input(format!(
                "El motivo no puede exceder {MOTIVO_MAX} caracteres"
            )));
        }
    }
    if let Some(usuario_id) = usuario_eliminador_id {
        let eliminador = Usuario::find_by_id(usuario_id)
            .filter(usuario::Column::IsActive.eq(true))
            .one(db)
            .await?;
        if eliminador.is_none() {
            return Err(Error::not_found("Usuario no encontrado o inactivo"));
        }
    }

    let registro = historial_eliminacion::ActiveModel {
        tabla_nombre: Set(tabla_nombre.to_string()),
        registro_id: Set(registro_id),
        datos_json: Set(datos_json),
        motivo: Set(motivo),
        fecha_eliminacion: Set(chrono::Utc::now()),
        usuario_eliminador_id: Set(usuario_eliminador_id),
        ..Default::default()
    };
    registro.insert(db).await.map_err(Into::into)
}

/// Retrieves an audit row by id.
pub async fn get_historial(
    db: &DatabaseConnection,
    historial_id: i64,
) -> Result<historial_eliminacion::Model> {
    Historial::find_by_id(historial_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Registro de historial no encontrado"))
}

/// Lists audit rows, newest first, optionally filtered by source table or
/// deleting usuario.
pub async fn list_historial(
    db: &DatabaseConnection,
    tabla_nombre: Option<String>,
    usuario_id: Option<i64>,
) -> Result<Vec<historial_eliminacion::Model>> {
    let mut query = Historial::find();
    if let Some(tabla) = tabla_nombre {
        query = query.filter(historial_eliminacion::Column::TablaNombre.eq(tabla));
    }
    if let Some(usuario_id) = usuario_id {
        query = query.filter(historial_eliminacion::Column::UsuarioEliminadorId.eq(usuario_id));
    }
    query
        .order_by_desc(historial_eliminacion::Column::FechaEliminacion)
        .order_by_desc(historial_eliminacion::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Decodes the JSON snapshot stored in an audit row.
///
/// # Errors
/// Returns a `Serialization` error when the stored snapshot is not valid
/// JSON.
pub async fn get_datos(db: &DatabaseConnection, historial_id: i64) -> Result<serde_json::Value> {
    let registro = get_historial(db, historial_id).await?;
    serde_json::from_str(&registro.datos_json).map_err(Into::into)
}

/// Builds statistics over the audit trail.
pub async fn generate_estadisticas(db: &DatabaseConnection) -> Result<EstadisticasHistorial> {
    let registros = Historial::find().all(db).await?;

    let mut por_tabla: BTreeMap<String, usize> = BTreeMap::new();
    let mut por_usuario: BTreeMap<i64, usize> = BTreeMap::new();
    let mut ultima: Option<DateTimeUtc> = None;
    for registro in &registros {
        *por_tabla.entry(registro.tabla_nombre.clone()).or_default() += 1;
        if let Some(usuario_id) = registro.usuario_eliminador_id {
            *por_usuario.entry(usuario_id).or_default() += 1;
        }
        if ultima.is_none_or(|u| registro.fecha_eliminacion > u) {
            ultima = Some(registro.fecha_eliminacion);
        }
    }

    Ok(EstadisticasHistorial {
        total_eliminaciones: registros.len(),
        por_tabla: por_tabla
            .into_iter()
            .map(|(tabla_nombre, cantidad)| TablaConteo {
                tabla_nombre,
                cantidad,
            })
            .collect(),
        por_usuario: por_usuario
            .into_iter()
            .map(|(usuario_id, cantidad)| EliminadorConteo {
                usuario_id,
                cantidad,
            })
            .collect(),
        ultima_eliminacion: ultima,
    })
}

/// Deletes a single audit row.
pub async fn delete_historial(db: &DatabaseConnection, historial_id: i64) -> Result<()> {
    let registro = get_historial(db, historial_id).await?;
    registro.delete(db).await?;
    Ok(())
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_record_eliminacion_motivo_demasiado_largo() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let result = record_eliminacion(
            &db,
            "usuarios",
            1,
            "{}".to_string(),
            Some("x".repeat(501)),
            None,
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidInput { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_record_eliminacion_requires_active_eliminador() -> Result<()> {
        let db = setup_test_db().await?;

        let result =
            record_eliminacion(&db, "usuarios", 1, "{}".to_string(), None, Some(999)).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_historial_filters() -> Result<()> {
        let db = setup_test_db().await?;
        let ana = create_test_usuario(&db, "111").await?;

        record_eliminacion(&db, "productos", 1, "{}".to_string(), None, Some(ana.id)).await?;
        record_eliminacion(&db, "alimentos", 2, "{}".to_string(), None, None).await?;
        record_eliminacion(&db, "productos", 3, "{}".to_string(), None, None).await?;

        let de_productos = list_historial(&db, Some("productos".to_string()), None).await?;
        assert_eq!(de_productos.len(), 2);

        let de_ana = list_historial(&db, None, Some(ana.id)).await?;
        assert_eq!(de_ana.len(), 1);
        assert_eq!(de_ana[0].registro_id, 1);

        let todos = list_historial(&db, None, None).await?;
        assert_eq!(todos.len(), 3);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_datos_decodes_snapshot() -> Result<()> {
        let db = setup_test_db().await?;

        let registro = record_eliminacion(
            &db,
            "productos",
            7,
            r#"{"id":7,"nombre":"Jugo"}"#.to_string(),
            None,
            None,
        )
        .await?;

        let datos = get_datos(&db, registro.id).await?;
        assert_eq!(datos["id"], 7);
        assert_eq!(datos["nombre"], "Jugo");

        Ok(())
    }

    #[tokio::test]
    async fn test_get_datos_rejects_corrupt_snapshot() -> Result<()> {
        let db = setup_test_db().await?;

        let roto = historial_eliminacion::ActiveModel {
            tabla_nombre: Set("productos".to_string()),
            registro_id: Set(1),
            datos_json: Set("{not json".to_string()),
            motivo: Set(None),
            fecha_eliminacion: Set(chrono::Utc::now()),
            usuario_eliminador_id: Set(None),
            ..Default::default()
        };
        let roto = roto.insert(&db).await?;

        let result = get_datos(&db, roto.id).await;
        assert!(matches!(result.unwrap_err(), Error::Serialization(_)));

        Ok(())
    }

    #[tokio::test]
    async fn test_generate_estadisticas() -> Result<()> {
        let db = setup_test_db().await?;
        let ana = create_test_usuario(&db, "111").await?;

        record_eliminacion(&db, "productos", 1, "{}".to_string(), None, Some(ana.id)).await?;
        record_eliminacion(&db, "productos", 2, "{}".to_string(), None, Some(ana.id)).await?;
        let ultimo =
            record_eliminacion(&db, "alimentos", 3, "{}".to_string(), None, None).await?;

        let stats = generate_estadisticas(&db).await?;
        assert_eq!(stats.total_eliminaciones, 3);
        assert_eq!(stats.por_tabla.len(), 2);
        let productos = stats
            .por_tabla
            .iter()
            .find(|t| t.tabla_nombre == "productos")
            .unwrap();
        assert_eq!(productos.cantidad, 2);

        // The anonymous deletion is not attributed to anyone
        assert_eq!(stats.por_usuario.len(), 1);
        assert_eq!(stats.por_usuario[0].usuario_id, ana.id);
        assert_eq!(stats.por_usuario[0].cantidad, 2);

        assert_eq!(stats.ultima_eliminacion, Some(ultimo.fecha_eliminacion));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_historial() -> Result<()> {
        let db = setup_test_db().await?;

        let registro =
            record_eliminacion(&db, "productos", 1, "{}".to_string(), None, None).await?;
        delete_historial(&db, registro.id).await?;

        assert!(matches!(
            get_historial(&db, registro.id).await.unwrap_err(),
            Error::NotFound { message: _ }
        ));
        let result = delete_historial(&db, registro.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { message: _ }
        ));

        Ok(())
    }
}
