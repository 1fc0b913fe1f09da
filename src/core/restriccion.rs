//! Restriccion business logic - Handles dietary restrictions and their food
//! associations.
//!
//! Restricciones are a hard-deleted catalog: removing one takes its
//! associations with it. The compatibility search is a set difference over
//! the association table, so an alimento is compatible with a set of
//! restricciones exactly when no restriccion in the set references it.

use crate::{
    entities::{
        Alimento, Restriccion, RestriccionAlimento, alimento, restriccion,
        restriccion::NivelSeveridad, restriccion_alimento,
    },
    errors::{Error, Result},
};
use sea_orm::{Iterable, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

/// Payload for creating a restriccion.
#[derive(Debug, Clone, Deserialize)]
pub struct RestriccionCreate {
    /// Name of the restriction, unique across the catalog
    pub nombre: String,
    /// Optional longer description
    #[serde(default)]
    pub descripcion: Option<String>,
    /// How severe a violation is
    pub nivel_severidad: NivelSeveridad,
}

/// Partial update payload for a restriccion.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RestriccionUpdate {
    /// New name, checked for uniqueness
    pub nombre: Option<String>,
    /// New description
    pub descripcion: Option<String>,
    /// New severity level
    pub nivel_severidad: Option<NivelSeveridad>,
}

impl RestriccionUpdate {
    /// True when no field was provided.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nombre.is_none() && self.descripcion.is_none() && self.nivel_severidad.is_none()
    }
}

/// How many restricciones reference each severity level.
#[derive(Debug, Clone, Serialize)]
pub struct SeveridadConteo {
    /// The severity level
    pub nivel_severidad: NivelSeveridad,
    /// Restricciones at that level
    pub cantidad: usize,
}

/// An alimento ranked by how many restricciones reference it.
#[derive(Debug, Clone, Serialize)]
pub struct AlimentoRestringido {
    /// The alimento
    pub alimento_id: i64,
    /// Its name
    pub nombre: String,
    /// Restricciones referencing it
    pub restricciones: usize,
}

/// Catalog-wide restriction statistics.
#[derive(Debug, Clone, Serialize)]
pub struct EstadisticasRestricciones {
    /// Restricciones in the catalog
    pub total_restricciones: usize,
    /// Counts per severity level, every level present
    pub por_severidad: Vec<SeveridadConteo>,
    /// Up to five alimentos with the most restricciones, ties broken by id
    pub alimentos_mas_restringidos: Vec<AlimentoRestringido>,
    /// Association rows in total
    pub total_asociaciones: usize,
}

async fn check_nombre_libre(
    db: &DatabaseConnection,
    nombre: &str,
    excluir_id: Option<i64>,
) -> Result<()> {
    let mut query = Restriccion::find().filter(restriccion::Column::Nombre.eq(nombre));
    if let Some(id) = excluir_id {
        query = query.filter(restriccion::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(Error::conflict(format!(
            "Ya existe una restricción con el nombre '{nombre}'"
        )));
    }
    Ok(())
}

/// Creates a restriccion with a catalog-unique name.
///
/// # Errors
/// Returns `Conflict` when the name is already taken.
pub async fn create_restriccion(
    db: &DatabaseConnection,
    payload: RestriccionCreate,
) -> Result<restriccion::Model> {
    let nombre = payload.nombre.trim().to_string();
    if nombre.is_empty() {
        return Err(Error::invalid_input("El nombre no puede estar vacío"));
    }
    check_nombre_libre(db, &nombre, None).await?;

    let nueva = restriccion::ActiveModel {
        nombre: Set(nombre),
        descripcion: Set(payload.descripcion),
        nivel_severidad: Set(payload.nivel_severidad),
        fecha_creacion: Set(chrono::Utc::now()),
        ..Default::default()
    };
    nueva.insert(db).await.map_err(Into::into)
}

/// Retrieves a restriccion by id.
pub async fn get_restriccion(
    db: &DatabaseConnection,
    restriccion_id: i64,
) -> Result<restriccion::Model> {
    Restriccion::find_by_id(restriccion_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Restricción no encontrada"))
}

/// Lists restricciones, newest first, optionally filtered by severity.
pub async fn list_restricciones(
    db: &DatabaseConnection,
    nivel_severidad: Option<NivelSeveridad>,
) -> Result<Vec<restriccion::Model>> {
    let mut query = Restriccion::find();
    if let Some(nivel) = nivel_severidad {
        query = query.filter(restriccion::Column::NivelSeveridad.eq(nivel));
    }
    query
        .order_by_desc(restriccion::Column::FechaCreacion)
        .order_by_desc(restriccion::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies a partial update to a restriccion.
pub async fn update_restriccion(
    db: &DatabaseConnection,
    restriccion_id: i64,
    payload: RestriccionUpdate,
) -> Result<restriccion::Model> {
    if payload.is_empty() {
        return Err(Error::invalid_input(
            "No se proporcionaron datos para actualizar",
        ));
    }

    let restriccion = get_restriccion(db, restriccion_id).await?;

    if let Some(nombre) = &payload.nombre {
        let nombre = nombre.trim();
        if nombre.is_empty() {
            return Err(Error::invalid_input("El nombre no puede estar vacío"));
        }
        if restriccion.nombre != nombre {
            check_nombre_libre(db, nombre, Some(restriccion_id)).await?;
        }
    }

    let mut activa: restriccion::ActiveModel = restriccion.into();
    if let Some(nombre) = payload.nombre {
        activa.nombre = Set(nombre.trim().to_string());
    }
    if let Some(descripcion) = payload.descripcion {
        activa.descripcion = Set(Some(descripcion));
    }
    if let Some(nivel) = payload.nivel_severidad {
        activa.nivel_severidad = Set(nivel);
    }
    activa.update(db).await.map_err(Into::into)
}

/// Deletes a restriccion along with its food associations.
pub async fn delete_restriccion(db: &DatabaseConnection, restriccion_id: i64) -> Result<()> {
    let txn = db.begin().await?;

    let restriccion = Restriccion::find_by_id(restriccion_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Restricción no encontrada"))?;

    RestriccionAlimento::delete_many()
        .filter(restriccion_alimento::Column::RestriccionId.eq(restriccion_id))
        .exec(&txn)
        .await?;
    restriccion.delete(&txn).await?;

    txn.commit().await?;
    Ok(())
}

/// Associates an active alimento with a restriccion.
///
/// # Errors
/// Returns `Conflict` when the pair is already associated.
pub async fn associate_alimento(
    db: &DatabaseConnection,
    restriccion_id: i64,
    alimento_id: i64,
) -> Result<restriccion_alimento::Model> {
    let restriccion = get_restriccion(db, restriccion_id).await?;
    let alimento = Alimento::find_by_id(alimento_id).one(db).await?;
    let alimento = match alimento {
        Some(a) if a.is_active => a,
        _ => return Err(Error::not_found("Alimento no encontrado")),
    };

    let existente = RestriccionAlimento::find_by_id((restriccion_id, alimento_id))
        .one(db)
        .await?;
    if existente.is_some() {
        return Err(Error::conflict(format!(
            "El alimento '{}' ya está asociado a la restricción '{}'",
            alimento.nombre, restriccion.nombre
        )));
    }

    let nueva = restriccion_alimento::ActiveModel {
        restriccion_id: Set(restriccion_id),
        alimento_id: Set(alimento_id),
        fecha_asociacion: Set(chrono::Utc::now()),
    };
    nueva.insert(db).await.map_err(Into::into)
}

/// Removes the association between a restriccion and an alimento.
///
/// # Errors
/// Returns `NotFound` when the pair was never associated.
pub async fn dissociate_alimento(
    db: &DatabaseConnection,
    restriccion_id: i64,
    alimento_id: i64,
) -> Result<()> {
    get_restriccion(db, restriccion_id).await?;

    let linea = RestriccionAlimento::find_by_id((restriccion_id, alimento_id))
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("La asociación no existe"))?;
    linea.delete(db).await?;
    Ok(())
}

/// Lists the alimentos associated with a restriccion.
pub async fn get_alimentos_for_restriccion(
    db: &DatabaseConnection,
    restriccion_id: i64,
) -> Result<Vec<alimento::Model>> {
    get_restriccion(db, restriccion_id).await?;

    let pares = RestriccionAlimento::find()
        .filter(restriccion_alimento::Column::RestriccionId.eq(restriccion_id))
        .find_also_related(Alimento)
        .all(db)
        .await?;
    Ok(pares.into_iter().filter_map(|(_, a)| a).collect())
}

/// Finds the active alimentos compatible with every given restriccion,
/// alphabetically. An empty id list matches the whole active catalog.
///
/// # Errors
/// Returns `NotFound` when any of the ids does not exist.
pub async fn find_compatible_alimentos(
    db: &DatabaseConnection,
    restriccion_ids: &[i64],
) -> Result<Vec<alimento::Model>> {
    let ids: BTreeSet<i64> = restriccion_ids.iter().copied().collect();
    if !ids.is_empty() {
        let conocidas = Restriccion::find()
            .filter(restriccion::Column::Id.is_in(ids.iter().copied()))
            .all(db)
            .await?;
        if conocidas.len() != ids.len() {
            return Err(Error::not_found("Restricción no encontrada"));
        }
    }

    let restringidos: BTreeSet<i64> = if ids.is_empty() {
        BTreeSet::new()
    } else {
        RestriccionAlimento::find()
            .filter(restriccion_alimento::Column::RestriccionId.is_in(ids.iter().copied()))
            .all(db)
            .await?
            .into_iter()
            .map(|a| a.alimento_id)
            .collect()
    };

    let mut query = Alimento::find().filter(alimento::Column::IsActive.eq(true));
    if !restringidos.is_empty() {
        query = query.filter(alimento::Column::Id.is_not_in(restringidos));
    }
    query
        .order_by_asc(alimento::Column::Nombre)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Builds catalog-wide restriction statistics.
pub async fn generate_estadisticas(db: &DatabaseConnection) -> Result<EstadisticasRestricciones> {
    let restricciones = Restriccion::find().all(db).await?;
    let asociaciones = RestriccionAlimento::find().all(db).await?;

    let por_severidad = NivelSeveridad::iter()
        .map(|nivel| SeveridadConteo {
            nivel_severidad: nivel,
            cantidad: restricciones
                .iter()
                .filter(|r| r.nivel_severidad == nivel)
                .count(),
        })
        .collect();

    let mut conteos: BTreeMap<i64, usize> = BTreeMap::new();
    for asociacion in &asociaciones {
        *conteos.entry(asociacion.alimento_id).or_default() += 1;
    }
    let mut ordenados: Vec<(i64, usize)> = conteos.into_iter().collect();
    ordenados.sort_by(|a, b| b.1.cmp(&a.1).then(a.0.cmp(&b.0)));
    ordenados.truncate(5);

    let nombres: BTreeMap<i64, String> = Alimento::find()
        .filter(alimento::Column::Id.is_in(ordenados.iter().map(|(id, _)| *id)))
        .all(db)
        .await?
        .into_iter()
        .map(|a| (a.id, a.nombre))
        .collect();
    let alimentos_mas_restringidos = ordenados
        .into_iter()
        .filter_map(|(alimento_id, cuenta)| {
            nombres.get(&alimento_id).map(|nombre| AlimentoRestringido {
                alimento_id,
                nombre: nombre.clone(),
                restricciones: cuenta,
            })
        })
        .collect();

    Ok(EstadisticasRestricciones {
        total_restricciones: restricciones.len(),
        por_severidad,
        alimentos_mas_restringidos,
        total_asociaciones: asociaciones.len(),
    })
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use super::*;
    use crate::core::alimento::soft_delete_alimento;
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_restriccion_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let payload = RestriccionCreate {
            nombre: "  ".to_string(),
            descripcion: None,
            nivel_severidad: NivelSeveridad::Bajo,
        };
        assert!(matches!(
            create_restriccion(&db, payload).await.unwrap_err(),
            Error::InvalidInput { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_restriccion_duplicate_nombre() -> Result<()> {
        let db = setup_test_db().await?;

        create_test_restriccion(&db, "Sin gluten").await?;
        let result = create_test_restriccion(&db, "Sin gluten").await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Conflict { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_list_restricciones_by_severidad() -> Result<()> {
        let db = setup_test_db().await?;

        create_restriccion(
            &db,
            RestriccionCreate {
                nombre: "Sin maní".to_string(),
                descripcion: None,
                nivel_severidad: NivelSeveridad::Alto,
            },
        )
        .await?;
        create_test_restriccion(&db, "Sin gluten").await?;

        let altas = list_restricciones(&db, Some(NivelSeveridad::Alto)).await?;
        assert_eq!(altas.len(), 1);
        assert_eq!(altas[0].nombre, "Sin maní");

        let todas = list_restricciones(&db, None).await?;
        assert_eq!(todas.len(), 2);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_restriccion() -> Result<()> {
        let db = setup_test_db().await?;
        let restriccion = create_test_restriccion(&db, "Sin gluten").await?;
        create_test_restriccion(&db, "Sin lactosa").await?;

        let actualizada = update_restriccion(
            &db,
            restriccion.id,
            RestriccionUpdate {
                nivel_severidad: Some(NivelSeveridad::Alto),
                ..Default::default()
            },
        )
        .await?;
        assert_eq!(actualizada.nivel_severidad, NivelSeveridad::Alto);

        let result = update_restriccion(
            &db,
            restriccion.id,
            RestriccionUpdate {
                nombre: Some("Sin lactosa".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Conflict { message: _ }
        ));

        let result = update_restriccion(&db, restriccion.id, RestriccionUpdate::default()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidInput { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_delete_restriccion_removes_asociaciones() -> Result<()> {
        let db = setup_test_db().await?;
        let restriccion = create_test_restriccion(&db, "Sin gluten").await?;
        let alimento = create_test_alimento(&db, "Pan").await?;
        associate_alimento(&db, restriccion.id, alimento.id).await?;

        delete_restriccion(&db, restriccion.id).await?;

        assert!(
            Restriccion::find_by_id(restriccion.id)
                .one(&db)
                .await?
                .is_none()
        );
        assert_eq!(RestriccionAlimento::find().count(&db).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_associate_alimento_rechaza_duplicados_e_inactivos() -> Result<()> {
        let db = setup_test_db().await?;
        let restriccion = create_test_restriccion(&db, "Sin gluten").await?;
        let alimento = create_test_alimento(&db, "Pan").await?;

        associate_alimento(&db, restriccion.id, alimento.id).await?;
        let result = associate_alimento(&db, restriccion.id, alimento.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Conflict { message: _ }
        ));

        let retirado = create_test_alimento(&db, "Galletas").await?;
        soft_delete_alimento(&db, retirado.id).await?;
        let result = associate_alimento(&db, restriccion.id, retirado.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_dissociate_alimento_missing() -> Result<()> {
        let db = setup_test_db().await?;
        let restriccion = create_test_restriccion(&db, "Sin gluten").await?;
        let alimento = create_test_alimento(&db, "Pan").await?;

        let result = dissociate_alimento(&db, restriccion.id, alimento.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { message: _ }
        ));

        associate_alimento(&db, restriccion.id, alimento.id).await?;
        dissociate_alimento(&db, restriccion.id, alimento.id).await?;
        assert_eq!(RestriccionAlimento::find().count(&db).await?, 0);

        Ok(())
    }

    #[tokio::test]
    async fn test_find_compatible_alimentos() -> Result<()> {
        let db = setup_test_db().await?;
        let pan = create_test_alimento(&db, "Pan").await?;
        create_test_alimento(&db, "Arroz").await?;
        let sin_gluten = create_test_restriccion(&db, "Sin gluten").await?;
        associate_alimento(&db, sin_gluten.id, pan.id).await?;

        // Empty set of restricciones matches the whole active catalog
        let todos = find_compatible_alimentos(&db, &[]).await?;
        assert_eq!(todos.len(), 2);

        let compatibles = find_compatible_alimentos(&db, &[sin_gluten.id]).await?;
        assert_eq!(compatibles.len(), 1);
        assert_eq!(compatibles[0].nombre, "Arroz");

        let result = find_compatible_alimentos(&db, &[999]).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_find_compatible_todos_restringidos() -> Result<()> {
        let db = setup_test_db().await?;
        let pan = create_test_alimento(&db, "Pan").await?;
        let sin_gluten = create_test_restriccion(&db, "Sin gluten").await?;
        associate_alimento(&db, sin_gluten.id, pan.id).await?;

        let compatibles = find_compatible_alimentos(&db, &[sin_gluten.id]).await?;
        assert!(compatibles.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_generate_estadisticas() -> Result<()> {
        let db = setup_test_db().await?;
        let pan = create_test_alimento(&db, "Pan").await?;
        let leche = create_test_alimento(&db, "Leche").await?;

        let sin_gluten = create_test_restriccion(&db, "Sin gluten").await?;
        let sin_lactosa = create_test_restriccion(&db, "Sin lactosa").await?;
        let vegano = create_restriccion(
            &db,
            RestriccionCreate {
                nombre: "Vegano".to_string(),
                descripcion: None,
                nivel_severidad: NivelSeveridad::Medio,
            },
        )
        .await?;

        associate_alimento(&db, sin_gluten.id, pan.id).await?;
        associate_alimento(&db, sin_lactosa.id, leche.id).await?;
        associate_alimento(&db, vegano.id, leche.id).await?;

        let stats = generate_estadisticas(&db).await?;
        assert_eq!(stats.total_restricciones, 3);
        assert_eq!(stats.total_asociaciones, 3);

        // Every severity level is reported, including untouched ones
        assert_eq!(stats.por_severidad.len(), 3);
        let medio = stats
            .por_severidad
            .iter()
            .find(|c| c.nivel_severidad == NivelSeveridad::Medio)
            .unwrap();
        assert_eq!(medio.cantidad, 1);

        assert_eq!(stats.alimentos_mas_restringidos.len(), 2);
        assert_eq!(stats.alimentos_mas_restringidos[0].alimento_id, leche.id);
        assert_eq!(stats.alimentos_mas_restringidos[0].restricciones, 2);
        assert_eq!(stats.alimentos_mas_restringidos[1].alimento_id, pan.id);

        Ok(())
    }
}
