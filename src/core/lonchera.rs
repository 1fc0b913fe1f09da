//! Lonchera business logic - Handles lunchbox composition and derived totals.
//!
//! A lonchera's `calorias` and `precio` columns are derived from its food
//! associations: every mutation of the association set recomputes both inside
//! the same transaction, using the per-100g figures of each alimento scaled
//! by the grams in the box. Calories round to the nearest integer, prices to
//! two decimals.

use crate::{
    entities::{
        Alimento, Lonchera, LoncheraAlimento, Restriccion, RestriccionAlimento, alimento,
        alimento::CategoriaAlimento, lonchera, lonchera_alimento, restriccion,
        restriccion_alimento, usuario,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};
use std::collections::{BTreeMap, BTreeSet};

const NOMBRE_MAX: usize = 100;

/// Payload for creating a lonchera. The totals default to zero and are
/// overwritten by the first recomputation.
#[derive(Debug, Clone, Deserialize)]
pub struct LoncheraCreate {
    /// Display name of the lunchbox
    pub nombre: String,
    /// Optional free-form description
    #[serde(default)]
    pub descripcion: Option<String>,
    /// Seed value for the calorie total
    #[serde(default)]
    pub calorias: i32,
    /// Seed value for the price total
    #[serde(default)]
    pub precio: f64,
    /// Owning usuario
    pub usuario_id: i64,
}

/// Partial update payload for a lonchera. Only the descriptive fields are
/// editable, the totals always come from the recomputation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct LoncheraUpdate {
    /// New display name
    pub nombre: Option<String>,
    /// New description
    pub descripcion: Option<String>,
}

impl LoncheraUpdate {
    /// True when no field was provided.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nombre.is_none() && self.descripcion.is_none()
    }
}

/// A food line to add to a lonchera.
#[derive(Debug, Clone, Deserialize)]
pub struct AlimentoEnLonchera {
    /// Alimento to include
    pub alimento_id: i64,
    /// Grams of it in the box, must be positive
    pub cantidad_gramos: f64,
}

/// Result of adding a food to a lonchera.
#[derive(Debug, Clone, Serialize)]
pub struct AlimentoAgregado {
    /// True when an existing line had its grams replaced instead of a new
    /// line being created
    pub actualizado: bool,
    /// The lonchera with freshly recomputed totals
    pub lonchera: lonchera::Model,
}

/// One food of a lonchera with its contribution scaled to the grams in the
/// box, every figure rounded to two decimals.
#[derive(Debug, Clone, Serialize)]
pub struct AlimentoEnDetalle {
    /// Alimento id
    pub alimento_id: i64,
    /// Alimento name
    pub nombre: String,
    /// Alimento category
    pub categoria: CategoriaAlimento,
    /// Grams in the box
    pub cantidad_gramos: f64,
    /// Calories contributed
    pub calorias: f64,
    /// Protein grams contributed
    pub proteinas: f64,
    /// Carbohydrate grams contributed
    pub carbohidratos: f64,
    /// Fat grams contributed
    pub grasas: f64,
    /// Price contributed
    pub precio: f64,
}

/// Nutritional breakdown of a lonchera.
#[derive(Debug, Clone, Serialize)]
pub struct LoncheraDetalle {
    /// Lonchera id
    pub lonchera_id: i64,
    /// Lonchera name
    pub nombre: String,
    /// Per-food contributions
    pub alimentos: Vec<AlimentoEnDetalle>,
    /// Calorie total over the raw contributions
    pub total_calorias: f64,
    /// Protein total in grams
    pub total_proteinas: f64,
    /// Carbohydrate total in grams
    pub total_carbohidratos: f64,
    /// Fat total in grams
    pub total_grasas: f64,
    /// Price total
    pub total_precio: f64,
}

/// A lonchera together with its owner and food breakdown.
#[derive(Debug, Clone, Serialize)]
pub struct LoncheraCompleta {
    /// The lonchera itself
    pub lonchera: lonchera::Model,
    /// Its owner
    pub usuario: usuario::Model,
    /// Per-food contributions
    pub alimentos: Vec<AlimentoEnDetalle>,
}

/// One food that clashes with the checked restricciones.
#[derive(Debug, Clone, Serialize)]
pub struct ConflictoAlimento {
    /// Conflicting alimento id
    pub alimento_id: i64,
    /// Conflicting alimento name
    pub nombre: String,
    /// Names of the restricciones it violates
    pub restricciones: Vec<String>,
}

/// Outcome of checking a lonchera against a set of restricciones.
#[derive(Debug, Clone, Serialize)]
pub struct ValidacionRestricciones {
    /// True when no food in the box violates any checked restriccion
    pub es_compatible: bool,
    /// The violating foods, empty when compatible
    pub alimentos_conflictivos: Vec<ConflictoAlimento>,
}

fn round2(valor: f64) -> f64 {
    (valor * 100.0).round() / 100.0
}

fn validate_nombre(nombre: &str) -> Result<String> {
    let nombre = nombre.trim();
    if nombre.is_empty() {
        return Err(Error::invalid_input("El nombre no puede estar vacío"));
    }
    if nombre.chars().count() > NOMBRE_MAX {
        return Err(Error::invalid_input(format!(
            "El nombre no puede exceder {NOMBRE_MAX} caracteres"
        )));
    }
    Ok(nombre.to_string())
}

async fn get_active_usuario(db: &DatabaseConnection, usuario_id: i64) -> Result<usuario::Model> {
    let usuario = crate::entities::Usuario::find_by_id(usuario_id)
        .one(db)
        .await?;
    match usuario {
        Some(u) if u.is_active => Ok(u),
        _ => Err(Error::not_found("Usuario no encontrado o inactivo")),
    }
}

/// Creates a lonchera for an active usuario.
///
/// # Errors
/// Returns `NotFound` when the usuario does not exist or is inactive.
pub async fn create_lonchera(
    db: &DatabaseConnection,
    payload: LoncheraCreate,
) -> Result<lonchera::Model> {
    let nombre = validate_nombre(&payload.nombre)?;
    get_active_usuario(db, payload.usuario_id).await?;

    let nueva = lonchera::ActiveModel {
        nombre: Set(nombre),
        descripcion: Set(payload.descripcion),
        calorias: Set(payload.calorias),
        precio: Set(payload.precio),
        usuario_id: Set(payload.usuario_id),
        is_active: Set(true),
        fecha_creacion: Set(chrono::Utc::now()),
        ..Default::default()
    };
    nueva.insert(db).await.map_err(Into::into)
}

/// Retrieves an active lonchera by id.
///
/// # Errors
/// Returns `NotFound` when the lonchera does not exist or is soft-deleted.
pub async fn get_lonchera(db: &DatabaseConnection, lonchera_id: i64) -> Result<lonchera::Model> {
    let lonchera = Lonchera::find_by_id(lonchera_id).one(db).await?;
    match lonchera {
        Some(l) if l.is_active => Ok(l),
        _ => Err(Error::not_found("Lonchera no encontrada")),
    }
}

/// Lists loncheras, newest first, optionally scoped to one usuario.
pub async fn list_loncheras(
    db: &DatabaseConnection,
    usuario_id: Option<i64>,
    incluir_inactivas: bool,
) -> Result<Vec<lonchera::Model>> {
    let mut query = Lonchera::find();
    if let Some(usuario_id) = usuario_id {
        query = query.filter(lonchera::Column::UsuarioId.eq(usuario_id));
    }
    if !incluir_inactivas {
        query = query.filter(lonchera::Column::IsActive.eq(true));
    }
    query
        .order_by_desc(lonchera::Column::FechaCreacion)
        .order_by_desc(lonchera::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Applies a partial update to the descriptive fields of an active lonchera.
pub async fn update_lonchera(
    db: &DatabaseConnection,
    lonchera_id: i64,
    payload: LoncheraUpdate,
) -> Result<lonchera::Model> {
    if payload.is_empty() {
        return Err(Error::invalid_input(
            "No se proporcionaron datos para actualizar",
        ));
    }

    let lonchera = get_lonchera(db, lonchera_id).await?;
    let mut activa: lonchera::ActiveModel = lonchera.into();
    if let Some(nombre) = payload.nombre {
        activa.nombre = Set(validate_nombre(&nombre)?);
    }
    if let Some(descripcion) = payload.descripcion {
        activa.descripcion = Set(Some(descripcion));
    }
    activa.update(db).await.map_err(Into::into)
}

/// Recomputes the derived totals of a lonchera from its food associations
/// and persists them. Works inside transactions, so it takes any connection.
///
/// Calorie contributions are `gramos / 100 * calorias_por_100g`, summed and
/// rounded to the nearest integer. Prices sum the same way and round to two
/// decimals.
pub async fn recalculate_totales<C: ConnectionTrait>(
    db: &C,
    lonchera_id: i64,
) -> Result<lonchera::Model> {
    let lineas = LoncheraAlimento::find()
        .filter(lonchera_alimento::Column::LoncheraId.eq(lonchera_id))
        .find_also_related(Alimento)
        .all(db)
        .await?;

    let mut total_calorias = 0.0_f64;
    let mut total_precio = 0.0_f64;
    for (linea, alimento) in lineas {
        if let Some(alimento) = alimento {
            let factor = linea.cantidad_gramos / 100.0;
            total_calorias += factor * alimento.calorias_por_100g;
            total_precio += factor * alimento.precio_unitario;
        }
    }

    let lonchera = Lonchera::find_by_id(lonchera_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Lonchera no encontrada"))?;

    let mut activa: lonchera::ActiveModel = lonchera.into();
    // Calorie totals of a lunchbox stay far below i32::MAX.
    #[allow(clippy::cast_possible_truncation)]
    {
        activa.calorias = Set(total_calorias.round() as i32);
    }
    activa.precio = Set(round2(total_precio));
    activa.update(db).await.map_err(Into::into)
}

/// Adds an alimento to a lonchera, or replaces its grams when it is already
/// in the box, then recomputes the totals. All in one transaction.
///
/// # Errors
/// Returns `InvalidInput` for a non-positive quantity and `NotFound` when
/// either side is missing or inactive.
pub async fn add_alimento_to_lonchera(
    db: &DatabaseConnection,
    lonchera_id: i64,
    payload: AlimentoEnLonchera,
) -> Result<AlimentoAgregado> {
    if payload.cantidad_gramos <= 0.0 || !payload.cantidad_gramos.is_finite() {
        return Err(Error::invalid_input("La cantidad debe ser mayor a 0"));
    }

    get_lonchera(db, lonchera_id).await?;
    let alimento = Alimento::find_by_id(payload.alimento_id).one(db).await?;
    if !alimento.is_some_and(|a| a.is_active) {
        return Err(Error::not_found("Alimento no encontrado"));
    }

    let txn = db.begin().await?;

    let existente = LoncheraAlimento::find_by_id((lonchera_id, payload.alimento_id))
        .one(&txn)
        .await?;
    let actualizado = if let Some(linea) = existente {
        let mut activa: lonchera_alimento::ActiveModel = linea.into();
        activa.cantidad_gramos = Set(payload.cantidad_gramos);
        activa.update(&txn).await?;
        true
    } else {
        let nueva = lonchera_alimento::ActiveModel {
            lonchera_id: Set(lonchera_id),
            alimento_id: Set(payload.alimento_id),
            cantidad_gramos: Set(payload.cantidad_gramos),
        };
        nueva.insert(&txn).await?;
        false
    };

    let lonchera = recalculate_totales(&txn, lonchera_id).await?;
    txn.commit().await?;

    Ok(AlimentoAgregado {
        actualizado,
        lonchera,
    })
}

/// Removes an alimento from a lonchera and recomputes the totals.
///
/// # Errors
/// Returns `NotFound` when the alimento is not in the box.
pub async fn remove_alimento_from_lonchera(
    db: &DatabaseConnection,
    lonchera_id: i64,
    alimento_id: i64,
) -> Result<lonchera::Model> {
    get_lonchera(db, lonchera_id).await?;

    let txn = db.begin().await?;

    let linea = LoncheraAlimento::find_by_id((lonchera_id, alimento_id))
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("El alimento no está en la lonchera"))?;
    linea.delete(&txn).await?;

    let lonchera = recalculate_totales(&txn, lonchera_id).await?;
    txn.commit().await?;
    Ok(lonchera)
}

fn detalle_de_linea(linea: &lonchera_alimento::Model, alimento: &alimento::Model) -> AlimentoEnDetalle {
    let factor = linea.cantidad_gramos / 100.0;
    AlimentoEnDetalle {
        alimento_id: alimento.id,
        nombre: alimento.nombre.clone(),
        categoria: alimento.categoria,
        cantidad_gramos: linea.cantidad_gramos,
        calorias: round2(factor * alimento.calorias_por_100g),
        proteinas: round2(factor * alimento.proteinas_por_100g),
        carbohidratos: round2(factor * alimento.carbohidratos_por_100g),
        grasas: round2(factor * alimento.grasas_por_100g),
        precio: round2(factor * alimento.precio_unitario),
    }
}

async fn load_lineas(
    db: &DatabaseConnection,
    lonchera_id: i64,
) -> Result<Vec<(lonchera_alimento::Model, alimento::Model)>> {
    let pares = LoncheraAlimento::find()
        .filter(lonchera_alimento::Column::LoncheraId.eq(lonchera_id))
        .find_also_related(Alimento)
        .all(db)
        .await?;
    Ok(pares
        .into_iter()
        .filter_map(|(linea, alimento)| alimento.map(|a| (linea, a)))
        .collect())
}

/// Returns the per-food nutritional breakdown of an active lonchera, with
/// totals summed over the raw contributions before rounding.
pub async fn get_alimentos_detalle(
    db: &DatabaseConnection,
    lonchera_id: i64,
) -> Result<LoncheraDetalle> {
    let lonchera = get_lonchera(db, lonchera_id).await?;
    let lineas = load_lineas(db, lonchera_id).await?;

    let mut total_calorias = 0.0_f64;
    let mut total_proteinas = 0.0_f64;
    let mut total_carbohidratos = 0.0_f64;
    let mut total_grasas = 0.0_f64;
    let mut total_precio = 0.0_f64;
    let mut alimentos = Vec::with_capacity(lineas.len());
    for (linea, alimento) in &lineas {
        let factor = linea.cantidad_gramos / 100.0;
        total_calorias += factor * alimento.calorias_por_100g;
        total_proteinas += factor * alimento.proteinas_por_100g;
        total_carbohidratos += factor * alimento.carbohidratos_por_100g;
        total_grasas += factor * alimento.grasas_por_100g;
        total_precio += factor * alimento.precio_unitario;
        alimentos.push(detalle_de_linea(linea, alimento));
    }

    Ok(LoncheraDetalle {
        lonchera_id: lonchera.id,
        nombre: lonchera.nombre,
        alimentos,
        total_calorias: round2(total_calorias),
        total_proteinas: round2(total_proteinas),
        total_carbohidratos: round2(total_carbohidratos),
        total_grasas: round2(total_grasas),
        total_precio: round2(total_precio),
    })
}

/// Returns an active lonchera together with its owner and food breakdown.
pub async fn get_lonchera_completa(
    db: &DatabaseConnection,
    lonchera_id: i64,
) -> Result<LoncheraCompleta> {
    let lonchera = get_lonchera(db, lonchera_id).await?;
    let usuario = crate::entities::Usuario::find_by_id(lonchera.usuario_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Usuario no encontrado"))?;
    let lineas = load_lineas(db, lonchera_id).await?;
    let alimentos = lineas
        .iter()
        .map(|(linea, alimento)| detalle_de_linea(linea, alimento))
        .collect();

    Ok(LoncheraCompleta {
        lonchera,
        usuario,
        alimentos,
    })
}

/// Checks the foods of an active lonchera against a set of restricciones and
/// reports every clash.
///
/// # Errors
/// Returns `NotFound` when any of the restriccion ids does not exist.
pub async fn validate_restricciones(
    db: &DatabaseConnection,
    lonchera_id: i64,
    restriccion_ids: &[i64],
) -> Result<ValidacionRestricciones> {
    get_lonchera(db, lonchera_id).await?;

    let ids: BTreeSet<i64> = restriccion_ids.iter().copied().collect();
    let restricciones = Restriccion::find()
        .filter(restriccion::Column::Id.is_in(ids.iter().copied()))
        .all(db)
        .await?;
    if restricciones.len() != ids.len() {
        return Err(Error::not_found("Restricción no encontrada"));
    }
    let nombres: BTreeMap<i64, String> = restricciones
        .into_iter()
        .map(|r| (r.id, r.nombre))
        .collect();

    let lineas = load_lineas(db, lonchera_id).await?;

    let asociaciones = RestriccionAlimento::find()
        .filter(restriccion_alimento::Column::RestriccionId.is_in(ids.iter().copied()))
        .all(db)
        .await?;
    let mut restringidos: BTreeMap<i64, Vec<String>> = BTreeMap::new();
    for asociacion in asociaciones {
        if let Some(nombre) = nombres.get(&asociacion.restriccion_id) {
            restringidos
                .entry(asociacion.alimento_id)
                .or_default()
                .push(nombre.clone());
        }
    }

    let mut conflictos = Vec::new();
    for (_, alimento) in &lineas {
        if let Some(violadas) = restringidos.get(&alimento.id) {
            conflictos.push(ConflictoAlimento {
                alimento_id: alimento.id,
                nombre: alimento.nombre.clone(),
                restricciones: violadas.clone(),
            });
        }
    }

    Ok(ValidacionRestricciones {
        es_compatible: conflictos.is_empty(),
        alimentos_conflictivos: conflictos,
    })
}

/// Soft-deletes a lonchera by clearing its active flag.
pub async fn soft_delete_lonchera(
    db: &DatabaseConnection,
    lonchera_id: i64,
) -> Result<lonchera::Model> {
    let lonchera = Lonchera::find_by_id(lonchera_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Lonchera no encontrada"))?;

    let mut activa: lonchera::ActiveModel = lonchera.into();
    activa.is_active = Set(false);
    activa.update(db).await.map_err(Into::into)
}

/// Permanently deletes a lonchera along with its food associations, writing
/// the audit snapshot first.
pub async fn hard_delete_lonchera(
    db: &DatabaseConnection,
    lonchera_id: i64,
    motivo: Option<String>,
    usuario_eliminador_id: Option<i64>,
) -> Result<()> {
    let txn = db.begin().await?;

    let lonchera = Lonchera::find_by_id(lonchera_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Lonchera no encontrada"))?;

    LoncheraAlimento::delete_many()
        .filter(lonchera_alimento::Column::LoncheraId.eq(lonchera_id))
        .exec(&txn)
        .await?;

    let datos_json = serde_json::to_string(&lonchera)?;
    crate::core::historial::record_eliminacion(
        &txn,
        "loncheras",
        lonchera_id,
        datos_json,
        motivo,
        usuario_eliminador_id,
    )
    .await?;

    lonchera.delete(&txn).await?;
    txn.commit().await?;
    Ok(())
}
