//! Alimento business logic - Handles all food-item operations.
//!
//! Alimentos carry per-100g nutritional data and a stock figure that is only
//! ever mutated through inventory movements. Creation with an initial stock
//! therefore records an `Entrada` movement in the same transaction as the
//! insert, so the movement ledger is complete from the first gram. Hard
//! deletion cleans the alimento's own association rows and recomputes every
//! affected lonchera before writing the audit snapshot.

use crate::{
    entities::{
        Alimento, LoncheraAlimento, Movimiento, Restriccion, RestriccionAlimento, alimento,
        alimento::CategoriaAlimento, lonchera_alimento, movimiento_inventario,
        movimiento_inventario::TipoMovimiento, restriccion, restriccion_alimento,
    },
    errors::{Error, Result},
};
use sea_orm::{QueryOrder, QuerySelect, Set, TransactionTrait, prelude::*};
use serde::Deserialize;

/// Reason recorded on the movement created for an initial stock.
const MOTIVO_STOCK_INICIAL: &str = "Stock inicial del alimento";

/// Payload for creating an alimento.
#[derive(Debug, Clone, Deserialize)]
pub struct AlimentoCreate {
    /// Human-readable name, checked for uniqueness
    pub nombre: String,
    /// Category of the alimento
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
    /// Starting stock; a positive value records an `Entrada` movement
    #[serde(default)]
    pub stock_inicial: i32,
}

/// Full replacement payload for an alimento. Stock is not part of it,
/// stock only changes through inventory movements.
#[derive(Debug, Clone, Deserialize)]
pub struct AlimentoReplace {
    /// New name, checked for uniqueness
    pub nombre: String,
    /// New category
    pub categoria: CategoriaAlimento,
    /// New calories per 100 grams
    pub calorias_por_100g: f64,
    /// New protein grams per 100 grams
    pub proteinas_por_100g: f64,
    /// New carbohydrate grams per 100 grams
    pub carbohidratos_por_100g: f64,
    /// New fat grams per 100 grams
    pub grasas_por_100g: f64,
    /// New price of a 100 gram portion
    pub precio_unitario: f64,
}

/// Partial update payload for an alimento. Omitted fields keep their value.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AlimentoUpdate {
    /// New name, checked for uniqueness
    pub nombre: Option<String>,
    /// New category
    pub categoria: Option<CategoriaAlimento>,
    /// New calories per 100 grams
    pub calorias_por_100g: Option<f64>,
    /// New protein grams per 100 grams
    pub proteinas_por_100g: Option<f64>,
    /// New carbohydrate grams per 100 grams
    pub carbohidratos_por_100g: Option<f64>,
    /// New fat grams per 100 grams
    pub grasas_por_100g: Option<f64>,
    /// New price of a 100 gram portion
    pub precio_unitario: Option<f64>,
}

impl AlimentoUpdate {
    /// True when no field was provided.
    #[must_use]
    pub const fn is_empty(&self) -> bool {
        self.nombre.is_none()
            && self.categoria.is_none()
            && self.calorias_por_100g.is_none()
            && self.proteinas_por_100g.is_none()
            && self.carbohidratos_por_100g.is_none()
            && self.grasas_por_100g.is_none()
            && self.precio_unitario.is_none()
    }
}

fn validate_valor(nombre_campo: &str, valor: f64) -> Result<()> {
    if valor < 0.0 || !valor.is_finite() {
        return Err(Error::invalid_input(format!(
            "El campo {nombre_campo} no puede ser negativo"
        )));
    }
    Ok(())
}

async fn check_nombre_libre(
    db: &DatabaseConnection,
    nombre: &str,
    excluir_id: Option<i64>,
) -> Result<()> {
    let mut query = Alimento::find().filter(alimento::Column::Nombre.eq(nombre));
    if let Some(id) = excluir_id {
        query = query.filter(alimento::Column::Id.ne(id));
    }
    if query.one(db).await?.is_some() {
        return Err(Error::conflict(format!(
            "Ya existe un alimento con el nombre '{nombre}'"
        )));
    }
    Ok(())
}

/// Creates a new alimento. A positive `stock_inicial` records an `Entrada`
/// movement in the same transaction, so the stored stock and the movement
/// ledger never disagree.
///
/// # Errors
/// Returns `InvalidInput` for negative values and `Conflict` when the name
/// is already taken.
pub async fn create_alimento(
    db: &DatabaseConnection,
    payload: AlimentoCreate,
) -> Result<alimento::Model> {
    let nombre = payload.nombre.trim().to_string();
    if nombre.is_empty() {
        return Err(Error::invalid_input("El nombre no puede estar vacío"));
    }
    validate_valor("calorias_por_100g", payload.calorias_por_100g)?;
    validate_valor("proteinas_por_100g", payload.proteinas_por_100g)?;
    validate_valor("carbohidratos_por_100g", payload.carbohidratos_por_100g)?;
    validate_valor("grasas_por_100g", payload.grasas_por_100g)?;
    validate_valor("precio_unitario", payload.precio_unitario)?;
    if payload.stock_inicial < 0 {
        return Err(Error::invalid_input(
            "El stock inicial no puede ser negativo",
        ));
    }

    check_nombre_libre(db, &nombre, None).await?;

    let txn = db.begin().await?;

    let nuevo = alimento::ActiveModel {
        nombre: Set(nombre),
        categoria: Set(payload.categoria),
        calorias_por_100g: Set(payload.calorias_por_100g),
        proteinas_por_100g: Set(payload.proteinas_por_100g),
        carbohidratos_por_100g: Set(payload.carbohidratos_por_100g),
        grasas_por_100g: Set(payload.grasas_por_100g),
        precio_unitario: Set(payload.precio_unitario),
        stock_actual: Set(payload.stock_inicial),
        is_active: Set(true),
        fecha_creacion: Set(chrono::Utc::now()),
        ..Default::default()
    };
    let alimento = nuevo.insert(&txn).await?;

    if payload.stock_inicial > 0 {
        let movimiento = movimiento_inventario::ActiveModel {
            alimento_id: Set(alimento.id),
            tipo_movimiento: Set(TipoMovimiento::Entrada),
            cantidad: Set(payload.stock_inicial),
            motivo: Set(Some(MOTIVO_STOCK_INICIAL.to_string())),
            fecha: Set(chrono::Utc::now()),
            stock_anterior: Set(0),
            stock_nuevo: Set(payload.stock_inicial),
            usuario_id: Set(None),
            ..Default::default()
        };
        movimiento.insert(&txn).await?;
    }

    txn.commit().await?;
    Ok(alimento)
}

/// Retrieves an active alimento by id.
///
/// # Errors
/// Returns `NotFound` when the alimento does not exist or is soft-deleted.
pub async fn get_alimento(db: &DatabaseConnection, alimento_id: i64) -> Result<alimento::Model> {
    let alimento = Alimento::find_by_id(alimento_id).one(db).await?;
    match alimento {
        Some(a) if a.is_active => Ok(a),
        _ => Err(Error::not_found("Alimento no encontrado")),
    }
}

/// Lists alimentos, newest first, with the catalog filters: category,
/// low-stock (stock at or below `stock_minimo`) and inactive visibility.
pub async fn list_alimentos(
    db: &DatabaseConnection,
    incluir_inactivos: bool,
    categoria: Option<CategoriaAlimento>,
    stock_bajo: bool,
    stock_minimo: i32,
) -> Result<Vec<alimento::Model>> {
    let mut query = Alimento::find();
    if !incluir_inactivos {
        query = query.filter(alimento::Column::IsActive.eq(true));
    }
    if let Some(categoria) = categoria {
        query = query.filter(alimento::Column::Categoria.eq(categoria));
    }
    if stock_bajo {
        query = query.filter(alimento::Column::StockActual.lte(stock_minimo));
    }
    query
        .order_by_desc(alimento::Column::FechaCreacion)
        .order_by_desc(alimento::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Replaces every descriptive field of an active alimento. The stock is left
/// untouched.
pub async fn replace_alimento(
    db: &DatabaseConnection,
    alimento_id: i64,
    payload: AlimentoReplace,
) -> Result<alimento::Model> {
    let nombre = payload.nombre.trim().to_string();
    if nombre.is_empty() {
        return Err(Error::invalid_input("El nombre no puede estar vacío"));
    }
    validate_valor("calorias_por_100g", payload.calorias_por_100g)?;
    validate_valor("proteinas_por_100g", payload.proteinas_por_100g)?;
    validate_valor("carbohidratos_por_100g", payload.carbohidratos_por_100g)?;
    validate_valor("grasas_por_100g", payload.grasas_por_100g)?;
    validate_valor("precio_unitario", payload.precio_unitario)?;

    let alimento = get_alimento(db, alimento_id).await?;
    if alimento.nombre != nombre {
        check_nombre_libre(db, &nombre, Some(alimento_id)).await?;
    }

    let mut activo: alimento::ActiveModel = alimento.into();
    activo.nombre = Set(nombre);
    activo.categoria = Set(payload.categoria);
    activo.calorias_por_100g = Set(payload.calorias_por_100g);
    activo.proteinas_por_100g = Set(payload.proteinas_por_100g);
    activo.carbohidratos_por_100g = Set(payload.carbohidratos_por_100g);
    activo.grasas_por_100g = Set(payload.grasas_por_100g);
    activo.precio_unitario = Set(payload.precio_unitario);
    activo.update(db).await.map_err(Into::into)
}

/// Applies a partial update to an active alimento.
pub async fn update_alimento(
    db: &DatabaseConnection,
    alimento_id: i64,
    payload: AlimentoUpdate,
) -> Result<alimento::Model> {
    if payload.is_empty() {
        return Err(Error::invalid_input(
            "No se proporcionaron datos para actualizar",
        ));
    }

    if let Some(valor) = payload.calorias_por_100g {
        validate_valor("calorias_por_100g", valor)?;
    }
    if let Some(valor) = payload.proteinas_por_100g {
        validate_valor("proteinas_por_100g", valor)?;
    }
    if let Some(valor) = payload.carbohidratos_por_100g {
        validate_valor("carbohidratos_por_100g", valor)?;
    }
    if let Some(valor) = payload.grasas_por_100g {
        validate_valor("grasas_por_100g", valor)?;
    }
    if let Some(valor) = payload.precio_unitario {
        validate_valor("precio_unitario", valor)?;
    }

    let alimento = get_alimento(db, alimento_id).await?;

    if let Some(nombre) = &payload.nombre {
        let nombre = nombre.trim();
        if nombre.is_empty() {
            return Err(Error::invalid_input("El nombre no puede estar vacío"));
        }
        if alimento.nombre != nombre {
            check_nombre_libre(db, nombre, Some(alimento_id)).await?;
        }
    }

    let mut activo: alimento::ActiveModel = alimento.into();
    if let Some(nombre) = payload.nombre {
        activo.nombre = Set(nombre.trim().to_string());
    }
    if let Some(categoria) = payload.categoria {
        activo.categoria = Set(categoria);
    }
    if let Some(valor) = payload.calorias_por_100g {
        activo.calorias_por_100g = Set(valor);
    }
    if let Some(valor) = payload.proteinas_por_100g {
        activo.proteinas_por_100g = Set(valor);
    }
    if let Some(valor) = payload.carbohidratos_por_100g {
        activo.carbohidratos_por_100g = Set(valor);
    }
    if let Some(valor) = payload.grasas_por_100g {
        activo.grasas_por_100g = Set(valor);
    }
    if let Some(valor) = payload.precio_unitario {
        activo.precio_unitario = Set(valor);
    }
    activo.update(db).await.map_err(Into::into)
}

/// Soft-deletes an alimento by clearing its active flag.
pub async fn soft_delete_alimento(
    db: &DatabaseConnection,
    alimento_id: i64,
) -> Result<alimento::Model> {
    let alimento = Alimento::find_by_id(alimento_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Alimento no encontrado"))?;

    let mut activo: alimento::ActiveModel = alimento.into();
    activo.is_active = Set(false);
    activo.update(db).await.map_err(Into::into)
}

/// Permanently deletes an alimento: removes its lonchera and restriccion
/// associations, recomputes every affected lonchera, writes the audit
/// snapshot and deletes the row, all in one transaction.
///
/// # Errors
/// Returns `Conflict` while inventory movements reference the alimento,
/// since the movement ledger is immutable.
pub async fn hard_delete_alimento(
    db: &DatabaseConnection,
    alimento_id: i64,
    motivo: Option<String>,
    usuario_eliminador_id: Option<i64>,
) -> Result<()> {
    let txn = db.begin().await?;

    let alimento = Alimento::find_by_id(alimento_id)
        .one(&txn)
        .await?
        .ok_or_else(|| Error::not_found("Alimento no encontrado"))?;

    let movimientos = Movimiento::find()
        .filter(movimiento_inventario::Column::AlimentoId.eq(alimento_id))
        .count(&txn)
        .await?;
    if movimientos > 0 {
        return Err(Error::conflict(format!(
            "No se puede eliminar. El alimento tiene {movimientos} movimientos de inventario. Use soft delete."
        )));
    }

    let asociaciones = LoncheraAlimento::find()
        .filter(lonchera_alimento::Column::AlimentoId.eq(alimento_id))
        .all(&txn)
        .await?;
    let loncheras_afectadas: Vec<i64> = asociaciones.iter().map(|a| a.lonchera_id).collect();

    LoncheraAlimento::delete_many()
        .filter(lonchera_alimento::Column::AlimentoId.eq(alimento_id))
        .exec(&txn)
        .await?;
    RestriccionAlimento::delete_many()
        .filter(restriccion_alimento::Column::AlimentoId.eq(alimento_id))
        .exec(&txn)
        .await?;

    for lonchera_id in loncheras_afectadas {
        crate::core::lonchera::recalculate_totales(&txn, lonchera_id).await?;
    }

    let datos_json = serde_json::to_string(&alimento)?;
    crate::core::historial::record_eliminacion(
        &txn,
        "alimentos",
        alimento_id,
        datos_json,
        motivo,
        usuario_eliminador_id,
    )
    .await?;

    alimento.delete(&txn).await?;
    txn.commit().await?;
    Ok(())
}

/// Lists the restricciones associated with an active alimento.
pub async fn get_restricciones_for_alimento(
    db: &DatabaseConnection,
    alimento_id: i64,
) -> Result<Vec<restriccion::Model>> {
    get_alimento(db, alimento_id).await?;

    let pares = RestriccionAlimento::find()
        .filter(restriccion_alimento::Column::AlimentoId.eq(alimento_id))
        .find_also_related(Restriccion)
        .all(db)
        .await?;
    Ok(pares.into_iter().filter_map(|(_, r)| r).collect())
}

/// Lists the most recent inventory movements of an active alimento.
///
/// # Errors
/// Returns `InvalidInput` when `limite` falls outside 1..=100.
pub async fn get_movimientos_for_alimento(
    db: &DatabaseConnection,
    alimento_id: i64,
    limite: u64,
) -> Result<Vec<movimiento_inventario::Model>> {
    if !(1..=100).contains(&limite) {
        return Err(Error::invalid_input("El límite debe estar entre 1 y 100"));
    }
    get_alimento(db, alimento_id).await?;

    Movimiento::find()
        .filter(movimiento_inventario::Column::AlimentoId.eq(alimento_id))
        .order_by_desc(movimiento_inventario::Column::Fecha)
        .order_by_desc(movimiento_inventario::Column::Id)
        .limit(limite)
        .all(db)
        .await
        .map_err(Into::into)
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    #![allow(clippy::float_cmp)]
    use super::*;
    use crate::core::lonchera::{AlimentoEnLonchera, add_alimento_to_lonchera, get_lonchera};
    use crate::core::restriccion::associate_alimento;
    use crate::entities::{Historial, historial_eliminacion};
    use crate::test_utils::*;
    use sea_orm::{DatabaseBackend, MockDatabase};

    #[tokio::test]
    async fn test_create_alimento_validation() -> Result<()> {
        let db = MockDatabase::new(DatabaseBackend::Sqlite).into_connection();

        let mut payload = alimento_payload("Manzana");
        payload.calorias_por_100g = -1.0;
        assert!(matches!(
            create_alimento(&db, payload).await.unwrap_err(),
            Error::InvalidInput { message: _ }
        ));

        let mut payload = alimento_payload("Manzana");
        payload.precio_unitario = f64::NAN;
        assert!(matches!(
            create_alimento(&db, payload).await.unwrap_err(),
            Error::InvalidInput { message: _ }
        ));

        let mut payload = alimento_payload("Manzana");
        payload.stock_inicial = -5;
        assert!(matches!(
            create_alimento(&db, payload).await.unwrap_err(),
            Error::InvalidInput { message: _ }
        ));

        let payload = alimento_payload("   ");
        assert!(matches!(
            create_alimento(&db, payload).await.unwrap_err(),
            Error::InvalidInput { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_alimento_duplicate_nombre() -> Result<()> {
        let db = setup_test_db().await?;

        create_test_alimento(&db, "Manzana").await?;
        let result = create_test_alimento(&db, "Manzana").await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Conflict { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_create_alimento_with_stock_inicial() -> Result<()> {
        let db = setup_test_db().await?;

        let mut payload = alimento_payload("Manzana");
        payload.stock_inicial = 25;
        let alimento = create_alimento(&db, payload).await?;

        assert_eq!(alimento.stock_actual, 25);

        let movimientos = get_movimientos_for_alimento(&db, alimento.id, 50).await?;
        assert_eq!(movimientos.len(), 1);
        assert_eq!(movimientos[0].tipo_movimiento, TipoMovimiento::Entrada);
        assert_eq!(movimientos[0].stock_anterior, 0);
        assert_eq!(movimientos[0].stock_nuevo, 25);
        assert_eq!(
            movimientos[0].motivo.as_deref(),
            Some("Stock inicial del alimento")
        );

        Ok(())
    }

    #[tokio::test]
    async fn test_create_alimento_zero_stock_no_movimiento() -> Result<()> {
        let db = setup_test_db().await?;

        let alimento = create_test_alimento(&db, "Manzana").await?;
        assert_eq!(alimento.stock_actual, 0);

        let movimientos = get_movimientos_for_alimento(&db, alimento.id, 50).await?;
        assert!(movimientos.is_empty());

        Ok(())
    }

    #[tokio::test]
    async fn test_list_alimentos_filters() -> Result<()> {
        let db = setup_test_db().await?;

        let mut fruta = alimento_payload("Manzana");
        fruta.stock_inicial = 50;
        create_alimento(&db, fruta).await?;

        let mut lacteo = alimento_payload("Yogur");
        lacteo.categoria = CategoriaAlimento::Lacteos;
        lacteo.stock_inicial = 3;
        create_alimento(&db, lacteo).await?;

        let inactivo = create_test_alimento(&db, "Galletas").await?;
        soft_delete_alimento(&db, inactivo.id).await?;

        // Default listing hides the inactive row
        let visibles = list_alimentos(&db, false, None, false, 10).await?;
        assert_eq!(visibles.len(), 2);

        let todos = list_alimentos(&db, true, None, false, 10).await?;
        assert_eq!(todos.len(), 3);

        let lacteos =
            list_alimentos(&db, false, Some(CategoriaAlimento::Lacteos), false, 10).await?;
        assert_eq!(lacteos.len(), 1);
        assert_eq!(lacteos[0].nombre, "Yogur");

        // Low stock: at or below the threshold
        let escasos = list_alimentos(&db, false, None, true, 10).await?;
        assert_eq!(escasos.len(), 1);
        assert_eq!(escasos[0].nombre, "Yogur");

        Ok(())
    }

    #[tokio::test]
    async fn test_replace_alimento_keeps_stock() -> Result<()> {
        let db = setup_test_db().await?;

        let mut payload = alimento_payload("Manzana");
        payload.stock_inicial = 10;
        let alimento = create_alimento(&db, payload).await?;

        let reemplazado = replace_alimento(
            &db,
            alimento.id,
            AlimentoReplace {
                nombre: "Manzana verde".to_string(),
                categoria: CategoriaAlimento::Frutas,
                calorias_por_100g: 55.0,
                proteinas_por_100g: 0.4,
                carbohidratos_por_100g: 14.0,
                grasas_por_100g: 0.1,
                precio_unitario: 0.8,
            },
        )
        .await?;

        assert_eq!(reemplazado.nombre, "Manzana verde");
        assert_eq!(reemplazado.calorias_por_100g, 55.0);
        assert_eq!(reemplazado.stock_actual, 10);

        Ok(())
    }

    #[tokio::test]
    async fn test_update_alimento_partial() -> Result<()> {
        let db = setup_test_db().await?;

        let alimento = create_test_alimento(&db, "Manzana").await?;
        let actualizado = update_alimento(
            &db,
            alimento.id,
            AlimentoUpdate {
                precio_unitario: Some(2.5),
                ..Default::default()
            },
        )
        .await?;

        assert_eq!(actualizado.precio_unitario, 2.5);
        assert_eq!(actualizado.nombre, alimento.nombre);

        let result = update_alimento(&db, alimento.id, AlimentoUpdate::default()).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidInput { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_update_alimento_duplicate_nombre() -> Result<()> {
        let db = setup_test_db().await?;

        create_test_alimento(&db, "Manzana").await?;
        let pera = create_test_alimento(&db, "Pera").await?;

        let result = update_alimento(
            &db,
            pera.id,
            AlimentoUpdate {
                nombre: Some("Manzana".to_string()),
                ..Default::default()
            },
        )
        .await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Conflict { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_soft_delete_alimento_hides_it() -> Result<()> {
        let db = setup_test_db().await?;

        let alimento = create_test_alimento(&db, "Manzana").await?;
        soft_delete_alimento(&db, alimento.id).await?;

        let result = get_alimento(&db, alimento.id).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::NotFound { message: _ }
        ));

        Ok(())
    }

    #[tokio::test]
    async fn test_hard_delete_alimento_blocked_by_movimientos() -> Result<()> {
        let db = setup_test_db().await?;

        let mut payload = alimento_payload("Manzana");
        payload.stock_inicial = 5;
        let alimento = create_alimento(&db, payload).await?;

        let result = hard_delete_alimento(&db, alimento.id, None, None).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::Conflict { message: _ }
        ));
        assert!(Alimento::find_by_id(alimento.id).one(&db).await?.is_some());

        Ok(())
    }

    #[tokio::test]
    async fn test_hard_delete_alimento_cleans_associations() -> Result<()> {
        let db = setup_test_db().await?;

        let usuario = create_test_usuario(&db, "111").await?;
        let lonchera = create_test_lonchera(&db, usuario.id, "Lonchera escolar").await?;
        let manzana = create_test_alimento(&db, "Manzana").await?;
        let pera = create_test_alimento(&db, "Pera").await?;
        let restriccion = create_test_restriccion(&db, "Sin azúcar").await?;

        add_alimento_to_lonchera(
            &db,
            lonchera.id,
            AlimentoEnLonchera {
                alimento_id: manzana.id,
                cantidad_gramos: 100.0,
            },
        )
        .await?;
        add_alimento_to_lonchera(
            &db,
            lonchera.id,
            AlimentoEnLonchera {
                alimento_id: pera.id,
                cantidad_gramos: 100.0,
            },
        )
        .await?;
        associate_alimento(&db, restriccion.id, manzana.id).await?;

        // Both contribute 200 kcal / 1.00 each at 100 g
        assert_eq!(get_lonchera(&db, lonchera.id).await?.calorias, 400);

        hard_delete_alimento(&db, manzana.id, Some("descatalogado".to_string()), None).await?;

        // Association rows are gone and the lonchera was recomputed
        assert!(Alimento::find_by_id(manzana.id).one(&db).await?.is_none());
        assert_eq!(
            RestriccionAlimento::find().count(&db).await?,
            0,
            "restriccion associations must be removed"
        );
        let recalculada = get_lonchera(&db, lonchera.id).await?;
        assert_eq!(recalculada.calorias, 200);
        assert_eq!(recalculada.precio, 1.0);

        // Exactly one audit row whose snapshot round-trips
        let auditorias = Historial::find()
            .filter(historial_eliminacion::Column::TablaNombre.eq("alimentos"))
            .all(&db)
            .await?;
        assert_eq!(auditorias.len(), 1);
        let restaurado: alimento::Model = serde_json::from_str(&auditorias[0].datos_json)?;
        assert_eq!(restaurado, manzana);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_restricciones_for_alimento() -> Result<()> {
        let db = setup_test_db().await?;

        let alimento = create_test_alimento(&db, "Manzana").await?;
        let restriccion = create_test_restriccion(&db, "Sin azúcar").await?;
        associate_alimento(&db, restriccion.id, alimento.id).await?;

        let restricciones = get_restricciones_for_alimento(&db, alimento.id).await?;
        assert_eq!(restricciones.len(), 1);
        assert_eq!(restricciones[0].id, restriccion.id);

        Ok(())
    }

    #[tokio::test]
    async fn test_get_movimientos_limite_fuera_de_rango() -> Result<()> {
        let db = setup_test_db().await?;
        let alimento = create_test_alimento(&db, "Manzana").await?;

        let result = get_movimientos_for_alimento(&db, alimento.id, 0).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidInput { message: _ }
        ));
        let result = get_movimientos_for_alimento(&db, alimento.id, 101).await;
        assert!(matches!(
            result.unwrap_err(),
            Error::InvalidInput { message: _ }
        ));

        Ok(())
    }
}
