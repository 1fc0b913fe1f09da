//! Inventory business logic - Handles stock movements and inventory reports.
//!
//! Stock only changes through recorded movements. Each movement captures the
//! stock before and after it was applied, so the ledger replays to the
//! current stock figure. `Entrada` and `Salida` apply the magnitude of the
//! submitted quantity while `Ajuste` sets the stock to the quantity itself;
//! the raw quantity is stored as submitted either way.

use crate::{
    entities::{
        Alimento, Movimiento, Usuario, alimento, alimento::CategoriaAlimento,
        movimiento_inventario, movimiento_inventario::TipoMovimiento, usuario,
    },
    errors::{Error, Result},
};
use chrono::{NaiveDate, NaiveTime};
use sea_orm::{Iterable, QueryOrder, Set, TransactionTrait, prelude::*};
use serde::{Deserialize, Serialize};

/// Stock at or below this count as low in reports.
pub const STOCK_BAJO_UMBRAL: i32 = 10;

const MOTIVO_MAX: usize = 200;

/// Payload for registering an inventory movement.
#[derive(Debug, Clone, Deserialize)]
pub struct MovimientoCreate {
    /// Alimento whose stock moves
    pub alimento_id: i64,
    /// Kind of movement
    pub tipo_movimiento: TipoMovimiento,
    /// Submitted quantity; sign is ignored except for `Ajuste`, where it is
    /// the new absolute stock
    pub cantidad: i32,
    /// Optional reason, at most 200 characters
    #[serde(default)]
    pub motivo: Option<String>,
    /// Usuario who registered the movement, if known
    #[serde(default)]
    pub usuario_id: Option<i64>,
}

/// Stock summary of one food category.
#[derive(Debug, Clone, Serialize)]
pub struct CategoriaResumen {
    /// The category
    pub categoria: CategoriaAlimento,
    /// Active alimentos in it
    pub cantidad_items: usize,
    /// Units in stock across them
    pub stock_total: i64,
    /// Stock valued at the unit price, two decimals
    pub valor_total: f64,
}

/// Snapshot of the whole inventory.
#[derive(Debug, Clone, Serialize)]
pub struct ReporteInventario {
    /// Active alimentos
    pub total_items: usize,
    /// Stock valued at the unit prices, two decimals
    pub valor_total_inventario: f64,
    /// Alimentos with stock above zero but at or below the low threshold
    pub items_stock_bajo: usize,
    /// Alimentos with zero stock
    pub items_sin_stock: usize,
    /// Per-category summaries, only categories with at least one alimento
    pub por_categoria: Vec<CategoriaResumen>,
}

fn round2(valor: f64) -> f64 {
    (valor * 100.0).round() / 100.0
}

/// Registers an inventory movement and applies it to the alimento's stock in
/// one transaction.
///
/// # Errors
/// Returns `InvalidInput` for a zero quantity, an over-long reason or a
/// negative `Ajuste` target, `NotFound` for a missing or inactive alimento
/// or usuario, and `InsufficientStock` when a `Salida` would overdraw.
pub async fn create_movimiento(
    db: &DatabaseConnection,
    payload: MovimientoCreate,
) -> Result<movimiento_inventario::Model> {
    if payload.cantidad == 0 {
        return Err(Error::invalid_input("La cantidad no puede ser cero"));
    }
    if let Some(motivo) = &payload.motivo {
        if motivo.chars().count() > MOTIVO_MAX {
            return Err(Error::invalid_input(format!(
                "El motivo no puede exceder {MOTIVO_MAX} caracteres"
            )));
        }
    }

    let txn = db.begin().await?;

    let alimento = Alimento::find_by_id(payload.alimento_id).one(&txn).await?;
    let alimento = match alimento {
        Some(a) if a.is_active => a,
        _ => return Err(Error::not_found("Alimento no encontrado")),
    };

    if let Some(usuario_id) = payload.usuario_id {
        let usuario = Usuario::find_by_id(usuario_id)
            .filter(usuario::Column::IsActive.eq(true))
            .one(&txn)
            .await?;
        if usuario.is_none() {
            return Err(Error::not_found("Usuario no encontrado o inactivo"));
        }
    }

    let stock_anterior = alimento.stock_actual;
    // unsigned_abs sidesteps the i32::MIN overflow
    let magnitud = payload.cantidad.unsigned_abs();
    let stock_nuevo = match payload.tipo_movimiento {
        TipoMovimiento::Entrada => stock_anterior.saturating_add_unsigned(magnitud),
        TipoMovimiento::Salida => {
            if magnitud > stock_anterior.unsigned_abs() {
                return Err(Error::InsufficientStock {
                    disponible: stock_anterior,
                    solicitado: i32::try_from(magnitud).unwrap_or(i32::MAX),
                });
            }
            stock_anterior.saturating_sub_unsigned(magnitud)
        }
        TipoMovimiento::Ajuste => {
            if payload.cantidad < 0 {
                return Err(Error::invalid_input("El stock no puede ser negativo"));
            }
            payload.cantidad
        }
    };

    let movimiento = movimiento_inventario::ActiveModel {
        alimento_id: Set(payload.alimento_id),
        tipo_movimiento: Set(payload.tipo_movimiento),
        cantidad: Set(payload.cantidad),
        motivo: Set(payload.motivo),
        fecha: Set(chrono::Utc::now()),
        stock_anterior: Set(stock_anterior),
        stock_nuevo: Set(stock_nuevo),
        usuario_id: Set(payload.usuario_id),
        ..Default::default()
    };
    let movimiento = movimiento.insert(&txn).await?;

    let mut activo: alimento::ActiveModel = alimento.into();
    activo.stock_actual = Set(stock_nuevo);
    activo.update(&txn).await?;

    txn.commit().await?;
    Ok(movimiento)
}

/// Retrieves a movement by id.
pub async fn get_movimiento(
    db: &DatabaseConnection,
    movimiento_id: i64,
) -> Result<movimiento_inventario::Model> {
    Movimiento::find_by_id(movimiento_id)
        .one(db)
        .await?
        .ok_or_else(|| Error::not_found("Movimiento no encontrado"))
}

/// Lists movements, newest first, with optional alimento, kind and date
/// window filters. The window is inclusive on both calendar days.
pub async fn list_movimientos(
    db: &DatabaseConnection,
    alimento_id: Option<i64>,
    tipo_movimiento: Option<TipoMovimiento>,
    fecha_desde: Option<NaiveDate>,
    fecha_hasta: Option<NaiveDate>,
) -> Result<Vec<movimiento_inventario::Model>> {
    let mut query = Movimiento::find();
    if let Some(alimento_id) = alimento_id {
        query = query.filter(movimiento_inventario::Column::AlimentoId.eq(alimento_id));
    }
    if let Some(tipo) = tipo_movimiento {
        query = query.filter(movimiento_inventario::Column::TipoMovimiento.eq(tipo));
    }
    if let Some(desde) = fecha_desde {
        let inicio = desde.and_time(NaiveTime::MIN).and_utc();
        query = query.filter(movimiento_inventario::Column::Fecha.gte(inicio));
    }
    if let Some(hasta) = fecha_hasta {
        // Exclusive bound at the start of the following day
        if let Some(siguiente) = hasta.succ_opt() {
            let fin = siguiente.and_time(NaiveTime::MIN).and_utc();
            query = query.filter(movimiento_inventario::Column::Fecha.lt(fin));
        }
    }
    query
        .order_by_desc(movimiento_inventario::Column::Fecha)
        .order_by_desc(movimiento_inventario::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Lists active alimentos whose stock is at or below `umbral`, emptiest
/// first.
pub async fn get_alimentos_stock_bajo(
    db: &DatabaseConnection,
    umbral: i32,
) -> Result<Vec<alimento::Model>> {
    Alimento::find()
        .filter(alimento::Column::IsActive.eq(true))
        .filter(alimento::Column::StockActual.lte(umbral))
        .order_by_asc(alimento::Column::StockActual)
        .order_by_asc(alimento::Column::Id)
        .all(db)
        .await
        .map_err(Into::into)
}

/// Builds the inventory snapshot over the active alimentos.
pub async fn generate_reporte_inventario(db: &DatabaseConnection) -> Result<ReporteInventario> {
    let alimentos = Alimento::find()
        .filter(alimento::Column::IsActive.eq(true))
        .all(db)
        .await?;

    let mut valor_total = 0.0_f64;
    let mut items_stock_bajo = 0;
    let mut items_sin_stock = 0;
    for alimento in &alimentos {
        valor_total += f64::from(alimento.stock_actual) * alimento.precio_unitario;
        if alimento.stock_actual == 0 {
            items_sin_stock += 1;
        } else if alimento.stock_actual <= STOCK_BAJO_UMBRAL {
            items_stock_bajo += 1;
        }
    }

    let mut por_categoria = Vec::new();
    for categoria in CategoriaAlimento::iter() {
        let del_grupo: Vec<&alimento::Model> = alimentos
            .iter()
            .filter(|a| a.categoria == categoria)
            .collect();
        if del_grupo.is_empty() {
            continue;
        }
        let stock_total = del_grupo
            .iter()
            .map(|a| i64::from(a.stock_actual))
            .sum::<i64>();
        let valor_del_grupo = del_grupo
            .iter()
            .map(|a| f64::from(a.stock_actual) * a.precio_unitario)
            .sum::<f64>();
        por_categoria.push(CategoriaResumen {
            categoria,
            cantidad_items: del_grupo.len(),
            stock_total,
            valor_total: round2(valor_del_grupo),
        });
    }

    Ok(ReporteInventario {
        total_items: alimentos.len(),
        valor_total_inventario: round2(valor_total),
        items_stock_bajo,
        items_sin_stock,
        por_categoria,
    })
}
