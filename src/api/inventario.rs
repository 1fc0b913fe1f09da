//! Handlers for the `/inventario` resource.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use chrono::NaiveDate;
use serde::Deserialize;

use super::AppState;
use crate::core::inventario::{self, MovimientoCreate, STOCK_BAJO_UMBRAL};
use crate::entities::movimiento_inventario::TipoMovimiento;
use crate::errors::Error;

/// Routes for the alimento stock movement log.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/movimientos", post(create_movimiento).get(list_movimientos))
        .route("/movimientos/:id", get(get_movimiento))
        .route("/stock-bajo", get(stock_bajo))
        .route("/reporte-inventario", get(reporte))
}

const fn default_limite() -> i32 {
    STOCK_BAJO_UMBRAL
}

#[derive(Debug, Deserialize)]
struct MovimientosQuery {
    alimento_id: Option<i64>,
    tipo_movimiento: Option<TipoMovimiento>,
    fecha_desde: Option<NaiveDate>,
    fecha_hasta: Option<NaiveDate>,
}

#[derive(Debug, Deserialize)]
struct StockBajoQuery {
    #[serde(default = "default_limite")]
    limite: i32,
}

async fn create_movimiento(
    State(state): State<AppState>,
    Json(payload): Json<MovimientoCreate>,
) -> Result<impl IntoResponse, Error> {
    let registrado = inventario::create_movimiento(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(registrado)))
}

async fn list_movimientos(
    State(state): State<AppState>,
    Query(query): Query<MovimientosQuery>,
) -> Result<impl IntoResponse, Error> {
    let movimientos = inventario::list_movimientos(
        &state.db,
        query.alimento_id,
        query.tipo_movimiento,
        query.fecha_desde,
        query.fecha_hasta,
    )
    .await?;
    Ok(Json(movimientos))
}

async fn get_movimiento(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let encontrado = inventario::get_movimiento(&state.db, id).await?;
    Ok(Json(encontrado))
}

async fn stock_bajo(
    State(state): State<AppState>,
    Query(query): Query<StockBajoQuery>,
) -> Result<impl IntoResponse, Error> {
    let alimentos = inventario::get_alimentos_stock_bajo(&state.db, query.limite).await?;
    Ok(Json(alimentos))
}

async fn reporte(State(state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let resumen = inventario::generate_reporte_inventario(&state.db).await?;
    Ok(Json(resumen))
}
