//! Handlers for the `/alimentos` resource.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;

use super::AppState;
use crate::core::alimento::{self, AlimentoCreate, AlimentoReplace, AlimentoUpdate};
use crate::core::inventario::{self, MovimientoCreate, STOCK_BAJO_UMBRAL};
use crate::entities::alimento::CategoriaAlimento;
use crate::entities::movimiento_inventario::TipoMovimiento;
use crate::errors::Error;

/// Routes for the food catalog.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(list))
        .route("/:id", get(get_one).put(replace).patch(update).delete(remove))
        .route("/:id/restricciones", get(restricciones))
        .route("/:id/movimientos", get(movimientos))
        .route("/:id/ajustar-stock", post(ajustar_stock))
}

const fn default_stock_minimo() -> i32 {
    STOCK_BAJO_UMBRAL
}

const fn default_limite() -> u64 {
    50
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default)]
    incluir_inactivos: bool,
    categoria: Option<CategoriaAlimento>,
    #[serde(default)]
    stock_bajo: bool,
    #[serde(default = "default_stock_minimo")]
    stock_minimo: i32,
}

#[derive(Debug, Deserialize)]
struct EliminarQuery {
    #[serde(default)]
    hard_delete: bool,
    motivo: Option<String>,
    usuario_eliminador_id: Option<i64>,
}

#[derive(Debug, Deserialize)]
struct MovimientosQuery {
    #[serde(default = "default_limite")]
    limite: u64,
}

#[derive(Debug, Deserialize)]
struct AjusteQuery {
    tipo_movimiento: TipoMovimiento,
    cantidad: i32,
    motivo: String,
    usuario_id: Option<i64>,
}

async fn create(
    State(state): State<AppState>,
    Json(payload): Json<AlimentoCreate>,
) -> Result<impl IntoResponse, Error> {
    let creado = alimento::create_alimento(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(creado)))
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, Error> {
    let alimentos = alimento::list_alimentos(
        &state.db,
        query.incluir_inactivos,
        query.categoria,
        query.stock_bajo,
        query.stock_minimo,
    )
    .await?;
    Ok(Json(alimentos))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let encontrado = alimento::get_alimento(&state.db, id).await?;
    Ok(Json(encontrado))
}

async fn replace(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AlimentoReplace>,
) -> Result<impl IntoResponse, Error> {
    let actualizado = alimento::replace_alimento(&state.db, id, payload).await?;
    Ok(Json(actualizado))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AlimentoUpdate>,
) -> Result<impl IntoResponse, Error> {
    let actualizado = alimento::update_alimento(&state.db, id, payload).await?;
    Ok(Json(actualizado))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<EliminarQuery>,
) -> Result<impl IntoResponse, Error> {
    if query.hard_delete {
        let motivo = query
            .motivo
            .or_else(|| Some("Eliminación permanente".to_string()));
        alimento::hard_delete_alimento(&state.db, id, motivo, query.usuario_eliminador_id).await?;
    } else {
        alimento::soft_delete_alimento(&state.db, id).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn restricciones(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let asociadas = alimento::get_restricciones_for_alimento(&state.db, id).await?;
    Ok(Json(asociadas))
}

async fn movimientos(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<MovimientosQuery>,
) -> Result<impl IntoResponse, Error> {
    let historial = alimento::get_movimientos_for_alimento(&state.db, id, query.limite).await?;
    Ok(Json(historial))
}

/// Registers a movement against the alimento and returns it with the stock
/// already updated.
async fn ajustar_stock(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<AjusteQuery>,
) -> Result<impl IntoResponse, Error> {
    inventario::create_movimiento(
        &state.db,
        MovimientoCreate {
            alimento_id: id,
            tipo_movimiento: query.tipo_movimiento,
            cantidad: query.cantidad,
            motivo: Some(query.motivo),
            usuario_id: query.usuario_id,
        },
    )
    .await?;
    let actualizado = alimento::get_alimento(&state.db, id).await?;
    Ok(Json(actualizado))
}
