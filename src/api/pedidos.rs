//! Handlers for the `/pedidos` resource.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post, put},
};
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::core::pedido::{self, LineaPedido, PedidoCreate};
use crate::entities::pedido::EstadoPedido;
use crate::errors::Error;

/// Routes for orders and their state machine.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(list))
        .route("/:id", get(get_one).delete(cancel))
        .route("/:id/detalle", get(detalle))
        .route(
            "/:id/productos/:producto_id",
            post(add_producto).delete(remove_producto),
        )
        .route("/:id/confirmar", post(confirmar))
        .route("/:id/estado", put(estado))
}

const fn default_cantidad() -> i32 {
    1
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    usuario_id: Option<i64>,
    estado: Option<EstadoPedido>,
}

#[derive(Debug, Deserialize)]
struct CantidadQuery {
    #[serde(default = "default_cantidad")]
    cantidad: i32,
}

#[derive(Debug, Deserialize)]
struct EstadoQuery {
    nuevo_estado: EstadoPedido,
}

async fn create(
    State(state): State<AppState>,
    Json(payload): Json<PedidoCreate>,
) -> Result<impl IntoResponse, Error> {
    let creado = pedido::create_pedido(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(creado)))
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, Error> {
    let pedidos = pedido::list_pedidos(&state.db, query.usuario_id, query.estado).await?;
    Ok(Json(pedidos))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let encontrado = pedido::get_pedido(&state.db, id).await?;
    Ok(Json(encontrado))
}

async fn detalle(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let vista = pedido::get_pedido_detalle(&state.db, id).await?;
    Ok(Json(vista))
}

async fn add_producto(
    State(state): State<AppState>,
    Path((id, producto_id)): Path<(i64, i64)>,
    Query(query): Query<CantidadQuery>,
) -> Result<impl IntoResponse, Error> {
    let linea = LineaPedido {
        producto_id,
        cantidad: query.cantidad,
    };
    let actualizado = pedido::add_producto_to_pedido(&state.db, id, linea).await?;
    Ok((StatusCode::CREATED, Json(actualizado)))
}

async fn remove_producto(
    State(state): State<AppState>,
    Path((id, producto_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, Error> {
    let actualizado = pedido::remove_producto_from_pedido(&state.db, id, producto_id).await?;
    Ok(Json(actualizado))
}

async fn confirmar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let confirmado = pedido::confirm_pedido(&state.db, id).await?;
    Ok(Json(confirmado))
}

async fn estado(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<EstadoQuery>,
) -> Result<impl IntoResponse, Error> {
    let actualizado = pedido::update_estado(&state.db, id, query.nuevo_estado).await?;
    Ok(Json(actualizado))
}

async fn cancel(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    pedido::cancel_pedido(&state.db, id).await?;
    Ok(Json(json!({
        "message": "Pedido cancelado exitosamente",
        "pedido_id": id,
    })))
}
