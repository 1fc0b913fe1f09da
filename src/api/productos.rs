//! Handlers for the `/productos` resource.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, patch, post},
};
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::core::producto::{self, ProductoCreate, ProductoUpdate};
use crate::errors::Error;

/// Routes for the sellable product catalog.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(list))
        .route("/estadisticas/resumen", get(estadisticas))
        .route("/:id", get(get_one).put(update).delete(remove))
        .route("/:id/stock", patch(stock))
        .route("/:id/reactivar", post(reactivar))
        .route("/:id/pedidos", get(pedidos))
}

const fn default_limite_stock() -> i32 {
    10
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default)]
    incluir_inactivos: bool,
    #[serde(default)]
    stock_bajo: bool,
    #[serde(default = "default_limite_stock")]
    limite_stock: i32,
}

#[derive(Debug, Deserialize)]
struct StockQuery {
    cantidad: i32,
}

#[derive(Debug, Deserialize)]
struct EliminarQuery {
    #[serde(default)]
    hard_delete: bool,
    motivo: Option<String>,
    usuario_eliminador_id: Option<i64>,
}

async fn create(
    State(state): State<AppState>,
    Json(payload): Json<ProductoCreate>,
) -> Result<impl IntoResponse, Error> {
    let creado = producto::create_producto(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(creado)))
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, Error> {
    let productos = producto::list_productos(
        &state.db,
        query.incluir_inactivos,
        query.stock_bajo,
        query.limite_stock,
    )
    .await?;
    Ok(Json(productos))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let encontrado = producto::get_producto(&state.db, id).await?;
    Ok(Json(encontrado))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<ProductoUpdate>,
) -> Result<impl IntoResponse, Error> {
    let actualizado = producto::update_producto(&state.db, id, payload).await?;
    Ok(Json(actualizado))
}

/// Applies a signed stock delta and reports the change.
async fn stock(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<StockQuery>,
) -> Result<impl IntoResponse, Error> {
    let actualizado = producto::adjust_stock(&state.db, id, query.cantidad).await?;
    Ok(Json(json!({
        "producto_id": id,
        "stock_anterior": actualizado.stock_actual.saturating_sub(query.cantidad),
        "ajuste": query.cantidad,
        "stock_nuevo": actualizado.stock_actual,
    })))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<EliminarQuery>,
) -> Result<impl IntoResponse, Error> {
    let mensaje = if query.hard_delete {
        let motivo = query
            .motivo
            .or_else(|| Some("Eliminación permanente".to_string()));
        producto::hard_delete_producto(&state.db, id, motivo, query.usuario_eliminador_id).await?;
        "Producto eliminado permanentemente"
    } else {
        producto::soft_delete_producto(&state.db, id).await?;
        "Producto desactivado correctamente"
    };
    Ok(Json(json!({ "message": mensaje, "id": id })))
}

async fn reactivar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let reactivado = producto::reactivate_producto(&state.db, id).await?;
    Ok(Json(reactivado))
}

async fn pedidos(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let asociados = producto::get_pedidos_for_producto(&state.db, id).await?;
    Ok(Json(asociados))
}

async fn estadisticas(State(state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let resumen = producto::generate_estadisticas(&state.db).await?;
    Ok(Json(resumen))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::errors::Result;
    use crate::test_utils::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};

    #[tokio::test]
    async fn test_stock_patch_reports_change() -> Result<()> {
        let db = setup_test_db().await?;
        let jugo = create_test_producto(&db, "Jugo", 1.5, 10).await?;

        let request = Request::patch(format!("/productos/{}/stock?cantidad=-4", jugo.id))
            .body(Body::empty())
            .unwrap();
        let respuesta = send_request(&db, request).await;
        assert_eq!(respuesta.status(), StatusCode::OK);
        let cuerpo = body_json(respuesta).await;
        assert_eq!(cuerpo["stock_anterior"], 10);
        assert_eq!(cuerpo["ajuste"], -4);
        assert_eq!(cuerpo["stock_nuevo"], 6);
        Ok(())
    }

    #[tokio::test]
    async fn test_stock_patch_cannot_go_negative() -> Result<()> {
        let db = setup_test_db().await?;
        let jugo = create_test_producto(&db, "Jugo", 1.5, 3).await?;

        let request = Request::patch(format!("/productos/{}/stock?cantidad=-5", jugo.id))
            .body(Body::empty())
            .unwrap();
        let respuesta = send_request(&db, request).await;
        assert_eq!(respuesta.status(), StatusCode::BAD_REQUEST);

        let request = Request::get(format!("/productos/{}", jugo.id))
            .body(Body::empty())
            .unwrap();
        let cuerpo = body_json(send_request(&db, request).await).await;
        assert_eq!(cuerpo["stock_actual"], 3);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_and_reactivar_flow() -> Result<()> {
        let db = setup_test_db().await?;
        let jugo = create_test_producto(&db, "Jugo", 1.5, 10).await?;

        let request = Request::delete(format!("/productos/{}", jugo.id))
            .body(Body::empty())
            .unwrap();
        let cuerpo = body_json(send_request(&db, request).await).await;
        assert_eq!(cuerpo["message"], "Producto desactivado correctamente");

        let request = Request::post(format!("/productos/{}/reactivar", jugo.id))
            .body(Body::empty())
            .unwrap();
        let respuesta = send_request(&db, request).await;
        assert_eq!(respuesta.status(), StatusCode::OK);
        let cuerpo = body_json(respuesta).await;
        assert_eq!(cuerpo["is_active"], true);
        Ok(())
    }
}
