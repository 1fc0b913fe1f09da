//! Handlers for the `/historial` resource.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    response::IntoResponse,
    routing::get,
};
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::core::historial;
use crate::errors::Error;

/// Routes for the deletion audit trail.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", get(list))
        .route("/estadisticas/resumen", get(estadisticas))
        .route("/por-tabla/:tabla_nombre", get(por_tabla))
        .route("/:id", get(get_one).delete(remove))
        .route("/:id/datos", get(datos))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    tabla_nombre: Option<String>,
    usuario_id: Option<i64>,
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, Error> {
    let registros =
        historial::list_historial(&state.db, query.tabla_nombre, query.usuario_id).await?;
    Ok(Json(registros))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let registro = historial::get_historial(&state.db, id).await?;
    Ok(Json(registro))
}

/// Returns the decoded snapshot of a deleted record next to its audit
/// metadata.
async fn datos(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let registro = historial::get_historial(&state.db, id).await?;
    let datos = historial::get_datos(&state.db, id).await?;
    Ok(Json(json!({
        "tabla": registro.tabla_nombre,
        "registro_id": registro.registro_id,
        "fecha_eliminacion": registro.fecha_eliminacion,
        "motivo": registro.motivo,
        "datos": datos,
    })))
}

async fn por_tabla(
    State(state): State<AppState>,
    Path(tabla_nombre): Path<String>,
) -> Result<impl IntoResponse, Error> {
    let registros = historial::list_historial(&state.db, Some(tabla_nombre), None).await?;
    Ok(Json(registros))
}

async fn estadisticas(State(state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let resumen = historial::generate_estadisticas(&state.db).await?;
    Ok(Json(resumen))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    historial::delete_historial(&state.db, id).await?;
    Ok(Json(json!({ "message": "Registro de historial eliminado" })))
}
