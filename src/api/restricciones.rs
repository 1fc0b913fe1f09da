//! Handlers for the `/restricciones` resource.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::Deserialize;

use super::AppState;
use crate::core::restriccion::{self, RestriccionCreate, RestriccionUpdate};
use crate::entities::restriccion::NivelSeveridad;
use crate::errors::Error;

/// Routes for dietary restriction management.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(list))
        .route("/buscar-compatibles", post(buscar_compatibles))
        .route("/estadisticas/resumen", get(estadisticas))
        .route("/:id", get(get_one).patch(update).delete(remove))
        .route("/:id/alimento/:alimento_id", post(asociar).delete(desasociar))
        .route("/:id/alimentos", get(alimentos))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    nivel_severidad: Option<NivelSeveridad>,
}

async fn create(
    State(state): State<AppState>,
    Json(payload): Json<RestriccionCreate>,
) -> Result<impl IntoResponse, Error> {
    let creada = restriccion::create_restriccion(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(creada)))
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, Error> {
    let restricciones = restriccion::list_restricciones(&state.db, query.nivel_severidad).await?;
    Ok(Json(restricciones))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let encontrada = restriccion::get_restriccion(&state.db, id).await?;
    Ok(Json(encontrada))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<RestriccionUpdate>,
) -> Result<impl IntoResponse, Error> {
    let actualizada = restriccion::update_restriccion(&state.db, id, payload).await?;
    Ok(Json(actualizada))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    restriccion::delete_restriccion(&state.db, id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn asociar(
    State(state): State<AppState>,
    Path((id, alimento_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, Error> {
    let asociacion = restriccion::associate_alimento(&state.db, id, alimento_id).await?;
    Ok((StatusCode::CREATED, Json(asociacion)))
}

async fn desasociar(
    State(state): State<AppState>,
    Path((id, alimento_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, Error> {
    restriccion::dissociate_alimento(&state.db, id, alimento_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn alimentos(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let asociados = restriccion::get_alimentos_for_restriccion(&state.db, id).await?;
    Ok(Json(asociados))
}

async fn buscar_compatibles(
    State(state): State<AppState>,
    Json(restriccion_ids): Json<Vec<i64>>,
) -> Result<impl IntoResponse, Error> {
    let compatibles = restriccion::find_compatible_alimentos(&state.db, &restriccion_ids).await?;
    Ok(Json(compatibles))
}

async fn estadisticas(State(state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let resumen = restriccion::generate_estadisticas(&state.db).await?;
    Ok(Json(resumen))
}
