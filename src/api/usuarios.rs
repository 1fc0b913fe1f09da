//! Handlers for the `/usuarios` resource.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde::Deserialize;
use serde_json::json;

use super::AppState;
use crate::core::usuario::{self, UsuarioCreate, UsuarioUpdate};
use crate::errors::Error;

/// Routes for usuario management.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(list))
        .route("/:id", get(get_one).put(update).delete(remove))
        .route("/:id/reactivar", post(reactivar))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    #[serde(default)]
    incluir_inactivos: bool,
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
    Json(payload): Json<UsuarioCreate>,
) -> Result<impl IntoResponse, Error> {
    let creado = usuario::create_usuario(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(creado)))
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, Error> {
    let usuarios = usuario::list_usuarios(&state.db, query.incluir_inactivos).await?;
    Ok(Json(usuarios))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let encontrado = usuario::get_usuario(&state.db, id).await?;
    Ok(Json(encontrado))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<UsuarioUpdate>,
) -> Result<impl IntoResponse, Error> {
    let actualizado = usuario::update_usuario(&state.db, id, payload).await?;
    Ok(Json(actualizado))
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
        usuario::hard_delete_usuario(&state.db, id, motivo, query.usuario_eliminador_id).await?;
        "Usuario eliminado permanentemente"
    } else {
        usuario::soft_delete_usuario(&state.db, id).await?;
        "Usuario desactivado correctamente"
    };
    Ok(Json(json!({ "message": mensaje, "id": id })))
}

async fn reactivar(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let reactivado = usuario::reactivate_usuario(&state.db, id).await?;
    Ok(Json(reactivado))
}
