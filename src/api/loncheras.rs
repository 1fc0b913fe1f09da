//! Handlers for the `/loncheras` resource.

use axum::{
    Json, Router,
    extract::{Path, Query, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{delete, get, post},
};
use serde::Deserialize;

use super::AppState;
use crate::core::lonchera::{self, AlimentoEnLonchera, LoncheraCreate, LoncheraUpdate};
use crate::errors::Error;

/// Routes for lunchbox management.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(list))
        .route("/:id", get(get_one).patch(update).delete(remove))
        .route("/:id/alimento", post(add_alimento))
        .route("/:id/alimento/:alimento_id", delete(remove_alimento))
        .route("/:id/alimentos", get(detalle))
        .route("/:id/completo", get(completo))
        .route("/:id/validar-restricciones", get(validar_restricciones))
}

#[derive(Debug, Deserialize)]
struct ListQuery {
    usuario_id: Option<i64>,
    #[serde(default)]
    incluir_inactivas: bool,
}

#[derive(Debug, Deserialize)]
struct EliminarQuery {
    #[serde(default)]
    hard_delete: bool,
    motivo: Option<String>,
    usuario_eliminador_id: Option<i64>,
}

/// Restriction ids arrive as one comma separated value, e.g.
/// `restriccion_ids=1,3,5`.
#[derive(Debug, Deserialize)]
struct ValidarQuery {
    #[serde(default)]
    restriccion_ids: String,
}

impl ValidarQuery {
    fn parse_ids(&self) -> Result<Vec<i64>, Error> {
        self.restriccion_ids
            .split(',')
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(|s| {
                s.parse::<i64>().map_err(|_| {
                    Error::invalid_input(
                        "restriccion_ids debe ser una lista de enteros separados por comas",
                    )
                })
            })
            .collect()
    }
}

async fn create(
    State(state): State<AppState>,
    Json(payload): Json<LoncheraCreate>,
) -> Result<impl IntoResponse, Error> {
    let creada = lonchera::create_lonchera(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(creada)))
}

async fn list(
    State(state): State<AppState>,
    Query(query): Query<ListQuery>,
) -> Result<impl IntoResponse, Error> {
    let loncheras =
        lonchera::list_loncheras(&state.db, query.usuario_id, query.incluir_inactivas).await?;
    Ok(Json(loncheras))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let encontrada = lonchera::get_lonchera(&state.db, id).await?;
    Ok(Json(encontrada))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<LoncheraUpdate>,
) -> Result<impl IntoResponse, Error> {
    let actualizada = lonchera::update_lonchera(&state.db, id, payload).await?;
    Ok(Json(actualizada))
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
        lonchera::hard_delete_lonchera(&state.db, id, motivo, query.usuario_eliminador_id).await?;
    } else {
        lonchera::soft_delete_lonchera(&state.db, id).await?;
    }
    Ok(StatusCode::NO_CONTENT)
}

async fn add_alimento(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<AlimentoEnLonchera>,
) -> Result<impl IntoResponse, Error> {
    let resultado = lonchera::add_alimento_to_lonchera(&state.db, id, payload).await?;
    Ok((StatusCode::CREATED, Json(resultado)))
}

async fn remove_alimento(
    State(state): State<AppState>,
    Path((id, alimento_id)): Path<(i64, i64)>,
) -> Result<impl IntoResponse, Error> {
    lonchera::remove_alimento_from_lonchera(&state.db, id, alimento_id).await?;
    Ok(StatusCode::NO_CONTENT)
}

async fn detalle(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let vista = lonchera::get_alimentos_detalle(&state.db, id).await?;
    Ok(Json(vista))
}

async fn completo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let vista = lonchera::get_lonchera_completa(&state.db, id).await?;
    Ok(Json(vista))
}

async fn validar_restricciones(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Query(query): Query<ValidarQuery>,
) -> Result<impl IntoResponse, Error> {
    let ids = query.parse_ids()?;
    let resultado = lonchera::validate_restricciones(&state.db, id, &ids).await?;
    Ok(Json(resultado))
}
