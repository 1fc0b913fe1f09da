//! Handlers for the `/reportes` resource.

use axum::{
    Router,
    extract::State,
    http::header::{CONTENT_DISPOSITION, CONTENT_TYPE},
    response::IntoResponse,
    routing::get,
};

use super::AppState;
use crate::core::reporte;
use crate::errors::Error;

/// Routes for downloadable reports.
pub fn router() -> Router<AppState> {
    Router::new().route("/usuarios-csv", get(usuarios_csv))
}

async fn usuarios_csv(State(state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let bytes = reporte::generate_usuarios_loncheras_csv(&state.db).await?;
    Ok((
        [
            (CONTENT_TYPE, "text/csv; charset=utf-8"),
            (
                CONTENT_DISPOSITION,
                "attachment; filename=\"usuarios_loncheras.csv\"",
            ),
        ],
        bytes,
    ))
}
