//! Handlers for the `/perfiles` resource.

use axum::{
    Json, Router,
    extract::{Path, State},
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
};
use serde_json::json;

use super::AppState;
use crate::core::perfil::{self, PerfilCreate, PerfilUpdate};
use crate::errors::Error;

/// Routes for perfil management.
pub fn router() -> Router<AppState> {
    Router::new()
        .route("/", post(create).get(list))
        .route("/:id", get(get_one).put(update).delete(remove))
        .route("/:id/completo", get(completo))
        .route("/usuario/:usuario_id", get(by_usuario))
}

async fn create(
    State(state): State<AppState>,
    Json(payload): Json<PerfilCreate>,
) -> Result<impl IntoResponse, Error> {
    let creado = perfil::create_perfil(&state.db, payload).await?;
    Ok((StatusCode::CREATED, Json(creado)))
}

async fn list(State(state): State<AppState>) -> Result<impl IntoResponse, Error> {
    let perfiles = perfil::list_perfiles(&state.db).await?;
    Ok(Json(perfiles))
}

async fn get_one(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let encontrado = perfil::get_perfil(&state.db, id).await?;
    Ok(Json(encontrado))
}

async fn by_usuario(
    State(state): State<AppState>,
    Path(usuario_id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let encontrado = perfil::get_perfil_by_usuario(&state.db, usuario_id).await?;
    Ok(Json(encontrado))
}

async fn update(
    State(state): State<AppState>,
    Path(id): Path<i64>,
    Json(payload): Json<PerfilUpdate>,
) -> Result<impl IntoResponse, Error> {
    let actualizado = perfil::update_perfil(&state.db, id, payload).await?;
    Ok(Json(actualizado))
}

async fn remove(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    perfil::delete_perfil(&state.db, id).await?;
    Ok(Json(
        json!({ "message": "Perfil eliminado exitosamente", "id": id }),
    ))
}

async fn completo(
    State(state): State<AppState>,
    Path(id): Path<i64>,
) -> Result<impl IntoResponse, Error> {
    let vista = perfil::get_perfil_completo(&state.db, id).await?;
    Ok(Json(vista))
}

#[cfg(test)]
mod tests {
    #![allow(clippy::unwrap_used)]
    use crate::errors::Result;
    use crate::test_utils::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode, header::CONTENT_TYPE};

    #[tokio::test]
    async fn test_second_perfil_for_usuario_conflicts() -> Result<()> {
        let (db, usuario) = setup_with_usuario().await?;
        create_test_perfil(&db, usuario.id).await?;

        let cuerpo = serde_json::json!({ "usuario_id": usuario.id, "bio": "otra" }).to_string();
        let request = Request::post("/perfiles/")
            .header(CONTENT_TYPE, "application/json")
            .body(Body::from(cuerpo))
            .unwrap();
        let respuesta = send_request(&db, request).await;
        assert_eq!(respuesta.status(), StatusCode::CONFLICT);
        Ok(())
    }

    #[tokio::test]
    async fn test_completo_and_by_usuario_views() -> Result<()> {
        let (db, usuario) = setup_with_usuario().await?;
        let perfil = create_test_perfil(&db, usuario.id).await?;

        let request = Request::get(format!("/perfiles/{}/completo", perfil.id))
            .body(Body::empty())
            .unwrap();
        let vista = body_json(send_request(&db, request).await).await;
        assert_eq!(vista["perfil"]["id"], perfil.id);
        assert_eq!(vista["usuario"]["id"], usuario.id);

        let request = Request::get(format!("/perfiles/usuario/{}", usuario.id))
            .body(Body::empty())
            .unwrap();
        let encontrado = body_json(send_request(&db, request).await).await;
        assert_eq!(encontrado["id"], perfil.id);
        Ok(())
    }

    #[tokio::test]
    async fn test_delete_returns_message_body() -> Result<()> {
        let (db, usuario) = setup_with_usuario().await?;
        let perfil = create_test_perfil(&db, usuario.id).await?;

        let request = Request::delete(format!("/perfiles/{}", perfil.id))
            .body(Body::empty())
            .unwrap();
        let respuesta = send_request(&db, request).await;
        assert_eq!(respuesta.status(), StatusCode::OK);
        let cuerpo = body_json(respuesta).await;
        assert_eq!(cuerpo["message"], "Perfil eliminado exitosamente");

        let request = Request::get(format!("/perfiles/{}", perfil.id))
            .body(Body::empty())
            .unwrap();
        assert_eq!(
            send_request(&db, request).await.status(),
            StatusCode::NOT_FOUND
        );
        Ok(())
    }
}
