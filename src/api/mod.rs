//! HTTP API layer.
//!
//! Thin axum handlers over the core modules: extractors parse the request,
//! a core function does the work, and [`crate::errors::Error`] maps onto an
//! HTTP status here. Every response body is JSON except the CSV report.

/// Endpoints under `/alimentos`
pub mod alimentos;
/// Endpoints under `/historial`
pub mod historial;
/// Endpoints under `/inventario`
pub mod inventario;
/// Endpoints under `/loncheras`
pub mod loncheras;
/// Endpoints under `/pedidos`
pub mod pedidos;
/// Endpoints under `/perfiles`
pub mod perfiles;
/// Endpoints under `/productos`
pub mod productos;
/// Endpoints under `/reportes`
pub mod reportes;
/// Endpoints under `/restricciones`
pub mod restricciones;
/// Endpoints under `/usuarios`
pub mod usuarios;

use crate::errors::{Error, Result};
use axum::{
    Json, Router,
    http::{Method, StatusCode, header::CONTENT_TYPE},
    response::{IntoResponse, Response},
    routing::get,
};
use sea_orm::DatabaseConnection;
use serde_json::json;
use tokio::net::TcpListener;
use tower_http::cors::{Any, CorsLayer};
use tracing::{error, info};

/// Shared state handed to every handler.
#[derive(Debug, Clone)]
pub struct AppState {
    /// Pooled database connection
    pub db: DatabaseConnection,
}

impl AppState {
    /// Creates the shared state from an established connection.
    #[must_use]
    pub const fn new(db: DatabaseConnection) -> Self {
        Self { db }
    }
}

impl IntoResponse for Error {
    fn into_response(self) -> Response {
        let status = match &self {
            Self::NotFound { .. } => StatusCode::NOT_FOUND,
            Self::Conflict { .. } => StatusCode::CONFLICT,
            Self::InvalidInput { .. } | Self::InsufficientStock { .. } => StatusCode::BAD_REQUEST,
            _ => StatusCode::INTERNAL_SERVER_ERROR,
        };
        let detail = if status == StatusCode::INTERNAL_SERVER_ERROR {
            error!("unhandled error serving request: {self}");
            "Error interno del servidor".to_string()
        } else {
            self.to_string()
        };
        (status, Json(json!({ "detail": detail }))).into_response()
    }
}

/// Service metadata at the root path.
async fn raiz() -> impl IntoResponse {
    Json(json!({
        "message": "Bienvenido a NutriBox API",
        "version": env!("CARGO_PKG_VERSION"),
    }))
}

/// Assembles the application router with every resource mounted and the
/// CORS layer applied.
pub fn build_router(state: AppState) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::PATCH,
            Method::DELETE,
        ])
        .allow_headers([CONTENT_TYPE]);

    Router::new()
        .route("/", get(raiz))
        .nest("/usuarios", usuarios::router())
        .nest("/perfiles", perfiles::router())
        .nest("/alimentos", alimentos::router())
        .nest("/loncheras", loncheras::router())
        .nest("/restricciones", restricciones::router())
        .nest("/productos", productos::router())
        .nest("/pedidos", pedidos::router())
        .nest("/inventario", inventario::router())
        .nest("/historial", historial::router())
        .nest("/reportes", reportes::router())
        .layer(cors)
        .with_state(state)
}

/// Binds the listener and serves the API until a shutdown signal arrives.
///
/// # Errors
/// Returns an error when the address cannot be bound or the server fails
/// while running.
pub async fn serve(db: DatabaseConnection, address: &str) -> Result<()> {
    let app = build_router(AppState::new(db));
    let listener = TcpListener::bind(address).await?;
    info!("Listening on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(Into::into)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match tokio::signal::ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        use tokio::signal::unix::{SignalKind, signal};
        match signal(SignalKind::terminate()) {
            Ok(mut term) => {
                term.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install terminate handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }
}
