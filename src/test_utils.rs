//! Shared test utilities for `NutriBox`.
//!
//! This module provides common helper functions for setting up test databases,
//! creating test entities with sensible defaults, and driving the HTTP router
//! without a listening socket.

#![allow(clippy::unwrap_used)]

use crate::{
    api::{AppState, build_router},
    core::{alimento, lonchera, perfil, producto, restriccion, usuario},
    entities::{
        self,
        alimento::CategoriaAlimento,
        restriccion::NivelSeveridad,
        usuario::RolUsuario,
    },
    errors::Result,
};
use axum::body::Body;
use axum::http::Request;
use axum::response::Response;
use sea_orm::DatabaseConnection;
use tower::ServiceExt;

/// Creates an in-memory `SQLite` database with all tables initialized.
/// This is the standard setup for all integration tests.
pub async fn setup_test_db() -> Result<DatabaseConnection> {
    let db = sea_orm::Database::connect("sqlite::memory:").await?;
    crate::config::database::create_tables(&db).await?;
    Ok(db)
}

/// Builds a create payload for a usuario with the given cedula and age.
#[must_use]
pub fn usuario_payload(cedula: &str, edad: i32) -> usuario::UsuarioCreate {
    usuario::UsuarioCreate {
        nombre: "Ana".to_string(),
        apellido: "Pérez".to_string(),
        localidad: "Bogotá".to_string(),
        edad,
        rol: RolUsuario::Padre,
        cedula: cedula.to_string(),
    }
}

/// Creates a test usuario with sensible defaults.
///
/// # Arguments
/// * `db` - Database connection
/// * `cedula` - National ID, must be unique per test database
///
/// # Defaults
/// * `nombre`: "Ana", `apellido`: "Pérez"
/// * `localidad`: "Bogotá"
/// * `edad`: 34
/// * `rol`: `Padre`
pub async fn create_test_usuario(
    db: &DatabaseConnection,
    cedula: &str,
) -> Result<entities::usuario::Model> {
    usuario::create_usuario(db, usuario_payload(cedula, 34)).await
}

/// Creates a test perfil for a usuario.
///
/// # Defaults
/// * `bio`: "Bio de prueba"
/// * `telefono`: "3001234567"
/// * `foto_url`: None
pub async fn create_test_perfil(
    db: &DatabaseConnection,
    usuario_id: i64,
) -> Result<entities::perfil::Model> {
    perfil::create_perfil(
        db,
        perfil::PerfilCreate {
            usuario_id,
            bio: Some("Bio de prueba".to_string()),
            telefono: Some("3001234567".to_string()),
            foto_url: None,
        },
    )
    .await
}

/// Creates an empty test lonchera owned by a usuario.
///
/// # Defaults
/// * `descripcion`: None
/// * `calorias`: 0, `precio`: 0.0
pub async fn create_test_lonchera(
    db: &DatabaseConnection,
    usuario_id: i64,
    nombre: &str,
) -> Result<entities::lonchera::Model> {
    lonchera::create_lonchera(
        db,
        lonchera::LoncheraCreate {
            nombre: nombre.to_string(),
            descripcion: None,
            calorias: 0,
            precio: 0.0,
            usuario_id,
        },
    )
    .await
}

/// Builds a create payload for an alimento with the given name.
///
/// # Defaults
/// * `categoria`: `Frutas`
/// * 200.0 kcal, 10.0 g protein, 30.0 g carbs, 5.0 g fat per 100 g
/// * `precio_unitario`: 1.0
/// * `stock_inicial`: 0
#[must_use]
pub fn alimento_payload(nombre: &str) -> alimento::AlimentoCreate {
    alimento::AlimentoCreate {
        nombre: nombre.to_string(),
        categoria: CategoriaAlimento::Frutas,
        calorias_por_100g: 200.0,
        proteinas_por_100g: 10.0,
        carbohidratos_por_100g: 30.0,
        grasas_por_100g: 5.0,
        precio_unitario: 1.0,
        stock_inicial: 0,
    }
}

/// Creates a test alimento with the defaults of [`alimento_payload`].
pub async fn create_test_alimento(
    db: &DatabaseConnection,
    nombre: &str,
) -> Result<entities::alimento::Model> {
    alimento::create_alimento(db, alimento_payload(nombre)).await
}

/// Creates a test alimento with custom category, calories, price, and stock.
/// Use this when a test depends on those specific values.
pub async fn create_custom_alimento(
    db: &DatabaseConnection,
    nombre: &str,
    categoria: CategoriaAlimento,
    calorias_por_100g: f64,
    precio_unitario: f64,
    stock_inicial: i32,
) -> Result<entities::alimento::Model> {
    let mut payload = alimento_payload(nombre);
    payload.categoria = categoria;
    payload.calorias_por_100g = calorias_por_100g;
    payload.precio_unitario = precio_unitario;
    payload.stock_inicial = stock_inicial;
    alimento::create_alimento(db, payload).await
}

/// Creates a test restriccion with sensible defaults.
///
/// # Defaults
/// * `descripcion`: None
/// * `nivel_severidad`: `Bajo`
pub async fn create_test_restriccion(
    db: &DatabaseConnection,
    nombre: &str,
) -> Result<entities::restriccion::Model> {
    restriccion::create_restriccion(
        db,
        restriccion::RestriccionCreate {
            nombre: nombre.to_string(),
            descripcion: None,
            nivel_severidad: NivelSeveridad::Bajo,
        },
    )
    .await
}

/// Creates a test producto with the given price and starting stock.
///
/// # Defaults
/// * `descripcion`: None
pub async fn create_test_producto(
    db: &DatabaseConnection,
    nombre: &str,
    precio: f64,
    stock: i32,
) -> Result<entities::producto::Model> {
    producto::create_producto(
        db,
        producto::ProductoCreate {
            nombre: nombre.to_string(),
            descripcion: None,
            precio,
            stock_actual: stock,
        },
    )
    .await
}

/// Sets up a complete test environment with a usuario.
/// Returns (db, usuario) for common test scenarios.
pub async fn setup_with_usuario() -> Result<(DatabaseConnection, entities::usuario::Model)> {
    let db = setup_test_db().await?;
    let usuario = create_test_usuario(&db, "1032456789").await?;
    Ok((db, usuario))
}

/// Sets up a complete test environment with an alimento.
/// Returns (db, alimento) for inventory-related tests.
pub async fn setup_with_alimento() -> Result<(DatabaseConnection, entities::alimento::Model)> {
    let db = setup_test_db().await?;
    let alimento = create_test_alimento(&db, "Manzana").await?;
    Ok((db, alimento))
}

/// Sends one request through the full router against the given database and
/// returns the raw response.
pub async fn send_request(db: &DatabaseConnection, request: Request<Body>) -> Response {
    let app = build_router(AppState::new(db.clone()));
    app.oneshot(request).await.unwrap()
}

/// Collects a response body and decodes it as JSON.
pub async fn body_json(response: Response) -> serde_json::Value {
    let bytes = axum::body::to_bytes(response.into_body(), usize::MAX)
        .await
        .unwrap();
    serde_json::from_slice(&bytes).unwrap()
}
