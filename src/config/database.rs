//! Database configuration module.
//!
//! Handles the `SQLite` connection and table creation using `SeaORM`. Tables
//! are generated from the entity definitions through
//! `Schema::create_table_from_entity`, so the database schema always matches
//! the Rust struct definitions without manual SQL. Creation is idempotent,
//! restarting against an existing database is safe.

use crate::entities::{
    Alimento, Historial, Lonchera, LoncheraAlimento, Movimiento, Pedido, PedidoProducto, Perfil,
    Producto, Restriccion, RestriccionAlimento, Usuario,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, Schema};

/// Gets the database URL from the environment or returns the default
/// `SQLite` path.
///
/// Looks for `DATABASE_URL` and falls back to a local `SQLite` file that is
/// created on first use.
#[must_use]
pub fn get_database_url() -> String {
    std::env::var("DATABASE_URL")
        .unwrap_or_else(|_| "sqlite://nutribox.sqlite?mode=rwc".to_string())
}

/// Establishes a connection to the `SQLite` database.
///
/// Uses the URL from [`get_database_url`] and returns a pooled connection
/// shared by the whole application.
pub async fn create_connection() -> Result<DatabaseConnection> {
    let database_url = get_database_url();
    Database::connect(&database_url).await.map_err(Into::into)
}

/// Creates all database tables from the entity definitions.
///
/// Tables are created parents first so the generated foreign keys always
/// reference existing tables, and with `IF NOT EXISTS` so running it against
/// an already-initialized database is a no-op.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let builder = db.get_database_backend();
    let schema = Schema::new(builder);

    let mut tablas = vec![
        schema.create_table_from_entity(Usuario),
        schema.create_table_from_entity(Perfil),
        schema.create_table_from_entity(Alimento),
        schema.create_table_from_entity(Lonchera),
        schema.create_table_from_entity(LoncheraAlimento),
        schema.create_table_from_entity(Restriccion),
        schema.create_table_from_entity(RestriccionAlimento),
        schema.create_table_from_entity(Producto),
        schema.create_table_from_entity(Pedido),
        schema.create_table_from_entity(PedidoProducto),
        schema.create_table_from_entity(Movimiento),
        schema.create_table_from_entity(Historial),
    ];

    for tabla in &mut tablas {
        db.execute(tabla.if_not_exists()).await?;
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::entities::{
        alimento::Model as AlimentoModel, pedido::Model as PedidoModel,
        usuario::Model as UsuarioModel,
    };
    use sea_orm::{EntityTrait, QuerySelect};

    #[tokio::test]
    async fn test_create_connection() -> Result<()> {
        // In-memory database to avoid touching any existing file
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        let _: Vec<UsuarioModel> = Usuario::find().limit(1).all(&db).await?;
        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;

        // Tables exist when querying them succeeds
        let _: Vec<UsuarioModel> = Usuario::find().limit(1).all(&db).await?;
        let _: Vec<AlimentoModel> = Alimento::find().limit(1).all(&db).await?;
        let _: Vec<PedidoModel> = Pedido::find().limit(1).all(&db).await?;

        Ok(())
    }

    #[tokio::test]
    async fn test_create_tables_is_idempotent() -> Result<()> {
        let db = Database::connect("sqlite::memory:").await?;
        create_tables(&db).await?;
        create_tables(&db).await?;

        let _: Vec<UsuarioModel> = Usuario::find().limit(1).all(&db).await?;
        Ok(())
    }
}
