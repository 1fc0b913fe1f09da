//! Seed configuration loading from config.toml
//!
//! Provides the initial dietary restriction catalog. The restrictions
//! defined in config.toml are inserted on startup when missing, so running
//! the seed repeatedly never duplicates entries.

use crate::entities::{Restriccion, restriccion, restriccion::NivelSeveridad};
use crate::errors::{Error, Result};
use sea_orm::{DatabaseConnection, Set, prelude::*};
use serde::Deserialize;
use std::path::Path;

/// Configuration structure representing the entire config.toml file
#[derive(Debug, Deserialize)]
pub struct Config {
    /// List of restriction entries to seed
    pub restricciones: Vec<RestriccionSeed>,
}

/// Configuration for a single seeded restriction
#[derive(Debug, Deserialize, Clone)]
pub struct RestriccionSeed {
    /// Name of the restriction, the idempotency key
    pub nombre: String,
    /// Optional description
    #[serde(default)]
    pub descripcion: Option<String>,
    /// Severity level: `Bajo`, `Medio` or `Alto`
    pub nivel_severidad: NivelSeveridad,
}

/// Loads the seed configuration from a TOML file
///
/// # Errors
/// Returns an error if:
/// - The file cannot be read
/// - The TOML syntax is invalid
/// - Required fields are missing
pub fn load_config<P: AsRef<Path>>(path: P) -> Result<Config> {
    let contents = std::fs::read_to_string(path.as_ref()).map_err(|e| Error::Config {
        message: format!("Failed to read config file: {e}"),
    })?;

    toml::from_str(&contents).map_err(|e| Error::Config {
        message: format!("Failed to parse config.toml: {e}"),
    })
}

/// Loads the seed configuration from the default location (./config.toml)
///
/// # Errors
/// Returns an error when the file is missing or malformed.
pub fn load_default_config() -> Result<Config> {
    load_config("config.toml")
}

/// Inserts every configured restriction whose name is not in the catalog
/// yet. Returns how many were inserted.
pub async fn seed_restricciones(db: &DatabaseConnection, config: &Config) -> Result<usize> {
    let mut insertadas = 0;
    for entrada in &config.restricciones {
        let existente = Restriccion::find()
            .filter(restriccion::Column::Nombre.eq(entrada.nombre.as_str()))
            .one(db)
            .await?;
        if existente.is_some() {
            continue;
        }

        let nueva = restriccion::ActiveModel {
            nombre: Set(entrada.nombre.clone()),
            descripcion: Set(entrada.descripcion.clone()),
            nivel_severidad: Set(entrada.nivel_severidad),
            fecha_creacion: Set(chrono::Utc::now()),
            ..Default::default()
        };
        nueva.insert(db).await?;
        insertadas += 1;
    }
    Ok(insertadas)
}
