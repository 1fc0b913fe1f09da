use dotenvy::dotenv;
use nutribox::{
    api,
    config::{database, seed, server},
    errors::Result,
};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

#[tokio::main]
async fn main() -> Result<()> {
    // 1. Initialize tracing (as early as possible)
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("info")),
        )
        .init();

    // 2. Load .env file (as early as possible)
    dotenv().ok(); // Make it non-fatal, env vars can be set externally
    info!("Attempted to load .env file.");

    // 3. Connect to the database
    let db = database::create_connection().await?;
    info!("Database connection established.");

    // 4. Create tables from the entity definitions
    database::create_tables(&db).await?;
    info!("Database tables ready.");

    // 5. Seed the restriction catalog; a missing config.toml is not fatal
    match seed::load_default_config() {
        Ok(config) => {
            let insertadas = seed::seed_restricciones(&db, &config).await?;
            info!("Seeded {insertadas} restricciones from config.toml");
        }
        Err(e) => warn!("Skipping restriction seed: {e}"),
    }

    // 6. Run the HTTP server until a shutdown signal arrives
    api::serve(db, &server::get_bind_address()).await
}
